//! Match setup: the message exchange between handshake and first turn.
//!
//! ```text
//! host                                guest
//!  |  <- HANDSHAKE ------------------  |
//!  |  -- HANDSHAKE (accepted) ------>  |
//!  |  -- GAME_CONFIG --------------->  |   host character, die
//!  |  <- CHARACTER_SELECT -----------  |   guest character
//!  |            ... turns ...          |
//! ```
//!
//! After `CHARACTER_SELECT` both sides hold identical initial state —
//! combatants in canonical host-first order — and hand off to the
//! [`TurnEngine`].

use serde::{Deserialize, Serialize};
use tracing::info;

use diceduel_engine::{
    ActionPolicy, Catalog, Combatant, DiceKind, DiceRoller, MatchState, MatchView, Outcome, Side,
    TurnEngine,
};
use diceduel_net::{Endpoint, Proto};
use diceduel_protocol::{MessageKind, ProtocolError, PROTOCOL_VERSION};
use diceduel_session::{MessageLink, Session, SessionError};

use crate::MatchError;

/// Payload of `GAME_CONFIG` (host → guest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfigData {
    pub host_name: String,
    pub host_character: String,
    pub dice_type: DiceKind,
    pub protocol_version: String,
}

/// Payload of `CHARACTER_SELECT` (guest → host).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSelectData {
    pub name: String,
    pub character: String,
}

/// Local choices for one side of a match.
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// Display name, exchanged during setup so both replicas label the
    /// combatants identically.
    pub name: String,
    /// Catalog id of the character to play.
    pub character: String,
    /// Die for the whole match. Host's choice is authoritative; a guest's
    /// value is ignored in favor of what `GAME_CONFIG` carries.
    pub dice: DiceKind,
    /// Seed for dice and the CPU policy. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            name: "Player".into(),
            character: "warrior".into(),
            dice: DiceKind::D6,
            seed: None,
        }
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(
    data: serde_json::Value,
) -> Result<T, MatchError> {
    serde_json::from_value(data).map_err(|e| ProtocolError::MalformedPayload(e).into())
}

fn expect_kind(got: MessageKind, expected: MessageKind) -> Result<(), MatchError> {
    if got == expected {
        Ok(())
    } else {
        Err(SessionError::Unexpected { expected, got }.into())
    }
}

/// A bound, not-yet-started hosted match.
///
/// Binding is split from running so callers can learn the actual port
/// (after binding port 0) before the blocking wait for a guest.
pub struct HostMatch {
    endpoint: Endpoint,
}

impl HostMatch {
    /// Binds the listening endpoint. An empty `host` means the IPv4
    /// wildcard; `"::"` gives the IPv6 one.
    pub fn bind(host: &str, port: u16, proto: Proto) -> Result<Self, MatchError> {
        let endpoint = Endpoint::listen(host, port, proto)?;
        Ok(Self { endpoint })
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr, MatchError> {
        Ok(self.endpoint.local_addr()?)
    }

    /// Waits for one guest, runs setup and plays the match to completion.
    ///
    /// Setup failures (handshake, malformed or out-of-order setup
    /// messages, an unknown character) return an error; once the first
    /// turn starts, every failure mode is an [`Outcome`].
    pub fn run<P, V>(
        mut self,
        options: MatchOptions,
        policy: &mut P,
        view: &mut V,
    ) -> Result<Outcome, MatchError>
    where
        P: ActionPolicy,
        V: MatchView,
    {
        let catalog = Catalog::standard();
        let host_archetype = catalog
            .get(&options.character)
            .ok_or_else(|| MatchError::UnknownArchetype(options.character.clone()))?
            .clone();

        let peer = self.endpoint.accept_or_wait()?;
        info!(%peer, "guest joined");

        let mut session = Session::new(self.endpoint);
        session.respond(&format!("diceduel/{PROTOCOL_VERSION}"))?;

        session.send_message(
            MessageKind::GameConfig,
            &GameConfigData {
                host_name: options.name.clone(),
                host_character: options.character.clone(),
                dice_type: options.dice,
                protocol_version: PROTOCOL_VERSION.to_string(),
            },
        )?;

        let envelope = session.recv_message()?;
        expect_kind(envelope.kind, MessageKind::CharacterSelect)?;
        let select: CharacterSelectData = parse_payload(envelope.data)?;
        let guest_archetype = catalog
            .get(&select.character)
            .ok_or_else(|| MatchError::UnknownArchetype(select.character.clone()))?;

        let state = MatchState::new(
            Combatant::from_archetype(options.name.clone(), &host_archetype),
            Combatant::from_archetype(select.name, guest_archetype),
            options.dice,
        );
        info!(
            host = %options.character,
            guest = %select.character,
            dice = %options.dice,
            "match starting"
        );

        let mut engine = TurnEngine::new(state, Side::Host, &catalog, DiceRoller::new(options.seed));
        Ok(engine.run(&mut session, policy, view))
    }
}

/// Connects to a hosted match, runs setup as the guest and plays the
/// match to completion.
pub fn join_match<P, V>(
    host: &str,
    port: u16,
    proto: Proto,
    options: MatchOptions,
    policy: &mut P,
    view: &mut V,
) -> Result<Outcome, MatchError>
where
    P: ActionPolicy,
    V: MatchView,
{
    let catalog = Catalog::standard();
    let guest_archetype = catalog
        .get(&options.character)
        .ok_or_else(|| MatchError::UnknownArchetype(options.character.clone()))?
        .clone();

    let endpoint = Endpoint::connect(host, port, proto)?;
    let mut session = Session::new(endpoint);
    session.initiate(&format!("diceduel/{PROTOCOL_VERSION}"))?;

    let envelope = session.recv_message()?;
    expect_kind(envelope.kind, MessageKind::GameConfig)?;
    let config: GameConfigData = parse_payload(envelope.data)?;
    let host_archetype = catalog
        .get(&config.host_character)
        .ok_or_else(|| MatchError::UnknownArchetype(config.host_character.clone()))?;

    session.send_message(
        MessageKind::CharacterSelect,
        &CharacterSelectData {
            name: options.name.clone(),
            character: options.character.clone(),
        },
    )?;

    // The host's die wins; a locally configured one is only a default.
    let state = MatchState::new(
        Combatant::from_archetype(config.host_name, host_archetype),
        Combatant::from_archetype(options.name.clone(), &guest_archetype),
        config.dice_type,
    );
    info!(
        host = %config.host_character,
        guest = %options.character,
        dice = %config.dice_type,
        "match starting"
    );

    let mut engine = TurnEngine::new(state, Side::Guest, &catalog, DiceRoller::new(options.seed));
    Ok(engine.run(&mut session, policy, view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn game_config_wire_shape() {
        let config = GameConfigData {
            host_name: "Ana".into(),
            host_character: "mage".into(),
            dice_type: DiceKind::D8,
            protocol_version: PROTOCOL_VERSION.into(),
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({
                "host_name": "Ana",
                "host_character": "mage",
                "dice_type": "d8",
                "protocol_version": "1.0"
            })
        );
    }

    #[test]
    fn character_select_wire_shape() {
        let select = CharacterSelectData {
            name: "Bruno".into(),
            character: "guardian".into(),
        };
        assert_eq!(
            serde_json::to_value(&select).unwrap(),
            json!({"name": "Bruno", "character": "guardian"})
        );
    }
}
