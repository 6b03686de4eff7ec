//! The turn synchronization engine.
//!
//! Both processes run the same loop: act and broadcast on your own turn,
//! block and overwrite on the opponent's. A `TURN_RESULT` carries the
//! complete post-turn snapshot of both combatants, so the receiving side
//! performs no game logic at all — it replaces its pair verbatim and
//! advances the turn counter.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use diceduel_protocol::{Envelope, MessageKind};
use diceduel_session::MessageLink;

use crate::{
    resolve_attack, Action, ActionPolicy, Catalog, Combatant, DiceRoller, EngineError, MatchState,
    MatchView, Outcome, Side, BUFF_DURATION, DEF_CLAMP_SLACK, HEAL_AMOUNT,
};

/// What one resolved action amounted to, as it travels in `TURN_RESULT`
/// and reaches the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionOutcome {
    Attack { roll: u32, crit: bool, damage: i32 },
    Heal { amount: i32 },
    Buff { turns: u32 },
    Defend { def_bonus: i32 },
}

/// Payload of `TURN_RESULT`: which turn this was, who acted, what they
/// did, and the authoritative snapshot of both combatants afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResultData {
    pub round: u32,
    /// Canonical index of the actor: 0 host, 1 guest.
    pub player: usize,
    pub action: ActionOutcome,
    pub players_state: [Combatant; 2],
}

/// Payload of `GAME_END`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEndData {
    pub winner: String,
}

fn pair_mut(players: &mut [Combatant; 2], actor: usize) -> (&mut Combatant, &mut Combatant) {
    let (left, right) = players.split_at_mut(1);
    if actor == 0 {
        (&mut left[0], &mut right[0])
    } else {
        (&mut right[0], &mut left[0])
    }
}

/// Mutates `state` with the given action for the combatant at `actor`.
///
/// Fails with [`EngineError::ItemExhausted`] before touching anything if
/// the action spends an item the combatant does not hold.
pub fn apply_action(
    state: &mut MatchState,
    actor: usize,
    action: Action,
    roller: &mut DiceRoller,
) -> Result<ActionOutcome, EngineError> {
    let dice = state.dice;
    let (me, foe) = pair_mut(&mut state.players, actor);

    match action {
        Action::Attack => {
            let result = resolve_attack(me, foe, dice, roller);
            foe.take_damage(result.damage);
            Ok(ActionOutcome::Attack {
                roll: result.roll,
                crit: result.crit,
                damage: result.damage,
            })
        }
        Action::Heal => {
            if me.items.heal == 0 {
                return Err(EngineError::ItemExhausted("heal"));
            }
            me.items.heal -= 1;
            let amount = me.heal(HEAL_AMOUNT);
            Ok(ActionOutcome::Heal { amount })
        }
        Action::Buff => {
            if me.items.buff == 0 {
                return Err(EngineError::ItemExhausted("buff"));
            }
            me.items.buff -= 1;
            me.buff_turns_remaining = BUFF_DURATION;
            Ok(ActionOutcome::Buff {
                turns: BUFF_DURATION,
            })
        }
        Action::Defend => {
            me.defense += 1;
            // Bracing also shakes off any lingering debuff.
            me.debuff_turns_remaining = 0;
            Ok(ActionOutcome::Defend { def_bonus: 1 })
        }
    }
}

/// Drives one side of a match over a [`MessageLink`].
///
/// The engine owns its replica of the [`MatchState`]; the catalog is
/// shared, immutable configuration.
pub struct TurnEngine<'a> {
    state: MatchState,
    side: Side,
    catalog: &'a Catalog,
    roller: DiceRoller,
}

impl<'a> TurnEngine<'a> {
    pub fn new(state: MatchState, side: Side, catalog: &'a Catalog, roller: DiceRoller) -> Self {
        Self {
            state,
            side,
            catalog,
            roller,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn is_local_turn(&self) -> bool {
        self.state.turn_owner == self.side.index()
    }

    /// Resolves one local turn: query the policy, apply the action, decay
    /// the actor's timed effects, broadcast the snapshot, and check for
    /// victory.
    ///
    /// Returns `Ok(Some(outcome))` when the match just ended, `Ok(None)`
    /// when it continues with the opponent to act.
    pub fn play_local_turn<L, P, V>(
        &mut self,
        link: &mut L,
        policy: &mut P,
        view: &mut V,
    ) -> Result<Option<Outcome>, EngineError>
    where
        L: MessageLink,
        P: ActionPolicy,
        V: MatchView,
    {
        let me = self.side.index();

        // Re-query on an exhausted item rather than forfeiting the turn.
        let outcome = loop {
            let action = policy.decide(
                &self.state.players[me],
                &self.state.players[self.side.opponent_index()],
            );
            match apply_action(&mut self.state, me, action, &mut self.roller) {
                Ok(outcome) => break outcome,
                Err(EngineError::ItemExhausted(item)) => {
                    debug!(item, "action needs an exhausted item, asking again");
                }
                Err(err) => return Err(err),
            }
        };

        // Timed effects tick down before the snapshot goes out, so the
        // receiver's verbatim overwrite already contains the decay.
        self.decay(me);

        let result = TurnResultData {
            round: self.state.round,
            player: me,
            action: outcome.clone(),
            players_state: self.state.players.clone(),
        };
        link.send_message(MessageKind::TurnResult, &result)?;

        let actor = self.state.players[me].name.clone();
        view.turn_resolved(&actor, &outcome, &self.state);

        if let Some(winner) = self.state.winner() {
            let winner = winner.name.clone();
            // Best effort: the peer detects the end from the snapshot too.
            if let Err(err) = link.send_message(
                MessageKind::GameEnd,
                &GameEndData {
                    winner: winner.clone(),
                },
            ) {
                warn!(%err, "could not announce game end");
            }
            return Ok(Some(Outcome::Victory { winner }));
        }

        self.state.advance_turn();
        Ok(None)
    }

    /// Blocks for the opponent's turn and adopts its snapshot verbatim.
    pub fn play_remote_turn<L, V>(
        &mut self,
        link: &mut L,
        view: &mut V,
    ) -> Result<Option<Outcome>, EngineError>
    where
        L: MessageLink,
        V: MatchView,
    {
        let envelope = link.recv_message()?;
        match envelope.kind {
            MessageKind::TurnResult => {
                let result: TurnResultData = envelope.parse()?;
                // Reject before adopting anything: a bad actor index must
                // not leave a half-applied snapshot behind.
                if result.player > 1 {
                    return Err(EngineError::InvalidPlayerIndex(result.player));
                }
                self.state.round = result.round;
                self.state.players = result.players_state;

                let actor = self.state.players[result.player].name.clone();
                view.turn_resolved(&actor, &result.action, &self.state);

                if let Some(winner) = self.state.winner() {
                    return Ok(Some(Outcome::Victory {
                        winner: winner.name.clone(),
                    }));
                }

                self.state.advance_turn();
                Ok(None)
            }
            // The winner is taken from the announcement; no reply is sent.
            MessageKind::GameEnd => {
                let end: GameEndData = envelope.parse()?;
                Ok(Some(Outcome::Victory { winner: end.winner }))
            }
            other => Err(EngineError::UnexpectedMessage(other)),
        }
    }

    /// Runs the match to completion. Any link failure ends the match as
    /// [`Outcome::ConnectionLost`]; nothing is retried.
    pub fn run<L, P, V>(&mut self, link: &mut L, policy: &mut P, view: &mut V) -> Outcome
    where
        L: MessageLink,
        P: ActionPolicy,
        V: MatchView,
    {
        view.match_started(&self.state);
        let outcome = loop {
            let step = if self.is_local_turn() {
                self.play_local_turn(link, policy, view)
            } else {
                self.play_remote_turn(link, view)
            };
            match step {
                Ok(Some(outcome)) => break outcome,
                Ok(None) => {}
                Err(err) => {
                    warn!(%err, "match aborted");
                    break Outcome::ConnectionLost;
                }
            }
        };
        view.match_ended(&outcome);
        outcome
    }

    /// Ticks down the actor's timed effects and snaps defense back when
    /// stacked defends have drifted too far above the archetype base.
    fn decay(&mut self, actor: usize) {
        let combatant = &mut self.state.players[actor];
        combatant.buff_turns_remaining = combatant.buff_turns_remaining.saturating_sub(1);
        combatant.debuff_turns_remaining = combatant.debuff_turns_remaining.saturating_sub(1);

        if let Some(archetype) = self.catalog.get(&combatant.archetype) {
            if combatant.defense > archetype.def + DEF_CLAMP_SLACK {
                combatant.defense = archetype.def;
            }
        }
    }
}

/// Extension used by the engine to deserialize an envelope body.
trait EnvelopeExt {
    fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, EngineError>;
}

impl EnvelopeExt for Envelope {
    fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, EngineError> {
        serde_json::from_value(self.data.clone())
            .map_err(|err| EngineError::Session(diceduel_session::SessionError::Protocol(
                diceduel_protocol::ProtocolError::MalformedPayload(err),
            )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiceKind;

    fn fresh_state() -> (MatchState, Catalog) {
        let catalog = Catalog::standard();
        let state = MatchState::new(
            Combatant::from_archetype("Host", catalog.get("warrior").unwrap()),
            Combatant::from_archetype("Guest", catalog.get("guardian").unwrap()),
            DiceKind::D6,
        );
        (state, catalog)
    }

    #[test]
    fn attack_damages_the_opponent() {
        let (mut state, _) = fresh_state();
        let mut roller = DiceRoller::seeded(3);
        let before = state.players[1].hp;
        let outcome = apply_action(&mut state, 0, Action::Attack, &mut roller).unwrap();
        if let ActionOutcome::Attack { damage, .. } = outcome {
            assert_eq!(state.players[1].hp, (before - damage).max(0));
        } else {
            panic!("expected an attack outcome");
        }
    }

    #[test]
    fn heal_spends_an_item_and_restores_hp() {
        let (mut state, _) = fresh_state();
        let mut roller = DiceRoller::seeded(3);
        state.players[0].hp = 5;
        let outcome = apply_action(&mut state, 0, Action::Heal, &mut roller).unwrap();
        assert_eq!(outcome, ActionOutcome::Heal { amount: 10 });
        assert_eq!(state.players[0].hp, 15);
        assert_eq!(state.players[0].items.heal, 1);
    }

    #[test]
    fn heal_without_items_is_rejected_untouched() {
        let (mut state, _) = fresh_state();
        let mut roller = DiceRoller::seeded(3);
        state.players[0].items.heal = 0;
        let snapshot = state.clone();
        let err = apply_action(&mut state, 0, Action::Heal, &mut roller).unwrap_err();
        assert!(matches!(err, EngineError::ItemExhausted("heal")));
        assert_eq!(state, snapshot);
    }

    #[test]
    fn buff_arms_the_timer() {
        let (mut state, _) = fresh_state();
        let mut roller = DiceRoller::seeded(3);
        apply_action(&mut state, 1, Action::Buff, &mut roller).unwrap();
        assert_eq!(state.players[1].buff_turns_remaining, BUFF_DURATION);
        assert_eq!(state.players[1].items.buff, 0);
    }

    #[test]
    fn defend_raises_defense_and_clears_debuff() {
        let (mut state, _) = fresh_state();
        let mut roller = DiceRoller::seeded(3);
        let before = state.players[0].defense;
        state.players[0].debuff_turns_remaining = 2;
        apply_action(&mut state, 0, Action::Defend, &mut roller).unwrap();
        assert_eq!(state.players[0].defense, before + 1);
        assert_eq!(state.players[0].debuff_turns_remaining, 0);
    }

    #[test]
    fn stacked_defends_snap_back_to_base() {
        let (state, catalog) = fresh_state();
        let base_def = catalog.get("warrior").unwrap().def;
        let mut engine = TurnEngine::new(state, Side::Host, &catalog, DiceRoller::seeded(1));
        engine.state.players[0].defense = base_def + DEF_CLAMP_SLACK + 1;
        engine.decay(0);
        assert_eq!(engine.state.players[0].defense, base_def);
    }

    #[test]
    fn defense_within_slack_is_kept() {
        let (state, catalog) = fresh_state();
        let base_def = catalog.get("warrior").unwrap().def;
        let mut engine = TurnEngine::new(state, Side::Host, &catalog, DiceRoller::seeded(1));
        engine.state.players[0].defense = base_def + DEF_CLAMP_SLACK;
        engine.decay(0);
        assert_eq!(engine.state.players[0].defense, base_def + DEF_CLAMP_SLACK);
    }

    #[test]
    fn turn_result_wire_shape() {
        let (state, _) = fresh_state();
        let result = TurnResultData {
            round: 2,
            player: 1,
            action: ActionOutcome::Attack {
                roll: 6,
                crit: true,
                damage: 14,
            },
            players_state: state.players.clone(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["round"], 2);
        assert_eq!(value["player"], 1);
        assert_eq!(value["action"]["type"], "attack");
        assert_eq!(value["action"]["crit"], true);
        assert_eq!(value["players_state"].as_array().unwrap().len(), 2);
    }
}
