//! Terminal front end: host or join a duel, play by hand or let the CPU
//! fight for you.

use std::error::Error;
use std::io::{self, BufRead, Write};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use diceduel::{
    join_match, Action, ActionOutcome, ActionPolicy, Catalog, Combatant, CpuPolicy, DiceKind,
    HostMatch, MatchOptions, MatchState, MatchView, Outcome, Proto, DEFAULT_PORT,
};

#[derive(Parser)]
#[command(name = "duel", about = "Two-player dice battles over TCP or UDP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Host a match and wait for a guest.
    Host {
        /// Address to listen on; empty means all IPv4 interfaces.
        #[arg(long, default_value = "")]
        bind: String,

        /// Die to play the whole match with.
        #[arg(long, default_value = "d6")]
        dice: DiceArg,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Join a hosted match.
    Join {
        /// Host address to connect to.
        #[arg(default_value = "127.0.0.1")]
        host: String,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Use UDP instead of TCP.
    #[arg(long)]
    udp: bool,

    /// Name shown to the opponent.
    #[arg(long, default_value = "Player")]
    name: String,

    /// Character to play: warrior, mage or guardian.
    #[arg(long, default_value = "warrior")]
    character: String,

    /// Let the computer play this side.
    #[arg(long)]
    cpu: bool,

    /// Seed for dice and the CPU opponent.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum DiceArg {
    D6,
    D8,
    D10,
}

impl From<DiceArg> for DiceKind {
    fn from(arg: DiceArg) -> Self {
        match arg {
            DiceArg::D6 => Self::D6,
            DiceArg::D8 => Self::D8,
            DiceArg::D10 => Self::D10,
        }
    }
}

impl CommonArgs {
    fn proto(&self) -> Proto {
        if self.udp { Proto::Udp } else { Proto::Tcp }
    }

    fn policy(&self) -> PlayerPolicy {
        if self.cpu {
            PlayerPolicy::Cpu(CpuPolicy::new(self.seed))
        } else {
            PlayerPolicy::Human(HumanPolicy)
        }
    }
}

enum PlayerPolicy {
    Cpu(CpuPolicy),
    Human(HumanPolicy),
}

impl ActionPolicy for PlayerPolicy {
    fn decide(&mut self, me: &Combatant, foe: &Combatant) -> Action {
        match self {
            Self::Cpu(cpu) => cpu.decide(me, foe),
            Self::Human(human) => human.decide(me, foe),
        }
    }
}

/// Prompts on stdin until a valid choice comes in.
struct HumanPolicy;

impl ActionPolicy for HumanPolicy {
    fn decide(&mut self, me: &Combatant, foe: &Combatant) -> Action {
        println!();
        println!(
            "Your turn. You: {} hp, foe: {} hp.",
            me.hp, foe.hp
        );
        println!(
            "  1) attack   2) heal ({} left)   3) buff ({} left)   4) defend",
            me.items.heal, me.items.buff
        );

        let stdin = io::stdin();
        loop {
            print!("> ");
            let _ = io::stdout().flush();
            let mut line = String::new();
            // EOF (Ok(0)) means stdin is gone; fall back like a read error.
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => return Action::Attack,
                Ok(_) => {}
            }
            match line.trim() {
                "1" => return Action::Attack,
                "2" => return Action::Heal,
                "3" => return Action::Buff,
                "4" => return Action::Defend,
                other => println!("'{other}' is not a move, pick 1-4"),
            }
        }
    }
}

/// Renders the match as plain text.
struct ConsoleView;

impl MatchView for ConsoleView {
    fn match_started(&mut self, state: &MatchState) {
        println!(
            "Match started: {} ({}) vs {} ({}), playing with a {}.",
            state.players[0].name,
            state.players[0].archetype,
            state.players[1].name,
            state.players[1].archetype,
            state.dice,
        );
    }

    fn turn_resolved(&mut self, actor: &str, outcome: &ActionOutcome, state: &MatchState) {
        let line = match outcome {
            ActionOutcome::Attack { roll, crit, damage } => {
                let crit = if *crit { ", CRITICAL" } else { "" };
                format!("{actor} attacks: rolled {roll}{crit}, {damage} damage")
            }
            ActionOutcome::Heal { amount } => format!("{actor} heals {amount} hp"),
            ActionOutcome::Buff { turns } => {
                format!("{actor} powers up for the next {turns} turns")
            }
            ActionOutcome::Defend { def_bonus } => {
                format!("{actor} braces (+{def_bonus} defense)")
            }
        };
        println!(
            "[round {}] {line}.  {}: {} hp | {}: {} hp",
            state.round,
            state.players[0].name,
            state.players[0].hp,
            state.players[1].name,
            state.players[1].hp,
        );
    }

    fn match_ended(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Victory { winner } => println!("\n{winner} wins!"),
            Outcome::ConnectionLost => println!("\nConnection lost, match abandoned."),
        }
    }
}

fn print_roster() {
    println!("Characters:");
    for archetype in Catalog::standard().archetypes() {
        println!(
            "  {:<9} hp {:>2}  atk {}  def {}  - {}",
            archetype.id, archetype.hp, archetype.atk, archetype.def, archetype.blurb
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Host { bind, dice, common } => {
            print_roster();
            let hosted = HostMatch::bind(&bind, common.port, common.proto())?;
            println!("Waiting for a guest on {}...", hosted.local_addr()?);
            let mut policy = common.policy();
            let options = MatchOptions {
                name: common.name.clone(),
                character: common.character.clone(),
                dice: dice.into(),
                seed: common.seed,
            };
            hosted.run(options, &mut policy, &mut ConsoleView)?
        }
        Command::Join { host, common } => {
            print_roster();
            let mut policy = common.policy();
            let options = MatchOptions {
                name: common.name.clone(),
                character: common.character.clone(),
                dice: DiceKind::D6,
                seed: common.seed,
            };
            join_match(
                &host,
                common.port,
                common.proto(),
                options,
                &mut policy,
                &mut ConsoleView,
            )?
        }
    };

    match outcome {
        Outcome::Victory { winner } => println!("Result: {winner} won."),
        Outcome::ConnectionLost => println!("Result: connection lost."),
    }
    Ok(())
}
