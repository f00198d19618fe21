use std::path::PathBuf;

use clap::Parser;
use log::{LevelFilter, info, warn};

use escape_room::engine::{Output, OutputBlock, StdinInput};
use escape_room::world::validate_scenario;
use escape_room::{GameState, load_scenario_from_file};

#[derive(Parser, Debug)]
#[command(name = "escape_room", version, about = "A text-based escape room")]
struct Args {
    /// Scenario file to play
    #[arg(default_value = "scenarios/wizards_lab.toml")]
    scenario: PathBuf,

    /// Override the scenario's turn budget
    #[arg(long)]
    max_turns: Option<u32>,

    /// Increase log verbosity (-v, -vv, -vvv); logs go to stderr
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn flush_output(out: Output) {
    let mut printed_anything = false;
    let mut started_events = false;

    for block in out.blocks {
        match block {
            OutputBlock::Title(t) => {
                println!("\n{}", t);
                printed_anything = true;
            }
            OutputBlock::Text(line) => {
                println!("{}", line);
                printed_anything = true;
            }
            OutputBlock::Event(ev) => {
                if !started_events {
                    if printed_anything {
                        println!(); // visual separation before first event
                    }
                    started_events = true;
                }
                println!("{}", ev);
                printed_anything = true;
            }
            OutputBlock::Status(status) => {
                println!("\n{}", status);
                printed_anything = true;
            }
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let scenario = match load_scenario_from_file(&args.scenario) {
        Ok(s) => {
            info!("using scenario file: {}", args.scenario.display());
            s
        }
        Err(e) => {
            eprintln!(
                "Failed to load scenario file '{}': {e}",
                args.scenario.display()
            );
            std::process::exit(1);
        }
    };

    for problem in validate_scenario(&scenario) {
        warn!("scenario: {}", problem.message);
    }

    let mut game = GameState::from_scenario(scenario);
    if let Some(max_turns) = args.max_turns {
        game.rules.set_max_turns(max_turns);
    }

    let outcome = game.run(&mut StdinInput, flush_output);
    info!("session ended: {:?}", outcome);
}
