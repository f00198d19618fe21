pub mod engine;
pub mod error;
pub mod world;

use engine::{
    InputSource, Output, Room, RoomRules, TurnLimit, execute_command, render_intro, render_room,
};
use log::info;
use world::Scenario;

pub use error::{Error, Result};
pub use world::{load_scenario_from_file, load_scenario_from_str};

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Escaped,
    Failed,
    Quit,
}

pub struct GameState<R: RoomRules = TurnLimit> {
    pub room: Room,
    pub rules: R,
    outcome: Option<Outcome>,
}

#[cfg(feature = "wasm")]
mod wasm_bindings {
    use super::*;
    use crate::engine::{OutputBlock, ScriptedInput};
    use serde::Serialize;
    use serde_wasm_bindgen::to_value;
    use wasm_bindgen::prelude::*;

    #[derive(Serialize)]
    struct WasmStepResult {
        blocks: Vec<OutputBlock>,
        over: bool,
    }

    #[wasm_bindgen]
    pub struct WasmGame {
        state: GameState,
    }

    #[wasm_bindgen]
    impl WasmGame {
        /// Create a new game from a TOML scenario string. Call `init()` to get the intro.
        #[wasm_bindgen(constructor)]
        pub fn new(scenario_toml: &str) -> std::result::Result<WasmGame, JsValue> {
            let scenario = load_scenario_from_str(scenario_toml)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            Ok(WasmGame {
                state: GameState::from_scenario(scenario),
            })
        }

        #[wasm_bindgen]
        pub fn init(&self) -> JsValue {
            to_value(&WasmStepResult {
                blocks: self.state.initialize().blocks,
                over: false,
            })
            .unwrap_or(JsValue::NULL)
        }

        /// The first line of `text` is the command; any further lines answer prompts
        /// such as password requests.
        #[wasm_bindgen]
        pub fn step(&mut self, text: &str) -> JsValue {
            let mut lines = text.lines();
            let command = lines.next().unwrap_or("");
            let mut answers = ScriptedInput::new(lines);
            let (out, over) = self.state.step(command, &mut answers);
            to_value(&WasmStepResult {
                blocks: out.blocks,
                over,
            })
            .unwrap_or(JsValue::NULL)
        }
    }
}

impl GameState<TurnLimit> {
    pub fn from_scenario(scenario: Scenario) -> Self {
        GameState::new(scenario.room, scenario.rules)
    }
}

impl<R: RoomRules> GameState<R> {
    pub fn new(room: Room, rules: R) -> Self {
        GameState {
            room,
            rules,
            outcome: None,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Intro, the first `look`, and the status line.
    pub fn initialize(&self) -> Output {
        let mut out = Output::new();
        render_intro(&mut out, &self.room);
        render_room(&mut out, &self.room);
        if let Some(status) = self.rules.status() {
            out.set_status(status);
        }
        out
    }

    /// Process a single player command; returns (output, game over?).
    ///
    /// `source` answers any nested prompt the command raises.
    pub fn step(&mut self, input: &str, source: &mut dyn InputSource) -> (Output, bool) {
        let mut out = Output::new();

        if self.outcome.is_some() {
            out.say("The game is over.");
            return (out, true);
        }

        let command = input.trim();
        if command.is_empty() {
            return (out, false);
        }

        let lower = command.to_lowercase();
        if lower == "quit" || lower == "exit" {
            out.say("Goodbye.");
            self.finish(Outcome::Quit);
            return (out, true);
        }

        let handled = execute_command(&mut self.room, command, source, &mut out);
        self.rules.on_command_attempted(command, handled);

        if self.rules.escaped(&self.room) {
            self.rules.on_escaped(&mut out);
            self.finish(Outcome::Escaped);
        } else if self.rules.failed(&self.room) {
            self.rules.on_failed(&mut out);
            self.finish(Outcome::Failed);
        } else if let Some(status) = self.rules.status() {
            out.set_status(status);
        }

        (out, self.outcome.is_some())
    }

    /// Runs the whole game against `source`, handing each output to `emit` as soon as it
    /// is produced. Running out of input counts as quitting.
    pub fn run<F>(&mut self, source: &mut dyn InputSource, mut emit: F) -> Outcome
    where
        F: FnMut(Output),
    {
        emit(self.initialize());

        loop {
            if let Some(outcome) = self.outcome {
                return outcome;
            }

            let Some(line) = source.read_line("> ") else {
                let mut out = Output::new();
                out.say("\nGoodbye.");
                emit(out);
                self.finish(Outcome::Quit);
                return Outcome::Quit;
            };

            if line.trim().is_empty() {
                continue;
            }

            let (out, _) = self.step(&line, source);
            emit(out);
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        info!("game finished: {:?}", outcome);
        self.outcome = Some(outcome);
    }
}
