mod loader;
mod model;
mod validator;

use crate::engine::{Room, TurnLimit};

pub use loader::{load_scenario_from_file, load_scenario_from_str};

pub use model::{
    Action, Container, Item, ItemKind, MatchPolicy, PasswordLock, Recipe, RecipeOutcome,
    validate_name,
};
pub use validator::{ValidationError, validate_scenario};

/// A fully built room together with the rules that decide how it ends.
#[derive(Debug)]
pub struct Scenario {
    pub room: Room,
    pub rules: TurnLimit,
}
