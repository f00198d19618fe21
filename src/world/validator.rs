use std::collections::HashSet;

use super::Scenario;

/// A scenario problem that does not stop the game from starting but probably
/// makes it unwinnable or confusing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    fn new(msg: impl Into<String>) -> Self {
        ValidationError {
            message: msg.into(),
        }
    }
}

const BUILTIN_VERBS: [&str; 3] = ["look", "use", "combine"];

pub fn validate_scenario(scenario: &Scenario) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = Vec::new();
    let room = &scenario.room;
    let rules = &scenario.rules;

    if rules.max_turns() == 0 {
        errors.push(ValidationError::new(
            "max_turns is 0: the first command ends the game",
        ));
    }

    // Every name that exists now or can be created later
    let mut obtainable: HashSet<&str> = room.live_items().map(|(_, i)| i.name()).collect();
    for recipe in room.recipes() {
        obtainable.extend(recipe.outcome().produces.iter().map(|i| i.name()));
    }
    for action in room.actions() {
        obtainable.extend(action.spawns.iter().map(|i| i.name()));
    }

    for (idx, recipe) in room.recipes().iter().enumerate() {
        for ing in recipe.ingredients() {
            if !obtainable.contains(ing.as_str()) {
                errors.push(ValidationError::new(format!(
                    "recipe #{} needs '{}', which no item, recipe or action provides",
                    idx + 1,
                    ing
                )));
            }
        }
    }

    if !obtainable.contains(rules.escape_item()) {
        errors.push(ValidationError::new(format!(
            "escape item '{}' can never appear in the room",
            rules.escape_item()
        )));
    } else if room.find(rules.escape_item()).is_some() {
        errors.push(ValidationError::new(format!(
            "escape item '{}' is visible from the start",
            rules.escape_item()
        )));
    }

    for action in room.actions() {
        if action.verb.is_empty() {
            errors.push(ValidationError::new("action has an empty verb"));
        } else if BUILTIN_VERBS.contains(&action.verb.as_str()) {
            errors.push(ValidationError::new(format!(
                "action verb '{}' is shadowed by the built-in command",
                action.verb
            )));
        }
    }

    errors
}
