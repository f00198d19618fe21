use log::{debug, warn};

use crate::engine::output::Output;
use crate::engine::room::{ItemId, Room};
use crate::world::Recipe;

/// Runs the first recipe in the room that matches `items`, or the room's failure text.
/// Returns whether a recipe ran.
pub fn combine(room: &mut Room, items: &[ItemId], out: &mut Output) -> bool {
    let names: Vec<String> = items
        .iter()
        .map(|id| room.get(*id).name().to_string())
        .collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();

    debug!(
        "combining {:?} against {} recipe(s) in {}",
        names,
        room.recipes().len(),
        room.name()
    );

    let matched = room
        .recipes()
        .iter()
        .find(|r| r.matches_names(&names))
        .cloned();

    match matched {
        Some(recipe) => {
            combine_in_room(&recipe, room, out);
            true
        }
        None => {
            out.say(room.combine_failed_text().to_string());
            false
        }
    }
}

/// Applies a matched recipe: announce it, add what it produces, then consume the
/// ingredients if the recipe says so.
pub fn combine_in_room(recipe: &Recipe, room: &mut Room, out: &mut Output) {
    let outcome = recipe.outcome();
    out.event(outcome.message.clone());

    for item in &outcome.produces {
        if let Err(e) = room.add(item.clone()) {
            warn!("recipe result '{}' was not added: {e}", item.name());
        }
    }

    if outcome.consume {
        remove_ingredients_from_room(recipe, room);
    }
}

/// Removes every ingredient by name. Ingredients that are already gone are skipped.
pub fn remove_ingredients_from_room(recipe: &Recipe, room: &mut Room) {
    for ingredient in recipe.ingredients() {
        if room.remove(ingredient).is_none() {
            debug!("ingredient '{}' already absent", ingredient);
        }
    }
}
