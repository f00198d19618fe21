use serde::Deserialize;
use std::fs;
use std::path::Path;

use log::warn;

use super::Scenario;
use super::model::{
    Action, Container, Item, ItemKind, MatchPolicy, PasswordLock, Recipe, RecipeOutcome,
};
use crate::engine::{ItemId, Room, TurnLimit};
use crate::error::{Error, Result};

////////////////////
/// TOML STRUCTS ///
////////////////////

#[derive(Deserialize)]
struct ScenarioFile {
    room: RoomHeader,
    rules: RulesConfig,
    #[serde(default)]
    item: Vec<ItemConfig>, // [[item]] blocks, in placement order
    #[serde(default)]
    recipe: Vec<RecipeConfig>, // [[recipe]] blocks, first match wins
    #[serde(default)]
    action: Vec<ActionConfig>, // [[action]] blocks
}

#[derive(Deserialize)]
struct RoomHeader {
    name: String,
    #[serde(default)]
    intro: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    combine_failed_text: Option<String>,
}

#[derive(Deserialize)]
struct RulesConfig {
    max_turns: u32,
    escape_item: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    escaped_text: Option<String>,
    #[serde(default)]
    failed_text: Option<String>,
}

#[derive(Deserialize)]
struct ItemConfig {
    name: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    kind: Option<String>, // "text", "inert", "container"

    #[serde(default)]
    text: String,

    /// "room" or "item:<container name>"
    #[serde(default = "default_location")]
    location: String,

    #[serde(default)]
    open: bool,

    #[serde(default)]
    locked: Option<bool>,

    #[serde(default)]
    password: Option<String>,

    #[serde(default)]
    password_prompt: Option<String>,

    #[serde(default)]
    unlock_text: Option<String>,

    #[serde(default)]
    unlock_failed_text: Option<String>,
}

#[derive(Deserialize)]
struct RecipeConfig {
    ingredients: Vec<String>,

    #[serde(default)]
    order_matters: bool,

    #[serde(default)]
    matching: MatchPolicy,

    #[serde(default)]
    message: String,

    #[serde(default = "default_true")]
    consume: bool,

    #[serde(default)]
    produce: Vec<ItemConfig>, // [[recipe.produce]]
}

#[derive(Deserialize)]
struct ActionConfig {
    verb: String,

    #[serde(default)]
    args: Option<Vec<String>>,

    response: String,

    #[serde(default)]
    help: Option<String>,

    #[serde(default)]
    spawn: Vec<ItemConfig>, // [[action.spawn]]
}

fn default_location() -> String {
    "room".to_string()
}

fn default_true() -> bool {
    true
}

/////////////////////////////
/// TOML PARSER FUNCTIONS ///
/////////////////////////////

pub fn load_scenario_from_file(path: &Path) -> Result<Scenario> {
    let contents = fs::read_to_string(path)?;
    load_scenario_from_str(&contents)
}

pub fn load_scenario_from_str(contents: &str) -> Result<Scenario> {
    let file: ScenarioFile = toml::from_str(contents)?;

    let mut room = Room::new(
        file.room.name.trim(),
        normalize_multiline_desc(&file.room.description),
        normalize_multiline_desc(&file.room.intro),
    );
    if let Some(text) = &file.room.combine_failed_text {
        room = room.with_combine_failed_text(normalize_multiline_desc(text));
    }

    for ic in &file.item {
        let item = build_item(ic)?;
        match parse_location(&ic.location)? {
            None => {
                room.add(item)?;
            }
            Some(parent) => {
                let container = resolve_parent(&room, parent, &ic.location)?;
                room.add_to(container, item)?;
            }
        }
    }

    for rc in &file.recipe {
        let produces = rc
            .produce
            .iter()
            .map(build_item)
            .collect::<Result<Vec<_>>>()?;

        let outcome = RecipeOutcome {
            message: normalize_multiline_desc(&rc.message),
            produces,
            consume: rc.consume,
        };

        let recipe =
            Recipe::new(rc.order_matters, rc.ingredients.iter().cloned(), outcome)?
                .with_policy(rc.matching);
        room.add_recipe(recipe);
    }

    for ac in &file.action {
        let spawns = ac
            .spawn
            .iter()
            .map(build_item)
            .collect::<Result<Vec<_>>>()?;

        room.add_action(Action {
            verb: ac.verb.trim().to_string(),
            args: ac.args.clone(),
            response: normalize_multiline_desc(&ac.response),
            help: ac.help.clone(),
            spawns,
        });
    }

    let rules_cfg = &file.rules;
    let mut rules = TurnLimit::new(rules_cfg.max_turns, rules_cfg.escape_item.trim());
    if let Some(text) = &rules_cfg.status {
        rules = rules.with_status_text(normalize_multiline_desc(text));
    }
    if let Some(text) = &rules_cfg.escaped_text {
        rules = rules.with_escaped_text(normalize_multiline_desc(text));
    }
    if let Some(text) = &rules_cfg.failed_text {
        rules = rules.with_failed_text(normalize_multiline_desc(text));
    }

    Ok(Scenario { room, rules })
}

/// Collapses the indentation and wrapping of TOML multi-line strings:
/// one newline becomes a space, one blank line a line break, more a paragraph break.
fn normalize_multiline_desc(raw: &str) -> String {
    let mut result = String::new();
    let mut pending_blank_lines = 0usize;

    for line in raw.lines().map(str::trim) {
        if line.is_empty() {
            pending_blank_lines += 1;
            continue;
        }

        if !result.is_empty() {
            result.push_str(match pending_blank_lines {
                0 => " ",
                1 => "\n",
                _ => "\n\n",
            });
        }
        result.push_str(line);
        pending_blank_lines = 0;
    }

    result
}

////////////////////////////
/// ITEM PARSE HELPERS   ///
////////////////////////////

/// `None` means directly in the room, `Some(name)` inside that container.
fn parse_location(s: &str) -> Result<Option<&str>> {
    let s = s.trim();

    if s.eq_ignore_ascii_case("room") {
        return Ok(None);
    }

    match s.strip_prefix("item:").map(str::trim) {
        Some(parent) if !parent.is_empty() => Ok(Some(parent)),
        _ => Err(Error::UnknownLocation(s.to_string())),
    }
}

/// `item:<name>` must name exactly one live item.
fn resolve_parent(room: &Room, parent: &str, location: &str) -> Result<ItemId> {
    let candidates: Vec<ItemId> = room
        .live_items()
        .filter(|(_, item)| item.name() == parent)
        .map(|(id, _)| id)
        .collect();

    match candidates.as_slice() {
        [] => Err(Error::UnknownLocation(location.to_string())),
        [only] => Ok(*only),
        _ => Err(Error::AmbiguousLocation(parent.to_string())),
    }
}

fn build_item(ic: &ItemConfig) -> Result<Item> {
    let description = normalize_multiline_desc(&ic.description);
    let kind = parse_item_kind(ic)?;
    Item::new(ic.name.trim(), description, kind)
}

fn parse_item_kind(ic: &ItemConfig) -> Result<ItemKind> {
    let kind = ic.kind.as_deref().map(|s| s.trim().to_lowercase());

    let is_container = match kind.as_deref() {
        Some("container") => true,
        Some("text") | Some("inert") | None => false,
        Some(other) => {
            warn!("unknown item kind '{}' on '{}', treating it as a plain item", other, ic.name);
            false
        }
    };

    if !is_container {
        if ic.password.is_some() {
            return Err(Error::NotAContainer(ic.name.clone()));
        }
        let text = normalize_multiline_desc(&ic.text);
        return Ok(if kind.as_deref() == Some("inert") || text.is_empty() {
            ItemKind::Inert
        } else {
            ItemKind::Text(text)
        });
    }

    let locked = ic.locked.unwrap_or(ic.password.is_some());
    let mut container = Container::with_state(ic.open, locked);

    if let Some(password) = &ic.password {
        let mut lock = PasswordLock::new(password.clone());
        if let Some(prompt) = &ic.password_prompt {
            lock = lock.with_prompt(prompt.clone());
        }
        if let Some(text) = &ic.unlock_text {
            lock = lock.with_success_text(normalize_multiline_desc(text));
        }
        if let Some(text) = &ic.unlock_failed_text {
            lock = lock.with_failure_text(normalize_multiline_desc(text));
        }
        container = container.with_password(lock);
    }

    Ok(ItemKind::Container(container))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Output, Owner, ScriptedInput, execute_command};

    fn owner_name(room: &Room, owner: Option<Owner>) -> Option<String> {
        match owner {
            Some(Owner::Container(c)) => Some(room.get(c).name().to_string()),
            Some(Owner::Room) => Some(room.name().to_string()),
            None => None,
        }
    }

    const SAMPLE: &str = r#"
        [room]
        name = "Cell"
        intro = """
            You wake up
            on a cold floor.

            Find a way out.
        """
        description = "A bare cell."

        [rules]
        max_turns = 5
        escape_item = "key"

        [[item]]
        name = "chest"
        description = "an iron chest."
        kind = "container"
        password = "0410"

        [[item]]
        name = "note"
        description = "a note"
        text = "Try 0410."
        location = "item:chest"

        [[item]]
        name = "spoon"
        description = "a spoon"

        [[recipe]]
        ingredients = ["note", "spoon"]
        matching = "positional"
        message = "The spoon bends into a key."
        [[recipe.produce]]
        name = "key"
        description = "a bent key"

        [[action]]
        verb = "say"
        args = ["21"]
        response = "Nobody answers."
    "#;

    #[test]
    fn loads_items_recipes_and_actions() {
        let scenario = load_scenario_from_str(SAMPLE).unwrap();
        let room = &scenario.room;

        assert_eq!(room.intro(), "You wake up on a cold floor.\nFind a way out.");
        let names: Vec<&str> = room.items().map(|i| i.name()).collect();
        assert_eq!(names, vec!["chest", "spoon"]);

        let chest = room.find("chest").unwrap();
        let c = room.get(chest).container().unwrap();
        assert!(c.is_locked());
        assert!(c.password_lock().unwrap().accepts("0410"));

        let note = room.find_anywhere("note").unwrap();
        assert_eq!(owner_name(room, room.location(note)).as_deref(), Some("chest"));

        assert_eq!(room.recipes().len(), 1);
        assert_eq!(room.recipes()[0].policy(), MatchPolicy::Positional);
        assert!(room.recipes()[0].outcome().consume);
        assert_eq!(room.actions()[0].args.as_deref(), Some(&["21".to_string()][..]));

        assert_eq!(scenario.rules.max_turns(), 5);
        assert_eq!(scenario.rules.escape_item(), "key");
    }

    #[test]
    fn construction_errors_abort_loading() {
        let bad_name = SAMPLE.replace("name = \"spoon\"", "name = \"tea spoon\"");
        assert!(matches!(
            load_scenario_from_str(&bad_name),
            Err(Error::InvalidName(_))
        ));

        let duplicate = SAMPLE.replace("name = \"spoon\"", "name = \"chest\"");
        assert!(matches!(
            load_scenario_from_str(&duplicate),
            Err(Error::DuplicateName { .. })
        ));

        let orphan = SAMPLE.replace("item:chest", "item:wardrobe");
        assert!(matches!(
            load_scenario_from_str(&orphan),
            Err(Error::UnknownLocation(_))
        ));

        let lonely = SAMPLE.replace(r#"["note", "spoon"]"#, r#"["note"]"#);
        assert!(matches!(
            load_scenario_from_str(&lonely),
            Err(Error::TooFewIngredients(1))
        ));

        assert!(matches!(
            load_scenario_from_str("[room]\nname = 1"),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn locations_parse() {
        assert_eq!(parse_location(" room ").unwrap(), None);
        assert_eq!(parse_location("item: bag").unwrap(), Some("bag"));
        assert!(parse_location("item:").is_err());
        assert!(parse_location("inventory").is_err());
    }

    #[test]
    fn password_prompt_and_hooks_come_from_the_file() {
        let src = r#"
            [room]
            name = "Vault"

            [rules]
            max_turns = 5
            escape_item = "gold"

            [[item]]
            name = "safe"
            description = "a steel safe."
            kind = "container"
            password = "1234"
            password_prompt = "code? "
            unlock_text = "Clunk."
            unlock_failed_text = "Beep."
        "#;
        let mut room = load_scenario_from_str(src).unwrap().room;
        let safe = room.find("safe").unwrap();
        let mut input = ScriptedInput::new(["0000", " 1234 "]);

        let mut out = Output::new();
        assert!(execute_command(&mut room, "unlock safe", &mut input, &mut out));
        assert_eq!(out.lines(), vec!["Beep."]);
        assert!(room.get(safe).container().unwrap().is_locked());

        let mut out = Output::new();
        execute_command(&mut room, "unlock safe", &mut input, &mut out);
        assert_eq!(out.lines(), vec!["Clunk."]);
        assert!(!room.get(safe).container().unwrap().is_locked());

        assert_eq!(input.prompts(), &["code? ".to_string(), "code? ".to_string()]);
    }

    #[test]
    fn shared_container_names_make_locations_ambiguous() {
        let src = r#"
            [room]
            name = "Attic"

            [rules]
            max_turns = 5
            escape_item = "key"

            [[item]]
            name = "box"
            description = "a box."
            kind = "container"

            [[item]]
            name = "trunk"
            description = "a trunk."
            kind = "container"

            [[item]]
            name = "box"
            description = "a smaller box."
            kind = "container"
            location = "item:trunk"

            [[item]]
            name = "key"
            description = "a key"
            location = "item:box"
        "#;
        assert!(matches!(
            load_scenario_from_str(src),
            Err(Error::AmbiguousLocation(name)) if name == "box"
        ));

        let unique = src.replace(
            "name = \"box\"\n            description = \"a smaller box.\"",
            "name = \"small_box\"\n            description = \"a smaller box.\"",
        );
        let scenario = load_scenario_from_str(&unique).unwrap();
        let key = scenario.room.find_anywhere("key").unwrap();
        assert_eq!(
            owner_name(&scenario.room, scenario.room.location(key)).as_deref(),
            Some("box")
        );
    }
}
