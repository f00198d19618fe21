use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;

use crate::error::{Error, Result};

///////////////////////////
/// ITEMS AND CONTAINERS ///
///////////////////////////

/// Returns `Ok(())` if `name` can address an item from the command line.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

/// What an item does when the player uses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// Prints its text (notes, receipts, slips of paper).
    Text(String),
    /// Props that only exist to be looked at or combined.
    Inert,
    /// Toggles open/closed on use and handles its own commands.
    Container(Container),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    name: String,
    description: String,
    kind: ItemKind,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: ItemKind,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;

        if let ItemKind::Container(c) = &kind {
            if c.is_open() && c.is_locked() {
                return Err(Error::OpenAndLocked(name));
            }
        }

        Ok(Item {
            name,
            description: description.into(),
            kind,
        })
    }

    pub fn text(
        name: impl Into<String>,
        description: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self> {
        Self::new(name, description, ItemKind::Text(text.into()))
    }

    pub fn inert(name: impl Into<String>, description: impl Into<String>) -> Result<Self> {
        Self::new(name, description, ItemKind::Inert)
    }

    pub fn new_container(
        name: impl Into<String>,
        description: impl Into<String>,
        container: Container,
    ) -> Result<Self> {
        Self::new(name, description, ItemKind::Container(container))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display text. Containers always report whether they are open.
    pub fn description(&self) -> String {
        match &self.kind {
            ItemKind::Container(c) => format!(
                "{} It is {}.",
                self.description,
                if c.is_open() { "open" } else { "closed" }
            ),
            _ => self.description.clone(),
        }
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn container(&self) -> Option<&Container> {
        match &self.kind {
            ItemKind::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn container_mut(&mut self) -> Option<&mut Container> {
        match &mut self.kind {
            ItemKind::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Capability query used when an item enters or leaves a room's visible set.
    pub fn is_handler(&self) -> bool {
        matches!(self.kind, ItemKind::Container(_))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.description())
    }
}

/// Open/lock state of a container. Open+locked is never reachable through these methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    open: bool,
    locked: bool,
    password: Option<PasswordLock>,
}

impl Container {
    /// A closed, unlocked container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open+locked is rejected later by `Item::new`.
    pub fn with_state(open: bool, locked: bool) -> Self {
        Container {
            open,
            locked,
            password: None,
        }
    }

    /// A closed container locked behind `password`.
    pub fn password_locked(password: impl Into<String>) -> Self {
        Self::with_state(false, true).with_password(PasswordLock::new(password))
    }

    pub fn with_password(mut self, lock: PasswordLock) -> Self {
        self.password = Some(lock);
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn password_lock(&self) -> Option<&PasswordLock> {
        self.password.as_ref()
    }

    /// Closed+unlocked -> open. Returns whether the state changed.
    pub fn open(&mut self) -> bool {
        if !self.open && !self.locked {
            self.open = true;
            true
        } else {
            false
        }
    }

    pub fn close(&mut self) -> bool {
        if self.open {
            self.open = false;
            true
        } else {
            false
        }
    }

    pub fn lock(&mut self) -> bool {
        if !self.open && !self.locked {
            self.locked = true;
            true
        } else {
            false
        }
    }

    pub fn unlock(&mut self) -> bool {
        if !self.open && self.locked {
            self.locked = false;
            true
        } else {
            false
        }
    }
}

/// Password prompt and the hooks that run after an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordLock {
    password: String,
    prompt: Option<String>,
    success_text: Option<String>,
    failure_text: Option<String>,
}

impl PasswordLock {
    pub fn new(password: impl Into<String>) -> Self {
        PasswordLock {
            password: password.into(),
            prompt: None,
            success_text: None,
            failure_text: None,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_success_text(mut self, text: impl Into<String>) -> Self {
        self.success_text = Some(text.into());
        self
    }

    pub fn with_failure_text(mut self, text: impl Into<String>) -> Self {
        self.failure_text = Some(text.into());
        self
    }

    /// Exact, case-sensitive comparison.
    pub fn accepts(&self, attempt: &str) -> bool {
        attempt == self.password
    }

    pub fn prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or("password: ")
    }

    pub fn success_text(&self, container_name: &str) -> String {
        self.success_text
            .clone()
            .unwrap_or_else(|| format!("You have unlocked the {}", container_name))
    }

    pub fn failure_text(&self, container_name: &str) -> String {
        self.failure_text
            .clone()
            .unwrap_or_else(|| format!("You failed to unlock the {}", container_name))
    }
}

///////////////
/// RECIPES ///
///////////////

/// How a recipe compares the items the player names against its ingredients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Ordered recipes compare index for index, unordered ones compare as sets.
    /// Both require the same number of items as ingredients.
    #[default]
    Exact,
    /// Index-for-index comparison of the supplied items against the ingredient
    /// prefix, whatever `order_matters` says. Kept for puzzles written against it.
    Positional,
}

/// What happens to the room when a recipe matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeOutcome {
    pub message: String,
    pub produces: Vec<Item>,
    pub consume: bool, // remove the ingredients from the room
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    ingredients: Vec<String>,
    order_matters: bool,
    policy: MatchPolicy,
    outcome: RecipeOutcome,
}

impl Recipe {
    pub fn new<I, S>(order_matters: bool, ingredients: I, outcome: RecipeOutcome) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ingredients: Vec<String> = ingredients.into_iter().map(Into::into).collect();

        if ingredients.len() < 2 {
            return Err(Error::TooFewIngredients(ingredients.len()));
        }

        let mut seen = HashSet::new();
        for ing in &ingredients {
            if !seen.insert(ing.as_str()) {
                return Err(Error::DuplicateIngredient(ing.clone()));
            }
        }

        Ok(Recipe {
            ingredients,
            order_matters,
            policy: MatchPolicy::default(),
            outcome,
        })
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn order_matters(&self) -> bool {
        self.order_matters
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn outcome(&self) -> &RecipeOutcome {
        &self.outcome
    }

    pub fn matches(&self, items: &[&Item]) -> bool {
        let names: Vec<&str> = items.iter().map(|i| i.name()).collect();
        self.matches_names(&names)
    }

    pub fn matches_names(&self, names: &[&str]) -> bool {
        match self.policy {
            MatchPolicy::Exact if self.order_matters => {
                names.len() == self.ingredients.len()
                    && names.iter().zip(&self.ingredients).all(|(n, ing)| *n == ing)
            }
            MatchPolicy::Exact => {
                // Ingredient names are unique, so equal length plus membership is set equality
                // as long as the candidates are unique too.
                let candidates: HashSet<&str> = names.iter().copied().collect();
                candidates.len() == names.len()
                    && names.len() == self.ingredients.len()
                    && self.ingredients.iter().all(|ing| candidates.contains(ing.as_str()))
            }
            MatchPolicy::Positional => {
                names.len() <= self.ingredients.len()
                    && names.iter().zip(&self.ingredients).all(|(n, ing)| *n == ing)
            }
        }
    }
}

///////////////
/// ACTIONS ///
///////////////

/// A room-specific verb such as `say 21`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub verb: String,
    pub args: Option<Vec<String>>, // None => any arguments
    pub response: String,
    pub help: Option<String>,
    pub spawns: Vec<Item>,
}

impl Action {
    pub fn accepts(&self, verb: &str, args: &[&str]) -> bool {
        if self.verb != verb {
            return false;
        }
        match &self.args {
            None => true,
            Some(expected) => {
                expected.len() == args.len() && expected.iter().zip(args).all(|(e, a)| e == a)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn papers() -> Recipe {
        Recipe::new(
            false,
            ["nine_paper", "plus_paper", "ten_paper", "equal_paper"],
            RecipeOutcome::default(),
        )
        .unwrap()
    }

    #[test]
    fn names_with_whitespace_are_rejected() {
        assert!(matches!(
            Item::inert("milk carton", "a carton"),
            Err(Error::InvalidName(_))
        ));
        assert!(Item::inert("tab\tbed", "x").is_err());
        assert!(Item::inert("", "x").is_err());
        assert!(Item::inert("milk_carton", "a carton").is_ok());
    }

    #[test]
    fn container_description_reports_state() {
        let mut item = Item::new_container("bag", "a bag.", Container::new()).unwrap();
        assert_eq!(item.description(), "a bag. It is closed.");
        item.container_mut().unwrap().open();
        assert_eq!(item.to_string(), "bag - a bag. It is open.");
    }

    #[test]
    fn open_and_locked_containers_cannot_be_built() {
        let err = Item::new_container("safe", "a safe", Container::with_state(true, true));
        assert!(matches!(err, Err(Error::OpenAndLocked(name)) if name == "safe"));
    }

    #[test]
    fn container_transitions_report_no_change_when_repeated() {
        let mut c = Container::new();
        assert!(c.open());
        assert!(!c.open());
        assert!(!c.lock(), "open containers cannot be locked");
        assert!(c.close());
        assert!(!c.close());
        assert!(c.lock());
        assert!(!c.lock());
        assert!(!c.open(), "locked containers cannot be opened");
        assert!(c.unlock());
        assert!(!c.unlock());
    }

    #[test]
    fn recipes_need_two_unique_ingredients() {
        assert!(matches!(
            Recipe::new(false, ["a"], RecipeOutcome::default()),
            Err(Error::TooFewIngredients(1))
        ));
        assert!(matches!(
            Recipe::new(true, ["a", "b", "a"], RecipeOutcome::default()),
            Err(Error::DuplicateIngredient(name)) if name == "a"
        ));
    }

    #[test]
    fn unordered_recipe_matches_any_order_but_not_subsets_or_supersets() {
        let r = papers();
        assert!(r.matches_names(&["nine_paper", "plus_paper", "ten_paper", "equal_paper"]));
        assert!(r.matches_names(&["equal_paper", "ten_paper", "nine_paper", "plus_paper"]));
        assert!(!r.matches_names(&["nine_paper", "plus_paper", "ten_paper"]));
        assert!(!r.matches_names(&[
            "nine_paper",
            "plus_paper",
            "ten_paper",
            "equal_paper",
            "milk"
        ]));
        assert!(!r.matches_names(&["nine_paper", "plus_paper", "ten_paper", "ten_paper"]));
    }

    #[test]
    fn ordered_recipe_requires_sequence_equality() {
        let r = Recipe::new(true, ["milk", "cereal"], RecipeOutcome::default()).unwrap();
        assert!(r.matches_names(&["milk", "cereal"]));
        assert!(!r.matches_names(&["cereal", "milk"]));
    }

    #[test]
    fn positional_policy_accepts_matching_prefixes_only() {
        let r = papers().with_policy(MatchPolicy::Positional);
        assert!(r.matches_names(&["nine_paper", "plus_paper"]));
        assert!(!r.matches_names(&["plus_paper", "nine_paper"]));
        assert!(!r.matches_names(&[
            "nine_paper",
            "plus_paper",
            "ten_paper",
            "equal_paper",
            "extra"
        ]));
    }

    #[test]
    fn password_lock_defaults() {
        let lock = PasswordLock::new("627");
        assert!(lock.accepts("627"));
        assert!(!lock.accepts("0627"));
        assert_eq!(lock.prompt(), "password: ");
        assert_eq!(lock.success_text("bag"), "You have unlocked the bag");
        assert_eq!(lock.failure_text("bag"), "You failed to unlock the bag");
    }

    #[test]
    fn actions_match_exact_arguments_or_anything() {
        let say = Action {
            verb: "say".into(),
            args: Some(vec!["21".into()]),
            response: String::new(),
            help: None,
            spawns: Vec::new(),
        };
        assert!(say.accepts("say", &["21"]));
        assert!(!say.accepts("say", &["22"]));
        assert!(!say.accepts("Say", &["21"]));

        let any = Action { args: None, ..say };
        assert!(any.accepts("say", &[]));
        assert!(any.accepts("say", &["hello", "there"]));
    }
}
