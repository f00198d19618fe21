//! Setup-time errors.
//!
//! Everything here is fatal for the entity being built. Mistakes the player makes at the
//! prompt are reported as game text instead and never surface as an `Error`.

use thiserror::Error;

/// Errors raised while building items, containers, recipes and scenarios.
#[derive(Debug, Error)]
pub enum Error {
    /// Item names are single tokens so the command parser can address them.
    #[error("invalid item name '{0}': names must be non-empty and contain no white space")]
    InvalidName(String),

    /// Another item with the same name already lives in the same owner.
    #[error("{owner} already contains a {name}")]
    DuplicateName { owner: String, name: String },

    #[error("recipes must have at least two ingredients, got {0}")]
    TooFewIngredients(usize),

    #[error("each item name in a recipe must be unique, '{0}' is listed twice")]
    DuplicateIngredient(String),

    #[error("container '{0}' cannot start open and locked")]
    OpenAndLocked(String),

    #[error("'{0}' is not a container")]
    NotAContainer(String),

    #[error("'{item}' cannot be placed inside '{container}': it would contain itself")]
    ContainmentCycle { item: String, container: String },

    #[error("invalid location '{0}': expected 'room' or 'item:<name>'")]
    UnknownLocation(String),

    #[error("location 'item:{0}' is ambiguous: more than one item is called '{0}'")]
    AmbiguousLocation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scenario parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
