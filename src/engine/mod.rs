mod commands;
mod dispatcher;
mod input;
mod output;
mod recipes;
mod render;
mod room;
mod rules;

pub use commands::{
    execute_command, handle_fallback, try_handle_container_command, try_handle_room_command,
};

pub use dispatcher::Dispatcher;
pub use input::{InputSource, ScriptedInput, StdinInput};
pub use output::{Output, OutputBlock};
pub use recipes::{combine, combine_in_room, remove_ingredients_from_room};
pub use render::{render_contents, render_intro, render_room};
pub use room::{Handler, ItemId, Owner, Room};
pub use rules::{RoomRules, TurnLimit};
