use crate::engine::output::Output;
use crate::engine::room::{ItemId, Room};

/// Title and intro, printed once when the game starts.
pub fn render_intro(out: &mut Output, room: &Room) {
    out.title(room.name());
    out.say(room.intro().trim());
}

/// The `look` view: description followed by every visible item.
pub fn render_room(out: &mut Output, room: &Room) {
    out.say(room.description().trim());
    out.say("\nYou can see:");
    for item in room.items() {
        out.say(format!("  {}", item));
    }
}

/// One line per item inside `container`, whatever its state.
pub fn render_contents(out: &mut Output, room: &Room, container: ItemId) {
    for child in room.contents(container) {
        out.say(format!("  {}", room.get(*child)));
    }
}
