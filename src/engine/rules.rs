use crate::engine::output::Output;
use crate::engine::room::Room;

/// Turn accounting and win/lose conditions for a room.
pub trait RoomRules {
    /// Shown before every prompt.
    fn status(&self) -> Option<String> {
        None
    }

    /// Called after every dispatched command with whether any handler accepted it.
    fn on_command_attempted(&mut self, command: &str, handled: bool);

    fn escaped(&self, room: &Room) -> bool;

    fn failed(&self, room: &Room) -> bool;

    fn on_escaped(&self, out: &mut Output);

    fn on_failed(&self, out: &mut Output);
}

/// Escape by making `escape_item` appear in the room before `max_turns` handled commands.
#[derive(Debug, Clone)]
pub struct TurnLimit {
    max_turns: u32,
    turns: u32,
    escape_item: String,
    status_text: String,
    escaped_text: String,
    failed_text: String,
}

impl TurnLimit {
    pub fn new(max_turns: u32, escape_item: impl Into<String>) -> Self {
        TurnLimit {
            max_turns,
            turns: 0,
            escape_item: escape_item.into(),
            status_text: "You have taken {turns} turns. You have {left} turns left to escape."
                .to_string(),
            escaped_text: "You escaped in {turns} turns!".to_string(),
            failed_text: "You ran out of turns.\nGame Over".to_string(),
        }
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    pub fn with_escaped_text(mut self, text: impl Into<String>) -> Self {
        self.escaped_text = text.into();
        self
    }

    pub fn with_failed_text(mut self, text: impl Into<String>) -> Self {
        self.failed_text = text.into();
        self
    }

    pub fn set_max_turns(&mut self, max_turns: u32) {
        self.max_turns = max_turns;
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn escape_item(&self) -> &str {
        &self.escape_item
    }

    /// Substitutes `{turns}`, `{left}` and `{max}`.
    fn fill(&self, template: &str) -> String {
        template
            .replace("{turns}", &self.turns.to_string())
            .replace("{left}", &self.max_turns.saturating_sub(self.turns).to_string())
            .replace("{max}", &self.max_turns.to_string())
    }
}

impl RoomRules for TurnLimit {
    fn status(&self) -> Option<String> {
        Some(self.fill(&self.status_text))
    }

    fn on_command_attempted(&mut self, _command: &str, handled: bool) {
        if handled {
            self.turns += 1;
        }
    }

    fn escaped(&self, room: &Room) -> bool {
        room.find(&self.escape_item).is_some()
    }

    fn failed(&self, _room: &Room) -> bool {
        self.turns >= self.max_turns
    }

    fn on_escaped(&self, out: &mut Output) {
        out.event(self.fill(&self.escaped_text));
    }

    fn on_failed(&self, out: &mut Output) {
        out.event(self.fill(&self.failed_text));
    }
}
