use log::debug;

use crate::engine::input::InputSource;
use crate::engine::output::Output;
use crate::engine::recipes::combine;
use crate::engine::render::{render_contents, render_room};
use crate::engine::room::{Handler, ItemId, Room};
use crate::world::{Action, ItemKind};

/// Routes one command through the room's handler chain. Returns whether any handler took it;
/// if none did, the help/invalid-command fallback runs and the command is not handled.
pub fn execute_command(
    room: &mut Room,
    command: &str,
    input: &mut dyn InputSource,
    out: &mut Output,
) -> bool {
    // Handlers may add or drop registrations while running; iterate a snapshot.
    let chain = room.dispatcher().clone();

    let taken = chain.execute(command, |handler, cmd| match *handler {
        Handler::Room => try_handle_room_command(room, cmd, out),
        Handler::Item(id) => try_handle_container_command(room, id, cmd, input, out),
    });

    match taken {
        Some(handler) => {
            debug!("{:?} handled by {:?}", command, handler);
            true
        }
        None => {
            handle_fallback(room, command, out);
            false
        }
    }
}

/// `look`, `use`, `combine` and the scenario's own verbs.
pub fn try_handle_room_command(room: &mut Room, command: &str, out: &mut Output) -> bool {
    if command == "look" {
        render_room(out, room);
        return true;
    }

    let mut tokens = command.split_whitespace();
    let verb = match tokens.next() {
        Some(v) => v,
        None => return false,
    };

    match verb {
        "use" => {
            let rest = command.trim_start()[verb.len()..].trim();
            if rest.is_empty() {
                out.say("Use what?");
            } else {
                handle_use(room, rest, out);
            }
            true
        }
        "combine" => {
            handle_combine(room, tokens, out);
            true
        }
        _ => {
            let args: Vec<&str> = tokens.collect();
            let action = room
                .actions()
                .iter()
                .find(|a| a.accepts(verb, &args))
                .cloned();

            match action {
                Some(action) => {
                    run_action(room, &action, out);
                    true
                }
                None => false,
            }
        }
    }
}

fn handle_use(room: &mut Room, name: &str, out: &mut Output) {
    let Some(id) = room.find(name) else {
        out.say(format!("There is no {} here.", name));
        return;
    };

    match room.get(id).kind() {
        ItemKind::Text(text) => out.say(text.clone()),
        ItemKind::Inert => out.say(format!("You can't find a way to use the {}.", name)),
        ItemKind::Container(c) => {
            if c.is_open() {
                handle_close(room, id, out);
            } else {
                handle_open(room, id, out);
            }
        }
    }
}

fn handle_combine<'a>(room: &mut Room, names: impl Iterator<Item = &'a str>, out: &mut Output) {
    let mut ids: Vec<ItemId> = Vec::new();
    for name in names {
        match room.find(name) {
            Some(id) => ids.push(id),
            None => {
                out.say(format!("There is no {} here.", name));
                return;
            }
        }
    }

    match ids.as_slice() {
        [] => out.say("Combine what?"),
        [only] => out.say(format!("Combine {} with what?", room.get(*only).name())),
        _ => {
            let list = ids
                .iter()
                .map(|id| room.get(*id).name())
                .collect::<Vec<_>>()
                .join(", ");
            out.say(format!(
                "You attempt to combine the following items: {}",
                list
            ));
            combine(room, &ids, out);
        }
    }
}

fn run_action(room: &mut Room, action: &Action, out: &mut Output) {
    out.say(action.response.trim());

    for item in &action.spawns {
        if room.find(item.name()).is_some() {
            debug!("'{}' already present, not spawned again", item.name());
            continue;
        }
        if let Err(e) = room.add(item.clone()) {
            debug!("could not spawn '{}': {e}", item.name());
        }
    }
}

/// `open <name>`, `close <name>` and, for password locks, `unlock <name>`.
/// Comparisons are exact and case-sensitive.
pub fn try_handle_container_command(
    room: &mut Room,
    id: ItemId,
    command: &str,
    input: &mut dyn InputSource,
    out: &mut Output,
) -> bool {
    let item = room.get(id);
    let Some(container) = item.container() else {
        return false;
    };
    let addressed = |verb: &str| {
        command
            .strip_prefix(verb)
            .and_then(|rest| rest.strip_prefix(' '))
            .is_some_and(|rest| rest == item.name())
    };

    if addressed("unlock") && container.password_lock().is_some() {
        handle_unlock(room, id, input, out);
        true
    } else if addressed("open") {
        handle_open(room, id, out);
        true
    } else if addressed("close") {
        handle_close(room, id, out);
        true
    } else {
        false
    }
}

fn handle_open(room: &mut Room, id: ItemId, out: &mut Output) {
    let item = room.get(id);
    let name = item.name().to_string();
    let (open, locked) = match item.container() {
        Some(c) => (c.is_open(), c.is_locked()),
        None => return,
    };

    if open {
        out.say(format!("The {} is already open.", name));
    } else if locked {
        out.say(format!(
            "You try to open the {}, but it is locked.",
            name
        ));
    } else {
        out.say(format!("You open the {}. Inside, you see: ", name));
        render_contents(out, room, id);
        room.open(id);
    }
}

fn handle_close(room: &mut Room, id: ItemId, out: &mut Output) {
    let name = room.get(id).name().to_string();
    if room.close(id) {
        out.say(format!("You close the {}", name));
    } else {
        out.say(format!("The {} is already closed.", name));
    }
}

fn handle_unlock(room: &mut Room, id: ItemId, input: &mut dyn InputSource, out: &mut Output) {
    let item = room.get(id);
    let name = item.name().to_string();
    let Some(container) = item.container() else {
        return;
    };
    let Some(lock) = container.password_lock().cloned() else {
        return;
    };

    if !container.is_locked() {
        out.say(format!("The {} is not locked.", name));
        return;
    }

    // Blocks the dispatch loop until the answer arrives; the answer is never a command.
    let attempt = input.read_line(lock.prompt()).unwrap_or_default();

    if lock.accepts(attempt.trim()) {
        out.say(lock.success_text(&name));
        room.unlock(id);
    } else {
        debug!("wrong password for '{}'", name);
        out.say(lock.failure_text(&name));
    }
}

/// Runs when no handler accepts a command.
pub fn handle_fallback(room: &Room, command: &str, out: &mut Output) {
    if command.trim().eq_ignore_ascii_case("help") {
        out.say("The following commands are available");
        out.say("help prints common commands, but there may be additional secret commands.");
        for handler in room.dispatcher().handlers() {
            render_help(out, room, *handler);
        }
    } else {
        out.say("Invalid command. Type help for information.");
    }
}

fn render_help(out: &mut Output, room: &Room, handler: Handler) {
    match handler {
        Handler::Room => {
            out.say("look prints the room description");
            out.say("use <item> uses an item");
            out.say("combine <item1> <item2> ... attempts to combine a list of items");
            for help in room.actions().iter().filter_map(|a| a.help.as_deref()) {
                out.say(help);
            }
        }
        Handler::Item(id) => {
            let item = room.get(id);
            if let Some(c) = item.container() {
                out.say(format!("You can open or close the {}", item.name()));
                if c.password_lock().is_some() {
                    out.say(format!("You can attempt to unlock the {}", item.name()));
                }
            }
        }
    }
}
