use log::{debug, warn};

use crate::engine::dispatcher::Dispatcher;
use crate::error::{Error, Result};
use crate::world::{Action, Item, Recipe};

/// Handle to an item owned by a [`Room`]. Only meaningful for the room that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(usize);

/// Who currently holds an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Room,
    Container(ItemId),
}

/// Entries in the room's command chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Room,
    Item(ItemId),
}

#[derive(Debug)]
struct Slot {
    item: Item,
    owner: Option<Owner>, // None once removed or consumed
    contents: Vec<ItemId>,
}

/// A room: every item ever placed in it, the subset the player can currently see,
/// its recipes, its scenario actions and its command chain.
///
/// Items live in an arena and are never reallocated, so an [`ItemId`] stays valid after
/// the item is consumed. Ownership only changes through [`Room::move_item`], which keeps
/// the owner back-reference, the container contents, the visible set and the handler
/// registrations in step.
#[derive(Debug)]
pub struct Room {
    name: String,
    description: String,
    intro: String,
    combine_failed_text: String,
    slots: Vec<Slot>,
    visible: Vec<ItemId>,
    recipes: Vec<Recipe>,
    actions: Vec<Action>,
    dispatcher: Dispatcher<Handler>,
}

impl Room {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        intro: impl Into<String>,
    ) -> Self {
        let mut dispatcher = Dispatcher::new();
        dispatcher.add(Handler::Room);

        Room {
            name: name.into(),
            description: description.into(),
            intro: intro.into(),
            combine_failed_text: "Nothing happens.".to_string(),
            slots: Vec::new(),
            visible: Vec::new(),
            recipes: Vec::new(),
            actions: Vec::new(),
            dispatcher,
        }
    }

    pub fn with_combine_failed_text(mut self, text: impl Into<String>) -> Self {
        self.combine_failed_text = text.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn intro(&self) -> &str {
        &self.intro
    }

    pub fn combine_failed_text(&self) -> &str {
        &self.combine_failed_text
    }

    pub fn dispatcher(&self) -> &Dispatcher<Handler> {
        &self.dispatcher
    }

    /////////////
    // Lookup  //
    /////////////

    pub fn get(&self, id: ItemId) -> &Item {
        &self.slots[id.0].item
    }

    /// Visible item by exact name.
    pub fn find(&self, name: &str) -> Option<ItemId> {
        self.visible
            .iter()
            .copied()
            .find(|id| self.get(*id).name() == name)
    }

    pub fn item(&self, name: &str) -> Option<&Item> {
        self.find(name).map(|id| self.get(id))
    }

    /// First live item with this name, visible or not.
    pub fn find_anywhere(&self, name: &str) -> Option<ItemId> {
        self.live_items()
            .find(|(_, item)| item.name() == name)
            .map(|(id, _)| id)
    }

    /// Visible items in the order they became visible.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.visible.iter().map(|id| self.get(*id))
    }

    pub fn visible_ids(&self) -> &[ItemId] {
        &self.visible
    }

    pub fn is_visible(&self, id: ItemId) -> bool {
        self.visible.contains(&id)
    }

    /// Every item that still has an owner.
    pub fn live_items(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.owner.is_some())
            .map(|(i, s)| (ItemId(i), &s.item))
    }

    pub fn location(&self, id: ItemId) -> Option<Owner> {
        self.slots[id.0].owner
    }

    pub fn contents(&self, id: ItemId) -> &[ItemId] {
        &self.slots[id.0].contents
    }

    ///////////////
    // Ownership //
    ///////////////

    /// Places a new item directly in the room.
    pub fn add(&mut self, item: Item) -> Result<ItemId> {
        self.ensure_unique(Owner::Room, item.name(), None)?;
        let id = self.insert(item);
        self.attach(id, Some(Owner::Room));
        Ok(id)
    }

    /// Places a new item inside `container`.
    pub fn add_to(&mut self, container: ItemId, item: Item) -> Result<ItemId> {
        self.ensure_container(container)?;
        self.ensure_unique(Owner::Container(container), item.name(), None)?;
        let id = self.insert(item);
        self.attach(id, Some(Owner::Container(container)));
        Ok(id)
    }

    /// Removes the visible item called `name` and destroys it, along with anything inside it.
    /// Missing items are a no-op.
    pub fn remove(&mut self, name: &str) -> Option<ItemId> {
        let id = self.find(name)?;
        self.destroy(id);
        debug!("removed '{}' from {}", name, self.name);
        Some(id)
    }

    /// The single ownership primitive. `None` destroys the item and its contents.
    pub fn move_item(&mut self, id: ItemId, to: Option<Owner>) -> Result<()> {
        let Some(dest) = to else {
            self.destroy(id);
            return Ok(());
        };

        if let Owner::Container(c) = dest {
            self.ensure_container(c)?;
            self.ensure_acyclic(id, c)?;
        }
        let name = self.get(id).name().to_string();
        self.ensure_unique(dest, &name, Some(id))?;

        self.detach(id);
        self.attach(id, Some(dest));
        Ok(())
    }

    fn destroy(&mut self, id: ItemId) {
        self.detach(id);
        for child in std::mem::take(&mut self.slots[id.0].contents) {
            self.destroy(child);
        }
    }

    fn insert(&mut self, item: Item) -> ItemId {
        self.slots.push(Slot {
            item,
            owner: None,
            contents: Vec::new(),
        });
        ItemId(self.slots.len() - 1)
    }

    fn ensure_unique(&self, owner: Owner, name: &str, moving: Option<ItemId>) -> Result<()> {
        let (label, siblings) = match owner {
            Owner::Room => (self.name.as_str(), self.visible.as_slice()),
            Owner::Container(c) => (self.get(c).name(), self.contents(c)),
        };

        let taken = siblings
            .iter()
            .any(|s| Some(*s) != moving && self.get(*s).name() == name);

        if taken {
            return Err(Error::DuplicateName {
                owner: label.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_container(&self, id: ItemId) -> Result<()> {
        if self.get(id).container().is_none() {
            return Err(Error::NotAContainer(self.get(id).name().to_string()));
        }
        Ok(())
    }

    fn ensure_acyclic(&self, item: ItemId, container: ItemId) -> Result<()> {
        let mut cursor = Some(container);
        while let Some(c) = cursor {
            if c == item {
                return Err(Error::ContainmentCycle {
                    item: self.get(item).name().to_string(),
                    container: self.get(container).name().to_string(),
                });
            }
            cursor = match self.location(c) {
                Some(Owner::Container(parent)) => Some(parent),
                _ => None,
            };
        }
        Ok(())
    }

    fn detach(&mut self, id: ItemId) {
        match self.slots[id.0].owner.take() {
            Some(Owner::Room) => self.hide(id),
            Some(Owner::Container(c)) => {
                self.slots[c.0].contents.retain(|child| *child != id);
                self.hide(id);
            }
            None => {}
        }
    }

    fn attach(&mut self, id: ItemId, to: Option<Owner>) {
        self.slots[id.0].owner = to;
        match to {
            Some(Owner::Room) => self.reveal(id),
            Some(Owner::Container(c)) => {
                self.slots[c.0].contents.push(id);
                if self.publishes(c) {
                    self.reveal(id);
                }
            }
            None => {}
        }
    }

    /// True if `id` is a visible, open container.
    fn publishes(&self, id: ItemId) -> bool {
        self.is_visible(id) && self.get(id).container().is_some_and(|c| c.is_open())
    }

    fn reveal(&mut self, id: ItemId) {
        if self.is_visible(id) {
            return;
        }

        let name = self.get(id).name();
        if self.find(name).is_some() {
            warn!(
                "'{}' not shown in {}: another item already uses that name",
                name, self.name
            );
            return;
        }

        self.visible.push(id);
        if self.get(id).is_handler() {
            self.dispatcher.add(Handler::Item(id));
        }

        if self.publishes(id) {
            for child in self.slots[id.0].contents.clone() {
                self.reveal(child);
            }
        }
    }

    fn hide(&mut self, id: ItemId) {
        let Some(pos) = self.visible.iter().position(|v| *v == id) else {
            return;
        };

        let spilled = self.publishes(id);
        self.visible.remove(pos);
        self.dispatcher.remove(&Handler::Item(id));

        if spilled {
            for child in self.slots[id.0].contents.clone() {
                self.hide(child);
            }
        }
    }

    /////////////////////
    // Container state //
    /////////////////////

    /// Opens a closed, unlocked container and spills its contents into the room if the
    /// container is visible. Returns whether the state changed.
    pub fn open(&mut self, id: ItemId) -> bool {
        let changed = self.slots[id.0]
            .item
            .container_mut()
            .is_some_and(|c| c.open());

        if changed {
            debug!("opened '{}'", self.get(id).name());
            if self.is_visible(id) {
                for child in self.slots[id.0].contents.clone() {
                    self.reveal(child);
                }
            }
        }
        changed
    }

    /// Closes an open container and withdraws its contents from view.
    pub fn close(&mut self, id: ItemId) -> bool {
        let was_spilling = self.publishes(id);
        let changed = self.slots[id.0]
            .item
            .container_mut()
            .is_some_and(|c| c.close());

        if changed {
            debug!("closed '{}'", self.get(id).name());
            if was_spilling {
                for child in self.slots[id.0].contents.clone() {
                    self.hide(child);
                }
            }
        }
        changed
    }

    pub fn lock(&mut self, id: ItemId) -> bool {
        self.slots[id.0]
            .item
            .container_mut()
            .is_some_and(|c| c.lock())
    }

    pub fn unlock(&mut self, id: ItemId) -> bool {
        self.slots[id.0]
            .item
            .container_mut()
            .is_some_and(|c| c.unlock())
    }

    /////////////////////////
    // Recipes and actions //
    /////////////////////////

    pub fn add_recipe(&mut self, recipe: Recipe) {
        self.recipes.push(recipe);
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn add_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Container;

    fn names(room: &Room) -> Vec<&str> {
        room.items().map(|i| i.name()).collect()
    }

    fn lab() -> (Room, ItemId, ItemId) {
        let mut room = Room::new("lab", "A lab.", "");
        room.add(Item::inert("clock", "stuck at 6:27").unwrap()).unwrap();
        let bag = room
            .add(Item::new_container("bag", "a bag.", Container::new()).unwrap())
            .unwrap();
        let pouch = room
            .add_to(bag, Item::new_container("pouch", "a pouch.", Container::new()).unwrap())
            .unwrap();
        room.add_to(pouch, Item::text("coin", "a coin", "heads").unwrap())
            .unwrap();
        (room, bag, pouch)
    }

    #[test]
    fn room_is_first_handler() {
        let (room, bag, _) = lab();
        assert_eq!(
            room.dispatcher().handlers(),
            &[Handler::Room, Handler::Item(bag)]
        );
    }

    #[test]
    fn open_spills_contents_and_close_restores_view() {
        let (mut room, bag, pouch) = lab();
        let before: Vec<String> = names(&room).into_iter().map(String::from).collect();

        assert!(room.open(bag));
        assert_eq!(names(&room), vec!["clock", "bag", "pouch"]);
        assert!(room.dispatcher().contains(&Handler::Item(pouch)));

        assert!(room.open(pouch));
        assert_eq!(names(&room), vec!["clock", "bag", "pouch", "coin"]);

        assert!(room.close(bag));
        assert_eq!(names(&room), before);
        assert!(!room.dispatcher().contains(&Handler::Item(pouch)));
        assert_eq!(room.location(pouch), Some(Owner::Container(bag)));
    }

    #[test]
    fn opening_a_hidden_container_publishes_nothing() {
        let (mut room, _, pouch) = lab();
        assert!(room.open(pouch));
        assert!(room.find("coin").is_none());
    }

    #[test]
    fn adding_an_open_container_publishes_its_contents() {
        let mut room = Room::new("lab", "", "");
        let crate_item = Item::new_container("crate", "a crate.", Container::with_state(true, false));
        let id = room.add(crate_item.unwrap()).unwrap();
        room.add_to(id, Item::inert("straw", "straw").unwrap()).unwrap();
        assert!(room.find("straw").is_some());
    }

    #[test]
    fn duplicate_names_leave_state_unchanged() {
        let (mut room, bag, _) = lab();
        let before = room.visible_ids().to_vec();

        let err = room.add(Item::inert("clock", "another clock").unwrap());
        assert!(matches!(err, Err(Error::DuplicateName { .. })));
        assert_eq!(room.visible_ids(), before.as_slice());

        let contents = room.contents(bag).to_vec();
        let err = room.add_to(bag, Item::inert("pouch", "a second pouch").unwrap());
        assert!(matches!(err, Err(Error::DuplicateName { owner, .. }) if owner == "bag"));
        assert_eq!(room.contents(bag), contents.as_slice());
    }

    #[test]
    fn only_containers_hold_items_and_never_themselves() {
        let (mut room, bag, pouch) = lab();
        let clock = room.find("clock").unwrap();
        assert!(matches!(
            room.add_to(clock, Item::inert("x", "x").unwrap()),
            Err(Error::NotAContainer(_))
        ));
        assert!(matches!(
            room.move_item(bag, Some(Owner::Container(pouch))),
            Err(Error::ContainmentCycle { .. })
        ));
    }

    #[test]
    fn move_item_updates_owner_and_view_together() {
        let (mut room, bag, _) = lab();
        let clock = room.find("clock").unwrap();

        room.move_item(clock, Some(Owner::Container(bag))).unwrap();
        assert_eq!(room.location(clock), Some(Owner::Container(bag)));
        assert!(room.find("clock").is_none());

        room.open(bag);
        assert!(room.find("clock").is_some());

        room.move_item(clock, Some(Owner::Room)).unwrap();
        assert!(!room.contents(bag).contains(&clock));
        room.close(bag);
        assert!(room.find("clock").is_some());
    }

    #[test]
    fn removing_a_spilled_item_takes_it_out_of_its_container() {
        let (mut room, bag, pouch) = lab();
        room.open(bag);
        assert_eq!(room.remove("pouch"), Some(pouch));
        assert_eq!(room.location(pouch), None);
        assert!(room.contents(bag).is_empty());
        assert!(room.remove("pouch").is_none());
    }

    #[test]
    fn destroying_a_container_destroys_its_contents() {
        let (mut room, bag, pouch) = lab();
        let coin = room.find_anywhere("coin").unwrap();
        room.open(bag);

        assert_eq!(room.remove("bag"), Some(bag));
        for id in [bag, pouch, coin] {
            assert_eq!(room.location(id), None);
        }
        assert!(room.find_anywhere("pouch").is_none());
        assert!(room.find_anywhere("coin").is_none());
        assert_eq!(names(&room), vec!["clock"]);
        assert_eq!(room.dispatcher().handlers(), &[Handler::Room]);

        let fresh = room.add(Item::inert("coin", "a new coin").unwrap()).unwrap();
        assert_eq!(room.find_anywhere("coin"), Some(fresh));
    }

    #[test]
    fn move_to_nowhere_destroys_closed_contents_too() {
        let (mut room, bag, pouch) = lab();
        room.move_item(pouch, None).unwrap();
        assert!(room.contents(bag).is_empty());
        assert!(room.find_anywhere("coin").is_none());
        assert_eq!(room.live_items().count(), 2);
    }

    #[test]
    fn lock_state_follows_container_rules() {
        let (mut room, bag, _) = lab();
        assert!(room.lock(bag));
        assert!(!room.open(bag));
        assert!(room.unlock(bag));
        assert!(room.open(bag));
        assert!(!room.lock(bag));

        let clock = room.find("clock").unwrap();
        assert!(!room.open(clock));
    }
}
