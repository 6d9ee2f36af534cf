//! Ordering and dependency bookkeeping shared by tasks and phases.
//!
//! Collections are kept in sequence order on disk, so the position of an
//! entity in its `Vec` is always `sequence - 1`. Reordering moves entities
//! and rewrites `sequence`; IDs never change.

use crate::models::{Phase, Task};

/// An entity with a stable ID, a 1-based position and same-collection
/// dependencies.
pub trait Sequenced {
    fn id(&self) -> &str;
    fn sequence(&self) -> u32;
    fn set_sequence(&mut self, sequence: u32);
    fn depends_on(&self) -> &[String];
    fn depends_on_mut(&mut self) -> &mut Vec<String>;
}

impl Sequenced for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn sequence(&self) -> u32 {
        self.sequence
    }

    fn set_sequence(&mut self, sequence: u32) {
        self.sequence = sequence;
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    fn depends_on_mut(&mut self) -> &mut Vec<String> {
        &mut self.depends_on
    }
}

impl Sequenced for Phase {
    fn id(&self) -> &str {
        &self.id
    }

    fn sequence(&self) -> u32 {
        self.sequence
    }

    fn set_sequence(&mut self, sequence: u32) {
        self.sequence = sequence;
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    fn depends_on_mut(&mut self) -> &mut Vec<String> {
        &mut self.depends_on
    }
}

/// Index of the entity with `id`, if present.
pub fn position_of<T: Sequenced>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Rewrites every `sequence` to its positional index, starting at 1.
pub fn renumber<T: Sequenced>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_sequence(index as u32 + 1);
    }
}

/// Puts `items` into sequence order and renumbers them, repairing gaps or
/// duplicates in a document written by an older or interrupted writer.
pub fn normalize<T: Sequenced>(items: &mut [T]) {
    items.sort_by_key(|item| item.sequence());
    renumber(items);
}

/// Moves the entity at 1-based position `from` to 1-based position `to`.
///
/// `to` is clamped to `[1, N]`. Returns `false` without touching the
/// collection when `from` is out of range or the move is a no-op.
pub fn move_to_position<T: Sequenced>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    let len = items.len();
    if from == 0 || from > len {
        return false;
    }
    let to = to.clamp(1, len);
    if from == to {
        return false;
    }
    let item = items.remove(from - 1);
    items.insert(to - 1, item);
    renumber(items);
    true
}

/// Removes the entity with `id`, renumbers the rest and strips `id` from
/// every remaining dependency list. Returns the removed entity.
pub fn remove_and_cleanup<T: Sequenced>(items: &mut Vec<T>, id: &str) -> Option<T> {
    let index = position_of(items, id)?;
    let removed = items.remove(index);
    renumber(items);
    for item in items.iter_mut() {
        item.depends_on_mut().retain(|dep| dep != id);
    }
    Some(removed)
}

/// First dependency in `depends_on` that does not name an entity of
/// `items`, or that names `self_id`.
pub fn find_invalid_dependency<'a, T: Sequenced>(
    items: &[T],
    self_id: Option<&str>,
    depends_on: &'a [String],
) -> Option<&'a str> {
    depends_on
        .iter()
        .find(|dep| Some(dep.as_str()) == self_id || position_of(items, dep).is_none())
        .map(String::as_str)
}
