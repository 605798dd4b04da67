use std::collections::HashSet;

use crate::model::{Category, Event};

/// Select the events of `batch` that should be attached to `category`.
///
/// An event qualifies when it is listed under the category and its id is not
/// already attached. The result is ordered by date, ascending; events with
/// equal dates keep their batch order. A batch that repeats an id yields it
/// once.
pub fn filtered_events(batch: &[Event], category: &Category) -> Vec<Event> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut selected: Vec<Event> = batch
        .iter()
        .filter(|event| event.belongs_to(&category.id))
        .filter(|event| !category.contains_event(&event.id))
        .filter(|event| seen.insert(event.id.as_str()))
        .cloned()
        .collect();
    selected.sort_by_key(|event| event.date);
    selected
}

/// Fold one batch into every category, returning how many attachments were made.
///
/// Every category is offered every batch, so an event listed under several
/// categories lands in each of them regardless of which fetch returned it.
pub(super) fn fold_batch(categories: &mut [Category], batch: &[Event]) -> usize {
    let mut attached = 0;
    for category in categories.iter_mut() {
        let selected = filtered_events(batch, category);
        attached += selected.len();
        category.events.extend(selected);
    }
    attached
}
