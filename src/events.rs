//! Grid notifications and the observer registry
//!
//! Observers are called synchronously, in registration order, at the end
//! of the operation that produced the event. Delivery is at-least-once:
//! a combined column + row selection change posts one event per axis.

use crate::index_set::IndexSet;

#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    SelectionChanged,
    ColumnsMoved { old: IndexSet, new: IndexSet },
    RowsMoved { old: IndexSet, new: IndexSet },
    ColumnResized { column: usize, width: f64 },
    RowsAdded(IndexSet),
    RowsRemoved(IndexSet),
    SortChanged { column: Option<usize>, ascending: bool },
    /// Counts or contents changed underneath the grid
    Reloaded,
}

/// Handle returned by [`Observers::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Callback = Box<dyn FnMut(&GridEvent)>;

#[derive(Default)]
pub struct Observers {
    next_id: u64,
    callbacks: Vec<(ObserverId, Callback)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&GridEvent) + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the id was not registered
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn emit(&mut self, event: &GridEvent) {
        tracing::trace!(?event, observers = self.callbacks.len(), "emit");
        for (_, callback) in self.callbacks.iter_mut() {
            callback(event);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::new();

        let first = log.clone();
        observers.subscribe(move |_| first.borrow_mut().push(1));
        let second = log.clone();
        observers.subscribe(move |_| second.borrow_mut().push(2));

        observers.emit(&GridEvent::SelectionChanged);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut observers = Observers::new();
        let counter = count.clone();
        let id = observers.subscribe(move |_| *counter.borrow_mut() += 1);

        observers.emit(&GridEvent::Reloaded);
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.emit(&GridEvent::Reloaded);

        assert_eq!(*count.borrow(), 1);
        assert!(observers.is_empty());
    }
}
