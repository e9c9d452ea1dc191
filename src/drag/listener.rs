use std::cell::RefCell;
use std::rc::Rc;

use egui::Pos2;

use super::session::DragState;
use crate::scene::ElementId;

/// Observer of a drag gesture. Every method defaults to a no-op; override what you need.
///
/// Callbacks run synchronously on the thread driving pointer events. `on_update_location` fires
/// for every pointer move, keep it cheap. A listener must not start a new drag on the session
/// that is notifying it.
pub trait DragListener {
    fn on_start_drag(&mut self, _element: ElementId) {}

    fn on_update_location(&mut self, _touch: Pos2) {}

    fn on_release_drag(&mut self, _touch: Pos2) {}

    fn on_end_drag(&mut self) {}

    fn on_drag_state_changed(&mut self, _state: DragState) {}

    /// The element under the pointer changed. Fired at most once per frame tick.
    fn on_entered_view(&mut self, _new: Option<ElementId>, _old: Option<ElementId>, _touch: Pos2) {
    }

    fn on_exited_parent_bounds(&mut self, _touch: Pos2) {}

    fn on_entered_parent_bounds(&mut self, _touch: Pos2) {}
}

pub type SharedDragListener = Rc<RefCell<dyn DragListener>>;

/// Ordered listener set. Insertion order is notification order; the same listener (by
/// identity) is only registered once.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Vec<SharedDragListener>,
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.listeners.len())
            .finish()
    }
}

impl ListenerRegistry {
    /// Returns `false` if this exact listener is already registered.
    pub fn add(&mut self, listener: SharedDragListener) -> bool {
        if self.position(&listener).is_some() {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    pub fn remove(&mut self, listener: &SharedDragListener) -> bool {
        let Some(index) = self.position(listener) else {
            return false;
        };
        self.listeners.remove(index);
        true
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn position(&self, listener: &SharedDragListener) -> Option<usize> {
        self.listeners.iter().position(|l| Rc::ptr_eq(l, listener))
    }

    /// Notify every listener, iterating over a snapshot taken up front.
    ///
    /// A listener that is already mid-callback (re-entrant dispatch) is skipped.
    pub(crate) fn dispatch(&self, mut notify: impl FnMut(&mut dyn DragListener)) {
        let snapshot = self.listeners.clone();
        for listener in &snapshot {
            match listener.try_borrow_mut() {
                Ok(mut listener) => notify(&mut *listener),
                Err(_) => log::warn!("skipping re-entrant drag listener dispatch"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        ends: usize,
    }

    impl DragListener for Counter {
        fn on_end_drag(&mut self) {
            self.ends += 1;
        }
    }

    #[test]
    fn duplicates_are_rejected_by_identity() {
        let a = Rc::new(RefCell::new(Counter::default()));
        let b = Rc::new(RefCell::new(Counter::default()));
        let mut registry = ListenerRegistry::default();
        assert!(registry.add(a.clone()));
        assert!(!registry.add(a.clone()));
        assert!(registry.add(b.clone()));
        assert_eq!(registry.len(), 2);

        registry.dispatch(|l| l.on_end_drag());
        assert_eq!(a.borrow().ends, 1);
        assert_eq!(b.borrow().ends, 1);

        let a_dyn: SharedDragListener = a.clone();
        assert!(registry.remove(&a_dyn));
        assert!(!registry.remove(&a_dyn));
        registry.dispatch(|l| l.on_end_drag());
        assert_eq!(a.borrow().ends, 1);
        assert_eq!(b.borrow().ends, 2);
    }

    #[test]
    fn borrowed_listener_is_skipped() {
        let a = Rc::new(RefCell::new(Counter::default()));
        let mut registry = ListenerRegistry::default();
        registry.add(a.clone());

        let _held = a.borrow_mut();
        registry.dispatch(|l| l.on_end_drag());
        drop(_held);
        assert_eq!(a.borrow().ends, 0);
    }
}
