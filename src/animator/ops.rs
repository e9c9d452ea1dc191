use std::cell::RefCell;
use std::rc::Rc;

use egui::Pos2;

use crate::scene::ElementId;

/// The four animation categories, in the order a pass runs them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AnimationKind {
    Remove,
    Move,
    Change,
    Add,
}

impl AnimationKind {
    pub const ALL: [Self; 4] = [Self::Remove, Self::Move, Self::Change, Self::Add];
}

impl std::fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Remove => "remove",
            Self::Move => "move",
            Self::Change => "change",
            Self::Add => "add",
        };
        f.write_str(name)
    }
}

/// Observer of an [`super::ItemAnimator`]. Every method defaults to a no-op.
///
/// `*_starting` fires when the element's batch actually starts, `*_finished` when it completes
/// naturally or is forced to completion by `end_animation(s)`. An operation that is ended before
/// its batch starts only gets the finished callback.
pub trait AnimationListener {
    fn on_add_starting(&mut self, _id: ElementId) {}

    fn on_add_finished(&mut self, _id: ElementId) {}

    fn on_remove_starting(&mut self, _id: ElementId) {}

    fn on_remove_finished(&mut self, _id: ElementId) {}

    fn on_move_starting(&mut self, _id: ElementId) {}

    fn on_move_finished(&mut self, _id: ElementId) {}

    /// `old_side` tells the outgoing element of a change from the incoming one.
    fn on_change_starting(&mut self, _id: ElementId, _old_side: bool) {}

    fn on_change_finished(&mut self, _id: ElementId, _old_side: bool) {}

    /// The animator went from running to idle.
    fn on_animations_finished(&mut self) {}
}

pub type SharedAnimationListener = Rc<RefCell<dyn AnimationListener>>;

/// One queued operation. Geometry is in scene coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum PendingOp {
    Add {
        id: ElementId,
        /// Bookkept with zero duration and no fade (the dragged insertion).
        instant: bool,
    },
    Remove {
        id: ElementId,
        instant: bool,
    },
    Move {
        id: ElementId,
        from: Pos2,
        to: Pos2,
    },
    Change {
        old: ElementId,
        new: Option<ElementId>,
        from: Pos2,
        to: Pos2,
    },
}

impl PendingOp {
    pub(super) fn kind(&self) -> AnimationKind {
        match self {
            Self::Add { .. } => AnimationKind::Add,
            Self::Remove { .. } => AnimationKind::Remove,
            Self::Move { .. } => AnimationKind::Move,
            Self::Change { .. } => AnimationKind::Change,
        }
    }

    pub(super) fn involves(&self, element: ElementId) -> bool {
        match *self {
            Self::Add { id, .. } | Self::Remove { id, .. } | Self::Move { id, .. } => id == element,
            Self::Change { old, new, .. } => old == element || new == Some(element),
        }
    }

    /// Every element this op touches, paired with its change side (`true` for the old one).
    pub(super) fn sides(&self) -> impl Iterator<Item = (ElementId, bool)> {
        let (first, second) = match *self {
            Self::Add { id, .. } | Self::Remove { id, .. } | Self::Move { id, .. } => {
                ((id, false), None)
            }
            Self::Change { old, new, .. } => ((old, true), new.map(|new| (new, false))),
        };
        std::iter::once(first).chain(second)
    }
}

/// Listener slot shared by the animator and its helpers.
#[derive(Clone, Default)]
pub(super) struct ListenerSlot(Option<SharedAnimationListener>);

impl ListenerSlot {
    pub(super) fn set(&mut self, listener: Option<SharedAnimationListener>) {
        self.0 = listener;
    }

    pub(super) fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub(super) fn notify(&self, f: impl FnOnce(&mut dyn AnimationListener)) {
        let Some(listener) = &self.0 else {
            return;
        };
        match listener.try_borrow_mut() {
            Ok(mut listener) => f(&mut *listener),
            Err(_) => log::warn!("skipping re-entrant animation listener dispatch"),
        }
    }

    pub(super) fn starting(&self, kind: AnimationKind, id: ElementId, old_side: bool) {
        self.notify(|l| match kind {
            AnimationKind::Add => l.on_add_starting(id),
            AnimationKind::Remove => l.on_remove_starting(id),
            AnimationKind::Move => l.on_move_starting(id),
            AnimationKind::Change => l.on_change_starting(id, old_side),
        });
    }

    pub(super) fn finished(&self, kind: AnimationKind, id: ElementId, old_side: bool) {
        self.notify(|l| match kind {
            AnimationKind::Add => l.on_add_finished(id),
            AnimationKind::Remove => l.on_remove_finished(id),
            AnimationKind::Move => l.on_move_finished(id),
            AnimationKind::Change => l.on_change_finished(id, old_side),
        });
    }
}
