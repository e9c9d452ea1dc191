use egui::{Pos2, Vec2};

use crate::scene::{ElementId, SnapshotId};

/// Lifecycle of a drag gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DragState {
    #[default]
    Idle,
    Dragging,

    /// Released; the surface is springing back to its return point.
    Settling,
}

/// Everything known about the gesture in flight. Reset to default once the settle completes.
#[derive(Clone, Copy, Debug, Default)]
pub struct DragSession {
    pub(super) id: u64,
    pub(super) dragged: Option<ElementId>,
    pub(super) source: Option<ElementId>,
    pub(super) origin: Pos2,
    pub(super) current_touch: Option<Pos2>,
    pub(super) delta_offset: Option<Vec2>,
    pub(super) return_point: Pos2,
    pub(super) state: DragState,
    pub(super) steal_events: bool,
    pub(super) snapshot: Option<SnapshotId>,
}

impl DragSession {
    pub(super) fn begin(
        id: u64,
        dragged: ElementId,
        source: Option<ElementId>,
        origin: Pos2,
        return_point: Pos2,
    ) -> Self {
        Self {
            id,
            dragged: Some(dragged),
            source,
            origin,
            current_touch: None,
            delta_offset: None,
            return_point,
            state: DragState::Dragging,
            steal_events: true,
            snapshot: None,
        }
    }

    /// Serial of the gesture, 0 when idle.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// The element that moves with the pointer (the surface for shadow drags).
    pub fn dragged(&self) -> Option<ElementId> {
        self.dragged
    }

    /// The element the user actually touched, when it differs from the dragged surface.
    pub fn source(&self) -> Option<ElementId> {
        self.source
    }

    pub fn origin(&self) -> Pos2 {
        self.origin
    }

    pub fn current_touch(&self) -> Option<Pos2> {
        self.current_touch
    }

    pub fn delta_offset(&self) -> Option<Vec2> {
        self.delta_offset
    }

    pub fn return_point(&self) -> Pos2 {
        self.return_point
    }

    /// Mirror of the touched element captured for a shadow drag, if the render layer made one.
    pub fn snapshot(&self) -> Option<SnapshotId> {
        self.snapshot
    }

    /// True while the gesture owns all pointer input.
    pub fn steals_events(&self) -> bool {
        self.steal_events
    }
}
