//! Drag-and-drop and list animation coordination for Kanban-style boards built on `egui`.
//!
//! The crate doesn't draw anything. The host owns the board model, the list views and the
//! element geometry ([`Scene`]); this crate tells it where the dragged card is, where it would
//! land, when to move it in the model, and how to animate the lists while it happens.

#![forbid(unsafe_code)]

pub mod animator;
pub mod board;
pub mod debug;
pub mod drag;
pub mod error;
pub mod frame_clock;
pub mod move_protocol;
pub mod overscroll;
pub mod scene;
pub mod spring;

pub use animator::{
    AnimationKind, AnimationListener, AnimatorOptions, ItemAnimator, SharedAnimationListener,
};
pub use board::{
    AutoScrollOptions, AutoScroller, BoardEvent, DragBoard, DragBoardOptions, DragKind,
    ScrollAxis,
};
pub use debug::{DebugLog, DiagnosticsSink, LogSink};
pub use drag::{
    DragController, DragListener, DragSession, DragState, ListenerRegistry, PointerCapture,
    PointerEvent, PointerKind, SharedDragListener,
};
pub use error::{DragError, InvalidPosition};
pub use frame_clock::{EguiFrameClock, FrameClock, FrameTick, MAX_FRAME_DELTA, ManualFrameClock};
pub use hit_test::{HitEvent, HitTester};
pub use move_protocol::{
    BoardModel, BoardSlot, ItemMove, MoveRequest, Position, apply_container_move,
    apply_item_move, move_container, move_item,
};
pub use overscroll::Overscroll;
pub use scene::{ElementId, Scene, SceneGraph, SnapshotId, is_descendant_of};
pub use spring::{Spring, SpringParams};

#[cfg(feature = "persistence")]
pub use error::OptionsError;
