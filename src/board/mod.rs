use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use egui::{Pos2, Vec2};

mod autoscroll;
mod options;


pub use autoscroll::{AutoScrollOptions, AutoScroller, ScrollAxis};
pub use options::DragBoardOptions;

use crate::debug::{DebugLog, DiagnosticsSink, LogSink};
use crate::drag::{DragController, DragState, PointerEvent, PointerKind, SharedDragListener};
use crate::error::DragError;
use crate::frame_clock::FrameTick;
use crate::hit_test::{HitEvent, HitTester};
use crate::move_protocol::{BoardModel, BoardSlot, ItemMove, MoveRequest, move_container, move_item};
use crate::scene::{ElementId, Scene};

/// What is being dragged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DragKind {
    Item,
    Column,
}

/// Something the host has to act on after a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoardEvent {
    /// The model accepted an item move. Lay the lists out again, then notify their animators
    /// (`notify_move` for shifted items; `notify_remove` + `notify_add` across lists).
    ItemMoved { item: ElementId, mv: ItemMove },

    /// The model accepted a column move.
    ColumnMoved {
        column: ElementId,
        from: usize,
        to: usize,
    },

    /// Scroll `container`'s content by `delta` this frame.
    AutoScroll { container: ElementId, delta: Vec2 },

    /// The released element finished settling; the drag is over.
    DragSettled { element: ElementId },
}

#[derive(Clone, Copy, Debug)]
struct ActiveDrag {
    kind: DragKind,
    element: ElementId,
}

/// Drives item and column drags across a board of columns.
///
/// Owns the drag controller for a floating drag surface, the frame-synced hit tester and edge
/// autoscroll. The host owns the scene, the lists with their [`crate::ItemAnimator`]s, and the
/// [`BoardModel`]; each frame it feeds pointer events and a frame tick, then applies the returned
/// [`BoardEvent`]s.
///
/// The drag surface must be a child of the board container; columns are the board's other
/// children and items are children of their column.
pub struct DragBoard {
    options: DragBoardOptions,
    drag: DragController,
    hit: HitTester,
    autoscroll: AutoScroller,
    active: Option<ActiveDrag>,
    diagnostics: Box<dyn DiagnosticsSink>,
    debug_log: Option<Rc<RefCell<DebugLog>>>,
    frame: u64,
    last_tick: Option<Duration>,
}

impl std::fmt::Debug for DragBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragBoard")
            .field("options", &self.options)
            .field("drag", &self.drag)
            .field("hit", &self.hit)
            .field("active", &self.active)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl DragBoard {
    pub fn new(surface: ElementId, options: DragBoardOptions) -> Self {
        let mut debug_log = None;
        let diagnostics: Box<dyn DiagnosticsSink> = if options.debug_event_log {
            let log = Rc::new(RefCell::new(DebugLog::new(options.debug_event_log_capacity)));
            debug_log = Some(log.clone());
            Box::new(log)
        } else {
            Box::new(LogSink)
        };
        Self {
            drag: DragController::with_spring(surface, options.settle_spring),
            hit: HitTester::new(options.hit_test_max_depth),
            autoscroll: AutoScroller::new(options.autoscroll),
            active: None,
            diagnostics,
            debug_log,
            frame: 0,
            last_tick: None,
            options,
        }
    }

    pub fn options(&self) -> &DragBoardOptions {
        &self.options
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn hit_tester(&self) -> &HitTester {
        &self.hit
    }

    pub fn state(&self) -> DragState {
        self.drag.state()
    }

    /// The board element being dragged (not the surface standing in for it).
    pub fn active_element(&self) -> Option<ElementId> {
        self.active.map(|a| a.element)
    }

    pub fn active_kind(&self) -> Option<DragKind> {
        self.active.map(|a| a.kind)
    }

    /// The in-memory event log, when `debug_event_log` is on.
    pub fn debug_log(&self) -> Option<&Rc<RefCell<DebugLog>>> {
        self.debug_log.as_ref()
    }

    /// Replace where diagnostic events go.
    pub fn set_diagnostics(&mut self, sink: Box<dyn DiagnosticsSink>) {
        self.diagnostics = sink;
        self.debug_log = None;
    }

    pub fn add_listener(&mut self, listener: SharedDragListener) -> bool {
        self.drag.add_listener(listener)
    }

    pub fn remove_listener(&mut self, listener: &SharedDragListener) -> bool {
        self.drag.remove_listener(listener)
    }

    fn record(&mut self, message: &str) {
        self.diagnostics.record(self.frame, message);
    }

    pub fn begin_item_drag(
        &mut self,
        scene: &mut dyn Scene,
        model: &dyn BoardModel,
        item: ElementId,
    ) -> Result<(), DragError> {
        match model.locate(item) {
            Some(BoardSlot::Item { .. }) => self.begin(scene, DragKind::Item, item),
            _ => Err(DragError::UnknownElement(item)),
        }
    }

    pub fn begin_column_drag(
        &mut self,
        scene: &mut dyn Scene,
        model: &dyn BoardModel,
        column: ElementId,
    ) -> Result<(), DragError> {
        match model.locate(column) {
            Some(BoardSlot::Column { .. }) => self.begin(scene, DragKind::Column, column),
            _ => Err(DragError::UnknownElement(column)),
        }
    }

    fn begin(
        &mut self,
        scene: &mut dyn Scene,
        kind: DragKind,
        element: ElementId,
    ) -> Result<(), DragError> {
        let settling = self.drag.state() == DragState::Settling;
        let previous = self.active;
        self.drag.start_drag_from_external(scene, element)?;
        if let (true, Some(previous)) = (settling, previous) {
            self.record(&format!("drag SETTLED element={:?} (cut short)", previous.element));
        }
        self.hit.reset();
        self.last_tick = None;
        self.active = Some(ActiveDrag { kind, element });
        self.record(&format!("{kind:?} drag START element={element:?}"));
        Ok(())
    }

    /// Another element takes over for the one being dragged, e.g. the view a list created for
    /// the dragged row after it crossed into that list.
    pub fn retarget(&mut self, element: ElementId) {
        let Some(active) = &mut self.active else {
            return;
        };
        if active.element == element {
            return;
        }
        active.element = element;
        self.record(&format!("drag RETARGET element={element:?}"));
    }

    /// Feed a pointer event. Returns `true` if the drag consumed it.
    pub fn handle_pointer(&mut self, scene: &mut dyn Scene, event: PointerEvent) -> bool {
        if self.drag.state() != DragState::Dragging {
            return false;
        }
        if matches!(event.kind, PointerKind::Up | PointerKind::Cancel) {
            // Land on the slot the element occupies now, which moves may have changed.
            if let Some(rect) = self.active.and_then(|a| scene.layout_rect(a.element)) {
                self.drag.set_return_target(rect.min);
            }
            self.record(&format!(
                "drag RELEASE at ({:.1},{:.1})",
                event.pos.x, event.pos.y
            ));
        }
        self.drag.on_pointer_event(scene, event)
    }

    /// End the drag right now, without settling. Nothing from it fires afterwards.
    pub fn cancel(&mut self, scene: &mut dyn Scene) {
        if self.drag.state() == DragState::Idle {
            return;
        }
        if let Some(rect) = self.active.and_then(|a| scene.layout_rect(a.element)) {
            self.drag.set_return_target(rect.min);
        }
        self.drag.end_drag_immediately(scene);
        self.hit.reset();
        self.last_tick = None;
        if let Some(active) = self.active.take() {
            self.record(&format!("drag CANCEL element={:?}", active.element));
        }
    }

    /// Run one frame tick: hit test, ask the model about moves, autoscroll, advance the settle.
    pub fn on_frame(
        &mut self,
        scene: &mut dyn Scene,
        model: &mut dyn BoardModel,
        tick: FrameTick,
    ) -> Vec<BoardEvent> {
        self.frame = tick.frame;
        let dt = tick.delta_since(self.last_tick);
        self.last_tick = Some(tick.time);

        let mut events = Vec::new();
        if self.drag.state() == DragState::Dragging {
            if let (Some(active), Some(touch)) = (self.active, self.drag.session().current_touch()) {
                self.poll_hits(scene, model, active, touch, &mut events);
                self.autoscroll(scene, model, touch, dt, &mut events);
            }
        }

        let was_settling = self.drag.state() == DragState::Settling;
        self.drag.tick(scene, tick);
        if was_settling && self.drag.state() == DragState::Idle {
            self.hit.reset();
            self.last_tick = None;
            if let Some(active) = self.active.take() {
                self.record(&format!("drag SETTLED element={:?}", active.element));
                events.push(BoardEvent::DragSettled {
                    element: active.element,
                });
            }
        }
        events
    }

    fn poll_hits(
        &mut self,
        scene: &dyn Scene,
        model: &mut dyn BoardModel,
        active: ActiveDrag,
        touch: Pos2,
        events: &mut Vec<BoardEvent>,
    ) {
        let Some(root) = scene.parent(self.drag.surface()) else {
            return;
        };
        let excluded = [self.drag.surface(), active.element];
        let hits = self.hit.poll(scene, root, touch, &excluded);
        for hit in &hits {
            self.drag.dispatch_hit(hit);
            match *hit {
                HitEvent::EnteredView { new, .. } => {
                    let chain = self.hit.describe_chain();
                    self.record(&format!("hit ENTER {new:?} chain: {chain}"));
                    if new.is_some() {
                        self.try_move(model, active, events);
                    }
                }
                HitEvent::ExitedParentBounds { .. } => self.record("hit EXIT board"),
                HitEvent::EnteredParentBounds { .. } => self.record("hit ENTER board"),
            }
        }
    }

    /// Turn the current hit chain into a move proposal for the model.
    fn try_move(&mut self, model: &mut dyn BoardModel, active: ActiveDrag, events: &mut Vec<BoardEvent>) {
        let source = model.locate(active.element);
        match active.kind {
            DragKind::Item => {
                let (source_column, source_item) = match source {
                    Some(BoardSlot::Item { column, item }) => (Some(column), Some(item)),
                    _ => (None, None),
                };
                let (target_column, target_item) = match self.hit.target().and_then(|t| model.locate(t)) {
                    Some(BoardSlot::Item { column, item }) => (Some(column), Some(item)),
                    // Empty area of another column: append.
                    Some(BoardSlot::Column { column }) if Some(column) != source_column => {
                        (Some(column), Some(model.item_count(column)))
                    }
                    _ => return,
                };
                let request = MoveRequest::new(source_column, source_item, target_column, target_item);
                let accepted = move_item(model, request);
                self.record(&format!("move item {request:?}: accepted={accepted}"));
                if accepted {
                    if let Ok(mv) = request.validate() {
                        events.push(BoardEvent::ItemMoved {
                            item: active.element,
                            mv,
                        });
                    }
                }
            }
            DragKind::Column => {
                let from = match source {
                    Some(BoardSlot::Column { column }) => Some(column),
                    _ => None,
                };
                // The outermost pick is the column (or whatever the board holds at that depth).
                let to = self.hit.chain().iter().find_map(|&id| match model.locate(id) {
                    Some(BoardSlot::Column { column } | BoardSlot::Item { column, .. }) => Some(column),
                    None => None,
                });
                if to.is_none() || from == to {
                    return;
                }
                let accepted = move_container(model, from, to);
                self.record(&format!("move column {from:?} -> {to:?}: accepted={accepted}"));
                if let (true, Some(from), Some(to)) = (accepted, from, to) {
                    events.push(BoardEvent::ColumnMoved {
                        column: active.element,
                        from,
                        to,
                    });
                }
            }
        }
    }

    fn autoscroll(
        &mut self,
        scene: &dyn Scene,
        model: &dyn BoardModel,
        touch: Pos2,
        dt: Duration,
        events: &mut Vec<BoardEvent>,
    ) {
        let Some(root) = scene.parent(self.drag.surface()) else {
            return;
        };
        let mut targets = vec![(root, ScrollAxis::Horizontal)];
        if self.active_kind() == Some(DragKind::Item) {
            let column = self
                .hit
                .chain()
                .iter()
                .copied()
                .find(|&id| matches!(model.locate(id), Some(BoardSlot::Column { .. })));
            targets.extend(column.map(|c| (c, ScrollAxis::Vertical)));
        }
        for (container, axis) in targets {
            let Some(rect) = scene.painted_rect(container) else {
                continue;
            };
            let delta = self.autoscroll.delta(rect, touch, axis, dt);
            if delta != Vec2::ZERO {
                log::trace!("autoscroll {container:?} by ({:.1},{:.1})", delta.x, delta.y);
                events.push(BoardEvent::AutoScroll { container, delta });
            }
        }
    }
}
