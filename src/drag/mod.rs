use std::time::Duration;

use egui::{Pos2, Rect};

mod input;
mod listener;
mod session;


pub use input::{PointerCapture, PointerEvent, PointerKind};
pub use listener::{DragListener, ListenerRegistry, SharedDragListener};
pub use session::{DragSession, DragState};

use crate::error::DragError;
use crate::frame_clock::FrameTick;
use crate::hit_test::HitEvent;
use crate::scene::{ElementId, Scene, is_descendant_of};
use crate::spring::{Spring, SpringParams};

/// Pointer-driven drag state machine for one draggable surface.
///
/// Lifecycle: `Idle → Dragging` on grab, `Dragging → Settling` on release, `Settling → Idle` once
/// the settle spring comes to rest. Only one gesture exists at a time.
///
/// Two ways to drag:
/// - [`Self::start_drag`]: the grabbed element itself follows the pointer.
/// - [`Self::start_drag_from_external`]: a dedicated surface (a shadow/mirror) is laid over the
///   touched element and follows the pointer instead.
#[derive(Debug)]
pub struct DragController {
    surface: ElementId,
    session: DragSession,
    listeners: ListenerRegistry,
    capture: PointerCapture,
    settle: Option<SettleSpring>,
    spring_params: SpringParams,
    last_tick: Option<Duration>,
    next_gesture_id: u64,
}

#[derive(Clone, Copy, Debug)]
struct SettleSpring {
    x: Spring,
    y: Spring,
}

impl SettleSpring {
    fn new(from: Pos2, to: Pos2, params: SpringParams) -> Self {
        Self {
            x: Spring::new(from.x, to.x, params),
            y: Spring::new(from.y, to.y, params),
        }
    }

    fn set_target(&mut self, to: Pos2) {
        self.x.set_target(to.x);
        self.y.set_target(to.y);
    }

    fn advance(&mut self, dt: Duration) {
        self.x.advance(dt);
        self.y.advance(dt);
    }

    fn position(&self) -> Pos2 {
        Pos2::new(self.x.position(), self.y.position())
    }

    fn is_at_rest(&self) -> bool {
        self.x.is_at_rest() && self.y.is_at_rest()
    }
}

impl DragController {
    /// `surface` is the element laid over the touched element for shadow drags.
    pub fn new(surface: ElementId) -> Self {
        Self::with_spring(surface, SpringParams::default())
    }

    pub fn with_spring(surface: ElementId, spring_params: SpringParams) -> Self {
        Self {
            surface,
            session: DragSession::default(),
            listeners: ListenerRegistry::default(),
            capture: PointerCapture::default(),
            settle: None,
            spring_params,
            last_tick: None,
            next_gesture_id: 1,
        }
    }

    pub fn surface(&self) -> ElementId {
        self.surface
    }

    pub fn state(&self) -> DragState {
        self.session.state
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn capture(&self) -> &PointerCapture {
        &self.capture
    }

    pub fn spring_params(&self) -> SpringParams {
        self.spring_params
    }

    pub fn set_spring_params(&mut self, params: SpringParams) {
        self.spring_params = params;
    }

    pub fn add_listener(&mut self, listener: SharedDragListener) -> bool {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, listener: &SharedDragListener) -> bool {
        self.listeners.remove(listener)
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Grab `element`: it follows the pointer until released, then springs back to where it was.
    pub fn start_drag(&mut self, scene: &mut dyn Scene, element: ElementId) -> Result<(), DragError> {
        self.check_can_grab(element)?;
        if scene.layout_rect(element).is_none() {
            return Err(DragError::UnknownElement(element));
        }
        self.finish_pending_settle(scene);
        // Re-read: finishing a settle may have moved the element.
        let rect = scene
            .layout_rect(element)
            .ok_or(DragError::UnknownElement(element))?;
        let origin = scene.painted_rect(element).unwrap_or(rect).min;
        self.begin(element, None, origin, rect.min);
        Ok(())
    }

    /// Shadow drag: lay the surface exactly over `source` and drag the surface.
    ///
    /// `source` must live under the surface's parent.
    pub fn start_drag_from_external(
        &mut self,
        scene: &mut dyn Scene,
        source: ElementId,
    ) -> Result<(), DragError> {
        self.check_can_grab(self.surface)?;
        let ancestor = scene.parent(self.surface);
        let inside = match ancestor {
            Some(ancestor) => is_descendant_of(&*scene, source, ancestor),
            None => false,
        };
        if !inside {
            return Err(DragError::InvalidHierarchy {
                element: source,
                ancestor,
            });
        }
        let painted = scene
            .painted_rect(source)
            .ok_or(DragError::UnknownElement(source))?;
        let layout = scene.layout_rect(source).unwrap_or(painted);
        self.finish_pending_settle(scene);

        scene.set_rect(self.surface, painted);
        scene.set_translation(self.surface, egui::Vec2::ZERO);
        let snapshot = scene.snapshot(source);
        self.begin(self.surface, Some(source), painted.min, layout.min);
        self.session.snapshot = snapshot;
        Ok(())
    }

    fn check_can_grab(&self, element: ElementId) -> Result<(), DragError> {
        if self.session.state == DragState::Dragging {
            log::warn!(
                "refusing to grab {element:?}: gesture {} still dragging {:?}",
                self.session.id,
                self.session.dragged
            );
            return Err(DragError::DoubleGrab {
                element: self.session.dragged.unwrap_or(element),
            });
        }
        Ok(())
    }

    /// A new grab while the previous gesture is still settling completes that settle first.
    fn finish_pending_settle(&mut self, scene: &mut dyn Scene) {
        if self.session.state == DragState::Settling {
            self.finish_settle(scene);
        }
    }

    fn begin(
        &mut self,
        dragged: ElementId,
        source: Option<ElementId>,
        origin: Pos2,
        return_point: Pos2,
    ) {
        let id = self.next_gesture_id;
        self.next_gesture_id = id.saturating_add(1);
        self.session = DragSession::begin(id, dragged, source, origin, return_point);
        self.settle = None;
        self.last_tick = None;
        self.capture.claim(dragged);
        log::debug!("drag START id={id} dragged={dragged:?} source={source:?}");

        self.listeners
            .dispatch(|l| l.on_drag_state_changed(DragState::Dragging));
        self.listeners.dispatch(|l| l.on_start_drag(dragged));
    }

    /// Feed a pointer event. Returns `true` if the gesture consumed it.
    pub fn on_pointer_event(&mut self, scene: &mut dyn Scene, event: PointerEvent) -> bool {
        if self.session.state != DragState::Dragging {
            return false;
        }
        let Some(dragged) = self.session.dragged else {
            return false;
        };

        match event.kind {
            PointerKind::Down => {
                // Duplicate downs are common after a grab; only the first one anchors the offset.
                if self.session.delta_offset.is_none() {
                    self.capture_offset(scene, dragged, event.pos);
                }
                self.session.current_touch = Some(event.pos);
            }
            PointerKind::Move => {
                if self.session.delta_offset.is_none() {
                    self.capture_offset(scene, dragged, event.pos);
                }
                let offset = self.session.delta_offset.unwrap_or_default();
                scene.set_position(dragged, event.pos + offset);
                self.session.current_touch = Some(event.pos);
                let touch = event.pos;
                self.listeners.dispatch(|l| l.on_update_location(touch));
            }
            PointerKind::Up | PointerKind::Cancel => {
                self.session.current_touch = Some(event.pos);
                self.end_drag(scene);
            }
        }
        true
    }

    fn capture_offset(&mut self, scene: &dyn Scene, dragged: ElementId, pointer: Pos2) {
        let surface_pos = scene
            .layout_rect(dragged)
            .map_or(self.session.origin, |r| r.min);
        self.session.delta_offset = Some(surface_pos - pointer);
    }

    /// Release: start springing back to the return point.
    pub fn end_drag(&mut self, scene: &mut dyn Scene) {
        if self.session.state != DragState::Dragging {
            return;
        }
        let from = self.surface_position(scene);
        self.release(from);
        self.settle = Some(SettleSpring::new(
            from,
            self.session.return_point,
            self.spring_params,
        ));
    }

    /// Release and complete synchronously, without a settle animation.
    ///
    /// Nothing from the cancelled gesture fires after this returns.
    pub fn end_drag_immediately(&mut self, scene: &mut dyn Scene) {
        match self.session.state {
            DragState::Idle => {}
            DragState::Dragging => {
                let from = self.surface_position(scene);
                self.release(from);
                self.finish_settle(scene);
            }
            DragState::Settling => self.finish_settle(scene),
        }
    }

    fn release(&mut self, from: Pos2) {
        self.session.state = DragState::Settling;
        // The settle starts on the next tick, whenever that comes.
        self.last_tick = None;
        let touch = self.session.current_touch.unwrap_or(from);
        log::debug!(
            "drag RELEASE id={} touch=({:.1},{:.1}) return=({:.1},{:.1})",
            self.session.id,
            touch.x,
            touch.y,
            self.session.return_point.x,
            self.session.return_point.y
        );
        self.listeners
            .dispatch(|l| l.on_drag_state_changed(DragState::Settling));
        self.listeners.dispatch(|l| l.on_release_drag(touch));
    }

    fn finish_settle(&mut self, scene: &mut dyn Scene) {
        if let Some(dragged) = self.session.dragged {
            scene.set_position(dragged, self.session.return_point);
        }
        let id = self.session.id;
        self.settle = None;
        self.capture.release();
        self.session = DragSession::default();
        log::debug!("drag END id={id}");

        self.listeners
            .dispatch(|l| l.on_drag_state_changed(DragState::Idle));
        self.listeners.dispatch(|l| l.on_end_drag());
    }

    /// Land the settle somewhere else, e.g. the slot the item was moved to during the drag.
    pub fn set_return_target(&mut self, point: Pos2) {
        self.session.return_point = point;
        if let Some(settle) = &mut self.settle {
            settle.set_target(point);
        }
    }

    /// Advance the settle spring. Call once per frame tick.
    pub fn tick(&mut self, scene: &mut dyn Scene, tick: FrameTick) {
        let dt = tick.delta_since(self.last_tick);
        self.last_tick = Some(tick.time);

        if self.session.state != DragState::Settling {
            return;
        }
        let Some(settle) = &mut self.settle else {
            self.finish_settle(scene);
            return;
        };
        settle.advance(dt);
        let pos = settle.position();
        let done = settle.is_at_rest();
        if let Some(dragged) = self.session.dragged {
            scene.set_position(dragged, pos);
        }
        if done {
            self.finish_settle(scene);
        }
    }

    /// Forward a hit-test result to the listeners.
    pub(crate) fn dispatch_hit(&self, event: &HitEvent) {
        match *event {
            HitEvent::EnteredView { new, old, touch } => {
                self.listeners
                    .dispatch(|l| l.on_entered_view(new, old, touch));
            }
            HitEvent::ExitedParentBounds { touch } => {
                self.listeners.dispatch(|l| l.on_exited_parent_bounds(touch));
            }
            HitEvent::EnteredParentBounds { touch } => {
                self.listeners
                    .dispatch(|l| l.on_entered_parent_bounds(touch));
            }
        }
    }

    fn surface_position(&self, scene: &dyn Scene) -> Pos2 {
        self.session
            .dragged
            .and_then(|d| scene.layout_rect(d))
            .map_or(self.session.origin, |r: Rect| r.min)
    }
}
