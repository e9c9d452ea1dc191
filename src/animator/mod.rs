use std::time::Duration;

use egui::Pos2;

mod ops;
mod options;
mod timeline;

#[cfg(test)]
mod animator_tests;

pub use ops::{AnimationKind, AnimationListener, SharedAnimationListener};
pub use options::AnimatorOptions;

use crate::frame_clock::FrameTick;
use crate::scene::{ElementId, Scene};
use ops::{ListenerSlot, PendingOp};
use timeline::{ScheduledBatch, Track, apply_start_pose, same_slot, snap_to_rest};

/// Batches structural changes of one list into staggered animations.
///
/// The list calls `notify_*` right after mutating its backing data, then
/// [`Self::run_pending_animations`] once the layout pass is done, then [`Self::on_frame`] every
/// frame tick. A pass runs in three waves:
///
/// 1. removals, immediately;
/// 2. moves and changes together, once the removals are done;
/// 3. additions, once everything else is done.
///
/// Each wave drains its queue into a batch when the pass is run, so operations notified while a
/// batch is waiting or running go into the next pass.
///
/// An element takes part in at most one animation: notifying anything for an element first
/// forces whatever it was doing to completion.
pub struct ItemAnimator {
    options: AnimatorOptions,
    pending_removals: Vec<PendingOp>,
    pending_moves: Vec<PendingOp>,
    pending_changes: Vec<PendingOp>,
    pending_adds: Vec<PendingOp>,
    scheduled: Vec<ScheduledBatch>,
    running: Vec<Track>,
    dragged_insertion: Option<Box<dyn FnOnce(ElementId)>>,
    listener: ListenerSlot,
}

impl std::fmt::Debug for ItemAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemAnimator")
            .field("options", &self.options)
            .field("pending_removals", &self.pending_removals.len())
            .field("pending_moves", &self.pending_moves.len())
            .field("pending_changes", &self.pending_changes.len())
            .field("pending_adds", &self.pending_adds.len())
            .field("scheduled", &self.scheduled.len())
            .field("running", &self.running.len())
            .field("dragged_insertion", &self.dragged_insertion.is_some())
            .field("listener", &self.listener.is_set())
            .finish()
    }
}

impl Default for ItemAnimator {
    fn default() -> Self {
        Self::new(AnimatorOptions::default())
    }
}

impl ItemAnimator {
    pub fn new(options: AnimatorOptions) -> Self {
        Self {
            options,
            pending_removals: Vec::new(),
            pending_moves: Vec::new(),
            pending_changes: Vec::new(),
            pending_adds: Vec::new(),
            scheduled: Vec::new(),
            running: Vec::new(),
            dragged_insertion: None,
            listener: ListenerSlot::default(),
        }
    }

    pub fn options(&self) -> &AnimatorOptions {
        &self.options
    }

    /// Takes effect for batches scheduled after this call.
    pub fn set_options(&mut self, options: AnimatorOptions) {
        self.options = options;
    }

    pub fn set_listener(&mut self, listener: Option<SharedAnimationListener>) {
        self.listener.set(listener);
    }

    pub fn duration(&self, kind: AnimationKind) -> Duration {
        match kind {
            AnimationKind::Add => self.options.add_duration,
            AnimationKind::Remove => self.options.remove_duration,
            AnimationKind::Move => self.options.move_duration,
            AnimationKind::Change => self.options.change_duration,
        }
    }

    /// The next [`Self::notify_add`] hands its element to `on_inserted` and is bookkept with zero
    /// duration and no fade.
    ///
    /// Used when a drag crosses into this list: the inserted element takes over from the drag
    /// surface, so it must not fade in.
    pub fn mark_next_insertion_as_dragged(&mut self, on_inserted: impl FnOnce(ElementId) + 'static) {
        self.dragged_insertion = Some(Box::new(on_inserted));
    }

    pub fn has_dragged_insertion(&self) -> bool {
        self.dragged_insertion.is_some()
    }

    pub fn notify_add(&mut self, scene: &mut dyn Scene, id: ElementId) -> bool {
        self.force_complete(scene, id);
        let instant = match self.dragged_insertion.take() {
            Some(on_inserted) => {
                on_inserted(id);
                true
            }
            None => false,
        };
        let op = PendingOp::Add { id, instant };
        apply_start_pose(scene, &op);
        self.pending_adds.push(op);
        log::trace!("animator: queued add {id:?} instant={instant}");
        true
    }

    pub fn notify_remove(&mut self, scene: &mut dyn Scene, id: ElementId) -> bool {
        self.force_complete(scene, id);
        self.pending_removals.push(PendingOp::Remove { id, instant: false });
        log::trace!("animator: queued remove {id:?}");
        true
    }

    /// `from` is where the element is painted now, `to` its new layout position.
    ///
    /// Returns `false` when there is nothing to animate; the move is finished synchronously.
    pub fn notify_move(&mut self, scene: &mut dyn Scene, id: ElementId, from: Pos2, to: Pos2) -> bool {
        let was_running = self.is_running();
        self.force_complete(scene, id);
        if same_slot(from, to) {
            snap_to_rest(scene, id);
            self.listener.finished(AnimationKind::Move, id, false);
            self.notify_if_became_idle(was_running);
            return false;
        }
        let op = PendingOp::Move { id, from, to };
        apply_start_pose(scene, &op);
        self.pending_moves.push(op);
        log::trace!("animator: queued move {id:?} ({:.1},{:.1}) -> ({:.1},{:.1})", from.x, from.y, to.x, to.y);
        true
    }

    /// Cross-fade `old` out and `new` in. `new == Some(old)` is a plain move.
    pub fn notify_change(
        &mut self,
        scene: &mut dyn Scene,
        old: ElementId,
        new: Option<ElementId>,
        from: Pos2,
        to: Pos2,
    ) -> bool {
        if new == Some(old) {
            return self.notify_move(scene, old, from, to);
        }
        self.force_complete(scene, old);
        if let Some(new) = new {
            self.force_complete(scene, new);
        }
        let op = PendingOp::Change { old, new, from, to };
        apply_start_pose(scene, &op);
        self.pending_changes.push(op);
        log::trace!("animator: queued change {old:?} -> {new:?}");
        true
    }

    /// Schedule everything queued so far. Call once per layout pass, after the `notify_*` calls.
    pub fn run_pending_animations(&mut self, scene: &mut dyn Scene, now: Duration) {
        let removals = !self.pending_removals.is_empty();
        let moves = !self.pending_moves.is_empty();
        let changes = !self.pending_changes.is_empty();
        let adds = !self.pending_adds.is_empty();
        if !removals && !moves && !changes && !adds {
            return;
        }

        if removals && moves && self.options.fake_removals_under_moves {
            self.fake_removals_under_moves(scene);
        }

        let remove_delay = if removals { self.options.remove_duration } else { Duration::ZERO };
        let move_delay = if moves { self.options.move_duration } else { Duration::ZERO };
        let change_delay = if changes { self.options.change_duration } else { Duration::ZERO };
        let add_at = now + remove_delay + move_delay.max(change_delay);

        log::debug!(
            "animator pass at {:.3}s: {} removals, {} moves, {} changes, {} adds (adds at {:.3}s)",
            now.as_secs_f32(),
            self.pending_removals.len(),
            self.pending_moves.len(),
            self.pending_changes.len(),
            self.pending_adds.len(),
            add_at.as_secs_f32()
        );

        let batches = [
            (AnimationKind::Remove, now, std::mem::take(&mut self.pending_removals)),
            (AnimationKind::Move, now + remove_delay, std::mem::take(&mut self.pending_moves)),
            (AnimationKind::Change, now + remove_delay, std::mem::take(&mut self.pending_changes)),
            (AnimationKind::Add, add_at, std::mem::take(&mut self.pending_adds)),
        ];
        for (kind, start_at, ops) in batches {
            if !ops.is_empty() {
                self.scheduled.push(ScheduledBatch { kind, start_at, ops });
            }
        }

        self.start_due_batches(now);
        self.advance(scene, now);
    }

    /// Removed elements still occupying a slot a move is heading for complete instantly.
    fn fake_removals_under_moves(&mut self, scene: &dyn Scene) {
        let targets: Vec<Pos2> = self
            .pending_moves
            .iter()
            .filter_map(|op| match *op {
                PendingOp::Move { to, .. } => Some(to),
                _ => None,
            })
            .collect();
        for op in &mut self.pending_removals {
            if let PendingOp::Remove { id, instant } = op {
                let occupied = scene
                    .layout_rect(*id)
                    .is_some_and(|rect| targets.iter().any(|&to| same_slot(rect.min, to)));
                if occupied {
                    log::debug!("animator: removal of {id:?} overlaps a move target, completing instantly");
                    *instant = true;
                }
            }
        }
    }

    /// Advance every animation to `tick.time`. Call once per frame tick.
    pub fn on_frame(&mut self, scene: &mut dyn Scene, tick: FrameTick) {
        if !self.is_running() {
            return;
        }
        // Finish what ran out before the next wave starts, so callbacks arrive in wave order.
        self.advance(scene, tick.time);
        if self.start_due_batches(tick.time) {
            self.advance(scene, tick.time);
        }
    }

    /// Returns whether any batch started.
    fn start_due_batches(&mut self, now: Duration) -> bool {
        if self.scheduled.iter().all(|b| b.start_at > now) {
            return false;
        }
        let (mut due, later): (Vec<_>, Vec<_>) = std::mem::take(&mut self.scheduled)
            .into_iter()
            .partition(|b| b.start_at <= now);
        self.scheduled = later;
        due.sort_by_key(|b| b.start_at);

        for batch in due {
            let duration = self.duration(batch.kind);
            log::trace!(
                "animator: starting {} batch of {} at {:.3}s",
                batch.kind,
                batch.ops.len(),
                batch.start_at.as_secs_f32()
            );
            for op in &batch.ops {
                for track in Track::for_op(op, batch.start_at, duration) {
                    self.listener.starting(track.kind, track.id, track.old_side);
                    self.running.push(track);
                }
            }
        }
        true
    }

    fn advance(&mut self, scene: &mut dyn Scene, now: Duration) {
        for track in &self.running {
            track.apply(scene, now);
        }
        if !self.running.iter().any(|t| t.is_done(now)) {
            return;
        }
        let (done, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.running)
            .into_iter()
            .partition(|t| t.is_done(now));
        self.running = live;
        for track in done {
            snap_to_rest(scene, track.id);
            self.listener.finished(track.kind, track.id, track.old_side);
        }
        self.notify_if_became_idle(true);
    }

    /// Force whatever involves `id` to completion: queued, scheduled or running.
    ///
    /// The element snaps to identity translation and full opacity, and the finished callbacks
    /// fire as if the animation had run out. Ending a queued change ends both of its sides. A
    /// no-op for elements that aren't animating. Returns whether anything was ended.
    pub fn end_animation(&mut self, scene: &mut dyn Scene, id: ElementId) -> bool {
        let was_running = self.is_running();
        let ended = self.force_complete(scene, id);
        if ended {
            self.notify_if_became_idle(was_running);
        }
        ended
    }

    /// [`Self::end_animation`] without the idle notification, for callers that queue a new
    /// operation right after.
    fn force_complete(&mut self, scene: &mut dyn Scene, id: ElementId) -> bool {
        let mut ended: Vec<(AnimationKind, ElementId, bool)> = Vec::new();
        let mut take_ops = |ops: &mut Vec<PendingOp>| {
            ops.retain(|op| {
                if !op.involves(id) {
                    return true;
                }
                ended.extend(op.sides().map(|(element, old_side)| (op.kind(), element, old_side)));
                false
            });
        };
        take_ops(&mut self.pending_removals);
        take_ops(&mut self.pending_moves);
        take_ops(&mut self.pending_changes);
        take_ops(&mut self.pending_adds);
        for batch in &mut self.scheduled {
            take_ops(&mut batch.ops);
        }
        self.scheduled.retain(|b| !b.ops.is_empty());
        self.running.retain(|t| {
            if t.id != id {
                return true;
            }
            ended.push((t.kind, t.id, t.old_side));
            false
        });

        if ended.is_empty() {
            return false;
        }
        for (kind, element, old_side) in ended {
            snap_to_rest(scene, element);
            self.listener.finished(kind, element, old_side);
        }
        true
    }

    /// Force every animation to completion. Afterwards nothing is running and no scheduled
    /// batch is left to start later.
    pub fn end_animations(&mut self, scene: &mut dyn Scene) {
        let mut ended: Vec<(AnimationKind, ElementId, bool)> = Vec::new();
        let queued = [
            std::mem::take(&mut self.pending_removals),
            std::mem::take(&mut self.pending_moves),
            std::mem::take(&mut self.pending_changes),
            std::mem::take(&mut self.pending_adds),
        ];
        let scheduled = std::mem::take(&mut self.scheduled);
        for op in queued
            .iter()
            .flatten()
            .chain(scheduled.iter().flat_map(|b| b.ops.iter()))
        {
            ended.extend(op.sides().map(|(element, old_side)| (op.kind(), element, old_side)));
        }
        ended.extend(
            std::mem::take(&mut self.running)
                .into_iter()
                .map(|t| (t.kind, t.id, t.old_side)),
        );

        if ended.is_empty() {
            return;
        }
        log::debug!("animator: force-completing {} animations", ended.len());
        for (kind, element, old_side) in ended {
            snap_to_rest(scene, element);
            self.listener.finished(kind, element, old_side);
        }
        self.notify_if_became_idle(true);
    }

    /// Fires `on_animations_finished` on the transition from running to idle only.
    fn notify_if_became_idle(&self, was_running: bool) {
        if was_running && !self.is_running() {
            self.listener.notify(|l| l.on_animations_finished());
        }
    }

    /// Anything queued, scheduled or running.
    pub fn is_running(&self) -> bool {
        !self.pending_removals.is_empty()
            || !self.pending_moves.is_empty()
            || !self.pending_changes.is_empty()
            || !self.pending_adds.is_empty()
            || !self.scheduled.is_empty()
            || !self.running.is_empty()
    }

    pub fn is_animating(&self, id: ElementId) -> bool {
        [
            &self.pending_removals,
            &self.pending_moves,
            &self.pending_changes,
            &self.pending_adds,
        ]
        .into_iter()
        .flatten()
        .chain(self.scheduled.iter().flat_map(|b| b.ops.iter()))
        .any(|op| op.involves(id))
            || self.running.iter().any(|t| t.id == id)
    }

    /// Operations queued and not yet handed to [`Self::run_pending_animations`].
    pub fn pending_len(&self) -> usize {
        self.pending_removals.len()
            + self.pending_moves.len()
            + self.pending_changes.len()
            + self.pending_adds.len()
    }

    /// When the earliest waiting batch of `kind` will start, if any is waiting.
    pub fn batch_start(&self, kind: AnimationKind) -> Option<Duration> {
        self.scheduled
            .iter()
            .filter(|b| b.kind == kind)
            .map(|b| b.start_at)
            .min()
    }

    /// When `id`'s running animation started.
    pub fn running_since(&self, id: ElementId) -> Option<Duration> {
        self.running
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.started_at)
    }
}
