use std::time::Duration;

use egui::{Pos2, Vec2};

use super::ops::{AnimationKind, PendingOp};
use crate::scene::{ElementId, Scene};

/// A drained queue waiting for its start time.
#[derive(Clone, Debug)]
pub(super) struct ScheduledBatch {
    pub kind: AnimationKind,
    pub start_at: Duration,
    pub ops: Vec<PendingOp>,
}

/// One element's in-flight animation.
#[derive(Clone, Copy, Debug)]
pub(super) struct Track {
    pub id: ElementId,
    pub kind: AnimationKind,
    pub old_side: bool,
    pub started_at: Duration,
    pub duration: Duration,
    pub translation: (Vec2, Vec2),
    pub alpha: (f32, f32),
}

impl Track {
    /// Tracks for `op`, starting at `started_at`. `duration` is the category's duration; ops
    /// flagged instant get zero.
    pub fn for_op(op: &PendingOp, started_at: Duration, duration: Duration) -> Vec<Self> {
        let track = |id: ElementId,
                     kind: AnimationKind,
                     old_side: bool,
                     duration: Duration,
                     translation: (Vec2, Vec2),
                     alpha: (f32, f32)| Self {
            id,
            kind,
            old_side,
            started_at,
            duration,
            translation,
            alpha,
        };
        match *op {
            PendingOp::Add { id, instant } => {
                let (duration, alpha) = if instant {
                    (Duration::ZERO, (1.0, 1.0))
                } else {
                    (duration, (0.0, 1.0))
                };
                vec![track(id, AnimationKind::Add, false, duration, (Vec2::ZERO, Vec2::ZERO), alpha)]
            }
            PendingOp::Remove { id, instant } => {
                let duration = if instant { Duration::ZERO } else { duration };
                vec![track(
                    id,
                    AnimationKind::Remove,
                    false,
                    duration,
                    (Vec2::ZERO, Vec2::ZERO),
                    (1.0, 0.0),
                )]
            }
            PendingOp::Move { id, from, to } => vec![track(
                id,
                AnimationKind::Move,
                false,
                duration,
                (from - to, Vec2::ZERO),
                (1.0, 1.0),
            )],
            PendingOp::Change { old, new, from, to } => {
                let mut tracks = vec![track(
                    old,
                    AnimationKind::Change,
                    true,
                    duration,
                    (Vec2::ZERO, to - from),
                    (1.0, 0.0),
                )];
                if let Some(new) = new {
                    tracks.push(track(
                        new,
                        AnimationKind::Change,
                        false,
                        duration,
                        (from - to, Vec2::ZERO),
                        (0.0, 1.0),
                    ));
                }
                tracks
            }
        }
    }

    /// Eased progress in `0..=1` at `now`.
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = now.saturating_sub(self.started_at).as_secs_f32() / self.duration.as_secs_f32();
        egui::emath::easing::cubic_out(t.clamp(0.0, 1.0))
    }

    pub fn is_done(&self, now: Duration) -> bool {
        now.saturating_sub(self.started_at) >= self.duration
    }

    /// Write the sampled state at `now` into the scene.
    pub fn apply(&self, scene: &mut dyn Scene, now: Duration) {
        let t = self.progress(now);
        let (from, to) = self.translation;
        scene.set_translation(self.id, egui::lerp(from..=to, t));
        let (from, to) = self.alpha;
        scene.set_alpha(self.id, egui::lerp(from..=to, t));
    }
}

/// Show `op`'s elements in their starting pose while the batch waits, so nothing jumps to its
/// final slot before the animation begins.
pub(super) fn apply_start_pose(scene: &mut dyn Scene, op: &PendingOp) {
    match *op {
        PendingOp::Add { id, instant } => {
            if !instant {
                scene.set_alpha(id, 0.0);
            }
        }
        PendingOp::Remove { .. } => {}
        PendingOp::Move { id, from, to } => scene.set_translation(id, from - to),
        PendingOp::Change { new, from, to, .. } => {
            if let Some(new) = new {
                scene.set_translation(new, from - to);
                scene.set_alpha(new, 0.0);
            }
        }
    }
}

/// Identity transform and full opacity: where every animation ends up.
pub(super) fn snap_to_rest(scene: &mut dyn Scene, id: ElementId) {
    scene.set_translation(id, Vec2::ZERO);
    scene.set_alpha(id, 1.0);
}

pub(super) fn same_slot(a: Pos2, b: Pos2) -> bool {
    (a - b).length_sq() < 0.25
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_track_slides_back_to_layout() {
        let op = PendingOp::Move {
            id: egui::Id::new("a"),
            from: Pos2::new(0.0, 100.0),
            to: Pos2::new(0.0, 0.0),
        };
        let tracks = Track::for_op(&op, Duration::from_millis(10), Duration::from_millis(100));
        assert_eq!(tracks.len(), 1);
        let track = tracks[0];
        assert_eq!(track.translation.0, Vec2::new(0.0, 100.0));
        assert_eq!(track.progress(Duration::from_millis(10)), 0.0);
        assert_eq!(track.progress(Duration::from_millis(500)), 1.0);
        assert!(!track.is_done(Duration::from_millis(109)));
        assert!(track.is_done(Duration::from_millis(110)));
    }

    #[test]
    fn instant_add_never_fades() {
        let op = PendingOp::Add {
            id: egui::Id::new("a"),
            instant: true,
        };
        let track = Track::for_op(&op, Duration::ZERO, Duration::from_millis(120))[0];
        assert!(track.duration.is_zero());
        assert_eq!(track.alpha, (1.0, 1.0));
        assert!(track.is_done(Duration::ZERO));
    }
}
