use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use egui::{Pos2, Rect, Vec2};

use super::{AnimationKind, AnimationListener, AnimatorOptions, ItemAnimator};
use crate::frame_clock::FrameTick;
use crate::scene::{ElementId, Scene as _, SceneGraph};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Ev {
    Starting(AnimationKind, ElementId),
    Finished(AnimationKind, ElementId),
    AllDone,
}

#[derive(Default)]
struct Recorder {
    events: Vec<Ev>,
}

impl Recorder {
    fn count(&self, ev: Ev) -> usize {
        self.events.iter().filter(|e| **e == ev).count()
    }
}

impl AnimationListener for Recorder {
    fn on_add_starting(&mut self, id: ElementId) {
        self.events.push(Ev::Starting(AnimationKind::Add, id));
    }

    fn on_add_finished(&mut self, id: ElementId) {
        self.events.push(Ev::Finished(AnimationKind::Add, id));
    }

    fn on_remove_starting(&mut self, id: ElementId) {
        self.events.push(Ev::Starting(AnimationKind::Remove, id));
    }

    fn on_remove_finished(&mut self, id: ElementId) {
        self.events.push(Ev::Finished(AnimationKind::Remove, id));
    }

    fn on_move_starting(&mut self, id: ElementId) {
        self.events.push(Ev::Starting(AnimationKind::Move, id));
    }

    fn on_move_finished(&mut self, id: ElementId) {
        self.events.push(Ev::Finished(AnimationKind::Move, id));
    }

    fn on_change_starting(&mut self, id: ElementId, _old_side: bool) {
        self.events.push(Ev::Starting(AnimationKind::Change, id));
    }

    fn on_change_finished(&mut self, id: ElementId, _old_side: bool) {
        self.events.push(Ev::Finished(AnimationKind::Change, id));
    }

    fn on_animations_finished(&mut self) {
        self.events.push(Ev::AllDone);
    }
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn tick(millis: u64) -> FrameTick {
    FrameTick {
        frame: millis / 16,
        time: ms(millis),
    }
}

fn slot(index: usize) -> Pos2 {
    Pos2::new(0.0, index as f32 * 50.0)
}

/// A column with `n` items stacked 50 points apart.
fn list(n: usize) -> (SceneGraph, Vec<ElementId>) {
    let mut scene = SceneGraph::new();
    let column = egui::Id::new("column");
    scene.insert_root(
        column,
        Rect::from_min_size(Pos2::ZERO, Vec2::new(200.0, 1000.0)),
        true,
    );
    let items = (0..n)
        .map(|i| {
            let id = column.with(i);
            scene.insert_child(
                column,
                id,
                Rect::from_min_size(slot(i), Vec2::new(200.0, 50.0)),
                false,
            );
            id
        })
        .collect();
    (scene, items)
}

fn new_animator() -> (ItemAnimator, Rc<RefCell<Recorder>>) {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut animator = ItemAnimator::default();
    animator.set_listener(Some(recorder.clone()));
    (animator, recorder)
}

fn assert_at_rest(scene: &SceneGraph, items: &[ElementId]) {
    for &id in items {
        assert_eq!(scene.translation(id), Vec2::ZERO, "{id:?} still translated");
        assert_eq!(scene.alpha(id), 1.0, "{id:?} still faded");
    }
}

#[test]
fn additions_alone_start_without_delay() {
    let (mut scene, items) = list(2);
    let (mut animator, recorder) = new_animator();

    assert!(animator.notify_add(&mut scene, items[0]));
    assert!(animator.notify_add(&mut scene, items[1]));
    assert_eq!(scene.alpha(items[0]), 0.0);

    animator.run_pending_animations(&mut scene, ms(1000));
    assert_eq!(animator.running_since(items[0]), Some(ms(1000)));
    assert_eq!(animator.running_since(items[1]), Some(ms(1000)));
    assert_eq!(animator.batch_start(AnimationKind::Add), None);
    assert_eq!(recorder.borrow().count(Ev::Starting(AnimationKind::Add, items[0])), 1);

    animator.on_frame(&mut scene, tick(1060));
    let alpha = scene.alpha(items[0]);
    assert!(alpha > 0.0 && alpha < 1.0, "mid-fade alpha {alpha}");

    animator.on_frame(&mut scene, tick(1120));
    assert!(!animator.is_running());
    assert_at_rest(&scene, &items);
    assert_eq!(recorder.borrow().events.last(), Some(&Ev::AllDone));
}

#[test]
fn addition_waits_for_removal() {
    let (mut scene, items) = list(2);
    let (mut animator, recorder) = new_animator();

    animator.notify_remove(&mut scene, items[0]);
    animator.notify_add(&mut scene, items[1]);
    animator.run_pending_animations(&mut scene, Duration::ZERO);

    assert_eq!(animator.running_since(items[0]), Some(Duration::ZERO));
    assert_eq!(animator.batch_start(AnimationKind::Add), Some(ms(120)));

    animator.on_frame(&mut scene, tick(100));
    assert_eq!(animator.running_since(items[1]), None);
    assert!(scene.alpha(items[0]) < 1.0);
    assert_eq!(scene.alpha(items[1]), 0.0);

    animator.on_frame(&mut scene, tick(120));
    assert_eq!(animator.running_since(items[1]), Some(ms(120)));
    assert_eq!(scene.alpha(items[0]), 1.0, "removed element is restored for reuse");

    let events = recorder.borrow().events.clone();
    let removed = events
        .iter()
        .position(|e| *e == Ev::Finished(AnimationKind::Remove, items[0]));
    let added = events
        .iter()
        .position(|e| *e == Ev::Starting(AnimationKind::Add, items[1]));
    assert!(removed.is_some() && added.is_some());
    assert!(removed < added);
}

#[test]
fn waves_are_staggered_by_category_durations() {
    let (mut scene, items) = list(4);
    let (mut animator, _recorder) = new_animator();

    animator.notify_remove(&mut scene, items[0]);
    animator.notify_move(&mut scene, items[1], slot(1), slot(0));
    animator.notify_change(&mut scene, items[2], Some(items[3]), slot(2), slot(2));
    animator.notify_add(&mut scene, egui::Id::new("fresh"));
    animator.run_pending_animations(&mut scene, ms(10));

    assert_eq!(animator.batch_start(AnimationKind::Remove), None);
    assert_eq!(animator.batch_start(AnimationKind::Move), Some(ms(130)));
    assert_eq!(animator.batch_start(AnimationKind::Change), Some(ms(130)));
    assert_eq!(animator.batch_start(AnimationKind::Add), Some(ms(380)));

    // Waiting in its start pose: still painted in the old slot.
    assert_eq!(scene.translation(items[1]), Vec2::new(0.0, 50.0));
}

#[test]
fn adds_wait_for_the_longer_of_move_and_change() {
    let (mut scene, items) = list(3);
    let (mut animator, _recorder) = new_animator();
    animator.set_options(AnimatorOptions {
        move_duration: ms(100),
        change_duration: ms(300),
        ..Default::default()
    });

    animator.notify_move(&mut scene, items[0], slot(1), slot(0));
    animator.notify_change(&mut scene, items[1], None, slot(1), slot(1));
    animator.notify_add(&mut scene, items[2]);
    animator.run_pending_animations(&mut scene, Duration::ZERO);

    assert_eq!(animator.running_since(items[0]), Some(Duration::ZERO));
    assert_eq!(animator.batch_start(AnimationKind::Add), Some(ms(300)));
}

#[test]
fn move_slides_back_to_layout() {
    let (mut scene, items) = list(2);
    let (mut animator, recorder) = new_animator();

    assert!(animator.notify_move(&mut scene, items[1], slot(1), slot(0)));
    animator.run_pending_animations(&mut scene, Duration::ZERO);
    assert_eq!(scene.translation(items[1]), Vec2::new(0.0, 50.0));

    animator.on_frame(&mut scene, tick(100));
    let dy = scene.translation(items[1]).y;
    assert!(dy > 0.0 && dy < 50.0, "mid-slide offset {dy}");
    assert!(animator.is_animating(items[1]));

    animator.on_frame(&mut scene, tick(250));
    assert!(!animator.is_animating(items[1]));
    assert_at_rest(&scene, &items);
    assert_eq!(
        recorder.borrow().events,
        vec![
            Ev::Starting(AnimationKind::Move, items[1]),
            Ev::Finished(AnimationKind::Move, items[1]),
            Ev::AllDone,
        ]
    );
}

#[test]
fn move_in_place_finishes_synchronously() {
    let (mut scene, items) = list(1);
    let (mut animator, recorder) = new_animator();

    assert!(!animator.notify_move(&mut scene, items[0], slot(0), slot(0)));
    assert!(!animator.is_running());
    // Never ran, so it never went idle.
    assert_eq!(
        recorder.borrow().events,
        vec![Ev::Finished(AnimationKind::Move, items[0])]
    );
}

#[test]
fn move_in_place_of_the_last_animation_reports_idle() {
    let (mut scene, items) = list(2);
    let (mut animator, recorder) = new_animator();

    animator.notify_move(&mut scene, items[1], slot(1), slot(0));
    animator.run_pending_animations(&mut scene, Duration::ZERO);
    animator.on_frame(&mut scene, tick(50));

    assert!(!animator.notify_move(&mut scene, items[1], slot(0), slot(0)));
    assert!(!animator.is_running());
    assert_at_rest(&scene, &items);
    let recorder = recorder.borrow();
    assert_eq!(recorder.count(Ev::Finished(AnimationKind::Move, items[1])), 2);
    assert_eq!(recorder.count(Ev::AllDone), 1);
    assert_eq!(recorder.events.last(), Some(&Ev::AllDone));
}

#[test]
fn change_to_itself_is_a_move() {
    let (mut scene, items) = list(1);
    let (mut animator, recorder) = new_animator();

    assert!(animator.notify_change(&mut scene, items[0], Some(items[0]), slot(1), slot(0)));
    animator.run_pending_animations(&mut scene, Duration::ZERO);
    assert_eq!(
        recorder.borrow().events,
        vec![Ev::Starting(AnimationKind::Move, items[0])]
    );
}

#[test]
fn change_cross_fades_both_sides() {
    let (mut scene, items) = list(2);
    let (mut animator, recorder) = new_animator();

    animator.notify_change(&mut scene, items[0], Some(items[1]), slot(0), slot(1));
    assert_eq!(scene.alpha(items[1]), 0.0);
    animator.run_pending_animations(&mut scene, Duration::ZERO);

    animator.on_frame(&mut scene, tick(125));
    assert!(scene.alpha(items[0]) < 1.0);
    assert!(scene.alpha(items[1]) > 0.0);

    animator.on_frame(&mut scene, tick(250));
    assert_at_rest(&scene, &items);
    let recorder = recorder.borrow();
    assert_eq!(recorder.count(Ev::Finished(AnimationKind::Change, items[0])), 1);
    assert_eq!(recorder.count(Ev::Finished(AnimationKind::Change, items[1])), 1);
}

#[test]
fn dragged_insertion_is_bookkept_without_fading() {
    let (mut scene, items) = list(2);
    let (mut animator, recorder) = new_animator();

    let handed_over = Rc::new(Cell::new(None));
    let sink = handed_over.clone();
    animator.mark_next_insertion_as_dragged(move |id| sink.set(Some(id)));
    assert!(animator.has_dragged_insertion());

    animator.notify_remove(&mut scene, items[0]);
    animator.notify_add(&mut scene, items[1]);
    assert_eq!(handed_over.get(), Some(items[1]));
    assert!(!animator.has_dragged_insertion());
    assert_eq!(scene.alpha(items[1]), 1.0, "dragged insertion must not be hidden");

    animator.run_pending_animations(&mut scene, Duration::ZERO);
    for t in [40, 80, 119] {
        animator.on_frame(&mut scene, tick(t));
        assert_eq!(scene.alpha(items[1]), 1.0);
    }

    animator.on_frame(&mut scene, tick(120));
    assert!(!animator.is_animating(items[1]));
    let recorder = recorder.borrow();
    assert_eq!(recorder.count(Ev::Starting(AnimationKind::Add, items[1])), 1);
    assert_eq!(recorder.count(Ev::Finished(AnimationKind::Add, items[1])), 1);

    // Only the next insertion is special.
    drop(recorder);
    animator.notify_add(&mut scene, items[0]);
    assert_eq!(scene.alpha(items[0]), 0.0);
}

#[test]
fn removal_under_a_move_target_completes_instantly() {
    let (mut scene, items) = list(2);
    let (mut animator, recorder) = new_animator();

    // items[0] is removed but still laid out at slot 0, where items[1] is moving.
    animator.notify_remove(&mut scene, items[0]);
    animator.notify_move(&mut scene, items[1], slot(1), slot(0));
    animator.run_pending_animations(&mut scene, Duration::ZERO);

    assert!(!animator.is_animating(items[0]));
    assert_eq!(scene.alpha(items[0]), 1.0);
    {
        let recorder = recorder.borrow();
        assert_eq!(recorder.count(Ev::Starting(AnimationKind::Remove, items[0])), 1);
        assert_eq!(recorder.count(Ev::Finished(AnimationKind::Remove, items[0])), 1);
    }
    // The move still waits out the removal wave.
    assert_eq!(animator.batch_start(AnimationKind::Move), Some(ms(120)));

    let (mut scene, items) = list(2);
    let (mut animator, _recorder) = new_animator();
    animator.set_options(AnimatorOptions {
        fake_removals_under_moves: false,
        ..Default::default()
    });
    animator.notify_remove(&mut scene, items[0]);
    animator.notify_move(&mut scene, items[1], slot(1), slot(0));
    animator.run_pending_animations(&mut scene, Duration::ZERO);
    assert!(animator.is_animating(items[0]));
}

#[test]
fn notify_forces_previous_animation_to_finish_first() {
    let (mut scene, items) = list(2);
    let (mut animator, recorder) = new_animator();

    animator.notify_move(&mut scene, items[1], slot(1), slot(0));
    animator.run_pending_animations(&mut scene, Duration::ZERO);
    animator.on_frame(&mut scene, tick(50));
    assert!(scene.translation(items[1]) != Vec2::ZERO);

    animator.notify_remove(&mut scene, items[1]);
    assert_eq!(scene.translation(items[1]), Vec2::ZERO);
    assert_eq!(
        recorder.borrow().events.last(),
        Some(&Ev::Finished(AnimationKind::Move, items[1]))
    );
    // The animator never looked idle in between: the removal took over right away.
    assert_eq!(recorder.borrow().count(Ev::AllDone), 0);
    assert!(animator.is_running());
    assert!(animator.is_animating(items[1]));
    assert_eq!(animator.pending_len(), 1);
}

#[test]
fn end_animation_is_idempotent() {
    let (mut scene, items) = list(2);
    let (mut animator, recorder) = new_animator();

    assert!(!animator.end_animation(&mut scene, items[0]));
    assert!(recorder.borrow().events.is_empty());

    animator.notify_remove(&mut scene, items[0]);
    animator.notify_add(&mut scene, items[1]);
    animator.run_pending_animations(&mut scene, Duration::ZERO);

    // Scheduled but not started: only the finished callback fires.
    assert!(animator.end_animation(&mut scene, items[1]));
    assert!(!animator.end_animation(&mut scene, items[1]));
    assert_eq!(scene.alpha(items[1]), 1.0);
    assert_eq!(animator.batch_start(AnimationKind::Add), None);
    {
        let recorder = recorder.borrow();
        assert_eq!(recorder.count(Ev::Starting(AnimationKind::Add, items[1])), 0);
        assert_eq!(recorder.count(Ev::Finished(AnimationKind::Add, items[1])), 1);
    }

    assert!(animator.end_animation(&mut scene, items[0]));
    assert!(!animator.is_running());
    assert_eq!(recorder.borrow().count(Ev::AllDone), 1);
}

#[test]
fn end_animations_leaves_nothing_behind() {
    let (mut scene, items) = list(4);
    let (mut animator, recorder) = new_animator();

    animator.notify_remove(&mut scene, items[0]);
    animator.notify_move(&mut scene, items[1], slot(2), slot(1));
    animator.run_pending_animations(&mut scene, Duration::ZERO);
    animator.notify_add(&mut scene, items[2]);
    animator.notify_change(&mut scene, items[3], None, slot(3), slot(3));

    animator.end_animations(&mut scene);
    assert!(!animator.is_running());
    assert_at_rest(&scene, &items);
    let seen = recorder.borrow().events.len();

    for t in (0..1000).step_by(16) {
        animator.on_frame(&mut scene, tick(t));
    }
    assert_eq!(recorder.borrow().events.len(), seen, "stale timer fired");
}

/// Deterministic LCG so failures reproduce.
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed ^ 0xD0C3_D0C3_D0C3_D0C3)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005u64)
            .wrapping_add(1442695040888963407u64);
        self.0
    }

    fn next_usize(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        ((self.next_u64() >> 33) as usize) % upper
    }
}

#[test]
fn random_sequences_end_at_rest() {
    for seed in 0..64 {
        let (mut scene, items) = list(6);
        let (mut animator, _recorder) = new_animator();
        let mut rng = Rng::new(seed);
        let mut now = 0u64;

        for _ in 0..40 {
            let a = items[rng.next_usize(items.len())];
            let b = items[rng.next_usize(items.len())];
            let from = slot(rng.next_usize(6));
            let to = slot(rng.next_usize(6));
            match rng.next_usize(7) {
                0 => {
                    animator.notify_add(&mut scene, a);
                }
                1 => {
                    animator.notify_remove(&mut scene, a);
                }
                2 => {
                    animator.notify_move(&mut scene, a, from, to);
                }
                3 => {
                    let new = (rng.next_usize(3) != 0).then_some(b);
                    animator.notify_change(&mut scene, a, new, from, to);
                }
                4 => animator.run_pending_animations(&mut scene, ms(now)),
                5 => {
                    now += rng.next_usize(200) as u64;
                    animator.on_frame(&mut scene, tick(now));
                }
                _ => {
                    animator.end_animation(&mut scene, a);
                }
            }
        }

        animator.end_animations(&mut scene);
        assert!(!animator.is_running(), "seed {seed}: still running");
        assert_at_rest(&scene, &items);
        for &id in &items {
            assert!(!animator.is_animating(id), "seed {seed}: {id:?} still tracked");
        }
    }
}
