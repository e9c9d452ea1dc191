use egui::Pos2;

use crate::scene::{ElementId, Scene, is_descendant_of};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
}

/// A single-pointer input event, in scene coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub pos: Pos2,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, pos: Pos2) -> Self {
        Self { kind, pos }
    }

    pub fn down(pos: Pos2) -> Self {
        Self::new(PointerKind::Down, pos)
    }

    pub fn moved(pos: Pos2) -> Self {
        Self::new(PointerKind::Move, pos)
    }

    pub fn up(pos: Pos2) -> Self {
        Self::new(PointerKind::Up, pos)
    }

    /// Translate a raw egui event. Only the primary button and touch are considered;
    /// secondary buttons and multi-touch extras are ignored.
    pub fn from_egui(event: &egui::Event) -> Option<Self> {
        match event {
            egui::Event::PointerMoved(pos) => Some(Self::moved(*pos)),
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                ..
            } => Some(if *pressed {
                Self::down(*pos)
            } else {
                Self::up(*pos)
            }),
            egui::Event::Touch { phase, pos, .. } => {
                let kind = match phase {
                    egui::TouchPhase::Start => PointerKind::Down,
                    egui::TouchPhase::Move => PointerKind::Move,
                    egui::TouchPhase::End => PointerKind::Up,
                    egui::TouchPhase::Cancel => PointerKind::Cancel,
                };
                Some(Self::new(kind, *pos))
            }
            _ => None,
        }
    }
}

/// Exclusive input claim held by a drag in progress.
///
/// While claimed, pointer events aimed at the owner or anything inside it go to the owner;
/// its descendants never see them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerCapture {
    owner: Option<ElementId>,
}

impl PointerCapture {
    pub fn claim(&mut self, owner: ElementId) {
        self.owner = Some(owner);
    }

    pub fn release(&mut self) {
        self.owner = None;
    }

    pub fn owner(&self) -> Option<ElementId> {
        self.owner
    }

    pub fn is_claimed(&self) -> bool {
        self.owner.is_some()
    }

    /// Which element receives an event aimed at `target`.
    pub fn route(&self, scene: &dyn Scene, target: ElementId) -> ElementId {
        match self.owner {
            Some(owner) if owner == target || is_descendant_of(scene, target, owner) => owner,
            _ => target,
        }
    }
}

#[cfg(test)]
mod tests {
    use egui::{Rect, Vec2};

    use super::*;
    use crate::scene::SceneGraph;

    #[test]
    fn secondary_button_is_ignored() {
        let event = egui::Event::PointerButton {
            pos: Pos2::new(1.0, 2.0),
            button: egui::PointerButton::Secondary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        };
        assert_eq!(PointerEvent::from_egui(&event), None);

        let event = egui::Event::PointerButton {
            pos: Pos2::new(1.0, 2.0),
            button: egui::PointerButton::Primary,
            pressed: false,
            modifiers: egui::Modifiers::NONE,
        };
        assert_eq!(
            PointerEvent::from_egui(&event),
            Some(PointerEvent::up(Pos2::new(1.0, 2.0)))
        );
    }

    #[test]
    fn capture_routes_descendants_to_owner() {
        let mut scene = SceneGraph::new();
        let root = egui::Id::new("root");
        let card = egui::Id::new("card");
        let label = egui::Id::new("label");
        let other = egui::Id::new("other");
        let r = Rect::from_min_size(Pos2::ZERO, Vec2::splat(10.0));
        scene.insert_root(root, r, true);
        scene.insert_child(root, card, r, true);
        scene.insert_child(card, label, r, false);
        scene.insert_child(root, other, r, false);

        let mut capture = PointerCapture::default();
        assert_eq!(capture.route(&scene, label), label);

        capture.claim(card);
        assert_eq!(capture.route(&scene, label), card);
        assert_eq!(capture.route(&scene, card), card);
        assert_eq!(capture.route(&scene, other), other);

        capture.release();
        assert!(!capture.is_claimed());
        assert_eq!(capture.route(&scene, label), label);
    }
}
