use egui::{Pos2, Rect, Vec2};

/// Identity of a visual element. Stable for the lifetime of the element, never an index.
pub type ElementId = egui::Id;

/// Opaque handle to a bitmap mirror of an element, owned by the render layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotId(pub u64);

/// The render/layout collaborator.
///
/// The engine never lays anything out itself. It reads geometry, nudges translation and
/// opacity while animating, and repositions the drag surface.
///
/// Setters must ignore unknown ids: animations can outlive the elements they touch.
pub trait Scene {
    fn contains(&self, id: ElementId) -> bool;

    fn parent(&self, id: ElementId) -> Option<ElementId>;

    /// Children in paint order, back to front.
    fn children(&self, id: ElementId) -> Vec<ElementId>;

    /// Can the hit tester descend into this element?
    fn is_container(&self, id: ElementId) -> bool;

    /// Static layout bounds, without any in-flight translation.
    fn layout_rect(&self, id: ElementId) -> Option<Rect>;

    fn set_rect(&mut self, id: ElementId, rect: Rect);

    fn translation(&self, id: ElementId) -> Vec2;

    fn set_translation(&mut self, id: ElementId, translation: Vec2);

    fn alpha(&self, id: ElementId) -> f32;

    fn set_alpha(&mut self, id: ElementId, alpha: f32);

    /// Capture a mirror of the element for a drag shadow. `None` if the render layer can't.
    fn snapshot(&mut self, _id: ElementId) -> Option<SnapshotId> {
        None
    }

    /// Where the element is actually painted right now: layout plus translation.
    fn painted_rect(&self, id: ElementId) -> Option<Rect> {
        self.layout_rect(id)
            .map(|rect| rect.translate(self.translation(id)))
    }

    /// Move the element so its top-left corner lands on `pos`, keeping its size.
    fn set_position(&mut self, id: ElementId, pos: Pos2) {
        if let Some(rect) = self.layout_rect(id) {
            self.set_rect(id, Rect::from_min_size(pos, rect.size()));
        }
    }
}

/// Is `node` strictly inside the subtree rooted at `ancestor`?
pub fn is_descendant_of(scene: &dyn Scene, node: ElementId, ancestor: ElementId) -> bool {
    let mut current = scene.parent(node);
    let mut guard = 0usize;
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        guard += 1;
        if guard > 1024 {
            log::warn!("is_descendant_of: parent chain of {node:?} looks cyclic");
            return false;
        }
        current = scene.parent(id);
    }
    false
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    rect: Rect,
    translation: Vec2,
    alpha: f32,
    container: bool,
}

/// A retained, in-memory [`Scene`].
///
/// Handy for hosts that don't keep a retained widget tree (egui is immediate mode) and for tests.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: ahash::HashMap<ElementId, Node>,
    next_snapshot: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a parentless element. Replaces an existing element with the same id.
    pub fn insert_root(&mut self, id: ElementId, rect: Rect, container: bool) {
        self.remove(id);
        self.nodes.insert(id, Node::new(None, rect, container));
    }

    /// Append `id` as the topmost child of `parent`. Returns `false` if `parent` is unknown.
    pub fn insert_child(
        &mut self,
        parent: ElementId,
        id: ElementId,
        rect: Rect,
        container: bool,
    ) -> bool {
        let Some(len) = self.nodes.get(&parent).map(|p| p.children.len()) else {
            return false;
        };
        self.insert_child_at(parent, len, id, rect, container)
    }

    /// Insert `id` into `parent`'s paint order at `index` (clamped).
    pub fn insert_child_at(
        &mut self,
        parent: ElementId,
        index: usize,
        id: ElementId,
        rect: Rect,
        container: bool,
    ) -> bool {
        if !self.nodes.contains_key(&parent) || id == parent {
            return false;
        }
        self.remove(id);
        self.nodes
            .insert(id, Node::new(Some(parent), rect, container));
        if let Some(p) = self.nodes.get_mut(&parent) {
            let index = index.min(p.children.len());
            p.children.insert(index, id);
        }
        true
    }

    /// Move an existing element (with its subtree) under `new_parent` at `index`.
    pub fn reparent(&mut self, id: ElementId, new_parent: ElementId, index: usize) -> bool {
        if !self.nodes.contains_key(&id)
            || !self.nodes.contains_key(&new_parent)
            || id == new_parent
            || is_descendant_of(&*self, new_parent, id)
        {
            return false;
        }
        self.detach(id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(new_parent);
        }
        if let Some(p) = self.nodes.get_mut(&new_parent) {
            let index = index.min(p.children.len());
            p.children.insert(index, id);
        }
        true
    }

    /// Put `id` on top of its siblings.
    pub fn raise_to_top(&mut self, id: ElementId) {
        let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|&c| c != id);
            p.children.push(id);
        }
    }

    /// Remove `id` and its whole subtree. Returns `false` if it wasn't there.
    pub fn remove(&mut self, id: ElementId) -> bool {
        if !self.nodes.contains_key(&id) {
            return false;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
            }
        }
        true
    }

    fn detach(&mut self, id: ElementId) {
        let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|&c| c != id);
        }
    }
}

impl Node {
    fn new(parent: Option<ElementId>, rect: Rect, container: bool) -> Self {
        Self {
            parent,
            children: Vec::new(),
            rect,
            translation: Vec2::ZERO,
            alpha: 1.0,
            container,
        }
    }
}

impl Scene for SceneGraph {
    fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(&id)?.parent
    }

    fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.nodes
            .get(&id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn is_container(&self, id: ElementId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.container)
    }

    fn layout_rect(&self, id: ElementId) -> Option<Rect> {
        self.nodes.get(&id).map(|n| n.rect)
    }

    fn set_rect(&mut self, id: ElementId, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.rect = rect;
        }
    }

    fn translation(&self, id: ElementId) -> Vec2 {
        self.nodes.get(&id).map_or(Vec2::ZERO, |n| n.translation)
    }

    fn set_translation(&mut self, id: ElementId, translation: Vec2) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.translation = translation;
        }
    }

    fn alpha(&self, id: ElementId) -> f32 {
        self.nodes.get(&id).map_or(1.0, |n| n.alpha)
    }

    fn set_alpha(&mut self, id: ElementId, alpha: f32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn snapshot(&mut self, id: ElementId) -> Option<SnapshotId> {
        if !self.nodes.contains_key(&id) {
            return None;
        }
        self.next_snapshot += 1;
        Some(SnapshotId(self.next_snapshot))
    }
}
