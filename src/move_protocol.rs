//! The contract through which a drag asks the data owner to reorder columns and items.
//!
//! The engine proposes, the model decides. Neither entry point animates or notifies anything:
//! after an accepted move the caller updates its layout and calls the matching
//! [`crate::ItemAnimator`] `notify_*` methods itself, so nothing is counted twice.

use crate::error::InvalidPosition;
use crate::scene::ElementId;

/// A position in a column or item sequence. `None` means "no position" (a slot that was just
/// removed, or a drop target that couldn't be resolved) and is never valid.
pub type Position = Option<usize>;

/// Where an element lives on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoardSlot {
    Column { column: usize },
    Item { column: usize, item: usize },
}

/// A proposed item move, as resolved from a hit test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    pub source_container: Position,
    pub source_item: Position,
    pub target_container: Position,
    pub target_item: Position,
}

/// A validated item move: every position is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemMove {
    pub from_item: usize,
    pub to_item: usize,
    pub from_column: usize,
    pub to_column: usize,
}

impl ItemMove {
    pub fn is_within_column(&self) -> bool {
        self.from_column == self.to_column
    }
}

impl MoveRequest {
    pub fn new(
        source_container: Position,
        source_item: Position,
        target_container: Position,
        target_item: Position,
    ) -> Self {
        Self {
            source_container,
            source_item,
            target_container,
            target_item,
        }
    }

    pub fn validate(&self) -> Result<ItemMove, InvalidPosition> {
        let known = |position: Position, field: &'static str| position.ok_or(InvalidPosition { field });
        Ok(ItemMove {
            from_item: known(self.source_item, "source_item")?,
            to_item: known(self.target_item, "target_item")?,
            from_column: known(self.source_container, "source_container")?,
            to_column: known(self.target_container, "target_container")?,
        })
    }
}

/// The data owner: holds the columns and their items, and applies accepted moves.
pub trait BoardModel {
    fn column_count(&self) -> usize;

    fn item_count(&self, column: usize) -> usize;

    /// Where `id` lives, if it is a column or an item of this board.
    fn locate(&self, id: ElementId) -> Option<BoardSlot>;

    /// Relocate column `from` to index `to`. Return `false` to refuse.
    fn on_move_container(&mut self, from: usize, to: usize) -> bool;

    /// Relocate an item, within one column or across two. Return `false` to refuse.
    fn on_move_item(&mut self, mv: ItemMove) -> bool;
}

/// Ask `model` to move a column. Unknown positions are refused without asking.
pub fn move_container(model: &mut dyn BoardModel, from: Position, to: Position) -> bool {
    let (Some(from), Some(to)) = (from, to) else {
        log::debug!("move_container refused: no position (from={from:?} to={to:?})");
        return false;
    };
    let accepted = model.on_move_container(from, to);
    log::debug!("move_container {from} -> {to}: accepted={accepted}");
    accepted
}

/// Ask `model` to move an item. Unknown positions and in-place moves are refused without asking.
pub fn move_item(model: &mut dyn BoardModel, request: MoveRequest) -> bool {
    let mv = match request.validate() {
        Ok(mv) => mv,
        Err(err) => {
            log::debug!("move_item refused: {err}");
            return false;
        }
    };
    if mv.is_within_column() && mv.from_item == mv.to_item {
        return false;
    }
    let accepted = model.on_move_item(mv);
    log::debug!(
        "move_item column {} item {} -> column {} item {}: accepted={accepted}",
        mv.from_column,
        mv.from_item,
        mv.to_column,
        mv.to_item
    );
    accepted
}

/// Apply `mv` to nested vectors: within one column, or remove-then-insert across two.
///
/// Returns `false` (leaving `columns` untouched) if any index is out of range. The target index
/// may equal the target column's length (append).
pub fn apply_item_move<T>(columns: &mut [Vec<T>], mv: ItemMove) -> bool {
    let Some(source_len) = columns.get(mv.from_column).map(Vec::len) else {
        return false;
    };
    let Some(target_len) = columns.get(mv.to_column).map(Vec::len) else {
        return false;
    };
    if mv.from_item >= source_len {
        return false;
    }
    if mv.is_within_column() {
        if mv.to_item >= source_len {
            return false;
        }
        let column = &mut columns[mv.from_column];
        let item = column.remove(mv.from_item);
        column.insert(mv.to_item, item);
    } else {
        if mv.to_item > target_len {
            return false;
        }
        let item = columns[mv.from_column].remove(mv.from_item);
        columns[mv.to_column].insert(mv.to_item, item);
    }
    true
}

/// Move `items[from]` to index `to`. Returns `false` if either index is out of range.
pub fn apply_container_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}
