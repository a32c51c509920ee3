//! Mobile entities owned by the world.

use robotrain_core::{Direction, MovableId, MovableKind, Position, TileKind};

/// Tiles that deflect turn bots and stop pushed blocks.
pub(crate) const SOLID: [TileKind; 3] = [TileKind::Wall, TileKind::Drillable, TileKind::Bombable];

/// Authoritative state of a bot or block.
#[derive(Clone, Debug)]
pub(crate) struct Movable {
    pub(crate) id: MovableId,
    pub(crate) kind: MovableKind,
    pub(crate) position: Position,
    /// Position at the start of the current tick, kept for interpolation.
    pub(crate) previous_position: Position,
    pub(crate) direction: Direction,
    pub(crate) dying: bool,
    /// Set once the movable turned itself into a tile; swept after each phase.
    pub(crate) retired: bool,
    /// Stops a caboose that reached the finish from advancing further.
    pub(crate) halted: bool,
    pub(crate) advance_target: Option<Position>,
}

impl Movable {
    pub(crate) const fn new(
        id: MovableId,
        kind: MovableKind,
        position: Position,
        direction: Direction,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            previous_position: position,
            direction,
            dying: false,
            retired: false,
            halted: false,
            advance_target: None,
        }
    }

    pub(crate) fn is_block(&self) -> bool {
        self.kind == MovableKind::Block
    }
}
