//! Sparse board of stacked terrain tiles.

use std::collections::BTreeMap;

use robotrain_core::{Direction, GateColor, PathChannel, Position, Tile, TileKind};

/// Transient path highlights recomputed on every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathMarks {
    train: Option<Direction>,
    launch: Option<Direction>,
}

impl PathMarks {
    /// Direction the train would be sent in when this cell is clicked.
    #[must_use]
    pub const fn on_train_path(&self) -> Option<Direction> {
        self.train
    }

    /// Direction a specialized car would be launched in when this cell is clicked.
    #[must_use]
    pub const fn on_launch_path(&self) -> Option<Direction> {
        self.launch
    }

    /// Returns the mark stored on the provided channel.
    #[must_use]
    pub const fn get(&self, channel: PathChannel) -> Option<Direction> {
        match channel {
            PathChannel::Train => self.train,
            PathChannel::Launch => self.launch,
        }
    }

    /// Records a mark unless the channel already holds one.
    fn mark(&mut self, channel: PathChannel, direction: Direction) {
        let slot = match channel {
            PathChannel::Train => &mut self.train,
            PathChannel::Launch => &mut self.launch,
        };
        if slot.is_none() {
            *slot = Some(direction);
        }
    }
}

/// Board cell holding tiles in placement order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    tiles: Vec<Tile>,
    marks: PathMarks,
}

impl Cell {
    /// Tiles stacked in the cell, oldest first.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Reports whether any tile of the given kind is present.
    #[must_use]
    pub fn contains(&self, kind: TileKind) -> bool {
        self.tiles.iter().any(|tile| tile.kind() == kind)
    }

    /// Reports whether a tile of any of the given kinds is present.
    #[must_use]
    pub fn contains_any(&self, kinds: &[TileKind]) -> bool {
        self.tiles.iter().any(|tile| kinds.contains(&tile.kind()))
    }

    /// Direction of the first arrow in the cell, if any.
    #[must_use]
    pub fn arrow(&self) -> Option<Direction> {
        self.tiles.iter().find_map(|tile| match tile {
            Tile::Arrow { direction } => Some(*direction),
            _ => None,
        })
    }

    /// Reports whether the cell holds water or lava that no bridge covers.
    #[must_use]
    pub fn has_open_hazard(&self) -> bool {
        self.contains_any(&[TileKind::Water, TileKind::Lava]) && !self.contains(TileKind::Bridge)
    }

    /// Path highlights computed by the last recomputation.
    #[must_use]
    pub const fn marks(&self) -> PathMarks {
        self.marks
    }

    /// Removes every tile of the given kind, reporting whether any was removed.
    pub fn remove_kind(&mut self, kind: TileKind) -> bool {
        let before = self.tiles.len();
        self.tiles.retain(|tile| tile.kind() != kind);
        self.tiles.len() != before
    }

    pub(crate) fn mark(&mut self, channel: PathChannel, direction: Direction) {
        self.marks.mark(channel, direction);
    }
}

/// Sparse mapping from positions to cells. Positions without tiles have no cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    cells: BTreeMap<Position, Cell>,
}

impl Board {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell at the provided position, if one was ever placed.
    #[must_use]
    pub fn cell_at(&self, position: Position) -> Option<&Cell> {
        self.cells.get(&position)
    }

    pub(crate) fn cell_at_mut(&mut self, position: Position) -> Option<&mut Cell> {
        self.cells.get_mut(&position)
    }

    /// Appends a tile to the cell at `position`, creating the cell if needed.
    pub fn place_tile(&mut self, tile: Tile, position: Position) {
        self.cells.entry(position).or_default().tiles.push(tile);
    }

    /// Removes every gate of the given colour, returning how many were removed.
    pub fn open_gates(&mut self, color: GateColor) -> usize {
        let mut removed = 0;
        for cell in self.cells.values_mut() {
            let before = cell.tiles.len();
            cell.tiles.retain(|tile| {
                !matches!(tile, Tile::Gate { color: gate_color, .. } if *gate_color == color)
            });
            removed += before - cell.tiles.len();
        }
        removed
    }

    /// Removes the 4-connected run of `kind` tiles that contains `origin`.
    ///
    /// Nothing is removed when `origin` holds no tile of that kind. The
    /// returned positions are listed in removal order.
    pub fn destroy_connected(&mut self, origin: Position, kind: TileKind) -> Vec<Position> {
        let mut cleared = Vec::new();
        let mut pending = vec![origin];
        while let Some(position) = pending.pop() {
            let removed = self
                .cell_at_mut(position)
                .map_or(false, |cell| cell.remove_kind(kind));
            if removed {
                cleared.push(position);
                pending.extend(position.neighbors().into_iter().rev());
            }
        }
        cleared
    }

    /// Iterates the cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.cells.iter().map(|(position, cell)| (*position, cell))
    }

    /// Iterates every tile in row-major order, stacked tiles oldest first.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, &Tile)> + '_ {
        self.cells()
            .flat_map(|(position, cell)| cell.tiles.iter().map(move |tile| (position, tile)))
    }

    /// Number of columns spanned by the populated cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        extent(self.cells.keys().map(Position::column))
    }

    /// Number of rows spanned by the populated cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        extent(self.cells.keys().map(Position::row))
    }

    pub(crate) fn clear_marks(&mut self) {
        for cell in self.cells.values_mut() {
            cell.marks = PathMarks::default();
        }
    }
}

fn extent(indices: impl Iterator<Item = i32>) -> u32 {
    indices
        .max()
        .and_then(|index| u32::try_from(index.saturating_add(1)).ok())
        .unwrap_or(0)
}
