#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Robotrain adapters.
//!
//! Scenes are captured from world queries and never feed back into the
//! simulation. The only state owned here is cosmetic: the frame counters of
//! the decorative start and finish tiles.

use anyhow::Result as AnyResult;
use glam::Vec2;
use robotrain_core::{
    BotKind, Direction, GateColor, GateOrientation, MovableId, MovableKind, Outcome,
    Position, Specialization, SwitchWeight, Tile, TrainState,
};
use robotrain_world::{query, World};
use std::{io::Write, time::Duration};

/// Fill used for cells the train can be sent to.
pub const TRAIN_PATH_COLOR: Color = Color::new(1.0, 1.0, 0.0, 0.25);

/// Fill used for cells a specialized car can be launched toward.
pub const LAUNCH_PATH_COLOR: Color = Color::new(0.0, 1.0, 0.0, 0.25);

/// Brightness levels cycled through by the start and finish tiles.
const DECORATION_FRAMES: [u8; 23] = [
    0, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 55, 50, 45, 40, 35, 30, 25, 20, 15, 10, 5,
];

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// Decorative tile animated independently of the logic tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Decoration {
    /// The start tile.
    Start,
    /// The finish tile.
    Finish,
}

impl Decoration {
    /// Tile glyph the decoration is listed under in text output.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Start => tile_glyph(&Tile::Start),
            Self::Finish => tile_glyph(&Tile::Finish),
        }
    }
}

/// Render-side frame counters for the decorative tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecorationClock {
    start: usize,
    finish: usize,
}

impl DecorationClock {
    /// Number of frames in one pulse of a decorative tile.
    pub const FRAMES: usize = DECORATION_FRAMES.len();

    /// Creates a clock with both decorations on their first frame.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start: 0,
            finish: 0,
        }
    }

    /// Moves both decorations to their next frame.
    pub fn advance(&mut self) {
        self.start = (self.start + 1) % Self::FRAMES;
        self.finish = (self.finish + 1) % Self::FRAMES;
    }

    /// Brightness level currently shown by the decoration.
    #[must_use]
    pub const fn brightness(&self, decoration: Decoration) -> u8 {
        let frame = match decoration {
            Decoration::Start => self.start,
            Decoration::Finish => self.finish,
        };
        DECORATION_FRAMES[frame % Self::FRAMES]
    }
}

/// Describes the rectangular grid spanned by the populated cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
}

/// A populated cell and the tiles stacked inside it.
#[derive(Clone, Debug, PartialEq)]
pub struct CellPresentation {
    /// Cell location.
    pub position: Position,
    /// Tiles in drawing order, bottom first.
    pub tiles: Vec<Tile>,
    /// Translucent path overlay, if the cell is highlighted.
    pub highlight: Option<Color>,
}

impl CellPresentation {
    /// Topmost tile, which decides the glyph shown by text backends.
    #[must_use]
    pub fn top(&self) -> Option<&Tile> {
        self.tiles.last()
    }
}

/// Decorative tile with the brightness it is drawn at this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecorationPresentation {
    /// Cell holding the decoration.
    pub position: Position,
    /// Which decoration is drawn.
    pub decoration: Decoration,
    /// Brightness level of the current frame.
    pub brightness: u8,
}

/// Movable drawn between its previous and current cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovablePresentation {
    /// Identifier allocated by the world.
    pub id: MovableId,
    /// Kind the movable is drawn as.
    pub kind: MovableKind,
    /// Interpolated location in tile units, `x` along columns.
    pub position: Vec2,
    /// Direction the sprite faces.
    pub direction: Direction,
    /// Whether the movable is removed on the next tick.
    pub dying: bool,
}

/// Scene description captured from the world for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile grid that composes the play area.
    pub tile_grid: TileGridPresentation,
    /// Populated cells in row-major order.
    pub cells: Vec<CellPresentation>,
    /// Animated start and finish tiles.
    pub decorations: Vec<DecorationPresentation>,
    /// Movables in identifier order.
    pub movables: Vec<MovablePresentation>,
    /// Specializations offered to the player.
    pub catalog: Vec<Specialization>,
    /// Specialization picked for the next launch.
    pub specialization: Option<Specialization>,
    /// Phase of the train.
    pub train_state: TrainState,
    /// Result of the attempt, once decided.
    pub outcome: Option<Outcome>,
    /// Logic ticks processed so far.
    pub tick_index: u64,
}

impl Scene {
    /// Captures the world as it should appear `interpolation` of the way
    /// through the current logic interval.
    #[must_use]
    pub fn capture(world: &World, interpolation: f32, clock: &DecorationClock) -> Self {
        let board = query::board(world);
        let blend = interpolation.clamp(0.0, 1.0);

        let cells = board
            .cells()
            .map(|(position, cell)| {
                let marks = cell.marks();
                let highlight = if marks.on_train_path().is_some() {
                    Some(TRAIN_PATH_COLOR)
                } else if marks.on_launch_path().is_some() {
                    Some(LAUNCH_PATH_COLOR)
                } else {
                    None
                };
                CellPresentation {
                    position,
                    tiles: cell.tiles().to_vec(),
                    highlight,
                }
            })
            .collect();

        let decorations = board
            .tiles()
            .filter_map(|(position, tile)| {
                let decoration = match tile {
                    Tile::Start => Decoration::Start,
                    Tile::Finish => Decoration::Finish,
                    _ => return None,
                };
                Some(DecorationPresentation {
                    position,
                    decoration,
                    brightness: clock.brightness(decoration),
                })
            })
            .collect();

        let movables = query::movable_view(world)
            .iter()
            .map(|snapshot| {
                let previous = tile_space(snapshot.previous_position);
                let current = tile_space(snapshot.position);
                let kind = match snapshot.appearance {
                    Some(specialization) => MovableKind::Bot(specialization.kind()),
                    None => snapshot.kind,
                };
                MovablePresentation {
                    id: snapshot.id,
                    kind,
                    position: previous.lerp(current, blend),
                    direction: snapshot.direction,
                    dying: snapshot.dying,
                }
            })
            .collect();

        Self {
            tile_grid: TileGridPresentation {
                columns: board.width(),
                rows: board.height(),
            },
            cells,
            decorations,
            movables,
            catalog: query::catalog(world),
            specialization: query::specialization(world),
            train_state: query::train_state(world),
            outcome: query::outcome(world),
            tick_index: query::tick_index(world),
        }
    }

    /// Returns the cell presented at the provided position, if any.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<&CellPresentation> {
        self.cells
            .binary_search_by_key(&position, |cell| cell.position)
            .ok()
            .map(|index| &self.cells[index])
    }
}

fn tile_space(position: Position) -> Vec2 {
    Vec2::new(position.column() as f32, position.row() as f32)
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            scene,
        }
    }
}

/// Whether the backend keeps presenting frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Present another frame.
    Continue,
    /// Stop after presenting the current frame.
    Exit,
}

/// Rendering backend capable of presenting Robotrain scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until `update_scene` requests an exit.
    ///
    /// The closure receives the frame delta and may replace the scene before
    /// it is presented, allowing adapters to drive the simulation
    /// deterministically.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> FrameControl;
}

/// Headless backend that prints the final frame as text.
#[derive(Debug)]
pub struct TextBackend<W> {
    writer: W,
    frame_interval: Duration,
    max_frames: u64,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend that simulates frames `frame_interval` apart and
    /// gives up after `max_frames`.
    #[must_use]
    pub fn new(writer: W, frame_interval: Duration, max_frames: u64) -> Self {
        Self {
            writer,
            frame_interval,
            max_frames,
        }
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> FrameControl,
    {
        let Presentation {
            window_title,
            mut scene,
        } = presentation;

        let mut frames = 0;
        while frames < self.max_frames {
            frames += 1;
            if update_scene(self.frame_interval, &mut scene) == FrameControl::Exit {
                break;
            }
        }

        writeln!(self.writer, "{window_title}")?;
        write_scene(&mut self.writer, &scene)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the scene as a character grid followed by a status line.
///
/// A second line lists the brightness of each decoration, in cell order.
pub fn write_scene<W: Write>(writer: &mut W, scene: &Scene) -> AnyResult<()> {
    for row in 0..scene.tile_grid.rows {
        let mut line = String::new();
        for column in 0..scene.tile_grid.columns {
            let position = Position::new(row as i32, column as i32);
            line.push(glyph_at(scene, position));
        }
        writeln!(writer, "{}", line.trim_end())?;
    }

    write!(writer, "tick {}: {:?}", scene.tick_index, scene.train_state)?;
    if let Some(specialization) = scene.specialization {
        write!(writer, " [{specialization}]")?;
    }
    writeln!(writer)?;

    if !scene.decorations.is_empty() {
        write!(writer, "pulse")?;
        for decoration in &scene.decorations {
            write!(
                writer,
                " {}{}",
                decoration.decoration.glyph(),
                decoration.brightness
            )?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn glyph_at(scene: &Scene, position: Position) -> char {
    let occupant = scene.movables.iter().rev().find(|movable| {
        movable.position.round() == tile_space(position)
    });
    if let Some(movable) = occupant {
        return movable_glyph(movable.kind);
    }

    let Some(cell) = scene.cell(position) else {
        return ' ';
    };
    let glyph = cell.top().map_or(' ', tile_glyph);
    match (glyph, cell.highlight) {
        ('.', Some(color)) if color == TRAIN_PATH_COLOR => '*',
        ('.', Some(_)) => '+',
        _ => glyph,
    }
}

/// Character a tile is drawn as, matching the level file glyphs.
#[must_use]
pub const fn tile_glyph(tile: &Tile) -> char {
    match tile {
        Tile::Wall => '0',
        Tile::Floor => '.',
        Tile::Bombable => '1',
        Tile::Drillable => '4',
        Tile::Water => '5',
        Tile::Lava => '6',
        Tile::Arrow { direction } => match direction {
            Direction::Up => '^',
            Direction::Down => 'v',
            Direction::Left => '<',
            Direction::Right => '>',
        },
        Tile::Bridge { .. } => '=',
        Tile::Start => 's',
        Tile::Finish => 'f',
        Tile::Gate { orientation, color } => match (orientation, color) {
            (GateOrientation::NorthSouth, GateColor::Red) => 'R',
            (GateOrientation::NorthSouth, GateColor::Green) => 'G',
            (GateOrientation::NorthSouth, GateColor::Blue) => 'B',
            (GateOrientation::NorthSouth, GateColor::Orange) => 'O',
            (GateOrientation::EastWest, GateColor::Red) => 'Q',
            (GateOrientation::EastWest, GateColor::Green) => 'W',
            (GateOrientation::EastWest, GateColor::Blue) => 'A',
            (GateOrientation::EastWest, GateColor::Orange) => 'Z',
        },
        Tile::GateSwitch { color, weight, .. } => match (weight, color) {
            (SwitchWeight::Normal, GateColor::Red) => 'r',
            (SwitchWeight::Normal, GateColor::Green) => 'g',
            (SwitchWeight::Normal, GateColor::Blue) => 'b',
            (SwitchWeight::Normal, GateColor::Orange) => 'o',
            (SwitchWeight::Heavy, GateColor::Red) => 'q',
            (SwitchWeight::Heavy, GateColor::Green) => 'w',
            (SwitchWeight::Heavy, GateColor::Blue) => 'a',
            (SwitchWeight::Heavy, GateColor::Orange) => 'z',
        },
    }
}

/// Character a movable is drawn as.
#[must_use]
pub const fn movable_glyph(kind: MovableKind) -> char {
    match kind {
        MovableKind::Block => '#',
        MovableKind::Bot(bot) => match bot {
            BotKind::Generic => '@',
            BotKind::Arrow => 'Y',
            BotKind::Bomb => 'X',
            BotKind::Bridge => 'H',
            BotKind::Turn { .. } => 'T',
            BotKind::Swim => 'S',
            BotKind::Drill => 'D',
            BotKind::Push => 'P',
            BotKind::Caboose => 'C',
        },
    }
}
