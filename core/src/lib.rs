#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Robotrain engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing player input or the passage of a logic tick, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values describing what happened. Systems consume event streams, query
//! immutable views, and respond with new command batches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "All aboard the robotrain.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Latches a clicked board position; it is processed by the next tick.
    Click {
        /// Board cell the player clicked.
        position: Position,
    },
    /// Selects or deselects the specialization applied to the next launch.
    ToggleSpecialization {
        /// Specialization the player picked from the catalog.
        specialization: Specialization,
    },
    /// Runs one discrete logic tick.
    Tick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Reports that a latched click did not hit a highlighted cell.
    ClickIgnored {
        /// Board cell the player clicked.
        position: Position,
    },
    /// Announces that the train started rolling out of the start tile.
    DeploymentStarted {
        /// Direction the cars leave the start tile in.
        direction: Direction,
        /// Cell the first car will stop at.
        target: Position,
        /// Number of generic cars queued ahead of the caboose.
        cars: u32,
    },
    /// Confirms that a car was spawned onto the start tile.
    CarDeployed {
        /// Identifier assigned to the new car.
        car: MovableId,
        /// Behaviour of the new car.
        kind: BotKind,
        /// Cell the car was placed on.
        position: Position,
    },
    /// Reports that the train head received a new stopping point.
    AdvanceOrdered {
        /// Car that received the target.
        car: MovableId,
        /// Cell the car should stop at.
        target: Position,
    },
    /// Reports that a launch was requested and will resolve during the tick.
    LaunchQueued {
        /// Direction the launched car will travel in.
        direction: Direction,
        /// Cell the launched car should stop at.
        target: Position,
    },
    /// Confirms that the head detached into a freshly specialized car.
    CarLaunched {
        /// Head car that was replaced.
        retired: MovableId,
        /// Identifier of the newly created car.
        car: MovableId,
        /// Behaviour of the newly created car.
        kind: BotKind,
        /// Direction the new car travels in.
        direction: Direction,
    },
    /// Reports that a queued launch could not be resolved.
    LaunchDiscarded {
        /// Direction that had been requested.
        direction: Direction,
    },
    /// Confirms that a movable moved between two cells.
    MovableAdvanced {
        /// Movable that moved.
        movable: MovableId,
        /// Cell occupied before the move.
        from: Position,
        /// Cell occupied after the move.
        to: Position,
    },
    /// Reports that a car started dying.
    CarDied {
        /// Car that died.
        car: MovableId,
        /// Hazard that killed the car.
        cause: DeathCause,
    },
    /// Reports that a car's stopping point was passed to another car.
    TargetHandedOff {
        /// Car that held the target.
        from: MovableId,
        /// Car that received the target.
        to: MovableId,
        /// The stopping point itself.
        target: Position,
    },
    /// Reports that a car turned itself into a tile.
    CarConverted {
        /// Car that was consumed.
        car: MovableId,
        /// Tile left behind.
        tile: Tile,
        /// Cell the tile was placed in.
        position: Position,
    },
    /// Confirms that a push bot shoved a block.
    BlockPushed {
        /// Block that moved.
        block: MovableId,
        /// Cell the block left.
        from: Position,
        /// Cell the block entered.
        to: Position,
    },
    /// Reports that every gate of a colour was removed from the board.
    GatesOpened {
        /// Colour of the opened gates.
        color: GateColor,
    },
    /// Reports that tiles were destroyed by a bot.
    TilesDestroyed {
        /// Kind of tile that was removed.
        kind: TileKind,
        /// Cells the tiles were removed from, in removal order.
        positions: Vec<Position>,
    },
    /// Reports that the train stopped because a car reached its target.
    AdvanceHalted {
        /// Car that reached its target.
        car: MovableId,
        /// Cell the car stopped at.
        position: Position,
    },
    /// Announces the specialization applied to the next launch.
    SpecializationChanged {
        /// Newly selected specialization, if any.
        specialization: Option<Specialization>,
    },
    /// Reports that the requested specialization is not unlocked.
    SpecializationRejected {
        /// Specialization that was requested.
        specialization: Specialization,
    },
    /// Announces the end of the level attempt.
    GameOver {
        /// Result of the attempt.
        outcome: Outcome,
    },
}

/// Location of a board cell expressed as row and column indices.
///
/// Ordering is row-major so sorted collections of positions traverse the
/// board row by row.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    row: i32,
    column: i32,
}

impl Position {
    /// Creates a new board position.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Returns the adjacent position one step in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::new(self.row - 1, self.column),
            Direction::Down => Self::new(self.row + 1, self.column),
            Direction::Left => Self::new(self.row, self.column - 1),
            Direction::Right => Self::new(self.row, self.column + 1),
        }
    }

    /// Returns the four orthogonal neighbours in up, down, left, right order.
    #[must_use]
    pub fn neighbors(self) -> [Self; 4] {
        Direction::ALL.map(|direction| self.step(direction))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Cardinal travel directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Direction {
    /// All directions in the order flood fills explore them.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Rotates the direction by 90 degrees with the given handedness.
    #[must_use]
    pub const fn turned(self, handedness: Handedness) -> Self {
        match (handedness, self) {
            (Handedness::Clockwise, Direction::Up) => Direction::Right,
            (Handedness::Clockwise, Direction::Right) => Direction::Down,
            (Handedness::Clockwise, Direction::Down) => Direction::Left,
            (Handedness::Clockwise, Direction::Left) => Direction::Up,
            (Handedness::CounterClockwise, Direction::Up) => Direction::Left,
            (Handedness::CounterClockwise, Direction::Left) => Direction::Down,
            (Handedness::CounterClockwise, Direction::Down) => Direction::Right,
            (Handedness::CounterClockwise, Direction::Right) => Direction::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// Rotational handedness of a turn bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    /// Turns up → right → down → left.
    Clockwise,
    /// Turns up → left → down → right.
    CounterClockwise,
}

/// Colour shared by gates and the switches that open them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateColor {
    /// Red gates and switches.
    Red,
    /// Green gates and switches.
    Green,
    /// Blue gates and switches.
    Blue,
    /// Orange gates and switches.
    Orange,
}

/// Axis a gate is drawn across.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOrientation {
    /// Gate spanning the north-south axis.
    NorthSouth,
    /// Gate spanning the east-west axis.
    EastWest,
}

/// How much weight a switch needs before it triggers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchWeight {
    /// Triggered by any bot or block.
    Normal,
    /// Triggered only by blocks.
    Heavy,
}

/// Visual state of a switch. Loaded with the level and never toggled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchState {
    /// Raised switch.
    Up,
    /// Depressed switch.
    Down,
}

/// Terrain feature stacked inside a board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    /// Impassable wall.
    Wall,
    /// Plain floor.
    Floor,
    /// Obstacle that bomb bots destroy.
    Bombable,
    /// Obstacle that drill bots destroy.
    Drillable,
    /// Water, lethal to everything except swim bots unless bridged.
    Water,
    /// Lava, lethal unless bridged.
    Lava,
    /// Redirects bots entering the cell.
    Arrow {
        /// Direction bots leave the cell in.
        direction: Direction,
    },
    /// Makes water or lava in the same cell safe.
    Bridge {
        /// Direction the bridge was laid in.
        direction: Direction,
    },
    /// Cell the train deploys from.
    Start,
    /// Cell the caboose must reach.
    Finish,
    /// Lethal barrier removed by the matching switch.
    Gate {
        /// Axis the gate is drawn across.
        orientation: GateOrientation,
        /// Colour of the switch that opens the gate.
        color: GateColor,
    },
    /// Opens every gate of its colour.
    GateSwitch {
        /// Colour of the gates the switch opens.
        color: GateColor,
        /// Weight needed to trigger the switch.
        weight: SwitchWeight,
        /// Visual state loaded with the level.
        state: SwitchState,
    },
}

impl Tile {
    /// Returns the type tag of the tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        match self {
            Tile::Wall => TileKind::Wall,
            Tile::Floor => TileKind::Floor,
            Tile::Bombable => TileKind::Bombable,
            Tile::Drillable => TileKind::Drillable,
            Tile::Water => TileKind::Water,
            Tile::Lava => TileKind::Lava,
            Tile::Arrow { .. } => TileKind::Arrow,
            Tile::Bridge { .. } => TileKind::Bridge,
            Tile::Start => TileKind::Start,
            Tile::Finish => TileKind::Finish,
            Tile::Gate { .. } => TileKind::Gate,
            Tile::GateSwitch { .. } => TileKind::GateSwitch,
        }
    }
}

/// Type tag of a [`Tile`], used for containment queries and removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// Tag of [`Tile::Wall`].
    Wall,
    /// Tag of [`Tile::Floor`].
    Floor,
    /// Tag of [`Tile::Bombable`].
    Bombable,
    /// Tag of [`Tile::Drillable`].
    Drillable,
    /// Tag of [`Tile::Water`].
    Water,
    /// Tag of [`Tile::Lava`].
    Lava,
    /// Tag of [`Tile::Arrow`].
    Arrow,
    /// Tag of [`Tile::Bridge`].
    Bridge,
    /// Tag of [`Tile::Start`].
    Start,
    /// Tag of [`Tile::Finish`].
    Finish,
    /// Tag of [`Tile::Gate`].
    Gate,
    /// Tag of [`Tile::GateSwitch`].
    GateSwitch,
}

/// Behaviour variants available to robot cars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotKind {
    /// Plain car with the shared behaviour.
    Generic,
    /// Turns itself into an arrow tile.
    Arrow,
    /// Destroys connected bombable tiles.
    Bomb,
    /// Turns itself into a bridge over water or lava.
    Bridge,
    /// Turns away from walls instead of crashing into them.
    Turn {
        /// Direction of rotation.
        handedness: Handedness,
    },
    /// Survives water.
    Swim,
    /// Destroys drillable tiles.
    Drill,
    /// Pushes blocks out of the way.
    Push,
    /// Last car of the train; decides the outcome of the level.
    Caboose,
}

impl BotKind {
    /// Stable lowercase name of the kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            BotKind::Generic => "generic",
            BotKind::Arrow => "arrow",
            BotKind::Bomb => "bomb",
            BotKind::Bridge => "bridge",
            BotKind::Turn {
                handedness: Handedness::Clockwise,
            } => "turn-cw",
            BotKind::Turn {
                handedness: Handedness::CounterClockwise,
            } => "turn-ccw",
            BotKind::Swim => "swim",
            BotKind::Drill => "drill",
            BotKind::Push => "push",
            BotKind::Caboose => "caboose",
        }
    }
}

impl fmt::Display for BotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of entity that moves around the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovableKind {
    /// A robot car with the given behaviour.
    Bot(BotKind),
    /// An inert block placed by the level.
    Block,
}

/// Unique identifier assigned to a movable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MovableId(u32);

impl MovableId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Order in which bot prototypes unlock across levels.
const PROTOTYPE_ORDER: [&[BotKind]; 9] = [
    &[BotKind::Generic],
    &[BotKind::Arrow],
    &[BotKind::Bomb],
    &[BotKind::Bridge],
    &[
        BotKind::Turn {
            handedness: Handedness::Clockwise,
        },
        BotKind::Turn {
            handedness: Handedness::CounterClockwise,
        },
    ],
    &[BotKind::Swim],
    &[BotKind::Drill],
    &[BotKind::Push],
    &[BotKind::Caboose],
];

/// Bot template applied to the next car launched from the train head.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Specialization(BotKind);

impl Specialization {
    /// Wraps a bot kind as a specialization template.
    #[must_use]
    pub const fn new(kind: BotKind) -> Self {
        Self(kind)
    }

    /// Bot kind the launched car will have.
    #[must_use]
    pub const fn kind(&self) -> BotKind {
        self.0
    }

    /// Looks up a specialization by its stable name, e.g. `turn-cw`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        PROTOTYPE_ORDER
            .iter()
            .flat_map(|variants| variants.iter())
            .find(|kind| kind.name() == name)
            .map(|kind| Self(*kind))
    }

    /// Specializations unlocked by a level with `earned_bots` earned bots.
    ///
    /// The first `earned_bots + 1` prototypes are unlocked; turn bots
    /// contribute one entry per handedness.
    #[must_use]
    pub fn catalog(earned_bots: u32) -> Vec<Self> {
        let unlocked = usize::try_from(earned_bots)
            .unwrap_or(usize::MAX)
            .saturating_add(1);
        PROTOTYPE_ORDER
            .iter()
            .take(unlocked)
            .flat_map(|variants| variants.iter().map(|kind| Self(*kind)))
            .collect()
    }

    /// Specializations first introduced by the level, in catalog order.
    ///
    /// These are the variants of the last `new_bots` unlocked prototypes.
    #[must_use]
    pub fn newly_introduced(earned_bots: u32, new_bots: u32) -> Vec<Self> {
        let unlocked = usize::try_from(earned_bots)
            .unwrap_or(usize::MAX)
            .saturating_add(1)
            .min(PROTOTYPE_ORDER.len());
        let fresh = usize::try_from(new_bots).unwrap_or(usize::MAX).min(unlocked);
        PROTOTYPE_ORDER[unlocked - fresh..unlocked]
            .iter()
            .flat_map(|variants| variants.iter().map(|kind| Self(*kind)))
            .collect()
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Reason a car died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// The car entered a lethal tile.
    Tile(TileKind),
    /// The car shared a cell with a block.
    Block,
    /// The car left the populated board.
    OffBoard,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeathCause::Tile(kind) => write!(f, "{kind:?}"),
            DeathCause::Block => f.write_str("block"),
            DeathCause::OffBoard => f.write_str("the edge of the board"),
        }
    }
}

/// Terminal result of a level attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The caboose reached the finish.
    Won,
    /// The caboose died.
    Lost,
}

/// Overlay channel a path highlight is written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathChannel {
    /// Cells the train can be sent to.
    Train,
    /// Cells a specialized car can be launched toward.
    Launch,
}

/// Coarse phase of the train and deployment state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrainState {
    /// Waiting for the player to pick the deploy direction.
    NotDeployed,
    /// Cars are still rolling out of the start tile.
    Deploying,
    /// The train is advancing toward a target.
    Moving,
    /// The train is paused until the player picks the next target.
    AwaitingClick,
    /// A launch was requested and resolves on the next tick.
    Launching,
    /// The caboose reached the finish.
    Won,
    /// The caboose died.
    Lost,
}

/// Metadata header of a level.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Title shown when the level starts.
    pub title: String,
    /// Number of generic cars deployed ahead of the caboose.
    pub bot_count: u32,
    /// Number of earned bots, which unlocks specializations.
    pub earned_bots: u32,
    /// Number of specializations introduced by this level.
    pub new_bots: u32,
    /// Description shown when the level starts.
    pub description: String,
    /// Position of the start tile.
    pub start: Position,
}

/// Fully decoded level ready to seed a world.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Level {
    /// Metadata header.
    pub info: LevelInfo,
    /// Tiles in placement order; cells stack tiles in this order.
    pub tiles: Vec<(Position, Tile)>,
    /// Cells that start with a block on them.
    pub blocks: Vec<Position>,
}
