#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Decodes the Robotrain level text format.
//!
//! A level file starts with five header lines (title, bot count, earned bot
//! count, new bot count, description) followed by a character grid. Every
//! glyph expands into a stack of tiles and, for `3`, a block. Spaces leave the
//! cell absent.

use std::fmt;

use robotrain_core::{
    Direction, GateColor, GateOrientation, Level, LevelInfo, Position, SwitchState, SwitchWeight,
    Tile,
};
use thiserror::Error;

/// Header lines preceding the character grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderField {
    /// Title shown when the level starts.
    Title,
    /// Number of generic cars deployed ahead of the caboose.
    BotCount,
    /// Number of earned bots.
    EarnedBots,
    /// Number of specializations introduced by the level.
    NewBots,
    /// Description shown when the level starts.
    Description,
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::BotCount => "bot count",
            Self::EarnedBots => "earned bot count",
            Self::NewBots => "new bot count",
            Self::Description => "description",
        };
        f.write_str(name)
    }
}

/// Errors raised while decoding a level file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// The file ended before the header was complete.
    #[error("level is missing its {0} line")]
    MissingHeader(HeaderField),
    /// A numeric header line could not be parsed.
    #[error("{field} '{value}' is not a non-negative integer")]
    InvalidNumber {
        /// Header line that failed to parse.
        field: HeaderField,
        /// Raw text of the line.
        value: String,
    },
    /// The grid contains a character without a tile encoding.
    #[error("unknown glyph '{glyph}' at row {row}, column {column}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based grid row.
        row: i32,
        /// Zero-based grid column.
        column: i32,
    },
    /// The grid has no start tile.
    #[error("level has no start tile")]
    MissingStart,
}

/// Parses level text into a [`Level`].
///
/// When several start tiles are present the last one in row-major order
/// becomes the deployment origin.
pub fn parse(text: &str) -> Result<Level, LevelError> {
    let mut lines = text.lines();
    let mut header = |field| lines.next().ok_or(LevelError::MissingHeader(field));

    let title = header(HeaderField::Title)?.to_owned();
    let bot_count = parse_count(header(HeaderField::BotCount)?, HeaderField::BotCount)?;
    let earned_bots = parse_count(header(HeaderField::EarnedBots)?, HeaderField::EarnedBots)?;
    let new_bots = parse_count(header(HeaderField::NewBots)?, HeaderField::NewBots)?;
    let description = header(HeaderField::Description)?.to_owned();

    let mut tiles = Vec::new();
    let mut blocks = Vec::new();
    let mut start = None;
    for (row, line) in lines.enumerate() {
        for (column, glyph) in line.chars().enumerate() {
            let position = Position::new(index(row), index(column));
            let Some(encoding) = decode(glyph) else {
                return Err(LevelError::UnknownGlyph {
                    glyph,
                    row: position.row(),
                    column: position.column(),
                });
            };
            for tile in encoding.tiles.into_iter().flatten() {
                if tile == Tile::Start {
                    start = Some(position);
                }
                tiles.push((position, tile));
            }
            if encoding.block {
                blocks.push(position);
            }
        }
    }

    Ok(Level {
        info: LevelInfo {
            title,
            bot_count,
            earned_bots,
            new_bots,
            description,
            start: start.ok_or(LevelError::MissingStart)?,
        },
        tiles,
        blocks,
    })
}

fn parse_count(line: &str, field: HeaderField) -> Result<u32, LevelError> {
    line.trim()
        .parse()
        .map_err(|_| LevelError::InvalidNumber {
            field,
            value: line.to_owned(),
        })
}

fn index(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Tile stack and movable produced by one grid character.
struct Encoding {
    tiles: [Option<Tile>; 2],
    block: bool,
}

impl Encoding {
    const EMPTY: Self = Self {
        tiles: [None, None],
        block: false,
    };

    const fn single(tile: Tile) -> Self {
        Self {
            tiles: [Some(tile), None],
            block: false,
        }
    }

    const fn on_floor(tile: Tile) -> Self {
        Self {
            tiles: [Some(Tile::Floor), Some(tile)],
            block: false,
        }
    }
}

fn decode(glyph: char) -> Option<Encoding> {
    let encoding = match glyph {
        ' ' => Encoding::EMPTY,
        '.' | '2' | '{' | '}' | '[' | ']' => Encoding::single(Tile::Floor),
        '0' => Encoding::single(Tile::Wall),
        '1' => Encoding::on_floor(Tile::Bombable),
        '3' => Encoding {
            block: true,
            ..Encoding::single(Tile::Floor)
        },
        '4' => Encoding::on_floor(Tile::Drillable),
        '5' => Encoding::single(Tile::Water),
        '6' => Encoding::single(Tile::Lava),
        '<' => arrow(Direction::Left),
        '>' => arrow(Direction::Right),
        '^' => arrow(Direction::Up),
        'v' => arrow(Direction::Down),
        's' => Encoding::on_floor(Tile::Start),
        'f' => Encoding::on_floor(Tile::Finish),
        'r' => switch(GateColor::Red, SwitchWeight::Normal),
        'g' => switch(GateColor::Green, SwitchWeight::Normal),
        'b' => switch(GateColor::Blue, SwitchWeight::Normal),
        'o' => switch(GateColor::Orange, SwitchWeight::Normal),
        'q' => switch(GateColor::Red, SwitchWeight::Heavy),
        'w' => switch(GateColor::Green, SwitchWeight::Heavy),
        'a' => switch(GateColor::Blue, SwitchWeight::Heavy),
        'z' => switch(GateColor::Orange, SwitchWeight::Heavy),
        'R' => gate(GateColor::Red, GateOrientation::NorthSouth),
        'G' => gate(GateColor::Green, GateOrientation::NorthSouth),
        'B' => gate(GateColor::Blue, GateOrientation::NorthSouth),
        'O' => gate(GateColor::Orange, GateOrientation::NorthSouth),
        'Q' => gate(GateColor::Red, GateOrientation::EastWest),
        'W' => gate(GateColor::Green, GateOrientation::EastWest),
        'A' => gate(GateColor::Blue, GateOrientation::EastWest),
        'Z' => gate(GateColor::Orange, GateOrientation::EastWest),
        _ => return None,
    };
    Some(encoding)
}

const fn arrow(direction: Direction) -> Encoding {
    Encoding::on_floor(Tile::Arrow { direction })
}

const fn switch(color: GateColor, weight: SwitchWeight) -> Encoding {
    Encoding::on_floor(Tile::GateSwitch {
        color,
        weight,
        state: SwitchState::Up,
    })
}

const fn gate(color: GateColor, orientation: GateOrientation) -> Encoding {
    Encoding::on_floor(Tile::Gate { orientation, color })
}
