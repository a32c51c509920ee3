#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Decides what happens after a level attempt ends.

use log::info;
use robotrain_core::{Event, Outcome};

/// Message presented when the caboose reaches the finish.
pub const WIN_MESSAGE: &str = "Your robotrain is unstoppable!";

/// Message presented when the caboose is lost.
pub const LOSS_MESSAGE: &str = "Level Failed!";

/// Level to load once an attempt is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelDecision {
    /// Load the following level.
    Advance {
        /// Index of the level to load.
        level_index: usize,
    },
    /// Reload the level that was just played.
    Retry {
        /// Index of the level to load.
        level_index: usize,
    },
}

impl LevelDecision {
    /// Index of the level the decision loads.
    #[must_use]
    pub const fn level_index(&self) -> usize {
        match self {
            Self::Advance { level_index } | Self::Retry { level_index } => *level_index,
        }
    }
}

/// Tracks the current position in the level list.
#[derive(Debug)]
pub struct Progression {
    level_index: usize,
    level_count: usize,
}

impl Progression {
    /// Creates a tracker positioned at `level_index` within `level_count` levels.
    ///
    /// Out-of-range indices fall back to the first level.
    #[must_use]
    pub const fn new(level_index: usize, level_count: usize) -> Self {
        Self {
            level_index: wrap(level_index, level_count),
            level_count,
        }
    }

    /// Index of the level currently being played.
    #[must_use]
    pub const fn level_index(&self) -> usize {
        self.level_index
    }

    /// Number of levels in the list.
    #[must_use]
    pub const fn level_count(&self) -> usize {
        self.level_count
    }

    /// Consumes world events and decides the next level once the attempt ended.
    ///
    /// A win advances only when `proceed` is set; declining replays the level.
    /// A loss always replays it.
    pub fn handle(&mut self, events: &[Event], proceed: bool) -> Option<LevelDecision> {
        let outcome = events.iter().find_map(|event| match event {
            Event::GameOver { outcome } => Some(*outcome),
            _ => None,
        })?;

        let decision = match outcome {
            Outcome::Won if proceed => {
                self.level_index = wrap(self.level_index.saturating_add(1), self.level_count);
                LevelDecision::Advance {
                    level_index: self.level_index,
                }
            }
            Outcome::Won | Outcome::Lost => LevelDecision::Retry {
                level_index: self.level_index,
            },
        };
        info!("{} -> {decision:?}", message(outcome));
        Some(decision)
    }
}

/// Text shown to the player for an outcome.
#[must_use]
pub const fn message(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Won => WIN_MESSAGE,
        Outcome::Lost => LOSS_MESSAGE,
    }
}

const fn wrap(level_index: usize, level_count: usize) -> usize {
    if level_index < level_count {
        level_index
    } else {
        0
    }
}
