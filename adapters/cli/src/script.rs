//! Scripted player input replayed against a level.
//!
//! ```toml
//! [[actions]]
//! click = { row = 0, column = 4 }
//!
//! [[actions]]
//! wait = 6
//!
//! [[actions]]
//! specialize = "bridge"
//! ```

use std::{collections::VecDeque, fs, path::Path};

use anyhow::{anyhow, Context, Result};
use robotrain_core::{Command, Position, Specialization};

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptFile {
    #[serde(default)]
    actions: Vec<RawAction>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawAction {
    Click { row: i32, column: i32 },
    Specialize(String),
    Wait(u64),
}

/// One step of player input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    /// Command applied before the next frame.
    Send(Command),
    /// Let the given number of ticks pass before the next action.
    Wait(u64),
}

/// Remaining actions of a script.
#[derive(Debug, Default)]
pub(crate) struct Script {
    actions: VecDeque<Action>,
}

impl Script {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read script at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid script {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let file: ScriptFile =
            toml::from_str(contents).context("failed to parse script toml contents")?;
        let actions = file
            .actions
            .into_iter()
            .map(|action| match action {
                RawAction::Click { row, column } => Ok(Action::Send(Command::Click {
                    position: Position::new(row, column),
                })),
                RawAction::Specialize(name) => Specialization::from_name(&name)
                    .map(|specialization| {
                        Action::Send(Command::ToggleSpecialization { specialization })
                    })
                    .ok_or_else(|| anyhow!("unknown specialization `{name}`")),
                RawAction::Wait(ticks) => Ok(Action::Wait(ticks)),
            })
            .collect::<Result<_>>()?;
        Ok(Self { actions })
    }

    pub(crate) fn next_action(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }
}
