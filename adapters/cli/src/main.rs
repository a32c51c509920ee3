#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a Robotrain level headlessly.

mod config;
mod progress;
mod script;

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info};
use robotrain_core::{Command, Event, Level};
use robotrain_rendering::{
    DecorationClock, FrameControl, Presentation, RenderingBackend, Scene, TextBackend,
};
use robotrain_system_bootstrap::Bootstrap;
use robotrain_system_progression::{self as progression, LevelDecision, Progression};
use robotrain_system_scheduler::Scheduler;
use robotrain_world::{self as world, query, World};

use config::Config;
use progress::Progress;
use script::{Action, Script};

/// Command-line arguments accepted by the binary.
#[derive(Debug, Parser)]
#[command(name = "robotrain", about = "Replays Robotrain levels in the terminal")]
struct Args {
    /// Level file to play once. Defaults to the configured level list.
    #[arg(long)]
    level: Option<PathBuf>,
    /// Index into the configured level list. Defaults to the saved progress.
    #[arg(long)]
    level_index: Option<usize>,
    /// TOML file with the clicks and specializations to replay. Repeat it to
    /// script each attempt in order.
    #[arg(long)]
    script: Vec<PathBuf>,
    /// Configuration file.
    #[arg(long, default_value = "robotrain.toml")]
    config: PathBuf,
    /// Move on to the next level after a win instead of replaying it.
    #[arg(long)]
    proceed: bool,
}

/// Entry point for the Robotrain command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    if let Some(path) = &args.level {
        let mut progression = Progression::new(0, 1);
        let session = play(path, script_for(&args, 0)?, &config)?;
        let _ = report(&session, &mut progression, args.proceed);
        return Ok(());
    }

    if config.levels.is_empty() {
        bail!(
            "no level given and {} lists no levels",
            args.config.display()
        );
    }
    let start = match args.level_index {
        Some(level_index) => level_index,
        None => Progress::load(&config.progress_file)?.level_index,
    };
    let mut progression = Progression::new(start, config.levels.len());

    // At most one attempt per level; anything but an advance ends the run.
    for attempt in 0..progression.level_count() {
        let Some(path) = config.levels.get(progression.level_index()) else {
            bail!("level index {} is out of range", progression.level_index());
        };
        let session = play(path, script_for(&args, attempt)?, &config)?;
        let decision = report(&session, &mut progression, args.proceed);
        Progress {
            level_index: progression.level_index(),
        }
        .save(&config.progress_file)?;
        if !matches!(decision, Some(LevelDecision::Advance { .. })) {
            break;
        }
    }
    Ok(())
}

fn script_for(args: &Args, attempt: usize) -> Result<Script> {
    match args.script.get(attempt) {
        Some(path) => Script::load(path),
        None => Ok(Script::default()),
    }
}

/// Plays one level to its outcome or to the tick limit.
fn play(path: &Path, script: Script, config: &Config) -> Result<Session> {
    let world = World::new(load_level(path)?);
    let bootstrap = Bootstrap::default();
    let briefing = bootstrap.briefing(&world);
    println!("{}", bootstrap.welcome_banner(&world));
    println!("{}\n{}", briefing.title, briefing.description);
    for specialization in &briefing.introduced {
        println!("new bot: {specialization}");
    }

    let cadence = config.scheduler();
    let mut session = Session::new(world, Scheduler::new(cadence), script, config.max_ticks);
    let presentation = Presentation::new(briefing.title, session.capture());
    let max_frames = config
        .max_ticks
        .saturating_add(1)
        .saturating_mul(u64::from(config.frames_per_second.max(1)));
    let backend = TextBackend::new(io::stdout().lock(), cadence.frame_interval(), max_frames);
    backend.run(presentation, |frame_dt, scene| session.frame(frame_dt, scene))?;
    Ok(session)
}

/// Prints how the attempt ended and what loads next.
fn report(
    session: &Session,
    progression: &mut Progression,
    proceed: bool,
) -> Option<LevelDecision> {
    let Some(outcome) = query::outcome(&session.world) else {
        println!("stopped after {} ticks", query::tick_index(&session.world));
        return None;
    };
    println!("{}", progression::message(outcome));
    let decision = progression.handle(&session.events, proceed);
    match decision {
        Some(LevelDecision::Advance { level_index }) => println!("next level: {level_index}"),
        Some(LevelDecision::Retry { level_index }) => println!("retry level: {level_index}"),
        None => {}
    }
    decision
}

fn load_level(path: &Path) -> Result<Level> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read level at {}", path.display()))?;
    robotrain_level::parse(&text)
        .with_context(|| format!("failed to parse level {}", path.display()))
}

/// Drives the world from scripted input and scheduler ticks.
struct Session {
    world: World,
    scheduler: Scheduler,
    script: Script,
    clock: DecorationClock,
    waiting: u64,
    max_ticks: u64,
    events: Vec<Event>,
}

impl Session {
    fn new(world: World, scheduler: Scheduler, script: Script, max_ticks: u64) -> Self {
        let mut session = Self {
            world,
            scheduler,
            script,
            clock: DecorationClock::new(),
            waiting: 0,
            max_ticks,
            events: Vec::new(),
        };
        session.scheduler.start();
        session
    }

    fn capture(&self) -> Scene {
        Scene::capture(&self.world, self.scheduler.interpolation(), &self.clock)
    }

    fn frame(&mut self, frame_dt: Duration, scene: &mut Scene) -> FrameControl {
        let mut frame_events = Vec::new();
        while self.waiting == 0 {
            match self.script.next_action() {
                Some(Action::Send(command)) => {
                    world::apply(&mut self.world, command, &mut frame_events);
                }
                Some(Action::Wait(ticks)) => self.waiting = ticks,
                None => break,
            }
        }

        let mut commands = Vec::new();
        self.scheduler.handle(frame_dt, &mut commands);
        for command in commands {
            if command == Command::Tick {
                self.waiting = self.waiting.saturating_sub(1);
            }
            world::apply(&mut self.world, command, &mut frame_events);
        }

        for event in &frame_events {
            debug!("tick {}: {event:?}", query::tick_index(&self.world));
        }
        self.scheduler.observe(&frame_events);
        self.events.extend(frame_events);
        self.clock.advance();
        *scene = self.capture();

        if let Some(outcome) = query::outcome(&self.world) {
            info!("finished with {outcome:?}");
            return FrameControl::Exit;
        }
        if query::tick_index(&self.world) >= self.max_ticks {
            info!("tick limit {} reached", self.max_ticks);
            return FrameControl::Exit;
        }
        FrameControl::Continue
    }
}
