#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the evacuation simulation headless.

mod config;
mod script;

use std::{
    fs,
    io::{self, IsTerminal, Read},
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use evacsim_core::{Command, Event, Severity};
use evacsim_rendering::{Scene, Viewport};
use evacsim_system_driver::Driver;
use evacsim_world::{query, Config};
use glam::Vec2;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{FileConfig, Settings},
    script::{Directive, Script},
};

const DEFAULT_LOG_FILTER: &str = "warn,evacsim=info,evacsim_world=info";

/// Runs an evacuation scenario without a window and prints the final grid.
#[derive(Debug, Parser)]
#[command(name = "evacsim", version)]
struct Args {
    /// TOML file providing run settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of grid columns.
    #[arg(long)]
    columns: Option<u32>,
    /// Number of grid rows.
    #[arg(long)]
    rows: Option<u32>,
    /// Seed for the deterministic generator. Defaults to the system clock.
    #[arg(long)]
    seed: Option<u64>,
    /// Agents spawned before the first frame.
    #[arg(long)]
    agents: Option<u32>,
    /// Number of frames to simulate.
    #[arg(long)]
    ticks: Option<u64>,
    /// Target frames per second.
    #[arg(long)]
    tick_rate: Option<u32>,
    /// Report a constant frame time and skip pacing, so runs replay exactly.
    #[arg(long)]
    fixed_step: bool,
    /// Script of timed commands, or `-` to read from standard input.
    #[arg(long)]
    script: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> FileConfig {
        FileConfig {
            columns: self.columns,
            rows: self.rows,
            seed: self.seed,
            agents: self.agents,
            ticks: self.ticks,
            tick_rate: self.tick_rate,
            ..FileConfig::default()
        }
    }
}

/// Entry point for the evacuation simulation command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let args = Args::parse();
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(file, args.overrides())?;
    let mut script = match &args.script {
        Some(path) => load_script(path)?,
        None => Script::default(),
    };

    info!(
        columns = settings.columns,
        rows = settings.rows,
        seed = settings.seed,
        agents = settings.agents,
        ticks = settings.ticks,
        tick_rate = settings.tick_rate,
        fixed_step = args.fixed_step,
        directives = script.len(),
        "starting headless run"
    );

    let clock = if args.fixed_step {
        Clock::fixed(settings.tick_rate)
    } else {
        Clock::paced(settings.tick_rate)
    };
    let scene = run(&settings, &mut script, clock);
    println!("{scene}");
    Ok(())
}

fn load_script(path: &Path) -> Result<Script> {
    let source = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        let _ = io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read script from standard input")?;
        buffer
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read script at {}", path.display()))?
    };
    Script::parse(&source).with_context(|| format!("invalid script {}", path.display()))
}

/// Source of the frame time handed to the driver.
#[derive(Debug)]
enum Clock {
    /// Every frame reports exactly one frame budget and nothing sleeps.
    Fixed { budget: Duration },
    /// Frames report measured wall-clock time and sleep off the rest of the budget.
    Paced {
        budget: Duration,
        previous: Instant,
    },
}

impl Clock {
    fn fixed(tick_rate: u32) -> Self {
        Self::Fixed {
            budget: Duration::from_secs(1) / tick_rate,
        }
    }

    fn paced(tick_rate: u32) -> Self {
        Self::Paced {
            budget: Duration::from_secs(1) / tick_rate,
            previous: Instant::now(),
        }
    }

    /// Time elapsed since the previous frame started.
    fn start_frame(&mut self) -> Duration {
        match self {
            Self::Fixed { budget } => *budget,
            Self::Paced { previous, .. } => {
                let now = Instant::now();
                let elapsed = now.duration_since(*previous);
                *previous = now;
                elapsed
            }
        }
    }

    /// Sleeps until the current frame has used its budget.
    fn finish_frame(&self) {
        if let Self::Paced { budget, previous } = self {
            if let Some(remaining) = budget.checked_sub(previous.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }
}

fn run(settings: &Settings, script: &mut Script, mut clock: Clock) -> Scene {
    let mut driver = Driver::new(Config::new(settings.columns, settings.rows, settings.seed));
    let viewport = Viewport::fit(
        Vec2::from_array(settings.viewport),
        settings.columns,
        settings.rows,
    );
    let mut events = Vec::new();

    driver.submit(Command::SpawnAgents {
        count: settings.agents,
    });

    for frame in 0..settings.ticks {
        for (_, directive) in script.due(frame) {
            match directive {
                Directive::Command(line) => driver.submit_line(line, &mut events),
                Directive::Click(pixel) => match viewport.toggle_wall_at(*pixel) {
                    Some(command) => driver.submit(command),
                    None => warn!(x = pixel.x, y = pixel.y, "click outside the grid"),
                },
                Directive::Inspect(pixel) => inspect(&driver, &viewport, *pixel),
            }
        }

        driver.frame(clock.start_frame(), &mut events);
        for event in events.drain(..) {
            notify(&event);
        }
        clock.finish_frame();
    }

    let stats = query::stats(driver.world());
    info!(
        tick = query::tick_index(driver.world()),
        active = stats.active,
        evacuated = stats.evacuated,
        casualties = stats.casualties,
        "run finished"
    );
    Scene::capture(driver.world(), driver.analytics().last_snapshot())
}

fn inspect(driver: &Driver, viewport: &Viewport, pixel: Vec2) {
    let Some(id) = viewport.agent_at(driver.world(), pixel) else {
        info!(x = pixel.x, y = pixel.y, "no agent under pointer");
        return;
    };
    let view = query::agent_view(driver.world());
    if let Some(agent) = view.get(id) {
        info!(
            agent = id.get(),
            cell = %agent.cell,
            state = ?agent.state,
            speed = agent.speed,
            waypoints = agent.path.len(),
            "agent under pointer"
        );
    }
}

fn notify(event: &Event) {
    match event {
        Event::TimeAdvanced { .. } | Event::CommandRejected { .. } => {}
        Event::StatsPublished { snapshot } => debug!(
            active = snapshot.stats.active,
            evacuated = snapshot.stats.evacuated,
            casualties = snapshot.stats.casualties,
            fps = snapshot.frames_per_second,
            "stats"
        ),
        _ => match event.severity() {
            Severity::Critical => error!("{}", event.message()),
            Severity::Warning => warn!("{}", event.message()),
            Severity::Success | Severity::Info => info!("{}", event.message()),
        },
    }
}
