#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Bomber session.

mod autopilot;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use bomber_core::{Difficulty, DifficultyProfile};
use bomber_system_enemy_ai::{self as enemy_ai, EnemyAi, DEFAULT_DECISION_INTERVAL};
use bomber_system_session::Session;
use bomber_world::{self as world, query, World};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use autopilot::Autopilot;

/// Simulates a Bomber game with an autopilot player.
#[derive(Debug, Parser)]
#[command(name = "bomber", version, about)]
struct Args {
    /// Difficulty tier providing the default level parameters.
    #[arg(short, long, value_enum, default_value_t = Tier::Normal)]
    difficulty: Tier,

    /// Seed shared by the world and the enemy brains. Entropy when absent.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of simulation ticks to run at 60 Hz.
    #[arg(short, long, default_value_t = 3_600)]
    ticks: u64,

    /// TOML file overriding the tier's level parameters.
    #[arg(short, long, value_name = "FILE")]
    profile: Option<PathBuf>,

    /// Ticks between two decisions of the same enemy.
    #[arg(long, default_value_t = DEFAULT_DECISION_INTERVAL)]
    decision_interval: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Tier {
    Easy,
    Normal,
    Hard,
}

impl From<Tier> for Difficulty {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Easy => Difficulty::Easy,
            Tier::Normal => Difficulty::Normal,
            Tier::Hard => Difficulty::Hard,
        }
    }
}

/// Entry point for the Bomber command-line interface.
fn main() -> Result<()> {
    setup_logging()?;
    let args = Args::parse();
    let difficulty = Difficulty::from(args.difficulty);

    let profile = match &args.profile {
        Some(path) => load_profile(path)?,
        None => difficulty.profile(),
    };

    let mut world_config = world::Config::new(difficulty).with_profile(profile);
    let mut ai_config = enemy_ai::Config::new(difficulty)
        .with_profile(&profile)
        .with_decision_interval(args.decision_interval);
    if let Some(seed) = args.seed {
        world_config = world_config.with_rng_seed(seed);
        ai_config = ai_config.with_rng_seed(seed);
    }

    let mut session = Session::new(World::new(world_config), EnemyAi::new(ai_config));
    let mut autopilot = Autopilot::new(args.seed);
    println!("{}", query::welcome_banner(session.world()));
    tracing::info!(
        ?difficulty,
        grid_size = profile.grid_size,
        enemies = profile.enemy_count,
        seed = ?args.seed,
        "session started"
    );

    let mut events = Vec::new();
    let mut commands = Vec::new();
    for _ in 0..args.ticks {
        if session.is_over() {
            break;
        }

        events.clear();
        session.step(&mut events);

        commands.clear();
        autopilot.decide(
            &query::arena_view(session.world()),
            &query::outstanding_remote_bombs(session.world()),
            &mut commands,
        );
        for command in commands.drain(..) {
            session.submit(command, &mut events);
        }
    }

    print_summary(&session);
    Ok(())
}

fn setup_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("failed to install the tracing subscriber")
}

fn load_profile(path: &Path) -> Result<DifficultyProfile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    let profile: DifficultyProfile = toml::from_str(&text)
        .with_context(|| format!("failed to parse profile {}", path.display()))?;
    profile
        .validate()
        .with_context(|| format!("invalid profile {}", path.display()))?;
    Ok(profile)
}

fn print_summary(session: &Session) {
    let world = session.world();
    let player = query::player(world);

    println!("difficulty: {:?}", query::difficulty(world));
    println!("ticks:      {}", query::tick_index(world));
    println!("level:      {}", query::level(world));
    println!("score:      {}", query::score(world));
    println!("lives:      {}", player.lives);
    println!("enemies:    {}", query::enemy_ids(world).len());
    println!("bombs:      {:?}", query::owned_bomb_types(world));
    println!(
        "outcome:    {}",
        if session.is_over() {
            "game over"
        } else {
            "survived"
        }
    );
}
