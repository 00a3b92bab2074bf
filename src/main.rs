//! Hexfold - Entry Point
//!
//! Runs a self-playing game between reference policies and prints a JSON
//! report of the outcome. Useful for watching the resolver work and for
//! reproducing a run from a seed.

use clap::Parser;
use serde::Serialize;

use hexfold::core::config::GameConfig;
use hexfold::core::error::{EngineError, Result};
use hexfold::game::{Game, GameStatus, PlayerStatus, ResourcePattern};
use hexfold::grid::board::{DegreesOfFreedom, Shape};
use hexfold::policy::{ChasePolicy, Policy, RandomWalkPolicy};

#[derive(Parser, Debug)]
#[command(name = "hexfold", about = "Self-playing territorial capture demo")]
struct Args {
    /// Map radius
    #[arg(long, default_value_t = 9)]
    length: i32,

    /// Map shape: hexagon, rhombus or square
    #[arg(long, default_value = "hexagon")]
    shape: String,

    /// Hole lattice density: 3, 4, 5 or 6 (6 = no holes)
    #[arg(long, default_value_t = 6)]
    degrees_of_freedom: u8,

    /// Resource placement: casual, uniform, snowflake or empty
    #[arg(long, default_value = "snowflake")]
    pattern: String,

    /// RNG seed; the same seed replays the same game
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Maximum number of rounds to play
    #[arg(long, default_value_t = 200)]
    rounds: u64,

    /// Disable unit conversion
    #[arg(long)]
    invulnerable: bool,
}

#[derive(Serialize)]
struct PlayerReport {
    name: String,
    status: String,
    units: usize,
}

#[derive(Serialize)]
struct GameReport {
    rounds_played: u64,
    status: String,
    total_units: usize,
    players: Vec<PlayerReport>,
}

fn parse_shape(raw: &str) -> Result<Shape> {
    match raw {
        "hexagon" => Ok(Shape::Hexagon),
        "rhombus" => Ok(Shape::Rhombus),
        "square" => Ok(Shape::Square),
        other => Err(EngineError::InvalidConfig(format!(
            "unknown shape '{other}'"
        ))),
    }
}

fn parse_degrees_of_freedom(raw: u8) -> Result<DegreesOfFreedom> {
    match raw {
        3 => Ok(DegreesOfFreedom::Three),
        4 => Ok(DegreesOfFreedom::Four),
        5 => Ok(DegreesOfFreedom::Five),
        6 => Ok(DegreesOfFreedom::Six),
        other => Err(EngineError::InvalidConfig(format!(
            "degrees of freedom must be 3..=6, got {other}"
        ))),
    }
}

fn parse_pattern(raw: &str) -> Result<ResourcePattern> {
    match raw {
        "casual" => Ok(ResourcePattern::Casual),
        "uniform" => Ok(ResourcePattern::Uniform),
        "snowflake" => Ok(ResourcePattern::Snowflake),
        "empty" => Ok(ResourcePattern::Empty),
        other => Err(EngineError::InvalidConfig(format!(
            "unknown pattern '{other}'"
        ))),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hexfold=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = GameConfig {
        length: args.length,
        shape: parse_shape(&args.shape)?,
        degrees_of_freedom: parse_degrees_of_freedom(args.degrees_of_freedom)?,
        resource_pattern: parse_pattern(&args.pattern)?,
        invulnerable_units: args.invulnerable,
        seed: args.seed,
    };

    let mut game = Game::new(config, &["Hunter", "Wanderer"])?;
    tracing::info!(
        "game starts: {} cells, {} units",
        game.board().total_cells(),
        game.unit_count()
    );

    let mut policies: Vec<(hexfold::core::types::PlayerId, Box<dyn Policy>)> = game
        .player_ids()
        .into_iter()
        .filter(|&player| player != game.resource_player())
        .zip([
            Box::new(ChasePolicy) as Box<dyn Policy>,
            Box::new(RandomWalkPolicy::new(args.seed ^ 0x5eed)) as Box<dyn Policy>,
        ])
        .collect();

    let mut rounds_played = 0;
    while game.status() == GameStatus::Active && rounds_played < args.rounds {
        for (player, policy) in policies.iter_mut() {
            for (unit, order) in policy.decide(&mut game, *player) {
                game.submit_order(unit, order);
            }
        }
        let round = game.advance_round()?;
        tracing::info!(
            "round {}: {}/{} intents granted",
            round.number,
            round.granted_intents,
            round.total_intents
        );
        rounds_played += 1;
    }

    let report = GameReport {
        rounds_played,
        status: format!("{:?}", game.status()),
        total_units: game.unit_count(),
        players: game
            .player_ids()
            .into_iter()
            .map(|player| {
                let p = game.player(player);
                PlayerReport {
                    name: p.name.clone(),
                    status: match p.status {
                        PlayerStatus::Playing => "Playing".to_string(),
                        PlayerStatus::Defeated => "Defeated".to_string(),
                        PlayerStatus::Victorious => "Victorious".to_string(),
                    },
                    units: p.unit_count(),
                }
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
