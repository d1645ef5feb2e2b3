//! Ladder maintenance CLI.
//!
//! Usage:
//!   ladder --data-dir /path/to/logs --snapshot ladder.json.gz [options]
//!
//! Logs are read from `tenhou/`, `paipu/` and `offline/` under the data dir.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use ladder::game::GameKindRegistry;
use ladder::ingest;
use ladder::score::{DrawWithManganPolicy, ScoringConfig};
use ladder::{GameAggregator, Ladder};

#[derive(Parser, Debug)]
#[command(name = "ladder", about = "Ingest mahjong game logs into a rating ladder")]
struct Args {
    /// Directory with tenhou/, paipu/ and offline/ log subdirectories.
    #[arg(long)]
    data_dir: PathBuf,

    /// Ladder snapshot (.json.gz). Loaded if it exists, written back after ingestion.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// How a draw with a mangan in the discards is paid: draw or tsumo.
    #[arg(long, default_value = "draw")]
    draw_with_mangan: DrawWithManganPolicy,

    /// JSON array of extra game kinds.
    #[arg(long)]
    kinds: Option<PathBuf>,

    /// JSON array of `{player_id, player_name}` to create before ingestion.
    #[arg(long)]
    players: Option<PathBuf>,

    /// Rebuild every standing from the stored games after ingestion.
    #[arg(long)]
    recompute: bool,

    /// Number of leaderboard rows to print (0 = none).
    #[arg(long, default_value = "20")]
    top: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut registry = GameKindRegistry::builtin();
    if let Some(path) = &args.kinds {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let n = registry
            .extend_from_json(BufReader::new(file))
            .with_context(|| format!("failed to load game kinds from {}", path.display()))?;
        log::info!("loaded {n} game kinds from {}", path.display());
    }
    let aggregator = GameAggregator::new(registry, ScoringConfig::new(args.draw_with_mangan));

    let mut ladder = match &args.snapshot {
        Some(path) if path.exists() => Ladder::load(path)?,
        _ => Ladder::new(),
    };
    if let Some(path) = &args.players {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let n = ladder
            .players
            .seed_from_json(BufReader::new(file))
            .with_context(|| format!("failed to seed players from {}", path.display()))?;
        log::info!("seeded {n} players");
    }

    eprintln!("=== Ladder Ingestion ===");
    eprintln!("Data dir:     {}", args.data_dir.display());
    if let Some(path) = &args.snapshot {
        eprintln!("Snapshot:     {}", path.display());
    }
    eprintln!("Game kinds:   {}", aggregator.registry().len());
    eprintln!("Mangan draw:  {}", args.draw_with_mangan);
    eprintln!("Stored:       {} games, {} players", ladder.games.len(), ladder.players.len());
    eprintln!();

    let start = Instant::now();
    let pending = ingest::discover(&args.data_dir, &ladder).context("failed to discover game logs")?;
    eprintln!("Found {} new games", pending.len());
    let report = ingest::ingest_all(&pending, &aggregator, &mut ladder);

    if args.recompute {
        ladder.recompute().context("recompute failed")?;
        eprintln!("Recomputed {} games", ladder.games.len());
    }
    if let Some(path) = &args.snapshot {
        ladder.save(path).context("failed to save ladder")?;
    }

    eprintln!();
    eprintln!("=== Summary ===");
    eprintln!("Stored:       {}", report.stored);
    eprintln!("Duplicates:   {}", report.duplicates);
    eprintln!("Failed:       {}", report.failed);
    eprintln!("Total time:   {:.1}s", start.elapsed().as_secs_f64());

    if args.top > 0 {
        eprintln!();
        for (rank, player) in ladder.players.leaderboard().iter().take(args.top).enumerate() {
            println!("{:>3}. {player} R{:.0}", rank + 1, player.rating);
        }
    }

    Ok(())
}
