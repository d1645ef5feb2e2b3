//! Player standings, the stores that hold them and the engines that update
//! them.

mod aggregator;
pub mod player;
mod rating;
mod store;

pub use aggregator::{GameAggregator, Ingested};
pub use player::{ExternalId, PlayerData, PlayerSnapshot};
pub use rating::RatingEngine;
pub use store::{GameStore, PlayerDirectory, PlayerStore};

use crate::convlog::GameRecord;
use crate::error::IngestResult;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

/// Both stores, saved and loaded together as one gzip JSON snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ladder {
    pub games: GameStore,
    pub players: PlayerStore,
}

impl Ladder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, aggregator: &GameAggregator, record: &GameRecord) -> IngestResult<Ingested> {
        aggregator.ingest(record, &mut self.games, &mut self.players)
    }

    /// Replays every stored game by date from fresh players.
    pub fn recompute(&mut self) -> IngestResult<()> {
        RatingEngine::recompute_all(&mut self.games, &mut self.players)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let reader = BufReader::new(GzDecoder::new(file));
        serde_json::from_reader(reader).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut encoder, self).context("failed to serialize ladder")?;
        encoder
            .finish()
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
