//! Mahjong game log decoding, round scoring and a tiered rating ladder.
//!
//! Logs from three sources ([`convlog`]) are replayed round by round
//! ([`state`]), scored ([`score`]) and folded into per-player standings
//! ([`ladder`]).

pub mod convlog;
pub mod error;
pub mod game;
pub mod ingest;
pub mod ladder;
pub mod meld;
pub mod score;
pub mod state;
pub mod tile;

pub use convlog::{GameRecord, LogSource};
pub use error::{IngestError, IngestResult};
pub use ladder::{GameAggregator, Ladder};
