//! Game records in the formats the ladder ingests, and their reduction to
//! one source-independent [`DecodedGame`].

pub mod majsoul;
pub mod offline;
pub mod tenhou;
mod yaku;

pub use majsoul::Paipu;
pub use offline::OfflineGame;
pub use tenhou::TenhouLog;
pub use yaku::display_name as yaku_display_name;

use crate::error::IngestResult;
use crate::game::{GameKind, GameKindRegistry};
use crate::ladder::ExternalId;
use crate::score::{RoundResult, ScoringConfig};
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use anyhow::{Error, bail};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSource {
    Tenhou,
    Majsoul,
    Offline,
}

impl LogSource {
    pub const ALL: [Self; 3] = [Self::Tenhou, Self::Majsoul, Self::Offline];

    /// Directory the ingestion loop reads this source from.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Tenhou => "tenhou",
            Self::Majsoul => "paipu",
            Self::Offline => "offline",
        }
    }
}

impl FromStr for LogSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tenhou" => Ok(Self::Tenhou),
            "majsoul" | "paipu" => Ok(Self::Majsoul),
            "offline" => Ok(Self::Offline),
            _ => bail!("unknown log source {s:?}"),
        }
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tenhou => f.write_str("tenhou"),
            Self::Majsoul => f.write_str("majsoul"),
            Self::Offline => f.write_str("offline"),
        }
    }
}

/// Who sat in a seat, as far as the record can tell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatIdentity {
    /// An account on an online service, matched through its external id.
    External { id: ExternalId, name: String },
    /// A player already known to the ladder by id.
    Local { player_id: String },
}

impl SeatIdentity {
    /// Name given to a player created for this seat.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::External { name, .. } => name,
            Self::Local { player_id } => player_id,
        }
    }
}

/// A game record in one of the supported formats.
#[derive(Debug, Clone)]
pub enum GameRecord {
    Tenhou(Box<TenhouLog>),
    Majsoul(Box<Paipu>),
    Offline(OfflineGame),
}

/// Everything the aggregator needs from a record, with players still
/// unresolved.
#[derive(Debug, Clone)]
pub struct DecodedGame {
    pub external_id: String,
    pub date: NaiveDateTime,
    pub seats: [SeatIdentity; 4],
    pub points: [i32; 4],
    pub kind: GameKind,
    pub rounds: Vec<RoundResult>,
    pub yakuman_count: Option<[u8; 4]>,
}

impl GameRecord {
    pub fn parse(source: LogSource, json: &str) -> IngestResult<Self> {
        Ok(match source {
            LogSource::Tenhou => Self::Tenhou(Box::new(serde_json::from_str(json)?)),
            LogSource::Majsoul => Self::Majsoul(Box::new(serde_json::from_str(json)?)),
            LogSource::Offline => Self::Offline(serde_json::from_str(json)?),
        })
    }

    pub fn from_reader(source: LogSource, reader: impl Read) -> IngestResult<Self> {
        Ok(match source {
            LogSource::Tenhou => Self::Tenhou(Box::new(serde_json::from_reader(reader)?)),
            LogSource::Majsoul => Self::Majsoul(Box::new(serde_json::from_reader(reader)?)),
            LogSource::Offline => Self::Offline(serde_json::from_reader(reader)?),
        })
    }

    #[must_use]
    pub const fn source(&self) -> LogSource {
        match self {
            Self::Tenhou(_) => LogSource::Tenhou,
            Self::Majsoul(_) => LogSource::Majsoul,
            Self::Offline(_) => LogSource::Offline,
        }
    }

    #[must_use]
    pub fn external_id(&self) -> String {
        match self {
            Self::Tenhou(log) => log.external_id().to_owned(),
            Self::Majsoul(paipu) => paipu.external_id().to_owned(),
            Self::Offline(game) => game.external_id(),
        }
    }

    pub fn timestamp(&self) -> IngestResult<NaiveDateTime> {
        match self {
            Self::Tenhou(log) => log.timestamp(),
            Self::Majsoul(paipu) => paipu.timestamp(),
            Self::Offline(game) => game.timestamp(),
        }
    }

    /// Decodes and scores the whole record. Nothing outside the record is
    /// touched, so a failure here leaves the ladder as it was.
    pub fn decode(
        &self,
        registry: &GameKindRegistry,
        config: &ScoringConfig,
    ) -> IngestResult<DecodedGame> {
        let external_id = self.external_id();
        let date = self.timestamp()?;
        let (seats, points, kind_name, rounds, yakuman_count) = match self {
            Self::Tenhou(log) => {
                let rounds = log.rounds(config)?;
                let points = log.final_points(&rounds)?;
                (log.seats(), points, log.kind_name()?, rounds, None)
            }
            Self::Majsoul(paipu) => (
                paipu.seats()?,
                paipu.final_points()?,
                paipu.kind_name()?,
                vec![],
                None,
            ),
            Self::Offline(game) => (
                game.seats(),
                game.player_points,
                game.kind_name(registry),
                vec![],
                game.yakuman_count,
            ),
        };
        let kind = registry.resolve(kind_name)?.clone();
        Ok(DecodedGame {
            external_id,
            date,
            seats,
            points,
            kind,
            rounds,
            yakuman_count,
        })
    }
}
