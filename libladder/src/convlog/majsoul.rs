//! Majsoul paipu records. Only the final score line is read; the round
//! records are left opaque.

use super::SeatIdentity;
use crate::error::{IngestError, IngestResult};
use crate::game::kind::{MAJSOUL_EAST, MAJSOUL_SOUTH};
use crate::ladder::ExternalId;

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct Paipu {
    pub gamedata: GameInfo,
    #[serde(default)]
    pub record: Vec<Record>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameInfo {
    pub uuid: String,
    /// Unix seconds.
    pub starttime: i64,
    pub playerdata: Vec<PlayerInfo>,
    pub roomdata: RoomInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerInfo {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomInfo {
    pub round: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub action: Vec<Value>,
}

impl Paipu {
    #[inline]
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.gamedata.uuid
    }

    /// Start time in UTC.
    pub fn timestamp(&self) -> IngestResult<NaiveDateTime> {
        DateTime::from_timestamp(self.gamedata.starttime, 0)
            .map(|t| t.naive_utc())
            .ok_or_else(|| {
                IngestError::malformed(format!("start time {} out of range", self.gamedata.starttime))
            })
    }

    pub fn kind_name(&self) -> IngestResult<&'static str> {
        match self.gamedata.roomdata.round {
            8 => Ok(MAJSOUL_SOUTH),
            4 => Ok(MAJSOUL_EAST),
            n => Err(IngestError::UnknownGameKind(format!("majsoul game of {n} rounds"))),
        }
    }

    pub fn seats(&self) -> IngestResult<[SeatIdentity; 4]> {
        let players: &[PlayerInfo; 4] = self.gamedata.playerdata.as_slice().try_into().map_err(|_| {
            IngestError::malformed(format!("{} players in a four-player game", self.gamedata.playerdata.len()))
        })?;
        Ok(players.each_ref().map(|p| SeatIdentity::External {
            id: ExternalId::Majsoul(p.id),
            name: p.name.clone(),
        }))
    }

    /// Parses the last action of the last record, a marker character
    /// followed by `|`-separated final scores.
    pub fn final_points(&self) -> IngestResult<[i32; 4]> {
        let line = self
            .record
            .last()
            .and_then(|r| r.action.last())
            .and_then(Value::as_str)
            .ok_or_else(|| IngestError::malformed("paipu has no final score line"))?;
        let mut chars = line.chars();
        chars.next();
        let scores = chars
            .as_str()
            .split('|')
            .map(|s| s.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| IngestError::malformed(format!("score line {line:?}: {e}")))?;
        scores
            .try_into()
            .map_err(|v: Vec<i32>| IngestError::malformed(format!("{} final scores", v.len())))
    }
}
