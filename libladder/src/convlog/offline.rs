//! Manually entered results of games played at the table.

use super::SeatIdentity;
use crate::error::{IngestError, IngestResult};
use crate::game::GameKindRegistry;
use crate::game::kind::OFFLINE_DEFAULT;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, Deserialize)]
pub struct OfflineGame {
    pub game_date: String,
    pub player_ids: [String; 4],
    pub player_points: [i32; 4],
    #[serde(default)]
    pub game_type: Option<String>,
    /// Yakuman multiples scored by each seat.
    #[serde(default)]
    pub yakuman_count: Option<[u8; 4]>,
}

impl OfflineGame {
    #[must_use]
    pub fn external_id(&self) -> String {
        format!("{} {}", self.game_date, self.player_ids.join(":"))
    }

    /// ISO-8601 date or date-time; a bare date is taken as midnight.
    pub fn timestamp(&self) -> IngestResult<NaiveDateTime> {
        let raw = self.game_date.trim();
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
            .ok_or_else(|| IngestError::malformed(format!("unparsable game date {raw:?}")))
    }

    /// The named kind, or the default offline kind when it is missing or
    /// unknown to `registry`.
    #[must_use]
    pub fn kind_name<'a>(&'a self, registry: &GameKindRegistry) -> &'a str {
        match self.game_type.as_deref() {
            Some(name) if registry.get(name).is_some() => name,
            Some(name) => {
                log::warn!("{}: unknown game type {name:?}, using {OFFLINE_DEFAULT}", self.external_id());
                OFFLINE_DEFAULT
            }
            None => OFFLINE_DEFAULT,
        }
    }

    #[must_use]
    pub fn seats(&self) -> [SeatIdentity; 4] {
        self.player_ids.clone().map(|player_id| SeatIdentity::Local { player_id })
    }
}
