use crate::error::{IngestError, IngestResult};
use std::io::Read;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

pub const MAJSOUL_SOUTH: &str = "majsoul_south";
pub const MAJSOUL_EAST: &str = "majsoul_east";
pub const OFFLINE_SOUTH: &str = "offline_south";
pub const OFFLINE_EAST: &str = "offline_east";
pub const MAJSOUL_LEAGUE: &str = "majsoul_league";
pub const OFFLINE_LEAGUE: &str = "offline_league";

/// Kind used for manually entered games that name no known kind.
pub const OFFLINE_DEFAULT: &str = OFFLINE_SOUTH;

const LEAGUE_UMA: [i32; 4] = [10000, 20000, 30000, 40000];

const fn one() -> f64 {
    1.
}

/// How a game's result is weighted on the ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameKind {
    pub name: String,
    #[serde(default = "one")]
    pub pt_multiplier: f64,
    #[serde(default = "one")]
    pub r_multiplier: f64,
    /// Bonus points by finish order, from fourth place up to first.
    #[serde(default)]
    pub uma: Option<[i32; 4]>,
}

impl GameKind {
    #[must_use]
    pub fn new(name: impl Into<String>, pt_multiplier: f64) -> Self {
        Self {
            name: name.into(),
            pt_multiplier,
            r_multiplier: 1.,
            uma: None,
        }
    }

    #[must_use]
    pub const fn with_uma(mut self, uma: [i32; 4]) -> Self {
        self.uma = Some(uma);
        self
    }
}

/// Name to [`GameKind`] lookup, built by the caller and handed to the
/// aggregator.
#[derive(Debug, Clone, Default)]
pub struct GameKindRegistry {
    kinds: AHashMap<String, GameKind>,
}

impl GameKindRegistry {
    #[must_use]
    pub fn builtin() -> Self {
        let mut ret = Self::default();
        for kind in [
            GameKind::new(MAJSOUL_SOUTH, 1.),
            GameKind::new(MAJSOUL_EAST, 2. / 3.),
            GameKind::new(OFFLINE_SOUTH, 4. / 3.),
            GameKind::new(OFFLINE_EAST, 8. / 9.),
            GameKind::new(MAJSOUL_LEAGUE, 1.).with_uma(LEAGUE_UMA),
            GameKind::new(OFFLINE_LEAGUE, 4. / 3.).with_uma(LEAGUE_UMA),
        ] {
            ret.register(kind);
        }
        ret
    }

    /// Adds or replaces a kind, returning the one it replaced.
    pub fn register(&mut self, kind: GameKind) -> Option<GameKind> {
        self.kinds.insert(kind.name.clone(), kind)
    }

    /// Registers every kind of a JSON array of definitions.
    pub fn extend_from_json(&mut self, reader: impl Read) -> IngestResult<usize> {
        let kinds: Vec<GameKind> = serde_json::from_reader(reader)?;
        let n = kinds.len();
        for kind in kinds {
            if let Some(old) = self.register(kind) {
                log::info!("game kind {} redefined", old.name);
            }
        }
        Ok(n)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&GameKind> {
        self.kinds.get(name)
    }

    pub fn resolve(&self, name: &str) -> IngestResult<&GameKind> {
        self.get(name)
            .ok_or_else(|| IngestError::UnknownGameKind(name.to_owned()))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
