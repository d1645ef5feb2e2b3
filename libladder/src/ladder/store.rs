use super::player::{ExternalId, PlayerData, PlayerSnapshot};
use crate::error::{IngestError, IngestResult};
use crate::game::{GameData, GamePreview};
use std::fmt;
use std::io::Read;

use ahash::{AHashMap, AHashSet};
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// What the aggregator and the rating engine need from wherever players
/// live.
pub trait PlayerDirectory {
    fn lookup_by_external_id(&self, id: &ExternalId) -> Option<&PlayerData>;
    fn lookup_by_id(&self, player_id: &str) -> Option<&PlayerData>;
    fn lookup_by_id_mut(&mut self, player_id: &str) -> Option<&mut PlayerData>;
    /// Fails if the id is already taken.
    fn create_player(&mut self, player: PlayerData) -> IngestResult<&PlayerData>;
    fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut PlayerData));
    /// Re-derives indexes and projections after players were mutated.
    fn refresh(&mut self) {}
}

/// All recorded games in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameStore {
    games: Vec<GameData>,

    by_id: AHashMap<String, usize>,
    external_ids: AHashSet<String>,
    history: Vec<GamePreview>,
}

impl GameStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    #[must_use]
    pub fn get(&self, game_id: &str) -> Option<&GameData> {
        self.by_id.get(game_id).map(|&idx| &self.games[idx])
    }

    #[must_use]
    pub fn contains_game_id(&self, game_id: &str) -> bool {
        self.by_id.contains_key(game_id)
    }

    #[must_use]
    pub fn contains_external_id(&self, external_id: &str) -> bool {
        self.external_ids.contains(external_id)
    }

    #[inline]
    #[must_use]
    pub fn games(&self) -> &[GameData] {
        &self.games
    }

    /// Previews of every game by date, ties in insertion order.
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[GamePreview] {
        &self.history
    }

    pub fn insert(&mut self, game: GameData) -> IngestResult<()> {
        if self.contains_game_id(&game.game_id) {
            return Err(IngestError::malformed(format!("game id {} already stored", game.game_id)));
        }
        self.games.push(game);
        self.rederive();
        Ok(())
    }

    /// Calls `f` on every game by date, then re-derives the caches.
    pub fn rewrite_chronologically<F>(&mut self, mut f: F) -> IngestResult<()>
    where
        F: FnMut(&mut GameData) -> IngestResult<()>,
    {
        let ret = self
            .chronological()
            .into_iter()
            .try_for_each(|idx| f(&mut self.games[idx]));
        self.rederive();
        ret
    }

    fn chronological(&self) -> Vec<usize> {
        let mut idx: Vec<_> = (0..self.games.len()).collect();
        idx.sort_by_key(|&i| self.games[i].date);
        idx
    }

    fn rederive(&mut self) {
        self.by_id = self
            .games
            .iter()
            .enumerate()
            .map(|(idx, g)| (g.game_id.clone(), idx))
            .collect();
        self.external_ids = self
            .games
            .iter()
            .filter_map(|g| g.external_id.clone())
            .collect();
        self.history = self
            .chronological()
            .into_iter()
            .map(|idx| self.games[idx].preview())
            .collect();
    }
}

impl Serialize for GameStore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.games.len()))?;
        for game in &self.games {
            seq.serialize_element(game)?;
        }
        seq.end()
    }
}

struct GameStoreVisitor;

impl<'de> Visitor<'de> for GameStoreVisitor {
    type Value = GameStore;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of games")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<GameStore, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut store = GameStore::new();
        while let Some(game) = seq.next_element::<GameData>()? {
            store.insert(game.rederived()).map_err(de::Error::custom)?;
        }
        Ok(store)
    }
}

impl<'de> Deserialize<'de> for GameStore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(GameStoreVisitor)
    }
}

/// Entry of a seed list.
#[derive(Debug, Deserialize)]
struct SeedPlayer {
    player_id: String,
    player_name: String,
}

/// All known players in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStore {
    players: Vec<PlayerData>,

    by_id: AHashMap<String, usize>,
    by_external: AHashMap<ExternalId, usize>,
    leaderboard: Vec<PlayerSnapshot>,
}

impl PlayerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn players(&self) -> &[PlayerData] {
        &self.players
    }

    /// Snapshots by tier, then tier score, both descending.
    #[inline]
    #[must_use]
    pub fn leaderboard(&self) -> &[PlayerSnapshot] {
        &self.leaderboard
    }

    /// Creates the players of a JSON list of `{player_id, player_name}`
    /// that are not known yet. Returns how many were created.
    pub fn seed_from_json(&mut self, reader: impl Read) -> IngestResult<usize> {
        let seeds: Vec<SeedPlayer> = serde_json::from_reader(reader)?;
        let mut created = 0;
        for seed in seeds {
            if self.by_id.contains_key(&seed.player_id) {
                continue;
            }
            self.create_player(PlayerData::new(seed.player_name, Some(seed.player_id)))?;
            created += 1;
        }
        Ok(created)
    }

    fn rederive(&mut self) {
        self.by_id = self
            .players
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.player_id.clone(), idx))
            .collect();
        self.by_external.clear();
        for (idx, player) in self.players.iter().enumerate() {
            for id in &player.external_ids {
                if let Some(prev) = self.by_external.insert(id.clone(), idx) {
                    log::warn!(
                        "external id {id} claimed by both {} and {}",
                        self.players[prev].player_id,
                        player.player_id,
                    );
                }
            }
        }

        let mut sorted: Vec<_> = self.players.iter().collect();
        sorted.sort_by(|a, b| {
            (b.tier(), b.tier_score()).cmp(&(a.tier(), a.tier_score()))
        });
        self.leaderboard = sorted.into_iter().map(PlayerData::snapshot).collect();
    }
}

impl PlayerDirectory for PlayerStore {
    fn lookup_by_external_id(&self, id: &ExternalId) -> Option<&PlayerData> {
        self.by_external.get(id).map(|&idx| &self.players[idx])
    }

    fn lookup_by_id(&self, player_id: &str) -> Option<&PlayerData> {
        self.by_id.get(player_id).map(|&idx| &self.players[idx])
    }

    fn lookup_by_id_mut(&mut self, player_id: &str) -> Option<&mut PlayerData> {
        self.by_id.get(player_id).map(|&idx| &mut self.players[idx])
    }

    fn create_player(&mut self, player: PlayerData) -> IngestResult<&PlayerData> {
        if self.by_id.contains_key(&player.player_id) {
            return Err(IngestError::malformed(format!("player id {} already taken", player.player_id)));
        }
        log::info!("new player {} ({})", player.name, player.player_id);
        self.players.push(player);
        self.rederive();
        let idx = self.players.len() - 1;
        Ok(&self.players[idx])
    }

    fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut PlayerData)) {
        self.players.iter_mut().for_each(f);
    }

    fn refresh(&mut self) {
        self.rederive();
    }
}

impl Serialize for PlayerStore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.players.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PlayerStore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let players = Vec::<PlayerData>::deserialize(deserializer)?;
        let mut store = Self {
            players,
            ..Default::default()
        };
        store.rederive();
        if store.by_id.len() != store.players.len() {
            return Err(de::Error::custom("duplicate player ids"));
        }
        Ok(store)
    }
}
