use crate::game::GamePreview;
use std::fmt;

use derivative::Derivative;
use serde::{Deserialize, Serialize};

pub const N_TIERS: usize = 10;
/// Score a player starts a tier with, by tier.
pub const TIER_INITIAL_SCORE: [i32; N_TIERS] = [200, 400, 600, 800, 1000, 1200, 1400, 1600, 1800, 2000];
/// Score that promotes out of a tier, by tier.
pub const TIER_THRESHOLD: [i32; N_TIERS] = [400, 800, 1200, 1600, 2000, 2400, 2800, 3200, 3600, 4000];
pub const NEW_PLAYER_SCORE: i32 = TIER_INITIAL_SCORE[0];
pub const NEW_PLAYER_RATING: f64 = 1500.;

/// An account on an online service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalId {
    Majsoul(u64),
    /// Tenhou logs carry names only.
    Tenhou(String),
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Majsoul(id) => write!(f, "majsoul:{id}"),
            Self::Tenhou(name) => write!(f, "tenhou:{name}"),
        }
    }
}

/// The rating-relevant state of a player at the moment a game was
/// recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub player_id: String,
    pub name: String,
    pub tier: u8,
    pub tier_score: i32,
    pub threshold: i32,
    pub rating: f64,
    pub game_count: u32,
    pub order_count: [u32; 4],
}

impl fmt::Display for PlayerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({} {}/{})", self.name, self.tier, self.tier_score, self.threshold)
    }
}

/// Accumulated ladder state of one player.
#[derive(Debug, Clone, PartialEq, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(from = "PlayerRecord", into = "PlayerRecord")]
pub struct PlayerData {
    pub player_id: String,
    pub name: String,
    pub external_ids: Vec<ExternalId>,
    pub titles: Vec<String>,

    tier: u8,
    #[derivative(Default(value = "NEW_PLAYER_SCORE"))]
    tier_score: i32,
    highest_tier: u8,
    #[derivative(Default(value = "NEW_PLAYER_SCORE"))]
    highest_tier_score: i32,
    #[derivative(Default(value = "NEW_PLAYER_RATING"))]
    rating: f64,
    history: Vec<GamePreview>,

    #[derivative(Default(value = "TIER_THRESHOLD[0]"))]
    threshold: i32,
    game_count: u32,
    order_count: [u32; 4],
}

/// Stored form of [`PlayerData`], without the derived counters.
#[derive(Serialize, Deserialize)]
struct PlayerRecord {
    player_id: String,
    name: String,
    #[serde(default)]
    external_ids: Vec<ExternalId>,
    #[serde(default)]
    titles: Vec<String>,
    tier: u8,
    tier_score: i32,
    highest_tier: u8,
    highest_tier_score: i32,
    rating: f64,
    #[serde(default)]
    history: Vec<GamePreview>,
}

impl From<PlayerRecord> for PlayerData {
    fn from(r: PlayerRecord) -> Self {
        let mut ret = Self {
            player_id: r.player_id,
            name: r.name,
            external_ids: r.external_ids,
            titles: r.titles,
            tier: r.tier.min(N_TIERS as u8 - 1),
            tier_score: r.tier_score,
            highest_tier: r.highest_tier,
            highest_tier_score: r.highest_tier_score,
            rating: r.rating,
            history: r.history,
            ..Default::default()
        };
        ret.rederive();
        ret
    }
}

impl From<PlayerData> for PlayerRecord {
    fn from(p: PlayerData) -> Self {
        Self {
            player_id: p.player_id,
            name: p.name,
            external_ids: p.external_ids,
            titles: p.titles,
            tier: p.tier,
            tier_score: p.tier_score,
            highest_tier: p.highest_tier,
            highest_tier_score: p.highest_tier_score,
            rating: p.rating,
            history: p.history,
        }
    }
}

impl PlayerData {
    /// A fresh player at tier 0. A missing id is replaced by a random one.
    #[must_use]
    pub fn new(name: impl Into<String>, player_id: Option<String>) -> Self {
        Self {
            player_id: player_id.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string()),
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_external_id(mut self, id: ExternalId) -> Self {
        self.external_ids.push(id);
        self
    }

    #[inline]
    #[must_use]
    pub const fn tier(&self) -> u8 {
        self.tier
    }

    #[inline]
    #[must_use]
    pub const fn tier_score(&self) -> i32 {
        self.tier_score
    }

    #[inline]
    #[must_use]
    pub const fn highest_tier(&self) -> u8 {
        self.highest_tier
    }

    #[inline]
    #[must_use]
    pub const fn highest_tier_score(&self) -> i32 {
        self.highest_tier_score
    }

    #[inline]
    #[must_use]
    pub const fn rating(&self) -> f64 {
        self.rating
    }

    #[inline]
    #[must_use]
    pub const fn threshold(&self) -> i32 {
        self.threshold
    }

    #[inline]
    #[must_use]
    pub const fn game_count(&self) -> u32 {
        self.game_count
    }

    #[inline]
    #[must_use]
    pub const fn order_count(&self) -> [u32; 4] {
        self.order_count
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &[GamePreview] {
        &self.history
    }

    #[must_use]
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            player_id: self.player_id.clone(),
            name: self.name.clone(),
            tier: self.tier,
            tier_score: self.tier_score,
            threshold: self.threshold,
            rating: self.rating,
            game_count: self.game_count,
            order_count: self.order_count,
        }
    }

    /// Applies the deltas of a game this player sat in. Returns `false` and
    /// changes nothing if the player is not in it.
    pub fn add_game(&mut self, game: GamePreview) -> bool {
        let Some(seat) = game.seat_of(&self.player_id) else {
            return false;
        };
        self.tier_score += game.pt_delta[seat];
        self.rating += game.r_delta[seat];
        self.update_tier();
        self.count_game(&game);
        self.history.push(game);
        true
    }

    /// Back to a new player's standing, keeping identity and titles.
    pub fn reset(&mut self) {
        self.tier = 0;
        self.tier_score = NEW_PLAYER_SCORE;
        self.highest_tier = 0;
        self.highest_tier_score = NEW_PLAYER_SCORE;
        self.rating = NEW_PLAYER_RATING;
        self.history.clear();
        self.rederive();
    }

    /// Promotion when the score reaches the threshold, demotion when it
    /// drops below zero. At most one step per call; the new tier starts at
    /// its initial score, so the result is stable under a second call.
    pub fn update_tier(&mut self) {
        let tier = self.tier as usize;
        if self.tier_score >= TIER_THRESHOLD[tier] {
            if tier < N_TIERS - 1 {
                self.tier += 1;
                self.tier_score = TIER_INITIAL_SCORE[tier + 1];
                if self.highest_tier < self.tier {
                    self.highest_tier = self.tier;
                    self.highest_tier_score = self.tier_score;
                }
            } else {
                self.tier_score = TIER_THRESHOLD[tier];
            }
        } else if self.tier_score < 0 {
            if tier > 0 {
                self.tier -= 1;
                self.tier_score = TIER_INITIAL_SCORE[tier - 1];
            } else {
                self.tier_score = 0;
            }
        } else if self.tier == self.highest_tier {
            self.highest_tier_score = self.highest_tier_score.max(self.tier_score);
        }
        self.threshold = TIER_THRESHOLD[self.tier as usize];
    }

    fn count_game(&mut self, game: &GamePreview) {
        self.game_count += 1;
        if let Some(order) = game.order_of(&self.player_id) {
            self.order_count[order] += 1;
        }
    }

    fn rederive(&mut self) {
        self.threshold = TIER_THRESHOLD[self.tier as usize];
        self.game_count = 0;
        self.order_count = [0; 4];
        let history = std::mem::take(&mut self.history);
        for game in &history {
            self.count_game(game);
        }
        self.history = history;
    }
}

impl fmt::Display for PlayerData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({} {}/{})", self.name, self.tier, self.tier_score, self.threshold)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn at(tier: u8, tier_score: i32) -> PlayerData {
        PlayerData {
            tier,
            tier_score,
            highest_tier: tier,
            highest_tier_score: tier_score,
            threshold: TIER_THRESHOLD[tier as usize],
            ..PlayerData::new("p", Some("p".to_owned()))
        }
    }

    #[test]
    fn new_player() {
        let p = PlayerData::new("Alice", None);
        assert_eq!(p.player_id.len(), 32);
        assert_eq!((p.tier(), p.tier_score(), p.rating()), (0, 200, 1500.));
        assert_eq!((p.highest_tier(), p.highest_tier_score()), (0, 200));
        assert_eq!(p.threshold(), 400);
        assert_eq!(p.to_string(), r#""Alice"(0 200/400)"#);
    }

    #[test]
    fn promotion_and_demotion() {
        let mut p = at(0, 400);
        p.update_tier();
        assert_eq!((p.tier(), p.tier_score(), p.threshold()), (1, 400, 800));
        assert_eq!((p.highest_tier(), p.highest_tier_score()), (1, 400));

        p.tier_score = -5;
        p.update_tier();
        assert_eq!((p.tier(), p.tier_score(), p.threshold()), (0, 200, 400));
        assert_eq!(p.highest_tier(), 1);

        p.tier_score = -5;
        p.update_tier();
        assert_eq!((p.tier(), p.tier_score()), (0, 0));

        let mut top = at(9, 4500);
        top.update_tier();
        assert_eq!((top.tier(), top.tier_score()), (9, 4000));

        let mut p = at(3, 900);
        p.update_tier();
        assert_eq!(p.highest_tier_score(), 900);
        p.tier_score = 700;
        p.update_tier();
        assert_eq!(p.highest_tier_score(), 900);
    }

    #[test]
    fn no_oscillation_at_boundaries() {
        for tier in 0..N_TIERS as u8 {
            for score in [-1, 0, TIER_THRESHOLD[tier as usize] - 1, TIER_THRESHOLD[tier as usize]] {
                let mut p = at(tier, score);
                p.update_tier();
                let settled = (p.tier(), p.tier_score());
                p.update_tier();
                assert_eq!((p.tier(), p.tier_score()), settled, "tier {tier} score {score}");
            }
        }
    }

    #[test]
    fn reset_and_serde() {
        let mut p = at(4, 1500).with_external_id(ExternalId::Majsoul(7));
        p.rating = 1620.5;
        p.titles.push("champion".to_owned());

        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("game_count"));
        let back: PlayerData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);

        p.reset();
        assert_eq!((p.tier(), p.tier_score(), p.rating()), (0, 200, 1500.));
        assert_eq!(p.external_ids, [ExternalId::Majsoul(7)]);
        assert_eq!(p.titles, ["champion"]);
    }
}
