use super::kind::GameKind;
use crate::ladder::PlayerSnapshot;
use crate::ladder::player::N_TIERS;
use crate::score::RoundResult;
use std::fmt::Write as _;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Tier score by finish order and tier.
pub const PT_DELTA: [[i32; N_TIERS]; 4] = [
    [90; N_TIERS],
    [45; N_TIERS],
    [0; N_TIERS],
    [-45, -60, -75, -90, -105, -120, -135, -150, -165, -180],
];
/// Rating change by finish order before the table-average correction.
pub const R_DELTA: [f64; 4] = [30., 10., -10., -30.];
/// Table average rating used when the real one is lower.
pub const R_FLOOR: f64 = 1500.;

/// Tiers below this one get the bust, yakuman and upset bonuses.
const BONUS_TIER_LIMIT: u8 = 5;
const BUST_BONUS: i32 = 45;
const YAKUMAN_BONUS: i32 = 90;
const UPSET_BONUS: i32 = 15;
const UPSET_TIER_GAP: u8 = 2;

/// Summary of a stored game, kept in game and player histories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePreview {
    pub game_id: String,
    pub players: [PlayerSnapshot; 4],
    /// Player ids from first place to last.
    pub order_by_id: [String; 4],
    pub points: [i32; 4],
    pub date: NaiveDateTime,
    pub pt_delta: [i32; 4],
    pub r_delta: [f64; 4],
    pub kind: String,
}

impl GamePreview {
    #[must_use]
    pub fn seat_of(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.player_id == player_id)
    }

    #[must_use]
    pub fn order_of(&self, player_id: &str) -> Option<usize> {
        self.order_by_id.iter().position(|id| id == player_id)
    }
}

/// One recorded game. The tier-score and rating deltas are derived when the
/// game is built and re-derived by [`GameData::update`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    pub game_id: String,
    /// In seat order.
    pub players: [PlayerSnapshot; 4],
    pub points: [i32; 4],
    pub kind: GameKind,
    #[serde(default)]
    pub rounds: Vec<RoundResult>,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub external_id: Option<String>,
    /// Yakuman multiples per seat for games recorded without rounds.
    #[serde(default)]
    pub yakuman_count: Option<[u8; 4]>,

    #[serde(skip)]
    pt_delta: [i32; 4],
    #[serde(skip)]
    r_delta: [f64; 4],
}

impl GameData {
    #[must_use]
    pub fn new(
        players: [PlayerSnapshot; 4],
        points: [i32; 4],
        kind: GameKind,
        date: NaiveDateTime,
    ) -> Self {
        let mut ret = Self {
            game_id: uuid::Uuid::new_v4().simple().to_string(),
            players,
            points,
            kind,
            rounds: vec![],
            date,
            external_id: None,
            yakuman_count: None,
            pt_delta: [0; 4],
            r_delta: [0.; 4],
        };
        ret.update();
        ret
    }

    #[must_use]
    pub fn with_rounds(mut self, rounds: Vec<RoundResult>) -> Self {
        self.rounds = rounds;
        self.update();
        self
    }

    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    #[must_use]
    pub fn with_yakuman_count(mut self, yakuman_count: Option<[u8; 4]>) -> Self {
        self.yakuman_count = yakuman_count;
        self.update();
        self
    }

    #[inline]
    #[must_use]
    pub const fn pt_delta(&self) -> [i32; 4] {
        self.pt_delta
    }

    #[inline]
    #[must_use]
    pub const fn r_delta(&self) -> [f64; 4] {
        self.r_delta
    }

    /// Seats from first place to last. Equal points keep seat order.
    #[must_use]
    pub fn finish_order(&self) -> [usize; 4] {
        let mut order = [0, 1, 2, 3];
        order.sort_by_key(|&seat| std::cmp::Reverse(self.points[seat]));
        order
    }

    /// Yakuman multiples scored by a seat, from the manual count when there
    /// is one, otherwise from the rounds.
    #[must_use]
    pub fn yakuman_of(&self, seat: usize) -> u32 {
        match self.yakuman_count {
            Some(count) => u32::from(count[seat]),
            None => self
                .rounds
                .iter()
                .flat_map(|r| &r.wins)
                .filter(|w| usize::from(w.winner) == seat)
                .map(|w| u32::from(w.yakuman))
                .sum(),
        }
    }

    /// Final points with the kind's uma added by finish order.
    #[must_use]
    pub fn uma_points(&self) -> [i32; 4] {
        let mut ret = self.points;
        if let Some(uma) = self.kind.uma {
            for (order, seat) in self.finish_order().into_iter().enumerate() {
                ret[seat] += uma[3 - order];
            }
        }
        ret
    }

    /// Re-derives the tier-score and rating deltas from the snapshots.
    pub fn update(&mut self) {
        let order = self.finish_order();
        let tiers = self.players.each_ref().map(|p| p.tier);
        let busted_max_tier = (0..4)
            .filter(|&seat| self.points[seat] < 0)
            .map(|seat| tiers[seat])
            .max();
        let average = self.players.iter().map(|p| p.rating).sum::<f64>() / 4.;
        let average = average.max(R_FLOOR);

        for (rank, &seat) in order.iter().enumerate() {
            let player = &self.players[seat];
            let tier = player.tier;
            let mut pt = PT_DELTA[rank][usize::from(tier)];

            if tier < BONUS_TIER_LIMIT {
                if busted_max_tier.is_some_and(|max| self.points[seat] >= 0 && tier < max) {
                    pt += BUST_BONUS;
                }
                pt += YAKUMAN_BONUS * self.yakuman_of(seat) as i32;
                // scaled by how many places separate the two finishes
                for (distance, &below) in order[rank..].iter().enumerate() {
                    if tiers[below] >= tier + UPSET_TIER_GAP {
                        pt += UPSET_BONUS * distance as i32;
                    }
                }
            }

            let mut r = R_DELTA[rank] + (average - player.rating) / 40.;
            r *= (1. - f64::from(player.game_count) / 500.).max(0.2);

            self.pt_delta[seat] = (f64::from(pt) * self.kind.pt_multiplier).round() as i32;
            self.r_delta[seat] = (r * self.kind.r_multiplier * 1000.).round() / 1000.;
        }
    }

    #[must_use]
    pub fn preview(&self) -> GamePreview {
        GamePreview {
            game_id: self.game_id.clone(),
            players: self.players.clone(),
            order_by_id: self.finish_order().map(|seat| self.players[seat].player_id.clone()),
            points: self.points,
            date: self.date,
            pt_delta: self.pt_delta,
            r_delta: self.r_delta,
            kind: self.kind.name.clone(),
        }
    }

    /// Human-readable result block, one line per seat.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut ret = format!("{} {}", self.kind.name, self.game_id);
        if let Some(id) = &self.external_id {
            write!(ret, " ({id})").ok();
        }
        for seat in 0..4 {
            write!(
                ret,
                "\n{}: {} ({:+}pt {:+.2}R)",
                self.players[seat], self.points[seat], self.pt_delta[seat], self.r_delta[seat],
            )
            .ok();
        }
        ret
    }

    /// Deltas are not stored, so a loaded game is re-derived before use.
    #[must_use]
    pub(crate) fn rederived(mut self) -> Self {
        self.update();
        self
    }
}
