use super::rule::{DrawWithManganPolicy, ScoringConfig};
use crate::error::ScoreError;
use crate::state::RoundReplay;
use crate::tile::Tile;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const RIICHI_STAKE: i32 = 1000;
pub const HONBA_RON: i32 = 300;
pub const HONBA_TSUMO_EACH: i32 = 100;
pub const MANGAN_BASE: u32 = 2000;
pub const YAKUMAN_BASE: u32 = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Wind {
    #[default]
    East,
    South,
    West,
    North,
}

impl Wind {
    #[must_use]
    pub const fn from_index(idx: u8) -> Self {
        match idx % 4 {
            0 => Self::East,
            1 => Self::South,
            2 => Self::West,
            _ => Self::North,
        }
    }

    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self::from_index(self as u8 + 1)
    }
}

impl fmt::Display for Wind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::East => "E",
            Self::South => "S",
            Self::West => "W",
            Self::North => "N",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbortiveDraw {
    FourWinds,
    NineTerminals,
    FourRiichi,
    FourKans,
    TripleRon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Ron,
    Tsumo,
    ExhaustiveDraw { tenpai: [bool; 4] },
    Abortive(AbortiveDraw),
    DrawWithMangan { holder: u8 },
    /// The log names an ending this crate does not know. No points move.
    Unrecognized,
}

/// One named scoring pattern of a winning hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Yaku {
    pub name: String,
    pub han: u8,
    pub yakuman: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinRecord {
    pub winner: u8,
    /// Equal to `winner` on a self draw.
    pub loser: u8,
    pub han: u8,
    pub fu: u16,
    /// 0 unless the hand is a yakuman; counted yakuman (13+ han) is at least 1.
    pub yakuman: u8,
    pub yaku: Vec<Yaku>,
}

impl WinRecord {
    #[must_use]
    pub fn new(winner: u8, loser: u8, han: u8, fu: u16, yakuman: u8, yaku: Vec<Yaku>) -> Self {
        let yakuman = if han >= 13 { yakuman.max(1) } else { yakuman };
        Self {
            winner,
            loser,
            han,
            fu,
            yakuman,
            yaku,
        }
    }

    /// The record a draw with a mangan hand is scored with when it counts
    /// as a self draw.
    #[must_use]
    pub fn mangan_at_draw(holder: u8) -> Self {
        Self::new(holder, holder, 4, 40, 0, vec![])
    }

    #[inline]
    #[must_use]
    pub const fn is_self_draw(&self) -> bool {
        self.winner == self.loser
    }

    /// What one non-dealer pays on a non-dealer self draw, before honba.
    #[must_use]
    pub fn base_point(&self) -> u32 {
        if self.yakuman > 0 {
            return YAKUMAN_BASE * u32::from(self.yakuman);
        }
        let raw = 4 * u64::from(self.fu) << self.han.min(16);
        let base = raw.div_ceil(100) * 100;
        if base < u64::from(MANGAN_BASE) {
            return base as u32;
        }
        match self.han {
            13.. => YAKUMAN_BASE,
            11..=12 => 6000,
            8..=10 => 4000,
            6..=7 => 3000,
            _ => MANGAN_BASE,
        }
    }

    /// What the loser pays on a win by discard, before honba.
    #[must_use]
    pub fn ron_payment(&self, dealer: u8) -> i32 {
        if self.yakuman > 0 {
            let per = if self.winner == dealer { 48000 } else { 32000 };
            return per * i32::from(self.yakuman);
        }
        6 * self.base_point() as i32
    }
}

/// The state a round starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundHeader {
    pub dealer: u8,
    pub wind: Wind,
    pub honba: u8,
    /// Riichi sticks left on the table by earlier rounds.
    pub riichi_bank: u8,
    pub initial_points: [i32; 4],
}

impl Default for RoundHeader {
    fn default() -> Self {
        Self {
            dealer: 0,
            wind: Wind::East,
            honba: 0,
            riichi_bank: 0,
            initial_points: [25000; 4],
        }
    }
}

/// What only a decoded log can tell about a round.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundDetail {
    /// Per-seat deltas as written in the log, one row per win.
    pub recorded_deltas: Vec<[i32; 4]>,
    pub dora: Vec<Tile>,
    pub uradora: Vec<Tile>,
    /// `None` when the replay of the round failed.
    pub reconstruction: Option<RoundReplay>,
}

/// A scored round. Built through [`RoundResult::score`] and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub header: RoundHeader,
    pub outcome: RoundOutcome,
    pub wins: Vec<WinRecord>,
    /// `None` when the declarations are unknown; scored as nobody declaring.
    pub riichi: Option<[bool; 4]>,
    pub detail: Option<RoundDetail>,

    transfers: [i32; 4],
    final_points: [i32; 4],
    pot_collected: bool,
}

impl RoundResult {
    pub fn score(
        header: RoundHeader,
        outcome: RoundOutcome,
        wins: Vec<WinRecord>,
        riichi: Option<[bool; 4]>,
        config: &ScoringConfig,
    ) -> Result<Self, ScoreError> {
        validate(&header, &outcome, &wins)?;
        let riichi = if outcome == RoundOutcome::Unrecognized { None } else { riichi };

        let pot_collected = match outcome {
            RoundOutcome::Ron | RoundOutcome::Tsumo => true,
            RoundOutcome::DrawWithMangan { .. } => {
                config.draw_with_mangan == DrawWithManganPolicy::AsTsumo
            }
            _ => false,
        };
        let mut ret = Self {
            header,
            outcome,
            wins,
            riichi,
            detail: None,
            transfers: [0; 4],
            final_points: header.initial_points,
            pot_collected,
        };
        ret.transfers = ret.compute_transfers(config);
        for (p, d) in ret.final_points.iter_mut().zip(ret.transfers) {
            *p += d;
        }
        Ok(ret)
    }

    #[must_use]
    pub fn with_detail(mut self, detail: RoundDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Per-seat point change, riichi stakes and the pot included.
    #[inline]
    #[must_use]
    pub const fn transfers(&self) -> [i32; 4] {
        self.transfers
    }

    #[inline]
    #[must_use]
    pub const fn final_points(&self) -> [i32; 4] {
        self.final_points
    }

    #[inline]
    #[must_use]
    pub const fn dealer(&self) -> u8 {
        self.header.dealer
    }

    #[must_use]
    pub fn riichi_flags(&self) -> [bool; 4] {
        self.riichi.unwrap_or_default()
    }

    fn declared(&self) -> u8 {
        self.riichi_flags().iter().filter(|&&r| r).count() as u8
    }

    #[must_use]
    pub fn dealer_repeats(&self) -> bool {
        let dealer = self.header.dealer;
        match self.outcome {
            RoundOutcome::Ron | RoundOutcome::Tsumo => self.wins.iter().any(|w| w.winner == dealer),
            RoundOutcome::ExhaustiveDraw { tenpai } => tenpai[dealer as usize],
            RoundOutcome::Abortive(_) | RoundOutcome::Unrecognized => true,
            RoundOutcome::DrawWithMangan { holder } => holder == dealer,
        }
    }

    /// The header of the round that follows. Does not check whether the
    /// game is over.
    #[must_use]
    pub fn next_round(&self) -> RoundHeader {
        let RoundHeader {
            dealer,
            wind,
            honba,
            riichi_bank,
            ..
        } = self.header;
        let riichi_bank = if self.pot_collected {
            0
        } else {
            riichi_bank + self.declared()
        };

        let (dealer, wind, honba) = if self.dealer_repeats() {
            (dealer, wind, honba + 1)
        } else {
            let next = (dealer + 1) % 4;
            let wind = if next == 0 { wind.next() } else { wind };
            let honba = if self.pot_collected { 0 } else { honba + 1 };
            (next, wind, honba)
        };
        RoundHeader {
            dealer,
            wind,
            honba,
            riichi_bank,
            initial_points: self.final_points,
        }
    }

    fn compute_transfers(&self, config: &ScoringConfig) -> [i32; 4] {
        let riichi = self.riichi_flags();
        let mut delta = riichi.map(|r| if r { -RIICHI_STAKE } else { 0 });
        let pot = RIICHI_STAKE * (i32::from(self.header.riichi_bank) + i32::from(self.declared()));
        let dealer = self.header.dealer;
        let honba = i32::from(self.header.honba);

        match self.outcome {
            RoundOutcome::Ron => {
                let mut pot = pot;
                for win in &self.wins {
                    let pay = win.ron_payment(dealer) + HONBA_RON * honba;
                    delta[win.winner as usize] += pay + pot;
                    delta[win.loser as usize] -= pay;
                    pot = 0;
                }
            }
            RoundOutcome::Tsumo => {
                tsumo(&self.wins[0], dealer, honba, pot, &mut delta);
            }
            RoundOutcome::ExhaustiveDraw { tenpai } => {
                let (gain, loss) = match tenpai.iter().filter(|&&t| t).count() {
                    1 => (3000, -1000),
                    2 => (1500, -1500),
                    3 => (1000, -3000),
                    _ => (0, 0),
                };
                for (d, t) in delta.iter_mut().zip(tenpai) {
                    *d += if t { gain } else { loss };
                }
            }
            RoundOutcome::Abortive(_) | RoundOutcome::Unrecognized => (),
            RoundOutcome::DrawWithMangan { holder } => match config.draw_with_mangan {
                DrawWithManganPolicy::AsDraw => {
                    for (seat, d) in delta.iter_mut().enumerate() {
                        let seat = seat as u8;
                        *d += match (seat == holder, holder == dealer, seat == dealer) {
                            (true, true, _) => 12000,
                            (true, false, _) => 8000,
                            (false, true, _) | (false, false, true) => -4000,
                            (false, false, false) => -2000,
                        };
                    }
                }
                DrawWithManganPolicy::AsTsumo => {
                    tsumo(&WinRecord::mangan_at_draw(holder), dealer, honba, pot, &mut delta);
                }
            },
        }
        delta
    }
}

fn tsumo(win: &WinRecord, dealer: u8, honba: i32, pot: i32, delta: &mut [i32; 4]) {
    let base = win.base_point() as i32;
    let mut gained = pot;
    for seat in 0..4 {
        if seat == win.winner {
            continue;
        }
        let share = if win.winner == dealer || seat == dealer {
            2 * base
        } else {
            base
        };
        let pay = share + HONBA_TSUMO_EACH * honba;
        delta[seat as usize] -= pay;
        gained += pay;
    }
    delta[win.winner as usize] += gained;
}

fn validate(header: &RoundHeader, outcome: &RoundOutcome, wins: &[WinRecord]) -> Result<(), ScoreError> {
    let err = |msg: String| Err(ScoreError(msg));
    if header.dealer > 3 {
        return err(format!("dealer seat {} out of range", header.dealer));
    }
    if let Some(w) = wins.iter().find(|w| w.winner > 3 || w.loser > 3) {
        return err(format!("seat out of range in win {}→{}", w.loser, w.winner));
    }
    match outcome {
        RoundOutcome::Ron => {
            if wins.is_empty() {
                return err("win by discard without a winner".to_owned());
            }
            if wins.iter().any(WinRecord::is_self_draw) {
                return err("win by discard where the winner dealt in".to_owned());
            }
        }
        RoundOutcome::Tsumo => {
            if wins.len() != 1 || !wins[0].is_self_draw() {
                return err(format!("self draw needs exactly one self-drawn win, got {}", wins.len()));
            }
        }
        RoundOutcome::DrawWithMangan { holder } if *holder > 3 => {
            return err(format!("mangan-at-draw holder {holder} out of range"));
        }
        _ => {
            if !wins.is_empty() {
                return err(format!("{outcome:?} carries {} wins", wins.len()));
            }
        }
    }
    Ok(())
}
