use super::seat::{SeatSnapshot, SeatState};
use crate::error::RoundSimulationFailure;
use crate::meld::{Meld, MeldKind};
use crate::tile::Tile;

use serde::{Deserialize, Serialize};

/// One entry of a seat's draw column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draw {
    Tile(Tile),
    /// Chi, pon or open kan on another seat's discard.
    Call(Meld),
}

/// One entry of a seat's discard column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discard {
    Tile(Tile),
    /// The tile just drawn.
    Tsumogiri,
    /// Riichi declaration; `None` declares on the tile just drawn.
    Riichi(Option<Tile>),
    /// Closed or added kan, paired with the draw before it.
    Kan(Meld),
    /// Filler after an open kan.
    Placeholder,
}

/// The recorded draws and discards of one seat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatLog {
    pub haipai: Vec<Tile>,
    pub draws: Vec<Draw>,
    pub discards: Vec<Discard>,
}

/// Everything a successful replay recovers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReplay {
    pub seats: [SeatSnapshot; 4],
    pub initial_hands: [Vec<Tile>; 4],
    pub riichi: [bool; 4],
    /// Set when the last action of the round was a riichi declaration
    /// discard, so the caller can withdraw it if that tile dealt in.
    pub last_riichi: Option<u8>,
    /// The last tile resolved: the self-drawn tile, the last discard, or the
    /// tile of an added kan still waiting for its replacement discard.
    pub ending_tile: Option<Tile>,
    /// Seat that ended the round on its own draw.
    pub self_draw: Option<u8>,
}

impl RoundReplay {
    /// Records `ending_tile` as the winning tile of `seat`.
    pub fn mark_winner(&mut self, seat: u8) {
        if let Some(seat) = self.seats.get_mut(seat as usize) {
            seat.winning_tile = self.ending_tile;
        }
    }

    /// Withdraws a riichi whose declaration tile dealt in.
    pub fn withdraw_last_riichi(&mut self) {
        if let Some(seat) = self.last_riichi.take() {
            self.riichi[seat as usize] = false;
        }
    }
}

/// Replays one round in turn order, following calls out of rotation.
pub struct RoundSimulator {
    logs: [SeatLog; 4],
    seats: [SeatState; 4],
    cursor: [usize; 4],
    /// `(from, to)`: when `from` next discards, `to` takes the turn.
    jumps: Vec<(u8, u8)>,
    current: u8,
    turn: usize,
    ending_tile: Option<Tile>,
    last_riichi: Option<u8>,
}

impl RoundSimulator {
    #[must_use]
    pub fn new(dealer: u8, logs: [SeatLog; 4]) -> Self {
        let seats = logs.each_ref().map(|log| SeatState::new(log.haipai.clone()));
        Self {
            logs,
            seats,
            cursor: [0; 4],
            jumps: vec![],
            current: dealer % 4,
            turn: 0,
            ending_tile: None,
            last_riichi: None,
        }
    }

    pub fn run(mut self) -> Result<RoundReplay, RoundSimulationFailure> {
        for seat in 0..4 {
            self.register_next_call(seat);
        }

        let mut self_draw = None;
        loop {
            let seat = self.current as usize;
            let idx = self.cursor[seat];
            let Some(draw) = self.logs[seat].draws.get(idx).cloned() else {
                break;
            };
            self.last_riichi = None;

            if idx == self.logs[seat].discards.len() {
                match draw {
                    Draw::Tile(tile) => {
                        self.seats[seat].winning_tile = Some(tile);
                        self.ending_tile = Some(tile);
                        self_draw = Some(self.current);
                        break;
                    }
                    Draw::Call(meld) => {
                        return Err(self.fail(format!("round ends on call {meld}")));
                    }
                }
            }

            let discard = self.logs[seat].discards[idx].clone();
            self.cursor[seat] += 1;
            self.turn += 1;

            match (draw, discard) {
                (draw, Discard::Kan(meld)) => self.kan(draw, meld)?,
                (Draw::Call(meld), _) if meld.kind == MeldKind::OpenKan => {
                    self.apply(|s| s.call(meld))?;
                }
                (draw, discard) => {
                    let discarded = self.draw_and_discard(draw, discard)?;
                    self.ending_tile = Some(discarded);
                    self.register_next_call(self.current);
                    self.advance();
                }
            }
        }

        Ok(RoundReplay {
            seats: self.seats.each_ref().map(SeatState::snapshot),
            initial_hands: self.logs.map(|log| log.haipai),
            riichi: self.seats.each_ref().map(SeatState::riichi),
            last_riichi: self.last_riichi,
            ending_tile: self.ending_tile,
            self_draw,
        })
    }

    fn kan(&mut self, draw: Draw, meld: Meld) -> Result<(), RoundSimulationFailure> {
        let Draw::Tile(tile) = draw else {
            return Err(self.fail(format!("kan {meld} paired with a call")));
        };
        self.seats[self.current as usize].draw(tile);
        // a robbing win takes the added tile, not the replacement draw
        let ending = match meld.kind {
            MeldKind::ClosedKan => {
                self.apply(|s| s.closed_kan(meld))?;
                tile
            }
            MeldKind::AddedKan => {
                let added = meld.claimed_tile().unwrap_or(tile);
                self.apply(|s| s.added_kan(&meld))?;
                added
            }
            _ => return Err(self.fail(format!("{meld} cannot appear in the discard column"))),
        };
        self.ending_tile = Some(ending);
        Ok(())
    }

    /// Returns the discarded tile.
    fn draw_and_discard(
        &mut self,
        draw: Draw,
        discard: Discard,
    ) -> Result<Tile, RoundSimulationFailure> {
        let drawn = match draw {
            Draw::Tile(tile) => {
                self.seats[self.current as usize].draw(tile);
                Some(tile)
            }
            Draw::Call(meld) => match meld.kind {
                MeldKind::Chi | MeldKind::Pon => {
                    self.apply(|s| s.call(meld))?;
                    None
                }
                _ => return Err(self.fail(format!("{meld} cannot appear in the draw column"))),
            },
        };

        let (tile, riichi) = match discard {
            Discard::Tile(tile) => (Some(tile), false),
            Discard::Tsumogiri => (drawn, false),
            Discard::Riichi(tile) => (tile.or(drawn), true),
            Discard::Kan(_) | Discard::Placeholder => (None, false),
        };
        let tile = tile.ok_or_else(|| self.fail("nothing to discard".to_owned()))?;
        self.apply(|s| s.discard(tile))?;

        if riichi {
            self.seats[self.current as usize].riichi = true;
            self.last_riichi = Some(self.current);
        }
        Ok(tile)
    }

    /// If `seat`'s next draw is a call, the seat it calls from hands the
    /// turn over on its next discard.
    fn register_next_call(&mut self, seat: u8) {
        let log = &self.logs[seat as usize];
        if let Some(Draw::Call(meld)) = log.draws.get(self.cursor[seat as usize]) {
            self.jumps.push((meld.source_seat(seat), seat));
        }
    }

    fn advance(&mut self) {
        if let Some(pos) = self.jumps.iter().position(|&(from, _)| from == self.current) {
            let (_, to) = self.jumps.remove(pos);
            self.current = to;
        } else {
            self.current = (self.current + 1) % 4;
        }
    }

    fn apply(
        &mut self,
        f: impl FnOnce(&mut SeatState) -> Result<(), String>,
    ) -> Result<(), RoundSimulationFailure> {
        f(&mut self.seats[self.current as usize]).map_err(|reason| self.fail(reason))
    }

    fn fail(&self, reason: String) -> RoundSimulationFailure {
        RoundSimulationFailure {
            seat: self.current,
            turn: self.turn,
            reason,
        }
    }
}
