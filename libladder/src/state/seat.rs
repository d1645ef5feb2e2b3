use crate::meld::{Meld, MeldKind};
use crate::tile::{Tile, sort_tiles, tiles_to_string};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Mutable per-seat state, owned by the simulator for one replay.
#[derive(Debug, Clone, Default)]
pub struct SeatState {
    pub(super) hand: Vec<Tile>,
    pub(super) melds: Vec<Meld>,
    pub(super) discards: Vec<Tile>,
    pub(super) winning_tile: Option<Tile>,
    pub(super) riichi: bool,
}

/// Frozen view of a seat at the end of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSnapshot {
    /// Concealed tiles, sorted.
    pub hand: Vec<Tile>,
    pub melds: Vec<Meld>,
    /// Every tile this seat discarded, including ones later claimed.
    pub discards: Vec<Tile>,
    pub winning_tile: Option<Tile>,
}

impl SeatState {
    #[must_use]
    pub fn new(haipai: Vec<Tile>) -> Self {
        Self {
            hand: haipai,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn hand(&self) -> &[Tile] {
        &self.hand
    }

    #[inline]
    #[must_use]
    pub fn melds(&self) -> &[Meld] {
        &self.melds
    }

    #[inline]
    #[must_use]
    pub const fn riichi(&self) -> bool {
        self.riichi
    }

    fn remove(&mut self, tile: Tile) -> Result<(), String> {
        let idx = self
            .hand
            .iter()
            .position(|&t| t == tile)
            .ok_or_else(|| format!("{tile} is not in hand {}", tiles_to_string(&self.hand)))?;
        self.hand.swap_remove(idx);
        Ok(())
    }

    pub(super) fn draw(&mut self, tile: Tile) {
        self.hand.push(tile);
    }

    pub(super) fn discard(&mut self, tile: Tile) -> Result<(), String> {
        self.remove(tile)?;
        self.discards.push(tile);
        Ok(())
    }

    /// Chi, pon or open kan. The claimed tile never enters the hand.
    pub(super) fn call(&mut self, meld: Meld) -> Result<(), String> {
        for tile in meld.hand_tiles() {
            self.remove(tile)?;
        }
        self.melds.push(meld);
        Ok(())
    }

    pub(super) fn closed_kan(&mut self, meld: Meld) -> Result<(), String> {
        self.call(meld)
    }

    /// Moves the added tile out of the hand and upgrades the matching pon.
    pub(super) fn added_kan(&mut self, meld: &Meld) -> Result<(), String> {
        let added = meld
            .claimed_tile()
            .ok_or_else(|| "added kan without an added tile".to_owned())?;
        let pon = self
            .melds
            .iter_mut()
            .find(|m| m.kind == MeldKind::Pon && m.tiles[0].same_kind(added))
            .ok_or_else(|| format!("no pon of {added} to add onto"))?;
        let idx = self
            .hand
            .iter()
            .position(|&t| t == added)
            .ok_or_else(|| format!("{added} is not in hand {}", tiles_to_string(&self.hand)))?;
        self.hand.swap_remove(idx);
        pon.kind = MeldKind::AddedKan;
        pon.tiles.push(added);
        Ok(())
    }

    #[must_use]
    pub fn snapshot(&self) -> SeatSnapshot {
        let mut hand = self.hand.clone();
        sort_tiles(&mut hand);
        SeatSnapshot {
            hand,
            melds: self.melds.clone(),
            discards: self.discards.clone(),
            winning_tile: self.winning_tile,
        }
    }
}

impl fmt::Display for SeatSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", tiles_to_string(&self.hand))?;
        for meld in &self.melds {
            write!(f, " {meld}")?;
        }
        if let Some(tile) = self.winning_tile {
            write!(f, " +{tile}")?;
        }
        Ok(())
    }
}
