//! Claimed and concealed melds, and the compact tokens that encode them.
//!
//! A token is a run of two-digit tile ids with exactly one marker letter
//! spliced in:
//!
//! | marker | meld | tiles | marker slot → source |
//! |---|---|---|---|
//! | `c` | chi | 3 | 0 → left |
//! | `p` | pon | 3 | 0 → left, 1 → across, 2 → right |
//! | `m` | open kan | 4 | 0 → left, 1 → across, 3 → right |
//! | `k` | added kan | 4 | 0 → left, 1 → across, 2 → right |
//! | `a` | closed kan | 4 | 3 → self |
//!
//! The tile right after the marker is the one taken from the other seat (for
//! an added kan, the tile added onto the pon).

use crate::error::DecodeError;
use crate::tile::Tile;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeldKind {
    Chi,
    Pon,
    OpenKan,
    AddedKan,
    ClosedKan,
}

impl MeldKind {
    const fn from_marker(c: char) -> Option<Self> {
        match c {
            'c' => Some(Self::Chi),
            'p' => Some(Self::Pon),
            'm' => Some(Self::OpenKan),
            'k' => Some(Self::AddedKan),
            'a' => Some(Self::ClosedKan),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Chi => 'c',
            Self::Pon => 'p',
            Self::OpenKan => 'm',
            Self::AddedKan => 'k',
            Self::ClosedKan => 'a',
        }
    }

    #[inline]
    #[must_use]
    pub const fn tile_count(self) -> usize {
        match self {
            Self::Chi | Self::Pon => 3,
            _ => 4,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_kan(self) -> bool {
        matches!(self, Self::OpenKan | Self::AddedKan | Self::ClosedKan)
    }

    /// Relative source seat for a marker at `slot`: 1 = right, 2 = across,
    /// 3 = left, 0 = self.
    const fn source_for_slot(self, slot: usize) -> Option<u8> {
        match (self, slot) {
            (Self::ClosedKan, 3) => Some(0),
            (Self::ClosedKan, _) => None,
            (Self::Chi, 0) => Some(3),
            (Self::Chi, _) => None,
            (_, 0) => Some(3),
            (_, 1) => Some(2),
            (Self::Pon | Self::AddedKan, 2) | (Self::OpenKan, 3) => Some(1),
            _ => None,
        }
    }
}

/// A meld as laid on the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meld {
    pub kind: MeldKind,
    /// Tiles in token order.
    pub tiles: Vec<Tile>,
    /// Index into `tiles` of the tile turned sideways. `None` only for a
    /// closed kan.
    pub claimed: Option<usize>,
    /// Relative seat the claim was made from (1 = right, 2 = across,
    /// 3 = left, 0 for a closed kan).
    pub from: u8,
}

impl Meld {
    /// Decodes a log token such as `c275226`, `41p4141` or `373737a37`.
    pub fn decode(token: &str) -> Result<Self, DecodeError> {
        let mut marker = None;
        let mut digits = Vec::with_capacity(token.len());
        for (idx, c) in token.char_indices() {
            if c.is_ascii_digit() {
                digits.push(c as u8 - b'0');
                continue;
            }
            let kind = MeldKind::from_marker(c)
                .ok_or_else(|| DecodeError::meld(token, "unexpected character"))?;
            if marker.is_some() {
                return Err(DecodeError::meld(token, "more than one marker"));
            }
            if idx % 2 != 0 {
                return Err(DecodeError::meld(token, "marker splits a tile id"));
            }
            marker = Some((kind, idx / 2));
        }
        let (kind, slot) = marker.ok_or_else(|| DecodeError::meld(token, "no marker"))?;

        if digits.len() % 2 != 0 {
            return Err(DecodeError::meld(token, "odd number of digits"));
        }
        let tiles = digits
            .chunks_exact(2)
            .map(|pair| Tile::try_from(u32::from(pair[0] * 10 + pair[1])))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| DecodeError::meld(token, "invalid tile id"))?;
        if tiles.len() != kind.tile_count() {
            return Err(DecodeError::meld(token, "wrong number of tiles"));
        }
        if slot >= tiles.len() {
            return Err(DecodeError::meld(token, "marker has no tile after it"));
        }

        let from = kind
            .source_for_slot(slot)
            .ok_or_else(|| DecodeError::meld(token, "marker in an impossible position"))?;
        let claimed = (kind != MeldKind::ClosedKan).then_some(slot);
        Ok(Self {
            kind,
            tiles,
            claimed,
            from,
        })
    }

    #[inline]
    #[must_use]
    pub fn claimed_tile(&self) -> Option<Tile> {
        self.claimed.map(|idx| self.tiles[idx])
    }

    /// Tiles that must come out of the concealed hand when this meld is
    /// formed from a call or a closed kan.
    #[must_use]
    pub fn hand_tiles(&self) -> Vec<Tile> {
        match (self.kind, self.claimed) {
            (MeldKind::AddedKan, Some(idx)) => vec![self.tiles[idx]],
            (_, Some(idx)) => self
                .tiles
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != idx)
                .map(|(_, &t)| t)
                .collect(),
            (_, None) => self.tiles.clone(),
        }
    }

    /// Absolute seat the claim came from.
    #[inline]
    #[must_use]
    pub const fn source_seat(&self, seat: u8) -> u8 {
        (seat + self.from) % 4
    }

    /// Sorted copy of the tiles, for display.
    #[must_use]
    pub fn sorted_tiles(&self) -> Vec<Tile> {
        let mut tiles = self.tiles.clone();
        tiles.sort_unstable();
        tiles
    }
}

impl FromStr for Meld {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for Meld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, tile) in self.tiles.iter().enumerate() {
            if self.claimed == Some(idx) {
                write!(f, "[{tile}]")?;
            } else {
                write!(f, "{tile}")?;
            }
        }
        Ok(())
    }
}
