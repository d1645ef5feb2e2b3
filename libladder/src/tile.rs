use crate::error::DecodeError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Every valid compact id: `suit * 10 + rank` for the 34 kinds, then the
/// three red-five sentinels.
const TILE_IDS_LEN: usize = 3 * 9 + 7 + 3;
const TILE_IDS: [u8; TILE_IDS_LEN] = [
    11, 12, 13, 14, 15, 16, 17, 18, 19, // m
    21, 22, 23, 24, 25, 26, 27, 28, 29, // p
    31, 32, 33, 34, 35, 36, 37, 38, 39, // s
    41, 42, 43, 44, 45, 46, 47, // z
    51, 52, 53, // aka
];
const SUIT_CHARS: [char; 4] = ['m', 'p', 's', 'z'];

static TILE_STRINGS_MAP: LazyLock<AHashMap<String, Tile>> = LazyLock::new(|| {
    TILE_IDS
        .iter()
        .map(|&id| {
            let tile = Tile(id);
            (tile.to_string(), tile)
        })
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Man = 0,
    Pin = 1,
    Sou = 2,
    Honor = 3,
}

impl Suit {
    #[inline]
    #[must_use]
    pub const fn as_char(self) -> char {
        SUIT_CHARS[self as usize]
    }
}

/// A tile, stored as its compact log id. Red fives keep their own sentinel
/// (51/52/53) so the red flag survives every conversion.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile(u8);

impl Tile {
    /// The compact id as it appears in logs.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn suit(self) -> Suit {
        match self.0 {
            11..=19 | 51 => Suit::Man,
            21..=29 | 52 => Suit::Pin,
            31..=39 | 53 => Suit::Sou,
            _ => Suit::Honor,
        }
    }

    /// Rank with red fives normalized to 5.
    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        if self.is_aka() { 5 } else { self.0 % 10 }
    }

    #[inline]
    #[must_use]
    pub const fn is_aka(self) -> bool {
        self.0 > 50
    }

    #[inline]
    #[must_use]
    pub const fn is_honor(self) -> bool {
        self.0 > 40 && self.0 < 50
    }

    #[inline]
    #[must_use]
    pub const fn deaka(self) -> Self {
        match self.0 {
            51 => Self(15),
            52 => Self(25),
            53 => Self(35),
            _ => self,
        }
    }

    #[inline]
    #[must_use]
    pub const fn akaize(self) -> Self {
        match self.0 {
            15 => Self(51),
            25 => Self(52),
            35 => Self(53),
            _ => self,
        }
    }

    /// Same kind, ignoring the red flag.
    #[inline]
    #[must_use]
    pub const fn same_kind(self, other: Self) -> bool {
        self.deaka().0 == other.deaka().0
    }

    /// Parses a tile written as `"5m"`, `"0p"` or `"7z"`.
    pub fn from_text(s: &str) -> Result<Self, DecodeError> {
        TILE_STRINGS_MAP
            .get(s)
            .copied()
            .ok_or_else(|| DecodeError::InvalidTileText(s.to_owned()))
    }

    #[inline]
    const fn sort_key(self) -> (u8, u8, bool) {
        (self.suit() as u8, self.rank(), self.is_aka())
    }
}

/// Sorts tiles into canonical hand order.
pub fn sort_tiles(tiles: &mut [Tile]) {
    tiles.sort_unstable();
}

/// Formats tiles compactly, e.g. `123m055p11z`.
#[must_use]
pub fn tiles_to_string(tiles: &[Tile]) -> String {
    let mut sorted = tiles.to_vec();
    sort_tiles(&mut sorted);
    let mut out = String::with_capacity(sorted.len() + 4);
    for (idx, tile) in sorted.iter().enumerate() {
        let digit = if tile.is_aka() { 0 } else { tile.rank() };
        out.push(char::from(b'0' + digit));
        if sorted.get(idx + 1).is_none_or(|next| next.suit() != tile.suit()) {
            out.push(tile.suit().as_char());
        }
    }
    out
}

impl Ord for Tile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Tile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<u8> for Tile {
    type Error = DecodeError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Self::try_from(u32::from(v))
    }
}

impl TryFrom<u32> for Tile {
    type Error = DecodeError;

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        match v {
            11..=19 | 21..=29 | 31..=39 | 41..=47 | 51..=53 => Ok(Self(v as u8)),
            _ => Err(DecodeError::InvalidTileId(v)),
        }
    }
}

impl From<Tile> for u8 {
    fn from(tile: Tile) -> Self {
        tile.0
    }
}

impl FromStr for Tile {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digit = if self.is_aka() { 0 } else { self.rank() };
        write!(f, "{digit}{}", self.suit().as_char())
    }
}

impl<'de> Deserialize<'de> for Tile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tile = String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)?;
        Ok(tile)
    }
}

impl Serialize for Tile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// `t!(5m)` for one tile, `t![1m, 0p, 7z]` for an array. Panics on a bad
/// literal, so keep it to tests and constants.
#[macro_export]
macro_rules! t {
    ($s:tt) => {
        match $crate::tile::Tile::from_text(stringify!($s)) {
            Ok(tile) => tile,
            Err(err) => panic!("{err}"),
        }
    };
    ($($s:tt),* $(,)?) => {
        [$($crate::t!($s)),*]
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn convert() {
        "1z".parse::<Tile>().unwrap();
        "0m".parse::<Tile>().unwrap();
        Tile::try_from(11_u8).unwrap();
        Tile::try_from(47_u8).unwrap();
        Tile::try_from(53_u8).unwrap();

        "".parse::<Tile>().unwrap_err();
        "0z".parse::<Tile>().unwrap_err();
        "8z".parse::<Tile>().unwrap_err();
        "5".parse::<Tile>().unwrap_err();
        for bad in [0_u32, 10, 20, 30, 40, 48, 50, 54, 60, 255] {
            assert!(matches!(
                Tile::try_from(bad),
                Err(DecodeError::InvalidTileId(v)) if v == bad
            ));
        }
    }

    #[test]
    fn fields() {
        let aka = t!(0p);
        assert_eq!(aka.as_u8(), 52);
        assert_eq!(aka.suit(), Suit::Pin);
        assert_eq!(aka.rank(), 5);
        assert!(aka.is_aka());
        assert_eq!(aka.deaka(), t!(5p));
        assert_eq!(t!(5p).akaize(), aka);
        assert!(aka.same_kind(t!(5p)));
        assert!(!aka.same_kind(t!(5s)));

        assert_eq!(t!(7z).as_u8(), 47);
        assert!(t!(7z).is_honor());
        assert_eq!(t!(7z).rank(), 7);
        assert_eq!(t!(7z).akaize(), t!(7z));
    }

    #[test]
    fn ordering() {
        let mut tiles = t![1z, 0m, 9s, 5m, 4m, 1p, 6m];
        sort_tiles(&mut tiles);
        assert_eq!(tiles, t![4m, 5m, 0m, 6m, 1p, 9s, 1z]);
        assert_eq!(tiles_to_string(&tiles), "4506m1p9s1z");
    }

    #[test]
    fn serde_as_text() {
        let json = serde_json::to_string(&t![0s, 3z]).unwrap();
        assert_eq!(json, r#"["0s","3z"]"#);
        let back: Vec<Tile> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t![0s, 3z]);
    }

    proptest! {
        #[test]
        fn id_round_trip(idx in 0..TILE_IDS_LEN) {
            let id = TILE_IDS[idx];
            let tile = Tile::try_from(id).unwrap();
            prop_assert_eq!(u8::from(tile), id);
            prop_assert_eq!(tile.to_string().parse::<Tile>().unwrap(), tile);
        }
    }
}
