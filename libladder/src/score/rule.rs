use std::fmt;
use std::str::FromStr;

use anyhow::{Error, bail};
use serde::{Deserialize, Serialize};

/// How a draw with a mangan hand in the discards is paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawWithManganPolicy {
    /// Fixed mangan payments, no honba, the riichi pot stays on the table.
    #[default]
    AsDraw,
    /// Scored as a 4 han 40 fu self-draw win.
    AsTsumo,
}

/// Process-wide scoring configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub draw_with_mangan: DrawWithManganPolicy,
}

impl ScoringConfig {
    #[must_use]
    pub const fn new(draw_with_mangan: DrawWithManganPolicy) -> Self {
        Self { draw_with_mangan }
    }
}

impl FromStr for DrawWithManganPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draw" | "as_draw" => Ok(Self::AsDraw),
            "tsumo" | "as_tsumo" => Ok(Self::AsTsumo),
            _ => bail!("unknown draw-with-mangan policy {s:?}, expected draw or tsumo"),
        }
    }
}

impl fmt::Display for DrawWithManganPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsDraw => f.write_str("draw"),
            Self::AsTsumo => f.write_str("tsumo"),
        }
    }
}
