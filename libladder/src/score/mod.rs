//! Point transfers for a finished round.

mod round;
mod rule;

pub use round::{
    AbortiveDraw, HONBA_RON, HONBA_TSUMO_EACH, MANGAN_BASE, RIICHI_STAKE, RoundDetail,
    RoundHeader, RoundOutcome, RoundResult, WinRecord, Wind, YAKUMAN_BASE, Yaku,
};
pub use rule::{DrawWithManganPolicy, ScoringConfig};
