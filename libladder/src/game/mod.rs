//! Recorded games and the kinds that weight them.

mod data;
pub mod kind;

pub use data::{GameData, GamePreview, PT_DELTA, R_DELTA, R_FLOOR};
pub use kind::{GameKind, GameKindRegistry};
