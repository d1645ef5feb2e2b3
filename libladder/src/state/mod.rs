//! Round replay: recovers each seat's hand, melds, discards and riichi flag
//! from the per-seat draw and discard columns of a log.

mod seat;
mod simulator;

#[cfg(test)]
mod test;

pub use seat::{SeatSnapshot, SeatState};
pub use simulator::{Discard, Draw, RoundReplay, RoundSimulator, SeatLog};
