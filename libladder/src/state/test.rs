use super::*;
use crate::meld::{Meld, MeldKind};
use crate::t;
use crate::tile::Tile;

use super::Discard::{Placeholder, Tsumogiri};

fn seat(haipai: &[Tile], draws: Vec<Draw>, discards: Vec<Discard>) -> SeatLog {
    SeatLog {
        haipai: haipai.to_vec(),
        draws,
        discards,
    }
}

fn d(tile: Tile) -> Draw {
    Draw::Tile(tile)
}

fn x(tile: Tile) -> Discard {
    Discard::Tile(tile)
}

fn call(token: &str) -> Draw {
    Draw::Call(Meld::decode(token).unwrap())
}

fn kan(token: &str) -> Discard {
    Discard::Kan(Meld::decode(token).unwrap())
}

fn idle() -> SeatLog {
    SeatLog::default()
}

#[test]
fn rotation_and_tsumogiri() {
    let replay = RoundSimulator::new(
        0,
        [
            seat(&[t!(1m)], vec![d(t!(2m))], vec![x(t!(1m))]),
            seat(&[t!(1p)], vec![d(t!(2p))], vec![Tsumogiri]),
            seat(&[t!(1s)], vec![], vec![]),
            idle(),
        ],
    )
    .run()
    .unwrap();

    assert_eq!(replay.seats[0].hand, [t!(2m)]);
    assert_eq!(replay.seats[0].discards, [t!(1m)]);
    assert_eq!(replay.seats[1].hand, [t!(1p)]);
    assert_eq!(replay.seats[1].discards, [t!(2p)]);
    assert_eq!(replay.seats[2].hand, [t!(1s)]);
    assert_eq!(replay.ending_tile, Some(t!(2p)));
    assert_eq!(replay.self_draw, None);
    assert_eq!(replay.riichi, [false; 4]);
    assert_eq!(replay.initial_hands[1], [t!(1p)]);
}

#[test]
fn first_turn_pon_skips_a_seat() {
    let replay = RoundSimulator::new(
        0,
        [
            seat(&t![1z, 9m], vec![d(t!(5m))], vec![x(t!(1z))]),
            seat(&[t!(4s)], vec![d(t!(4s))], vec![Tsumogiri]),
            seat(&t![1z, 1z, 3p], vec![call("41p4141")], vec![x(t!(3p))]),
            seat(&[t!(7s)], vec![], vec![]),
        ],
    )
    .run()
    .unwrap();

    let pon = &replay.seats[2].melds[0];
    assert_eq!(pon.kind, MeldKind::Pon);
    assert_eq!(pon.source_seat(2), 0);
    assert!(replay.seats[2].hand.is_empty());
    assert_eq!(replay.seats[2].discards, [t!(3p)]);
    assert_eq!(replay.seats[0].hand, t![5m, 9m]);
    // seat 1 was skipped and seat 3 ended the round with nothing to draw
    assert!(replay.seats[1].discards.is_empty());
    assert_eq!(replay.ending_tile, Some(t!(3p)));
}

#[test]
fn call_registered_after_discard() {
    let replay = RoundSimulator::new(
        0,
        [
            seat(
                &t![1p, 9m, 9m],
                vec![d(t!(2p)), call("19p1919")],
                vec![Tsumogiri, x(t!(1p))],
            ),
            seat(&[t!(1s)], vec![d(t!(2s)), d(t!(3s))], vec![Tsumogiri, Tsumogiri]),
            seat(&[t!(9m)], vec![d(t!(8m))], vec![x(t!(9m))]),
            seat(&[t!(4z)], vec![d(t!(4s))], vec![Tsumogiri]),
        ],
    )
    .run()
    .unwrap();

    assert_eq!(replay.seats[0].melds.len(), 1);
    assert_eq!(replay.seats[0].melds[0].claimed_tile(), Some(t!(9m)));
    assert!(replay.seats[0].hand.is_empty());
    assert_eq!(replay.seats[0].discards, t![2p, 1p]);
    assert!(replay.seats[3].discards.is_empty());
    assert_eq!(replay.seats[1].discards, t![2s, 3s]);
    assert_eq!(replay.ending_tile, Some(t!(3s)));
}

#[test]
fn chi_from_the_left() {
    let replay = RoundSimulator::new(
        1,
        [
            idle(),
            seat(&t![3m, 9p], vec![d(t!(9s))], vec![x(t!(3m))]),
            seat(&t![1m, 2m, 7z], vec![call("c131112")], vec![x(t!(7z))]),
            seat(&[t!(6z)], vec![], vec![]),
        ],
    )
    .run()
    .unwrap();

    let chi = &replay.seats[2].melds[0];
    assert_eq!(chi.kind, MeldKind::Chi);
    assert_eq!(chi.source_seat(2), 1);
    assert_eq!(replay.seats[1].hand, t![9p, 9s]);
    assert_eq!(replay.ending_tile, Some(t!(7z)));
}

#[test]
fn closed_and_open_kan() {
    let replay = RoundSimulator::new(
        0,
        [
            seat(
                &t![1z, 1z, 1z, 2z],
                vec![d(t!(1z)), d(t!(5m))],
                vec![kan("414141a41"), x(t!(2z))],
            ),
            seat(
                &t![2z, 2z, 2z, 9p],
                vec![call("m42424242"), d(t!(7p))],
                vec![Placeholder, x(t!(9p))],
            ),
            idle(),
            idle(),
        ],
    )
    .run()
    .unwrap();

    let closed = &replay.seats[0].melds[0];
    assert_eq!(closed.kind, MeldKind::ClosedKan);
    assert_eq!(closed.claimed, None);
    assert_eq!(replay.seats[0].hand, [t!(5m)]);

    let open = &replay.seats[1].melds[0];
    assert_eq!(open.kind, MeldKind::OpenKan);
    assert_eq!(open.source_seat(1), 0);
    assert_eq!(replay.seats[1].hand, [t!(7p)]);
    assert_eq!(replay.seats[1].discards, [t!(9p)]);
    assert_eq!(replay.ending_tile, Some(t!(9p)));
}

#[test]
fn added_kan_upgrades_pon() {
    let replay = RoundSimulator::new(
        0,
        [
            seat(
                &t![3z, 1m],
                vec![d(t!(2m)), d(t!(3m))],
                vec![x(t!(3z)), Tsumogiri],
            ),
            seat(
                &t![3z, 3z, 9s],
                vec![call("p434343"), d(t!(3z)), d(t!(5s))],
                vec![x(t!(9s)), kan("k43434343"), Tsumogiri],
            ),
            seat(&[], vec![d(t!(1p))], vec![Tsumogiri]),
            seat(&[], vec![d(t!(2p))], vec![Tsumogiri]),
        ],
    )
    .run()
    .unwrap();

    let s1 = &replay.seats[1];
    assert_eq!(s1.melds.len(), 1);
    assert_eq!(s1.melds[0].kind, MeldKind::AddedKan);
    assert_eq!(s1.melds[0].tiles.len(), 4);
    assert_eq!(s1.melds[0].source_seat(1), 0);
    assert!(s1.hand.is_empty());
    assert_eq!(s1.discards, t![9s, 5s]);
    assert_eq!(replay.seats[0].hand, t![1m, 2m]);
    assert_eq!(replay.ending_tile, Some(t!(5s)));
}

#[test]
fn robbed_added_kan_ends_on_added_tile() {
    let mut replay = RoundSimulator::new(
        0,
        [
            seat(
                &t![3z, 1m],
                vec![d(t!(2m)), d(t!(3m))],
                vec![x(t!(3z)), Tsumogiri],
            ),
            seat(
                &t![3z, 3z, 3z, 9s],
                vec![call("p434343"), d(t!(5s))],
                vec![x(t!(9s)), kan("k43434343")],
            ),
            seat(&[], vec![d(t!(1p))], vec![Tsumogiri]),
            seat(&[], vec![d(t!(2p))], vec![Tsumogiri]),
        ],
    )
    .run()
    .unwrap();

    assert_eq!(replay.seats[1].hand, [t!(5s)]);
    assert_eq!(replay.seats[1].melds[0].kind, MeldKind::AddedKan);
    assert_eq!(replay.ending_tile, Some(t!(3z)));
    assert_eq!(replay.self_draw, None);
    replay.mark_winner(2);
    assert_eq!(replay.seats[2].winning_tile, Some(t!(3z)));
}

#[test]
fn riichi_on_last_discard() {
    let mut replay = RoundSimulator::new(
        2,
        [
            idle(),
            idle(),
            seat(&t![1m, 5z], vec![d(t!(2m))], vec![Discard::Riichi(Some(t!(5z)))]),
            seat(&[t!(9m)], vec![], vec![]),
        ],
    )
    .run()
    .unwrap();

    assert_eq!(replay.riichi, [false, false, true, false]);
    assert_eq!(replay.last_riichi, Some(2));
    assert_eq!(replay.ending_tile, Some(t!(5z)));

    replay.mark_winner(3);
    assert_eq!(replay.seats[3].winning_tile, Some(t!(5z)));
    replay.withdraw_last_riichi();
    assert_eq!(replay.riichi, [false; 4]);
    assert_eq!(replay.last_riichi, None);
}

#[test]
fn riichi_on_drawn_tile_stays_when_play_continues() {
    let replay = RoundSimulator::new(
        0,
        [
            seat(&[t!(1m)], vec![d(t!(8p)), d(t!(9p))], vec![Discard::Riichi(None), Tsumogiri]),
            seat(&[t!(1s)], vec![d(t!(2s))], vec![Tsumogiri]),
            seat(&[t!(1p)], vec![d(t!(3s))], vec![Tsumogiri]),
            seat(&[t!(2p)], vec![d(t!(4s))], vec![Tsumogiri]),
        ],
    )
    .run()
    .unwrap();

    assert_eq!(replay.riichi, [true, false, false, false]);
    assert_eq!(replay.last_riichi, None);
    assert_eq!(replay.seats[0].discards, t![8p, 9p]);
    assert_eq!(replay.seats[0].hand, [t!(1m)]);
}

#[test]
fn self_draw() {
    let replay = RoundSimulator::new(
        0,
        [
            seat(&t![1m, 2m], vec![d(t!(3m)), d(t!(4m))], vec![x(t!(2m))]),
            seat(&[], vec![d(t!(1s))], vec![Tsumogiri]),
            seat(&[], vec![d(t!(2s))], vec![Tsumogiri]),
            seat(&[], vec![d(t!(3s))], vec![Tsumogiri]),
        ],
    )
    .run()
    .unwrap();

    assert_eq!(replay.self_draw, Some(0));
    assert_eq!(replay.ending_tile, Some(t!(4m)));
    assert_eq!(replay.seats[0].winning_tile, Some(t!(4m)));
    assert_eq!(replay.seats[0].hand, t![1m, 3m]);
    assert_eq!(replay.seats[0].to_string(), "13m +4m");
}

#[test]
fn missing_tile_fails() {
    let err = RoundSimulator::new(
        0,
        [
            seat(&[t!(1m)], vec![d(t!(2m))], vec![x(t!(3m))]),
            idle(),
            idle(),
            idle(),
        ],
    )
    .run()
    .unwrap_err();
    assert_eq!(err.seat, 0);
    assert_eq!(err.turn, 1);
    assert!(err.reason.contains("3m"));

    // red and plain fives are different tiles
    let err = RoundSimulator::new(
        0,
        [
            seat(&[t!(5p)], vec![d(t!(1z))], vec![x(t!(0p))]),
            idle(),
            idle(),
            idle(),
        ],
    )
    .run()
    .unwrap_err();
    assert!(err.reason.contains("0p"));
}

#[test]
fn added_kan_without_pon_fails() {
    let err = RoundSimulator::new(
        3,
        [
            idle(),
            idle(),
            idle(),
            seat(&[t!(4z)], vec![d(t!(4z))], vec![kan("k44444444")]),
        ],
    )
    .run()
    .unwrap_err();
    assert_eq!(err.seat, 3);
    assert!(err.reason.contains("no pon"));
}

#[test]
fn misplaced_tokens_fail() {
    let err = RoundSimulator::new(
        0,
        [
            seat(&t![1z, 1z, 1z], vec![call("414141a41")], vec![Tsumogiri]),
            idle(),
            idle(),
            idle(),
        ],
    )
    .run()
    .unwrap_err();
    assert!(err.reason.contains("draw column"));

    let err = RoundSimulator::new(
        0,
        [
            seat(&[t!(1z)], vec![d(t!(1z))], vec![Placeholder]),
            idle(),
            idle(),
            idle(),
        ],
    )
    .run()
    .unwrap_err();
    assert!(err.reason.contains("nothing to discard"));
}
