use ladder::game::GameKindRegistry;
use ladder::ladder::player::TIER_THRESHOLD;
use ladder::ladder::{ExternalId, PlayerDirectory};
use ladder::score::{RoundOutcome, ScoringConfig};
use ladder::{GameAggregator, GameRecord, Ladder, LogSource};
use serde_json::{Value, json};

fn seats() -> Value {
    json!([
        [11, 12], [13], [11],
        [21], [22], [60],
        [31], [], [],
        [41], [], [],
    ])
}

fn round(meta: [u8; 3], scores: [i32; 4], result: Value) -> Value {
    let mut round = vec![json!(meta), json!(scores), json!([21]), json!([])];
    round.extend(seats().as_array().unwrap().iter().cloned());
    round.push(result);
    Value::Array(round)
}

fn tenhou_game(reference: &str, names: [&str; 4]) -> GameRecord {
    let log = json!({
        "title": ["", "08/19/2023, 09:05:31 PM"],
        "name": names,
        "rule": {"disp": "友人戦東喰赤"},
        "log": [
            round([0, 0, 0], [25000; 4], json!([
                "和了",
                [0, 3900, -3900, 0],
                [1, 2, 1, "40符2飜2600点", "立直(1飜)", "ドラ(1飜)"],
            ])),
            round([1, 0, 0], [25000, 29200, 20800, 25000], json!([
                "流局",
                [1500, -1500, 1500, -1500],
            ])),
        ],
        "sc": [265, 5.5, 277, 27.7, 223, -37.7, 235, 4.5],
        "ref": reference,
    });
    GameRecord::parse(LogSource::Tenhou, &log.to_string()).unwrap()
}

fn offline(date: &str, points: [i32; 4]) -> GameRecord {
    let json = json!({
        "game_date": date,
        "player_ids": ["w", "x", "y", "z"],
        "player_points": points,
        "game_type": "offline_south",
    });
    GameRecord::parse(LogSource::Offline, &json.to_string()).unwrap()
}

fn aggregator() -> GameAggregator {
    GameAggregator::new(GameKindRegistry::builtin(), ScoringConfig::default())
}

#[test]
fn tenhou_game_end_to_end() {
    let mut ladder = Ladder::new();
    let record = tenhou_game("230819-abc", ["A", "B", "C", "D"]);
    ladder.ingest(&aggregator(), &record).unwrap();

    let game = &ladder.games.games()[0];
    assert_eq!(game.external_id.as_deref(), Some("230819-abc"));
    assert_eq!(game.kind.name, "majsoul_east");
    assert_eq!(game.points, [26500, 27700, 22300, 23500]);
    assert_eq!(game.rounds.len(), 2);
    assert_eq!(game.rounds[0].outcome, RoundOutcome::Ron);
    assert_eq!(game.rounds[0].transfers(), [0, 4200, -4200, 0]);
    assert_eq!(game.rounds[1].final_points(), game.points);
    assert_eq!(game.finish_order(), [1, 0, 3, 2]);
    // 90 45 0 -45, times 2/3
    assert_eq!(game.pt_delta(), [30, 60, -30, 0]);

    let b = ladder
        .players
        .lookup_by_external_id(&ExternalId::Tenhou("B".to_owned()))
        .unwrap();
    assert_eq!(b.name, "B");
    assert_eq!(b.tier_score(), 260);
    assert_eq!(b.order_count(), [1, 0, 0, 0]);
    assert_eq!(ladder.players.leaderboard()[0].name, "B");
}

#[test]
fn ingest_is_idempotent_across_snapshots() {
    let aggregator = aggregator();
    let mut ladder = Ladder::new();
    let record = tenhou_game("230819-abc", ["A", "B", "C", "D"]);
    ladder.ingest(&aggregator, &record).unwrap();

    let path = std::env::temp_dir().join(format!("ladder-it-{}.json.gz", std::process::id()));
    ladder.save(&path).unwrap();
    let mut reloaded = Ladder::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    reloaded.ingest(&aggregator, &record).unwrap();
    assert_eq!(reloaded, ladder);

    // same table, different game
    reloaded.ingest(&aggregator, &tenhou_game("230820-def", ["A", "B", "C", "D"])).unwrap();
    assert_eq!(reloaded.games.len(), 2);
    assert_eq!(reloaded.players.len(), 4);
}

#[test]
fn recompute_after_ingest_is_stable() {
    let aggregator = aggregator();
    let mut ladder = Ladder::new();
    for day in 1..=9 {
        let points = if day % 3 == 0 {
            [10000, 20000, 30000, 40000]
        } else {
            [40000, 30000, 20000, 10000]
        };
        ladder
            .ingest(&aggregator, &offline(&format!("2023-09-0{day}"), points))
            .unwrap();
    }
    let incremental = ladder.clone();
    ladder.recompute().unwrap();
    assert_eq!(ladder.players, incremental.players);

    let w = ladder.players.lookup_by_id("w").unwrap();
    assert_eq!(w.game_count(), 9);
    assert!(w.tier_score() >= 0 && w.tier_score() <= TIER_THRESHOLD[w.tier() as usize]);
    assert!(w.highest_tier() >= w.tier());
}
