use super::player::{PlayerData, PlayerSnapshot};
use super::rating::RatingEngine;
use super::store::{GameStore, PlayerDirectory};
use crate::convlog::{DecodedGame, GameRecord, SeatIdentity};
use crate::error::{IngestError, IngestResult};
use crate::game::{GameData, GameKindRegistry};
use crate::score::ScoringConfig;

/// What [`GameAggregator::ingest`] did with a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingested {
    Stored { game_id: String },
    /// A game with the same external id is already stored; nothing changed.
    DuplicateExternalId,
}

/// Turns game records into stored, rated games.
#[derive(Debug, Clone, Default)]
pub struct GameAggregator {
    registry: GameKindRegistry,
    config: ScoringConfig,
}

/// How a seat maps onto the player directory.
enum SeatPlan {
    Known(String),
    New(PlayerData),
}

impl SeatPlan {
    fn player_id(&self) -> &str {
        match self {
            Self::Known(id) => id,
            Self::New(player) => &player.player_id,
        }
    }
}

impl GameAggregator {
    #[must_use]
    pub const fn new(registry: GameKindRegistry, config: ScoringConfig) -> Self {
        Self { registry, config }
    }

    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &GameKindRegistry {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Decodes, scores and stores one game and applies it to its players.
    /// At most once per external id. On error neither store is touched.
    pub fn ingest<D>(
        &self,
        record: &GameRecord,
        games: &mut GameStore,
        players: &mut D,
    ) -> IngestResult<Ingested>
    where
        D: PlayerDirectory + ?Sized,
    {
        let external_id = record.external_id();
        if games.contains_external_id(&external_id) {
            log::debug!("{external_id}: already stored");
            return Ok(Ingested::DuplicateExternalId);
        }

        let DecodedGame {
            external_id,
            date,
            seats,
            points,
            kind,
            rounds,
            yakuman_count,
        } = record.decode(&self.registry, &self.config)?;

        for (i, seat) in seats.iter().enumerate() {
            if seats[..i].iter().any(|s| same_account(s, seat)) {
                return Err(IngestError::malformed(format!(
                    "{external_id}: {} sits in two seats",
                    seat.display_name()
                )));
            }
        }
        let plans = plan_seats(&seats, players);
        for (i, plan) in plans.iter().enumerate() {
            if plans[..i].iter().any(|p| p.player_id() == plan.player_id()) {
                return Err(IngestError::malformed(format!(
                    "{external_id}: player {} sits in two seats",
                    plan.player_id()
                )));
            }
        }

        let mut snapshots = Vec::with_capacity(4);
        for plan in &plans {
            let snapshot = match plan {
                SeatPlan::Known(id) => players
                    .lookup_by_id(id)
                    .ok_or_else(|| IngestError::UnknownPlayer(id.clone()))?
                    .snapshot(),
                SeatPlan::New(player) => player.snapshot(),
            };
            snapshots.push(snapshot);
        }
        let snapshots: [PlayerSnapshot; 4] = snapshots
            .try_into()
            .map_err(|_| IngestError::malformed("seat count changed while resolving"))?;

        let game = GameData::new(snapshots, points, kind, date)
            .with_rounds(rounds)
            .with_yakuman_count(yakuman_count)
            .with_external_id(external_id);
        let new_players = plans
            .into_iter()
            .filter_map(|plan| match plan {
                SeatPlan::New(player) => Some(player),
                SeatPlan::Known(_) => None,
            })
            .collect();
        let game_id = commit(game, new_players, games, players)?;
        Ok(Ingested::Stored { game_id })
    }
}

/// Creates the new players, applies the game and stores it. Checks the game
/// id first so a collision leaves both stores as they were.
fn commit<D>(
    game: GameData,
    new_players: Vec<PlayerData>,
    games: &mut GameStore,
    players: &mut D,
) -> IngestResult<String>
where
    D: PlayerDirectory + ?Sized,
{
    if games.contains_game_id(&game.game_id) {
        return Err(IngestError::malformed(format!("game id {} already stored", game.game_id)));
    }
    for player in new_players {
        players.create_player(player)?;
    }
    RatingEngine::apply(&game, players)?;
    log::info!("{}", game.summary());

    let game_id = game.game_id.clone();
    games.insert(game)?;
    Ok(game_id)
}

fn same_account(a: &SeatIdentity, b: &SeatIdentity) -> bool {
    match (a, b) {
        (SeatIdentity::External { id: x, .. }, SeatIdentity::External { id: y, .. }) => x == y,
        (SeatIdentity::Local { player_id: x }, SeatIdentity::Local { player_id: y }) => x == y,
        _ => false,
    }
}

/// Looks every seat up without creating anyone.
fn plan_seats<D>(seats: &[SeatIdentity; 4], players: &D) -> [SeatPlan; 4]
where
    D: PlayerDirectory + ?Sized,
{
    seats.each_ref().map(|seat| match seat {
        SeatIdentity::External { id, name } => match players.lookup_by_external_id(id) {
            Some(p) => SeatPlan::Known(p.player_id.clone()),
            None => SeatPlan::New(PlayerData::new(name.clone(), None).with_external_id(id.clone())),
        },
        SeatIdentity::Local { player_id } => match players.lookup_by_id(player_id) {
            Some(p) => SeatPlan::Known(p.player_id.clone()),
            None => SeatPlan::New(PlayerData::new(player_id.clone(), Some(player_id.clone()))),
        },
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::convlog::LogSource;
    use crate::ladder::{ExternalId, PlayerStore};

    fn offline(ids: [&str; 4], date: &str) -> GameRecord {
        let json = serde_json::json!({
            "game_date": date,
            "player_ids": ids,
            "player_points": [45000, 30000, 15000, 10000],
            "game_type": "offline_east",
        });
        GameRecord::parse(LogSource::Offline, &json.to_string()).unwrap()
    }

    fn majsoul(uuid: &str, names: [(u64, &str); 4]) -> GameRecord {
        let playerdata: Vec<_> = names
            .iter()
            .map(|(id, name)| serde_json::json!({"id": id, "name": name}))
            .collect();
        let json = serde_json::json!({
            "gamedata": {
                "uuid": uuid,
                "starttime": 1692450000,
                "playerdata": playerdata,
                "roomdata": {"round": 4},
            },
            "record": [{"action": ["#40000|30000|20000|10000"]}],
        });
        GameRecord::parse(LogSource::Majsoul, &json.to_string()).unwrap()
    }

    #[test]
    fn idempotent() {
        let aggregator = GameAggregator::new(GameKindRegistry::builtin(), ScoringConfig::default());
        let mut games = GameStore::new();
        let mut players = PlayerStore::new();
        let record = offline(["a", "b", "c", "d"], "2023-09-02");

        let Ingested::Stored { game_id } = aggregator.ingest(&record, &mut games, &mut players).unwrap() else {
            panic!("not stored");
        };
        let game = games.get(&game_id).unwrap();
        assert_eq!(game.kind.name, "offline_east");
        // 90 * 8/9 = 80
        assert_eq!(game.pt_delta()[0], 80);
        assert_eq!(players.len(), 4);
        assert_eq!(players.lookup_by_id("a").unwrap().tier_score(), 280);

        let (games_before, players_before) = (games.clone(), players.clone());
        assert_eq!(
            aggregator.ingest(&record, &mut games, &mut players).unwrap(),
            Ingested::DuplicateExternalId
        );
        assert_eq!(games, games_before);
        assert_eq!(players, players_before);
    }

    #[test]
    fn failures_leave_stores_untouched() {
        let aggregator = GameAggregator::new(GameKindRegistry::builtin(), ScoringConfig::default());
        let mut games = GameStore::new();
        let mut players = PlayerStore::new();

        let bad_date = offline(["a", "b", "c", "d"], "someday");
        assert!(matches!(
            aggregator.ingest(&bad_date, &mut games, &mut players),
            Err(IngestError::Malformed(_))
        ));
        let twice = offline(["a", "b", "a", "d"], "2023-09-02");
        assert!(matches!(
            aggregator.ingest(&twice, &mut games, &mut players),
            Err(IngestError::Malformed(_))
        ));
        let unknown = GameAggregator::default();
        assert!(matches!(
            unknown.ingest(&offline(["a", "b", "c", "d"], "2023-09-02"), &mut games, &mut players),
            Err(IngestError::UnknownGameKind(_))
        ));
        assert!(games.is_empty());
        assert!(players.is_empty());
    }

    #[test]
    fn game_id_collision_changes_nothing() {
        let aggregator = GameAggregator::new(GameKindRegistry::builtin(), ScoringConfig::default());
        let mut games = GameStore::new();
        let mut players = PlayerStore::new();
        let Ingested::Stored { game_id } = aggregator
            .ingest(&offline(["a", "b", "c", "d"], "2023-09-02"), &mut games, &mut players)
            .unwrap()
        else {
            panic!("not stored");
        };

        let mut clash = games.get(&game_id).unwrap().clone();
        clash.external_id = Some("another table".to_owned());
        let (games_before, players_before) = (games.clone(), players.clone());
        let newcomer = PlayerData::new("e", Some("e".to_owned()));
        assert!(matches!(
            commit(clash, vec![newcomer], &mut games, &mut players),
            Err(IngestError::Malformed(_))
        ));
        assert_eq!(games, games_before);
        assert_eq!(players, players_before);
        assert_eq!(players.lookup_by_id("a").unwrap().game_count(), 1);
    }

    #[test]
    fn external_players_are_matched() {
        let aggregator = GameAggregator::new(GameKindRegistry::builtin(), ScoringConfig::default());
        let mut games = GameStore::new();
        let mut players = PlayerStore::new();
        let table = [(1, "a"), (2, "b"), (3, "c"), (4, "d")];
        aggregator.ingest(&majsoul("g1", table), &mut games, &mut players).unwrap();
        let a = players.lookup_by_external_id(&ExternalId::Majsoul(1)).unwrap().player_id.clone();

        let table = [(5, "e"), (1, "a renamed"), (3, "c"), (2, "b")];
        aggregator.ingest(&majsoul("g2", table), &mut games, &mut players).unwrap();
        assert_eq!(players.len(), 5);
        assert_eq!(games.len(), 2);
        let a = players.lookup_by_id(&a).unwrap();
        assert_eq!(a.name, "a");
        assert_eq!(a.game_count(), 2);
        assert_eq!(a.order_count(), [1, 1, 0, 0]);
    }
}
