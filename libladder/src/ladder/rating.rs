use super::player::PlayerData;
use super::store::{GameStore, PlayerDirectory};
use crate::error::{IngestError, IngestResult};
use crate::game::GameData;

/// Folds game deltas into player standings.
pub struct RatingEngine;

impl RatingEngine {
    /// Adds the game's deltas to its four players and appends it to their
    /// histories. Nothing changes unless all four players are known.
    pub fn apply<D>(game: &GameData, players: &mut D) -> IngestResult<()>
    where
        D: PlayerDirectory + ?Sized,
    {
        if let Some(missing) = game
            .players
            .iter()
            .find(|p| players.lookup_by_id(&p.player_id).is_none())
        {
            return Err(IngestError::UnknownPlayer(missing.player_id.clone()));
        }
        let preview = game.preview();
        for snapshot in &game.players {
            if let Some(player) = players.lookup_by_id_mut(&snapshot.player_id) {
                player.add_game(preview.clone());
            }
        }
        players.refresh();
        Ok(())
    }

    /// Rebuilds every player from scratch by replaying all games by date.
    /// Each game's snapshots and deltas are recomputed from the standings
    /// the replay has reached.
    pub fn recompute_all<D>(games: &mut GameStore, players: &mut D) -> IngestResult<()>
    where
        D: PlayerDirectory + ?Sized,
    {
        players.for_each_mut(&mut PlayerData::reset);
        let ret = games.rewrite_chronologically(|game| {
            for snapshot in &mut game.players {
                let player = players
                    .lookup_by_id(&snapshot.player_id)
                    .ok_or_else(|| IngestError::UnknownPlayer(snapshot.player_id.clone()))?;
                *snapshot = player.snapshot();
            }
            game.update();
            Self::apply(game, players)
        });
        players.refresh();
        ret
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::GameKind;
    use crate::ladder::PlayerStore;
    use chrono::NaiveDateTime;

    fn store() -> PlayerStore {
        let mut store = PlayerStore::new();
        for id in ["a", "b", "c", "d"] {
            store.create_player(PlayerData::new(id.to_uppercase(), Some(id.to_owned()))).unwrap();
        }
        store
    }

    fn game(players: &PlayerStore, points: [i32; 4], date: &str) -> GameData {
        let snapshots = ["a", "b", "c", "d"].map(|id| players.lookup_by_id(id).unwrap().snapshot());
        let date: NaiveDateTime = date.parse().unwrap();
        GameData::new(snapshots, points, GameKind::new("test", 1.), date)
    }

    #[test]
    fn apply_updates_players() {
        let mut players = store();
        let g = game(&players, [40000, 30000, 20000, 10000], "2023-09-01T00:00:00");
        RatingEngine::apply(&g, &mut players).unwrap();

        let a = players.lookup_by_id("a").unwrap();
        assert_eq!((a.tier_score(), a.rating(), a.game_count()), (290, 1530., 1));
        assert_eq!(a.order_count(), [1, 0, 0, 0]);
        assert_eq!(a.history().len(), 1);
        let d = players.lookup_by_id("d").unwrap();
        assert_eq!((d.tier_score(), d.rating()), (155, 1470.));
        assert_eq!(d.order_count(), [0, 0, 0, 1]);
        assert_eq!(players.leaderboard()[0].player_id, "a");

        let mut stranger = g.clone();
        stranger.players[2].player_id = "zz".to_owned();
        let before = players.clone();
        assert!(matches!(
            RatingEngine::apply(&stranger, &mut players),
            Err(IngestError::UnknownPlayer(id)) if id == "zz"
        ));
        assert_eq!(players, before);
    }

    #[test]
    fn promotion_through_games() {
        let mut players = store();
        for day in 1..=3 {
            let g = game(&players, [40000, 30000, 20000, 10000], &format!("2023-09-0{day}T00:00:00"));
            RatingEngine::apply(&g, &mut players).unwrap();
        }
        // 200 + 90 + 90 reaches 380; the third win promotes
        let a = players.lookup_by_id("a").unwrap();
        assert_eq!((a.tier(), a.tier_score(), a.highest_tier()), (1, 400, 1));
        assert_eq!(a.game_count(), 3);
    }

    #[test]
    fn recompute_matches_incremental() {
        let mut players = store();
        let mut games = GameStore::new();
        for (day, points) in [
            (3, [10000, 20000, 30000, 40000]),
            (1, [40000, 30000, 20000, 10000]),
            (2, [25000, 25000, 45000, 5000]),
        ] {
            let g = game(&players, points, &format!("2023-09-0{day}T00:00:00"));
            RatingEngine::apply(&g, &mut players).unwrap();
            games.insert(g).unwrap();
        }
        let incremental = players.clone();

        // games were applied out of date order, so the rebuild differs
        RatingEngine::recompute_all(&mut games, &mut players).unwrap();
        let rebuilt = players.clone();
        assert_eq!(rebuilt.players().len(), 4);
        for p in rebuilt.players() {
            assert_eq!(p.game_count(), 3);
            let dates: Vec<_> = p.history().iter().map(|g| g.date).collect();
            assert!(dates.is_sorted());
        }
        assert_ne!(rebuilt, incremental);

        // a second rebuild is a fixed point
        RatingEngine::recompute_all(&mut games, &mut players).unwrap();
        assert_eq!(players, rebuilt);
    }
}
