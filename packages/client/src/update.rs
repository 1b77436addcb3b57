use crate::commands::Command;
use crate::messages::Msg;
use crate::model::Model;

/// Computes the next model for `msg`, plus the command to run, if any.
///
/// Pure: all I/O happens later, when the store runs the returned command.
/// Loads replace state wholesale and are not matched against the request
/// that caused them, so a slow response can overwrite a newer one.
pub fn update(model: Model, msg: Msg) -> (Model, Option<Command>) {
    match msg {
        Msg::GamesRequest => (
            Model {
                games: Vec::new(),
                ..model
            },
            Some(Command::FetchGames),
        ),
        Msg::GamesLoad { games } => (Model { games, ..model }, None),
        Msg::GameRequest { game_id } => (
            Model {
                game: None,
                ..model
            },
            Some(Command::FetchGame { game_id }),
        ),
        Msg::GameLoad { game } => (
            Model {
                game: Some(game),
                ..model
            },
            None,
        ),
        Msg::GameSave {
            game_id,
            game,
            callbacks,
        } => (
            model,
            Some(Command::SaveGame {
                game_id,
                game,
                callbacks,
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::SaveCallbacks;
    use shared::models::game::Game;

    fn halo() -> Game {
        Game::new("Halo Infinite", "Master Chief returns", "halo-infinite")
    }

    fn zelda() -> Game {
        Game::new("Breath of the Wild", "Open-air Hyrule", "botw")
    }

    fn populated() -> Model {
        Model {
            games: vec![halo(), zelda()],
            game: Some(halo()),
        }
    }

    #[test]
    fn test_games_request_clears_list() {
        let (model, command) = update(populated(), Msg::GamesRequest);

        assert!(model.games.is_empty());
        assert_eq!(model.game, Some(halo()));
        assert!(matches!(command, Some(Command::FetchGames)));
    }

    #[test]
    fn test_games_load_replaces_list() {
        let (model, command) = update(populated(), Msg::GamesLoad { games: vec![zelda()] });

        assert_eq!(model.games, vec![zelda()]);
        assert!(command.is_none());
    }

    #[test]
    fn test_last_applied_games_load_wins() {
        let loads = vec![vec![halo()], vec![], vec![zelda(), halo()], vec![zelda()]];

        let mut model = Model::init();
        for games in loads.clone() {
            let (next, _) = update(model, Msg::GamesLoad { games });
            model = next;
        }

        assert_eq!(model.games, loads[loads.len() - 1]);
    }

    #[test]
    fn test_game_request_clears_detail() {
        let (model, command) = update(
            populated(),
            Msg::GameRequest {
                game_id: "Breath of the Wild".to_string(),
            },
        );

        assert!(model.game.is_none());
        assert_eq!(model.games, vec![halo(), zelda()]);
        match command {
            Some(Command::FetchGame { game_id }) => assert_eq!(game_id, "Breath of the Wild"),
            other => panic!("expected FetchGame, got {:?}", other),
        }
    }

    #[test]
    fn test_game_load_does_not_check_requested_id() {
        let (model, _) = update(
            Model::init(),
            Msg::GameRequest {
                game_id: "Halo Infinite".to_string(),
            },
        );
        let (model, command) = update(model, Msg::GameLoad { game: zelda() });

        assert_eq!(model.game, Some(zelda()));
        assert!(command.is_none());
    }

    #[test]
    fn test_game_save_leaves_state_alone() {
        let (model, command) = update(
            populated(),
            Msg::GameSave {
                game_id: "Halo Infinite".to_string(),
                game: Game {
                    description: "edited".to_string(),
                    ..halo()
                },
                callbacks: SaveCallbacks::new(),
            },
        );

        assert_eq!(model, populated());
        match command {
            Some(Command::SaveGame { game_id, game, .. }) => {
                assert_eq!(game_id, "Halo Infinite");
                assert_eq!(game.description, "edited");
            }
            other => panic!("expected SaveGame, got {:?}", other),
        }
    }
}
