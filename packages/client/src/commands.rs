use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use shared::models::game::{Game, GameFeed};

use crate::errors::CommandError;
use crate::messages::{Msg, SaveCallbacks};

#[cfg(test)]
use mockall::automock;

/// The remote game store, as the commands see it.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GameApi: Send + Sync {
    async fn fetch_games(&self) -> Result<Vec<Game>, CommandError>;
    async fn fetch_game(&self, game_id: &str) -> Result<Game, CommandError>;
    /// Returns the server's representation of the saved game.
    async fn save_game(&self, game_id: &str, game: &Game) -> Result<Game, CommandError>;
}

/// A side effect requested by the reducer.
#[derive(Debug)]
pub enum Command {
    FetchGames,
    FetchGame {
        game_id: String,
    },
    SaveGame {
        game_id: String,
        game: Game,
        callbacks: SaveCallbacks,
    },
}

impl Command {
    pub fn tag(&self) -> &'static str {
        match self {
            Command::FetchGames => "fetch-games",
            Command::FetchGame { .. } => "fetch-game",
            Command::SaveGame { .. } => "save-game",
        }
    }

    /// Performs the call and turns its outcome into the follow-up message.
    ///
    /// A save fires exactly one of its callbacks before returning.
    pub async fn run(self, api: &dyn GameApi) -> Result<Msg, CommandError> {
        match self {
            Command::FetchGames => api.fetch_games().await.map(|games| Msg::GamesLoad { games }),
            Command::FetchGame { game_id } => api
                .fetch_game(&game_id)
                .await
                .map(|game| Msg::GameLoad { game }),
            Command::SaveGame {
                game_id,
                game,
                callbacks,
            } => {
                let SaveCallbacks {
                    on_success,
                    on_failure,
                } = callbacks;
                match api.save_game(&game_id, &game).await {
                    Ok(saved) => {
                        if let Some(on_success) = on_success {
                            on_success();
                        }
                        Ok(Msg::GameLoad { game: saved })
                    }
                    Err(err) => {
                        if let Some(on_failure) = on_failure {
                            on_failure(&err);
                        }
                        Err(err)
                    }
                }
            }
        }
    }
}

/// [`GameApi`] over the `/api/games` REST endpoints.
#[derive(Clone)]
pub struct HttpGameApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpGameApi {
    pub fn new(base_url: &str) -> Result<Self, CommandError> {
        let base_url =
            Url::parse(base_url).map_err(|_| CommandError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(CommandError::InvalidUrl(base_url.to_string()));
        }
        Ok(HttpGameApi {
            client: Client::new(),
            base_url,
            token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// `<base>/api/games`, or `<base>/api/games/<game_id>` with the id
    /// percent-encoded as a single path segment.
    pub fn endpoint(&self, game_id: Option<&str>) -> Result<Url, CommandError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| CommandError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().extend(["api", "games"]);
            if let Some(game_id) = game_id {
                segments.push(game_id);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, CommandError> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| CommandError::Transport(e.to_string()))
    }
}

#[async_trait]
impl GameApi for HttpGameApi {
    async fn fetch_games(&self) -> Result<Vec<Game>, CommandError> {
        let url = self.endpoint(None)?;
        debug!("GET {}", url);
        let response = self.send(self.client.get(url)).await?;
        if response.status() != StatusCode::OK {
            return Err(CommandError::LoadGames {
                status: response.status().as_u16(),
            });
        }
        let feed: GameFeed = read_json(response).await?;
        Ok(feed.into_games())
    }

    async fn fetch_game(&self, game_id: &str) -> Result<Game, CommandError> {
        let url = self.endpoint(Some(game_id))?;
        debug!("GET {}", url);
        let response = self.send(self.client.get(url)).await?;
        if response.status() != StatusCode::OK {
            return Err(CommandError::LoadGame {
                game_id: game_id.to_string(),
                status: response.status().as_u16(),
            });
        }
        read_json(response).await
    }

    async fn save_game(&self, game_id: &str, game: &Game) -> Result<Game, CommandError> {
        let url = self.endpoint(Some(game_id))?;
        debug!("PUT {}", url);
        let response = self.send(self.client.put(url).json(game)).await?;
        if response.status() != StatusCode::OK {
            return Err(CommandError::SaveGame {
                game_id: game_id.to_string(),
                status: response.status().as_u16(),
            });
        }
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, CommandError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| CommandError::Transport(e.to_string()))?;
    decode_body(&body)
}

/// Decodes a JSON response body. An empty body or a literal `null` counts as
/// no body at all.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, CommandError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(CommandError::MissingBody);
    }
    serde_json::from_slice::<Option<T>>(body)
        .map_err(|e| CommandError::Decode(e.to_string()))?
        .ok_or(CommandError::MissingBody)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn halo() -> Game {
        Game::new("Halo Infinite", "Master Chief returns", "halo-infinite")
    }

    #[test]
    fn test_decode_envelope_and_bare_array_alike() {
        let envelope: GameFeed =
            decode_body(br#"{"games":[{"title":"A","description":"first","href":"a"}]}"#)
                .unwrap();
        let bare: GameFeed =
            decode_body(br#"[{"title":"B","description":"second","href":"b"}]"#).unwrap();

        assert_eq!(envelope.into_games(), vec![Game::new("A", "first", "a")]);
        assert_eq!(bare.into_games(), vec![Game::new("B", "second", "b")]);
    }

    #[test]
    fn test_decode_envelope_with_null_games() {
        let feed: GameFeed = decode_body(br#"{"games":null}"#).unwrap();
        assert!(feed.into_games().is_empty());
    }

    #[test]
    fn test_decode_missing_body() {
        assert_eq!(
            decode_body::<Game>(b"").unwrap_err(),
            CommandError::MissingBody
        );
        assert_eq!(
            decode_body::<Game>(b"  \n").unwrap_err(),
            CommandError::MissingBody
        );
        assert_eq!(
            decode_body::<GameFeed>(b"null").unwrap_err(),
            CommandError::MissingBody
        );
    }

    #[test]
    fn test_decode_malformed_body() {
        let result = decode_body::<Game>(b"<html>");
        assert!(matches!(result, Err(CommandError::Decode(_))));
    }

    #[test]
    fn test_endpoint_encodes_game_id() {
        let api = HttpGameApi::new("http://localhost:3000").unwrap();

        assert_eq!(
            api.endpoint(None).unwrap().as_str(),
            "http://localhost:3000/api/games"
        );
        assert_eq!(
            api.endpoint(Some("Halo Infinite")).unwrap().as_str(),
            "http://localhost:3000/api/games/Halo%20Infinite"
        );
        assert_eq!(
            api.endpoint(Some("AC/DC Rocks")).unwrap().as_str(),
            "http://localhost:3000/api/games/AC%2FDC%20Rocks"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = HttpGameApi::new("https://hub.example.com/gaming/").unwrap();

        assert_eq!(
            api.endpoint(None).unwrap().as_str(),
            "https://hub.example.com/gaming/api/games"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpGameApi::new("not a url"),
            Err(CommandError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpGameApi::new("mailto:someone@example.com"),
            Err(CommandError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_games_becomes_games_load() {
        let mut api = MockGameApi::new();
        api.expect_fetch_games()
            .times(1)
            .returning(|| Ok(vec![halo()]));

        let msg = Command::FetchGames.run(&api).await.unwrap();

        match msg {
            Msg::GamesLoad { games } => assert_eq!(games, vec![halo()]),
            other => panic!("expected games/load, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_game_failure_is_returned() {
        let mut api = MockGameApi::new();
        api.expect_fetch_game()
            .withf(|game_id| game_id == "Halo Infinite")
            .returning(|game_id| {
                Err(CommandError::LoadGame {
                    game_id: game_id.to_string(),
                    status: 404,
                })
            });

        let result = Command::FetchGame {
            game_id: "Halo Infinite".to_string(),
        }
        .run(&api)
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Failed to load game: 404");
    }

    #[tokio::test]
    async fn test_save_success_calls_on_success_once() {
        let server_copy = Game {
            description: "Trimmed by the server".to_string(),
            ..halo()
        };
        let returned = server_copy.clone();
        let mut api = MockGameApi::new();
        api.expect_save_game()
            .times(1)
            .returning(move |_, _| Ok(returned.clone()));

        let successes = Arc::new(AtomicUsize::new(0));
        let failures = Arc::new(AtomicUsize::new(0));
        let callbacks = {
            let successes = successes.clone();
            let failures = failures.clone();
            SaveCallbacks::new()
                .on_success(move || {
                    successes.fetch_add(1, Ordering::SeqCst);
                })
                .on_failure(move |_| {
                    failures.fetch_add(1, Ordering::SeqCst);
                })
        };

        let msg = Command::SaveGame {
            game_id: "Halo Infinite".to_string(),
            game: halo(),
            callbacks,
        }
        .run(&api)
        .await
        .unwrap();

        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(failures.load(Ordering::SeqCst), 0);
        match msg {
            Msg::GameLoad { game } => assert_eq!(game, server_copy),
            other => panic!("expected game/load, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_failure_calls_on_failure_with_error() {
        let mut api = MockGameApi::new();
        api.expect_save_game().returning(|game_id, _| {
            Err(CommandError::SaveGame {
                game_id: game_id.to_string(),
                status: 500,
            })
        });

        let seen = Arc::new(Mutex::new(Vec::new()));
        let callbacks = {
            let seen = seen.clone();
            SaveCallbacks::new()
                .on_success(|| panic!("save should not succeed"))
                .on_failure(move |err| seen.lock().unwrap().push(err.clone()))
        };

        let err = Command::SaveGame {
            game_id: "Halo Infinite".to_string(),
            game: halo(),
            callbacks,
        }
        .run(&api)
        .await
        .unwrap_err();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[err.clone()]);
        assert_eq!(err.to_string(), "Failed to save game for Halo Infinite");
    }

    #[tokio::test]
    async fn test_save_without_callbacks() {
        let mut api = MockGameApi::new();
        api.expect_save_game().returning(|_, game| Ok(game.clone()));

        let msg = Command::SaveGame {
            game_id: "Halo Infinite".to_string(),
            game: halo(),
            callbacks: SaveCallbacks::new(),
        }
        .run(&api)
        .await
        .unwrap();

        assert_eq!(msg.tag(), "game/load");
    }
}
