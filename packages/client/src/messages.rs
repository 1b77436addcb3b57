use std::fmt;

use shared::models::game::Game;

use crate::errors::CommandError;

pub type OnSuccess = Box<dyn FnOnce() + Send>;
pub type OnFailure = Box<dyn FnOnce(&CommandError) + Send>;

/// Hooks a view attaches to a save so it can navigate away or report the error.
#[derive(Default)]
pub struct SaveCallbacks {
    pub on_success: Option<OnSuccess>,
    pub on_failure: Option<OnFailure>,
}

impl SaveCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_failure<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&CommandError) + Send + 'static,
    {
        self.on_failure = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for SaveCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveCallbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

#[derive(Debug)]
pub enum Msg {
    GamesRequest,
    GamesLoad {
        games: Vec<Game>,
    },
    GameRequest {
        game_id: String,
    },
    GameLoad {
        game: Game,
    },
    GameSave {
        game_id: String,
        game: Game,
        callbacks: SaveCallbacks,
    },
}

impl Msg {
    /// Wire name of the message kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Msg::GamesRequest => "games/request",
            Msg::GamesLoad { .. } => "games/load",
            Msg::GameRequest { .. } => "game/request",
            Msg::GameLoad { .. } => "game/load",
            Msg::GameSave { .. } => "game/save",
        }
    }
}
