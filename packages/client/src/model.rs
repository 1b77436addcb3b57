use serde::Serialize;
use shared::models::game::Game;

/// Everything the views render from.
///
/// `games` is empty while a list reload is pending and `game` is `None` while
/// a single fetch is pending; views treat those as "loading".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Model {
    pub games: Vec<Game>,
    pub game: Option<Game>,
}

impl Model {
    pub fn init() -> Self {
        Self::default()
    }
}
