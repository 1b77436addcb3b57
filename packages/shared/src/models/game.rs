use serde::{Deserialize, Deserializer, Serialize};

/// A catalog entry. `title` doubles as the record key in routes.
///
/// Absent fields decode as empty so validation can name them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Game {
    pub fn new(title: &str, description: &str, href: &str) -> Self {
        Game {
            title: title.to_string(),
            description: description.to_string(),
            href: href.to_string(),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, image_url: &str) -> Self {
        self.image_url = Some(image_url.to_string());
        self
    }

    /// Trims every field and drops a blank image URL.
    pub fn normalized(self) -> Self {
        let image_url = self
            .image_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        Game {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            href: self.href.trim().to_string(),
            image_url,
        }
    }

    /// Names of required fields that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_empty() {
            missing.push("title");
        }
        if self.description.is_empty() {
            missing.push("description");
        }
        if self.href.is_empty() {
            missing.push("href");
        }
        missing
    }
}

/// The two shapes a game list arrives in: a bare array, or an object
/// wrapping it under `games`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum GameFeed {
    Bare(Vec<Game>),
    Envelope {
        #[serde(default, deserialize_with = "null_as_empty")]
        games: Vec<Game>,
    },
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Game>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Game>>::deserialize(deserializer)?.unwrap_or_default())
}

impl GameFeed {
    pub fn into_games(self) -> Vec<Game> {
        match self {
            GameFeed::Bare(games) => games,
            GameFeed::Envelope { games } => games,
        }
    }
}

impl From<GameFeed> for Vec<Game> {
    fn from(feed: GameFeed) -> Self {
        feed.into_games()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url_uses_camel_case() {
        let game = Game::new("Halo Infinite", "Master Chief returns", "halo-infinite")
            .with_image_url("https://example.com/halo.jpg");

        let json = serde_json::to_value(&game).unwrap();
        assert_eq!(json["imageUrl"], "https://example.com/halo.jpg");
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_missing_image_url_is_omitted() {
        let game = Game::new("Celeste", "Climb the mountain", "celeste");
        let json = serde_json::to_string(&game).unwrap();
        assert!(!json.contains("imageUrl"));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let game: Game = serde_json::from_str(
            r#"{"_id":"65f0","title":"Hades","description":"Escape","href":"hades","__v":0}"#,
        )
        .unwrap();
        assert_eq!(game, Game::new("Hades", "Escape", "hades"));
    }

    #[test]
    fn test_normalized_trims_and_drops_blank_image() {
        let game = Game {
            title: "  Tetris ".to_string(),
            description: "\tBlocks\n".to_string(),
            href: " tetris ".to_string(),
            image_url: Some("   ".to_string()),
        }
        .normalized();

        assert_eq!(game, Game::new("Tetris", "Blocks", "tetris"));
    }

    #[test]
    fn test_absent_keys_decode_as_empty() {
        let game: Game = serde_json::from_str(r#"{"title":"Portal"}"#).unwrap();
        assert_eq!(game.missing_fields(), vec!["description", "href"]);
    }

    #[test]
    fn test_missing_fields() {
        let game = Game::new("", "desc", "").normalized();
        assert_eq!(game.missing_fields(), vec!["title", "href"]);
        assert!(Game::new("a", "b", "c").missing_fields().is_empty());
    }

    #[test]
    fn test_feed_accepts_envelope() {
        let feed: GameFeed = serde_json::from_str(
            r#"{"games":[{"title":"A","description":"first","href":"a"}]}"#,
        )
        .unwrap();
        assert_eq!(feed.into_games(), vec![Game::new("A", "first", "a")]);
    }

    #[test]
    fn test_feed_accepts_bare_array() {
        let feed: GameFeed =
            serde_json::from_str(r#"[{"title":"B","description":"second","href":"b"}]"#).unwrap();
        assert_eq!(feed.into_games(), vec![Game::new("B", "second", "b")]);
    }

    #[test]
    fn test_feed_envelope_without_games_is_empty() {
        let feed: GameFeed = serde_json::from_str(r#"{"count":0}"#).unwrap();
        assert!(feed.into_games().is_empty());

        let feed: GameFeed = serde_json::from_str(r#"{"games":null}"#).unwrap();
        assert!(feed.into_games().is_empty());
    }
}
