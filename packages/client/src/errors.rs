use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    LoadGames { status: u16 },
    LoadGame { game_id: String, status: u16 },
    SaveGame { game_id: String, status: u16 },
    MissingBody,
    Transport(String),
    Decode(String),
    InvalidUrl(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::LoadGames { status } => write!(f, "Failed to load games: {}", status),
            CommandError::LoadGame { status, .. } => write!(f, "Failed to load game: {}", status),
            CommandError::SaveGame { game_id, .. } => {
                write!(f, "Failed to save game for {}", game_id)
            }
            CommandError::MissingBody => write!(f, "No JSON in response from server"),
            CommandError::Transport(msg) => write!(f, "Request failed: {}", msg),
            CommandError::Decode(msg) => write!(f, "Malformed response: {}", msg),
            CommandError::InvalidUrl(url) => write!(f, "Invalid base URL: {}", url),
        }
    }
}

impl std::error::Error for CommandError {}

/// Returned by a dispatcher whose store has shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreClosed;

impl fmt::Display for StoreClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Store is no longer running")
    }
}

impl std::error::Error for StoreClosed {}
