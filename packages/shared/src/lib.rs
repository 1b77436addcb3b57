pub mod models;
pub mod repositories;
pub mod services;

pub use models::game::Game;
pub use models::user::User;
