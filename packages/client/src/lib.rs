//! Client-side state for the games editor.
//!
//! Views send [`messages::Msg`] values to a [`store::Store`]. The store runs the
//! pure [`update::update`] reducer, publishes the new [`model::Model`], and
//! spawns whatever [`commands::Command`] the reducer asked for. A finished
//! command comes back as another message.

pub mod commands;
pub mod errors;
pub mod messages;
pub mod model;
pub mod store;
pub mod update;
