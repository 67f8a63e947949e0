//! Brainquest: an idle clicker about raising your braindead count.
//!
//! [`Brainquest`] is the entry point. The host creates one with a
//! [`storage::SaveStore`], calls [`Brainquest::load`] once, then
//! [`Brainquest::frame`] every animation frame, forwards player input as
//! method calls or [`input::Command`]s, and drains events with
//! [`Brainquest::dispatch`].

pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod logging;
pub mod sim;
pub mod storage;
pub mod time;

pub use config::SimConfig;
pub use game::Brainquest;
