//! Brainquest simulation: state, catalog data, rules and save format.

pub mod catalog;
pub mod events;
pub mod jobs;
pub mod logic;
pub mod save;
pub mod state;
