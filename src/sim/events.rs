//! Notifications from the simulation to the presentation layer.
//!
//! The simulation only queues events; the host drains them with
//! `Brainquest::dispatch` after each frame or action. A presenter that fails
//! is logged and skipped, so rendering problems never reach the tick loop.

use crate::error::PresentError;

use super::catalog::{Category, VaccineTier};
use super::state::{LogEntry, ResourceKind, Tab};

#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    ResourceChanged {
        kind: ResourceKind,
        value: f64,
    },
    ItemUnlocked {
        id: &'static str,
        name: &'static str,
        category: Category,
    },
    TabUnlocked(Tab),
    PurchaseResult {
        id: String,
        success: bool,
    },
    Log(LogEntry),
    ResetTriggered(VaccineTier),
    ImmunityRevealed,
    /// Import was refused; the message is meant for the player.
    SaveRejected(String),
}

/// Implemented by the UI. Receives every queued event in order.
pub trait Presenter {
    fn present(&mut self, event: &SimEvent) -> Result<(), PresentError>;
}

/// Collects events; handy for hosts that poll instead of reacting.
#[derive(Default)]
pub struct EventBuffer {
    pub events: Vec<SimEvent>,
}

impl Presenter for EventBuffer {
    fn present(&mut self, event: &SimEvent) -> Result<(), PresentError> {
        self.events.push(event.clone());
        Ok(())
    }
}
