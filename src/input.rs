//! Player commands and the semantic action IDs hosts register for click targets.
//!
//! A host maps keys and taps to a [`Command`] and hands it to
//! `Brainquest::apply`. Buy actions are `base + display index`, counted over
//! the items the presentation currently shows.

use crate::sim::catalog::{Catalog, Category, VaccineTier};
use crate::sim::state::OptionSetting;

// ── Core actions ────────────────────────────────────────────────
pub const CLICK_BRAIN: u16 = 0;
pub const WORK: u16 = 1;
pub const STEAL: u16 = 2;

// ── Purchases (base + display index) ────────────────────────────
pub const BUY_UPGRADE_BASE: u16 = 200;
pub const BUY_RESEARCH_BASE: u16 = 300;
pub const BUY_VACCINE_BASE: u16 = 400;

// ── Jobs (base + index into JOBS) ───────────────────────────────
pub const PROMOTE_BASE: u16 = 500;

// ── Options ─────────────────────────────────────────────────────
pub const OFFLINE_ON: u16 = 600;
pub const OFFLINE_OFF: u16 = 601;

/// Everything a player can ask the simulation to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Click,
    Purchase(String),
    SetOption(OptionSetting),
    HardReset,
    TriggerReset(VaccineTier),
    Work,
    Steal,
    Promote(String),
}

impl Command {
    /// Resolve an action ID against what is currently shown.
    pub fn from_action(action_id: u16, catalog: &Catalog) -> Option<Command> {
        let buy = |category: Category, base: u16| {
            let idx = (action_id - base) as usize;
            catalog
                .visible(category)
                .nth(idx)
                .map(|item| Command::Purchase(item.id.to_string()))
        };

        match action_id {
            CLICK_BRAIN => Some(Command::Click),
            WORK => Some(Command::Work),
            STEAL => Some(Command::Steal),
            OFFLINE_ON => Some(Command::SetOption(OptionSetting::OfflineProgress(true))),
            OFFLINE_OFF => Some(Command::SetOption(OptionSetting::OfflineProgress(false))),
            id if (BUY_UPGRADE_BASE..BUY_RESEARCH_BASE).contains(&id) => {
                buy(Category::Upgrade, BUY_UPGRADE_BASE)
            }
            id if (BUY_RESEARCH_BASE..BUY_VACCINE_BASE).contains(&id) => {
                buy(Category::Research, BUY_RESEARCH_BASE)
            }
            id if (BUY_VACCINE_BASE..PROMOTE_BASE).contains(&id) => {
                buy(Category::Vaccine, BUY_VACCINE_BASE)
            }
            id if (PROMOTE_BASE..OFFLINE_ON).contains(&id) => {
                crate::sim::jobs::JOBS
                    .get((id - PROMOTE_BASE) as usize)
                    .map(|job| Command::Promote(job.id.to_string()))
            }
            _ => None,
        }
    }

    /// Keyboard shortcuts for the always-available actions.
    pub fn from_key(key: char) -> Option<Command> {
        match key {
            'c' | ' ' => Some(Command::Click),
            'w' => Some(Command::Work),
            's' => Some(Command::Steal),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::initial_catalog;

    #[test]
    fn core_actions() {
        let catalog = initial_catalog();
        assert_eq!(Command::from_action(CLICK_BRAIN, &catalog), Some(Command::Click));
        assert_eq!(Command::from_action(STEAL, &catalog), Some(Command::Steal));
        assert_eq!(Command::from_action(9_999, &catalog), None);
    }

    #[test]
    fn buy_index_counts_visible_items_only() {
        let mut catalog = initial_catalog();
        assert_eq!(Command::from_action(BUY_UPGRADE_BASE, &catalog), None);

        catalog.get_mut("autoclicker").unwrap().visible = true;
        catalog.get_mut("ideaAmplifier").unwrap().visible = true;
        assert_eq!(
            Command::from_action(BUY_UPGRADE_BASE + 1, &catalog),
            Some(Command::Purchase("ideaAmplifier".into()))
        );

        catalog.get_mut("think").unwrap().visible = true;
        assert_eq!(
            Command::from_action(BUY_RESEARCH_BASE, &catalog),
            Some(Command::Purchase("think".into()))
        );
    }

    #[test]
    fn promote_by_job_index() {
        let catalog = initial_catalog();
        assert_eq!(
            Command::from_action(PROMOTE_BASE + 2, &catalog),
            Some(Command::Promote("manager".into()))
        );
        assert_eq!(Command::from_action(PROMOTE_BASE + 3, &catalog), None);
    }

    #[test]
    fn keys() {
        assert_eq!(Command::from_key('c'), Some(Command::Click));
        assert_eq!(Command::from_key('x'), None);
    }
}
