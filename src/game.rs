//! The engine a host drives: owns the state, the clock and the save store.
//!
//! Every mutation the presentation may request is a method here. Each one
//! stamps the wall clock, runs the matching `sim::logic` function, and leaves
//! events queued for [`Brainquest::dispatch`].

use crate::config::SimConfig;
use crate::error::{SaveError, StorageError};
use crate::input::Command;
use crate::sim::catalog::VaccineTier;
use crate::sim::events::{Presenter, SimEvent};
use crate::sim::logic::{self, OfflineReport};
use crate::sim::save::{self, SaveSnapshot};
use crate::sim::state::{
    LogKind, OptionSetting, ResourceStore, SimState, MAX_BRIGHTNESS, MIN_BRIGHTNESS,
};
use crate::storage::{self, SaveStore};
use crate::time::GameTime;

pub struct Brainquest {
    state: SimState,
    store: Box<dyn SaveStore>,
    clock: GameTime,
    last_save_ms: f64,
    /// Resources as of the last dispatch, for `ResourceChanged` diffs.
    last_seen: ResourceStore,
}

impl Brainquest {
    pub fn new(config: SimConfig, store: Box<dyn SaveStore>, now_ms: f64) -> Self {
        let clock = GameTime::new(config.ticks_per_sec, config.max_frame_ms);
        let state = SimState::new(config, now_ms);
        Self {
            last_seen: state.resources.clone(),
            state,
            store,
            clock,
            last_save_ms: now_ms,
        }
    }

    /// Engine on the platform's own store (`localStorage` in the browser,
    /// under `config.storage_key`).
    pub fn with_default_store(config: SimConfig, now_ms: f64) -> Self {
        let store = storage::default_store(&config);
        Self::new(config, store, now_ms)
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Restore the stored save, crediting offline progress. A missing or
    /// unreadable save leaves a fresh game.
    pub fn load(&mut self, now_ms: f64) -> Option<OfflineReport> {
        let text = match self.store.read() {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(StorageError::Unavailable) => {
                log::debug!("storage unavailable, starting fresh");
                return None;
            }
            Err(e) => {
                log::warn!("failed to read save: {e}");
                return None;
            }
        };
        let snapshot = match save::deserialize(&text) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("discarding unreadable save: {e}");
                return None;
            }
        };

        self.rebuild(&snapshot, now_ms);
        let report = snapshot
            .last_tick
            .and_then(|last| logic::apply_offline_progress(&mut self.state, last));
        logic::check_unlocks(&mut self.state);
        log::info!("save loaded (version {})", snapshot.version);
        report
    }

    /// One animation frame: run the due ticks, then autosave if it's time.
    /// Returns the number of ticks simulated.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        self.state.now_ms = now_ms;
        let ticks = self.clock.update(now_ms);
        let dt = self.clock.seconds(1);
        for _ in 0..ticks {
            logic::tick(&mut self.state, dt);
        }
        // Frames paused by the browser (background tab) come back as one long
        // gap; the clock steps `max_frame_ms` of it and the rest lands here.
        let skipped = self
            .clock
            .take_skipped_secs()
            .min(self.state.config.offline_cap_secs);
        if skipped > 0.0 {
            logic::tick(&mut self.state, skipped);
        }
        if now_ms - self.last_save_ms >= self.state.config.autosave_interval_ms {
            self.persist();
        }
        ticks
    }

    pub fn click(&mut self, now_ms: f64) -> Option<f64> {
        self.state.now_ms = now_ms;
        logic::click(&mut self.state)
    }

    pub fn purchase(&mut self, id: &str, now_ms: f64) -> bool {
        self.state.now_ms = now_ms;
        let bought = logic::purchase(&mut self.state, id);
        self.finish_reset_if_requested();
        bought
    }

    pub fn set_option(&mut self, setting: OptionSetting) {
        match setting {
            OptionSetting::OfflineProgress(on) => self.state.options.offline_progress = on,
            OptionSetting::Brightness(value) => {
                self.state.options.brightness = value.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS)
            }
        }
        self.persist();
    }

    pub fn export_save(&self) -> Result<String, SaveError> {
        save::serialize(&self.state)
    }

    /// Replace the game with an exported save. On error nothing changes and
    /// the player gets a `SaveRejected` event.
    pub fn import_save(&mut self, text: &str, now_ms: f64) -> Result<(), SaveError> {
        let snapshot = match save::deserialize(text) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("import rejected: {e}");
                self.state.events.push(SimEvent::SaveRejected(e.to_string()));
                return Err(e);
            }
        };
        self.rebuild(&snapshot, now_ms);
        logic::check_unlocks(&mut self.state);
        self.state.add_log("Save imported.", LogKind::General);
        self.persist();
        Ok(())
    }

    /// Wipe the stored save and start over.
    pub fn hard_reset(&mut self, now_ms: f64) {
        if let Err(e) = self.store.clear() {
            log::warn!("failed to clear save: {e}");
        }
        let pending = self.state.take_events();
        self.state = SimState::new(self.state.config.clone(), now_ms);
        self.state.events = pending;
        self.clock.rebase();
        self.last_save_ms = now_ms;
        self.state.add_log("Game reset.", LogKind::Warning);
        log::info!("hard reset");
    }

    pub fn trigger_reset(&mut self, tier: VaccineTier, now_ms: f64) {
        self.state.now_ms = now_ms;
        logic::trigger_vaccine(&mut self.state, tier);
        self.finish_reset_if_requested();
    }

    pub fn work(&mut self, now_ms: f64) -> bool {
        self.state.now_ms = now_ms;
        logic::work(&mut self.state)
    }

    pub fn steal(&mut self, now_ms: f64) -> bool {
        self.state.now_ms = now_ms;
        logic::steal(&mut self.state)
    }

    pub fn promote(&mut self, job_id: &str, now_ms: f64) -> bool {
        self.state.now_ms = now_ms;
        logic::promote(&mut self.state, job_id)
    }

    /// Run a command. Returns whether it did anything.
    pub fn apply(&mut self, command: Command, now_ms: f64) -> bool {
        match command {
            Command::Click => self.click(now_ms).is_some(),
            Command::Purchase(id) => self.purchase(&id, now_ms),
            Command::SetOption(setting) => {
                self.set_option(setting);
                true
            }
            Command::HardReset => {
                self.hard_reset(now_ms);
                true
            }
            Command::TriggerReset(tier) => {
                self.trigger_reset(tier, now_ms);
                true
            }
            Command::Work => self.work(now_ms),
            Command::Steal => self.steal(now_ms),
            Command::Promote(id) => self.promote(&id, now_ms),
        }
    }

    /// Persist the current state, then rebuild from that snapshot in place.
    /// No offline credit is given.
    pub fn reinitialize(&mut self) {
        let snapshot = save::extract_save(&self.state);
        self.persist();
        let now_ms = self.state.now_ms;
        self.rebuild(&snapshot, now_ms);
        logic::check_unlocks(&mut self.state);
        log::info!("reinitialized after reset");
    }

    /// Final best-effort save, for the host's unload hook.
    pub fn shutdown(&mut self, now_ms: f64) {
        self.state.now_ms = now_ms;
        self.persist();
    }

    /// Hand every queued event to `presenter`, followed by one
    /// `ResourceChanged` per resource that moved since the last dispatch.
    /// Presenter failures are logged and skipped. Returns the number of events.
    pub fn dispatch(&mut self, presenter: &mut dyn Presenter) -> usize {
        let mut events = self.state.take_events();
        events.extend(
            self.state
                .resources
                .changed_since(&self.last_seen)
                .into_iter()
                .map(|(kind, value)| SimEvent::ResourceChanged { kind, value }),
        );
        self.last_seen = self.state.resources.clone();

        for event in &events {
            if let Err(e) = presenter.present(event) {
                log::warn!("{e} (event: {event:?})");
            }
        }
        events.len()
    }

    fn finish_reset_if_requested(&mut self) {
        if self.state.reinit_requested {
            self.reinitialize();
        }
    }

    /// Swap in a fresh state built from `snapshot`, keeping queued events.
    fn rebuild(&mut self, snapshot: &SaveSnapshot, now_ms: f64) {
        let pending = self.state.take_events();
        let mut state = SimState::new(self.state.config.clone(), now_ms);
        save::apply_save(&mut state, snapshot);
        state.events = pending;
        self.state = state;
        self.clock.rebase();
    }

    /// Write the save string. Unavailable storage is a silent no-op.
    fn persist(&mut self) -> bool {
        self.last_save_ms = self.state.now_ms;
        let text = match save::serialize(&self.state) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("{e}");
                return false;
            }
        };
        match self.store.write(&text) {
            Ok(()) => true,
            Err(StorageError::Unavailable) => false,
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }
}
