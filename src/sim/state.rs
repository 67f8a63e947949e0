//! Brainquest simulation state definitions.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

use super::catalog::{self, Catalog};
use super::events::SimEvent;
use super::jobs::JobBoard;

pub const STARTING_IMMUNITY: f64 = 100.0;
/// Immunity acts as a divisor; it never drops below this.
pub const IMMUNITY_FLOOR: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Braindead,
    Ideas,
    Immunity,
    Currency,
    Suspicion,
}

impl ResourceKind {
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Braindead,
            ResourceKind::Ideas,
            ResourceKind::Immunity,
            ResourceKind::Currency,
            ResourceKind::Suspicion,
        ]
    }

    /// Short unit label used in log lines.
    pub fn unit(&self) -> &'static str {
        match self {
            ResourceKind::Braindead => "Bd",
            ResourceKind::Ideas => "Id",
            ResourceKind::Immunity => "Im",
            ResourceKind::Currency => "$",
            ResourceKind::Suspicion => "Sus",
        }
    }

    fn floor(&self) -> f64 {
        match self {
            ResourceKind::Immunity => IMMUNITY_FLOOR,
            _ => 0.0,
        }
    }
}

/// Resource quantities. Every mutation clamps at the resource's floor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceStore {
    pub braindead: f64,
    pub ideas: f64,
    pub immunity: f64,
    pub currency: f64,
    pub suspicion: f64,
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self {
            braindead: 0.0,
            ideas: 0.0,
            immunity: STARTING_IMMUNITY,
            currency: 0.0,
            suspicion: 0.0,
        }
    }
}

impl ResourceStore {
    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Braindead => self.braindead,
            ResourceKind::Ideas => self.ideas,
            ResourceKind::Immunity => self.immunity,
            ResourceKind::Currency => self.currency,
            ResourceKind::Suspicion => self.suspicion,
        }
    }

    fn slot(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Braindead => &mut self.braindead,
            ResourceKind::Ideas => &mut self.ideas,
            ResourceKind::Immunity => &mut self.immunity,
            ResourceKind::Currency => &mut self.currency,
            ResourceKind::Suspicion => &mut self.suspicion,
        }
    }

    pub fn set(&mut self, kind: ResourceKind, value: f64) {
        let value = if value.is_nan() { kind.floor() } else { value };
        *self.slot(kind) = value.max(kind.floor());
    }

    /// Add `amount` (negative for spends). Never drops below the floor.
    pub fn add(&mut self, kind: ResourceKind, amount: f64) {
        let next = self.get(kind) + amount;
        self.set(kind, next);
    }

    /// `100 / immunity`: the boost applied to clicks and braindead production.
    pub fn immunity_multiplier(&self) -> f64 {
        100.0 / self.immunity.max(IMMUNITY_FLOOR)
    }

    /// Pull every capped resource down to its hard ceiling.
    pub fn clamp_to_caps(&mut self, caps: &Caps) {
        if self.braindead > caps.braindead {
            self.braindead = caps.braindead;
        }
        if self.ideas > caps.ideas.hard {
            self.ideas = caps.ideas.hard;
        }
        if let Some(ceiling) = caps.currency {
            if self.currency > ceiling {
                self.currency = ceiling;
            }
        }
    }

    /// Kinds whose value differs from `before`, with their new value.
    pub fn changed_since(&self, before: &ResourceStore) -> Vec<(ResourceKind, f64)> {
        ResourceKind::all()
            .iter()
            .filter(|k| self.get(**k) != before.get(**k))
            .map(|k| (*k, self.get(*k)))
            .collect()
    }
}

/// A per-resource pair for the two produced resources.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rates {
    pub braindead: f64,
    pub ideas: f64,
}

impl Rates {
    pub const ZERO: Rates = Rates {
        braindead: 0.0,
        ideas: 0.0,
    };
    pub const ONE: Rates = Rates {
        braindead: 1.0,
        ideas: 1.0,
    };

    /// Mutable slot for a produced resource; other kinds have none.
    pub fn slot_mut(&mut self, kind: ResourceKind) -> Option<&mut f64> {
        match kind {
            ResourceKind::Braindead => Some(&mut self.braindead),
            ResourceKind::Ideas => Some(&mut self.ideas),
            _ => None,
        }
    }
}

impl Default for Rates {
    fn default() -> Self {
        Rates::ZERO
    }
}

/// Flat production plus the prestige multipliers stacked on top of it.
#[derive(Clone, Debug, PartialEq)]
pub struct Production {
    /// Units per second from upgrades.
    pub rates: Rates,
    /// Permanent multipliers from vaccine resets.
    pub multipliers: Rates,
}

impl Default for Production {
    fn default() -> Self {
        Self {
            rates: Rates::ZERO,
            multipliers: Rates::ONE,
        }
    }
}

impl Production {
    /// Braindead per second after the multiplier and immunity boost.
    pub fn braindead_per_sec(&self, resources: &ResourceStore) -> f64 {
        self.rates.braindead * self.multipliers.braindead * resources.immunity_multiplier()
    }

    /// Ideas per second before soft-cap damping. Not immunity-scaled.
    pub fn ideas_per_sec(&self) -> f64 {
        self.rates.ideas * self.multipliers.ideas
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoftHardCap {
    pub soft: f64,
    pub hard: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Caps {
    pub braindead: f64,
    pub ideas: SoftHardCap,
    /// Ceiling from the current job, if any.
    pub currency: Option<f64>,
}

impl Caps {
    pub fn compute(
        config: &SimConfig,
        immunity: f64,
        brain_size: f64,
        currency: Option<f64>,
    ) -> Self {
        let immunity = immunity.max(IMMUNITY_FLOOR);
        Self {
            braindead: config.base_braindead_cap * brain_size,
            ideas: SoftHardCap {
                soft: config.ideas_soft_base * brain_size / immunity,
                hard: config.ideas_hard_base * brain_size / immunity,
            },
            currency,
        }
    }
}

/// Fixed-window click limiter.
#[derive(Clone, Debug, PartialEq)]
pub struct ClickLimiter {
    pub count: u32,
    pub window_start_ms: f64,
}

impl ClickLimiter {
    pub fn new(now_ms: f64) -> Self {
        Self {
            count: 0,
            window_start_ms: now_ms,
        }
    }

    /// Record a click attempt. Returns false when the window is full.
    pub fn try_accept(&mut self, now_ms: f64, max_per_window: u32, window_ms: f64) -> bool {
        if now_ms - self.window_start_ms >= window_ms {
            self.count = 0;
            self.window_start_ms = now_ms;
        }
        if self.count >= max_per_window {
            return false;
        }
        self.count += 1;
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    General,
    Upgrade,
    Unlock,
    Lore,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    #[serde(rename = "type", default = "default_log_kind")]
    pub kind: LogKind,
    /// Epoch milliseconds.
    #[serde(default)]
    pub timestamp: f64,
}

fn default_log_kind() -> LogKind {
    LogKind::General
}

/// Log views offered by the terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFilter {
    All,
    /// General and upgrade entries.
    Resources,
    /// Lore and unlock entries.
    Lore,
}

impl LogFilter {
    pub fn matches(&self, kind: LogKind) -> bool {
        match self {
            LogFilter::All => true,
            LogFilter::Resources => matches!(kind, LogKind::General | LogKind::Upgrade),
            LogFilter::Lore => matches!(kind, LogKind::Lore | LogKind::Unlock),
        }
    }
}

/// Bounded message history, oldest first.
#[derive(Clone, Debug, PartialEq)]
pub struct GameLog {
    entries: Vec<LogEntry>,
    capacity: usize,
}

impl GameLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn filtered(&self, filter: LogFilter) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| filter.matches(e.kind))
    }

    pub fn replace(&mut self, entries: Vec<LogEntry>) {
        self.entries.clear();
        for entry in entries {
            self.push(entry);
        }
    }
}

/// Terminal tabs that open up as the player progresses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabUnlocks {
    pub upgrades: bool,
    pub research: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Upgrades,
    Research,
}

pub const MIN_BRIGHTNESS: u32 = 10;
pub const MAX_BRIGHTNESS: u32 = 200;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    pub offline_progress: bool,
    pub brightness: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            offline_progress: true,
            brightness: 100,
        }
    }
}

/// A single option change requested by the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OptionSetting {
    OfflineProgress(bool),
    Brightness(u32),
}

/// Base stats every run starts from; upgrades add on top.
pub const BASE_CLICK_VALUE: f64 = 1.0;
pub const BASE_BRAIN_SIZE: f64 = 1.0;

/// Full state of a Brainquest run.
pub struct SimState {
    pub config: SimConfig,
    pub resources: ResourceStore,
    pub production: Production,
    /// Braindead per accepted click, before the immunity boost.
    pub click_value: f64,
    /// Scales every cap.
    pub brain_size: f64,
    pub catalog: Catalog,
    pub jobs: JobBoard,
    pub tabs: TabUnlocks,
    /// Set once research reveals the immunity stat.
    pub immunity_revealed: bool,
    pub limiter: ClickLimiter,
    pub options: Options,
    pub log: GameLog,
    /// Pending notifications for the presentation layer.
    pub events: Vec<SimEvent>,
    /// Wall clock of the operation in progress (epoch ms).
    pub now_ms: f64,
    /// Wall clock of the last completed tick, persisted for offline progress.
    pub last_tick_ms: Option<f64>,
    /// Set by a vaccine reset; the engine persists and rebuilds, then clears it.
    pub reinit_requested: bool,
    pub rng_state: u32,
}

impl SimState {
    pub fn new(config: SimConfig, now_ms: f64) -> Self {
        let log = GameLog::new(config.log_capacity);
        Self {
            resources: ResourceStore::default(),
            production: Production::default(),
            click_value: BASE_CLICK_VALUE,
            brain_size: BASE_BRAIN_SIZE,
            catalog: catalog::initial_catalog(),
            jobs: JobBoard::new(),
            tabs: TabUnlocks::default(),
            immunity_revealed: false,
            limiter: ClickLimiter::new(now_ms),
            options: Options::default(),
            log,
            events: Vec::new(),
            now_ms,
            last_tick_ms: None,
            reinit_requested: false,
            rng_state: seed_from_clock(now_ms),
            config,
        }
    }

    pub fn caps(&self) -> Caps {
        Caps::compute(
            &self.config,
            self.resources.immunity,
            self.brain_size,
            Some(self.jobs.current().max_currency),
        )
    }

    /// Append a log entry stamped with the current operation time.
    pub fn add_log(&mut self, message: &str, kind: LogKind) {
        let entry = LogEntry {
            message: message.to_string(),
            kind,
            timestamp: self.now_ms,
        };
        self.events.push(SimEvent::Log(entry.clone()));
        self.log.push(entry);
    }

    /// xorshift32. Deterministic so tests can pin outcomes via `rng_state`.
    pub fn next_random(&mut self) -> u32 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng_state = x;
        x
    }

    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

fn seed_from_clock(now_ms: f64) -> u32 {
    // xorshift must never start at zero
    (now_ms as u64 as u32) | 1
}
