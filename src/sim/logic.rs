//! Brainquest game logic. Free functions over `&mut SimState`, fully testable.

use super::catalog::{Category, Effect, PurchaseMode, VaccineTier};
use super::events::SimEvent;
use super::jobs::ENTRY_JOB;
use super::state::{
    LogKind, Rates, ResourceKind, SimState, Tab, BASE_BRAIN_SIZE, BASE_CLICK_VALUE,
};

/// Advance the simulation by `dt` seconds.
pub fn tick(state: &mut SimState, dt: f64) {
    if dt <= 0.0 {
        return;
    }
    let caps = state.caps();

    let braindead = state.production.braindead_per_sec(&state.resources) * dt;
    state.resources.add(ResourceKind::Braindead, braindead);

    let ideas = damped_ideas_gain(
        state.production.ideas_per_sec() * dt,
        state.resources.ideas,
        caps.ideas.soft,
        state.config.scaling_multi,
    );
    state.resources.add(ResourceKind::Ideas, ideas);

    state.resources.clamp_to_caps(&caps);
    state.jobs.tick(dt);
    check_unlocks(state);
    state.last_tick_ms = Some(state.now_ms);
}

/// Ideas gain after the soft-cap penalty. Above `soft`, the gain is divided by
/// `scaling ^ (current - soft)`, so it shrinks the further past the cap we are.
pub fn damped_ideas_gain(gain: f64, current: f64, soft: f64, scaling: f64) -> f64 {
    if current > soft {
        gain / scaling.powf(current - soft)
    } else {
        gain
    }
}

/// Braindead granted by one accepted click.
pub fn click_gain(state: &SimState) -> f64 {
    state.click_value * state.resources.immunity_multiplier()
}

/// Manual click. Returns the gain, or None when rate limited.
pub fn click(state: &mut SimState) -> Option<f64> {
    let accepted = state.limiter.try_accept(
        state.now_ms,
        state.config.max_cps,
        state.config.click_window_ms,
    );
    if !accepted {
        return None;
    }
    let gain = click_gain(state);
    state.resources.add(ResourceKind::Braindead, gain);
    state.add_log(
        &format!("+{:.1} {}", gain, ResourceKind::Braindead.unit()),
        LogKind::General,
    );
    Some(gain)
}

/// Try to buy a catalog item. Invalid attempts change nothing.
pub fn purchase(state: &mut SimState, id: &str) -> bool {
    let success = try_purchase(state, id);
    state.events.push(SimEvent::PurchaseResult {
        id: id.to_string(),
        success,
    });
    success
}

fn try_purchase(state: &mut SimState, id: &str) -> bool {
    let idx = match state.catalog.position(id) {
        Some(i) => i,
        None => return false,
    };
    let item = &state.catalog.items[idx];
    if state.resources.get(item.currency) < item.cost {
        return false;
    }
    if let PurchaseMode::OneShot { purchased, prereq } = &item.mode {
        if *purchased {
            return false;
        }
        if let Some(prereq) = prereq {
            if !state.catalog.is_owned(prereq) {
                return false;
            }
        }
    }

    let (currency, cost) = (item.currency, item.cost);
    state.resources.add(currency, -cost);

    let item = &mut state.catalog.items[idx];
    match &mut item.mode {
        PurchaseMode::Repeatable { cost_scale, count } => {
            *count += 1;
            item.cost = (item.cost * *cost_scale).floor();
        }
        PurchaseMode::OneShot { purchased, .. } => *purchased = true,
    }
    let message = format!("{} {}", item.category.verb(), item.name);
    let kind = match item.category {
        Category::Upgrade => LogKind::Upgrade,
        Category::Research | Category::Vaccine => LogKind::Unlock,
    };
    let effects = item.effects.clone();

    state.add_log(&message, kind);
    for effect in &effects {
        apply_effect(state, effect);
    }
    true
}

/// The single interpreter for catalog effects.
pub fn apply_effect(state: &mut SimState, effect: &Effect) {
    match effect {
        Effect::IncreaseClickValue(amount) => state.click_value += amount,
        Effect::IncreaseProduction(kind, amount) => {
            if let Some(rate) = state.production.rates.slot_mut(*kind) {
                *rate += amount;
            }
        }
        Effect::ReduceImmunity(amount) => {
            state.resources.add(ResourceKind::Immunity, -amount);
        }
        Effect::ExpandBrain(amount) => state.brain_size += amount,
        Effect::Log(kind, text) => state.add_log(text, *kind),
        Effect::RevealImmunity => {
            if !state.immunity_revealed {
                state.immunity_revealed = true;
                state.events.push(SimEvent::ImmunityRevealed);
            }
        }
        Effect::TriggerReset(tier) => trigger_vaccine(state, *tier),
    }
}

/// Reveal tabs and catalog items whose conditions now hold. Never hides.
pub fn check_unlocks(state: &mut SimState) {
    if !state.tabs.upgrades && state.resources.braindead >= 10.0 {
        state.tabs.upgrades = true;
        state.events.push(SimEvent::TabUnlocked(Tab::Upgrades));
    }
    if !state.tabs.research && state.resources.ideas > 0.0 {
        state.tabs.research = true;
        state.events.push(SimEvent::TabUnlocked(Tab::Research));
    }

    let newly: Vec<usize> = state
        .catalog
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.visible && item.unlock.holds(&state.resources, &state.catalog))
        .map(|(i, _)| i)
        .collect();

    for idx in newly {
        let item = &mut state.catalog.items[idx];
        item.visible = true;
        let (id, name, category) = (item.id, item.name, item.category);
        state.events.push(SimEvent::ItemUnlocked { id, name, category });
        state.add_log(&format!("{} unlocked!", name), LogKind::Unlock);
    }
}

/// Vaccine reset: wipe the run, lower immunity, raise the permanent multipliers.
/// The caller persists the result and rebuilds from it (`reinit_requested`).
pub fn trigger_vaccine(state: &mut SimState, tier: VaccineTier) {
    let resources = &mut state.resources;
    resources.braindead = 0.0;
    resources.ideas = 0.0;
    resources.currency = 0.0;
    resources.suspicion = 0.0;
    resources.immunity = tier.immunity_floor();

    for item in &mut state.catalog.items {
        match item.category {
            Category::Upgrade => {
                if let PurchaseMode::Repeatable { count, .. } = &mut item.mode {
                    *count = 0;
                }
                item.cost = item.base_cost;
            }
            Category::Research => {
                if let PurchaseMode::OneShot { purchased, .. } = &mut item.mode {
                    *purchased = false;
                }
                item.visible = false;
            }
            Category::Vaccine => {}
        }
    }

    // Everything below only ever came from upgrades.
    state.click_value = BASE_CLICK_VALUE;
    state.brain_size = BASE_BRAIN_SIZE;
    state.production.rates = Rates::ZERO;

    let factor = tier.multiplier();
    state.production.multipliers.braindead *= factor;
    state.production.multipliers.ideas *= factor;

    state.add_log(tier.lore(), LogKind::Lore);
    state.events.push(SimEvent::ResetTriggered(tier));
    state.reinit_requested = true;
}

/// Work a shift. Returns false while on cooldown.
pub fn work(state: &mut SimState) -> bool {
    if !state.jobs.ready() {
        return false;
    }
    let job = state.jobs.current();
    state.resources.add(ResourceKind::Currency, job.salary);
    state.jobs.cooldown = state.config.job_cooldown_secs;

    let roll = (state.next_random() % 10_000) as f64 / 100.0;
    if roll < job.suspicion_rate {
        state.jobs.switch_to(ENTRY_JOB);
        state.resources.suspicion = 0.0;
        state.add_log("You were fired for suspicious behavior!", LogKind::Warning);
    }
    true
}

/// Skim from the till. Returns false while on cooldown.
pub fn steal(state: &mut SimState) -> bool {
    if !state.jobs.ready() {
        return false;
    }
    let job = state.jobs.current();
    state.resources.add(ResourceKind::Suspicion, 1.0);
    state.resources.add(ResourceKind::Currency, job.max_currency * 0.05);
    state.jobs.cooldown = state.config.job_cooldown_secs;
    true
}

pub fn promote(state: &mut SimState, job_id: &str) -> bool {
    if !state.jobs.switch_to(job_id) {
        return false;
    }
    let name = state.jobs.current().name;
    state.add_log(&format!("You are now working as {}.", name), LogKind::General);
    true
}

/// Production credited for time spent away.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OfflineReport {
    pub elapsed_secs: f64,
    /// Elapsed time after the ceiling was applied.
    pub credited_secs: f64,
    pub braindead: f64,
    pub ideas: f64,
}

/// Closed-form offline gains at the current rates, with no soft-cap damping
/// and no tick-by-tick replay.
pub fn offline_gains(state: &SimState, elapsed_secs: f64) -> OfflineReport {
    let credited = elapsed_secs.clamp(0.0, state.config.offline_cap_secs);
    OfflineReport {
        elapsed_secs,
        credited_secs: credited,
        braindead: state.production.braindead_per_sec(&state.resources) * credited,
        ideas: state.production.ideas_per_sec() * credited,
    }
}

/// Credit offline production if the absence was long enough and the option
/// is on. Resources are clamped to caps afterwards.
pub fn apply_offline_progress(state: &mut SimState, last_tick_ms: f64) -> Option<OfflineReport> {
    if !state.options.offline_progress {
        return None;
    }
    let elapsed_secs = (state.now_ms - last_tick_ms) / 1000.0;
    if elapsed_secs <= state.config.offline_min_secs {
        return None;
    }

    let report = offline_gains(state, elapsed_secs);
    state.resources.add(ResourceKind::Braindead, report.braindead);
    state.resources.add(ResourceKind::Ideas, report.ideas);
    let caps = state.caps();
    state.resources.clamp_to_caps(&caps);

    state.add_log(
        &format!(
            "Welcome back! You were away for {}. Gained {} {} and {} {}.",
            format_duration(report.elapsed_secs),
            format_number(report.braindead),
            ResourceKind::Braindead.unit(),
            format_number(report.ideas),
            ResourceKind::Ideas.unit(),
        ),
        LogKind::General,
    );
    log::info!(
        "offline progress: {:.0}s away, {:.0}s credited",
        report.elapsed_secs,
        report.credited_secs
    );
    Some(report)
}

/// `3h 05m`, `12m 30s` or `45s`.
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}h {:02}m", h, m)
    } else if m > 0 {
        format!("{}m {:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}

/// Format a number with comma separators; one decimal below 1000.
pub fn format_number(n: f64) -> String {
    if n.abs() < 1000.0 {
        return format!("{:.1}", n);
    }
    let negative = n < 0.0;
    let digits = (n.abs().floor() as u64).to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}
