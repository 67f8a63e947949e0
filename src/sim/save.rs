//! Brainquest セーブ/ロード機能。
//!
//! セーブ文字列は `SaveSnapshot` の JSON を標準 base64 で包んだもの。
//! 読み込み時は base64 を先に試し、デコード結果が JSON に見えなければ
//! 入力そのものを生の JSON として扱う（旧形式との互換）。
//!
//! ## バージョニング方針
//!
//! - `SAVE_VERSION`: 現在のセーブ形式バージョン。フィールド追加時にインクリメントする。
//! - `MIN_COMPATIBLE_VERSION`: 互換性を維持できる最小バージョン。
//!   既存フィールドの意味変更や削除など破壊的変更を行った場合のみインクリメントする。
//!
//! 不足フィールドはデフォルト値で補完し、未知のアイテム ID は無視する。

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::SaveError;

use super::catalog::{Category, PurchaseMode};
use super::jobs::ENTRY_JOB;
use super::state::{
    LogEntry, Options, Rates, ResourceKind, ResourceStore, SimState, TabUnlocks, BASE_BRAIN_SIZE,
    BASE_CLICK_VALUE, MAX_BRIGHTNESS, MIN_BRIGHTNESS,
};

/// セーブデータのフォーマットバージョン。
pub const SAVE_VERSION: u32 = 1;

/// これ未満のバージョンは読み込みを拒否する。
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

/// 読み込むアップグレード購入回数の上限。超えた分は切り捨てる。
pub const MAX_UPGRADE_COUNT: u32 = 10_000;

/// 永続化されるゲーム状態。イベントキューやクリック制限などの一時状態は含まない。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveSnapshot {
    pub version: u32,
    pub resources: ResourceStore,
    /// アップグレード由来の毎秒生産量。
    pub production: Rates,
    /// ワクチンリセットで積み上がる倍率。
    pub production_multipliers: Rates,
    pub click_value: ClickValueSave,
    pub brain_size: f64,
    pub upgrades: Vec<UpgradeSave>,
    pub research: Vec<OneShotSave>,
    pub vaccines: Vec<OneShotSave>,
    pub tab_unlocks: TabUnlocks,
    pub immunity_revealed: bool,
    pub job: JobSave,
    pub options: Options,
    /// 最終 tick の時刻 (epoch ms)。オフライン進行の計算に使う。
    pub last_tick: Option<f64>,
    pub log_history: Vec<LogEntry>,
}

impl Default for SaveSnapshot {
    /// バージョン欄の無い旧セーブは現行バージョンとして扱う。
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            resources: ResourceStore::default(),
            production: Rates::ZERO,
            production_multipliers: Rates::ONE,
            click_value: ClickValueSave::default(),
            brain_size: BASE_BRAIN_SIZE,
            upgrades: Vec::new(),
            research: Vec::new(),
            vaccines: Vec::new(),
            tab_unlocks: TabUnlocks::default(),
            immunity_revealed: false,
            job: JobSave::default(),
            options: Options::default(),
            last_tick: None,
            log_history: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickValueSave {
    pub braindead: f64,
}

impl Default for ClickValueSave {
    fn default() -> Self {
        Self {
            braindead: BASE_CLICK_VALUE,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeSave {
    pub id: String,
    pub count: u32,
    /// 次回購入価格。0 以下なら購入回数から再計算する。
    pub cost: f64,
    pub visible: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneShotSave {
    pub id: String,
    pub purchased: bool,
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSave {
    pub current: String,
    pub cooldown: f64,
}

impl Default for JobSave {
    fn default() -> Self {
        Self {
            current: ENTRY_JOB.to_string(),
            cooldown: 0.0,
        }
    }
}

/// SimState からセーブ用データを抽出する。
pub fn extract_save(state: &SimState) -> SaveSnapshot {
    let one_shots = |category: Category| -> Vec<OneShotSave> {
        state
            .catalog
            .in_category(category)
            .map(|item| OneShotSave {
                id: item.id.to_string(),
                purchased: item.is_purchased(),
                visible: item.visible,
            })
            .collect()
    };

    SaveSnapshot {
        version: SAVE_VERSION,
        resources: state.resources.clone(),
        production: state.production.rates,
        production_multipliers: state.production.multipliers,
        click_value: ClickValueSave {
            braindead: state.click_value,
        },
        brain_size: state.brain_size,
        upgrades: state
            .catalog
            .in_category(Category::Upgrade)
            .map(|item| UpgradeSave {
                id: item.id.to_string(),
                count: item.count(),
                cost: item.cost,
                visible: item.visible,
            })
            .collect(),
        research: one_shots(Category::Research),
        vaccines: one_shots(Category::Vaccine),
        tab_unlocks: state.tabs,
        immunity_revealed: state.immunity_revealed,
        job: JobSave {
            current: state.jobs.current().id.to_string(),
            cooldown: state.jobs.cooldown,
        },
        options: state.options.clone(),
        last_tick: state.last_tick_ms,
        log_history: state.log.entries().to_vec(),
    }
}

/// セーブデータを SimState に反映する。
/// 新規作成した state に適用する前提で、セーブに無い項目は初期値のまま残る。
pub fn apply_save(state: &mut SimState, save: &SaveSnapshot) {
    // set() を通して NaN や負値を下限に丸める
    for kind in ResourceKind::all() {
        state.resources.set(*kind, save.resources.get(*kind));
    }

    state.production.rates = Rates {
        braindead: non_negative(save.production.braindead),
        ideas: non_negative(save.production.ideas),
    };
    state.production.multipliers = Rates {
        braindead: positive_or(save.production_multipliers.braindead, 1.0),
        ideas: positive_or(save.production_multipliers.ideas, 1.0),
    };
    state.click_value = positive_or(save.click_value.braindead, BASE_CLICK_VALUE);
    state.brain_size = positive_or(save.brain_size, BASE_BRAIN_SIZE);

    for saved in &save.upgrades {
        let item = match state.catalog.get_mut(&saved.id) {
            Some(item) if item.category == Category::Upgrade => item,
            _ => continue,
        };
        if let PurchaseMode::Repeatable { cost_scale, count } = &mut item.mode {
            if saved.count > MAX_UPGRADE_COUNT {
                log::warn!(
                    "upgrade {} count {} in save, capping at {}",
                    saved.id,
                    saved.count,
                    MAX_UPGRADE_COUNT
                );
            }
            *count = saved.count.min(MAX_UPGRADE_COUNT);
            item.cost = if saved.cost.is_finite() && saved.cost > 0.0 {
                saved.cost
            } else {
                scaled_cost(item.base_cost, *cost_scale, *count)
            };
        }
        item.visible = saved.visible;
    }

    for saved in save.research.iter().chain(&save.vaccines) {
        let item = match state.catalog.get_mut(&saved.id) {
            Some(item) => item,
            None => continue,
        };
        if let PurchaseMode::OneShot { purchased, .. } = &mut item.mode {
            *purchased = saved.purchased;
            item.visible = saved.visible;
        }
    }

    state.tabs = save.tab_unlocks;
    state.immunity_revealed = save.immunity_revealed;

    if !state.jobs.switch_to(&save.job.current) {
        log::warn!("unknown job {:?} in save, keeping {}", save.job.current, ENTRY_JOB);
    }
    state.jobs.cooldown = non_negative(save.job.cooldown);

    state.options = Options {
        offline_progress: save.options.offline_progress,
        brightness: save.options.brightness.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS),
    };
    state.last_tick_ms = save.last_tick.filter(|t| t.is_finite());
    state.log.replace(save.log_history.clone());
}

/// 購入回数から価格を再計算する。購入ごとの floor も再現する。
/// f64 で表せなくなった時点で打ち切り、`f64::MAX` を返す（JSON に inf は書けない）。
fn scaled_cost(base: f64, scale: f64, count: u32) -> f64 {
    let mut cost = base;
    for _ in 0..count {
        let next = (cost * scale).floor();
        if !next.is_finite() {
            return f64::MAX;
        }
        cost = next;
    }
    cost
}

fn non_negative(x: f64) -> f64 {
    if x.is_finite() {
        x.max(0.0)
    } else {
        0.0
    }
}

fn positive_or(x: f64, fallback: f64) -> f64 {
    if x.is_finite() && x > 0.0 {
        x
    } else {
        fallback
    }
}

/// 状態をセーブ文字列（base64 で包んだ JSON）にする。
pub fn serialize(state: &SimState) -> Result<String, SaveError> {
    let json = serde_json::to_string(&extract_save(state))
        .map_err(|e| SaveError::Encode(e.to_string()))?;
    Ok(STANDARD.encode(json))
}

/// セーブ文字列を読み込む。base64 が先、だめなら生の JSON。
/// 失敗しても呼び出し側の状態には一切触れない。
pub fn deserialize(text: &str) -> Result<SaveSnapshot, SaveError> {
    let trimmed = text.trim();
    let json = match STANDARD.decode(trimmed) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(decoded) if looks_like_json(&decoded) => decoded,
            _ => trimmed.to_string(),
        },
        Err(_) => trimmed.to_string(),
    };
    if !looks_like_json(&json) {
        return Err(SaveError::Decode);
    }

    let snapshot: SaveSnapshot = serde_json::from_str(&json)?;
    if snapshot.version < MIN_COMPATIBLE_VERSION {
        return Err(SaveError::IncompatibleVersion {
            found: snapshot.version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }
    if snapshot.version < SAVE_VERSION {
        log::info!(
            "migrating save data (saved={}, current={})",
            snapshot.version,
            SAVE_VERSION
        );
    }
    Ok(snapshot)
}

fn looks_like_json(text: &str) -> bool {
    matches!(text.trim_start().chars().next(), Some('{') | Some('['))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::logic;
    use crate::sim::state::LogKind;

    fn fresh() -> SimState {
        SimState::new(SimConfig::default(), 1_000.0)
    }

    fn played_state() -> SimState {
        let mut state = fresh();
        state.resources.braindead = 5_000.0;
        state.resources.ideas = 400.0;
        for id in ["enhancedClick", "enhancedClick", "autoclicker", "brainStretch"] {
            assert!(logic::purchase(&mut state, id));
        }
        for id in ["think", "thinkMore", "immunityResearch"] {
            assert!(logic::purchase(&mut state, id));
        }
        state.catalog.get_mut("enhancedClick").unwrap().visible = true;
        state.catalog.get_mut("thinkMore").unwrap().visible = true;
        state.production.multipliers.braindead = 1.5;
        state.tabs.upgrades = true;
        state.jobs.switch_to("analyst");
        state.jobs.cooldown = 2.5;
        state.resources.currency = 123.25;
        state.resources.suspicion = 2.0;
        state.options.brightness = 140;
        state.last_tick_ms = Some(1_700_000_000_123.0);
        state
    }

    #[test]
    fn extract_and_apply_roundtrip() {
        let original = played_state();
        let text = serialize(&original).unwrap();
        let snapshot = deserialize(&text).unwrap();

        let mut restored = fresh();
        apply_save(&mut restored, &snapshot);

        assert_eq!(extract_save(&restored), extract_save(&original));
        assert_eq!(restored.resources, original.resources);
        assert_eq!(restored.click_value, 2.0);
        assert_eq!(restored.catalog.get("enhancedClick").unwrap().count(), 2);
        assert_eq!(restored.catalog.get("enhancedClick").unwrap().cost, 55.0);
        assert!(restored.catalog.is_owned("immunityResearch"));
        assert!(!restored.catalog.is_owned("vaccineV1"));
        assert!(restored.immunity_revealed);
        assert_eq!(restored.jobs.current().id, "analyst");
        assert_eq!(restored.log.entries(), original.log.entries());
    }

    #[test]
    fn save_text_is_base64_json() {
        let text = serialize(&fresh()).unwrap();
        let decoded = String::from_utf8(STANDARD.decode(&text).unwrap()).unwrap();
        assert!(decoded.starts_with('{'));
        let value: serde_json::Value = serde_json::from_str(&decoded).unwrap();
        assert_eq!(value["version"], SAVE_VERSION);
        assert!(value["productionMultipliers"].is_object());
        assert!(value["clickValue"]["braindead"].is_number());
        assert!(value["logHistory"].is_array());
    }

    #[test]
    fn raw_json_fallback_is_accepted() {
        let legacy = r#"{
            "resources": { "braindead": 42.0, "ideas": 3.0, "immunity": 90.0 },
            "upgrades": [{ "id": "enhancedClick", "count": 1, "cost": 37, "visible": true }],
            "logHistory": [{ "message": "hello", "type": "lore", "timestamp": 5 }]
        }"#;
        let snapshot = deserialize(legacy).unwrap();
        assert_eq!(snapshot.version, SAVE_VERSION);

        let mut state = fresh();
        apply_save(&mut state, &snapshot);
        assert_eq!(state.resources.braindead, 42.0);
        assert_eq!(state.resources.immunity, 90.0);
        assert_eq!(state.resources.currency, 0.0);
        assert_eq!(state.catalog.get("enhancedClick").unwrap().cost, 37.0);
        // 旧セーブに無いフィールドはデフォルト値
        assert_eq!(state.production.multipliers, Rates::ONE);
        assert_eq!(state.click_value, BASE_CLICK_VALUE);
        assert!(state.options.offline_progress);
        assert_eq!(state.log.entries()[0].kind, LogKind::Lore);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(deserialize("not a save"), Err(SaveError::Decode)));
        assert!(matches!(deserialize(""), Err(SaveError::Decode)));
        // valid base64, but not JSON inside
        assert!(matches!(deserialize("aGVsbG8="), Err(SaveError::Decode)));
        assert!(matches!(deserialize("{ broken"), Err(SaveError::Parse(_))));
        let wrapped = STANDARD.encode("{\"resources\": 5}");
        assert!(matches!(deserialize(&wrapped), Err(SaveError::Parse(_))));
    }

    #[test]
    fn version_below_min_compatible_is_rejected() {
        let err = deserialize(r#"{ "version": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            SaveError::IncompatibleVersion {
                found: 0,
                min: MIN_COMPATIBLE_VERSION
            }
        ));
    }

    #[test]
    fn unknown_fields_and_ids_are_ignored() {
        let json = r#"{
            "version": 1,
            "futureFeature": { "x": 1 },
            "upgrades": [{ "id": "quantumToaster", "count": 9, "cost": 1 }],
            "research": [{ "id": "think", "purchased": true, "visible": true },
                         { "id": "timeTravel", "purchased": true }],
            "job": { "current": "astronaut", "cooldown": 1.0 }
        }"#;
        let snapshot = deserialize(json).unwrap();
        let mut state = fresh();
        apply_save(&mut state, &snapshot);
        assert!(state.catalog.is_owned("think"));
        assert_eq!(state.catalog.items.len(), fresh().catalog.items.len());
        assert_eq!(state.jobs.current().id, ENTRY_JOB);
        assert_eq!(state.jobs.cooldown, 1.0);
    }

    #[test]
    fn missing_cost_is_rebuilt_from_count() {
        let json = r#"{ "upgrades": [{ "id": "enhancedClick", "count": 3 }] }"#;
        let mut state = fresh();
        apply_save(&mut state, &deserialize(json).unwrap());
        assert_eq!(state.catalog.get("enhancedClick").unwrap().cost, 82.0);
    }

    #[test]
    fn absurd_upgrade_count_is_capped_and_stays_saveable() {
        let json = r#"{ "upgrades": [{ "id": "enhancedClick", "count": 4000000000 },
                                     { "id": "autoclicker", "count": 2, "cost": -3 }] }"#;
        let mut state = fresh();
        apply_save(&mut state, &deserialize(json).unwrap());
        let item = state.catalog.get("enhancedClick").unwrap();
        assert_eq!(item.count(), MAX_UPGRADE_COUNT);
        assert_eq!(item.cost, f64::MAX);
        // 負の価格は購入回数から再計算
        assert_eq!(state.catalog.get("autoclicker").unwrap().cost, 1_000.0);
        assert!(!logic::purchase(&mut state, "enhancedClick"));

        // export -> import で壊れない（inf は null になってしまう）
        let text = serialize(&state).unwrap();
        let mut restored = fresh();
        apply_save(&mut restored, &deserialize(&text).unwrap());
        assert_eq!(extract_save(&restored).upgrades, extract_save(&state).upgrades);
    }

    #[test]
    fn hostile_values_are_sanitized() {
        let json = r#"{
            "resources": { "braindead": -5, "immunity": 0 },
            "productionMultipliers": { "braindead": 0 },
            "brainSize": -1,
            "options": { "brightness": 9999 }
        }"#;
        let mut state = fresh();
        apply_save(&mut state, &deserialize(json).unwrap());
        assert_eq!(state.resources.braindead, 0.0);
        assert_eq!(state.resources.immunity, 1.0);
        assert_eq!(state.production.multipliers.braindead, 1.0);
        assert_eq!(state.production.multipliers.ideas, 1.0);
        assert_eq!(state.brain_size, BASE_BRAIN_SIZE);
        assert_eq!(state.options.brightness, MAX_BRIGHTNESS);
    }

    #[test]
    fn empty_state_roundtrip() {
        let state = fresh();
        let snapshot = deserialize(&serialize(&state).unwrap()).unwrap();
        let mut restored = fresh();
        apply_save(&mut restored, &snapshot);
        assert_eq!(extract_save(&restored), extract_save(&state));
        assert_eq!(restored.last_tick_ms, None);
    }
}
