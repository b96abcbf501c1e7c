pub mod ai;
pub mod config;
pub mod game;
pub mod store;
pub mod utils;
pub mod wardrobe;

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    choose_opponent_direction, choose_opponent_stake, choose_opponent_symbol, OpponentProfile,
    OpponentStrategy, RandomSource, Roster, ScriptedSource, SeededSource, StakeOption,
};
pub use config::{ConfigError, GameConfig};
pub use game::{
    opposite_direction, play_direction_phase, play_symbol_phase, resolve_direction_phase,
    resolve_direction_round, resolve_symbol_round, Direction, DirectionPhase, GameEvent,
    MatchEngine, MatchPhase, MatchResult, MatchState, Outcome, RuleError, Settlement, Side, Stake,
    Symbol, SymbolPhase, SymbolPhaseOutcome,
};
pub use store::{InventoryStore, KeyValueStore, MemoryStore, StoreError};
pub use wardrobe::{
    Catalog, CatalogError, CatalogItem, Inventory, InventoryLedger, ItemId, LedgerError, Rarity,
    Slot, StakeOffer,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
    utils::init_logging(log::LevelFilter::Info);
}

fn to_js_error<E: Serialize + Display>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(serde_to_js_error)
}

fn parse_tag<T: FromStr>(value: &str, kind: &str) -> Result<T, JsValue> {
    T::from_str(value).map_err(|_| JsValue::from_str(&format!("unknown {kind} `{value}`")))
}

/// 选定对手后交给前端的开局信息。
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchOpening<'a> {
    opponent: &'a OpponentProfile,
    opponent_stake: &'a Stake,
    offers: Vec<StakeOffer>,
}

#[derive(Debug)]
struct ActiveMatch {
    state: MatchState,
    strategy: OpponentStrategy,
    opponent_stake: Stake,
}

#[wasm_bindgen]
pub struct DuelSession {
    ledger: InventoryLedger,
    roster: Roster,
    config: GameConfig,
    engine: MatchEngine,
    store: Option<Box<dyn InventoryStore>>,
    active: Option<ActiveMatch>,
}

impl DuelSession {
    pub fn from_parts(
        catalog: Catalog,
        saved: Option<Inventory>,
        roster: Roster,
        config: GameConfig,
    ) -> Result<Self, CatalogError> {
        let ledger = InventoryLedger::new(Arc::new(catalog), saved, &config)?;
        Ok(Self {
            ledger,
            roster,
            config,
            engine: MatchEngine::from_entropy(),
            store: None,
            active: None,
        })
    }

    /// 从存档读取设置与衣橱。损坏的存档记录警告后按新玩家处理。
    pub fn with_store(
        catalog: Catalog,
        roster: Roster,
        store: Box<dyn InventoryStore>,
    ) -> Result<Self, CatalogError> {
        let config = store
            .load_settings()
            .unwrap_or_else(|error| {
                log::warn!("ignoring saved settings: {error}");
                None
            })
            .unwrap_or_default();
        let saved = store.load_inventory().unwrap_or_else(|error| {
            log::warn!("ignoring saved inventory: {error}");
            None
        });
        let mut session = Self::from_parts(catalog, saved, roster, config)?;
        session.store = Some(store);
        Ok(session)
    }

    pub fn with_engine(mut self, engine: MatchEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    pub fn store(&self) -> Option<&dyn InventoryStore> {
        self.store.as_deref()
    }

    /// 当前对局押上的服装在结算前不能穿上。
    pub fn equip_item(&mut self, slot: Slot, id: &str) -> Result<(), LedgerError> {
        if let Some(active) = &self.active {
            active.state.ensure_not_staked(slot, id)?;
        }
        self.ledger.equip(slot, id)?;
        self.persist();
        Ok(())
    }

    fn persist(&mut self) {
        if let Some(store) = self.store.as_mut() {
            if let Err(error) = store.save_inventory(&self.ledger.snapshot()) {
                log::warn!("failed to save inventory: {error}");
            }
        }
    }
}

#[wasm_bindgen]
impl DuelSession {
    /// 未提供的参数使用内置示例数据。
    #[wasm_bindgen(constructor)]
    pub fn new(
        catalog_json: Option<String>,
        inventory_json: Option<String>,
        roster_json: Option<String>,
        config_json: Option<String>,
    ) -> Result<DuelSession, JsValue> {
        let catalog = match catalog_json {
            Some(json) => Catalog::from_json(&json).map_err(to_js_error)?,
            None => Catalog::sample(),
        };
        let saved = inventory_json
            .map(|json| Inventory::from_json(&json))
            .transpose()
            .map_err(to_js_error)?;
        let roster = match roster_json {
            Some(json) => Roster::from_json(&json).map_err(to_js_error)?,
            None => Roster::new(vec![OpponentProfile::sample()]),
        };
        let config = match config_json {
            Some(json) => GameConfig::from_json(&json).map_err(to_js_error)?,
            None => GameConfig::default(),
        };
        Self::from_parts(catalog, saved, roster, config).map_err(to_js_error)
    }

    pub fn coins(&self) -> u32 {
        self.ledger.coins()
    }

    pub fn inventory_json(&self) -> Result<String, JsValue> {
        to_json(&self.ledger.snapshot())
    }

    pub fn equipped_json(&self) -> Result<String, JsValue> {
        to_json(&self.ledger.equipped_outfit())
    }

    pub fn config_json(&self) -> Result<String, JsValue> {
        to_json(&self.config)
    }

    pub fn roster_json(&self) -> Result<String, JsValue> {
        to_json(&self.roster)
    }

    /// 找不到物品时返回 `null`。
    pub fn item_details(&self, slot: &str, id: &str) -> Result<JsValue, JsValue> {
        let slot: Slot = parse_tag(slot, "slot")?;
        to_value(&self.ledger.item_details(slot, id)).map_err(JsValue::from)
    }

    pub fn equip(&mut self, slot: &str, id: &str) -> Result<(), JsValue> {
        let slot: Slot = parse_tag(slot, "slot")?;
        self.equip_item(slot, id).map_err(to_js_error)
    }

    pub fn stake_offers_json(&self) -> Result<String, JsValue> {
        to_json(&self.ledger.stake_offers(self.config.coin_stake))
    }

    /// 选定对手（找不到则使用第一个），由对手先决定赌注。
    pub fn begin_match(&mut self, opponent_id: &str) -> Result<String, JsValue> {
        let profile = self
            .roster
            .get_or_first(opponent_id)
            .ok_or_else(|| JsValue::from_str("roster is empty"))?;
        let opponent_stake = self
            .engine
            .choose_opponent_stake(profile, &self.config)
            .ok_or_else(|| JsValue::from_str("opponent has nothing to stake"))?;

        let opening = MatchOpening {
            opponent: profile,
            opponent_stake: &opponent_stake,
            offers: self.ledger.stake_offers(self.config.coin_stake),
        };
        let json = to_json(&opening)?;

        self.active = Some(ActiveMatch {
            state: MatchState::against(profile.id.clone()),
            strategy: profile.strategy,
            opponent_stake,
        });
        Ok(json)
    }

    pub fn place_stake(&mut self, stake_json: &str) -> Result<String, JsValue> {
        let stake: Stake = serde_json::from_str(stake_json).map_err(serde_to_js_error)?;
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| JsValue::from_str("no match in progress"))?;
        self.engine
            .place_stakes(
                &mut active.state,
                &self.ledger,
                stake,
                active.opponent_stake.clone(),
            )
            .map_err(to_js_error)?;
        to_json(&active.state)
    }

    pub fn play_symbol(&mut self, symbol: &str) -> Result<String, JsValue> {
        let symbol: Symbol = parse_tag(symbol, "symbol")?;
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| JsValue::from_str("no match in progress"))?;
        let phase = self
            .engine
            .play_symbol(&mut active.state, symbol, active.strategy)
            .map_err(to_js_error)?;
        to_json(&phase)
    }

    pub fn play_direction(&mut self, direction: &str) -> Result<String, JsValue> {
        let direction: Direction = parse_tag(direction, "direction")?;
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| JsValue::from_str("no match in progress"))?;
        let phase = self
            .engine
            .play_direction(&mut active.state, direction)
            .map_err(to_js_error)?;
        to_json(&phase)
    }

    pub fn settle(&mut self) -> Result<String, JsValue> {
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| JsValue::from_str("no match in progress"))?;
        let settlement = self
            .engine
            .settle(&mut active.state, &mut self.ledger)
            .map_err(to_js_error)?;
        if settlement.mutates_ledger() {
            self.persist();
        }
        to_json(&settlement)
    }

    /// 放弃当前对局，不做任何结算。
    pub fn abandon(&mut self) {
        if let Some(active) = self.active.take() {
            log::info!("match abandoned in phase {}", active.state.phase);
        }
    }

    pub fn match_json(&self) -> Result<Option<String>, JsValue> {
        self.active
            .as_ref()
            .map(|active| to_json(&active.state))
            .transpose()
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl DuelSession {
    /// 使用浏览器 `localStorage` 存档的会话。
    #[wasm_bindgen(js_name = "withLocalStorage")]
    pub fn with_local_storage(
        catalog_json: Option<String>,
        roster_json: Option<String>,
    ) -> Result<DuelSession, JsValue> {
        let catalog = match catalog_json {
            Some(json) => Catalog::from_json(&json).map_err(to_js_error)?,
            None => Catalog::sample(),
        };
        let roster = match roster_json {
            Some(json) => Roster::from_json(&json).map_err(to_js_error)?,
            None => Roster::new(vec![OpponentProfile::sample()]),
        };
        let store = store::BrowserStore::open().map_err(to_js_error)?;
        Self::with_store(catalog, roster, Box::new(store)).map_err(to_js_error)
    }
}

#[wasm_bindgen(js_name = "resolveSymbolRound")]
pub fn resolve_symbol_round_js(player: &str, opponent: &str) -> Result<JsValue, JsValue> {
    let player: Symbol = parse_tag(player, "symbol")?;
    let opponent: Symbol = parse_tag(opponent, "symbol")?;
    to_value(&resolve_symbol_round(player, opponent)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "oppositeDirection")]
pub fn opposite_direction_js(direction: &str) -> Result<String, JsValue> {
    let direction: Direction = parse_tag(direction, "direction")?;
    Ok(opposite_direction(direction).to_string())
}

#[wasm_bindgen(js_name = "resolveDirectionRound")]
pub fn resolve_direction_round_js(
    first: &str,
    second: &str,
    leader: JsValue,
) -> Result<JsValue, JsValue> {
    let first: Direction = parse_tag(first, "direction")?;
    let second: Direction = parse_tag(second, "direction")?;
    let leader: Side = serde_wasm_bindgen::from_value(leader).map_err(JsValue::from)?;
    to_value(&resolve_direction_round(first, second, leader)).map_err(JsValue::from)
}

/// 按对手性格随机出拳，未知性格按完全随机处理。
#[wasm_bindgen(js_name = "chooseOpponentSymbol")]
pub fn choose_opponent_symbol_js(strategy: Option<String>) -> String {
    let strategy = strategy
        .as_deref()
        .and_then(|value| OpponentStrategy::from_str(value).ok())
        .unwrap_or_default();
    let mut rng = SeededSource::from_entropy();
    choose_opponent_symbol(strategy, &mut rng).to_string()
}

/// 返回示例服装目录，方便前端调试。
#[wasm_bindgen(js_name = "createSampleCatalog")]
pub fn create_sample_catalog() -> Result<JsValue, JsValue> {
    to_value(&Catalog::sample()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "validateInventory")]
pub fn validate_inventory(catalog_json: &str, inventory_json: &str) -> Result<(), JsValue> {
    let catalog = Catalog::from_json(catalog_json).map_err(to_js_error)?;
    let inventory = Inventory::from_json(inventory_json).map_err(to_js_error)?;
    inventory.integrity_check(&catalog).map_err(to_js_error)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = "clearAllData")]
pub fn clear_all_data() -> Result<(), JsValue> {
    let mut store = store::BrowserStore::open().map_err(to_js_error)?;
    store.clear_all().map_err(to_js_error)
}

/// 阶段之间的展示停顿，由前端等待。
#[wasm_bindgen(js_name = "phaseDelay")]
pub fn phase_delay(ms: u32) -> Promise {
    future_to_promise(async move {
        if ms > 0 {
            TimeoutFuture::new(ms).await;
        }
        Ok(JsValue::UNDEFINED)
    })
}
