//! 存档边界：把衣橱与设置读写到键值存储。

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::config::GameConfig;
use crate::wardrobe::Inventory;

pub const INVENTORY_KEY: &str = "rps_game_inventory";
pub const SETTINGS_KEY: &str = "rps_game_settings";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum StoreError {
    #[error("storage backend unavailable: {message}")]
    Backend { message: String },
    #[error("stored value under `{key}` is corrupt: {message}")]
    Corrupt { key: String, message: String },
    #[error("failed to encode value for `{key}`: {message}")]
    Encode { key: String, message: String },
}

/// 底层字符串键值存储。
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// 游戏使用的存档操作。任何 `KeyValueStore` 都自动实现。
pub trait InventoryStore {
    fn load_inventory(&self) -> Result<Option<Inventory>, StoreError>;
    fn save_inventory(&mut self, inventory: &Inventory) -> Result<(), StoreError>;
    fn load_settings(&self) -> Result<Option<GameConfig>, StoreError>;
    fn save_settings(&mut self, config: &GameConfig) -> Result<(), StoreError>;
    fn clear_all(&mut self) -> Result<(), StoreError>;
}

fn read_json<S, T>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|error| StoreError::Corrupt {
            key: key.to_string(),
            message: error.to_string(),
        })
}

fn write_json<S, T>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    let raw = serde_json::to_string(value).map_err(|error| StoreError::Encode {
        key: key.to_string(),
        message: error.to_string(),
    })?;
    store.set(key, &raw)
}

impl<S: KeyValueStore> InventoryStore for S {
    fn load_inventory(&self) -> Result<Option<Inventory>, StoreError> {
        read_json(self, INVENTORY_KEY)
    }

    fn save_inventory(&mut self, inventory: &Inventory) -> Result<(), StoreError> {
        write_json(self, INVENTORY_KEY, inventory)
    }

    /// 读到的设置同样要通过 `GameConfig::validate`。
    fn load_settings(&self) -> Result<Option<GameConfig>, StoreError> {
        let Some(config) = read_json::<_, GameConfig>(self, SETTINGS_KEY)? else {
            return Ok(None);
        };
        config.validate().map_err(|error| StoreError::Corrupt {
            key: SETTINGS_KEY.to_string(),
            message: error.to_string(),
        })?;
        Ok(Some(config))
    }

    fn save_settings(&mut self, config: &GameConfig) -> Result<(), StoreError> {
        write_json(self, SETTINGS_KEY, config)
    }

    fn clear_all(&mut self) -> Result<(), StoreError> {
        self.remove(INVENTORY_KEY)?;
        self.remove(SETTINGS_KEY)
    }
}

/// 进程内存储，用于原生环境与测试。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// 浏览器 `localStorage`。
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct BrowserStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl BrowserStore {
    pub fn open() -> Result<Self, StoreError> {
        let window = web_sys::window().ok_or_else(|| StoreError::Backend {
            message: "no global window".into(),
        })?;
        let storage = window
            .local_storage()
            .map_err(backend_error)?
            .ok_or_else(|| StoreError::Backend {
                message: "localStorage is disabled".into(),
            })?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
fn backend_error(error: wasm_bindgen::JsValue) -> StoreError {
    StoreError::Backend {
        message: error
            .as_string()
            .unwrap_or_else(|| format!("{error:?}")),
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(backend_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(backend_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage.remove_item(key).map_err(backend_error)
    }
}
