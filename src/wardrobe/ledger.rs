use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::{Catalog, CatalogError, CatalogItem, ItemId, Slot};
use super::inventory::Inventory;
use crate::config::GameConfig;
use crate::game::Stake;

/// 账本操作被拒绝的原因。失败时不会修改任何状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum LedgerError {
    #[error("slot `{slot}` is not part of this wardrobe")]
    UnknownSlot { slot: Slot },
    #[error("`{id}` is not a catalog item for slot `{slot}`")]
    NotInCatalog { slot: Slot, id: ItemId },
    #[error("`{id}` is already owned in slot `{slot}`")]
    AlreadyOwned { slot: Slot, id: ItemId },
    #[error("`{id}` is not owned in slot `{slot}`")]
    NotOwned { slot: Slot, id: ItemId },
    #[error("`{id}` is currently equipped in slot `{slot}`")]
    ItemEquipped { slot: Slot, id: ItemId },
    #[error("`{id}` in slot `{slot}` is staked in the current match")]
    ItemStaked { slot: Slot, id: ItemId },
    #[error("need {required} coins but only {available} available")]
    InsufficientCoins { required: u32, available: u32 },
    #[error("coin amount must be positive")]
    InvalidAmount,
}

/// 可供玩家选择的下注项。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StakeOffer {
    pub stake: Stake,
    pub label: String,
}

/// 单个玩家的衣橱账本：持有状态 + 只读目录。
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    inventory: Inventory,
    catalog: Arc<Catalog>,
}

impl InventoryLedger {
    /// `saved` 为 `None` 时使用初始服装；否则补齐缺失部位并校验存档。
    pub fn new(
        catalog: Arc<Catalog>,
        saved: Option<Inventory>,
        config: &GameConfig,
    ) -> Result<Self, CatalogError> {
        let inventory = match saved {
            None => Inventory::starter(&catalog, config.starting_coins),
            Some(mut inventory) => {
                let filled = inventory.fill_missing_slots(&catalog);
                if !filled.is_empty() {
                    log::info!("added starter items for new slots {:?}", filled);
                }
                inventory.integrity_check(&catalog)?;
                inventory
            }
        };
        Ok(Self { inventory, catalog })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn coins(&self) -> u32 {
        self.inventory.coins
    }

    pub fn snapshot(&self) -> Inventory {
        self.inventory.clone()
    }

    pub fn equipped_outfit(&self) -> BTreeMap<Slot, ItemId> {
        self.inventory.equipped.clone()
    }

    pub fn item_details(&self, slot: Slot, id: &str) -> Option<&CatalogItem> {
        self.catalog.find(slot, id)
    }

    pub fn add_item(&mut self, slot: Slot, id: &str) -> Result<(), LedgerError> {
        let owned = self
            .inventory
            .owned
            .get_mut(&slot)
            .ok_or(LedgerError::UnknownSlot { slot })?;
        if !self.catalog.contains(slot, id) {
            return Err(LedgerError::NotInCatalog {
                slot,
                id: id.to_owned(),
            });
        }
        if owned.iter().any(|item| item == id) {
            return Err(LedgerError::AlreadyOwned {
                slot,
                id: id.to_owned(),
            });
        }
        owned.push(id.to_owned());
        log::debug!("added {slot}/{id} to inventory");
        Ok(())
    }

    pub fn equip(&mut self, slot: Slot, id: &str) -> Result<(), LedgerError> {
        self.ensure_owned(slot, id)?;
        self.inventory.equipped.insert(slot, id.to_owned());
        log::debug!("equipped {slot}/{id}");
        Ok(())
    }

    pub fn add_coins(&mut self, amount: u32) {
        self.inventory.coins = self.inventory.coins.saturating_add(amount);
        log::debug!("credited {amount} coins, balance {}", self.inventory.coins);
    }

    pub fn remove_coins(&mut self, amount: u32) -> Result<(), LedgerError> {
        let available = self.inventory.coins;
        if available < amount {
            return Err(LedgerError::InsufficientCoins {
                required: amount,
                available,
            });
        }
        self.inventory.coins = available - amount;
        log::debug!("debited {amount} coins, balance {}", self.inventory.coins);
        Ok(())
    }

    pub fn remove_item(&mut self, slot: Slot, id: &str) -> Result<(), LedgerError> {
        self.validate_stake(slot, id)?;
        if let Some(owned) = self.inventory.owned.get_mut(&slot) {
            owned.retain(|item| item != id);
        }
        log::debug!("removed {slot}/{id} from inventory");
        Ok(())
    }

    /// 只读检查：物品必须已拥有且未穿着。
    pub fn validate_stake(&self, slot: Slot, id: &str) -> Result<(), LedgerError> {
        if !self.inventory.owned.contains_key(&slot) {
            return Err(LedgerError::UnknownSlot { slot });
        }
        if self.inventory.is_equipped(slot, id) {
            return Err(LedgerError::ItemEquipped {
                slot,
                id: id.to_owned(),
            });
        }
        self.ensure_owned(slot, id)
    }

    pub fn receive_reward(&mut self, slot: Slot, id: &str) -> Result<(), LedgerError> {
        self.add_item(slot, id)
    }

    /// 金币下注必须为正且余额足够，确保输掉时可以扣除。
    pub fn validate_wager(&self, stake: &Stake) -> Result<(), LedgerError> {
        match stake {
            Stake::Coins { amount: 0 } => Err(LedgerError::InvalidAmount),
            Stake::Coins { amount } if *amount > self.inventory.coins => {
                Err(LedgerError::InsufficientCoins {
                    required: *amount,
                    available: self.inventory.coins,
                })
            }
            Stake::Coins { .. } => Ok(()),
            Stake::Item { slot, id } => self.validate_stake(*slot, id),
        }
    }

    pub fn stake_offers(&self, coin_stake: u32) -> Vec<StakeOffer> {
        let mut offers = Vec::new();
        if coin_stake > 0 && coin_stake <= self.inventory.coins {
            offers.push(StakeOffer {
                stake: Stake::Coins { amount: coin_stake },
                label: format!("{coin_stake} coins"),
            });
        }

        for (slot, items) in &self.inventory.owned {
            for id in items {
                if self.inventory.is_equipped(*slot, id) {
                    continue;
                }
                if let Some(details) = self.catalog.find(*slot, id) {
                    offers.push(StakeOffer {
                        stake: Stake::Item {
                            slot: *slot,
                            id: id.clone(),
                        },
                        label: format!("{} ({slot})", details.name),
                    });
                }
            }
        }
        offers
    }

    fn ensure_owned(&self, slot: Slot, id: &str) -> Result<(), LedgerError> {
        if !self.inventory.owned.contains_key(&slot) {
            return Err(LedgerError::UnknownSlot { slot });
        }
        if !self.inventory.owns(slot, id) {
            return Err(LedgerError::NotOwned {
                slot,
                id: id.to_owned(),
            });
        }
        Ok(())
    }
}
