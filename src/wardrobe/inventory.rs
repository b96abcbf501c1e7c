use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, CatalogError, ItemId, Slot};

/// 玩家持有的服装与金币。字段结构与存档一致。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Inventory {
    #[serde(default)]
    pub owned: BTreeMap<Slot, Vec<ItemId>>,
    #[serde(default)]
    pub equipped: BTreeMap<Slot, ItemId>,
    #[serde(default)]
    pub coins: u32,
}

impl Inventory {
    /// 每个部位拥有并穿着目录中的第一件，附带初始金币。
    pub fn starter(catalog: &Catalog, coins: u32) -> Self {
        let mut inventory = Self {
            owned: BTreeMap::new(),
            equipped: BTreeMap::new(),
            coins,
        };
        inventory.fill_missing_slots(catalog);
        inventory
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|error| CatalogError::Malformed {
            message: error.to_string(),
        })
    }

    pub fn owns(&self, slot: Slot, id: &str) -> bool {
        self.owned
            .get(&slot)
            .map(|items| items.iter().any(|owned| owned == id))
            .unwrap_or(false)
    }

    pub fn equipped_in(&self, slot: Slot) -> Option<&str> {
        self.equipped.get(&slot).map(String::as_str)
    }

    pub fn is_equipped(&self, slot: Slot, id: &str) -> bool {
        self.equipped_in(slot) == Some(id)
    }

    /// 为目录中存在、存档中完全缺失的部位补上初始服装，返回补齐的部位。
    pub fn fill_missing_slots(&mut self, catalog: &Catalog) -> Vec<Slot> {
        let mut filled = Vec::new();
        for slot in catalog.slots() {
            if self.owned.contains_key(&slot) || self.equipped.contains_key(&slot) {
                continue;
            }
            if let Some(item) = catalog.starter(slot) {
                self.owned.insert(slot, vec![item.id.clone()]);
                self.equipped.insert(slot, item.id.clone());
                filled.push(slot);
            }
        }
        filled
    }

    pub fn integrity_check(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        for slot in self.owned.keys().chain(self.equipped.keys()) {
            if !catalog.has_slot(*slot) {
                return Err(CatalogError::UnknownSlot { slot: *slot });
            }
        }

        for (slot, items) in &self.owned {
            let mut seen = HashSet::new();
            for id in items {
                if !seen.insert(id.as_str()) {
                    return Err(CatalogError::DuplicateOwned {
                        slot: *slot,
                        id: id.clone(),
                    });
                }
            }

            match self.equipped.get(slot) {
                None => return Err(CatalogError::MissingEquipped { slot: *slot }),
                Some(id) if !seen.contains(id.as_str()) => {
                    return Err(CatalogError::EquippedNotOwned {
                        slot: *slot,
                        id: id.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        for (slot, id) in &self.equipped {
            if !self.owns(*slot, id) {
                return Err(CatalogError::EquippedNotOwned {
                    slot: *slot,
                    id: id.clone(),
                });
            }
        }

        Ok(())
    }
}
