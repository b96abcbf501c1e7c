//! 衣橱模块：服装目录、玩家库存与下注结算账本。

pub mod catalog;
pub mod inventory;
pub mod ledger;

pub use catalog::{Catalog, CatalogError, CatalogItem, ItemId, Rarity, Slot};
pub use inventory::Inventory;
pub use ledger::{InventoryLedger, LedgerError, StakeOffer};
