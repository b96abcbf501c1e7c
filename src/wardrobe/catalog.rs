use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 服装条目标识，在同一个部位内唯一。
pub type ItemId = String;

/// 装备部位。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    Face,
    Ears,
    Eyebrows,
    Eyes,
    Mouth,
    Hair,
    Top,
    TopAccessory,
    Bottom,
    BottomAccessory,
    Socks,
    Shoes,
    Belt,
    HandAccessory,
    Accessory,
}

impl Slot {
    pub const ALL: [Slot; 15] = [
        Slot::Face,
        Slot::Ears,
        Slot::Eyebrows,
        Slot::Eyes,
        Slot::Mouth,
        Slot::Hair,
        Slot::Top,
        Slot::TopAccessory,
        Slot::Bottom,
        Slot::BottomAccessory,
        Slot::Socks,
        Slot::Shoes,
        Slot::Belt,
        Slot::HandAccessory,
        Slot::Accessory,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Slot::Face => "face",
            Slot::Ears => "ears",
            Slot::Eyebrows => "eyebrows",
            Slot::Eyes => "eyes",
            Slot::Mouth => "mouth",
            Slot::Hair => "hair",
            Slot::Top => "top",
            Slot::TopAccessory => "topAccessory",
            Slot::Bottom => "bottom",
            Slot::BottomAccessory => "bottomAccessory",
            Slot::Socks => "socks",
            Slot::Shoes => "shoes",
            Slot::Belt => "belt",
            Slot::HandAccessory => "handAccessory",
            Slot::Accessory => "accessory",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .iter()
            .copied()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// 稀有度，按声明顺序从低到高。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// 目录中的只读服装条目。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
}

impl CatalogItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            image: image.into(),
            rarity: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = Some(rarity);
        self
    }
}

/// 目录或存档结构损坏，构造时即报告。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum CatalogError {
    #[error("catalog slot `{slot}` has no items")]
    EmptySlot { slot: Slot },
    #[error("catalog slot `{slot}` lists `{id}` more than once")]
    DuplicateItem { slot: Slot, id: ItemId },
    #[error("inventory references slot `{slot}` which the catalog does not define")]
    UnknownSlot { slot: Slot },
    #[error("inventory owns `{id}` twice in slot `{slot}`")]
    DuplicateOwned { slot: Slot, id: ItemId },
    #[error("slot `{slot}` has nothing equipped")]
    MissingEquipped { slot: Slot },
    #[error("equipped `{id}` in slot `{slot}` is not owned")]
    EquippedNotOwned { slot: Slot, id: ItemId },
    #[error("malformed catalog data: {message}")]
    Malformed { message: String },
}

/// 按部位组织的只读服装目录。
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Catalog {
    slots: BTreeMap<Slot, Vec<CatalogItem>>,
}

impl Catalog {
    pub fn new(slots: BTreeMap<Slot, Vec<CatalogItem>>) -> Result<Self, CatalogError> {
        for (slot, items) in &slots {
            if items.is_empty() {
                return Err(CatalogError::EmptySlot { slot: *slot });
            }
            let mut seen = HashSet::new();
            for item in items {
                if !seen.insert(item.id.as_str()) {
                    return Err(CatalogError::DuplicateItem {
                        slot: *slot,
                        id: item.id.clone(),
                    });
                }
            }
        }
        Ok(Self { slots })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let slots: BTreeMap<Slot, Vec<CatalogItem>> =
            serde_json::from_str(json).map_err(|error| CatalogError::Malformed {
                message: error.to_string(),
            })?;
        Self::new(slots)
    }

    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.slots.keys().copied()
    }

    pub fn has_slot(&self, slot: Slot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn items(&self, slot: Slot) -> &[CatalogItem] {
        self.slots.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, slot: Slot, id: &str) -> Option<&CatalogItem> {
        self.items(slot).iter().find(|item| item.id == id)
    }

    pub fn contains(&self, slot: Slot, id: &str) -> bool {
        self.find(slot, id).is_some()
    }

    /// 新存档的初始服装：每个部位的第一件。
    pub fn starter(&self, slot: Slot) -> Option<&CatalogItem> {
        self.items(slot).first()
    }

    pub fn sample() -> Self {
        let mut slots = BTreeMap::new();
        slots.insert(
            Slot::Hair,
            vec![
                CatalogItem::new("hair_short", "Short Cut", "hair/short.png")
                    .with_rarity(Rarity::Common),
                CatalogItem::new("hair_braid", "Braided Crown", "hair/braid.png")
                    .with_rarity(Rarity::Rare),
            ],
        );
        slots.insert(
            Slot::Top,
            vec![
                CatalogItem::new("top_tee", "Plain Tee", "top/tee.png").with_rarity(Rarity::Common),
                CatalogItem::new("top_hoodie", "Cloud Hoodie", "top/hoodie.png")
                    .with_description("Soft and oversized")
                    .with_rarity(Rarity::Uncommon),
                CatalogItem::new("top_jacket", "Starlight Jacket", "top/jacket.png")
                    .with_rarity(Rarity::Epic),
            ],
        );
        slots.insert(
            Slot::Bottom,
            vec![
                CatalogItem::new("bottom_jeans", "Blue Jeans", "bottom/jeans.png")
                    .with_rarity(Rarity::Common),
                CatalogItem::new("bottom_skirt", "Pleated Skirt", "bottom/skirt.png")
                    .with_rarity(Rarity::Uncommon),
            ],
        );
        slots.insert(
            Slot::Shoes,
            vec![
                CatalogItem::new("shoes_sneakers", "Sneakers", "shoes/sneakers.png")
                    .with_rarity(Rarity::Common),
                CatalogItem::new("shoes_boots", "Rain Boots", "shoes/boots.png")
                    .with_rarity(Rarity::Rare),
            ],
        );
        slots.insert(
            Slot::Accessory,
            vec![
                CatalogItem::new("acc_none", "Nothing", "accessory/none.png"),
                CatalogItem::new("acc_crown", "Golden Crown", "accessory/crown.png")
                    .with_rarity(Rarity::Legendary),
            ],
        );
        Self { slots }
    }
}
