use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::opponent::OpponentStrategy;
use crate::wardrobe::{CatalogError, ItemId, Slot};

/// 对手允许的下注类型：金币或某个部位上穿着的服装。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum StakeOption {
    Coins,
    Slot(Slot),
}

impl FromStr for StakeOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("coins") {
            return Ok(StakeOption::Coins);
        }
        Slot::from_str(s)
            .map(StakeOption::Slot)
            .map_err(|_| format!("unknown stake option `{s}`"))
    }
}

impl TryFrom<String> for StakeOption {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StakeOption> for String {
    fn from(option: StakeOption) -> Self {
        option.to_string()
    }
}

impl fmt::Display for StakeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StakeOption::Coins => f.write_str("coins"),
            StakeOption::Slot(slot) => f.write_str(slot.as_str()),
        }
    }
}

/// NPC 描述，只读参考数据。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpponentProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub outfit: BTreeMap<Slot, ItemId>,
    #[serde(rename = "betOptions", default)]
    pub stake_options: Vec<StakeOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    #[serde(rename = "rpsStrategy", default)]
    pub strategy: OpponentStrategy,
}

impl OpponentProfile {
    pub fn sample() -> Self {
        let mut outfit = BTreeMap::new();
        outfit.insert(Slot::Hair, "hair_braid".to_string());
        outfit.insert(Slot::Top, "top_jacket".to_string());
        outfit.insert(Slot::Bottom, "bottom_skirt".to_string());
        outfit.insert(Slot::Shoes, "shoes_boots".to_string());
        outfit.insert(Slot::Accessory, "acc_crown".to_string());

        Self {
            id: "mika".into(),
            name: "Mika".into(),
            description: "Always opens with rock.".into(),
            outfit,
            stake_options: vec![
                StakeOption::Coins,
                StakeOption::Slot(Slot::Top),
                StakeOption::Slot(Slot::Shoes),
            ],
            personality: Some("stubborn".into()),
            strategy: OpponentStrategy::Pattern,
        }
    }
}

/// 全部可挑战的对手。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Roster {
    #[serde(default)]
    pub npcs: Vec<OpponentProfile>,
}

impl Roster {
    pub fn new(npcs: Vec<OpponentProfile>) -> Self {
        Self { npcs }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|error| CatalogError::Malformed {
            message: error.to_string(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&OpponentProfile> {
        self.npcs.iter().find(|npc| npc.id == id)
    }

    /// 找不到指定对手时退回第一个。
    pub fn get_or_first(&self, id: &str) -> Option<&OpponentProfile> {
        self.get(id).or_else(|| self.npcs.first())
    }
}
