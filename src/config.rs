use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_STARTING_COINS: u32 = 100;
const DEFAULT_COIN_STAKE: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum ConfigError {
    #[error("malformed settings: {message}")]
    Malformed { message: String },
    #[error("`{field}` must be positive")]
    ZeroStake { field: String },
}

/// 游戏设置，缺省字段取默认值。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    #[serde(default = "default_starting_coins")]
    pub starting_coins: u32,
    #[serde(default = "default_coin_stake")]
    pub coin_stake: u32,
    #[serde(default = "default_coin_stake")]
    pub opponent_coin_stake: u32,
}

fn default_starting_coins() -> u32 {
    DEFAULT_STARTING_COINS
}

fn default_coin_stake() -> u32 {
    DEFAULT_COIN_STAKE
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig =
            serde_json::from_str(json).map_err(|error| ConfigError::Malformed {
                message: error.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_starting_coins(mut self, coins: u32) -> Self {
        self.starting_coins = coins;
        self
    }

    pub fn with_coin_stakes(mut self, player: u32, opponent: u32) -> Self {
        self.coin_stake = player;
        self.opponent_coin_stake = opponent;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coin_stake == 0 {
            return Err(ConfigError::ZeroStake {
                field: "coinStake".into(),
            });
        }
        if self.opponent_coin_stake == 0 {
            return Err(ConfigError::ZeroStake {
                field: "opponentCoinStake".into(),
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_coins: DEFAULT_STARTING_COINS,
            coin_stake: DEFAULT_COIN_STAKE,
            opponent_coin_stake: DEFAULT_COIN_STAKE,
        }
    }
}
