use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::roster::{OpponentProfile, StakeOption};
use crate::config::GameConfig;
use crate::game::{Direction, Stake, Symbol};

/// 对手决策使用的随机源。所有抽取都经过这里，便于替换或固定种子。
pub trait RandomSource {
    /// `[0, 1)` 区间内的均匀浮点数。
    fn next_unit(&mut self) -> f64;

    /// `[0, len)` 区间内的均匀下标，`len` 必须大于 0。
    fn pick_index(&mut self, len: usize) -> usize {
        let index = (self.next_unit() * len as f64) as usize;
        index.min(len.saturating_sub(1))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }

    fn pick_index(&mut self, len: usize) -> usize {
        (**self).pick_index(len)
    }
}

/// 基于 `SmallRng` 的默认随机源。
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: SmallRng,
}

impl SeededSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len.max(1))
    }
}

/// 按脚本循环返回固定数值的随机源，用于重放与测试。
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// NPC 出拳性格。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OpponentStrategy {
    /// 三种手势等概率。
    #[default]
    Random,
    /// 偏爱石头：50% 石头，25% 布，25% 剪刀。
    Pattern,
}

impl FromStr for OpponentStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(OpponentStrategy::Random),
            "pattern" => Ok(OpponentStrategy::Pattern),
            _ => Err(()),
        }
    }
}

pub fn choose_opponent_symbol<R: RandomSource + ?Sized>(
    strategy: OpponentStrategy,
    rng: &mut R,
) -> Symbol {
    match strategy {
        OpponentStrategy::Random => Symbol::ALL[rng.pick_index(Symbol::ALL.len())],
        OpponentStrategy::Pattern => {
            let roll = rng.next_unit();
            if roll < 0.5 {
                Symbol::Rock
            } else if roll < 0.75 {
                Symbol::Paper
            } else {
                Symbol::Scissors
            }
        }
    }
}

pub fn choose_opponent_direction<R: RandomSource + ?Sized>(rng: &mut R) -> Direction {
    Direction::ALL[rng.pick_index(Direction::ALL.len())]
}

/// 从对手允许的下注类型中等概率抽取一个，并换算成具体赌注。
/// 对手没有穿着对应部位、或金币赌注为 0 时该选项被跳过。
pub fn choose_opponent_stake<R: RandomSource + ?Sized>(
    profile: &OpponentProfile,
    config: &GameConfig,
    rng: &mut R,
) -> Option<Stake> {
    let candidates: Vec<Stake> = profile
        .stake_options
        .iter()
        .filter_map(|option| match option {
            StakeOption::Coins => (config.opponent_coin_stake > 0).then(|| Stake::Coins {
                amount: config.opponent_coin_stake,
            }),
            StakeOption::Slot(slot) => profile.outfit.get(slot).map(|id| Stake::Item {
                slot: *slot,
                id: id.clone(),
            }),
        })
        .collect();

    if candidates.is_empty() {
        log::warn!("opponent `{}` has no usable stake option", profile.id);
        return None;
    }
    let index = rng.pick_index(candidates.len());
    candidates.into_iter().nth(index)
}
