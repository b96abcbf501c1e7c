use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::settlement::Settlement;
use crate::wardrobe::{ItemId, LedgerError, Slot};

/// 猜拳手势。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Rock,
    Paper,
    Scissors,
}

impl Symbol {
    pub const ALL: [Symbol; 3] = [Symbol::Rock, Symbol::Paper, Symbol::Scissors];

    /// 该手势唯一能击败的手势。
    pub const fn beats(self) -> Symbol {
        match self {
            Symbol::Rock => Symbol::Scissors,
            Symbol::Scissors => Symbol::Paper,
            Symbol::Paper => Symbol::Rock,
        }
    }

    /// 唯一能击败该手势的手势。
    pub const fn loses_to(self) -> Symbol {
        match self {
            Symbol::Rock => Symbol::Paper,
            Symbol::Paper => Symbol::Scissors,
            Symbol::Scissors => Symbol::Rock,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Symbol::Rock => "rock",
            Symbol::Paper => "paper",
            Symbol::Scissors => "scissors",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rock" => Ok(Symbol::Rock),
            "paper" => Ok(Symbol::Paper),
            "scissors" => Ok(Symbol::Scissors),
            _ => Err(()),
        }
    }
}

/// 黑白猜（方向）阶段的方向。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(()),
        }
    }
}

/// 对局双方。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub const fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

/// 单回合结果。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Player,
    Opponent,
    Draw,
}

impl From<Side> for Outcome {
    fn from(side: Side) -> Self {
        match side {
            Side::Player => Outcome::Player,
            Side::Opponent => Outcome::Opponent,
        }
    }
}

/// 从玩家视角看的整局结果。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Lose,
    Draw,
}

impl From<Outcome> for MatchResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Player => MatchResult::Win,
            Outcome::Opponent => MatchResult::Lose,
            Outcome::Draw => MatchResult::Draw,
        }
    }
}

impl From<MatchResult> for Outcome {
    fn from(result: MatchResult) -> Self {
        match result {
            MatchResult::Win => Outcome::Player,
            MatchResult::Lose => Outcome::Opponent,
            MatchResult::Draw => Outcome::Draw,
        }
    }
}

/// 赌注：金币，或一件已拥有且未穿着的服装。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Stake {
    Coins { amount: u32 },
    Item { slot: Slot, id: ItemId },
}

impl fmt::Display for Stake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stake::Coins { amount } => write!(f, "{amount} coins"),
            Stake::Item { slot, id } => write!(f, "{slot}/{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchPhase {
    #[default]
    Staking,
    Rps,
    Direction,
    Settled,
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchPhase::Staking => "staking",
            MatchPhase::Rps => "rps",
            MatchPhase::Direction => "direction",
            MatchPhase::Settled => "settled",
        };
        f.write_str(name)
    }
}

/// 对局事件流，供结果页展示。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    StakesPlaced {
        player_stake: Stake,
        opponent_stake: Stake,
    },
    SymbolRound {
        round: u32,
        player: Symbol,
        opponent: Symbol,
        outcome: Outcome,
    },
    DirectionRound {
        round: u32,
        player: Direction,
        opponent: Direction,
        outcome: Outcome,
    },
    MatchSettled {
        result: MatchResult,
        settlement: Settlement,
    },
}

/// 单局状态。由调用方持有，通过 `MatchEngine` 推进。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MatchState {
    pub phase: MatchPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_stake: Option<Stake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_stake: Option<Stake>,
    /// 猜拳胜者，进入方向阶段后保留。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement: Option<Settlement>,
    #[serde(default)]
    pub symbol_rounds: u32,
    #[serde(default)]
    pub direction_rounds: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn against(opponent_id: impl Into<String>) -> Self {
        Self {
            opponent_id: Some(opponent_id.into()),
            ..Self::default()
        }
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }

    pub fn is_settled(&self) -> bool {
        self.settlement.is_some()
    }

    /// 玩家押上的服装在结算前被锁定，不能穿上。
    pub fn ensure_not_staked(&self, slot: Slot, id: &str) -> Result<(), LedgerError> {
        match &self.player_stake {
            Some(Stake::Item {
                slot: staked_slot,
                id: staked_id,
            }) if !self.is_settled() && *staked_slot == slot && staked_id == id => {
                Err(LedgerError::ItemStaked {
                    slot,
                    id: id.to_owned(),
                })
            }
            _ => Ok(()),
        }
    }
}
