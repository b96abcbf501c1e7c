//! 对手模块：随机源、出拳性格与 NPC 资料。

pub mod opponent;
pub mod roster;

pub use opponent::{
    choose_opponent_direction, choose_opponent_stake, choose_opponent_symbol, OpponentStrategy,
    RandomSource, ScriptedSource, SeededSource,
};
pub use roster::{OpponentProfile, Roster, StakeOption};
