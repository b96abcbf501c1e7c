//! 对局核心逻辑（回合判定、阶段推进、结算）。

pub mod rules;
pub mod settlement;
pub mod state;

pub use rules::{
    opposite_direction, play_direction_phase, play_symbol_phase, resolve_direction_phase,
    resolve_direction_round, resolve_symbol_round, DirectionPhase, MatchEngine, RuleError,
    SymbolPhase, SymbolPhaseOutcome,
};
pub use settlement::Settlement;
pub use state::{
    Direction, GameEvent, MatchPhase, MatchResult, MatchState, Outcome, Side, Stake, Symbol,
};
