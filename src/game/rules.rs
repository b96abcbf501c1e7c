use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    settlement::Settlement,
    state::{
        Direction, GameEvent, MatchPhase, MatchResult, MatchState, Outcome, Side, Stake, Symbol,
    },
};
use crate::ai::{
    choose_opponent_direction, choose_opponent_stake, choose_opponent_symbol, OpponentProfile,
    OpponentStrategy, RandomSource, SeededSource,
};
use crate::config::GameConfig;
use crate::wardrobe::{InventoryLedger, LedgerError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum RuleError {
    #[error("expected phase {expected}, match is in {actual}")]
    InvalidPhase {
        expected: MatchPhase,
        actual: MatchPhase,
    },
    #[error("stake rejected: {error}")]
    StakeRejected { error: LedgerError },
    #[error("opponent stake rejected: {error}")]
    OpponentStakeRejected { error: LedgerError },
    #[error("match has no stakes recorded")]
    MissingStake,
    #[error("direction round started without a rock-paper-scissors winner")]
    MissingLeader,
    #[error("match reached settlement without a result")]
    MissingResult,
    #[error("match was already settled")]
    AlreadySettled,
    #[error("settlement failed: {error}")]
    SettlementFailed { error: LedgerError },
}

pub fn resolve_symbol_round(player: Symbol, opponent: Symbol) -> Outcome {
    if opponent == player.beats() {
        Outcome::Player
    } else if opponent == player.loses_to() {
        Outcome::Opponent
    } else {
        Outcome::Draw
    }
}

pub fn opposite_direction(direction: Direction) -> Direction {
    direction.opposite()
}

/// 方向相同时猜拳胜者赢下整局，不同则平局重来。
pub fn resolve_direction_round(first: Direction, second: Direction, leader: Side) -> Outcome {
    if first == second {
        leader.into()
    } else {
        Outcome::Draw
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SymbolPhaseOutcome {
    /// 平局，重新猜拳。
    Draw,
    /// 胜者带入方向阶段。
    Advance { leader: Side },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolPhase {
    pub player_symbol: Symbol,
    pub opponent_symbol: Symbol,
    pub outcome: SymbolPhaseOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectionPhase {
    pub leader: Side,
    pub player_direction: Direction,
    pub opponent_direction: Direction,
    pub result: MatchResult,
    /// 玩家获胜时转移给玩家的对手赌注。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<Stake>,
}

pub fn play_symbol_phase<R: RandomSource + ?Sized>(
    player_symbol: Symbol,
    strategy: OpponentStrategy,
    rng: &mut R,
) -> SymbolPhase {
    let opponent_symbol = choose_opponent_symbol(strategy, rng);
    let outcome = match resolve_symbol_round(player_symbol, opponent_symbol) {
        Outcome::Player => SymbolPhaseOutcome::Advance {
            leader: Side::Player,
        },
        Outcome::Opponent => SymbolPhaseOutcome::Advance {
            leader: Side::Opponent,
        },
        Outcome::Draw => SymbolPhaseOutcome::Draw,
    };
    SymbolPhase {
        player_symbol,
        opponent_symbol,
        outcome,
    }
}

pub fn resolve_direction_phase(
    leader: Side,
    player_direction: Direction,
    opponent_direction: Direction,
    opponent_stake: &Stake,
) -> DirectionPhase {
    let (first, second) = match leader {
        Side::Player => (player_direction, opponent_direction),
        Side::Opponent => (opponent_direction, player_direction),
    };
    let result = MatchResult::from(resolve_direction_round(first, second, leader));
    let reward = (result == MatchResult::Win).then(|| opponent_stake.clone());
    DirectionPhase {
        leader,
        player_direction,
        opponent_direction,
        result,
        reward,
    }
}

/// 对手每次都重新随机抽取方向，不会刻意选择相反方向。
pub fn play_direction_phase<R: RandomSource + ?Sized>(
    leader: Side,
    player_direction: Direction,
    opponent_stake: &Stake,
    rng: &mut R,
) -> DirectionPhase {
    let opponent_direction = choose_opponent_direction(rng);
    resolve_direction_phase(leader, player_direction, opponent_direction, opponent_stake)
}

/// 推进 `staking → rps → direction → settled` 状态机。
/// 只有 `settle` 会修改账本，之前任何阶段放弃对局都没有副作用。
#[derive(Debug, Clone)]
pub struct MatchEngine<R: RandomSource = SeededSource> {
    rng: R,
}

impl MatchEngine<SeededSource> {
    pub fn from_entropy() -> Self {
        Self::new(SeededSource::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(SeededSource::with_seed(seed))
    }
}

impl<R: RandomSource> MatchEngine<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn ensure_phase(state: &MatchState, expected: MatchPhase) -> Result<(), RuleError> {
        if state.phase != expected {
            return Err(RuleError::InvalidPhase {
                expected,
                actual: state.phase,
            });
        }
        Ok(())
    }

    pub fn choose_opponent_stake(
        &mut self,
        profile: &OpponentProfile,
        config: &GameConfig,
    ) -> Option<Stake> {
        choose_opponent_stake(profile, config, &mut self.rng)
    }

    pub fn place_stakes(
        &self,
        state: &mut MatchState,
        ledger: &InventoryLedger,
        player_stake: Stake,
        opponent_stake: Stake,
    ) -> Result<(), RuleError> {
        Self::ensure_phase(state, MatchPhase::Staking)?;
        ledger
            .validate_wager(&player_stake)
            .map_err(|error| RuleError::StakeRejected { error })?;
        if let Stake::Coins { amount: 0 } = opponent_stake {
            return Err(RuleError::OpponentStakeRejected {
                error: LedgerError::InvalidAmount,
            });
        }

        log::info!("stakes placed: player {player_stake}, opponent {opponent_stake}");
        state.record_event(GameEvent::StakesPlaced {
            player_stake: player_stake.clone(),
            opponent_stake: opponent_stake.clone(),
        });
        state.player_stake = Some(player_stake);
        state.opponent_stake = Some(opponent_stake);
        state.phase = MatchPhase::Rps;
        Ok(())
    }

    pub fn play_symbol(
        &mut self,
        state: &mut MatchState,
        player_symbol: Symbol,
        strategy: OpponentStrategy,
    ) -> Result<SymbolPhase, RuleError> {
        Self::ensure_phase(state, MatchPhase::Rps)?;

        let phase = play_symbol_phase(player_symbol, strategy, &mut self.rng);
        state.symbol_rounds += 1;
        let outcome = match phase.outcome {
            SymbolPhaseOutcome::Draw => Outcome::Draw,
            SymbolPhaseOutcome::Advance { leader } => {
                state.leader = Some(leader);
                state.phase = MatchPhase::Direction;
                leader.into()
            }
        };
        state.record_event(GameEvent::SymbolRound {
            round: state.symbol_rounds,
            player: phase.player_symbol,
            opponent: phase.opponent_symbol,
            outcome,
        });
        Ok(phase)
    }

    pub fn play_direction(
        &mut self,
        state: &mut MatchState,
        player_direction: Direction,
    ) -> Result<DirectionPhase, RuleError> {
        Self::ensure_phase(state, MatchPhase::Direction)?;
        let leader = state.leader.ok_or(RuleError::MissingLeader)?;
        let opponent_stake = state
            .opponent_stake
            .as_ref()
            .ok_or(RuleError::MissingStake)?;

        let phase = play_direction_phase(leader, player_direction, opponent_stake, &mut self.rng);
        state.direction_rounds += 1;
        state.record_event(GameEvent::DirectionRound {
            round: state.direction_rounds,
            player: phase.player_direction,
            opponent: phase.opponent_direction,
            outcome: phase.result.into(),
        });

        if phase.result != MatchResult::Draw {
            state.result = Some(phase.result);
            state.phase = MatchPhase::Settled;
        }
        Ok(phase)
    }

    pub fn settle(
        &self,
        state: &mut MatchState,
        ledger: &mut InventoryLedger,
    ) -> Result<Settlement, RuleError> {
        Self::ensure_phase(state, MatchPhase::Settled)?;
        if state.is_settled() {
            return Err(RuleError::AlreadySettled);
        }
        let (Some(player_stake), Some(opponent_stake)) =
            (state.player_stake.as_ref(), state.opponent_stake.as_ref())
        else {
            return Err(RuleError::MissingStake);
        };
        let result = state.result.ok_or(RuleError::MissingResult)?;

        let settlement = Settlement::for_result(result, player_stake, opponent_stake);
        settlement
            .apply(ledger)
            .map_err(|error| RuleError::SettlementFailed { error })?;

        log::info!("match settled as {result:?}: {settlement:?}");
        state.record_event(GameEvent::MatchSettled {
            result,
            settlement: settlement.clone(),
        });
        state.settlement = Some(settlement.clone());
        Ok(settlement)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ai::ScriptedSource;
    use crate::wardrobe::{Catalog, Slot};

    // 偏爱石头策略下：0.0 → 石头，0.6 → 布，0.8 → 剪刀；方向：0.1 → 上，0.3 → 下
    const ROCK: f64 = 0.0;
    const PAPER: f64 = 0.6;
    const SCISSORS: f64 = 0.8;
    const UP: f64 = 0.1;
    const DOWN: f64 = 0.3;

    fn ledger() -> InventoryLedger {
        InventoryLedger::new(Arc::new(Catalog::sample()), None, &GameConfig::default())
            .expect("sample catalog is valid")
    }

    fn engine(script: &[f64]) -> MatchEngine<ScriptedSource> {
        MatchEngine::new(ScriptedSource::new(script.to_vec()))
    }

    fn coins(amount: u32) -> Stake {
        Stake::Coins { amount }
    }

    #[test]
    fn equal_symbols_always_draw() {
        for symbol in Symbol::ALL {
            assert_eq!(resolve_symbol_round(symbol, symbol), Outcome::Draw);
        }
    }

    #[test]
    fn unequal_symbols_follow_beats_relation() {
        let expected = [
            (Symbol::Rock, Symbol::Scissors, Outcome::Player),
            (Symbol::Scissors, Symbol::Paper, Outcome::Player),
            (Symbol::Paper, Symbol::Rock, Outcome::Player),
            (Symbol::Scissors, Symbol::Rock, Outcome::Opponent),
            (Symbol::Paper, Symbol::Scissors, Outcome::Opponent),
            (Symbol::Rock, Symbol::Paper, Outcome::Opponent),
        ];
        for (player, opponent, outcome) in expected {
            assert_eq!(resolve_symbol_round(player, opponent), outcome);
        }
    }

    #[test]
    fn opposite_direction_is_an_involution_without_fixed_points() {
        for direction in Direction::ALL {
            assert_ne!(opposite_direction(direction), direction);
            assert_eq!(opposite_direction(opposite_direction(direction)), direction);
        }
        assert_eq!(opposite_direction(Direction::Up), Direction::Down);
        assert_eq!(opposite_direction(Direction::Left), Direction::Right);
    }

    #[test]
    fn direction_round_carries_leader_only_on_match() {
        for first in Direction::ALL {
            assert_eq!(resolve_direction_round(first, first, Side::Player), Outcome::Player);
            assert_eq!(
                resolve_direction_round(first, first, Side::Opponent),
                Outcome::Opponent
            );
            for second in Direction::ALL.into_iter().filter(|d| *d != first) {
                assert_eq!(resolve_direction_round(first, second, Side::Player), Outcome::Draw);
                assert_eq!(
                    resolve_direction_round(first, second, Side::Opponent),
                    Outcome::Draw
                );
            }
        }
    }

    #[test]
    fn direction_phase_rewards_only_player_wins() {
        let stake = coins(50);
        let win = resolve_direction_phase(Side::Player, Direction::Left, Direction::Left, &stake);
        assert_eq!(win.result, MatchResult::Win);
        assert_eq!(win.reward, Some(stake.clone()));

        let lose = resolve_direction_phase(Side::Opponent, Direction::Up, Direction::Up, &stake);
        assert_eq!(lose.result, MatchResult::Lose);
        assert_eq!(lose.reward, None);

        let draw = resolve_direction_phase(Side::Player, Direction::Up, Direction::Down, &stake);
        assert_eq!(draw.result, MatchResult::Draw);
        assert_eq!(draw.reward, None);
    }

    #[test]
    fn symbol_phase_reports_draw_or_leader() {
        let mut rng = ScriptedSource::new([ROCK, SCISSORS, PAPER]);
        let draw = play_symbol_phase(Symbol::Rock, OpponentStrategy::Pattern, &mut rng);
        assert_eq!(draw.outcome, SymbolPhaseOutcome::Draw);

        let lead = play_symbol_phase(Symbol::Rock, OpponentStrategy::Pattern, &mut rng);
        assert_eq!(lead.opponent_symbol, Symbol::Scissors);
        assert_eq!(
            lead.outcome,
            SymbolPhaseOutcome::Advance {
                leader: Side::Player
            }
        );

        let trail = play_symbol_phase(Symbol::Rock, OpponentStrategy::Pattern, &mut rng);
        assert_eq!(
            trail.outcome,
            SymbolPhaseOutcome::Advance {
                leader: Side::Opponent
            }
        );
    }

    #[test]
    fn full_win_against_coin_stake_credits_coins() {
        let mut ledger = ledger();
        let mut engine = engine(&[SCISSORS, UP]);
        let mut state = MatchState::new();

        engine
            .place_stakes(&mut state, &ledger, coins(50), coins(50))
            .expect("stake covered");
        engine
            .play_symbol(&mut state, Symbol::Rock, OpponentStrategy::Pattern)
            .expect("rps phase");
        assert_eq!(state.phase, MatchPhase::Direction);
        assert_eq!(state.leader, Some(Side::Player));

        let direction = engine
            .play_direction(&mut state, Direction::Up)
            .expect("direction phase");
        assert_eq!(direction.result, MatchResult::Win);
        assert_eq!(direction.reward, Some(coins(50)));
        assert_eq!(ledger.coins(), 100, "no mutation before settlement");

        let settlement = engine.settle(&mut state, &mut ledger).expect("settle");
        assert_eq!(settlement, Settlement::CreditCoins { amount: 50 });
        assert_eq!(ledger.coins(), 150);
        assert!(state.is_settled());
    }

    #[test]
    fn full_loss_with_coin_stake_debits_coins() {
        let mut ledger = ledger();
        let mut engine = engine(&[SCISSORS, UP]);
        let mut state = MatchState::new();
        let opponent_stake = Stake::Item {
            slot: Slot::Top,
            id: "top_jacket".into(),
        };

        engine
            .place_stakes(&mut state, &ledger, coins(50), opponent_stake)
            .expect("stake covered");
        engine
            .play_symbol(&mut state, Symbol::Paper, OpponentStrategy::Pattern)
            .expect("rps phase");
        assert_eq!(state.leader, Some(Side::Opponent));

        let direction = engine
            .play_direction(&mut state, Direction::Up)
            .expect("direction phase");
        assert_eq!(direction.result, MatchResult::Lose);

        let settlement = engine.settle(&mut state, &mut ledger).expect("settle");
        assert_eq!(settlement, Settlement::DebitCoins { amount: 50 });
        assert_eq!(ledger.coins(), 50);
        assert!(!ledger.snapshot().owns(Slot::Top, "top_jacket"));
    }

    #[test]
    fn winning_an_item_stake_adds_it_to_inventory() {
        let mut ledger = ledger();
        let mut engine = engine(&[SCISSORS, UP]);
        let mut state = MatchState::against("mika");

        engine
            .place_stakes(
                &mut state,
                &ledger,
                coins(50),
                Stake::Item {
                    slot: Slot::Top,
                    id: "top_jacket".into(),
                },
            )
            .expect("stake covered");
        engine
            .play_symbol(&mut state, Symbol::Rock, OpponentStrategy::Pattern)
            .expect("rps phase");
        engine
            .play_direction(&mut state, Direction::Up)
            .expect("direction phase");
        engine.settle(&mut state, &mut ledger).expect("settle");

        assert!(ledger.snapshot().owns(Slot::Top, "top_jacket"));
        assert_eq!(ledger.coins(), 100);
    }

    #[test]
    fn losing_an_item_stake_removes_it() {
        let mut ledger = ledger();
        ledger.add_item(Slot::Shoes, "shoes_boots").expect("catalog item");
        let mut engine = engine(&[PAPER, DOWN]);
        let mut state = MatchState::new();

        engine
            .place_stakes(
                &mut state,
                &ledger,
                Stake::Item {
                    slot: Slot::Shoes,
                    id: "shoes_boots".into(),
                },
                coins(50),
            )
            .expect("unequipped item is stakeable");
        engine
            .play_symbol(&mut state, Symbol::Rock, OpponentStrategy::Pattern)
            .expect("rps phase");
        let direction = engine
            .play_direction(&mut state, Direction::Down)
            .expect("direction phase");
        assert_eq!(direction.result, MatchResult::Lose);

        engine.settle(&mut state, &mut ledger).expect("settle");
        assert!(!ledger.snapshot().owns(Slot::Shoes, "shoes_boots"));
    }

    #[test]
    fn symbol_draw_replays_rps_without_touching_ledger() {
        let ledger = ledger();
        let before = ledger.snapshot();
        let mut engine = engine(&[ROCK]);
        let mut state = MatchState::new();

        engine
            .place_stakes(&mut state, &ledger, coins(50), coins(50))
            .expect("stake covered");
        let phase = engine
            .play_symbol(&mut state, Symbol::Rock, OpponentStrategy::Pattern)
            .expect("rps phase");

        assert_eq!(phase.outcome, SymbolPhaseOutcome::Draw);
        assert_eq!(state.phase, MatchPhase::Rps);
        assert_eq!(state.leader, None);
        assert_eq!(state.symbol_rounds, 1);
        assert_eq!(ledger.snapshot(), before);
        assert_eq!(
            engine.play_direction(&mut state, Direction::Up),
            Err(RuleError::InvalidPhase {
                expected: MatchPhase::Direction,
                actual: MatchPhase::Rps
            })
        );
    }

    #[test]
    fn direction_draw_replays_only_direction_phase() {
        let mut ledger = ledger();
        let mut engine = engine(&[SCISSORS, DOWN, UP]);
        let mut state = MatchState::new();

        engine
            .place_stakes(&mut state, &ledger, coins(50), coins(50))
            .expect("stake covered");
        engine
            .play_symbol(&mut state, Symbol::Rock, OpponentStrategy::Pattern)
            .expect("rps phase");

        let first = engine
            .play_direction(&mut state, Direction::Up)
            .expect("direction phase");
        assert_eq!(first.opponent_direction, Direction::Down);
        assert_eq!(first.result, MatchResult::Draw);
        assert_eq!(state.phase, MatchPhase::Direction);
        assert_eq!(state.leader, Some(Side::Player));
        assert_eq!(state.symbol_rounds, 1);
        assert_eq!(
            engine.settle(&mut state, &mut ledger),
            Err(RuleError::InvalidPhase {
                expected: MatchPhase::Settled,
                actual: MatchPhase::Direction
            })
        );
        assert_eq!(ledger.coins(), 100);

        let second = engine
            .play_direction(&mut state, Direction::Up)
            .expect("direction phase");
        assert_eq!(second.result, MatchResult::Win);
        assert_eq!(state.direction_rounds, 2);
        engine.settle(&mut state, &mut ledger).expect("settle");
        assert_eq!(ledger.coins(), 150);
    }

    #[test]
    fn equipped_item_stake_is_rejected_before_rps() {
        let ledger = ledger();
        let engine = engine(&[]);
        let mut state = MatchState::new();
        let result = engine.place_stakes(
            &mut state,
            &ledger,
            Stake::Item {
                slot: Slot::Hair,
                id: "hair_short".into(),
            },
            coins(50),
        );
        assert!(matches!(
            result,
            Err(RuleError::StakeRejected {
                error: LedgerError::ItemEquipped { .. }
            })
        ));
        assert_eq!(state.phase, MatchPhase::Staking);
        assert!(state.player_stake.is_none());
    }

    #[test]
    fn settlement_happens_exactly_once() {
        let mut ledger = ledger();
        let mut engine = engine(&[SCISSORS, UP]);
        let mut state = MatchState::new();
        engine
            .place_stakes(&mut state, &ledger, coins(50), coins(50))
            .expect("stake covered");
        engine
            .play_symbol(&mut state, Symbol::Rock, OpponentStrategy::Pattern)
            .expect("rps phase");
        engine
            .play_direction(&mut state, Direction::Up)
            .expect("direction phase");
        engine.settle(&mut state, &mut ledger).expect("settle");

        assert_eq!(
            engine.settle(&mut state, &mut ledger),
            Err(RuleError::AlreadySettled)
        );
        assert_eq!(ledger.coins(), 150);
        assert!(matches!(
            state.event_log.last(),
            Some(GameEvent::MatchSettled {
                result: MatchResult::Win,
                ..
            })
        ));
    }

    fn top_jacket() -> Stake {
        Stake::Item {
            slot: Slot::Top,
            id: "top_jacket".into(),
        }
    }

    fn boots() -> Stake {
        Stake::Item {
            slot: Slot::Shoes,
            id: "shoes_boots".into(),
        }
    }

    #[test]
    fn winning_an_item_already_owned_still_settles() {
        let mut ledger = ledger();
        ledger.add_item(Slot::Top, "top_jacket").expect("catalog item");
        let before = ledger.snapshot();
        let mut engine = engine(&[SCISSORS, UP]);
        let mut state = MatchState::against("mika");

        engine
            .place_stakes(&mut state, &ledger, coins(50), top_jacket())
            .expect("stake covered");
        engine
            .play_symbol(&mut state, Symbol::Rock, OpponentStrategy::Pattern)
            .expect("rps phase");
        engine
            .play_direction(&mut state, Direction::Up)
            .expect("direction phase");

        let settlement = engine.settle(&mut state, &mut ledger).expect("settle");
        assert_eq!(
            settlement,
            Settlement::ReceiveItem {
                slot: Slot::Top,
                id: "top_jacket".into()
            }
        );
        assert!(state.is_settled());
        assert_eq!(ledger.snapshot(), before);
        assert_eq!(
            engine.settle(&mut state, &mut ledger),
            Err(RuleError::AlreadySettled)
        );
    }

    #[test]
    fn staked_item_is_locked_until_settlement() {
        let mut ledger = ledger();
        ledger.add_item(Slot::Shoes, "shoes_boots").expect("catalog item");
        let mut engine = engine(&[PAPER, DOWN]);
        let mut state = MatchState::new();
        assert_eq!(state.ensure_not_staked(Slot::Shoes, "shoes_boots"), Ok(()));

        engine
            .place_stakes(&mut state, &ledger, boots(), coins(50))
            .expect("unequipped item is stakeable");
        engine
            .play_symbol(&mut state, Symbol::Rock, OpponentStrategy::Pattern)
            .expect("rps phase");
        assert_eq!(
            state.ensure_not_staked(Slot::Shoes, "shoes_boots"),
            Err(LedgerError::ItemStaked {
                slot: Slot::Shoes,
                id: "shoes_boots".into()
            })
        );
        assert_eq!(state.ensure_not_staked(Slot::Shoes, "shoes_sneakers"), Ok(()));
        assert_eq!(state.ensure_not_staked(Slot::Top, "shoes_boots"), Ok(()));

        engine
            .play_direction(&mut state, Direction::Down)
            .expect("direction phase");
        engine.settle(&mut state, &mut ledger).expect("settle");
        assert!(!ledger.snapshot().owns(Slot::Shoes, "shoes_boots"));
        assert_eq!(state.ensure_not_staked(Slot::Shoes, "shoes_boots"), Ok(()));
    }

    #[test]
    fn failed_forfeit_leaves_match_unsettled() {
        let mut ledger = ledger();
        ledger.add_item(Slot::Shoes, "shoes_boots").expect("catalog item");
        let mut engine = engine(&[PAPER, DOWN]);
        let mut state = MatchState::new();

        engine
            .place_stakes(&mut state, &ledger, boots(), coins(50))
            .expect("unequipped item is stakeable");
        engine
            .play_symbol(&mut state, Symbol::Rock, OpponentStrategy::Pattern)
            .expect("rps phase");
        engine
            .play_direction(&mut state, Direction::Down)
            .expect("direction phase");

        ledger.equip(Slot::Shoes, "shoes_boots").expect("owned item");
        assert_eq!(
            engine.settle(&mut state, &mut ledger),
            Err(RuleError::SettlementFailed {
                error: LedgerError::ItemEquipped {
                    slot: Slot::Shoes,
                    id: "shoes_boots".into()
                }
            })
        );
        assert!(!state.is_settled());
        assert!(ledger.snapshot().owns(Slot::Shoes, "shoes_boots"));

        ledger.equip(Slot::Shoes, "shoes_sneakers").expect("owned item");
        assert_eq!(
            engine.settle(&mut state, &mut ledger),
            Ok(Settlement::ForfeitItem {
                slot: Slot::Shoes,
                id: "shoes_boots".into()
            })
        );
        assert!(!ledger.snapshot().owns(Slot::Shoes, "shoes_boots"));
    }

    #[test]
    fn zero_coin_opponent_stake_is_rejected() {
        let ledger = ledger();
        let engine = engine(&[]);
        let mut state = MatchState::new();
        assert_eq!(
            engine.place_stakes(&mut state, &ledger, coins(50), coins(0)),
            Err(RuleError::OpponentStakeRejected {
                error: LedgerError::InvalidAmount
            })
        );
        assert_eq!(state.phase, MatchPhase::Staking);
        assert!(state.event_log.is_empty());
    }

    #[test]
    fn settled_phase_without_result_is_reported() {
        let mut ledger = ledger();
        let engine = engine(&[]);
        let mut state = MatchState {
            phase: MatchPhase::Settled,
            player_stake: Some(coins(50)),
            opponent_stake: Some(coins(50)),
            leader: Some(Side::Player),
            ..MatchState::default()
        };
        assert_eq!(
            engine.settle(&mut state, &mut ledger),
            Err(RuleError::MissingResult)
        );
        assert_eq!(ledger.coins(), 100);
        assert!(!state.is_settled());
    }

    #[test]
    fn abandoned_match_leaves_ledger_untouched() {
        let ledger = ledger();
        let before = ledger.snapshot();
        let mut engine = engine(&[SCISSORS, DOWN]);
        let mut state = MatchState::new();
        engine
            .place_stakes(&mut state, &ledger, coins(50), coins(50))
            .expect("stake covered");
        engine
            .play_symbol(&mut state, Symbol::Rock, OpponentStrategy::Pattern)
            .expect("rps phase");
        drop(state);
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn stakes_cannot_be_placed_twice() {
        let ledger = ledger();
        let engine = engine(&[]);
        let mut state = MatchState::new();
        engine
            .place_stakes(&mut state, &ledger, coins(10), coins(50))
            .expect("stake covered");
        assert_eq!(
            engine.place_stakes(&mut state, &ledger, coins(10), coins(50)),
            Err(RuleError::InvalidPhase {
                expected: MatchPhase::Staking,
                actual: MatchPhase::Rps
            })
        );
    }
}
