use serde::{Deserialize, Serialize};

use super::state::{MatchResult, Stake};
use crate::wardrobe::{InventoryLedger, ItemId, LedgerError, Slot};

/// 对局结束后对玩家账本的唯一一次变更。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Settlement {
    /// 赢得对手的金币。
    CreditCoins { amount: u32 },
    /// 赢得对手的服装。
    ReceiveItem { slot: Slot, id: ItemId },
    /// 输掉自己下注的金币。
    DebitCoins { amount: u32 },
    /// 输掉自己下注的服装。
    ForfeitItem { slot: Slot, id: ItemId },
    NoChange,
}

impl Settlement {
    pub fn for_result(result: MatchResult, player_stake: &Stake, opponent_stake: &Stake) -> Self {
        match (result, player_stake, opponent_stake) {
            (MatchResult::Win, _, Stake::Coins { amount }) => {
                Settlement::CreditCoins { amount: *amount }
            }
            (MatchResult::Win, _, Stake::Item { slot, id }) => Settlement::ReceiveItem {
                slot: *slot,
                id: id.clone(),
            },
            (MatchResult::Lose, Stake::Coins { amount }, _) => {
                Settlement::DebitCoins { amount: *amount }
            }
            (MatchResult::Lose, Stake::Item { slot, id }, _) => Settlement::ForfeitItem {
                slot: *slot,
                id: id.clone(),
            },
            (MatchResult::Draw, _, _) => Settlement::NoChange,
        }
    }

    pub fn apply(&self, ledger: &mut InventoryLedger) -> Result<(), LedgerError> {
        match self {
            Settlement::CreditCoins { amount } => {
                ledger.add_coins(*amount);
                Ok(())
            }
            Settlement::ReceiveItem { slot, id } => match ledger.receive_reward(*slot, id) {
                Ok(()) => Ok(()),
                // 已拥有或目录里没有的奖励不改变账本，对局照常结算。
                Err(
                    error @ (LedgerError::AlreadyOwned { .. }
                    | LedgerError::NotInCatalog { .. }
                    | LedgerError::UnknownSlot { .. }),
                ) => {
                    log::info!("reward {slot}/{id} not added: {error}");
                    Ok(())
                }
                Err(error) => Err(error),
            },
            Settlement::DebitCoins { amount } => ledger.remove_coins(*amount),
            Settlement::ForfeitItem { slot, id } => ledger.remove_item(*slot, id),
            Settlement::NoChange => Ok(()),
        }
    }

    pub fn mutates_ledger(&self) -> bool {
        !matches!(self, Settlement::NoChange)
    }
}
