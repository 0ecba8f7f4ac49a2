//! Owner consent flags and their single-byte encoding.
//!
//! Bit order, low to high:
//!
//! | Bit | Flag                      |
//! |-----|---------------------------|
//! | 0   | `can_end`                 |
//! | 1   | `can_end_early`           |
//! | 2   | `can_mint_reward`         |
//! | 3   | `can_mint_reward_at_end`  |
//! | 4   | `should_send_to_owner`    |
//! | 5   | `is_transferable`         |
//! | 6   | `copy_external_tips`      |
//! | 7   | `mint_bonus_at_end`       |

use soroban_sdk::contracttype;

const CAN_END: u8 = 1 << 0;
const CAN_END_EARLY: u8 = 1 << 1;
const CAN_MINT_REWARD: u8 = 1 << 2;
const CAN_MINT_REWARD_AT_END: u8 = 1 << 3;
const SHOULD_SEND_TO_OWNER: u8 = 1 << 4;
const IS_TRANSFERABLE: u8 = 1 << 5;
const COPY_EXTERNAL_TIPS: u8 = 1 << 6;
const MINT_BONUS_AT_END: u8 = 1 << 7;

/// Actions a third party may take on a stake. A missing flag makes the
/// matching action a silent no-op rather than an error.
#[contracttype]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConsentAbilities {
    /// Anyone may end the stake once it is mature.
    pub can_end: bool,
    /// Anyone may end the stake before maturity, taking the penalty.
    pub can_end_early: bool,
    /// Anyone may mint the secondary reward while the stake runs.
    pub can_mint_reward: bool,
    /// The secondary reward is minted as part of ending.
    pub can_mint_reward_at_end: bool,
    /// Owner proceeds are transferred out instead of credited.
    pub should_send_to_owner: bool,
    pub is_transferable: bool,
    /// Unspent tip escrow follows the stake into its restart.
    pub copy_external_tips: bool,
    /// Reward minted at end goes to the ender instead of the owner.
    pub mint_bonus_at_end: bool,
}

impl ConsentAbilities {
    pub fn end_only() -> Self {
        ConsentAbilities {
            can_end: true,
            ..Self::default()
        }
    }
}

pub fn encode(abilities: &ConsentAbilities) -> u8 {
    let mut byte = 0u8;
    if abilities.can_end {
        byte |= CAN_END;
    }
    if abilities.can_end_early {
        byte |= CAN_END_EARLY;
    }
    if abilities.can_mint_reward {
        byte |= CAN_MINT_REWARD;
    }
    if abilities.can_mint_reward_at_end {
        byte |= CAN_MINT_REWARD_AT_END;
    }
    if abilities.should_send_to_owner {
        byte |= SHOULD_SEND_TO_OWNER;
    }
    if abilities.is_transferable {
        byte |= IS_TRANSFERABLE;
    }
    if abilities.copy_external_tips {
        byte |= COPY_EXTERNAL_TIPS;
    }
    if abilities.mint_bonus_at_end {
        byte |= MINT_BONUS_AT_END;
    }
    byte
}

pub fn decode(byte: u8) -> ConsentAbilities {
    ConsentAbilities {
        can_end: byte & CAN_END != 0,
        can_end_early: byte & CAN_END_EARLY != 0,
        can_mint_reward: byte & CAN_MINT_REWARD != 0,
        can_mint_reward_at_end: byte & CAN_MINT_REWARD_AT_END != 0,
        should_send_to_owner: byte & SHOULD_SEND_TO_OWNER != 0,
        is_transferable: byte & IS_TRANSFERABLE != 0,
        copy_external_tips: byte & COPY_EXTERNAL_TIPS != 0,
        mint_bonus_at_end: byte & MINT_BONUS_AT_END != 0,
    }
}
