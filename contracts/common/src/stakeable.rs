//! Call contract of the external staking primitive.
//!
//! The manager never assumes anything about the primitive beyond these
//! signatures. Yield curves and penalty schedules live entirely on the
//! other side of this boundary.

use soroban_sdk::{contractclient, contracttype, Address, Env};

/// Longest lock the primitive accepts, in days.
pub const MAX_STAKE_DAYS: u32 = 5_555;

/// A single lock position as reported by the primitive's `stake_at`.
///
/// Re-fetched at every decision point; never cached across calls.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StakeSnapshot {
    pub stake_id: u64,
    /// Deposited amount, in the primitive's base units.
    pub principal: i128,
    pub shares: i128,
    /// First day the position is locked.
    pub locked_day: u32,
    pub staked_days: u32,
    /// Day good-accounting or an end call settled the position, `0` if open.
    pub unlocked_day: u32,
    pub is_auto_stake: bool,
}

impl StakeSnapshot {
    /// Day on which the position may be ended without penalty.
    pub fn end_day(&self) -> u32 {
        self.locked_day.saturating_add(self.staked_days)
    }

    pub fn is_mature(&self, current_day: u32) -> bool {
        current_day >= self.end_day()
    }
}

/// Interface of the lock primitive. Positions are listed per custodian and
/// removed by swapping the last entry into the vacated index.
#[contractclient(name = "StakeableClient")]
pub trait Stakeable {
    fn current_day(env: Env) -> u32;

    /// Token accepted by `start_stake` and paid out by `end_stake`.
    fn token(env: Env) -> Address;

    fn stake_count(env: Env, custodian: Address) -> u32;

    fn stake_at(env: Env, custodian: Address, index: u32) -> StakeSnapshot;

    /// Pull `amount` from `custodian` (through a prior token allowance) and
    /// lock it for `days`. Returns the new stake id.
    fn start_stake(env: Env, custodian: Address, amount: i128, days: u32) -> u64;

    /// End the stake at `index`, paying principal and yield (less any
    /// penalty) back to `custodian`. Returns the amount paid.
    fn end_stake(env: Env, custodian: Address, index: u32, stake_id: u64) -> i128;

    fn good_accounting(env: Env, custodian: Address, index: u32, stake_id: u64);
}

/// Interface of the secondary reward token's minter.
#[contractclient(name = "RewardMinterClient")]
pub trait RewardMinter {
    fn reward_token(env: Env) -> Address;

    /// Mint whatever reward the stake has accrued since its last mint to
    /// `custodian`. Returns the minted amount.
    fn mint_native(env: Env, custodian: Address, index: u32, stake_id: u64) -> i128;
}
