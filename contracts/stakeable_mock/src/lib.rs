//! Reference lock primitive and reward minter for exercising the manager.
//!
//! * Days are counted from the ledger timestamp at initialisation.
//! * A stake locks from the day after it starts.
//! * Mature stakes pay `yield_bps` per staked day on top of principal.
//! * Early ends forfeit up to half of principal, pro rata to the days left.
//! * Ending swap-removes the stake from its custodian's list.
//! * The reward minter pays `principal / 1000` reward tokens per served day
//!   from a pre-funded balance.

#![no_std]

use common::{StakeSnapshot, MAX_STAKE_DAYS, TTL_EXTEND_TO, TTL_THRESHOLD};
use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env, Symbol, Vec};

const TOKEN: Symbol = symbol_short!("TOKEN");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const YIELD_BPS: Symbol = symbol_short!("YLD_BPS");
const LAUNCH: Symbol = symbol_short!("LAUNCH");
const NEXT_ID: Symbol = symbol_short!("NEXT_ID");

const STAKES: Symbol = symbol_short!("STAKES");
const MINTED_TO: Symbol = symbol_short!("MINTED");

pub const SECONDS_PER_DAY: u64 = 86_400;
pub const BPS: i128 = 10_000;
pub const REWARD_DIVISOR: i128 = 1_000;

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum MockError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    InvalidInput = 3,
    StakeNotFound = 4,
    NotMature = 5,
}

#[contract]
pub struct StakeableMock;

#[contractimpl]
impl StakeableMock {
    pub fn initialize(
        env: Env,
        token: Address,
        reward_token: Address,
        yield_bps: u32,
    ) -> Result<(), MockError> {
        if env.storage().instance().has(&TOKEN) {
            return Err(MockError::AlreadyInitialized);
        }
        env.storage().instance().set(&TOKEN, &token);
        env.storage().instance().set(&REWARD_TOKEN, &reward_token);
        env.storage().instance().set(&YIELD_BPS, &yield_bps);
        env.storage()
            .instance()
            .set(&LAUNCH, &env.ledger().timestamp());
        Ok(())
    }

    pub fn current_day(env: Env) -> u32 {
        Self::day(&env)
    }

    pub fn token(env: Env) -> Result<Address, MockError> {
        env.storage()
            .instance()
            .get(&TOKEN)
            .ok_or(MockError::NotInitialized)
    }

    pub fn reward_token(env: Env) -> Result<Address, MockError> {
        env.storage()
            .instance()
            .get(&REWARD_TOKEN)
            .ok_or(MockError::NotInitialized)
    }

    pub fn stake_count(env: Env, custodian: Address) -> u32 {
        Self::stakes(&env, &custodian).len()
    }

    pub fn stake_at(env: Env, custodian: Address, index: u32) -> Result<StakeSnapshot, MockError> {
        Self::stakes(&env, &custodian)
            .get(index)
            .ok_or(MockError::StakeNotFound)
    }

    /// Pull `amount` from `custodian` through its allowance and lock it.
    pub fn start_stake(
        env: Env,
        custodian: Address,
        amount: i128,
        days: u32,
    ) -> Result<u64, MockError> {
        custodian.require_auth();
        if amount <= 0 || days == 0 || days > MAX_STAKE_DAYS {
            return Err(MockError::InvalidInput);
        }
        let token = Self::token(env.clone())?;
        let this = env.current_contract_address();
        token::Client::new(&env, &token).transfer_from(&this, &custodian, &this, &amount);

        let stake_id: u64 = env.storage().instance().get(&NEXT_ID).unwrap_or(1);
        env.storage().instance().set(&NEXT_ID, &(stake_id + 1));

        let mut stakes = Self::stakes(&env, &custodian);
        stakes.push_back(StakeSnapshot {
            stake_id,
            principal: amount,
            shares: amount,
            locked_day: Self::day(&env) + 1,
            staked_days: days,
            unlocked_day: 0,
            is_auto_stake: false,
        });
        Self::store_stakes(&env, &custodian, &stakes);
        Ok(stake_id)
    }

    pub fn end_stake(
        env: Env,
        custodian: Address,
        index: u32,
        stake_id: u64,
    ) -> Result<i128, MockError> {
        custodian.require_auth();
        let mut stakes = Self::stakes(&env, &custodian);
        let stake = Self::find(&stakes, index, stake_id)?;
        let payout = Self::payout(&env, &stake);

        let last = stakes.pop_back().ok_or(MockError::StakeNotFound)?;
        if index < stakes.len() {
            stakes.set(index, last);
        }
        Self::store_stakes(&env, &custodian, &stakes);

        let token = Self::token(env.clone())?;
        token::Client::new(&env, &token).transfer(
            &env.current_contract_address(),
            &custodian,
            &payout,
        );
        Ok(payout)
    }

    /// Marks a mature stake as settled. Immature stakes are rejected.
    pub fn good_accounting(
        env: Env,
        custodian: Address,
        index: u32,
        stake_id: u64,
    ) -> Result<(), MockError> {
        let mut stakes = Self::stakes(&env, &custodian);
        let mut stake = Self::find(&stakes, index, stake_id)?;
        let day = Self::day(&env);
        if !stake.is_mature(day) {
            return Err(MockError::NotMature);
        }
        if stake.unlocked_day == 0 {
            stake.unlocked_day = day;
            stakes.set(index, stake);
            Self::store_stakes(&env, &custodian, &stakes);
        }
        Ok(())
    }

    /// Pay the reward accrued since the last mint to `custodian`.
    pub fn mint_native(
        env: Env,
        custodian: Address,
        index: u32,
        stake_id: u64,
    ) -> Result<i128, MockError> {
        custodian.require_auth();
        let stakes = Self::stakes(&env, &custodian);
        let stake = Self::find(&stakes, index, stake_id)?;

        let key = (MINTED_TO, stake_id);
        let from_day: u32 = env
            .storage()
            .persistent()
            .get(&key)
            .unwrap_or(stake.locked_day);
        let to_day = Self::day(&env).min(stake.end_day());
        if to_day <= from_day {
            return Ok(0);
        }
        env.storage().persistent().set(&key, &to_day);

        let reward = stake.principal * (to_day - from_day) as i128 / REWARD_DIVISOR;
        if reward > 0 {
            let reward_token = Self::reward_token(env.clone())?;
            token::Client::new(&env, &reward_token).transfer(
                &env.current_contract_address(),
                &custodian,
                &reward,
            );
        }
        Ok(reward)
    }

    // ── Internal helpers ────────────────────────────────────────────────────

    fn day(env: &Env) -> u32 {
        let launch: u64 = env.storage().instance().get(&LAUNCH).unwrap_or(0);
        (env.ledger().timestamp().saturating_sub(launch) / SECONDS_PER_DAY) as u32
    }

    fn stakes(env: &Env, custodian: &Address) -> Vec<StakeSnapshot> {
        env.storage()
            .persistent()
            .get(&(STAKES, custodian.clone()))
            .unwrap_or(Vec::new(env))
    }

    fn store_stakes(env: &Env, custodian: &Address, stakes: &Vec<StakeSnapshot>) {
        let key = (STAKES, custodian.clone());
        env.storage().persistent().set(&key, stakes);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }

    fn find(
        stakes: &Vec<StakeSnapshot>,
        index: u32,
        stake_id: u64,
    ) -> Result<StakeSnapshot, MockError> {
        match stakes.get(index) {
            Some(stake) if stake.stake_id == stake_id => Ok(stake),
            _ => Err(MockError::StakeNotFound),
        }
    }

    fn payout(env: &Env, stake: &StakeSnapshot) -> i128 {
        let day = Self::day(env);
        if day < stake.locked_day {
            return stake.principal;
        }
        let staked_days = stake.staked_days as i128;
        if stake.is_mature(day) {
            let yield_bps: u32 = env.storage().instance().get(&YIELD_BPS).unwrap_or(0);
            return stake.principal + stake.principal * yield_bps as i128 * staked_days / BPS;
        }
        let served = (day - stake.locked_day) as i128;
        stake.principal * (staked_days + served) / (2 * staked_days)
    }
}
