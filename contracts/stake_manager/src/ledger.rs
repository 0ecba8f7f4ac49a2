//! Currency list and per-account balances held by the manager.
//!
//! For every token the manager tracks how much of its balance belongs to
//! someone (`attributed`: withdrawable balances plus escrowed tips). The
//! rest is the unattributed pool: tokens that arrived without an owner,
//! such as restart leftovers, which the first caller may collect.

use common::{TTL_EXTEND_TO, TTL_THRESHOLD};
use soroban_sdk::{symbol_short, token, Address, Env, Symbol};

use crate::errors::ContractError;

const CURRENCY: Symbol = symbol_short!("CURRENCY");
const CURRENCY_INDEX: Symbol = symbol_short!("CUR_IDX");
const CURRENCY_COUNT: Symbol = symbol_short!("CUR_CNT");
const WITHDRAWABLE: Symbol = symbol_short!("WDRAW");
const ATTRIBUTED: Symbol = symbol_short!("ATTRIB");

/// Basis-point denominator for percentage collection.
pub const BPS_DENOMINATOR: i128 = 10_000;

// ── Currencies ───────────────────────────────────────────────────────────────

pub fn currency_count(env: &Env) -> u32 {
    env.storage().instance().get(&CURRENCY_COUNT).unwrap_or(0)
}

pub fn currency_index(env: &Env, token: &Address) -> Option<u32> {
    env.storage()
        .persistent()
        .get(&(CURRENCY_INDEX, token.clone()))
}

pub fn currency_at(env: &Env, index: u32) -> Option<Address> {
    env.storage().persistent().get(&(CURRENCY, index))
}

pub fn currency_of(env: &Env, index: u32) -> Result<Address, ContractError> {
    currency_at(env, index).ok_or(ContractError::UnknownCurrency)
}

/// Append `token` to the currency list. Returns the existing index when the
/// token is already known and `true` only for a new entry.
pub fn add_currency(env: &Env, token: &Address) -> (u32, bool) {
    if let Some(index) = currency_index(env, token) {
        return (index, false);
    }
    let index = currency_count(env);
    let by_index = (CURRENCY, index);
    let by_token = (CURRENCY_INDEX, token.clone());
    env.storage().persistent().set(&by_index, token);
    env.storage().persistent().set(&by_token, &index);
    env.storage()
        .persistent()
        .extend_ttl(&by_index, TTL_THRESHOLD, TTL_EXTEND_TO);
    env.storage()
        .persistent()
        .extend_ttl(&by_token, TTL_THRESHOLD, TTL_EXTEND_TO);
    env.storage().instance().set(&CURRENCY_COUNT, &(index + 1));
    (index, true)
}

// ── Balances ─────────────────────────────────────────────────────────────────

pub fn withdrawable(env: &Env, account: &Address, token: &Address) -> i128 {
    let key = (WITHDRAWABLE, account.clone(), token.clone());
    match env.storage().persistent().get(&key) {
        Some(amount) => {
            env.storage()
                .persistent()
                .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
            amount
        }
        None => 0,
    }
}

fn set_withdrawable(env: &Env, account: &Address, token: &Address, amount: i128) {
    let key = (WITHDRAWABLE, account.clone(), token.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, &amount);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn attributed(env: &Env, token: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&(ATTRIBUTED, token.clone()))
        .unwrap_or(0)
}

fn set_attributed(env: &Env, token: &Address, amount: i128) {
    let key = (ATTRIBUTED, token.clone());
    env.storage().persistent().set(&key, &amount);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Claim `amount` of the manager's token balance on someone's behalf.
pub fn attribute(env: &Env, token: &Address, amount: i128) {
    set_attributed(env, token, attributed(env, token).saturating_add(amount));
}

/// Release `amount` of attribution; the tokens have left or are about to.
pub fn unattribute(env: &Env, token: &Address, amount: i128) {
    set_attributed(
        env,
        token,
        attributed(env, token).saturating_sub(amount).max(0),
    );
}

/// Token balance nobody has a claim on.
pub fn unattributed(env: &Env, token: &Address) -> i128 {
    let balance = token::Client::new(env, token).balance(&env.current_contract_address());
    balance.saturating_sub(attributed(env, token)).max(0)
}

/// Assign newly owned tokens to `account`.
pub fn credit(env: &Env, account: &Address, token: &Address, amount: i128) {
    if amount <= 0 {
        return;
    }
    set_withdrawable(
        env,
        account,
        token,
        withdrawable(env, account, token).saturating_add(amount),
    );
    attribute(env, token, amount);
}

/// Take `amount` away from `account`, dropping the claim with it.
pub fn debit(
    env: &Env,
    account: &Address,
    token: &Address,
    amount: i128,
) -> Result<(), ContractError> {
    lock(env, account, token, amount)?;
    unattribute(env, token, amount);
    Ok(())
}

/// Move `amount` from `account`'s withdrawable balance into escrow. The
/// tokens stay attributed.
pub fn lock(
    env: &Env,
    account: &Address,
    token: &Address,
    amount: i128,
) -> Result<(), ContractError> {
    if amount < 0 {
        return Err(ContractError::InvalidInput);
    }
    let balance = withdrawable(env, account, token);
    if balance < amount {
        return Err(ContractError::InsufficientBalance);
    }
    set_withdrawable(env, account, token, balance - amount);
    Ok(())
}

/// Move escrowed `amount` back into `account`'s withdrawable balance.
pub fn unlock(env: &Env, account: &Address, token: &Address, amount: i128) {
    if amount <= 0 {
        return;
    }
    set_withdrawable(
        env,
        account,
        token,
        withdrawable(env, account, token).saturating_add(amount),
    );
}

// ── Token movement ───────────────────────────────────────────────────────────

pub fn pull_in(env: &Env, token: &Address, from: &Address, amount: i128) {
    token::Client::new(env, token).transfer(from, &env.current_contract_address(), &amount);
}

pub fn transfer_out(env: &Env, token: &Address, to: &Address, amount: i128) {
    if amount <= 0 {
        return;
    }
    token::Client::new(env, token).transfer(&env.current_contract_address(), to, &amount);
}

/// Resolve a collection request against the pool: `0` means everything and
/// larger requests are clamped.
pub fn collectable(env: &Env, token: &Address, requested: i128) -> Result<i128, ContractError> {
    if requested < 0 {
        return Err(ContractError::InvalidInput);
    }
    let pool = unattributed(env, token);
    if requested == 0 {
        return Ok(pool);
    }
    Ok(requested.min(pool))
}

/// `bps` of the pool, with `bps` clamped to a whole.
pub fn collectable_percent(env: &Env, token: &Address, bps: u32) -> i128 {
    let bps = (bps as i128).min(BPS_DENOMINATOR);
    unattributed(env, token).saturating_mul(bps) / BPS_DENOMINATOR
}

/// Hand `amount` of the pool to `recipient`, either as a withdrawable
/// credit or as a direct transfer.
pub fn collect(
    env: &Env,
    token: &Address,
    recipient: &Address,
    amount: i128,
    to_withdrawable: bool,
) {
    if to_withdrawable {
        credit(env, recipient, token, amount);
    } else {
        transfer_out(env, token, recipient, amount);
    }
}
