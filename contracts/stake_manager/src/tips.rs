//! Escrowed tips attached to a stake and paid to whoever ends it.
//!
//! Each entry escrows `amount` of one currency. At end the entry's curve is
//! resolved against the stake's proceeds with the escrow as the limit; the
//! ender is credited that much and the rest goes back to the owner or
//! follows the stake into its restart.

use common::{StakeSnapshot, TTL_EXTEND_TO, TTL_THRESHOLD};
use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Symbol, Vec};

use crate::curve::Linear;
use crate::errors::ContractError;
use crate::events;
use crate::ledger;
use crate::magnitude;
use crate::settings::{put_linear, take_linear};
use crate::word::{self, Word};

const TIPS: Symbol = symbol_short!("TIPS");

const LINEAR_OFFSET: u32 = 0;
const AMOUNT_OFFSET: u32 = 144;
const CURRENCY_OFFSET: u32 = 272;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TipEntry {
    /// Index into the manager's currency list; 16 bits on the wire.
    pub currency_index: u32,
    /// Escrowed cap.
    pub amount: i128,
    pub linear: Linear,
}

/// `linear:144 | amount:128 | currency_index:16`, low to high.
pub fn encode_tip(env: &Env, tip: &TipEntry) -> BytesN<64> {
    let packed = put_linear(Word::ZERO, LINEAR_OFFSET, &tip.linear);
    let packed = word::put_u128(packed, AMOUNT_OFFSET, tip.amount.max(0) as u128);
    let packed = word::put(packed, CURRENCY_OFFSET, 16, tip.currency_index as u64);
    word::to_bytes(env, &packed)
}

pub fn decode_tip(encoded: &BytesN<64>) -> TipEntry {
    let packed = word::from_bytes(encoded);
    let amount = word::take_u128(&packed, AMOUNT_OFFSET);
    TipEntry {
        currency_index: word::take(&packed, CURRENCY_OFFSET, 16) as u32,
        amount: i128::try_from(amount).unwrap_or(i128::MAX),
        linear: take_linear(&packed, LINEAR_OFFSET),
    }
}

pub fn tips_of(env: &Env, stake_id: u64) -> Vec<TipEntry> {
    let key = (TIPS, stake_id);
    match env.storage().persistent().get(&key) {
        Some(tips) => {
            env.storage()
                .persistent()
                .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
            tips
        }
        None => Vec::new(env),
    }
}

fn store(env: &Env, stake_id: u64, tips: &Vec<TipEntry>) {
    let key = (TIPS, stake_id);
    if tips.is_empty() {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, tips);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Append an already escrowed entry. Returns its index.
pub fn push(env: &Env, stake_id: u64, tip: TipEntry) -> u32 {
    let mut tips = tips_of(env, stake_id);
    tips.push_back(tip);
    store(env, stake_id, &tips);
    tips.len() - 1
}

/// Remove the entries at `indices`, all of which refer to the list as it
/// stood before the call, and refund their escrow to `owner`.
pub fn remove(
    env: &Env,
    stake_id: u64,
    owner: &Address,
    indices: &Vec<u32>,
) -> Result<u32, ContractError> {
    let tips = tips_of(env, stake_id);
    let mut tombstones: Vec<bool> = Vec::new(env);
    for _ in 0..tips.len() {
        tombstones.push_back(false);
    }

    for index in indices.iter() {
        match tombstones.get(index) {
            Some(false) => tombstones.set(index, true),
            _ => return Err(ContractError::InvalidInput),
        }
    }

    let mut kept = Vec::new(env);
    let mut removed = 0u32;
    for (index, tip) in tips.iter().enumerate() {
        if tombstones.get(index as u32).unwrap_or(false) {
            let token = ledger::currency_of(env, tip.currency_index)?;
            ledger::unlock(env, owner, &token, tip.amount);
            events::publish_tip_removed(env, stake_id, token, index as u32, tip.amount);
            removed += 1;
        } else {
            kept.push_back(tip);
        }
    }
    store(env, stake_id, &kept);
    Ok(removed)
}

/// Detach and return every entry of `stake_id`.
pub fn take_all(env: &Env, stake_id: u64) -> Vec<TipEntry> {
    let tips = tips_of(env, stake_id);
    env.storage().persistent().remove(&(TIPS, stake_id));
    tips
}

/// Pay each entry to `ender` against the stake's `proceeds` and return
/// whatever escrow is left over, entry by entry.
pub fn realize(
    env: &Env,
    stake_id: u64,
    tips: &Vec<TipEntry>,
    ender: &Address,
    proceeds: i128,
    stake: &StakeSnapshot,
    current_day: u32,
) -> Result<Vec<TipEntry>, ContractError> {
    let mut residual = Vec::new(env);
    for tip in tips.iter() {
        let token = ledger::currency_of(env, tip.currency_index)?;
        let paid =
            magnitude::compute_magnitude(tip.amount, &tip.linear, proceeds, stake, current_day)?;
        if paid > 0 {
            ledger::unlock(env, ender, &token, paid);
            events::publish_tip_paid(env, stake_id, token, ender.clone(), paid);
        }
        let left = tip.amount - paid;
        if left > 0 {
            residual.push_back(TipEntry {
                amount: left,
                ..tip
            });
        }
    }
    Ok(residual)
}

/// Hand leftover escrow back to the stake owner.
pub fn refund(env: &Env, owner: &Address, tips: &Vec<TipEntry>) -> Result<i128, ContractError> {
    let mut refunded = 0i128;
    for tip in tips.iter() {
        let token = ledger::currency_of(env, tip.currency_index)?;
        ledger::unlock(env, owner, &token, tip.amount);
        refunded = refunded.saturating_add(tip.amount);
    }
    Ok(refunded)
}

/// Attach leftover escrow to a restarted stake.
pub fn carry(env: &Env, stake_id: u64, tips: &Vec<TipEntry>) {
    let mut list = tips_of(env, stake_id);
    list.append(tips);
    store(env, stake_id, &list);
}
