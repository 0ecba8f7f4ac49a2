//! Custody records: who owns each stake the manager holds, where it sits in
//! the primitive's list, and the encoded settings attached to it.

use common::{StakeSnapshot, StakeableClient, TTL_EXTEND_TO, TTL_THRESHOLD};
use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Symbol};

use crate::errors::ContractError;
use crate::word::WORD_BYTES;

const STAKE_INFO: Symbol = symbol_short!("STK_INFO");
const SETTINGS: Symbol = symbol_short!("SETTINGS");
const OPERATOR: Symbol = symbol_short!("OPERATOR");

/// Ownership record for a custodied stake.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeInfo {
    /// Position in the primitive's per-custodian stake list.
    pub custody_index: u32,
    pub owner: Address,
}

fn extend_ttl<K>(env: &Env, key: &K)
where
    K: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn info(env: &Env, stake_id: u64) -> Option<StakeInfo> {
    let key = (STAKE_INFO, stake_id);
    let info: Option<StakeInfo> = env.storage().persistent().get(&key);
    if info.is_some() {
        extend_ttl(env, &key);
    }
    info
}

pub fn owner_of(env: &Env, stake_id: u64) -> Option<Address> {
    info(env, stake_id).map(|info| info.owner)
}

fn store_info(env: &Env, stake_id: u64, info: &StakeInfo) {
    let key = (STAKE_INFO, stake_id);
    env.storage().persistent().set(&key, info);
    extend_ttl(env, &key);
}

/// Settings word for a stake; ghosts read as all zero.
pub fn encoded_settings(env: &Env, stake_id: u64) -> BytesN<64> {
    let key = (SETTINGS, stake_id);
    match env.storage().persistent().get::<_, BytesN<64>>(&key) {
        Some(encoded) => {
            extend_ttl(env, &key);
            encoded
        }
        None => BytesN::from_array(env, &[0u8; WORD_BYTES]),
    }
}

pub fn store_settings(env: &Env, stake_id: u64, encoded: &BytesN<64>) {
    let key = (SETTINGS, stake_id);
    env.storage().persistent().set(&key, encoded);
    extend_ttl(env, &key);
}

/// Record a freshly started stake at the tail of the custodian's list.
pub fn register_start(
    env: &Env,
    stake_id: u64,
    custody_index: u32,
    owner: &Address,
    encoded: &BytesN<64>,
) {
    store_info(
        env,
        stake_id,
        &StakeInfo {
            custody_index,
            owner: owner.clone(),
        },
    );
    store_settings(env, stake_id, encoded);
}

pub fn set_owner(env: &Env, stake_id: u64, owner: &Address) -> Result<(), ContractError> {
    let mut info = info(env, stake_id).ok_or(ContractError::StakeNotOwned)?;
    info.owner = owner.clone();
    store_info(env, stake_id, &info);
    Ok(())
}

/// Drop the ownership record and settings of an ended stake.
pub fn clear(env: &Env, stake_id: u64) {
    env.storage().persistent().remove(&(STAKE_INFO, stake_id));
    env.storage().persistent().remove(&(SETTINGS, stake_id));
}

pub fn verify_ownership(
    env: &Env,
    stake_id: u64,
    owner: &Address,
) -> Result<StakeInfo, ContractError> {
    match info(env, stake_id) {
        Some(info) if info.owner == *owner => Ok(info),
        _ => Err(ContractError::StakeNotOwned),
    }
}

/// Confirm the primitive still lists `stake_id` at the recorded index and
/// return its current snapshot.
pub fn verify_custodian(
    env: &Env,
    stakeable: &StakeableClient,
    stake_id: u64,
    info: &StakeInfo,
) -> Result<StakeSnapshot, ContractError> {
    let manager = env.current_contract_address();
    if info.custody_index >= stakeable.stake_count(&manager) {
        return Err(ContractError::StakeNotCustodied);
    }
    let snapshot = stakeable.stake_at(&manager, &info.custody_index);
    if snapshot.stake_id != stake_id {
        return Err(ContractError::StakeNotCustodied);
    }
    Ok(snapshot)
}

/// After the primitive swap-removes the stake at `vacated`, point the
/// record of whichever stake moved into that slot at its new index.
pub fn reindex_after_removal(env: &Env, stakeable: &StakeableClient, vacated: u32) {
    let manager = env.current_contract_address();
    if vacated >= stakeable.stake_count(&manager) {
        return;
    }
    let moved = stakeable.stake_at(&manager, &vacated);
    if let Some(mut info) = info(env, moved.stake_id) {
        info.custody_index = vacated;
        store_info(env, moved.stake_id, &info);
    }
}

// ── Operators ────────────────────────────────────────────────────────────────

pub fn set_operator(env: &Env, owner: &Address, operator: &Address, approved: bool) {
    let key = (OPERATOR, owner.clone(), operator.clone());
    if approved {
        env.storage().persistent().set(&key, &true);
        extend_ttl(env, &key);
    } else {
        env.storage().persistent().remove(&key);
    }
}

pub fn is_operator(env: &Env, owner: &Address, operator: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&(OPERATOR, owner.clone(), operator.clone()))
        .unwrap_or(false)
}

/// `caller` may move `owner`'s stakes.
pub fn may_act_for(env: &Env, owner: &Address, caller: &Address) -> bool {
    caller == owner || is_operator(env, owner, caller)
}
