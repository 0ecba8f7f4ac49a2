use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::errors::ContractError;

const INITIALIZED: Symbol = symbol_short!("INIT");
const STAKEABLE: Symbol = symbol_short!("STKABLE");
const REWARD_MINTER: Symbol = symbol_short!("MINTER");

/// Index of the primitive's staked token in the currency list.
pub const STAKED_CURRENCY: u32 = 0;
/// Index of the secondary reward token in the currency list.
pub const REWARD_CURRENCY: u32 = 1;

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&INITIALIZED)
}

pub fn require_initialized(env: &Env) -> Result<(), ContractError> {
    if !is_initialized(env) {
        return Err(ContractError::NotInitialized);
    }
    Ok(())
}

pub fn store(env: &Env, stakeable: &Address, reward_minter: &Address) {
    env.storage().instance().set(&STAKEABLE, stakeable);
    env.storage().instance().set(&REWARD_MINTER, reward_minter);
    env.storage().instance().set(&INITIALIZED, &true);
}

pub fn stakeable(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&STAKEABLE)
        .ok_or(ContractError::NotInitialized)
}

pub fn reward_minter(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&REWARD_MINTER)
        .ok_or(ContractError::NotInitialized)
}
