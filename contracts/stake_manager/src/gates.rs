//! Preconditions a batch can pin to the ledger it expects to run in.

use soroban_sdk::Env;

use crate::errors::ContractError;

/// Fail once the ledger clock has passed `deadline` (seconds).
pub fn check_deadline(env: &Env, deadline: u64) -> Result<(), ContractError> {
    if env.ledger().timestamp() > deadline {
        return Err(ContractError::Deadline);
    }
    Ok(())
}

/// Fail unless `sequence` names a ledger that has already closed.
pub fn check_ledger_closed(env: &Env, sequence: u32) -> Result<(), ContractError> {
    if sequence >= env.ledger().sequence() {
        return Err(ContractError::BlockHash);
    }
    Ok(())
}
