#![no_std]

pub mod config;
pub mod consent;
pub mod curve;
pub mod errors;
pub mod events;
pub mod gates;
pub mod ledger;
pub mod lifecycle;
pub mod magnitude;
pub mod registry;
pub mod settings;
pub mod tips;
pub mod word;

pub use consent::ConsentAbilities;
pub use curve::{Linear, Method};
pub use errors::{ContractError, ErrorCategory};
pub use lifecycle::{EndOutcome, EndReceipt};
pub use registry::StakeInfo;
pub use settings::Settings;
pub use tips::TipEntry;

use common::{RewardMinterClient, StakeSnapshot, StakeableClient};
use soroban_sdk::{contract, contractimpl, Address, Bytes, BytesN, Env, Vec};

use config::STAKED_CURRENCY;
use lifecycle::Context;

#[contract]
pub struct StakeManagerContract;

#[contractimpl]
impl StakeManagerContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the manager.
    ///
    /// * `stakeable`     – the lock primitive stakes are custodied in.
    /// * `reward_minter` – contract minting the secondary reward.
    ///
    /// Currency 0 becomes the primitive's token and currency 1 the reward
    /// token.
    pub fn initialize(
        env: Env,
        stakeable: Address,
        reward_minter: Address,
    ) -> Result<(), ContractError> {
        if config::is_initialized(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        let staked_token = StakeableClient::new(&env, &stakeable).token();
        let reward_token = RewardMinterClient::new(&env, &reward_minter).reward_token();

        config::store(&env, &stakeable, &reward_minter);
        events::publish_initialized(&env, stakeable, reward_minter);

        for token in [staked_token, reward_token] {
            let (index, added) = ledger::add_currency(&env, &token);
            if added {
                events::publish_currency_added(&env, token, index);
            }
        }
        Ok(())
    }

    pub fn is_initialized(env: Env) -> bool {
        config::is_initialized(&env)
    }

    pub fn get_stakeable(env: Env) -> Result<Address, ContractError> {
        config::stakeable(&env)
    }

    pub fn get_reward_minter(env: Env) -> Result<Address, ContractError> {
        config::reward_minter(&env)
    }

    // ── Currencies ──────────────────────────────────────────────────────────

    /// Register `token` as a tip currency. Returns its index; adding a known
    /// token is a no-op that returns the existing index.
    pub fn add_currency(env: Env, token: Address) -> Result<u32, ContractError> {
        config::require_initialized(&env)?;
        let (index, added) = ledger::add_currency(&env, &token);
        if added {
            events::publish_currency_added(&env, token, index);
        }
        Ok(index)
    }

    pub fn currency_at(env: Env, index: u32) -> Result<Address, ContractError> {
        ledger::currency_of(&env, index)
    }

    pub fn currency_index_of(env: Env, token: Address) -> Option<u32> {
        ledger::currency_index(&env, &token)
    }

    pub fn currency_count(env: Env) -> u32 {
        ledger::currency_count(&env)
    }

    // ── Balances ────────────────────────────────────────────────────────────

    /// Pull `amount` of `token` from `from` into its withdrawable balance.
    pub fn deposit(
        env: Env,
        from: Address,
        token: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        config::require_initialized(&env)?;
        from.require_auth();
        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }
        ledger::pull_in(&env, &token, &from, amount);
        ledger::credit(&env, &from, &token, amount);
        events::publish_deposited(&env, from, token, amount);
        Ok(())
    }

    /// Withdraw `amount` of `token`; `0` withdraws the whole balance.
    pub fn withdraw(
        env: Env,
        owner: Address,
        token: Address,
        amount: i128,
    ) -> Result<i128, ContractError> {
        config::require_initialized(&env)?;
        owner.require_auth();
        let amount = if amount == 0 {
            ledger::withdrawable(&env, &owner, &token)
        } else {
            amount
        };
        ledger::debit(&env, &owner, &token, amount)?;
        ledger::transfer_out(&env, &token, &owner, amount);
        events::publish_withdrawn(&env, owner, token, amount);
        Ok(amount)
    }

    pub fn withdrawable_of(env: Env, account: Address, token: Address) -> i128 {
        ledger::withdrawable(&env, &account, &token)
    }

    pub fn attributed_of(env: Env, token: Address) -> i128 {
        ledger::attributed(&env, &token)
    }

    pub fn unattributed_of(env: Env, token: Address) -> i128 {
        ledger::unattributed(&env, &token)
    }

    /// Hand `amount` of the unattributed pool to `recipient`. Anyone may
    /// call; `0` takes the whole pool and larger requests are clamped.
    pub fn collect_unattributed(
        env: Env,
        token: Address,
        to_withdrawable: bool,
        recipient: Address,
        amount: i128,
    ) -> Result<i128, ContractError> {
        config::require_initialized(&env)?;
        let amount = ledger::collectable(&env, &token, amount)?;
        ledger::collect(&env, &token, &recipient, amount, to_withdrawable);
        events::publish_collected(&env, token, recipient, amount, to_withdrawable);
        Ok(amount)
    }

    /// Like `collect_unattributed`, for `bps` basis points of the pool.
    pub fn collect_unattributed_percent(
        env: Env,
        token: Address,
        to_withdrawable: bool,
        recipient: Address,
        bps: u32,
    ) -> Result<i128, ContractError> {
        config::require_initialized(&env)?;
        let amount = ledger::collectable_percent(&env, &token, bps);
        ledger::collect(&env, &token, &recipient, amount, to_withdrawable);
        events::publish_collected(&env, token, recipient, amount, to_withdrawable);
        Ok(amount)
    }

    // ── Starting stakes ─────────────────────────────────────────────────────

    /// Pull `amount` of the staked token from `owner` and lock it for
    /// `days` under `settings`. Returns the new stake id.
    pub fn stake_start(
        env: Env,
        owner: Address,
        amount: i128,
        days: u32,
        settings: Settings,
    ) -> Result<u64, ContractError> {
        owner.require_auth();
        let encoded = Self::checked_encoding(&env, &settings)?;
        let ctx = Context::load(&env)?;
        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }
        ledger::pull_in(&env, &ctx.token, &owner, amount);
        lifecycle::start(&ctx, &owner, amount, days, &encoded, None)
    }

    /// Stake from `owner`'s withdrawable balance of the staked token.
    pub fn stake_start_from_withdrawable(
        env: Env,
        owner: Address,
        amount: i128,
        days: u32,
        settings: Settings,
    ) -> Result<u64, ContractError> {
        owner.require_auth();
        let encoded = Self::checked_encoding(&env, &settings)?;
        let ctx = Context::load(&env)?;
        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }
        ledger::debit(&env, &owner, &ctx.token, amount)?;
        lifecycle::start(&ctx, &owner, amount, days, &encoded, None)
    }

    /// Stake from the unattributed pool of the staked token. `0` stakes the
    /// whole pool; larger requests are clamped.
    pub fn stake_start_from_unattributed(
        env: Env,
        owner: Address,
        amount: i128,
        days: u32,
        settings: Settings,
    ) -> Result<u64, ContractError> {
        owner.require_auth();
        let encoded = Self::checked_encoding(&env, &settings)?;
        let ctx = Context::load(&env)?;
        let amount = ledger::collectable(&env, &ctx.token, amount)?;
        lifecycle::start(&ctx, &owner, amount, days, &encoded, None)
    }

    // ── Settings ────────────────────────────────────────────────────────────

    pub fn update_settings(
        env: Env,
        owner: Address,
        stake_id: u64,
        settings: Settings,
    ) -> Result<(), ContractError> {
        config::require_initialized(&env)?;
        owner.require_auth();
        registry::verify_ownership(&env, stake_id, &owner)?;
        let encoded = Self::checked_encoding(&env, &settings)?;
        registry::store_settings(&env, stake_id, &encoded);
        events::publish_settings_updated(&env, stake_id, encoded);
        Ok(())
    }

    /// Decoded settings of `stake_id`; all zero for unknown stakes.
    pub fn settings_of(env: Env, stake_id: u64) -> Settings {
        settings::decode(&registry::encoded_settings(&env, stake_id))
    }

    pub fn encoded_settings_of(env: Env, stake_id: u64) -> BytesN<64> {
        registry::encoded_settings(&env, stake_id)
    }

    pub fn stake_info(env: Env, stake_id: u64) -> Option<StakeInfo> {
        registry::info(&env, stake_id)
    }

    pub fn owner_of(env: Env, stake_id: u64) -> Option<Address> {
        registry::owner_of(&env, stake_id)
    }

    // ── Ending stakes ───────────────────────────────────────────────────────

    /// End a stake as its owner. Penalties apply before maturity; the stake
    /// never restarts and everything is credited to the owner.
    pub fn stake_end(env: Env, owner: Address, stake_id: u64) -> Result<i128, ContractError> {
        owner.require_auth();
        let ctx = Context::load(&env)?;
        lifecycle::end_by_owner(&ctx, &owner, stake_id)
    }

    /// End a stake under its owner's consent. Ineligible stakes come back
    /// as [`EndOutcome::Skipped`].
    pub fn stake_end_by_consent(
        env: Env,
        caller: Address,
        stake_id: u64,
    ) -> Result<EndOutcome, ContractError> {
        caller.require_auth();
        let ctx = Context::load(&env)?;
        lifecycle::end_by_consent(&ctx, &caller, stake_id)
    }

    /// Consent-end each stake in order, aborting everything after
    /// `deadline`.
    pub fn stake_end_by_consent_for_many(
        env: Env,
        caller: Address,
        stake_ids: Vec<u64>,
        deadline: u64,
    ) -> Result<Vec<EndOutcome>, ContractError> {
        caller.require_auth();
        gates::check_deadline(&env, deadline)?;
        let ctx = Context::load(&env)?;
        let mut outcomes = Vec::new(&env);
        for stake_id in stake_ids.iter() {
            outcomes.push_back(lifecycle::end_by_consent(&ctx, &caller, stake_id)?);
        }
        Ok(outcomes)
    }

    // ── Rewards and accounting ──────────────────────────────────────────────

    pub fn mint_rewards(
        env: Env,
        caller: Address,
        stake_ids: Vec<u64>,
    ) -> Result<i128, ContractError> {
        caller.require_auth();
        let ctx = Context::load(&env)?;
        lifecycle::mint_rewards(&ctx, &caller, &stake_ids)
    }

    /// Best-effort accounting pass. Returns how many stakes settled.
    pub fn good_accounting(env: Env, stake_ids: Vec<u64>) -> Result<u32, ContractError> {
        let ctx = Context::load(&env)?;
        Ok(lifecycle::good_accounting(&ctx, &stake_ids))
    }

    // ── Transfers ───────────────────────────────────────────────────────────

    pub fn transfer_stake(
        env: Env,
        caller: Address,
        from: Address,
        to: Address,
        stake_id: u64,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        lifecycle::transfer(&env, &caller, &from, &to, stake_id)
    }

    /// Transfer to a contract implementing `on_stake_received`. Errors from
    /// the receiver abort the transfer unchanged.
    pub fn safe_transfer_stake(
        env: Env,
        caller: Address,
        from: Address,
        to: Address,
        stake_id: u64,
        data: Bytes,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        lifecycle::safe_transfer(&env, &caller, &from, &to, stake_id, &data)
    }

    pub fn set_operator(
        env: Env,
        owner: Address,
        operator: Address,
        approved: bool,
    ) -> Result<(), ContractError> {
        config::require_initialized(&env)?;
        owner.require_auth();
        registry::set_operator(&env, &owner, &operator, approved);
        events::publish_operator_set(&env, owner, operator, approved);
        Ok(())
    }

    pub fn is_operator(env: Env, owner: Address, operator: Address) -> bool {
        registry::is_operator(&env, &owner, &operator)
    }

    // ── Tips ────────────────────────────────────────────────────────────────

    /// Escrow `amount` from the owner's withdrawable balance as a tip for
    /// whoever ends `stake_id`. Returns the entry's index.
    pub fn add_tip(
        env: Env,
        owner: Address,
        stake_id: u64,
        currency_index: u32,
        amount: i128,
        linear: Linear,
    ) -> Result<u32, ContractError> {
        owner.require_auth();
        let token = Self::checked_tip(&env, stake_id, currency_index, amount, &linear)?;
        registry::verify_ownership(&env, stake_id, &owner)?;
        ledger::lock(&env, &owner, &token, amount)?;
        Ok(Self::push_tip(&env, stake_id, token, currency_index, amount, linear))
    }

    /// Pull `amount` from `depositor` and escrow it as a tip on `stake_id`.
    /// Anyone may tip any live stake.
    pub fn deposit_and_add_tip(
        env: Env,
        depositor: Address,
        stake_id: u64,
        currency_index: u32,
        amount: i128,
        linear: Linear,
    ) -> Result<u32, ContractError> {
        depositor.require_auth();
        let token = Self::checked_tip(&env, stake_id, currency_index, amount, &linear)?;
        ledger::pull_in(&env, &token, &depositor, amount);
        ledger::attribute(&env, &token, amount);
        Ok(Self::push_tip(&env, stake_id, token, currency_index, amount, linear))
    }

    /// Remove tips by their current indices and refund the escrow to the
    /// owner. Returns how many were removed.
    pub fn remove_tips(
        env: Env,
        owner: Address,
        stake_id: u64,
        indices: Vec<u32>,
    ) -> Result<u32, ContractError> {
        config::require_initialized(&env)?;
        owner.require_auth();
        registry::verify_ownership(&env, stake_id, &owner)?;
        tips::remove(&env, stake_id, &owner, &indices)
    }

    pub fn remove_all_tips(env: Env, owner: Address, stake_id: u64) -> Result<u32, ContractError> {
        config::require_initialized(&env)?;
        owner.require_auth();
        registry::verify_ownership(&env, stake_id, &owner)?;
        let mut indices = Vec::new(&env);
        for index in 0..tips::tips_of(&env, stake_id).len() {
            indices.push_back(index);
        }
        tips::remove(&env, stake_id, &owner, &indices)
    }

    pub fn tips_of(env: Env, stake_id: u64) -> Vec<TipEntry> {
        tips::tips_of(&env, stake_id)
    }

    // ── Batch gates ─────────────────────────────────────────────────────────

    pub fn check_deadline(env: Env, deadline: u64) -> Result<(), ContractError> {
        gates::check_deadline(&env, deadline)
    }

    pub fn check_ledger_closed(env: Env, sequence: u32) -> Result<(), ContractError> {
        gates::check_ledger_closed(&env, sequence)
    }

    // ── Codec and resolver views ────────────────────────────────────────────

    pub fn default_settings(_env: Env) -> Settings {
        settings::standard_settings()
    }

    pub fn encode_settings(env: Env, settings: Settings) -> BytesN<64> {
        settings::encode(&env, &settings)
    }

    pub fn decode_settings(_env: Env, encoded: BytesN<64>) -> Settings {
        settings::decode(&encoded)
    }

    pub fn decrement_copy_iterations(env: Env, encoded: BytesN<64>) -> BytesN<64> {
        settings::decrement_copy_iterations(&env, &encoded)
    }

    /// Consent byte of `abilities`, widened to `u32`.
    pub fn encode_consent_abilities(_env: Env, abilities: ConsentAbilities) -> u32 {
        consent::encode(&abilities) as u32
    }

    /// Reads the low byte of `encoded` only.
    pub fn decode_consent_abilities(_env: Env, encoded: u32) -> ConsentAbilities {
        consent::decode((encoded & 0xFF) as u8)
    }

    pub fn encode_tip(env: Env, tip: TipEntry) -> BytesN<64> {
        tips::encode_tip(&env, &tip)
    }

    pub fn decode_tip(_env: Env, encoded: BytesN<64>) -> TipEntry {
        tips::decode_tip(&encoded)
    }

    pub fn compute_magnitude(
        _env: Env,
        limit: i128,
        linear: Linear,
        total: i128,
        stake: StakeSnapshot,
        current_day: u32,
    ) -> Result<i128, ContractError> {
        magnitude::compute_magnitude(limit, &linear, total, &stake, current_day)
    }

    pub fn compute_day_magnitude(
        _env: Env,
        method: Method,
        magnitude: u32,
        stake: StakeSnapshot,
        current_day: u32,
    ) -> u32 {
        magnitude::compute_day_magnitude(method, magnitude, &stake, current_day)
    }

    // ── Internal helpers ────────────────────────────────────────────────────

    fn checked_encoding(env: &Env, settings: &Settings) -> Result<BytesN<64>, ContractError> {
        settings::validate(settings)?;
        Ok(settings::encode(env, settings))
    }

    /// Common tip checks; returns the tip's token.
    fn checked_tip(
        env: &Env,
        stake_id: u64,
        currency_index: u32,
        amount: i128,
        linear: &Linear,
    ) -> Result<Address, ContractError> {
        config::require_initialized(env)?;
        if registry::info(env, stake_id).is_none() {
            return Err(ContractError::NotAllowed);
        }
        if amount <= 0 || currency_index > u16::MAX as u32 {
            return Err(ContractError::InvalidInput);
        }
        curve::validate(linear)?;
        ledger::currency_of(env, currency_index)
    }

    fn push_tip(
        env: &Env,
        stake_id: u64,
        token: Address,
        currency_index: u32,
        amount: i128,
        linear: Linear,
    ) -> u32 {
        let tip = TipEntry {
            currency_index,
            amount,
            linear,
        };
        let encoded = tips::encode_tip(env, &tip);
        let index = tips::push(env, stake_id, tip);
        events::publish_tip_added(env, stake_id, token, index, encoded);
        index
    }
}

#[cfg(test)]
mod test_lifecycle;
