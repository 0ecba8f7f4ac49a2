//! Start, end and restart of custodied stakes.
//!
//! A consent end runs in five steps:
//!
//! 1. Eligibility: ghosts, stakes without `can_end` and immature stakes
//!    without `can_end_early` are skipped with no state change.
//! 2. External end: the optional reward mint, then the primitive's
//!    `end_stake`. Failures from either surface unchanged.
//! 3. Splits: the settings tip and tip list go to the ender, then the
//!    withdrawable share, then the new-stake share of what is left.
//! 4. Restart or settle.
//! 5. Records for the ended stake are cleared and events emitted.

use common::{
    RewardMinterClient, StakeReceiverClient, StakeableClient, MAX_STAKE_DAYS, STAKE_RECEIVED,
};
use soroban_sdk::{
    Executable, contracttype, log, symbol_short, token, Address, Bytes, BytesN, Env,
    Symbol, Vec,
};

use crate::config::{self, REWARD_CURRENCY, STAKED_CURRENCY};
use crate::errors::ContractError;
use crate::events;
use crate::ledger;
use crate::magnitude::{compute_day_magnitude, compute_magnitude};
use crate::registry::{self, StakeInfo};
use crate::settings;
use crate::tips;

/// What a consent end did with a stake's proceeds.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EndReceipt {
    pub stake_id: u64,
    pub owner: Address,
    /// Amount the primitive paid out.
    pub proceeds: i128,
    /// Settings tip credited to the ender.
    pub tip: i128,
    /// Secondary reward minted as part of the end.
    pub reward: i128,
    /// Amount credited or sent to the owner.
    pub owner_amount: i128,
    pub restaked: i128,
    pub next_stake_id: Option<u64>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EndOutcome {
    /// The stake was not eligible; nothing changed.
    Skipped,
    Ended(EndReceipt),
}

/// Addresses and clients every lifecycle step needs.
pub struct Context<'a> {
    pub env: &'a Env,
    pub manager: Address,
    pub stakeable: StakeableClient<'a>,
    /// Token the primitive stakes.
    pub token: Address,
}

impl<'a> Context<'a> {
    pub fn load(env: &'a Env) -> Result<Self, ContractError> {
        let stakeable = config::stakeable(env)?;
        Ok(Context {
            env,
            manager: env.current_contract_address(),
            stakeable: StakeableClient::new(env, &stakeable),
            token: ledger::currency_of(env, STAKED_CURRENCY)?,
        })
    }

    fn current_day(&self) -> u32 {
        self.stakeable.current_day()
    }
}

/// Lock `amount` of tokens the manager already holds into a new stake for
/// `owner` and register it with `encoded` settings.
pub fn start(
    ctx: &Context,
    owner: &Address,
    amount: i128,
    days: u32,
    encoded: &BytesN<64>,
    previous_stake_id: Option<u64>,
) -> Result<u64, ContractError> {
    if amount <= 0 || days == 0 || days > MAX_STAKE_DAYS {
        return Err(ContractError::InvalidInput);
    }
    let env = ctx.env;

    token::Client::new(env, &ctx.token).approve(
        &ctx.manager,
        &ctx.stakeable.address,
        &amount,
        &env.ledger().sequence(),
    );
    let stake_id = ctx.stakeable.start_stake(&ctx.manager, &amount, &days);
    let custody_index = ctx.stakeable.stake_count(&ctx.manager).saturating_sub(1);

    registry::register_start(env, stake_id, custody_index, owner, encoded);

    events::publish_stake_started(env, stake_id, owner.clone(), amount, days, previous_stake_id);
    events::publish_settings_updated(env, stake_id, encoded.clone());

    Ok(stake_id)
}

fn mint_reward(
    ctx: &Context,
    stake_id: u64,
    info: &StakeInfo,
    recipient: &Address,
) -> Result<i128, ContractError> {
    let env = ctx.env;
    let minter = RewardMinterClient::new(env, &config::reward_minter(env)?);
    let minted = minter.mint_native(&ctx.manager, &info.custody_index, &stake_id);
    if minted > 0 {
        let reward_token = ledger::currency_of(env, REWARD_CURRENCY)?;
        ledger::credit(env, recipient, &reward_token, minted);
        events::publish_reward_minted(env, stake_id, recipient.clone(), minted);
    }
    Ok(minted)
}

fn pay_owner(ctx: &Context, owner: &Address, amount: i128, send: bool) {
    if send {
        ledger::transfer_out(ctx.env, &ctx.token, owner, amount);
    } else {
        ledger::credit(ctx.env, owner, &ctx.token, amount);
    }
}

fn skip(env: &Env, reason: Symbol, stake_id: u64) -> Result<EndOutcome, ContractError> {
    log!(env, "stake end skipped", reason, stake_id);
    Ok(EndOutcome::Skipped)
}

/// End `stake_id` on its owner's standing instructions.
pub fn end_by_consent(
    ctx: &Context,
    ender: &Address,
    stake_id: u64,
) -> Result<EndOutcome, ContractError> {
    let env = ctx.env;

    let info = match registry::info(env, stake_id) {
        Some(info) => info,
        None => return skip(env, symbol_short!("unknown"), stake_id),
    };
    let encoded = registry::encoded_settings(env, stake_id);
    let settings = settings::decode(&encoded);
    let consent = settings.consent_abilities;
    if !consent.can_end {
        return skip(env, symbol_short!("no_consnt"), stake_id);
    }
    let stake = registry::verify_custodian(env, &ctx.stakeable, stake_id, &info)?;
    let current_day = ctx.current_day();
    if !stake.is_mature(current_day) && !consent.can_end_early {
        return skip(env, symbol_short!("immature"), stake_id);
    }

    let reward = if consent.can_mint_reward_at_end {
        let recipient = if consent.mint_bonus_at_end {
            ender
        } else {
            &info.owner
        };
        mint_reward(ctx, stake_id, &info, recipient)?
    } else {
        0
    };
    let proceeds = ctx
        .stakeable
        .end_stake(&ctx.manager, &info.custody_index, &stake_id)
        .max(0);

    registry::reindex_after_removal(env, &ctx.stakeable, info.custody_index);
    registry::clear(env, stake_id);
    let tip_list = tips::take_all(env, stake_id);

    let tip = compute_magnitude(proceeds, &settings.tip, proceeds, &stake, current_day)?;
    if tip > 0 {
        ledger::credit(env, ender, &ctx.token, tip);
        events::publish_tip_paid(env, stake_id, ctx.token.clone(), ender.clone(), tip);
    }
    let residual_tips =
        tips::realize(env, stake_id, &tip_list, ender, proceeds, &stake, current_day)?;

    let remaining = proceeds - tip;
    let withdrawable =
        compute_magnitude(remaining, &settings.withdrawable, remaining, &stake, current_day)?;
    let after_withdrawable = remaining - withdrawable;
    let (restake, days) = if settings.copy_iterations != 0 {
        (
            compute_magnitude(
                after_withdrawable,
                &settings.new_stake,
                after_withdrawable,
                &stake,
                current_day,
            )?,
            compute_day_magnitude(
                settings.new_stake_days_method,
                settings.new_stake_days_magnitude,
                &stake,
                current_day,
            ),
        )
    } else {
        (0, 0)
    };

    let send = consent.should_send_to_owner;
    let (owner_amount, restaked, next_stake_id) = if restake > 0 && days > 0 {
        pay_owner(ctx, &info.owner, withdrawable, send);
        let next_encoded = settings::decrement_copy_iterations(env, &encoded);
        let next = start(ctx, &info.owner, restake, days, &next_encoded, Some(stake_id))?;
        if consent.copy_external_tips {
            tips::carry(env, next, &residual_tips);
        } else {
            tips::refund(env, &info.owner, &residual_tips)?;
        }
        (withdrawable, restake, Some(next))
    } else {
        tips::refund(env, &info.owner, &residual_tips)?;
        pay_owner(ctx, &info.owner, remaining, send);
        (remaining, 0, None)
    };

    events::publish_stake_ended(
        env,
        stake_id,
        info.owner.clone(),
        ender.clone(),
        proceeds,
        tip,
        next_stake_id,
    );

    Ok(EndOutcome::Ended(EndReceipt {
        stake_id,
        owner: info.owner,
        proceeds,
        tip,
        reward,
        owner_amount,
        restaked,
        next_stake_id,
    }))
}

/// End `stake_id` at the owner's request, whatever its settings say.
/// Tip escrow is refunded and all proceeds are credited to the owner.
pub fn end_by_owner(ctx: &Context, owner: &Address, stake_id: u64) -> Result<i128, ContractError> {
    let env = ctx.env;
    let info = registry::info(env, stake_id).ok_or(ContractError::StakeNotEndable)?;
    if info.owner != *owner {
        return Err(ContractError::StakeNotOwned);
    }
    registry::verify_custodian(env, &ctx.stakeable, stake_id, &info)?;

    let proceeds = ctx
        .stakeable
        .end_stake(&ctx.manager, &info.custody_index, &stake_id)
        .max(0);

    registry::reindex_after_removal(env, &ctx.stakeable, info.custody_index);
    registry::clear(env, stake_id);
    let tip_list = tips::take_all(env, stake_id);
    tips::refund(env, owner, &tip_list)?;
    ledger::credit(env, owner, &ctx.token, proceeds);

    events::publish_stake_ended(env, stake_id, owner.clone(), owner.clone(), proceeds, 0, None);
    Ok(proceeds)
}

/// Mint the secondary reward for each stake `caller` may mint for. The
/// owner always may; anyone else needs `can_mint_reward`.
pub fn mint_rewards(
    ctx: &Context,
    caller: &Address,
    stake_ids: &Vec<u64>,
) -> Result<i128, ContractError> {
    let env = ctx.env;
    let mut total = 0i128;
    for stake_id in stake_ids.iter() {
        let info = match registry::info(env, stake_id) {
            Some(info) => info,
            None => continue,
        };
        let consent = settings::consent_of(&registry::encoded_settings(env, stake_id));
        if *caller != info.owner && !consent.can_mint_reward {
            continue;
        }
        registry::verify_custodian(env, &ctx.stakeable, stake_id, &info)?;
        total = total.saturating_add(mint_reward(ctx, stake_id, &info, &info.owner)?);
    }
    Ok(total)
}

/// Ask the primitive to settle accounting for each stake. Failures are
/// ignored; unknown or moved stakes are passed over.
pub fn good_accounting(ctx: &Context, stake_ids: &Vec<u64>) -> u32 {
    let env = ctx.env;
    let mut settled = 0u32;
    for stake_id in stake_ids.iter() {
        let info = match registry::info(env, stake_id) {
            Some(info) => info,
            None => continue,
        };
        if registry::verify_custodian(env, &ctx.stakeable, stake_id, &info).is_err() {
            continue;
        }
        let result =
            ctx.stakeable
                .try_good_accounting(&ctx.manager, &info.custody_index, &stake_id);
        if matches!(result, Ok(Ok(()))) {
            settled += 1;
        }
    }
    settled
}

/// Move custody of `stake_id` from `from` to `to`.
pub fn transfer(
    env: &Env,
    caller: &Address,
    from: &Address,
    to: &Address,
    stake_id: u64,
) -> Result<(), ContractError> {
    registry::verify_ownership(env, stake_id, from)?;
    if !registry::may_act_for(env, from, caller) {
        return Err(ContractError::OnlyOwner);
    }
    let consent = settings::consent_of(&registry::encoded_settings(env, stake_id));
    if !consent.is_transferable {
        return Err(ContractError::NotAllowed);
    }
    registry::set_owner(env, stake_id, to)?;
    events::publish_stake_transferred(env, stake_id, from.clone(), to.clone());
    Ok(())
}

/// [`transfer`], then require `to` to acknowledge the stake when it is a
/// contract. Accounts take the stake as a plain transfer.
pub fn safe_transfer(
    env: &Env,
    caller: &Address,
    from: &Address,
    to: &Address,
    stake_id: u64,
    data: &Bytes,
) -> Result<(), ContractError> {
    transfer(env, caller, from, to, stake_id)?;
    if !matches!(to.executable(), Some(Executable::Wasm(_))) {
        return Ok(());
    }
    let ack = StakeReceiverClient::new(env, to).on_stake_received(caller, from, &stake_id, data);
    if ack != STAKE_RECEIVED {
        return Err(ContractError::InvalidStakeReceiver);
    }
    Ok(())
}
