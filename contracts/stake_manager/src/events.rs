#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, BytesN, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the manager is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub stakeable: Address,
    pub reward_minter: Address,
    pub timestamp: u64,
}

/// Fired when a token joins the currency list.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CurrencyAddedEvent {
    pub token: Address,
    pub index: u32,
    pub timestamp: u64,
}

/// Fired whenever the manager opens a stake, including restarts.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeStartedEvent {
    pub stake_id: u64,
    pub owner: Address,
    pub amount: i128,
    pub days: u32,
    /// The stake this one was restarted from, if any.
    pub previous_stake_id: Option<u64>,
    pub timestamp: u64,
}

/// Fired with the full encoded word every time a stake's settings are set.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SettingsUpdatedEvent {
    pub stake_id: u64,
    pub encoded: BytesN<64>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeEndedEvent {
    pub stake_id: u64,
    pub owner: Address,
    pub ender: Address,
    /// Amount the primitive paid out.
    pub proceeds: i128,
    pub tip: i128,
    pub next_stake_id: Option<u64>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TipAddedEvent {
    pub stake_id: u64,
    pub token: Address,
    pub index: u32,
    pub encoded: BytesN<64>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TipRemovedEvent {
    pub stake_id: u64,
    pub token: Address,
    pub index: u32,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TipPaidEvent {
    pub stake_id: u64,
    pub token: Address,
    pub recipient: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeTransferredEvent {
    pub stake_id: u64,
    pub from: Address,
    pub to: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OperatorSetEvent {
    pub owner: Address,
    pub operator: Address,
    pub approved: bool,
    pub timestamp: u64,
}

/// Deposit into, or withdrawal from, a withdrawable balance.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BalanceMovedEvent {
    pub account: Address,
    pub token: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when someone claims part of the unattributed pool.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollectedEvent {
    pub token: Address,
    pub recipient: Address,
    pub amount: i128,
    pub to_withdrawable: bool,
    pub timestamp: u64,
}

/// Fired when the secondary reward is minted for a stake.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardMintedEvent {
    pub stake_id: u64,
    pub recipient: Address,
    pub amount: i128,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, stakeable: Address, reward_minter: Address) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            stakeable,
            reward_minter,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_currency_added(env: &Env, token: Address, index: u32) {
    env.events().publish(
        (symbol_short!("CURRENCY"), token.clone()),
        CurrencyAddedEvent {
            token,
            index,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_stake_started(
    env: &Env,
    stake_id: u64,
    owner: Address,
    amount: i128,
    days: u32,
    previous_stake_id: Option<u64>,
) {
    env.events().publish(
        (symbol_short!("STK_START"), owner.clone()),
        StakeStartedEvent {
            stake_id,
            owner,
            amount,
            days,
            previous_stake_id,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_settings_updated(env: &Env, stake_id: u64, encoded: BytesN<64>) {
    env.events().publish(
        (symbol_short!("SETTINGS"), stake_id),
        SettingsUpdatedEvent {
            stake_id,
            encoded,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_stake_ended(
    env: &Env,
    stake_id: u64,
    owner: Address,
    ender: Address,
    proceeds: i128,
    tip: i128,
    next_stake_id: Option<u64>,
) {
    env.events().publish(
        (symbol_short!("STK_END"), owner.clone()),
        StakeEndedEvent {
            stake_id,
            owner,
            ender,
            proceeds,
            tip,
            next_stake_id,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_tip_added(
    env: &Env,
    stake_id: u64,
    token: Address,
    index: u32,
    encoded: BytesN<64>,
) {
    env.events().publish(
        (symbol_short!("TIP_ADD"), stake_id),
        TipAddedEvent {
            stake_id,
            token,
            index,
            encoded,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_tip_removed(env: &Env, stake_id: u64, token: Address, index: u32, amount: i128) {
    env.events().publish(
        (symbol_short!("TIP_RM"), stake_id),
        TipRemovedEvent {
            stake_id,
            token,
            index,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_tip_paid(env: &Env, stake_id: u64, token: Address, recipient: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("TIP_PAID"), recipient.clone()),
        TipPaidEvent {
            stake_id,
            token,
            recipient,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_stake_transferred(env: &Env, stake_id: u64, from: Address, to: Address) {
    env.events().publish(
        (symbol_short!("TRANSFER"), from.clone(), to.clone()),
        StakeTransferredEvent {
            stake_id,
            from,
            to,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_operator_set(env: &Env, owner: Address, operator: Address, approved: bool) {
    env.events().publish(
        (symbol_short!("OPERATOR"), owner.clone()),
        OperatorSetEvent {
            owner,
            operator,
            approved,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_deposited(env: &Env, account: Address, token: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), account.clone()),
        BalanceMovedEvent {
            account,
            token,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(env: &Env, account: Address, token: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAW"), account.clone()),
        BalanceMovedEvent {
            account,
            token,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_collected(
    env: &Env,
    token: Address,
    recipient: Address,
    amount: i128,
    to_withdrawable: bool,
) {
    env.events().publish(
        (symbol_short!("COLLECT"), recipient.clone()),
        CollectedEvent {
            token,
            recipient,
            amount,
            to_withdrawable,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_minted(env: &Env, stake_id: u64, recipient: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("MINTED"), recipient.clone()),
        RewardMintedEvent {
            stake_id,
            recipient,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}
