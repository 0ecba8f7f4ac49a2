#![allow(clippy::unwrap_used, clippy::panic, clippy::arithmetic_side_effects)]

extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events, Ledger as _},
    vec, Address, IntoVal,
};

use crate::curve::Component;
use crate::test::{
    advance_days, balance, consenting, setup, start_funded, Harness, DAYS, MATURE_PAYOUT,
    PRINCIPAL, YIELD_BPS,
};
use crate::{ConsentAbilities, ContractError, EndOutcome, EndReceipt, Linear, Method, Settings};

fn ended(outcome: EndOutcome) -> EndReceipt {
    match outcome {
        EndOutcome::Ended(receipt) => receipt,
        EndOutcome::Skipped => panic!("expected the stake to end"),
    }
}

fn mature(h: &Harness) {
    advance_days(&h.env, DAYS as u64 + 1);
}

fn restarting(copies: u32) -> Settings {
    let mut settings = consenting(ConsentAbilities::end_only());
    settings.copy_iterations = copies;
    settings
}

// ── Basic lifecycle ──────────────────────────────────────────────────────────

#[test]
fn test_mature_end_settles_to_owner() {
    let h = setup();
    let (owner, stake_id) = start_funded(&h, &h.client.default_settings());
    let ender = Address::generate(&h.env);
    mature(&h);

    let receipt = ended(h.client.stake_end_by_consent(&ender, &stake_id));
    assert_eq!(receipt.stake_id, stake_id);
    assert_eq!(receipt.owner, owner);
    assert_eq!(receipt.proceeds, MATURE_PAYOUT);
    assert!(receipt.proceeds >= PRINCIPAL);
    assert_eq!(receipt.tip, 0);
    assert_eq!(receipt.owner_amount, MATURE_PAYOUT);
    assert_eq!(receipt.next_stake_id, None);

    let all = h.env.events().all();
    let event = crate::test::last_event(&h.env, &all);
    assert_eq!(event.1, (symbol_short!("STK_END"), owner.clone()).into_val(&h.env));

    assert_eq!(h.client.owner_of(&stake_id), None);
    assert_eq!(h.client.withdrawable_of(&owner, &h.token), MATURE_PAYOUT);
    assert_eq!(h.client.withdrawable_of(&ender, &h.token), 0);
    assert_eq!(h.client.attributed_of(&h.token), MATURE_PAYOUT);
    assert_eq!(h.client.unattributed_of(&h.token), 0);
    assert_eq!(h.primitive.stake_count(&h.manager), 0);

    // a second end on the same id is a no-op
    assert_eq!(
        h.client.stake_end_by_consent(&ender, &stake_id),
        EndOutcome::Skipped
    );
    assert_eq!(h.client.withdrawable_of(&owner, &h.token), MATURE_PAYOUT);
}

#[test]
fn test_send_to_owner_transfers_out() {
    let h = setup();
    let settings = consenting(ConsentAbilities {
        can_end: true,
        should_send_to_owner: true,
        ..Default::default()
    });
    let (owner, stake_id) = start_funded(&h, &settings);
    mature(&h);

    ended(h.client.stake_end_by_consent(&Address::generate(&h.env), &stake_id));
    assert_eq!(balance(&h.env, &h.token, &owner), MATURE_PAYOUT);
    assert_eq!(h.client.withdrawable_of(&owner, &h.token), 0);
    assert_eq!(h.client.attributed_of(&h.token), 0);
}

// ── Eligibility ──────────────────────────────────────────────────────────────

#[test]
fn test_immature_end_is_skipped() {
    let h = setup();
    let (owner, stake_id) = start_funded(&h, &h.client.default_settings());
    advance_days(&h.env, 5);

    let outcome = h
        .client
        .stake_end_by_consent(&Address::generate(&h.env), &stake_id);
    assert_eq!(outcome, EndOutcome::Skipped);
    assert_eq!(h.client.owner_of(&stake_id), Some(owner));
    assert_eq!(h.primitive.stake_count(&h.manager), 1);
}

#[test]
fn test_end_without_consent_is_skipped() {
    let h = setup();
    let (_owner, stake_id) = start_funded(&h, &consenting(ConsentAbilities::default()));
    mature(&h);

    assert_eq!(
        h.client
            .stake_end_by_consent(&Address::generate(&h.env), &stake_id),
        EndOutcome::Skipped
    );
    assert_eq!(h.primitive.stake_count(&h.manager), 1);
}

#[test]
fn test_ghost_end_is_skipped() {
    let h = setup();
    assert_eq!(
        h.client
            .stake_end_by_consent(&Address::generate(&h.env), &12_345),
        EndOutcome::Skipped
    );
}

#[test]
fn test_early_end_with_consent() {
    let h = setup();
    let settings = consenting(ConsentAbilities {
        can_end: true,
        can_end_early: true,
        ..Default::default()
    });
    let (owner, stake_id) = start_funded(&h, &settings);
    advance_days(&h.env, 6);

    // five of ten days served: a quarter of principal forfeited
    let receipt = ended(
        h.client
            .stake_end_by_consent(&Address::generate(&h.env), &stake_id),
    );
    assert_eq!(receipt.proceeds, 75_000);
    assert_eq!(h.client.withdrawable_of(&owner, &h.token), 75_000);
}

#[test]
fn test_stake_moved_out_of_custody() {
    let h = setup();
    let (_owner, stake_id) = start_funded(&h, &h.client.default_settings());
    mature(&h);

    // the primitive lists the stake no more, but the manager still has it
    h.primitive.end_stake(&h.manager, &0, &stake_id);

    match h
        .client
        .try_stake_end_by_consent(&Address::generate(&h.env), &stake_id)
    {
        Err(Ok(e)) => assert_eq!(e, ContractError::StakeNotCustodied),
        _ => unreachable!("Expected StakeNotCustodied error"),
    }
}

// ── Tips from settings ───────────────────────────────────────────────────────

#[test]
fn test_fixed_tip_goes_to_ender() {
    let h = setup();
    let mut settings = h.client.default_settings();
    settings.tip = Linear::fixed(100);
    let (owner, stake_id) = start_funded(&h, &settings);
    let ender = Address::generate(&h.env);
    mature(&h);

    let receipt = ended(h.client.stake_end_by_consent(&ender, &stake_id));
    assert_eq!(receipt.tip, 100);
    assert_eq!(receipt.owner_amount, MATURE_PAYOUT - 100);
    assert_eq!(h.client.withdrawable_of(&ender, &h.token), 100);
    assert_eq!(h.client.withdrawable_of(&owner, &h.token), MATURE_PAYOUT - 100);
}

#[test]
fn test_tip_is_capped_by_proceeds() {
    let h = setup();
    let mut settings = h.client.default_settings();
    settings.tip = Linear::fixed(i64::MAX);
    let (owner, stake_id) = start_funded(&h, &settings);
    let ender = Address::generate(&h.env);
    mature(&h);

    let receipt = ended(h.client.stake_end_by_consent(&ender, &stake_id));
    assert_eq!(receipt.tip, MATURE_PAYOUT);
    assert_eq!(h.client.withdrawable_of(&owner, &h.token), 0);
}

// ── Restarts ─────────────────────────────────────────────────────────────────

#[test]
fn test_restart_counts_down_to_settle() {
    let h = setup();
    let (owner, stake_id) = start_funded(&h, &restarting(1));
    let ender = Address::generate(&h.env);
    mature(&h);

    let first = ended(h.client.stake_end_by_consent(&ender, &stake_id));
    let next = first.next_stake_id.unwrap();
    assert_ne!(next, stake_id);
    assert_eq!(first.restaked, MATURE_PAYOUT);
    assert_eq!(first.owner_amount, 0);
    assert_eq!(h.client.owner_of(&stake_id), None);
    assert_eq!(h.client.owner_of(&next), Some(owner.clone()));
    assert_eq!(h.client.settings_of(&next).copy_iterations, 0);
    assert_eq!(h.primitive.stake_at(&h.manager, &0).staked_days, DAYS);
    assert_eq!(h.client.withdrawable_of(&owner, &h.token), 0);

    mature(&h);
    let second = ended(h.client.stake_end_by_consent(&ender, &next));
    let second_payout = MATURE_PAYOUT + MATURE_PAYOUT * (YIELD_BPS * DAYS) as i128 / 10_000;
    assert_eq!(second.proceeds, second_payout);
    assert_eq!(second.next_stake_id, None);
    assert_eq!(h.client.withdrawable_of(&owner, &h.token), second_payout);
    assert_eq!(h.primitive.stake_count(&h.manager), 0);
}

#[test]
fn test_unlimited_copies_never_count_down() {
    let h = setup();
    let (_owner, stake_id) = start_funded(&h, &restarting(255));
    mature(&h);

    let receipt = ended(
        h.client
            .stake_end_by_consent(&Address::generate(&h.env), &stake_id),
    );
    let next = receipt.next_stake_id.unwrap();
    assert_eq!(h.client.settings_of(&next).copy_iterations, 255);
}

#[test]
fn test_restart_releases_yield_to_owner() {
    let h = setup();
    let mut settings = restarting(5);
    settings.withdrawable = Linear::percent(Component::Yield, 1, 1);
    let (owner, stake_id) = start_funded(&h, &settings);
    mature(&h);

    let receipt = ended(
        h.client
            .stake_end_by_consent(&Address::generate(&h.env), &stake_id),
    );
    assert_eq!(receipt.owner_amount, MATURE_PAYOUT - PRINCIPAL);
    assert_eq!(receipt.restaked, PRINCIPAL);
    assert_eq!(
        h.client.withdrawable_of(&owner, &h.token),
        MATURE_PAYOUT - PRINCIPAL
    );
    assert_eq!(h.primitive.stake_at(&h.manager, &0).principal, PRINCIPAL);
}

#[test]
fn test_restart_leftover_is_unattributed() {
    let h = setup();
    let mut settings = restarting(2);
    settings.new_stake = Linear::percent(Component::Total, 1, 2);
    let (owner, stake_id) = start_funded(&h, &settings);
    mature(&h);

    let receipt = ended(
        h.client
            .stake_end_by_consent(&Address::generate(&h.env), &stake_id),
    );
    assert_eq!(receipt.restaked, MATURE_PAYOUT / 2);
    assert_eq!(
        h.client.unattributed_of(&h.token),
        MATURE_PAYOUT - MATURE_PAYOUT / 2
    );
    assert_eq!(h.client.withdrawable_of(&owner, &h.token), 0);

    let collector = Address::generate(&h.env);
    let taken = h.client.collect_unattributed(&h.token, &true, &collector, &0);
    assert_eq!(taken, MATURE_PAYOUT - MATURE_PAYOUT / 2);
    assert_eq!(h.client.unattributed_of(&h.token), 0);
}

#[test]
fn test_zero_restart_days_settles() {
    let h = setup();
    let mut settings = restarting(3);
    settings.new_stake_days_method = Method::Zero;
    let (owner, stake_id) = start_funded(&h, &settings);
    mature(&h);

    let receipt = ended(
        h.client
            .stake_end_by_consent(&Address::generate(&h.env), &stake_id),
    );
    assert_eq!(receipt.next_stake_id, None);
    assert_eq!(h.client.withdrawable_of(&owner, &h.token), MATURE_PAYOUT);
}

#[test]
fn test_late_restart_recovers_schedule() {
    let h = setup();
    let mut settings = restarting(1);
    settings.new_stake_days_method = Method::LadderRecovery;
    let (_owner, stake_id) = start_funded(&h, &settings);

    // locked on day 1; ending on day 27 is 26 days in
    advance_days(&h.env, 27);
    let receipt = ended(
        h.client
            .stake_end_by_consent(&Address::generate(&h.env), &stake_id),
    );
    assert!(receipt.next_stake_id.is_some());
    assert_eq!(h.primitive.stake_at(&h.manager, &0).staked_days, 6);
}

// ── Custody bookkeeping ──────────────────────────────────────────────────────

#[test]
fn test_end_reindexes_moved_stake() {
    let h = setup();
    let settings = h.client.default_settings();
    let (_a_owner, a) = start_funded(&h, &settings);
    let (_b_owner, b) = start_funded(&h, &settings);
    let (_c_owner, c) = start_funded(&h, &settings);
    assert_eq!(h.client.stake_info(&c).unwrap().custody_index, 2);
    mature(&h);

    let ender = Address::generate(&h.env);
    ended(h.client.stake_end_by_consent(&ender, &a));
    assert_eq!(h.client.stake_info(&c).unwrap().custody_index, 0);
    assert_eq!(h.client.stake_info(&b).unwrap().custody_index, 1);

    ended(h.client.stake_end_by_consent(&ender, &c));
    assert_eq!(h.client.stake_info(&b).unwrap().custody_index, 0);
    ended(h.client.stake_end_by_consent(&ender, &b));
    assert_eq!(h.primitive.stake_count(&h.manager), 0);
}

#[test]
fn test_batch_end_in_order() {
    let h = setup();
    let settings = h.client.default_settings();
    let (_a_owner, a) = start_funded(&h, &settings);
    let (_b_owner, b) = start_funded(&h, &consenting(ConsentAbilities::default()));
    mature(&h);

    let now = h.env.ledger().timestamp();
    let ender = Address::generate(&h.env);
    let outcomes = h
        .client
        .stake_end_by_consent_for_many(&ender, &vec![&h.env, a, b, 999], &(now + 60));
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(outcomes.get(0).unwrap(), EndOutcome::Ended(_)));
    assert_eq!(outcomes.get(1).unwrap(), EndOutcome::Skipped);
    assert_eq!(outcomes.get(2).unwrap(), EndOutcome::Skipped);
    assert_eq!(h.client.owner_of(&a), None);
    assert!(h.client.owner_of(&b).is_some());
}

#[test]
fn test_batch_after_deadline_aborts() {
    let h = setup();
    let (owner, a) = start_funded(&h, &h.client.default_settings());
    mature(&h);

    let now = h.env.ledger().timestamp();
    let result = h.client.try_stake_end_by_consent_for_many(
        &Address::generate(&h.env),
        &vec![&h.env, a],
        &(now - 1),
    );
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Deadline),
        _ => unreachable!("Expected Deadline error"),
    }
    assert_eq!(h.client.owner_of(&a), Some(owner));
}

// ── Owner end ────────────────────────────────────────────────────────────────

#[test]
fn test_owner_end_any_time() {
    let h = setup();
    let (owner, stake_id) = start_funded(&h, &restarting(255));
    advance_days(&h.env, 6);

    let stranger = Address::generate(&h.env);
    match h.client.try_stake_end(&stranger, &stake_id) {
        Err(Ok(e)) => assert_eq!(e, ContractError::StakeNotOwned),
        _ => unreachable!("Expected StakeNotOwned error"),
    }

    assert_eq!(h.client.stake_end(&owner, &stake_id), 75_000);
    assert_eq!(h.client.withdrawable_of(&owner, &h.token), 75_000);
    assert_eq!(h.client.owner_of(&stake_id), None);
    assert_eq!(h.primitive.stake_count(&h.manager), 0);

    match h.client.try_stake_end(&owner, &stake_id) {
        Err(Ok(e)) => assert_eq!(e, ContractError::StakeNotEndable),
        _ => unreachable!("Expected StakeNotEndable error"),
    }
}

// ── Rewards ──────────────────────────────────────────────────────────────────

#[test]
fn test_mint_rewards_needs_owner_or_consent() {
    let h = setup();
    let (owner, stake_id) = start_funded(&h, &h.client.default_settings());
    advance_days(&h.env, 4);

    let stranger = Address::generate(&h.env);
    assert_eq!(h.client.mint_rewards(&stranger, &vec![&h.env, stake_id]), 0);

    // locked on day 1, three days served
    assert_eq!(h.client.mint_rewards(&owner, &vec![&h.env, stake_id]), 300);
    assert_eq!(h.client.withdrawable_of(&owner, &h.reward), 300);
    assert_eq!(h.client.attributed_of(&h.reward), 300);
}

#[test]
fn test_third_party_mint_with_consent() {
    let h = setup();
    let settings = consenting(ConsentAbilities {
        can_end: true,
        can_mint_reward: true,
        ..Default::default()
    });
    let (owner, stake_id) = start_funded(&h, &settings);
    advance_days(&h.env, 4);

    let minter = Address::generate(&h.env);
    assert_eq!(h.client.mint_rewards(&minter, &vec![&h.env, stake_id]), 300);
    assert_eq!(h.client.withdrawable_of(&owner, &h.reward), 300);
    assert_eq!(h.client.withdrawable_of(&minter, &h.reward), 0);
}

#[test]
fn test_reward_minted_at_end() {
    let h = setup();
    let settings = consenting(ConsentAbilities {
        can_end: true,
        can_mint_reward_at_end: true,
        ..Default::default()
    });
    let (owner, stake_id) = start_funded(&h, &settings);
    mature(&h);

    let receipt = ended(
        h.client
            .stake_end_by_consent(&Address::generate(&h.env), &stake_id),
    );
    assert_eq!(receipt.reward, PRINCIPAL * DAYS as i128 / 1_000);
    assert_eq!(h.client.withdrawable_of(&owner, &h.reward), receipt.reward);
}

#[test]
fn test_bonus_at_end_goes_to_ender() {
    let h = setup();
    let settings = consenting(ConsentAbilities {
        can_end: true,
        can_mint_reward_at_end: true,
        mint_bonus_at_end: true,
        ..Default::default()
    });
    let (owner, stake_id) = start_funded(&h, &settings);
    let ender = Address::generate(&h.env);
    mature(&h);

    let receipt = ended(h.client.stake_end_by_consent(&ender, &stake_id));
    assert_eq!(h.client.withdrawable_of(&ender, &h.reward), receipt.reward);
    assert_eq!(h.client.withdrawable_of(&owner, &h.reward), 0);
}

#[test]
fn test_good_accounting_swallows_failures() {
    let h = setup();
    let settings = h.client.default_settings();
    let (_a_owner, a) = start_funded(&h, &settings);
    mature(&h);
    let (_b_owner, b) = start_funded(&h, &settings);

    // b is immature and the primitive refuses it; 7 is unknown
    assert_eq!(h.client.good_accounting(&vec![&h.env, a, b, 7]), 1);
    assert_eq!(h.primitive.stake_at(&h.manager, &0).unlocked_day, DAYS + 1);
}

#[test]
fn test_funds_reach_owner_wallet() {
    let h = setup();
    let (owner, stake_id) = start_funded(&h, &h.client.default_settings());
    mature(&h);
    ended(
        h.client
            .stake_end_by_consent(&Address::generate(&h.env), &stake_id),
    );

    h.client.withdraw(&owner, &h.token, &0);
    assert_eq!(balance(&h.env, &h.token, &owner), MATURE_PAYOUT);
    assert_eq!(h.client.attributed_of(&h.token), 0);
}
