#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for the magnitude resolver.
//!
//! Invariants tested:
//! - A resolved magnitude always lies in `[0, limit]`
//! - Only zero-denominator percent and linear curves fail to resolve
//! - Ladder recovery always lands in `1..=staked_days`
//! - Day magnitudes never exceed the primitive's maximum duration

use common::{StakeSnapshot, MAX_STAKE_DAYS};
use proptest::prelude::*;
use soroban_sdk::Env;
use stake_manager::{
    ContractError, Linear, Method, StakeManagerContract, StakeManagerContractClient,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn client() -> (Env, StakeManagerContractClient<'static>) {
    let env = Env::default();
    let contract_id = env.register(StakeManagerContract, ());
    let client = StakeManagerContractClient::new(&env, &contract_id);
    (env, client)
}

fn stake(principal: i128, locked_day: u32, staked_days: u32) -> StakeSnapshot {
    StakeSnapshot {
        stake_id: 1,
        principal,
        shares: principal,
        locked_day,
        staked_days,
        unlocked_day: 0,
        is_auto_stake: false,
    }
}

prop_compose! {
    fn linear()(
        method in 0u32..=10,
        x in -(1i32 << 23)..(1i32 << 23),
        x_factor in 0u32..=40,
        y in any::<i64>(),
        y_factor in 0u32..=40,
        b in -(1i32 << 23)..(1i32 << 23),
        b_factor in 0u32..=40,
    ) -> Linear {
        Linear { method: Method::from_u32(method), x, x_factor, y, y_factor, b, b_factor }
    }
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_magnitude_within_limit(
        linear in linear(),
        limit in any::<i128>(),
        total in 0i128..=i128::MAX,
        principal in 1i128..=i128::MAX,
        locked_day in 0u32..10_000,
        staked_days in 1u32..=MAX_STAKE_DAYS,
        current_day in 0u32..40_000,
    ) {
        let (_env, client) = client();
        let stake = stake(principal, locked_day, staked_days);
        match client.try_compute_magnitude(&limit, &linear, &total, &stake, &current_day) {
            Ok(Ok(value)) => {
                prop_assert!(value >= 0);
                prop_assert!(value <= limit.max(0));
            }
            Err(Ok(e)) => {
                prop_assert_eq!(e, ContractError::NotAllowed);
                prop_assert!(linear.method.is_percent() || linear.method.is_linear());
                prop_assert!(linear.y == 0);
            }
            _ => prop_assert!(false, "unexpected host error"),
        }
    }

    #[test]
    fn prop_ladder_recovery_in_range(
        locked_day in 0u32..10_000,
        staked_days in 1u32..=MAX_STAKE_DAYS,
        current_day in 0u32..100_000,
    ) {
        let (_env, client) = client();
        let stake = stake(1_000, locked_day, staked_days);
        let days = client.compute_day_magnitude(&Method::LadderRecovery, &0, &stake, &current_day);
        prop_assert!(days >= 1);
        prop_assert!(days <= staked_days);
    }

    /// Late ends land the next stake back on the original schedule, except
    /// when the drift would leave no days at all.
    #[test]
    fn prop_ladder_recovery_realigns(
        locked_day in 0u32..10_000,
        staked_days in 1u32..=1_000,
        late in 1u32..5_000,
    ) {
        let (_env, client) = client();
        let stake = stake(1_000, locked_day, staked_days);
        let period = staked_days + 1;
        let current_day = locked_day + period + late;
        let elapsed = current_day - locked_day;
        prop_assume!(elapsed % period != staked_days);

        let days = client.compute_day_magnitude(&Method::LadderRecovery, &0, &stake, &current_day);
        prop_assert_eq!((elapsed + days) % period, staked_days % period);
    }

    #[test]
    fn prop_day_magnitude_capped(
        method in 0u32..=10,
        magnitude in any::<u32>(),
        staked_days in 0u32..=u16::MAX as u32,
        current_day in 0u32..100_000,
    ) {
        let (_env, client) = client();
        let stake = stake(1_000, 0, staked_days);
        let days = client.compute_day_magnitude(
            &Method::from_u32(method),
            &magnitude,
            &stake,
            &current_day,
        );
        prop_assert!(days <= MAX_STAKE_DAYS);
    }
}
