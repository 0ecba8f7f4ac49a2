#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based state machine tests for the withdrawable-balance ledger.
//!
//! Invariants tested:
//! - Attributed always equals the sum of withdrawable balances
//! - The manager's token balance covers everything attributed
//! - Withdrawals never exceed a balance, and failed ones change nothing

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::testutils::Address as _;
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, Env};
use stake_manager::{ContractError, StakeManagerContract, StakeManagerContractClient};
use stakeable_mock::{StakeableMock, StakeableMockClient};

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Setup {
    env: Env,
    client: StakeManagerContractClient<'static>,
    manager: Address,
    token: Address,
    accounts: [Address; 2],
}

fn setup() -> Setup {
    let env = Env::default();
    env.mock_all_auths();

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let primitive_id = env.register(StakeableMock, ());
    StakeableMockClient::new(&env, &primitive_id).initialize(&token, &reward, &10);

    let manager = env.register(StakeManagerContract, ());
    let client = StakeManagerContractClient::new(&env, &manager);
    client.initialize(&primitive_id, &primitive_id);

    let accounts = [Address::generate(&env), Address::generate(&env)];
    for account in accounts.iter() {
        StellarAssetClient::new(&env, &token).mint(account, &1_000_000);
    }

    Setup {
        env,
        client,
        manager,
        token,
        accounts,
    }
}

#[derive(Arbitrary, Debug, Clone)]
enum Op {
    Deposit {
        second: bool,
        #[proptest(strategy = "1i128..50_000")]
        amount: i128,
    },
    Withdraw {
        second: bool,
        #[proptest(strategy = "0i128..60_000")]
        amount: i128,
    },
    /// Tokens sent straight to the manager, outside any balance.
    Donate {
        second: bool,
        #[proptest(strategy = "1i128..10_000")]
        amount: i128,
    },
    Collect {
        second: bool,
        to_withdrawable: bool,
        #[proptest(strategy = "0u32..=12_000")]
        bps: u32,
    },
}

fn pick(s: &Setup, second: bool) -> Address {
    s.accounts[second as usize].clone()
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_attribution_is_conserved(ops in prop::collection::vec(any::<Op>(), 1..20)) {
        let s = setup();
        let token = TokenClient::new(&s.env, &s.token);

        for op in ops {
            match op {
                Op::Deposit { second, amount } => {
                    s.client.deposit(&pick(&s, second), &s.token, &amount);
                }
                Op::Withdraw { second, amount } => {
                    let account = pick(&s, second);
                    let before = s.client.withdrawable_of(&account, &s.token);
                    match s.client.try_withdraw(&account, &s.token, &amount) {
                        Ok(Ok(taken)) => {
                            prop_assert!(taken <= before);
                            prop_assert_eq!(
                                s.client.withdrawable_of(&account, &s.token),
                                before - taken
                            );
                        }
                        Err(Ok(e)) => {
                            prop_assert_eq!(e, ContractError::InsufficientBalance);
                            prop_assert!(amount > before);
                            prop_assert_eq!(s.client.withdrawable_of(&account, &s.token), before);
                        }
                        _ => prop_assert!(false, "unexpected host error"),
                    }
                }
                Op::Donate { second, amount } => {
                    token.transfer(&pick(&s, second), &s.manager, &amount);
                }
                Op::Collect { second, to_withdrawable, bps } => {
                    let pool = s.client.unattributed_of(&s.token);
                    let taken = s.client.collect_unattributed_percent(
                        &s.token,
                        &to_withdrawable,
                        &pick(&s, second),
                        &bps,
                    );
                    prop_assert!(taken >= 0 && taken <= pool);
                }
            }

            let sum: i128 = s
                .accounts
                .iter()
                .map(|a| s.client.withdrawable_of(a, &s.token))
                .sum();
            prop_assert_eq!(s.client.attributed_of(&s.token), sum);
            prop_assert!(token.balance(&s.manager) >= sum);
            prop_assert_eq!(
                s.client.unattributed_of(&s.token),
                token.balance(&s.manager) - sum
            );
        }
    }
}
