#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, Env};
use stake_manager::{Linear, Method, StakeManagerContract, StakeManagerContractClient};
use stakeable_mock::{StakeableMock, StakeableMockClient, SECONDS_PER_DAY};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Start { amount: u32, days: u16, consent: u8, copies: u8, method: u8 },
    Deposit { amount: u32 },
    Withdraw { amount: u32 },
    Tip { stake: u8, amount: u16, fixed: u16 },
    Advance { days: u8 },
    EndByConsent { stake: u8 },
    EndByOwner { stake: u8 },
    Collect { bps: u16 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let primitive = env.register(StakeableMock, ());
    StakeableMockClient::new(&env, &primitive).initialize(&token, &reward, &10);
    StellarAssetClient::new(&env, &token).mint(&primitive, &i64::MAX.into());

    let manager = env.register(StakeManagerContract, ());
    let client = StakeManagerContractClient::new(&env, &manager);
    client.initialize(&primitive, &primitive);

    let mut users = Vec::new();
    for _ in 0..4 {
        let user = Address::generate(&env);
        StellarAssetClient::new(&env, &token).mint(&user, &(u32::MAX as i128 * 64));
        users.push(user);
    }
    let mut stakes: Vec<(Address, u64)> = Vec::new();
    let pick = |stakes: &[(Address, u64)], i: u8| stakes.get(i as usize % stakes.len().max(1)).cloned();

    // Looking for panics and conservation breaks, not specific outcomes.
    for (i, action) in actions.into_iter().enumerate() {
        let caller = &users[i % users.len()];
        match action {
            FuzzAction::Start { amount, days, consent, copies, method } => {
                let mut settings = client.default_settings();
                settings.consent_abilities = client.decode_consent_abilities(&(consent as u32));
                settings.copy_iterations = copies as u32;
                settings.new_stake_days_method = Method::from_u32(method as u32 % 11);
                if let Ok(Ok(id)) =
                    client.try_stake_start(caller, &(amount as i128), &(days as u32), &settings)
                {
                    stakes.push((caller.clone(), id));
                }
            }
            FuzzAction::Deposit { amount } => {
                let _ = client.try_deposit(caller, &token, &(amount as i128));
            }
            FuzzAction::Withdraw { amount } => {
                let _ = client.try_withdraw(caller, &token, &(amount as i128));
            }
            FuzzAction::Tip { stake, amount, fixed } => {
                if let Some((owner, id)) = pick(&stakes, stake) {
                    let _ = client.try_add_tip(
                        &owner,
                        &id,
                        &0,
                        &(amount as i128),
                        &Linear::fixed(fixed as i64),
                    );
                }
            }
            FuzzAction::Advance { days } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now + days as u64 * SECONDS_PER_DAY);
            }
            FuzzAction::EndByConsent { stake } => {
                if let Some((_, id)) = pick(&stakes, stake) {
                    if let Ok(Ok(stake_manager::EndOutcome::Ended(receipt))) =
                        client.try_stake_end_by_consent(caller, &id)
                    {
                        if let Some(next) = receipt.next_stake_id {
                            stakes.push((receipt.owner, next));
                        }
                    }
                }
            }
            FuzzAction::EndByOwner { stake } => {
                if let Some((owner, id)) = pick(&stakes, stake) {
                    let _ = client.try_stake_end(&owner, &id);
                }
            }
            FuzzAction::Collect { bps } => {
                let _ = client.try_collect_unattributed_percent(&token, &true, caller, &(bps as u32));
            }
        }

        let held = TokenClient::new(&env, &token).balance(&manager);
        assert!(client.attributed_of(&token) <= held);
    }
});
