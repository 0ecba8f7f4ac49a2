#![no_main]

use arbitrary::Arbitrary;
use common::StakeSnapshot;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{BytesN, Env};
use stake_manager::{Method, StakeManagerContract, StakeManagerContractClient};

#[derive(Arbitrary, Debug)]
pub struct Input {
    word: [u8; 64],
    limit: i128,
    total: i128,
    principal: i128,
    locked_day: u32,
    staked_days: u32,
    current_day: u32,
    magnitude: u32,
}

fuzz_target!(|input: Input| {
    let env = Env::default();
    let client = StakeManagerContractClient::new(&env, &env.register(StakeManagerContract, ()));

    let encoded = BytesN::from_array(&env, &input.word);
    let settings = client.decode_settings(&encoded);
    let canonical = client.encode_settings(&settings);
    assert_eq!(client.decode_settings(&canonical), settings);

    let tip = client.decode_tip(&encoded);
    assert!(tip.amount >= 0);
    assert!(tip.currency_index <= u16::MAX as u32);

    let stake = StakeSnapshot {
        stake_id: 1,
        principal: input.principal,
        shares: input.principal,
        locked_day: input.locked_day,
        staked_days: input.staked_days,
        unlocked_day: 0,
        is_auto_stake: false,
    };
    for linear in [settings.tip, settings.withdrawable, settings.new_stake, tip.linear] {
        if let Ok(Ok(value)) = client.try_compute_magnitude(
            &input.limit,
            &linear,
            &input.total,
            &stake,
            &input.current_day,
        ) {
            assert!(value >= 0 && value <= input.limit.max(0));
        }
    }

    let days = client.compute_day_magnitude(
        &Method::from_u32(input.magnitude % 11),
        &input.magnitude,
        &stake,
        &input.current_day,
    );
    assert!(days <= common::MAX_STAKE_DAYS);
});
