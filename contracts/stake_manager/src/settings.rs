//! Per-stake settings and their fixed-offset 512-bit encoding.
//!
//! Layout, from the least significant bit:
//!
//! | Bits      | Field                       |
//! |-----------|-----------------------------|
//! | 0..8      | consent abilities           |
//! | 8..16     | copy iterations             |
//! | 16..32    | new stake days magnitude    |
//! | 32..40    | new stake days method       |
//! | 40..184   | new stake curve             |
//! | 184..328  | withdrawable curve          |
//! | 328..472  | tip curve                   |
//!
//! Each curve occupies 144 bits: `b_factor:8 | b:24 | y_factor:8 | y:64 |
//! x_factor:8 | x:24 | method:8`, low to high. Bits 472..512 are unused and
//! cleared by every encode.

use soroban_sdk::{contracttype, BytesN, Env};

use crate::consent::{self, ConsentAbilities};
use crate::curve::{self, Linear, Method};
use crate::errors::ContractError;
use crate::word::{self, Word};

pub const CONSENT_OFFSET: u32 = 0;
pub const COPY_ITERATIONS_OFFSET: u32 = 8;
const DAYS_MAGNITUDE_OFFSET: u32 = 16;
const DAYS_METHOD_OFFSET: u32 = 32;
const NEW_STAKE_OFFSET: u32 = 40;
const WITHDRAWABLE_OFFSET: u32 = 184;
const TIP_OFFSET: u32 = 328;

pub const LINEAR_BITS: u32 = 144;

const B_FACTOR: u32 = 0;
const B: u32 = 8;
const Y_FACTOR: u32 = 32;
const Y: u32 = 40;
const X_FACTOR: u32 = 104;
const X: u32 = 112;
const METHOD: u32 = 136;

/// Copy-iteration count that never runs out.
pub const UNLIMITED_COPIES: u32 = 255;

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Settings {
    /// Share of the proceeds paid to whoever ends the stake.
    pub tip: Linear,
    /// Share of the proceeds released to the owner when restarting.
    pub withdrawable: Linear,
    /// Share of the remainder locked into the restarted stake.
    pub new_stake: Linear,
    pub new_stake_days_method: Method,
    pub new_stake_days_magnitude: u32,
    /// `0` stops restarting, `255` never runs out, anything else counts down.
    pub copy_iterations: u32,
    pub consent_abilities: ConsentAbilities,
}

/// Settings a stake gets when its owner has no preference: anyone may end
/// it at maturity and everything is returned to the owner, while a non-zero
/// copy count restarts the full amount for the same duration.
pub fn standard_settings() -> Settings {
    Settings {
        tip: Linear::zero(),
        withdrawable: Linear::zero(),
        new_stake: Linear::raw_copy(),
        new_stake_days_method: Method::LadderDays,
        new_stake_days_magnitude: 0,
        copy_iterations: 0,
        consent_abilities: ConsentAbilities::end_only(),
    }
}

/// Reject settings whose curves can never be evaluated at end.
pub fn validate(settings: &Settings) -> Result<(), ContractError> {
    curve::validate(&settings.tip)?;
    curve::validate(&settings.withdrawable)?;
    curve::validate(&settings.new_stake)
}

pub(crate) fn put_linear(word: Word, offset: u32, linear: &Linear) -> Word {
    let word = word::put(word, offset + B_FACTOR, 8, linear.b_factor as u64);
    let word = word::put(word, offset + B, 24, linear.b as i64 as u64);
    let word = word::put(word, offset + Y_FACTOR, 8, linear.y_factor as u64);
    let word = word::put(word, offset + Y, 64, linear.y as u64);
    let word = word::put(word, offset + X_FACTOR, 8, linear.x_factor as u64);
    let word = word::put(word, offset + X, 24, linear.x as i64 as u64);
    word::put(word, offset + METHOD, 8, linear.method as u64)
}

pub(crate) fn take_linear(word: &Word, offset: u32) -> Linear {
    Linear {
        method: Method::from_u32(word::take(word, offset + METHOD, 8) as u32),
        x: word::take_signed(word, offset + X, 24) as i32,
        x_factor: word::take(word, offset + X_FACTOR, 8) as u32,
        y: word::take_signed(word, offset + Y, 64),
        y_factor: word::take(word, offset + Y_FACTOR, 8) as u32,
        b: word::take_signed(word, offset + B, 24) as i32,
        b_factor: word::take(word, offset + B_FACTOR, 8) as u32,
    }
}

pub fn encode_word(settings: &Settings) -> Word {
    let word = word::put(
        Word::ZERO,
        CONSENT_OFFSET,
        8,
        consent::encode(&settings.consent_abilities) as u64,
    );
    let word = word::put(
        word,
        COPY_ITERATIONS_OFFSET,
        8,
        settings.copy_iterations as u64,
    );
    let word = word::put(
        word,
        DAYS_MAGNITUDE_OFFSET,
        16,
        settings.new_stake_days_magnitude as u64,
    );
    let word = word::put(
        word,
        DAYS_METHOD_OFFSET,
        8,
        settings.new_stake_days_method as u64,
    );
    let word = put_linear(word, NEW_STAKE_OFFSET, &settings.new_stake);
    let word = put_linear(word, WITHDRAWABLE_OFFSET, &settings.withdrawable);
    put_linear(word, TIP_OFFSET, &settings.tip)
}

pub fn decode_word(word: &Word) -> Settings {
    Settings {
        tip: take_linear(word, TIP_OFFSET),
        withdrawable: take_linear(word, WITHDRAWABLE_OFFSET),
        new_stake: take_linear(word, NEW_STAKE_OFFSET),
        new_stake_days_method: Method::from_u32(word::take(word, DAYS_METHOD_OFFSET, 8) as u32),
        new_stake_days_magnitude: word::take(word, DAYS_MAGNITUDE_OFFSET, 16) as u32,
        copy_iterations: word::take(word, COPY_ITERATIONS_OFFSET, 8) as u32,
        consent_abilities: consent::decode(word::take(word, CONSENT_OFFSET, 8) as u8),
    }
}

pub fn encode(env: &Env, settings: &Settings) -> BytesN<64> {
    word::to_bytes(env, &encode_word(settings))
}

pub fn decode(encoded: &BytesN<64>) -> Settings {
    decode_word(&word::from_bytes(encoded))
}

/// Re-encode through the codec, clearing anything outside defined fields.
pub fn canonicalize(env: &Env, encoded: &BytesN<64>) -> BytesN<64> {
    encode(env, &decode(encoded))
}

pub fn consent_of(encoded: &BytesN<64>) -> ConsentAbilities {
    consent::decode(word::take(&word::from_bytes(encoded), CONSENT_OFFSET, 8) as u8)
}

/// Count one restart off the copy-iteration byte.
///
/// `0` and [`UNLIMITED_COPIES`] come back unchanged; every other bit of the
/// word is preserved as-is.
pub fn decrement_copy_iterations_word(word: Word) -> Word {
    let copies = word::take(&word, COPY_ITERATIONS_OFFSET, 8);
    if copies == 0 || copies == UNLIMITED_COPIES as u64 {
        return word;
    }
    let cleared = word::clear(word, COPY_ITERATIONS_OFFSET, 8);
    word::put(cleared, COPY_ITERATIONS_OFFSET, 8, copies - 1)
}

pub fn decrement_copy_iterations(env: &Env, encoded: &BytesN<64>) -> BytesN<64> {
    word::to_bytes(
        env,
        &decrement_copy_iterations_word(word::from_bytes(encoded)),
    )
}
