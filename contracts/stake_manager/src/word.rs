//! 512-bit packing primitives shared by the settings and tip codecs.
//!
//! Fields are addressed by `(offset, width)` from the least significant bit.
//! On the contract boundary a word travels as 64 big-endian bytes, so the
//! lowest byte of the word is the last byte of the array.

use bnum::types::U512;
use soroban_sdk::{BytesN, Env};

pub type Word = U512;

pub const WORD_BYTES: usize = 64;

fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// OR `value` (truncated to `width` bits) into `word` at `offset`.
pub fn put(word: Word, offset: u32, width: u32, value: u64) -> Word {
    word | (Word::from(value & mask(width)) << offset)
}

/// Zero the `width` bits at `offset`.
pub fn clear(word: Word, offset: u32, width: u32) -> Word {
    word & !(Word::from(mask(width)) << offset)
}

pub fn take(word: &Word, offset: u32, width: u32) -> u64 {
    (*word >> offset).digits()[0] & mask(width)
}

/// Read a `width`-bit two's-complement field.
pub fn take_signed(word: &Word, offset: u32, width: u32) -> i64 {
    let raw = take(word, offset, width);
    let shift = 64 - width;
    ((raw << shift) as i64) >> shift
}

pub fn put_u128(word: Word, offset: u32, value: u128) -> Word {
    let word = put(word, offset, 64, value as u64);
    put(word, offset + 64, 64, (value >> 64) as u64)
}

pub fn take_u128(word: &Word, offset: u32) -> u128 {
    let low = take(word, offset, 64) as u128;
    let high = take(word, offset + 64, 64) as u128;
    (high << 64) | low
}

pub fn to_array(word: &Word) -> [u8; WORD_BYTES] {
    let mut out = [0u8; WORD_BYTES];
    for (i, digit) in word.digits().iter().enumerate() {
        let end = WORD_BYTES - i * 8;
        out[end - 8..end].copy_from_slice(&digit.to_be_bytes());
    }
    out
}

pub fn from_array(bytes: &[u8; WORD_BYTES]) -> Word {
    let mut digits = [0u64; 8];
    for (i, digit) in digits.iter_mut().enumerate() {
        let end = WORD_BYTES - i * 8;
        let mut chunk = [0u8; 8];
        chunk.copy_from_slice(&bytes[end - 8..end]);
        *digit = u64::from_be_bytes(chunk);
    }
    Word::from_digits(digits)
}

pub fn to_bytes(env: &Env, word: &Word) -> BytesN<64> {
    BytesN::from_array(env, &to_array(word))
}

pub fn from_bytes(bytes: &BytesN<64>) -> Word {
    from_array(&bytes.to_array())
}
