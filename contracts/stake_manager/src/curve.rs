//! Fixed-point linear curves.
//!
//! A [`Linear`] descriptor carries three signed mantissas, each widened by a
//! byte-granular power of two: `X = x·2^(8·x_factor)`, `Y = y·2^(8·y_factor)`,
//! `B = b·2^(8·b_factor)`. Curves evaluate `(input·X + B) / Y` and percent
//! methods evaluate `input·X / Y`, both in a 512-bit signed intermediate.
//! Products that still overflow saturate toward the sign of the product;
//! callers clamp the result into the unsigned range they need.

use bnum::types::I512;
use soroban_sdk::contracttype;

use crate::errors::ContractError;

/// How a magnitude is derived from a stake's outcome.
#[contracttype]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(u32)]
pub enum Method {
    #[default]
    Zero = 0,
    /// The descriptor's scaled `y`, independent of the outcome.
    Fixed = 1,
    /// The amount being split, unmodified.
    RawCopy = 2,
    /// The ended stake's locked duration.
    LadderDays = 3,
    /// Days needed to land back on the ended stake's periodic schedule.
    LadderRecovery = 4,
    PercentOfTotal = 5,
    PercentOfPrincipal = 6,
    PercentOfYield = 7,
    LinearOfTotal = 8,
    LinearOfPrincipal = 9,
    LinearOfYield = 10,
}

/// Which part of an outcome a percent or linear method reads.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Component {
    Total,
    Principal,
    Yield,
}

impl Method {
    /// Unknown selectors decode as [`Method::Zero`].
    pub fn from_u32(raw: u32) -> Self {
        match raw {
            1 => Method::Fixed,
            2 => Method::RawCopy,
            3 => Method::LadderDays,
            4 => Method::LadderRecovery,
            5 => Method::PercentOfTotal,
            6 => Method::PercentOfPrincipal,
            7 => Method::PercentOfYield,
            8 => Method::LinearOfTotal,
            9 => Method::LinearOfPrincipal,
            10 => Method::LinearOfYield,
            _ => Method::Zero,
        }
    }

    pub fn is_percent(&self) -> bool {
        matches!(
            self,
            Method::PercentOfTotal | Method::PercentOfPrincipal | Method::PercentOfYield
        )
    }

    pub fn is_linear(&self) -> bool {
        matches!(
            self,
            Method::LinearOfTotal | Method::LinearOfPrincipal | Method::LinearOfYield
        )
    }

    pub fn component(&self) -> Option<Component> {
        match self {
            Method::PercentOfTotal | Method::LinearOfTotal => Some(Component::Total),
            Method::PercentOfPrincipal | Method::LinearOfPrincipal => Some(Component::Principal),
            Method::PercentOfYield | Method::LinearOfYield => Some(Component::Yield),
            _ => None,
        }
    }
}

/// Packed-width curve descriptor. `x` and `b` hold 24-bit values and the
/// factors 8-bit values once encoded; wider inputs are truncated by the codec.
#[contracttype]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Linear {
    pub method: Method,
    pub x: i32,
    pub x_factor: u32,
    pub y: i64,
    pub y_factor: u32,
    pub b: i32,
    pub b_factor: u32,
}

impl Linear {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn fixed(amount: i64) -> Self {
        Linear {
            method: Method::Fixed,
            y: amount,
            ..Self::default()
        }
    }

    pub fn raw_copy() -> Self {
        Linear {
            method: Method::RawCopy,
            ..Self::default()
        }
    }

    /// `numerator / denominator` of the chosen component.
    pub fn percent(component: Component, numerator: i32, denominator: i64) -> Self {
        let method = match component {
            Component::Total => Method::PercentOfTotal,
            Component::Principal => Method::PercentOfPrincipal,
            Component::Yield => Method::PercentOfYield,
        };
        Linear {
            method,
            x: numerator,
            y: denominator,
            ..Self::default()
        }
    }

    /// `(component·x + b) / y` of the chosen component, unscaled.
    pub fn linear(component: Component, x: i32, y: i64, b: i32) -> Self {
        let method = match component {
            Component::Total => Method::LinearOfTotal,
            Component::Principal => Method::LinearOfPrincipal,
            Component::Yield => Method::LinearOfYield,
        };
        Linear {
            method,
            x,
            y,
            b,
            ..Self::default()
        }
    }
}

// ── Saturating wide arithmetic ──────────────────────────────────────────────

fn saturate(negative: bool) -> I512 {
    if negative {
        I512::MIN
    } else {
        I512::MAX
    }
}

fn sat_mul(a: I512, b: I512) -> I512 {
    a.checked_mul(b)
        .unwrap_or_else(|| saturate(a.is_negative() != b.is_negative()))
}

fn sat_add(a: I512, b: I512) -> I512 {
    a.checked_add(b).unwrap_or_else(|| saturate(a.is_negative()))
}

fn sat_div(a: I512, b: I512) -> I512 {
    // Only MIN / -1 can fail once b != 0.
    a.checked_div(b).unwrap_or(I512::MAX)
}

/// `mantissa · 2^(8·factor)`, saturating past 511 bits.
pub fn scaled(mantissa: i64, factor: u32) -> I512 {
    let value = I512::from(mantissa);
    if mantissa == 0 || factor == 0 {
        return value;
    }
    let shift = factor.saturating_mul(8);
    if shift >= I512::BITS - 1 {
        return saturate(mantissa < 0);
    }
    sat_mul(value, I512::ONE << shift)
}

/// `(input·X + B) / Y`.
///
/// A zero `Y` is only accepted when `X` is zero too, in which case the
/// curve is the constant `B`.
pub fn evaluate(linear: &Linear, input: i128) -> Result<I512, ContractError> {
    let x = scaled(linear.x as i64, linear.x_factor);
    let y = scaled(linear.y, linear.y_factor);
    let b = scaled(linear.b as i64, linear.b_factor);

    if y == I512::ZERO {
        if x != I512::ZERO {
            return Err(ContractError::NotAllowed);
        }
        return Ok(b);
    }

    let numerator = sat_add(sat_mul(I512::from(input), x), b);
    Ok(sat_div(numerator, y))
}

/// `input·X / Y`; the bias is ignored and a zero `Y` is always rejected.
pub fn ratio(linear: &Linear, input: i128) -> Result<I512, ContractError> {
    let x = scaled(linear.x as i64, linear.x_factor);
    let y = scaled(linear.y, linear.y_factor);
    if y == I512::ZERO {
        return Err(ContractError::NotAllowed);
    }
    Ok(sat_div(sat_mul(I512::from(input), x), y))
}

/// Reject descriptors that can never be evaluated.
pub fn validate(linear: &Linear) -> Result<(), ContractError> {
    if linear.method.is_percent() {
        ratio(linear, 0).map(|_| ())
    } else if linear.method.is_linear() {
        evaluate(linear, 0).map(|_| ())
    } else {
        Ok(())
    }
}

/// Clamp a wide value into `[0, limit]`.
pub fn clamp_to_limit(value: I512, limit: i128) -> i128 {
    if limit <= 0 || value <= I512::ZERO {
        return 0;
    }
    if value >= I512::from(limit) {
        return limit;
    }
    i128::try_from(value).unwrap_or(limit)
}
