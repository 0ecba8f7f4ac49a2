//! Resolves a descriptor against a stake's outcome into a token or day count.

use common::{StakeSnapshot, MAX_STAKE_DAYS};

use crate::curve::{self, Component, Linear, Method};
use crate::errors::ContractError;

/// Split `total` into its principal and yield parts. A loss reports the
/// whole amount as principal and zero yield.
pub fn decompose(total: i128, stake: &StakeSnapshot) -> (i128, i128) {
    let total = total.max(0);
    let principal = stake.principal.clamp(0, total);
    (principal, total - principal)
}

fn component_of(component: Component, total: i128, stake: &StakeSnapshot) -> i128 {
    let (principal, yielded) = decompose(total, stake);
    match component {
        Component::Total => total.max(0),
        Component::Principal => principal,
        Component::Yield => yielded,
    }
}

/// Days the next stake must run for its end to fall back onto the ended
/// stake's schedule of `staked_days + 1`-day periods from `locked_day`.
///
/// On-schedule and early ends keep the same duration; a remainder that
/// would be zero also keeps it.
pub fn ladder_recovery_days(stake: &StakeSnapshot, current_day: u32) -> u32 {
    let staked_days = stake.staked_days;
    let elapsed = current_day.saturating_sub(stake.locked_day);
    let period = staked_days.saturating_add(1);
    if elapsed <= period {
        return staked_days;
    }
    let drift = elapsed % period;
    match staked_days.checked_sub(drift) {
        Some(days) if days > 0 => days,
        _ => staked_days,
    }
}

/// Token magnitude for `linear`, clamped to `[0, limit]`.
///
/// `total` is the amount being split; principal and yield views of it come
/// from [`decompose`].
pub fn compute_magnitude(
    limit: i128,
    linear: &Linear,
    total: i128,
    stake: &StakeSnapshot,
    current_day: u32,
) -> Result<i128, ContractError> {
    let value = match linear.method {
        Method::Zero => return Ok(0),
        Method::Fixed => curve::scaled(linear.y, linear.y_factor),
        Method::RawCopy => total.max(0).into(),
        Method::LadderDays => stake.staked_days.into(),
        Method::LadderRecovery => ladder_recovery_days(stake, current_day).into(),
        method => {
            let component = match method.component() {
                Some(component) => component,
                None => return Ok(0),
            };
            let input = component_of(component, total, stake);
            if method.is_percent() {
                curve::ratio(linear, input)?
            } else {
                curve::evaluate(linear, input)?
            }
        }
    };
    Ok(curve::clamp_to_limit(value, limit))
}

/// Duration for a restarted stake, clamped to `[0, MAX_STAKE_DAYS]`.
///
/// Methods without a day meaning resolve to `0`, which stops the restart.
pub fn compute_day_magnitude(
    method: Method,
    magnitude: u32,
    stake: &StakeSnapshot,
    current_day: u32,
) -> u32 {
    let days = match method {
        Method::Fixed => magnitude & 0xFFFF,
        Method::RawCopy | Method::LadderDays => stake.staked_days,
        Method::LadderRecovery => ladder_recovery_days(stake, current_day),
        _ => 0,
    };
    days.min(MAX_STAKE_DAYS)
}
