//! Integer arithmetic behind the vault exchange rate.
//!
//! Every conversion multiplies in `u128` and truncates toward zero, so a
//! rounding remainder always stays with the vault rather than the caller.

use anchor_lang::prelude::*;

use crate::error::VaultError;

/// Underlying accrued between two slots at a flat per-slot rate.
pub fn accrued_since(accrual_rate: u64, recorded_slot: u64, current_slot: u64) -> Result<u64> {
    let elapsed = current_slot
        .checked_sub(recorded_slot)
        .ok_or(VaultError::SlotRegression)?;

    let accrued = (accrual_rate as u128)
        .checked_mul(elapsed as u128)
        .ok_or(VaultError::MathOverflow)?;

    u64::try_from(accrued).map_err(|_| error!(VaultError::MathOverflow))
}

/// Checkpoint balance plus linear accrual up to `current_slot`.
pub fn notional_balance(
    recorded_balance: u64,
    accrual_rate: u64,
    recorded_slot: u64,
    current_slot: u64,
) -> Result<u64> {
    let accrued = accrued_since(accrual_rate, recorded_slot, current_slot)?;

    recorded_balance
        .checked_add(accrued)
        .ok_or_else(|| error!(VaultError::MathOverflow))
}

/// `floor(a * b / c)` without intermediate overflow.
pub fn mul_div_down(a: u64, b: u64, c: u64) -> Result<u64> {
    let result = (a as u128)
        .checked_mul(b as u128)
        .ok_or(VaultError::MathOverflow)?
        .checked_div(c as u128)
        .ok_or(VaultError::MathOverflow)?;

    u64::try_from(result).map_err(|_| error!(VaultError::MathOverflow))
}

/// Shares worth `amount` of underlying against a pool of `notional`.
///
/// An empty pool mints 1:1.
pub fn shares_for_deposit(amount: u64, total_shares: u64, notional: u64) -> Result<u64> {
    if total_shares == 0 {
        return Ok(amount);
    }

    mul_div_down(amount, total_shares, notional)
}

/// Underlying redeemable for `shares` out of `total_shares`.
pub fn assets_for_shares(shares: u64, total_shares: u64, notional: u64) -> Result<u64> {
    mul_div_down(shares, notional, total_shares)
}

#[cfg(test)]
mod tests {
    use anchor_lang::error::Error;

    use super::*;

    fn overflow() -> Error {
        VaultError::MathOverflow.into()
    }

    #[test]
    fn test_accrual_is_linear_in_elapsed_slots() {
        assert_eq!(accrued_since(10, 100, 100).unwrap(), 0);
        assert_eq!(accrued_since(10, 100, 101).unwrap(), 10);
        assert_eq!(accrued_since(10, 100, 105).unwrap(), 50);
        assert_eq!(accrued_since(0, 0, 1_000_000).unwrap(), 0);
    }

    #[test]
    fn test_notional_balance_adds_accrual_to_checkpoint() {
        assert_eq!(notional_balance(1_000, 10, 7, 12).unwrap(), 1_050);
    }

    #[test]
    fn test_slot_regression_is_rejected() {
        let err = accrued_since(10, 50, 49).unwrap_err();
        assert_eq!(err, Error::from(VaultError::SlotRegression));
    }

    #[test]
    fn test_accrual_overflow_is_fatal() {
        assert_eq!(accrued_since(u64::MAX, 0, 2).unwrap_err(), overflow());
        assert_eq!(notional_balance(u64::MAX, 1, 0, 1).unwrap_err(), overflow());
    }

    #[test]
    fn test_first_deposit_mints_one_to_one() {
        assert_eq!(shares_for_deposit(1_000, 0, 0).unwrap(), 1_000);
        assert_eq!(shares_for_deposit(1_000, 0, 777).unwrap(), 1_000);
    }

    #[test]
    fn test_deposit_rounds_down() {
        // 100 * 1000 / 1040 = 96.15...
        assert_eq!(shares_for_deposit(100, 1_000, 1_040).unwrap(), 96);
        // Dust against a large pool mints nothing.
        assert_eq!(shares_for_deposit(1, 1_000, 1_050).unwrap(), 0);
    }

    #[test]
    fn test_deposit_never_rounds_up() {
        let pools = [(1_000u64, 1_050u64), (3, 7), (999, 1_000), (1, 1_000_000)];
        for (total_shares, notional) in pools {
            for amount in [1u64, 2, 3, 10, 99, 1_000, 123_456] {
                let shares = shares_for_deposit(amount, total_shares, notional).unwrap() as u128;
                assert!(shares * notional as u128 <= amount as u128 * total_shares as u128);
            }
        }
    }

    #[test]
    fn test_withdraw_proportional() {
        assert_eq!(assets_for_shares(1_000, 1_000, 1_050).unwrap(), 1_050);
        assert_eq!(assets_for_shares(500, 1_000, 1_090).unwrap(), 545);
        assert_eq!(assets_for_shares(1, 3, 10).unwrap(), 3);
    }

    #[test]
    fn test_zero_supply_division_is_an_error() {
        assert_eq!(assets_for_shares(1, 0, 10).unwrap_err(), overflow());
        assert_eq!(shares_for_deposit(1, 10, 0).unwrap_err(), overflow());
    }

    #[test]
    fn test_large_values_use_wide_intermediate() {
        let big = u64::MAX / 2;
        assert_eq!(mul_div_down(big, 4, 4).unwrap(), big);
        assert_eq!(mul_div_down(u64::MAX, 2, 1).unwrap_err(), overflow());
    }
}
