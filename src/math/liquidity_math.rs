use crate::error::{Error, MathError};
use crate::math::full_math::{mul_div, to_u256, to_u512};
use crate::Q96;
use alloy_primitives::U256;

/// Applies a signed liquidity delta to a liquidity amount, failing on
/// wrap-around in either direction.
pub fn add_delta(x: u128, y: i128) -> Result<u128, MathError> {
    if y < 0 {
        x.checked_sub(y.unsigned_abs())
            .ok_or(MathError::Underflow)
    } else {
        x.checked_add(y as u128).ok_or(MathError::Overflow)
    }
}

/// Greatest liquidity fundable with `amount0` of token0 across the
/// price range `[sqrt_ratio_a, sqrt_ratio_b]`.
///
/// The intermediate `pa * pb / Q96` term is truncated before the final
/// division, exactly as on-chain periphery contracts do it. Pair with
/// the imprecise variant on the other side of a range so both legs lose
/// precision the same way.
pub fn max_liquidity_for_amount_0_imprecise(
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    amount_0: U256,
) -> Result<U256, Error> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    };

    let intermediate = mul_div(sqrt_ratio_a_x96, sqrt_ratio_b_x96, Q96)?;
    Ok(mul_div(
        amount_0,
        intermediate,
        sqrt_ratio_b_x96 - sqrt_ratio_a_x96,
    )?)
}

/// Like [`max_liquidity_for_amount_0_imprecise`] but with the full
/// 512-bit product `amount0 * pa * pb`, so nothing is truncated before
/// the final division.
pub fn max_liquidity_for_amount_0_precise(
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    amount_0: U256,
) -> Result<U256, Error> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    };

    let numerator = to_u512(amount_0)
        .checked_mul(to_u512(sqrt_ratio_a_x96))
        .and_then(|n| n.checked_mul(to_u512(sqrt_ratio_b_x96)))
        .ok_or(MathError::Overflow)?;
    let denominator = to_u512(Q96) * to_u512(sqrt_ratio_b_x96 - sqrt_ratio_a_x96);

    Ok(to_u256(numerator / denominator)?)
}

/// Greatest liquidity fundable with `amount1` of token1 across the
/// price range `[sqrt_ratio_a, sqrt_ratio_b]`.
pub fn max_liquidity_for_amount_1(
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    amount_1: U256,
) -> Result<U256, Error> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    };

    Ok(mul_div(
        amount_1,
        Q96,
        sqrt_ratio_b_x96 - sqrt_ratio_a_x96,
    )?)
}

fn saturating(leg: Result<U256, Error>) -> Result<U256, Error> {
    match leg {
        Err(Error::MathError(MathError::Overflow)) => Ok(U256::MAX),
        other => other,
    }
}

/// Greatest liquidity fundable with both token amounts given the
/// current pool price and a position's price range.
///
/// Inside the range the answer is the smaller of the two per-token
/// maxima; outside it only the token on the active side matters. A
/// per-token maximum too large to represent is treated as unbounded,
/// so a side with no budget limit can be passed as `U256::MAX`.
/// `use_full_precision` selects the precise token0 formula; keep it
/// `false` when the result will be re-minted through periphery-style
/// contracts, which truncate.
pub fn max_liquidity_for_amounts(
    sqrt_ratio_current_x96: U256,
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    amount_0: U256,
    amount_1: U256,
    use_full_precision: bool,
) -> Result<U256, Error> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    };

    let max_liquidity_for_amount_0 = if use_full_precision {
        max_liquidity_for_amount_0_precise
    } else {
        max_liquidity_for_amount_0_imprecise
    };

    if sqrt_ratio_current_x96 <= sqrt_ratio_a_x96 {
        max_liquidity_for_amount_0(sqrt_ratio_a_x96, sqrt_ratio_b_x96, amount_0)
    } else if sqrt_ratio_current_x96 < sqrt_ratio_b_x96 {
        // a leg whose maximum does not fit in 256 bits cannot be the
        // binding constraint, saturate it so `min` picks the other side
        let liquidity_0 = saturating(max_liquidity_for_amount_0(
            sqrt_ratio_current_x96,
            sqrt_ratio_b_x96,
            amount_0,
        ))?;
        let liquidity_1 = saturating(max_liquidity_for_amount_1(
            sqrt_ratio_a_x96,
            sqrt_ratio_current_x96,
            amount_1,
        ))?;
        Ok(liquidity_0.min(liquidity_1))
    } else {
        max_liquidity_for_amount_1(sqrt_ratio_a_x96, sqrt_ratio_b_x96, amount_1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::encode_sqrt_ratio_x96;

    fn encode(amount_1: u64, amount_0: u64) -> U256 {
        encode_sqrt_ratio_x96(U256::from(amount_1), U256::from(amount_0)).unwrap()
    }

    #[test]
    fn add_delta_applies_signed_changes() {
        assert_eq!(add_delta(1, 0).unwrap(), 1);
        assert_eq!(add_delta(1, -1).unwrap(), 0);
        assert_eq!(add_delta(1, 1).unwrap(), 2);
    }

    #[test]
    fn add_delta_rejects_wraparound() {
        assert!(matches!(add_delta(0, -1), Err(MathError::Underflow)));
        assert!(matches!(
            add_delta(u128::MAX, 1),
            Err(MathError::Overflow)
        ));
        // i128::MIN has no positive counterpart, make sure abs() not being
        // representable does not panic
        assert!(matches!(add_delta(0, i128::MIN), Err(MathError::Underflow)));
        assert_eq!(add_delta(u128::MAX, i128::MIN).unwrap(), u128::MAX >> 1);
    }

    #[test]
    fn amounts_below_the_range_only_use_token0() {
        let price = encode(100, 110);
        let lower = encode(100, 110);
        let upper = encode(110, 100);

        let liquidity =
            max_liquidity_for_amounts(price, lower, upper, U256::from(100u8), U256::from(200u8), false)
                .unwrap();
        assert_eq!(liquidity, U256::from(1048u16));

        let precise =
            max_liquidity_for_amounts(price, lower, upper, U256::from(100u8), U256::from(200u8), true)
                .unwrap();
        assert_eq!(precise, U256::from(1048u16));
    }

    #[test]
    fn amounts_inside_the_range_take_the_smaller_leg() {
        let price = encode(1, 1);
        let lower = encode(100, 110);
        let upper = encode(110, 100);

        let liquidity =
            max_liquidity_for_amounts(price, lower, upper, U256::from(100u8), U256::from(200u8), false)
                .unwrap();
        assert_eq!(liquidity, U256::from(2148u16));

        let precise =
            max_liquidity_for_amounts(price, lower, upper, U256::from(100u8), U256::from(200u8), true)
                .unwrap();
        assert_eq!(precise, U256::from(2148u16));
    }

    #[test]
    fn amounts_above_the_range_only_use_token1() {
        let price = encode(110, 100);
        let lower = encode(100, 110);
        let upper = encode(110, 100);

        let liquidity =
            max_liquidity_for_amounts(price, lower, upper, U256::from(100u8), U256::from(200u8), false)
                .unwrap();
        assert_eq!(liquidity, U256::from(2097u16));
    }

    #[test]
    fn unbounded_leg_inside_the_range_saturates() {
        let price = encode(1, 1);
        let lower = encode(100, 110);
        let upper = encode(110, 100);

        // an unconstrained token1 budget overflows its leg, the token0
        // side must still come through as the binding one
        let liquidity =
            max_liquidity_for_amounts(price, lower, upper, U256::from(100u8), U256::MAX, false)
                .unwrap();
        assert_eq!(liquidity, U256::from(2148u16));

        let liquidity =
            max_liquidity_for_amounts(price, lower, upper, U256::MAX, U256::from(200u8), false)
                .unwrap();
        assert_eq!(liquidity, U256::from(4297u16));

        let precise =
            max_liquidity_for_amounts(price, lower, upper, U256::MAX, U256::from(200u8), true)
                .unwrap();
        assert_eq!(precise, U256::from(4297u16));
    }

    #[test]
    fn large_amounts_inside_the_range() {
        let price = encode(1, 1);
        let lower = encode(100, 110);
        let upper = encode(110, 100);
        let big = U256::from((1u64 << 53) - 1);

        let liquidity =
            max_liquidity_for_amounts(price, lower, upper, big, U256::from(200u8), false).unwrap();
        assert_eq!(liquidity, U256::from(4297u16));
    }

    #[test]
    fn precise_liquidity_never_exceeds_what_amounts_fund() {
        // re-derive the amount for the computed liquidity and make sure it
        // does not overshoot the budget
        use crate::math::sqrt_price_math::get_amount_0_delta;

        let lower = encode(100, 110);
        let upper = encode(110, 100);
        let amount_0 = U256::from(123456789012345678u64);

        let liquidity = max_liquidity_for_amount_0_precise(lower, upper, amount_0).unwrap();
        let funded = get_amount_0_delta(lower, upper, liquidity.to::<u128>(), false).unwrap();
        assert!(funded <= amount_0);
    }
}
