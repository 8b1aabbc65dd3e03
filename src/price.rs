//! Conversions between token-amount ratios and the Q64.96 sqrt price
//! encoding, plus the small rational types the position math uses.

use crate::error::{Error, MathError};
use crate::math::full_math::{sqrt, to_u256, to_u512};
use alloy_primitives::{U256, U512};

const SHIFT_192: usize = 192;

/// Encodes the price `amount1 / amount0` as a Q64.96 sqrt price,
/// `floor(sqrt((amount1 << 192) / amount0))`.
///
/// The amounts are raw token units; the result is only a valid pool
/// price when it falls inside the global sqrt price bounds.
pub fn encode_sqrt_ratio_x96(amount_1: U256, amount_0: U256) -> Result<U256, Error> {
    if amount_0.is_zero() {
        return Err(MathError::DivisionByZero.into());
    }
    if amount_1.bit_len() > 512 - SHIFT_192 {
        return Err(MathError::Overflow.into());
    }

    let ratio_x192 = (to_u512(amount_1) << SHIFT_192) / to_u512(amount_0);
    Ok(to_u256(sqrt(ratio_x192))?)
}

/// A fractional tolerance such as `Percent::new(5, 10_000)` for 0.05%.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Percent {
    numerator: U256,
    denominator: U256,
}

impl Percent {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, Error> {
        if denominator == 0 {
            return Err(MathError::DivisionByZero.into());
        }
        Ok(Self {
            numerator: U256::from(numerator),
            denominator: U256::from(denominator),
        })
    }

    /// Tolerance expressed in basis points, e.g. 50 for 0.5%.
    pub fn from_bps(bps: u64) -> Self {
        Self {
            numerator: U256::from(bps),
            denominator: U256::from(10_000u64),
        }
    }

    pub fn zero() -> Self {
        Self {
            numerator: U256::ZERO,
            denominator: U256::ONE,
        }
    }

    pub fn numerator(&self) -> U256 {
        self.numerator
    }

    pub fn denominator(&self) -> U256 {
        self.denominator
    }
}

/// An exact price as a ratio of raw token amounts.
///
/// Squaring a sqrt price needs up to 320 bits, so both legs are kept
/// as 512-bit integers and never rounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceRatio {
    pub numerator: U512,
    pub denominator: U512,
}

impl PriceRatio {
    /// Price of token0 in units of token1 for a given sqrt price:
    /// `p^2 / 2^192`.
    pub fn from_sqrt_ratio_x96(sqrt_ratio_x96: U256) -> Self {
        let wide = to_u512(sqrt_ratio_x96);
        Self {
            numerator: wide * wide,
            denominator: U512::from(1u8) << SHIFT_192,
        }
    }

    /// The reciprocal price.
    pub fn invert(&self) -> Self {
        Self {
            numerator: self.denominator,
            denominator: self.numerator,
        }
    }
}
