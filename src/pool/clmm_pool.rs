use crate::error::{Error, RangeError};
use crate::math::tick_math::get_sqrt_ratio_at_tick;
use crate::price::PriceRatio;
use crate::tick::TickDataProvider;
use alloy_primitives::{Address, U160, U256};

/// The supported fee tiers, in hundredths of a bip (pips).
///
/// Each tier implies the tick spacing its pools are deployed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeeTier {
    /// 0.01%
    Lowest,
    /// 0.05%
    Low,
    /// 0.3%
    Medium,
    /// 1%
    High,
}

impl FeeTier {
    pub fn fee_pips(self) -> u32 {
        match self {
            FeeTier::Lowest => 100,
            FeeTier::Low => 500,
            FeeTier::Medium => 3000,
            FeeTier::High => 10000,
        }
    }

    pub fn tick_spacing(self) -> i32 {
        match self {
            FeeTier::Lowest => 1,
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }
}

/// Converts an `Address` into its `U160` numeric representation.
#[inline(always)]
pub fn address_to_u160(address: Address) -> U160 {
    address.into()
}

/// Returns the token pair sorted by numeric address, the canonical
/// `(token0, token1)` ordering pools are keyed by.
pub fn sort_tokens(token0: Address, token1: Address) -> (Address, Address) {
    if address_to_u160(token0) < address_to_u160(token1) {
        (token0, token1)
    } else {
        (token1, token0)
    }
}

/// An immutable snapshot of a concentrated-liquidity pool.
///
/// Swaps and quotes never mutate the snapshot; they return a new pool
/// carrying the post-swap state.
#[derive(Clone, Debug)]
pub struct Pool<D> {
    pub token0: Address,
    pub token1: Address,
    pub fee_pips: u32,
    pub tick_spacing: i32,
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub tick: i32,
    pub tick_data: D,
}

impl<D: TickDataProvider> Pool<D> {
    /// Constructs a pool for one of the standard fee tiers.
    ///
    /// Token ordering is normalized, so `token_a`/`token_b` may be
    /// passed in either order.
    pub fn new(
        token_a: Address,
        token_b: Address,
        fee: FeeTier,
        sqrt_price_x96: U256,
        liquidity: u128,
        tick: i32,
        tick_data: D,
    ) -> Result<Self, Error> {
        Self::with_raw_fee(
            token_a,
            token_b,
            fee.fee_pips(),
            fee.tick_spacing(),
            sqrt_price_x96,
            liquidity,
            tick,
            tick_data,
        )
    }

    /// Constructs a pool with an explicit fee and tick spacing, for
    /// deployments outside the standard tiers.
    #[allow(clippy::too_many_arguments)]
    pub fn with_raw_fee(
        token_a: Address,
        token_b: Address,
        fee_pips: u32,
        tick_spacing: i32,
        sqrt_price_x96: U256,
        liquidity: u128,
        tick: i32,
        tick_data: D,
    ) -> Result<Self, Error> {
        if token_a == token_b {
            return Err(RangeError::IdenticalTokens.into());
        }
        if fee_pips >= 1_000_000 {
            return Err(RangeError::FeeOutOfBounds.into());
        }
        if tick_spacing <= 0 {
            return Err(RangeError::InvalidTickList.into());
        }

        // the tick must be the one whose price range contains sqrt_price_x96
        let tick_ratio = get_sqrt_ratio_at_tick(tick)?;
        let next_tick_ratio = get_sqrt_ratio_at_tick(tick + 1)?;
        if sqrt_price_x96 < tick_ratio || sqrt_price_x96 > next_tick_ratio {
            return Err(RangeError::PriceTickMismatch.into());
        }

        let (token0, token1) = sort_tokens(token_a, token_b);

        Ok(Self {
            token0,
            token1,
            fee_pips,
            tick_spacing,
            sqrt_price_x96,
            liquidity,
            tick,
            tick_data,
        })
    }

    pub fn involves_token(&self, token: Address) -> bool {
        token == self.token0 || token == self.token1
    }

    /// Price of token0 denominated in token1.
    pub fn token0_price(&self) -> PriceRatio {
        PriceRatio::from_sqrt_ratio_x96(self.sqrt_price_x96)
    }

    /// Price of token1 denominated in token0.
    pub fn token1_price(&self) -> PriceRatio {
        self.token0_price().invert()
    }

    /// Price of the given token in units of the other pool token.
    pub fn price_of(&self, token: Address) -> Result<PriceRatio, Error> {
        if token == self.token0 {
            Ok(self.token0_price())
        } else if token == self.token1 {
            Ok(self.token1_price())
        } else {
            Err(RangeError::TokenNotInPool.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::encode_sqrt_ratio_x96;
    use crate::tick::NoTickDataProvider;
    use alloy_primitives::address;

    const TOKEN_A: Address = address!("0x0000000000000000000000000000000000000001");
    const TOKEN_B: Address = address!("0x0000000000000000000000000000000000000002");

    fn unit_price() -> U256 {
        encode_sqrt_ratio_x96(U256::from(1u8), U256::from(1u8)).unwrap()
    }

    #[test]
    fn fee_tiers_imply_spacing() {
        assert_eq!(FeeTier::Lowest.tick_spacing(), 1);
        assert_eq!(FeeTier::Low.tick_spacing(), 10);
        assert_eq!(FeeTier::Medium.tick_spacing(), 60);
        assert_eq!(FeeTier::High.tick_spacing(), 200);
        assert_eq!(FeeTier::Medium.fee_pips(), 3000);
    }

    #[test]
    fn sorts_token_addresses() {
        let pool = Pool::new(
            TOKEN_B,
            TOKEN_A,
            FeeTier::Medium,
            unit_price(),
            0,
            0,
            NoTickDataProvider,
        )
        .unwrap();
        assert_eq!(pool.token0, TOKEN_A);
        assert_eq!(pool.token1, TOKEN_B);
    }

    #[test]
    fn rejects_identical_tokens() {
        assert!(matches!(
            Pool::new(
                TOKEN_A,
                TOKEN_A,
                FeeTier::Medium,
                unit_price(),
                0,
                0,
                NoTickDataProvider,
            ),
            Err(Error::RangeError(RangeError::IdenticalTokens))
        ));
    }

    #[test]
    fn rejects_fee_of_one_million_pips() {
        assert!(matches!(
            Pool::with_raw_fee(
                TOKEN_A,
                TOKEN_B,
                1_000_000,
                60,
                unit_price(),
                0,
                0,
                NoTickDataProvider,
            ),
            Err(Error::RangeError(RangeError::FeeOutOfBounds))
        ));
    }

    #[test]
    fn rejects_price_tick_mismatch() {
        // unit price sits in tick 0's range, not tick 100's
        assert!(matches!(
            Pool::new(
                TOKEN_A,
                TOKEN_B,
                FeeTier::Medium,
                unit_price(),
                0,
                100,
                NoTickDataProvider,
            ),
            Err(Error::RangeError(RangeError::PriceTickMismatch))
        ));
        // price just above tick 0's range
        assert!(matches!(
            Pool::new(
                TOKEN_A,
                TOKEN_B,
                FeeTier::Medium,
                get_sqrt_ratio_at_tick(2).unwrap(),
                0,
                0,
                NoTickDataProvider,
            ),
            Err(Error::RangeError(RangeError::PriceTickMismatch))
        ));
    }

    #[test]
    fn prices_and_token_membership() {
        let pool = Pool::new(
            TOKEN_A,
            TOKEN_B,
            FeeTier::Medium,
            unit_price(),
            0,
            0,
            NoTickDataProvider,
        )
        .unwrap();

        assert!(pool.involves_token(TOKEN_A));
        assert!(pool.involves_token(TOKEN_B));
        let other = address!("0x00000000000000000000000000000000000000ff");
        assert!(!pool.involves_token(other));
        assert!(matches!(
            pool.price_of(other),
            Err(Error::RangeError(RangeError::TokenNotInPool))
        ));

        let p0 = pool.price_of(TOKEN_A).unwrap();
        assert_eq!(p0.numerator, p0.denominator);
        assert_eq!(pool.token1_price(), pool.token0_price().invert());
    }
}
