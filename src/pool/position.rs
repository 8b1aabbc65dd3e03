use crate::error::{Error, MathError, RangeError};
use crate::math::full_math::{sqrt, to_u256, to_u512};
use crate::math::liquidity_math::max_liquidity_for_amounts;
use crate::math::sqrt_price_math::{get_amount_0_delta, get_amount_1_delta};
use crate::math::tick_math::{
    get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO,
    MIN_TICK,
};
use crate::pool::clmm_pool::Pool;
use crate::price::{Percent, PriceRatio};
use crate::tick::{NoTickDataProvider, TickDataProvider};
use crate::U256_1;
use alloy_primitives::U256;

/// A liquidity position on a pool over the tick range
/// `[tick_lower, tick_upper)`.
#[derive(Clone, Copy, Debug)]
pub struct Position<'a, D> {
    pub pool: &'a Pool<D>,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
}

impl<'a, D: TickDataProvider> Position<'a, D> {
    pub fn new(
        pool: &'a Pool<D>,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<Self, Error> {
        if tick_lower >= tick_upper {
            return Err(RangeError::TickOrder.into());
        }
        if tick_lower < MIN_TICK || tick_upper > MAX_TICK {
            return Err(RangeError::TickOutOfBounds.into());
        }
        if tick_lower % pool.tick_spacing != 0 || tick_upper % pool.tick_spacing != 0 {
            return Err(RangeError::TickMisaligned.into());
        }

        Ok(Self {
            pool,
            tick_lower,
            tick_upper,
            liquidity,
        })
    }

    /// The position whose liquidity is the most that the given token
    /// amounts can fund at the pool's current price.
    ///
    /// `use_full_precision` selects the exact token0 liquidity formula;
    /// keep it `false` when the result will be re-minted through
    /// periphery-style contracts, which truncate.
    pub fn from_amounts(
        pool: &'a Pool<D>,
        tick_lower: i32,
        tick_upper: i32,
        amount0: U256,
        amount1: U256,
        use_full_precision: bool,
    ) -> Result<Self, Error> {
        let sqrt_ratio_lower = get_sqrt_ratio_at_tick(tick_lower)?;
        let sqrt_ratio_upper = get_sqrt_ratio_at_tick(tick_upper)?;

        let liquidity = max_liquidity_for_amounts(
            pool.sqrt_price_x96,
            sqrt_ratio_lower,
            sqrt_ratio_upper,
            amount0,
            amount1,
            use_full_precision,
        )?;
        if liquidity.bit_len() > 128 {
            return Err(MathError::Overflow.into());
        }

        Self::new(pool, tick_lower, tick_upper, liquidity.to::<u128>())
    }

    /// Largest position fundable with only `amount0` of token0.
    pub fn from_amount_0(
        pool: &'a Pool<D>,
        tick_lower: i32,
        tick_upper: i32,
        amount0: U256,
        use_full_precision: bool,
    ) -> Result<Self, Error> {
        Self::from_amounts(
            pool,
            tick_lower,
            tick_upper,
            amount0,
            U256::MAX,
            use_full_precision,
        )
    }

    /// Largest position fundable with only `amount1` of token1.
    pub fn from_amount_1(
        pool: &'a Pool<D>,
        tick_lower: i32,
        tick_upper: i32,
        amount1: U256,
    ) -> Result<Self, Error> {
        // the token1 formula is exact, full precision costs nothing
        Self::from_amounts(pool, tick_lower, tick_upper, U256::MAX, amount1, true)
    }

    /// Price of token0 at the lower edge of the range.
    pub fn token0_price_lower(&self) -> Result<PriceRatio, Error> {
        Ok(PriceRatio::from_sqrt_ratio_x96(get_sqrt_ratio_at_tick(
            self.tick_lower,
        )?))
    }

    /// Price of token0 at the upper edge of the range.
    pub fn token0_price_upper(&self) -> Result<PriceRatio, Error> {
        Ok(PriceRatio::from_sqrt_ratio_x96(get_sqrt_ratio_at_tick(
            self.tick_upper,
        )?))
    }

    /// Amount of token0 the position would pay out if burned, rounded
    /// down.
    pub fn amount0(&self) -> Result<U256, Error> {
        self.amounts(false).map(|(amount0, _)| amount0)
    }

    /// Amount of token1 the position would pay out if burned, rounded
    /// down.
    pub fn amount1(&self) -> Result<U256, Error> {
        self.amounts(false).map(|(_, amount1)| amount1)
    }

    /// Token amounts required to mint the position, rounded up.
    pub fn mint_amounts(&self) -> Result<(U256, U256), Error> {
        self.amounts(true)
    }

    /// Token amounts owed at current liquidity, rounded up when minting
    /// and down when burning.
    fn amounts(&self, round_up: bool) -> Result<(U256, U256), Error> {
        let sqrt_ratio_lower = get_sqrt_ratio_at_tick(self.tick_lower)?;
        let sqrt_ratio_upper = get_sqrt_ratio_at_tick(self.tick_upper)?;

        if self.pool.tick < self.tick_lower {
            Ok((
                get_amount_0_delta(sqrt_ratio_lower, sqrt_ratio_upper, self.liquidity, round_up)?,
                U256::ZERO,
            ))
        } else if self.pool.tick < self.tick_upper {
            Ok((
                get_amount_0_delta(
                    self.pool.sqrt_price_x96,
                    sqrt_ratio_upper,
                    self.liquidity,
                    round_up,
                )?,
                get_amount_1_delta(
                    sqrt_ratio_lower,
                    self.pool.sqrt_price_x96,
                    self.liquidity,
                    round_up,
                )?,
            ))
        } else {
            Ok((
                U256::ZERO,
                get_amount_1_delta(sqrt_ratio_lower, sqrt_ratio_upper, self.liquidity, round_up)?,
            ))
        }
    }

    /// The sqrt prices after shifting the current price down and up by
    /// the tolerance, clamped just inside the global bounds.
    fn ratios_after_slippage(&self, tolerance: &Percent) -> Result<(U256, U256), Error> {
        let price_sq = {
            let wide = to_u512(self.pool.sqrt_price_x96);
            wide * wide
        };
        let denominator = to_u512(tolerance.denominator());
        let numerator = to_u512(tolerance.numerator());

        let shifted_down = denominator
            .checked_sub(numerator)
            .ok_or(MathError::Underflow)?;
        let shifted_up = denominator
            .checked_add(numerator)
            .ok_or(MathError::Overflow)?;

        let mut sqrt_ratio_lower = to_u256(sqrt(
            price_sq
                .checked_mul(shifted_down)
                .ok_or(MathError::Overflow)?
                / denominator,
        ))?;
        if sqrt_ratio_lower <= MIN_SQRT_RATIO {
            sqrt_ratio_lower = MIN_SQRT_RATIO + U256_1;
        }

        let mut sqrt_ratio_upper = to_u256(sqrt(
            price_sq
                .checked_mul(shifted_up)
                .ok_or(MathError::Overflow)?
                / denominator,
        ))?;
        if sqrt_ratio_upper >= MAX_SQRT_RATIO {
            sqrt_ratio_upper = MAX_SQRT_RATIO - U256_1;
        }

        Ok((sqrt_ratio_lower, sqrt_ratio_upper))
    }

    /// A pool identical to this position's pool but repriced, used to
    /// evaluate the position at the edges of the tolerated price range.
    fn counterfactual_pool(&self, sqrt_price_x96: U256) -> Result<Pool<NoTickDataProvider>, Error> {
        Pool::with_raw_fee(
            self.pool.token0,
            self.pool.token1,
            self.pool.fee_pips,
            self.pool.tick_spacing,
            sqrt_price_x96,
            0,
            get_tick_at_sqrt_ratio(sqrt_price_x96)?,
            NoTickDataProvider,
        )
    }

    /// Largest token amounts a mint transaction must be allowed to
    /// spend so that it still succeeds anywhere within the slippage
    /// tolerance.
    ///
    /// The liquidity is re-derived with the truncating formula first,
    /// mirroring what the minting contract will actually compute from
    /// the supplied amounts.
    pub fn mint_amounts_with_slippage(&self, tolerance: &Percent) -> Result<(U256, U256), Error> {
        let (sqrt_ratio_lower, sqrt_ratio_upper) = self.ratios_after_slippage(tolerance)?;

        let pool_lower = self.counterfactual_pool(sqrt_ratio_lower)?;
        let pool_upper = self.counterfactual_pool(sqrt_ratio_upper)?;

        let (amount0, amount1) = self.mint_amounts()?;
        let created = Position::from_amounts(
            self.pool,
            self.tick_lower,
            self.tick_upper,
            amount0,
            amount1,
            false,
        )?;

        // token0 demand peaks at the upper price bound, token1 at the lower
        let (amount0, _) = Position::new(
            &pool_upper,
            self.tick_lower,
            self.tick_upper,
            created.liquidity,
        )?
        .mint_amounts()?;
        let (_, amount1) = Position::new(
            &pool_lower,
            self.tick_lower,
            self.tick_upper,
            created.liquidity,
        )?
        .mint_amounts()?;

        Ok((amount0, amount1))
    }

    /// Smallest token amounts a burn transaction is guaranteed to
    /// receive anywhere within the slippage tolerance.
    pub fn burn_amounts_with_slippage(&self, tolerance: &Percent) -> Result<(U256, U256), Error> {
        let (sqrt_ratio_lower, sqrt_ratio_upper) = self.ratios_after_slippage(tolerance)?;

        let pool_lower = self.counterfactual_pool(sqrt_ratio_lower)?;
        let pool_upper = self.counterfactual_pool(sqrt_ratio_upper)?;

        let amount0 = Position::new(
            &pool_upper,
            self.tick_lower,
            self.tick_upper,
            self.liquidity,
        )?
        .amount0()?;
        let amount1 = Position::new(
            &pool_lower,
            self.tick_lower,
            self.tick_upper,
            self.liquidity,
        )?
        .amount1()?;

        Ok((amount0, amount1))
    }
}
