use crate::error::{Error, MathError, SwapError};
use crate::math::full_math::mul_div;
use crate::math::liquidity_math::add_delta;
use crate::math::swap_math::compute_swap_step;
use crate::math::tick_math::{
    get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO,
    MIN_TICK,
};
use crate::pool::clmm_pool::Pool;
use crate::price::Percent;
use crate::tick::TickDataProvider;
use crate::U256_1;
use alloy_primitives::{I256, U256};
use std::ops::{Add, Sub};
use tracing::{debug, trace};

/// Derives a sqrt-price limit from a slippage tolerance relative to
/// the current price, in the given swap direction.
pub fn sqrt_price_limit_with_tolerance(
    sqrt_price_x96: U256,
    zero_for_one: bool,
    tolerance: &Percent,
) -> Result<U256, Error> {
    let factor = if zero_for_one {
        tolerance
            .denominator()
            .checked_sub(tolerance.numerator())
            .ok_or(MathError::Underflow)?
    } else {
        tolerance
            .denominator()
            .checked_add(tolerance.numerator())
            .ok_or(MathError::Overflow)?
    };

    Ok(mul_div(sqrt_price_x96, factor, tolerance.denominator())?)
}

/// The full result of a simulated swap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Signed token0 delta from the pool's perspective: positive means
    /// the pool received token0.
    pub amount0: I256,
    /// Signed token1 delta from the pool's perspective.
    pub amount1: I256,
    pub sqrt_price_x96: U256,
    pub tick: i32,
    /// In-range liquidity after the swap.
    pub liquidity: u128,
    /// Total fees charged, denominated in the input token.
    pub fee_amount: U256,
    /// Portion of the specified amount the pool could not fill before
    /// hitting the price limit. Zero for a fully executed swap.
    pub amount_specified_remaining: I256,
}

// the top level state of the swap, the results of which are recorded at the end
struct SwapState {
    // the amount remaining to be swapped in/out of the input/output asset
    amount_specified_remaining: I256,
    // the amount already swapped out/in of the output/input asset
    amount_calculated: I256,
    // current sqrt(price)
    sqrt_price_x96: U256,
    // the tick associated with the current price
    tick: i32,
    // the current liquidity in range
    liquidity: u128,
    // accumulated swap fees
    fee_amount: U256,
}

#[derive(Default)]
struct StepComputations {
    // the price at the beginning of the step
    sqrt_price_start_x96: U256,
    // the next tick to swap to from the current tick in the swap direction
    tick_next: i32,
    // whether tick_next is initialized or not
    initialized: bool,
    // sqrt(price) for the next tick (1/0)
    sqrt_price_next_x96: U256,
    // how much is being swapped in in this step
    amount_in: U256,
    // how much is being swapped out
    amount_out: U256,
    // how much fee is being paid in
    fee_amount: U256,
}

impl<D: TickDataProvider> Pool<D> {
    /// Simulates a swap against the pool snapshot.
    ///
    /// A positive `amount_specified` is an exact-input swap, a negative
    /// one exact-output. When no `sqrt_price_limit_x96` is given the
    /// swap may move the price all the way to the global bound; with an
    /// explicit limit the swap stops there and the unfilled portion is
    /// reported in [`SwapOutcome::amount_specified_remaining`].
    pub fn swap(
        &self,
        zero_for_one: bool,
        amount_specified: I256,
        sqrt_price_limit_x96: Option<U256>,
    ) -> Result<SwapOutcome, Error> {
        if amount_specified.is_zero() {
            return Ok(SwapOutcome {
                amount0: I256::ZERO,
                amount1: I256::ZERO,
                sqrt_price_x96: self.sqrt_price_x96,
                tick: self.tick,
                liquidity: self.liquidity,
                fee_amount: U256::ZERO,
                amount_specified_remaining: I256::ZERO,
            });
        }

        let sqrt_price_limit_x96 = sqrt_price_limit_x96.unwrap_or(if zero_for_one {
            MIN_SQRT_RATIO + U256_1
        } else {
            MAX_SQRT_RATIO - U256_1
        });

        if zero_for_one {
            if (sqrt_price_limit_x96 >= self.sqrt_price_x96)
                || (sqrt_price_limit_x96 <= MIN_SQRT_RATIO)
            {
                return Err(SwapError::PriceLimitOutOfBounds.into());
            }
        } else if (sqrt_price_limit_x96 <= self.sqrt_price_x96)
            || (sqrt_price_limit_x96 >= MAX_SQRT_RATIO)
        {
            return Err(SwapError::PriceLimitOutOfBounds.into());
        }

        let exact_input: bool = amount_specified.is_positive();

        let mut state = SwapState {
            amount_specified_remaining: amount_specified,
            amount_calculated: I256::ZERO,
            sqrt_price_x96: self.sqrt_price_x96,
            tick: self.tick,
            liquidity: self.liquidity,
            fee_amount: U256::ZERO,
        };

        while (state.amount_specified_remaining != I256::ZERO)
            && (state.sqrt_price_x96 != sqrt_price_limit_x96)
        {
            let mut step = StepComputations {
                sqrt_price_start_x96: state.sqrt_price_x96,
                ..StepComputations::default()
            };

            (step.tick_next, step.initialized) =
                self.tick_data.next_initialized_tick_within_one_word(
                    state.tick,
                    zero_for_one,
                    self.tick_spacing,
                )?;

            step.tick_next = step.tick_next.clamp(MIN_TICK, MAX_TICK);

            step.sqrt_price_next_x96 = get_sqrt_ratio_at_tick(step.tick_next)?;

            (
                state.sqrt_price_x96,
                step.amount_in,
                step.amount_out,
                step.fee_amount,
            ) = compute_swap_step(
                state.sqrt_price_x96,
                if zero_for_one {
                    if step.sqrt_price_next_x96 < sqrt_price_limit_x96 {
                        sqrt_price_limit_x96
                    } else {
                        step.sqrt_price_next_x96
                    }
                } else if step.sqrt_price_next_x96 > sqrt_price_limit_x96 {
                    sqrt_price_limit_x96
                } else {
                    step.sqrt_price_next_x96
                },
                state.liquidity,
                state.amount_specified_remaining,
                self.fee_pips,
            )?;

            state.fee_amount += step.fee_amount;

            if exact_input {
                state.amount_specified_remaining -=
                    I256::from_raw(step.amount_in + step.fee_amount);
                state.amount_calculated =
                    state.amount_calculated.sub(I256::from_raw(step.amount_out));
            } else {
                state.amount_specified_remaining += I256::from_raw(step.amount_out);
                state.amount_calculated = state
                    .amount_calculated
                    .add(I256::from_raw(step.amount_in + step.fee_amount));
            }

            trace!(
                tick_next = step.tick_next,
                initialized = step.initialized,
                amount_in = %step.amount_in,
                amount_out = %step.amount_out,
                fee = %step.fee_amount,
                "swap step"
            );

            if state.sqrt_price_x96 == step.sqrt_price_next_x96 {
                if step.initialized {
                    let mut liquidity_net = self.tick_data.get_tick(step.tick_next)?.liquidity_net;
                    if zero_for_one {
                        liquidity_net = -liquidity_net;
                    }
                    state.liquidity = add_delta(state.liquidity, liquidity_net)?;
                }
                state.tick = if zero_for_one {
                    step.tick_next - 1
                } else {
                    step.tick_next
                };
            } else if state.sqrt_price_x96 != step.sqrt_price_start_x96 {
                state.tick = get_tick_at_sqrt_ratio(state.sqrt_price_x96)?;
            }
        }

        let (amount0, amount1): (I256, I256) = if zero_for_one == exact_input {
            (
                amount_specified - state.amount_specified_remaining,
                state.amount_calculated,
            )
        } else {
            (
                state.amount_calculated,
                amount_specified - state.amount_specified_remaining,
            )
        };

        debug!(
            amount0 = %amount0,
            amount1 = %amount1,
            sqrt_price = %state.sqrt_price_x96,
            tick = state.tick,
            "swap simulated"
        );

        Ok(SwapOutcome {
            amount0,
            amount1,
            sqrt_price_x96: state.sqrt_price_x96,
            tick: state.tick,
            liquidity: state.liquidity,
            fee_amount: state.fee_amount,
            amount_specified_remaining: state.amount_specified_remaining,
        })
    }
}

impl<D: TickDataProvider + Clone> Pool<D> {
    /// Exact-input quote: the output amount produced by swapping
    /// `amount_in` of the input token, plus the pool state afterwards.
    ///
    /// Without an explicit price limit the input must be fully
    /// consumable, otherwise `SwapError::InsufficientLiquidity` is
    /// returned. With a limit the swap may fill partially.
    pub fn get_output_amount(
        &self,
        zero_for_one: bool,
        amount_in: U256,
        sqrt_price_limit_x96: Option<U256>,
    ) -> Result<(U256, Pool<D>), Error> {
        if amount_in > I256::MAX.into_raw() {
            return Err(MathError::Overflow.into());
        }

        let outcome = self.swap(zero_for_one, I256::from_raw(amount_in), sqrt_price_limit_x96)?;

        if sqrt_price_limit_x96.is_none() && !outcome.amount_specified_remaining.is_zero() {
            return Err(SwapError::InsufficientLiquidity.into());
        }

        let amount_out = if zero_for_one {
            outcome.amount1
        } else {
            outcome.amount0
        };

        Ok(((-amount_out).into_raw(), self.after(&outcome)?))
    }

    /// Exact-output quote: the input amount required to receive
    /// `amount_out` of the output token, plus the pool state
    /// afterwards.
    ///
    /// Without an explicit price limit the output must be fully
    /// deliverable, otherwise `SwapError::InsufficientLiquidity` is
    /// returned.
    pub fn get_input_amount(
        &self,
        zero_for_one: bool,
        amount_out: U256,
        sqrt_price_limit_x96: Option<U256>,
    ) -> Result<(U256, Pool<D>), Error> {
        if amount_out > I256::MAX.into_raw() {
            return Err(MathError::Overflow.into());
        }

        let outcome = self.swap(
            zero_for_one,
            -I256::from_raw(amount_out),
            sqrt_price_limit_x96,
        )?;

        if sqrt_price_limit_x96.is_none() && !outcome.amount_specified_remaining.is_zero() {
            return Err(SwapError::InsufficientLiquidity.into());
        }

        let amount_in = if zero_for_one {
            outcome.amount0
        } else {
            outcome.amount1
        };

        Ok((amount_in.into_raw(), self.after(&outcome)?))
    }

    /// A new pool snapshot carrying the post-swap state.
    fn after(&self, outcome: &SwapOutcome) -> Result<Pool<D>, Error> {
        Pool::with_raw_fee(
            self.token0,
            self.token1,
            self.fee_pips,
            self.tick_spacing,
            outcome.sqrt_price_x96,
            outcome.liquidity,
            outcome.tick,
            self.tick_data.clone(),
        )
    }
}
