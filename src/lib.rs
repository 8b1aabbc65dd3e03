//! Off-chain concentrated-liquidity pool math and swap simulation.
//!
//! All arithmetic is integer-only and mirrors the on-chain fixed-point
//! contracts bit for bit, so simulated quotes match what the pool
//! itself would return.
//!
//! This crate exposes:
//! - Low-level math primitives (`math::*`) for ticks, sqrt prices,
//!   liquidity deltas and single swap steps.
//! - An in-memory [`Pool`] that walks initialized ticks to quote and
//!   simulate whole swaps.
//! - [`Position`] math for deposit and withdrawal amounts, with
//!   slippage-adjusted variants.
//! - An optional `remote` provider that hydrates tick data from a
//!   live pool over RPC.
//!
//! # Examples
//!
//! ## Pure math
//! ```
//! use clmm_sim::{math::tick_math, RESOLUTION, U256};
//!
//! let sqrt_price = tick_math::get_sqrt_ratio_at_tick(0).unwrap();
//! assert!(sqrt_price > U256::ZERO);
//! assert_eq!(RESOLUTION, 96);
//! ```
//!
//! ## Quoting a swap against an in-memory pool
//! ```
//! use clmm_sim::{
//!     math::tick_math::nearest_usable_tick,
//!     price::encode_sqrt_ratio_x96,
//!     tick::{Tick, TickListDataProvider},
//!     Address, FeeTier, Pool, U256,
//! };
//!
//! let spacing = FeeTier::Medium.tick_spacing();
//! let lower = nearest_usable_tick(-887272, spacing);
//! let upper = nearest_usable_tick(887272, spacing);
//! let liquidity = 1_000_000_000_000_000_000u128;
//! let ticks = TickListDataProvider::new(
//!     vec![
//!         Tick::new(lower, liquidity, liquidity as i128).unwrap(),
//!         Tick::new(upper, liquidity, -(liquidity as i128)).unwrap(),
//!     ],
//!     spacing,
//! )
//! .unwrap();
//!
//! let pool = Pool::new(
//!     Address::from([1u8; 20]),
//!     Address::from([2u8; 20]),
//!     FeeTier::Medium,
//!     encode_sqrt_ratio_x96(U256::from(1u8), U256::from(1u8)).unwrap(),
//!     liquidity,
//!     0,
//!     ticks,
//! )
//! .unwrap();
//!
//! let (amount_out, _) = pool
//!     .get_output_amount(true, U256::from(1_000u64), None)
//!     .unwrap();
//! assert!(amount_out > U256::ZERO);
//! ```

pub use alloy_primitives::{Address, I256, U256};

pub mod error;
mod hash;
pub mod math;
pub mod pool;
pub mod price;
pub mod tick;

pub use hash::FastMap;

pub use pool::clmm_pool::{FeeTier, Pool};
pub use pool::position::Position;
pub use pool::swap::SwapOutcome;
pub use tick::{NoTickDataProvider, Tick, TickDataProvider, TickListDataProvider};

pub(crate) const U256_1: U256 = U256::from_limbs([1, 0, 0, 0]);

pub(crate) const U160_MAX: U256 = U256::from_limbs([0, 0, 4294967296, 0]);
pub(crate) const U256_E6: U256 = U256::from_limbs([1000000, 0, 0, 0]);

pub const RESOLUTION: u8 = 96;
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);
