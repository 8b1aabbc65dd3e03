//! Initialized ticks and the providers that serve them to the swap loop.

use crate::error::{Error, RangeError};
use crate::math::tick_math::{MAX_TICK, MIN_TICK};

mod list;
mod provider;
#[cfg(feature = "remote")]
mod remote;

pub use list::TickListDataProvider;
pub use provider::{NoTickDataProvider, TickDataProvider};
#[cfg(feature = "remote")]
pub use remote::RemoteTickDataProvider;

/// A single initialized tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    pub index: i32,
    /// Total liquidity referencing this tick from either side.
    pub liquidity_gross: u128,
    /// Liquidity added (or removed, if negative) when the tick is
    /// crossed left to right.
    pub liquidity_net: i128,
}

impl Tick {
    pub fn new(index: i32, liquidity_gross: u128, liquidity_net: i128) -> Result<Self, Error> {
        if !(MIN_TICK..=MAX_TICK).contains(&index) {
            return Err(RangeError::TickOutOfBounds.into());
        }
        Ok(Self {
            index,
            liquidity_gross,
            liquidity_net,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_bounds_indices() {
        assert!(Tick::new(MIN_TICK - 1, 0, 0).is_err());
        assert!(Tick::new(MAX_TICK + 1, 0, 0).is_err());
    }

    #[test]
    fn accepts_boundary_indices() {
        assert!(Tick::new(MIN_TICK, 1, 1).is_ok());
        assert!(Tick::new(MAX_TICK, 1, -1).is_ok());
    }
}
