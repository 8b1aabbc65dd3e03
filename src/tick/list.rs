use crate::error::{Error, RangeError, SwapError};
use crate::tick::{Tick, TickDataProvider};

/// In-memory, pre-validated list of initialized ticks sorted by index.
///
/// Construction enforces the invariants the traversal relies on, so
/// lookups afterwards are plain binary searches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickListDataProvider {
    ticks: Vec<Tick>,
    tick_spacing: i32,
}

impl TickListDataProvider {
    /// Validates and wraps a tick list.
    ///
    /// Requires a positive spacing, every index a multiple of it,
    /// strictly ascending order, and net liquidity summing to zero
    /// across the whole list.
    pub fn new(ticks: Vec<Tick>, tick_spacing: i32) -> Result<Self, Error> {
        if tick_spacing <= 0 {
            return Err(RangeError::InvalidTickList.into());
        }

        let mut net_sum: i128 = 0;
        for (i, tick) in ticks.iter().enumerate() {
            if tick.index % tick_spacing != 0 {
                return Err(RangeError::TickMisaligned.into());
            }
            if i > 0 && ticks[i - 1].index >= tick.index {
                return Err(RangeError::InvalidTickList.into());
            }
            net_sum = net_sum
                .checked_add(tick.liquidity_net)
                .ok_or(RangeError::InvalidTickList)?;
        }
        if net_sum != 0 {
            return Err(RangeError::InvalidTickList.into());
        }

        Ok(Self {
            ticks,
            tick_spacing,
        })
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    fn is_below_smallest(&self, tick: i32) -> bool {
        debug_assert!(!self.ticks.is_empty());
        tick < self.ticks[0].index
    }

    fn is_at_or_above_largest(&self, tick: i32) -> bool {
        debug_assert!(!self.ticks.is_empty());
        tick >= self.ticks[self.ticks.len() - 1].index
    }

    /// Largest initialized tick at or below `tick`.
    fn tick_at_or_below(&self, tick: i32) -> &Tick {
        let idx = self.ticks.partition_point(|t| t.index <= tick);
        &self.ticks[idx - 1]
    }

    /// Smallest initialized tick strictly above `tick`.
    fn tick_above(&self, tick: i32) -> &Tick {
        let idx = self.ticks.partition_point(|t| t.index <= tick);
        &self.ticks[idx]
    }
}

impl TickDataProvider for TickListDataProvider {
    fn get_tick(&self, index: i32) -> Result<&Tick, Error> {
        if self.ticks.is_empty() {
            return Err(SwapError::NoTickData.into());
        }
        let idx = self
            .ticks
            .binary_search_by_key(&index, |t| t.index)
            .map_err(|_| RangeError::TickNotFound)?;
        Ok(&self.ticks[idx])
    }

    fn next_initialized_tick_within_one_word(
        &self,
        tick: i32,
        lte: bool,
        tick_spacing: i32,
    ) -> Result<(i32, bool), Error> {
        if self.ticks.is_empty() {
            return Err(SwapError::NoTickData.into());
        }

        let compressed = tick.div_euclid(tick_spacing);

        if lte {
            let word_pos = compressed >> 8;
            let minimum = (word_pos << 8) * tick_spacing;

            if self.is_below_smallest(tick) {
                return Ok((minimum, false));
            }

            let index = self.tick_at_or_below(tick).index;
            let next = minimum.max(index);
            Ok((next, next == index))
        } else {
            let word_pos = (compressed + 1) >> 8;
            let maximum = ((word_pos + 1) << 8) * tick_spacing - 1;

            if self.is_at_or_above_largest(tick) {
                return Ok((maximum, false));
            }

            let index = self.tick_above(tick).index;
            let next = maximum.min(index);
            Ok((next, next == index))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> TickListDataProvider {
        TickListDataProvider::new(
            vec![
                Tick::new(-200, 250, 250).unwrap(),
                Tick::new(0, 125, -125).unwrap(),
                Tick::new(100, 125, -125).unwrap(),
            ],
            1,
        )
        .unwrap()
    }

    #[test]
    fn rejects_bad_lists() {
        let low = Tick::new(-200, 250, 250).unwrap();
        let high = Tick::new(0, 250, -250).unwrap();

        assert!(matches!(
            TickListDataProvider::new(vec![low], 1),
            Err(Error::RangeError(RangeError::InvalidTickList))
        ));
        assert!(matches!(
            TickListDataProvider::new(vec![high, low], 1),
            Err(Error::RangeError(RangeError::InvalidTickList))
        ));
        assert!(matches!(
            TickListDataProvider::new(vec![low, high], 3),
            Err(Error::RangeError(RangeError::TickMisaligned))
        ));
        assert!(matches!(
            TickListDataProvider::new(vec![low, high], 0),
            Err(Error::RangeError(RangeError::InvalidTickList))
        ));
        assert!(TickListDataProvider::new(vec![low, high], 1).is_ok());
    }

    #[test]
    fn empty_list_reports_missing_data() {
        let provider = TickListDataProvider::new(vec![], 1).unwrap();
        assert!(matches!(
            provider.get_tick(0),
            Err(Error::SwapError(SwapError::NoTickData))
        ));
        assert!(matches!(
            provider.next_initialized_tick_within_one_word(0, true, 1),
            Err(Error::SwapError(SwapError::NoTickData))
        ));
    }

    #[test]
    fn get_tick_finds_exact_indices_only() {
        let provider = provider();
        assert_eq!(provider.get_tick(-200).unwrap().liquidity_net, 250);
        assert_eq!(provider.get_tick(100).unwrap().liquidity_gross, 125);
        assert!(matches!(
            provider.get_tick(1),
            Err(Error::RangeError(RangeError::TickNotFound))
        ));
    }

    #[test]
    fn finds_initialized_ticks_in_word() {
        let provider = provider();
        assert_eq!(
            provider
                .next_initialized_tick_within_one_word(-1, true, 1)
                .unwrap(),
            (-200, true)
        );
        assert_eq!(
            provider
                .next_initialized_tick_within_one_word(0, true, 1)
                .unwrap(),
            (0, true)
        );
        assert_eq!(
            provider
                .next_initialized_tick_within_one_word(1, false, 1)
                .unwrap(),
            (100, true)
        );
    }

    #[test]
    fn falls_back_to_word_boundaries() {
        let provider = provider();
        // below the smallest initialized tick
        assert_eq!(
            provider
                .next_initialized_tick_within_one_word(-258, true, 1)
                .unwrap(),
            (-512, false)
        );
        assert_eq!(
            provider
                .next_initialized_tick_within_one_word(-257, true, 1)
                .unwrap(),
            (-512, false)
        );
        // at or above the largest initialized tick
        assert_eq!(
            provider
                .next_initialized_tick_within_one_word(100, false, 1)
                .unwrap(),
            (255, false)
        );
        assert_eq!(
            provider
                .next_initialized_tick_within_one_word(255, false, 1)
                .unwrap(),
            (511, false)
        );
    }
}
