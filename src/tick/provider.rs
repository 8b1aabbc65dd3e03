use crate::error::{Error, SwapError};
use crate::tick::Tick;

/// Source of initialized-tick data for a pool.
///
/// The swap loop only ever asks two questions: the data for a tick it
/// is about to cross, and the next initialized tick within the current
/// 256-tick bitmap word.
pub trait TickDataProvider {
    fn get_tick(&self, index: i32) -> Result<&Tick, Error>;

    /// Returns the next initialized tick at most one word away, and
    /// whether it is actually initialized. When no initialized tick
    /// exists inside the word, the word-boundary tick is returned with
    /// `false` so the caller can skip ahead in one step.
    ///
    /// `lte` selects the search direction: `true` scans at or below
    /// `tick`, `false` scans strictly above it.
    fn next_initialized_tick_within_one_word(
        &self,
        tick: i32,
        lte: bool,
        tick_spacing: i32,
    ) -> Result<(i32, bool), Error>;
}

/// Provider for pools constructed without tick data. Every query
/// fails, so anything that needs to cross a tick surfaces the absence
/// instead of silently misquoting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoTickDataProvider;

impl TickDataProvider for NoTickDataProvider {
    fn get_tick(&self, _index: i32) -> Result<&Tick, Error> {
        Err(SwapError::NoTickData.into())
    }

    fn next_initialized_tick_within_one_word(
        &self,
        _tick: i32,
        _lte: bool,
        _tick_spacing: i32,
    ) -> Result<(i32, bool), Error> {
        Err(SwapError::NoTickData.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn no_data_provider_always_fails() {
        let provider = NoTickDataProvider;
        assert!(matches!(
            provider.get_tick(0),
            Err(Error::SwapError(SwapError::NoTickData))
        ));
        assert!(matches!(
            provider.next_initialized_tick_within_one_word(0, true, 1),
            Err(Error::SwapError(SwapError::NoTickData))
        ));
    }
}
