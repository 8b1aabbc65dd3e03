use crate::error::{Error, RemoteError, SwapError};
use crate::math::bit_math::least_significant_bit;
use crate::math::tick_math::{tick_to_word_compressed, MAX_TICK, MIN_TICK};
use crate::tick::{Tick, TickDataProvider, TickListDataProvider};
use crate::FastMap;
use alloy_primitives::aliases::I24;
use alloy_primitives::{Address, BlockNumber, U256};
use alloy_provider::Provider;
use alloy_sol_macro::sol;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

sol! {
    #[sol(rpc)]
    interface IClmmPool {
        function tickSpacing() external view returns (int24);
        function tickBitmap(int16 wordPosition) external view returns (uint256);
        function ticks(int24 tick) external view returns (uint128 liquidityGross, int128 liquidityNet);
    }
}

sol! {
    struct Call {
        address target;
        bytes callData;
    }

    #[sol(rpc)]
    interface IMulticall {
        function aggregate(Call[] calls)
            external
            view
            returns (uint256 blockNumber, bytes[] returnData);
    }
}

pub type RpcProvider<P> = Arc<P>;

/// Tick data hydrated from a live pool contract over JSON-RPC.
///
/// The full initialized-tick set is fetched once with [`fetch`] and
/// memoized, after which the provider answers the synchronous
/// [`TickDataProvider`] queries from memory. Queries before the fetch
/// fail with `SwapError::NoTickData`.
///
/// [`fetch`]: RemoteTickDataProvider::fetch
#[derive(Debug)]
pub struct RemoteTickDataProvider<P> {
    pub pool_address: Address,
    contract: IClmmPool::IClmmPoolInstance<RpcProvider<P>>,
    multicall: IMulticall::IMulticallInstance<RpcProvider<P>>,
    ticks: OnceCell<TickListDataProvider>,
}

impl<P> RemoteTickDataProvider<P>
where
    P: Provider + Send + Sync + 'static,
{
    pub fn new(pool_address: Address, multicall_address: Address, provider: RpcProvider<P>) -> Self {
        let contract = IClmmPool::IClmmPoolInstance::new(pool_address, provider.clone());
        let multicall = IMulticall::IMulticallInstance::new(multicall_address, provider);

        Self {
            pool_address,
            contract,
            multicall,
            ticks: OnceCell::new(),
        }
    }

    /// Fetches and memoizes all initialized ticks of the pool at the
    /// given optional block number. Subsequent calls return the cached
    /// list without touching the network.
    #[instrument(skip(self), fields(pool = %self.pool_address))]
    pub async fn fetch(
        &self,
        block_number: Option<BlockNumber>,
    ) -> Result<&TickListDataProvider, Error> {
        self.ticks
            .get_or_try_init(|| self.fetch_all(block_number))
            .await
    }

    async fn fetch_all(
        &self,
        block_number: Option<BlockNumber>,
    ) -> Result<TickListDataProvider, Error> {
        let tick_spacing = self.fetch_tick_spacing(block_number).await?;

        let min_word = tick_to_word_compressed(MIN_TICK, tick_spacing);
        let max_word = tick_to_word_compressed(MAX_TICK, tick_spacing);
        let word_positions: Vec<i16> = (min_word..=max_word).collect();

        let bitmaps = self
            .fetch_batch_bitmaps(&word_positions, block_number)
            .await?;
        let mut ticks = self
            .fetch_ticks_for_bitmaps(tick_spacing, &word_positions, &bitmaps, block_number)
            .await?;

        ticks.sort_unstable_by_key(|t| t.index);
        debug!(tick_count = ticks.len(), tick_spacing, "fetched tick data");

        TickListDataProvider::new(ticks, tick_spacing)
    }

    async fn fetch_tick_spacing(
        &self,
        block_number: Option<BlockNumber>,
    ) -> Result<i32, RemoteError> {
        let mut call = self.contract.tickSpacing();

        if let Some(bn) = block_number {
            call = call.block(bn.into());
        }

        let tick_spacing = call
            .call()
            .await
            .map_err(|e| RemoteError::FailedToGetTickSpacing(e.to_string()))?;

        Ok(tick_spacing.as_i32())
    }

    /// Fetches tick bitmap words through the multicall contract and
    /// returns a sparse map of the non-zero ones.
    async fn fetch_batch_bitmaps(
        &self,
        word_positions: &[i16],
        block_number: Option<BlockNumber>,
    ) -> Result<FastMap<i16, U256>, RemoteError> {
        let mut bitmap_calls: Vec<Call> = Vec::with_capacity(word_positions.len());

        for wp in word_positions {
            let call_data = self.contract.tickBitmap(*wp).calldata().to_owned();
            bitmap_calls.push(Call {
                target: self.pool_address,
                callData: call_data,
            });
        }

        let mut agg = self.multicall.aggregate(bitmap_calls);

        if let Some(bn) = block_number {
            agg = agg.block(bn.into());
        }
        let bitmap_data = agg
            .call()
            .await
            .map_err(|e| RemoteError::FailedToCallMulticall(e.to_string()))?;

        let mut bitmaps: FastMap<i16, U256> = FastMap::default();

        for (i, raw) in bitmap_data.returnData.into_iter().enumerate() {
            let decoded = self
                .contract
                .tickBitmap(word_positions[i])
                .decode_output(raw)
                .map_err(|e| RemoteError::FailedToDecodeBitmap(e.to_string()))?;

            let bitmap = U256::from(decoded);

            if !bitmap.is_zero() {
                bitmaps.insert(word_positions[i], bitmap);
            }
        }

        Ok(bitmaps)
    }

    /// Decodes per-tick liquidity for every set bitmap bit using a
    /// second batched multicall.
    async fn fetch_ticks_for_bitmaps(
        &self,
        tick_spacing: i32,
        word_positions: &[i16],
        bitmaps: &FastMap<i16, U256>,
        block_number: Option<BlockNumber>,
    ) -> Result<Vec<Tick>, Error> {
        let hint = bitmaps.len().saturating_mul(4);
        let mut tick_calls: Vec<Call> = Vec::with_capacity(hint);
        let mut tick_indices: Vec<i32> = Vec::with_capacity(hint);

        for &wp in word_positions {
            let Some(bitmap) = bitmaps.get(&wp) else {
                continue;
            };

            let mut remaining = *bitmap;
            while !remaining.is_zero() {
                let bit = least_significant_bit(remaining)?;
                remaining &= remaining - U256::ONE;

                let compressed: i32 = (wp as i32) * 256 + bit as i32;
                let tick_index: i32 = compressed * tick_spacing;

                let i24 = I24::try_from(tick_index)
                    .map_err(|e| RemoteError::FailedToDecodeTick(e.to_string()))?;
                let call_data = self.contract.ticks(i24).calldata().to_owned();

                tick_indices.push(tick_index);
                tick_calls.push(Call {
                    target: self.pool_address,
                    callData: call_data,
                });
            }
        }

        // nothing initialized, early exit
        if tick_calls.is_empty() {
            return Ok(Vec::new());
        }

        let mut agg = self.multicall.aggregate(tick_calls);

        if let Some(bn) = block_number {
            agg = agg.block(bn.into());
        }

        let return_data = agg
            .call()
            .await
            .map_err(|e| RemoteError::FailedToCallMulticall(e.to_string()))?;

        let mut ticks: Vec<Tick> = Vec::with_capacity(tick_indices.len());

        for (i, raw) in return_data.returnData.into_iter().enumerate() {
            let tick_index = tick_indices[i];

            let i24 = I24::try_from(tick_index)
                .map_err(|e| RemoteError::FailedToDecodeTick(e.to_string()))?;
            let decoded = self
                .contract
                .ticks(i24)
                .decode_output(raw)
                .map_err(|e| RemoteError::FailedToDecodeTick(e.to_string()))?;

            if decoded.liquidityGross != 0 {
                ticks.push(Tick::new(
                    tick_index,
                    decoded.liquidityGross,
                    decoded.liquidityNet,
                )?);
            }
        }

        Ok(ticks)
    }
}

impl<P> TickDataProvider for RemoteTickDataProvider<P> {
    fn get_tick(&self, index: i32) -> Result<&Tick, Error> {
        match self.ticks.get() {
            Some(list) => list.get_tick(index),
            None => Err(SwapError::NoTickData.into()),
        }
    }

    fn next_initialized_tick_within_one_word(
        &self,
        tick: i32,
        lte: bool,
        tick_spacing: i32,
    ) -> Result<(i32, bool), Error> {
        match self.ticks.get() {
            Some(list) => list.next_initialized_tick_within_one_word(tick, lte, tick_spacing),
            None => Err(SwapError::NoTickData.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use alloy_provider::transport::mock::Asserter;
    use alloy_provider::ProviderBuilder;

    pub fn mock_provider() -> Arc<impl Provider> {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new().connect_mocked_client(asserter.clone());
        Arc::new(provider)
    }

    #[test]
    fn constructs_without_touching_the_network() {
        let pool = address!("0x1000000000000000000000000000000000000000");
        let multicall = address!("0x2000000000000000000000000000000000000000");

        let provider = RemoteTickDataProvider::new(pool, multicall, mock_provider());
        assert_eq!(provider.pool_address, pool);
    }

    #[test]
    fn queries_fail_before_fetch() {
        let pool = address!("0x1000000000000000000000000000000000000000");
        let multicall = address!("0x2000000000000000000000000000000000000000");
        let provider = RemoteTickDataProvider::new(pool, multicall, mock_provider());

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
