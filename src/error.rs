use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - underflow")]
    Underflow,
    #[error("Math error - division by zero")]
    DivisionByZero,
    #[error("BitMath error - zero input value")]
    ZeroValue,
}

/// Violations of the static bounds and ordering rules that pool state,
/// ticks and prices must satisfy before any simulation can run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("Range error - tick out of bounds")]
    TickOutOfBounds,
    #[error("Range error - sqrtPrice out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("Range error - lower tick must be below upper tick")]
    TickOrder,
    #[error("Range error - tick is not a multiple of the tick spacing")]
    TickMisaligned,
    #[error("Range error - fee exceeds one million pips")]
    FeeOutOfBounds,
    #[error("Range error - pool tokens must be distinct")]
    IdenticalTokens,
    #[error("Range error - token does not belong to the pool")]
    TokenNotInPool,
    #[error("Range error - sqrtPrice does not match the current tick")]
    PriceTickMismatch,
    #[error("Range error - tick list is unsorted or its net liquidity is non-zero")]
    InvalidTickList,
    #[error("Range error - tick is not present in the tick list")]
    TickNotFound,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwapError {
    #[error("Swap error - sqrtPrice limit on the wrong side of the current price")]
    PriceLimitOutOfBounds,
    #[error("Swap error - sqrtPrice is 0")]
    SqrtPriceIsZero,
    #[error("Swap error - requested amount exceeds pool reserves")]
    InsufficientReserves,
    #[error("Swap error - pool liquidity cannot satisfy the requested amount")]
    InsufficientLiquidity,
    #[error("Swap error - no tick data available, fetch tick data and retry")]
    NoTickData,
}

#[cfg(feature = "remote")]
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote error - failed to read tick spacing: {0}")]
    FailedToGetTickSpacing(String),
    #[error("Remote error - failed to call multicall aggregate: {0}")]
    FailedToCallMulticall(String),
    #[error("Remote error - failed to decode bitmap word: {0}")]
    FailedToDecodeBitmap(String),
    #[error("Remote error - failed to decode tick data: {0}")]
    FailedToDecodeTick(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    MathError(#[from] crate::error::MathError),

    #[error(transparent)]
    RangeError(#[from] crate::error::RangeError),

    #[error(transparent)]
    SwapError(#[from] crate::error::SwapError),

    #[cfg(feature = "remote")]
    #[error(transparent)]
    RemoteError(#[from] crate::error::RemoteError),
}
