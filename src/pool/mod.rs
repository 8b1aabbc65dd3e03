//! The in-memory pool, its swap loop, and position math.

pub mod clmm_pool;
pub mod position;
pub mod swap;
