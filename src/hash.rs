//! Hash map selection. `rustc-hash` is the default; `ahash` or the std
//! hasher can be chosen through feature flags instead.

#[cfg(all(
    feature = "rustc-hash",
    not(any(feature = "ahash", feature = "std-hash"))
))]
pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(all(
    feature = "ahash",
    not(any(feature = "rustc-hash", feature = "std-hash"))
))]
pub type FastMap<K, V> = ahash::AHashMap<K, V>;

// std fallback, also used when conflicting hasher features are enabled
#[cfg(any(
    feature = "std-hash",
    not(any(feature = "rustc-hash", feature = "ahash")),
    all(feature = "rustc-hash", feature = "ahash"),
))]
pub type FastMap<K, V> = std::collections::HashMap<K, V>;
