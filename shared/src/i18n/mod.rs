//! User-visible strings. Swap `current` to localize the defaults.

pub mod en;

pub use en as current;
