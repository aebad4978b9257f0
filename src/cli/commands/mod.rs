//! CLI command implementations

pub mod cache;
pub mod cache_keys;
pub mod matrix;

pub use cache::execute as cache;
pub use cache_keys::execute as cache_keys;
pub use matrix::execute as matrix;
