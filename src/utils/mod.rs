pub mod token;
pub mod constants;
pub mod config_loader;
pub mod cache;

pub use token::Token;
pub use constants::*;
pub use config_loader::*;
pub use cache::{CacheItem, CacheStats, MarketStateCache};
