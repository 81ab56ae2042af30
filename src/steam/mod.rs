//! Steam Community implementations of the marketplace traits

pub mod client;
pub mod inventory;
pub mod market;
pub mod price_overview;

pub use client::SteamClient;
pub use inventory::SteamInventorySource;
pub use market::SteamMarketLister;
pub use price_overview::SteamPriceOracle;
