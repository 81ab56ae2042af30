//! Constants for the Steam market lister
//!
//! Defaults for everything the configuration file may leave out. A missing
//! config file runs the tool entirely on these values.

/// Pause between consecutive requests (in milliseconds)
pub const SHORT_DELAY_MS: u64 = 1_000;

/// Cooldown taken after every `COOLDOWN_EVERY` price lookups (in milliseconds)
pub const LONG_DELAY_MS: u64 = 60_000;

/// Number of price lookups between two long cooldowns
pub const COOLDOWN_EVERY: u32 = 20;

/// HTTP request timeout (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default `wantToSell` flag for newly tracked items
pub const DEFAULT_WANT_TO_SELL: bool = true;

/// Default ledger document
pub const DEFAULT_LEDGER_PATH: &str = "items.json";

/// Default config file looked up when none is given
pub const DEFAULT_CONFIG_PATH: &str = "steam-lister.toml";

/// Steam Community base URL
pub const STEAM_COMMUNITY_URL: &str = "https://steamcommunity.com";

/// Price overview endpoint (unauthenticated)
pub const PRICE_OVERVIEW_ENDPOINT: &str = "/market/priceoverview/";

/// Sell endpoint (form-encoded POST)
pub const SELL_ITEM_ENDPOINT: &str = "/market/sellitem/";

/// Market page, sent as the Referer of sell requests
pub const MARKET_ENDPOINT: &str = "/market/";

/// Steam currency code used for price lookups (1 = USD)
pub const DEFAULT_CURRENCY: u32 = 1;

/// Inventory language parameter
pub const DEFAULT_LANGUAGE: &str = "english";

/// Items requested per inventory call
pub const INVENTORY_PAGE_SIZE: u32 = 500;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Namespaces scanned when the config names none: `(appid, contextid, name)`
pub const DEFAULT_NAMESPACES: &[(u32, u64, &str)] = &[
    (753, 6, "Steam"),
    (730, 2, "CS:GO"),
    (570, 2, "Dota 2"),
    (440, 2, "TF2"),
    (238010, 1, "Deus Ex: Human Revolution"),
    (1091500, 1, "Cyberpunk 2077"),
];
