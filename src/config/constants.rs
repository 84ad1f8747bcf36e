// * Configuration Constants
// * Central location for all default thresholds, budgets and timeouts

// * Cache entry lifetime in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

// * Number of discovery results folded into a cache key
pub const DEFAULT_DISCOVERY_KEY_DEPTH: usize = 5;

// * Upper bound on in-memory cache entries before the oldest is evicted
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

// * Token budgets per component type
pub const MAX_TOKENS_GENERIC: u32 = 500;
pub const MAX_TOKENS_HERO: u32 = 400;
pub const MAX_TOKENS_ARTICLE: u32 = 1200;
pub const MAX_TOKENS_CTA: u32 = 300;

// * Sampling temperature per intent
pub const TEMPERATURE_COMMERCIAL: f32 = 0.8;
pub const TEMPERATURE_INFORMATIONAL: f32 = 0.6;
pub const TEMPERATURE_EDUCATIONAL: f32 = 0.5;
pub const TEMPERATURE_NAVIGATIONAL: f32 = 0.4;

// * Downstream auto-approval threshold (consumed by the persistence collaborator)
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.75;

// * Generation stats log capacity (oldest entries are dropped)
pub const DEFAULT_STATS_LOG_CAPACITY: usize = 1000;

// * Whole-request deadline for the page engine
pub const DEFAULT_REQUEST_DEADLINE_SECS: u64 = 90;

// * Session interest vector: local cache lifetime and write-back TTL
pub const INTEREST_CACHE_SECS: u64 = 300;
pub const INTEREST_TTL_SECS: u64 = 1800;

// * Session vectors held in process before the oldest is evicted
pub const INTEREST_MAX_SESSIONS: usize = 10_000;

// * Additive boost applied to an interest matched by a query keyword
pub const INTEREST_QUERY_BOOST: f64 = 0.2;

// * Minimum trimmed query length accepted by generators and the engine
pub const MIN_QUERY_LENGTH: usize = 2;

// * Provider request timeouts in seconds
pub const OPENAI_TIMEOUT_SECS: u64 = 30;
pub const ANTHROPIC_TIMEOUT_SECS: u64 = 60;
pub const GOOGLE_TIMEOUT_SECS: u64 = 45;

// * Provider identifiers recognized in preference lists
pub const PROVIDER_OPENAI: &str = "openai";
pub const PROVIDER_ANTHROPIC: &str = "anthropic";
pub const PROVIDER_GOOGLE: &str = "google";
pub const PROVIDER_STATIC: &str = "static";
pub const KNOWN_PROVIDERS: [&str; 4] = [
    PROVIDER_OPENAI,
    PROVIDER_ANTHROPIC,
    PROVIDER_GOOGLE,
    PROVIDER_STATIC,
];
