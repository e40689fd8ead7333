/// Constants module to avoid magic numbers in the codebase

// Identity
pub const APP_NAME: &str = "cachedcomplete";

/// Cache key name used when the program identity is unknown
pub const UNKNOWN_PROGRAM_NAME: &str = "unknown";

// Cache Layout
/// Directory created under the system temp dir to hold cache files
pub const CACHE_DIR_NAME: &str = ".cachedcomplete";

/// Files with this extension are hashed by default
pub const DEFAULT_SOURCE_EXTENSION: &str = "py";

// Cache File Format
pub const ENTRY_MAGIC: [u8; 4] = *b"CCMP";
pub const ENTRY_FORMAT_VERSION: u32 = 1;

// Configuration
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOCAL_CONFIG_FILE: &str = ".cachedcomplete.toml";
pub const CONFIG_ENV_PREFIX: &str = "CACHEDCOMPLETE_";
