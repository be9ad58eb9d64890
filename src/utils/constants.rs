//! Shared constants and invariants

/// Cache key of the bearer token entry.
pub const TOKEN_CACHE_KEY: &str = "IM_TOKEN";
/// Shorter than the provider's `expires_in`.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 60;

pub const DEFAULT_API_HOST: &str = "a1.easemob.com";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_MAX_REDIRECTS: usize = 3;

pub const DEFAULT_CURSOR_DIR: &str = "easemob/txtfile";
pub const DEFAULT_DOWNLOAD_DIR: &str = "easemob/down";
pub const USER_CURSOR_FILE: &str = "userfile.txt";
pub const GROUP_CURSOR_FILE: &str = "groupfile.txt";

pub const AUTHORIZATION_PREFIX: &str = "Authorization:Bearer ";
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";
