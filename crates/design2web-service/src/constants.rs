//! Service-wide constants
//!
//! Single source of truth for request limits and quota defaults.

/// Request size limits
pub mod limits {
    /// Maximum prompt length, in characters
    pub const MAX_PROMPT_CHARS: usize = 10_000;
    /// Maximum base64 image payload, in bytes of encoded text
    pub const MAX_IMAGE_BASE64_LEN: usize = 10 * 1024 * 1024;
    /// Maximum decoded asset size
    pub const MAX_ASSET_BYTES: usize = 10 * 1024 * 1024;
}

/// Daily usage defaults
pub mod quota {
    /// Design analyses allowed per user per day
    pub const DAILY_LIMIT: u32 = 3;
}

/// Routes the service hands out in generated HTML
pub mod routes {
    /// Prefix for uploaded asset URLs
    pub const ASSET_URL_PREFIX: &str = "/api/assets/";
}
