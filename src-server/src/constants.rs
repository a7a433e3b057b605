//! Application-wide constants
//!
//! Single source of truth for server defaults and environment variable
//! names.

/// Network port configuration
pub mod ports {
    /// Default HTTP port
    pub const SERVER: u16 = 3000;
}

/// Server host configuration
pub mod hosts {
    /// Default host for local server binding
    pub const LOCAL: &str = "127.0.0.1";
}

/// Data storage paths
pub mod paths {
    /// Directory holding config.json, relative to the working directory
    pub const DATA_DIR: &str = "data";
    pub const CONFIG_FILE: &str = "config.json";
}

/// Environment overrides applied on top of config.json
pub mod env {
    pub const BIND: &str = "DESIGN2WEB_BIND";
    pub const PORT: &str = "DESIGN2WEB_PORT";
    pub const DATA_DIR: &str = "DESIGN2WEB_DATA_DIR";
    pub const BACKEND: &str = "DESIGN2WEB_BACKEND";
    pub const MODEL: &str = "DESIGN2WEB_MODEL";
    pub const BASE_URL: &str = "DESIGN2WEB_BASE_URL";
    pub const DAILY_LIMIT: &str = "DESIGN2WEB_DAILY_LIMIT";
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
}

/// HTTP header carrying the caller's user id
pub mod headers {
    pub const USER_ID: &str = "x-user-id";
    /// Used when a request carries no user id
    pub const ANONYMOUS_USER: &str = "anonymous";
    /// CSP for uploaded assets; markup formats such as SVG get no script
    /// or subresource access when opened directly
    pub const ASSET_CSP: &str = "sandbox; default-src 'none'";
}
