//! Inference constants
//!
//! Provider endpoints, model names and request defaults.

/// Registry keys for the built-in backends
pub mod backends {
    pub const GEMINI: &str = "gemini";
    pub const OPENAI: &str = "openai";
}

/// Default values for backend configuration
pub mod defaults {
    pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
    pub const GEMINI_MODEL: &str = "gemini-2.5-flash";
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
    pub const OPENAI_MODEL: &str = "gpt-4o-mini";
    /// Output token cap; a full page of HTML/CSS/JS is long
    pub const MAX_TOKENS: u32 = 8192;
    pub const TEMPERATURE: f32 = 0.2;
    /// Upstream request timeout
    pub const TIMEOUT_SECS: u64 = 120;
    /// MIME type assumed for design images without one
    pub const IMAGE_MIME: &str = "image/jpeg";
}
