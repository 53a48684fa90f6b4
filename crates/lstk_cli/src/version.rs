use std::sync::OnceLock;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Release builds set these at compile time.
pub const COMMIT: Option<&str> = option_env!("LSTK_COMMIT");
pub const BUILD_DATE: Option<&str> = option_env!("LSTK_BUILD_DATE");

/// `{version} ({commit}, {date})`, as printed after the binary name.
pub fn long_version() -> &'static str {
    static LINE: OnceLock<String> = OnceLock::new();
    LINE.get_or_init(|| {
        format!(
            "{VERSION} ({}, {})",
            COMMIT.unwrap_or("none"),
            BUILD_DATE.unwrap_or("unknown")
        )
    })
}
