//! Build metadata generated by the build script.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Crate version from the manifest
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// User-Agent sent with every storefront request
pub fn user_agent() -> String {
    format!("{}/{} ({})", PRODUCT_NAME, version(), GIT_HASH)
}

/// Multi-line version text for `--version`
pub fn long_version() -> String {
    format!("{}\nbuilt: {}\ncommit: {}", version(), BUILD_TIME, GIT_HASH)
}
