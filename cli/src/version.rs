//! Version reported by `flt --version`.

use const_format::concatcp;

/// Crate version from `Cargo.toml`.
pub const FLT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit embedded by the build script, or `unknown` outside a checkout.
pub const FLT_COMMIT: &str = match option_env!("FLT_CLI_COMMIT") {
    Some(commit) => commit,
    None => "unknown",
};

/// `0.1.0 (1a2b3c4d5)`
pub const FLT_LONG_VERSION: &str = concatcp!(FLT_VERSION, " (", FLT_COMMIT, ")");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_version_starts_with_crate_version() {
        assert!(FLT_LONG_VERSION.starts_with(FLT_VERSION));
        assert!(FLT_LONG_VERSION.ends_with(')'));
    }
}
