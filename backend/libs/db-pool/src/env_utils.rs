//! Environment variable parsing helpers
//!
//! Used by the pool configuration for its `DB_*` tuning variables.

use std::str::FromStr;

/// Parse a variable, falling back to `default` when unset or unparsable
///
/// ```ignore
/// let port: u16 = parse_env_with_default("PORT", 5000);
/// ```
pub fn parse_env_with_default<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_with_default_ignores_garbage() {
        std::env::set_var("DBPOOL_TEST_LENIENT", "eight");
        let result: u32 = parse_env_with_default("DBPOOL_TEST_LENIENT", 8);
        assert_eq!(result, 8);

        std::env::set_var("DBPOOL_TEST_LENIENT", "16");
        let result: u32 = parse_env_with_default("DBPOOL_TEST_LENIENT", 8);
        assert_eq!(result, 16);
        std::env::remove_var("DBPOOL_TEST_LENIENT");
    }
}
