use std::time::Duration;

/// Access token lifetime used when the configured value is missing or invalid.
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);

/// Refresh token lifetime used when the configured value is missing or invalid.
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Shortest lifetime a token or cookie may have; `exp` and `Max-Age` count whole seconds.
pub const MIN_TTL: Duration = Duration::from_secs(1);

/// Longest accepted lifetime (100 years).
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Parse a compact duration such as `"1500ms"`, `"30s"`, `"15m"`, `"12h"` or `"7d"`.
///
/// Returns `None` for anything else, including an empty number, a missing or
/// unknown unit, whitespace, or a value outside `MIN_TTL..=MAX_TTL`.
pub fn parse_ttl(expr: &str) -> Option<Duration> {
    let split = expr.find(|c: char| !c.is_ascii_digit())?;
    let (digits, unit) = expr.split_at(split);
    if digits.is_empty() {
        return None;
    }

    let amount: u64 = digits.parse().ok()?;
    let millis_per_unit: u64 = match unit {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        _ => return None,
    };

    amount
        .checked_mul(millis_per_unit)
        .map(Duration::from_millis)
        .filter(|ttl| (MIN_TTL..=MAX_TTL).contains(ttl))
}

/// Parse `expr` if present, falling back to `fallback` when absent or invalid.
pub fn ttl_or(expr: Option<&str>, fallback: Duration) -> Duration {
    expr.and_then(parse_ttl).unwrap_or(fallback)
}
