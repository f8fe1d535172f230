use alloy_primitives::Address;

/// The number of leading characters kept when truncating an address for display.
pub const TRUNCATE_START: usize = 10;

/// The number of trailing characters kept when truncating an address for display.
pub const TRUNCATE_END: usize = 10;

/// Truncates an address string to `start` leading and `end` trailing characters joined by an
/// ellipsis.
///
/// An empty input yields an empty string. Inputs shorter than `start` or `end` are not padded, so
/// the prefix and suffix may overlap.
#[must_use]
pub fn truncate_address(address: &str, start: usize, end: usize) -> String {
    if address.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = address.chars().collect();
    let prefix: String = chars.iter().take(start).collect();
    let suffix: String = chars[chars.len().saturating_sub(end)..].iter().collect();
    format!("{prefix}...{suffix}")
}

/// Truncates the checksummed form of an [Address] with the default prefix and suffix lengths.
#[must_use]
pub fn short_address(address: &Address) -> String {
    truncate_address(&address.to_checksum(None), TRUNCATE_START, TRUNCATE_END)
}
