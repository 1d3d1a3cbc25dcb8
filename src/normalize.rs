//! Input normalisation helpers for host names, share names and usernames.
//!
//! The front end passes every user-supplied string through one of these
//! before building a [`crate::models::ProbeRequest`]. Passwords are never
//! touched: leading or trailing spaces may be part of the secret.

/// Normalise a host: trim whitespace and strip `smb://` or `\\` prefixes and trailing separators.
///
/// Returns an empty string when nothing is left; emptiness is rejected later by request validation.
pub fn normalize_host(input: &str) -> String {
    let trimmed = input.trim();
    let without_scheme = strip_prefix_ignore_case(trimmed, "smb://")
        .or_else(|| strip_prefix_ignore_case(trimmed, "cifs://"))
        .unwrap_or(trimmed);
    let without_unc = without_scheme.trim_start_matches(['\\', '/']);

    // A pasted UNC or URL may carry the share too: keep only the host part
    without_unc
        .split(['\\', '/'])
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Normalise a share name: trim whitespace and surrounding path separators.
pub fn normalize_share_name(input: &str) -> String {
    input
        .trim()
        .trim_matches(['\\', '/'])
        .trim()
        .to_string()
}

/// Normalise a username: trim whitespace only (`DOMAIN\user` stays intact).
pub fn normalize_username(input: &str) -> String {
    input.trim().to_string()
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    if value.len() >= prefix.len()
        && value.is_char_boundary(prefix.len())
        && value[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}
