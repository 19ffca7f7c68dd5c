//! Best-effort email masking.

/// Masks an email address for display or logging.
///
/// Keeps the first three characters of the local part and the domain
/// without its first character:
///
/// ```text
/// abcdefgh@example.com  →  abc***@xample.com
/// ```
///
/// This is a mask, not validation. Input with no `@`, a local part shorter
/// than three characters, or a one-character domain comes back unchanged.
pub fn redact(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };

    // Count chars, not bytes, so a multi-byte character is never cut in half.
    if local.chars().count() < 3 {
        return email.to_string();
    }
    let prefix_len: usize = local.chars().take(3).map(char::len_utf8).sum();

    let mut domain_chars = domain.chars();
    if domain_chars.next().is_none() || domain_chars.as_str().is_empty() {
        return email.to_string();
    }

    format!("{}***@{}", &local[..prefix_len], domain_chars.as_str())
}
