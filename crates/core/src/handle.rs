//! Creator handle normalisation.
//!
//! Handles arrive from the creator query as users typed them: with
//! surrounding whitespace, a leading `@`, or empty. The external liveness
//! endpoint expects the bare handle.

/// Normalise a raw handle for lookup against the liveness endpoint.
///
/// Rules:
/// - Trim surrounding whitespace.
/// - Strip a single leading `@`, then trim again.
/// - Return `None` if nothing remains.
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();
    if bare.is_empty() {
        None
    } else {
        Some(bare.to_string())
    }
}
