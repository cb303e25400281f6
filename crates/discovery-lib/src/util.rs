//! ID generation and content hashing utilities.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::error::{DiscoveryError, Result};

// ============================================================================
// ID Generation
// ============================================================================

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MIN_HASH_LEN: usize = 4;
const MAX_HASH_LEN: usize = 8;
const FALLBACK_HASH_LEN: usize = 12;
const NONCES_PER_LENGTH: u32 = 10;

/// Generate an id of the form `<prefix>-<base36 hash>`.
///
/// The hash is taken over the title, creation time, collection size and a
/// nonce. Its length starts short and grows with `count`; `exists` reports
/// collisions, which are retried with the next nonce and then a longer hash.
pub fn generate_id<F>(
    prefix: &str,
    title: &str,
    created_at: DateTime<Utc>,
    count: usize,
    exists: F,
) -> String
where
    F: Fn(&str) -> bool,
{
    let seed = |nonce: u32| {
        format!(
            "{title}|{}|{count}|{nonce}",
            created_at.timestamp_nanos_opt().unwrap_or_default()
        )
    };

    for length in hash_length_for(count)..=MAX_HASH_LEN {
        for nonce in 0..NONCES_PER_LENGTH {
            let id = format!("{prefix}-{}", base36_digest(&seed(nonce), length));
            if !exists(&id) {
                return id;
            }
        }
    }

    let mut nonce = NONCES_PER_LENGTH;
    loop {
        let id = format!("{prefix}-{}", base36_digest(&seed(nonce), FALLBACK_HASH_LEN));
        if !exists(&id) {
            return id;
        }
        nonce += 1;
    }
}

/// Shortest hash length whose birthday-collision odds stay under 25% for
/// `count` existing ids.
fn hash_length_for(count: usize) -> usize {
    let n = count as f64;
    (MIN_HASH_LEN..=MAX_HASH_LEN)
        .find(|&len| {
            let space = 36_f64.powi(i32::try_from(len).unwrap_or(i32::MAX));
            1.0 - (-n * n / (2.0 * space)).exp() < 0.25
        })
        .unwrap_or(MAX_HASH_LEN)
}

/// First `length` base36 digits of the SHA256 of `input`, left-padded with
/// zeros.
fn base36_digest(input: &str, length: usize) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let mut num = u64::from_be_bytes(head);

    let mut digits = Vec::with_capacity(13);
    while num > 0 {
        digits.push(BASE36[(num % 36) as usize]);
        num /= 36;
    }
    while digits.len() < length {
        digits.push(b'0');
    }
    digits.iter().rev().take(length).map(|&b| char::from(b)).collect()
}

// ============================================================================
// ID Resolution
// ============================================================================

/// Resolve user input against a set of known IDs.
///
/// Tries: exact match, prefix-normalized, then a unique substring of the
/// hash portion. `Ok(None)` when nothing matches.
///
/// # Errors
///
/// Returns `AmbiguousId` when the substring matches several IDs.
pub fn resolve_partial_id(ids: &[&str], prefix: &str, input: &str) -> Result<Option<String>> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Ok(None);
    }

    // Exact match
    if ids.contains(&input.as_str()) {
        return Ok(Some(input));
    }

    // Prefix-normalized
    if !input.contains('-') {
        let with_prefix = format!("{prefix}-{input}");
        if ids.contains(&with_prefix.as_str()) {
            return Ok(Some(with_prefix));
        }
    }

    // Substring match on hash portion
    let hash_pattern = input
        .rfind('-')
        .map_or(input.as_str(), |pos| &input[pos + 1..]);
    if hash_pattern.is_empty() {
        return Ok(None);
    }

    let matches: Vec<String> = ids
        .iter()
        .filter(|id| {
            let hash = id.rfind('-').map_or(**id, |pos| &id[pos + 1..]);
            hash.contains(hash_pattern)
        })
        .map(|id| (*id).to_string())
        .collect();

    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.into_iter().next()),
        _ => Err(DiscoveryError::AmbiguousId {
            partial: input,
            matches,
        }),
    }
}

// ============================================================================
// Content Hashing
// ============================================================================

/// SHA256 hex digest of serialized content, used to skip redundant backups.
#[must_use]
pub fn content_hash(contents: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id("idea", "Dark mode", Utc::now(), 0, |_| false);
        assert!(id.starts_with("idea-"));
        assert_eq!(id.len(), "idea-".len() + 4);
        assert!(
            id["idea-".len()..]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_generate_id_collision_handling() {
        let mut generated = HashSet::new();
        let now = Utc::now();
        let id1 = generate_id("proj", "Same", now, 0, |id| generated.contains(id));
        generated.insert(id1.clone());
        let id2 = generate_id("proj", "Same", now, 0, |id| generated.contains(id));
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_id_deterministic_for_same_inputs() {
        let now = Utc::now();
        let a = generate_id("idea", "T", now, 3, |_| false);
        let b = generate_id("idea", "T", now, 3, |_| false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_length_grows_with_count() {
        assert_eq!(hash_length_for(0), 4);
        assert!(hash_length_for(100_000) > 4);
        assert_eq!(hash_length_for(usize::MAX), 8);
    }

    #[test]
    fn test_resolve_partial_id() {
        let ids = ["proj-a1b2", "proj-c3d4", "proj-a1zz"];
        assert_eq!(
            resolve_partial_id(&ids, "proj", "PROJ-C3D4").unwrap(),
            Some("proj-c3d4".to_string())
        );
        assert_eq!(
            resolve_partial_id(&ids, "proj", "c3").unwrap(),
            Some("proj-c3d4".to_string())
        );
        assert!(matches!(
            resolve_partial_id(&ids, "proj", "a1"),
            Err(DiscoveryError::AmbiguousId { .. })
        ));
        assert_eq!(resolve_partial_id(&ids, "proj", "  ").unwrap(), None);
        assert_eq!(resolve_partial_id(&ids, "proj", "zzzz").unwrap(), None);
    }

    #[test]
    fn test_base36_digest_pads_and_truncates() {
        let short = base36_digest("x", 4);
        let long = base36_digest("x", 12);
        assert_eq!(short.len(), 4);
        assert_eq!(long.len(), 12);
        assert!(long.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_content_hash() {
        let h1 = content_hash("{}");
        assert_eq!(h1, content_hash("{}"));
        assert_ne!(h1, content_hash("[]"));
        assert_eq!(h1.len(), 64);
    }
}
