//! Hashing System - SHA-256 Fingerprints
//!
//! The fingerprint is a provenance stamp shown on the document. It is NOT an
//! authentication or tamper-proofing mechanism against a hostile party.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::answers::AnswerSet;

/// Compute SHA-256 hash of bytes, return lowercase hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintPayload<'a> {
    trust_type: &'a str,
    answers: &'a AnswerSet,
}

/// Compact JSON of `{ trustType, answers }`, answers in collection order.
pub fn fingerprint_payload(
    type_id: &str,
    answers: &AnswerSet,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&FingerprintPayload {
        trust_type: type_id,
        answers,
    })
}

/// 64-character lowercase hex digest over the type id and answers
pub fn fingerprint(type_id: &str, answers: &AnswerSet) -> Result<String, serde_json::Error> {
    let payload = fingerprint_payload(type_id, answers)?;
    Ok(sha256_hex(payload.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers() -> AnswerSet {
        AnswerSet::new()
            .with("grantorName", "John Roe")
            .with("trusteeName", "Mary Roe")
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_payload_shape() {
        let payload = fingerprint_payload("revocable", &answers()).unwrap();
        assert_eq!(
            payload,
            r#"{"trustType":"revocable","answers":{"grantorName":"John Roe","trusteeName":"Mary Roe"}}"#
        );
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let h1 = fingerprint("revocable", &answers()).unwrap();
        let h2 = fingerprint("revocable", &answers()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_fingerprint_tracks_values_and_type() {
        let base = fingerprint("revocable", &answers()).unwrap();
        let edited = answers().with("trusteeName", "Mary Roe ");
        let changed = fingerprint("revocable", &edited).unwrap();
        let other_type = fingerprint("private_common_law", &answers()).unwrap();
        assert_ne!(base, changed);
        assert_ne!(base, other_type);
    }

    #[test]
    fn test_fingerprint_depends_on_order() {
        let forward = AnswerSet::new().with("a", "1").with("b", "2");
        let reverse = AnswerSet::new().with("b", "2").with("a", "1");
        assert_ne!(
            fingerprint("t", &forward).unwrap(),
            fingerprint("t", &reverse).unwrap()
        );
    }
}
