// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output integrity — SHA-256 fingerprints of written documents.

use sha2::{Digest, Sha256};

use crate::error::BildbandError;

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
///
/// The assembler fingerprints every PDF it writes; the CLI re-reads the file
/// and checks the fingerprint when `--verify` is given.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Verify that `data` matches the expected SHA-256 hex digest.
pub fn verify_hash(data: &[u8], expected_hex: &str) -> Result<(), BildbandError> {
    let actual = hash_bytes(data);
    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(BildbandError::IntegrityMismatch {
            expected: expected_hex.to_owned(),
            actual,
        })
    }
}
