// ABOUTME: Tests for PKCE pair generation
// ABOUTME: Verifier alphabet and length, hex challenge and uniqueness
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tiktok_studio::constants::oauth::{CODE_VERIFIER_LENGTH, VERIFIER_ALPHABET};
use tiktok_studio::oauth2_client::PkcePair;

#[test]
fn test_verifier_shape() {
    for _ in 0..50 {
        let pair = PkcePair::generate();
        assert_eq!(pair.verifier.chars().count(), CODE_VERIFIER_LENGTH);
        assert!(pair
            .verifier
            .bytes()
            .all(|b| VERIFIER_ALPHABET.contains(&b)));
    }
}

#[test]
fn test_challenge_is_lowercase_hex_sha256() {
    for _ in 0..50 {
        let pair = PkcePair::generate();
        assert_eq!(pair.challenge.len(), 64);
        assert!(pair
            .challenge
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(
            pair.challenge,
            hex::encode(Sha256::digest(pair.verifier.as_bytes()))
        );
    }
}

#[test]
fn test_known_challenge() {
    // sha256("abc")
    assert_eq!(
        PkcePair::challenge_for("abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_pairs_are_unique() {
    let verifiers: HashSet<String> = (0..100).map(|_| PkcePair::generate().verifier).collect();
    assert_eq!(verifiers.len(), 100);
}
