//! Property tests for share token encoding/decoding

use bip39::Language;
use hiershamir::codec::{VERSION_WORD, encode_token, parse_token};
use hiershamir::domain::{FieldElement, LineageId, ShareIndex, ShareToken};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

/// Wrapper for share tokens with a non-empty value and 1 to 6 indices
#[derive(Clone, Debug)]
struct ArbitraryToken(ShareToken);

impl Arbitrary for ArbitraryToken {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut value = Vec::<u8>::arbitrary(g);
        if value.is_empty() {
            value.push(u8::arbitrary(g));
        }

        let depth = (usize::arbitrary(g) % 6) + 1;
        let indices = (0..depth)
            .map(|_| ShareIndex::new((u8::arbitrary(g) % 255) + 1).unwrap())
            .collect();

        let mut lineage = [0u8; LineageId::LEN];
        for byte in &mut lineage {
            *byte = u8::arbitrary(g);
        }

        ArbitraryToken(ShareToken::new(
            FieldElement::from_secret(&value).unwrap(),
            indices,
            LineageId::from_bytes(lineage),
        ))
    }
}

/// Test that every token survives encoding exactly, value length included
#[quickcheck]
fn prop_token_round_trip(token: ArbitraryToken) -> bool {
    let ArbitraryToken(token) = token;

    let Ok(mnemonic) = encode_token(&token) else {
        return false;
    };

    if !mnemonic.as_str().starts_with(&format!("{VERSION_WORD} ")) {
        return false;
    }

    parse_token(mnemonic.as_str()) == Ok(token)
}

/// Test that parsing ignores letter case and extra whitespace
#[quickcheck]
fn prop_parse_tolerates_case_and_spacing(token: ArbitraryToken) -> bool {
    let ArbitraryToken(token) = token;
    let Ok(mnemonic) = encode_token(&token) else {
        return false;
    };

    let shouted = mnemonic
        .as_str()
        .split(' ')
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("  \t");

    parse_token(&shouted) == Ok(token)
}

/// Test that replacing any one data word never yields a different token
#[quickcheck]
fn prop_word_substitution_detected(token: ArbitraryToken, position: usize, word: u16) -> bool {
    let ArbitraryToken(token) = token;
    let Ok(mnemonic) = encode_token(&token) else {
        return false;
    };

    let mut words: Vec<&str> = mnemonic.as_str().split(' ').collect();
    let target = (position % (words.len() - 1)) + 1;
    let replacement = Language::English.word_list()[usize::from(word % 2048)];
    if words[target] == replacement {
        return true;
    }
    words[target] = replacement;

    match parse_token(&words.join(" ")) {
        Err(_) => true,
        Ok(parsed) => parsed == token,
    }
}

/// Test that dropping trailing words is always rejected
#[quickcheck]
fn prop_truncation_detected(token: ArbitraryToken, cut: usize) -> bool {
    let ArbitraryToken(token) = token;
    let Ok(mnemonic) = encode_token(&token) else {
        return false;
    };

    let words: Vec<&str> = mnemonic.as_str().split(' ').collect();
    let keep = 1 + cut % (words.len() - 1);

    parse_token(&words[..keep].join(" ")).is_err()
}
