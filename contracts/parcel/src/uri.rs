// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Metadata URI templating.
//!
//! ERC-1155 metadata URIs carry an `{id}` placeholder that clients replace
//! with the token id as 64 lowercase hex digits. Resolving the template
//! on-chain keeps `uri(id)` a single call for consumers that do not
//! implement the client-side substitution rule.

use alloc::string::String;
use alloy_primitives::U256;

/// The reserved marker substituted with the token id.
pub const ID_PLACEHOLDER: &str = "{id}";

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Expands the first `{id}` marker in `template` into the token id rendered
/// as a zero-padded, 64-character lowercase hex string. Every byte outside
/// the marker is copied verbatim; a template without the marker is returned
/// unchanged.
pub fn replace_id_placeholder(template: &str, id: U256) -> String {
    let Some(pos) = template.find(ID_PLACEHOLDER) else {
        return template.into();
    };
    let mut out = String::with_capacity(template.len() - ID_PLACEHOLDER.len() + 64);
    out.push_str(&template[..pos]);
    for byte in id.to_be_bytes::<32>() {
        out.push(HEX_DIGITS[(byte >> 4) as usize] as char);
        out.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
    }
    out.push_str(&template[pos + ID_PLACEHOLDER.len()..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_id_as_padded_hex() {
        assert_eq!(
            replace_id_placeholder("https://x/{id}.json", U256::from(1)),
            "https://x/0000000000000000000000000000000000000000000000000000000000000001.json",
        );
    }

    #[test]
    fn hex_digits_are_lowercase() {
        let out = replace_id_placeholder("{id}", U256::from(0xabcdefu64));
        assert!(out.ends_with("abcdef"));
        assert_eq!(out.len(), 64);
    }

    #[test]
    fn output_length_matches_template() {
        let template = "ipfs://bafy/{id}/meta.json";
        let out = replace_id_placeholder(template, U256::from(77));
        assert_eq!(out.len(), template.len() - ID_PLACEHOLDER.len() + 64);
    }

    #[test]
    fn template_without_marker_passes_through() {
        let template = "https://static.example/collection.json";
        assert_eq!(replace_id_placeholder(template, U256::from(5)), template);
    }

    #[test]
    fn resolution_is_deterministic() {
        let template = "https://x/{id}";
        let id = U256::from(123456789u64);
        assert_eq!(
            replace_id_placeholder(template, id),
            replace_id_placeholder(template, id),
        );
    }

    #[test]
    fn max_id_fills_all_digits() {
        let out = replace_id_placeholder("{id}", U256::MAX);
        assert_eq!(out, "f".repeat(64));
    }

    #[test]
    fn marker_at_either_end() {
        assert!(replace_id_placeholder("{id}.json", U256::ZERO).ends_with(".json"));
        assert!(replace_id_placeholder("https://x/{id}", U256::ZERO).starts_with("https://x/"));
    }
}
