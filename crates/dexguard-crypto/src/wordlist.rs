//! Version-1 recovery wordlist: a fixed combinatorial syllable table.
//!
//! Instead of enumerating thousands of dictionary words, the v1 list is
//! defined by a 256-entry syllable table (16 onsets × 16 rimes). Every
//! byte maps to exactly one three-letter syllable and every recovery
//! word is three syllables, so one word encodes three bytes:
//!
//! ```text
//! byte 0xB7 → onset[0xB] = "s", rime[0x7] = "en" → "sen"
//! [0xB7, 0x00, 0xFF] → "sen" + "bab" + "zon" → "senbabzon"
//! ```
//!
//! The table is frozen: changing any entry is a new wordlist version,
//! because existing phrases would decode to different bytes.

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Wordlist version. Bump when the syllable table changes.
pub const WORDLIST_VERSION: u8 = 1;

/// Byte length of one syllable.
pub const SYLLABLE_LEN: usize = 3;

/// Number of syllables per recovery word.
pub const SYLLABLES_PER_WORD: usize = 3;

/// Character length of one recovery word.
pub const WORD_LEN: usize = SYLLABLE_LEN * SYLLABLES_PER_WORD;

/// Bytes encoded by one recovery word.
pub const BYTES_PER_WORD: usize = SYLLABLES_PER_WORD;

/// Syllable onsets, indexed by the high nibble of the encoded byte.
const ONSETS: [char; 16] = [
    'b', 'd', 'f', 'g', 'h', 'k', 'l', 'm', 'n', 'p', 'r', 's', 't', 'v', 'w', 'z',
];

/// Syllable rimes, indexed by the low nibble of the encoded byte.
const RIMES: [&str; 16] = [
    "ab", "ad", "al", "an", "eb", "ed", "el", "en", "ib", "id", "il", "in", "ob", "od", "ol", "on",
];

// ---------------------------------------------------------------------------
// Byte <-> syllable
// ---------------------------------------------------------------------------

/// Returns the syllable encoding `byte`.
pub fn byte_to_syllable(byte: u8) -> String {
    let mut syl = String::with_capacity(SYLLABLE_LEN);
    syl.push(ONSETS[(byte >> 4) as usize]);
    syl.push_str(RIMES[(byte & 0x0F) as usize]);
    syl
}

/// Decodes a single syllable back to its byte, or `None` if the
/// syllable is not in the table.
pub fn syllable_to_byte(syllable: &str) -> Option<u8> {
    if syllable.len() != SYLLABLE_LEN || !syllable.is_ascii() {
        return None;
    }
    let mut chars = syllable.chars();
    let onset = chars.next()?;
    let high = ONSETS.iter().position(|&o| o == onset)?;
    let low = RIMES.iter().position(|&r| r == &syllable[1..])?;
    Some(((high << 4) | low) as u8)
}

// ---------------------------------------------------------------------------
// Bytes <-> word
// ---------------------------------------------------------------------------

/// Encodes three bytes as one nine-letter recovery word.
pub fn bytes_to_word(bytes: &[u8; BYTES_PER_WORD]) -> String {
    let mut word = String::with_capacity(WORD_LEN);
    for &b in bytes {
        word.push_str(&byte_to_syllable(b));
    }
    word
}

/// Decodes one recovery word back to its three bytes, or `None` if the
/// word is not in the v1 wordlist (wrong length, non-ASCII, or an
/// unknown syllable).
pub fn word_to_bytes(word: &str) -> Option<[u8; BYTES_PER_WORD]> {
    if word.len() != WORD_LEN || !word.is_ascii() {
        return None;
    }
    let mut out = [0u8; BYTES_PER_WORD];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = syllable_to_byte(&word[i * SYLLABLE_LEN..(i + 1) * SYLLABLE_LEN])?;
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_has_a_unique_syllable() {
        let mut seen = std::collections::HashSet::new();
        for b in 0..=255u8 {
            let syl = byte_to_syllable(b);
            assert_eq!(syl.len(), SYLLABLE_LEN);
            assert!(seen.insert(syl), "duplicate syllable for byte {b:#04x}");
        }
    }

    #[test]
    fn syllable_roundtrip_all_bytes() {
        for b in 0..=255u8 {
            let syl = byte_to_syllable(b);
            assert_eq!(syllable_to_byte(&syl), Some(b));
        }
    }

    #[test]
    fn known_encodings() {
        assert_eq!(byte_to_syllable(0x00), "bab");
        assert_eq!(byte_to_syllable(0xFF), "zon");
        assert_eq!(byte_to_syllable(0xB7), "sen");
    }

    #[test]
    fn unknown_syllables_rejected() {
        assert_eq!(syllable_to_byte("xab"), None); // onset not in table
        assert_eq!(syllable_to_byte("bxx"), None); // rime not in table
        assert_eq!(syllable_to_byte("ba"), None); // too short
        assert_eq!(syllable_to_byte("babb"), None); // too long
    }

    #[test]
    fn word_roundtrip() {
        let bytes = [0x00, 0x7F, 0xFF];
        let word = bytes_to_word(&bytes);
        assert_eq!(word.len(), WORD_LEN);
        assert_eq!(word_to_bytes(&word), Some(bytes));
    }

    #[test]
    fn malformed_words_rejected() {
        assert_eq!(word_to_bytes("babbab"), None); // 6 chars
        assert_eq!(word_to_bytes("babbabbabbab"), None); // 12 chars
        assert_eq!(word_to_bytes("babbabxab"), None); // bad final syllable
        assert_eq!(word_to_bytes("bábbabbab"), None); // non-ASCII
    }
}
