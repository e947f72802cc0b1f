//! Incremental UTF-8 decoding for streaming byte sources.
//!
//! Multi-byte sequences may be split across chunk boundaries; the
//! accumulator holds the incomplete suffix (at most 3 bytes) until the
//! next chunk arrives. Invalid sequences decode to U+FFFD and decoding
//! always makes forward progress.

/// Chunk-boundary-safe UTF-8 decoder state.
#[derive(Debug, Default)]
pub struct Utf8Accumulator {
    // Incomplete suffix of the previous chunk, never a full sequence.
    partial: Vec<u8>,
}

impl Utf8Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the last chunk ended mid-sequence.
    pub fn has_partial(&self) -> bool {
        !self.partial.is_empty()
    }

    /// Decode `bytes` into `out`, resolving any suffix carried from the
    /// previous chunk first.
    pub fn push(&mut self, bytes: &[u8], out: &mut String) {
        let mut rest = bytes;
        while !self.partial.is_empty() && !rest.is_empty() {
            let want = match sequence_len(self.partial[0]) {
                // A carried byte that cannot start a sequence is invalid on
                // its own; emit a replacement and rescan what followed it.
                0 => {
                    out.push(char::REPLACEMENT_CHARACTER);
                    let tail = self.partial.split_off(1);
                    self.partial = tail;
                    continue;
                }
                len => len.saturating_sub(self.partial.len()),
            };
            if want == 0 {
                break;
            }
            let take = want.min(rest.len());
            self.partial.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            if take < want {
                // Still incomplete; wait for the next chunk.
                return;
            }
            let pending = std::mem::take(&mut self.partial);
            decode_run(&pending, &mut self.partial, out);
        }
        if !rest.is_empty() {
            decode_run(rest, &mut self.partial, out);
        }
    }

    /// Flush a trailing incomplete sequence as U+FFFD so the stream is never
    /// silently truncated at end of input.
    pub fn finish(&mut self, out: &mut String) {
        if self.partial.is_empty() {
            return;
        }
        out.push_str(&String::from_utf8_lossy(&self.partial));
        self.partial.clear();
    }
}

fn sequence_len(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

// Decode a byte run, replacing invalid sequences and stashing a trailing
// incomplete sequence into `partial`.
fn decode_run(mut bytes: &[u8], partial: &mut Vec<u8>, out: &mut String) {
    while !bytes.is_empty() {
        match std::str::from_utf8(bytes) {
            Ok(text) => {
                out.push_str(text);
                return;
            }
            Err(err) => {
                let valid = err.valid_up_to();
                if valid > 0 {
                    out.push_str(std::str::from_utf8(&bytes[..valid]).expect("valid prefix"));
                }
                match err.error_len() {
                    Some(bad) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        bytes = &bytes[valid + bad..];
                    }
                    None => {
                        partial.extend_from_slice(&bytes[valid..]);
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_all(chunks: &[&[u8]]) -> (String, Utf8Accumulator) {
        let mut acc = Utf8Accumulator::new();
        let mut out = String::new();
        for chunk in chunks {
            acc.push(chunk, &mut out);
        }
        (out, acc)
    }

    #[test]
    fn two_byte_sequence_split_across_chunks() {
        let (out, acc) = push_all(&[&[0xC3], &[0x97]]);
        assert_eq!(out, "×");
        assert!(!acc.has_partial());
    }

    #[test]
    fn four_byte_sequence_split_with_trailing_ascii() {
        // 😀 is F0 9F 98 80.
        let (out, acc) = push_all(&[&[0xF0, 0x9F], &[0x98, 0x80, b'!']]);
        assert_eq!(out, "😀!");
        assert!(!acc.has_partial());
    }

    #[test]
    fn chunk_can_end_with_a_fresh_incomplete_sequence() {
        // One complete €, then the first byte of another.
        let (out, acc) = push_all(&[&[0xE2], &[0x82, 0xAC, 0xE2]]);
        assert_eq!(out, "€");
        assert!(acc.has_partial());
    }

    #[test]
    fn invalid_bytes_are_replaced_and_decoding_continues() {
        let (out, acc) = push_all(&[&[0xFF, b'f']]);
        assert_eq!(out, "\u{FFFD}f");
        assert!(!acc.has_partial());
    }

    #[test]
    fn carried_sequence_invalidated_by_later_bytes() {
        // E2 expects two continuation bytes; 'A' and 'B' are not.
        let (out, acc) = push_all(&[&[0xE2], &[b'A', b'B']]);
        assert_eq!(out, "\u{FFFD}AB");
        assert!(!acc.has_partial());
    }

    #[test]
    fn short_invalid_carry_resolves_at_finish() {
        // A single non-continuation byte is not enough to fill the sequence,
        // so it stays carried until finish flushes it lossily.
        let (mut out, mut acc) = push_all(&[&[0xE2], &[b'A']]);
        assert_eq!(out, "");
        assert!(acc.has_partial());

        acc.finish(&mut out);
        assert_eq!(out, "\u{FFFD}A");
        assert!(!acc.has_partial());
    }

    #[test]
    fn finish_flushes_incomplete_suffix() {
        let mut acc = Utf8Accumulator::new();
        let mut out = String::new();
        acc.push(&[0xE2, 0x82], &mut out);
        assert_eq!(out, "");
        assert!(acc.has_partial());

        acc.finish(&mut out);
        assert_eq!(out, "\u{FFFD}");
        assert!(!acc.has_partial());
    }

    #[test]
    fn finish_without_partial_is_a_no_op() {
        let mut acc = Utf8Accumulator::new();
        let mut out = String::from("kept");
        acc.finish(&mut out);
        assert_eq!(out, "kept");
    }

    #[test]
    fn plain_ascii_round_trips_unchanged() {
        let (out, acc) = push_all(&[b"hello ", b"world"]);
        assert_eq!(out, "hello world");
        assert!(!acc.has_partial());
    }
}
