//! LZF decompression.
//!
//! An LZF stream is a sequence of tokens, each starting with a control byte:
//!
//! - `ctrl < 32`: a literal run, the next `ctrl + 1` input bytes are copied as is.
//! - `ctrl >= 32`: a back-reference. The top 3 bits are the length
//!   (7 means an extra length byte follows), the low 5 bits are the high bits
//!   of the distance, the low 8 bits of the distance are in the next byte.
//!   A back-reference copies `length + 2` bytes starting `distance + 1` bytes
//!   behind the current output position.
//!
//! Back-references may overlap the bytes they produce, (a distance of 1 repeats
//! the last byte) so they are copied one byte at a time.
//!
//! # Example
//!
//! ```
//! # fn main() -> pcdz::Result<()> {
//! // literal "ab", then copy 4 bytes from 2 bytes behind
//! let stream = [0x01, b'a', b'b', 0x40, 0x01];
//! let output = pcdz::lzf::decompress(&stream, 6)?;
//! assert_eq!(output, b"ababab");
//! # Ok(())
//! # }
//! ```

use log::debug;

use crate::PcdError;

const MAX_LITERAL: usize = 1 << 5;
const LONG_MATCH_MARKER: usize = 7;
const MIN_MATCH: usize = 2;
/// Most bytes a single input byte can expand to: a 3 bytes long
/// back-reference produces at most `7 + 255 + MIN_MATCH` bytes.
const MAX_EXPANSION: usize = (LONG_MATCH_MARKER + 255 + MIN_MATCH) / 3;

/// Decompresses `input` into a new buffer of at most `expected_len` bytes.
///
/// The returned buffer holds exactly the bytes the stream produced,
/// which may be fewer than `expected_len`: checking the final size
/// is left to the caller, which knows what it expects to find.
///
/// The buffer is never larger than what `input` can possibly expand to,
/// whatever `expected_len` says.
pub fn decompress(input: &[u8], expected_len: usize) -> crate::Result<Vec<u8>> {
    let capacity = expected_len.min(input.len().saturating_mul(MAX_EXPANSION));
    let mut output = vec![0u8; capacity];
    let produced = decompress_into(input, &mut output)?;
    output.truncate(produced);
    debug!(
        "lzf: {} compressed bytes -> {} bytes (expected {})",
        input.len(),
        produced,
        expected_len
    );
    Ok(output)
}

/// Decompresses `input` into `output`, returning the number of bytes written.
///
/// Fails with [`PcdError::Decompression`] if a token would write past the
/// end of `output`, references data before its start, or is cut short by
/// the end of `input`.
pub fn decompress_into(input: &[u8], output: &mut [u8]) -> crate::Result<usize> {
    let mut ip = 0usize;
    let mut op = 0usize;

    while ip < input.len() {
        let ctrl = input[ip] as usize;
        ip += 1;

        if ctrl < MAX_LITERAL {
            let len = ctrl + 1;
            if op + len > output.len() {
                return Err(overflow(op, len, output.len()));
            }
            if ip + len > input.len() {
                return Err(PcdError::Decompression(format!(
                    "literal run of {} bytes at input offset {} goes past the end of the input ({} bytes)",
                    len,
                    ip - 1,
                    input.len()
                )));
            }
            output[op..op + len].copy_from_slice(&input[ip..ip + len]);
            ip += len;
            op += len;
        } else {
            let mut len = ctrl >> 5;
            if len == LONG_MATCH_MARKER {
                len += next_byte(input, &mut ip)? as usize;
            }
            let distance = ((ctrl & 0x1f) << 8) + 1 + next_byte(input, &mut ip)? as usize;
            if distance > op {
                return Err(PcdError::Decompression(format!(
                    "back-reference {} bytes behind output position {} points before the start of the output",
                    distance, op
                )));
            }
            let len = len + MIN_MATCH;
            if op + len > output.len() {
                return Err(overflow(op, len, output.len()));
            }

            let mut reference = op - distance;
            for _ in 0..len {
                output[op] = output[reference];
                op += 1;
                reference += 1;
            }
        }
    }
    Ok(op)
}

#[inline]
fn next_byte(input: &[u8], ip: &mut usize) -> crate::Result<u8> {
    let byte = input.get(*ip).copied().ok_or_else(|| {
        PcdError::Decompression(format!(
            "back-reference cut short by the end of the input ({} bytes)",
            input.len()
        ))
    })?;
    *ip += 1;
    Ok(byte)
}

fn overflow(op: usize, len: usize, capacity: usize) -> PcdError {
    PcdError::Decompression(format!(
        "writing {} bytes at output position {} exceeds the expected output length {}",
        len, op, capacity
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_decompression_error(result: crate::Result<Vec<u8>>) {
        match result {
            Err(PcdError::Decompression(_)) => {}
            Err(e) => panic!("Expected a decompression error, got {:?}", e),
            Ok(out) => panic!("Decompression should fail, got {:?}", out),
        }
    }

    #[test]
    fn test_literal_only() {
        let out = decompress(&[0x02, 1, 2, 3], 3).unwrap();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn test_back_reference_repeats_pattern() {
        let stream = [0x02, b'a', b'b', b'c', 0x80, 0x02];
        let out = decompress(&stream, 9).unwrap();
        assert_eq!(out, b"abcabcabc");
    }

    #[test]
    fn test_overlapping_run_with_long_length() {
        // literal 'a', then a length-7 token plus an extra length byte of 0,
        // 9 bytes copied from 1 byte behind
        let stream = [0x00, b'a', 0xE0, 0x00, 0x00];
        let out = decompress(&stream, 10).unwrap();
        assert_eq!(out, vec![b'a'; 10]);
    }

    #[test]
    fn test_extra_length_byte_is_added() {
        let stream = [0x00, b'z', 0xE0, 0x03, 0x00];
        let out = decompress(&stream, 13).unwrap();
        assert_eq!(out, vec![b'z'; 13]);
    }

    #[test]
    fn test_distance_high_bits() {
        let mut stream = vec![0x1F];
        stream.extend(0u8..32);
        stream.push(0x1F);
        stream.extend(32u8..64);
        // copy 3 bytes from 64 bytes behind: high bits 0, low byte 63
        stream.extend_from_slice(&[0x20, 63]);
        let out = decompress(&stream, 67).unwrap();
        assert_eq!(&out[64..], &[0, 1, 2]);

        let mut long = vec![];
        let mut expected = vec![];
        for i in 0..9 {
            long.push(0x1F);
            let run = (0..32u8).map(|v| v.wrapping_mul(i + 1)).collect::<Vec<_>>();
            long.extend_from_slice(&run);
            expected.extend_from_slice(&run);
        }
        // distance 257: high bits 1, low byte 0
        long.extend_from_slice(&[0x21, 0x00]);
        let start = expected.len() - 257;
        for k in 0..3 {
            expected.push(expected[start + k]);
        }
        let out = decompress(&long, expected.len()).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_under_production_is_reported_by_length() {
        let out = decompress(&[0x01, 9, 9], 16).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_huge_expected_len_is_bounded_by_input() {
        let out = decompress(&[0x00, b'z', 0xE0, 0xFF, 0x00], usize::MAX).unwrap();
        assert_eq!(out, vec![b'z'; 1 + 7 + 255 + 2]);
        assert!(decompress(&[], u32::MAX as usize).unwrap().is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(decompress(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn test_reference_before_start() {
        assert_decompression_error(decompress(&[0x20, 0x00], 8));
        assert_decompression_error(decompress(&[0x00, 1, 0x20, 0x01], 8));
    }

    #[test]
    fn test_literal_exceeds_expected_len() {
        assert_decompression_error(decompress(&[0x02, 1, 2, 3], 2));
    }

    #[test]
    fn test_back_reference_exceeds_expected_len() {
        assert_decompression_error(decompress(&[0x00, b'a', 0xE0, 0x00, 0x00], 9));
    }

    #[test]
    fn test_truncated_streams() {
        assert_decompression_error(decompress(&[0x05, 1, 2], 16));
        assert_decompression_error(decompress(&[0x00, 1, 0x20], 16));
        assert_decompression_error(decompress(&[0x00, 1, 0xE0, 0x01], 16));
    }

    #[test]
    fn test_decompress_into_returns_written_len() {
        let mut buf = [0u8; 8];
        let written = decompress_into(&[0x00, 5, 0x20, 0x00], &mut buf).unwrap();
        assert_eq!(written, 4);
        assert_eq!(&buf[..4], &[5, 5, 5, 5]);
    }
}
