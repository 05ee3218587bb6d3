//! UTF-8 decoding and encoding of single code points.
//!
//! Both the pattern and the subject are read one code point at a time with
//! [`decode`]. Malformed input is reported as a [`DecodeError`] and never
//! causes a read past the end of the buffer. [`encode`] is the inverse and is
//! only used when rendering code points for humans.

use thiserror::Error;

use crate::util::Char;

/// Why a byte sequence could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// The lead byte announces more bytes than the input has left.
    UnexpectedEnd,
    /// The byte can't start a UTF-8 sequence.
    InvalidLeadByte,
    /// A byte following the lead byte is not of the form `10xxxxxx`.
    InvalidContinuation,
    /// The sequence decodes to a value above U+10FFFF.
    OutOfRange,
}

/// A malformed UTF-8 sequence found at `offset`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("couldn't decode byte {byte:#04x} at offset {offset} ({kind:?})")]
pub struct DecodeError {
    pub offset: usize,
    pub byte: u8,
    pub kind: DecodeErrorKind,
}

/// Decodes the code point starting at `*cursor` and moves the cursor past it.
///
/// On error the cursor is left untouched, callers decide how to recover (see
/// [`decode_lossy`]). `*cursor` must be lower than `bytes.len()`.
pub fn decode(bytes: &[u8], cursor: &mut usize) -> Result<Char, DecodeError> {
    let offset = *cursor;
    let Some(&lead) = bytes.get(offset) else {
        return Err(DecodeError {
            offset,
            byte: 0,
            kind: DecodeErrorKind::UnexpectedEnd,
        });
    };
    let error = |kind| DecodeError {
        offset,
        byte: lead,
        kind,
    };

    let (len, init) = match lead {
        0x00..=0x7f => {
            *cursor += 1;
            return Ok(Char::new(lead as u32));
        }
        b if b & 0xe0 == 0xc0 => (2, (b & 0x1f) as u32),
        b if b & 0xf0 == 0xe0 => (3, (b & 0x0f) as u32),
        b if b & 0xf8 == 0xf0 => (4, (b & 0x07) as u32),
        _ => return Err(error(DecodeErrorKind::InvalidLeadByte)),
    };

    let Some(tail) = bytes.get(offset + 1..offset + len) else {
        return Err(error(DecodeErrorKind::UnexpectedEnd));
    };

    let mut value = init;
    for &b in tail {
        if b & 0xc0 != 0x80 {
            return Err(error(DecodeErrorKind::InvalidContinuation));
        }
        value = (value << 6) | (b & 0x3f) as u32;
    }

    if value > Char::MAX.value() {
        return Err(error(DecodeErrorKind::OutOfRange));
    }

    *cursor += len;
    Ok(Char::new(value))
}

/// Like [`decode`], but only fails at the end of the input.
///
/// A malformed sequence is read as the raw byte at the cursor, which then
/// advances by one. The anomaly is logged, the scanner keeps going. Returns
/// `None`, leaving the cursor untouched, once `*cursor` reaches the end.
pub fn decode_lossy(bytes: &[u8], cursor: &mut usize) -> Option<Char> {
    if *cursor >= bytes.len() {
        return None;
    }
    match decode(bytes, cursor) {
        Ok(c) => Some(c),
        Err(err) => {
            log::warn!("{err}, reading it as a literal byte");
            *cursor += 1;
            Some(Char::new(err.byte as u32))
        }
    }
}

/// Encodes `c` as UTF-8 into `dst` and returns the written bytes.
///
/// Sentinels have no encoding and produce an empty slice.
pub fn encode(c: Char, dst: &mut [u8; 4]) -> &[u8] {
    let cp = c.value();
    let len = match cp {
        0..=0x7f => {
            dst[0] = cp as u8;
            1
        }
        0x80..=0x7ff => {
            dst[0] = 0xc0 | (cp >> 6) as u8;
            dst[1] = 0x80 | (cp & 0x3f) as u8;
            2
        }
        0x800..=0xffff => {
            dst[0] = 0xe0 | (cp >> 12) as u8;
            dst[1] = 0x80 | ((cp >> 6) & 0x3f) as u8;
            dst[2] = 0x80 | (cp & 0x3f) as u8;
            3
        }
        0x10000..=0x10ffff => {
            dst[0] = 0xf0 | (cp >> 18) as u8;
            dst[1] = 0x80 | ((cp >> 12) & 0x3f) as u8;
            dst[2] = 0x80 | ((cp >> 6) & 0x3f) as u8;
            dst[3] = 0x80 | (cp & 0x3f) as u8;
            4
        }
        _ => 0,
    };
    &dst[..len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trip_all_code_points() {
        let mut buf = [0; 4];
        for cp in 0..=Char::MAX.value() {
            let encoded = encode(Char::new(cp), &mut buf);
            let mut cursor = 0;
            let decoded = decode(encoded, &mut cursor).unwrap();
            assert_eq!(decoded.value(), cp);
            assert_eq!(cursor, encoded.len());
        }
    }

    #[test]
    fn encoding_agrees_with_std() {
        let mut buf = [0; 4];
        for c in ['a', 'é', '€', '𝄞'] {
            let mut expected = [0; 4];
            assert_eq!(
                encode(c.into(), &mut buf),
                c.encode_utf8(&mut expected).as_bytes()
            );
        }
    }

    #[test]
    fn sentinels_have_no_encoding() {
        let mut buf = [0; 4];
        assert!(encode(Char::ANY, &mut buf).is_empty());
        assert!(encode(Char::START, &mut buf).is_empty());
        assert!(encode(Char::END, &mut buf).is_empty());
    }

    #[test]
    fn invalid_lead_byte() {
        let mut cursor = 0;
        let err = decode(&[0x80, b'a'], &mut cursor).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidLeadByte);
        assert_eq!(err.byte, 0x80);
        assert_eq!(cursor, 0);
    }

    #[test]
    fn truncated_sequence_is_not_read_past_the_end() {
        let mut cursor = 0;
        let err = decode(&[0xe2, 0x82], &mut cursor).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::UnexpectedEnd);
        assert_eq!(cursor, 0);
    }

    #[test]
    fn bad_continuation() {
        let mut cursor = 0;
        let err = decode(&[0xc3, b'a'], &mut cursor).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidContinuation);
    }

    #[test]
    fn values_above_max_collide_with_sentinels() {
        // 0xf4 0x90 0x80 0x80 would be U+110000.
        let mut cursor = 0;
        let err = decode(&[0xf4, 0x90, 0x80, 0x80], &mut cursor).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::OutOfRange);
    }

    #[test]
    fn lossy_decoding_advances_one_byte() {
        let input = [0xff, b'x'];
        let mut cursor = 0;
        assert_eq!(decode_lossy(&input, &mut cursor), Some(Char::new(0xff)));
        assert_eq!(cursor, 1);
        assert_eq!(decode_lossy(&input, &mut cursor), Some(Char::from('x')));
        assert_eq!(cursor, 2);
    }

    #[test]
    fn lossy_decoding_stops_at_the_end() {
        let mut cursor = 1;
        assert_eq!(decode_lossy(b"a", &mut cursor), None);
        assert_eq!(cursor, 1);
        assert_eq!(decode_lossy(b"", &mut 0), None);
    }
}
