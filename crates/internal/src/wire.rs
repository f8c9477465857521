//! Length-prefixed wire encoding
//!
//! Every field a puzzlebox protocol puts on the wire is encoded as a
//! fixed-width big-endian `u32` length followed by exactly that many bytes.
//! Decoding never trusts an attacker-controlled length: every read is
//! bounds-checked against the remaining input, lengths are capped at
//! [`MAX_FIELD_LEN`], and a decoder must call [`WireReader::finish`] so
//! trailing bytes are rejected rather than silently ignored.

/// Upper bound on a single encoded field.
///
/// Large enough for a full puzzle board transmission, small enough that a
/// hostile length prefix cannot drive an allocation of attacker-chosen size.
pub const MAX_FIELD_LEN: usize = 1 << 24;

/// Error raised by the wire codec.
///
/// Deliberately carries no input bytes; malformed input is reported by
/// position only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    /// Input ended before the announced field length.
    Truncated {
        /// Byte offset at which the shortfall was detected.
        offset: usize,
    },
    /// A length prefix exceeded [`MAX_FIELD_LEN`].
    OversizedField {
        /// Byte offset of the offending length prefix.
        offset: usize,
    },
    /// Input bytes remained after the final expected field.
    TrailingBytes {
        /// Number of unconsumed bytes.
        remaining: usize,
    },
}

impl core::fmt::Display for WireError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Truncated { offset } => {
                write!(f, "wire input truncated at offset {}", offset)
            }
            Self::OversizedField { offset } => {
                write!(f, "wire field at offset {} exceeds maximum length", offset)
            }
            Self::TrailingBytes { remaining } => {
                write!(f, "{} trailing bytes after final wire field", remaining)
            }
        }
    }
}

impl std::error::Error for WireError {}

/// Encoder building a length-prefixed byte stream.
#[derive(Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single tag/discriminant byte (no length prefix).
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Append a fixed-width big-endian `u32` (no length prefix).
    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Append a length-prefixed byte field.
    ///
    /// # Panics
    /// Panics if `field` exceeds [`MAX_FIELD_LEN`]; encoders only ever
    /// serialize locally produced data, so an oversized field is a caller
    /// bug, not an input condition.
    pub fn put_bytes(&mut self, field: &[u8]) {
        assert!(field.len() <= MAX_FIELD_LEN);
        self.buf.extend_from_slice(&(field.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(field);
    }

    /// Consume the writer, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Bounds-checked decoder over a received byte stream.
pub struct WireReader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Wrap a received buffer for decoding.
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.input.len())
            .ok_or(WireError::Truncated { offset: self.pos })?;
        let out = &self.input[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    /// Read a single tag/discriminant byte.
    pub fn u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    /// Read a fixed-width big-endian `u32`.
    pub fn u32(&mut self) -> Result<u32, WireError> {
        let raw = self.take(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    /// Read a length-prefixed byte field.
    pub fn bytes(&mut self) -> Result<&'a [u8], WireError> {
        let prefix_offset = self.pos;
        let len = self.u32()? as usize;
        if len > MAX_FIELD_LEN {
            return Err(WireError::OversizedField {
                offset: prefix_offset,
            });
        }
        self.take(len)
    }

    /// Read a length-prefixed field and require an exact width.
    pub fn fixed<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let offset = self.pos;
        let raw = self.bytes()?;
        if raw.len() != N {
            return Err(WireError::Truncated { offset });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(raw);
        Ok(out)
    }

    /// Number of unconsumed input bytes.
    ///
    /// Decoders of counted collections use this to bound pre-allocation:
    /// a claimed element count can never describe more data than is
    /// actually present.
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Assert that the entire input has been consumed.
    pub fn finish(self) -> Result<(), WireError> {
        let remaining = self.input.len() - self.pos;
        if remaining != 0 {
            return Err(WireError::TrailingBytes { remaining });
        }
        Ok(())
    }
}
