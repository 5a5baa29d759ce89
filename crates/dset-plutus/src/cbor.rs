//! Minimal CBOR (RFC 8949) reader and writer.
//!
//! Only the subset needed for Plutus data and transaction bodies is
//! supported: unsigned and negative integers, byte and text strings
//! (definite and chunked), arrays and maps (definite and indefinite),
//! tags, and the `break` marker. Floats and simple values other than
//! `break` are rejected by the reader.

use crate::PlutusError;

/// Major type 0: unsigned integer.
pub const MAJOR_UINT: u8 = 0;
/// Major type 1: negative integer.
pub const MAJOR_NINT: u8 = 1;
/// Major type 2: byte string.
pub const MAJOR_BYTES: u8 = 2;
/// Major type 3: text string.
pub const MAJOR_TEXT: u8 = 3;
/// Major type 4: array.
pub const MAJOR_ARRAY: u8 = 4;
/// Major type 5: map.
pub const MAJOR_MAP: u8 = 5;
/// Major type 6: tag.
pub const MAJOR_TAG: u8 = 6;
/// Major type 7: simple values and floats.
pub const MAJOR_SIMPLE: u8 = 7;

/// Additional-information value marking an indefinite-length item.
const INDEFINITE: u8 = 31;

/// Maximum nesting of arrays, maps and tags the reader will descend into.
pub const MAX_DEPTH: usize = 256;

/// The `break` stop code terminating an indefinite-length item.
pub const BREAK: u8 = 0xff;

// ---------------------------------------------------------------------------
// CborWriter
// ---------------------------------------------------------------------------

/// A growable buffer for writing CBOR items.
#[derive(Debug, Default)]
pub struct CborWriter {
    buf: Vec<u8>,
}

impl CborWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        CborWriter { buf: Vec::new() }
    }

    /// Create an empty writer with the given capacity.
    pub fn with_capacity(cap: usize) -> Self {
        CborWriter {
            buf: Vec::with_capacity(cap),
        }
    }

    /// Write a major type with its argument in the shortest form.
    pub fn write_head(&mut self, major: u8, value: u64) {
        let mt = major << 5;
        if value < 24 {
            self.buf.push(mt | value as u8);
        } else if value <= u64::from(u8::MAX) {
            self.buf.push(mt | 24);
            self.buf.push(value as u8);
        } else if value <= u64::from(u16::MAX) {
            self.buf.push(mt | 25);
            self.buf.extend_from_slice(&(value as u16).to_be_bytes());
        } else if value <= u64::from(u32::MAX) {
            self.buf.push(mt | 26);
            self.buf.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.buf.push(mt | 27);
            self.buf.extend_from_slice(&value.to_be_bytes());
        }
    }

    /// Write an unsigned integer.
    pub fn write_uint(&mut self, value: u64) {
        self.write_head(MAJOR_UINT, value);
    }

    /// Write a negative integer given its CBOR argument `n`, encoding `-1 - n`.
    pub fn write_nint(&mut self, n: u64) {
        self.write_head(MAJOR_NINT, n);
    }

    /// Write a definite-length byte string.
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.write_head(MAJOR_BYTES, data.len() as u64);
        self.buf.extend_from_slice(data);
    }

    /// Write a byte string as an indefinite sequence of chunks of at most `chunk` bytes.
    pub fn write_bytes_chunked(&mut self, data: &[u8], chunk: usize) {
        self.write_indefinite(MAJOR_BYTES);
        for part in data.chunks(chunk) {
            self.write_bytes(part);
        }
        self.write_break();
    }

    /// Write a definite-length UTF-8 text string.
    pub fn write_text(&mut self, text: &str) {
        self.write_head(MAJOR_TEXT, text.len() as u64);
        self.buf.extend_from_slice(text.as_bytes());
    }

    /// Write a definite array header for `len` items.
    pub fn write_array_header(&mut self, len: usize) {
        self.write_head(MAJOR_ARRAY, len as u64);
    }

    /// Write a definite map header for `len` pairs.
    pub fn write_map_header(&mut self, len: usize) {
        self.write_head(MAJOR_MAP, len as u64);
    }

    /// Write a semantic tag.
    pub fn write_tag(&mut self, tag: u64) {
        self.write_head(MAJOR_TAG, tag);
    }

    /// Open an indefinite-length item of the given major type.
    pub fn write_indefinite(&mut self, major: u8) {
        self.buf.push((major << 5) | INDEFINITE);
    }

    /// Close an indefinite-length item.
    pub fn write_break(&mut self) {
        self.buf.push(BREAK);
    }

    /// Append already-encoded CBOR bytes verbatim.
    pub fn write_raw(&mut self, encoded: &[u8]) {
        self.buf.extend_from_slice(encoded);
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// CborReader
// ---------------------------------------------------------------------------

/// A decoded item head: major type plus argument.
///
/// `argument` is `None` for indefinite-length items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Head {
    /// CBOR major type (0..=7).
    pub major: u8,
    /// The argument, or `None` for an indefinite-length item.
    pub argument: Option<u64>,
}

/// A cursor-based reader over CBOR bytes.
pub struct CborReader<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> CborReader<'a> {
    /// Create a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        CborReader { data, pos: 0, depth: 0 }
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Descend one nesting level, failing past [`MAX_DEPTH`].
    pub(crate) fn enter(&mut self) -> Result<(), PlutusError> {
        if self.depth >= MAX_DEPTH {
            return Err(PlutusError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], PlutusError> {
        if n > self.remaining() {
            return Err(PlutusError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Look at the next byte without consuming it.
    pub fn peek(&self) -> Result<u8, PlutusError> {
        self.data.get(self.pos).copied().ok_or(PlutusError::UnexpectedEof)
    }

    /// Whether the next byte is the `break` stop code.
    pub fn at_break(&self) -> Result<bool, PlutusError> {
        Ok(self.peek()? == BREAK)
    }

    /// Consume a `break` stop code.
    pub fn read_break(&mut self) -> Result<(), PlutusError> {
        let b = self.take(1)?[0];
        if b != BREAK {
            return Err(PlutusError::InvalidCbor(format!("expected break, got 0x{b:02x}")));
        }
        Ok(())
    }

    /// Read an item head.
    pub fn read_head(&mut self) -> Result<Head, PlutusError> {
        let initial = self.take(1)?[0];
        let major = initial >> 5;
        let info = initial & 0x1f;
        if major == MAJOR_SIMPLE {
            return Err(PlutusError::InvalidCbor(format!(
                "unsupported simple value 0x{initial:02x}"
            )));
        }
        let argument = match info {
            0..=23 => Some(u64::from(info)),
            24 => Some(u64::from(self.take(1)?[0])),
            25 => {
                let b = self.take(2)?;
                Some(u64::from(u16::from_be_bytes([b[0], b[1]])))
            }
            26 => {
                let b = self.take(4)?;
                Some(u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]])))
            }
            27 => {
                let b = self.take(8)?;
                let mut arr = [0u8; 8];
                arr.copy_from_slice(b);
                Some(u64::from_be_bytes(arr))
            }
            INDEFINITE if matches!(major, MAJOR_BYTES | MAJOR_TEXT | MAJOR_ARRAY | MAJOR_MAP) => None,
            _ => {
                return Err(PlutusError::InvalidCbor(format!(
                    "unsupported initial byte 0x{initial:02x}"
                )))
            }
        };
        Ok(Head { major, argument })
    }

    /// Read a head and require a definite argument of the given major type.
    fn read_definite(&mut self, major: u8, what: &str) -> Result<u64, PlutusError> {
        let head = self.read_head()?;
        if head.major != major {
            return Err(PlutusError::InvalidCbor(format!(
                "expected {what}, got major type {}",
                head.major
            )));
        }
        head.argument
            .ok_or_else(|| PlutusError::InvalidCbor(format!("indefinite {what} not allowed here")))
    }

    /// Read an unsigned integer.
    pub fn read_uint(&mut self) -> Result<u64, PlutusError> {
        self.read_definite(MAJOR_UINT, "unsigned integer")
    }

    /// Read a tag number.
    pub fn read_tag(&mut self) -> Result<u64, PlutusError> {
        self.read_definite(MAJOR_TAG, "tag")
    }

    /// Read the payload of a byte string whose head has already been consumed.
    pub fn read_bytes_body(&mut self, head: Head) -> Result<Vec<u8>, PlutusError> {
        match head.argument {
            Some(len) => Ok(self.take(len as usize)?.to_vec()),
            None => {
                let mut out = Vec::new();
                while !self.at_break()? {
                    let len = self.read_definite(MAJOR_BYTES, "byte string chunk")?;
                    out.extend_from_slice(self.take(len as usize)?);
                }
                self.read_break()?;
                Ok(out)
            }
        }
    }

    /// Read a byte string, definite or chunked.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, PlutusError> {
        let head = self.read_head()?;
        if head.major != MAJOR_BYTES {
            return Err(PlutusError::InvalidCbor(format!(
                "expected byte string, got major type {}",
                head.major
            )));
        }
        self.read_bytes_body(head)
    }

    /// Read a definite-length text string.
    pub fn read_text(&mut self) -> Result<String, PlutusError> {
        let len = self.read_definite(MAJOR_TEXT, "text string")?;
        let bytes = self.take(len as usize)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| PlutusError::InvalidCbor(e.to_string()))
    }

    /// Read an array header. Returns `None` for an indefinite-length array.
    pub fn read_array_header(&mut self) -> Result<Option<u64>, PlutusError> {
        let head = self.read_head()?;
        if head.major != MAJOR_ARRAY {
            return Err(PlutusError::InvalidCbor(format!(
                "expected array, got major type {}",
                head.major
            )));
        }
        Ok(head.argument)
    }

    /// Read a map header. Returns `None` for an indefinite-length map.
    pub fn read_map_header(&mut self) -> Result<Option<u64>, PlutusError> {
        let head = self.read_head()?;
        if head.major != MAJOR_MAP {
            return Err(PlutusError::InvalidCbor(format!(
                "expected map, got major type {}",
                head.major
            )));
        }
        Ok(head.argument)
    }

    /// Skip one complete item, returning the raw bytes it occupied.
    pub fn read_raw_item(&mut self) -> Result<&'a [u8], PlutusError> {
        let start = self.pos;
        self.skip_item()?;
        Ok(&self.data[start..self.pos])
    }

    fn skip_item(&mut self) -> Result<(), PlutusError> {
        self.enter()?;
        let result = self.skip_item_body();
        self.leave();
        result
    }

    fn skip_item_body(&mut self) -> Result<(), PlutusError> {
        let head = self.read_head()?;
        match (head.major, head.argument) {
            (MAJOR_UINT | MAJOR_NINT, Some(_)) => Ok(()),
            (MAJOR_BYTES | MAJOR_TEXT, Some(len)) => self.take(len as usize).map(|_| ()),
            (MAJOR_BYTES | MAJOR_TEXT, None) => {
                while !self.at_break()? {
                    self.skip_item()?;
                }
                self.read_break()
            }
            (MAJOR_ARRAY | MAJOR_MAP, Some(len)) => {
                let items = if head.major == MAJOR_MAP { len.saturating_mul(2) } else { len };
                for _ in 0..items {
                    self.skip_item()?;
                }
                Ok(())
            }
            (MAJOR_ARRAY | MAJOR_MAP, None) => {
                while !self.at_break()? {
                    self.skip_item()?;
                }
                self.read_break()
            }
            (MAJOR_TAG, Some(_)) => self.skip_item(),
            (major, _) => Err(PlutusError::InvalidCbor(format!(
                "unsupported major type {major}"
            ))),
        }
    }
}
