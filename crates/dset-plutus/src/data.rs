//! The Plutus data value model and its CBOR encoding.
//!
//! # Encoding
//!
//! | Value              | CBOR                                                   |
//! |--------------------|--------------------------------------------------------|
//! | `Constr i fs`, i<7 | tag `121 + i`, field list                              |
//! | `Constr i fs`, i<128 | tag `1280 + (i - 7)`, field list                     |
//! | `Constr i fs`      | tag `102`, `[i, field list]`                           |
//! | `Map`              | definite map                                           |
//! | `List`             | `0x80` when empty, indefinite array otherwise          |
//! | `Integer`          | major 0/1, or bignum tag 2/3 beyond 64 bits            |
//! | `Bytes`            | definite when ≤ 64 bytes, 64-byte chunks otherwise     |

use std::fmt;

use crate::cbor::{CborReader, CborWriter, Head, MAJOR_ARRAY, MAJOR_BYTES, MAJOR_MAP, MAJOR_NINT, MAJOR_TAG, MAJOR_UINT};
use crate::PlutusError;

/// Maximum byte-string chunk length permitted on-chain.
pub const BYTES_CHUNK_SIZE: usize = 64;

const TAG_POSITIVE_BIGNUM: u64 = 2;
const TAG_NEGATIVE_BIGNUM: u64 = 3;
const TAG_GENERAL_CONSTR: u64 = 102;
const TAG_CONSTR_0: u64 = 121;
const TAG_CONSTR_7: u64 = 1280;

/// A constructor application: a variant index plus positional fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constr {
    /// The constructor (variant) index.
    pub index: u64,
    /// Positional fields.
    pub fields: Vec<PlutusData>,
}

impl Constr {
    /// Check the index and arity, returning the fields on success.
    pub fn expect(&self, index: u64, arity: usize) -> Result<&[PlutusData], PlutusError> {
        if self.index != index {
            return Err(PlutusError::UnexpectedConstructor {
                expected: index,
                actual: self.index,
            });
        }
        if self.fields.len() != arity {
            return Err(PlutusError::UnexpectedArity {
                index,
                expected: arity,
                actual: self.fields.len(),
            });
        }
        Ok(&self.fields)
    }
}

/// A Plutus data value, the universal type of datums and redeemers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlutusData {
    /// A constructor application.
    Constr(Constr),
    /// An association list.
    Map(Vec<(PlutusData, PlutusData)>),
    /// A list.
    List(Vec<PlutusData>),
    /// An integer.
    Integer(i128),
    /// A byte string.
    Bytes(Vec<u8>),
}

impl PlutusData {
    /// Build a constructor value.
    pub fn constr(index: u64, fields: Vec<PlutusData>) -> Self {
        PlutusData::Constr(Constr { index, fields })
    }

    /// Build a byte-string value.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        PlutusData::Bytes(data.into())
    }

    /// Build an integer value.
    pub fn integer(value: impl Into<i128>) -> Self {
        PlutusData::Integer(value.into())
    }

    /// Short description of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PlutusData::Constr(_) => "constructor",
            PlutusData::Map(_) => "map",
            PlutusData::List(_) => "list",
            PlutusData::Integer(_) => "integer",
            PlutusData::Bytes(_) => "bytes",
        }
    }

    /// Borrow the constructor, or fail with a schema mismatch.
    pub fn as_constr(&self) -> Result<&Constr, PlutusError> {
        match self {
            PlutusData::Constr(c) => Ok(c),
            other => Err(PlutusError::SchemaMismatch {
                expected: "constructor",
                actual: other.kind(),
            }),
        }
    }

    /// Borrow the byte string, or fail with a schema mismatch.
    pub fn as_bytes(&self) -> Result<&[u8], PlutusError> {
        match self {
            PlutusData::Bytes(b) => Ok(b),
            other => Err(PlutusError::SchemaMismatch {
                expected: "bytes",
                actual: other.kind(),
            }),
        }
    }

    /// Return the integer, or fail with a schema mismatch.
    pub fn as_integer(&self) -> Result<i128, PlutusError> {
        match self {
            PlutusData::Integer(n) => Ok(*n),
            other => Err(PlutusError::SchemaMismatch {
                expected: "integer",
                actual: other.kind(),
            }),
        }
    }

    /// Borrow the list items, or fail with a schema mismatch.
    pub fn as_list(&self) -> Result<&[PlutusData], PlutusError> {
        match self {
            PlutusData::List(items) => Ok(items),
            other => Err(PlutusError::SchemaMismatch {
                expected: "list",
                actual: other.kind(),
            }),
        }
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Encode this value to CBOR bytes.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut writer = CborWriter::with_capacity(64);
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Encode this value to a CBOR hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_cbor())
    }

    /// Write this value into an existing CBOR writer.
    pub fn write_to(&self, w: &mut CborWriter) {
        match self {
            PlutusData::Constr(c) => {
                if c.index < 7 {
                    w.write_tag(TAG_CONSTR_0 + c.index);
                    write_list(w, &c.fields);
                } else if c.index < 128 {
                    w.write_tag(TAG_CONSTR_7 + (c.index - 7));
                    write_list(w, &c.fields);
                } else {
                    w.write_tag(TAG_GENERAL_CONSTR);
                    w.write_array_header(2);
                    w.write_uint(c.index);
                    write_list(w, &c.fields);
                }
            }
            PlutusData::Map(entries) => {
                w.write_map_header(entries.len());
                for (k, v) in entries {
                    k.write_to(w);
                    v.write_to(w);
                }
            }
            PlutusData::List(items) => write_list(w, items),
            PlutusData::Integer(n) => write_integer(w, *n),
            PlutusData::Bytes(b) => {
                if b.len() <= BYTES_CHUNK_SIZE {
                    w.write_bytes(b);
                } else {
                    w.write_bytes_chunked(b, BYTES_CHUNK_SIZE);
                }
            }
        }
    }

    /// Decode a value from CBOR bytes, rejecting trailing data.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, PlutusError> {
        let mut reader = CborReader::new(bytes);
        let data = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(PlutusError::TrailingBytes(reader.remaining()));
        }
        Ok(data)
    }

    /// Decode a value from a CBOR hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PlutusError> {
        Self::from_cbor(&hex::decode(hex_str)?)
    }

    /// Read one value from a CBOR reader.
    ///
    /// Nesting deeper than [`crate::cbor::MAX_DEPTH`] fails with
    /// [`PlutusError::TooDeep`].
    pub fn read_from(r: &mut CborReader) -> Result<Self, PlutusError> {
        r.enter()?;
        let result = Self::read_value(r);
        r.leave();
        result
    }

    fn read_value(r: &mut CborReader) -> Result<Self, PlutusError> {
        let head = r.read_head()?;
        match head.major {
            MAJOR_UINT => Ok(PlutusData::Integer(i128::from(definite(head)?))),
            MAJOR_NINT => Ok(PlutusData::Integer(-1 - i128::from(definite(head)?))),
            MAJOR_BYTES => Ok(PlutusData::Bytes(r.read_bytes_body(head)?)),
            MAJOR_ARRAY => Ok(PlutusData::List(read_items(r, head)?)),
            MAJOR_MAP => {
                let mut entries = Vec::new();
                match head.argument {
                    Some(len) => {
                        for _ in 0..len {
                            let k = Self::read_from(r)?;
                            let v = Self::read_from(r)?;
                            entries.push((k, v));
                        }
                    }
                    None => {
                        while !r.at_break()? {
                            let k = Self::read_from(r)?;
                            let v = Self::read_from(r)?;
                            entries.push((k, v));
                        }
                        r.read_break()?;
                    }
                }
                Ok(PlutusData::Map(entries))
            }
            MAJOR_TAG => read_tagged(r, definite(head)?),
            major => Err(PlutusError::InvalidCbor(format!(
                "major type {major} is not valid Plutus data"
            ))),
        }
    }
}

impl fmt::Display for PlutusData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

fn write_list(w: &mut CborWriter, items: &[PlutusData]) {
    if items.is_empty() {
        w.write_array_header(0);
        return;
    }
    w.write_indefinite(MAJOR_ARRAY);
    for item in items {
        item.write_to(w);
    }
    w.write_break();
}

fn write_integer(w: &mut CborWriter, n: i128) {
    if n >= 0 {
        match u64::try_from(n) {
            Ok(v) => w.write_uint(v),
            Err(_) => {
                w.write_tag(TAG_POSITIVE_BIGNUM);
                w.write_bytes(&magnitude_bytes(n as u128));
            }
        }
    } else {
        // CBOR negative integers carry -1 - n.
        let arg = (-1 - n) as u128;
        match u64::try_from(arg) {
            Ok(v) => w.write_nint(v),
            Err(_) => {
                w.write_tag(TAG_NEGATIVE_BIGNUM);
                w.write_bytes(&magnitude_bytes(arg));
            }
        }
    }
}

/// Big-endian bytes of `v` with leading zeros stripped.
fn magnitude_bytes(v: u128) -> Vec<u8> {
    let bytes = v.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    bytes[first..].to_vec()
}

fn definite(head: Head) -> Result<u64, PlutusError> {
    head.argument
        .ok_or_else(|| PlutusError::InvalidCbor("unexpected indefinite length".to_string()))
}

fn read_items(r: &mut CborReader, head: Head) -> Result<Vec<PlutusData>, PlutusError> {
    let mut items = Vec::new();
    match head.argument {
        Some(len) => {
            for _ in 0..len {
                items.push(PlutusData::read_from(r)?);
            }
        }
        None => {
            while !r.at_break()? {
                items.push(PlutusData::read_from(r)?);
            }
            r.read_break()?;
        }
    }
    Ok(items)
}

fn read_field_list(r: &mut CborReader) -> Result<Vec<PlutusData>, PlutusError> {
    let head = r.read_head()?;
    if head.major != MAJOR_ARRAY {
        return Err(PlutusError::InvalidCbor(format!(
            "constructor fields must be an array, got major type {}",
            head.major
        )));
    }
    read_items(r, head)
}

fn read_tagged(r: &mut CborReader, tag: u64) -> Result<PlutusData, PlutusError> {
    match tag {
        TAG_POSITIVE_BIGNUM | TAG_NEGATIVE_BIGNUM => {
            let magnitude = r.read_bytes()?;
            let value = bignum_value(&magnitude)?;
            if tag == TAG_POSITIVE_BIGNUM {
                i128::try_from(value)
                    .map(PlutusData::Integer)
                    .map_err(|_| PlutusError::IntegerOutOfRange(hex::encode(&magnitude)))
            } else {
                i128::try_from(value)
                    .map(|v| PlutusData::Integer(-1 - v))
                    .map_err(|_| PlutusError::IntegerOutOfRange(hex::encode(&magnitude)))
            }
        }
        TAG_GENERAL_CONSTR => {
            if r.read_array_header()? != Some(2) {
                return Err(PlutusError::InvalidCbor(
                    "general constructor must be a 2-element array".to_string(),
                ));
            }
            let index = r.read_uint()?;
            let fields = read_field_list(r)?;
            Ok(PlutusData::constr(index, fields))
        }
        t if (TAG_CONSTR_0..TAG_CONSTR_0 + 7).contains(&t) => {
            let fields = read_field_list(r)?;
            Ok(PlutusData::constr(t - TAG_CONSTR_0, fields))
        }
        t if (TAG_CONSTR_7..TAG_CONSTR_7 + 121).contains(&t) => {
            let fields = read_field_list(r)?;
            Ok(PlutusData::constr(t - TAG_CONSTR_7 + 7, fields))
        }
        t => Err(PlutusError::InvalidCbor(format!("unsupported tag {t}"))),
    }
}

fn bignum_value(magnitude: &[u8]) -> Result<u128, PlutusError> {
    let significant: &[u8] = {
        let first = magnitude.iter().position(|b| *b != 0).unwrap_or(magnitude.len());
        &magnitude[first..]
    };
    if significant.len() > 16 {
        return Err(PlutusError::IntegerOutOfRange(hex::encode(magnitude)));
    }
    Ok(significant.iter().fold(0u128, |acc, b| (acc << 8) | u128::from(*b)))
}
