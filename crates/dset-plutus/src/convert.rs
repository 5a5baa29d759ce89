//! Conversions between Rust types and [`PlutusData`].
//!
//! Schema types implement [`ToPlutusData`] and [`FromPlutusData`] by
//! hand; this module supplies the shared building blocks (booleans,
//! optional values, unsigned integers) whose encodings are fixed by the
//! on-chain standard library.

use crate::data::PlutusData;
use crate::PlutusError;

/// Types that can be converted into Plutus data.
pub trait ToPlutusData {
    /// Convert `self` into a Plutus data value.
    fn to_plutus_data(&self) -> PlutusData;

    /// Convert and encode to CBOR bytes.
    fn to_cbor(&self) -> Vec<u8> {
        self.to_plutus_data().to_cbor()
    }
}

/// Types that can be parsed from Plutus data.
pub trait FromPlutusData: Sized {
    /// Parse a value, failing if the data does not match the schema.
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError>;

    /// Decode CBOR bytes and parse.
    fn from_cbor(bytes: &[u8]) -> Result<Self, PlutusError> {
        Self::from_plutus_data(&PlutusData::from_cbor(bytes)?)
    }
}

impl ToPlutusData for PlutusData {
    fn to_plutus_data(&self) -> PlutusData {
        self.clone()
    }
}

impl FromPlutusData for PlutusData {
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError> {
        Ok(data.clone())
    }
}

/// `False` is constructor 0, `True` is constructor 1, both without fields.
impl ToPlutusData for bool {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::constr(u64::from(*self), Vec::new())
    }
}

impl FromPlutusData for bool {
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError> {
        let c = data.as_constr()?;
        match c.index {
            0 => c.expect(0, 0).map(|_| false),
            1 => c.expect(1, 0).map(|_| true),
            other => Err(PlutusError::UnexpectedConstructor {
                expected: 1,
                actual: other,
            }),
        }
    }
}

/// `Some(x)` is constructor 0 with one field, `None` is constructor 1.
impl<T: ToPlutusData> ToPlutusData for Option<T> {
    fn to_plutus_data(&self) -> PlutusData {
        match self {
            Some(v) => PlutusData::constr(0, vec![v.to_plutus_data()]),
            None => PlutusData::constr(1, Vec::new()),
        }
    }
}

impl<T: FromPlutusData> FromPlutusData for Option<T> {
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError> {
        let c = data.as_constr()?;
        match c.index {
            0 => {
                let fields = c.expect(0, 1)?;
                Ok(Some(T::from_plutus_data(&fields[0])?))
            }
            1 => c.expect(1, 0).map(|_| None),
            other => Err(PlutusError::UnexpectedConstructor {
                expected: 1,
                actual: other,
            }),
        }
    }
}

impl ToPlutusData for u64 {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::Integer(i128::from(*self))
    }
}

impl FromPlutusData for u64 {
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError> {
        let n = data.as_integer()?;
        u64::try_from(n).map_err(|_| PlutusError::IntegerOutOfRange(n.to_string()))
    }
}
