//! Scalar data types ([`DataType`]) and their canonical string encoding.
//!
//! The encoding is `<kind><bits>[x<lanes>]` (e.g. `int32`, `float16x4`), with
//! a few reserved spellings that carry no explicit width:
//! * `void`: the absence of a value (zero bits, zero lanes)
//! * `bool`/`boolx<lanes>`: one-bit booleans
//! * `handle`: an opaque 64-bit pointer-like scalar
//!
//! Encoding is bijective over valid [`DataType`]s, so equality of two
//! [`DataType`]s and equality of their encodings always agree.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The "kind" part of a [`DataType`] (i.e. everything but its width and lanes).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Int,
    UInt,
    Float,
    BFloat,
    Bool,
    Handle,
    Void,
}

impl TypeCode {
    /// Prefix used by the canonical encoding, before any `<bits>`.
    fn prefix(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::BFloat => "bfloat",
            Self::Bool => "bool",
            Self::Handle => "handle",
            Self::Void => "void",
        }
    }
}

/// Semantic scalar (or short vector) type, such as `int32` or `float16x4`.
///
/// All constructors validate their inputs, so every [`DataType`] value has a
/// canonical encoding (available through [`fmt::Display`]).
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct DataType {
    code: TypeCode,
    bits: u8,
    lanes: u16,
}

/// Error for a [`DataType`] that can't be encoded or decoded canonically.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed data type tag `{text}`: {reason}")]
pub struct MalformedDataType {
    pub text: String,
    pub reason: &'static str,
}

impl DataType {
    pub const VOID: Self = Self { code: TypeCode::Void, bits: 0, lanes: 0 };
    pub const BOOL: Self = Self { code: TypeCode::Bool, bits: 1, lanes: 1 };
    pub const HANDLE: Self = Self { code: TypeCode::Handle, bits: 64, lanes: 1 };

    pub const INT8: Self = Self { code: TypeCode::Int, bits: 8, lanes: 1 };
    pub const INT16: Self = Self { code: TypeCode::Int, bits: 16, lanes: 1 };
    pub const INT32: Self = Self { code: TypeCode::Int, bits: 32, lanes: 1 };
    pub const INT64: Self = Self { code: TypeCode::Int, bits: 64, lanes: 1 };

    pub const UINT8: Self = Self { code: TypeCode::UInt, bits: 8, lanes: 1 };
    pub const UINT16: Self = Self { code: TypeCode::UInt, bits: 16, lanes: 1 };
    pub const UINT32: Self = Self { code: TypeCode::UInt, bits: 32, lanes: 1 };
    pub const UINT64: Self = Self { code: TypeCode::UInt, bits: 64, lanes: 1 };

    pub const FLOAT16: Self = Self { code: TypeCode::Float, bits: 16, lanes: 1 };
    pub const FLOAT32: Self = Self { code: TypeCode::Float, bits: 32, lanes: 1 };
    pub const FLOAT64: Self = Self { code: TypeCode::Float, bits: 64, lanes: 1 };

    pub const BFLOAT16: Self = Self { code: TypeCode::BFloat, bits: 16, lanes: 1 };

    /// Construct a [`DataType`], rejecting combinations with no canonical encoding.
    pub fn new(code: TypeCode, bits: u8, lanes: u16) -> Result<Self, MalformedDataType> {
        let invalid = |reason| {
            // HACK there's no canonical text for an invalid type, so
            // describe the raw components instead.
            Err(MalformedDataType { text: format!("{}:{bits}:{lanes}", code.prefix()), reason })
        };
        match code {
            TypeCode::Void => {
                if (bits, lanes) != (0, 0) {
                    return invalid("`void` has no bits or lanes");
                }
                return Ok(Self::VOID);
            }
            TypeCode::Bool if bits != 1 => return invalid("`bool` must be 1 bit wide"),
            TypeCode::Handle if (bits, lanes) != (64, 1) => {
                return invalid("`handle` must be a 64-bit scalar");
            }
            TypeCode::Float if !matches!(bits, 16 | 32 | 64) => {
                return invalid("`float` must be 16, 32 or 64 bits wide");
            }
            TypeCode::BFloat if bits != 16 => return invalid("`bfloat` must be 16 bits wide"),
            TypeCode::Int | TypeCode::UInt if bits == 0 => {
                return invalid("integers must be at least 1 bit wide");
            }
            _ => {}
        }
        if lanes == 0 {
            return invalid("non-`void` types need at least one lane");
        }
        Ok(Self { code, bits, lanes })
    }

    pub fn int(bits: u8) -> Result<Self, MalformedDataType> {
        Self::new(TypeCode::Int, bits, 1)
    }

    pub fn uint(bits: u8) -> Result<Self, MalformedDataType> {
        Self::new(TypeCode::UInt, bits, 1)
    }

    pub fn float(bits: u8) -> Result<Self, MalformedDataType> {
        Self::new(TypeCode::Float, bits, 1)
    }

    /// Same kind and width as `self`, but with `lanes` lanes.
    pub fn with_lanes(self, lanes: u16) -> Result<Self, MalformedDataType> {
        Self::new(self.code, self.bits, lanes)
    }

    pub fn code(self) -> TypeCode {
        self.code
    }

    pub fn bits(self) -> u8 {
        self.bits
    }

    pub fn lanes(self) -> u16 {
        self.lanes
    }

    pub fn is_void(self) -> bool {
        self.code == TypeCode::Void
    }

    /// Whether `self` is exactly the scalar `bool` (not a vector of them).
    pub fn is_bool(self) -> bool {
        self == Self::BOOL
    }

    pub fn is_scalar(self) -> bool {
        self.lanes == 1
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code.prefix())?;
        match self.code {
            TypeCode::Void | TypeCode::Handle | TypeCode::Bool => {}
            TypeCode::Int | TypeCode::UInt | TypeCode::Float | TypeCode::BFloat => {
                write!(f, "{}", self.bits)?;
            }
        }
        if !self.is_void() && self.lanes != 1 {
            write!(f, "x{}", self.lanes)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataType({self})")
    }
}

/// Strict decimal parsing: ASCII digits only, no sign, no leading zeros.
fn parse_decimal<T: FromStr>(s: &str) -> Option<T> {
    let well_formed = !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_digit())
        && !(s.len() > 1 && s.starts_with('0'));
    if well_formed { s.parse().ok() } else { None }
}

impl FromStr for DataType {
    type Err = MalformedDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| MalformedDataType { text: s.to_string(), reason };

        if s == "void" {
            return Ok(Self::VOID);
        }
        if s == "handle" {
            return Ok(Self::HANDLE);
        }

        // NOTE neither `int`/`uint` nor `float`/`bfloat` prefix each other,
        // so the order here doesn't matter.
        let (code, rest) = [
            TypeCode::Bool,
            TypeCode::UInt,
            TypeCode::Int,
            TypeCode::BFloat,
            TypeCode::Float,
        ]
        .into_iter()
        .find_map(|code| Some((code, s.strip_prefix(code.prefix())?)))
        .ok_or_else(|| malformed("unknown type kind"))?;

        let (bits, lanes) = match rest.split_once('x') {
            Some((bits, lanes)) => {
                let lanes: u16 = parse_decimal(lanes).ok_or_else(|| malformed("invalid lanes"))?;
                if lanes == 1 {
                    return Err(malformed("single lane must be left implicit"));
                }
                (bits, lanes)
            }
            None => (rest, 1),
        };

        let bits = if code == TypeCode::Bool {
            if !bits.is_empty() {
                return Err(malformed("`bool` takes no explicit width"));
            }
            1
        } else {
            parse_decimal(bits).ok_or_else(|| malformed("invalid bit width"))?
        };

        Self::new(code, bits, lanes).map_err(|err| malformed(err.reason))
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_spellings() {
        assert_eq!(DataType::INT32.to_string(), "int32");
        assert_eq!(DataType::UINT8.to_string(), "uint8");
        assert_eq!(DataType::FLOAT16.with_lanes(4).unwrap().to_string(), "float16x4");
        assert_eq!(DataType::BFLOAT16.to_string(), "bfloat16");
        assert_eq!(DataType::BOOL.to_string(), "bool");
        assert_eq!(DataType::BOOL.with_lanes(8).unwrap().to_string(), "boolx8");
        assert_eq!(DataType::HANDLE.to_string(), "handle");
        assert_eq!(DataType::VOID.to_string(), "void");
    }

    #[test]
    fn parse_accepts_canonical_text() {
        for text in ["int1", "int64", "uint16x2", "float64", "float32x16", "bool", "boolx4", "void"]
        {
            let dtype: DataType = text.parse().unwrap();
            assert_eq!(dtype.to_string(), text);
        }
        assert_eq!("int8".parse::<DataType>().unwrap(), DataType::INT8);
        assert_eq!("bool".parse::<DataType>().unwrap(), DataType::BOOL);
    }

    #[test]
    fn parse_rejects_non_canonical_text() {
        for text in
            ["", "int", "int032", "int+8", "int32x1", "int32x", "float8", "bool1", "quux32", "voidx2"]
        {
            let err = text.parse::<DataType>().unwrap_err();
            assert_eq!(err.text, text);
        }
    }

    #[test]
    fn constructor_validation() {
        assert!(DataType::int(0).is_err());
        assert!(DataType::float(24).is_err());
        assert!(DataType::new(TypeCode::Bool, 8, 1).is_err());
        assert!(DataType::new(TypeCode::Void, 0, 0).unwrap().is_void());
        assert!(DataType::INT32.with_lanes(0).is_err());
    }

    #[test]
    fn bool_vectors_are_not_bool() {
        assert!(DataType::BOOL.is_bool());
        assert!(!DataType::BOOL.with_lanes(2).unwrap().is_bool());
        assert!(!DataType::UINT8.is_bool());
    }

    #[test]
    fn serde_uses_canonical_text() {
        let json = serde_json::to_string(&DataType::INT64).unwrap();
        assert_eq!(json, "\"int64\"");
        let dtype: DataType = serde_json::from_str("\"float16x4\"").unwrap();
        assert_eq!(dtype, DataType::FLOAT16.with_lanes(4).unwrap());
        assert!(serde_json::from_str::<DataType>("\"int\"").is_err());
    }
}
