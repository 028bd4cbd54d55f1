//! Typed parameter values and their wire encoding.
//!
//! | Declared type | Encoding                                         |
//! |---------------|--------------------------------------------------|
//! | `bool`        | 1 byte, `0x01` / `0x00`                          |
//! | `int`         | minimal big-endian magnitude, at least 1 byte    |
//! | `float`       | 8 bytes, IEEE-754 double, big-endian             |

use core::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Largest encoded parameter payload (an `int` or a `float`).
pub const MAX_PARAM_SIZE: usize = 8;

/// Raw parameter payload.
pub type ParamData = heapless::Vec<u8, MAX_PARAM_SIZE>;

/// Declared type of a named parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Bool,
    Int,
    Float,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
        }
    }
}

/// A parameter value tagged with its runtime type.
///
/// In configuration files the JSON literal decides the type: `true`,
/// `300` and `21.5` are a bool, an int and a float.  A float whose value
/// is integral must still carry a decimal point (`21.0`).  Ints are
/// unsigned, so a negative integer literal is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(u64),
    Float(f64),
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ParamValueVisitor)
    }
}

struct ParamValueVisitor;

impl Visitor<'_> for ParamValueVisitor {
    type Value = ParamValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a bool, a non-negative integer or a float")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<ParamValue, E> {
        Ok(ParamValue::Bool(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ParamValue, E> {
        Ok(ParamValue::Int(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ParamValue, E> {
        u64::try_from(v)
            .map(ParamValue::Int)
            .map_err(|_| E::custom(format_args!("negative int parameter value {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ParamValue, E> {
        Ok(ParamValue::Float(v))
    }
}

impl ParamValue {
    pub fn kind(&self) -> ParamType {
        match self {
            Self::Bool(_) => ParamType::Bool,
            Self::Int(_) => ParamType::Int,
            Self::Float(_) => ParamType::Float,
        }
    }

    /// Encode the value for the wire.
    pub fn to_bytes(&self) -> ParamData {
        let mut buf = [0u8; MAX_PARAM_SIZE];
        let len = match *self {
            Self::Bool(b) => {
                buf[0] = u8::from(b);
                1
            }
            Self::Int(v) => {
                let n = (MAX_PARAM_SIZE - (v.leading_zeros() / 8) as usize).max(1);
                buf[..n].copy_from_slice(&v.to_be_bytes()[MAX_PARAM_SIZE - n..]);
                n
            }
            Self::Float(v) => {
                buf = v.to_be_bytes();
                MAX_PARAM_SIZE
            }
        };
        // `len` never exceeds the buffer, so the copy cannot fail.
        ParamData::from_slice(&buf[..len]).unwrap_or_default()
    }

    /// Decode a payload previously produced for a parameter of type `kind`.
    pub fn from_bytes(kind: ParamType, data: &[u8]) -> Option<Self> {
        match kind {
            ParamType::Bool => match data {
                [0x00] => Some(Self::Bool(false)),
                [0x01] => Some(Self::Bool(true)),
                _ => None,
            },
            ParamType::Int => {
                if data.is_empty() || data.len() > MAX_PARAM_SIZE {
                    return None;
                }
                let v = data.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
                Some(Self::Int(v))
            }
            ParamType::Float => {
                let raw: [u8; 8] = data.try_into().ok()?;
                Some(Self::Float(f64::from_be_bytes(raw)))
            }
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(u64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// One entry of a packet's parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub id: u8,
    pub data: ParamData,
}

impl Parameter {
    /// Encoded payload length, as written in the `size` byte.
    pub fn size(&self) -> u8 {
        self.data.len() as u8
    }
}
