//! Signal value types carried by ports

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// The closed set of types a port can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Integer,
    Real,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Real => "real",
        }
    }

    /// True for types that support arithmetic (Gain, Sum, Product)
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ValueType::Boolean)
    }

    /// Additive identity, used as the Sum fold seed
    pub fn zero(&self) -> Option<Value> {
        match self {
            ValueType::Boolean => None,
            ValueType::Integer => Some(Value::Int(0)),
            ValueType::Real => Some(Value::Real(0.0)),
        }
    }

    /// Multiplicative identity, used as the Product fold seed
    pub fn one(&self) -> Option<Value> {
        match self {
            ValueType::Boolean => None,
            ValueType::Integer => Some(Value::Int(1)),
            ValueType::Real => Some(Value::Real(1.0)),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single sample on a port
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Real(f64),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Boolean,
            Value::Int(_) => ValueType::Integer,
            Value::Real(_) => ValueType::Real,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match *self {
            Value::Real(x) => Some(x),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(x)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Real(x) => write!(f, "{}", x),
        }
    }
}

/// Binary arithmetic on two samples of the same numeric type
///
/// Integer operations are checked; real operations follow IEEE-754, so a
/// real division by zero yields an infinity rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arith {
    Add,
    Sub,
    Mul,
    Div,
}

impl Arith {
    pub(crate) fn apply(self, lhs: Value, rhs: Value, block: &str) -> SimResult<Value> {
        match (lhs, rhs) {
            (Value::Real(a), Value::Real(b)) => Ok(Value::Real(match self {
                Arith::Add => a + b,
                Arith::Sub => a - b,
                Arith::Mul => a * b,
                Arith::Div => a / b,
            })),
            (Value::Int(a), Value::Int(b)) => {
                let result = match self {
                    Arith::Add => a.checked_add(b),
                    Arith::Sub => a.checked_sub(b),
                    Arith::Mul => a.checked_mul(b),
                    Arith::Div => {
                        if b == 0 {
                            return Err(SimError::DivisionByZero(block.to_string()));
                        }
                        a.checked_div(b)
                    }
                };
                result
                    .map(Value::Int)
                    .ok_or_else(|| SimError::Overflow(block.to_string()))
            }
            (a, b) => Err(SimError::InvalidValue {
                context: format!("arithmetic in block '{}'", block),
                expected: a.value_type(),
                found: b.value_type(),
            }),
        }
    }
}
