//! Values bound to positional placeholders.
use rusqlite::types::{ToSqlOutput, ValueRef};

/// A value for one `?` in a statement.
///
/// These are only ever handed to SQLite's parameter binding, never formatted into SQL text.
#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl rusqlite::ToSql for Param {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self {
            Param::Null => ValueRef::Null,
            Param::Integer(i) => ValueRef::Integer(*i),
            Param::Real(f) => ValueRef::Real(*f),
            Param::Text(s) => ValueRef::Text(s.as_bytes()),
            Param::Blob(b) => ValueRef::Blob(b),
        }))
    }
}

macro_rules! integer_from {
    ($($t: ty),*) => {
        $(
            impl From<$t> for Param {
                fn from(v: $t) -> Param {
                    Param::Integer(v.into())
                }
            }
        )*
    };
}

integer_from!(i8, i16, i32, i64, u8, u16, u32);

/// Types which may not fit in SQLite's signed 64-bit integers.  Values that don't fit bind as reals, the same as JSON
/// numbers that large.
macro_rules! wide_integer_from {
    ($($t: ty),*) => {
        $(
            impl From<$t> for Param {
                fn from(v: $t) -> Param {
                    i64::try_from(v)
                        .map(Param::Integer)
                        .unwrap_or(Param::Real(v as f64))
                }
            }
        )*
    };
}

wide_integer_from!(u64, usize, i128, u128, isize);

impl From<bool> for Param {
    fn from(v: bool) -> Param {
        Param::Integer(v as i64)
    }
}

impl From<f32> for Param {
    fn from(v: f32) -> Param {
        Param::Real(v.into())
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Param {
        Param::Real(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Param {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Param {
        Param::Text(v)
    }
}

impl From<&String> for Param {
    fn from(v: &String) -> Param {
        Param::Text(v.clone())
    }
}

impl From<Vec<u8>> for Param {
    fn from(v: Vec<u8>) -> Param {
        Param::Blob(v)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Param {
        v.map(Into::into).unwrap_or(Param::Null)
    }
}

/// JSON scalars bind as the SQLite value `->>` would produce for them, so they compare equal to extracted fields.
/// Arrays and objects bind as their JSON text.
impl From<&serde_json::Value> for Param {
    fn from(v: &serde_json::Value) -> Param {
        use serde_json::Value;

        match v {
            Value::Null => Param::Null,
            Value::Bool(b) => (*b).into(),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Param::Integer(i),
                None => Param::Real(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Param::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Param::Text(v.to_string()),
        }
    }
}

impl From<serde_json::Value> for Param {
    fn from(v: serde_json::Value) -> Param {
        match v {
            serde_json::Value::String(s) => Param::Text(s),
            other => (&other).into(),
        }
    }
}
