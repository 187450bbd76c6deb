//! Parameter values attached to particles, decays and process groups.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Parameter overriding the type of a declared particle (`B1 [type=B0]`).
pub const TYPE_PARAM: &str = "type";

/// Parameter overriding the database branching fraction of a decay.
pub const BRANCHING_FRACTION_PARAM: &str = "fraction";

/// Ordered parameter mapping.
pub type Params = BTreeMap<String, ParamValue>;

/// A single parameter value.
///
/// GraphPhys documents only ever produce `Bool(true)` (for a parameter given
/// without a value), `Text` and `Map`. Numeric literals keep their source
/// spelling as `Text`; use [`ParamValue::as_f64`] to coerce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Map(Params),
}

impl ParamValue {
    /// The value given to a parameter listed without `= value`.
    pub const FLAG: ParamValue = ParamValue::Bool(true);

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Params> {
        match self {
            ParamValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Numeric view of the value. Text is parsed, so `"0.25"` yields `0.25`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Text(s) => write!(f, "{s}"),
            ParamValue::Map(m) => {
                write!(f, "[")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Number(n)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<Params> for ParamValue {
    fn from(m: Params) -> Self {
        ParamValue::Map(m)
    }
}

/// Layer `overlay` on top of `base`; overlay entries win.
pub fn merged(base: &Params, overlay: &Params) -> Params {
    let mut result = base.clone();
    result.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
    result
}

/// Build a [`Params`] map from `(name, value)` pairs.
///
/// ```ignore
/// let p = params([("mass", "5.28".into()), ("fraction", 0.5.into())]);
/// ```
pub fn params<I, K>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, ParamValue)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
