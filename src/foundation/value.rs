use std::{cmp::Ordering, collections::BTreeMap, fmt, sync::Arc};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::foundation::error::{ExprKitError, ExprKitResult};

/// Static type attached to parameters and conversions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    /// Accepts any value; conversions to `Any` are no-ops.
    #[default]
    Any,
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    Str,
    /// Record, optionally with a declared type name.
    Record(Option<String>),
}

impl ValueType {
    /// Named record type.
    pub fn record(name: impl Into<String>) -> Self {
        Self::Record(Some(name.into()))
    }

    /// Parse one of the built-in type keywords (`any`, `bool`, `int`, `float`, `str`, `record`).
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "any" => Some(Self::Any),
            "bool" => Some(Self::Bool),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "str" => Some(Self::Str),
            "record" => Some(Self::Record(None)),
            _ => None,
        }
    }

    /// Return `true` when `value` may be bound to a parameter of this type.
    ///
    /// `Null` is accepted everywhere, ints widen to float, and anonymous records are accepted
    /// by named record types.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Any, _) | (_, Value::Null) => true,
            (Self::Bool, Value::Bool(_))
            | (Self::Int, Value::Int(_))
            | (Self::Float, Value::Int(_) | Value::Float(_))
            | (Self::Str, Value::Str(_))
            | (Self::Record(None), Value::Record(_)) => true,
            (Self::Record(Some(name)), Value::Record(r)) => {
                r.type_name().is_none_or(|n| n == name)
            }
            _ => false,
        }
    }

    /// Declared record type name, if this is a named record type.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Record(Some(name)) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::Record(None) => f.write_str("record"),
            Self::Record(Some(name)) => f.write_str(name),
        }
    }
}

/// Named fields with an optional type name.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Record {
    type_name: Option<String>,
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Empty anonymous record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty record carrying a type name.
    pub fn named(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Declared type name, if any.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Iterate fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Dynamic runtime value consumed and produced by compiled programs.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Shared record.
    Record(Arc<Record>),
}

impl Value {
    /// Static type of this value. `Null` reports [`ValueType::Any`].
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Any,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Str(_) => ValueType::Str,
            Self::Record(r) => ValueType::Record(r.type_name.clone()),
        }
    }

    /// Short kind label for diagnostics.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Record(_) => "record",
        }
    }

    /// Return `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Boolean payload, if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer payload, if this is an int.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric payload widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Record payload, if this is a record.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Ordering used by `order_by` and friends.
    ///
    /// Numbers compare exactly across int and float, strings lexicographically and bools with
    /// `false < true`. Every other pairing, and `NaN`, is an evaluation error.
    pub fn compare(&self, other: &Self) -> ExprKitResult<Ordering> {
        self.partial_compare(other)?.ok_or_else(|| self.incomparable(other))
    }

    /// Ordering used by the comparison operators.
    ///
    /// Like [`Value::compare`], except two numbers that have no order (a `NaN` operand) yield
    /// `Ok(None)` rather than an error.
    pub fn partial_compare(&self, other: &Self) -> ExprKitResult<Option<Ordering>> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Ok(Some(a.cmp(b))),
            (Self::Float(a), Self::Float(b)) => Ok(a.partial_cmp(b)),
            (Self::Int(a), Self::Float(b)) => Ok(cmp_int_float(*a, *b)),
            (Self::Float(a), Self::Int(b)) => Ok(cmp_int_float(*b, *a).map(Ordering::reverse)),
            (Self::Str(a), Self::Str(b)) => Ok(Some(a.cmp(b))),
            (Self::Bool(a), Self::Bool(b)) => Ok(Some(a.cmp(b))),
            _ => Err(self.incomparable(other)),
        }
    }

    fn incomparable(&self, other: &Self) -> ExprKitError {
        ExprKitError::evaluation(format!(
            "cannot compare {} with {}",
            self.kind_label(),
            other.kind_label()
        ))
    }

    /// Equality used by `==` / `!=`: numbers compare exactly across int and float, everything
    /// else compares structurally.
    pub fn loose_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => {
                cmp_int_float(*a, *b) == Some(Ordering::Equal)
            }
            (a, b) => a == b,
        }
    }

    /// Read a named member. Member access on `Null` propagates `Null`.
    pub fn member(&self, name: &str) -> ExprKitResult<Self> {
        match self {
            Self::Null => Ok(Self::Null),
            Self::Record(r) => r.field(name).cloned().ok_or_else(|| {
                let owner = r.type_name().unwrap_or("record");
                ExprKitError::evaluation(format!("{owner} has no member `{name}`"))
            }),
            other => Err(ExprKitError::evaluation(format!(
                "cannot read member `{name}` of {}",
                other.kind_label()
            ))),
        }
    }

    /// Coerce to `ty`. `Null` converts to every type unchanged.
    pub fn convert(&self, ty: &ValueType) -> ExprKitResult<Self> {
        if matches!(ty, ValueType::Any) || self.is_null() {
            return Ok(self.clone());
        }
        let out = match (ty, self) {
            (ValueType::Bool, Self::Bool(v)) => Some(Self::Bool(*v)),
            (ValueType::Int, Self::Int(v)) => Some(Self::Int(*v)),
            (ValueType::Int, Self::Bool(v)) => Some(Self::Int(i64::from(*v))),
            (ValueType::Int, Self::Float(v)) => float_to_i64(*v).map(Self::Int),
            (ValueType::Float, Self::Int(_) | Self::Float(_)) => self.as_f64().map(Self::Float),
            (ValueType::Str, Self::Str(s)) => Some(Self::Str(s.clone())),
            (ValueType::Str, Self::Bool(_) | Self::Int(_) | Self::Float(_)) => {
                Some(Self::Str(self.to_string()))
            }
            (ValueType::Record(want), Self::Record(r)) => match want {
                None => Some(self.clone()),
                Some(name) if r.type_name() == Some(name.as_str()) => Some(self.clone()),
                Some(_) => None,
            },
            _ => None,
        };
        out.ok_or_else(|| {
            ExprKitError::evaluation(format!("cannot convert {} to {ty}", self.kind_label()))
        })
    }

    /// Convenience constructor for a record value.
    pub fn record(record: Record) -> Self {
        Self::Record(Arc::new(record))
    }
}

/// Exact `int` vs `float` ordering, without rounding the int through `f64`.
fn cmp_int_float(a: i64, b: f64) -> Option<Ordering> {
    // 2^63; every i64 is below it and at or above its negation.
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if b.is_nan() {
        return None;
    }
    if b >= TWO_POW_63 {
        return Some(Ordering::Less);
    }
    if b < -TWO_POW_63 {
        return Some(Ordering::Greater);
    }
    let t = b.trunc();
    Some(match a.cmp(&(t as i64)) {
        Ordering::Equal if b > t => Ordering::Less,
        Ordering::Equal if b < t => Ordering::Greater,
        ord => ord,
    })
}

fn float_to_i64(v: f64) -> Option<i64> {
    if !v.is_finite() {
        return None;
    }
    let t = v.trunc();
    if t < i64::MIN as f64 || t >= i64::MAX as f64 {
        return None;
    }
    Some(t as i64)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            // Debug keeps a trailing `.0` so the text reads back as a float.
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Str(s) => write_quoted(f, s),
            Self::Record(r) => {
                if let Some(name) = r.type_name() {
                    write!(f, "{name} ")?;
                }
                f.write_str("{")?;
                for (i, (k, v)) in r.fields().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Record(r) => {
                let mut map = serializer.serialize_map(Some(r.fields.len()))?;
                for (k, v) in &r.fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = ExprKitError;

    fn try_from(v: serde_json::Value) -> ExprKitResult<Self> {
        Ok(match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().ok_or_else(|| {
                    ExprKitError::invalid_shape(format!("unrepresentable number {n}"))
                })?),
            },
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(_) => {
                return Err(ExprKitError::invalid_shape(
                    "arrays are not supported as values",
                ));
            }
            serde_json::Value::Object(obj) => {
                let mut record = Record::new();
                for (k, v) in obj {
                    record.insert(k, Self::try_from(v)?);
                }
                Self::record(record)
            }
        })
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::record(v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/value.rs"]
mod tests;
