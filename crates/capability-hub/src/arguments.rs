//! Validated handler arguments and the coercion rules that produce them.

use serde_json::{Map, Number, Value};

use crate::descriptor::ParamType;
use crate::error::{CapabilityError, CapabilityResult};

/// Arguments after presence checks, defaults and type coercion.
///
/// Every declared parameter that was supplied (or defaulted) is present with a
/// value of its declared type, so the typed getters only fail on programming
/// errors such as asking for an undeclared name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Map<String, Value>,
}

impl Arguments {
    /// Wrap an already-validated map.
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn require(&self, name: &str) -> CapabilityResult<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| CapabilityError::invalid(name, "missing required argument"))
    }

    pub fn str(&self, name: &str) -> CapabilityResult<&str> {
        self.require(name)?
            .as_str()
            .ok_or_else(|| CapabilityError::type_mismatch(name, "string"))
    }

    pub fn f64(&self, name: &str) -> CapabilityResult<f64> {
        self.require(name)?
            .as_f64()
            .ok_or_else(|| CapabilityError::type_mismatch(name, "number"))
    }

    pub fn i64(&self, name: &str) -> CapabilityResult<i64> {
        self.require(name)?
            .as_i64()
            .ok_or_else(|| CapabilityError::type_mismatch(name, "integer"))
    }

    pub fn bool(&self, name: &str) -> CapabilityResult<bool> {
        self.require(name)?
            .as_bool()
            .ok_or_else(|| CapabilityError::type_mismatch(name, "boolean"))
    }

    pub fn list(&self, name: &str) -> CapabilityResult<&[Value]> {
        self.require(name)?
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| CapabilityError::type_mismatch(name, "list"))
    }

    /// A `list<number>` argument as floats.
    pub fn f64_list(&self, name: &str) -> CapabilityResult<Vec<f64>> {
        self.list(name)?
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| CapabilityError::type_mismatch(name, "list<number>"))
            })
            .collect()
    }

    pub fn map(&self, name: &str) -> CapabilityResult<&Map<String, Value>> {
        self.require(name)?
            .as_object()
            .ok_or_else(|| CapabilityError::type_mismatch(name, "map"))
    }
}

/// Coerce a loosely-typed value to `ty`.
///
/// `param` names the value in error messages; nested positions are reported
/// as `name[3]` or `name.key`.
pub fn coerce(param: &str, ty: &ParamType, value: Value) -> CapabilityResult<Value> {
    let mismatch = || CapabilityError::type_mismatch(param, ty.name());

    match ty {
        ParamType::Any => Ok(value),
        ParamType::String => match value {
            Value::String(_) => Ok(value),
            _ => Err(mismatch()),
        },
        ParamType::Number => match value {
            Value::Number(n) => n
                .as_f64()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(mismatch),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        ParamType::Integer => match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::from(i))
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                            Ok(Value::from(f as i64))
                        }
                        _ => Err(mismatch()),
                    }
                }
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        ParamType::Boolean => match value {
            Value::Bool(_) => Ok(value),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(mismatch()),
            },
            _ => Err(mismatch()),
        },
        ParamType::List(inner) => match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| coerce(&format!("{param}[{i}]"), inner, item))
                .collect::<CapabilityResult<Vec<_>>>()
                .map(Value::Array),
            _ => Err(mismatch()),
        },
        ParamType::Map(inner) => match value {
            Value::Object(fields) => fields
                .into_iter()
                .map(|(key, item)| {
                    let coerced = coerce(&format!("{param}.{key}"), inner, item)?;
                    Ok((key, coerced))
                })
                .collect::<CapabilityResult<Map<_, _>>>()
                .map(Value::Object),
            _ => Err(mismatch()),
        },
    }
}
