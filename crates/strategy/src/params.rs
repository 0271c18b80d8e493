use std::collections::{HashMap, HashSet};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A parameter value supplied by a caller (JSON body or TOML file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// Declared default of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamDefault {
    Number(f64),
    Choice(&'static str),
}

/// UI hint: numeric input with bounds, or a drop-down of fixed choices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamKind {
    Number {
        min: f64,
        max: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    Select {
        options: &'static [&'static str],
    },
}

/// Declaration of one recognised strategy option.
///
/// Strategies declare these as `const` items and read values through
/// [`ParamSet::number`] / [`ParamSet::period`] / [`ParamSet::choice`], so a
/// key and its default are written down exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    #[serde(skip)]
    pub key: &'static str,
    pub label: &'static str,
    pub default: ParamDefault,
    #[serde(flatten)]
    pub kind: ParamKind,
}

impl ParamSpec {
    pub const fn number(
        key: &'static str,
        label: &'static str,
        default: f64,
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            key,
            label,
            default: ParamDefault::Number(default),
            kind: ParamKind::Number {
                min,
                max,
                step: None,
            },
        }
    }

    pub const fn stepped(
        key: &'static str,
        label: &'static str,
        default: f64,
        min: f64,
        max: f64,
        step: f64,
    ) -> Self {
        Self {
            key,
            label,
            default: ParamDefault::Number(default),
            kind: ParamKind::Number {
                min,
                max,
                step: Some(step),
            },
        }
    }

    pub const fn select(
        key: &'static str,
        label: &'static str,
        default: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            key,
            label,
            default: ParamDefault::Choice(default),
            kind: ParamKind::Select { options },
        }
    }
}

/// Serializes a parameter schema as an ordered `key -> spec` map, the shape
/// the UI renders its forms from.
#[derive(Debug, Clone, Copy)]
pub struct Schema(pub &'static [ParamSpec]);

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for spec in self.0 {
            map.serialize_entry(spec.key, spec)?;
        }
        map.end()
    }
}

/// Check that a schema is internally consistent.
pub fn validate_schema(schema: &[ParamSpec]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for spec in schema {
        if spec.key.is_empty() {
            return Err("parameter with an empty key".to_string());
        }
        if !seen.insert(spec.key) {
            return Err(format!("duplicate parameter '{}'", spec.key));
        }
        match (spec.kind, spec.default) {
            (ParamKind::Number { min, max, step }, ParamDefault::Number(default)) => {
                if !(min <= max) {
                    return Err(format!("'{}': min {min} exceeds max {max}", spec.key));
                }
                if !(min..=max).contains(&default) {
                    return Err(format!(
                        "'{}': default {default} outside [{min}, {max}]",
                        spec.key
                    ));
                }
                if step.is_some_and(|s| !(s > 0.0)) {
                    return Err(format!("'{}': step must be positive", spec.key));
                }
            }
            (ParamKind::Select { options }, ParamDefault::Choice(default)) => {
                if !options.contains(&default) {
                    return Err(format!(
                        "'{}': default '{default}' is not one of its options",
                        spec.key
                    ));
                }
            }
            _ => return Err(format!("'{}': default does not match its kind", spec.key)),
        }
    }
    Ok(())
}

/// Option name -> value, as supplied by the caller.
///
/// Unrecognised keys are carried but never read; missing or unusable
/// values fall back to the declared default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSet(HashMap<String, ParamValue>);

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Numeric value of `spec`; numeric strings are accepted.
    pub fn number(&self, spec: &ParamSpec) -> f64 {
        let default = match spec.default {
            ParamDefault::Number(n) => n,
            ParamDefault::Choice(_) => f64::NAN,
        };
        let supplied = match self.0.get(spec.key) {
            Some(ParamValue::Number(n)) => Some(*n),
            Some(ParamValue::Text(s)) => s.trim().parse::<f64>().ok(),
            None => None,
        };
        supplied.filter(|n| n.is_finite()).unwrap_or(default)
    }

    /// Numeric value of `spec` rounded to a window length and capped at the
    /// declared maximum; non-positive values become 0, which every
    /// indicator rejects.
    pub fn period(&self, spec: &ParamSpec) -> usize {
        let mut n = self.number(spec);
        if let ParamKind::Number { max, .. } = spec.kind {
            n = n.min(max);
        }
        if n.is_finite() && n >= 0.5 {
            n.round() as usize
        } else {
            0
        }
    }

    /// Text value of a select option.
    pub fn choice(&self, spec: &ParamSpec) -> &str {
        match (self.0.get(spec.key), spec.default) {
            (Some(ParamValue::Text(s)), _) => s.as_str(),
            (_, ParamDefault::Choice(default)) => default,
            (_, ParamDefault::Number(_)) => "",
        }
    }
}

impl FromIterator<(String, ParamValue)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LENGTH: ParamSpec = ParamSpec::number("length", "Length", 14.0, 2.0, 50.0);
    const MODE: ParamSpec = ParamSpec::select("mode", "Mode", "A", &["A", "B"]);

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let params = ParamSet::new();
        assert_eq!(params.period(&LENGTH), 14);
        assert_eq!(params.choice(&MODE), "A");
    }

    #[test]
    fn supplied_values_win_and_numeric_strings_are_parsed() {
        let params = ParamSet::new().with("length", "21").with("mode", "B");
        assert_eq!(params.period(&LENGTH), 21);
        assert_eq!(params.choice(&MODE), "B");
    }

    #[test]
    fn wrongly_typed_values_use_the_default() {
        let params = ParamSet::new().with("length", "abc");
        assert_eq!(params.number(&LENGTH), 14.0);
    }

    #[test]
    fn non_positive_periods_become_zero() {
        let params = ParamSet::new().with("length", -3.0);
        assert_eq!(params.period(&LENGTH), 0);
    }

    #[test]
    fn oversized_periods_are_capped_at_the_declared_max() {
        let params = ParamSet::new().with("length", 1e17);
        assert_eq!(params.period(&LENGTH), 50);
        assert_eq!(params.number(&LENGTH), 1e17);
    }

    #[test]
    fn params_deserialize_from_json_numbers_and_strings() {
        let params: ParamSet = serde_json::from_str(r#"{"length": 10, "mode": "B"}"#).unwrap();
        assert_eq!(params.period(&LENGTH), 10);
        assert_eq!(params.choice(&MODE), "B");
    }

    #[test]
    fn schema_serializes_in_ui_shape() {
        let json = serde_json::to_value(Schema(&[LENGTH, MODE])).unwrap();
        assert_eq!(json["length"]["type"], "number");
        assert_eq!(json["length"]["default"], 14.0);
        assert_eq!(json["length"]["min"], 2.0);
        assert!(json["length"].get("step").is_none());
        assert_eq!(json["mode"]["type"], "select");
        assert_eq!(json["mode"]["options"][1], "B");
    }

    #[test]
    fn schema_validation_catches_bad_declarations() {
        assert!(validate_schema(&[LENGTH, MODE]).is_ok());
        assert!(validate_schema(&[LENGTH, LENGTH]).is_err());
        let out_of_bounds = ParamSpec::number("x", "X", 100.0, 1.0, 10.0);
        assert!(validate_schema(&[out_of_bounds]).is_err());
        let bad_choice = ParamSpec::select("y", "Y", "C", &["A", "B"]);
        assert!(validate_schema(&[bad_choice]).is_err());
    }
}
