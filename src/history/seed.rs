//! Initial history seeds.
//!
//! A task may configure the outcome pattern its history starts from. The
//! configured value is loosely typed (it usually arrives from a JSON
//! document) and is normalized to a binary sequence before use.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A configured initial k-sequence.
///
/// Accepted shapes, in deserialization order:
/// - `true` / `false`: a one-element sequence
/// - a number: one element, non-zero = success
/// - a string of `'0'`/`'1'` characters; other characters are ignored
/// - an array whose elements are mapped by truthiness
/// - anything else: treated as a single success
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedSequence {
    /// Single boolean outcome.
    Flag(bool),
    /// Single numeric outcome.
    Number(f64),
    /// Character pattern such as `"1101"`.
    Pattern(String),
    /// Ordered list of truthy/falsy values.
    Values(Vec<Value>),
    /// Unrecognized value.
    Other(Value),
}

impl SeedSequence {
    /// Normalizes this seed to a non-empty binary sequence (oldest first).
    pub fn normalize(&self) -> Vec<bool> {
        let mut bits = match self {
            SeedSequence::Flag(flag) => vec![*flag],
            SeedSequence::Number(n) => vec![*n != 0.0],
            SeedSequence::Pattern(pattern) => pattern
                .chars()
                .filter_map(|c| match c {
                    '1' => Some(true),
                    '0' => Some(false),
                    _ => None,
                })
                .collect(),
            SeedSequence::Values(values) => values.iter().map(is_truthy).collect(),
            SeedSequence::Other(_) => vec![true],
        };
        if bits.is_empty() {
            bits.push(true);
        }
        bits
    }
}

/// Normalizes an optional seed. An absent seed is a single success.
pub fn normalize_seed(seed: Option<&SeedSequence>) -> Vec<bool> {
    seed.map(SeedSequence::normalize).unwrap_or_else(|| vec![true])
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

impl From<&str> for SeedSequence {
    fn from(pattern: &str) -> Self {
        SeedSequence::Pattern(pattern.to_string())
    }
}

impl From<String> for SeedSequence {
    fn from(pattern: String) -> Self {
        SeedSequence::Pattern(pattern)
    }
}

impl From<bool> for SeedSequence {
    fn from(flag: bool) -> Self {
        SeedSequence::Flag(flag)
    }
}

impl From<Vec<bool>> for SeedSequence {
    fn from(flags: Vec<bool>) -> Self {
        SeedSequence::Values(flags.into_iter().map(Value::Bool).collect())
    }
}

impl From<Vec<u8>> for SeedSequence {
    fn from(bits: Vec<u8>) -> Self {
        SeedSequence::Values(bits.into_iter().map(Value::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bits(seq: &[u8]) -> Vec<bool> {
        seq.iter().map(|&b| b != 0).collect()
    }

    #[test]
    fn test_pattern_ignores_noise() {
        let seed = SeedSequence::from("1-0 1x1");
        assert_eq!(seed.normalize(), bits(&[1, 0, 1, 1]));
    }

    #[test]
    fn test_pattern_without_digits_is_success() {
        assert_eq!(SeedSequence::from("abc").normalize(), vec![true]);
        assert_eq!(SeedSequence::from("").normalize(), vec![true]);
    }

    #[test]
    fn test_values_truthiness() {
        let seed: SeedSequence = serde_json::from_value(json!([1, 0, true, null, "x", "", 2.5]))
            .expect("array seed");
        assert_eq!(seed.normalize(), bits(&[1, 0, 1, 0, 1, 0, 1]));
    }

    #[test]
    fn test_empty_values_is_success() {
        assert_eq!(SeedSequence::Values(vec![]).normalize(), vec![true]);
    }

    #[test]
    fn test_scalars() {
        assert_eq!(SeedSequence::from(false).normalize(), vec![false]);
        assert_eq!(SeedSequence::Number(0.0).normalize(), vec![false]);
        assert_eq!(SeedSequence::Number(3.0).normalize(), vec![true]);
    }

    #[test]
    fn test_deserialize_shapes() {
        let flag: SeedSequence = serde_json::from_value(json!(false)).expect("flag");
        assert_eq!(flag, SeedSequence::Flag(false));

        let number: SeedSequence = serde_json::from_value(json!(0)).expect("number");
        assert_eq!(number, SeedSequence::Number(0.0));

        let pattern: SeedSequence = serde_json::from_value(json!("0110")).expect("pattern");
        assert_eq!(pattern, SeedSequence::Pattern("0110".into()));

        let other: SeedSequence = serde_json::from_value(json!({"bits": 3})).expect("other");
        assert_eq!(other.normalize(), vec![true]);
    }

    #[test]
    fn test_absent_seed() {
        assert_eq!(normalize_seed(None), vec![true]);
        let seed = SeedSequence::from(vec![0u8, 1]);
        assert_eq!(normalize_seed(Some(&seed)), bits(&[0, 1]));
    }
}
