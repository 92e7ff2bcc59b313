//! Field decoders that never fail on a wrong JSON type.
//!
//! Upstream payloads are not under our control, so every raw field is read
//! as "whatever is there": a wrong type decodes as `None` instead of failing
//! the whole record. Use with `#[serde(default, deserialize_with = "...")]`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Integer, also accepting integral floats and numeric strings (`"57"`).
pub fn int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Non-empty string; numbers are stringified.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Nested object; anything that is not an object, or does not fit `T`,
/// becomes `None`.
pub fn object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => T::deserialize(value).ok(),
        _ => None,
    })
}

/// List of `T`, dropping elements that do not fit.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| T::deserialize(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Probe {
        #[serde(deserialize_with = "int")]
        id: Option<i64>,
        #[serde(deserialize_with = "text")]
        name: Option<String>,
        #[serde(deserialize_with = "object")]
        inner: Option<Inner>,
        #[serde(deserialize_with = "list")]
        items: Vec<Inner>,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Inner {
        #[serde(deserialize_with = "int")]
        value: Option<i64>,
    }

    #[test]
    fn accepts_loose_types() {
        let probe: Probe = serde_json::from_value(json!({
            "id": "57",
            "name": 12,
            "inner": { "value": 3.0 },
            "items": [{ "value": 1 }, "junk", { "value": "2" }]
        }))
        .unwrap();
        assert_eq!(probe.id, Some(57));
        assert_eq!(probe.name.as_deref(), Some("12"));
        assert_eq!(probe.inner, Some(Inner { value: Some(3) }));
        assert_eq!(probe.items.len(), 2);
        assert_eq!(probe.items[1].value, Some(2));
    }

    #[test]
    fn wrong_types_become_absent() {
        let probe: Probe = serde_json::from_value(json!({
            "id": [1],
            "name": "   ",
            "inner": "not an object",
            "items": { "value": 1 }
        }))
        .unwrap();
        assert_eq!(probe.id, None);
        assert_eq!(probe.name, None);
        assert_eq!(probe.inner, None);
        assert!(probe.items.is_empty());
    }
}
