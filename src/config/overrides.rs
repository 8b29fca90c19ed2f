use serde::Serialize;
use serde_json::Value;

/// Serialize command-line overrides, dropping every unset value
///
/// Flags the user did not pass serialize as `null` (or as empty tables once
/// their fields are gone) and must not shadow lower configuration layers.
pub fn strip_unset<T: Serialize>(input: T) -> Value {
    let mut value = serde_json::to_value(input).unwrap_or(Value::Null);
    strip_unset_recursive(&mut value);
    value
}

fn strip_unset_recursive(value: &mut Value) {
    if let Value::Object(map) = value {
        for (_, v) in map.iter_mut() {
            strip_unset_recursive(v);
        }

        map.retain(|_, v| match v {
            Value::Null => false,
            Value::Object(inner) => !inner.is_empty(),
            _ => true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_unset_drops_nulls_and_empty_tables() {
        let input = json!({
            "enabled": null,
            "min_file_size_mb": 25,
            "library": { "root": null, "delete_files": null },
        });

        assert_eq!(strip_unset(input), json!({ "min_file_size_mb": 25 }));
    }

    #[test]
    fn test_strip_unset_keeps_false_and_nested_values() {
        let input = json!({
            "enabled": false,
            "library": { "delete_files": true, "root": null },
        });

        assert_eq!(
            strip_unset(input),
            json!({ "enabled": false, "library": { "delete_files": true } })
        );
    }
}
