//! JSON encoding

use crate::errors::SerializeResult;
use crate::serializer::Record;

/// Encodes a record, compact or indented.
///
/// Key order follows the record's insertion order.
pub fn encode(record: &Record, pretty: bool) -> SerializeResult<String> {
    let encoded = if pretty {
        serde_json::to_string_pretty(record)?
    } else {
        serde_json::to_string(record)?
    };
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_compact_keeps_insertion_order() {
        let r = record(json!({"name": "Jamie", "id": 123, "tags": ["a"]}));
        assert_eq!(
            encode(&r, false).unwrap(),
            r#"{"name":"Jamie","id":123,"tags":["a"]}"#
        );
    }

    #[test]
    fn test_pretty_is_indented() {
        let r = record(json!({"id": 1}));
        assert_eq!(encode(&r, true).unwrap(), "{\n  \"id\": 1\n}");
    }

    #[test]
    fn test_empty_record() {
        assert_eq!(encode(&Record::new(), false).unwrap(), "{}");
    }
}
