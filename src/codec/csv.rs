//! CSV encoding
//!
//! - One header row, then one row per record
//! - Every line ends with `\n`
//! - Cells holding the delimiter, a quote or a line break are quoted,
//!   with inner quotes doubled
//! - Null is an empty cell, strings are written raw, arrays and objects
//!   as compact JSON

use serde_json::Value;

use crate::serializer::Record;

/// Encodes `rows` under `header`. Missing keys become empty cells.
pub fn encode_rows(header: &[&str], rows: &[Record], delimiter: char) -> String {
    let mut output = String::with_capacity(64 * (rows.len() + 1));

    write_line(&mut output, header.iter().map(|h| h.to_string()), delimiter);
    for row in rows {
        let cells = header
            .iter()
            .map(|name| row.get(*name).map(cell_text).unwrap_or_default());
        write_line(&mut output, cells, delimiter);
    }

    output
}

fn write_line<I>(output: &mut String, cells: I, delimiter: char)
where
    I: Iterator<Item = String>,
{
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            output.push(delimiter);
        }
        escape_cell(output, &cell, delimiter);
    }
    output.push('\n');
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

fn escape_cell(output: &mut String, cell: &str, delimiter: char) {
    let needs_quotes = cell
        .chars()
        .any(|c| c == delimiter || c == '"' || c == '\n' || c == '\r');
    if !needs_quotes {
        output.push_str(cell);
        return;
    }

    output.push('"');
    for c in cell.chars() {
        if c == '"' {
            output.push('"');
        }
        output.push(c);
    }
    output.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_header_only() {
        assert_eq!(encode_rows(&["id", "name"], &[], ','), "id,name\n");
    }

    #[test]
    fn test_rows_follow_header_order() {
        let rows = vec![
            record(json!({"name": "Jamie", "id": 1})),
            record(json!({"name": "Alex", "id": 2})),
        ];
        assert_eq!(
            encode_rows(&["id", "name"], &rows, ','),
            "id,name\n1,Jamie\n2,Alex\n"
        );
    }

    #[test]
    fn test_quoting() {
        let rows = vec![record(json!({
            "a": "x,y",
            "b": "say \"hi\"",
            "c": "two\nlines",
        }))];
        assert_eq!(
            encode_rows(&["a", "b", "c"], &rows, ','),
            "a,b,c\n\"x,y\",\"say \"\"hi\"\"\",\"two\nlines\"\n"
        );
    }

    #[test]
    fn test_null_missing_and_nested_cells() {
        let rows = vec![record(json!({
            "a": null,
            "c": {"k": [1, 2]},
            "d": true,
        }))];
        assert_eq!(
            encode_rows(&["a", "b", "c", "d"], &rows, ','),
            "a,b,c,d\n,,\"{\"\"k\"\":[1,2]}\",true\n"
        );
    }

    #[test]
    fn test_alternate_delimiter() {
        let rows = vec![record(json!({"a": "x,y", "b": "p;q"}))];
        assert_eq!(encode_rows(&["a", "b"], &rows, ';'), "a;b\nx,y;\"p;q\"\n");
    }
}
