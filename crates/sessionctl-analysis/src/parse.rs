use crate::error::{Error, Result};
use sessionctl_types::Verdict;
use serde_json::Value;

/// Find the final text's assistant reply's JSON array answer. Tries every
/// `[...]`-balanced substring in left-to-right order and returns the first
/// one that parses as a JSON array, so stray brackets in prose (e.g. "LINE
/// 1 [len=500]") that don't happen to be valid JSON are skipped over (spec
/// §4.5 "Parsing"). Returns `Unparseable` if none parse.
pub fn extract_json_array(text: &str) -> Result<Value> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    while let Some(rel_start) = text[pos..].find('[') {
        let start = pos + rel_start;
        let mut depth = 0i32;
        let mut end = None;
        for (i, &b) in bytes.iter().enumerate().skip(start) {
            match b {
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(end) = end else { break };
        let candidate = &text[start..=end];
        if let Ok(value @ Value::Array(_)) = serde_json::from_str::<Value>(candidate) {
            return Ok(value);
        }
        pos = start + 1;
    }
    Err(Error::Unparseable(text.to_string()))
}

/// Parse a worker reply into verdicts, accepting either a bare `[int, ...]`
/// array or an array of `[line, rationale, description?]` tuples.
/// Malformed entries are dropped silently, not fatal (spec §4.5).
pub fn parse_verdicts(text: &str) -> Result<Vec<Verdict>> {
    let value = extract_json_array(text)?;
    let Value::Array(items) = value else {
        return Err(Error::Unparseable(text.to_string()));
    };

    let mut verdicts = Vec::new();
    for item in items {
        match item {
            Value::Number(n) => {
                if let Some(line) = n.as_u64() {
                    verdicts.push(Verdict::bare(line as usize));
                }
            }
            Value::Array(tuple) => {
                let Some(line) = tuple.first().and_then(Value::as_u64) else { continue };
                let rationale = tuple
                    .get(1)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let description = tuple
                    .get(2)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                verdicts.push(Verdict { line_number: line as usize, rationale, description });
            }
            _ => {}
        }
    }
    Ok(verdicts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_int_array() {
        let v = parse_verdicts("sure, here: [3, 7, 12] thanks").unwrap();
        assert_eq!(v.iter().map(|v| v.line_number).collect::<Vec<_>>(), vec![3, 7, 12]);
    }

    #[test]
    fn parses_verbose_tuples() {
        let v = parse_verdicts(r#"[[3, "noisy build log", "trim"], [9, "dup output", ""]]"#).unwrap();
        assert_eq!(v[0].line_number, 3);
        assert_eq!(v[0].rationale, "noisy build log");
        assert_eq!(v[1].description, "");
    }

    #[test]
    fn handles_nested_brackets_in_preamble() {
        let text = r#"Looking at LINE 1 [len=500] I'd say [4, 5]"#;
        let v = parse_verdicts(text).unwrap();
        assert_eq!(v.iter().map(|v| v.line_number).collect::<Vec<_>>(), vec![4, 5]);
    }

    #[test]
    fn drops_malformed_entries_silently() {
        let v = parse_verdicts(r#"[1, "not a number", 3]"#).unwrap();
        assert_eq!(v.iter().map(|v| v.line_number).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn empty_array_is_ok() {
        let v = parse_verdicts("nothing to trim here: []").unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn no_brackets_is_unparseable() {
        assert!(parse_verdicts("no json at all").is_err());
    }
}
