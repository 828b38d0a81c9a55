//! JSON decoding for portal API responses.

use anyhow::Result;

/// Decode a response body, and on failure report the serde path, the type
/// mismatch, and a snippet of the offending line.
pub fn parse_json_with_context<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    let jd = &mut serde_json::Deserializer::from_str(body);
    match serde_path_to_error::deserialize(jd) {
        Ok(value) => Ok(value),
        Err(err) => {
            let inner_err = err.inner();
            let (line, column) = (inner_err.line(), inner_err.column());
            let path = err.path().to_string();

            let msg = inner_err.to_string();
            let loc = format!(" at line {line} column {column}");
            let msg_without_loc = msg.strip_suffix(&loc).unwrap_or(&msg);

            let mut final_err = String::new();
            if !path.is_empty() && path != "." {
                final_err.push_str(&format!("at path '{path}': "));
            }
            final_err.push_str(&format!(
                "{} (line {line} col {column})\n{}",
                describe_mismatch(msg_without_loc),
                error_snippet(body, line, column, 20)
            ));

            Err(anyhow::anyhow!(final_err))
        }
    }
}

/// Rewrite "invalid type: X, expected Y" as "expected Y, got X".
fn describe_mismatch(error_msg: &str) -> String {
    if let Some((_, after)) = error_msg.split_once("invalid type: ")
        && let Some((actual, expected)) = after.split_once(", expected ")
    {
        let expected = expected.split(" at line ").next().unwrap_or(expected).trim();
        return format!("expected {expected}, got {actual}");
    }

    if error_msg.starts_with("expected ")
        && let Some(expected) = error_msg.split(" at line ").next()
    {
        return expected.to_string();
    }

    error_msg.to_string()
}

/// Up to `context_len` bytes around the error column with a caret under it.
/// Offsets are clamped to char boundaries so multi-byte text cannot split.
fn error_snippet(body: &str, line: usize, column: usize, context_len: usize) -> String {
    let target_line = body.lines().nth(line.saturating_sub(1)).unwrap_or("");
    if target_line.is_empty() {
        return "(empty line)".to_string();
    }

    let floor = |mut idx: usize| {
        idx = idx.min(target_line.len());
        while !target_line.is_char_boundary(idx) {
            idx -= 1;
        }
        idx
    };

    let error_idx = floor(column.saturating_sub(1));
    let half_len = context_len / 2;
    let start = floor(error_idx.saturating_sub(half_len));
    let end = floor(error_idx + half_len);

    let slice = &target_line[start..end];
    let indicator = " ".repeat(target_line[start..error_idx].chars().count()) + "^";

    format!("...{slice}...\n   {indicator}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_describe_mismatch_invalid_type() {
        let msg = "invalid type: null, expected a string at line 3 column 17";
        assert_eq!(describe_mismatch(msg), "expected a string, got null");
    }

    #[test]
    fn test_describe_mismatch_expected() {
        let msg = "expected value at line 1 column 1";
        assert_eq!(describe_mismatch(msg), "expected value");
    }

    #[test]
    fn test_describe_mismatch_passthrough() {
        assert_eq!(describe_mismatch("EOF while parsing"), "EOF while parsing");
    }

    #[test]
    fn test_error_path_names_nested_child() {
        #[derive(Debug, Deserialize)]
        struct Child {
            #[allow(dead_code)]
            name: String,
        }

        #[derive(Debug, Deserialize)]
        struct Assignment {
            #[allow(dead_code)]
            children: Vec<Child>,
        }

        #[derive(Debug, Deserialize)]
        struct Items {
            #[allow(dead_code)]
            data: Vec<Assignment>,
        }

        let json = r#"{
            "data": [
                { "children": [ { "name": "Holes" }, { "name": null } ] }
            ]
        }"#;

        let err = parse_json_with_context::<Items>(json).unwrap_err().to_string();
        assert!(err.contains("data[0].children[1].name"), "{err}");
        assert!(err.contains("expected") && err.contains("got"), "{err}");
    }

    #[test]
    fn test_snippet_does_not_split_multibyte_text() {
        #[derive(Debug, Deserialize)]
        struct Named {
            #[allow(dead_code)]
            name: u32,
        }

        let json = r#"{"name": "르네상스 퀴즈 결과 페이지"}"#;
        let err = parse_json_with_context::<Named>(json).unwrap_err().to_string();
        assert!(err.contains("at path 'name'"), "{err}");
        assert!(err.contains('^'));
    }

    #[test]
    fn test_valid_body_decodes() {
        let value: serde_json::Value = parse_json_with_context(r#"{"book": {}}"#).unwrap();
        assert!(value["book"].is_object());
    }
}
