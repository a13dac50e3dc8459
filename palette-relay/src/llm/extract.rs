use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How to locate the JSON object inside a model's free-text answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractStrategy {
    /// Span from the first `{` to the last `}`.
    ///
    /// Mis-extracts when prose around the payload contains braces, or when the
    /// model emits more than one object. Kept as the default so callers see the
    /// same spans the relay has always produced.
    #[default]
    OuterBraces,
    /// First brace-balanced region (string and escape aware) that parses as a
    /// JSON object.
    Balanced,
}

/// Locate the JSON object embedded in `text`.
///
/// Returns `None` when no candidate span exists. With [`ExtractStrategy::OuterBraces`]
/// the returned slice is not parsed or validated.
pub fn extract_json_object(text: &str, strategy: ExtractStrategy) -> Option<&str> {
    match strategy {
        ExtractStrategy::OuterBraces => outer_braces(text),
        ExtractStrategy::Balanced => balanced_object(text),
    }
}

fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    // '}' is a single byte, so end + 1 is a char boundary
    Some(&text[start..=end])
}

fn balanced_object(text: &str) -> Option<&str> {
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = matching_close(&text[start..]) {
            let candidate = &text[start..start + end + 1];
            if matches!(serde_json::from_str::<Value>(candidate), Ok(Value::Object(_))) {
                return Some(candidate);
            }
        }
        search_from = start + 1;
    }

    None
}

/// Byte index of the `}` closing the `{` at position 0 of `text`.
fn matching_close(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, byte) in text.bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r##"{"palette":[{"role":"Primary","hex":"#0b3954","name":"Deep Ocean"}],"justification":"Stormy."}"##;

    #[test]
    fn test_outer_braces_requires_both_delimiters() {
        for text in ["", "no json here", "only { open", "only } close", "]["] {
            assert_eq!(extract_json_object(text, ExtractStrategy::OuterBraces), None, "{text:?}");
        }
    }

    #[test]
    fn test_outer_braces_strips_brace_free_affixes() {
        let prefixes = ["", "Here you go:\n<json>\n", "```json\n", "Sure! "];
        let suffixes = ["", "\n</json>", "\n```", " Enjoy :)"];

        for prefix in prefixes {
            for suffix in suffixes {
                let text = format!("{prefix}{PAYLOAD}{suffix}");
                assert_eq!(
                    extract_json_object(&text, ExtractStrategy::OuterBraces),
                    Some(PAYLOAD)
                );
            }
        }
    }

    #[test]
    fn test_outer_braces_close_before_open_is_none() {
        assert_eq!(extract_json_object("} then {", ExtractStrategy::OuterBraces), None);
    }

    #[test]
    fn test_outer_braces_is_fooled_by_stray_braces() {
        let text = format!("Note {{draft}} follows: {PAYLOAD}");
        let span = extract_json_object(&text, ExtractStrategy::OuterBraces).unwrap();
        assert!(span.starts_with("{draft}"));
        assert!(serde_json::from_str::<Value>(span).is_err());
    }

    #[test]
    fn test_outer_braces_handles_multibyte_prose() {
        let text = format!("Voilà 🎨 {PAYLOAD} — fin");
        assert_eq!(extract_json_object(&text, ExtractStrategy::OuterBraces), Some(PAYLOAD));
    }

    #[test]
    fn test_balanced_skips_non_json_aside() {
        let text = format!("Note {{draft}} follows: {PAYLOAD} (see {{appendix}})");
        assert_eq!(extract_json_object(&text, ExtractStrategy::Balanced), Some(PAYLOAD));
    }

    #[test]
    fn test_balanced_ignores_braces_inside_strings() {
        let text = r#"x {"a": "}{", "b": {"c": "\"}"}} y"#;
        assert_eq!(
            extract_json_object(text, ExtractStrategy::Balanced),
            Some(r#"{"a": "}{", "b": {"c": "\"}"}}"#)
        );
    }

    #[test]
    fn test_balanced_returns_none_without_object() {
        assert_eq!(extract_json_object("{ unclosed", ExtractStrategy::Balanced), None);
        assert_eq!(extract_json_object("{not json}", ExtractStrategy::Balanced), None);
        assert_eq!(extract_json_object("plain", ExtractStrategy::Balanced), None);
    }

    #[test]
    fn test_strategy_deserializes_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            strategy: ExtractStrategy,
        }
        let wrapper: Wrapper = toml::from_str(r#"strategy = "balanced""#).unwrap();
        assert_eq!(wrapper.strategy, ExtractStrategy::Balanced);
        assert_eq!(ExtractStrategy::default(), ExtractStrategy::OuterBraces);
    }
}
