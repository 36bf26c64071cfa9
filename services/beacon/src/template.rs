//! Named-placeholder substitution for destination templates

use std::collections::HashMap;

/// Replace each `{name}` placeholder with its value from `vars`.
///
/// Placeholders without an entry are left as they are.
pub fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start + 1..];
        let replaced = candidate.find('}').and_then(|end| {
            let name = &candidate[..end];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });

        match replaced {
            Some((value, end)) => {
                out.push_str(value);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('{');
                rest = candidate;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Turn the two-character sequence `\n` typed into a settings form into a line break
pub fn unescape_newlines(template: &str) -> String {
    template.replace("\\n", "\n")
}

/// Substitute `{key}` in a JSON document while keeping its structural braces.
///
/// `None` or an empty map returns the input untouched.
pub fn json_string_substitute(json: &str, substitutions: Option<&HashMap<String, String>>) -> String {
    match substitutions {
        Some(subs) if !subs.is_empty() => {
            let vars: Vec<(&str, &str)> = subs
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .collect();
            substitute(json, &vars)
        }
        _ => json.to_string(),
    }
}

/// Escape a value so it can sit inside a JSON string literal
pub fn json_escape(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitute_replaces_known_placeholders() {
        let out = substitute(
            "{alert_name} changed state to {new_state}.",
            &[("alert_name", "Disk full"), ("new_state", "TRIGGERED")],
        );
        assert_eq!(out, "Disk full changed state to TRIGGERED.");
    }

    #[test]
    fn substitute_keeps_unknown_and_unbalanced_braces() {
        let out = substitute("{a} {missing} {b", &[("a", "1"), ("b", "2")]);
        assert_eq!(out, "1 {missing} {b");
    }

    #[test]
    fn substitute_does_not_rescan_inserted_values() {
        let out = substitute("{a}", &[("a", "{b}"), ("b", "nope")]);
        assert_eq!(out, "{b}");
    }

    #[test]
    fn unescape_newlines_converts_literal_sequences() {
        let out = unescape_newlines("Alert: x\\nState: y");
        assert_eq!(out, "Alert: x\nState: y");
        assert!(!out.contains("\\n"));
    }

    #[test]
    fn json_string_substitute_with_substitutions() {
        let json = r#"{"name": "{user_name}", "id": "{user_id}"}"#;
        let subs = HashMap::from([
            ("user_name".to_string(), "John".to_string()),
            ("user_id".to_string(), "123".to_string()),
        ]);

        let out = json_string_substitute(json, Some(&subs));

        assert!(out.contains(r#""name": "John""#));
        assert!(out.contains(r#""id": "123""#));
    }

    #[test]
    fn json_string_substitute_without_substitutions_is_identity() {
        let json = r#"{"name": "{user_name}"}"#;
        assert_eq!(json_string_substitute(json, None), json);
        assert_eq!(json_string_substitute(json, Some(&HashMap::new())), json);
    }

    #[test]
    fn json_string_substitute_preserves_nested_braces() {
        let json = r#"{"data": {"nested": "{value}"}}"#;
        let subs = HashMap::from([("value".to_string(), "test".to_string())]);

        let out = json_string_substitute(json, Some(&subs));

        assert_eq!(out, r#"{"data": {"nested": "test"}}"#);
    }

    #[test]
    fn json_escape_handles_quotes_and_newlines() {
        assert_eq!(json_escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(json_escape("a\nb"), "a\\nb");
        assert_eq!(json_escape("plain"), "plain");
    }
}
