//! Template expressions inside service documents
//!
//! Services often embed references to other resources inside free text
//! (markup, formulas). On fetch, [`extract_template`] finds those spots with
//! regexes and turns the text into a [`TemplateExpression`] whose parts are
//! literal text and references. Before deploy, [`replace_templates_with_values`]
//! serializes the template back to the service's text and remembers the
//! original template; after deploy, [`resolve_templates`] puts the template
//! back so the workspace keeps its references.

use regex::Regex;
use salto_adapter_api::values::{get_path, get_path_mut};
use salto_adapter_api::{ReferenceExpression, TemplateExpression, TemplatePart, Value, Values};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Serialized text → template it was produced from, for one deploy
pub type DeployTemplateMapping = HashMap<String, TemplateExpression>;

/// Maps holding a template-valued field
pub struct TemplateContainer<'a> {
    /// Maps to process
    pub values: Vec<&'a mut Values>,
    /// Field holding the template; dotted paths are allowed
    pub field_name: &'a str,
}

/// Split `text` on every match of `regex`, keeping the matches as pieces
fn split_keeping_matches<'t>(text: &'t str, regex: &Regex) -> Vec<&'t str> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in regex.find_iter(text) {
        pieces.push(&text[last..m.start()]);
        pieces.push(m.as_str());
        last = m.end();
    }
    pieces.push(&text[last..]);
    pieces
}

fn split_by_regexes<'t>(text: &'t str, regexes: &[&Regex]) -> Vec<&'t str> {
    regexes.iter().fold(vec![text], |pieces, regex| {
        pieces
            .into_iter()
            .flat_map(|piece| split_keeping_matches(piece, regex))
            .collect()
    })
}

/// Merge adjacent text parts and drop empty ones
pub fn compact_template_parts(parts: Vec<TemplatePart>) -> Vec<TemplatePart> {
    let mut compacted: Vec<TemplatePart> = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            TemplatePart::Text(text) if text.is_empty() => {}
            TemplatePart::Text(text) => {
                if let Some(TemplatePart::Text(previous)) = compacted.last_mut() {
                    previous.push_str(&text);
                } else {
                    compacted.push(TemplatePart::Text(text));
                }
            }
            reference => compacted.push(reference),
        }
    }
    compacted
}

/// Turn text into a template by passing every regex match through `extraction_func`
///
/// The text is split by each regex in turn, keeping the matched pieces.
/// Non-empty pieces are handed to `extraction_func`, which returns the parts
/// that replace them (returning the piece as text keeps it unchanged). When
/// no reference comes out of extraction, the result is a plain string.
pub fn extract_template<F>(text: &str, regexes: &[&Regex], mut extraction_func: F) -> Value
where
    F: FnMut(&str) -> Vec<TemplatePart>,
{
    let parts: Vec<TemplatePart> = split_by_regexes(text, regexes)
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .flat_map(|piece| extraction_func(piece))
        .collect();
    let parts = compact_template_parts(parts);

    if parts.iter().all(|part| matches!(part, TemplatePart::Text(_))) {
        let text: String = parts
            .into_iter()
            .map(|part| match part {
                TemplatePart::Text(text) => text,
                TemplatePart::Reference(_) => String::new(),
            })
            .collect();
        return Value::String(text);
    }
    Value::Template(TemplateExpression::new(parts))
}

fn serialize_template<F>(
    field_name: &str,
    template: &TemplateExpression,
    prep_ref: &mut F,
) -> Result<String>
where
    F: FnMut(&ReferenceExpression) -> TemplatePart,
{
    let mut serialized = String::new();
    for part in &template.parts {
        match part {
            TemplatePart::Text(text) => serialized.push_str(text),
            TemplatePart::Reference(reference) => match prep_ref(reference) {
                TemplatePart::Text(text) => serialized.push_str(&text),
                TemplatePart::Reference(reference) => {
                    return Err(Error::TemplateSerialization {
                        field: field_name.to_string(),
                        message: format!(
                            "reference to {} has no text representation",
                            reference.elem_id.full_name()
                        ),
                    });
                }
            },
        }
    }
    Ok(serialized)
}

/// Replace templates with their serialized text, recording them in `mapping`
///
/// `prep_ref` turns each reference into the text the service expects. Fields
/// that are absent or already text are left alone. A reference `prep_ref`
/// cannot serialize, or a field holding any other kind of value, fails the
/// call; containers processed before the failure keep their new text.
pub fn replace_templates_with_values<F>(
    container: TemplateContainer<'_>,
    mapping: &mut DeployTemplateMapping,
    mut prep_ref: F,
) -> Result<()>
where
    F: FnMut(&ReferenceExpression) -> TemplatePart,
{
    let field_name = container.field_name;
    for values in container.values {
        let Some(value) = get_path_mut(values, field_name) else {
            continue;
        };
        let serialized = match value {
            Value::Null | Value::String(_) => continue,
            Value::Template(template) => serialize_template(field_name, template, &mut prep_ref)?,
            other => {
                return Err(Error::TemplateSerialization {
                    field: field_name.to_string(),
                    message: format!(
                        "expected a template or a string, found {}",
                        other.to_json()
                    ),
                });
            }
        };
        if let Value::Template(template) =
            std::mem::replace(value, Value::String(serialized.clone()))
        {
            mapping.insert(serialized, template);
        }
    }
    Ok(())
}

/// Put back templates whose serialized text appears in `mapping`
pub fn resolve_templates(container: TemplateContainer<'_>, mapping: &DeployTemplateMapping) {
    let field_name = container.field_name;
    for values in container.values {
        let template = get_path(values, field_name)
            .and_then(Value::as_str)
            .and_then(|text| mapping.get(text))
            .cloned();
        if let (Some(template), Some(value)) = (template, get_path_mut(values, field_name)) {
            *value = Value::Template(template);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salto_adapter_api::ElemId;

    fn reference(name: &str) -> ReferenceExpression {
        ReferenceExpression::unresolved(ElemId::instance("test", "thing", name))
    }

    fn body(value: Value) -> Values {
        let mut values = Values::new();
        values.insert("value".to_string(), value);
        values
    }

    #[test]
    fn test_extract_without_matches_returns_string() {
        let re = Regex::new(r"(\{\{[^}]*\}\})").unwrap();
        let value = extract_template("plain text", &[&re], |piece| vec![piece.into()]);
        assert_eq!(value, Value::from("plain text"));
    }

    #[test]
    fn test_extract_replaces_matches_with_references() {
        let re = Regex::new(r"\{\{[^}]*\}\}").unwrap();
        let value = extract_template("a {{x}} b {{y}}", &[&re], |piece| {
            match piece.strip_prefix("{{").and_then(|p| p.strip_suffix("}}")) {
                Some(name) => vec![reference(name).into()],
                None => vec![piece.into()],
            }
        });
        assert_eq!(
            value,
            Value::Template(TemplateExpression::new(vec![
                "a ".into(),
                reference("x").into(),
                " b ".into(),
                reference("y").into(),
            ]))
        );
    }

    #[test]
    fn test_extract_splits_by_each_regex() {
        let first = Regex::new(r"<a/>").unwrap();
        let second = Regex::new(r"<b/>").unwrap();
        let mut seen = Vec::new();
        let value = extract_template("x<a/>y<b/>z", &[&first, &second], |piece| {
            seen.push(piece.to_string());
            vec![piece.into()]
        });
        assert_eq!(seen, vec!["x", "<a/>", "y", "<b/>", "z"]);
        assert_eq!(value, Value::from("x<a/>y<b/>z"));
    }

    #[test]
    fn test_extract_empty_text() {
        let re = Regex::new("x").unwrap();
        assert_eq!(extract_template("", &[&re], |p| vec![p.into()]), Value::from(""));
    }

    #[test]
    fn test_compact_merges_adjacent_text() {
        let parts = compact_template_parts(vec![
            "a".into(),
            "".into(),
            "b".into(),
            reference("r").into(),
            "c".into(),
        ]);
        let expected: Vec<TemplatePart> = vec!["ab".into(), reference("r").into(), "c".into()];
        assert_eq!(parts, expected);
    }

    #[test]
    fn test_replace_then_resolve_restores_template() {
        let template = TemplateExpression::new(vec!["key=".into(), reference("space").into()]);
        let mut container = body(Value::Template(template.clone()));
        let mut mapping = DeployTemplateMapping::new();

        replace_templates_with_values(
            TemplateContainer { values: vec![&mut container], field_name: "value" },
            &mut mapping,
            |r| TemplatePart::Text(r.elem_id.name().to_uppercase()),
        )
        .unwrap();
        assert_eq!(container["value"], Value::from("key=SPACE"));
        assert_eq!(mapping.get("key=SPACE"), Some(&template));

        resolve_templates(
            TemplateContainer { values: vec![&mut container], field_name: "value" },
            &mapping,
        );
        assert_eq!(container["value"], Value::Template(template));
    }

    #[test]
    fn test_replace_skips_plain_strings() {
        let mut container = body(Value::from("already text"));
        let mut mapping = DeployTemplateMapping::new();
        replace_templates_with_values(
            TemplateContainer { values: vec![&mut container], field_name: "value" },
            &mut mapping,
            |_| TemplatePart::Text(String::new()),
        )
        .unwrap();
        assert!(mapping.is_empty());
        assert_eq!(container["value"], Value::from("already text"));
    }

    #[test]
    fn test_replace_fails_on_unserializable_reference() {
        let template = TemplateExpression::new(vec![reference("r").into()]);
        let mut container = body(Value::Template(template.clone()));
        let mut mapping = DeployTemplateMapping::new();
        let err = replace_templates_with_values(
            TemplateContainer { values: vec![&mut container], field_name: "value" },
            &mut mapping,
            |r| TemplatePart::Reference(r.clone()),
        )
        .unwrap_err();
        assert!(matches!(err, Error::TemplateSerialization { .. }));
        assert_eq!(container["value"], Value::Template(template));
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_replace_fails_on_non_text_value() {
        let mut container = body(Value::Bool(true));
        let err = replace_templates_with_values(
            TemplateContainer { values: vec![&mut container], field_name: "value" },
            &mut DeployTemplateMapping::new(),
            |_| TemplatePart::Text(String::new()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected a template"));
    }

    #[test]
    fn test_resolve_uses_dotted_path_and_ignores_unknown_text() {
        let template = TemplateExpression::new(vec![reference("r").into()]);
        let mut mapping = DeployTemplateMapping::new();
        mapping.insert("R".to_string(), template.clone());

        let mut known = Values::new();
        known.insert("body".to_string(), Value::Map(body(Value::from("R"))));
        let mut unknown = Values::new();
        unknown.insert("body".to_string(), Value::Map(body(Value::from("other"))));

        resolve_templates(
            TemplateContainer { values: vec![&mut known, &mut unknown], field_name: "body.value" },
            &mapping,
        );
        assert_eq!(get_path(&known, "body.value"), Some(&Value::Template(template)));
        assert_eq!(get_path(&unknown, "body.value"), Some(&Value::from("other")));
    }
}
