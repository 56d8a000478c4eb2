//! Page and space references inside template bodies
//!
//! Template bodies are written in Confluence storage format, which points at
//! other content by space key and page title:
//!
//! ```text
//! <ri:page ri:space-key="DOCS" ri:content-title="Home" ri:version-at-save="3" />
//! <ri:space ri:space-key="DOCS" />
//! ```
//!
//! On fetch the key and title become references to the fetched `space` and
//! `page` instances, turning the body into a template expression. Before
//! deploy the references are written back as keys and titles, and after
//! deploy the bodies are restored to the templates they were serialized from.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use salto_adapter_api::values::get_path_mut;
use salto_adapter_api::{
    Change, Element, ElemId, InstanceElement, ReferenceExpression, ReferenceValue, TemplatePart,
    Value,
};
use salto_adapter_components::Result;
use salto_adapter_components::filter::{Filter, FilterResult};
use salto_adapter_components::templates::{
    DeployTemplateMapping, TemplateContainer, extract_template, replace_templates_with_values,
    resolve_templates,
};
use std::sync::Arc;

use crate::constants::{
    BODY_STORAGE_PATH, BODY_VALUE_FIELD, BODY_VALUE_PATH, PAGE_TYPE_NAME, SPACE_TYPE_NAME,
    TEMPLATE_TYPE_NAMES,
};

/// Name of the filter
pub const FILTER_NAME: &str = "templateBodyToTemplateExpressionFilter";

// Each reference regex has a split counterpart; change both together.
static PAGE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(<ri:page\s+ri:space-key="[^"]*"\s+ri:content-title="[^"]*"\s+ri:version-at-save="[0-9]+"\s*/>)"#,
    )
    .expect("Invalid regex pattern")
});

static SPLIT_PAGE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(<ri:page\s+ri:space-key=")([^"]*)("\s+ri:content-title=")([^"]*)("\s+ri:version-at-save="[0-9]+"\s*/>)"#,
    )
    .expect("Invalid regex pattern")
});

static SPACE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(<ri:space\sri:space-key="[^"]*"\s*/>)"#).expect("Invalid regex pattern")
});

static SPLIT_SPACE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(<ri:space\sri:space-key=")([^"]*)("\s*/>)"#).expect("Invalid regex pattern")
});

fn is_template_instance(instance: &InstanceElement) -> bool {
    TEMPLATE_TYPE_NAMES.contains(instance.type_name())
}

fn is_template_change(change: &Change) -> bool {
    change.is_addition_or_modification()
        && change
            .data()
            .as_instance()
            .is_some_and(is_template_instance)
}

fn string_field<'a>(instance: &'a InstanceElement, name: &str) -> Option<&'a str> {
    instance.value.get(name).and_then(Value::as_str)
}

/// Fetched instances that storage format references are resolved against
struct InstanceIndex {
    instances: Vec<Arc<Element>>,
}

impl InstanceIndex {
    fn new(elements: &[Element]) -> Self {
        Self {
            instances: elements
                .iter()
                .filter(|element| element.is_instance())
                .map(|element| Arc::new(element.clone()))
                .collect(),
        }
    }

    fn find<P>(&self, predicate: P) -> Option<&Arc<Element>>
    where
        P: Fn(&InstanceElement) -> bool,
    {
        self.instances
            .iter()
            .find(|element| element.as_instance().is_some_and(&predicate))
    }

    fn space_reference(&self, key: &str) -> Option<ReferenceExpression> {
        let space = self.find(|inst| {
            inst.type_name() == SPACE_TYPE_NAME && string_field(inst, "key") == Some(key)
        })?;
        Some(ReferenceExpression::new(
            space.elem_id().clone(),
            Arc::clone(space),
        ))
    }

    fn page_reference(&self, title: &str, space_id: &ElemId) -> Option<ReferenceExpression> {
        let page = self.find(|inst| {
            inst.type_name() == PAGE_TYPE_NAME
                && string_field(inst, "title") == Some(title)
                && inst
                    .value
                    .get("spaceId")
                    .and_then(Value::as_reference)
                    .is_some_and(|reference| &reference.elem_id == space_id)
        })?;
        Some(ReferenceExpression::new(
            page.elem_id().clone(),
            Arc::clone(page),
        ))
    }

    fn page_ref_parts(&self, captures: &Captures<'_>, fallback: &str) -> Vec<TemplatePart> {
        let group = |i: usize| captures.get(i).map_or("", |m| m.as_str());
        let (space_key, space_key_value, content_title, content_title_value, version_at_save) =
            (group(1), group(2), group(3), group(4), group(5));

        let Some(space_reference) = self.space_reference(space_key_value) else {
            tracing::warn!("Could not find space with key {}", space_key_value);
            return vec![fallback.into()];
        };
        match self.page_reference(content_title_value, &space_reference.elem_id) {
            Some(page_reference) => vec![
                space_key.into(),
                space_reference.into(),
                content_title.into(),
                page_reference.into(),
                version_at_save.into(),
            ],
            None => {
                tracing::warn!(
                    "Could not find page with title {} in spaceKey {}, creating reference for space only",
                    content_title_value,
                    space_key_value
                );
                vec![
                    space_key.into(),
                    space_reference.into(),
                    content_title.into(),
                    content_title_value.into(),
                    version_at_save.into(),
                ]
            }
        }
    }

    fn space_ref_parts(&self, captures: &Captures<'_>, fallback: &str) -> Vec<TemplatePart> {
        let group = |i: usize| captures.get(i).map_or("", |m| m.as_str());
        let (space_key, space_key_value, rest) = (group(1), group(2), group(3));

        match self.space_reference(space_key_value) {
            Some(space_reference) => vec![space_key.into(), space_reference.into(), rest.into()],
            None => {
                tracing::warn!("Could not find space with key {}", space_key_value);
                vec![fallback.into()]
            }
        }
    }

    /// Parts replacing one piece of a body
    fn extract(&self, expression: &str) -> Vec<TemplatePart> {
        if let Some(captures) = SPLIT_PAGE_REF.captures(expression) {
            return self.page_ref_parts(&captures, expression);
        }
        if let Some(captures) = SPLIT_SPACE_REF.captures(expression) {
            return self.space_ref_parts(&captures, expression);
        }
        vec![expression.into()]
    }
}

/// Text the service expects in place of a reference
fn prep_ref(reference: &ReferenceExpression) -> TemplatePart {
    let target = match &reference.value {
        ReferenceValue::Unresolved => {
            tracing::trace!(
                "unresolved reference to {} serialized as an empty string",
                reference.elem_id
            );
            return TemplatePart::Text(String::new());
        }
        ReferenceValue::Element(target) => target,
    };
    if let Some(instance) = target.as_instance() {
        let text = match instance.type_name() {
            SPACE_TYPE_NAME => string_field(instance, "key"),
            PAGE_TYPE_NAME => string_field(instance, "title"),
            _ => None,
        };
        if let Some(text) = text {
            return TemplatePart::Text(text.to_string());
        }
    }
    tracing::warn!(
        "reference to {} is not a space or page reference",
        reference.elem_id
    );
    TemplatePart::Reference(reference.clone())
}

/// Converts template bodies to template expressions and back
#[derive(Debug, Default)]
pub struct TemplateBodyFilter {
    deploy_template_mapping: DeployTemplateMapping,
}

impl TemplateBodyFilter {
    /// Create the filter with an empty deploy mapping
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Filter for TemplateBodyFilter {
    fn name(&self) -> &str {
        FILTER_NAME
    }

    async fn on_fetch(&mut self, elements: &mut Vec<Element>) -> Result<FilterResult> {
        let index = InstanceIndex::new(elements);
        for instance in elements.iter_mut().filter_map(Element::as_instance_mut) {
            if !is_template_instance(instance) {
                continue;
            }
            let Some(body) = get_path_mut(&mut instance.value, BODY_VALUE_PATH) else {
                tracing::warn!("Body value is not a string for template instance {}", instance.elem_id);
                continue;
            };
            let Some(text) = body.as_str() else {
                tracing::warn!("Body value is not a string for template instance {}", instance.elem_id);
                continue;
            };
            *body = extract_template(text, &[&PAGE_REF, &SPACE_REF], |expression| {
                index.extract(expression)
            });
        }
        Ok(FilterResult::default())
    }

    async fn pre_deploy(&mut self, changes: &mut [Change]) -> Result<()> {
        let mapping = &mut self.deploy_template_mapping;
        for change in changes.iter_mut().filter(|change| is_template_change(change)) {
            change.apply_to_instances(|instance| {
                let Some(storage) =
                    get_path_mut(&mut instance.value, BODY_STORAGE_PATH).and_then(Value::as_map_mut)
                else {
                    tracing::debug!("template instance {} has no storage body", instance.elem_id);
                    return;
                };
                let container = TemplateContainer {
                    values: vec![storage],
                    field_name: BODY_VALUE_FIELD,
                };
                if let Err(e) = replace_templates_with_values(container, mapping, prep_ref) {
                    tracing::error!(
                        "Error serializing template body in deployment for {}: {}",
                        instance.elem_id,
                        e
                    );
                }
            });
        }
        Ok(())
    }

    async fn on_deploy(&mut self, changes: &mut [Change]) -> Result<()> {
        let mapping = &self.deploy_template_mapping;
        for change in changes.iter_mut().filter(|change| is_template_change(change)) {
            change.apply_to_instances(|instance| {
                resolve_templates(
                    TemplateContainer {
                        values: vec![&mut instance.value],
                        field_name: BODY_VALUE_PATH,
                    },
                    mapping,
                );
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use salto_adapter_api::values::get_path;
    use salto_adapter_api::{TemplateExpression, Values, to_change};
    use serde_json::json;

    const PAGE_TAG: &str =
        r#"<ri:page ri:space-key="DOCS" ri:content-title="Home" ri:version-at-save="3" />"#;
    const SPACE_TAG: &str = r#"<ri:space ri:space-key="DOCS" />"#;

    fn values(json: serde_json::Value) -> Values {
        match Value::from_json(json).unwrap() {
            Value::Map(map) => map,
            other => panic!("expected map, got {other:?}"),
        }
    }

    fn space() -> Element {
        InstanceElement::new("confluence", "space", "docs", values(json!({"key": "DOCS"}))).into()
    }

    fn page() -> Element {
        InstanceElement::new(
            "confluence",
            "page",
            "home",
            values(json!({
                "title": "Home",
                "spaceId": {"$ref": "confluence.space.instance.docs"},
            })),
        )
        .into()
    }

    fn template(type_name: &str, body: serde_json::Value) -> Element {
        InstanceElement::new(
            "confluence",
            type_name,
            "tmpl",
            values(json!({"name": "tmpl", "body": {"storage": {"value": body}}})),
        )
        .into()
    }

    fn body(element: &Element) -> &Value {
        get_path(&element.as_instance().unwrap().value, BODY_VALUE_PATH).unwrap()
    }

    fn space_ref() -> TemplatePart {
        ReferenceExpression::unresolved(ElemId::instance("confluence", "space", "docs")).into()
    }

    fn page_ref() -> TemplatePart {
        ReferenceExpression::unresolved(ElemId::instance("confluence", "page", "home")).into()
    }

    async fn fetch(mut elements: Vec<Element>) -> Vec<Element> {
        salto_adapter_api::resolve_references(&mut elements);
        let result = TemplateBodyFilter::new().on_fetch(&mut elements).await.unwrap();
        assert!(result.errors.is_empty());
        elements
    }

    #[tokio::test]
    async fn test_on_fetch_converts_page_reference() {
        let text = format!("<p>see {PAGE_TAG}</p>");
        let elements = fetch(vec![space(), page(), template("template", json!(text))]).await;

        let expected = TemplateExpression::new(vec![
            r#"<p>see <ri:page ri:space-key=""#.into(),
            space_ref(),
            r#"" ri:content-title=""#.into(),
            page_ref(),
            r#"" ri:version-at-save="3" /></p>"#.into(),
        ]);
        assert_eq!(body(&elements[2]), &Value::Template(expected));
    }

    #[tokio::test]
    async fn test_on_fetch_converts_space_reference_in_global_template() {
        let text = format!("{SPACE_TAG} and more");
        let elements = fetch(vec![space(), template("global_template", json!(text))]).await;

        let expected = TemplateExpression::new(vec![
            r#"<ri:space ri:space-key=""#.into(),
            space_ref(),
            r#"" /> and more"#.into(),
        ]);
        assert_eq!(body(&elements[1]), &Value::Template(expected));
    }

    #[tokio::test]
    async fn test_on_fetch_keeps_title_when_page_is_missing() {
        let elements = fetch(vec![space(), template("template", json!(PAGE_TAG))]).await;

        let expected = TemplateExpression::new(vec![
            r#"<ri:page ri:space-key=""#.into(),
            space_ref(),
            r#"" ri:content-title="Home" ri:version-at-save="3" />"#.into(),
        ]);
        assert_eq!(body(&elements[1]), &Value::Template(expected));
    }

    #[tokio::test]
    async fn test_on_fetch_requires_ascii_version_digits() {
        let text = r#"<ri:page ri:space-key="DOCS" ri:content-title="Home" ri:version-at-save="٣" />"#;
        let elements = fetch(vec![space(), page(), template("template", json!(text))]).await;
        assert_eq!(body(&elements[2]), &Value::from(text));
    }

    #[rstest]
    #[case::page(PAGE_TAG)]
    #[case::space(SPACE_TAG)]
    #[tokio::test]
    async fn test_on_fetch_keeps_text_when_space_is_missing(#[case] text: &str) {
        let elements = fetch(vec![page(), template("template", json!(text))]).await;
        assert_eq!(body(&elements[1]), &Value::from(text));
    }

    #[tokio::test]
    async fn test_on_fetch_ignores_page_in_other_space() {
        let other_space: Element =
            InstanceElement::new("confluence", "space", "other", values(json!({"key": "OTHER"})))
                .into();
        let elements = fetch(vec![
            other_space,
            space(),
            page(),
            template(
                "template",
                json!(r#"<ri:page ri:space-key="OTHER" ri:content-title="Home" ri:version-at-save="1"/>"#),
            ),
        ])
        .await;
        let Value::Template(template) = body(&elements[3]) else {
            panic!("expected a template");
        };
        let references: Vec<String> =
            template.references().map(|r| r.elem_id.full_name()).collect();
        assert_eq!(references, vec!["confluence.space.instance.other"]);
    }

    #[tokio::test]
    async fn test_on_fetch_skips_non_template_and_non_string_bodies() {
        let not_a_template = template("page", json!(SPACE_TAG));
        let numeric_body = template("template", json!(5));
        let elements = fetch(vec![space(), not_a_template.clone(), numeric_body]).await;
        assert_eq!(body(&elements[1]), body(&not_a_template));
        assert_eq!(body(&elements[2]), &Value::from(5));
    }

    #[tokio::test]
    async fn test_deploy_round_trip_restores_template() {
        let text = format!("<p>{PAGE_TAG} in {SPACE_TAG}</p>");
        let fetched = fetch(vec![space(), page(), template("template", json!(text.clone()))]).await;
        let fetched_template = body(&fetched[2]).clone();
        let mut filter = TemplateBodyFilter::new();
        let mut changes = vec![to_change(None, Some(fetched[2].clone())).unwrap()];

        filter.pre_deploy(&mut changes).await.unwrap();
        assert_eq!(body(changes[0].data()), &Value::from(text.as_str()));

        filter.on_deploy(&mut changes).await.unwrap();
        assert_eq!(body(changes[0].data()), &fetched_template);
    }

    #[tokio::test]
    async fn test_pre_deploy_serializes_unresolved_references_as_empty() {
        let unresolved = Value::Template(TemplateExpression::new(vec![
            r#"<ri:space ri:space-key=""#.into(),
            space_ref(),
            r#"" />"#.into(),
        ]));
        let mut element = template("template", json!(""));
        *get_path_mut(&mut element.as_instance_mut().unwrap().value, BODY_VALUE_PATH).unwrap() =
            unresolved;
        let mut changes = vec![to_change(None, Some(element)).unwrap()];

        TemplateBodyFilter::new().pre_deploy(&mut changes).await.unwrap();

        assert_eq!(body(changes[0].data()), &Value::from(r#"<ri:space ri:space-key="" />"#));
    }

    #[tokio::test]
    async fn test_pre_deploy_failure_keeps_template_and_continues() {
        let other: Element =
            InstanceElement::new("confluence", "label", "l", values(json!({"name": "l"}))).into();
        let bad_template = TemplateExpression::new(vec![
            "x".into(),
            ReferenceExpression::new(other.elem_id().clone(), Arc::new(other)).into(),
        ]);
        let mut bad = template("template", json!(""));
        *get_path_mut(&mut bad.as_instance_mut().unwrap().value, BODY_VALUE_PATH).unwrap() =
            Value::Template(bad_template.clone());
        let good = fetch(vec![space(), template("global_template", json!(SPACE_TAG))]).await;
        let mut changes = vec![
            to_change(None, Some(bad)).unwrap(),
            to_change(None, Some(good[1].clone())).unwrap(),
        ];

        TemplateBodyFilter::new().pre_deploy(&mut changes).await.unwrap();

        assert_eq!(body(changes[0].data()), &Value::Template(bad_template));
        assert_eq!(body(changes[1].data()), &Value::from(SPACE_TAG));
    }

    #[tokio::test]
    async fn test_deploy_hooks_ignore_removals() {
        let fetched = fetch(vec![space(), template("template", json!(SPACE_TAG))]).await;
        let mut changes = vec![to_change(Some(fetched[1].clone()), None).unwrap()];
        let mut filter = TemplateBodyFilter::new();

        filter.pre_deploy(&mut changes).await.unwrap();

        assert!(matches!(body(changes[0].data()), Value::Template(_)));
        assert!(filter.deploy_template_mapping.is_empty());
    }

    #[tokio::test]
    async fn test_modification_serializes_both_sides() {
        let fetched = fetch(vec![space(), template("template", json!(SPACE_TAG))]).await;
        let mut changes =
            vec![to_change(Some(fetched[1].clone()), Some(fetched[1].clone())).unwrap()];

        TemplateBodyFilter::new().pre_deploy(&mut changes).await.unwrap();

        let Change::Modification { before, after } = &changes[0] else {
            panic!("expected a modification");
        };
        assert_eq!(body(before), &Value::from(SPACE_TAG));
        assert_eq!(body(after), &Value::from(SPACE_TAG));
    }
}
