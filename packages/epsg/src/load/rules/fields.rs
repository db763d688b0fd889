//! Shared field groups.
//!
//! Every rule is assembled from these extractors instead of repeating the
//! lookups per variant. Scalar extractors fail with a type error when a
//! required value is missing or unparsable; reference extractors fail with a
//! malformed-reference error when the link is missing, dangling, or points
//! at the wrong class of entity.

use chrono::NaiveDate;
use roxmltree::Node;

use super::rule::Resolver;
use crate::error::{EpsgError, Result};
use crate::schema::{
    coerce_date, coerce_float, DictionaryEntry, EntityClass, EntityKind, EntityRef, Value,
};
use crate::xml::{find_children, first_descendant, first_descendant_text, get_attribute, get_text};

/// Attribute carrying the target URN of a reference element.
pub const HREF: &str = "xlink:href";

fn missing(identifier: &str, field: &str, expected: &'static str) -> EpsgError {
    EpsgError::TypeCoercion {
        identifier: identifier.to_string(),
        field: field.to_string(),
        expected,
        found: "nothing".to_string(),
    }
}

/// URN of the entity defined by `node`, from its own `identifier` child.
pub fn identifier(node: Node<'_, '_>) -> Result<String> {
    let text = find_children(node, "identifier")
        .next()
        .or_else(|| first_descendant(node, "identifier"))
        .map(get_text)
        .unwrap_or_default();
    if text.is_empty() {
        return Err(missing(node.tag_name().name(), "identifier", "a URN"));
    }
    Ok(text)
}

pub fn optional_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    first_descendant_text(node, tag)
}

pub fn required_text(node: Node<'_, '_>, identifier: &str, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| missing(identifier, tag, "text"))
}

pub fn required_float(node: Node<'_, '_>, identifier: &str, tag: &str) -> Result<f64> {
    let text = required_text(node, identifier, tag)?;
    coerce_float(identifier, tag, Value::Text(text))
}

pub fn optional_float(node: Node<'_, '_>, identifier: &str, tag: &str) -> Result<Option<f64>> {
    optional_text(node, tag)
        .map(|text| coerce_float(identifier, tag, Value::Text(text)))
        .transpose()
}

pub fn optional_date(node: Node<'_, '_>, identifier: &str, tag: &str) -> Result<Option<NaiveDate>> {
    coerce_date(identifier, tag, optional_text(node, tag).into())
}

/// Identifier, name, remarks, information source and anchor definition.
pub fn dictionary_entry(node: Node<'_, '_>) -> Result<DictionaryEntry> {
    let identifier = identifier(node)?;
    let name = required_text(node, &identifier, "name")?;

    let mut entry = DictionaryEntry::new(identifier, name);
    entry.remarks = optional_text(node, "remarks");
    entry.anchor_definition = optional_text(node, "anchorDefinition");
    entry.information_source = optional_text(node, "informationSource");
    Ok(entry)
}

/// The `epsg:type` metadata value.
pub fn entry_type(node: Node<'_, '_>, identifier: &str) -> Result<String> {
    required_text(node, identifier, "type")
}

pub fn scope(node: Node<'_, '_>, identifier: &str) -> Result<String> {
    required_text(node, identifier, "scope")
}

pub fn domain_of_validity(
    node: Node<'_, '_>,
    identifier: &str,
    resolver: &mut dyn Resolver,
) -> Result<EntityRef> {
    reference(
        node,
        identifier,
        "domainOfValidity",
        EntityKind::AreaOfUse.into(),
        resolver,
    )
}

/// Single-valued reference: the `xlink:href` of the first `field` element.
pub fn reference(
    node: Node<'_, '_>,
    identifier: &str,
    field: &str,
    class: EntityClass,
    resolver: &mut dyn Resolver,
) -> Result<EntityRef> {
    let Some(element) = first_descendant(node, field) else {
        return Err(malformed(identifier, field, None, "element is missing".to_string()));
    };
    let Some(target) = get_attribute(element, HREF) else {
        return Err(malformed(
            identifier,
            field,
            None,
            format!("no {HREF} attribute"),
        ));
    };
    resolve_target(identifier, field, target, class, resolver)
}

/// Resolve `target` through `resolver` and check it names a `class`.
pub fn resolve_target(
    identifier: &str,
    field: &str,
    target: &str,
    class: EntityClass,
    resolver: &mut dyn Resolver,
) -> Result<EntityRef> {
    let kind = resolver.resolve_kind(target).map_err(|err| match err {
        EpsgError::NotFound { tag: None, .. } => malformed(
            identifier,
            field,
            Some(target),
            "target is not defined in the document".to_string(),
        ),
        EpsgError::NotFound { tag: Some(tag), .. } => malformed(
            identifier,
            field,
            Some(target),
            format!("target element <{tag}> cannot be loaded"),
        ),
        other => other,
    })?;

    if !kind.is_a(class) {
        return Err(malformed(
            identifier,
            field,
            Some(target),
            format!("expected {class}, found {kind}"),
        ));
    }
    Ok(EntityRef::new(target))
}

fn malformed(identifier: &str, field: &str, target: Option<&str>, reason: String) -> EpsgError {
    EpsgError::MalformedReference {
        identifier: identifier.to_string(),
        field: field.to_string(),
        target: target.map(str::to_string),
        reason,
    }
}
