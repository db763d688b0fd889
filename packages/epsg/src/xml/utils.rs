//! XML utility functions for navigating and extracting data from DOM trees.
//!
//! Element and attribute names are matched on their local part: the GML
//! export mixes `gml:`, `epsg:` and `gmd:` prefixes, and roxmltree has
//! already resolved them to namespaces by the time we look.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use epsg_registry::xml::get_tag_name;
///
/// let xml = r#"<gml:PrimeMeridian xmlns:gml="http://www.opengis.net/gml/3.2"/>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "PrimeMeridian");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Check if a node is an element with the given local tag name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Find all direct child elements with the given tag name, in document order.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use epsg_registry::xml::find_children;
///
/// let xml = r#"<cs><axis>1</axis><name/><axis>2</axis></cs>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let axes: Vec<_> = find_children(doc.root_element(), "axis").collect();
/// assert_eq!(axes.len(), 2);
/// ```
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| has_tag(*child, tag))
}

/// Find the first descendant element (excluding `node` itself) with the
/// given tag name, in document order.
pub fn first_descendant<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.descendants().skip(1).find(|child| has_tag(*child, tag))
}

/// Concatenate all descendant text nodes, trimmed.
///
/// Attribute values and comments are not text nodes and never contribute.
/// Returns an empty string when the subtree holds no text.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use epsg_registry::xml::get_text;
///
/// let xml = r#"<extent> <w><d>-8.73</d></w><!-- note --> </extent>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_text(doc.root_element()), "-8.73");
/// ```
pub fn get_text(node: Node<'_, '_>) -> String {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    text.trim().to_string()
}

/// Text of the first descendant element named `tag`.
///
/// `None` means the field is not present in the source; an element that is
/// present but empty yields `Some("")`.
pub fn first_descendant_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    first_descendant(node, tag).map(get_text)
}

/// Get an attribute value by name, ignoring any namespace prefix.
///
/// `"xlink:href"` and `"href"` both match `xlink:href="..."`.
pub fn get_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    let local = local_name(name);
    node.attributes()
        .find(|attr| attr.name() == local)
        .map(|attr| attr.value())
}

/// Attribute `attribute` of the first descendant element named `tag`.
///
/// `None` if either the element or the attribute is missing.
pub fn first_descendant_attribute<'a>(
    node: Node<'a, '_>,
    tag: &str,
    attribute: &str,
) -> Option<&'a str> {
    first_descendant(node, tag).and_then(|child| get_attribute(child, attribute))
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}
