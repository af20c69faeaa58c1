//! Locating logical fields inside an `<Application>` node.
//!
//! Portals put the same field in different places, so each field has an
//! ordered list of strategies. `resolve` tries them in order and takes the
//! first hit.

use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::Node;
use tracing::debug;

use crate::models::AddressLines;

/// State code followed by a postcode, e.g. `NSW 2753`.
static STATE_POSTCODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Z]{3}\s[0-9]{4}")
        .expect("Invalid state postcode regex")
});

pub type Locator<T> = for<'a, 'input> fn(Node<'a, 'input>) -> Option<T>;

pub struct FieldStrategy<T> {
    pub name: &'static str,
    pub locate: Locator<T>,
}

pub const ADDRESS_STRATEGIES: &[FieldStrategy<AddressLines>] = &[
    FieldStrategy { name: "address element", locate: address_element },
    FieldStrategy { name: "nested property", locate: nested_property },
    FieldStrategy { name: "sibling property", locate: sibling_property },
    FieldStrategy { name: "assessment description", locate: assessment_postcode },
];

pub const DESCRIPTION_STRATEGIES: &[FieldStrategy<String>] = &[
    FieldStrategy { name: "application details", locate: application_details },
    FieldStrategy { name: "sub-nature of application", locate: sub_nature_of_application },
];

/// Try each strategy in priority order.
pub fn resolve<T>(node: Node<'_, '_>, strategies: &[FieldStrategy<T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| {
        let value = (strategy.locate)(node)?;
        debug!(strategy = strategy.name, "Resolved field");
        Some(value)
    })
}

/// First element below `node` (not `node` itself) with the given tag.
pub fn first_descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants().skip(1).find(|n| n.has_tag_name(name))
}

/// Concatenated text of every text node below `node`.
pub fn inner_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

pub fn descendant_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    first_descendant(node, name).map(inner_text)
}

fn trimmed_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    descendant_text(node, name).map(|text| text.trim().to_string())
}

fn lines_from(container: Node<'_, '_>) -> Option<AddressLines> {
    let line1 = descendant_text(container, "Line1")?;
    let line2 = descendant_text(container, "Line2");
    let line3 = descendant_text(container, "Line3");
    AddressLines::new(&line1, line2.as_deref(), line3.as_deref())
}

fn address_element(application: Node<'_, '_>) -> Option<AddressLines> {
    application
        .descendants()
        .skip(1)
        .filter(|n| n.has_tag_name("Address"))
        .find_map(lines_from)
}

/// Among the parents of `line1_nodes`, take the first one tagged with the
/// application's own id. Only that first property is considered.
fn matching_property<'a, 'input: 'a>(
    line1_nodes: impl Iterator<Item = Node<'a, 'input>>,
    application_id: &str,
) -> Option<AddressLines> {
    line1_nodes
        .filter_map(|line1| line1.parent_element())
        .find(|property| {
            trimmed_text(*property, "ApplicationId").as_deref() == Some(application_id)
        })
        .and_then(lines_from)
}

fn nested_property(application: Node<'_, '_>) -> Option<AddressLines> {
    let application_id = trimmed_text(application, "ApplicationId")?;
    let line1_nodes = application
        .descendants()
        .skip(1)
        .filter(|n| n.has_tag_name("Line1"));
    matching_property(line1_nodes, &application_id)
}

fn sibling_property(application: Node<'_, '_>) -> Option<AddressLines> {
    let application_id = trimmed_text(application, "ApplicationId")?;
    let line1_nodes = application
        .document()
        .root()
        .descendants()
        .filter(|n| n.has_tag_name("Line1"))
        .filter(|n| !n.ancestors().any(|ancestor| ancestor == application));
    matching_property(line1_nodes, &application_id)
}

fn assessment_postcode(application: Node<'_, '_>) -> Option<AddressLines> {
    let descriptions: String = application
        .descendants()
        .skip(1)
        .filter(|n| n.has_tag_name("Assess"))
        .flat_map(|assess| {
            assess
                .descendants()
                .skip(1)
                .filter(|n| n.has_tag_name("Description"))
        })
        .map(inner_text)
        .collect();

    descriptions
        .split('|')
        .find(|segment| STATE_POSTCODE_REGEX.is_match(segment))
        .and_then(|segment| AddressLines::new(segment, None, None))
}

fn non_blank_text(application: Node<'_, '_>, name: &str) -> Option<String> {
    descendant_text(application, name).filter(|text| !text.trim().is_empty())
}

fn application_details(application: Node<'_, '_>) -> Option<String> {
    non_blank_text(application, "ApplicationDetails")
}

fn sub_nature_of_application(application: Node<'_, '_>) -> Option<String> {
    non_blank_text(application, "SubNatureOfApplication")
}
