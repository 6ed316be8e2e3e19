//! Typed records for the XML metric description format.
//!
//! Attributes are validated once at load time so that malformed input fails
//! here, with a line number, rather than deep inside code emission.

use roxmltree::{Document, Node};

use crate::counter::DataType;
use crate::{ModelError, Result};

/// One `<counter>` element.
#[derive(Clone, Debug)]
pub struct CounterDesc {
    pub symbol_name: String,
    pub underscore_name: Option<String>,
    pub name: String,
    pub description: String,
    pub equation: String,
    pub max_equation: Option<String>,
    pub data_type: DataType,
    pub semantic_type: String,
    pub units: String,
    pub availability: Option<String>,
    pub mdapi_group: String,
    /// Source line of the element.
    pub line: u32,
}

/// One `<set>` element with its counters in document order.
#[derive(Clone, Debug)]
pub struct SetDesc {
    pub chipset: String,
    pub name: String,
    pub symbol_name: String,
    pub underscore_name: String,
    pub hw_config_guid: String,
    pub counters: Vec<CounterDesc>,
    pub line: u32,
}

/// Parse every `<set>` in a document (at any depth).
///
/// # Errors
///
/// Returns an error on XML syntax errors, missing required attributes and
/// unknown counter data types.
pub fn parse_sets(text: &str, source_name: &str) -> Result<Vec<SetDesc>> {
    let doc = Document::parse(text).map_err(|source| ModelError::Xml {
        source_name: source_name.to_string(),
        source,
    })?;
    let attrs = Attrs { doc: &doc, source_name };

    doc.descendants()
        .filter(|node| node.has_tag_name("set"))
        .map(|node| parse_set(&attrs, node))
        .collect()
}

fn parse_set(attrs: &Attrs<'_, '_>, node: Node<'_, '_>) -> Result<SetDesc> {
    let name = attrs.required(node, "set", "name")?;
    let counters = node
        .children()
        .filter(|child| child.has_tag_name("counter"))
        .map(|child| parse_counter(attrs, child, &name))
        .collect::<Result<Vec<_>>>()?;

    Ok(SetDesc {
        chipset: attrs.required(node, "set", "chipset")?,
        symbol_name: attrs.required(node, "set", "symbol_name")?,
        underscore_name: attrs.required(node, "set", "underscore_name")?,
        hw_config_guid: attrs.required(node, "set", "hw_config_guid")?,
        name,
        counters,
        line: attrs.line(node),
    })
}

fn parse_counter(attrs: &Attrs<'_, '_>, node: Node<'_, '_>, set_name: &str) -> Result<CounterDesc> {
    let name = attrs.required(node, "counter", "name")?;
    let raw_type = attrs.required(node, "counter", "data_type")?;
    let data_type = DataType::parse(&raw_type).ok_or_else(|| ModelError::UnknownDataType {
        set: set_name.to_string(),
        counter: name.clone(),
        data_type: raw_type.clone(),
    })?;

    Ok(CounterDesc {
        symbol_name: attrs.required(node, "counter", "symbol_name")?,
        underscore_name: optional(node, "underscore_name"),
        description: node.attribute("description").unwrap_or_default().to_string(),
        equation: attrs.required(node, "counter", "equation")?,
        max_equation: optional(node, "max_equation"),
        data_type,
        semantic_type: attrs.required(node, "counter", "semantic_type")?,
        units: attrs.required(node, "counter", "units")?,
        availability: optional(node, "availability"),
        mdapi_group: node.attribute("mdapi_group").unwrap_or_default().to_string(),
        line: attrs.line(node),
        name,
    })
}

/// Empty attributes count as absent.
fn optional(node: Node<'_, '_>, attribute: &str) -> Option<String> {
    node.attribute(attribute)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

struct Attrs<'a, 'input> {
    doc: &'a Document<'input>,
    source_name: &'a str,
}

impl Attrs<'_, '_> {
    fn line(&self, node: Node<'_, '_>) -> u32 {
        self.doc.text_pos_at(node.range().start).row
    }

    fn required(
        &self,
        node: Node<'_, '_>,
        element: &'static str,
        attribute: &'static str,
    ) -> Result<String> {
        node.attribute(attribute)
            .map(str::to_string)
            .ok_or_else(|| ModelError::MissingAttribute {
                source_name: self.source_name.to_string(),
                line: self.line(node),
                element,
                attribute,
            })
    }
}
