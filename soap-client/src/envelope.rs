//! SOAP envelope construction as an XML tree.
//!
//! Arguments are passed as `xmltree` elements and only serialised at the
//! very end, so every text node and attribute goes through the XML writer's
//! escaping instead of string concatenation.

use xmltree::{Element, EmitterConfig, XMLNode};

use crate::SoapError;

const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>"#;

/// Create `<name>text</name>`.
pub fn text_element(name: &str, text: impl Into<String>) -> Element {
    let mut element = Element::new(name);
    element.children.push(XMLNode::Text(text.into()));
    element
}

/// Wrap the action arguments in a complete SOAP 1.1 envelope.
///
/// The produced tree looks like
/// `<s:Envelope><s:Body><u:{action} xmlns:u="{service_uri}">{args}</u:{action}></s:Body></s:Envelope>`.
pub fn build_envelope(service_uri: &str, action: &str, args: Vec<Element>) -> Element {
    let mut call = Element::new(&format!("u:{action}"));
    call.attributes
        .insert("xmlns:u".to_string(), service_uri.to_string());
    call.children.extend(args.into_iter().map(XMLNode::Element));

    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(call));

    let mut envelope = Element::new("s:Envelope");
    envelope
        .attributes
        .insert("s:encodingStyle".to_string(), ENCODING_STYLE.to_string());
    envelope
        .attributes
        .insert("xmlns:s".to_string(), ENVELOPE_NS.to_string());
    envelope.children.push(XMLNode::Element(body));
    envelope
}

/// Serialise an element without a document declaration.
pub fn to_xml_string(element: &Element) -> Result<String, SoapError> {
    let mut buffer = Vec::new();
    let config = EmitterConfig::new()
        .write_document_declaration(false)
        .perform_indent(false);
    element
        .write_with_config(&mut buffer, config)
        .map_err(|e| SoapError::Parse(format!("Failed to serialise XML: {}", e)))?;
    String::from_utf8(buffer).map_err(|e| SoapError::Parse(e.to_string()))
}

/// Serialise a full envelope, prefixed with the declaration renderers expect.
pub fn render(envelope: &Element) -> Result<String, SoapError> {
    Ok(format!("{}{}", XML_DECLARATION, to_xml_string(envelope)?))
}
