//! XML serialization

use crate::config::WriteOptions;
use crate::xml::model::{Content, Element};

/// Declaration emitted at the top of pretty output
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" ?>";

/// Serialize an element tree to XML text
pub fn to_string(element: &Element, options: &WriteOptions) -> String {
    let mut output = String::new();
    if options.pretty {
        output.push_str(XML_DECLARATION);
        output.push('\n');
        write_pretty(element, options.indent, 0, &mut output);
    } else {
        write_compact(element, &mut output);
    }
    output
}

/// Serialize without any added whitespace
pub fn to_compact_string(element: &Element) -> String {
    to_string(element, &WriteOptions::compact())
}

fn write_compact(element: &Element, output: &mut String) {
    open_tag(element, output);

    if element.children.is_empty() {
        output.push_str("/>");
        return;
    }

    output.push('>');
    for child in &element.children {
        match child {
            Content::Element(child) => write_compact(child, output),
            Content::Text(text) => output.push_str(&escape_text(text)),
        }
    }
    close_tag(element, output);
}

fn write_pretty(element: &Element, indent: usize, level: usize, output: &mut String) {
    let pad = " ".repeat(indent * level);
    output.push_str(&pad);
    open_tag(element, output);

    if element.children.is_empty() {
        output.push_str("/>\n");
        return;
    }

    output.push('>');
    if !element.has_children() {
        // text-only elements stay on one line
        for child in &element.children {
            if let Content::Text(text) = child {
                output.push_str(&escape_text(text));
            }
        }
        close_tag(element, output);
        output.push('\n');
        return;
    }

    output.push('\n');
    let inner_pad = " ".repeat(indent * (level + 1));
    for child in &element.children {
        match child {
            Content::Element(child) => write_pretty(child, indent, level + 1, output),
            Content::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    output.push_str(&inner_pad);
                    output.push_str(&escape_text(text));
                    output.push('\n');
                }
            }
        }
    }
    output.push_str(&pad);
    close_tag(element, output);
    output.push('\n');
}

fn open_tag(element: &Element, output: &mut String) {
    output.push('<');
    output.push_str(&element.name);

    for (key, value) in element.attributes.iter() {
        output.push(' ');
        output.push_str(key);
        output.push_str("=\"");
        output.push_str(&escape_attribute(value));
        output.push('"');
    }
}

fn close_tag(element: &Element, output: &mut String) {
    output.push_str("</");
    output.push_str(&element.name);
    output.push('>');
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a value for use inside a quoted attribute
pub fn escape_attribute(input: &str) -> String {
    escape_text(input)
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
