//! XML to JSON conversion for object storage answers
//!
//! Elements become objects keyed by child name, repeated children become
//! arrays and text-only elements become strings. Attributes and namespaces
//! are ignored; the root element's name is dropped.

use crate::error::{Error, Result};
use crate::tables::lookup;
use crate::types::{JsonObject, JsonValue};

/// Convert an XML document to JSON
pub fn xml_to_json(xml: &str) -> Result<JsonValue> {
    let input = skip_misc(xml);
    if !input.starts_with('<') {
        return Err(Error::decode("response is not XML"));
    }
    let (value, rest) = parse_element(input)?;
    if !skip_misc(rest).is_empty() {
        return Err(Error::decode("trailing content after the root element"));
    }
    Ok(value)
}

/// Items under a dot-separated path; one element is a single item
pub fn items_at(doc: &JsonValue, path: &str) -> Vec<JsonValue> {
    match lookup(doc, path) {
        Some(JsonValue::Array(items)) => items.clone(),
        Some(JsonValue::Null) | None => Vec::new(),
        Some(item) => vec![item.clone()],
    }
}

/// Skip whitespace, the XML declaration, processing instructions and comments
fn skip_misc(mut input: &str) -> &str {
    loop {
        input = input.trim_start();
        let end = if input.starts_with("<?") {
            input.find("?>").map(|pos| pos + 2)
        } else if input.starts_with("<!--") {
            input.find("-->").map(|pos| pos + 3)
        } else {
            None
        };
        match end {
            Some(end) => input = &input[end..],
            None => return input,
        }
    }
}

/// Parse one element starting at its opening tag; returns the rest of the input
fn parse_element(input: &str) -> Result<(JsonValue, &str)> {
    let open_end = input
        .find('>')
        .ok_or_else(|| Error::decode("unterminated opening tag"))?;
    let tag = &input[1..open_end];
    let name = tag
        .trim_end_matches('/')
        .split_whitespace()
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::decode("element without a name"))?;

    let mut rest = &input[open_end + 1..];
    if tag.ends_with('/') {
        return Ok((JsonValue::Null, rest));
    }

    let mut children = JsonObject::new();
    let mut text = String::new();
    loop {
        let next = rest
            .find('<')
            .ok_or_else(|| Error::decode(format!("missing closing tag for <{name}>")))?;
        text.push_str(&rest[..next]);
        rest = &rest[next..];

        if let Some(close) = rest.strip_prefix("</") {
            let end = close
                .find('>')
                .ok_or_else(|| Error::decode("unterminated closing tag"))?;
            let closing = close[..end].trim();
            if closing != name {
                return Err(Error::decode(format!(
                    "expected </{name}>, found </{closing}>"
                )));
            }
            let value = if !children.is_empty() {
                JsonValue::Object(children)
            } else if text.trim().is_empty() {
                JsonValue::Null
            } else {
                JsonValue::String(unescape(text.trim()))
            };
            return Ok((value, &close[end + 1..]));
        }

        if rest.starts_with("<!--") {
            let end = rest
                .find("-->")
                .ok_or_else(|| Error::decode("unterminated comment"))?;
            rest = &rest[end + 3..];
        } else if let Some(data) = rest.strip_prefix("<![CDATA[") {
            let end = data
                .find("]]>")
                .ok_or_else(|| Error::decode("unterminated CDATA section"))?;
            text.push_str(&data[..end]);
            rest = &data[end + 3..];
        } else {
            let child_name = rest[1..]
                .split(|c: char| c == '>' || c == '/' || c.is_whitespace())
                .next()
                .unwrap_or_default()
                .to_string();
            let (value, after) = parse_element(rest)?;
            insert_child(&mut children, child_name, value);
            rest = after;
        }
    }
}

/// Repeated children collect into an array
fn insert_child(children: &mut JsonObject, name: String, value: JsonValue) {
    match children.get_mut(&name) {
        Some(JsonValue::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = JsonValue::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
