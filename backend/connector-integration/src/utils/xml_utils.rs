//! Reading XML and SOAP response bodies into `serde_json::Value` trees, so
//! the same field paths work for every wire format.
//!
//! Element names lose their namespace prefix (`SOAP-ENV:Fault` becomes
//! `Fault`). Attributes become `@name` keys, repeated siblings become arrays
//! and leaf elements become strings.

use common_utils::errors::{CustomResult, ParsingError};
use error_stack::{report, ResultExt};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use serde_json::{Map, Value};

const TEXT_KEY: &str = "$text";

struct Element {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> CustomResult<Self, ParsingError> {
        let mut children = Map::new();
        for attribute in start.attributes() {
            let attribute = attribute
                .change_context(ParsingError::XmlParseFailure)
                .attach_printable("malformed attribute")?;
            if attribute.key.as_ref().starts_with(b"xmlns") {
                continue;
            }
            let value = attribute
                .unescape_value()
                .change_context(ParsingError::XmlParseFailure)?;
            children.insert(
                format!(
                    "@{}",
                    String::from_utf8_lossy(attribute.key.local_name().as_ref())
                ),
                Value::String(value.into_owned()),
            );
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            children,
            text: String::new(),
        })
    }

    fn into_entry(self) -> (String, Value) {
        let text = self.text.trim().to_string();
        let value = if self.children.is_empty() {
            Value::String(text)
        } else {
            let mut children = self.children;
            if !text.is_empty() {
                children.insert(TEXT_KEY.to_string(), Value::String(text));
            }
            Value::Object(children)
        };
        (self.name, value)
    }
}

fn insert_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        // element values are never arrays, so an array here came from an earlier repeat
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

/// Parses a complete XML document. Truncated documents, mismatched tags,
/// text outside the root element and multiple roots are all errors.
pub fn xml_to_value(body: &str) -> CustomResult<Value, ParsingError> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Map<String, Value>> = None;

    loop {
        let event = reader.read_event();
        let event = event
            .change_context(ParsingError::XmlParseFailure)
            .attach_printable_lazy(|| format!("near byte {}", reader.buffer_position()))?;

        let closed = match event {
            Event::Start(start) => {
                open.push(Element::open(&start)?);
                None
            }
            Event::Empty(start) => Some(Element::open(&start)?),
            Event::End(_) => Some(open.pop().ok_or_else(|| {
                report!(ParsingError::XmlParseFailure).attach_printable("unbalanced end tag")
            })?),
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .change_context(ParsingError::XmlParseFailure)?;
                match open.last_mut() {
                    Some(element) => element.text.push_str(&text),
                    None => {
                        return Err(report!(ParsingError::XmlParseFailure)
                            .attach_printable("text outside the root element"))
                    }
                }
                None
            }
            Event::CData(data) => {
                if let Some(element) = open.last_mut() {
                    element
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
                None
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => None,
        };

        if let Some(element) = closed {
            let (name, value) = element.into_entry();
            match open.last_mut() {
                Some(parent) => insert_child(&mut parent.children, name, value),
                None if root.is_some() => {
                    return Err(report!(ParsingError::XmlParseFailure)
                        .attach_printable("more than one root element"))
                }
                None => root = Some(Map::from_iter([(name, value)])),
            }
        }
    }

    if !open.is_empty() {
        return Err(report!(ParsingError::XmlParseFailure)
            .attach_printable(format!("document ended with {} open elements", open.len())));
    }
    root.map(Value::Object).ok_or_else(|| {
        report!(ParsingError::XmlParseFailure).attach_printable("document has no root element")
    })
}

/// Every leaf whose element name appears in `table`, keyed by the table's
/// name for it. The first occurrence of a tag wins.
pub fn collect_numbered_fields(
    value: &Value,
    table: &[(&'static str, &'static str)],
) -> Map<String, Value> {
    fn walk(
        value: &Value,
        table: &[(&'static str, &'static str)],
        found: &mut Map<String, Value>,
    ) {
        match value {
            Value::Object(map) => map.iter().for_each(|(key, child)| {
                match (table.iter().find(|(tag, _)| *tag == key.as_str()), child) {
                    (Some((_, name)), Value::String(_)) => {
                        if !found.contains_key(*name) {
                            found.insert((*name).to_string(), child.clone());
                        }
                    }
                    _ => walk(child, table, found),
                }
            }),
            Value::Array(items) => items.iter().for_each(|item| walk(item, table, found)),
            _ => {}
        }
    }

    let mut found = Map::new();
    walk(value, table, &mut found);
    found
}
