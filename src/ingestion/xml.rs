//! XML reader.
//!
//! Documents are converted into a `serde_json::Value` tree with the forced-array convention:
//!
//! - the result is `{ "<root>": <element> }`
//! - every child element is collected into an array under its tag name, even when it occurs once
//! - an element with neither attributes nor children becomes its text (`""` when empty)
//! - attributes go under `"$"`, and text mixed with children goes under `"_"`
//!
//! Transformers therefore index `[0]` for singular slots and iterate for repeatable ones.

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

use crate::error::{IngestionError, IngestionResult};

/// Read an XML file into its forced-array document tree.
pub fn read_xml_from_path(path: impl AsRef<Path>) -> IngestionResult<Value> {
    let text = fs::read_to_string(path)?;
    read_xml_from_str(&text)
}

/// Read XML from an in-memory string.
pub fn read_xml_from_str(input: &str) -> IngestionResult<Value> {
    let mut reader = Reader::from_str(input);
    reader.trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(Frame::open(&reader, &e)?),
            Event::Empty(e) => {
                let frame = Frame::open(&reader, &e)?;
                attach(&mut stack, &mut root, frame)?;
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| IngestionError::SchemaMismatch {
                    message: "unbalanced closing tag".to_string(),
                })?;
                attach(&mut stack, &mut root, frame)?;
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: format!("unclosed element '{}'", stack[stack.len() - 1].name),
        });
    }

    let (name, element) = root.ok_or_else(|| IngestionError::SchemaMismatch {
        message: "xml document has no root element".to_string(),
    })?;
    let mut doc = Map::new();
    doc.insert(name, element);
    Ok(Value::Object(doc))
}

/// Collapse every single-element array in `value`, recursively.
///
/// Used for free-form `properties` blocks so that an XML source yields the same value as the
/// equivalent JSON source.
pub fn collapse_singletons(value: &Value) -> Value {
    match value {
        Value::Array(items) if items.len() == 1 => collapse_singletons(&items[0]),
        Value::Array(items) => Value::Array(items.iter().map(collapse_singletons).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), collapse_singletons(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

struct Frame {
    name: String,
    attrs: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> IngestionResult<Self> {
        let decoder = reader.decoder();
        let name = decoder.decode(e.name().as_ref())?.into_owned();
        let mut attrs = Map::new();
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = decoder.decode(attr.key.as_ref())?.into_owned();
            let value = attr.unescape_value()?.into_owned();
            attrs.insert(key, Value::String(value));
        }
        Ok(Self {
            name,
            attrs,
            children: Map::new(),
            text: String::new(),
        })
    }

    fn into_value(self) -> Value {
        let text = self.text.trim();
        if self.attrs.is_empty() && self.children.is_empty() {
            return Value::String(text.to_string());
        }
        let mut obj = Map::new();
        if !self.attrs.is_empty() {
            obj.insert("$".to_string(), Value::Object(self.attrs));
        }
        if !text.is_empty() {
            obj.insert("_".to_string(), Value::String(text.to_string()));
        }
        obj.extend(self.children);
        Value::Object(obj)
    }
}

fn attach(
    stack: &mut [Frame],
    root: &mut Option<(String, Value)>,
    frame: Frame,
) -> IngestionResult<()> {
    let name = frame.name.clone();
    let value = frame.into_value();
    match stack.last_mut() {
        Some(parent) => {
            let slot = parent
                .children
                .entry(name)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = slot {
                items.push(value);
            }
            Ok(())
        }
        None if root.is_none() => {
            *root = Some((name, value));
            Ok(())
        }
        None => Err(IngestionError::SchemaMismatch {
            message: format!("multiple root elements ('{name}')"),
        }),
    }
}
