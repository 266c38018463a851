//! Minimal XML-RPC codec covering what the tracker's `list` and `lookup`
//! endpoints exchange: string parameters out, scalar/array/struct values in.

use std::collections::BTreeMap;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::TrackerError;

#[derive(Debug, Clone, PartialEq)]
pub enum XmlRpcValue {
    Int(i64),
    Bool(bool),
    Double(f64),
    Str(String),
    DateTime(String),
    Base64(String),
    Array(Vec<XmlRpcValue>),
    Struct(BTreeMap<String, XmlRpcValue>),
    Nil,
}

impl XmlRpcValue {
    /// Scalar rendered as a label or identifier. Roundup returns ids as
    /// strings, older servers as ints.
    pub fn as_label(&self) -> Option<String> {
        match self {
            XmlRpcValue::Str(s) => Some(s.clone()),
            XmlRpcValue::Int(i) => Some(i.to_string()),
            _ => None,
        }
    }

    pub fn into_array(self) -> Result<Vec<XmlRpcValue>, TrackerError> {
        match self {
            XmlRpcValue::Array(items) => Ok(items),
            XmlRpcValue::Nil => Ok(Vec::new()),
            other => Err(TrackerError::malformed(format!(
                "expected array, got {other:?}"
            ))),
        }
    }
}

pub fn encode_call(method: &str, params: &[&str]) -> String {
    let mut body = String::with_capacity(128 + params.iter().map(|p| p.len()).sum::<usize>());
    body.push_str("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    body.push_str(&escape(method));
    body.push_str("</methodName><params>");
    for param in params {
        body.push_str("<param><value><string>");
        body.push_str(&escape(*param));
        body.push_str("</string></value></param>");
    }
    body.push_str("</params></methodCall>\n");
    body
}

/// Decodes a `methodResponse`. A `<fault>` becomes `TrackerError::Fault`.
pub fn decode_response(xml: &str) -> Result<XmlRpcValue, TrackerError> {
    let root = parse_tree(xml)?;
    if root.name != "methodResponse" {
        return Err(TrackerError::malformed(format!(
            "unexpected root element <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let value = decode_value(fault.required("value")?)?;
        return Err(fault_from(value));
    }

    let param = root.required("params")?.required("param")?;
    decode_value(param.required("value")?)
}

fn fault_from(value: XmlRpcValue) -> TrackerError {
    let XmlRpcValue::Struct(members) = value else {
        return TrackerError::malformed("fault without struct");
    };
    let code = match members.get("faultCode") {
        Some(XmlRpcValue::Int(code)) => *code,
        _ => 0,
    };
    let message = match members.get("faultString") {
        Some(XmlRpcValue::Str(message)) => message.clone(),
        _ => String::new(),
    };
    TrackerError::Fault { code, message }
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Self::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn required(&self, name: &str) -> Result<&Node, TrackerError> {
        self.child(name).ok_or_else(|| {
            TrackerError::malformed(format!("<{}> is missing <{name}>", self.name))
        })
    }
}

fn parse_tree(xml: &str) -> Result<Node, TrackerError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(Node::new(e.name().as_ref())),
            Event::Empty(e) => {
                let node = Node::new(e.name().as_ref());
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::Text(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| TrackerError::malformed("unbalanced end tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(TrackerError::malformed("truncated document"));
    }
    root.ok_or_else(|| TrackerError::malformed("empty document"))
}

fn decode_value(value: &Node) -> Result<XmlRpcValue, TrackerError> {
    // A bare <value>text</value> is a string.
    let Some(typed) = value.children.first() else {
        return Ok(XmlRpcValue::Str(value.text.clone()));
    };

    let text = typed.text.as_str();
    let decoded = match typed.name.as_str() {
        "string" => XmlRpcValue::Str(typed.text.clone()),
        "int" | "i4" | "i8" => XmlRpcValue::Int(parse_scalar(text, "int")?),
        "double" => XmlRpcValue::Double(parse_scalar(text, "double")?),
        "boolean" => match text.trim() {
            "1" => XmlRpcValue::Bool(true),
            "0" => XmlRpcValue::Bool(false),
            other => {
                return Err(TrackerError::malformed(format!("bad boolean {other:?}")));
            }
        },
        "nil" => XmlRpcValue::Nil,
        "dateTime.iso8601" => XmlRpcValue::DateTime(text.trim().to_string()),
        "base64" => XmlRpcValue::Base64(text.trim().to_string()),
        "array" => {
            let data = typed.required("data")?;
            let items = data
                .children
                .iter()
                .filter(|c| c.name == "value")
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()?;
            XmlRpcValue::Array(items)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member.required("name")?.text.clone();
                members.insert(name, decode_value(member.required("value")?)?);
            }
            XmlRpcValue::Struct(members)
        }
        other => {
            return Err(TrackerError::malformed(format!(
                "unsupported value type <{other}>"
            )));
        }
    };
    Ok(decoded)
}

fn parse_scalar<T: std::str::FromStr>(text: &str, kind: &str) -> Result<T, TrackerError> {
    text.trim()
        .parse()
        .map_err(|_| TrackerError::malformed(format!("bad {kind} {text:?}")))
}
