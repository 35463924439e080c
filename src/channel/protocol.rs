//! Wire protocol for the host event channel
//!
//! Every message in either direction is one JSON frame:
//! `{"event": <name>, "args": [...]}`. Inbound frames that demand a boolean
//! acknowledgment carry an `"ack"` id; the reply is an `ack` frame echoing
//! that id with the boolean as its only argument.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::types::Bound;

/// Event name used for acknowledgment replies
pub const ACK_EVENT: &str = "ack";

/// One JSON event frame, either direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
}

impl Frame {
    pub fn event(name: &str, args: Vec<Value>) -> Self {
        Self {
            event: name.to_string(),
            args,
            ack: None,
        }
    }

    /// Boolean acknowledgment reply for an inbound frame's ack id
    pub fn ack_reply(id: u64, granted: bool) -> Self {
        Self {
            event: ACK_EVENT.to_string(),
            args: vec![Value::Bool(granted)],
            ack: Some(id),
        }
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// How an element renders its content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ElementKind {
    /// Inline HTML fragment rendered by the host
    InlineContent,
    /// Embedded view navigated to a URL
    EmbeddedView,
}

impl From<ElementKind> for u8 {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::InlineContent => 0,
            ElementKind::EmbeddedView => 1,
        }
    }
}

impl TryFrom<u8> for ElementKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ElementKind::InlineContent),
            1 => Ok(ElementKind::EmbeddedView),
            other => Err(format!("unknown element kind {}", other)),
        }
    }
}

/// Payload of an `addElem` emission
///
/// The client never keeps a copy after emitting; live elements are tracked
/// only as a count fed by inbound `addElem`/`delElem` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub bound: Bound,
    pub content: String,
}

/// Ephemeral topic registration, one per connection (older host versions
/// only; the default mode scopes events by category key instead)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionContext {
    pub topic: String,
    #[serde(rename = "pwd")]
    pub secret: String,
}

impl SessionContext {
    /// New context with a freshly generated random secret
    pub fn generate(topic: String) -> Self {
        Self {
            topic,
            secret: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Outbound frame constructors, one per event the plugin emits
pub mod outbound {
    use super::*;
    use serde_json::json;

    pub fn echo(message: &str) -> Frame {
        Frame::event("echo", vec![json!(message)])
    }

    pub fn register_topic(ctx: &SessionContext) -> Frame {
        Frame::event("register_topic", vec![json!(ctx)])
    }

    pub fn add_input_hook(hook_key: &str) -> Frame {
        Frame::event("addInputHook", vec![json!(hook_key)])
    }

    pub fn del_input_hook(hook_key: &str) -> Frame {
        Frame::event("delInputHook", vec![json!(hook_key)])
    }

    pub fn insert_css(category_key: &str, css: &str) -> Frame {
        Frame::event("insertCSS", vec![json!(category_key), json!(css)])
    }

    pub fn remove_css(category_key: &str) -> Frame {
        Frame::event("removeCSS", vec![json!(category_key)])
    }

    pub fn add_elem(category_key: &str, elem: &ElementDescriptor) -> Frame {
        Frame::event("addElem", vec![json!(category_key), json!(elem)])
    }

    pub fn hide_elem(category_key: &str, elem_key: &str) -> Frame {
        Frame::event("hideElem", vec![json!(category_key), json!(elem_key)])
    }

    pub fn show_elem(category_key: &str, elem_key: &str) -> Frame {
        Frame::event("showElem", vec![json!(category_key), json!(elem_key)])
    }

    pub fn exec_js_in_elem(category_key: &str, script: &str) -> Frame {
        Frame::event("execJSInElem", vec![json!(category_key), json!(script)])
    }

    pub fn notify(text: &str, title: &str) -> Frame {
        Frame::event("notify", vec![json!({"text": text, "title": title})])
    }
}

/// Closed set of inbound events the plugin recognizes
///
/// Anything the static name table does not cover is dropped without
/// dispatch. Variants carrying raw `Value` payloads exist only for
/// observability; the typed variants feed the counter, the settings store,
/// or the acknowledgment path.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Connect,
    Disconnect,
    Echo(Value),
    RegisterTopic(Value),
    AddInputHook(Value),
    DelInputHook(Value),
    InsertCss(Value),
    RemoveCss(Value),
    AddElem(Value),
    DelElem(Value),
    ShowElem(Value),
    HideElem(Value),
    SetBound(Value),
    SetContent(Value),
    SetOpacity(Value),
    ExecJsInElem(Value),
    Notify(Value),
    UpdateBound { key: String, bound: Bound },
    UpdateOpacity { key: String, opacity: f64 },
    ProcessContent { content: String },
    ModeFlag { flags: Value },
    ElemRemove { key: String },
    ElemRefresh { key: String },
}

impl InboundEvent {
    /// Static name-to-kind table; `None` means the frame is not dispatched
    ///
    /// Events with typed arguments also fail closed: a recognized name with
    /// malformed arguments parses to `None` rather than a half-built event.
    pub fn parse(frame: &Frame) -> Option<Self> {
        let first = frame.args.first();
        match frame.event.as_str() {
            "connect" => Some(Self::Connect),
            "disconnect" => Some(Self::Disconnect),
            "echo" => Some(Self::Echo(first.cloned().unwrap_or(Value::Null))),
            "register_topic" => Some(Self::RegisterTopic(first.cloned().unwrap_or(Value::Null))),
            "addInputHook" => Some(Self::AddInputHook(first.cloned().unwrap_or(Value::Null))),
            "delInputHook" => Some(Self::DelInputHook(first.cloned().unwrap_or(Value::Null))),
            "insertCSS" => Some(Self::InsertCss(first.cloned().unwrap_or(Value::Null))),
            "removeCSS" => Some(Self::RemoveCss(first.cloned().unwrap_or(Value::Null))),
            "addElem" => Some(Self::AddElem(first.cloned().unwrap_or(Value::Null))),
            "delElem" => Some(Self::DelElem(first.cloned().unwrap_or(Value::Null))),
            "showElem" => Some(Self::ShowElem(first.cloned().unwrap_or(Value::Null))),
            "hideElem" => Some(Self::HideElem(first.cloned().unwrap_or(Value::Null))),
            "setBound" => Some(Self::SetBound(first.cloned().unwrap_or(Value::Null))),
            "setContent" => Some(Self::SetContent(first.cloned().unwrap_or(Value::Null))),
            "setOpacity" => Some(Self::SetOpacity(first.cloned().unwrap_or(Value::Null))),
            "execJSInElem" => Some(Self::ExecJsInElem(first.cloned().unwrap_or(Value::Null))),
            "notify" => Some(Self::Notify(first.cloned().unwrap_or(Value::Null))),
            "updateBound" => {
                let key = first?.as_str()?.to_string();
                let bound = serde_json::from_value(frame.args.get(1)?.clone()).ok()?;
                Some(Self::UpdateBound { key, bound })
            }
            "updateOpacity" => {
                let key = first?.as_str()?.to_string();
                let opacity = frame.args.get(1)?.as_f64()?;
                Some(Self::UpdateOpacity { key, opacity })
            }
            "processContent" => {
                let content = first?.as_str()?.to_string();
                Some(Self::ProcessContent { content })
            }
            "modeFlag" => Some(Self::ModeFlag {
                flags: first.cloned().unwrap_or(Value::Null),
            }),
            "elemRemove" => {
                let key = first?.as_str()?.to_string();
                Some(Self::ElemRemove { key })
            }
            "elemRefresh" => {
                let key = first?.as_str()?.to_string();
                Some(Self::ElemRefresh { key })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_round_trip() {
        let frame = outbound::insert_css("ex-1", ".es-basic {}");
        let text = frame.encode().unwrap();
        let back = Frame::decode(&text).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn test_frame_without_args_or_ack() {
        let frame = Frame::decode(r#"{"event": "connect"}"#).unwrap();
        assert_eq!(frame.event, "connect");
        assert!(frame.args.is_empty());
        assert_eq!(frame.ack, None);

        // Neither field appears when empty
        let text = frame.encode().unwrap();
        assert_eq!(text, r#"{"event":"connect"}"#);
    }

    #[test]
    fn test_outbound_arg_shapes() {
        let css = outbound::remove_css("ex-1");
        assert_eq!(css.args, vec![json!("ex-1")]);

        let hide = outbound::hide_elem("ex-2", "ex-2");
        assert_eq!(hide.event, "hideElem");
        assert_eq!(hide.args, vec![json!("ex-2"), json!("ex-2")]);

        let note = outbound::notify("done", "demo");
        assert_eq!(note.args, vec![json!({"text": "done", "title": "demo"})]);
    }

    #[test]
    fn test_ack_reply_shape() {
        let reply = Frame::ack_reply(7, false);
        let json: Value = serde_json::from_str(&reply.encode().unwrap()).unwrap();
        assert_eq!(json, json!({"event": "ack", "args": [false], "ack": 7}));
    }

    #[test]
    fn test_element_kind_integer_encoding() {
        let elem = ElementDescriptor {
            key: "ex-1".to_string(),
            kind: ElementKind::InlineContent,
            bound: Bound::new(200, 200, 100, 50),
            content: "<div>Hello</div>".to_string(),
        };
        let json = serde_json::to_value(&elem).unwrap();
        assert_eq!(json["type"], json!(0));

        let view = ElementDescriptor {
            kind: ElementKind::EmbeddedView,
            ..elem
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], json!(1));

        let back: ElementDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind, ElementKind::EmbeddedView);
    }

    #[test]
    fn test_element_kind_rejects_unknown_discriminant() {
        let result: Result<ElementDescriptor, _> = serde_json::from_value(json!({
            "key": "ex-1",
            "type": 9,
            "bound": {"x": 0, "y": 0, "w": 1, "h": 1},
            "content": ""
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_known_names() {
        let cases = [
            ("connect", InboundEvent::Connect),
            ("disconnect", InboundEvent::Disconnect),
        ];
        for (name, expected) in cases {
            let frame = Frame::event(name, vec![]);
            assert_eq!(InboundEvent::parse(&frame), Some(expected));
        }

        let frame = Frame::event("echo", vec![json!("hi")]);
        assert_eq!(
            InboundEvent::parse(&frame),
            Some(InboundEvent::Echo(json!("hi")))
        );
    }

    #[test]
    fn test_parse_unknown_name_is_not_dispatched() {
        let frame = Frame::event("totallyUnknown", vec![json!(1)]);
        assert_eq!(InboundEvent::parse(&frame), None);
    }

    #[test]
    fn test_parse_update_bound() {
        let frame = Frame::event(
            "updateBound",
            vec![json!("ex-2"), json!({"x": 1, "y": 2, "w": 3, "h": 4})],
        );
        assert_eq!(
            InboundEvent::parse(&frame),
            Some(InboundEvent::UpdateBound {
                key: "ex-2".to_string(),
                bound: Bound::new(1, 2, 3, 4),
            })
        );
    }

    #[test]
    fn test_parse_update_bound_malformed_args_fails_closed() {
        let missing_bound = Frame::event("updateBound", vec![json!("ex-2")]);
        assert_eq!(InboundEvent::parse(&missing_bound), None);

        let bad_bound = Frame::event("updateBound", vec![json!("ex-2"), json!("wide")]);
        assert_eq!(InboundEvent::parse(&bad_bound), None);
    }

    #[test]
    fn test_parse_confirmation_events() {
        let frame = Frame {
            event: "elemRemove".to_string(),
            args: vec![json!("ex-1")],
            ack: Some(3),
        };
        assert_eq!(
            InboundEvent::parse(&frame),
            Some(InboundEvent::ElemRemove {
                key: "ex-1".to_string()
            })
        );
    }

    #[test]
    fn test_session_context_wire_shape() {
        let ctx = SessionContext {
            topic: "bar".to_string(),
            secret: "s3cret".to_string(),
        };
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json, json!({"topic": "bar", "pwd": "s3cret"}));
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = SessionContext::generate("bar".to_string());
        let b = SessionContext::generate("bar".to_string());
        assert_ne!(a.secret, b.secret);
    }
}
