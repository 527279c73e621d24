use serde::{Deserialize, Serialize};

use crate::model::recognition::Recognition;

pub const CODE_OK: u16 = 200;
pub const CODE_NOT_FOUND: u16 = 404;
pub const CODE_INTERNAL: u16 = 500;

pub const NO_TEXT_MSG: &str = "No text detected";

/// One protocol reply. Serialized as a single JSON line.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Response {
    pub code: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl Response {
    pub fn text(text: impl Into<String>) -> Self {
        Response {
            code: CODE_OK,
            text: Some(text.into()),
            msg: None,
        }
    }

    pub fn no_text() -> Self {
        Response {
            code: CODE_OK,
            text: Some(String::new()),
            msg: Some(NO_TEXT_MSG.to_string()),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Response {
            code: CODE_NOT_FOUND,
            text: None,
            msg: Some(format!("File not found: {path}")),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Response {
            code: CODE_INTERNAL,
            text: None,
            msg: Some(msg.into()),
        }
    }
}

impl From<Recognition> for Response {
    fn from(r: Recognition) -> Self {
        if r.is_empty() {
            Response::no_text()
        } else {
            Response::text(r.joined_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::recognition::Fragment;
    use serde_json::{json, Value};

    fn to_value(r: &Response) -> Value {
        serde_json::to_value(r).unwrap()
    }

    #[test]
    fn not_found_has_no_text_field() {
        let v = to_value(&Response::not_found("/tmp/missing.png"));
        assert_eq!(
            v,
            json!({ "code": 404, "msg": "File not found: /tmp/missing.png" })
        );
        assert!(v.get("text").is_none());
    }

    #[test]
    fn empty_recognition_maps_to_no_text() {
        let r: Response = Recognition::default().into();
        assert_eq!(
            to_value(&r),
            json!({ "code": 200, "text": "", "msg": "No text detected" })
        );
    }

    #[test]
    fn recognition_with_lines_maps_to_text_only() {
        let r: Response = Recognition {
            fragments: vec![Fragment::new("Hello"), Fragment::new("World")],
            ..Default::default()
        }
        .into();
        assert_eq!(to_value(&r), json!({ "code": 200, "text": "Hello\nWorld" }));
    }

    #[test]
    fn internal_carries_message() {
        let r = Response::internal("boom");
        assert_eq!(to_value(&r), json!({ "code": 500, "msg": "boom" }));
    }
}
