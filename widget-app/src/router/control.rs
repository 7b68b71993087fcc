//! Control messages carried in launch bundles.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::class::DestroyReason;
use crate::error::WidgetError;

/// Launch bundle: flat string key/value pairs.
pub type Bundle = BTreeMap<String, String>;

pub const KEY_CLASS: &str = "class";
pub const KEY_INSTANCE: &str = "instance";
pub const KEY_OPERATION: &str = "operation";
pub const KEY_WIDTH: &str = "width";
pub const KEY_HEIGHT: &str = "height";
pub const KEY_FORCE: &str = "force";
pub const KEY_CONTENT: &str = "content";
pub const KEY_REASON: &str = "reason";
pub const KEY_CALLER: &str = "caller";
pub const KEY_ENDPOINT: &str = "endpoint";

/// Operation named by a control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Resize,
    Update,
    /// Permanent destroy, unless the message carries a reason.
    Destroy,
    Resume,
    Pause,
    /// Temporary destroy.
    Terminate,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Resize => "resize",
            Self::Update => "update",
            Self::Destroy => "destroy",
            Self::Resume => "resume",
            Self::Pause => "pause",
            Self::Terminate => "terminate",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "resize" => Ok(Self::Resize),
            "update" => Ok(Self::Update),
            "destroy" => Ok(Self::Destroy),
            "resume" => Ok(Self::Resume),
            "pause" => Ok(Self::Pause),
            "terminate" => Ok(Self::Terminate),
            other => Err(WidgetError::invalid(format!("unknown operation: {other}"))),
        }
    }
}

/// A parsed control message.
///
/// Parsing is lenient the way the launch protocol expects: missing or
/// malformed numbers read as 0 and only the literal `"true"` sets `force`.
/// The operation is kept as text so an unknown name can be logged by the
/// router rather than rejected here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlMessage {
    pub class_id: Option<String>,
    pub instance_id: Option<String>,
    pub operation: Option<String>,
    pub width: i32,
    pub height: i32,
    pub force: bool,
    pub content: Option<String>,
    pub reason: Option<i32>,
    pub caller: Option<i32>,
    pub endpoint: Option<String>,
}

impl ControlMessage {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation: Some(operation.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn from_bundle(bundle: &Bundle) -> Self {
        let text = |key: &str| bundle.get(key).cloned();
        let number = |key: &str| bundle.get(key).map(|v| parse_leading_int(v));

        Self {
            class_id: text(KEY_CLASS),
            instance_id: text(KEY_INSTANCE),
            operation: text(KEY_OPERATION),
            width: number(KEY_WIDTH).unwrap_or(0),
            height: number(KEY_HEIGHT).unwrap_or(0),
            force: bundle.get(KEY_FORCE).is_some_and(|v| v == "true"),
            content: text(KEY_CONTENT),
            reason: number(KEY_REASON),
            caller: number(KEY_CALLER),
            endpoint: text(KEY_ENDPOINT),
        }
    }

    pub fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                bundle.insert(key.to_string(), value);
            }
        };
        put(KEY_CLASS, self.class_id.clone());
        put(KEY_INSTANCE, self.instance_id.clone());
        put(KEY_OPERATION, self.operation.clone());
        put(KEY_WIDTH, Some(self.width.to_string()));
        put(KEY_HEIGHT, Some(self.height.to_string()));
        put(KEY_FORCE, self.force.then(|| "true".to_string()));
        put(KEY_CONTENT, self.content.clone());
        put(KEY_REASON, self.reason.map(|r| r.to_string()));
        put(KEY_CALLER, self.caller.map(|c| c.to_string()));
        put(KEY_ENDPOINT, self.endpoint.clone());
        bundle
    }

    pub fn class(mut self, class_id: impl Into<String>) -> Self {
        self.class_id = Some(class_id.into());
        self
    }

    pub fn instance(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn reason(mut self, reason: DestroyReason) -> Self {
        self.reason = Some(reason.code());
        self
    }

    pub fn caller(mut self, pid: i32) -> Self {
        self.caller = Some(pid);
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// Parses an optional sign and the leading decimal digits; anything else is 0.
fn parse_leading_int(s: &str) -> i32 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    let value = digits[..end].chars().fold(0_i64, |acc, c| {
        let digit = i64::from(c.to_digit(10).unwrap_or(0));
        (acc * 10 + digit).min(i64::from(i32::MAX) + 1)
    });
    let value = if negative { -value } else { value };
    i32::try_from(value).unwrap_or(if negative { i32::MIN } else { i32::MAX })
}
