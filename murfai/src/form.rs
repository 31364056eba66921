//! Renderer-agnostic description of the fields a wizard step asks for.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Field-set submitted by the user for one step.
pub type UserInput = HashMap<String, Value>;

/// Field key → error code. The key `base` marks a step-level error.
pub type FormErrors = BTreeMap<String, String>;

pub const BASE_ERROR: &str = "base";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Option whose label is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Multiline,
    Boolean,
    Select { options: Vec<SelectOption> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn required(key: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            required: true,
            kind,
            default: None,
        }
    }

    pub fn optional(key: &str, kind: FieldKind, default: Value) -> Self {
        Self {
            key: key.to_string(),
            required: false,
            kind,
            default: Some(default),
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn options(&self) -> Option<&[SelectOption]> {
        match &self.kind {
            FieldKind::Select { options } => Some(options),
            _ => None,
        }
    }
}

/// A form to show for `step_id`, with any errors from the previous submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub step_id: String,
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub errors: FormErrors,
}

impl FormSchema {
    pub fn new(step_id: &str, fields: Vec<FieldSpec>) -> Self {
        Self {
            step_id: step_id.to_string(),
            fields,
            errors: FormErrors::new(),
        }
    }

    pub fn with_errors(mut self, errors: FormErrors) -> Self {
        self.errors = errors;
        self
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.key == key)
    }
}

pub(crate) fn input_str<'a>(input: &'a UserInput, key: &str) -> Option<&'a str> {
    input.get(key).and_then(Value::as_str)
}
