use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::HttpMethod;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    pub method: HttpMethod,
    pub path: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl LogRecord {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "method" => Some(self.method.as_str().to_string()),
            "path" => Some(self.path.clone()),
            other => match self.extra.get(other) {
                Some(Value::String(s)) => Some(s.clone()),
                _ => None,
            },
        }
    }
}
