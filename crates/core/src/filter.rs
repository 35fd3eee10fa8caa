use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LogstatError, Result};
use crate::model::log::LogRecord;

pub const STATUS_CHECK_PATH: &str = "/status";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Other(String),
}

pub const REPORTED_METHODS: [HttpMethod; 5] = [
    HttpMethod::Get,
    HttpMethod::Post,
    HttpMethod::Put,
    HttpMethod::Patch,
    HttpMethod::Delete,
];

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Other(m) => m,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Stored values are matched exactly, so "get" stays `Other("get")`.
impl FromStr for HttpMethod {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<String> for HttpMethod {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(m) => m,
            Err(never) => match never {},
        }
    }
}

impl From<HttpMethod> for String {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Other(m) => m,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldMatch {
    pub field: String,
    pub value: String,
}

impl FieldMatch {
    pub fn parse(input: &str) -> Result<Self> {
        let (field, value) = input
            .split_once('=')
            .ok_or_else(|| LogstatError::Parse(format!("invalid where filter: {input}")))?;

        if field.trim().is_empty() || value.trim().is_empty() {
            return Err(LogstatError::Parse(format!("invalid where filter: {input}")));
        }

        Ok(Self {
            field: field.trim().to_string(),
            value: value.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountFilter {
    fields: Vec<FieldMatch>,
}

impl CountFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn method(method: &HttpMethod) -> Self {
        Self::all().and("method", method.as_str())
    }

    pub fn status_check() -> Self {
        Self::method(&HttpMethod::Get).and("path", STATUS_CHECK_PATH)
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|m| m.field == field) {
            Some(existing) => existing.value = value,
            None => self.fields.push(FieldMatch { field, value }),
        }
        self
    }

    pub fn fields(&self) -> &[FieldMatch] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        self.fields
            .iter()
            .all(|m| record.field(&m.field).as_deref() == Some(m.value.as_str()))
    }
}

impl FromIterator<FieldMatch> for CountFilter {
    fn from_iter<I: IntoIterator<Item = FieldMatch>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::all(), |filter, m| filter.and(m.field, m.value))
    }
}

impl fmt::Display for CountFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, m) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:?}", m.field, m.value)?;
        }
        f.write_str("}")
    }
}
