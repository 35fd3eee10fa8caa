use serde::{Deserialize, Serialize};

use crate::filter::HttpMethod;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MethodCount {
    pub method: HttpMethod,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsRequest {
    pub top_ips: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogStats {
    pub total: u64,
    pub methods: Vec<MethodCount>,
    pub status_checks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_ips: Option<Vec<ValueCount>>,
}

impl LogStats {
    pub fn method_count(&self, method: &HttpMethod) -> Option<u64> {
        self.methods
            .iter()
            .find(|m| &m.method == method)
            .map(|m| m.count)
    }

    pub fn reported_method_total(&self) -> u64 {
        self.methods.iter().map(|m| m.count).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountResponse {
    pub filter: String,
    pub count: u64,
}
