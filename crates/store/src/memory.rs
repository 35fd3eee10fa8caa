use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use logstat_core::Result;
use logstat_core::filter::CountFilter;
use logstat_core::model::log::LogRecord;
use logstat_core::stats::ValueCount;

use crate::LogStore;

#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<LogRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub fn insert_logs(&self, logs: &[LogRecord]) {
        self.lock().extend_from_slice(logs);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogRecord>> {
        self.records.lock().expect("memory store mutex poisoned")
    }
}

impl LogStore for MemoryStore {
    fn namespace(&self) -> &str {
        ":memory:"
    }

    async fn count(&self, filter: &CountFilter) -> Result<u64> {
        let count = self.lock().iter().filter(|r| filter.matches(r)).count();
        Ok(count as u64)
    }

    async fn top_values(&self, field: &str, limit: usize) -> Result<Vec<ValueCount>> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for record in self.lock().iter() {
            if let Some(value) = record.field(field) {
                *counts.entry(value).or_insert(0) += 1;
            }
        }

        let mut out = counts
            .into_iter()
            .map(|(value, count)| ValueCount { value, count })
            .collect::<Vec<_>>();
        out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        out.truncate(limit);
        Ok(out)
    }
}
