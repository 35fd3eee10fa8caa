pub mod memory;
pub mod mongo;
pub mod report;

use logstat_core::Result;
use logstat_core::filter::CountFilter;
use logstat_core::stats::ValueCount;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use report::collect_stats;

#[allow(async_fn_in_trait)]
pub trait LogStore {
    fn namespace(&self) -> &str;

    async fn count(&self, filter: &CountFilter) -> Result<u64>;

    async fn top_values(&self, field: &str, limit: usize) -> Result<Vec<ValueCount>>;
}
