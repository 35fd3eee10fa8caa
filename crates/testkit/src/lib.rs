use logstat_core::filter::HttpMethod;
use logstat_core::model::log::LogRecord;

fn access(method: HttpMethod, path: &str, ip: &str, status: i64) -> LogRecord {
    LogRecord::new(method, path)
        .with_field("ip", ip)
        .with_field("date", "2026-02-01T00:00:00Z")
        .with_field("status", status)
}

pub fn sample_logs() -> Vec<LogRecord> {
    vec![
        access(HttpMethod::Get, "/", "172.31.63.67", 200),
        access(HttpMethod::Get, "/orders/42", "172.31.2.14", 404),
        access(HttpMethod::Get, "/status", "172.31.63.67", 200),
        access(HttpMethod::Post, "/orders", "69.162.124.230", 201),
    ]
}
