use std::fmt::Write;

use logstat_core::stats::{CountResponse, LogStats};

pub fn render_stats_human(v: &LogStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} logs", v.total);
    out.push_str("Methods:\n");
    for m in &v.methods {
        let _ = writeln!(out, "\tmethod {}: {}", m.method, m.count);
    }
    let _ = writeln!(out, "{} status check", v.status_checks);

    if let Some(ips) = &v.top_ips {
        out.push_str("IPs:\n");
        for ip in ips {
            let _ = writeln!(out, "\t{}: {}", ip.value, ip.count);
        }
    }
    out
}

pub fn render_count_human(v: &CountResponse) -> String {
    format!("{}\n", v.count)
}
