mod output;
mod telemetry;

use std::io::Write;

use anyhow::Context;
use clap::{Parser, Subcommand};
use logstat_core::config::{Config, parse_duration_str};
use logstat_core::filter::{CountFilter, FieldMatch};
use logstat_core::stats::{CountResponse, StatsRequest};
use logstat_store::{LogStore, MongoStore, collect_stats};
use serde::Serialize;

use crate::output::{render_count_human, render_stats_human};
use crate::telemetry::init_cli_tracing;

#[derive(Parser, Debug)]
#[command(name = "logstat")]
#[command(about = "Print request statistics for an nginx access-log collection")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true, help = "MongoDB connection string")]
    uri: Option<String>,

    #[arg(long, global = true)]
    database: Option<String>,

    #[arg(long, global = true)]
    collection: Option<String>,

    #[arg(long, global = true, help = "Server selection timeout (e.g. 500ms, 5s)")]
    connect_timeout: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Total, per-method and status-check counts (default)")]
    Stats {
        #[arg(long, value_name = "N", help = "Also list the N most frequent client IPs")]
        ips: Option<usize>,
    },
    #[command(about = "Count documents matching field=value filters")]
    Count {
        #[arg(long = "where", value_name = "FIELD=VALUE")]
        where_filters: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_cli_tracing();

    let cfg = resolve_config(&cli)?;
    tracing::debug!(uri = %cfg.mongo_uri, ns = %cfg.namespace(), timeout = ?cfg.connect_timeout, "resolved config");
    let store = MongoStore::connect(&cfg)
        .await
        .with_context(|| format!("connect to {}", cfg.namespace()))?;

    run(cli, &store, &mut std::io::stdout()).await
}

async fn run<S: LogStore, W: Write>(cli: Cli, store: &S, out: &mut W) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Stats { ips: None }) {
        Commands::Stats { ips } => {
            let stats = collect_stats(store, &StatsRequest { top_ips: ips })
                .await
                .with_context(|| format!("collect stats from {}", store.namespace()))?;
            if cli.json {
                write_json(out, &stats)
            } else {
                out.write_all(render_stats_human(&stats).as_bytes())?;
                Ok(())
            }
        }
        Commands::Count { where_filters } => {
            let filter = parse_where(&where_filters)?;
            let count = store
                .count(&filter)
                .await
                .with_context(|| format!("count {filter} in {}", store.namespace()))?;
            let response = CountResponse {
                filter: filter.to_string(),
                count,
            };
            if cli.json {
                write_json(out, &response)
            } else {
                out.write_all(render_count_human(&response).as_bytes())?;
                Ok(())
            }
        }
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut cfg = Config::load().context("load configuration")?;
    if let Some(v) = &cli.uri {
        cfg.mongo_uri = v.clone();
    }
    if let Some(v) = &cli.database {
        cfg.database = v.clone();
    }
    if let Some(v) = &cli.collection {
        cfg.collection = v.clone();
    }
    if let Some(v) = &cli.connect_timeout {
        cfg.connect_timeout = parse_duration_str(v)?;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn parse_where(filters: &[String]) -> anyhow::Result<CountFilter> {
    filters
        .iter()
        .map(|f| FieldMatch::parse(f))
        .collect::<logstat_core::Result<CountFilter>>()
        .map_err(Into::into)
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use logstat_core::filter::HttpMethod;
    use logstat_store::MemoryStore;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_defaults_to_stats() {
        let cli = Cli::try_parse_from(["logstat"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "logstat",
            "stats",
            "--ips",
            "10",
            "--uri",
            "mongodb://db:27017",
            "--json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Stats { ips: Some(10) })));
        assert_eq!(cli.uri.as_deref(), Some("mongodb://db:27017"));
        assert!(cli.json);
    }

    #[test]
    fn parse_where_builds_and_filter() {
        let filter = parse_where(&["method=GET".into(), "path=/status".into()]).unwrap();
        assert_eq!(filter, CountFilter::status_check());
        assert!(parse_where(&[]).unwrap().is_empty());
        assert!(parse_where(&["method".into()]).is_err());
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("logstat").chain(args.iter().copied())).unwrap()
    }

    async fn run_to_string(args: &[&str], store: &MemoryStore) -> anyhow::Result<String> {
        let mut out = Vec::new();
        run(parse(args), store, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    #[tokio::test]
    async fn run_without_arguments_prints_report() {
        let store = MemoryStore::with_records(testkit::sample_logs());
        let text = run_to_string(&[], &store).await.unwrap();
        assert_eq!(
            text,
            "4 logs\nMethods:\n\tmethod GET: 3\n\tmethod POST: 1\n\tmethod PUT: 0\n\tmethod PATCH: 0\n\tmethod DELETE: 0\n1 status check\n"
        );
    }

    #[tokio::test]
    async fn run_on_empty_collection_prints_all_lines() {
        let text = run_to_string(&["stats"], &MemoryStore::new()).await.unwrap();
        assert_eq!(
            text,
            "0 logs\nMethods:\n\tmethod GET: 0\n\tmethod POST: 0\n\tmethod PUT: 0\n\tmethod PATCH: 0\n\tmethod DELETE: 0\n0 status check\n"
        );
    }

    #[tokio::test]
    async fn run_stats_with_ips() {
        let store = MemoryStore::with_records(testkit::sample_logs());
        let text = run_to_string(&["stats", "--ips", "2"], &store).await.unwrap();
        assert!(text.ends_with(
            "1 status check\nIPs:\n\t172.31.63.67: 2\n\t172.31.2.14: 1\n"
        ));
    }

    #[tokio::test]
    async fn run_count_prints_number() {
        let store = MemoryStore::with_records(testkit::sample_logs());
        let text = run_to_string(&["count", "--where", "method=GET"], &store)
            .await
            .unwrap();
        assert_eq!(text, "3\n");
        let all = run_to_string(&["count"], &store).await.unwrap();
        assert_eq!(all, "4\n");
    }

    #[tokio::test]
    async fn run_count_rejects_bad_filter_without_output() {
        let store = MemoryStore::with_records(testkit::sample_logs());
        let mut out = Vec::new();
        let err = run(parse(&["count", "--where", "method"]), &store, &mut out)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid where filter"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn run_json_report_shape() {
        let store = MemoryStore::with_records(testkit::sample_logs());
        let text = run_to_string(&["--json"], &store).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["total"], 4);
        assert_eq!(value["methods"][0]["method"], "GET");
        assert_eq!(value["methods"][4]["method"], HttpMethod::Delete.as_str());
        assert_eq!(value["status_checks"], 1);
        assert!(value.get("top_ips").is_none());
    }

    #[tokio::test]
    async fn run_json_count() {
        let store = MemoryStore::with_records(testkit::sample_logs());
        let text = run_to_string(
            &["count", "--where", "method=GET", "--where", "path=/status", "--json"],
            &store,
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["filter"], "{method: \"GET\", path: \"/status\"}");
    }
}
