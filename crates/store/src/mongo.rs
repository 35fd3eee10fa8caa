use futures::TryStreamExt;
use logstat_core::config::Config;
use logstat_core::error::{LogstatError, Result};
use logstat_core::filter::CountFilter;
use logstat_core::stats::ValueCount;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};

use crate::LogStore;

#[derive(Clone)]
pub struct MongoStore {
    collection: Collection<Document>,
    namespace: String,
}

impl MongoStore {
    pub async fn connect(cfg: &Config) -> Result<Self> {
        cfg.validate()?;

        let mut options = ClientOptions::parse(&cfg.mongo_uri)
            .await
            .map_err(|e| LogstatError::Config(format!("invalid mongo uri: {e}")))?;
        options.app_name = Some("logstat".to_string());
        options.server_selection_timeout = Some(cfg.connect_timeout);
        options.connect_timeout = Some(cfg.connect_timeout);

        let client = Client::with_options(options)
            .map_err(|e| driver_error("failed to build mongo client", e))?;
        let collection = client
            .database(&cfg.database)
            .collection::<Document>(&cfg.collection);

        Ok(Self {
            collection,
            namespace: cfg.namespace(),
        })
    }
}

impl LogStore for MongoStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn count(&self, filter: &CountFilter) -> Result<u64> {
        let count = self
            .collection
            .count_documents(filter_document(filter))
            .await
            .map_err(|e| driver_error("count failed", e))?;
        tracing::debug!(ns = %self.namespace, %filter, count, "count");
        Ok(count)
    }

    async fn top_values(&self, field: &str, limit: usize) -> Result<Vec<ValueCount>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut cursor = self
            .collection
            .aggregate(top_values_pipeline(field, limit))
            .await
            .map_err(|e| driver_error("aggregate failed", e))?;

        let mut out = Vec::new();
        while let Some(row) = cursor
            .try_next()
            .await
            .map_err(|e| driver_error("aggregate cursor failed", e))?
        {
            out.push(value_count_from_row(&row)?);
        }
        tracing::debug!(ns = %self.namespace, field, rows = out.len(), "top values");
        Ok(out)
    }
}

fn filter_document(filter: &CountFilter) -> Document {
    let mut doc = Document::new();
    for m in filter.fields() {
        doc.insert(m.field.clone(), m.value.clone());
    }
    doc
}

fn top_values_pipeline(field: &str, limit: usize) -> Vec<Document> {
    let mut only_strings = Document::new();
    only_strings.insert(field, doc! { "$type": "string" });
    let group_key = format!("${field}");
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    vec![
        doc! { "$match": only_strings },
        doc! { "$group": { "_id": group_key, "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1, "_id": 1 } },
        doc! { "$limit": limit },
    ]
}

fn value_count_from_row(row: &Document) -> Result<ValueCount> {
    let value = match row.get("_id") {
        Some(Bson::String(s)) => s.clone(),
        other => {
            return Err(LogstatError::Store(format!(
                "unexpected group key: {other:?}"
            )));
        }
    };
    let count = match row.get("count") {
        Some(Bson::Int32(n)) => *n as u64,
        Some(Bson::Int64(n)) => *n as u64,
        other => {
            return Err(LogstatError::Store(format!(
                "unexpected group count: {other:?}"
            )));
        }
    };
    Ok(ValueCount { value, count })
}

fn driver_error(context: &str, err: mongodb::error::Error) -> LogstatError {
    let unreachable = matches!(
        *err.kind,
        ErrorKind::ServerSelection { .. }
            | ErrorKind::Authentication { .. }
            | ErrorKind::Io(_)
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
    );
    if unreachable {
        LogstatError::Connection(format!("{context}: {err}"))
    } else {
        LogstatError::Store(format!("{context}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use logstat_core::filter::HttpMethod;

    use super::*;

    #[test]
    fn filter_document_is_flat_equality() {
        assert!(filter_document(&CountFilter::all()).is_empty());
        assert_eq!(
            filter_document(&CountFilter::status_check()),
            doc! { "method": "GET", "path": "/status" }
        );
        assert_eq!(
            filter_document(&CountFilter::method(&HttpMethod::Delete)),
            doc! { "method": "DELETE" }
        );
    }

    #[test]
    fn pipeline_groups_sorts_and_limits() {
        let pipeline = top_values_pipeline("ip", 10);
        assert_eq!(pipeline.len(), 4);
        assert_eq!(
            pipeline[0],
            doc! { "$match": { "ip": { "$type": "string" } } }
        );
        assert_eq!(
            pipeline[1],
            doc! { "$group": { "_id": "$ip", "count": { "$sum": 1 } } }
        );
        assert_eq!(pipeline[3], doc! { "$limit": 10_i64 });
    }

    #[test]
    fn value_count_reads_int32_and_int64() {
        let a = value_count_from_row(&doc! { "_id": "10.0.0.1", "count": 3 }).unwrap();
        assert_eq!(a.count, 3);
        let b = value_count_from_row(&doc! { "_id": "10.0.0.2", "count": 7_i64 }).unwrap();
        assert_eq!(b.value, "10.0.0.2");
        assert!(value_count_from_row(&doc! { "_id": Bson::Null, "count": 1 }).is_err());
    }

    #[tokio::test]
    async fn connect_rejects_malformed_uri() {
        let cfg = Config {
            mongo_uri: "not-a-uri".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            MongoStore::connect(&cfg).await,
            Err(LogstatError::Config(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_connection_error() {
        let cfg = Config {
            mongo_uri: "mongodb://127.0.0.1:1/?directConnection=true".to_string(),
            connect_timeout: Duration::from_millis(200),
            ..Config::default()
        };
        let store = MongoStore::connect(&cfg).await.unwrap();
        assert_eq!(store.namespace(), "logs.nginx");

        let err = store.count(&CountFilter::all()).await.unwrap_err();
        assert!(err.is_connection(), "unexpected error: {err}");
    }
}
