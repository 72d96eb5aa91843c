//! Backend connection seam
//!
//! Connection pooling lives outside this crate. A [`ConnectionProvider`]
//! hands out one [`Connection`] per series query; the connection is a guard
//! and is released when dropped, on success and error paths alike.
//!
//! [`StaticProvider`] is an in-memory provider returning canned rows and
//! recording every statement it receives.

use super::BackendError;
use crate::filter::SqlValue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One result row, cells in SELECT order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRow {
    values: Vec<SqlValue>,
}

impl SqlRow {
    /// Create a row
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    /// Cell at `index`
    pub fn get(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All cells
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

impl From<Vec<SqlValue>> for SqlRow {
    fn from(values: Vec<SqlValue>) -> Self {
        Self::new(values)
    }
}

/// An acquired database connection
pub trait Connection {
    /// Run a query with positional bind values
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>, BackendError>;
}

/// Source of connections, shared across requests
pub trait ConnectionProvider: Send + Sync {
    /// Acquire a connection for the duration of one request
    fn acquire(&self) -> Result<Box<dyn Connection + '_>, BackendError>;
}

/// A statement received by a [`StaticProvider`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    /// Statement text as executed
    pub sql: String,
    /// Bound values, in placeholder order
    pub params: Vec<SqlValue>,
}

#[derive(Debug, Default)]
struct Recorder {
    queries: Mutex<Vec<RecordedQuery>>,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// In-memory provider returning fixed rows
#[derive(Debug, Clone)]
pub struct StaticProvider {
    rows: Arc<Vec<SqlRow>>,
    failure: Option<String>,
    recorder: Arc<Recorder>,
}

impl StaticProvider {
    /// Answer every query with `rows`
    pub fn new(rows: Vec<SqlRow>) -> Self {
        Self {
            rows: Arc::new(rows),
            failure: None,
            recorder: Arc::new(Recorder::default()),
        }
    }

    /// Fail every query with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(Vec::new())
        }
    }

    /// Statements received so far
    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.recorder
            .queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    /// Connections currently held
    pub fn outstanding(&self) -> usize {
        self.recorder.acquired.load(Ordering::SeqCst) - self.recorder.released.load(Ordering::SeqCst)
    }

    /// Connections handed out so far
    pub fn acquired(&self) -> usize {
        self.recorder.acquired.load(Ordering::SeqCst)
    }
}

struct StaticConnection<'a> {
    provider: &'a StaticProvider,
}

impl Connection for StaticConnection<'_> {
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>, BackendError> {
        if let Ok(mut queries) = self.provider.recorder.queries.lock() {
            queries.push(RecordedQuery {
                sql: sql.to_string(),
                params: params.to_vec(),
            });
        }
        match &self.provider.failure {
            Some(message) => Err(message.clone().into()),
            None => Ok(self.provider.rows.as_ref().clone()),
        }
    }
}

impl Drop for StaticConnection<'_> {
    fn drop(&mut self) {
        self.provider.recorder.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl ConnectionProvider for StaticProvider {
    fn acquire(&self) -> Result<Box<dyn Connection + '_>, BackendError> {
        self.recorder.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StaticConnection { provider: self }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_and_releases() {
        let provider = StaticProvider::new(vec![SqlRow::new(vec![SqlValue::Int(1)])]);
        {
            let mut conn = provider.acquire().unwrap();
            assert_eq!(provider.outstanding(), 1);
            let rows = conn.query("SELECT ?", &[SqlValue::Int(7)]).unwrap();
            assert_eq!(rows.len(), 1);
        }
        assert_eq!(provider.outstanding(), 0);
        assert_eq!(provider.acquired(), 1);
        assert_eq!(
            provider.queries(),
            vec![RecordedQuery {
                sql: "SELECT ?".into(),
                params: vec![SqlValue::Int(7)],
            }]
        );
    }

    #[test]
    fn test_failing_provider() {
        let provider = StaticProvider::failing("connection reset");
        let mut conn = provider.acquire().unwrap();
        let err = conn.query("SELECT 1", &[]).unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }
}
