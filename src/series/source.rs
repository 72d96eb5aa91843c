//! Series query orchestration
//!
//! [`DataSeriesSource`] runs the whole pipeline for one request: validate,
//! plan, execute on one acquired connection, rebuild bucket starts and
//! partition rows into series. It holds no mutable state, so one instance
//! serves any number of concurrent callers.

use super::assemble::group_points;
use super::backend::{ConnectionProvider, SqlRow};
use super::error::{AggregateValueError, RowShapeError};
use super::planner::{SeriesPlanner, SeriesStatement};
use super::point::{AccumPoint, GroupKey, GroupedTimeSeries};
use super::{BackendError, SeriesError, SeriesQueryRequest, SeriesResult};
use crate::resolution::{ConfigurationError, ResolutionFactory};
use crate::schema::DataSource;
use std::sync::Arc;
use std::time::Instant;

/// Time-series query engine over one data source
pub struct DataSeriesSource<P> {
    planner: SeriesPlanner,
    provider: P,
}

impl<P: ConnectionProvider> DataSeriesSource<P> {
    /// Create an engine, checking the schema and handler table first
    pub fn new(
        source: DataSource,
        factory: Arc<ResolutionFactory>,
        provider: P,
    ) -> Result<Self, ConfigurationError> {
        source.validate()?;
        factory.self_check()?;
        Ok(Self {
            planner: SeriesPlanner::new(source, factory),
            provider,
        })
    }

    /// Statement planner
    pub fn planner(&self) -> &SeriesPlanner {
        &self.planner
    }

    /// Connection provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Validate and build the statement without executing it
    pub fn build_statement(&self, request: &SeriesQueryRequest) -> SeriesResult<SeriesStatement> {
        self.planner.plan(request)
    }

    /// Run a series query.
    ///
    /// Series are ordered by first appearance of their grouping key; points
    /// within a series ascend by bucket start with no duplicate buckets.
    pub fn series_query(&self, request: &SeriesQueryRequest) -> SeriesResult<Vec<GroupedTimeSeries>> {
        let span = tracing::info_span!(
            "series_query",
            dialect = %request.dialect,
            unit = %request.resolution,
            accumulation = %request.accumulation,
        );
        let _enter = span.enter();
        let started = Instant::now();

        let statement = self.planner.plan(request)?;
        let rows = self.execute(&statement)?;
        let points = read_points(&statement, &rows).map_err(|source| {
            tracing::error!(error = %source, "Unexpected row layout");
            data_access(&statement, source)
        })?;
        let point_count = points.len();
        let series = group_points(points, request.aggregate);

        tracing::info!(
            rows = rows.len(),
            points = point_count,
            series = series.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Series query complete"
        );
        Ok(series)
    }

    /// Execute on a freshly acquired connection, released before returning
    fn execute(&self, statement: &SeriesStatement) -> SeriesResult<Vec<SqlRow>> {
        let result = self
            .provider
            .acquire()
            .and_then(|mut conn| conn.query(&statement.sql, &statement.params));

        result.map_err(|source| {
            tracing::error!(error = %source, sql = %statement.sql, "Series query failed");
            data_access(statement, source)
        })
    }
}

impl<P> std::fmt::Debug for DataSeriesSource<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSeriesSource")
            .field("planner", &self.planner)
            .finish_non_exhaustive()
    }
}

fn data_access(statement: &SeriesStatement, source: BackendError) -> SeriesError {
    SeriesError::DataAccess {
        dialect: statement.dialect,
        unit: statement.unit,
        sql: statement.sql.clone(),
        source,
    }
}

/// Convert rows laid out as `[grouping.., resolution.., aggregate]`
fn read_points(statement: &SeriesStatement, rows: &[SqlRow]) -> Result<Vec<AccumPoint>, BackendError> {
    let group_width = statement.grouping.len();
    let raw_end = group_width + statement.resolution_width();

    rows.iter()
        .enumerate()
        .map(|(index, row)| -> Result<AccumPoint, BackendError> {
            if row.len() != statement.column_count() {
                return Err(RowShapeError {
                    row: index,
                    found: row.len(),
                    expected: statement.column_count(),
                }
                .into());
            }
            let cells = row.values();

            let group_key: GroupKey = statement
                .grouping
                .iter()
                .cloned()
                .zip(cells[..group_width].iter().cloned())
                .collect();

            let raw: Vec<Option<i64>> = cells[group_width..raw_end]
                .iter()
                .map(|v| v.as_i64())
                .collect();
            if raw.iter().any(Option::is_none) {
                tracing::warn!(row = index, ?raw, "Building bucket from null raw values");
            }
            let bucket_start = statement.handler.build_kernel(&raw);

            let aggregate = &cells[raw_end];
            let value = if aggregate.is_null() {
                0.0
            } else {
                aggregate.as_f64().ok_or_else(|| AggregateValueError {
                    row: index,
                    value: aggregate.to_string(),
                })?
            };

            Ok(AccumPoint::new(bucket_start, group_key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::filter::{Filter, SqlValue};
    use crate::resolution::{ResolutionUnit, WeekStart};
    use crate::series::backend::StaticProvider;
    use crate::series::planner::tests::{range, visits};
    use chrono::{NaiveDate, NaiveDateTime};

    fn month_start(year: i32, month: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn row(region: &str, year: i64, month: i64, value: f64) -> SqlRow {
        SqlRow::new(vec![
            region.into(),
            SqlValue::Int(year),
            SqlValue::Int(month),
            SqlValue::Float(value),
        ])
    }

    fn engine(provider: StaticProvider) -> DataSeriesSource<StaticProvider> {
        DataSeriesSource::new(
            visits(),
            Arc::new(ResolutionFactory::new(WeekStart::SUNDAY)),
            provider,
        )
        .unwrap()
    }

    fn monthly_by_region() -> SeriesQueryRequest {
        SeriesQueryRequest::builder("cases", range())
            .resolution(ResolutionUnit::Monthly)
            .group_by("region")
            .build()
    }

    #[test]
    fn test_two_groups_yield_two_sorted_series() {
        let provider = StaticProvider::new(vec![
            row("north", 2021, 3, 4.0),
            row("south", 2021, 1, 2.0),
            row("north", 2021, 1, 1.0),
            row("south", 2021, 2, 6.0),
            row("north", 2021, 2, 3.0),
        ]);
        let source = engine(provider.clone());

        let series = source.series_query(&monthly_by_region()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].group_key["region"], SqlValue::from("north"));
        assert_eq!(series[1].group_key["region"], SqlValue::from("south"));
        for s in &series {
            assert!(s.points.windows(2).all(|w| w[0].bucket_start < w[1].bucket_start));
        }
        assert_eq!(
            series[0].points.iter().map(|p| p.bucket_start).collect::<Vec<_>>(),
            vec![month_start(2021, 1), month_start(2021, 2), month_start(2021, 3)]
        );
        assert_eq!(series[1].total(), 8.0);
        assert_eq!(provider.outstanding(), 0);
        assert_eq!(provider.queries().len(), 1);
    }

    #[test]
    fn test_statement_and_params_reach_backend() {
        let provider = StaticProvider::new(Vec::new());
        let source = engine(provider.clone());
        let request = SeriesQueryRequest::builder("cases", range())
            .dialect(Dialect::Mysql)
            .resolution(ResolutionUnit::Monthly)
            .group_by("region")
            .filter(Filter::eq("region", "north"))
            .build();

        let expected = source.build_statement(&request).unwrap();
        let series = source.series_query(&request).unwrap();
        assert!(series.is_empty());

        let queries = provider.queries();
        assert_eq!(queries[0].sql, expected.sql);
        assert_eq!(
            queries[0].params,
            vec![
                SqlValue::from("north"),
                SqlValue::Timestamp(range().start),
                SqlValue::Timestamp(range().end),
            ]
        );
    }

    #[test]
    fn test_validation_happens_before_acquire() {
        let provider = StaticProvider::new(Vec::new());
        let source = engine(provider.clone());
        let request = SeriesQueryRequest::builder("cases", range())
            .filter(Filter::any_of("region", Vec::new()))
            .build();

        let err = source.series_query(&request).unwrap_err();
        assert!(err.is_pre_execution());
        assert_eq!(provider.acquired(), 0);
    }

    #[test]
    fn test_backend_failure_is_data_access() {
        let provider = StaticProvider::failing("connection refused");
        let source = engine(provider.clone());

        let err = source.series_query(&monthly_by_region()).unwrap_err();
        match &err {
            SeriesError::DataAccess { dialect, unit, sql, .. } => {
                assert_eq!(*dialect, Dialect::Pgsql);
                assert_eq!(*unit, ResolutionUnit::Monthly);
                assert!(sql.starts_with("SELECT region"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(provider.acquired(), 1);
        assert_eq!(provider.outstanding(), 0);
    }

    #[test]
    fn test_malformed_rows_rejected() {
        let provider = StaticProvider::new(vec![SqlRow::new(vec![SqlValue::Int(2021)])]);
        let err = engine(provider.clone())
            .series_query(&monthly_by_region())
            .unwrap_err();
        assert!(err.to_string().contains("row 0 has 1 columns, expected 4"));
        assert_eq!(provider.outstanding(), 0);

        let provider = StaticProvider::new(vec![SqlRow::new(vec![
            "north".into(),
            SqlValue::Int(2021),
            SqlValue::Int(1),
            SqlValue::from("lots"),
        ])]);
        let err = engine(provider).series_query(&monthly_by_region()).unwrap_err();
        assert!(matches!(err, SeriesError::DataAccess { .. }));
    }

    #[test]
    fn test_null_values_default_and_merge() {
        let provider = StaticProvider::new(vec![
            SqlRow::new(vec!["north".into(), SqlValue::Null, SqlValue::Null, SqlValue::Int(2)]),
            SqlRow::new(vec!["north".into(), SqlValue::Int(0), SqlValue::Null, SqlValue::Int(3)]),
            row("north", 2021, 1, 1.0),
            SqlRow::new(vec!["north".into(), SqlValue::Int(2021), SqlValue::Int(2), SqlValue::Null]),
        ]);
        let series = engine(provider).series_query(&monthly_by_region()).unwrap();

        assert_eq!(series.len(), 1);
        let points = &series[0].points;
        assert_eq!(points.len(), 3);
        // Both null-month rows land on year 0, January
        assert_eq!(points[0].bucket_start, month_start(0, 1));
        assert_eq!(points[0].value, 5.0);
        assert_eq!(points[2].value, 0.0);
    }

    #[test]
    fn test_invalid_schema_rejected_at_construction() {
        let result = DataSeriesSource::new(
            DataSource::new("visits", "visit_date"),
            Arc::new(ResolutionFactory::default()),
            StaticProvider::new(Vec::new()),
        );
        assert!(matches!(result, Err(ConfigurationError::InvalidSchema(_))));
    }

    #[test]
    fn test_shared_across_threads() {
        let provider = StaticProvider::new(vec![row("north", 2021, 1, 1.0)]);
        let source = Arc::new(engine(provider.clone()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let source = Arc::clone(&source);
                std::thread::spawn(move || source.series_query(&monthly_by_region()).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().len(), 1);
        }
        assert_eq!(provider.acquired(), 4);
        assert_eq!(provider.outstanding(), 0);
    }
}
