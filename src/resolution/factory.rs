//! Resolution handler dispatch table
//!
//! Maps (dialect, unit) to a shared handler. The table is built once and
//! never mutated, so a single factory can be shared behind an `Arc` by any
//! number of concurrent requests without locking.

use super::epiweek::WeekStart;
use super::{
    ConfigurationError, MysqlHandler, PgsqlHandler, ResolutionHandler, ResolutionUnit,
};
use crate::dialect::Dialect;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable (dialect, unit) → handler table
#[derive(Debug, Clone)]
pub struct ResolutionFactory {
    handlers: HashMap<(Dialect, ResolutionUnit), Arc<dyn ResolutionHandler>>,
    week_start: WeekStart,
}

impl ResolutionFactory {
    /// Register a handler for every supported pair
    pub fn new(week_start: WeekStart) -> Self {
        let handlers = Dialect::ALL
            .iter()
            .flat_map(|&dialect| {
                ResolutionUnit::ALL
                    .iter()
                    .map(move |&unit| handler_for(dialect, unit, week_start))
            })
            .collect::<Vec<_>>();
        Self::with_handlers(week_start, handlers)
    }

    /// Build from an explicit handler list, keyed by each handler's own
    /// dialect and category
    pub fn with_handlers(
        week_start: WeekStart,
        handlers: impl IntoIterator<Item = Arc<dyn ResolutionHandler>>,
    ) -> Self {
        let handlers = handlers
            .into_iter()
            .map(|h| ((h.dialect(), h.category()), h))
            .collect();
        Self {
            handlers,
            week_start,
        }
    }

    /// Week start used by the weekly handlers
    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Handler for the pair
    pub fn resolve(
        &self,
        dialect: Dialect,
        unit: ResolutionUnit,
    ) -> Result<Arc<dyn ResolutionHandler>, ConfigurationError> {
        self.handlers
            .get(&(dialect, unit))
            .cloned()
            .ok_or(ConfigurationError::MissingHandler { dialect, unit })
    }

    /// Handler for a dialect given by name
    pub fn resolve_named(
        &self,
        dialect: &str,
        unit: ResolutionUnit,
    ) -> Result<Arc<dyn ResolutionHandler>, ConfigurationError> {
        let parsed = Dialect::from_token(dialect).ok_or_else(|| {
            ConfigurationError::UnknownDialect {
                name: dialect.to_string(),
            }
        })?;
        self.resolve(parsed, unit)
    }

    /// Resolve, then build the kernel for raw grouped values
    pub fn build_kernel(
        &self,
        dialect: Dialect,
        unit: ResolutionUnit,
        raw: &[Option<i64>],
    ) -> Result<NaiveDateTime, ConfigurationError> {
        Ok(self.resolve(dialect, unit)?.build_kernel(raw))
    }

    /// Verify every pair is registered, serves its own unit and rebuilds the
    /// buckets it extracts
    pub fn self_check(&self) -> Result<(), ConfigurationError> {
        let probes: Vec<NaiveDateTime> = [(2013, 5, 27, 9), (2020, 12, 31, 23), (2021, 1, 1, 0)]
            .iter()
            .filter_map(|&(y, m, d, h)| NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(h, 17, 5))
            .collect();

        for dialect in Dialect::ALL {
            for unit in ResolutionUnit::ALL {
                let handler = self.resolve(dialect, unit)?;
                if handler.category() != unit {
                    return Err(ConfigurationError::CategoryMismatch {
                        dialect,
                        expected: unit,
                        found: handler.category(),
                    });
                }

                for &probe in &probes {
                    let raw: Vec<Option<i64>> =
                        handler.raw_values(probe).into_iter().map(Some).collect();
                    let kernel = handler.build_kernel(&raw);
                    let again: Vec<Option<i64>> =
                        handler.raw_values(kernel).into_iter().map(Some).collect();
                    if raw != again || kernel > probe {
                        return Err(ConfigurationError::KernelRoundTrip { dialect, unit });
                    }
                }
            }
        }

        tracing::debug!(
            handlers = self.handlers.len(),
            week_start = self.week_start.day(),
            "Resolution handler table verified"
        );
        Ok(())
    }
}

impl Default for ResolutionFactory {
    fn default() -> Self {
        Self::new(WeekStart::default())
    }
}

/// Exhaustive dialect dispatch
fn handler_for(
    dialect: Dialect,
    unit: ResolutionUnit,
    week_start: WeekStart,
) -> Arc<dyn ResolutionHandler> {
    match dialect {
        Dialect::Mysql => Arc::new(MysqlHandler::new(unit, week_start)),
        Dialect::Pgsql => Arc::new(PgsqlHandler::new(unit, week_start)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pair_resolves_to_its_unit() {
        let factory = ResolutionFactory::new(WeekStart::SUNDAY);
        for dialect in Dialect::ALL {
            for unit in ResolutionUnit::ALL {
                let handler = factory.resolve(dialect, unit).unwrap();
                assert_eq!(handler.category(), unit);
                assert_eq!(handler.dialect(), dialect);
            }
        }
    }

    #[test]
    fn test_self_check_passes_for_all_week_starts() {
        for day in 0..7 {
            let factory = ResolutionFactory::new(WeekStart::new(day).unwrap());
            assert!(factory.self_check().is_ok());
        }
    }

    #[test]
    fn test_monthly_kernel_identical_across_dialects() {
        let factory = ResolutionFactory::default();
        let raw = [Some(2021), Some(3)];

        let mysql = factory
            .build_kernel(Dialect::Mysql, ResolutionUnit::Monthly, &raw)
            .unwrap();
        let pgsql = factory
            .build_kernel(Dialect::Pgsql, ResolutionUnit::Monthly, &raw)
            .unwrap();

        assert_eq!(mysql, pgsql);
        assert_eq!(mysql.to_string(), "2021-03-01 00:00:00");
    }

    #[test]
    fn test_missing_handler_is_configuration_error() {
        let only_mysql_daily: Vec<Arc<dyn ResolutionHandler>> = vec![Arc::new(MysqlHandler::new(
            ResolutionUnit::Daily,
            WeekStart::SUNDAY,
        ))];
        let factory = ResolutionFactory::with_handlers(WeekStart::SUNDAY, only_mysql_daily);

        assert!(factory.resolve(Dialect::Mysql, ResolutionUnit::Daily).is_ok());
        assert_eq!(
            factory.resolve(Dialect::Pgsql, ResolutionUnit::Daily).unwrap_err(),
            ConfigurationError::MissingHandler {
                dialect: Dialect::Pgsql,
                unit: ResolutionUnit::Daily,
            }
        );
        assert!(factory
            .build_kernel(Dialect::Mysql, ResolutionUnit::Weekly, &[])
            .is_err());
        assert!(factory.self_check().is_err());
    }

    #[test]
    fn test_unknown_dialect_name() {
        let factory = ResolutionFactory::default();
        assert!(factory.resolve_named("PGSQL", ResolutionUnit::Yearly).is_ok());
        assert!(matches!(
            factory.resolve_named("sqlserver", ResolutionUnit::Yearly),
            Err(ConfigurationError::UnknownDialect { .. })
        ));
    }

    #[test]
    fn test_shared_across_threads() {
        let factory = Arc::new(ResolutionFactory::new(WeekStart::MONDAY));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let factory = Arc::clone(&factory);
                std::thread::spawn(move || {
                    let unit = ResolutionUnit::ALL[i % ResolutionUnit::ALL.len()];
                    factory.resolve(Dialect::Pgsql, unit).map(|h| h.category())
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let unit = handle.join().unwrap().unwrap();
            assert_eq!(unit, ResolutionUnit::ALL[i % ResolutionUnit::ALL.len()]);
        }
    }
}
