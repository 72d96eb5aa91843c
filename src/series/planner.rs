//! Series statement planning
//!
//! Turns a [`SeriesQueryRequest`] into one grouped, aggregated SELECT:
//!
//! ```text
//! SELECT <grouping dims>, <resolution columns>, AGG(<accumulation>) AS accumulated
//! FROM <table>
//! WHERE <filters> AND <date> BETWEEN <start> AND <end>
//! GROUP BY <grouping dims>, <resolution columns>
//! ORDER BY <grouping dims [dir]>, <resolution columns ASC>
//! ```
//!
//! Everything the request references is checked before any SQL is built.

use super::{SeriesQueryRequest, SeriesResult};
use crate::dialect::Dialect;
use crate::filter::{
    compile, validate, Filter, OrderFilter, Placeholders, SortDirection, SqlValue,
    ValidationError,
};
use crate::resolution::{
    validate_timezone, ConfigurationError, ResolutionFactory, ResolutionHandler, ResolutionUnit,
};
use crate::schema::{DataSource, Dimension, DimensionRole};
use std::collections::HashMap;
use std::sync::Arc;

/// Alias of the aggregate column
pub const ACCUMULATED_ALIAS: &str = "accumulated";

/// A built series statement and the row layout it produces
#[derive(Debug, Clone)]
pub struct SeriesStatement {
    /// SQL text with dialect placeholders
    pub sql: String,
    /// Bind values, in placeholder order
    pub params: Vec<SqlValue>,
    /// Dialect the SQL is written for
    pub dialect: Dialect,
    /// Bucket size
    pub unit: ResolutionUnit,
    /// Grouping dimension ids, in SELECT order
    pub grouping: Vec<String>,
    /// Handler that rebuilds bucket starts from the resolution columns
    pub handler: Arc<dyn ResolutionHandler>,
}

impl SeriesStatement {
    /// Number of resolution columns following the grouping columns
    pub fn resolution_width(&self) -> usize {
        self.unit.raw_width()
    }

    /// Columns every result row must carry
    pub fn column_count(&self) -> usize {
        self.grouping.len() + self.resolution_width() + 1
    }
}

/// References of a request, resolved against the schema
struct Resolved<'a> {
    predicates: Vec<(Filter, &'a Dimension)>,
    grouping: Vec<(&'a Dimension, SortDirection)>,
    accumulation: &'a Dimension,
    date: &'a Dimension,
    timezone: Option<&'a str>,
}

/// Builds series statements for one data source
#[derive(Debug, Clone)]
pub struct SeriesPlanner {
    source: DataSource,
    factory: Arc<ResolutionFactory>,
}

impl SeriesPlanner {
    /// Create a planner
    pub fn new(source: DataSource, factory: Arc<ResolutionFactory>) -> Self {
        Self { source, factory }
    }

    /// Data source queried
    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Handler table
    pub fn factory(&self) -> &Arc<ResolutionFactory> {
        &self.factory
    }

    /// Validate the request and build its statement
    pub fn plan(&self, request: &SeriesQueryRequest) -> SeriesResult<SeriesStatement> {
        let resolved = self.resolve_request(request)?;
        let handler = self.factory.resolve(request.dialect, request.resolution)?;

        let mut placeholders = Placeholders::new(request.dialect);
        let mut select = Vec::new();
        let mut group_by = Vec::new();
        let mut order_by = Vec::new();

        for (dim, direction) in &resolved.grouping {
            select.push(dim.column.clone());
            group_by.push(dim.column.clone());
            let order = OrderFilter {
                id: dim.id.clone(),
                direction: *direction,
            };
            order_by.push(order.compile(&dim.column));
        }

        let resolution = handler.grouping_columns(&resolved.date.column, resolved.timezone);
        for column in &resolution {
            select.push(column.clone());
            group_by.push(column.clone());
            order_by.push(format!("{} {}", column, SortDirection::Ascending.keyword()));
        }

        select.push(format!(
            "{} AS {}",
            request.aggregate.render(&resolved.accumulation.column),
            ACCUMULATED_ALIAS
        ));

        let mut conditions = Vec::new();
        let mut params = Vec::new();
        for (filter, dim) in &resolved.predicates {
            let predicate = compile(filter, &dim.column, &mut placeholders)?;
            conditions.push(predicate.sql);
            params.extend(predicate.params);
        }

        let bound = Filter::between(
            resolved.date.id.clone(),
            request.date_range.start,
            request.date_range.end,
        );
        let predicate = compile(&bound, &resolved.date.column, &mut placeholders)?;
        conditions.push(predicate.sql);
        params.extend(predicate.params);

        let sql = format!(
            "SELECT {} FROM {} WHERE {} GROUP BY {} ORDER BY {}",
            select.join(", "),
            self.source.table,
            conditions.join(" AND "),
            group_by.join(", "),
            order_by.join(", "),
        );

        tracing::debug!(
            dialect = %request.dialect,
            unit = %request.resolution,
            params = params.len(),
            sql = %sql,
            "Built series statement"
        );

        Ok(SeriesStatement {
            sql,
            params,
            dialect: request.dialect,
            unit: request.resolution,
            grouping: resolved.grouping.iter().map(|(d, _)| d.id.clone()).collect(),
            handler,
        })
    }

    fn dimension(&self, id: &str) -> Result<&Dimension, ValidationError> {
        self.source
            .get(id)
            .ok_or_else(|| ValidationError::UnknownDimension {
                dimension_id: id.to_string(),
            })
    }

    fn with_role(&self, id: &str, role: DimensionRole) -> Result<&Dimension, ValidationError> {
        let dim = self.dimension(id)?;
        if dim.has_role(role) {
            Ok(dim)
        } else {
            Err(ValidationError::MissingRole {
                dimension_id: id.to_string(),
                role: role.name(),
            })
        }
    }

    fn resolve_request<'a>(
        &'a self,
        request: &'a SeriesQueryRequest,
    ) -> SeriesResult<Resolved<'a>> {
        let grouping_ids = request.distinct_grouping();

        // Filters first, in request order
        let mut predicates = Vec::new();
        let mut directions: HashMap<&str, SortDirection> = HashMap::new();
        for filter in &request.filters {
            let dim = self.dimension(&filter.id)?;
            if filter.relation.is_ordering() {
                validate(filter, &dim.relations, dim.nullable)?;
                if !grouping_ids.contains(&filter.id.as_str()) {
                    return Err(ValidationError::OrderingOnNonGrouping {
                        filter_id: filter.id.clone(),
                    }
                    .into());
                }
                if let Some(order) = OrderFilter::from_filter(filter) {
                    directions.insert(filter.id.as_str(), order.direction);
                }
            } else {
                let dim = self.with_role(&filter.id, DimensionRole::Filter)?;
                validate(filter, &dim.relations, dim.nullable)?;
                predicates.push((dim.coerce_filter(filter), dim));
            }
        }

        let mut grouping = Vec::with_capacity(grouping_ids.len());
        for id in grouping_ids {
            let dim = self.with_role(id, DimensionRole::Grouping)?;
            let direction = directions.get(id).copied().unwrap_or_default();
            grouping.push((dim, direction));
        }

        let accumulation = self.with_role(&request.accumulation, DimensionRole::Accumulation)?;

        if !request.date_range.is_ordered() {
            return Err(ValidationError::InvalidDateRange {
                start: request.date_range.start.to_string(),
                end: request.date_range.end.to_string(),
            }
            .into());
        }

        let timezone = request.effective_timezone();
        if let Some(tz) = timezone {
            validate_timezone(tz)?;
        }

        let date = self.source.date().ok_or_else(|| {
            ConfigurationError::InvalidSchema(format!(
                "date dimension '{}' is not defined",
                self.source.date_dimension
            ))
        })?;

        Ok(Resolved {
            predicates,
            grouping,
            accumulation,
            date,
            timezone,
        })
    }
}
