//! Partition flat points into per-group series

use super::point::{AccumPoint, GroupedTimeSeries, SeriesPoint};
use super::AggregateFunction;
use crate::filter::SqlValue;
use indexmap::IndexMap;

/// Group points by key.
///
/// Series appear in order of their key's first appearance; points within a
/// series ascend by bucket start. Points sharing a bucket within one series
/// are combined with `aggregate`'s merge rule.
pub fn group_points(points: Vec<AccumPoint>, aggregate: AggregateFunction) -> Vec<GroupedTimeSeries> {
    let mut groups: IndexMap<Vec<SqlValue>, GroupedTimeSeries> = IndexMap::new();

    for point in points {
        let identity: Vec<SqlValue> = point.group_key.values().cloned().collect();
        let series = groups.entry(identity).or_insert_with(|| GroupedTimeSeries {
            group_key: point.group_key.clone(),
            points: Vec::new(),
        });
        series.points.push(SeriesPoint {
            bucket_start: point.bucket_start,
            value: point.value,
        });
    }

    groups
        .into_values()
        .map(|mut series| {
            series.points.sort_by_key(|p| p.bucket_start);
            let before = series.points.len();
            series.points.dedup_by(|later, kept| {
                if later.bucket_start == kept.bucket_start {
                    kept.value = aggregate.merge(kept.value, later.value);
                    true
                } else {
                    false
                }
            });
            if series.points.len() < before {
                let merged = before - series.points.len();
                if aggregate.merge_is_exact() {
                    tracing::warn!(group = ?series.group_key, merged, "Merged duplicate buckets");
                } else {
                    tracing::warn!(
                        group = ?series.group_key,
                        merged,
                        aggregate = %aggregate,
                        approximate = true,
                        "Merged duplicate buckets; merged values are approximate"
                    );
                }
            }
            series
        })
        .collect()
}
