//! Picking bucket sizes from the width of the filtered range

use super::bucket::Bucket;
use crate::data_cube::{Dimension, DimensionKind};
use crate::time::{Duration, DurationUnit};

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;
const NUMBER_BUCKET_COUNT: f64 = 10.0;
const DEFAULT_NUMBER_BUCKET: f64 = 10.0;

/// Best time bucket for a filtered window of `span_ms` milliseconds
pub fn best_time_bucket(span_ms: i64, dimension: &Dimension) -> Bucket {
    let ideal = if span_ms > 95 * DAY_MS {
        Duration::of(1, DurationUnit::Week)
    } else if span_ms > 8 * DAY_MS {
        Duration::of(1, DurationUnit::Day)
    } else if span_ms > 8 * HOUR_MS {
        Duration::of(1, DurationUnit::Hour)
    } else {
        Duration::of(1, DurationUnit::Minute)
    };
    constrain(Bucket::Duration(ideal), dimension)
}

/// Best number bucket for a filtered range `span` wide
pub fn best_number_bucket(span: f64, dimension: &Dimension) -> Bucket {
    let per_bucket = span / NUMBER_BUCKET_COUNT;
    let ideal = if per_bucket.is_finite() && per_bucket > 0.0 {
        10f64.powi(per_bucket.log10().floor() as i32)
    } else {
        1.0
    };
    constrain(Bucket::Number(ideal), dimension)
}

/// Bucket used when no range clause constrains the dimension
pub fn default_bucket(dimension: &Dimension) -> Option<Bucket> {
    let ideal = match dimension.kind {
        DimensionKind::Time => Bucket::Duration(Duration::of(1, DurationUnit::Day)),
        DimensionKind::Number => Bucket::Number(DEFAULT_NUMBER_BUCKET),
        DimensionKind::String | DimensionKind::Boolean => return None,
    };
    Some(constrain(ideal, dimension))
}

/// Snap to the dimension's declared granularities and never go finer than
/// its pre-bucketing
fn constrain(ideal: Bucket, dimension: &Dimension) -> Bucket {
    let mut bucket = ideal;
    if let Some(granularities) = dimension
        .granularities
        .as_ref()
        .filter(|g| !g.is_empty())
    {
        bucket = granularities
            .iter()
            .find(|g| g.magnitude() >= ideal.magnitude())
            .or_else(|| granularities.last())
            .copied()
            .unwrap_or(ideal);
    }
    match dimension.bucketed_by {
        Some(floor) if floor.magnitude() > bucket.magnitude() => floor,
        _ => bucket,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_cube::BucketingStrategy;

    fn dimension(kind: DimensionKind) -> Dimension {
        Dimension {
            name: "d".to_string(),
            title: None,
            kind,
            bucketing_strategy: BucketingStrategy::DefaultBucket,
            granularities: None,
            bucketed_by: None,
            sort_strategy: None,
        }
    }

    fn duration(s: &str) -> Bucket {
        Bucket::Duration(s.parse().unwrap())
    }

    #[test]
    fn test_time_thresholds() {
        let time = dimension(DimensionKind::Time);
        assert_eq!(best_time_bucket(HOUR_MS, &time), duration("PT1M"));
        assert_eq!(best_time_bucket(DAY_MS, &time), duration("PT1H"));
        assert_eq!(best_time_bucket(10 * DAY_MS, &time), duration("P1D"));
        assert_eq!(best_time_bucket(365 * DAY_MS, &time), duration("P1W"));
    }

    #[test]
    fn test_time_granularities_snap_up() {
        let mut time = dimension(DimensionKind::Time);
        time.granularities = Some(vec![duration("PT5M"), duration("PT6H"), duration("P1D")]);
        assert_eq!(best_time_bucket(HOUR_MS, &time), duration("PT5M"));
        assert_eq!(best_time_bucket(DAY_MS, &time), duration("PT6H"));
        // nothing coarse enough: take the coarsest declared
        assert_eq!(best_time_bucket(365 * DAY_MS, &time), duration("P1D"));
    }

    #[test]
    fn test_bucketed_by_is_a_floor() {
        let mut time = dimension(DimensionKind::Time);
        time.bucketed_by = Some(duration("PT1H"));
        assert_eq!(best_time_bucket(HOUR_MS, &time), duration("PT1H"));
        assert_eq!(best_time_bucket(10 * DAY_MS, &time), duration("P1D"));
    }

    #[test]
    fn test_number_buckets() {
        let number = dimension(DimensionKind::Number);
        assert_eq!(best_number_bucket(1000.0, &number), Bucket::Number(100.0));
        assert_eq!(best_number_bucket(250.0, &number), Bucket::Number(10.0));
        assert_eq!(best_number_bucket(0.0, &number), Bucket::Number(1.0));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_bucket(&dimension(DimensionKind::Time)), Some(duration("P1D")));
        assert_eq!(default_bucket(&dimension(DimensionKind::Number)), Some(Bucket::Number(10.0)));
        assert_eq!(default_bucket(&dimension(DimensionKind::String)), None);
    }
}
