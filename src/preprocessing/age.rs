//! Age coercion and plausibility bounds

use polars::prelude::*;

/// Youngest plausible respondent age (inclusive)
pub const MIN_AGE: i64 = 15;
/// Oldest plausible respondent age (inclusive)
pub const MAX_AGE: i64 = 100;

/// Coerce a raw cell to an age in `[MIN_AGE, MAX_AGE]`.
///
/// Integers pass through, finite floats are truncated toward zero and text is
/// parsed as a base-10 integer after trimming. Anything else, or any value
/// outside the bounds, is treated as missing. Never fails.
pub fn normalize_age(value: &AnyValue) -> Option<i64> {
    let age = match value {
        AnyValue::Int8(v) => Some(*v as i64),
        AnyValue::Int16(v) => Some(*v as i64),
        AnyValue::Int32(v) => Some(*v as i64),
        AnyValue::Int64(v) => Some(*v),
        AnyValue::UInt8(v) => Some(*v as i64),
        AnyValue::UInt16(v) => Some(*v as i64),
        AnyValue::UInt32(v) => Some(*v as i64),
        AnyValue::UInt64(v) => i64::try_from(*v).ok(),
        AnyValue::Float32(v) => truncate(*v as f64),
        AnyValue::Float64(v) => truncate(*v),
        AnyValue::String(s) => parse_text(s),
        AnyValue::StringOwned(s) => parse_text(s.as_str()),
        _ => None,
    }?;

    (MIN_AGE..=MAX_AGE).contains(&age).then_some(age)
}

fn truncate(v: f64) -> Option<i64> {
    v.is_finite().then(|| v.trunc() as i64)
}

fn parse_text(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

/// Apply [`normalize_age`] to every cell, producing a nullable Int64 series
/// under the same name.
pub fn normalize_age_column(column: &Column) -> PolarsResult<Series> {
    let values = (0..column.len())
        .map(|i| column.get(i).map(|v| normalize_age(&v)))
        .collect::<PolarsResult<Vec<Option<i64>>>>()?;

    Ok(Series::new(column.name().clone(), values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        assert_eq!(normalize_age(&AnyValue::Int64(15)), Some(15));
        assert_eq!(normalize_age(&AnyValue::Int64(100)), Some(100));
        assert_eq!(normalize_age(&AnyValue::Int64(14)), None);
        assert_eq!(normalize_age(&AnyValue::Int64(101)), None);
    }

    #[test]
    fn test_implausible_values_are_missing() {
        for raw in [-1726_i64, -29, -1, 0, 5, 8, 11, 329, 99_999_999_999] {
            assert_eq!(normalize_age(&AnyValue::Int64(raw)), None, "age {raw}");
        }
    }

    #[test]
    fn test_every_valid_age_is_kept() {
        for a in MIN_AGE..=MAX_AGE {
            assert_eq!(normalize_age(&AnyValue::Int64(a)), Some(a));
        }
    }

    #[test]
    fn test_idempotent_on_valid_integers() {
        for a in [15_i64, 32, 72, 100] {
            let once = normalize_age(&AnyValue::Int64(a)).unwrap();
            let twice = normalize_age(&AnyValue::Int64(once)).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_text_and_float_coercion() {
        assert_eq!(normalize_age(&AnyValue::String(" 27 ")), Some(27));
        assert_eq!(normalize_age(&AnyValue::String("27.5")), None);
        assert_eq!(normalize_age(&AnyValue::String("old")), None);
        assert_eq!(normalize_age(&AnyValue::Float64(31.9)), Some(31));
        assert_eq!(normalize_age(&AnyValue::Float64(f64::NAN)), None);
        assert_eq!(normalize_age(&AnyValue::Null), None);
        assert_eq!(normalize_age(&AnyValue::Boolean(true)), None);
    }

    #[test]
    fn test_normalize_age_column() {
        let column = Column::new("Age".into(), &[Some(25_i64), Some(-3), None, Some(400), Some(61)]);
        let series = normalize_age_column(&column).unwrap();

        assert_eq!(series.name().as_str(), "Age");
        assert_eq!(series.dtype(), &DataType::Int64);
        let values: Vec<Option<i64>> = series.i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(25), None, None, None, Some(61)]);
    }
}
