//! Normalization Utilities
//!
//! Min-max rescaling of raw factor fields, either onto [0, 1] for score
//! fusion or onto a fixed physical band for display.
//!
//! Algorithm:
//! 1. unit = (raw - min) / (max - min), min/max taken over the field itself
//! 2. If the factor is lower-is-better: unit = 1 - unit
//! 3. With a fixed range (lo, hi): value = lo + unit × (hi - lo)
//!
//! Degenerate policy: when max == min (an all-zero field from a factor with
//! no sources, or any constant field) the field carries no spatial
//! information and normalizes to all-zero. This is a documented state, not
//! an error, and no inversion or range mapping is applied to it.

use crate::field::{Field, FieldKind};

/// (min, max) over the finite values of `values`
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Rescale `field` by its own min and max
///
/// Returns a `Display` field when `fixed_range` is given, otherwise a
/// `Normalized` field in [0, 1].
pub fn normalize_field(
    field: &Field,
    higher_is_better: bool,
    fixed_range: Option<(f64, f64)>,
) -> Field {
    let kind = if fixed_range.is_some() {
        FieldKind::Display
    } else {
        FieldKind::Normalized
    };

    let span = match finite_range(field.values.cells()) {
        Some((min, max)) if max > min => Some((min, max)),
        _ => None,
    };

    let Some((min, max)) = span else {
        tracing::debug!(
            "Degenerate {} field (all values equal) normalized to zeros",
            field.factor
        );
        return Field::new(field.factor, kind, field.values.map(|_| 0.0));
    };

    let width = max - min;
    let values = field.values.map(|&raw| {
        // NaN carries no value and sits at the floor; ±inf saturates before inversion
        let unit = if raw.is_nan() {
            0.0
        } else if higher_is_better {
            ((raw - min) / width).clamp(0.0, 1.0)
        } else {
            ((max - raw) / width).clamp(0.0, 1.0)
        };
        match fixed_range {
            Some((lo, hi)) => lo + unit * (hi - lo),
            None => unit,
        }
    });

    Field::new(field.factor, kind, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::Factor;
    use crate::grid::Raster;
    use approx::assert_relative_eq;

    fn field(values: Vec<Vec<f64>>) -> Field {
        Field::new(Factor::Water, FieldKind::Raw, Raster::try_from(values).unwrap())
    }

    #[test]
    fn test_unit_normalization() {
        let f = field(vec![vec![2.0, 4.0], vec![6.0, 10.0]]);
        let n = normalize_field(&f, true, None);

        assert_eq!(n.kind, FieldKind::Normalized);
        assert_relative_eq!(n.get(0, 0).unwrap(), 0.0);
        assert_relative_eq!(n.get(0, 1).unwrap(), 0.25);
        assert_relative_eq!(n.get(1, 0).unwrap(), 0.5);
        assert_relative_eq!(n.get(1, 1).unwrap(), 1.0);
    }

    #[test]
    fn test_inversion_for_lower_is_better() {
        let f = field(vec![vec![0.0, 5.0], vec![10.0, 2.5]]);
        let n = normalize_field(&f, false, None);

        assert_relative_eq!(n.get(0, 0).unwrap(), 1.0);
        assert_relative_eq!(n.get(0, 1).unwrap(), 0.5);
        assert_relative_eq!(n.get(1, 0).unwrap(), 0.0);
        assert_relative_eq!(n.get(1, 1).unwrap(), 0.75);
    }

    #[test]
    fn test_fixed_range_display() {
        let f = field(vec![vec![1.0, 2.0], vec![3.0, 5.0]]);
        let d = normalize_field(&f, true, Some((4.5, 6.5)));

        assert_eq!(d.kind, FieldKind::Display);
        assert_eq!(d.range(), Some((4.5, 6.5)));
        assert_relative_eq!(d.get(0, 1).unwrap(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_fields_become_zero() {
        for value in [0.0, 3.7] {
            let f = field(vec![vec![value; 3]; 3]);
            for (hib, range) in [(true, None), (false, None), (true, Some((4.5, 6.5)))] {
                let n = normalize_field(&f, hib, range);
                assert!(n.values.cells().iter().all(|&v| v == 0.0));
            }
        }
    }

    #[test]
    fn test_renormalization_is_idempotent() {
        let f = field(vec![vec![0.3, 1.9, 7.2], vec![4.4, 0.1, 2.0], vec![9.9, 5.5, 3.3]]);
        let once = normalize_field(&f, true, None);
        let twice = normalize_field(&once, true, None);

        for (a, b) in once.values.cells().iter().zip(twice.values.cells()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_non_finite_cells_ignored_for_range() {
        let f = field(vec![vec![1.0, f64::NAN], vec![3.0, 2.0]]);
        let n = normalize_field(&f, true, None);

        assert_relative_eq!(n.get(1, 0).unwrap(), 1.0);
        assert_eq!(n.get(0, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_overflowed_cells_saturate() {
        let f = field(vec![vec![1.0, f64::INFINITY], vec![3.0, f64::NEG_INFINITY]]);

        let n = normalize_field(&f, true, None);
        assert_eq!(n.get(0, 1), Some(1.0));
        assert_eq!(n.get(1, 1), Some(0.0));

        let inverted = normalize_field(&f, false, None);
        assert_eq!(inverted.get(0, 1), Some(0.0));
        assert_eq!(inverted.get(1, 1), Some(1.0));

        let display = normalize_field(&f, true, Some((4.5, 6.5)));
        assert_eq!(display.get(0, 1), Some(6.5));
    }
}
