//! Property tests for the normalization percentage.

use proptest::prelude::*;

use stattab_model::CellValue;
use stattab_report::normalized_percentage;

proptest! {
    #[test]
    fn percentage_stays_within_bounds(
        min in -1.0e6f64..1.0e6,
        span in 1.0e-3f64..1.0e6,
        value in -2.0e6f64..2.0e6,
    ) {
        let max = min + span;
        let pct = normalized_percentage(&CellValue::Number(value), min, max);
        prop_assert!((0.0..=100.0).contains(&pct));
    }

    #[test]
    fn percentage_is_monotone(
        min in -1.0e6f64..1.0e6,
        span in 1.0e-3f64..1.0e6,
        a in -2.0e6f64..2.0e6,
        b in -2.0e6f64..2.0e6,
    ) {
        let max = min + span;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let pct_lo = normalized_percentage(&CellValue::Number(lo), min, max);
        let pct_hi = normalized_percentage(&CellValue::Number(hi), min, max);
        prop_assert!(pct_lo <= pct_hi);
    }

    #[test]
    fn values_outside_range_clamp_to_the_edges(
        min in -1.0e6f64..1.0e6,
        span in 1.0e-3f64..1.0e6,
        offset in 1.0e-3f64..1.0e6,
    ) {
        let max = min + span;
        let below = normalized_percentage(&CellValue::Number(min - offset), min, max);
        let above = normalized_percentage(&CellValue::Number(max + offset), min, max);
        prop_assert_eq!(below, 0.0);
        prop_assert_eq!(above, 100.0);
    }

    #[test]
    fn degenerate_range_is_always_zero(
        bound in -1.0e6f64..1.0e6,
        value in -2.0e6f64..2.0e6,
    ) {
        let pct = normalized_percentage(&CellValue::Number(value), bound, bound);
        prop_assert_eq!(pct, 0.0);
    }

    #[test]
    fn numeric_text_matches_number(
        min in -1.0e3f64..1.0e3,
        span in 1.0e-3f64..1.0e3,
        value in -2.0e3f64..2.0e3,
    ) {
        let max = min + span;
        let as_number = normalized_percentage(&CellValue::Number(value), min, max);
        let as_text = normalized_percentage(
            &CellValue::Text(format!("{value}")),
            min,
            max,
        );
        prop_assert_eq!(as_number, as_text);
    }
}
