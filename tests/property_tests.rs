//! Property tests for field pipelines.
//!
//! These check the boundary and ordering rules over generated inputs rather
//! than hand-picked examples.

use form_core::{
    DeclareField, FloatField, IntField, ListField, RawField, RequestAdapter, ScalarType, Source,
    StringField, ValidationErrorKind, Value,
};
use proptest::prelude::*;

// Strategy: (min, max) with min <= max
fn arb_bounds() -> impl Strategy<Value = (i64, i64)> {
    (-1_000i64..1_000, 0i64..500).prop_map(|(min, span)| (min, min + span))
}

proptest! {
    /// Property: an inclusive integer range accepts exactly [min, max]
    #[test]
    fn proptest_int_range_is_exact(
        (min, max) in arb_bounds(),
        n in -2_000i64..2_000,
    ) {
        let field = IntField::new().min_value(min).max_value(max).build().unwrap();
        let result = field.process(n.to_string());

        if n < min {
            prop_assert_eq!(result.unwrap_err().kind(), ValidationErrorKind::MinValue);
        } else if n > max {
            prop_assert_eq!(result.unwrap_err().kind(), ValidationErrorKind::MaxValue);
        } else {
            prop_assert_eq!(result, Ok(Value::Int(n)));
        }
    }

    /// Property: exclusive bounds reject the bound itself and nothing inside
    #[test]
    fn proptest_exclusive_bounds_reject_edges(
        (min, max) in arb_bounds(),
        n in -2_000i64..2_000,
    ) {
        let field = IntField::new()
            .min_value(min)
            .max_value(max)
            .inclusive_min(false)
            .inclusive_max(false)
            .build()
            .unwrap();

        let accepted = field.process(n).is_ok();
        prop_assert_eq!(accepted, n > min && n < max);
    }

    /// Property: string length bounds count characters, not bytes
    #[test]
    fn proptest_string_length_counts_chars(
        text in "[a-zé€]{0,12}",
        min in 0usize..6,
        extra in 0usize..6,
    ) {
        let max = min + extra;
        let field = StringField::new().min_length(min).max_length(max).build().unwrap();
        let len = text.chars().count();

        let result = field.process(text.clone());
        if len < min {
            prop_assert_eq!(result.unwrap_err().kind(), ValidationErrorKind::MinLength);
        } else if len > max {
            prop_assert_eq!(result.unwrap_err().kind(), ValidationErrorKind::MaxLength);
        } else {
            prop_assert_eq!(result, Ok(Value::Str(text)));
        }
    }

    /// Property: a list keeps element order and converts every element
    #[test]
    fn proptest_list_preserves_order(items in prop::collection::vec(-10_000i64..10_000, 1..20)) {
        let raw = items.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
        let field = ListField::new(ScalarType::Integer).build().unwrap();

        prop_assert_eq!(field.process(raw), Ok(Value::from(items)));
    }

    /// Property: the first bad element is the one reported
    #[test]
    fn proptest_list_reports_first_bad_element(
        items in prop::collection::vec(0i64..100, 1..10),
        bad_at in 0usize..10,
    ) {
        let bad_at = bad_at % items.len();
        let mut parts: Vec<String> = items.iter().map(i64::to_string).collect();
        parts[bad_at] = "nope".to_string();

        let field = ListField::new(ScalarType::Integer).declare("l").unwrap();
        let err = field.process(parts.join(",")).unwrap_err();
        prop_assert_eq!(err.field(), format!("l[{bad_at}]"));
    }

    /// Property: float coercion accepts any finite decimal it printed
    #[test]
    fn proptest_float_parses_displayed_value(x in -1.0e9f64..1.0e9) {
        let field = FloatField::new().build().unwrap();
        prop_assert_eq!(field.process(x.to_string()), Ok(Value::Float(x)));
    }

    /// Property: resolution never panics on arbitrary query input
    #[test]
    fn proptest_resolution_never_panics(raw in ".{0,40}") {
        let mut request = RequestAdapter::new("req-prop".to_string());
        request.add_query_param("v".to_string(), raw.clone());

        let fields = [
            IntField::new().source(Source::Query).min_value(0).build(),
            FloatField::new().source(Source::Query).max_value(1.0).build(),
            StringField::new().source(Source::Query).max_length(8).build(),
            ListField::new(ScalarType::Boolean).source(Source::Query).build(),
        ];
        for field in fields {
            let field = field.unwrap().declare("v").unwrap();
            let _ = field.resolve(&request);
        }
    }

    /// Property: raw fields hand back exactly what was sent
    #[test]
    fn proptest_raw_field_passes_text_through(raw in "[^,]{1,20}") {
        let mut request = RequestAdapter::new("req-raw".to_string());
        request.add_query_param("r".to_string(), raw.clone());

        let field = RawField::new().source(Source::Query).declare("r").unwrap();
        prop_assert_eq!(field.resolve(&request), Ok(Value::Str(raw)));
    }
}
