//! Shared proptest strategies for unit tests.

use proptest::prelude::*;

/// Words the boolean coercion accepts, with the value each maps to.
pub(crate) fn arb_bool_word() -> impl Strategy<Value = (String, bool)> {
    let words = prop_oneof![
        Just(("true", true)),
        Just(("t", true)),
        Just(("yes", true)),
        Just(("y", true)),
        Just(("on", true)),
        Just(("1", true)),
        Just(("false", false)),
        Just(("f", false)),
        Just(("no", false)),
        Just(("n", false)),
        Just(("off", false)),
        Just(("0", false)),
    ];
    (words, any::<bool>()).prop_map(|((word, value), upper)| {
        let word = if upper {
            word.to_ascii_uppercase()
        } else {
            word.to_string()
        };
        (word, value)
    })
}

/// Text that is not a decimal integer.
pub(crate) fn arb_non_integer_text() -> impl Strategy<Value = String> {
    "[a-zA-Z.,_ ]{1,12}".prop_filter("must not parse as i64", |s| s.trim().parse::<i64>().is_err())
}
