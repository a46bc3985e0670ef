use std::sync::Arc;

use form_core::{
    BoolField, ConfigurationError, ContextError, Error, FieldKind, FloatField, Form, IntField,
    ListField, RawField, RequestAdapter, ScalarType, Source, StringField, ValidationErrorKind,
    Value, current, request_scope,
};

fn basic_form() -> Arc<Form> {
    Form::builder("BasicForm")
        .field("a", IntField::new().source(Source::Query))
        .field("b", StringField::new().source(Source::Query))
        .field(
            "c",
            StringField::new()
                .source(Source::Query)
                .required(false)
                .default("default"),
        )
        .field("d", FloatField::new().source(Source::Query))
        .build()
        .expect("valid declaration")
}

fn query(qs: &str) -> RequestAdapter {
    RequestAdapter::new("req-it".to_string()).with_query_string(qs)
}

#[test]
fn basic_form_end_to_end() {
    let index = basic_form().wrap(|_: ()| -> Result<(i64, String, String, f64), Error> {
        let form = current();
        Ok((form.get("a")?, form.get("b")?, form.get("c")?, form.get("d")?))
    });

    let result = request_scope(query("a=10&b=hello&d=12.5"), || index(()));
    assert_eq!(
        result,
        Ok((10, "hello".to_string(), "default".to_string(), 12.5))
    );
}

#[test]
fn required_field_missing_is_reported_on_access() {
    let form = Form::builder("RequireForm")
        .field("r", StringField::new().source(Source::Query))
        .field("o", StringField::new().source(Source::Query).required(false))
        .build()
        .unwrap();

    let handler = form.wrap(|_: ()| (current().value("o"), current().value("r")));
    let (optional, required) = request_scope(query(""), || handler(()));

    assert_eq!(optional, Ok(Value::Null));
    let err = required.unwrap_err();
    assert_eq!(err.to_string(), "r is required");
}

#[test]
fn unaccessed_invalid_field_does_not_fail_the_handler() {
    let handler = basic_form().wrap(|_: ()| current().get::<String>("b"));
    let result = request_scope(query("a=notanumber&b=ok"), || handler(()));
    assert_eq!(result, Ok("ok".to_string()));
}

#[test]
fn size_form_bounds() {
    let form = Form::builder("SizeForm")
        .field(
            "s",
            IntField::new().source(Source::Query).min_value(5).max_value(10),
        )
        .field(
            "t",
            StringField::new()
                .source(Source::Query)
                .min_length(2)
                .max_length(4),
        )
        .build()
        .unwrap();
    let handler = form.wrap(|_: ()| (current().get::<i64>("s"), current().get::<String>("t")));

    let (s, t) = request_scope(query("s=5&t=ab"), || handler(()));
    assert_eq!((s, t), (Ok(5), Ok("ab".to_string())));

    let (s, t) = request_scope(query("s=10&t=abcd"), || handler(()));
    assert_eq!((s, t), (Ok(10), Ok("abcd".to_string())));

    let (s, t) = request_scope(query("s=4&t=abcde"), || handler(()));
    assert_eq!(
        s.unwrap_err().to_string(),
        "s is limited to min value 5 but actually is 4"
    );
    assert_eq!(
        t.unwrap_err().to_string(),
        "t is limited to max length 4 but actually is 5"
    );
}

#[test]
fn exclusive_bounds() {
    let form = Form::builder("Exclusive")
        .field(
            "x",
            FloatField::new()
                .source(Source::Query)
                .min_value(0.0)
                .max_value(1.0)
                .inclusive_min(false)
                .inclusive_max(false),
        )
        .build()
        .unwrap();

    let ok = query("x=0.5");
    assert_eq!(form.bind(&ok).get::<f64>("x"), Ok(0.5));

    for edge in ["x=0", "x=1"] {
        let request = query(edge);
        assert!(form.bind(&request).get::<f64>("x").is_err(), "{edge}");
    }
}

#[test]
fn list_form() {
    let form = Form::builder("ListForm")
        .field("ids", ListField::new(ScalarType::Integer).source(Source::Query))
        .field(
            "tags",
            ListField::new(StringField::new().max_length(3))
                .source(Source::Query)
                .required(false),
        )
        .build()
        .unwrap();
    let handler = form.wrap(|_: ()| {
        let ids = current().get::<Vec<i64>>("ids");
        let tags = current().get::<Option<Vec<String>>>("tags");
        (ids, tags)
    });

    let (ids, tags) = request_scope(query("ids=3,1,2&tags=a,bc"), || handler(()));
    assert_eq!(ids, Ok(vec![3, 1, 2]));
    assert_eq!(tags, Ok(Some(vec!["a".to_string(), "bc".to_string()])));

    let (ids, tags) = request_scope(query("ids=1,x"), || handler(()));
    let err = ids.unwrap_err();
    assert_eq!(err.as_validation().map(|e| e.field()), Some("ids[1]"));
    assert_eq!(tags, Ok(None));
}

#[test]
fn multi_valued_parameter_is_ambiguous() {
    let handler = basic_form().wrap(|_: ()| current().get::<i64>("a"));
    let err = request_scope(query("a=1&a=2"), || handler(())).unwrap_err();

    match err {
        Error::Ambiguous(err) => {
            assert_eq!(err.field(), "a");
            assert_eq!(err.origin(), Source::Query);
            assert_eq!(err.count(), 2);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn json_body_with_form_fallback() {
    let form = Form::builder("JsonForm")
        .field("name", StringField::new())
        .field("age", IntField::new().min_value(0))
        .field("admin", BoolField::new().required(false).default(false))
        .field("meta", RawField::new().required(false))
        .build()
        .unwrap();

    let mut json = RequestAdapter::new("req-json".to_string());
    json.set_json_body(r#"{"name": "ada", "age": 36, "admin": "yes", "meta": {"k": 1}}"#);
    let bound = form.bind(&json);
    assert_eq!(bound.get::<String>("name"), Ok("ada".to_string()));
    assert_eq!(bound.get::<i64>("age"), Ok(36));
    assert_eq!(bound.get::<bool>("admin"), Ok(true));
    assert_eq!(bound.value("meta").map(|v| v.kind_name()), Ok("object"));

    let body = RequestAdapter::new("req-form".to_string()).with_form_body("name=bob&age=7");
    let bound = form.bind(&body);
    assert_eq!(bound.get::<String>("name"), Ok("bob".to_string()));
    assert_eq!(bound.get::<i64>("age"), Ok(7));
    assert_eq!(bound.get::<bool>("admin"), Ok(false));
}

#[test]
fn body_source_reads_form_encoded_values() {
    let form = Form::builder("BodyForm")
        .field("q", StringField::new().source_named("form"))
        .build()
        .unwrap();
    let request = RequestAdapter::default().with_form_body("q=hello+world");
    assert_eq!(form.bind(&request).get::<String>("q"), Ok("hello world".to_string()));
}

#[test]
fn declaration_errors_surface_at_build() {
    let err = Form::builder("Broken")
        .field("a", IntField::new().source_named("headers"))
        .build()
        .unwrap_err();
    assert_eq!(err, ConfigurationError::InvalidSource("headers".to_string()));

    let err = Form::builder("Broken")
        .field("a", StringField::new().min_length(3).max_length(1))
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::InvertedBounds { .. }));
}

#[test]
fn inherited_forms_share_parent_fields() {
    let child = Form::builder("Child")
        .extend(&basic_form())
        .field("e", BoolField::new().source(Source::Query))
        .build()
        .unwrap();

    assert_eq!(
        child.field_names().collect::<Vec<_>>(),
        vec!["a", "b", "c", "d", "e"]
    );
    assert_eq!(child.field("e").map(|f| f.kind()), Some(FieldKind::Boolean));

    let handler = child.wrap(|_: ()| (current().get::<i64>("a"), current().get::<bool>("e")));
    let (a, e) = request_scope(query("a=1&e=off"), || handler(()));
    assert_eq!((a, e), (Ok(1), Ok(false)));
}

#[test]
fn unknown_field_and_type_mismatch() {
    let handler = basic_form().wrap(|_: ()| (current().value("zz"), current().get::<bool>("a")));
    let (unknown, mismatch) = request_scope(query("a=1"), || handler(()));

    assert_eq!(
        unknown,
        Err(Error::Context(ContextError::UnknownField {
            form: "BasicForm".to_string(),
            field: "zz".to_string(),
        }))
    );
    assert!(matches!(
        mismatch,
        Err(Error::Context(ContextError::TypeMismatch { .. }))
    ));
}

#[test]
fn validate_reports_every_failing_field() {
    let handler = basic_form().wrap(|_: ()| current().validate());
    let errors = request_scope(query("a=x&d=1"), || handler(())).unwrap_err();

    let kinds: Vec<_> = errors
        .iter()
        .filter_map(|e| e.as_validation().map(|v| (v.field().to_string(), v.kind())))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("a".to_string(), ValidationErrorKind::Conversion),
            ("b".to_string(), ValidationErrorKind::Required),
        ]
    );
}
