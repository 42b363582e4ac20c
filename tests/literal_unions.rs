use json_union::{literal_union, DecodeError, LiteralUnion, LiteralValue, Representation, ScalarKind};
use proptest::prelude::*;
use serde_json::{json, Value};

literal_union! {
    /// Review state of a request.
    pub enum Status {
        Pending = "pending",
        Approved = "approved",
        Rejected = "rejected",
    }
}

literal_union! {
    pub enum Setting {
        Auto = "auto",
        Hundred = 100,
        On = true,
        Ratio = 2.5,
        Manual = "manual",
        Off = false,
    }
}

literal_union! {
    pub enum HttpError {
        NotFound = 404,
        Teapot = 418,
        Huge = 5_000_000_000i64,
    }
}

literal_union! {
    /// Cases whose values coincide across kinds.
    pub enum Overlap {
        TwoFloat = 2.0,
        TwoInt = 2,
        HundredText = "100",
        Hundred = 100,
        Yes = true,
        YesText = "true",
    }
}

#[test]
fn exact_match_on_strings() {
    assert_eq!(serde_json::from_value::<Status>(json!("pending")).unwrap(), Status::Pending);
    let err = Status::from_wire(&json!("Pending")).unwrap_err();
    assert_eq!(err, DecodeError::UnknownLiteral { union: "Status".into(), value: json!("Pending") });
    assert!(serde_json::from_value::<Status>(json!("Pending")).is_err());
}

#[test]
fn mixed_union_decodes_each_kind() {
    assert_eq!(Setting::spec().representation(), Representation::Mixed);
    let cases = [
        (json!("auto"), Setting::Auto),
        (json!(100), Setting::Hundred),
        (json!(true), Setting::On),
        (json!(2.5), Setting::Ratio),
        (json!("manual"), Setting::Manual),
        (json!(false), Setting::Off),
    ];
    for (wire, expected) in cases {
        assert_eq!(Setting::from_wire(&wire).unwrap(), expected);
    }
    assert_eq!(Setting::Hundred.literal(), &LiteralValue::from(100));
    assert!(matches!(
        Setting::from_wire(&json!("notfound")),
        Err(DecodeError::UnknownLiteral { .. })
    ));
    assert!(matches!(Setting::from_wire(&json!([])), Err(DecodeError::TypeMismatch { .. })));
}

#[test]
fn every_case_round_trips() {
    for case in Setting::ALL.iter().copied() {
        let text = serde_json::to_string(&case).unwrap();
        assert_eq!(serde_json::from_str::<Setting>(&text).unwrap(), case);
        assert_eq!(Setting::from_case_index(case.case_index()), Some(case));
    }
    assert_eq!(serde_json::to_string(&Setting::On).unwrap(), "true");
    assert_eq!(serde_json::to_string(&Setting::Ratio).unwrap(), "2.5");
}

#[test]
fn overlapping_cases_round_trip_to_themselves() {
    assert_eq!(
        Overlap::spec().case_identifiers(),
        vec!["float_2_0", "int_2", "str_100", "int_100", "bool_true", "true"]
    );
    for case in Overlap::ALL.iter().copied() {
        let text = serde_json::to_string(&case).unwrap();
        assert_eq!(serde_json::from_str::<Overlap>(&text).unwrap(), case, "wire text {text}");
        assert_eq!(Overlap::from_wire(&case.to_wire()), Ok(case));
    }
    assert_eq!(serde_json::to_string(&Overlap::TwoInt).unwrap(), "2");
    assert_eq!(serde_json::to_string(&Overlap::TwoFloat).unwrap(), "2.0");
    assert_eq!(serde_json::from_str::<Overlap>("2").unwrap(), Overlap::TwoInt);
}

#[test]
fn integer_unions_are_homogeneous() {
    assert_eq!(HttpError::spec().representation(), Representation::Homogeneous(ScalarKind::Integer));
    assert_eq!(HttpError::from_wire(&json!(418)).unwrap(), HttpError::Teapot);
    assert_eq!(HttpError::from_wire(&json!(5_000_000_000i64)).unwrap(), HttpError::Huge);
    assert!(matches!(HttpError::from_wire(&json!("404")), Err(DecodeError::TypeMismatch { .. })));
    assert!(matches!(HttpError::from_wire(&json!(404.5)), Err(DecodeError::TypeMismatch { .. })));
    assert_eq!(HttpError::NotFound.identifier(), "int_404");
}

#[test]
fn generated_code_interface() {
    let spec = Setting::spec();
    assert_eq!(
        spec.case_identifiers(),
        vec!["auto", "int_100", "bool_true", "float_2_5", "manual", "bool_false"]
    );
    assert_eq!(spec.wire_value_for("float_2_5"), Some(json!(2.5)));
    assert_eq!(spec.case_for(&json!(false)).unwrap().identifier, "bool_false");
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop_oneof![Just("auto"), Just("manual"), Just("Auto"), Just("100")].prop_map(Value::from),
        any::<String>().prop_map(Value::from),
        prop_oneof![Just(100i64), Just(2i64), Just(9_007_199_254_740_993i64), any::<i64>()].prop_map(Value::from),
        prop_oneof![Just(2.5f64), Just(2.0f64), Just(100.0f64), -1e9f64..1e9f64].prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

proptest! {
    #[test]
    fn decode_is_deterministic(wire in scalar()) {
        let first = Setting::from_wire(&wire);
        let second = Setting::from_wire(&wire);
        prop_assert_eq!(&first, &second);
        if let Ok(case) = first {
            // a successful decode re-encodes to an equal wire value of the same JSON type
            prop_assert_eq!(Setting::from_wire(&case.to_wire()), Ok(case));
            prop_assert!(Setting::spec().contains(case.literal()));
        }

        let first = Overlap::from_wire(&wire);
        prop_assert_eq!(&first, &Overlap::from_wire(&wire));
        if let Ok(case) = first {
            prop_assert_eq!(Overlap::from_wire(&case.to_wire()), Ok(case));
        }
    }

    #[test]
    fn every_overlapping_case_survives_the_wire(index in 0..Overlap::ALL.len()) {
        let case = Overlap::ALL[index];
        let text = serde_json::to_string(&case).unwrap();
        let wire: Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(Overlap::from_wire(&wire), Ok(case));
        prop_assert_eq!(Overlap::from_wire(&case.to_wire()), Ok(case));
    }
}
