use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use json_union::discriminator::register_shape;
use json_union::{
    literal_union, type_union, BindingProblem, DecodeError, DeclarationError, Document, FieldType,
    Route, Shape, ShapeSchema, TypeUnion, TypeUnionSpec, UnionValue, Variant,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

literal_union! {
    pub enum ClickType {
        Click = "click",
    }
}

literal_union! {
    pub enum KeyboardType {
        KeyDown = "keydown",
        KeyUp = "keyup",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ClickEvent {
    #[serde(rename = "type")]
    kind: ClickType,
    coordinates: Vec<String>,
}

impl Shape for ClickEvent {
    fn schema() -> ShapeSchema {
        ShapeSchema::new("ClickEvent")
            .field("type", FieldType::literal::<ClickType>())
            .field("coordinates", FieldType::array(FieldType::String))
    }

    fn discriminator() -> Option<&'static str> {
        Some("type")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct KeyboardEvent {
    #[serde(rename = "type")]
    kind: KeyboardType,
    key: String,
}

impl Shape for KeyboardEvent {
    fn schema() -> ShapeSchema {
        ShapeSchema::new("KeyboardEvent")
            .field("type", FieldType::literal::<KeyboardType>())
            .field("key", FieldType::String)
    }

    fn discriminator() -> Option<&'static str> {
        Some("type")
    }
}

type_union! {
    #[derive(Debug, Clone, PartialEq)]
    enum UIEvent {
        Click(ClickEvent),
        Keyboard(KeyboardEvent),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SimpleA {
    value: String,
}

impl Shape for SimpleA {
    fn schema() -> ShapeSchema {
        ShapeSchema::new("SimpleA").field("value", FieldType::String)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SimpleB {
    value: String,
    extra: i64,
}

impl Shape for SimpleB {
    fn schema() -> ShapeSchema {
        ShapeSchema::new("SimpleB")
            .field("value", FieldType::String)
            .field("extra", FieldType::Integer)
    }
}

type_union! {
    #[derive(Debug, Clone, PartialEq)]
    enum Simple {
        A(SimpleA),
        B(SimpleB),
    }
}

fn click() -> ClickEvent {
    ClickEvent { kind: ClickType::Click, coordinates: vec!["1".into(), "2".into()] }
}

/// UIEvent built by hand so each decoder counts its calls.
fn counting_union(click_calls: Arc<AtomicUsize>, key_calls: Arc<AtomicUsize>) -> TypeUnionSpec<UIEvent> {
    let click_variant = Variant::new(
        "Click",
        move |doc: &Document<'_>| {
            click_calls.fetch_add(1, Ordering::SeqCst);
            doc.decode_as::<ClickEvent>().map(UIEvent::Click)
        },
        |v: &UIEvent| UIEvent::spec().encode(v),
    )
    .with_discriminator(register_shape::<ClickEvent>().unwrap());
    let key_variant = Variant::new(
        "Keyboard",
        move |doc: &Document<'_>| {
            key_calls.fetch_add(1, Ordering::SeqCst);
            doc.decode_as::<KeyboardEvent>().map(UIEvent::Keyboard)
        },
        |v: &UIEvent| UIEvent::spec().encode(v),
    )
    .with_discriminator(register_shape::<KeyboardEvent>().unwrap());
    TypeUnionSpec::builder("UIEvent")
        .variant(click_variant)
        .variant(key_variant)
        .build()
        .unwrap()
}

#[test]
fn discriminator_short_circuits() {
    let click_calls = Arc::new(AtomicUsize::new(0));
    let key_calls = Arc::new(AtomicUsize::new(0));
    let spec = counting_union(click_calls.clone(), key_calls.clone());

    let raw = json!({"type": "click", "coordinates": ["1", "2"]});
    let decoded = spec.decode_detailed(&Document::new(&raw)).unwrap();
    assert_eq!(decoded.value, UIEvent::Click(click()));
    assert_eq!(decoded.route, Route::Discriminator);
    assert_eq!(click_calls.load(Ordering::SeqCst), 1);
    assert_eq!(key_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn recognized_tag_with_bad_body_is_terminal() {
    let click_calls = Arc::new(AtomicUsize::new(0));
    let key_calls = Arc::new(AtomicUsize::new(0));
    let spec = counting_union(click_calls.clone(), key_calls.clone());

    let raw = json!({"type": "click", "coordinates": 123});
    let err = spec.decode(&Document::new(&raw)).unwrap_err();
    match &err {
        DecodeError::DiscriminatorMatchedButBodyInvalid { union, variant, field, source } => {
            assert_eq!(union, "UIEvent");
            assert_eq!(variant, "Click");
            assert_eq!(field, "type");
            assert_eq!(source.path, "coordinates");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.kind(), "discriminator_matched_but_body_invalid");
    assert_eq!(click_calls.load(Ordering::SeqCst), 1);
    assert_eq!(key_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unrecognized_tag_falls_back_to_ordered_trial() {
    let click_calls = Arc::new(AtomicUsize::new(0));
    let key_calls = Arc::new(AtomicUsize::new(0));
    let spec = counting_union(click_calls.clone(), key_calls.clone());

    let raw = json!({"type": "scroll", "coordinates": []});
    let err = spec.decode(&Document::new(&raw)).unwrap_err();
    match err {
        DecodeError::NoMatchingVariant { attempts, .. } => {
            assert_eq!(attempts.len(), 2);
            assert_eq!(attempts[0].variant, "Click");
            assert_eq!(attempts[1].variant, "Keyboard");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(click_calls.load(Ordering::SeqCst), 1);
    assert_eq!(key_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn generated_union_round_trips() {
    let events = vec![
        UIEvent::Click(click()),
        UIEvent::Keyboard(KeyboardEvent { kind: KeyboardType::KeyUp, key: "Enter".into() }),
    ];
    for event in events {
        let text = serde_json::to_string(&event).unwrap();
        let back: UIEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(back, event);
    }
    assert_eq!(UIEvent::spec().variant_names(), vec!["Click", "Keyboard"]);
    assert_eq!(UIEvent::Click(click()).variant_name(), "Click");
    assert_eq!(
        UIEvent::Keyboard(KeyboardEvent { kind: KeyboardType::KeyDown, key: "a".into() }).variant_index(),
        1
    );
}

#[test]
fn encode_is_the_bare_shape_and_idempotent() {
    let event = UIEvent::Click(click());
    let first = serde_json::to_string(&event).unwrap();
    let second = serde_json::to_string(&event).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, serde_json::to_string(&click()).unwrap());
    assert_eq!(first, r#"{"type":"click","coordinates":["1","2"]}"#);

    // decoding through either route does not change the encoding
    let raw: Value = serde_json::from_str(&first).unwrap();
    let decoded = UIEvent::spec().decode_value(&raw).unwrap();
    assert_eq!(serde_json::to_string(&decoded).unwrap(), first);
}

#[test]
fn first_declared_undiscriminated_shape_wins() {
    let a: Simple = serde_json::from_value(json!({"value": "test"})).unwrap();
    assert_eq!(a, Simple::A(SimpleA { value: "test".into() }));

    // SimpleB would also accept this, but SimpleA is declared first
    let doc = json!({"value": "test", "extra": 42});
    let decoded = Simple::spec().decode_detailed(&Document::new(&doc)).unwrap();
    assert_eq!(decoded.value, Simple::A(SimpleA { value: "test".into() }));
    assert_eq!(decoded.route, Route::Fallback);
    assert_eq!(decoded.variant, 0);
}

#[test]
fn serde_errors_carry_the_decode_error() {
    let err = serde_json::from_value::<UIEvent>(json!({"type": "click", "coordinates": 123})).unwrap_err();
    assert!(err.to_string().contains("selected variant `Click`"));

    let err = serde_json::from_value::<Simple>(json!({"other": 1})).unwrap_err();
    assert!(err.to_string().contains("no variant of `Simple` matched"));
}

#[derive(Debug, Serialize, Deserialize)]
struct BadTag {
    kind: String,
}

impl Shape for BadTag {
    fn schema() -> ShapeSchema {
        ShapeSchema::new("BadTag").field("kind", FieldType::String)
    }

    fn discriminator() -> Option<&'static str> {
        Some("kind")
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct MissingTag {
    value: i64,
}

impl Shape for MissingTag {
    fn schema() -> ShapeSchema {
        ShapeSchema::new("MissingTag").field("value", FieldType::Integer)
    }

    fn discriminator() -> Option<&'static str> {
        Some("type")
    }
}

enum Bad {
    Tag(BadTag),
    Missing(MissingTag),
}

impl UnionValue for Bad {
    fn variant_index(&self) -> usize {
        match self {
            Bad::Tag(_) => 0,
            Bad::Missing(_) => 1,
        }
    }
}

#[test]
fn misdeclared_discriminators_fail_at_declaration() {
    let err = TypeUnionSpec::<Bad>::builder("Bad")
        .shape::<BadTag>("Tag", Bad::Tag, |v| match v {
            Bad::Tag(s) => Some(s),
            _ => None,
        })
        .err()
        .unwrap();
    assert_eq!(
        err,
        DeclarationError::InvalidDiscriminatorBinding {
            shape: "BadTag".into(),
            field: "kind".into(),
            problem: BindingProblem::NotLiteralUnion,
        }
    );

    let err = TypeUnionSpec::<Bad>::builder("Bad")
        .shape::<MissingTag>("Missing", Bad::Missing, |v| match v {
            Bad::Missing(s) => Some(s),
            _ => None,
        })
        .err()
        .unwrap();
    assert!(matches!(
        err,
        DeclarationError::InvalidDiscriminatorBinding { problem: BindingProblem::MissingField, .. }
    ));
}

/// Schema says keyboard tags, but the struct field only accepts "click".
#[derive(Debug, Serialize, Deserialize)]
struct Drifted {
    #[serde(rename = "type")]
    kind: ClickType,
    key: String,
}

impl Shape for Drifted {
    fn schema() -> ShapeSchema {
        ShapeSchema::new("Drifted")
            .field("type", FieldType::literal::<KeyboardType>())
            .field("key", FieldType::String)
    }

    fn discriminator() -> Option<&'static str> {
        Some("type")
    }
}

#[test]
fn schema_tags_must_decode_through_the_struct() {
    let err = register_shape::<Drifted>().unwrap_err();
    assert_eq!(
        err,
        DeclarationError::InvalidDiscriminatorBinding {
            shape: "Drifted".into(),
            field: "type".into(),
            problem: BindingProblem::TagRejected,
        }
    );
    assert!(register_shape::<ClickEvent>().unwrap().is_some());
    assert!(register_shape::<KeyboardEvent>().unwrap().is_some());
}

#[test]
fn variant_indices_follow_declaration_order() {
    assert_eq!(Simple::A(SimpleA { value: "a".into() }).variant_index(), 0);
    assert_eq!(Simple::B(SimpleB { value: "b".into(), extra: 1 }).variant_index(), 1);
    assert_eq!(UIEvent::Click(click()).variant_index(), 0);
    for (index, name) in Simple::spec().variant_names().into_iter().enumerate() {
        let value = match index {
            0 => Simple::A(SimpleA { value: "a".into() }),
            _ => Simple::B(SimpleB { value: "b".into(), extra: 1 }),
        };
        assert_eq!(value.variant_name(), name);
    }
}

#[test]
fn decoding_in_parallel_needs_no_coordination() {
    let docs: Vec<Value> = (0..64)
        .map(|i| {
            if i % 2 == 0 {
                json!({"type": "click", "coordinates": [i.to_string()]})
            } else {
                json!({"type": "keydown", "key": i.to_string()})
            }
        })
        .collect();
    std::thread::scope(|s| {
        for chunk in docs.chunks(16) {
            s.spawn(move || {
                for doc in chunk {
                    let event = UIEvent::spec().decode_value(doc).unwrap();
                    let expected = if doc["type"] == "click" { "Click" } else { "Keyboard" };
                    assert_eq!(event.variant_name(), expected);
                }
            });
        }
    });
}
