use std::time::{Duration, Instant};

use a2ui_kit::a2ui::*;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn seeded() -> A2uiMessageProcessor {
    let processor = A2uiMessageProcessor::new();
    processor
        .process_message(r#"{"createSurface": {"surfaceId": "s", "catalogId": "standard"}}"#)
        .unwrap();
    processor
        .update_data_model(
            "s",
            "/items",
            json!([
                {"name": "zero", "price": 0},
                {"name": "one", "price": 1},
                {"name": "two", "price": 2}
            ]),
        )
        .unwrap();
    processor.update_data_model("s", "/name", json!("top")).unwrap();
    processor
}

fn dynamic_value() -> impl Strategy<Value = DynamicValue> {
    prop_oneof![
        any::<String>().prop_map(DynamicValue::path),
        "[a-z/]{0,12}".prop_map(DynamicValue::path),
        any::<i64>().prop_map(DynamicValue::literal),
        (any::<String>(), "[a-z/]{0,12}").prop_map(|(name, path)| {
            let mut args = Map::new();
            args.insert("value".to_string(), json!({"path": path}));
            DynamicValue::call(name, args)
        }),
        ("[a-zA-Z]{1,12}", any::<String>()).prop_map(|(name, text)| {
            let mut args = Map::new();
            args.insert("value".to_string(), json!(text));
            args.insert("pattern".to_string(), json!(text));
            DynamicValue::call(name, args)
        }),
    ]
}

fn small_config() -> ProcessorConfig {
    ProcessorConfig {
        max_surfaces: 3,
        max_components_per_surface: 4,
        max_data_model_entries: 6,
        ..ProcessorConfig::default()
    }
}

fn surface_id() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["s0", "s1", "s2", "s3"])
}

fn data_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i64>().prop_map(|n| json!(n)),
        Just(json!("text")),
        Just(json!([1, 2, 3])),
        Just(json!({"x": 1, "y": {"z": 2}})),
    ]
}

/// One envelope of the four kinds, aimed at a small pool of ids and paths
fn message() -> impl Strategy<Value = Value> {
    prop_oneof![
        surface_id().prop_map(|id| json!({"createSurface": {"surfaceId": id, "catalogId": "standard"}})),
        (
            surface_id(),
            prop::collection::vec(prop::sample::select(vec!["root", "title", "body", "row", "item-1", "bad id"]), 0..4),
        )
            .prop_map(|(id, components)| {
                let components: Vec<Value> = components
                    .into_iter()
                    .map(|c| json!({"id": c, "component": "Text", "text": c}))
                    .collect();
                json!({"updateComponents": {"surfaceId": id, "components": components}})
            }),
        (
            surface_id(),
            prop::sample::select(vec!["/", "/a", "/b", "/a/x", "/list", "/list/0", "/list/5"]),
            data_value(),
        )
            .prop_map(|(id, path, value)| json!({"updateDataModel": {"surfaceId": id, "path": path, "value": value}})),
        surface_id().prop_map(|id| json!({"deleteSurface": {"surfaceId": id}})),
    ]
}

proptest! {
    #[test]
    fn test_restore_reproduces_any_history(messages in prop::collection::vec(message(), 0..24)) {
        let processor = A2uiMessageProcessor::with_config(small_config()).unwrap();
        for message in &messages {
            let _ = processor.process_message(&message.to_string());
        }

        let snapshot = processor.snapshot();
        prop_assert_eq!(processor.restore(&snapshot), Ok(()));
        prop_assert_eq!(&processor.snapshot(), &snapshot);

        let fresh = A2uiMessageProcessor::with_config(small_config()).unwrap();
        prop_assert_eq!(fresh.restore(&snapshot), Ok(()));
        prop_assert_eq!(&fresh.snapshot(), &snapshot);
    }

    #[test]
    fn test_failed_message_changes_nothing(
        setup in prop::collection::vec(message(), 0..12),
        next in message(),
    ) {
        let processor = A2uiMessageProcessor::with_config(small_config()).unwrap();
        for message in &setup {
            let _ = processor.process_message(&message.to_string());
        }

        let before = processor.snapshot();
        if processor.process_message(&next.to_string()).is_err() {
            prop_assert_eq!(&processor.snapshot(), &before);
        }
    }

    #[test]
    fn test_batch_matches_single_messages(messages in prop::collection::vec(message(), 0..16)) {
        let batched = A2uiMessageProcessor::with_config(small_config()).unwrap();
        let single = A2uiMessageProcessor::with_config(small_config()).unwrap();

        let results = batched.process_batch(&Value::Array(messages.clone()).to_string()).unwrap();
        prop_assert_eq!(results.len(), messages.len());
        for (message, batch_result) in messages.iter().zip(&results) {
            let result = single.process_message(&message.to_string());
            prop_assert_eq!(result.is_ok(), batch_result.is_ok());
        }
        prop_assert_eq!(batched.snapshot(), single.snapshot());

        // A batch that cannot be split leaves everything as it was.
        let before = batched.snapshot();
        let mut truncated = Value::Array(messages).to_string();
        truncated.pop();
        prop_assert!(batched.process_batch(&truncated).is_err());
        prop_assert_eq!(batched.snapshot(), before);
    }

    #[test]
    fn test_path_validation_is_total(path in any::<String>()) {
        let first = validate_path(&path);
        prop_assert_eq!(&first, &validate_path(&path));
        if first.is_ok() {
            prop_assert!(path.starts_with('/'));
            prop_assert!(!path.contains(".."));
        }
    }

    #[test]
    fn test_generated_valid_paths_pass(segments in prop::collection::vec("[a-zA-Z0-9_-]{1,20}", 1..=MAX_PATH_DEPTH)) {
        prop_assume!(segments.iter().all(|s| !["__proto__", "constructor", "prototype", "toString", "valueOf"].contains(&s.as_str())));
        let path = format!("/{}", segments.join("/"));
        prop_assert_eq!(validate_path(&path), Ok(()));
    }

    #[test]
    fn test_resolver_is_total(
        surface in prop_oneof![Just("s".to_string()), Just("missing".to_string())],
        value in dynamic_value(),
        scope in proptest::option::of(any::<String>()),
    ) {
        let processor = seeded();
        let resolved = processor.resolve_value(&surface, &value, scope.as_deref());
        if surface == "missing" {
            prop_assert_eq!(resolved, Value::Null);
        }
    }

    #[test]
    fn test_scope_rewrites_relative_paths(index in 0usize..3, field in prop_oneof![Just("name"), Just("price"), Just("absent")]) {
        let processor = seeded();
        let scope = format!("/items/{}", index);
        let scoped = processor.resolve_value("s", &DynamicValue::path(field), Some(&scope));
        let absolute = processor.resolve_value("s", &DynamicValue::path(format!("{}/{}", scope, field)), None);
        prop_assert_eq!(scoped, absolute);
    }

    #[test]
    fn test_absolute_paths_ignore_scope(index in 0usize..3) {
        let processor = seeded();
        let scope = format!("/items/{}", index);
        let scoped = processor.resolve_value("s", &DynamicValue::path("/name"), Some(&scope));
        prop_assert_eq!(scoped, json!("top"));
    }

    #[test]
    fn test_regex_fails_closed(atom in "[a-z]|\\\\w|\\.", outer in prop_oneof![Just("+"), Just("*"), Just("{2,}")], input in "[a-z!]{0,40}") {
        let processor = seeded();
        let pattern = format!("({}+){}", atom, outer);
        let mut args = Map::new();
        args.insert("value".to_string(), json!(input));
        args.insert("pattern".to_string(), json!(pattern));

        let started = Instant::now();
        let result = processor.resolve_value("s", &DynamicValue::call("regex", args), None);
        prop_assert_eq!(result, json!(false));
        prop_assert!(started.elapsed() < Duration::from_secs(1));
    }
}

#[test]
fn test_path_rule_order() {
    assert_eq!(validate_path("/../x"), Err(PathError::Traversal));
    assert_eq!(validate_path("/a//b"), Err(PathError::DoubleSlash));
    assert_eq!(validate_path("a/b"), Err(PathError::MissingLeadingSlash));
}
