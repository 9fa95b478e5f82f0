use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ValidationError;

use super::LayoutSchema;
use super::field::{FieldKind, FieldSpec, Presence};
use super::validate::{check_value, child_path, index_path};
use super::value::{FieldValue, ImageRef, Record, SlideInstance};

/// Converts untyped candidate data into a [`SlideInstance`] for `schema`.
///
/// Fields are processed in schema order and the first failure is returned, so
/// the same input always yields the same error. Absent fields take the schema
/// default, which is re-checked here. Values are never truncated, clamped or
/// padded. JSON `null` counts as absent and undeclared keys are dropped.
pub fn normalize(schema: &LayoutSchema, candidate: &Value) -> Result<SlideInstance, ValidationError> {
    let Value::Object(map) = candidate else {
        return Err(ValidationError::type_mismatch(
            "$",
            "record",
            json_type(candidate),
        ));
    };
    let values = normalize_record(schema.fields(), map, "")?;
    debug!(layout = schema.id(), fields = values.len(), "normalized slide data");
    Ok(SlideInstance::new(schema.id(), values))
}

fn normalize_record(
    fields: &[FieldSpec],
    map: &Map<String, Value>,
    path: &str,
) -> Result<Record, ValidationError> {
    let mut record = Record::new();
    for spec in fields {
        let field_path = child_path(path, spec.name());
        let value = match map.get(spec.name()).filter(|raw| !raw.is_null()) {
            Some(raw) => {
                let value = coerce(spec, raw, &field_path)?;
                check_value(spec, &value, &field_path)?;
                value
            }
            None => resolve_absent(spec, &field_path)?,
        };
        record.insert(spec.name(), value);
    }
    for key in map
        .keys()
        .filter(|key| !fields.iter().any(|spec| spec.name() == key.as_str()))
    {
        debug!(field = %child_path(path, key), "dropping undeclared field");
    }
    Ok(record)
}

fn resolve_absent(spec: &FieldSpec, path: &str) -> Result<FieldValue, ValidationError> {
    match spec.presence() {
        Presence::Default(value) => {
            check_value(spec, value, path)?;
            Ok(value.clone())
        }
        Presence::Optional => Ok(FieldValue::Null),
        Presence::Required => Err(ValidationError::missing(path)),
    }
}

fn coerce(spec: &FieldSpec, raw: &Value, path: &str) -> Result<FieldValue, ValidationError> {
    let mismatch = || ValidationError::type_mismatch(path, spec.kind().type_name(), json_type(raw));
    match spec.kind() {
        FieldKind::Text(_) | FieldKind::Enum(_) => match raw {
            Value::String(text) => Ok(FieldValue::Text(text.clone())),
            Value::Number(number) => Ok(FieldValue::Text(number.to_string())),
            Value::Bool(flag) => Ok(FieldValue::Text(flag.to_string())),
            _ => Err(mismatch()),
        },
        FieldKind::Number(_) => match raw {
            Value::Number(number) => number.as_f64().map(FieldValue::Number).ok_or_else(mismatch),
            Value::String(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(FieldValue::Number)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        FieldKind::Boolean => match raw {
            Value::Bool(flag) => Ok(FieldValue::Bool(*flag)),
            Value::String(text) if text == "true" => Ok(FieldValue::Bool(true)),
            Value::String(text) if text == "false" => Ok(FieldValue::Bool(false)),
            _ => Err(mismatch()),
        },
        FieldKind::Image => {
            let Value::Object(map) = raw else {
                return Err(mismatch());
            };
            let url = match map.get("__image_url__") {
                Some(Value::String(url)) => url.clone(),
                Some(other) => {
                    return Err(ValidationError::type_mismatch(
                        child_path(path, "__image_url__"),
                        "string",
                        json_type(other),
                    ));
                }
                None => return Err(ValidationError::missing(child_path(path, "__image_url__"))),
            };
            let prompt = map
                .get("__image_prompt__")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Ok(FieldValue::Image(ImageRef::new(url, prompt)))
        }
        FieldKind::List { fields, .. } => {
            let Value::Array(items) = raw else {
                return Err(mismatch());
            };
            let mut records = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let item_path = index_path(path, index);
                let Value::Object(map) = item else {
                    return Err(ValidationError::type_mismatch(item_path, "record", json_type(item)));
                };
                records.push(normalize_record(fields, map, &item_path)?);
            }
            Ok(FieldValue::List(records))
        }
        FieldKind::Record(fields) => {
            let Value::Object(map) = raw else {
                return Err(mismatch());
            };
            Ok(FieldValue::Record(normalize_record(fields, map, path)?))
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "record",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ValidationReason;
    use crate::schema::define_schema;

    fn cards_schema() -> LayoutSchema {
        define_schema(
            "cards",
            vec![
                FieldSpec::number("slideNumber", 1.0..).default(1.0),
                FieldSpec::text("title", 3..=50).default("Main Title"),
                FieldSpec::list(
                    "items",
                    2..=3,
                    vec![
                        FieldSpec::text("heading", 2..=50),
                        FieldSpec::text("note", ..=20).default("n/a"),
                    ],
                )
                .default(vec![
                    Record::from_pairs([("heading", "One"), ("note", "first")]),
                    Record::from_pairs([("heading", "Two"), ("note", "second")]),
                ]),
                FieldSpec::number("x", ..).optional(),
            ],
        )
        .expect("schema is consistent")
    }

    fn items(count: usize) -> Value {
        Value::Array(
            (0..count)
                .map(|i| json!({ "heading": format!("Item {i}") }))
                .collect(),
        )
    }

    #[test]
    fn absent_fields_take_defaults() {
        let instance = normalize(&cards_schema(), &json!({})).expect("defaults apply");
        assert_eq!(instance.number("slideNumber"), 1.0);
        assert_eq!(instance.text("title"), "Main Title");
        assert_eq!(instance.list("items").len(), 2);
        assert_eq!(instance.get("x"), Some(&FieldValue::Null));
        assert_eq!(
            instance.values().keys().collect::<Vec<_>>(),
            vec!["slideNumber", "title", "items", "x"]
        );
    }

    #[test]
    fn undeclared_fields_are_dropped() {
        let instance = normalize(&cards_schema(), &json!({ "bogus": 1 })).expect("valid");
        assert!(instance.get("bogus").is_none());
        assert_eq!(instance.values().len(), 4);
    }

    #[test]
    fn element_defaults_fill_before_cardinality() {
        let instance = normalize(&cards_schema(), &json!({ "items": items(2) })).expect("valid");
        let items = instance.list("items");
        assert_eq!(items[1].text("heading"), Some("Item 1"));
        assert_eq!(items[1].text("note"), Some("n/a"));
    }

    #[test]
    fn cardinality_bounds_are_exact() {
        let schema = cards_schema();
        for count in [1, 4] {
            let err = normalize(&schema, &json!({ "items": items(count) })).unwrap_err();
            assert_eq!(err.field, "items");
            assert!(err.is_constraint_violation());
        }
        for count in [2, 3] {
            let instance = normalize(&schema, &json!({ "items": items(count) })).expect("valid");
            assert_eq!(instance.list("items").len(), count);
        }
    }

    #[test]
    fn first_failing_field_in_schema_order_wins() {
        let err = normalize(
            &cards_schema(),
            &json!({ "title": "x", "slideNumber": 0 }),
        )
        .unwrap_err();
        assert_eq!(err.field, "slideNumber");
    }

    #[test]
    fn nested_errors_carry_element_paths() {
        let err = normalize(
            &cards_schema(),
            &json!({ "items": [{ "heading": "Fine" }, { "heading": "x" }] }),
        )
        .unwrap_err();
        assert_eq!(err.field, "items[1].heading");
        let err = normalize(
            &cards_schema(),
            &json!({ "items": [{ "heading": "Fine" }, {}] }),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::missing("items[1].heading"));
    }

    #[test]
    fn type_mismatches_are_reported() {
        let err = normalize(&cards_schema(), &json!({ "slideNumber": "seven" })).unwrap_err();
        assert_eq!(
            err.reason,
            ValidationReason::TypeMismatch {
                expected: "number",
                found: "string"
            }
        );
        let err = normalize(&cards_schema(), &json!([1, 2])).unwrap_err();
        assert_eq!(err.field, "$");
    }

    #[test]
    fn scalars_are_coerced_when_lossless() {
        let instance = normalize(
            &cards_schema(),
            &json!({ "slideNumber": "3", "title": 2024, "x": null }),
        )
        .expect("coercible");
        assert_eq!(instance.number("slideNumber"), 3.0);
        assert_eq!(instance.text("title"), "2024");
        assert_eq!(instance.get("x"), Some(&FieldValue::Null));
    }

    #[test]
    fn long_text_is_rejected_not_truncated() {
        let long = "y".repeat(51);
        let err = normalize(&cards_schema(), &json!({ "title": long })).unwrap_err();
        assert_eq!(err.field, "title");
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn normalization_is_deterministic() {
        let schema = cards_schema();
        let candidate = json!({ "title": "Quarterly", "items": items(3), "x": 2 });
        let first = normalize(&schema, &candidate);
        let second = normalize(&schema, &candidate);
        assert_eq!(first, second);
        let bad = json!({ "items": items(9) });
        assert_eq!(normalize(&schema, &bad), normalize(&schema, &bad));
    }
}
