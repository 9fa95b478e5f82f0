//! Declarative data contracts for slide layouts.
//!
//! A [`LayoutSchema`] is an ordered list of [`FieldSpec`]s. Schemas are checked
//! once when defined ([`define_schema`]) and candidate data is checked against
//! them on every render ([`normalize`]).

mod field;
mod normalize;
mod validate;
mod value;

use std::collections::HashSet;

use serde_json::{Map, Value, json};

use crate::error::SchemaDefinitionError;

pub use field::{Bounds, FieldKind, FieldSpec, Presence};
pub use normalize::normalize;
pub use value::{FieldValue, ImageRef, Record, SlideInstance};

use validate::{check_value, child_path};

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSchema {
    id: String,
    fields: Vec<FieldSpec>,
}

impl LayoutSchema {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name() == name)
    }

    /// JSON-Schema shaped description used to guide content generation.
    pub fn to_json_schema(&self) -> Value {
        let mut schema = object_schema(&self.fields);
        if let Value::Object(map) = &mut schema {
            map.insert("$id".to_string(), Value::String(self.id.clone()));
        }
        schema
    }
}

/// Builds a schema, rejecting duplicate names, inverted bounds, empty enums and
/// defaults that violate their own field's constraints.
pub fn define_schema(
    id: impl Into<String>,
    fields: Vec<FieldSpec>,
) -> Result<LayoutSchema, SchemaDefinitionError> {
    let id = id.into();
    check_definitions(&id, &fields, "")?;
    Ok(LayoutSchema { id, fields })
}

fn check_definitions(
    schema: &str,
    fields: &[FieldSpec],
    path: &str,
) -> Result<(), SchemaDefinitionError> {
    let mut seen = HashSet::new();
    for spec in fields {
        let field_path = child_path(path, spec.name());
        if !seen.insert(spec.name()) {
            return Err(SchemaDefinitionError::DuplicateField {
                schema: schema.to_string(),
                field: field_path,
            });
        }
        match spec.kind() {
            FieldKind::Text(length) if length.is_inverted() => {
                return Err(inverted(&field_path, "length", length.min, length.max));
            }
            FieldKind::Number(range) => {
                if range.is_inverted() {
                    return Err(inverted(&field_path, "value", range.min, range.max));
                }
                if range.min.is_some_and(f64::is_nan) || range.max.is_some_and(f64::is_nan) {
                    return Err(SchemaDefinitionError::InvertedBounds {
                        field: field_path,
                        detail: "bounds must not be NaN".to_string(),
                    });
                }
            }
            FieldKind::Enum(allowed) if allowed.is_empty() => {
                return Err(SchemaDefinitionError::EmptyEnum { field: field_path });
            }
            FieldKind::List { items, fields } => {
                if items.is_inverted() {
                    return Err(inverted(&field_path, "item count", items.min, items.max));
                }
                check_definitions(schema, fields, &format!("{field_path}[]"))?;
            }
            FieldKind::Record(fields) => check_definitions(schema, fields, &field_path)?,
            _ => {}
        }
        if let Some(value) = spec.default_value() {
            check_value(spec, value, &field_path).map_err(|err| {
                SchemaDefinitionError::InvalidDefault {
                    field: field_path.clone(),
                    reason: err.to_string(),
                }
            })?;
        }
    }
    Ok(())
}

fn inverted<T: std::fmt::Display>(
    field: &str,
    what: &str,
    min: Option<T>,
    max: Option<T>,
) -> SchemaDefinitionError {
    let show = |bound: Option<T>| bound.map(|b| b.to_string()).unwrap_or_default();
    SchemaDefinitionError::InvertedBounds {
        field: field.to_string(),
        detail: format!("min {what} {} > max {what} {}", show(min), show(max)),
    }
}

fn object_schema(fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for spec in fields {
        properties.insert(spec.name().to_string(), field_schema(spec));
        if matches!(spec.presence(), Presence::Required) {
            required.push(Value::String(spec.name().to_string()));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn field_schema(spec: &FieldSpec) -> Value {
    let mut schema = match spec.kind() {
        FieldKind::Text(length) => {
            let mut map = type_map("string");
            insert_bound(&mut map, "minLength", length.min);
            insert_bound(&mut map, "maxLength", length.max);
            Value::Object(map)
        }
        FieldKind::Number(range) => {
            let mut map = type_map("number");
            insert_bound(&mut map, "minimum", range.min);
            insert_bound(&mut map, "maximum", range.max);
            Value::Object(map)
        }
        FieldKind::Boolean => Value::Object(type_map("boolean")),
        FieldKind::Enum(allowed) => json!({ "type": "string", "enum": allowed }),
        FieldKind::Image => json!({
            "type": "object",
            "properties": {
                "__image_url__": { "type": "string" },
                "__image_prompt__": { "type": "string" },
            },
            "required": ["__image_url__"],
        }),
        FieldKind::List { items, fields } => {
            let mut map = type_map("array");
            map.insert("items".to_string(), object_schema(fields));
            insert_bound(&mut map, "minItems", items.min);
            insert_bound(&mut map, "maxItems", items.max);
            Value::Object(map)
        }
        FieldKind::Record(fields) => object_schema(fields),
    };
    if let Value::Object(map) = &mut schema {
        if let Some(description) = spec.description() {
            map.insert(
                "description".to_string(),
                Value::String(description.to_string()),
            );
        }
        if let Some(default) = spec.default_value()
            && let Ok(value) = serde_json::to_value(default)
        {
            map.insert("default".to_string(), value);
        }
    }
    schema
}

fn type_map(kind: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".to_string(), Value::String(kind.to_string()));
    map
}

fn insert_bound<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, bound: Option<T>) {
    if let Some(bound) = bound {
        map.insert(key.to_string(), bound.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_default_outside_constraints() {
        let err = define_schema(
            "bad",
            vec![FieldSpec::text("title", 3..=5).default("much too long")],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::InvalidDefault { ref field, .. } if field == "title"));
    }

    #[test]
    fn rejects_enum_default_outside_allowed_set() {
        let err = define_schema(
            "bad",
            vec![FieldSpec::one_of("rating", ["internal", "restricted"]).default("secret")],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::InvalidDefault { .. }));
    }

    #[test]
    fn rejects_inverted_cardinality() {
        let err = define_schema(
            "bad",
            vec![FieldSpec::list("items", 4..=2, vec![FieldSpec::text("heading", ..)])],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::InvertedBounds { ref field, .. } if field == "items"));
    }

    #[test]
    fn rejects_inverted_nested_bounds() {
        let err = define_schema(
            "bad",
            vec![FieldSpec::list(
                "items",
                ..,
                vec![FieldSpec::number("value", 10.0..=1.0)],
            )],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::InvertedBounds { ref field, .. } if field == "items[].value"));
    }

    #[test]
    fn list_default_may_leave_out_optional_element_fields() {
        let points = vec![
            FieldSpec::text("name", ..),
            FieldSpec::number("value", ..),
            FieldSpec::text("category", ..).optional(),
            FieldSpec::number("x", ..).optional(),
        ];
        let default = vec![
            Record::from_pairs([("name", FieldValue::from("2024")), ("value", FieldValue::from(5.0))]),
            Record::from_pairs([("name", FieldValue::from("2025")), ("value", FieldValue::from(12.0))]),
        ];
        let schema = define_schema(
            "chart",
            vec![FieldSpec::list("data", 2..=12, points).default(default)],
        )
        .expect("optional element fields may be absent from defaults");

        let instance = normalize(&schema, &serde_json::json!({})).expect("defaults normalize");
        assert_eq!(instance.list("data").len(), 2);
        assert_eq!(instance.list("data")[0].number("x"), None);
    }

    #[test]
    fn list_default_still_needs_required_element_fields() {
        let err = define_schema(
            "bad",
            vec![
                FieldSpec::list(
                    "data",
                    ..,
                    vec![FieldSpec::text("name", ..), FieldSpec::number("value", ..)],
                )
                .default(vec![Record::from_pairs([("name", "2024")])]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::InvalidDefault { ref field, .. } if field == "data"));
    }

    #[test]
    fn rejects_list_default_with_too_few_items() {
        let err = define_schema(
            "bad",
            vec![
                FieldSpec::list("items", 2..=3, vec![FieldSpec::text("heading", ..)])
                    .default(vec![Record::from_pairs([("heading", "only")])]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::InvalidDefault { .. }));
    }

    #[test]
    fn rejects_duplicates_and_empty_enums() {
        let dup = define_schema(
            "dup",
            vec![FieldSpec::boolean("flag"), FieldSpec::boolean("flag")],
        )
        .unwrap_err();
        assert!(matches!(dup, SchemaDefinitionError::DuplicateField { .. }));
        let empty = define_schema("empty", vec![FieldSpec::one_of("kind", Vec::<String>::new())]).unwrap_err();
        assert!(matches!(empty, SchemaDefinitionError::EmptyEnum { .. }));
    }

    #[test]
    fn json_schema_carries_bounds_defaults_and_descriptions() {
        let schema = define_schema(
            "demo",
            vec![
                FieldSpec::text("title", 3..=50)
                    .default("Main Title")
                    .describe("Main title of the slide"),
                FieldSpec::list("items", 2..=3, vec![FieldSpec::text("heading", 2..=50)]),
            ],
        )
        .expect("valid schema");
        let json = schema.to_json_schema();
        assert_eq!(json["$id"], "demo");
        assert_eq!(json["properties"]["title"]["maxLength"], 50);
        assert_eq!(json["properties"]["title"]["default"], "Main Title");
        assert_eq!(
            json["properties"]["title"]["description"],
            "Main title of the slide"
        );
        assert_eq!(json["properties"]["items"]["minItems"], 2);
        assert_eq!(json["required"], serde_json::json!(["items"]));
    }
}
