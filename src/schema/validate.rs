use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

use super::field::{Bounds, FieldKind, FieldSpec, Presence};
use super::value::{FieldValue, ImageRef, Record};

static IMAGE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:https?://|data:image/|\.{0,2}/)\S+$").unwrap());

pub(crate) fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

/// Checks an already-typed value against its field, recursing into lists and
/// records. Element errors are reported before the list's own cardinality.
pub(crate) fn check_value(
    spec: &FieldSpec,
    value: &FieldValue,
    path: &str,
) -> Result<(), ValidationError> {
    match (spec.kind(), value) {
        (_, FieldValue::Null) => match spec.presence() {
            Presence::Optional => Ok(()),
            _ => Err(ValidationError::missing(path)),
        },
        (FieldKind::Text(length), FieldValue::Text(text)) => check_length(length, text, path),
        (FieldKind::Number(range), FieldValue::Number(number)) => {
            check_range(range, *number, path)
        }
        (FieldKind::Boolean, FieldValue::Bool(_)) => Ok(()),
        (FieldKind::Enum(allowed), FieldValue::Text(text)) => {
            if allowed.iter().any(|candidate| candidate == text) {
                Ok(())
            } else {
                Err(ValidationError::constraint(
                    path,
                    format!("`{text}` is not one of [{}]", allowed.join(", ")),
                ))
            }
        }
        (FieldKind::Image, FieldValue::Image(image)) => check_image(image, path),
        (FieldKind::List { items, fields }, FieldValue::List(records)) => {
            for (index, record) in records.iter().enumerate() {
                check_record(fields, record, &index_path(path, index))?;
            }
            check_cardinality(items, records.len(), path)
        }
        (FieldKind::Record(fields), FieldValue::Record(record)) => {
            check_record(fields, record, path)
        }
        (kind, value) => Err(ValidationError::type_mismatch(
            path,
            kind.type_name(),
            value.type_name(),
        )),
    }
}

pub(crate) fn check_record(
    fields: &[FieldSpec],
    record: &Record,
    path: &str,
) -> Result<(), ValidationError> {
    for spec in fields {
        let field_path = child_path(path, spec.name());
        match (record.get(spec.name()), spec.presence()) {
            (Some(value), _) => check_value(spec, value, &field_path)?,
            (None, Presence::Optional) => {}
            (None, Presence::Default(value)) => check_value(spec, value, &field_path)?,
            (None, Presence::Required) => return Err(ValidationError::missing(field_path)),
        }
    }
    if let Some(extra) = record
        .keys()
        .find(|key| !fields.iter().any(|spec| spec.name() == *key))
    {
        return Err(ValidationError::constraint(
            child_path(path, extra),
            "field is not declared by the schema",
        ));
    }
    Ok(())
}

fn check_length(length: &Bounds<usize>, text: &str, path: &str) -> Result<(), ValidationError> {
    let count = text.chars().count();
    if let Some(min) = length.min
        && count < min
    {
        return Err(ValidationError::constraint(
            path,
            format!("expected at least {min} characters, found {count}"),
        ));
    }
    if let Some(max) = length.max
        && count > max
    {
        return Err(ValidationError::constraint(
            path,
            format!("expected at most {max} characters, found {count}"),
        ));
    }
    Ok(())
}

fn check_range(range: &Bounds<f64>, number: f64, path: &str) -> Result<(), ValidationError> {
    if !number.is_finite() {
        return Err(ValidationError::constraint(path, "number must be finite"));
    }
    if let Some(min) = range.min
        && number < min
    {
        return Err(ValidationError::constraint(
            path,
            format!("expected a value >= {min}, found {number}"),
        ));
    }
    if let Some(max) = range.max
        && number > max
    {
        return Err(ValidationError::constraint(
            path,
            format!("expected a value <= {max}, found {number}"),
        ));
    }
    Ok(())
}

fn check_cardinality(items: &Bounds<usize>, len: usize, path: &str) -> Result<(), ValidationError> {
    if let Some(min) = items.min
        && len < min
    {
        return Err(ValidationError::constraint(
            path,
            format!("expected at least {min} items, found {len}"),
        ));
    }
    if let Some(max) = items.max
        && len > max
    {
        return Err(ValidationError::constraint(
            path,
            format!("expected at most {max} items, found {len}"),
        ));
    }
    Ok(())
}

fn check_image(image: &ImageRef, path: &str) -> Result<(), ValidationError> {
    if IMAGE_URL_RE.is_match(image.url.trim()) {
        Ok(())
    } else {
        Err(ValidationError::constraint(
            child_path(path, "__image_url__"),
            format!("`{}` is not a resolvable image URL", image.url),
        ))
    }
}
