use std::ops::{RangeFrom, RangeFull, RangeInclusive, RangeToInclusive};

use super::value::FieldValue;

/// Inclusive lower/upper limits; `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: Copy + PartialOrd> Bounds<T> {
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }

    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

impl<T: Copy> From<RangeInclusive<T>> for Bounds<T> {
    fn from(range: RangeInclusive<T>) -> Self {
        let (min, max) = range.into_inner();
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

impl<T> From<RangeFrom<T>> for Bounds<T> {
    fn from(range: RangeFrom<T>) -> Self {
        Self {
            min: Some(range.start),
            max: None,
        }
    }
}

impl<T> From<RangeToInclusive<T>> for Bounds<T> {
    fn from(range: RangeToInclusive<T>) -> Self {
        Self {
            min: None,
            max: Some(range.end),
        }
    }
}

impl<T> From<RangeFull> for Bounds<T> {
    fn from(_: RangeFull) -> Self {
        Self {
            min: None,
            max: None,
        }
    }
}

/// Semantic type of a field together with its type-specific constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Length bounds count characters.
    Text(Bounds<usize>),
    Number(Bounds<f64>),
    Boolean,
    Enum(Vec<String>),
    Image,
    List {
        items: Bounds<usize>,
        fields: Vec<FieldSpec>,
    },
    Record(Vec<FieldSpec>),
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text(_) => "string",
            FieldKind::Number(_) => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Enum(_) => "enum",
            FieldKind::Image => "image",
            FieldKind::List { .. } => "list",
            FieldKind::Record(_) => "record",
        }
    }
}

/// What happens when a candidate omits the field.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    /// Absent values become [`FieldValue::Null`].
    Optional,
    Default(FieldValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    presence: Presence,
    description: Option<String>,
}

impl FieldSpec {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            presence: Presence::Required,
            description: None,
        }
    }

    pub fn text(name: impl Into<String>, length: impl Into<Bounds<usize>>) -> Self {
        Self::new(name, FieldKind::Text(length.into()))
    }

    pub fn number(name: impl Into<String>, range: impl Into<Bounds<f64>>) -> Self {
        Self::new(name, FieldKind::Number(range.into()))
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn one_of<S: Into<String>>(
        name: impl Into<String>,
        allowed: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            name,
            FieldKind::Enum(allowed.into_iter().map(Into::into).collect()),
        )
    }

    pub fn image(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Image)
    }

    pub fn list(
        name: impl Into<String>,
        items: impl Into<Bounds<usize>>,
        fields: Vec<FieldSpec>,
    ) -> Self {
        Self::new(
            name,
            FieldKind::List {
                items: items.into(),
                fields,
            },
        )
    }

    pub fn record(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self::new(name, FieldKind::Record(fields))
    }

    pub fn default(mut self, value: impl Into<FieldValue>) -> Self {
        self.presence = Presence::Default(value.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    /// Human-readable guidance for the generation pipeline.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn default_value(&self) -> Option<&FieldValue> {
        match &self.presence {
            Presence::Default(value) => Some(value),
            _ => None,
        }
    }
}
