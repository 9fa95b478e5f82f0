use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reference to an image the display collaborator loads; never fetched here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(rename = "__image_url__")]
    pub url: String,
    /// Textual description used for alt text and regeneration.
    #[serde(rename = "__image_prompt__", default)]
    pub prompt: String,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prompt: prompt.into(),
        }
    }
}

/// A typed, normalized field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// An optional field that was absent from the candidate.
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    Image(ImageRef),
    List(Vec<Record>),
    Record(Record),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Text(_) => "string",
            FieldValue::Number(_) => "number",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Image(_) => "image",
            FieldValue::List(_) => "list",
            FieldValue::Record(_) => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageRef> {
        match self {
            FieldValue::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Record]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<ImageRef> for FieldValue {
    fn from(value: ImageRef) -> Self {
        FieldValue::Image(value)
    }
}

impl From<Vec<Record>> for FieldValue {
    fn from(value: Vec<Record>) -> Self {
        FieldValue::List(value)
    }
}

impl From<Record> for FieldValue {
    fn from(value: Record) -> Self {
        FieldValue::Record(value)
    }
}

/// Field values keyed by name, in schema order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, FieldValue>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_number)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    pub fn image(&self, name: &str) -> Option<&ImageRef> {
        self.get(name).and_then(FieldValue::as_image)
    }

    pub fn list(&self, name: &str) -> Option<&[Record]> {
        self.get(name).and_then(FieldValue::as_list)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validated, default-filled data for one slide render.
///
/// Only [`normalize`](super::normalize) builds one, so every declared field is
/// present and conforms to its constraints. Renderers take it by value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideInstance {
    layout: String,
    values: Record,
}

impl SlideInstance {
    pub(crate) fn new(layout: impl Into<String>, values: Record) -> Self {
        Self {
            layout: layout.into(),
            values,
        }
    }

    pub fn layout_id(&self) -> &str {
        &self.layout
    }

    pub fn values(&self) -> &Record {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> &str {
        self.values.text(name).unwrap_or_default()
    }

    pub fn number(&self, name: &str) -> f64 {
        self.values.number(name).unwrap_or_default()
    }

    pub fn boolean(&self, name: &str) -> bool {
        self.values.boolean(name).unwrap_or_default()
    }

    pub fn image(&self, name: &str) -> Option<&ImageRef> {
        self.values.image(name)
    }

    pub fn list(&self, name: &str) -> &[Record] {
        self.values.list(name).unwrap_or_default()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.values).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_ref_serializes_with_marker_keys() {
        let value = serde_json::to_value(ImageRef::new("https://x.test/a.png", "logo"))
            .expect("serialize image");
        assert_eq!(value["__image_url__"], "https://x.test/a.png");
        assert_eq!(value["__image_prompt__"], "logo");
    }

    #[test]
    fn record_keeps_insertion_order() {
        let record = Record::from_pairs([("b", 1.0), ("a", 2.0)]);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(record.number("a"), Some(2.0));
        assert_eq!(record.text("a"), None);
    }

    #[test]
    fn null_serializes_as_json_null() {
        let record = Record::from_pairs([("x", FieldValue::Null)]);
        let json = serde_json::to_value(&record).expect("serialize record");
        assert!(json["x"].is_null());
    }
}
