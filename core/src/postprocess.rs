//! Response records and per-command post-processing.
//!
//! The API omits some fields and, when filtered by a joined dimension,
//! returns the same row more than once. A [`ResponsePostProcessor`]
//! compensates for both before the result reaches output. Deduplication
//! never touches the collection metadata: `total` keeps reporting what the
//! server said.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ProcessingError;

/// A single server-side record.
pub type Record = Map<String, Value>;

/// Pagination and search metadata of a collection.
///
/// Holds every top-level key of the body other than `results`, exactly as
/// the server sent it (`sort`, explicit nulls and unknown keys included).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionMeta {
    fields: Map<String, Value>,
}

impl CollectionMeta {
    /// Total number of records on the server.
    pub fn total(&self) -> Option<u64> {
        self.count("total")
    }

    /// Number of records matching the search.
    pub fn subtotal(&self) -> Option<u64> {
        self.count("subtotal")
    }

    pub fn page(&self) -> Option<u64> {
        self.count("page")
    }

    pub fn per_page(&self) -> Option<u64> {
        self.count("per_page")
    }

    /// The search the server applied.
    pub fn search(&self) -> Option<&str> {
        self.fields.get("search").and_then(Value::as_str)
    }

    /// Raw value of a metadata key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Sets a metadata key.
    pub fn set(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    /// All metadata keys and values.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn count(&self, key: &str) -> Option<u64> {
        self.fields.get(key).and_then(Value::as_u64)
    }
}

impl From<Map<String, Value>> for CollectionMeta {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// An ordered list of records plus metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordCollection {
    pub records: Vec<Record>,
    pub meta: CollectionMeta,
}

impl RecordCollection {
    /// Creates a collection whose `total` matches the record count.
    pub fn new(records: Vec<Record>) -> Self {
        let mut meta = CollectionMeta::default();
        meta.set("total", Value::from(records.len() as u64));
        Self { records, meta }
    }
}

/// What a request returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Record(Record),
    Collection(RecordCollection),
    /// No body (e.g. a delete).
    Empty,
}

impl Response {
    /// Interprets an API response body.
    ///
    /// An object with a `results` array is a collection, any other object a
    /// record, `null` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingError::MalformedResponse`] for other shapes and
    /// [`ProcessingError::MalformedRecord`] for non-object results.
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_command_core::Response;
    /// use serde_json::json;
    ///
    /// let body = json!({"total": 3, "page": 1, "results": [{"id": 1}]});
    /// let Response::Collection(collection) = Response::from_json(body).unwrap() else {
    ///     panic!("expected a collection");
    /// };
    /// assert_eq!(collection.records.len(), 1);
    /// assert_eq!(collection.meta.total(), Some(3));
    /// ```
    pub fn from_json(body: Value) -> Result<Self, ProcessingError> {
        match body {
            Value::Null => Ok(Response::Empty),
            Value::Object(mut map) => match map.remove("results") {
                Some(Value::Array(results)) => {
                    let records = results
                        .into_iter()
                        .map(into_record)
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Response::Collection(RecordCollection {
                        records,
                        meta: CollectionMeta::from(map),
                    }))
                }
                Some(other) => {
                    map.insert("results".to_string(), other);
                    Ok(Response::Record(map))
                }
                None => Ok(Response::Record(map)),
            },
            other => Err(ProcessingError::MalformedResponse(kind_of(&other).to_string())),
        }
    }

    /// Renders the response back to JSON in the API's shape.
    pub fn to_json(&self) -> Value {
        match self {
            Response::Empty => Value::Null,
            Response::Record(record) => Value::Object(record.clone()),
            Response::Collection(collection) => {
                let mut body = collection.meta.as_map().clone();
                body.insert(
                    "results".to_string(),
                    Value::Array(
                        collection
                            .records
                            .iter()
                            .cloned()
                            .map(Value::Object)
                            .collect(),
                    ),
                );
                Value::Object(body)
            }
        }
    }
}

fn into_record(value: Value) -> Result<Record, ProcessingError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ProcessingError::MalformedRecord(kind_of(&other).to_string())),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A field default injected into records that lack a usable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefault {
    pub field: String,
    pub value: Value,
}

/// Per-command response normalization.
///
/// # Examples
///
/// ```
/// use resource_command_core::*;
/// use serde_json::json;
///
/// let post = ResponsePostProcessor::new()
///     .with_default("parameter_type", json!("string"))
///     .deduplicated();
///
/// let row = json!({"id": 1, "parameter": "ntp"}).as_object().unwrap().clone();
/// let mut collection = RecordCollection::new(vec![row.clone(), row]);
/// collection.meta.set("total", json!(2));
///
/// let Response::Collection(out) = post.process(Response::Collection(collection)) else {
///     panic!("expected a collection");
/// };
/// assert_eq!(out.records.len(), 1);
/// assert_eq!(out.meta.total(), Some(2));
/// assert_eq!(out.records[0]["parameter_type"], json!("string"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponsePostProcessor {
    pub defaults: Vec<FieldDefault>,
    pub deduplicate: bool,
}

impl ResponsePostProcessor {
    /// Creates a post-processor that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field default.
    pub fn with_default(mut self, field: &str, value: Value) -> Self {
        self.defaults.push(FieldDefault {
            field: field.to_string(),
            value,
        });
        self
    }

    /// Collapses structurally identical records of collections.
    pub fn deduplicated(mut self) -> Self {
        self.deduplicate = true;
        self
    }

    /// Applies the configured behaviors to a response.
    ///
    /// Malformed bodies never get here; [`Response::from_json`] rejects
    /// them.
    pub fn process(&self, response: Response) -> Response {
        match response {
            Response::Empty => Response::Empty,
            Response::Record(mut record) => {
                self.inject_defaults(&mut record);
                Response::Record(record)
            }
            Response::Collection(mut collection) => {
                if self.deduplicate {
                    collection = deduplicate(collection);
                }
                for record in &mut collection.records {
                    self.inject_defaults(record);
                }
                Response::Collection(collection)
            }
        }
    }

    /// Fills configured fields that are missing, null, false or empty.
    pub fn inject_defaults(&self, record: &mut Record) {
        for default in &self.defaults {
            let blank = record.get(&default.field).is_none_or(is_blank);
            if blank {
                record.insert(default.field.clone(), default.value.clone());
            }
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Drops records structurally identical to an earlier one.
///
/// Order of first occurrences and the metadata are preserved.
///
/// # Examples
///
/// ```
/// use resource_command_core::*;
/// use serde_json::json;
///
/// let r1 = json!({"id": 1}).as_object().unwrap().clone();
/// let r2 = json!({"id": 2}).as_object().unwrap().clone();
/// let collection = RecordCollection::new(vec![r1.clone(), r1.clone(), r2.clone()]);
///
/// let out = deduplicate(collection);
/// assert_eq!(out.records, vec![r1, r2]);
/// assert_eq!(out.meta.total(), Some(3));
/// ```
pub fn deduplicate(collection: RecordCollection) -> RecordCollection {
    let RecordCollection { records, meta } = collection;
    let before = records.len();
    // Map keys are sorted, so equal records serialize identically.
    let mut seen: HashSet<String> = HashSet::with_capacity(before);

    let records: Vec<Record> = records
        .into_iter()
        .filter(|record| seen.insert(Value::Object(record.clone()).to_string()))
        .collect();

    if records.len() != before {
        debug!(
            before,
            after = records.len(),
            "Dropped duplicate records"
        );
    }

    RecordCollection { records, meta }
}
