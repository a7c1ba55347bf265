//! JSON-file-backed record store.
//!
//! The whole data file is one JSON object whose keys are collection names and
//! whose values are arrays of records. Every record carries a positive integer
//! `id`. Each mutation rewrites the file; there is no journaling, so the last
//! writer wins.

pub mod seed;

use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub type Document = Map<String, Value>;

/// Page size used when `_page` is given without `_limit`.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("No record {id} in {collection}")]
    RecordNotFound { collection: String, id: u64 },

    #[error("Record {id} already exists in {collection}")]
    DuplicateId { collection: String, id: u64 },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Malformed data file: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query options understood by [`JsonStore::list`].
///
/// Plain keys are equality filters on top-level fields, compared against the
/// string rendering of the stored value. Repeating a key ORs the values.
/// `_sort`, `_order`, `_page` and `_limit` control ordering and slicing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: Vec<(String, String)>,
    pub sort: Option<String>,
    pub order: SortOrder,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            match key.as_str() {
                "_sort" => query.sort = Some(value),
                "_order" => {
                    query.order = if value.eq_ignore_ascii_case("desc") {
                        SortOrder::Desc
                    } else {
                        SortOrder::Asc
                    }
                }
                "_page" => query.page = value.parse().ok().filter(|page| *page > 0),
                "_limit" => query.limit = value.parse().ok(),
                _ => query.filters.push((key, value)),
            }
        }
        query
    }

    /// Adds an equality filter.
    pub fn filter(mut self, field: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((field.into(), value.to_string()));
        self
    }

    /// Renders the query back into `key=value` pairs for a URL.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.filters.clone();
        if let Some(sort) = &self.sort {
            pairs.push(("_sort".to_string(), sort.clone()));
            if self.order == SortOrder::Desc {
                pairs.push(("_order".to_string(), "desc".to_string()));
            }
        }
        if let Some(page) = self.page {
            pairs.push(("_page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("_limit".to_string(), limit.to_string()));
        }
        pairs
    }

    fn matches(&self, record: &Value) -> bool {
        let mut fields: Vec<&str> = self.filters.iter().map(|(k, _)| k.as_str()).collect();
        fields.sort_unstable();
        fields.dedup();

        fields.iter().all(|field| {
            let actual = record.get(*field).map(render);
            self.filters
                .iter()
                .filter(|(k, _)| k == field)
                .any(|(_, expected)| actual.as_deref() == Some(expected.as_str()))
        })
    }
}

/// A slice of a collection plus the number of records that matched before
/// paging was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub records: Vec<Value>,
    pub total: usize,
}

pub struct JsonStore {
    path: PathBuf,
    document: RwLock<Document>,
}

impl JsonStore {
    /// Load the data file, seeding it first when it does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let document = match tokio::fs::read_to_string(&path).await {
            Ok(content) => into_document(serde_json::from_str(&content)?)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Seeding new data file at {}", path.display());
                let document = into_document(seed::default_document())?;
                write_document(&path, &document).await?;
                document
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            "Loaded {} collections from {}",
            document.len(),
            path.display()
        );

        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn collections(&self) -> Vec<String> {
        self.document.read().await.keys().cloned().collect()
    }

    /// The whole document, as served by `GET /db`.
    pub async fn snapshot(&self) -> Value {
        Value::Object(self.document.read().await.clone())
    }

    pub async fn list(&self, collection: &str, query: &ListQuery) -> Result<Listing, StoreError> {
        let document = self.document.read().await;
        let records = records(&document, collection)?;

        let mut matched: Vec<Value> = records
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();

        if let Some(field) = &query.sort {
            matched.sort_by(|a, b| {
                let ordering = compare_values(a.get(field), b.get(field));
                match query.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        let total = matched.len();
        let records = if query.page.is_none() && query.limit.is_none() {
            matched
        } else {
            let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
            match query.page.unwrap_or(1).saturating_sub(1).checked_mul(limit) {
                Some(start) => matched.into_iter().skip(start).take(limit).collect(),
                None => Vec::new(),
            }
        };

        Ok(Listing { records, total })
    }

    pub async fn get(&self, collection: &str, id: u64) -> Result<Value, StoreError> {
        let document = self.document.read().await;
        records(&document, collection)?
            .iter()
            .find(|record| record_id(record) == Some(id))
            .cloned()
            .ok_or_else(|| not_found(collection, id))
    }

    /// Append a record. A missing id is assigned as one past the largest id
    /// in the collection; an explicit id must not already be taken.
    pub async fn insert(&self, collection: &str, record: Value) -> Result<Value, StoreError> {
        let fields = into_fields(record)?;
        let record = self
            .mutate(collection, |records| {
                let id = match fields.get("id") {
                    None | Some(Value::Null) => next_id(records),
                    Some(value) => {
                        let id = parse_id(value).ok_or_else(|| {
                            StoreError::InvalidRecord("id must be a positive integer".to_string())
                        })?;
                        if records.iter().any(|r| record_id(r) == Some(id)) {
                            return Err(StoreError::DuplicateId {
                                collection: collection.to_string(),
                                id,
                            });
                        }
                        id
                    }
                };

                let record = Value::Object(with_id(id, fields));
                records.push(record.clone());
                Ok(record)
            })
            .await?;

        tracing::debug!("Inserted {}/{}", collection, record["id"]);
        Ok(record)
    }

    /// Replace a record wholesale. The stored id wins over any id in the body.
    pub async fn replace(
        &self,
        collection: &str,
        id: u64,
        record: Value,
    ) -> Result<Value, StoreError> {
        let fields = into_fields(record)?;
        self.mutate(collection, |records| {
            let position = position(records, collection, id)?;
            let record = Value::Object(with_id(id, fields));
            records[position] = record.clone();
            Ok(record)
        })
        .await
    }

    /// Shallow-merge `partial` into an existing record.
    pub async fn patch(
        &self,
        collection: &str,
        id: u64,
        partial: Value,
    ) -> Result<Value, StoreError> {
        let fields = into_fields(partial)?;
        self.mutate(collection, |records| {
            let position = position(records, collection, id)?;
            if let Some(existing) = records[position].as_object_mut() {
                for (key, value) in fields {
                    if key != "id" {
                        existing.insert(key, value);
                    }
                }
            }
            Ok(records[position].clone())
        })
        .await
    }

    /// Remove a record and return it.
    pub async fn remove(&self, collection: &str, id: u64) -> Result<Value, StoreError> {
        let removed = self
            .mutate(collection, |records| {
                let position = position(records, collection, id)?;
                Ok(records.remove(position))
            })
            .await?;

        tracing::debug!("Removed {}/{}", collection, id);
        Ok(removed)
    }

    /// Apply `change` to a staged copy of the document and write it out. The
    /// copy replaces the live document only once the file write succeeded, so
    /// a failed write leaves memory and disk in agreement.
    ///
    /// The write guard is held across the file write so writes land in the
    /// same order as the changes they carry.
    async fn mutate<T>(
        &self,
        collection: &str,
        change: impl FnOnce(&mut Vec<Value>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut document = self.document.write().await;
        let mut staged = document.clone();
        let outcome = change(records_mut(&mut staged, collection)?)?;

        write_document(&self.path, &staged).await?;
        *document = staged;
        Ok(outcome)
    }
}

/// Extract a record's id, accepting numeric strings.
pub fn record_id(record: &Value) -> Option<u64> {
    record.get("id").and_then(parse_id)
}

fn parse_id(value: &Value) -> Option<u64> {
    let id = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    };
    id.filter(|id| *id > 0)
}

fn next_id(records: &[Value]) -> u64 {
    records
        .iter()
        .filter_map(record_id)
        .max()
        .map_or(1, |max| max + 1)
}

fn with_id(id: u64, fields: Map<String, Value>) -> Map<String, Value> {
    let mut record = Map::with_capacity(fields.len() + 1);
    record.insert("id".to_string(), Value::from(id));
    for (key, value) in fields {
        if key != "id" {
            record.insert(key, value);
        }
    }
    record
}

fn into_fields(record: Value) -> Result<Map<String, Value>, StoreError> {
    match record {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::InvalidRecord(format!(
            "expected a JSON object, got {}",
            kind_of(&other)
        ))),
    }
}

fn into_document(value: Value) -> Result<Document, StoreError> {
    let Value::Object(document) = value else {
        return Err(StoreError::Malformed(
            "top level must be an object".to_string(),
        ));
    };

    for (name, collection) in &document {
        let Some(records) = collection.as_array() else {
            return Err(StoreError::Malformed(format!(
                "collection `{}` is not an array",
                name
            )));
        };
        if records.iter().any(|r| !r.is_object()) {
            return Err(StoreError::Malformed(format!(
                "collection `{}` holds a non-object record",
                name
            )));
        }
    }

    Ok(document)
}

async fn write_document(path: &Path, document: &Document) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let body = serde_json::to_string_pretty(document)?;
    tokio::fs::write(path, body).await?;
    Ok(())
}

fn records<'a>(document: &'a Document, collection: &str) -> Result<&'a Vec<Value>, StoreError> {
    document
        .get(collection)
        .and_then(Value::as_array)
        .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))
}

fn records_mut<'a>(
    document: &'a mut Document,
    collection: &str,
) -> Result<&'a mut Vec<Value>, StoreError> {
    document
        .get_mut(collection)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))
}

fn position(records: &[Value], collection: &str, id: u64) -> Result<usize, StoreError> {
    records
        .iter()
        .position(|record| record_id(record) == Some(id))
        .ok_or_else(|| not_found(collection, id))
}

fn not_found(collection: &str, id: u64) -> StoreError {
    StoreError::RecordNotFound {
        collection: collection.to_string(),
        id,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => render(x).cmp(&render(y)),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
