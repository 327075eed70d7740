use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::RwLock;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::errors::BackendError;
use crate::record::Id;
use crate::store::{
    BatchResponse, Direction, FieldFailure, OrderBy, Paging, Query, RecordOutcome, RecordStore,
};

/// Fields the store assigns itself; writes never touch them.
const SYSTEM_FIELDS: [&str; 5] = ["Id", "Name", "Tags", "CreatedOn", "ModifiedOn"];

const NAME_FIELD: &str = "name_c";

/// An in-memory store for tests and local development. IDs are assigned
/// sequentially and metadata is stamped on writes, mirroring the remote
/// store. Two failure taps are available to tests: [`set_unreachable`]
/// takes the whole store offline, and a store built with [`rejecting`]
/// fails individual rows whose name contains the marker.
///
/// [`set_unreachable`]: MockStore::set_unreachable
/// [`rejecting`]: MockStore::rejecting
#[derive(Default)]
pub struct MockStore {
    state: RwLock<State>,
    reject_marker: Option<String>,
    unreachable: AtomicBool,
}

#[derive(Default)]
struct State {
    tables: HashMap<String, BTreeMap<Id, Value>>,
    next_id: Id,
}

impl MockStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a store that fails, at the row level, every write whose
    /// `name_c` contains `marker`.
    pub fn rejecting(marker: impl AsRef<str>) -> Self {
        MockStore {
            reject_marker: Some(marker.as_ref().to_owned()),
            ..Default::default()
        }
    }

    /// Takes the store offline (or back online): while offline, every
    /// operation fails as unreachable.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable
            .store(unreachable, std::sync::atomic::Ordering::SeqCst);
    }

    fn guard(&self) -> Result<(), BackendError> {
        if self.unreachable.load(std::sync::atomic::Ordering::SeqCst) {
            Err(BackendError::StoreUnreachable {
                message: "mock store is offline".to_owned(),
            })
        } else {
            Ok(())
        }
    }

    fn rejects(&self, record: &Value) -> bool {
        match &self.reject_marker {
            Some(marker) => record
                .get(NAME_FIELD)
                .and_then(Value::as_str)
                .map_or(false, |name| name.contains(marker.as_str())),
            None => false,
        }
    }

    fn fetch(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        self.guard()?;

        let state = self.state.read().unwrap();
        let mut rows: Vec<Value> = state
            .tables
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default();
        drop(state);

        sort_rows(&mut rows, &query.order_by);

        Ok(page(rows, query.paging)
            .into_iter()
            .map(|row| project(row, &query.fields))
            .collect())
    }

    fn by_id(&self, table: &str, id: Id, fields: &[String]) -> Result<Option<Value>, BackendError> {
        self.guard()?;

        let state = self.state.read().unwrap();

        Ok(state
            .tables
            .get(table)
            .and_then(|rows| rows.get(&id))
            .cloned()
            .map(|row| project(row, fields)))
    }

    fn create(&self, table: &str, records: Vec<Value>) -> Result<BatchResponse, BackendError> {
        self.guard()?;

        let mut state = self.state.write().unwrap();
        let mut results = vec![];

        for record in records {
            if self.rejects(&record) {
                results.push(rejected_outcome());
                continue;
            }

            state.next_id += 1;
            let id = state.next_id;
            let now = timestamp();

            let mut row = writable_fields(&record);
            row.insert("Id".to_owned(), Value::from(id));
            // the store mirrors the record's name into its Name metadata
            row.insert(
                "Name".to_owned(),
                record.get(NAME_FIELD).cloned().unwrap_or(Value::Null),
            );
            row.insert("Tags".to_owned(), Value::from(""));
            row.insert("CreatedOn".to_owned(), Value::from(now.clone()));
            row.insert("ModifiedOn".to_owned(), Value::from(now));

            let row = Value::Object(row);
            state
                .tables
                .entry(table.to_owned())
                .or_default()
                .insert(id, row.clone());

            results.push(succeeded_outcome(Some(row)));
        }

        Ok(BatchResponse { results })
    }

    fn update(&self, table: &str, records: Vec<Value>) -> Result<BatchResponse, BackendError> {
        self.guard()?;

        let mut state = self.state.write().unwrap();
        let mut results = vec![];

        for record in records {
            let id = match record.get("Id").and_then(Value::as_i64) {
                Some(id) => id,
                None => {
                    results.push(failed_outcome("record carries no Id".to_owned(), vec![]));
                    continue;
                }
            };

            if self.rejects(&record) {
                results.push(rejected_outcome());
                continue;
            }

            match state.tables.get_mut(table).and_then(|rows| rows.get_mut(&id)) {
                Some(row) => {
                    if let Value::Object(map) = row {
                        for (key, value) in writable_fields(&record) {
                            map.insert(key, value);
                        }
                        map.insert("ModifiedOn".to_owned(), Value::from(timestamp()));
                    }

                    results.push(succeeded_outcome(Some(row.clone())));
                }
                None => results.push(no_such_record_outcome(id)),
            }
        }

        Ok(BatchResponse { results })
    }

    fn delete(&self, table: &str, ids: Vec<Id>) -> Result<BatchResponse, BackendError> {
        self.guard()?;

        let mut state = self.state.write().unwrap();

        let results = ids
            .into_iter()
            .map(|id| {
                match state.tables.get_mut(table).and_then(|rows| rows.remove(&id)) {
                    Some(_) => succeeded_outcome(None),
                    None => no_such_record_outcome(id),
                }
            })
            .collect();

        Ok(BatchResponse { results })
    }
}

impl RecordStore for MockStore {
    fn fetch_records(
        &self,
        table: &str,
        query: Query,
    ) -> BoxFuture<Result<Vec<Value>, BackendError>> {
        let table = table.to_owned();

        async move { self.fetch(&table, &query) }.boxed()
    }

    fn record_by_id(
        &self,
        table: &str,
        id: Id,
        fields: Vec<String>,
    ) -> BoxFuture<Result<Option<Value>, BackendError>> {
        let table = table.to_owned();

        async move { self.by_id(&table, id, &fields) }.boxed()
    }

    fn create_records(
        &self,
        table: &str,
        records: Vec<Value>,
    ) -> BoxFuture<Result<BatchResponse, BackendError>> {
        let table = table.to_owned();

        async move { self.create(&table, records) }.boxed()
    }

    fn update_records(
        &self,
        table: &str,
        records: Vec<Value>,
    ) -> BoxFuture<Result<BatchResponse, BackendError>> {
        let table = table.to_owned();

        async move { self.update(&table, records) }.boxed()
    }

    fn delete_records(
        &self,
        table: &str,
        ids: Vec<Id>,
    ) -> BoxFuture<Result<BatchResponse, BackendError>> {
        let table = table.to_owned();

        async move { self.delete(&table, ids) }.boxed()
    }
}

fn sort_rows(rows: &mut Vec<Value>, order_by: &[OrderBy]) {
    rows.sort_by(|a, b| {
        for ordering in order_by {
            let left = a.get(&ordering.field).unwrap_or(&Value::Null);
            let right = b.get(&ordering.field).unwrap_or(&Value::Null);

            let comparison = match ordering.direction {
                Direction::Ascending => compare_values(left, right),
                Direction::Descending => compare_values(right, left),
            };

            if comparison != Ordering::Equal {
                return comparison;
            }
        }

        Ordering::Equal
    });
}

// string comparison is byte-wise, matching the store's case-sensitive
// collation
fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(left), Value::Number(right)) => left
            .as_f64()
            .partial_cmp(&right.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(left), Value::String(right)) => left.cmp(right),
        (left, right) => left.to_string().cmp(&right.to_string()),
    }
}

fn page(rows: Vec<Value>, paging: Option<Paging>) -> Vec<Value> {
    match paging {
        Some(paging) => rows
            .into_iter()
            .skip(paging.offset as usize)
            .take(paging.limit as usize)
            .collect(),
        None => rows,
    }
}

fn project(row: Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        return row;
    }

    match row {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| fields.iter().any(|field| field == key))
                .collect(),
        ),
        other => other,
    }
}

fn writable_fields(record: &Value) -> Map<String, Value> {
    match record {
        Value::Object(map) => map
            .iter()
            .filter(|(key, _)| !SYSTEM_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        _ => Map::new(),
    }
}

fn timestamp() -> String {
    OffsetDateTime::now_utc().format("%FT%TZ")
}

fn succeeded_outcome(data: Option<Value>) -> RecordOutcome {
    RecordOutcome {
        success: true,
        data,
        message: None,
        errors: vec![],
    }
}

fn failed_outcome(message: String, errors: Vec<FieldFailure>) -> RecordOutcome {
    RecordOutcome {
        success: false,
        data: None,
        message: Some(message),
        errors,
    }
}

fn rejected_outcome() -> RecordOutcome {
    failed_outcome(
        "value rejected by store".to_owned(),
        vec![FieldFailure {
            field: NAME_FIELD.to_owned(),
            message: "value rejected by store".to_owned(),
        }],
    )
}

fn no_such_record_outcome(id: Id) -> RecordOutcome {
    failed_outcome(format!("no record with ID {}", id), vec![])
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{compare_values, project};

    #[test]
    fn string_comparison_is_byte_wise() {
        use std::cmp::Ordering;

        let lower = Value::from("alice");
        let upper = Value::from("Bob");

        assert_eq!(compare_values(&upper, &lower), Ordering::Less);
    }

    #[test]
    fn projection_keeps_only_selected_fields() {
        let row = json!({ "Id": 1, "name_c": "Ann", "email_c": "a@x" });

        let projected = project(row, &["Id".to_owned(), "name_c".to_owned()]);

        assert_eq!(projected, json!({ "Id": 1, "name_c": "Ann" }));
    }
}
