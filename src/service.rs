use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, o, Logger};
use serde_json::Value;

use crate::environment::Environment;
use crate::errors::{describe_field_failures, BackendError};
use crate::record::{Id, Teacher, TeacherFields};
use crate::store::{BatchResponse, Direction, OrderBy, Paging, Query, RecordFailure, RecordStore};

/// The name of the table holding teacher records.
pub const TEACHERS_TABLE: &str = "teachers_c";

/// The page of records requested from the store. Listing is capped at a
/// single fixed-size page.
const PAGE: Paging = Paging {
    limit: 100,
    offset: 0,
};

/// The fields requested from the store on every read: the business fields
/// plus the store-assigned metadata.
const TEACHER_FIELDS: [&str; 9] = [
    "Id",
    "Name",
    "Tags",
    "CreatedOn",
    "ModifiedOn",
    "name_c",
    "email_c",
    "department_c",
    "hire_date_c",
];

/// Provides access to the teacher records held in the remote store.
///
/// One error contract for every operation: failures are logged here and
/// propagated to the caller. Reads return empty results only when the
/// store is genuinely empty, so "no data" and "error" stay
/// distinguishable.
#[derive(Clone)]
pub struct TeacherService {
    logger: Arc<Logger>,
    store: Arc<dyn RecordStore>,
    simulated_latency: Option<Duration>,
}

impl TeacherService {
    pub fn new(environment: &Environment) -> Self {
        TeacherService {
            logger: environment.logger.clone(),
            store: environment.store.clone(),
            simulated_latency: environment.config.simulated_latency,
        }
    }

    /// Lists all teachers, ordered by name ascending. Ordering is
    /// delegated to the store and follows its collation.
    pub async fn list(&self) -> Result<Vec<Teacher>, BackendError> {
        self.simulate_latency().await;

        debug!(self.logger, "Fetching teachers...");

        let query = Query {
            fields: selected_fields(),
            order_by: vec![OrderBy {
                field: "name_c".to_owned(),
                direction: Direction::Ascending,
            }],
            paging: Some(PAGE),
        };

        let rows = self
            .store
            .fetch_records(TEACHERS_TABLE, query)
            .await
            .map_err(|e| self.report("list teachers", e))?;

        rows.into_iter().map(decode_teacher).collect()
    }

    /// Retrieves a single teacher, or `None` if no record has the given ID.
    pub async fn retrieve(&self, id: Id) -> Result<Option<Teacher>, BackendError> {
        self.simulate_latency().await;

        let logger = self.logger.new(o!("id" => id));
        debug!(logger, "Fetching teacher...");

        let row = self
            .store
            .record_by_id(TEACHERS_TABLE, id, selected_fields())
            .await
            .map_err(|e| self.report("retrieve teacher", e))?;

        row.map(decode_teacher).transpose()
    }

    /// Creates a teacher from the four writable fields and returns the
    /// stored record, including its assigned ID.
    pub async fn create(&self, fields: TeacherFields) -> Result<Teacher, BackendError> {
        self.simulate_latency().await;

        debug!(self.logger, "Creating teacher..."; "name" => %fields.name);

        let response = self
            .store
            .create_records(TEACHERS_TABLE, vec![encode_fields(&fields)])
            .await
            .map_err(|e| self.report("create teacher", e))?;

        let record = self.single_result("create", response)?;

        decode_teacher(record)
    }

    /// Replaces the four writable fields of the identified teacher and
    /// returns the stored record. Updating a non-existent ID fails and
    /// alters nothing.
    pub async fn update(&self, id: Id, fields: TeacherFields) -> Result<Teacher, BackendError> {
        self.simulate_latency().await;

        let logger = self.logger.new(o!("id" => id));
        debug!(logger, "Updating teacher...");

        let mut record = encode_fields(&fields);
        insert_id(&mut record, id);

        let response = self
            .store
            .update_records(TEACHERS_TABLE, vec![record])
            .await
            .map_err(|e| self.report("update teacher", e))?;

        let record = self.single_result("update", response)?;

        decode_teacher(record)
    }

    /// Deletes the identified teacher. Returns `true` on success;
    /// deleting a non-existent ID fails.
    pub async fn delete(&self, id: Id) -> Result<bool, BackendError> {
        self.simulate_latency().await;

        let logger = self.logger.new(o!("id" => id));
        debug!(logger, "Deleting teacher...");

        let response = self
            .store
            .delete_records(TEACHERS_TABLE, vec![id])
            .await
            .map_err(|e| self.report("delete teacher", e))?;

        self.require_success("delete", 1, response)?;

        Ok(true)
    }

    /// Creates several teachers in one batch write and returns the stored
    /// records. Any failed record fails the whole call.
    pub async fn import(&self, records: Vec<TeacherFields>) -> Result<Vec<Teacher>, BackendError> {
        self.simulate_latency().await;

        debug!(self.logger, "Importing teachers..."; "count" => records.len());

        let attempted = records.len();
        let encoded: Vec<Value> = records.iter().map(encode_fields).collect();

        let response = self
            .store
            .create_records(TEACHERS_TABLE, encoded)
            .await
            .map_err(|e| self.report("import teachers", e))?;

        self.require_success("import", attempted, response)?
            .into_iter()
            .map(decode_teacher)
            .collect()
    }

    /// Splits a batch response into succeeded rows and failures. Any
    /// row-level failure fails the whole call; the rows that did succeed
    /// travel inside the error so the caller still sees their outcome.
    fn require_success(
        &self,
        operation: &str,
        attempted: usize,
        response: BatchResponse,
    ) -> Result<Vec<Value>, BackendError> {
        let mut succeeded = vec![];
        let mut failed = vec![];

        for (index, outcome) in response.results.into_iter().enumerate() {
            if outcome.success {
                succeeded.push(outcome.data.unwrap_or(Value::Null));
            } else {
                failed.push(RecordFailure {
                    index,
                    message: outcome
                        .message
                        .unwrap_or_else(|| "no failure message provided".to_owned()),
                    fields: outcome.errors,
                });
            }
        }

        if failed.is_empty() {
            return Ok(succeeded);
        }

        for failure in &failed {
            error!(self.logger, "Record failed to {}", operation;
                "index" => failure.index,
                "message" => %failure.message,
                "fields" => describe_field_failures(&failure.fields));
        }

        Err(BackendError::RecordsFailed {
            attempted,
            succeeded,
            failed,
        })
    }

    fn single_result(
        &self,
        operation: &str,
        response: BatchResponse,
    ) -> Result<Value, BackendError> {
        let mut succeeded = self.require_success(operation, 1, response)?;

        succeeded.pop().ok_or_else(|| BackendError::StoreRejected {
            message: format!("store reported no outcome for the record to {}", operation),
        })
    }

    fn report(&self, operation: &str, error: BackendError) -> BackendError {
        error!(self.logger, "Failed to {}", operation; "error" => %error);

        error
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn selected_fields() -> Vec<String> {
    TEACHER_FIELDS.iter().map(|field| (*field).to_owned()).collect()
}

fn encode_fields(fields: &TeacherFields) -> Value {
    serde_json::to_value(fields).expect("serialize writable teacher fields")
}

fn insert_id(record: &mut Value, id: Id) {
    if let Value::Object(map) = record {
        map.insert("Id".to_owned(), Value::from(id));
    }
}

fn decode_teacher(row: Value) -> Result<Teacher, BackendError> {
    serde_json::from_value(row).map_err(|source| BackendError::MalformedStoreResponse { source })
}
