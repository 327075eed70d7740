use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::BackendError;
use crate::record::Id;

pub mod mock;

pub use self::http::HttpStore;

mod http;

/// The remote record store, seen through its five logical operations.
/// Implementations normalize transport failures and top-level rejections
/// into [`BackendError`]s; row-level outcomes inside batch writes are
/// returned as-is for the caller to police.
pub trait RecordStore: Send + Sync {
    /// Fetches the records of `table` matching `query`.
    fn fetch_records(
        &self,
        table: &str,
        query: Query,
    ) -> BoxFuture<Result<Vec<Value>, BackendError>>;

    /// Fetches a single record of `table`, or `None` if no record has the
    /// given ID.
    fn record_by_id(
        &self,
        table: &str,
        id: Id,
        fields: Vec<String>,
    ) -> BoxFuture<Result<Option<Value>, BackendError>>;

    /// Inserts the given records into `table`.
    fn create_records(
        &self,
        table: &str,
        records: Vec<Value>,
    ) -> BoxFuture<Result<BatchResponse, BackendError>>;

    /// Replaces the writable fields of the records identified by the `Id`
    /// each record carries.
    fn update_records(
        &self,
        table: &str,
        records: Vec<Value>,
    ) -> BoxFuture<Result<BatchResponse, BackendError>>;

    /// Removes the identified records from `table`.
    fn delete_records(
        &self,
        table: &str,
        ids: Vec<Id>,
    ) -> BoxFuture<Result<BatchResponse, BackendError>>;
}

/// A query against a single table of the record store.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Query {
    /// The fields to return for each record. Empty means all.
    pub fields: Vec<String>,

    /// The orderings to apply, in priority order.
    #[serde(rename = "orderBy")]
    pub order_by: Vec<OrderBy>,

    /// The page of records to return.
    #[serde(rename = "pagingInfo")]
    pub paging: Option<Paging>,
}

/// A single ordering inside a [`Query`].
#[derive(Clone, Debug, Serialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field: String,

    #[serde(rename = "sorttype")]
    pub direction: Direction,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub enum Direction {
    #[serde(rename = "ASC")]
    Ascending,

    #[serde(rename = "DESC")]
    Descending,
}

/// A page window inside a [`Query`].
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Paging {
    pub limit: u32,
    pub offset: u32,
}

/// The store's response to a batch write: one outcome per record, in
/// submission order. The store may apply some records and reject others
/// within the same batch.
#[derive(Clone, Debug)]
pub struct BatchResponse {
    pub results: Vec<RecordOutcome>,
}

/// The outcome of a single record inside a batch write.
#[derive(Clone, Debug, Deserialize)]
pub struct RecordOutcome {
    pub success: bool,

    #[serde(default)]
    pub data: Option<Value>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub errors: Vec<FieldFailure>,
}

/// A field-level failure reported by the store.
#[derive(Clone, Debug, Deserialize)]
pub struct FieldFailure {
    #[serde(rename = "fieldLabel")]
    pub field: String,

    pub message: String,
}

/// A failed record in a batch write, kept for diagnostics.
#[derive(Clone, Debug)]
pub struct RecordFailure {
    /// Position of the record in the submitted batch.
    pub index: usize,

    pub message: String,

    pub fields: Vec<FieldFailure>,
}
