use url::Url;

use crate::record::Id;

/// Convenience wrapper for record-API URL generation.
#[derive(Clone)]
pub struct Urls {
    /// Top-level URL of the record API, including trailing slash.
    base: Url,
}

impl Urls {
    /// Creates a new instance. `base` must end in a slash for table paths
    /// to resolve under it.
    pub fn new(base: impl AsRef<str>) -> Self {
        let base =
            Url::parse(base.as_ref()).unwrap_or_else(|_| panic!("parse {} as URL", base.as_ref()));

        Urls { base }
    }

    /// URL for batch record operations on a table.
    pub fn records(&self, table: &str) -> Url {
        self.base
            .join(&format!("tables/{}/records", table))
            .expect("get records URL")
    }

    /// URL for a single record of a table.
    pub fn record(&self, table: &str, id: Id) -> Url {
        self.base
            .join(&format!("tables/{}/records/{}", table, id))
            .expect("get record URL")
    }

    /// URL for queries against a table.
    pub fn query(&self, table: &str) -> Url {
        self.base
            .join(&format!("tables/{}/query", table))
            .expect("get query URL")
    }
}
