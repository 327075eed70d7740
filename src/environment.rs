use std::sync::Arc;
use std::time::Duration;

use log::Logger;

use crate::store::RecordStore;

/// Bundles the collaborators the application is wired with.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub store: Arc<dyn RecordStore>,
    pub config: Config,
}

impl Environment {
    pub fn new(logger: Arc<Logger>, store: Arc<dyn RecordStore>, config: Config) -> Self {
        Self {
            logger,
            store,
            config,
        }
    }
}

/// Runtime settings read from the environment.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Artificial delay applied before each store call, to mimic remote
    /// latency during demonstrations. Off when `None`.
    pub(crate) simulated_latency: Option<Duration>,
}

impl Config {
    pub fn new(simulated_latency: Option<Duration>) -> Self {
        Self { simulated_latency }
    }
}
