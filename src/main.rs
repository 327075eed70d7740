use std::env;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, initialize_logger};

use faculty::environment::{Config, Environment};
use faculty::screen::{LoadState, TeachersScreen};
use faculty::store::HttpStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let store = Arc::new(HttpStore::from_env());

    let simulated_latency = env::var("FACULTY_SIMULATED_LATENCY_MS")
        .ok()
        .map(|raw| {
            raw.parse::<u64>()
                .expect("parse FACULTY_SIMULATED_LATENCY_MS as u64")
        })
        .map(Duration::from_millis);

    info!(logger, "Starting..."; "simulated_latency" => ?simulated_latency);
    let logger = Arc::new(logger);

    let config = Config::new(simulated_latency);
    let environment = Environment::new(logger.clone(), store, config);

    let mut screen = TeachersScreen::new(&environment);

    if let Some(search) = env::args().nth(1) {
        screen.set_search(search);
    }

    screen.load().await;

    if let LoadState::Failed(message) = screen.state() {
        error!(logger, "Initial load failed"; "message" => %message);
        return Err(message.clone().into());
    }

    for teacher in screen.filtered() {
        println!("{}", serde_json::to_string(teacher)?);
    }

    info!(logger, "Exiting gracefully...");

    Ok(())
}
