use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use lazy_static::lazy_static;
use structopt::StructOpt;

use log::{info, initialize_logger};

use faculty::environment::{Config, Environment};
use faculty::record::TeacherFields;
use faculty::service::TeacherService;
use faculty::store::HttpStore;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "seed-teachers",
    about = "Create sample teacher records in the store"
)]
struct Opt {
    /// The number of sample teachers to create
    #[structopt(default_value = "8")]
    count: usize,

    /// Milliseconds of artificial latency to apply before each call
    #[structopt(long)]
    latency: Option<u64>,
}

lazy_static! {
    static ref SAMPLES: Vec<TeacherFields> = vec![
        sample(
            "Grace Hopper",
            "grace.hopper@school.edu",
            "Computer Science",
            "2019-08-12"
        ),
        sample(
            "Emmy Noether",
            "emmy.noether@school.edu",
            "Mathematics",
            "2018-01-29"
        ),
        sample(
            "Lise Meitner",
            "lise.meitner@school.edu",
            "Physics",
            "2020-02-03"
        ),
        sample(
            "Rosalind Franklin",
            "rosalind.franklin@school.edu",
            "Chemistry",
            "2017-10-16"
        ),
        sample(
            "Barbara McClintock",
            "barbara.mcclintock@school.edu",
            "Biology",
            "2021-04-05"
        ),
        sample("Maya Angelou", "maya.angelou@school.edu", "English", ""),
        sample("Mary Beard", "mary.beard@school.edu", "History", "2016-09-01"),
        sample(
            "Joan Robinson",
            "joan.robinson@school.edu",
            "Economics",
            "2022-03-14"
        ),
    ];
}

fn sample(name: &str, email: &str, department: &str, hire_date: &str) -> TeacherFields {
    TeacherFields {
        name: name.to_owned(),
        email: email.to_owned(),
        department: department.to_owned(),
        hire_date: hire_date.to_owned(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();

    let logger = Arc::new(initialize_logger());

    let store = Arc::new(HttpStore::from_env());
    let config = Config::new(opt.latency.map(Duration::from_millis));
    let environment = Environment::new(logger.clone(), store, config);

    let service = TeacherService::new(&environment);

    let records: Vec<TeacherFields> = SAMPLES.iter().cycle().take(opt.count).cloned().collect();

    info!(logger, "Seeding teachers..."; "count" => records.len());

    let created = service.import(records).await?;

    println!(
        "Created teachers:\n{}",
        created
            .into_iter()
            .map(|teacher| format!("{} ({})", teacher.id, teacher.name))
            .collect::<Vec<_>>()
            .join("\n")
    );

    Ok(())
}
