//! Employee Search
//!
//! Entry point for the employee search client. Loads the employee file into
//! two collections and reports counts, searches and facets on stdout.

use std::error::Error;
use std::io;

use employee_search::{AppError, Dependencies, DemoRunner, Settings};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    if let Err(e) = run().await {
        error!("Run failed: {}", e);
        eprintln!("\nError: {}", e);

        // Print error chain for debugging
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("  Caused by: {}", err);
            source = err.source();
        }

        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run() -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    let dependencies = Dependencies::new(&settings).await?;
    let runner = DemoRunner::new(dependencies);

    info!("Starting demonstration sequence");
    runner.run(&mut io::stdout()).await?;
    runner.close();

    info!("Demonstration sequence completed");
    Ok(())
}
