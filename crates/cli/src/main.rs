//! truenas-backup: single-shot TrueNAS config backup to S3
//!
//! Reads its configuration from the environment, performs one backup run,
//! and exits. Exit code 0 with the uploaded filename on stdout; exit code
//! 1 with the failure on stderr. Progress lines go to stderr via tracing.

use tracing_subscriber::EnvFilter;

use tnb_core::Config;

mod run;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match run::run(&config).await {
        Ok(filename) => println!("Backup successful: {filename}"),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
