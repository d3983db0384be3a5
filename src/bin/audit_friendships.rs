use std::env;

use dotenvy::dotenv;

use travel_journal::config::Config;
use travel_journal::database;
use travel_journal::services::friendship_service;
use travel_journal::services::pair_locks::PairLocks;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("friendship audit: {}", e);
            std::process::exit(1);
        }
    };
    let pool = match database::connect(&config.database_url, 1).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("friendship audit: cannot open database: {}", e);
            std::process::exit(1);
        }
    };

    let repair = env::var("AUDIT_REPAIR")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false);

    match friendship_service::audit(&pool, &PairLocks::new(), repair).await {
        Ok(report) => {
            println!(
                "friendship audit: incomplete={}, removed={}, failed={}",
                report.incomplete, report.removed, report.failed
            );
            if report.failed > 0 || (!repair && report.incomplete > 0) {
                std::process::exit(2);
            }
        }
        Err(e) => {
            eprintln!("friendship audit failed: {}", e);
            std::process::exit(1);
        }
    }
}
