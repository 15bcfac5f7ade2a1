//! Service bootstrap example
//!
//! Initializes the logger before anything else, then starts the datastore,
//! the cache and the HTTP server, each reporting through the shared handle.
//! A startup failure is logged with its cause and the process exits.
//!
//! Run with: cargo run --example startup
//! Fail the cache step with: CATALOG_DEMO_FAIL_CACHE=1 cargo run --example startup

use catalog_logger::prelude::*;
use catalog_logger::{info, warn};
use std::fmt;

#[derive(Debug)]
struct StartupError {
    component: &'static str,
    source: std::io::Error,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed to start", self.component)
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

struct Database {
    logger: LoggerHandle,
}

impl Database {
    fn init(logger: LoggerHandle) -> std::result::Result<Self, StartupError> {
        info!(logger, "Connected to datastore at {}", "postgres://localhost/catalog");
        Ok(Self { logger })
    }
}

struct Cache;

impl Cache {
    fn init(logger: &LoggerHandle) -> std::result::Result<Self, StartupError> {
        if std::env::var_os("CATALOG_DEMO_FAIL_CACHE").is_some() {
            return Err(StartupError {
                component: "cache",
                source: std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connect ECONNREFUSED 127.0.0.1:6379",
                ),
            });
        }
        logger.info("Cache connected");
        Ok(Self)
    }
}

fn serve(db: &Database, _cache: &Cache) {
    let requests = [
        HttpRequest::new("1.2.3.4", "GET", "/products", "1.1").with_header("user-agent", "curl/8.5.0"),
        HttpRequest::new("10.0.0.7", "GET", "/products/42", "1.1")
            .with_header("user-agent", "Mozilla/5.0")
            .with_header("referrer", "https://shop.example/"),
    ];
    for request in &requests {
        db.logger.http(request);
    }
    warn!(db.logger, "Served {} requests without a cache warmup", requests.len());
}

fn main() -> catalog_logger::Result<()> {
    let logger = init(LoggerConfig::default())?;

    let started = Database::init(logger.clone())
        .and_then(|db| Cache::init(&logger).map(|cache| (db, cache)));

    match started {
        Ok((db, cache)) => serve(&db, &cache),
        Err(e) => {
            logger.error_from("Error while initializing the application", &e);
            logger.flush()?;
            std::process::exit(1);
        }
    }

    logger.flush()?;
    Ok(())
}
