//! Stores two language variants of one resource and looks them up.
//!
//! Run with `RUST_LOG=varycache=trace` to see storage events.

use std::error::Error;
use std::io::Read;

use tracing_subscriber::{EnvFilter, fmt};
use varycache::cache::CacheStorage;
use varycache::{MemoryCacheStorage, Request, Response, StatusCode, StorageConfig};

const DEFAULT_FILTER: &str = "info";

fn localized(lang: &str, text: &str) -> Response {
    Response::new(StatusCode::OK)
        .header("Vary", "Accept-Language")
        .header("Content-Language", lang)
        .body(text.to_owned())
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    fmt().with_env_filter(filter).with_target(false).compact().try_init()?;

    let config = StorageConfig::from_json(r#"{ "capacity": 100, "vary_capacity": 4 }"#)?;
    let storage = MemoryCacheStorage::with_config(config)?;

    let uri = "http://example.com/greeting#top";
    storage.insert(
        &Request::new(uri)?.header("Accept-Language", "en"),
        localized("en", "Hello"),
    )?;
    storage.insert(
        &Request::new(uri)?.header("Accept-Language", "fr"),
        localized("fr", "Bonjour"),
    )?;

    for lang in ["en", "fr", "de"] {
        let request = Request::new(uri)?.header("Accept-Language", lang);
        match storage.get(&request) {
            Some(item) => {
                let mut body = String::new();
                if let Some(payload) = item.response().payload_ref() {
                    payload.open()?.read_to_string(&mut body)?;
                }
                println!("{lang}: hit ({body})");
            }
            None => println!("{lang}: miss"),
        }
    }

    println!("stored variants: {}", storage.size());
    for key in &storage {
        println!("  {key}");
    }

    storage.shutdown();
    Ok(())
}
