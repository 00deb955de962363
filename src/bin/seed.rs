// src/bin/seed.rs
// Loads data/stores.json into the database for local development.
// Usage: seed [--wipe]

use anyhow::{Context, Result};
use dotenv::dotenv;
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::env;

use storefinder::config::Config;
use storefinder::db::{StoreRepository, UserRepository};
use storefinder::models::StoreInput;
use storefinder::services::store_service::{slugify, StoreService};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

#[derive(Debug, Deserialize)]
struct SeedFile {
    author: SeedAuthor,
    stores: Vec<SeedStore>,
}

#[derive(Debug, Deserialize)]
struct SeedAuthor {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SeedStore {
    name: String,
    description: String,
    address: String,
    lng: f64,
    lat: f64,
    #[serde(default)]
    tags: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let config = Config::from_env();
    let wipe = env::args().any(|arg| arg == "--wipe");

    let raw = std::fs::read_to_string("data/stores.json").context("reading data/stores.json")?;
    let seed: SeedFile = serde_json::from_str(&raw).context("parsing data/stores.json")?;

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&config.database_url)
        .await
        .context("connecting to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("running migrations")?;

    if wipe {
        sqlx::query("TRUNCATE user_hearts, reviews, stores, users")
            .execute(&pool)
            .await
            .context("wiping tables")?;
        println!("{}Wiped existing data{}", YELLOW, RESET);
    }

    let email = seed.author.email.to_lowercase();
    let author = match UserRepository::find_by_email(&pool, &email).await? {
        Some(user) => {
            println!("{}Author {} already exists{}", CYAN, email, RESET);
            user
        }
        None => {
            let hash = bcrypt::hash(&seed.author.password, bcrypt::DEFAULT_COST)
                .context("hashing seed password")?;
            let user = UserRepository::insert(&pool, &seed.author.name, &email, &hash).await?;
            println!("{}Created author {}{}", GREEN, email, RESET);
            user
        }
    };

    let mut created = 0usize;
    let mut skipped = 0usize;

    for store in &seed.stores {
        // Idempotent re-runs: a store whose base slug exists is skipped
        let base = slugify(&store.name);
        if StoreRepository::get_by_slug(&pool, &base).await.is_ok() {
            skipped += 1;
            continue;
        }

        let input = StoreInput {
            name: store.name.clone(),
            description: store.description.clone(),
            address: store.address.clone(),
            longitude: store.lng,
            latitude: store.lat,
            tags: store.tags.clone(),
        };

        let store = StoreService::create(&pool, input, None, author.id).await?;
        println!("{}+ {}{}", GREEN, store.name, RESET);
        created += 1;
    }

    println!(
        "{}{}Done: {} created, {} skipped{}",
        BOLD, CYAN, created, skipped, RESET
    );
    Ok(())
}
