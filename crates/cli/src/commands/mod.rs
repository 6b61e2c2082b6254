//! CLI command implementations.

pub mod category;
pub mod migrate;

use secrecy::SecretString;

/// Read the database URL, preferring `BAZAAR_DATABASE_URL` over `DATABASE_URL`.
pub fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var("BAZAAR_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|url| !url.is_empty())
        .map(SecretString::from)
}
