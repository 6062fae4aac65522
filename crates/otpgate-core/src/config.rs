use std::path::Path;

/// Load `.env` from the working directory into the process environment, if the
/// file exists. Variables already set are left alone.
///
/// Call before [`init_tracing`](crate::tracing::init_tracing) so a `RUST_LOG`
/// kept in `.env` takes effect.
pub fn load_dotenv() {
    dotenv::dotenv().ok();
}

/// Same as [`load_dotenv`], for the `.env` file in `dir`.
pub fn load_dotenv_from(dir: &Path) {
    dotenv::from_path(dir.join(".env")).ok();
}

/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; field `db_host` is read from `DB_HOST`.
/// A `.env` file in the working directory is loaded first when present.
pub trait Config: Sized + serde::de::DeserializeOwned {
    /// Load configuration from the process environment.
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or cannot be deserialized. Missing
    /// configuration is a startup-fatal condition.
    fn from_env() -> Self {
        load_dotenv();
        match envy::from_env() {
            Ok(config) => config,
            Err(e) => panic!("failed to load config from environment: {e}"),
        }
    }

    /// Load configuration from an explicit set of `(NAME, value)` pairs.
    fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
