/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize` and call `Config::from_env()` at
/// startup. Field `database_url` maps to `DATABASE_URL`, and so on.
///
/// # Panics
///
/// Panics if any required env var is missing or cannot be deserialized.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Self {
        envy::from_env().expect("failed to load config from environment")
    }

    /// Like [`Config::from_env`] but reports the problem instead of panicking.
    fn try_from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
