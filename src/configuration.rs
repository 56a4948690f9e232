use config::{ConfigError, Environment};

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub store: StoreSettings,
    pub jwt: JwtSettings,
    pub polka: PolkaSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Directory served under `/app`
    pub static_dir: String,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct StoreSettings {
    pub path: String,
    /// Truncate the document file on boot
    pub reset_on_startup: bool,
}

/// Token issuing settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,  // seconds (3600 = 1 hour)
    pub refresh_token_expiry: i64, // seconds (5184000 = 60 days)
    pub issuer: String,
}

impl JwtSettings {
    /// Lifetimes must be positive and fit in a `chrono::Duration`
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, seconds) in [
            ("jwt.access_token_expiry", self.access_token_expiry),
            ("jwt.refresh_token_expiry", self.refresh_token_expiry),
        ] {
            if seconds <= 0 || chrono::Duration::try_seconds(seconds).is_none() {
                return Err(ConfigError::Message(format!(
                    "{} must be a positive number of seconds, got {}",
                    name, seconds
                )));
            }
        }
        Ok(())
    }
}

/// Billing webhook settings
#[derive(serde::Deserialize, Clone)]
pub struct PolkaSettings {
    pub api_key: String,
}

/// Load settings from `configuration.yaml` (optional) and `APP_*` variables.
///
/// `APP_JWT__SECRET=...` overrides `jwt.secret`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8080_i64)?
        .set_default("application.static_dir", "./public")?
        .set_default("store.path", "database.json")?
        .set_default("store.reset_on_startup", false)?
        .set_default("jwt.secret", "")?
        .set_default("jwt.access_token_expiry", 3600_i64)?
        .set_default("jwt.refresh_token_expiry", 60_i64 * 24 * 60 * 60)?
        .set_default("jwt.issuer", "chirpy")?
        .set_default("polka.api_key", "")?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;

    if settings.jwt.secret.is_empty() {
        return Err(ConfigError::Message("jwt.secret must be set".to_string()));
    }
    settings.jwt.validate()?;

    Ok(settings)
}
