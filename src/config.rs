use rocket::serde::de::DeserializeOwned;
use rocket::serde::Deserialize;
use std::path::PathBuf;

use crate::error::ConfigError;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum Backend {
    /// Talk to the charger cloud directly.
    #[default]
    Andersen,
    /// Record the desired mode in a thing shadow.
    Shadow,
}

#[derive(Deserialize, Debug, Default)]
#[serde(crate = "rocket::serde", default)]
pub struct Config {
    pub backend: Backend,
    pub andersen: AndersenConfig,
    pub shadow: ShadowConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "rocket::serde", default)]
pub struct AndersenConfig {
    pub username: String,
    pub password: String,
    pub device_name: String,
    pub client_id: String,
    pub auth_url: String,
    pub api_url: String,
}

impl Default for AndersenConfig {
    fn default() -> Self {
        AndersenConfig {
            username: String::new(),
            password: String::new(),
            device_name: String::new(),
            client_id: String::new(),
            auth_url: "https://cognito-idp.eu-west-1.amazonaws.com/".to_string(),
            api_url: "https://graphql.andersen-ev.com/graphql".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "rocket::serde", default)]
pub struct ShadowConfig {
    pub thing_name: String,
    pub directory: PathBuf,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        ShadowConfig {
            thing_name: "AndersonsEVCharger".to_string(),
            directory: PathBuf::from("shadows"),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "rocket::serde", default)]
pub struct ScheduleConfig {
    /// IANA name the nightly hour is evaluated in.
    pub timezone: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "rocket::serde", default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Secrets and names may come from the environment instead of the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides: [(&str, &mut String); 4] = [
            ("ANDERSEN_USERNAME", &mut self.andersen.username),
            ("ANDERSEN_PASSWORD", &mut self.andersen.password),
            ("ANDERSEN_DEVICE_NAME", &mut self.andersen.device_name),
            ("IOT_THING_NAME", &mut self.shadow.thing_name),
        ];
        for (name, field) in overrides {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == Backend::Andersen {
            self.andersen.validate()?;
        }
        if self.shadow.thing_name.trim().is_empty() {
            return Err(ConfigError::invalid("shadow.thing_name", "must not be empty"));
        }
        Ok(())
    }
}

impl AndersenConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("andersen.username", &self.username),
            ("andersen.password", &self.password),
            ("andersen.device_name", &self.device_name),
            ("andersen.client_id", &self.client_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid(field, "must be set"));
            }
        }
        Ok(())
    }
}

pub fn read_config<T: DeserializeOwned>(path: &str) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Reads the file (if any), applies environment overrides and validates.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let mut config: Config = match read_config(path) {
        Ok(config) => config,
        Err(ConfigError::Read { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            Config::default()
        }
        Err(e) => return Err(e),
    };
    config.apply_env_overrides(|name| std::env::var(name).ok());
    config.validate()?;
    Ok(config)
}
