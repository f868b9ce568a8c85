//! Configuration loading helpers
//!
//! Layered loading with figment. Priority, highest first:
//! 1. Environment variables `<SERVICE>_*` (`__` separates nested keys)
//! 2. The YAML file (explicit path, or `config/<service>.yaml`)
//! 3. The service's `Default` values

use errors::{SyncMonError, SyncMonResult};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default config file location for a service
pub fn default_config_path(service_name: &str) -> PathBuf {
    PathBuf::from("config").join(format!("{}.yaml", service_name))
}

/// Build the layered figment for a service without extracting it
pub fn service_figment<T: Serialize + Default>(service_name: &str, path: Option<&Path>) -> Figment {
    let path = path.map_or_else(|| default_config_path(service_name), Path::to_path_buf);
    let prefix = format!("{}_", service_name.to_uppercase());

    if path.exists() {
        info!("Loading configuration from: {}", path.display());
    } else {
        info!(
            "Config file {} not found, using defaults and environment",
            path.display()
        );
    }

    Figment::from(Serialized::defaults(T::default()))
        .merge(Yaml::file(path))
        .merge(Env::prefixed(&prefix).split("__"))
}

/// Load a service configuration: defaults, then YAML file, then environment
pub fn load_service_config<T>(service_name: &str, path: Option<&Path>) -> SyncMonResult<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    service_figment::<T>(service_name, path)
        .extract()
        .map_err(|e| SyncMonError::config(format!("Failed to load configuration: {}", e)))
}
