pub mod app_config;
pub mod config;
pub mod platforms;
pub mod products;
pub mod repository;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use platforms::{
    load_platforms, parse_platforms, CategoryRoutes, ExtractionProfile, PlatformsFile,
};
pub use products::{Listing, NewProduct, PlatformResult, StoredProduct};
pub use repository::{Repository, RepositoryError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read platforms file {path}: {source}")]
    PlatformsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse platforms file: {0}")]
    PlatformsFileParse(#[from] serde_yaml::Error),

    #[error("invalid platforms configuration: {0}")]
    Validation(String),
}
