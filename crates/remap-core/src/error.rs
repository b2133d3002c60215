use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemapError {
    #[error("not initialized: run 'remap init'")]
    NotInitialized,

    #[error("plan not found: {0}")]
    PlanNotFound(String),

    #[error("plan already exists: {0}")]
    PlanExists(String),

    #[error("plan entry not found: {0}")]
    EntryNotFound(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("plan '{slug}' is {status}: {reason}")]
    PlanNotEditable {
        slug: String,
        status: String,
        reason: String,
    },

    #[error("invalid strategy '{0}': valid values are monetization_first, traffic_first, quick_wins")]
    InvalidStrategy(String),

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("invalid import '{path}': {reason}")]
    InvalidImport { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RemapError>;
