use pluggable_core::error::CoreError;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error("core: {0}")]
    Core(#[from] CoreError),

    #[error("runtime: {reason}")]
    Runtime { reason: String },

    #[error("config: {reason}")]
    Config { reason: String },

    #[error("config parse: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("collect timed out: event={event}, expected={expected}, received={received}")]
    CollectTimeout {
        event: String,
        expected: usize,
        received: usize,
    },
}

pub type HostResult<T> = Result<T, HostError>;
