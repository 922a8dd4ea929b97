use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid labels allow list at position {position}: {reason}")]
    LabelsAllowList { position: usize, reason: &'static str },

    #[error("cannot read config file {path}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode config file {path}")]
    DecodeConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{0} and {1} are mutually exclusive")]
    Conflict(&'static str, &'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
