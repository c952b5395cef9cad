use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PsdError {
    #[error("missing signal: {0}")]
    MissingSignal(String),
    #[error("signal source error: {0}")]
    Source(String),
    #[error("command sink error: {0}")]
    Sink(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
