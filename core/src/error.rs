use thiserror::Error;

/// Everything a registry operation can fail with. No variant is fatal:
/// a failing call leaves the registry exactly as it was.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("empty {what}!")]
    InvalidArgument { what: &'static str },

    #[error("user '{id}' already exists!")]
    AlreadyExists { id: String },

    #[error("user '{id}' not registered!")]
    NotFound { id: String },

    #[error("user '{id}' already connected!")]
    AlreadyConnected { id: String },

    #[error("user '{id}' not connected!")]
    NotConnected { id: String },
}

pub type RegistryResult<T> = Result<T, RegistryError>;
