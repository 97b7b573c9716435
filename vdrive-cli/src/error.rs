use inquire::error::InquireError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VdriveCliError {
    #[error("Input error: {0}")]
    Input(String),
    #[error("{0}")]
    Session(#[from] vdrive::SessionError),
    #[error("{0}")]
    Vfs(#[from] vdrive::vfs::VfsError),
    #[error("{0}")]
    Store(#[from] vdrive::store::StoreError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    RuntimeError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    InteractionError(#[from] InquireError),
}

pub type Result<T> = std::result::Result<T, VdriveCliError>;
