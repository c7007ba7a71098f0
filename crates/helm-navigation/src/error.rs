//! Navigation bridge error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("No dispatcher passed to navigation bridge")]
    MissingDispatcher,

    #[error("Invalid root prefix (must begin and end with '/'): {0}")]
    InvalidRoot(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] url::ParseError),
}
