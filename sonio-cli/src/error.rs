use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Acquisition error: {0}")]
    Acquisition(#[from] sonio_engine::AcquisitionError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("{failed} of {total} acquisitions failed")]
    Incomplete { failed: usize, total: usize },
}
