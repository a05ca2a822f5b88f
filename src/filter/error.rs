use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),
}
