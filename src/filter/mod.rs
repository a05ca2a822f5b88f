//! Dashboard-side view over a fetched question list: category and text
//! filtering, explicit shuffling and fixed-size pages.

pub mod error;
pub mod page;
pub mod questions;
pub mod types;

pub use error::FilterError;
pub use page::{paginate, Page, DEFAULT_PAGE_SIZE};
pub use questions::{categories, filter_questions, shuffle};
pub use types::*;
