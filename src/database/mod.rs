pub mod collection;
pub mod manager;
pub mod models;
pub mod repository;

pub use collection::JsonCollection;
pub use manager::{DataStore, StoreError};
pub use repository::{ProjectRepository, QuestionRepository, UserRepository};
