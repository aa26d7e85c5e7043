mod query;
mod store;

pub use store::{DocumentStore, FindOptions, StoreError, StoreResult, TASKS, USERS};
