pub mod error;
pub mod shape;
pub mod store;

pub use error::ModelError;
pub use shape::{parse_strict, Shape, WatchSet};
pub use store::{Model, SubscriptionId, DEFAULT_MAX_CASCADE};
