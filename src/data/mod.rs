//! Data loading, schema, and partitioning

pub mod dataset;
pub mod loader;
pub mod schema;
pub mod split;

pub use dataset::{Dataset, Label};
pub use loader::{DatasetLoader, LoadReport};
pub use split::{stratified_split, Split};
