//! Problem dataset loading

mod loader;

pub use loader::{DatasetError, load_problems};
