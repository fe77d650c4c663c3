pub mod config;
pub mod error;
pub mod naming;
pub mod network;
pub mod scene;
pub mod storage;

pub use crate::config::Configuration;
pub use crate::error::AppError;
pub use crate::naming::{InputName, NamingError, encode_output_name};
pub use crate::network::{Server, ServerBuilder};
pub use crate::scene::SceneDirectory;
pub use crate::storage::{Storage, StorageArea, StorageError};
