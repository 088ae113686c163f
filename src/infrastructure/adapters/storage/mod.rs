//! Storage Adapters - 图片文件存储

mod file_storage;

pub use file_storage::{FileImageStorage, STORAGE_ROUTE};
