pub mod collection_io;
pub mod config_io;
pub mod file_storage;
pub mod memory;
pub mod project_io;
pub mod remote;
pub mod storage;
pub mod watcher;
