// Retry-hardened I/O

pub mod fs;
pub mod ops;

pub use fs::{FileSystem, LocalFileSystem};
pub use ops::{retry, RetryPolicy, RetryableOps};
