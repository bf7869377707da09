//! Sink utilities for disk I/O
//!
//! - **disk_writer**: buffered local file implementing [`FileStateWriter`]
//! - **compress**: LZ4 frame compression of rotated-away files
//! - **rate_limited_logger**: keeps per-message failures from flooding the log
//!
//! [`FileStateWriter`]: crate::FileStateWriter

pub mod compress;
pub mod disk_writer;
pub mod rate_limited_logger;

pub use compress::{COMPRESSED_EXTENSION, compress_file, compressed_path};
pub use disk_writer::{DEFAULT_BUFFER_SIZE, DiskWriter};
pub use rate_limited_logger::{DEFAULT_LOG_INTERVAL, MAX_DATA_LOG_LENGTH, RateLimitedLogger};
