pub mod log;
pub mod repo;

pub use self::log::{parse_log, LogFilter, DEFAULT_NOISE_PATTERNS, LOG_FORMAT};
pub use repo::{GitRepo, RestoreGuard, Vcs};
