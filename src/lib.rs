pub mod cli;
pub mod cloc;
pub mod config;
pub mod error;
pub mod git;
pub mod history;
pub mod logging;
pub mod model;
pub mod process;
pub mod series;
pub mod status;
pub mod storage;
pub mod sync;
pub mod timeseries;
pub mod util;
