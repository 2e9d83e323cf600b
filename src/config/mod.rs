mod scan_config;
mod scan_filter;

pub use scan_config::{ScanConfig, ScanConfigError};
pub(crate) use scan_config::InvalidPatternSnafu;
pub use scan_filter::ScanFilter;
