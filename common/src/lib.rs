pub mod config;
pub mod error;
pub mod plot;
pub mod results;
pub mod series;
pub mod util;

pub use error::{ReportError, Result};
