pub mod detectors;
pub mod error;
pub mod io;
pub mod metrics;
pub mod preprocess;
pub mod signal;

pub use detectors::*;
pub use error::*;
pub use metrics::*;
pub use preprocess::*;
pub use signal::*;
