pub mod logging;

pub use logging::{init_logging, verbosity_directive};
