mod device;
mod error;
mod metrics;
mod status;

pub mod prelude {
    pub use crate::device::{Device, DevicePolicy, DEFAULT_CPU_HOSTS};
    pub use crate::error::{
        BuildError, InvocationTimeoutError, ParseError, SetupError, EXIT_BUILD_FAILURE,
        EXIT_SETUP_FAILURE,
    };
    pub use crate::metrics::Metrics;
    pub use crate::status::{CaseOutcome, RunResult, RunStatus, Verdict};
}
