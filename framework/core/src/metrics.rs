/// Timings reported by a single tool invocation, in milliseconds.
///
/// Tools that don't report write or read timings leave those fields at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub encrypt_time_ms: f64,
    pub write_time_ms: f64,
    pub read_time_ms: f64,
}

impl Metrics {
    pub fn new(encrypt_time_ms: f64, write_time_ms: f64, read_time_ms: f64) -> Self {
        Self {
            encrypt_time_ms,
            write_time_ms,
            read_time_ms,
        }
    }

    /// Only the primary timing, as reported by tools without I/O timings.
    pub fn crypt_only(encrypt_time_ms: f64) -> Self {
        Self {
            encrypt_time_ms,
            ..Default::default()
        }
    }
}
