//! Timing extraction from the textual output of the tools under test.
//!
//! This is the only place that knows what the tools print. The parallel tool prints lines like
//!
//! ```text
//! Encrypt time:	8625.341 ms
//! Write time:	142.132 ms
//! Read time:	94.820 ms
//! ```
//!
//! and the reference tool prints a single `### Time of computation 12.5 ms ###` line.

use std::sync::LazyLock;

use cipher_tunnel_core::prelude::{Metrics, ParseError};
use regex::Regex;

const CRYPT_LABEL: &str = "crypt time";
const WRITE_LABEL: &str = "Write time";
const READ_LABEL: &str = "Read time";
const COMPUTATION_LABEL: &str = "Time of computation";

static CRYPT_TIME: LazyLock<Regex> = LazyLock::new(|| timing_template(CRYPT_LABEL));
static WRITE_TIME: LazyLock<Regex> = LazyLock::new(|| timing_template(WRITE_LABEL));
static READ_TIME: LazyLock<Regex> = LazyLock::new(|| timing_template(READ_LABEL));
static COMPUTATION_TIME: LazyLock<Regex> = LazyLock::new(|| timing_template(COMPUTATION_LABEL));

/// `<label> ... <number> ms`, where anything (including newlines) may sit between the label and
/// the number. The number starts after a separator, never part way through another number, so
/// `.5` and `1.5e3` are captured whole.
fn timing_template(label: &str) -> Regex {
    Regex::new(&format!(
        r"(?s){}.*?[^0-9A-Za-z.+\-]([-+]?[0-9.]+(?:[eE][-+]?[0-9]+)?)\s*ms",
        regex::escape(label)
    ))
    .expect("Timing template must be a valid regex")
}

/// Which tool produced the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Reports the encrypt/decrypt time plus write and read times.
    Parallel,
    /// Reports the computation time only.
    Reference,
}

/// Extract the timings from a tool's captured output.
///
/// The primary timing must be present. Write and read timings are optional and default to zero.
pub fn extract_metrics(format: OutputFormat, output: &str) -> Result<Metrics, ParseError> {
    match format {
        OutputFormat::Parallel => Ok(Metrics::new(
            required(&CRYPT_TIME, CRYPT_LABEL, output)?,
            optional(&WRITE_TIME, WRITE_LABEL, output)?,
            optional(&READ_TIME, READ_LABEL, output)?,
        )),
        OutputFormat::Reference => Ok(Metrics::crypt_only(required(
            &COMPUTATION_TIME,
            COMPUTATION_LABEL,
            output,
        )?)),
    }
}

fn required(template: &Regex, label: &str, output: &str) -> Result<f64, ParseError> {
    optional_value(template, label, output)?.ok_or_else(|| ParseError::new(label))
}

fn optional(template: &Regex, label: &str, output: &str) -> Result<f64, ParseError> {
    Ok(optional_value(template, label, output)?.unwrap_or(0.0))
}

fn optional_value(template: &Regex, label: &str, output: &str) -> Result<Option<f64>, ParseError> {
    let Some(captures) = template.captures(output) else {
        return Ok(None);
    };

    let value = captures
        .get(1)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::new(label))?;

    Ok(Some(value))
}
