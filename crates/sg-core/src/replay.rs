//! Replay a recorded timestamp stream through a detector.
//!
//! Input is plain text: one unsigned integer timestamp per line. Blank lines
//! are skipped and `#` starts a comment that runs to the end of the line.
//! The first bad line stops the replay; the error carries its line number.

use std::io::BufRead;

use serde::Serialize;
use sg_common::{Error, Timestamp, SCHEMA_VERSION};
use tracing::{debug, info};

use crate::detector::Detector;
use crate::sink::ObservationSink;
use crate::spike::Phase;

/// Admit probability at which a detector is reported as recovered.
pub const RECOVERY_TARGET: f64 = 0.99;

/// Why a replay stopped early.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The stream failed at a specific input line.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Error,
    },

    /// Failure that already names its line, or happens after the last one.
    #[error(transparent)]
    Stream(#[from] Error),
}

impl ReplayError {
    /// The underlying error, for codes and categories.
    pub fn error(&self) -> &Error {
        match self {
            ReplayError::AtLine { source, .. } => source,
            ReplayError::Stream(err) => err,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            ReplayError::AtLine { line, .. } => Some(*line),
            ReplayError::Stream(Error::MalformedInput { line, .. }) => Some(*line),
            ReplayError::Stream(_) => None,
        }
    }
}

/// Aggregate outcome of one replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub schema_version: String,
    /// Events processed during this replay.
    pub events: u64,
    /// Spikes among those events.
    pub spikes: u64,
    /// Blank and comment lines skipped.
    pub skipped_lines: u64,
    pub first_timestamp: Option<Timestamp>,
    pub last_timestamp: Option<Timestamp>,
    pub first_spike: Option<Timestamp>,
    pub last_spike: Option<Timestamp>,
    /// Largest ratio seen (0 when no events were processed).
    pub max_ratio: f64,
    /// Lowest admit probability handed out.
    pub min_admit_probability: f64,
    /// Admit probability after the final event.
    pub final_admit_probability: f64,
    pub final_filtered_rate: f64,
    pub phase: Phase,
    /// When the admit probability climbs back to [`RECOVERY_TARGET`] after
    /// the last spike, if it ever spiked.
    pub recovered_by: Option<Timestamp>,
}

impl ReplaySummary {
    fn empty() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            events: 0,
            spikes: 0,
            skipped_lines: 0,
            first_timestamp: None,
            last_timestamp: None,
            first_spike: None,
            last_spike: None,
            max_ratio: 0.0,
            min_admit_probability: 1.0,
            final_admit_probability: 1.0,
            final_filtered_rate: 0.0,
            phase: Phase::Nominal,
            recovered_by: None,
        }
    }

    pub fn has_spikes(&self) -> bool {
        self.spikes > 0
    }
}

/// Parse one input line. `Ok(None)` means the line carries no timestamp.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Timestamp>, Error> {
    let content = match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    };
    let content = content.trim();
    if content.is_empty() {
        return Ok(None);
    }
    content
        .parse::<Timestamp>()
        .map(Some)
        .map_err(|e| Error::MalformedInput {
            line: line_no,
            message: format!("'{}': {}", content, e),
        })
}

/// Feed every timestamp in `reader` to `detector`, forwarding observations
/// to `sink`.
pub fn replay<R, S>(
    reader: R,
    detector: &mut Detector,
    mut sink: S,
) -> Result<ReplaySummary, ReplayError>
where
    R: BufRead,
    S: ObservationSink,
{
    let mut summary = ReplaySummary::empty();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| read_error(e, line_no))?;

        let Some(timestamp) = parse_line(&line, line_no)? else {
            summary.skipped_lines += 1;
            continue;
        };

        let obs = detector
            .process(timestamp)
            .map_err(|source| ReplayError::AtLine {
                line: line_no,
                source,
            })?;

        sink.accept(&obs).map_err(|source| ReplayError::AtLine {
            line: line_no,
            source,
        })?;

        summary.events += 1;
        summary.first_timestamp.get_or_insert(timestamp);
        summary.last_timestamp = Some(timestamp);
        summary.max_ratio = summary.max_ratio.max(obs.ratio);
        summary.min_admit_probability = summary.min_admit_probability.min(obs.admit_probability);
        summary.final_admit_probability = obs.admit_probability;
        if obs.is_spike {
            summary.spikes += 1;
            summary.first_spike.get_or_insert(timestamp);
            summary.last_spike = Some(timestamp);
        }
    }

    sink.finish()?;

    summary.final_filtered_rate = detector.filtered_rate();
    summary.phase = detector.phase();
    summary.recovered_by = recovery_time(detector);

    info!(
        events = summary.events,
        spikes = summary.spikes,
        max_ratio = summary.max_ratio,
        "replay complete"
    );
    debug!(summary = ?summary, "replay summary");

    Ok(summary)
}

/// Bytes that are not UTF-8 are bad input, not a failed read.
fn read_error(err: std::io::Error, line_no: usize) -> ReplayError {
    if err.kind() == std::io::ErrorKind::InvalidData {
        return ReplayError::Stream(Error::MalformedInput {
            line: line_no,
            message: err.to_string(),
        });
    }
    ReplayError::AtLine {
        line: line_no,
        source: err.into(),
    }
}

/// Timestamp at which the detector's admit probability reaches
/// [`RECOVERY_TARGET`], or `None` if it never spiked.
pub fn recovery_time(detector: &Detector) -> Option<Timestamp> {
    let spike = detector.gate().last_spike_time()?;
    let elapsed = detector.gate().curve().time_to(RECOVERY_TARGET);
    if !elapsed.is_finite() {
        return None;
    }
    Some(spike.saturating_add(elapsed.ceil() as u64))
}
