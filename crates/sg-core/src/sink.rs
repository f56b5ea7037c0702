//! Results sinks: where observations go after the detector produces them.
//!
//! A sink receives observations in stream order. The detector itself never
//! writes anywhere; the replay driver and library callers hand each
//! observation to whichever sink they configured.

use std::io::Write;

use sg_common::{Observation, Result, Timestamp};

/// Consumer of the ordered observation stream.
pub trait ObservationSink {
    fn accept(&mut self, observation: &Observation) -> Result<()>;

    /// Flush buffered output. Called once after the last observation.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: ObservationSink + ?Sized> ObservationSink for &mut S {
    fn accept(&mut self, observation: &Observation) -> Result<()> {
        (**self).accept(observation)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Writes one JSON object per observation, newline-terminated.
pub struct JsonlSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ObservationSink for JsonlSink<W> {
    fn accept(&mut self, observation: &Observation) -> Result<()> {
        serde_json::to_writer(&mut self.writer, observation)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every observation in memory.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    observations: Vec<Observation>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn into_observations(self) -> Vec<Observation> {
        self.observations
    }

    /// `(timestamp, ratio)` pairs in stream order.
    pub fn ratio_series(&self) -> Vec<(Timestamp, f64)> {
        self.observations
            .iter()
            .map(|o| (o.timestamp, o.ratio))
            .collect()
    }

    /// `(timestamp, admit_probability)` pairs in stream order.
    pub fn probability_series(&self) -> Vec<(Timestamp, f64)> {
        self.observations
            .iter()
            .map(|o| (o.timestamp, o.admit_probability))
            .collect()
    }

    pub fn spikes(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(|o| o.is_spike)
    }
}

impl ObservationSink for VecSink {
    fn accept(&mut self, observation: &Observation) -> Result<()> {
        self.observations.push(*observation);
        Ok(())
    }
}

/// Forwards only spike observations to the wrapped sink.
pub struct SpikesOnly<S> {
    inner: S,
}

impl<S: ObservationSink> SpikesOnly<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ObservationSink> ObservationSink for SpikesOnly<S> {
    fn accept(&mut self, observation: &Observation) -> Result<()> {
        if observation.is_spike {
            self.inner.accept(observation)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.inner.finish()
    }
}

/// Discards everything. Useful when only the replay summary matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ObservationSink for NullSink {
    fn accept(&mut self, _observation: &Observation) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(timestamp: Timestamp, ratio: f64, is_spike: bool) -> Observation {
        Observation {
            timestamp,
            ratio,
            is_spike,
            admit_probability: if is_spike { 1.0 / ratio } else { 1.0 },
            warm: true,
        }
    }

    #[test]
    fn jsonl_sink_writes_one_line_per_observation() {
        let mut sink = JsonlSink::new(Vec::new());
        sink.accept(&obs(1, 1.0, false)).unwrap();
        sink.accept(&obs(2, 2.5, true)).unwrap();
        sink.finish().unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: Observation = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second, obs(2, 2.5, true));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn vec_sink_exposes_series() {
        let mut sink = VecSink::new();
        sink.accept(&obs(1, 1.0, false)).unwrap();
        sink.accept(&obs(3, 4.0, true)).unwrap();

        assert_eq!(sink.ratio_series(), vec![(1, 1.0), (3, 4.0)]);
        assert_eq!(sink.probability_series(), vec![(1, 1.0), (3, 0.25)]);
        assert_eq!(sink.spikes().count(), 1);
        assert_eq!(sink.into_observations().len(), 2);
    }

    #[test]
    fn spikes_only_filters() {
        let mut sink = SpikesOnly::new(VecSink::new());
        for (t, r) in [(1, 1.0), (2, 3.0), (3, 1.2), (4, 2.2)] {
            sink.accept(&obs(t, r, r > 2.0)).unwrap();
        }
        let kept = sink.into_inner();
        let stamps: Vec<Timestamp> = kept.observations().iter().map(|o| o.timestamp).collect();
        assert_eq!(stamps, vec![2, 4]);
    }

    #[test]
    fn mutable_reference_is_a_sink() {
        fn feed(mut sink: impl ObservationSink) {
            sink.accept(&obs(9, 1.0, false)).unwrap();
            sink.finish().unwrap();
        }

        let mut inner = VecSink::new();
        feed(&mut inner);
        assert_eq!(inner.observations().len(), 1);
    }
}
