//! Per-frame detection and viewport streams.
//!
//! Detections are stored one JSON object per line so a capture can be
//! appended to while it is being recorded. Lines starting with `#` are
//! treated as comments.
//!
//! ```text
//! {"t":0,"rect":{"l":0.45,"t":0.3,"r":0.55,"b":0.7}}
//! {"t":33000000,"rect":null}
//! ```

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Monotonic timestamp in nanoseconds since session start.
pub type TimestampNs = u64;

/// The subject detection for one captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectObservation {
    /// Capture timestamp.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// Subject bounding box, or `None` when nothing was detected.
    pub rect: Option<Rect>,
}

/// The viewport emitted by the controller for one processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSample {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    pub viewport: Rect,

    /// Optical zoom equivalent (`1 / scale`).
    pub zoom_factor: f64,
}

/// Error raised while reading a JSONL stream.
#[derive(Debug, thiserror::Error)]
#[error("line {line}: {source}")]
pub struct StreamParseError {
    /// One-based line number in the input.
    pub line: usize,
    #[source]
    pub source: serde_json::Error,
}

impl SubjectObservation {
    pub fn detected(timestamp_ns: TimestampNs, rect: Rect) -> Self {
        Self {
            timestamp_ns,
            rect: Some(rect),
        }
    }

    pub fn missing(timestamp_ns: TimestampNs) -> Self {
        Self {
            timestamp_ns,
            rect: None,
        }
    }

    /// Timestamp as fractional seconds since session start.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ns as f64 / 1_000_000_000.0
    }
}

/// Parse observations from JSONL, skipping blank and `#` lines.
pub fn parse_observations(jsonl: &str) -> Result<Vec<SubjectObservation>, StreamParseError> {
    parse_lines(jsonl)
}

/// Parse emitted viewports from JSONL.
pub fn parse_viewports(jsonl: &str) -> Result<Vec<ViewportSample>, StreamParseError> {
    parse_lines(jsonl)
}

fn parse_lines<T>(jsonl: &str) -> Result<Vec<T>, StreamParseError>
where
    T: for<'de> Deserialize<'de>,
{
    jsonl
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, text)| {
            serde_json::from_str(text).map_err(|source| StreamParseError { line, source })
        })
        .collect()
}

/// Serialize observations to JSONL format.
pub fn serialize_observations(
    observations: &[SubjectObservation],
) -> Result<String, serde_json::Error> {
    serialize_lines(observations)
}

/// Serialize viewports to JSONL format.
pub fn serialize_viewports(samples: &[ViewportSample]) -> Result<String, serde_json::Error> {
    serialize_lines(samples)
}

fn serialize_lines<T: Serialize>(items: &[T]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for item in items {
        output.push_str(&serde_json::to_string(item)?);
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let input = "# skicam detections v1\n\
                     {\"t\":0,\"rect\":{\"l\":0.4,\"t\":0.3,\"r\":0.6,\"b\":0.7}}\n\
                     \n\
                     {\"t\":33000000,\"rect\":null}\n";
        let observations = parse_observations(input).unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(
            observations[0],
            SubjectObservation::detected(0, Rect::new(0.4, 0.3, 0.6, 0.7))
        );
        assert_eq!(observations[1], SubjectObservation::missing(33_000_000));
        assert!((observations[1].timestamp_secs() - 0.033).abs() < 1e-12);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let input = "# header\n{\"t\":0,\"rect\":null}\n{\"t\":\"oops\"}\n";
        let err = parse_observations(input).unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.to_string().starts_with("line 3:"));
    }

    #[test]
    fn test_viewport_stream() {
        let samples = vec![ViewportSample {
            timestamp_ns: 16_000_000,
            viewport: Rect::new(0.25, 0.25, 0.75, 0.75),
            zoom_factor: 2.0,
        }];
        let jsonl = serialize_viewports(&samples).unwrap();
        assert!(jsonl.ends_with('\n'));
        assert!(jsonl.contains("\"zoom_factor\":2.0"));
        assert_eq!(parse_viewports(&jsonl).unwrap(), samples);
    }

    #[test]
    fn test_missing_rect_serializes_as_null() {
        let jsonl = serialize_observations(&[SubjectObservation::missing(5)]).unwrap();
        assert_eq!(jsonl, "{\"t\":5,\"rect\":null}\n");
    }
}
