//! Flux read rendering
//!
//! A read request becomes a pipe-forward chain:
//!
//! ```text
//! from(bucket: "b") |> range(start: .., stop: ..) |> <stages...> |> filter(measurement)
//! ```

use serde::{Deserialize, Serialize};

/// Earliest instant accepted as a range start
pub const EARLIEST_START: &str = "1970-01-01T00:00:00.000000001Z";

/// Separator between pipeline stages
pub const PIPE: &str = " |> ";

/// An abstract time-series read
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReadRequest {
    /// Bucket to read from
    pub bucket: String,
    /// Organization owning the bucket
    #[serde(default)]
    pub organization: String,
    /// Inclusive range start (RFC3339 or a Flux duration)
    #[serde(default)]
    pub start: Option<String>,
    /// Range stop
    #[serde(default)]
    pub stop: Option<String>,
    /// Complete stage bodies, e.g. `filter(fn: (r) => r.host == "a")`
    #[serde(default)]
    pub stages: Vec<String>,
    /// Measurement filter
    #[serde(default)]
    pub measurement: Option<String>,
}

impl ReadRequest {
    /// Create a request over a bucket
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Builder method: set the organization
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    /// Builder method: set the range start
    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Builder method: start at the earliest representable instant
    pub fn from_beginning(self) -> Self {
        self.start(EARLIEST_START)
    }

    /// Builder method: set the range stop
    pub fn stop(mut self, stop: impl Into<String>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    /// Builder method: append a pipeline stage
    pub fn stage(mut self, stage: impl Into<String>) -> Self {
        self.stages.push(stage.into());
        self
    }

    /// Builder method: append several pipeline stages
    pub fn stages<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stages.extend(stages.into_iter().map(Into::into));
        self
    }

    /// Builder method: filter on a measurement
    pub fn measurement(mut self, measurement: impl Into<String>) -> Self {
        self.measurement = Some(measurement.into());
        self
    }

    /// Range stage, if either bound is non-blank
    pub fn range_stage(&self) -> Option<String> {
        let mut bounds = Vec::with_capacity(2);
        if let Some(start) = non_blank(&self.start) {
            bounds.push(format!("start: {}", start));
        }
        if let Some(stop) = non_blank(&self.stop) {
            bounds.push(format!("stop: {}", stop));
        }

        if bounds.is_empty() {
            None
        } else {
            Some(format!("range({})", bounds.join(", ")))
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Escape text for a double-quoted Flux string literal
pub fn flux_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Filter stage selecting one measurement
pub fn measurement_filter(measurement: &str) -> String {
    format!(
        "filter(fn: (r) => r[\"_measurement\"] == \"{}\")",
        flux_string(measurement)
    )
}

/// Render a read request as a Flux query
pub fn render_read(request: &ReadRequest) -> String {
    let mut stages = vec![format!("from(bucket: \"{}\")", flux_string(&request.bucket))];

    if let Some(range) = request.range_stage() {
        stages.push(range);
    }

    stages.extend(
        request
            .stages
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    );

    if let Some(measurement) = non_blank(&request.measurement) {
        stages.push(measurement_filter(measurement));
    }

    stages.join(PIPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_escaped_in_string_literals() {
        let request = ReadRequest::new(r#"my "b"\x"#).measurement(r#"c"pu"#);
        assert_eq!(
            render_read(&request),
            r#"from(bucket: "my \"b\"\\x") |> filter(fn: (r) => r["_measurement"] == "c\"pu")"#
        );
    }

    #[test]
    fn test_measurement_only() {
        let request = ReadRequest::new("metrics").measurement("cpu");
        assert_eq!(
            render_read(&request),
            r#"from(bucket: "metrics") |> filter(fn: (r) => r["_measurement"] == "cpu")"#
        );
    }

    #[test]
    fn test_bucket_only() {
        assert_eq!(
            render_read(&ReadRequest::new("metrics")),
            r#"from(bucket: "metrics")"#
        );
    }

    #[test]
    fn test_full_pipeline() {
        let request = ReadRequest::new("metrics")
            .from_beginning()
            .stop("2024-01-01T00:00:00Z")
            .stage(r#"filter(fn: (r) => r["host"] == "a")"#)
            .stage("last()")
            .measurement("cpu");

        assert_eq!(
            render_read(&request),
            "from(bucket: \"metrics\") |> range(start: 1970-01-01T00:00:00.000000001Z, stop: 2024-01-01T00:00:00Z) |> filter(fn: (r) => r[\"host\"] == \"a\") |> last() |> filter(fn: (r) => r[\"_measurement\"] == \"cpu\")"
        );
    }

    #[test]
    fn test_blank_bounds_are_omitted() {
        let request = ReadRequest::new("b").start("  ").stop("now()");
        assert_eq!(request.range_stage().as_deref(), Some("range(stop: now())"));

        let request = ReadRequest::new("b").start("-1h").stop("");
        assert_eq!(request.range_stage().as_deref(), Some("range(start: -1h)"));
    }

    #[test]
    fn test_render_is_stable() {
        let request = ReadRequest::new("metrics")
            .start("-7d")
            .stages(["first()"])
            .measurement("mem");
        assert_eq!(render_read(&request), render_read(&request.clone()));
    }
}
