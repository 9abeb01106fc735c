//! Time-Series Query Renderer
//!
//! - **read**: `ReadRequest` → pipe-forward Flux query
//! - **line**: `WriteRow` → line protocol
//! - **record**: Flux records → time-keyed rows
//! - **meta**: organizations, buckets and write precision
//!
//! # Example
//!
//! ```rust
//! use dualquery::flux::{render_read, ReadRequest};
//!
//! let request = ReadRequest::new("metrics").measurement("cpu");
//! assert_eq!(
//!     render_read(&request),
//!     r#"from(bucket: "metrics") |> filter(fn: (r) => r["_measurement"] == "cpu")"#
//! );
//! ```

mod line;
mod meta;
mod read;
mod record;

pub use line::{render_line, render_lines, LineValue, WriteRow, TAGS_KEY, TIME_KEY};
pub use meta::{Bucket, Organization, WritePrecision};
pub use read::{flux_string, measurement_filter, render_read, ReadRequest, EARLIEST_START, PIPE};
pub use record::{collect_rows, FluxRecord, FluxTable};
