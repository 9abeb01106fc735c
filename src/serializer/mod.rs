//! Typed Field Serializer
//!
//! - **field**: per-kind literal rendering with sentinel fallbacks
//! - **escape**: SQL/HTML escaping helpers
//! - **store**: logical write map → column assignments

pub mod escape;
pub mod field;
pub mod store;

pub use escape::{add_slashes, db_escape, html_escape, reescape, strip_slashes};
pub use field::{
    is_compress_expr, serialize, serialize_field, COMPRESS_PREFIX, UNCOMPRESS_PREFIX,
    ZERO_DATETIME,
};
pub use store::prepare_data_to_store;
