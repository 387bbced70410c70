//! Data models for the MicroJPEG API
//!
//! Request-side option types live in `options`; response payloads in `result`
//! and `usage`.

mod options;
mod result;
mod usage;

pub use options::*;
pub use result::*;
pub use usage::*;
