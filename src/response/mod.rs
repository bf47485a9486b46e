//! # Response Encoding
//!
//! Function outputs are classified once at the engine boundary into a
//! [`ReturnValue`] and encoded by matching on that tag.

pub mod encoder;
pub mod sniff;
pub mod value;

pub use encoder::{encode, EncodedResponse, RunResult, SVG_PREAMBLE};
pub use sniff::sniff_mime;
pub use value::{integral, DisplayNumber, ReturnValue};
