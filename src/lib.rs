#![doc = include_str!("../readme.md")]

pub mod bds;
pub mod bitcursor;
pub mod block;
pub mod cat021;
pub mod cat048;
pub mod error;
pub mod fspec;
pub mod geo;
pub mod items;
pub mod pipeline;
pub mod qnh;
pub mod record;

pub mod prelude {
    pub use crate::error::{DecodeError, DecodeResult};
    pub use crate::pipeline::{
        decode_stream, decode_stream_cancellable, DecodeOptions, DecodeReport, Diagnostic,
        RadarStation,
    };
    pub use crate::record::UnifiedRecord;
}
