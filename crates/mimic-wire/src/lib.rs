//! Mimic Wire Protocol - Text pose frames
//!
//! One UTF-8 datagram carries one loosely-formed JSON object:
//! - `gender`: optional string label
//! - `event`: optional presence transition (`entered` / `left`)
//! - `bones`: optional object mapping bone name to `[x, y, z, ...]`
//!
//! Decoding is tolerant and never fails; encoding is strict JSON.

pub mod decode;
pub mod encode;

pub use decode::*;
pub use encode::*;
