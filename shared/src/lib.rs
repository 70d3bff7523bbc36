//! Types and helpers shared between the narwhal server and its tooling.
//!
//! `math` holds the small 2D/angle toolkit, `config` the static room list and
//! gameplay tuning, and `protocol` the binary opcodes plus client command decoding.

pub mod config;
pub mod math;
pub mod protocol;
