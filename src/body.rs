//! Message body decoding, split by framing strategy (spec §4.4, §4.5).

pub mod chunked;
pub mod fixed;
