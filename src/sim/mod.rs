//! The demand synthesis engine: annual calculation, hourly expansion,
//! spatial disaggregation, conservation checking, and run orchestration.

pub mod annual;
pub mod conservation;
pub mod hourly;
pub mod pipeline;
pub mod spatial;
