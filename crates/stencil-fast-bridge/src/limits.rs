//! Resource caps that bound the cost of one bridging pass.

/// Rasters with more pixels than this are skipped untouched.
pub const MAX_PIXELS: usize = 14_000_000;

/// Bridges drawn per pass.
pub const MAX_BRIDGES: usize = 400;

/// Boundary pixels recorded per region.
pub const BOUNDARY_SAMPLE_CAP: usize = 1400;

/// Approximate number of ray origins sampled from one boundary.
pub const RAY_SAMPLE_TARGET: usize = 320;

pub const MIN_RAY_LEN: usize = 24;

/// Ray length as a fraction of the shorter canvas side.
pub const RAY_LEN_RATIO: f64 = 0.35;
