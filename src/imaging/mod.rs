//! Coverage bookkeeping and everything that touches pixels: the persistent coverage map, the
//! debug mosaic compositor and the stitching of objective artifacts.

mod capture_worker;
mod coverage_map;
mod zone_stitcher;

pub use capture_worker::{
    ImageCaptureWorker, ImageSink, capture_file_name, load_scaled, parse_capture_name,
};
pub use coverage_map::{CoverageMap, MapFileError};
pub use zone_stitcher::{objective_file_name, stitch_zone};

#[cfg(test)]
mod tests;
