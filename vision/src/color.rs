//! Color-blob search.
//!
//! Used where a fixed-icon template is impractical (indicator dots, badge
//! highlights): threshold the frame against a target color, label connected
//! components, drop speckle, and return one centroid per surviving blob.

use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::frame::{Color, Frame, Point};

/// Components at or below this pixel count are treated as noise.
const MIN_BLOB_AREA: u32 = 10;

/// Find connected regions of `target` (within a per-channel `tolerance`) and
/// return their centroids in reading order (top-to-bottom, left-to-right).
pub fn find_color_regions(frame: &Frame, target: Color, tolerance: u8) -> Vec<Point> {
    let mut mask = GrayImage::new(frame.width(), frame.height());
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            if frame.pixel(x, y).within_tolerance(target, tolerance) {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }

    let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));

    // label -> (pixel count, sum x, sum y)
    let mut blobs: std::collections::HashMap<u32, (u32, u64, u64)> = std::collections::HashMap::new();
    for (x, y, label) in labels.enumerate_pixels().map(|(x, y, p)| (x, y, p.0[0])) {
        if label == 0 {
            continue;
        }
        let entry = blobs.entry(label).or_insert((0, 0, 0));
        entry.0 += 1;
        entry.1 += x as u64;
        entry.2 += y as u64;
    }

    let mut centers: Vec<Point> = blobs
        .values()
        .filter(|(area, _, _)| *area > MIN_BLOB_AREA)
        .map(|(area, sx, sy)| {
            Point::new((sx / *area as u64) as i32, (sy / *area as u64) as i32)
        })
        .collect();
    centers.sort_by_key(|p| (p.y, p.x));
    centers
}
