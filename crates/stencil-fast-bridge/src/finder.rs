use serde::Serialize;
use stencil_fast_types::PixelPoint;

use crate::labeling::{ComponentMap, Region};
use crate::limits::{MIN_RAY_LEN, RAY_LEN_RATIO, RAY_SAMPLE_TARGET};

/// Unit step of a ray and the score added to every hit along it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayDirection {
    pub dx: isize,
    pub dy: isize,
    pub penalty: f32,
}

impl RayDirection {
    pub const fn new(dx: isize, dy: isize, penalty: f32) -> Self {
        Self { dx, dy, penalty }
    }
}

const DIAGONAL_PENALTY: f32 = 0.2;

/// Orthogonal rays first, then diagonals. Earlier entries win score ties.
pub const BRIDGE_DIRECTIONS: [RayDirection; 8] = [
    RayDirection::new(1, 0, 0.0),
    RayDirection::new(-1, 0, 0.0),
    RayDirection::new(0, 1, 0.0),
    RayDirection::new(0, -1, 0.0),
    RayDirection::new(1, 1, DIAGONAL_PENALTY),
    RayDirection::new(-1, -1, DIAGONAL_PENALTY),
    RayDirection::new(-1, 1, DIAGONAL_PENALTY),
    RayDirection::new(1, -1, DIAGONAL_PENALTY),
];

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BridgeCandidate {
    /// Ray length in pixels plus the direction penalty.
    pub score: f32,
    pub source: PixelPoint,
    pub target: PixelPoint,
}

pub fn max_ray_len(width: usize, height: usize) -> usize {
    let shorter = width.min(height) as f64;
    MIN_RAY_LEN.max((shorter * RAY_LEN_RATIO).round() as usize)
}

/// Finds the cheapest straight connection from a region to any other region.
pub fn find_bridge(
    region: &Region,
    map: &ComponentMap,
    max_len: usize,
) -> Option<BridgeCandidate> {
    RaySearch::new(map, max_len).find(region)
}

pub struct RaySearch<'a> {
    map: &'a ComponentMap,
    max_len: usize,
    directions: &'a [RayDirection],
}

impl<'a> RaySearch<'a> {
    pub fn new(map: &'a ComponentMap, max_len: usize) -> Self {
        Self {
            map,
            max_len,
            directions: &BRIDGE_DIRECTIONS,
        }
    }

    pub fn with_directions(mut self, directions: &'a [RayDirection]) -> Self {
        self.directions = directions;
        self
    }

    pub fn find(&self, region: &Region) -> Option<BridgeCandidate> {
        if region.boundary.is_empty() {
            return None;
        }

        let width = self.map.width();
        let step = (region.boundary.len() / RAY_SAMPLE_TARGET).max(1);
        let mut best: Option<BridgeCandidate> = None;

        for &origin_idx in region.boundary.iter().step_by(step) {
            let origin = PixelPoint::from_index(origin_idx, width);
            for direction in self.directions {
                let Some((dist, target)) = self.cast(region.id, origin, direction) else {
                    continue;
                };
                let score = dist as f32 + direction.penalty;
                if best.map_or(true, |current| score < current.score) {
                    best = Some(BridgeCandidate {
                        score,
                        source: origin,
                        target,
                    });
                }
            }
        }

        best
    }

    /// Walks one ray and returns the distance and pixel of the first foreign
    /// region it lands on after crossing at least one background pixel.
    fn cast(
        &self,
        region_id: u32,
        origin: PixelPoint,
        direction: &RayDirection,
    ) -> Option<(usize, PixelPoint)> {
        let width = self.map.width() as isize;
        let height = self.map.height() as isize;
        let mut x = origin.x as isize;
        let mut y = origin.y as isize;
        let mut crossed = 0usize;

        for dist in 1..=self.max_len {
            x += direction.dx;
            y += direction.dy;
            if x < 0 || y < 0 || x >= width || y >= height {
                return None;
            }

            let (ux, uy) = (x as usize, y as usize);
            match self.map.id_at(ux, uy) {
                Some(id) if id == region_id => return None,
                Some(_) if crossed == 0 => return None,
                Some(_) => return Some((dist, PixelPoint::new(ux, uy))),
                None => crossed += 1,
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeling::label;
    use stencil_fast_types::BinaryMask;

    #[test]
    fn ray_length_has_a_floor() {
        assert_eq!(max_ray_len(10, 10), MIN_RAY_LEN);
        assert_eq!(max_ray_len(100, 1000), 35);
        assert_eq!(max_ray_len(2480, 3508), 868);
    }

    #[test]
    fn finds_the_shortest_orthogonal_gap() {
        let mut mask = BinaryMask::new(40, 20).unwrap();
        // frame column on the left, island to its right
        mask.fill_rect(0, 0, 2, 19);
        mask.fill_rect(10, 8, 14, 12);
        let labeling = label(&mask);
        let island = &labeling.regions()[1];
        assert!(island.is_floating());

        let candidate = find_bridge(island, labeling.map(), 24).unwrap();
        assert_eq!(candidate.score, 8.0);
        assert_eq!(candidate.source.x, 10);
        assert_eq!(candidate.target.x, 2);
        assert_eq!(candidate.source.y, candidate.target.y);
    }

    #[test]
    fn diagonal_hits_pay_a_penalty() {
        let mut mask = BinaryMask::new(30, 30).unwrap();
        mask.set(10, 10, true);
        mask.set(13, 13, true);
        let labeling = label(&mask);

        let candidate = find_bridge(&labeling.regions()[0], labeling.map(), 24).unwrap();
        assert!((candidate.score - 3.2).abs() < 1e-6);
        assert_eq!(candidate.target, PixelPoint::new(13, 13));
    }

    #[test]
    fn touching_diagonal_neighbours_are_not_linked() {
        let mut mask = BinaryMask::new(9, 9).unwrap();
        mask.set(4, 4, true);
        mask.set(5, 5, true);
        let labeling = label(&mask);
        assert_eq!(labeling.len(), 2);

        assert!(find_bridge(&labeling.regions()[0], labeling.map(), 24).is_none());
    }

    #[test]
    fn rays_stop_at_the_length_cap() {
        let mut mask = BinaryMask::new(60, 9).unwrap();
        mask.set(5, 4, true);
        mask.set(40, 4, true);
        let labeling = label(&mask);

        assert!(find_bridge(&labeling.regions()[0], labeling.map(), 24).is_none());
        let candidate = find_bridge(&labeling.regions()[0], labeling.map(), 35).unwrap();
        assert_eq!(candidate.score, 35.0);
    }

    #[test]
    fn custom_direction_table_restricts_the_search() {
        let mut mask = BinaryMask::new(20, 20).unwrap();
        mask.set(5, 5, true);
        mask.set(5, 9, true);
        let labeling = label(&mask);
        let region = &labeling.regions()[0];

        let horizontal = [RayDirection::new(1, 0, 0.0), RayDirection::new(-1, 0, 0.0)];
        let search = RaySearch::new(labeling.map(), 24).with_directions(&horizontal);
        assert!(search.find(region).is_none());

        let candidate = RaySearch::new(labeling.map(), 24).find(region).unwrap();
        assert_eq!(candidate.score, 4.0);
    }

    #[test]
    fn large_boundaries_are_sampled_with_a_stride() {
        let mut mask = BinaryMask::new(400, 400).unwrap();
        mask.fill_rect(0, 0, 399, 1);
        mask.fill_rect(0, 398, 399, 399);
        mask.fill_rect(0, 0, 1, 399);
        mask.fill_rect(398, 0, 399, 399);
        mask.fill_rect(60, 60, 339, 339);
        let labeling = label(&mask);
        let island = &labeling.regions()[1];
        assert!(island.is_floating());
        assert_eq!(island.boundary.len(), 1116);
        assert_eq!(island.boundary.len() / RAY_SAMPLE_TARGET, 3);

        let candidate = find_bridge(island, labeling.map(), max_ray_len(400, 400)).unwrap();
        assert_eq!(candidate.score, 59.0);
        assert_eq!(candidate.source, PixelPoint::new(60, 60));
        assert_eq!(candidate.target, PixelPoint::new(1, 60));
    }

    #[test]
    fn origins_between_samples_are_not_cast() {
        // 960 px bar: every pixel is boundary, flood order runs left to
        // right, so only x = 20, 23, 26, ... cast rays.
        let bar = |target_x: usize| {
            let mut mask = BinaryMask::new(1000, 40).unwrap();
            mask.set(target_x, 15, true);
            mask.fill_rect(20, 20, 979, 20);
            mask
        };

        let skipped = bar(22);
        let labeling = label(&skipped);
        let line = &labeling.regions()[1];
        assert_eq!(line.boundary.len(), 960);
        assert!(find_bridge(line, labeling.map(), 10).is_none());

        let sampled = bar(23);
        let labeling = label(&sampled);
        let candidate = find_bridge(&labeling.regions()[1], labeling.map(), 10).unwrap();
        assert_eq!(candidate.score, 5.0);
        assert_eq!(candidate.source, PixelPoint::new(23, 20));
        assert_eq!(candidate.target, PixelPoint::new(23, 15));
    }

    #[test]
    fn empty_boundary_yields_nothing() {
        let mask = BinaryMask::new(5, 5).unwrap();
        let labeling = label(&mask);
        let region = Region {
            id: 0,
            area: 0,
            touches_border: false,
            boundary: Vec::new(),
            nearest_border_idx: 12,
        };
        assert!(find_bridge(&region, labeling.map(), 24).is_none());
    }
}
