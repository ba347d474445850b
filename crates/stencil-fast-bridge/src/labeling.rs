use stencil_fast_types::{BinaryMask, INK};

use crate::limits::BOUNDARY_SAMPLE_CAP;

/// Per-pixel region ids produced by [`label_components`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentMap {
    width: usize,
    height: usize,
    ids: Vec<u32>,
}

impl ComponentMap {
    /// Marker for background pixels.
    pub const NONE: u32 = u32::MAX;

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, idx: usize) -> Option<u32> {
        match self.ids[idx] {
            Self::NONE => None,
            id => Some(id),
        }
    }

    pub fn id_at(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.get(y * self.width + x)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.ids
    }
}

/// One 4-connected ink region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    /// Discovery order of the region's first pixel in a raster scan.
    pub id: u32,
    pub area: usize,
    pub touches_border: bool,
    /// Pixels next to background or the canvas edge, in flood order. Capped
    /// at [`BOUNDARY_SAMPLE_CAP`].
    pub boundary: Vec<usize>,
    /// First visited pixel with the smallest distance to any canvas edge.
    pub nearest_border_idx: usize,
}

impl Region {
    pub fn is_floating(&self) -> bool {
        !self.touches_border
    }
}

#[derive(Debug)]
pub struct Labeling {
    map: ComponentMap,
    regions: Vec<Region>,
}

impl Labeling {
    pub fn map(&self) -> &ComponentMap {
        &self.map
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn floating(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.iter().filter(|region| region.is_floating())
    }

    pub fn region_of(&self, idx: usize) -> Option<&Region> {
        self.map
            .get(idx)
            .and_then(|id| self.regions.get(id as usize))
    }
}

/// Buffers reused between passes of one engine.
///
/// Every pass resets the contents; only the allocations survive.
#[derive(Debug, Default)]
pub struct BridgeWorkspace {
    ids: Vec<u32>,
    queue: Vec<usize>,
    scratch: Option<BinaryMask>,
}

impl BridgeWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_capacity(&mut self, pixels: usize) {
        self.ids.clear();
        self.ids.resize(pixels, ComponentMap::NONE);
        self.queue.clear();
        self.queue.reserve(pixels);
    }

    /// Hands the component map allocation back for the next pass.
    pub fn recycle(&mut self, labeling: Labeling) {
        self.ids = labeling.map.ids;
    }

    pub(crate) fn take_scratch(&mut self) -> Option<BinaryMask> {
        self.scratch.take()
    }

    pub(crate) fn store_scratch(&mut self, mask: BinaryMask) {
        self.scratch = Some(mask);
    }
}

/// Labels a mask with a throwaway workspace.
pub fn label(mask: &BinaryMask) -> Labeling {
    label_components(mask, &mut BridgeWorkspace::new())
}

/// Breadth-first 4-connected labeling in raster-scan discovery order.
pub fn label_components(mask: &BinaryMask, workspace: &mut BridgeWorkspace) -> Labeling {
    let width = mask.width();
    let height = mask.height();
    let pixels = mask.len();
    workspace.ensure_capacity(pixels);

    let data = mask.data();
    let mut ids = std::mem::take(&mut workspace.ids);
    let queue = &mut workspace.queue;
    let mut regions: Vec<Region> = Vec::new();

    for start in 0..pixels {
        if data[start] != INK || ids[start] != ComponentMap::NONE {
            continue;
        }

        let id = regions.len() as u32;
        queue.clear();
        queue.push(start);
        ids[start] = id;

        let mut area = 0usize;
        let mut touches_border = false;
        let mut nearest_border_idx = start;
        let mut nearest_border_dist = usize::MAX;
        let mut boundary = Vec::new();
        let mut head = 0usize;

        while head < queue.len() {
            let idx = queue[head];
            head += 1;
            area += 1;

            let x = idx % width;
            let y = idx / width;
            let right_gap = width - 1 - x;
            let bottom_gap = height - 1 - y;

            if x == 0 || y == 0 || right_gap == 0 || bottom_gap == 0 {
                touches_border = true;
            }

            let edge_dist = x.min(y).min(right_gap).min(bottom_gap);
            if edge_dist < nearest_border_dist {
                nearest_border_dist = edge_dist;
                nearest_border_idx = idx;
            }

            let neighbours = [
                (x > 0).then(|| idx - 1),
                (right_gap > 0).then(|| idx + 1),
                (y > 0).then(|| idx - width),
                (bottom_gap > 0).then(|| idx + width),
            ];

            let mut on_boundary = false;
            for neighbour in neighbours {
                match neighbour {
                    Some(n) if data[n] == INK => {
                        if ids[n] == ComponentMap::NONE {
                            ids[n] = id;
                            queue.push(n);
                        }
                    }
                    _ => on_boundary = true,
                }
            }

            if on_boundary && boundary.len() < BOUNDARY_SAMPLE_CAP {
                boundary.push(idx);
            }
        }

        regions.push(Region {
            id,
            area,
            touches_border,
            boundary,
            nearest_border_idx,
        });
    }

    Labeling {
        map: ComponentMap { width, height, ids },
        regions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from_rows(rows: &[&str]) -> BinaryMask {
        let width = rows[0].len();
        let data = rows
            .iter()
            .flat_map(|row| row.bytes().map(|b| u8::from(b == b'#')))
            .collect();
        BinaryMask::from_vec(width, rows.len(), data).unwrap()
    }

    #[test]
    fn empty_mask_has_no_regions() {
        let mask = BinaryMask::new(10, 10).unwrap();
        let labeling = label(&mask);
        assert!(labeling.is_empty());
        assert!(labeling
            .map()
            .as_slice()
            .iter()
            .all(|&id| id == ComponentMap::NONE));
    }

    #[test]
    fn ids_follow_raster_discovery_order() {
        let mask = mask_from_rows(&[
            "....#", //
            ".#...", //
            ".....", //
            "##...",
        ]);
        let labeling = label(&mask);
        assert_eq!(labeling.len(), 3);
        assert_eq!(labeling.map().id_at(4, 0), Some(0));
        assert_eq!(labeling.map().id_at(1, 1), Some(1));
        assert_eq!(labeling.map().id_at(0, 3), Some(2));
        assert_eq!(labeling.map().id_at(1, 3), Some(2));
        assert_eq!(labeling.map().id_at(2, 2), None);
    }

    #[test]
    fn diagonal_pixels_are_separate_regions() {
        let mask = mask_from_rows(&[
            ".....", //
            ".#...", //
            "..#..", //
            ".....",
        ]);
        let labeling = label(&mask);
        assert_eq!(labeling.len(), 2);
        assert_eq!(labeling.floating().count(), 2);
    }

    #[test]
    fn region_metadata_is_accumulated() {
        let mask = mask_from_rows(&[
            "......", //
            ".###..", //
            ".###..", //
            ".###..", //
            "......",
        ]);
        let labeling = label(&mask);
        let region = &labeling.regions()[0];
        assert_eq!(region.area, 9);
        assert!(!region.touches_border);
        // centre pixel is the only interior one
        assert_eq!(region.boundary.len(), 8);
        assert!(!region.boundary.contains(&mask.index_of(stencil_fast_types::PixelPoint::new(2, 2))));
        // (1,1) is first visited at edge distance 1
        assert_eq!(region.nearest_border_idx, 7);
    }

    #[test]
    fn border_contact_is_detected_on_every_side() {
        for rows in [
            ["#....", ".....", "....."],
            [".....", "....#", "....."],
            [".....", ".....", "..#.."],
            [".....", "#....", "....."],
        ] {
            let labeling = label(&mask_from_rows(&rows));
            assert!(labeling.regions()[0].touches_border, "{rows:?}");
        }
    }

    #[test]
    fn boundary_is_capped() {
        let mut mask = BinaryMask::new(1000, 5).unwrap();
        mask.fill_rect(1, 1, 998, 3);
        let labeling = label(&mask);
        let region = &labeling.regions()[0];
        assert_eq!(region.area, 998 * 3);
        assert_eq!(region.boundary.len(), BOUNDARY_SAMPLE_CAP);
    }

    #[test]
    fn region_of_resolves_pixels() {
        let mask = mask_from_rows(&["#..#"]);
        let labeling = label(&mask);
        assert_eq!(labeling.region_of(3).map(|r| r.id), Some(1));
        assert!(labeling.region_of(1).is_none());
    }

    #[test]
    fn workspace_reuse_resets_previous_labels() {
        let mut workspace = BridgeWorkspace::new();
        let first = mask_from_rows(&["##", "##"]);
        let labeling = label_components(&first, &mut workspace);
        assert_eq!(labeling.len(), 1);
        workspace.recycle(labeling);

        let second = mask_from_rows(&["#.", ".."]);
        let labeling = label_components(&second, &mut workspace);
        assert_eq!(labeling.len(), 1);
        assert_eq!(labeling.map().get(3), None);
        assert_eq!(labeling.regions()[0].area, 1);
    }
}
