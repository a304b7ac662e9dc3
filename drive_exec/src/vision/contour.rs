//! Connected regions of a binary mask

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::GrayImage;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Find the 8-connected regions of non-zero pixels in the mask.
///
/// Each region is returned as the list of its `(x, y)` pixel coordinates. Regions are ordered by
/// area, largest first.
pub fn components(mask: &GrayImage) -> Vec<Vec<(u32, u32)>> {
    let (w, h) = mask.dimensions();
    let mut visited = vec![false; (w as usize) * (h as usize)];
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    let idx = |x: u32, y: u32| (y as usize) * (w as usize) + x as usize;

    for (x, y, px) in mask.enumerate_pixels() {
        if px.0[0] == 0 || visited[idx(x, y)] {
            continue;
        }

        let mut region = Vec::new();
        visited[idx(x, y)] = true;
        stack.push((x, y));

        while let Some((cx, cy)) = stack.pop() {
            region.push((cx, cy));

            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let nx = cx as i64 + dx;
                    let ny = cy as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                        continue;
                    }
                    let (nx, ny) = (nx as u32, ny as u32);
                    if !visited[idx(nx, ny)] && mask.get_pixel(nx, ny).0[0] != 0 {
                        visited[idx(nx, ny)] = true;
                        stack.push((nx, ny));
                    }
                }
            }
        }

        regions.push(region);
    }

    regions.sort_by(|a, b| b.len().cmp(&a.len()));

    regions
}

/// Areas in pixels of the connected regions of the mask, largest first.
pub fn component_areas(mask: &GrayImage) -> Vec<u32> {
    components(mask).iter().map(|r| r.len() as u32).collect()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
