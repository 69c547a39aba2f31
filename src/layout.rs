//! Grid layout engine
//!
//! Pure geometry: given the cameras in grid order, a container size and an
//! optional fullscreen camera, compute a rectangle per camera. Cameras fill
//! the grid row-major and each panel letterboxes its stream's aspect ratio
//! inside its cell.
//!
//! The engine holds no state and spawns nothing; callers re-run it whenever
//! membership, order, resolutions or the container change.

use std::collections::HashMap;

use crate::types::{CameraId, Rect, Resolution, Size};

/// Grid dimensions `(rows, cols)` for `count` cameras
///
/// Hand-tuned for small counts so typical camera walls stay wide rather
/// than tall; beyond sixteen it falls back to the near-square grid with
/// `cols = ceil(sqrt(count))`.
pub fn grid_dimensions(count: usize) -> (usize, usize) {
    match count {
        0 => (0, 0),
        1 => (1, 1),
        2 => (1, 2),
        3 => (1, 3),
        4 => (2, 2),
        5 | 6 => (2, 3),
        7 | 8 => (2, 4),
        9 => (3, 3),
        10..=12 => (3, 4),
        13..=16 => (4, 4),
        n => {
            let cols = (n as f64).sqrt().ceil() as usize;
            (n.div_ceil(cols), cols)
        }
    }
}

/// Compute a rectangle per camera
///
/// `panels` is the registry's grid order with each camera's current stream
/// resolution. With `fullscreen` set to a camera in `panels`, that camera
/// covers the whole container and every other camera gets [`Rect::HIDDEN`];
/// an unknown fullscreen id is ignored and the normal grid applies.
pub fn layout(
    panels: &[(CameraId, Resolution)],
    container: Size,
    fullscreen: Option<CameraId>,
) -> HashMap<CameraId, Rect> {
    let mut rects = HashMap::with_capacity(panels.len());

    if let Some(full) = fullscreen {
        if panels.iter().any(|(id, _)| *id == full) {
            for (id, _) in panels {
                let rect = if *id == full {
                    Rect::new(0, 0, container.width, container.height)
                } else {
                    Rect::HIDDEN
                };
                rects.insert(*id, rect);
            }
            return rects;
        }
    }

    let (rows, cols) = grid_dimensions(panels.len());
    if rows == 0 || cols == 0 {
        return rects;
    }

    let cell_width = container.width / cols as u32;
    let cell_height = container.height / rows as u32;

    for (index, (id, resolution)) in panels.iter().enumerate() {
        let row = index / cols;
        let col = index % cols;
        let cell = Rect::new(
            (col as u32 * cell_width) as i32,
            (row as u32 * cell_height) as i32,
            cell_width,
            cell_height,
        );
        rects.insert(*id, letterbox(*resolution, cell));
    }

    rects
}

/// Largest rectangle with `source`'s aspect ratio centered in `cell`
///
/// A degenerate source or cell yields the cell unchanged rather than a
/// division by zero.
fn letterbox(source: Resolution, cell: Rect) -> Rect {
    if source.width == 0 || source.height == 0 || cell.is_hidden() {
        return cell;
    }

    let cell_aspect = cell.width as f64 / cell.height as f64;
    let source_aspect = source.width as f64 / source.height as f64;

    let (width, height) = if source_aspect > cell_aspect {
        // Wider than the cell: pillar-to-fit width, bars top and bottom.
        let height = (cell.width as f64 / source_aspect).round() as u32;
        (cell.width, height.min(cell.height))
    } else {
        let width = (cell.height as f64 * source_aspect).round() as u32;
        (width.min(cell.width), cell.height)
    };

    Rect::new(
        cell.x + ((cell.width - width) / 2) as i32,
        cell.y + ((cell.height - height) / 2) as i32,
        width,
        height,
    )
}
