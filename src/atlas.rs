//! Shelf packing of glyph tiles and disjoint mutable views into the atlas canvas.

use sdf_glyph_renderer::{RenderParams, SdfTile};
use spmc::{channel, Receiver};

use crate::AtlasError;

/// A rectangle of atlas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl TileRect {
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn overlaps(&self, other: &TileRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The rectangle shrunk by `inset` pixels on every side.
    #[must_use]
    pub fn inset(&self, inset: usize) -> TileRect {
        TileRect {
            x: self.x + inset,
            y: self.y + inset,
            width: self.width.saturating_sub(2 * inset),
            height: self.height.saturating_sub(2 * inset),
        }
    }
}

/// The tile rectangles of every glyph, in glyph order, on a canvas of fixed width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtlasLayout {
    width: usize,
    height: usize,
    border: usize,
    tiles: Vec<TileRect>,
}

impl AtlasLayout {
    /// Packs `count` square tiles into rows (shelves) left to right, top to bottom.
    ///
    /// Tiles are separated from each other and from the canvas edges by `border` pixels, on top
    /// of the border each tile already carries around its glyph.
    pub fn pack(
        count: usize,
        width: usize,
        params: &RenderParams,
    ) -> Result<AtlasLayout, AtlasError> {
        let border = params.border as usize;
        let tile_side = params.tile_side();
        if width < tile_side + 2 * border {
            return Err(AtlasError::InvalidAtlasWidth { width, tile_side });
        }

        let mut tiles = Vec::with_capacity(count);
        let (mut x, mut y) = (border, border);
        let mut row_height = 0;
        let mut height = border;
        for _ in 0..count {
            if x + tile_side > width {
                x = border;
                y += row_height + border;
            }
            tiles.push(TileRect {
                x,
                y,
                width: tile_side,
                height: tile_side,
            });
            x += tile_side;
            row_height = tile_side;
            height = height.max(y + row_height + border);
        }

        Ok(AtlasLayout {
            width,
            height,
            border,
            tiles,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tiles(&self) -> &[TileRect] {
        &self.tiles
    }

    /// The glyph box of tile `index`, excluding the tile's own border.
    pub fn glyph_rect(&self, index: usize) -> Option<TileRect> {
        self.tiles.get(index).map(|tile| tile.inset(self.border))
    }
}

/// Exclusive access to the pixels of one tile of the atlas canvas.
#[derive(Debug)]
pub struct TileView<'a> {
    rect: TileRect,
    rows: Vec<&'a mut [u8]>,
}

impl TileView<'_> {
    pub fn rect(&self) -> TileRect {
        self.rect
    }

    /// Copies `tile` into the view, clipped to whichever is smaller.
    pub fn blit(&mut self, tile: &SdfTile) {
        for (y, row) in self.rows.iter_mut().enumerate().take(tile.side()) {
            let src = tile.row(y);
            let n = src.len().min(row.len());
            row[..n].copy_from_slice(&src[..n]);
        }
    }
}

/// Splits a row-major canvas into one mutable view per rectangle, in the order given.
///
/// # Panics
///
/// Panics if a rectangle lies outside the canvas or two rectangles overlap.
pub fn split_tiles<'a>(
    canvas: &'a mut [u8],
    width: usize,
    tiles: &[TileRect],
) -> Vec<TileView<'a>> {
    let height = if width == 0 { 0 } else { canvas.len() / width };
    for rect in tiles {
        assert!(
            rect.right() <= width && rect.bottom() <= height,
            "tile {rect:?} lies outside the {width}x{height} canvas"
        );
    }

    let mut order: Vec<usize> = (0..tiles.len()).collect();
    order.sort_by_key(|&i| (tiles[i].x, tiles[i].y));

    let mut views: Vec<TileView<'a>> = tiles
        .iter()
        .map(|&rect| TileView {
            rect,
            rows: Vec::with_capacity(rect.height),
        })
        .collect();

    if width == 0 {
        return views;
    }
    for (y, row) in canvas.chunks_exact_mut(width).enumerate() {
        let mut rest: &'a mut [u8] = row;
        let mut consumed = 0;
        for &i in order
            .iter()
            .filter(|&&i| tiles[i].y <= y && y < tiles[i].bottom())
        {
            let rect = tiles[i];
            assert!(rect.x >= consumed, "tile {rect:?} overlaps another tile");
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(rect.x - consumed);
            let (span, tail) = tail.split_at_mut(rect.width);
            views[i].rows.push(span);
            rest = tail;
            consumed = rect.right();
        }
    }
    views
}

/// Hands out tile views in index order. Each view is received by exactly one worker.
///
/// Every view is queued up front and the sending side is closed before any worker starts, so
/// claiming never waits on another worker.
#[derive(Clone)]
pub struct WorkQueue<'a> {
    jobs: Receiver<(usize, TileView<'a>)>,
    len: usize,
}

impl<'a> WorkQueue<'a> {
    pub fn new(views: Vec<TileView<'a>>) -> WorkQueue<'a> {
        let (mut tx, rx) = channel();
        let len = views.len();
        for job in views.into_iter().enumerate() {
            // Cannot fail while `rx` is alive
            let _ = tx.send(job);
        }
        WorkQueue { jobs: rx, len }
    }

    /// The number of views queued initially.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Claims the next unprocessed index along with its view, or `None` once all are taken.
    pub fn claim(&self) -> Option<(usize, TileView<'a>)> {
        self.jobs.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::{split_tiles, AtlasLayout, TileRect, WorkQueue};
    use crate::AtlasError;
    use sdf_glyph_renderer::RenderParams;

    #[test]
    fn test_pack_wraps_rows() {
        let params = RenderParams::default();
        // 24px tiles: four fit in 4 + 4 * 24 + 4 = 104 pixels
        let layout = AtlasLayout::pack(5, 104, &params).unwrap();
        let xs: Vec<_> = layout.tiles().iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(xs, vec![(4, 4), (28, 4), (52, 4), (76, 4), (4, 32)]);
        assert_eq!(layout.height(), 32 + 24 + 4);
        assert_eq!(
            layout.glyph_rect(4),
            Some(TileRect {
                x: 8,
                y: 36,
                width: 16,
                height: 16
            })
        );
        assert_eq!(layout.glyph_rect(5), None);
    }

    #[test]
    fn test_pack_properties() {
        let params = RenderParams::default();
        let layout = AtlasLayout::pack(300, 1024, &params).unwrap();
        let tiles = layout.tiles();
        for (i, a) in tiles.iter().enumerate() {
            assert!(a.right() <= layout.width());
            assert!(a.bottom() <= layout.height());
            for b in &tiles[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
        let max_bottom = tiles.iter().map(TileRect::bottom).max().unwrap();
        assert_eq!(layout.height(), max_bottom + params.border as usize);
    }

    #[test]
    fn test_pack_empty_and_narrow() {
        let params = RenderParams::default();
        let layout = AtlasLayout::pack(0, 64, &params).unwrap();
        assert!(layout.tiles().is_empty());
        assert_eq!(layout.height(), 4);

        assert!(matches!(
            AtlasLayout::pack(1, 31, &params),
            Err(AtlasError::InvalidAtlasWidth {
                width: 31,
                tile_side: 24
            })
        ));
        assert!(AtlasLayout::pack(1, 32, &params).is_ok());
    }

    #[test]
    fn test_split_tiles_are_disjoint() {
        let tiles = [
            TileRect { x: 3, y: 1, width: 2, height: 2 },
            TileRect { x: 0, y: 0, width: 2, height: 3 },
        ];
        let mut canvas = vec![0u8; 6 * 4];
        {
            let mut views = split_tiles(&mut canvas, 6, &tiles);
            assert_eq!(views[0].rect(), tiles[0]);
            for (value, view) in views.iter_mut().enumerate() {
                for row in &mut view.rows {
                    row.fill(value as u8 + 1);
                }
            }
        }
        assert_eq!(
            canvas,
            vec![
                2, 2, 0, 0, 0, 0, //
                2, 2, 0, 1, 1, 0, //
                2, 2, 0, 1, 1, 0, //
                0, 0, 0, 0, 0, 0, //
            ]
        );
    }

    #[test]
    #[should_panic(expected = "overlaps")]
    fn test_split_tiles_rejects_overlap() {
        let tiles = [
            TileRect { x: 0, y: 0, width: 3, height: 2 },
            TileRect { x: 2, y: 1, width: 2, height: 2 },
        ];
        let mut canvas = vec![0u8; 16];
        split_tiles(&mut canvas, 4, &tiles);
    }

    #[test]
    fn test_work_queue_claims_each_index_once() {
        let tiles: Vec<_> = (0..4)
            .map(|i| TileRect { x: i, y: 0, width: 1, height: 1 })
            .collect();
        let mut canvas = vec![0u8; 4];
        let queue = WorkQueue::new(split_tiles(&mut canvas, 4, &tiles));
        assert_eq!(queue.len(), 4);

        let claimed: Vec<usize> = std::iter::from_fn(|| queue.claim().map(|(i, _)| i)).collect();
        assert_eq!(claimed, vec![0, 1, 2, 3]);
        assert!(queue.claim().is_none());
    }

    #[test]
    fn test_work_queue_shared_by_threads() {
        let tiles: Vec<_> = (0..64)
            .map(|i| TileRect { x: i % 8, y: i / 8, width: 1, height: 1 })
            .collect();
        let mut canvas = vec![0u8; 64];
        let queue = WorkQueue::new(split_tiles(&mut canvas, 8, &tiles));

        let mut claimed: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let queue = queue.clone();
                    scope.spawn(move || {
                        let mut indices = Vec::new();
                        while let Some((index, mut view)) = queue.claim() {
                            view.rows[0][0] = 1;
                            indices.push(index);
                        }
                        indices
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap())
                .collect()
        });
        drop(queue);

        claimed.sort_unstable();
        assert_eq!(claimed, (0..64).collect::<Vec<_>>());
        assert!(canvas.iter().all(|&p| p == 1));
    }
}
