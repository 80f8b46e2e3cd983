/// A quadratic Bézier segment in font units.
///
/// Straight lines are stored as degenerate quadratics whose control point sits exactly at the
/// midpoint of the two end points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub x0: f32,
    pub y0: f32,
    pub cx: f32,
    pub cy: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Segment {
    pub fn line(x0: f32, y0: f32, x1: f32, y1: f32) -> Segment {
        Segment {
            x0,
            y0,
            cx: (x0 + x1) * 0.5,
            cy: (y0 + y1) * 0.5,
            x1,
            y1,
        }
    }

    pub fn quad(x0: f32, y0: f32, cx: f32, cy: f32, x1: f32, y1: f32) -> Segment {
        Segment {
            x0,
            y0,
            cx,
            cy,
            x1,
            y1,
        }
    }

    /// Whether the control point is the chord midpoint, i.e. the segment is a straight line.
    #[allow(clippy::float_cmp)]
    pub fn is_line(&self) -> bool {
        self.cx == (self.x0 + self.x1) * 0.5 && self.cy == (self.y0 + self.y1) * 0.5
    }
}

/// Axis-aligned bounds of a set of control points, in font units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// A glyph outline: a flat list of quadratic segments grouped into closed contours.
///
/// Outlines are assembled with an [`OutlineBuilder`] and are immutable afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphOutline {
    segments: Vec<Segment>,
    contours: Vec<usize>,
    advance_width: u16,
    flatness: f32,
}

impl GlyphOutline {
    /// An outline without any contours, for empty glyphs such as a space.
    pub fn empty(advance_width: u16, flatness: f32) -> GlyphOutline {
        GlyphOutline {
            segments: Vec::new(),
            contours: Vec::new(),
            advance_width,
            flatness,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The index of the first segment of each contour, strictly increasing.
    pub fn contour_starts(&self) -> &[usize] {
        &self.contours
    }

    pub fn contour_count(&self) -> usize {
        self.contours.len()
    }

    /// The segments belonging to each contour, in order.
    pub fn contours(&self) -> impl Iterator<Item = &[Segment]> + '_ {
        self.contours.iter().enumerate().map(move |(i, &start)| {
            let end = self
                .contours
                .get(i + 1)
                .copied()
                .unwrap_or(self.segments.len());
            &self.segments[start..end]
        })
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The horizontal advance in font units.
    pub fn advance_width(&self) -> u16 {
        self.advance_width
    }

    /// The flattening tolerance requested for this outline, in font units.
    pub fn flatness(&self) -> f32 {
        self.flatness
    }

    /// The bounding box of all control points, or `None` for an empty outline.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.segments.first()?;
        let init = Bounds {
            min_x: first.x0,
            min_y: first.y0,
            max_x: first.x0,
            max_y: first.y0,
        };
        Some(self.segments.iter().fold(init, |b, s| Bounds {
            min_x: b.min_x.min(s.x0).min(s.cx).min(s.x1),
            min_y: b.min_y.min(s.y0).min(s.cy).min(s.y1),
            max_x: b.max_x.max(s.x0).max(s.cx).max(s.x1),
            max_y: b.max_y.max(s.y0).max(s.cy).max(s.y1),
        }))
    }
}

/// Incrementally assembles a [`GlyphOutline`].
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    segments: Vec<Segment>,
    contours: Vec<usize>,
}

impl OutlineBuilder {
    pub fn new() -> OutlineBuilder {
        OutlineBuilder::default()
    }

    /// Marks the start of a new contour at the current segment position.
    ///
    /// A contour that received no segments is replaced rather than recorded twice, so the
    /// contour starts of the finished outline are always strictly increasing.
    pub fn begin_contour(&mut self) {
        if self.contours.last() == Some(&self.segments.len()) {
            return;
        }
        self.contours.push(self.segments.len());
    }

    pub fn push(&mut self, segment: Segment) {
        if self.contours.is_empty() {
            self.contours.push(0);
        }
        self.segments.push(segment);
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn build(mut self, advance_width: u16, flatness: f32) -> GlyphOutline {
        // Drop a trailing contour marker that never received segments
        if self.contours.last() == Some(&self.segments.len()) {
            self.contours.pop();
        }
        GlyphOutline {
            segments: self.segments,
            contours: self.contours,
            advance_width,
            flatness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OutlineBuilder, Segment};

    #[test]
    fn test_line_is_degenerate_quad() {
        let line = Segment::line(0.0, 0.0, 10.0, 4.0);
        assert_eq!((line.cx, line.cy), (5.0, 2.0));
        assert!(line.is_line());
        assert!(!Segment::quad(0.0, 0.0, 0.0, 10.0, 10.0, 10.0).is_line());
    }

    #[test]
    fn test_builder_contours() {
        let mut builder = OutlineBuilder::new();
        builder.begin_contour();
        builder.push(Segment::line(0.0, 0.0, 10.0, 0.0));
        builder.push(Segment::line(10.0, 0.0, 0.0, 10.0));
        builder.push(Segment::line(0.0, 10.0, 0.0, 0.0));
        // An empty contour must not produce a duplicate start index
        builder.begin_contour();
        builder.begin_contour();
        builder.push(Segment::line(20.0, 20.0, 30.0, 20.0));
        builder.begin_contour();
        let outline = builder.build(500, 1.0);

        assert_eq!(outline.contour_starts(), &[0, 3]);
        assert_eq!(outline.segments().len(), 4);
        assert_eq!(outline.advance_width(), 500);
        let lengths: Vec<usize> = outline.contours().map(<[Segment]>::len).collect();
        assert_eq!(lengths, vec![3, 1]);

        let bounds = outline.bounds().unwrap();
        assert_eq!((bounds.min_x, bounds.min_y), (0.0, 0.0));
        assert_eq!((bounds.max_x, bounds.max_y), (30.0, 20.0));
    }
}
