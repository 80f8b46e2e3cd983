//! Builds small TrueType fonts in memory for the integration tests.

/// A point of a simple glyph contour: `(x, y, on_curve)`.
pub type Point = (i16, i16, bool);

pub enum TestGlyph {
    /// A glyph with a zero-length `glyf` record, like a space.
    Empty,
    Simple(Vec<Vec<Point>>),
    /// Components as `(glyph_id, dx, dy)`, with word-sized XY offsets.
    Composite(Vec<(u16, i16, i16)>),
}

/// A square contour from `(x0, y0)` to `(x1, y1)`, wound clockwise.
pub fn square(x0: i16, y0: i16, x1: i16, y1: i16) -> Vec<Point> {
    vec![(x0, y0, true), (x0, y1, true), (x1, y1, true), (x1, y0, true)]
}

/// A closed curve through four off-curve points, which implies on-curve midpoints.
pub fn blob(x0: i16, y0: i16, x1: i16, y1: i16) -> Vec<Point> {
    vec![(x0, y0, false), (x0, y1, false), (x1, y1, false), (x1, y0, false)]
}

pub struct FontBuilder {
    units_per_em: u16,
    glyphs: Vec<(TestGlyph, u16)>,
    format4: Vec<(u16, u16, u16)>,
    format12: Vec<(u32, u32, u32)>,
    vertical_metrics: Option<(i16, i16, i16)>,
}

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn push_i16(out: &mut Vec<u8>, v: i16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

impl FontBuilder {
    /// A font whose glyph 0 is an empty `.notdef`.
    pub fn new(units_per_em: u16) -> FontBuilder {
        FontBuilder {
            units_per_em,
            glyphs: vec![(TestGlyph::Empty, 500)],
            format4: Vec::new(),
            format12: Vec::new(),
            vertical_metrics: Some((800, -200, 90)),
        }
    }

    /// Adds a glyph and returns its id.
    pub fn glyph(&mut self, glyph: TestGlyph, advance: u16) -> u16 {
        self.glyphs.push((glyph, advance));
        (self.glyphs.len() - 1) as u16
    }

    /// Maps `start..=end` to consecutive glyph ids from `first_glyph` in a format 4 subtable.
    pub fn map_format4(&mut self, start: u16, end: u16, first_glyph: u16) -> &mut Self {
        self.format4
            .push((start, end, first_glyph.wrapping_sub(start)));
        self
    }

    /// Adds a format 12 group.
    pub fn map_format12(&mut self, start: u32, end: u32, first_glyph: u32) -> &mut Self {
        self.format12.push((start, end, first_glyph));
        self
    }

    pub fn without_hhea(&mut self) -> &mut Self {
        self.vertical_metrics = None;
        self
    }

    fn encode_glyph(glyph: &TestGlyph) -> Vec<u8> {
        let mut out = Vec::new();
        match glyph {
            TestGlyph::Empty => {}
            TestGlyph::Simple(contours) => {
                let points: Vec<Point> = contours.iter().flatten().copied().collect();
                push_i16(&mut out, contours.len() as i16);
                push_i16(&mut out, points.iter().map(|p| p.0).min().unwrap_or(0));
                push_i16(&mut out, points.iter().map(|p| p.1).min().unwrap_or(0));
                push_i16(&mut out, points.iter().map(|p| p.0).max().unwrap_or(0));
                push_i16(&mut out, points.iter().map(|p| p.1).max().unwrap_or(0));
                let mut end = 0u16;
                for contour in contours {
                    end += contour.len() as u16;
                    push_u16(&mut out, end - 1);
                }
                push_u16(&mut out, 0);
                out.extend(points.iter().map(|p| u8::from(p.2)));
                let mut prev = 0i16;
                for p in &points {
                    push_i16(&mut out, p.0 - prev);
                    prev = p.0;
                }
                prev = 0;
                for p in &points {
                    push_i16(&mut out, p.1 - prev);
                    prev = p.1;
                }
            }
            TestGlyph::Composite(components) => {
                push_i16(&mut out, -1);
                out.extend_from_slice(&[0; 8]);
                for (i, &(glyph_id, dx, dy)) in components.iter().enumerate() {
                    // ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES, plus MORE_COMPONENTS
                    let more = if i + 1 < components.len() { 0x0020 } else { 0 };
                    push_u16(&mut out, 0x0003 | more);
                    push_u16(&mut out, glyph_id);
                    push_i16(&mut out, dx);
                    push_i16(&mut out, dy);
                }
            }
        }
        if out.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn cmap(&self) -> Vec<u8> {
        let mut subtables: Vec<(u16, Vec<u8>)> = Vec::new();

        if !self.format4.is_empty() {
            let mut segments = self.format4.clone();
            segments.sort_by_key(|s| s.1);
            segments.push((0xFFFF, 0xFFFF, 1));
            let seg_count = segments.len() as u16;

            let mut table = Vec::new();
            push_u16(&mut table, 4);
            push_u16(&mut table, 16 + seg_count * 8);
            push_u16(&mut table, 0);
            push_u16(&mut table, seg_count * 2);
            table.extend_from_slice(&[0; 6]);
            segments.iter().for_each(|s| push_u16(&mut table, s.1));
            push_u16(&mut table, 0);
            segments.iter().for_each(|s| push_u16(&mut table, s.0));
            segments.iter().for_each(|s| push_u16(&mut table, s.2));
            segments.iter().for_each(|_| push_u16(&mut table, 0));
            subtables.push((1, table));
        }

        if !self.format12.is_empty() {
            let mut table = Vec::new();
            push_u16(&mut table, 12);
            push_u16(&mut table, 0);
            push_u32(&mut table, 16 + 12 * self.format12.len() as u32);
            push_u32(&mut table, 0);
            push_u32(&mut table, self.format12.len() as u32);
            for &(start, end, glyph) in &self.format12 {
                push_u32(&mut table, start);
                push_u32(&mut table, end);
                push_u32(&mut table, glyph);
            }
            subtables.push((10, table));
        }

        let mut out = Vec::new();
        push_u16(&mut out, 0);
        push_u16(&mut out, subtables.len() as u16);
        let mut offset = 4 + 8 * subtables.len() as u32;
        for (encoding, table) in &subtables {
            push_u16(&mut out, 3);
            push_u16(&mut out, *encoding);
            push_u32(&mut out, offset);
            offset += table.len() as u32;
        }
        for (_, table) in subtables {
            out.extend(table);
        }
        out
    }

    pub fn build(&self) -> Vec<u8> {
        let num_glyphs = self.glyphs.len() as u16;

        let mut glyf = Vec::new();
        let mut loca = Vec::new();
        for (glyph, _) in &self.glyphs {
            push_u32(&mut loca, glyf.len() as u32);
            glyf.extend(Self::encode_glyph(glyph));
        }
        push_u32(&mut loca, glyf.len() as u32);

        let mut head = vec![0u8; 54];
        head[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
        head[12..16].copy_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
        head[18..20].copy_from_slice(&self.units_per_em.to_be_bytes());
        head[50..52].copy_from_slice(&1i16.to_be_bytes());

        let mut maxp = Vec::new();
        push_u32(&mut maxp, 0x0000_5000);
        push_u16(&mut maxp, num_glyphs);

        let mut hmtx = Vec::new();
        for (_, advance) in &self.glyphs {
            push_u16(&mut hmtx, *advance);
            push_i16(&mut hmtx, 0);
        }

        let mut tables: Vec<(&[u8; 4], Vec<u8>)> = vec![
            (b"cmap", self.cmap()),
            (b"glyf", glyf),
            (b"head", head),
        ];
        if let Some((ascender, descender, line_gap)) = self.vertical_metrics {
            let mut hhea = vec![0u8; 36];
            hhea[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
            hhea[4..6].copy_from_slice(&ascender.to_be_bytes());
            hhea[6..8].copy_from_slice(&descender.to_be_bytes());
            hhea[8..10].copy_from_slice(&line_gap.to_be_bytes());
            hhea[34..36].copy_from_slice(&num_glyphs.to_be_bytes());
            tables.push((b"hhea", hhea));
        }
        tables.push((b"hmtx", hmtx));
        tables.push((b"loca", loca));
        tables.push((b"maxp", maxp));

        let mut out = Vec::new();
        push_u32(&mut out, 0x0001_0000);
        push_u16(&mut out, tables.len() as u16);
        out.extend_from_slice(&[0; 6]);

        let mut offset = 12 + 16 * tables.len();
        let mut body = Vec::new();
        for (tag, data) in &tables {
            out.extend_from_slice(&tag[..]);
            push_u32(&mut out, 0);
            push_u32(&mut out, offset as u32);
            push_u32(&mut out, data.len() as u32);

            body.extend_from_slice(data);
            while body.len() % 4 != 0 {
                body.push(0);
            }
            offset = 12 + 16 * tables.len() + body.len();
        }
        out.extend(body);
        out
    }
}
