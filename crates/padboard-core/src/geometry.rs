#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// Screen rectangle in viewport coordinates. A snapshot: callers re-query
/// geometry for every decision instead of holding on to these.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }
    pub fn top(&self) -> f32 {
        self.y
    }
    pub fn right(&self) -> f32 {
        self.x + self.w
    }
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.w / 2.0,
            y: self.y + self.h / 2.0,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// Projection of the rectangle onto `axis`.
    pub fn span(&self, axis: Axis) -> Span {
        match axis {
            Axis::Horizontal => Span {
                start: self.left(),
                end: self.right(),
            },
            Axis::Vertical => Span {
                start: self.top(),
                end: self.bottom(),
            },
        }
    }

    pub fn translate(mut self, dx: f32, dy: f32) -> Self {
        self.x += dx;
        self.y += dy;
        self
    }
}

/// Closed interval `[start, end]` on one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Span {
    pub start: f32,
    pub end: f32,
}

impl Span {
    pub fn contains(&self, v: f32) -> bool {
        v >= self.start && v <= self.end
    }

    /// Strict overlap; spans that only touch at an edge do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// 0 inside the span, otherwise the distance to the nearer edge.
    pub fn distance_to(&self, v: f32) -> f32 {
        if self.contains(v) {
            0.0
        } else {
            (v - self.start).abs().min((v - self.end).abs())
        }
    }
}
