use crate::geometry::Rect;

/// Opaque handle to a rendered button. Only valid for the render that
/// produced it; compare by equality, never by value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Focus highlight.
    Active,
    /// Held down by a select gesture.
    Pressed,
}

impl Marker {
    pub fn class_name(self) -> &'static str {
        match self {
            Marker::Active => "active-key",
            Marker::Pressed => "hg-activeButton",
        }
    }
}

pub trait GeometrySource {
    /// Current on-screen rectangle, or `None` if the element is gone.
    fn rect(&self, el: ElementId) -> Option<Rect>;
}

/// What the navigation core needs from the keyboard widget.
pub trait KeyboardSurface: GeometrySource {
    /// Tab-eligible buttons in render order.
    fn candidates(&self) -> Vec<ElementId>;
    /// Literal text ("q") or a bracketed symbolic name ("{shift}").
    fn key_identifier(&self, el: ElementId) -> Option<String>;
    fn set_marker(&mut self, el: ElementId, marker: Marker, on: bool);
    fn layout(&self) -> &str;
    /// Switches the layout option. The widget re-renders before returning,
    /// so every previously handed out `ElementId` is stale afterwards.
    fn set_layout(&mut self, name: &str);
}

/// The single focused element, if any.
#[derive(Debug, Default)]
pub struct FocusRegistry {
    active: Option<ElementId>,
}

impl FocusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<ElementId> {
        self.active
    }

    pub fn set_active<S: KeyboardSurface + ?Sized>(&mut self, surface: &mut S, el: ElementId) {
        if let Some(prev) = self.active.take() {
            surface.set_marker(prev, Marker::Active, false);
        }
        self.active = Some(el);
        surface.set_marker(el, Marker::Active, true);
    }

    /// Removes focus and its marker.
    pub fn clear<S: KeyboardSurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(prev) = self.active.take() {
            surface.set_marker(prev, Marker::Active, false);
        }
    }

    /// Drops the reference without touching markers, for when the widget has
    /// already thrown the element away.
    pub fn forget(&mut self) {
        self.active = None;
    }

    pub fn active_key_identifier<S: KeyboardSurface + ?Sized>(&self, surface: &S) -> Option<String> {
        self.active.and_then(|el| surface.key_identifier(el))
    }
}
