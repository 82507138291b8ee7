use std::collections::HashSet;

use padboard_core::{ElementId, GeometrySource, KeyboardSurface, Marker, Rect};
use slotmap::{Key, KeyData, SlotMap};
use taffy::prelude::{Size, TaffyMaxContent, length};
use taffy::style::{FlexDirection, Style};
use taffy::{NodeId, TaffyTree};

use crate::error::LayoutError;
use crate::layouts::{Layouts, key_width};

slotmap::new_key_type! {
    pub struct KeyId;
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Markers: u8 {
        const ACTIVE = 1;
        const PRESSED = 1 << 1;
    }
}

impl From<Marker> for Markers {
    fn from(m: Marker) -> Self {
        match m {
            Marker::Active => Markers::ACTIVE,
            Marker::Pressed => Markers::PRESSED,
        }
    }
}

impl Markers {
    /// Class names as the web widget would carry them.
    pub fn class_names(self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.contains(Markers::ACTIVE) {
            out.push(Marker::Active.class_name());
        }
        if self.contains(Markers::PRESSED) {
            out.push(Marker::Pressed.class_name());
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyButton {
    pub identifier: String,
    pub row: usize,
    pub rect: Rect,
    pub markers: Markers,
    pub disabled: bool,
}

/// Sizes in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    /// Width of a 1-unit key.
    pub unit: f32,
    pub row_height: f32,
    pub gap: f32,
    pub padding: f32,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            unit: 40.0,
            row_height: 40.0,
            gap: 4.0,
            padding: 8.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// First render after construction.
    Init { layout: String },
    Render { layout: String },
}

/// The on-screen keyboard. Buttons live in a slot map that is cleared on
/// every render, so an [`ElementId`] handed out by one render never resolves
/// in the next.
pub struct Keyboard {
    layouts: Layouts,
    layout: String,
    metrics: Metrics,
    disabled: HashSet<String>,
    buttons: SlotMap<KeyId, KeyButton>,
    order: Vec<KeyId>,
    size: (f32, f32),
    notices: Vec<Notice>,
}

impl Keyboard {
    pub fn new(layouts: Layouts, initial: &str, metrics: Metrics) -> Result<Self, LayoutError> {
        let mut kb = Self {
            layouts,
            layout: initial.to_string(),
            metrics,
            disabled: HashSet::new(),
            buttons: SlotMap::with_key(),
            order: Vec::new(),
            size: (0.0, 0.0),
            notices: Vec::new(),
        };
        kb.render()?;
        kb.notices.push(Notice::Init {
            layout: kb.layout.clone(),
        });
        Ok(kb)
    }

    pub fn qwerty() -> Result<Self, LayoutError> {
        Self::new(Layouts::qwerty(), "default", Metrics::default())
    }

    pub fn layouts(&self) -> &Layouts {
        &self.layouts
    }

    /// Total size including padding.
    pub fn size(&self) -> (f32, f32) {
        self.size
    }

    pub fn button(&self, el: ElementId) -> Option<&KeyButton> {
        self.buttons.get(key_of(el))
    }

    /// Buttons in render order, including disabled ones.
    pub fn buttons(&self) -> impl Iterator<Item = (ElementId, &KeyButton)> {
        self.order
            .iter()
            .filter_map(|&k| self.buttons.get(k).map(|b| (element_of(k), b)))
    }

    /// First rendered button with this identifier.
    pub fn find(&self, identifier: &str) -> Option<ElementId> {
        self.buttons()
            .find(|(_, b)| b.identifier == identifier)
            .map(|(el, _)| el)
    }

    /// Excludes every button with `identifier` from navigation. Persists
    /// across renders.
    pub fn set_disabled(&mut self, identifier: &str, disabled: bool) {
        if disabled {
            self.disabled.insert(identifier.to_string());
        } else {
            self.disabled.remove(identifier);
        }
        for button in self.buttons.values_mut() {
            if button.identifier == identifier {
                button.disabled = disabled;
            }
        }
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Switches layouts, re-rendering on success.
    pub fn try_set_layout(&mut self, name: &str) -> Result<(), LayoutError> {
        if !self.layouts.contains(name) {
            return Err(LayoutError::UnknownLayout(name.to_string()));
        }
        let previous = std::mem::replace(&mut self.layout, name.to_string());
        if let Err(e) = self.render() {
            self.layout = previous;
            return Err(e);
        }
        self.notices.push(Notice::Render {
            layout: self.layout.clone(),
        });
        Ok(())
    }

    /// One line per row. Active keys print as `>k<`, pressed as `*k*`,
    /// disabled as `(k)`.
    pub fn dump(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for (_, b) in self.buttons() {
            let mut label = b.identifier.clone();
            if b.disabled {
                label = format!("({label})");
            }
            if b.markers.contains(Markers::PRESSED) {
                label = format!("*{label}*");
            }
            if b.markers.contains(Markers::ACTIVE) {
                label = format!(">{label}<");
            }
            if lines.len() <= b.row {
                lines.resize(b.row + 1, String::new());
            } else {
                lines[b.row].push(' ');
            }
            lines[b.row].push_str(&label);
        }
        lines.join("\n")
    }

    fn render(&mut self) -> Result<(), LayoutError> {
        let rows = self
            .layouts
            .get(&self.layout)
            .ok_or_else(|| LayoutError::UnknownLayout(self.layout.clone()))?;
        if rows.is_empty() {
            return Err(LayoutError::Empty(self.layout.clone()));
        }

        let m = self.metrics;
        let mut tree: TaffyTree<()> = TaffyTree::new();
        let mut row_nodes = Vec::with_capacity(rows.len());
        let mut leaves: Vec<Vec<(NodeId, &str)>> = Vec::with_capacity(rows.len());

        for row in rows {
            let mut row_leaves = Vec::with_capacity(row.len());
            for identifier in row {
                let leaf = tree.new_leaf(Style {
                    size: Size {
                        width: length(key_width(identifier) * m.unit),
                        height: length(m.row_height),
                    },
                    flex_shrink: 0.0,
                    ..Default::default()
                })?;
                row_leaves.push((leaf, identifier.as_str()));
            }
            let children: Vec<NodeId> = row_leaves.iter().map(|(n, _)| *n).collect();
            let row_node = tree.new_with_children(
                Style {
                    flex_direction: FlexDirection::Row,
                    gap: Size {
                        width: length(m.gap),
                        height: length(0.0),
                    },
                    ..Default::default()
                },
                &children,
            )?;
            row_nodes.push(row_node);
            leaves.push(row_leaves);
        }

        let root = tree.new_with_children(
            Style {
                flex_direction: FlexDirection::Column,
                gap: Size {
                    width: length(0.0),
                    height: length(m.gap),
                },
                padding: taffy::geometry::Rect {
                    left: length(m.padding),
                    right: length(m.padding),
                    top: length(m.padding),
                    bottom: length(m.padding),
                },
                ..Default::default()
            },
            &row_nodes,
        )?;
        tree.compute_layout(root, Size::MAX_CONTENT)?;

        let mut rendered = Vec::new();
        for (r, (row_node, row_leaves)) in row_nodes.iter().zip(&leaves).enumerate() {
            let row_at = tree.layout(*row_node)?.location;
            for (leaf, identifier) in row_leaves {
                let l = tree.layout(*leaf)?;
                let rect = Rect::new(
                    row_at.x + l.location.x,
                    row_at.y + l.location.y,
                    l.size.width,
                    l.size.height,
                );
                rendered.push((identifier.to_string(), r, rect));
            }
        }
        let root_size = tree.layout(root)?.size;

        self.buttons.clear();
        self.order.clear();
        for (identifier, row, rect) in rendered {
            let disabled = self.disabled.contains(&identifier);
            let key = self.buttons.insert(KeyButton {
                identifier,
                row,
                rect,
                markers: Markers::empty(),
                disabled,
            });
            self.order.push(key);
        }
        self.size = (root_size.width, root_size.height);
        log::debug!(
            "rendered layout {:?}: {} buttons, {}x{}",
            self.layout,
            self.order.len(),
            self.size.0,
            self.size.1
        );
        Ok(())
    }
}

fn element_of(key: KeyId) -> ElementId {
    ElementId(key.data().as_ffi())
}

fn key_of(el: ElementId) -> KeyId {
    KeyData::from_ffi(el.0).into()
}

impl GeometrySource for Keyboard {
    fn rect(&self, el: ElementId) -> Option<Rect> {
        self.button(el).map(|b| b.rect)
    }
}

impl KeyboardSurface for Keyboard {
    fn candidates(&self) -> Vec<ElementId> {
        self.buttons()
            .filter(|(_, b)| !b.disabled)
            .map(|(el, _)| el)
            .collect()
    }

    fn key_identifier(&self, el: ElementId) -> Option<String> {
        self.button(el).map(|b| b.identifier.clone())
    }

    fn set_marker(&mut self, el: ElementId, marker: Marker, on: bool) {
        if let Some(b) = self.buttons.get_mut(key_of(el)) {
            b.markers.set(marker.into(), on);
        }
    }

    fn layout(&self) -> &str {
        &self.layout
    }

    fn set_layout(&mut self, name: &str) {
        if let Err(e) = self.try_set_layout(name) {
            log::warn!("layout switch to {name:?} ignored: {e}");
        }
    }
}
