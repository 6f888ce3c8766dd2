//! # Virtual Viewport
//!
//! Vertical layout of the block list for windowed rendering.
//!
//! Each block gets a `top` and `height`: its measured height if one was
//! reported for its id, else a shared estimate. Visibility queries are two
//! binary searches over the sorted positions.

use std::collections::HashMap;
use std::ops::Range;

use blockdoc_config::ViewportConfig;

use crate::model::{Block, BlockId};

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportPosition {
    pub id: BlockId,
    pub top: f64,
    pub height: f64,
}

impl ViewportPosition {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Blocks to materialize for one scroll position, overscan included.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRange<'a> {
    pub start_index: usize,
    /// Exclusive
    pub end_index: usize,
    pub positions: &'a [ViewportPosition],
}

/// What a host renders: a block range plus the spacer heights standing in
/// for everything outside it.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleWindow {
    pub range: Range<usize>,
    pub leading_spacer: f64,
    pub trailing_spacer: f64,
    pub virtualized: bool,
}

#[derive(Debug, Clone)]
pub struct VirtualViewport {
    config: ViewportConfig,
    /// Keyed by block id; only ids in the current layout are kept
    measured: HashMap<BlockId, f64>,
    positions: Vec<ViewportPosition>,
    index: HashMap<BlockId, usize>,
    total_height: f64,
}

impl Default for VirtualViewport {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl VirtualViewport {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            measured: HashMap::new(),
            positions: Vec::new(),
            index: HashMap::new(),
            total_height: 0.0,
        }
    }

    pub fn layout(&mut self, blocks: &[Block]) {
        self.positions = blocks
            .iter()
            .map(|b| ViewportPosition {
                id: b.id.clone(),
                top: 0.0,
                height: 0.0,
            })
            .collect();
        self.index = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        let index = &self.index;
        self.measured.retain(|id, _| index.contains_key(id));
        self.relayout();
    }

    /// Record a rendered height for a laid-out block. Returns whether the
    /// layout changed.
    pub fn set_measured_height(&mut self, id: &BlockId, height: f64) -> bool {
        let height = height.max(0.0);
        if !self.index.contains_key(id) || self.measured.get(id) == Some(&height) {
            return false;
        }
        self.measured.insert(id.clone(), height);
        self.relayout();
        true
    }

    pub fn measured_height(&self, id: &BlockId) -> Option<f64> {
        self.measured.get(id).copied()
    }

    pub fn positions(&self) -> &[ViewportPosition] {
        &self.positions
    }

    pub fn total_height(&self) -> f64 {
        self.total_height
    }

    pub fn position_of(&self, id: &BlockId) -> Option<&ViewportPosition> {
        self.index.get(id).map(|&i| &self.positions[i])
    }

    /// Whether a document of the current size renders windowed.
    pub fn is_virtualized(&self) -> bool {
        self.positions.len() > self.config.virtualization_threshold
    }

    pub fn visible_range(&self, scroll_top: f64, viewport_height: f64) -> VisibleRange<'_> {
        let len = self.positions.len();
        let viewport_bottom = scroll_top + viewport_height;

        let first = self.positions.partition_point(|p| p.bottom() < scroll_top);
        let past_last = self.positions.partition_point(|p| p.top <= viewport_bottom);

        let start_index = first.saturating_sub(self.config.overscan).min(len);
        let end_index = past_last
            .saturating_add(self.config.overscan)
            .min(len)
            .max(start_index);

        VisibleRange {
            start_index,
            end_index,
            positions: &self.positions[start_index..end_index],
        }
    }

    /// Blocks to render for a scroll position. Below the virtualization
    /// threshold this is the whole document with no spacers.
    pub fn visible_window(&self, scroll_top: f64, viewport_height: f64) -> VisibleWindow {
        if !self.is_virtualized() {
            return VisibleWindow {
                range: 0..self.positions.len(),
                leading_spacer: 0.0,
                trailing_spacer: 0.0,
                virtualized: false,
            };
        }

        let range = self.visible_range(scroll_top, viewport_height);
        let leading_spacer = range.positions.first().map_or(0.0, |p| p.top);
        let trailing_spacer = range
            .positions
            .last()
            .map_or(self.total_height, |p| self.total_height - p.bottom());

        VisibleWindow {
            range: range.start_index..range.end_index,
            leading_spacer,
            trailing_spacer,
            virtualized: true,
        }
    }

    fn relayout(&mut self) {
        let mut top = 0.0;
        for position in &mut self.positions {
            position.top = top;
            position.height = self
                .measured
                .get(&position.id)
                .copied()
                .unwrap_or(self.config.estimated_block_height);
            top += position.height;
        }
        self.total_height = top;
    }
}
