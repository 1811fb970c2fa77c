//! Bounded, insertion-ordered queue of pending drawables.

use heapless::Vec;
use log::{debug, warn};

use crate::{
    compositor::{FlushError, FlushStats, LineCompositor, LineSink},
    config::PanelConfig,
    item::{AddError, DrawItem, Rejected},
    store::ImageStore,
};

pub const DEFAULT_LIST_CAPACITY: usize = 64;

/// Anything that accepts drawables: the queue itself, or a caller's own sink.
pub trait ItemSink<'a> {
    fn enqueue(&mut self, item: DrawItem<'a>) -> Result<(), Rejected<'a>>;
}

/// Drawables waiting for the next flush, in paint order.
#[derive(Debug)]
pub struct DrawList<'a, const N: usize = DEFAULT_LIST_CAPACITY> {
    config: PanelConfig,
    items: Vec<DrawItem<'a>, N>,
}

impl<'a, const N: usize> DrawList<'a, N> {
    pub const fn new(config: PanelConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
        }
    }

    pub const fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn items(&self) -> &[DrawItem<'a>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Validates `item` and appends it on top of everything queued so far.
    ///
    /// On failure the item comes back to the caller untouched apart from
    /// its derived geometry.
    pub fn add(&mut self, mut item: DrawItem<'a>) -> Result<(), Rejected<'a>> {
        if let Err(reason) = item.check_bounds(&self.config) {
            warn!(
                "draw: item rejected type={:?} reason={:?}",
                item.draw_type(),
                reason
            );
            return Err(Rejected { reason, item });
        }

        if let Err(item) = self.items.push(item) {
            warn!("draw: list full capacity={} type={:?}", N, item.draw_type());
            return Err(Rejected {
                reason: AddError::ListFull,
                item,
            });
        }

        if let Some(item) = self.items.last() {
            debug!(
                "draw: queued type={:?} at=({}, {}) size={}x{} rot={:?} color={:?} drawn_bytes={}",
                item.draw_type(),
                item.x,
                item.y,
                item.width(),
                item.height(),
                item.rotation,
                item.color,
                item.drawn_width_bytes()
            );
        }
        Ok(())
    }

    /// Drops every queued item, releasing owned buffers.
    pub fn clear(&mut self) -> u16 {
        let released = self.items.iter().filter(|item| item.owns_buffer()).count() as u16;
        self.items.clear();
        released
    }

    /// Composites all queued items into `sink`, one scanline at a time.
    ///
    /// The list is empty afterwards, whether the flush succeeded or not.
    pub fn flush<S, I>(&mut self, sink: &mut S, store: &mut I) -> Result<FlushStats, FlushError<S::Error>>
    where
        S: LineSink,
        I: ImageStore,
    {
        let mut compositor = LineCompositor::new(self.config);
        let result = compositor.flush_items(&mut self.items, sink, store);
        let leftover = self.clear();

        result.map(|mut stats| {
            stats.released += leftover;
            stats
        })
    }
}

impl<'a, const N: usize> ItemSink<'a> for DrawList<'a, N> {
    fn enqueue(&mut self, item: DrawItem<'a>) -> Result<(), Rejected<'a>> {
        self.add(item)
    }
}

/// Collects items unvalidated, for callers that draw them on their own.
impl<'a> ItemSink<'a> for alloc::vec::Vec<DrawItem<'a>> {
    fn enqueue(&mut self, item: DrawItem<'a>) -> Result<(), Rejected<'a>> {
        self.push(item);
        Ok(())
    }
}
