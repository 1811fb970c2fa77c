//! Line-synchronous compositing of queued items into panel scanlines.

use alloc::{vec, vec::Vec};

use heapless::Vec as HeaplessVec;
use log::{debug, info, warn};

use crate::{
    config::{PanelConfig, Plane},
    item::{DrawItem, LineScratch},
    store::ImageStore,
};

/// Panel-transfer collaborator: receives finished scanlines.
pub trait LineSink {
    type Error;

    /// Transfers one packed line of `plane` for physical scanline `row`.
    fn write_line(&mut self, plane: Plane, row: u16, line: &[u8]) -> Result<(), Self::Error>;

    /// Called once after the last line of a successful flush.
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: LineSink + ?Sized> LineSink for &mut T {
    type Error = T::Error;

    fn write_line(&mut self, plane: Plane, row: u16, line: &[u8]) -> Result<(), Self::Error> {
        (**self).write_line(plane, row, line)
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        (**self).finish()
    }
}

/// Adapts a closure into a [`LineSink`].
pub struct FnSink<F>(pub F);

impl<F, E> LineSink for FnSink<F>
where
    F: FnMut(Plane, u16, &[u8]) -> Result<(), E>,
{
    type Error = E;

    fn write_line(&mut self, plane: Plane, row: u16, line: &[u8]) -> Result<(), Self::Error> {
        (self.0)(plane, row, line)
    }
}

/// Flush failures. The panel is left partially updated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlushError<E> {
    /// The panel-transfer collaborator failed.
    Sink(E),
}

/// Counters reported by a completed flush.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FlushStats {
    /// Lines handed to the sink, all planes included.
    pub lines: u32,
    /// Item contributions merged into lines.
    pub contributions: u32,
    /// Owned item buffers released.
    pub released: u16,
    /// Storage reads that failed and left a blank contribution.
    pub faults: u32,
}

/// Outcome of composing one line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LineReport {
    pub contributions: u16,
    pub faults: u16,
}

/// Merges item contributions into one scanline at a time.
#[derive(Debug)]
pub struct LineCompositor {
    config: PanelConfig,
    scratch: LineScratch,
}

impl LineCompositor {
    pub const fn new(config: PanelConfig) -> Self {
        Self {
            config,
            scratch: LineScratch::new(),
        }
    }

    pub const fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Composes scanline `row` of `plane` into `line` from `items` in order.
    ///
    /// `line` starts as ink-space background (all zero); polarity is not
    /// applied here.
    pub fn render_line<S: ImageStore>(
        &mut self,
        items: &[DrawItem<'_>],
        row: u16,
        plane: Plane,
        store: &mut S,
        line: &mut [u8],
    ) -> LineReport {
        line.fill(0);
        let mut report = LineReport::default();

        for item in items {
            match item.contribution(row, plane, self.config.width, store, &mut self.scratch) {
                Ok(Some(contribution)) => {
                    contribution.merge_into(line, item.combine);
                    report.contributions = report.contributions.saturating_add(1);
                }
                Ok(None) => {}
                Err(_) => report.faults = report.faults.saturating_add(1),
            }
        }

        clear_padding(line, self.config.width);
        report
    }

    /// Streams every scanline of every plane to `sink`, releasing items as
    /// soon as their last row has been emitted.
    pub(crate) fn flush_items<'a, S, I, const N: usize>(
        &mut self,
        items: &mut HeaplessVec<DrawItem<'a>, N>,
        sink: &mut S,
        store: &mut I,
    ) -> Result<FlushStats, FlushError<S::Error>>
    where
        S: LineSink,
        I: ImageStore,
    {
        let mut stats = FlushStats::default();
        let mut line: Vec<u8> = vec![0u8; self.config.line_bytes()];
        let planes = self.config.planes();

        debug!(
            "draw: flush start items={} panel={}x{} planes={}",
            items.len(),
            self.config.width,
            self.config.height,
            planes.len()
        );

        for row in 0..self.config.height {
            for &plane in planes {
                let report = self.render_line(items, row, plane, store, &mut line);
                stats.contributions += report.contributions as u32;
                stats.faults += report.faults as u32;

                let polarity = self.config.polarity(plane);
                if polarity != 0 {
                    for byte in line.iter_mut() {
                        *byte ^= polarity;
                    }
                    clear_padding(&mut line, self.config.width);
                }

                sink.write_line(plane, row, &line)
                    .map_err(FlushError::Sink)?;
                stats.lines += 1;
            }

            stats.released += release_finished(items, row);
        }

        sink.finish().map_err(FlushError::Sink)?;

        if stats.faults > 0 {
            warn!(
                "draw: flush completed with storage faults faults={} lines={}",
                stats.faults, stats.lines
            );
        }
        info!(
            "draw: flush done lines={} contributions={} released={}",
            stats.lines, stats.contributions, stats.released
        );

        Ok(stats)
    }
}

/// Clears the bits past `width` in a partial last byte.
fn clear_padding(line: &mut [u8], width: u16) {
    let tail_bits = width as usize % 8;
    if tail_bits != 0 {
        if let Some(last) = line.last_mut() {
            *last &= 0xFF << (8 - tail_bits);
        }
    }
}

/// Drops items whose footprint ends at or above `row`.
fn release_finished<const N: usize>(items: &mut HeaplessVec<DrawItem<'_>, N>, row: u16) -> u16 {
    let mut released = 0u16;
    items.retain(|item| {
        let done = item.last_row().is_none_or(|last| last <= row);
        if done && item.owns_buffer() {
            released += 1;
        }
        !done
    });
    released
}
