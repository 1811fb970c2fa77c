//! Host-side sink that records every transferred line.
//!
//! Used for previews and tests; the compositor itself never holds a frame.

use alloc::{vec, vec::Vec};
use core::convert::Infallible;

use crate::{
    compositor::LineSink,
    config::{PanelConfig, Plane},
};

/// Records lines per plane as they arrive.
#[derive(Clone, Debug)]
pub struct CaptureSink {
    config: PanelConfig,
    black: Vec<u8>,
    red: Vec<u8>,
    calls: Vec<(Plane, u16)>,
    finished: bool,
}

impl CaptureSink {
    /// Creates a sink whose planes start out as `fill` bytes.
    pub fn new(config: PanelConfig, fill: u8) -> Self {
        let size = config.line_bytes() * config.height as usize;
        Self {
            config,
            black: vec![fill; size],
            red: vec![fill; size],
            calls: Vec::new(),
            finished: false,
        }
    }

    pub fn plane(&self, plane: Plane) -> &[u8] {
        match plane {
            Plane::Black => &self.black,
            Plane::Red => &self.red,
        }
    }

    pub fn line(&self, plane: Plane, row: u16) -> &[u8] {
        let stride = self.config.line_bytes();
        let start = row as usize * stride;
        &self.plane(plane)[start..start + stride]
    }

    pub fn pixel(&self, plane: Plane, x: u16, y: u16) -> bool {
        let byte = self.line(plane, y)[x as usize / 8];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// `(plane, row)` of every transfer, in order.
    pub fn calls(&self) -> &[(Plane, u16)] {
        &self.calls
    }

    pub fn finished(&self) -> bool {
        self.finished
    }
}

impl LineSink for CaptureSink {
    type Error = Infallible;

    fn write_line(&mut self, plane: Plane, row: u16, line: &[u8]) -> Result<(), Self::Error> {
        let stride = self.config.line_bytes();
        let start = row as usize * stride;
        let target = match plane {
            Plane::Black => &mut self.black,
            Plane::Red => &mut self.red,
        };
        if let Some(slot) = target.get_mut(start..start + stride) {
            slot.copy_from_slice(&line[..stride]);
        }
        self.calls.push((plane, row));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.finished = true;
        Ok(())
    }
}
