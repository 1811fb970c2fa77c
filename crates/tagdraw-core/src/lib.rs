#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod bits;
#[cfg(any(test, feature = "capture"))]
pub mod capture;
pub mod compositor;
pub mod config;
pub mod font;
pub mod item;
pub mod list;
pub mod store;
pub mod surface;
pub mod text;

#[cfg(test)]
mod testutil;

#[cfg(any(test, feature = "capture"))]
pub use capture::CaptureSink;
pub use compositor::{FlushError, FlushStats, FnSink, LineCompositor, LineReport, LineSink};
pub use config::{ConfigError, PanelConfig, Plane, PlaneLayout};
pub use font::{AnyFont, FileFont, FontError, FontHeader, FontStore, Glyph, MemoryFont, PIXEL_5X7};
pub use item::{AddError, Color, Combine, DrawItem, DrawType, Pixels, Rejected, Rotation, Source};
pub use list::{DEFAULT_LIST_CAPACITY, DrawList, ItemSink};
pub use store::{
    BitDepth, Encoding, FileId, FileStore, ImageHeader, ImageStore, NoStore, Stored, Unavailable,
};
pub use surface::{MAX_QR_VERSION, QrEncoder, qr_side};
pub use text::{FontRenderer, MAX_TEXT_LEN, PrintReport};
