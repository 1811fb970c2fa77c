//! Panel geometry and plane configuration.

use crate::bits::bytes_for_bits;

/// One addressable bit layer of the panel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Plane {
    Black,
    Red,
}

impl Plane {
    /// Bitplane index inside 2bpp image payloads.
    pub const fn index(self) -> usize {
        match self {
            Self::Black => 0,
            Self::Red => 1,
        }
    }
}

/// Plane set supported by the panel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlaneLayout {
    /// Black/white panel, one plane.
    Mono,
    /// Black/white/red panel, black plane then red plane per scanline.
    BlackRed,
}

const MONO_PLANES: [Plane; 1] = [Plane::Black];
const BLACK_RED_PLANES: [Plane; 2] = [Plane::Black, Plane::Red];

impl PlaneLayout {
    pub const fn planes(self) -> &'static [Plane] {
        match self {
            Self::Mono => &MONO_PLANES,
            Self::BlackRed => &BLACK_RED_PLANES,
        }
    }
}

/// Physical panel description used by the compositor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PanelConfig {
    /// Pixels per scanline.
    pub width: u16,
    /// Number of scanlines.
    pub height: u16,
    pub layout: PlaneLayout,
    /// Emit black-plane bits inverted (controllers where `1` means white).
    pub black_inverted: bool,
    /// Emit red-plane bits inverted.
    pub red_inverted: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        // 2.9" black/white/red tag, scanned along its long edge.
        Self {
            width: 128,
            height: 296,
            layout: PlaneLayout::BlackRed,
            black_inverted: false,
            red_inverted: false,
        }
    }
}

/// Configuration errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// Width or height is zero.
    EmptyPanel,
}

impl PanelConfig {
    pub const fn new(width: u16, height: u16, layout: PlaneLayout) -> Self {
        Self {
            width,
            height,
            layout,
            black_inverted: false,
            red_inverted: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyPanel);
        }
        Ok(())
    }

    /// Bytes in one packed scanline.
    pub const fn line_bytes(&self) -> usize {
        bytes_for_bits(self.width as usize)
    }

    /// Planes emitted per scanline, in emission order.
    pub const fn planes(&self) -> &'static [Plane] {
        self.layout.planes()
    }

    /// XOR pattern applied to a finished line of `plane` before transfer.
    pub const fn polarity(&self, plane: Plane) -> u8 {
        let inverted = match plane {
            Plane::Black => self.black_inverted,
            Plane::Red => self.red_inverted,
        };
        if inverted { 0xFF } else { 0x00 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_bytes_round_up_partial_bytes() {
        assert_eq!(PanelConfig::new(122, 250, PlaneLayout::Mono).line_bytes(), 16);
        assert_eq!(PanelConfig::default().line_bytes(), 16);
    }

    #[test]
    fn empty_panel_is_rejected() {
        assert_eq!(
            PanelConfig::new(0, 10, PlaneLayout::Mono).validate(),
            Err(ConfigError::EmptyPanel)
        );
        assert!(PanelConfig::default().validate().is_ok());
    }

    #[test]
    fn layout_lists_black_first() {
        assert_eq!(PlaneLayout::BlackRed.planes(), &[Plane::Black, Plane::Red]);
        assert_eq!(PlaneLayout::Mono.planes(), &[Plane::Black]);
    }
}
