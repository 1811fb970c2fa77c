#![cfg_attr(not(test), no_std)]

//! SSD16xx-family (SSD1675/SSD1680) e-paper controller driver.
//!
//! The controller keeps its own frame RAM, so the host streams one row per
//! plane at a time and never holds a frame buffer.

pub mod protocol;

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};
use log::{debug, warn};
use tagdraw_core::{LineSink, PanelConfig, Plane, PlaneLayout};

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Pixels per RAM row.
    pub width: u16,
    /// Gate lines.
    pub height: u16,
    /// Longest wait for BUSY to drop, in milliseconds.
    pub busy_timeout_ms: u32,
    /// Black RAM stores white as `1` (true on every SSD16xx part seen so far).
    pub black_ram_white_high: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 128,
            height: 296,
            busy_timeout_ms: 20_000,
            black_ram_white_high: true,
        }
    }
}

impl Config {
    /// Compositor geometry and polarity matching this controller.
    pub fn panel_config(&self, layout: PlaneLayout) -> PanelConfig {
        PanelConfig {
            black_inverted: self.black_ram_white_high,
            ..PanelConfig::new(self.width, self.height, layout)
        }
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<SpiErr, DcErr, BusyErr> {
    /// SPI transaction failed.
    Spi(SpiErr),
    /// D/C pin operation failed.
    Dc(DcErr),
    /// BUSY pin read failed.
    Busy(BusyErr),
    /// BUSY stayed high past `Config::busy_timeout_ms`.
    BusyTimeout,
    /// Geometry, row or line length outside the configured panel.
    InvalidInput,
}

pub type DriverResult<SpiErr, DcErr, BusyErr> = Result<(), Error<SpiErr, DcErr, BusyErr>>;

/// SSD16xx driver.
#[derive(Debug)]
pub struct Ssd16xx<SPI, DC, BUSY, D> {
    spi: SPI,
    dc: DC,
    busy: BUSY,
    delay: D,
    config: Config,
}

impl<SPI, DC, BUSY, D> Ssd16xx<SPI, DC, BUSY, D>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, dc: DC, busy: BUSY, delay: D, config: Config) -> Self {
        Self {
            spi,
            dc,
            busy,
            delay,
            config,
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Releases owned bus, pins and delay.
    pub fn release(self) -> (SPI, DC, BUSY, D) {
        (self.spi, self.dc, self.busy, self.delay)
    }

    /// Resets the controller and sets the RAM window to the whole panel.
    pub fn init(&mut self) -> DriverResult<SPI::Error, DC::Error, BUSY::Error> {
        let x_range = protocol::ram_x_range(self.config.width).ok_or(Error::InvalidInput)?;
        let y_range = protocol::ram_y_range(self.config.height).ok_or(Error::InvalidInput)?;
        let output = protocol::driver_output(self.config.height).ok_or(Error::InvalidInput)?;

        self.wait_idle()?;
        self.command(protocol::SW_RESET, &[])?;
        self.wait_idle()?;
        self.command(protocol::DRIVER_OUTPUT_CONTROL, &output)?;
        self.command(protocol::DATA_ENTRY_MODE, &[protocol::ENTRY_X_INC_Y_INC])?;
        self.command(protocol::RAM_X_RANGE, &x_range)?;
        self.command(protocol::RAM_Y_RANGE, &y_range)?;
        self.command(protocol::BORDER_WAVEFORM, &[protocol::BORDER_WHITE])?;

        debug!(
            "epd: init width={} height={}",
            self.config.width, self.config.height
        );
        Ok(())
    }

    /// Writes one row of `plane` into controller RAM.
    pub fn write_line(
        &mut self,
        plane: Plane,
        row: u16,
        data: &[u8],
    ) -> DriverResult<SPI::Error, DC::Error, BUSY::Error> {
        if row >= self.config.height || data.len() != protocol::line_bytes(self.config.width) {
            return Err(Error::InvalidInput);
        }

        let ram = match plane {
            Plane::Black => protocol::WRITE_BLACK_RAM,
            Plane::Red => protocol::WRITE_RED_RAM,
        };
        self.command(protocol::RAM_X_COUNTER, &[0x00])?;
        self.command(protocol::RAM_Y_COUNTER, &protocol::y_counter(row))?;
        self.command(ram, data)
    }

    /// Runs a full refresh from RAM and waits for it to finish.
    pub fn refresh(&mut self) -> DriverResult<SPI::Error, DC::Error, BUSY::Error> {
        self.command(protocol::DISPLAY_UPDATE_CONTROL_2, &[protocol::UPDATE_FULL])?;
        self.command(protocol::MASTER_ACTIVATION, &[])?;
        self.wait_idle()?;
        debug!("epd: refresh done");
        Ok(())
    }

    /// Enters deep sleep. A hardware reset and [`Self::init`] wake it.
    pub fn sleep(&mut self) -> DriverResult<SPI::Error, DC::Error, BUSY::Error> {
        self.command(protocol::DEEP_SLEEP, &[protocol::SLEEP_MODE_1])
    }

    fn command(&mut self, command: u8, data: &[u8]) -> DriverResult<SPI::Error, DC::Error, BUSY::Error> {
        self.dc.set_low().map_err(Error::Dc)?;
        self.spi.write(&[command]).map_err(Error::Spi)?;
        if data.is_empty() {
            return Ok(());
        }
        self.dc.set_high().map_err(Error::Dc)?;
        self.spi.write(data).map_err(Error::Spi)
    }

    fn wait_idle(&mut self) -> DriverResult<SPI::Error, DC::Error, BUSY::Error> {
        let mut waited_ms = 0u32;
        while self.busy.is_high().map_err(Error::Busy)? {
            if waited_ms >= self.config.busy_timeout_ms {
                warn!("epd: busy timeout after_ms={}", waited_ms);
                return Err(Error::BusyTimeout);
            }
            self.delay.delay_ms(1);
            waited_ms += 1;
        }
        Ok(())
    }
}

impl<SPI, DC, BUSY, D> LineSink for Ssd16xx<SPI, DC, BUSY, D>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    type Error = Error<SPI::Error, DC::Error, BUSY::Error>;

    fn write_line(&mut self, plane: Plane, row: u16, line: &[u8]) -> Result<(), Self::Error> {
        Ssd16xx::write_line(self, plane, row, line)
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.refresh()
    }
}
