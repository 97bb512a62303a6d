/*
 *  strip/drivers/spi.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  WS2812 string driven from the Raspberry Pi SPI MOSI pin
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{debug, info};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use crate::config::StripSettings;
use crate::strip::color::{ColorOrder, Rgb};
use crate::strip::error::StripError;
use crate::strip::traits::LedStrip;
use crate::strip::ws2812;

/// WS2812 over SPI (GPIO10 / MOSI on the Pi header)
pub struct SpiStrip {
    spi: Spi,
    pixels: Vec<Rgb>,
    order: ColorOrder,
    brightness: f32,
}

impl SpiStrip {
    pub fn new(settings: &StripSettings) -> Result<Self, StripError> {
        let bus = match settings.spi_bus {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            2 => Bus::Spi2,
            3 => Bus::Spi3,
            4 => Bus::Spi4,
            5 => Bus::Spi5,
            6 => Bus::Spi6,
            other => {
                return Err(StripError::InvalidConfiguration(format!(
                    "no SPI bus {}",
                    other
                )));
            }
        };
        let slave = match settings.spi_slave_select {
            0 => SlaveSelect::Ss0,
            1 => SlaveSelect::Ss1,
            2 => SlaveSelect::Ss2,
            other => {
                return Err(StripError::InvalidConfiguration(format!(
                    "no SPI slave select {}",
                    other
                )));
            }
        };

        let spi = Spi::new(bus, slave, ws2812::SPI_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| StripError::InitializationFailed(e.to_string()))?;

        info!(
            "WS2812 on SPI{}.{} - {} LEDs, {:?} order, brightness {:.2}",
            settings.spi_bus, settings.spi_slave_select, settings.led_count, settings.color_order, settings.brightness
        );

        Ok(Self {
            spi,
            pixels: vec![Rgb::OFF; settings.led_count],
            order: settings.color_order,
            brightness: settings.brightness,
        })
    }
}

impl LedStrip for SpiStrip {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set(&mut self, index: usize, color: Rgb) -> Result<(), StripError> {
        let len = self.pixels.len();
        let px = self
            .pixels
            .get_mut(index)
            .ok_or(StripError::IndexOutOfRange { index, len })?;
        *px = color;
        Ok(())
    }

    fn fill(&mut self, color: Rgb) -> Result<(), StripError> {
        self.pixels.fill(color);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StripError> {
        let frame = ws2812::encode_frame(&self.pixels, self.order, self.brightness);
        let written = self.spi.write(&frame)?;
        if written != frame.len() {
            return Err(StripError::Spi(format!(
                "short write: {} of {} bytes",
                written,
                frame.len()
            )));
        }
        debug!("flushed {} bytes to SPI", written);
        Ok(())
    }

    fn name(&self) -> &str {
        "ws2812-spi"
    }
}
