// ===============================================================================
// ESP32 Wi-Fi Pixel Canvas
// ===============================================================================
// - 1.44" ST7735 TFT (128x128) on SPI
// - Joins the Wi-Fi from secrets.toml, progress is shown on the panel
// - Control page on http://<ip>/ to print text or paint a 16x16 grid
// ===============================================================================

// === IMPORTS ===
use core::ptr::addr_of_mut;

use embedded_hal::digital::OutputPin as OutputPinTrait;
use embedded_hal::spi::SpiDevice;

use esp_idf_svc::hal::{
    delay::FreeRtos,
    gpio::{AnyIOPin, OutputPin, PinDriver},
    peripherals::Peripherals,
    prelude::*,
    spi::{config::Config, SpiDeviceDriver, SpiDriver, SpiDriverConfig},
};
use esp_idf_svc::sys::EspError;

use log::*;
use mipidsi::{
    models::ST7735s,
    options::{ColorInversion, ColorOrder},
    Builder,
};
use pixel_canvas::{connect_with_progress, DeviceContext, DisplaySurface, RetryPolicy, PANEL_SIZE};

mod http;
mod secrets;
mod wifi;

use wifi::EspNetwork;

// === CUSTOM ERROR TYPE ===
// Bridges ESP-IDF errors into the embedded-hal 1.0 error traits mipidsi needs
// The EspError is kept so "Display init failed" logs the IDF code
#[derive(Debug)]
struct CustomError(EspError);

// Lets `?` convert driver errors inside the wrappers below
impl From<EspError> for CustomError {
    fn from(e: EspError) -> Self {
        CustomError(e)
    }
}

// SPI error kind: the IDF code does not map onto a specific kind
impl embedded_hal::spi::Error for CustomError {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        embedded_hal::spi::ErrorKind::Other // Details stay in the wrapped EspError
    }
}

// GPIO error kind for the DC pin
impl embedded_hal::digital::Error for CustomError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

// === SPI WRAPPER ===
// Exposes the ESP-IDF SPI device as an embedded-hal 1.0 SpiDevice
// The ST7735 only receives data, so writes carry all the traffic
struct SpiWrapper<'a> {
    spi: SpiDeviceDriver<'a, SpiDriver<'a>>, // Owns CS (GPIO5) through the IDF driver
}

// Error type reported to mipidsi
impl embedded_hal::spi::ErrorType for SpiWrapper<'_> {
    type Error = CustomError;
}

impl SpiDevice for SpiWrapper<'_> {
    // Runs every operation of one display transaction in order
    fn transaction(
        &mut self,
        operations: &mut [embedded_hal::spi::Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                // Commands, parameters and pixel data (cleared screen, cells, glyphs)
                embedded_hal::spi::Operation::Write(data) => {
                    if !data.is_empty() {
                        self.spi.write(data)?; // Empty writes are skipped, IDF rejects them
                    }
                }
                // Full duplex: clocks `write` out while filling `read`
                embedded_hal::spi::Operation::Transfer(read, write) => {
                    if !write.is_empty() {
                        self.spi.transfer(read, write)?;
                    }
                }
                // In-place transfer needs a copy of the outgoing bytes
                embedded_hal::spi::Operation::TransferInPlace(data) => {
                    if !data.is_empty() {
                        let outgoing = data.to_vec();
                        self.spi.transfer(data, &outgoing)?;
                    }
                }
                // Read and DelayNs: the panel is write-only and mipidsi
                // waits through its own delay source
                _ => {}
            }
        }
        Ok(())
    }
}

// === DC PIN WRAPPER ===
// Data/Command pin of the ST7735 (GPIO2)
// LOW while a command byte is on the bus, HIGH for parameters and pixels
struct DcPinWrapper<'a> {
    pin: PinDriver<'a, esp_idf_svc::hal::gpio::AnyOutputPin, esp_idf_svc::hal::gpio::Output>,
}

// Error type reported to mipidsi
impl embedded_hal::digital::ErrorType for DcPinWrapper<'_> {
    type Error = CustomError;
}

impl OutputPinTrait for DcPinWrapper<'_> {
    // Command mode (0V)
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(self.pin.set_low()?)
    }

    // Data mode (3.3V)
    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(self.pin.set_high()?)
    }
}

// === MAIN PROGRAM ===
fn main() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("=== Starting WiFi Pixel Canvas ===");

    // Load secrets (embedded at compile time)
    let secrets = secrets::load()?;
    info!("WiFi SSID: {}", secrets.wifi.ssid);

    let peripherals = Peripherals::take()?;

    // ==================== DISPLAY SETUP ====================
    info!("Setting up display...");

    // SPI pins (VSPI defaults)
    let sclk = peripherals.pins.gpio18;
    let mosi = peripherals.pins.gpio23;
    let cs = peripherals.pins.gpio5;

    // Control pins
    let dc = peripherals.pins.gpio2;
    let mut rst = PinDriver::output(peripherals.pins.gpio17)?;

    // Hardware reset: LOW -> wait -> HIGH -> wait
    rst.set_low()?;
    FreeRtos::delay_ms(50);
    rst.set_high()?;
    FreeRtos::delay_ms(200);

    // The ST7735 is specified up to 15 MHz write clock
    let spi_config = Config::new().baudrate(15.MHz().into());

    // No MISO, the panel never answers
    let spi_driver = SpiDriver::new(
        peripherals.spi2,
        sclk,
        mosi,
        None::<AnyIOPin>,
        &SpiDriverConfig::new(),
    )?;
    let spi_device = SpiDeviceDriver::new(spi_driver, Some(cs), &spi_config)?;

    let spi_wrapper = SpiWrapper { spi: spi_device };
    let dc_wrapper = DcPinWrapper {
        pin: PinDriver::output(dc.downgrade_output())?,
    };

    // Batch buffer: 128 pixels * 10 lines * 2 bytes/pixel (RGB565)
    static mut DISPLAY_BUFFER: [u8; 128 * 10 * 2] = [0u8; 128 * 10 * 2];

    let di = unsafe {
        mipidsi::interface::SpiInterface::new(
            spi_wrapper,
            dc_wrapper,
            &mut *addr_of_mut!(DISPLAY_BUFFER),
        )
    };

    // 1.44" green tab module: 128x128 window inside the 132x162 controller RAM
    let display = Builder::new(ST7735s, di)
        .display_size(PANEL_SIZE as u16, PANEL_SIZE as u16)
        .display_offset(2, 3)
        .color_order(ColorOrder::Bgr)
        .invert_colors(ColorInversion::Normal)
        .init(&mut FreeRtos)
        .map_err(|e| anyhow::anyhow!("Display init failed: {:?}", e))?;

    info!("Display initialized!");

    let mut ctx = DeviceContext::new(DisplaySurface::new(display));

    // ==================== WIFI SETUP ====================
    // Blocks until associated, a dot per 500 ms on the panel.
    let mut network = EspNetwork::new(peripherals.modem)?;
    connect_with_progress(
        &mut network,
        &secrets.wifi,
        &mut ctx.surface,
        &mut FreeRtos,
        &RetryPolicy::forever(),
    )?;

    // ==================== HTTP SERVER ====================
    let (requests, queue) = pixel_canvas::channel();
    let _server = http::start_server(secrets.server.http_port, requests)?;

    info!("=== System Ready! ===");

    // ==================== MAIN LOOP ====================
    // One request per iteration, handled to completion before the next.
    loop {
        queue.poll(&mut ctx)?;
    }
}
