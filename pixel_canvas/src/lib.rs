//! Hardware independent core of the Wi-Fi pixel canvas firmware.
//!
//! A browser on the local network can print a line of text on a 128x128 TFT
//! or paint a 16x16 grid of 8x8 blocks through the control page. Everything
//! here runs against `embedded-graphics` draw targets and a small [`Network`]
//! trait, so it is tested on the host; the ESP32 binary only wires in the
//! real display, Wi-Fi driver and HTTP server.

pub mod bootstrap;
pub mod config;
pub mod form;
pub mod grid;
pub mod page;
pub mod router;
pub mod server;
pub mod surface;

pub use bootstrap::{connect_with_progress, join, Network, RetryPolicy};
pub use config::{Secrets, ServerConfig, WiFiConfig};
pub use form::{read_body, Form, MAX_BODY_LEN};
pub use grid::{field_name, ColorSelection, GridCell, CELL_SIZE, GRID_SIZE};
pub use page::control_page;
pub use router::{dispatch, DeviceContext, Method, Request, Response, Route};
pub use server::{channel, RequestQueue, RequestSender};
pub use surface::{DisplaySurface, TextSize};

/// Width and height of the panel in pixels.
pub const PANEL_SIZE: u32 = GRID_SIZE as u32 * CELL_SIZE;

#[cfg(test)]
pub(crate) mod test_support {
    use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
    use embedded_graphics_framebuf::FrameBuf;

    use crate::surface::BACKGROUND;

    pub const PANEL_SIZE: usize = crate::PANEL_SIZE as usize;
    pub const PANEL_PIXELS: usize = PANEL_SIZE * PANEL_SIZE;

    pub type Canvas<'a> = FrameBuf<Rgb565, &'a mut [Rgb565; PANEL_PIXELS]>;

    /// A 128x128 in-memory panel backed by `data`.
    pub fn canvas(data: &mut [Rgb565; PANEL_PIXELS]) -> Canvas<'_> {
        FrameBuf::new(data, PANEL_SIZE, PANEL_SIZE)
    }

    pub fn pixel(fb: &Canvas<'_>, x: i32, y: i32) -> Rgb565 {
        fb.get_color_at(Point::new(x, y))
    }

    pub fn count(fb: &Canvas<'_>, color: Rgb565) -> usize {
        (0..PANEL_SIZE as i32)
            .flat_map(|y| (0..PANEL_SIZE as i32).map(move |x| (x, y)))
            .filter(|&(x, y)| pixel(fb, x, y) == color)
            .count()
    }

    pub fn is_blank(fb: &Canvas<'_>) -> bool {
        count(fb, BACKGROUND) == PANEL_PIXELS
    }
}
