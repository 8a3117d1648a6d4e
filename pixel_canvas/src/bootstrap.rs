// ===============================================================================
// NETWORK BOOTSTRAP
// ===============================================================================
// Joins the configured Wi-Fi network before the HTTP server starts. The panel
// shows "Connecting to <ssid>" and one dot per retry, then the address.
// ===============================================================================

use core::fmt::Debug;
use core::time::Duration;
use std::net::Ipv4Addr;

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use embedded_hal::delay::DelayNs;
use log::*;

use crate::config::WiFiConfig;
use crate::surface::{DisplaySurface, TextSize};

/// Station side of a Wi-Fi driver.
pub trait Network {
    /// Configures the credentials and starts associating.
    fn begin(&mut self, credentials: &WiFiConfig) -> anyhow::Result<()>;

    /// `true` once associated and an address is assigned.
    fn poll_connected(&mut self) -> anyhow::Result<bool>;

    fn local_address(&self) -> anyhow::Result<Ipv4Addr>;
}

/// How long to wait between polls and when to give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

    /// Polls every 500 ms until connected. Wrong credentials never return.
    pub const fn forever() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            max_attempts: None,
        }
    }

    pub const fn bounded(max_attempts: u32) -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            max_attempts: Some(max_attempts),
        }
    }

    fn interval_ms(&self) -> u32 {
        u32::try_from(self.interval.as_millis()).unwrap_or(u32::MAX)
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::forever()
    }
}

/// Starts the network and blocks until it is up, printing a `.` on the
/// panel for every poll that finds it still down.
pub fn join<N, D, T>(
    network: &mut N,
    credentials: &WiFiConfig,
    surface: &mut DisplaySurface<D>,
    delay: &mut T,
    policy: &RetryPolicy,
) -> anyhow::Result<Ipv4Addr>
where
    N: Network,
    D: DrawTarget<Color = Rgb565>,
    D::Error: Debug,
    T: DelayNs,
{
    network.begin(credentials)?;

    let mut attempts: u32 = 0;
    loop {
        match network.poll_connected() {
            Ok(true) => break,
            Ok(false) => {}
            // Driver errors while associating look the same as "not yet".
            Err(e) => debug!("WiFi not up yet: {:?}", e),
        }

        attempts = attempts.saturating_add(1);
        debug!("Waiting for WiFi, attempt {}", attempts);
        surface.print(".");
        delay.delay_ms(policy.interval_ms());

        if policy.exhausted(attempts) {
            anyhow::bail!(
                "WiFi '{}' not connected after {} attempts",
                credentials.ssid,
                attempts
            );
        }
    }

    let address = network.local_address()?;
    info!("WiFi connected, IP address: {}", address);
    Ok(address)
}

/// The startup screen: announces the network, joins it and shows the address.
pub fn connect_with_progress<N, D, T>(
    network: &mut N,
    credentials: &WiFiConfig,
    surface: &mut DisplaySurface<D>,
    delay: &mut T,
    policy: &RetryPolicy,
) -> anyhow::Result<Ipv4Addr>
where
    N: Network,
    D: DrawTarget<Color = Rgb565>,
    D::Error: Debug,
    T: DelayNs,
{
    info!("Connecting to {}", credentials.ssid);
    surface.clear();
    surface.println("Connecting to ");
    surface.set_text_color(Rgb565::BLUE);
    surface.set_text_size(TextSize::Large);
    surface.println(&credentials.ssid);

    let address = join(network, credentials, surface, delay, policy)?;

    surface.clear();
    surface.println("Connected!");
    surface.set_text_color(Rgb565::BLUE);
    surface.set_text_size(TextSize::Large);
    surface.println(&address.to_string());

    Ok(address)
}
