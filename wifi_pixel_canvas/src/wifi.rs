use std::net::Ipv4Addr;

use esp_idf_svc::hal::{modem::Modem, peripheral::Peripheral};
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs::EspDefaultNvsPartition};
use log::*;
use pixel_canvas::{Network, WiFiConfig};

/// Station mode Wi-Fi driven by the retry loop of `pixel_canvas::join`.
pub struct EspNetwork {
    wifi: BlockingWifi<EspWifi<'static>>,
}

impl EspNetwork {
    pub fn new(modem: impl Peripheral<P = Modem> + 'static) -> anyhow::Result<Self> {
        info!("Initializing WiFi...");

        let sys_loop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;

        let wifi = BlockingWifi::wrap(EspWifi::new(modem, sys_loop.clone(), Some(nvs))?, sys_loop)?;
        Ok(Self { wifi })
    }
}

impl Network for EspNetwork {
    fn begin(&mut self, credentials: &WiFiConfig) -> anyhow::Result<()> {
        let wifi_config = Configuration::Client(ClientConfiguration {
            ssid: credentials
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| anyhow::anyhow!("SSID is longer than 32 bytes"))?,
            password: credentials
                .password
                .as_str()
                .try_into()
                .map_err(|_| anyhow::anyhow!("Password is longer than 64 bytes"))?,
            auth_method: if credentials.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        });

        self.wifi.set_configuration(&wifi_config)?;
        self.wifi.start()?;
        info!("WiFi started");

        // Non-blocking, the join loop polls for the result.
        self.wifi.wifi_mut().connect()?;
        Ok(())
    }

    fn poll_connected(&mut self) -> anyhow::Result<bool> {
        if self.wifi.is_up()? {
            return Ok(true);
        }
        if !self.wifi.is_connected()? {
            // Rejected or dropped association, ask again.
            self.wifi.wifi_mut().connect()?;
        }
        Ok(false)
    }

    fn local_address(&self) -> anyhow::Result<Ipv4Addr> {
        let ip_info = self.wifi.wifi().sta_netif().get_ip_info()?;
        Ok(Ipv4Addr::from(ip_info.ip.octets()))
    }
}
