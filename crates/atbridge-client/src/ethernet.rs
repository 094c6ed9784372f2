use atbridge_frame::Command;
use atbridge_transport::Link;

use crate::client::BridgeClient;
use crate::error::OpResult;
use crate::types::{IpConfig, MacAddress};

/// Ethernet interface (W5500) commands.
pub struct Ethernet<'a, L: Link> {
    client: &'a mut BridgeClient<L>,
}

impl<'a, L: Link> Ethernet<'a, L> {
    pub(crate) fn new(client: &'a mut BridgeClient<L>) -> Self {
        Self { client }
    }

    /// Bring the interface up, with DHCP when `config` is `None`.
    pub fn init(&mut self, config: Option<IpConfig>) -> OpResult<()> {
        match config {
            Some(config) => self.client.call(Command::EthInit, &config.to_wire(), None)?,
            None => self.client.call(Command::EthInit, &[], None)?,
        };
        Ok(())
    }

    /// Whether `init` has succeeded since boot.
    pub fn status(&mut self) -> OpResult<bool> {
        self.client.call(Command::EthStatus, &[], None)?.flag()
    }

    /// Whether the PHY reports a cable link.
    pub fn link_status(&mut self) -> OpResult<bool> {
        self.client.call(Command::EthLinkStatus, &[], None)?.flag()
    }

    pub fn mac(&mut self) -> OpResult<MacAddress> {
        let mut resp = self.client.call(Command::EthGetMac, &[], None)?;
        Ok(MacAddress(resp.array::<6>()?))
    }

    pub fn set_mac(&mut self, mac: MacAddress) -> OpResult<()> {
        self.client.call(Command::EthSetMac, &mac.octets(), None)?;
        Ok(())
    }

    pub fn ip_config(&mut self) -> OpResult<IpConfig> {
        let mut resp = self.client.call(Command::EthGetIp, &[], None)?;
        resp.require(IpConfig::WIRE_SIZE)?;
        Ok(IpConfig {
            ip: resp.ipv4()?,
            gateway: resp.ipv4()?,
            subnet: resp.ipv4()?,
            dns: resp.ipv4()?,
        })
    }

    pub fn set_ip_config(&mut self, config: IpConfig) -> OpResult<()> {
        self.client.call(Command::EthSetIp, &config.to_wire(), None)?;
        Ok(())
    }
}
