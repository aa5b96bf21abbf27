//! The capability interface through which the abstraction layer
//! reaches the operating system.
//!
//! The protocol engine never touches sockets or driver queries
//! directly; everything goes through [`Platform`], injected at
//! construction. [`linux`] contains the raw `AF_PACKET` transmit
//! path for real deployments and [`testing`] an in-memory
//! implementation that records outbound frames so the whole engine
//! can be exercised hermetically.

use std::io;

use derive_builder::Builder;
use getset::Getters;

use crate::{
    consts::{media::MediaType, tlv::PowerState},
    tlv::{Ipv4Interface, Ipv6Interface, MediaSpecificInfo},
    types::MacAddr,
};

/// Static identity of the local device, reported in higher layer
/// responses and used as the WSC device description.
#[derive(Builder, Getters, Clone, Debug, Default, Eq, PartialEq)]
#[builder(pattern = "owned", default)]
pub struct DeviceIdentity {
    /// Friendly name of the device.
    #[getset(get = "pub")]
    friendly_name: String,
    /// Manufacturer name.
    #[getset(get = "pub")]
    manufacturer_name: String,
    /// Manufacturer model.
    #[getset(get = "pub")]
    manufacturer_model: String,
    /// URL of the device's management console, if any.
    #[getset(get = "pub")]
    control_url: String,
}

/// Everything the core needs to know about one local interface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterfaceInfo {
    /// OS name of the interface.
    pub name: String,
    /// Interface MAC address.
    pub mac: MacAddr,
    /// Media type of the interface.
    pub media_type: MediaType,
    /// Current power state.
    pub power_state: PowerState,
    /// Media specific information matching the media type.
    pub media_info: MediaSpecificInfo,
    /// SSID for Wi-Fi interfaces.
    pub ssid: Option<Vec<u8>>,
    /// MAC addresses of layer-2 neighbors seen on the interface.
    pub neighbor_macs: Vec<MacAddr>,
    /// True when the interface is already part of a secured network;
    /// such interfaces do not take part in push button configuration.
    pub is_secured: bool,
}

/// One 802.1 bridge and the interfaces enslaved to it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bridge {
    /// OS name of the bridge.
    pub name: String,
    /// Names of the bridged interfaces.
    pub interfaces: Vec<String>,
}

/// Raw counters and rates for one link, as the driver reports them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawLinkMetrics {
    /// Transmit packet errors.
    pub tx_packet_errors: u32,
    /// Packets transmitted without error.
    pub tx_packet_ok: u32,
    /// Transmit MAC throughput capacity in Mb/s.
    pub tx_max_throughput: u16,
    /// Transmit link availability in percent.
    pub tx_link_availability: u16,
    /// Transmit PHY rate in Mb/s.
    pub tx_phy_rate: u16,
    /// Receive packet errors.
    pub rx_packet_errors: u32,
    /// Packets received without error.
    pub rx_packet_ok: u32,
    /// RSSI in dB, receive side only.
    pub rx_rssi: u8,
}

/// Outcome of a power state change request as the platform reports
/// it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PowerOutcome {
    /// The state was changed as requested.
    Changed,
    /// The interface was already in the requested state (or the
    /// request could not be honored).
    NoChange,
    /// A different but related state was applied instead.
    Alternative,
}

/// The set of OS capabilities the abstraction layer consumes.
pub trait Platform: Send + Sync {
    /// Names of the interfaces the AL should manage.
    fn interfaces(&self) -> Vec<String>;

    /// Everything about one interface, or `None` when it vanished.
    fn interface_info(&self, name: &str) -> Option<InterfaceInfo>;

    /// Driver metrics for the link between a local interface and a
    /// neighbor interface.
    fn link_metrics(&self, interface: &str, neighbor: MacAddr) -> Option<RawLinkMetrics>;

    /// The 802.1 bridges configured on this device.
    fn bridges(&self) -> Vec<Bridge>;

    /// IPv4 addresses per interface.
    fn ipv4_addresses(&self) -> Vec<Ipv4Interface>;

    /// IPv6 addresses per interface.
    fn ipv6_addresses(&self) -> Vec<Ipv6Interface>;

    /// Static device identity.
    fn device_identity(&self) -> DeviceIdentity;

    /// Request a power state change for an interface.
    fn set_power_state(&self, interface: &str, state: PowerState) -> io::Result<PowerOutcome>;

    /// Transmit one raw Ethernet frame.
    fn send_raw_packet(
        &self,
        interface: &str,
        dst: MacAddr,
        src: MacAddr,
        ethertype: u16,
        payload: &[u8],
    ) -> io::Result<()>;

    /// Kick off push button configuration on an interface. Completion
    /// is signalled asynchronously through the normal receive path.
    fn start_push_button_configuration(&self, interface: &str) -> io::Result<()>;
}

/// Raw `AF_PACKET` transmit path for Linux deployments.
#[cfg(target_os = "linux")]
pub mod linux {
    use std::{io, mem::zeroed};

    use libc::{c_void, sockaddr_ll, AF_PACKET, ETH_ALEN, SOCK_RAW};

    use crate::{consts::ETHERNET_HEADER_SIZE, types::MacAddr};

    /// A raw packet socket bound to no particular interface; the
    /// interface is chosen per send via `sockaddr_ll`.
    pub struct RawSocket {
        fd: libc::c_int,
    }

    impl RawSocket {
        /// Wrapper around the `socket()` syscall filling in the
        /// packet-socket specific information.
        pub fn new() -> Result<Self, io::Error> {
            let fd = match unsafe {
                libc::socket(AF_PACKET, SOCK_RAW | libc::SOCK_CLOEXEC, 0)
            } {
                i if i >= 0 => Ok(i),
                _ => Err(io::Error::last_os_error()),
            }?;
            Ok(RawSocket { fd })
        }

        /// Resolve an interface name to its index.
        pub fn interface_index(name: &str) -> Result<u32, io::Error> {
            let name = std::ffi::CString::new(name)
                .map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
            match unsafe { libc::if_nametoindex(name.as_ptr()) } {
                0 => Err(io::Error::last_os_error()),
                index => Ok(index),
            }
        }

        /// Build the Ethernet header and transmit one frame on the
        /// named interface.
        pub fn send(
            &self,
            interface: &str,
            dst: MacAddr,
            src: MacAddr,
            ethertype: u16,
            payload: &[u8],
        ) -> Result<(), io::Error> {
            let index = Self::interface_index(interface)?;

            let mut frame = Vec::with_capacity(ETHERNET_HEADER_SIZE + payload.len());
            frame.extend_from_slice(&dst.octets());
            frame.extend_from_slice(&src.octets());
            frame.extend_from_slice(&ethertype.to_be_bytes());
            frame.extend_from_slice(payload);

            let mut addr = unsafe { zeroed::<sockaddr_ll>() };
            addr.sll_family = AF_PACKET as u16;
            addr.sll_protocol = ethertype.to_be();
            addr.sll_ifindex = index as i32;
            addr.sll_halen = ETH_ALEN as u8;
            addr.sll_addr[..6].copy_from_slice(&dst.octets());

            match unsafe {
                libc::sendto(
                    self.fd,
                    frame.as_ptr() as *const c_void,
                    frame.len(),
                    0,
                    &addr as *const sockaddr_ll as *const libc::sockaddr,
                    std::mem::size_of::<sockaddr_ll>() as libc::socklen_t,
                )
            } {
                i if i >= 0 => Ok(()),
                _ => Err(io::Error::last_os_error()),
            }
        }
    }

    impl Drop for RawSocket {
        fn drop(&mut self) {
            unsafe { libc::close(self.fd) };
        }
    }
}

/// In-memory platform used to drive the engine in tests.
pub mod testing {
    use super::*;

    use std::collections::HashMap;

    use parking_lot::Mutex;

    /// One frame captured by [`FakePlatform::send_raw_packet`].
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct SentFrame {
        /// Interface the frame went out on.
        pub interface: String,
        /// Destination MAC.
        pub dst: MacAddr,
        /// Source MAC.
        pub src: MacAddr,
        /// EtherType of the frame.
        pub ethertype: u16,
        /// Frame payload after the Ethernet header.
        pub payload: Vec<u8>,
    }

    /// A scripted, in-memory [`Platform`].
    #[derive(Default)]
    pub struct FakePlatform {
        /// Interfaces the fake reports, in order.
        pub interface_list: Vec<InterfaceInfo>,
        /// Link metrics per (interface name, neighbor MAC).
        pub metrics: HashMap<(String, MacAddr), RawLinkMetrics>,
        /// Bridges the fake reports.
        pub bridge_list: Vec<Bridge>,
        /// IPv4 addresses the fake reports.
        pub ipv4: Vec<Ipv4Interface>,
        /// IPv6 addresses the fake reports.
        pub ipv6: Vec<Ipv6Interface>,
        /// Device identity the fake reports.
        pub identity: DeviceIdentity,
        /// What `set_power_state` should answer.
        pub power_outcome: Option<PowerOutcome>,
        sent: Mutex<Vec<SentFrame>>,
        push_button_started: Mutex<Vec<String>>,
    }

    impl FakePlatform {
        /// A fake with no interfaces; tests fill in what they need.
        pub fn new() -> Self {
            FakePlatform {
                power_outcome: Some(PowerOutcome::Changed),
                ..FakePlatform::default()
            }
        }

        /// Add an Ethernet-like interface with the given name and
        /// MAC.
        pub fn add_ethernet_interface(&mut self, name: &str, mac: MacAddr) {
            self.interface_list.push(InterfaceInfo {
                name: name.to_string(),
                mac,
                media_type: MediaType::Ieee8023abGigabitEthernet,
                power_state: PowerState::On,
                media_info: MediaSpecificInfo::None,
                ssid: None,
                neighbor_macs: Vec::new(),
                is_secured: true,
            });
        }

        /// Frames sent so far.
        pub fn sent_frames(&self) -> Vec<SentFrame> {
            self.sent.lock().clone()
        }

        /// Drop all recorded frames.
        pub fn clear_sent(&self) {
            self.sent.lock().clear();
        }

        /// Interfaces on which push button configuration was started.
        pub fn push_button_interfaces(&self) -> Vec<String> {
            self.push_button_started.lock().clone()
        }
    }

    impl Platform for FakePlatform {
        fn interfaces(&self) -> Vec<String> {
            self.interface_list
                .iter()
                .map(|iface| iface.name.clone())
                .collect()
        }

        fn interface_info(&self, name: &str) -> Option<InterfaceInfo> {
            self.interface_list
                .iter()
                .find(|iface| iface.name == name)
                .cloned()
        }

        fn link_metrics(&self, interface: &str, neighbor: MacAddr) -> Option<RawLinkMetrics> {
            self.metrics
                .get(&(interface.to_string(), neighbor))
                .cloned()
        }

        fn bridges(&self) -> Vec<Bridge> {
            self.bridge_list.clone()
        }

        fn ipv4_addresses(&self) -> Vec<Ipv4Interface> {
            self.ipv4.clone()
        }

        fn ipv6_addresses(&self) -> Vec<Ipv6Interface> {
            self.ipv6.clone()
        }

        fn device_identity(&self) -> DeviceIdentity {
            self.identity.clone()
        }

        fn set_power_state(
            &self,
            _interface: &str,
            _state: PowerState,
        ) -> io::Result<PowerOutcome> {
            self.power_outcome
                .ok_or_else(|| io::Error::from(io::ErrorKind::Unsupported))
        }

        fn send_raw_packet(
            &self,
            interface: &str,
            dst: MacAddr,
            src: MacAddr,
            ethertype: u16,
            payload: &[u8],
        ) -> io::Result<()> {
            self.sent.lock().push(SentFrame {
                interface: interface.to_string(),
                dst,
                src,
                ethertype,
                payload: payload.to_vec(),
            });
            Ok(())
        }

        fn start_push_button_configuration(&self, interface: &str) -> io::Result<()> {
            self.push_button_started.lock().push(interface.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::{testing::FakePlatform, *};

    #[test]
    fn test_fake_platform_records_frames() {
        let mut platform = FakePlatform::new();
        platform.add_ethernet_interface("eth0", MacAddr([1, 1, 1, 1, 1, 1]));
        platform
            .send_raw_packet(
                "eth0",
                MacAddr([2, 2, 2, 2, 2, 2]),
                MacAddr([1, 1, 1, 1, 1, 1]),
                0x893a,
                &[0xde, 0xad],
            )
            .unwrap();
        let sent = platform.sent_frames();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].ethertype, 0x893a);
        assert_eq!(sent[0].payload, vec![0xde, 0xad]);
    }

    #[test]
    fn test_identity_builder() {
        let identity = DeviceIdentityBuilder::default()
            .friendly_name("kitchen".to_string())
            .manufacturer_name("acme".to_string())
            .build()
            .unwrap();
        assert_eq!(identity.friendly_name(), "kitchen");
        assert_eq!(identity.manufacturer_model(), "");
    }
}
