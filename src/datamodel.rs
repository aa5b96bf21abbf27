//! The topology database.
//!
//! One logical table keyed by AL MAC address holds everything the AL
//! knows about every device in the network, the local one included.
//! Updates are idempotent: a fresh topology response replaces the
//! previous view of that device wholesale, so applying the same
//! response twice leaves the database unchanged.
//!
//! # Ownership
//!
//! The database owns the TLVs it stores. On the receive path the
//! dispatcher moves TLVs out of the parsed CMDU into
//! [`TopologyUpdate`]/[`HigherLayerUpdate`] and hands them over; the
//! CMDU wrapper is dropped separately. Neighbor links are owned by
//! the local interface that observed them and disappear with it.
//!
//! The database itself is plain data; [`crate::al::AlContext`] wraps
//! it in the single mutex the concurrency model requires.

use std::{
    collections::HashMap,
    fmt::Write as _,
    time::{Duration, Instant},
};

use log::debug;

use crate::{
    consts::{
        tlv::{FreqBand, Services},
        wsc::{WscAuthType, WscEncrType},
    },
    tlv::{
        ControlUrl, DeviceBridgingCapability, DeviceIdentification, DeviceInformation,
        GenericPhyDeviceInformation, Ipv4, Ipv6, L2NeighborDevice, NeighborDeviceList,
        Non1905NeighborDeviceList, PowerOffInterface, ProfileVersion, ReceiverLinkMetric,
        SupportedService, TransmitterLinkMetric,
    },
    types::MacAddr,
};

/// A neighbor's data is considered stale once no topology response
/// has arrived for this long.
pub const DEVICE_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Which kind of discovery frame refreshed a link.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DiscoverySource {
    /// A 1905 topology discovery CMDU.
    TopologyDiscovery,
    /// An LLDP bridge discovery frame.
    BridgeDiscovery,
}

/// Outcome of a discovery timestamp update.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DiscoveryUpdate {
    /// The link was not in the database before.
    NewLink,
    /// The link existed; `elapsed` is the time since the previous
    /// stamp from the same source, if there was one.
    Refreshed {
        /// Time since the previous stamp of the same source.
        elapsed: Option<Duration>,
    },
}

/// A directed link from a local interface to a neighbor interface,
/// with per-source freshness stamps.
#[derive(Clone, Debug)]
pub struct NeighborLink {
    /// The local interface observing the neighbor.
    pub local_interface: MacAddr,
    /// AL MAC of the neighbor, when it is a 1905 node.
    pub neighbor_al: MacAddr,
    /// The neighbor's transmitting interface.
    pub neighbor_interface: MacAddr,
    /// Last time a topology discovery was received over this link.
    pub last_topology_discovery: Option<Instant>,
    /// Last time a bridge discovery was received over this link.
    pub last_bridge_discovery: Option<Instant>,
}

/// Per-neighbor link metric records, replaced wholesale when a newer
/// metric TLV arrives.
#[derive(Clone, Debug, Default)]
pub struct NeighborMetrics {
    /// AL MAC the metrics refer to.
    pub neighbor_al: MacAddr,
    /// Latest transmitter metrics.
    pub tx: Option<TransmitterLinkMetric>,
    /// Latest receiver metrics.
    pub rx: Option<ReceiverLinkMetric>,
}

/// Everything known about one 1905 device.
#[derive(Clone, Debug, Default)]
pub struct NetworkDevice {
    /// AL MAC identifying the device; immutable for the lifetime of
    /// the entry.
    pub al_mac: MacAddr,
    /// Device information from the last topology response.
    pub device_info: Option<DeviceInformation>,
    /// Bridging capability TLVs.
    pub bridging: Vec<DeviceBridgingCapability>,
    /// Non-1905 neighbor TLVs.
    pub non1905_neighbors: Vec<Non1905NeighborDeviceList>,
    /// 1905 neighbor TLVs.
    pub neighbors: Vec<NeighborDeviceList>,
    /// Power off interface TLVs.
    pub power_off: Vec<PowerOffInterface>,
    /// L2 neighbor TLVs.
    pub l2_neighbors: Vec<L2NeighborDevice>,
    /// Supported service TLV, when the device speaks EasyMesh.
    pub supported_service: Option<SupportedService>,
    /// Generic PHY details for interfaces of unknown media type.
    pub generic_phy: Option<GenericPhyDeviceInformation>,
    /// 1905 profile version from the higher layer response.
    pub profile: Option<ProfileVersion>,
    /// Device identification from the higher layer response.
    pub identification: Option<DeviceIdentification>,
    /// Control URL from the higher layer response.
    pub control_url: Option<ControlUrl>,
    /// IPv4 addresses from the higher layer response.
    pub ipv4: Option<Ipv4>,
    /// IPv6 addresses from the higher layer response.
    pub ipv6: Option<Ipv6>,
    /// Per-neighbor link metrics.
    pub metrics: Vec<NeighborMetrics>,
    /// When the last topology response from this device was applied.
    pub last_topology_response: Option<Instant>,
}

impl NetworkDevice {
    /// EasyMesh services the device advertises.
    pub fn services(&self) -> Services {
        self.supported_service
            .as_ref()
            .map(|tlv| Services::from_list(&tlv.services))
            .unwrap_or_default()
    }
}

/// One configured BSS of a local radio.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bss {
    /// BSSID of the BSS.
    pub bssid: MacAddr,
    /// SSID, 1 to 32 octets.
    pub ssid: Vec<u8>,
    /// Authentication modes of the credential.
    pub auth: WscAuthType,
    /// Encryption modes of the credential.
    pub encr: WscEncrType,
    /// The network key.
    pub network_key: Vec<u8>,
}

/// One local radio of the Multi-AP inventory.
#[derive(Clone, Debug)]
pub struct Radio {
    /// Radio unique identifier.
    pub uid: MacAddr,
    /// Maximum number of BSSes the radio can run.
    pub max_bss: u8,
    /// Frequency bands the radio supports.
    pub bands: Vec<FreqBand>,
    /// BSSes currently configured on the radio.
    pub bsses: Vec<Bss>,
}

impl Radio {
    /// True while no BSS has been configured.
    pub fn is_unconfigured(&self) -> bool {
        self.bsses.is_empty()
    }
}

/// The set of TLVs a topology response contributes, moved out of the
/// CMDU and into database ownership.
#[derive(Clone, Debug, Default)]
pub struct TopologyUpdate {
    /// The mandatory device information TLV.
    pub device_info: Option<DeviceInformation>,
    /// Bridging capability TLVs.
    pub bridging: Vec<DeviceBridgingCapability>,
    /// Non-1905 neighbor TLVs.
    pub non1905_neighbors: Vec<Non1905NeighborDeviceList>,
    /// 1905 neighbor TLVs.
    pub neighbors: Vec<NeighborDeviceList>,
    /// Power off interface TLVs.
    pub power_off: Vec<PowerOffInterface>,
    /// L2 neighbor TLVs.
    pub l2_neighbors: Vec<L2NeighborDevice>,
    /// Supported service TLV.
    pub supported_service: Option<SupportedService>,
}

/// The set of TLVs a higher layer response contributes.
#[derive(Clone, Debug, Default)]
pub struct HigherLayerUpdate {
    /// 1905 profile version.
    pub profile: Option<ProfileVersion>,
    /// Device identification.
    pub identification: Option<DeviceIdentification>,
    /// Control URL.
    pub control_url: Option<ControlUrl>,
    /// IPv4 addresses.
    pub ipv4: Option<Ipv4>,
    /// IPv6 addresses.
    pub ipv6: Option<Ipv6>,
}

/// The topology database.
pub struct TopologyDatabase {
    local_al_mac: MacAddr,
    map_whole_network: bool,
    devices: HashMap<MacAddr, NetworkDevice>,
    links: Vec<NeighborLink>,
    radios: Vec<Radio>,
}

impl TopologyDatabase {
    /// Create a database for the given local AL MAC.
    pub fn new(local_al_mac: MacAddr, map_whole_network: bool) -> Self {
        TopologyDatabase {
            local_al_mac,
            map_whole_network,
            devices: HashMap::new(),
            links: Vec::new(),
            radios: Vec::new(),
        }
    }

    /// The local AL MAC address.
    pub fn local_al_mac(&self) -> MacAddr {
        self.local_al_mac
    }

    /// Whether neighbor's-neighbor queries are enabled.
    pub fn map_whole_network(&self) -> bool {
        self.map_whole_network
    }

    /// Look up a device entry.
    pub fn device(&self, al_mac: MacAddr) -> Option<&NetworkDevice> {
        self.devices.get(&al_mac)
    }

    /// Number of devices currently tracked.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// All known neighbor links.
    pub fn links(&self) -> &[NeighborLink] {
        &self.links
    }

    /// Update the freshness stamp of the (receiving interface,
    /// neighbor AL, neighbor interface) link.
    ///
    /// Stamps are monotonic: an update can only move them forward.
    pub fn update_discovery_timestamp(
        &mut self,
        local_interface: MacAddr,
        neighbor_al: MacAddr,
        neighbor_interface: MacAddr,
        source: DiscoverySource,
        now: Instant,
    ) -> DiscoveryUpdate {
        let link = self.links.iter_mut().find(|link| {
            link.local_interface == local_interface
                && link.neighbor_interface == neighbor_interface
        });
        match link {
            Some(link) => {
                link.neighbor_al = neighbor_al;
                let stamp = match source {
                    DiscoverySource::TopologyDiscovery => &mut link.last_topology_discovery,
                    DiscoverySource::BridgeDiscovery => &mut link.last_bridge_discovery,
                };
                let elapsed = stamp.map(|previous| now.saturating_duration_since(previous));
                if stamp.map_or(true, |previous| previous <= now) {
                    *stamp = Some(now);
                }
                DiscoveryUpdate::Refreshed { elapsed }
            }
            None => {
                let mut link = NeighborLink {
                    local_interface,
                    neighbor_al,
                    neighbor_interface,
                    last_topology_discovery: None,
                    last_bridge_discovery: None,
                };
                match source {
                    DiscoverySource::TopologyDiscovery => {
                        link.last_topology_discovery = Some(now)
                    }
                    DiscoverySource::BridgeDiscovery => link.last_bridge_discovery = Some(now),
                }
                self.links.push(link);
                DiscoveryUpdate::NewLink
            }
        }
    }

    /// True when no topology response from this device has been
    /// applied within [`DEVICE_REFRESH_INTERVAL`].
    pub fn device_needs_refresh(&self, al_mac: MacAddr, now: Instant) -> bool {
        match self.devices.get(&al_mac) {
            Some(device) => match device.last_topology_response {
                Some(applied) => now.saturating_duration_since(applied) >= DEVICE_REFRESH_INTERVAL,
                None => true,
            },
            None => true,
        }
    }

    /// Replace a device's topology view with a fresh one. The entry
    /// is created on first contact; the AL MAC never changes.
    pub fn update_network_device_info(
        &mut self,
        al_mac: MacAddr,
        update: TopologyUpdate,
        now: Instant,
    ) {
        let device = self
            .devices
            .entry(al_mac)
            .or_insert_with(|| NetworkDevice {
                al_mac,
                ..NetworkDevice::default()
            });
        device.device_info = update.device_info;
        device.bridging = update.bridging;
        device.non1905_neighbors = update.non1905_neighbors;
        device.neighbors = update.neighbors;
        device.power_off = update.power_off;
        device.l2_neighbors = update.l2_neighbors;
        device.supported_service = update.supported_service;
        device.last_topology_response = Some(now);
        self.gc();
    }

    /// Merge a higher layer response into a device entry.
    pub fn update_higher_layer_info(&mut self, al_mac: MacAddr, update: HigherLayerUpdate) {
        let device = self
            .devices
            .entry(al_mac)
            .or_insert_with(|| NetworkDevice {
                al_mac,
                ..NetworkDevice::default()
            });
        device.profile = update.profile;
        device.identification = update.identification;
        device.control_url = update.control_url;
        device.ipv4 = update.ipv4;
        device.ipv6 = update.ipv6;
    }

    /// Store a generic PHY response.
    pub fn update_generic_phy_info(
        &mut self,
        al_mac: MacAddr,
        generic_phy: GenericPhyDeviceInformation,
    ) {
        let device = self
            .devices
            .entry(al_mac)
            .or_insert_with(|| NetworkDevice {
                al_mac,
                ..NetworkDevice::default()
            });
        device.generic_phy = Some(generic_phy);
    }

    /// Replace the transmitter metrics record the TLV describes.
    pub fn update_tx_metrics(&mut self, tlv: TransmitterLinkMetric) {
        let device = self
            .devices
            .entry(tlv.local_al)
            .or_insert_with(|| NetworkDevice {
                al_mac: tlv.local_al,
                ..NetworkDevice::default()
            });
        let slot = metrics_slot(&mut device.metrics, tlv.neighbor_al);
        slot.tx = Some(tlv);
    }

    /// Replace the receiver metrics record the TLV describes.
    pub fn update_rx_metrics(&mut self, tlv: ReceiverLinkMetric) {
        let device = self
            .devices
            .entry(tlv.local_al)
            .or_insert_with(|| NetworkDevice {
                al_mac: tlv.local_al,
                ..NetworkDevice::default()
            });
        let slot = metrics_slot(&mut device.metrics, tlv.neighbor_al);
        slot.rx = Some(tlv);
    }

    /// Map a neighbor interface MAC to the AL MAC that owns it, if
    /// known from links or stored device information.
    pub fn mac_to_al_mac(&self, mac: MacAddr) -> Option<MacAddr> {
        if mac == self.local_al_mac {
            return Some(mac);
        }
        if let Some(link) = self
            .links
            .iter()
            .find(|link| link.neighbor_interface == mac || link.neighbor_al == mac)
        {
            return Some(link.neighbor_al);
        }
        self.devices.values().find_map(|device| {
            let info = device.device_info.as_ref()?;
            (info.al_mac == mac || info.interfaces.iter().any(|iface| iface.mac == mac))
                .then_some(device.al_mac)
        })
    }

    /// AL MACs of all direct 1905 neighbors, deduplicated.
    pub fn neighbor_al_macs(&self) -> Vec<MacAddr> {
        let mut macs: Vec<MacAddr> = Vec::new();
        for link in &self.links {
            if !link.neighbor_al.is_zero() && !macs.contains(&link.neighbor_al) {
                macs.push(link.neighbor_al);
            }
        }
        macs
    }

    /// Every (local interface, neighbor interface) pair joining this
    /// node to the given neighbor.
    pub fn links_with_neighbor(&self, neighbor_al: MacAddr) -> Vec<(MacAddr, MacAddr)> {
        self.links
            .iter()
            .filter(|link| link.neighbor_al == neighbor_al)
            .map(|link| (link.local_interface, link.neighbor_interface))
            .collect()
    }

    /// A link is considered bridged when topology discoveries arrive
    /// but LLDP bridge discoveries do not; 802.1 bridges absorb the
    /// nearest-bridge multicast.
    pub fn is_link_bridged(&self, local_interface: MacAddr, neighbor_interface: MacAddr) -> bool {
        self.links
            .iter()
            .find(|link| {
                link.local_interface == local_interface
                    && link.neighbor_interface == neighbor_interface
            })
            .map(|link| link.last_bridge_discovery.is_none())
            .unwrap_or(false)
    }

    /// Drop all links owned by a local interface that disappeared,
    /// then collect garbage.
    pub fn remove_local_interface(&mut self, local_interface: MacAddr) {
        self.links
            .retain(|link| link.local_interface != local_interface);
        self.gc();
    }

    /// Purge device entries that are no longer reachable: not the
    /// local device, not pointed at by any link, and not listed in
    /// any stored neighbor TLV.
    fn gc(&mut self) {
        let local = self.local_al_mac;
        let links = &self.links;
        let referenced: Vec<MacAddr> = self
            .devices
            .values()
            .flat_map(|device| {
                device
                    .neighbors
                    .iter()
                    .flat_map(|tlv| tlv.neighbors.iter().map(|n| n.mac))
            })
            .collect();
        let before = self.devices.len();
        self.devices.retain(|al_mac, _| {
            *al_mac == local
                || links.iter().any(|link| link.neighbor_al == *al_mac)
                || referenced.contains(al_mac)
        });
        let removed = before - self.devices.len();
        if removed > 0 {
            debug!("garbage collected {removed} unreachable device entries");
        }
    }

    /// Add or replace a local radio.
    pub fn upsert_radio(&mut self, radio: Radio) {
        match self.radios.iter_mut().find(|r| r.uid == radio.uid) {
            Some(existing) => *existing = radio,
            None => self.radios.push(radio),
        }
    }

    /// The local radio inventory.
    pub fn radios(&self) -> &[Radio] {
        &self.radios
    }

    /// Mutable access to one radio.
    pub fn radio_mut(&mut self, uid: MacAddr) -> Option<&mut Radio> {
        self.radios.iter_mut().find(|radio| radio.uid == uid)
    }

    /// Install a BSS on a radio, replacing any existing BSS with the
    /// same BSSID.
    pub fn install_bss(&mut self, radio_uid: MacAddr, bss: Bss) -> bool {
        match self.radio_mut(radio_uid) {
            Some(radio) => {
                match radio.bsses.iter_mut().find(|b| b.bssid == bss.bssid) {
                    Some(existing) => *existing = bss,
                    None => radio.bsses.push(bss),
                }
                true
            }
            None => false,
        }
    }

    /// Render a text snapshot of the whole database. The caller holds
    /// the database lock for the duration, so the view is consistent.
    pub fn dump(&self, now: Instant) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "local AL: {}", self.local_al_mac);
        let mut al_macs: Vec<&MacAddr> = self.devices.keys().collect();
        al_macs.sort();
        for al_mac in al_macs {
            let device = &self.devices[al_mac];
            let _ = writeln!(out, "device {al_mac}");
            if let Some(info) = &device.device_info {
                for iface in &info.interfaces {
                    let _ = writeln!(
                        out,
                        "  interface {} media {:?}",
                        iface.mac, iface.media_type
                    );
                }
            }
            if let Some(identification) = &device.identification {
                let _ = writeln!(
                    out,
                    "  identity \"{}\" ({} {})",
                    identification.friendly_name,
                    identification.manufacturer_name,
                    identification.manufacturer_model
                );
            }
            let services = device.services();
            if !services.is_empty() {
                let _ = writeln!(out, "  services {services:?}");
            }
            for metrics in &device.metrics {
                let _ = writeln!(
                    out,
                    "  metrics to {} tx:{} rx:{}",
                    metrics.neighbor_al,
                    metrics.tx.is_some(),
                    metrics.rx.is_some()
                );
            }
        }
        for link in &self.links {
            let age = |stamp: Option<Instant>| match stamp {
                Some(stamp) => format!("{}s", now.saturating_duration_since(stamp).as_secs()),
                None => "-".to_string(),
            };
            let _ = writeln!(
                out,
                "link {} -> {} ({}) td {} bd {}",
                link.local_interface,
                link.neighbor_interface,
                link.neighbor_al,
                age(link.last_topology_discovery),
                age(link.last_bridge_discovery),
            );
        }
        for radio in &self.radios {
            let _ = writeln!(out, "radio {} max_bss {}", radio.uid, radio.max_bss);
            for bss in &radio.bsses {
                let _ = writeln!(
                    out,
                    "  bss {} ssid {:?}",
                    bss.bssid,
                    String::from_utf8_lossy(&bss.ssid)
                );
            }
        }
        out
    }
}

fn metrics_slot(metrics: &mut Vec<NeighborMetrics>, neighbor_al: MacAddr) -> &mut NeighborMetrics {
    if let Some(index) = metrics
        .iter()
        .position(|slot| slot.neighbor_al == neighbor_al)
    {
        &mut metrics[index]
    } else {
        metrics.push(NeighborMetrics {
            neighbor_al,
            ..NeighborMetrics::default()
        });
        metrics.last_mut().expect("just pushed")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::tlv::NeighborEntry;

    const LOCAL: MacAddr = MacAddr([2, 0, 0, 0, 0, 1]);
    const PEER_AL: MacAddr = MacAddr([2, 0, 0, 0, 0, 2]);
    const LOCAL_IF: MacAddr = MacAddr([2, 0, 0, 0, 1, 1]);
    const PEER_IF: MacAddr = MacAddr([2, 0, 0, 0, 1, 2]);

    fn response_update() -> TopologyUpdate {
        TopologyUpdate {
            device_info: Some(DeviceInformation {
                al_mac: PEER_AL,
                interfaces: vec![],
            }),
            neighbors: vec![NeighborDeviceList {
                local_mac: PEER_IF,
                neighbors: vec![NeighborEntry {
                    mac: LOCAL,
                    bridge_flag: false,
                }],
            }],
            ..TopologyUpdate::default()
        }
    }

    #[test]
    fn test_discovery_creates_then_refreshes_link() {
        let mut db = TopologyDatabase::new(LOCAL, false);
        let t0 = Instant::now();
        assert_eq!(
            db.update_discovery_timestamp(
                LOCAL_IF,
                PEER_AL,
                PEER_IF,
                DiscoverySource::TopologyDiscovery,
                t0
            ),
            DiscoveryUpdate::NewLink
        );
        let t1 = t0 + Duration::from_secs(3);
        match db.update_discovery_timestamp(
            LOCAL_IF,
            PEER_AL,
            PEER_IF,
            DiscoverySource::TopologyDiscovery,
            t1,
        ) {
            DiscoveryUpdate::Refreshed { elapsed } => {
                assert_eq!(elapsed, Some(Duration::from_secs(3)))
            }
            other => panic!("unexpected update outcome {other:?}"),
        }
    }

    #[test]
    fn test_timestamps_are_monotonic() {
        let mut db = TopologyDatabase::new(LOCAL, false);
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(5);
        db.update_discovery_timestamp(
            LOCAL_IF,
            PEER_AL,
            PEER_IF,
            DiscoverySource::TopologyDiscovery,
            t1,
        );
        // An older event must not move the stamp backwards.
        db.update_discovery_timestamp(
            LOCAL_IF,
            PEER_AL,
            PEER_IF,
            DiscoverySource::TopologyDiscovery,
            t0,
        );
        assert_eq!(db.links()[0].last_topology_discovery, Some(t1));
    }

    #[test]
    fn test_device_update_is_idempotent() {
        let mut db = TopologyDatabase::new(LOCAL, false);
        let now = Instant::now();
        db.update_discovery_timestamp(
            LOCAL_IF,
            PEER_AL,
            PEER_IF,
            DiscoverySource::TopologyDiscovery,
            now,
        );
        db.update_network_device_info(PEER_AL, response_update(), now);
        let first = format!("{:?}", db.device(PEER_AL).unwrap());
        db.update_network_device_info(PEER_AL, response_update(), now);
        let second = format!("{:?}", db.device(PEER_AL).unwrap());
        assert_eq!(first, second);
        assert_eq!(db.device_count(), 1);
    }

    #[test]
    fn test_needs_refresh_window() {
        let mut db = TopologyDatabase::new(LOCAL, false);
        let now = Instant::now();
        assert!(db.device_needs_refresh(PEER_AL, now));
        db.update_discovery_timestamp(
            LOCAL_IF,
            PEER_AL,
            PEER_IF,
            DiscoverySource::TopologyDiscovery,
            now,
        );
        db.update_network_device_info(PEER_AL, response_update(), now);
        assert!(!db.device_needs_refresh(PEER_AL, now + Duration::from_secs(30)));
        assert!(db.device_needs_refresh(PEER_AL, now + Duration::from_secs(61)));
    }

    #[test]
    fn test_mac_to_al_mac_via_link() {
        let mut db = TopologyDatabase::new(LOCAL, false);
        db.update_discovery_timestamp(
            LOCAL_IF,
            PEER_AL,
            PEER_IF,
            DiscoverySource::TopologyDiscovery,
            Instant::now(),
        );
        assert_eq!(db.mac_to_al_mac(PEER_IF), Some(PEER_AL));
        assert_eq!(db.mac_to_al_mac(MacAddr([9, 9, 9, 9, 9, 9])), None);
    }

    #[test]
    fn test_bridged_link_detection() {
        let mut db = TopologyDatabase::new(LOCAL, false);
        let now = Instant::now();
        db.update_discovery_timestamp(
            LOCAL_IF,
            PEER_AL,
            PEER_IF,
            DiscoverySource::TopologyDiscovery,
            now,
        );
        // Topology discovery only: a bridge is eating the LLDP frames.
        assert!(db.is_link_bridged(LOCAL_IF, PEER_IF));
        db.update_discovery_timestamp(
            LOCAL_IF,
            PEER_AL,
            PEER_IF,
            DiscoverySource::BridgeDiscovery,
            now,
        );
        assert!(!db.is_link_bridged(LOCAL_IF, PEER_IF));
    }

    #[test]
    fn test_interface_removal_drops_links_and_device() {
        let mut db = TopologyDatabase::new(LOCAL, false);
        let now = Instant::now();
        db.update_discovery_timestamp(
            LOCAL_IF,
            PEER_AL,
            PEER_IF,
            DiscoverySource::TopologyDiscovery,
            now,
        );
        db.update_network_device_info(
            PEER_AL,
            TopologyUpdate {
                device_info: Some(DeviceInformation {
                    al_mac: PEER_AL,
                    interfaces: vec![],
                }),
                ..TopologyUpdate::default()
            },
            now,
        );
        assert_eq!(db.device_count(), 1);
        db.remove_local_interface(LOCAL_IF);
        assert!(db.links().is_empty());
        // The device became unreachable and was collected.
        assert_eq!(db.device_count(), 0);
    }

    #[test]
    fn test_metrics_replaced_wholesale() {
        let mut db = TopologyDatabase::new(LOCAL, false);
        let now = Instant::now();
        db.update_discovery_timestamp(
            LOCAL_IF,
            PEER_AL,
            PEER_IF,
            DiscoverySource::TopologyDiscovery,
            now,
        );
        let mut tlv = TransmitterLinkMetric {
            local_al: PEER_AL,
            neighbor_al: LOCAL,
            metrics: vec![],
        };
        db.update_tx_metrics(tlv.clone());
        tlv.metrics = vec![];
        db.update_tx_metrics(tlv);
        let device = db.device(PEER_AL).unwrap();
        assert_eq!(device.metrics.len(), 1);
        assert!(device.metrics[0].tx.is_some());
        assert!(device.metrics[0].rx.is_none());
    }

    #[test]
    fn test_bss_install() {
        let mut db = TopologyDatabase::new(LOCAL, false);
        db.upsert_radio(Radio {
            uid: MacAddr([7, 7, 7, 7, 7, 7]),
            max_bss: 2,
            bands: vec![FreqBand::Band5Ghz],
            bsses: vec![],
        });
        assert!(db.radios()[0].is_unconfigured());
        assert!(db.install_bss(
            MacAddr([7, 7, 7, 7, 7, 7]),
            Bss {
                bssid: MacAddr([7, 7, 7, 7, 7, 8]),
                ssid: b"Home".to_vec(),
                auth: WscAuthType::WPA2_PSK,
                encr: WscEncrType::AES,
                network_key: b"secret".to_vec(),
            }
        ));
        assert!(!db.radios()[0].is_unconfigured());
        // Unknown radio is reported, not silently created.
        assert!(!db.install_bss(
            MacAddr([9, 9, 9, 9, 9, 9]),
            Bss {
                bssid: MacAddr([9, 9, 9, 9, 9, 1]),
                ssid: b"x".to_vec(),
                auth: WscAuthType::OPEN,
                encr: WscEncrType::NONE,
                network_key: vec![],
            }
        ));
    }

    #[test]
    fn test_dump_contains_devices_and_links() {
        let mut db = TopologyDatabase::new(LOCAL, false);
        let now = Instant::now();
        db.update_discovery_timestamp(
            LOCAL_IF,
            PEER_AL,
            PEER_IF,
            DiscoverySource::TopologyDiscovery,
            now,
        );
        db.update_network_device_info(PEER_AL, response_update(), now);
        let dump = db.dump(now);
        assert!(dump.contains(&PEER_AL.to_string()));
        assert!(dump.contains("link"));
    }
}
