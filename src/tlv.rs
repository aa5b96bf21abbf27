//! The TLV codec.
//!
//! Every TLV defined by IEEE Std 1905.1-2013 (Table 6-7) and the
//! Wi-Fi EasyMesh extensions is represented as its own structure, and
//! [`Tlv`] is the tagged union over all of them. On the wire a TLV is
//! `type:u8 | length:u16 BE | value`, with the end-of-message
//! sentinel being `type=0, length=0`.
//!
//! # Design decisions
//!
//! The payload codecs implement [`ToBytes`]/[`FromBytes`] over the
//! payload bytes only; the three byte TLV header is written and
//! consumed by the [`Tlv`] enum glue. Parsing a TLV of an unknown
//! type yields [`ParsedTlv::Unknown`] so that the CMDU layer can drop
//! it (or keep it, for vendor specific extension dispatch) without
//! losing track of the stream position.

use std::io::Cursor;

use crate::{
    consts::{
        media::MediaType,
        tlv::{
            AutoconfigRole, FreqBand, Ieee80211Role, Ipv4AddrType, Ipv6AddrType,
            LinkMetricDestination, LinkMetricResult, LinkMetricsType, PowerChangeResult,
            PowerState, Profile, ServiceType, TlvType,
        },
    },
    err::{DeError, SerError},
    read_bytes, serialize,
    types::MacAddr,
    FromBytes, ToBytes,
};

/// Number of bytes remaining in a parse cursor.
fn remaining(buffer: &Cursor<&[u8]>) -> usize {
    buffer.get_ref().len().saturating_sub(buffer.position() as usize)
}

/// Read a fixed-size, zero-padded string field.
fn read_fixed_string(buffer: &mut Cursor<&[u8]>, len: usize) -> Result<String, DeError> {
    let raw = read_bytes(buffer, len)?;
    let end = raw.iter().position(|b| *b == 0).unwrap_or(len);
    Ok(String::from_utf8(raw[..end].to_vec())?)
}

/// Write a string into a fixed-size, zero-padded field. Longer
/// strings are truncated to fit.
fn write_fixed_string(
    s: &str,
    len: usize,
    buffer: &mut Cursor<Vec<u8>>,
) -> Result<(), SerError> {
    let mut field = vec![0u8; len];
    let bytes = s.as_bytes();
    let n = bytes.len().min(len);
    field[..n].copy_from_slice(&bytes[..n]);
    field.to_bytes(buffer)
}

/// Write a collection length into a `u8` count field.
fn write_count_u8(len: usize, field: &'static str, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
    let count = u8::try_from(len).map_err(|_| SerError::FieldOverflow(field))?;
    count.to_bytes(buffer)
}

/// Write a collection length into a `u16` count field.
fn write_count_u16(len: usize, field: &'static str, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
    let count = u16::try_from(len).map_err(|_| SerError::FieldOverflow(field))?;
    count.to_bytes(buffer)
}

/// Media specific information block of a local interface entry.
///
/// The invariant from the standard is that the size of this block is
/// fully determined by the media type: ten bytes for 802.11, seven
/// for 1901, zero otherwise.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MediaSpecificInfo {
    /// No media specific information (Ethernet, MoCA, unknown).
    None,
    /// 802.11 media specific information.
    Ieee80211(Ieee80211Info),
    /// 1901 powerline media specific information.
    Ieee1901(Ieee1901Info),
}

/// The ten byte 802.11 media specific block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ieee80211Info {
    /// BSSID the interface is associated to (or advertises).
    pub bssid: MacAddr,
    /// Role of the interface within its BSS.
    pub role: Ieee80211Role,
    /// AP channel band.
    pub ap_channel_band: u8,
    /// Center frequency index 1.
    pub ap_channel_center_1: u8,
    /// Center frequency index 2.
    pub ap_channel_center_2: u8,
}

/// The seven byte 1901 media specific block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ieee1901Info {
    /// 1901 network identifier.
    pub network_identifier: [u8; 7],
}

impl MediaSpecificInfo {
    fn parse(media_type: MediaType, buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let n = u8::from_bytes(buffer)? as usize;
        if media_type.is_ieee80211() {
            if n != 10 {
                return Err(DeError::new(format!(
                    "802.11 media specific info must be 10 bytes, got {n}"
                )));
            }
            Ok(MediaSpecificInfo::Ieee80211(Ieee80211Info {
                bssid: MacAddr::from_bytes(buffer)?,
                role: Ieee80211Role::from_bytes(buffer)?,
                ap_channel_band: u8::from_bytes(buffer)?,
                ap_channel_center_1: u8::from_bytes(buffer)?,
                ap_channel_center_2: u8::from_bytes(buffer)?,
            }))
        } else if media_type.is_ieee1901() {
            if n != 7 {
                return Err(DeError::new(format!(
                    "1901 media specific info must be 7 bytes, got {n}"
                )));
            }
            Ok(MediaSpecificInfo::Ieee1901(Ieee1901Info {
                network_identifier: <[u8; 7]>::from_bytes(buffer)?,
            }))
        } else {
            // The standard assigns no media specific block to other
            // media types; tolerate and skip whatever is there.
            read_bytes(buffer, n)?;
            Ok(MediaSpecificInfo::None)
        }
    }

    fn write(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        match self {
            MediaSpecificInfo::None => 0u8.to_bytes(buffer),
            MediaSpecificInfo::Ieee80211(info) => {
                10u8.to_bytes(buffer)?;
                info.bssid.to_bytes(buffer)?;
                info.role.to_bytes(buffer)?;
                info.ap_channel_band.to_bytes(buffer)?;
                info.ap_channel_center_1.to_bytes(buffer)?;
                info.ap_channel_center_2.to_bytes(buffer)
            }
            MediaSpecificInfo::Ieee1901(info) => {
                7u8.to_bytes(buffer)?;
                info.network_identifier.to_bytes(buffer)
            }
        }
    }
}

/// AL MAC address type TLV (type 1).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AlMacAddress {
    /// The AL MAC address of the transmitting node.
    pub al_mac: MacAddr,
}

impl ToBytes for AlMacAddress {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.al_mac.to_bytes(buffer)
    }
}

impl FromBytes for AlMacAddress {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(AlMacAddress {
            al_mac: MacAddr::from_bytes(buffer)?,
        })
    }
}

/// MAC address type TLV (type 2).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MacAddress {
    /// The MAC address of the transmitting interface.
    pub mac: MacAddr,
}

impl ToBytes for MacAddress {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.mac.to_bytes(buffer)
    }
}

impl FromBytes for MacAddress {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(MacAddress {
            mac: MacAddr::from_bytes(buffer)?,
        })
    }
}

/// One local interface entry of a device information TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocalInterface {
    /// Interface MAC address.
    pub mac: MacAddr,
    /// Media type of the interface.
    pub media_type: MediaType,
    /// Media specific information, sized per the media type.
    pub media_info: MediaSpecificInfo,
}

/// Device information type TLV (type 3).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeviceInformation {
    /// AL MAC address of the reporting device.
    pub al_mac: MacAddr,
    /// The device's 1905 interfaces.
    pub interfaces: Vec<LocalInterface>,
}

impl ToBytes for DeviceInformation {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.al_mac.to_bytes(buffer)?;
        write_count_u8(self.interfaces.len(), "local_interfaces_nr", buffer)?;
        for iface in &self.interfaces {
            iface.mac.to_bytes(buffer)?;
            iface.media_type.to_bytes(buffer)?;
            iface.media_info.write(buffer)?;
        }
        Ok(())
    }
}

impl FromBytes for DeviceInformation {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let al_mac = MacAddr::from_bytes(buffer)?;
        let nr = u8::from_bytes(buffer)?;
        let mut interfaces = Vec::with_capacity(nr as usize);
        for _ in 0..nr {
            let mac = MacAddr::from_bytes(buffer)?;
            let media_type = MediaType::from_bytes(buffer)?;
            let media_info = MediaSpecificInfo::parse(media_type, buffer)?;
            interfaces.push(LocalInterface {
                mac,
                media_type,
                media_info,
            });
        }
        Ok(DeviceInformation { al_mac, interfaces })
    }
}

/// Device bridging capability TLV (type 4).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeviceBridgingCapability {
    /// Each tuple lists the interfaces belonging to one bridge.
    pub bridging_tuples: Vec<Vec<MacAddr>>,
}

impl ToBytes for DeviceBridgingCapability {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        write_count_u8(self.bridging_tuples.len(), "bridging_tuples_nr", buffer)?;
        for tuple in &self.bridging_tuples {
            write_count_u8(tuple.len(), "bridging_tuple_macs_nr", buffer)?;
            for mac in tuple {
                mac.to_bytes(buffer)?;
            }
        }
        Ok(())
    }
}

impl FromBytes for DeviceBridgingCapability {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let tuples_nr = u8::from_bytes(buffer)?;
        let mut bridging_tuples = Vec::with_capacity(tuples_nr as usize);
        for _ in 0..tuples_nr {
            let macs_nr = u8::from_bytes(buffer)?;
            let mut tuple = Vec::with_capacity(macs_nr as usize);
            for _ in 0..macs_nr {
                tuple.push(MacAddr::from_bytes(buffer)?);
            }
            bridging_tuples.push(tuple);
        }
        Ok(DeviceBridgingCapability { bridging_tuples })
    }
}

/// Non-1905 neighbor device list TLV (type 6).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Non1905NeighborDeviceList {
    /// Local interface observing the neighbors.
    pub local_mac: MacAddr,
    /// Neighbor interface addresses that are not 1905 nodes.
    pub neighbors: Vec<MacAddr>,
}

impl ToBytes for Non1905NeighborDeviceList {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.local_mac.to_bytes(buffer)?;
        for mac in &self.neighbors {
            mac.to_bytes(buffer)?;
        }
        Ok(())
    }
}

impl FromBytes for Non1905NeighborDeviceList {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let local_mac = MacAddr::from_bytes(buffer)?;
        let mut neighbors = Vec::new();
        while remaining(buffer) >= 6 {
            neighbors.push(MacAddr::from_bytes(buffer)?);
        }
        Ok(Non1905NeighborDeviceList {
            local_mac,
            neighbors,
        })
    }
}

/// One neighbor entry of a 1905 neighbor device list TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NeighborEntry {
    /// AL MAC address of the 1905 neighbor.
    pub mac: MacAddr,
    /// True when an 802.1 bridge sits between the two devices.
    pub bridge_flag: bool,
}

/// 1905 neighbor device list TLV (type 7).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NeighborDeviceList {
    /// Local interface observing the neighbors.
    pub local_mac: MacAddr,
    /// 1905 neighbors visible from that interface.
    pub neighbors: Vec<NeighborEntry>,
}

impl ToBytes for NeighborDeviceList {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.local_mac.to_bytes(buffer)?;
        for neighbor in &self.neighbors {
            neighbor.mac.to_bytes(buffer)?;
            let flag: u8 = if neighbor.bridge_flag { 0x80 } else { 0x00 };
            flag.to_bytes(buffer)?;
        }
        Ok(())
    }
}

impl FromBytes for NeighborDeviceList {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let local_mac = MacAddr::from_bytes(buffer)?;
        let mut neighbors = Vec::new();
        while remaining(buffer) >= 7 {
            let mac = MacAddr::from_bytes(buffer)?;
            let flag = u8::from_bytes(buffer)?;
            neighbors.push(NeighborEntry {
                mac,
                bridge_flag: flag & 0x80 != 0,
            });
        }
        Ok(NeighborDeviceList {
            local_mac,
            neighbors,
        })
    }
}

/// Link metric query TLV (type 8).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkMetricQuery {
    /// Whether all neighbors or one specific neighbor is queried.
    pub destination: LinkMetricDestination,
    /// The specific neighbor, zero when `destination` is all.
    pub specific_neighbor: MacAddr,
    /// Which direction of metrics is requested.
    pub link_metrics_type: LinkMetricsType,
}

impl ToBytes for LinkMetricQuery {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.destination.to_bytes(buffer)?;
        self.specific_neighbor.to_bytes(buffer)?;
        self.link_metrics_type.to_bytes(buffer)
    }
}

impl FromBytes for LinkMetricQuery {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(LinkMetricQuery {
            destination: LinkMetricDestination::from_bytes(buffer)?,
            specific_neighbor: MacAddr::from_bytes(buffer)?,
            link_metrics_type: LinkMetricsType::from_bytes(buffer)?,
        })
    }
}

/// One link entry of a transmitter link metric TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxLinkMetricEntry {
    /// Local interface of the link.
    pub local_interface: MacAddr,
    /// Neighbor interface of the link.
    pub neighbor_interface: MacAddr,
    /// Media type of the local interface.
    pub media_type: MediaType,
    /// True when the link crosses an 802.1 bridge.
    pub bridge_flag: bool,
    /// Estimated transmit packet errors.
    pub packet_errors: u32,
    /// Packets transmitted on the link.
    pub transmitted_packets: u32,
    /// MAC throughput capacity in Mb/s.
    pub mac_throughput_capacity: u16,
    /// Link availability in percent.
    pub link_availability: u16,
    /// PHY rate in Mb/s.
    pub phy_rate: u16,
}

/// Transmitter link metric TLV (type 9).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransmitterLinkMetric {
    /// AL MAC of the reporting device.
    pub local_al: MacAddr,
    /// AL MAC of the neighbor the metrics refer to.
    pub neighbor_al: MacAddr,
    /// One entry per link joining the two devices.
    pub metrics: Vec<TxLinkMetricEntry>,
}

impl ToBytes for TransmitterLinkMetric {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.local_al.to_bytes(buffer)?;
        self.neighbor_al.to_bytes(buffer)?;
        for m in &self.metrics {
            m.local_interface.to_bytes(buffer)?;
            m.neighbor_interface.to_bytes(buffer)?;
            m.media_type.to_bytes(buffer)?;
            let flag: u8 = u8::from(m.bridge_flag);
            flag.to_bytes(buffer)?;
            m.packet_errors.to_bytes(buffer)?;
            m.transmitted_packets.to_bytes(buffer)?;
            m.mac_throughput_capacity.to_bytes(buffer)?;
            m.link_availability.to_bytes(buffer)?;
            m.phy_rate.to_bytes(buffer)?;
        }
        Ok(())
    }
}

impl FromBytes for TransmitterLinkMetric {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let local_al = MacAddr::from_bytes(buffer)?;
        let neighbor_al = MacAddr::from_bytes(buffer)?;
        let mut metrics = Vec::new();
        while remaining(buffer) >= 29 {
            metrics.push(TxLinkMetricEntry {
                local_interface: MacAddr::from_bytes(buffer)?,
                neighbor_interface: MacAddr::from_bytes(buffer)?,
                media_type: MediaType::from_bytes(buffer)?,
                bridge_flag: u8::from_bytes(buffer)? != 0,
                packet_errors: u32::from_bytes(buffer)?,
                transmitted_packets: u32::from_bytes(buffer)?,
                mac_throughput_capacity: u16::from_bytes(buffer)?,
                link_availability: u16::from_bytes(buffer)?,
                phy_rate: u16::from_bytes(buffer)?,
            });
        }
        Ok(TransmitterLinkMetric {
            local_al,
            neighbor_al,
            metrics,
        })
    }
}

/// One link entry of a receiver link metric TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RxLinkMetricEntry {
    /// Local interface of the link.
    pub local_interface: MacAddr,
    /// Neighbor interface of the link.
    pub neighbor_interface: MacAddr,
    /// Media type of the local interface.
    pub media_type: MediaType,
    /// Estimated receive packet errors.
    pub packet_errors: u32,
    /// Packets received on the link.
    pub packets_received: u32,
    /// RSSI in dB.
    pub rssi: u8,
}

/// Receiver link metric TLV (type 10).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReceiverLinkMetric {
    /// AL MAC of the reporting device.
    pub local_al: MacAddr,
    /// AL MAC of the neighbor the metrics refer to.
    pub neighbor_al: MacAddr,
    /// One entry per link joining the two devices.
    pub metrics: Vec<RxLinkMetricEntry>,
}

impl ToBytes for ReceiverLinkMetric {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.local_al.to_bytes(buffer)?;
        self.neighbor_al.to_bytes(buffer)?;
        for m in &self.metrics {
            m.local_interface.to_bytes(buffer)?;
            m.neighbor_interface.to_bytes(buffer)?;
            m.media_type.to_bytes(buffer)?;
            m.packet_errors.to_bytes(buffer)?;
            m.packets_received.to_bytes(buffer)?;
            m.rssi.to_bytes(buffer)?;
        }
        Ok(())
    }
}

impl FromBytes for ReceiverLinkMetric {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let local_al = MacAddr::from_bytes(buffer)?;
        let neighbor_al = MacAddr::from_bytes(buffer)?;
        let mut metrics = Vec::new();
        while remaining(buffer) >= 23 {
            metrics.push(RxLinkMetricEntry {
                local_interface: MacAddr::from_bytes(buffer)?,
                neighbor_interface: MacAddr::from_bytes(buffer)?,
                media_type: MediaType::from_bytes(buffer)?,
                packet_errors: u32::from_bytes(buffer)?,
                packets_received: u32::from_bytes(buffer)?,
                rssi: u8::from_bytes(buffer)?,
            });
        }
        Ok(ReceiverLinkMetric {
            local_al,
            neighbor_al,
            metrics,
        })
    }
}

/// Vendor specific TLV (type 11). The payload beyond the OUI is
/// opaque to the core and only interpreted by registered extensions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VendorSpecific {
    /// Organizationally unique identifier of the vendor.
    pub oui: [u8; 3],
    /// Opaque vendor data.
    pub data: Vec<u8>,
}

impl ToBytes for VendorSpecific {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.oui.to_bytes(buffer)?;
        self.data.to_bytes(buffer)
    }
}

impl FromBytes for VendorSpecific {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let oui = <[u8; 3]>::from_bytes(buffer)?;
        let data = read_bytes(buffer, remaining(buffer))?;
        Ok(VendorSpecific { oui, data })
    }
}

/// Link metric result code TLV (type 12).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkMetricResultCode {
    /// The result code.
    pub code: LinkMetricResult,
}

impl ToBytes for LinkMetricResultCode {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.code.to_bytes(buffer)
    }
}

impl FromBytes for LinkMetricResultCode {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(LinkMetricResultCode {
            code: LinkMetricResult::from_bytes(buffer)?,
        })
    }
}

/// Searched role TLV (type 13).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchedRole {
    /// The role being searched for.
    pub role: AutoconfigRole,
}

impl ToBytes for SearchedRole {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.role.to_bytes(buffer)
    }
}

impl FromBytes for SearchedRole {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(SearchedRole {
            role: AutoconfigRole::from_bytes(buffer)?,
        })
    }
}

/// Autoconfig frequency band TLV (type 14).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AutoconfigFreqBand {
    /// The band the searcher wants configuration for.
    pub band: FreqBand,
}

impl ToBytes for AutoconfigFreqBand {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.band.to_bytes(buffer)
    }
}

impl FromBytes for AutoconfigFreqBand {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(AutoconfigFreqBand {
            band: FreqBand::from_bytes(buffer)?,
        })
    }
}

/// Supported role TLV (type 15).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SupportedRole {
    /// The role the responder supports.
    pub role: AutoconfigRole,
}

impl ToBytes for SupportedRole {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.role.to_bytes(buffer)
    }
}

impl FromBytes for SupportedRole {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(SupportedRole {
            role: AutoconfigRole::from_bytes(buffer)?,
        })
    }
}

/// Supported frequency band TLV (type 16).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SupportedFreqBand {
    /// The band the responder is registrar for.
    pub band: FreqBand,
}

impl ToBytes for SupportedFreqBand {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.band.to_bytes(buffer)
    }
}

impl FromBytes for SupportedFreqBand {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(SupportedFreqBand {
            band: FreqBand::from_bytes(buffer)?,
        })
    }
}

/// WSC TLV (type 17). The frame is an opaque Wi-Fi simple
/// configuration attribute stream handled by [`crate::wsc`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Wsc {
    /// The raw WSC frame.
    pub frame: Vec<u8>,
}

impl ToBytes for Wsc {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.frame.to_bytes(buffer)
    }
}

impl FromBytes for Wsc {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let frame = read_bytes(buffer, remaining(buffer))?;
        Ok(Wsc { frame })
    }
}

/// One media entry of a push button event notification TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PushButtonMedia {
    /// Media type on which push button configuration was started.
    pub media_type: MediaType,
    /// Media specific information for that interface.
    pub media_info: MediaSpecificInfo,
}

/// Push button event notification TLV (type 18).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PushButtonEventNotification {
    /// The media types taking part in the push button exchange.
    pub media: Vec<PushButtonMedia>,
}

impl ToBytes for PushButtonEventNotification {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        write_count_u8(self.media.len(), "media_types_nr", buffer)?;
        for entry in &self.media {
            entry.media_type.to_bytes(buffer)?;
            entry.media_info.write(buffer)?;
        }
        Ok(())
    }
}

impl FromBytes for PushButtonEventNotification {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let nr = u8::from_bytes(buffer)?;
        let mut media = Vec::with_capacity(nr as usize);
        for _ in 0..nr {
            let media_type = MediaType::from_bytes(buffer)?;
            let media_info = MediaSpecificInfo::parse(media_type, buffer)?;
            media.push(PushButtonMedia {
                media_type,
                media_info,
            });
        }
        Ok(PushButtonEventNotification { media })
    }
}

/// Push button join notification TLV (type 19).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PushButtonJoinNotification {
    /// AL MAC of the device that sent the original event.
    pub al_mac: MacAddr,
    /// Message ID of the original push button event notification.
    pub message_id: u16,
    /// Interface of the notifying device that completed the exchange.
    pub transmitter_mac: MacAddr,
    /// Interface of the newly joined device.
    pub new_device_mac: MacAddr,
}

impl ToBytes for PushButtonJoinNotification {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.al_mac.to_bytes(buffer)?;
        self.message_id.to_bytes(buffer)?;
        self.transmitter_mac.to_bytes(buffer)?;
        self.new_device_mac.to_bytes(buffer)
    }
}

impl FromBytes for PushButtonJoinNotification {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(PushButtonJoinNotification {
            al_mac: MacAddr::from_bytes(buffer)?,
            message_id: u16::from_bytes(buffer)?,
            transmitter_mac: MacAddr::from_bytes(buffer)?,
            new_device_mac: MacAddr::from_bytes(buffer)?,
        })
    }
}

/// One interface entry of a generic PHY device information TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenericPhyInterface {
    /// Interface MAC address.
    pub mac: MacAddr,
    /// OUI of the generic PHY technology.
    pub oui: [u8; 3],
    /// Variant index within that technology.
    pub variant_index: u8,
    /// Variant name, zero padded to 32 bytes on the wire.
    pub variant_name: String,
    /// URL to an XML description of the technology.
    pub url: Vec<u8>,
    /// Opaque media specific bytes.
    pub media_specific: Vec<u8>,
}

/// Generic PHY device information TLV (type 20).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenericPhyDeviceInformation {
    /// AL MAC address of the reporting device.
    pub al_mac: MacAddr,
    /// The device's generic PHY interfaces.
    pub interfaces: Vec<GenericPhyInterface>,
}

impl ToBytes for GenericPhyDeviceInformation {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.al_mac.to_bytes(buffer)?;
        write_count_u8(self.interfaces.len(), "generic_phy_interfaces_nr", buffer)?;
        for iface in &self.interfaces {
            iface.mac.to_bytes(buffer)?;
            iface.oui.to_bytes(buffer)?;
            iface.variant_index.to_bytes(buffer)?;
            write_fixed_string(&iface.variant_name, 32, buffer)?;
            write_count_u8(iface.url.len(), "url_octets_nr", buffer)?;
            write_count_u8(iface.media_specific.len(), "media_specific_nr", buffer)?;
            iface.url.to_bytes(buffer)?;
            iface.media_specific.to_bytes(buffer)?;
        }
        Ok(())
    }
}

impl FromBytes for GenericPhyDeviceInformation {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let al_mac = MacAddr::from_bytes(buffer)?;
        let nr = u8::from_bytes(buffer)?;
        let mut interfaces = Vec::with_capacity(nr as usize);
        for _ in 0..nr {
            let mac = MacAddr::from_bytes(buffer)?;
            let oui = <[u8; 3]>::from_bytes(buffer)?;
            let variant_index = u8::from_bytes(buffer)?;
            let variant_name = read_fixed_string(buffer, 32)?;
            let url_len = u8::from_bytes(buffer)? as usize;
            let media_len = u8::from_bytes(buffer)? as usize;
            let url = read_bytes(buffer, url_len)?;
            let media_specific = read_bytes(buffer, media_len)?;
            interfaces.push(GenericPhyInterface {
                mac,
                oui,
                variant_index,
                variant_name,
                url,
                media_specific,
            });
        }
        Ok(GenericPhyDeviceInformation { al_mac, interfaces })
    }
}

/// Device identification type TLV (type 21). All three fields are 64
/// byte zero padded strings on the wire.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeviceIdentification {
    /// Friendly name of the device.
    pub friendly_name: String,
    /// Manufacturer name.
    pub manufacturer_name: String,
    /// Manufacturer model.
    pub manufacturer_model: String,
}

impl ToBytes for DeviceIdentification {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        write_fixed_string(&self.friendly_name, 64, buffer)?;
        write_fixed_string(&self.manufacturer_name, 64, buffer)?;
        write_fixed_string(&self.manufacturer_model, 64, buffer)
    }
}

impl FromBytes for DeviceIdentification {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(DeviceIdentification {
            friendly_name: read_fixed_string(buffer, 64)?,
            manufacturer_name: read_fixed_string(buffer, 64)?,
            manufacturer_model: read_fixed_string(buffer, 64)?,
        })
    }
}

/// Control URL type TLV (type 22).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControlUrl {
    /// URL of the device's management console.
    pub url: String,
}

impl ToBytes for ControlUrl {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.url.as_bytes().to_vec().to_bytes(buffer)
    }
}

impl FromBytes for ControlUrl {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let raw = read_bytes(buffer, remaining(buffer))?;
        Ok(ControlUrl {
            url: String::from_utf8(raw)?,
        })
    }
}

/// One IPv4 address entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv4Address {
    /// How the address was assigned.
    pub addr_type: Ipv4AddrType,
    /// The IPv4 address.
    pub address: [u8; 4],
    /// The DHCP server that assigned it, if any.
    pub dhcp_server: [u8; 4],
}

/// IPv4 addresses of one interface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv4Interface {
    /// Interface MAC address.
    pub mac: MacAddr,
    /// Addresses assigned to that interface.
    pub addresses: Vec<Ipv4Address>,
}

/// IPv4 type TLV (type 23).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv4 {
    /// Per-interface address lists.
    pub entries: Vec<Ipv4Interface>,
}

impl ToBytes for Ipv4 {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        write_count_u8(self.entries.len(), "ipv4_interfaces_nr", buffer)?;
        for entry in &self.entries {
            entry.mac.to_bytes(buffer)?;
            write_count_u8(entry.addresses.len(), "ipv4_addresses_nr", buffer)?;
            for addr in &entry.addresses {
                addr.addr_type.to_bytes(buffer)?;
                addr.address.to_bytes(buffer)?;
                addr.dhcp_server.to_bytes(buffer)?;
            }
        }
        Ok(())
    }
}

impl FromBytes for Ipv4 {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let nr = u8::from_bytes(buffer)?;
        let mut entries = Vec::with_capacity(nr as usize);
        for _ in 0..nr {
            let mac = MacAddr::from_bytes(buffer)?;
            let addrs_nr = u8::from_bytes(buffer)?;
            let mut addresses = Vec::with_capacity(addrs_nr as usize);
            for _ in 0..addrs_nr {
                addresses.push(Ipv4Address {
                    addr_type: Ipv4AddrType::from_bytes(buffer)?,
                    address: <[u8; 4]>::from_bytes(buffer)?,
                    dhcp_server: <[u8; 4]>::from_bytes(buffer)?,
                });
            }
            entries.push(Ipv4Interface { mac, addresses });
        }
        Ok(Ipv4 { entries })
    }
}

/// One IPv6 address entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv6Address {
    /// How the address was assigned.
    pub addr_type: Ipv6AddrType,
    /// The IPv6 address.
    pub address: [u8; 16],
    /// The origin of the assignment (DHCPv6 server or router).
    pub origin: [u8; 16],
}

/// IPv6 addresses of one interface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv6Interface {
    /// Interface MAC address.
    pub mac: MacAddr,
    /// The interface's link local address.
    pub link_local: [u8; 16],
    /// Other addresses assigned to that interface.
    pub addresses: Vec<Ipv6Address>,
}

/// IPv6 type TLV (type 24).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv6 {
    /// Per-interface address lists.
    pub entries: Vec<Ipv6Interface>,
}

impl ToBytes for Ipv6 {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        write_count_u8(self.entries.len(), "ipv6_interfaces_nr", buffer)?;
        for entry in &self.entries {
            entry.mac.to_bytes(buffer)?;
            entry.link_local.to_bytes(buffer)?;
            write_count_u8(entry.addresses.len(), "ipv6_addresses_nr", buffer)?;
            for addr in &entry.addresses {
                addr.addr_type.to_bytes(buffer)?;
                addr.address.to_bytes(buffer)?;
                addr.origin.to_bytes(buffer)?;
            }
        }
        Ok(())
    }
}

impl FromBytes for Ipv6 {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let nr = u8::from_bytes(buffer)?;
        let mut entries = Vec::with_capacity(nr as usize);
        for _ in 0..nr {
            let mac = MacAddr::from_bytes(buffer)?;
            let link_local = <[u8; 16]>::from_bytes(buffer)?;
            let addrs_nr = u8::from_bytes(buffer)?;
            let mut addresses = Vec::with_capacity(addrs_nr as usize);
            for _ in 0..addrs_nr {
                addresses.push(Ipv6Address {
                    addr_type: Ipv6AddrType::from_bytes(buffer)?,
                    address: <[u8; 16]>::from_bytes(buffer)?,
                    origin: <[u8; 16]>::from_bytes(buffer)?,
                });
            }
            entries.push(Ipv6Interface {
                mac,
                link_local,
                addresses,
            });
        }
        Ok(Ipv6 { entries })
    }
}

/// 1905 profile version TLV (type 26).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProfileVersion {
    /// The profile version the device implements.
    pub profile: Profile,
}

impl ToBytes for ProfileVersion {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.profile.to_bytes(buffer)
    }
}

impl FromBytes for ProfileVersion {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(ProfileVersion {
            profile: Profile::from_bytes(buffer)?,
        })
    }
}

/// One entry of a power off interface TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PowerOffEntry {
    /// Interface MAC address.
    pub mac: MacAddr,
    /// Media type the interface had while powered.
    pub media_type: MediaType,
    /// Generic PHY OUI, zero unless the media type is unknown.
    pub generic_phy_oui: [u8; 3],
    /// Generic PHY variant index.
    pub variant_index: u8,
    /// Opaque generic PHY media specific bytes.
    pub media_specific: Vec<u8>,
}

/// Power off interface TLV (type 27).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PowerOffInterface {
    /// The interfaces currently powered off.
    pub interfaces: Vec<PowerOffEntry>,
}

impl ToBytes for PowerOffInterface {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        write_count_u8(self.interfaces.len(), "power_off_interfaces_nr", buffer)?;
        for iface in &self.interfaces {
            iface.mac.to_bytes(buffer)?;
            iface.media_type.to_bytes(buffer)?;
            iface.generic_phy_oui.to_bytes(buffer)?;
            iface.variant_index.to_bytes(buffer)?;
            write_count_u8(iface.media_specific.len(), "media_specific_nr", buffer)?;
            iface.media_specific.to_bytes(buffer)?;
        }
        Ok(())
    }
}

impl FromBytes for PowerOffInterface {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let nr = u8::from_bytes(buffer)?;
        let mut interfaces = Vec::with_capacity(nr as usize);
        for _ in 0..nr {
            let mac = MacAddr::from_bytes(buffer)?;
            let media_type = MediaType::from_bytes(buffer)?;
            let generic_phy_oui = <[u8; 3]>::from_bytes(buffer)?;
            let variant_index = u8::from_bytes(buffer)?;
            let media_len = u8::from_bytes(buffer)? as usize;
            let media_specific = read_bytes(buffer, media_len)?;
            interfaces.push(PowerOffEntry {
                mac,
                media_type,
                generic_phy_oui,
                variant_index,
                media_specific,
            });
        }
        Ok(PowerOffInterface { interfaces })
    }
}

/// One requested state change of an interface power change
/// information TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PowerChangeRequest {
    /// Interface the change is requested for.
    pub mac: MacAddr,
    /// The requested power state.
    pub state: PowerState,
}

/// Interface power change information TLV (type 28).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterfacePowerChangeInformation {
    /// The requested changes.
    pub requests: Vec<PowerChangeRequest>,
}

impl ToBytes for InterfacePowerChangeInformation {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        write_count_u8(self.requests.len(), "power_change_interfaces_nr", buffer)?;
        for request in &self.requests {
            request.mac.to_bytes(buffer)?;
            request.state.to_bytes(buffer)?;
        }
        Ok(())
    }
}

impl FromBytes for InterfacePowerChangeInformation {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let nr = u8::from_bytes(buffer)?;
        let mut requests = Vec::with_capacity(nr as usize);
        for _ in 0..nr {
            requests.push(PowerChangeRequest {
                mac: MacAddr::from_bytes(buffer)?,
                state: PowerState::from_bytes(buffer)?,
            });
        }
        Ok(InterfacePowerChangeInformation { requests })
    }
}

/// One status entry of an interface power change status TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PowerChangeStatus {
    /// Interface the change was requested for.
    pub mac: MacAddr,
    /// Outcome of the request.
    pub result: PowerChangeResult,
}

/// Interface power change status TLV (type 29).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterfacePowerChangeStatus {
    /// Per-interface outcomes.
    pub statuses: Vec<PowerChangeStatus>,
}

impl ToBytes for InterfacePowerChangeStatus {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        write_count_u8(self.statuses.len(), "power_change_interfaces_nr", buffer)?;
        for status in &self.statuses {
            status.mac.to_bytes(buffer)?;
            status.result.to_bytes(buffer)?;
        }
        Ok(())
    }
}

impl FromBytes for InterfacePowerChangeStatus {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let nr = u8::from_bytes(buffer)?;
        let mut statuses = Vec::with_capacity(nr as usize);
        for _ in 0..nr {
            statuses.push(PowerChangeStatus {
                mac: MacAddr::from_bytes(buffer)?,
                result: PowerChangeResult::from_bytes(buffer)?,
            });
        }
        Ok(InterfacePowerChangeStatus { statuses })
    }
}

/// One L2 neighbor of one local interface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct L2Neighbor {
    /// The neighbor's interface MAC.
    pub mac: MacAddr,
    /// Addresses the neighbor claims are reachable behind it.
    pub behind: Vec<MacAddr>,
}

/// L2 neighbors of one local interface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct L2Interface {
    /// Local interface MAC address.
    pub mac: MacAddr,
    /// The L2 neighbors visible on that interface.
    pub neighbors: Vec<L2Neighbor>,
}

/// L2 neighbor device TLV (type 30).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct L2NeighborDevice {
    /// Per-interface neighbor lists.
    pub interfaces: Vec<L2Interface>,
}

impl ToBytes for L2NeighborDevice {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        write_count_u8(self.interfaces.len(), "l2_interfaces_nr", buffer)?;
        for iface in &self.interfaces {
            iface.mac.to_bytes(buffer)?;
            write_count_u16(iface.neighbors.len(), "l2_neighbors_nr", buffer)?;
            for neighbor in &iface.neighbors {
                neighbor.mac.to_bytes(buffer)?;
                write_count_u16(neighbor.behind.len(), "behind_macs_nr", buffer)?;
                for mac in &neighbor.behind {
                    mac.to_bytes(buffer)?;
                }
            }
        }
        Ok(())
    }
}

impl FromBytes for L2NeighborDevice {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let nr = u8::from_bytes(buffer)?;
        let mut interfaces = Vec::with_capacity(nr as usize);
        for _ in 0..nr {
            let mac = MacAddr::from_bytes(buffer)?;
            let neighbors_nr = u16::from_bytes(buffer)?;
            let mut neighbors = Vec::with_capacity(neighbors_nr as usize);
            for _ in 0..neighbors_nr {
                let neighbor_mac = MacAddr::from_bytes(buffer)?;
                let behind_nr = u16::from_bytes(buffer)?;
                let mut behind = Vec::with_capacity(behind_nr as usize);
                for _ in 0..behind_nr {
                    behind.push(MacAddr::from_bytes(buffer)?);
                }
                neighbors.push(L2Neighbor {
                    mac: neighbor_mac,
                    behind,
                });
            }
            interfaces.push(L2Interface { mac, neighbors });
        }
        Ok(L2NeighborDevice { interfaces })
    }
}

/// Supported service TLV (EasyMesh, type 0x80).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SupportedService {
    /// The EasyMesh services the device supports.
    pub services: Vec<ServiceType>,
}

impl ToBytes for SupportedService {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        write_count_u8(self.services.len(), "supported_services_nr", buffer)?;
        for service in &self.services {
            service.to_bytes(buffer)?;
        }
        Ok(())
    }
}

impl FromBytes for SupportedService {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let nr = u8::from_bytes(buffer)?;
        let mut services = Vec::with_capacity(nr as usize);
        for _ in 0..nr {
            services.push(ServiceType::from_bytes(buffer)?);
        }
        Ok(SupportedService { services })
    }
}

/// Searched service TLV (EasyMesh, type 0x81).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchedService {
    /// The EasyMesh services the searcher is looking for.
    pub services: Vec<ServiceType>,
}

impl ToBytes for SearchedService {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        write_count_u8(self.services.len(), "searched_services_nr", buffer)?;
        for service in &self.services {
            service.to_bytes(buffer)?;
        }
        Ok(())
    }
}

impl FromBytes for SearchedService {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let nr = u8::from_bytes(buffer)?;
        let mut services = Vec::with_capacity(nr as usize);
        for _ in 0..nr {
            services.push(ServiceType::from_bytes(buffer)?);
        }
        Ok(SearchedService { services })
    }
}

/// AP radio identifier TLV (EasyMesh, type 0x82).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApRadioIdentifier {
    /// The radio unique identifier.
    pub radio_uid: MacAddr,
}

impl ToBytes for ApRadioIdentifier {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.radio_uid.to_bytes(buffer)
    }
}

impl FromBytes for ApRadioIdentifier {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(ApRadioIdentifier {
            radio_uid: MacAddr::from_bytes(buffer)?,
        })
    }
}

/// One BSS of an AP operational BSS TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OperationalBss {
    /// BSSID of the operating BSS.
    pub bssid: MacAddr,
    /// SSID the BSS advertises, 1 to 32 octets.
    pub ssid: Vec<u8>,
}

/// One radio of an AP operational BSS TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RadioBssList {
    /// The radio unique identifier.
    pub radio_uid: MacAddr,
    /// The BSSes currently operating on that radio.
    pub bsses: Vec<OperationalBss>,
}

/// AP operational BSS TLV (EasyMesh, type 0x83).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApOperationalBss {
    /// Per-radio BSS inventories.
    pub radios: Vec<RadioBssList>,
}

impl ToBytes for ApOperationalBss {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        write_count_u8(self.radios.len(), "radios_nr", buffer)?;
        for radio in &self.radios {
            radio.radio_uid.to_bytes(buffer)?;
            write_count_u8(radio.bsses.len(), "bss_nr", buffer)?;
            for bss in &radio.bsses {
                bss.bssid.to_bytes(buffer)?;
                write_count_u8(bss.ssid.len(), "ssid_len", buffer)?;
                bss.ssid.to_bytes(buffer)?;
            }
        }
        Ok(())
    }
}

impl FromBytes for ApOperationalBss {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let nr = u8::from_bytes(buffer)?;
        let mut radios = Vec::with_capacity(nr as usize);
        for _ in 0..nr {
            let radio_uid = MacAddr::from_bytes(buffer)?;
            let bss_nr = u8::from_bytes(buffer)?;
            let mut bsses = Vec::with_capacity(bss_nr as usize);
            for _ in 0..bss_nr {
                let bssid = MacAddr::from_bytes(buffer)?;
                let ssid_len = u8::from_bytes(buffer)? as usize;
                let ssid = read_bytes(buffer, ssid_len)?;
                bsses.push(OperationalBss { bssid, ssid });
            }
            radios.push(RadioBssList { radio_uid, bsses });
        }
        Ok(ApOperationalBss { radios })
    }
}

/// One operating class entry of an AP radio basic capabilities TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OperatingClass {
    /// Global operating class number.
    pub op_class: u8,
    /// Maximum transmit power EIRP for that class.
    pub max_tx_power: u8,
    /// Channels of the class the radio cannot operate on.
    pub non_operable_channels: Vec<u8>,
}

/// AP radio basic capabilities TLV (EasyMesh, type 0x85).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApRadioBasicCapabilities {
    /// The radio unique identifier.
    pub radio_uid: MacAddr,
    /// Maximum number of BSSes the radio supports.
    pub max_bss: u8,
    /// The operating classes the radio supports.
    pub operating_classes: Vec<OperatingClass>,
}

impl ToBytes for ApRadioBasicCapabilities {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.radio_uid.to_bytes(buffer)?;
        self.max_bss.to_bytes(buffer)?;
        write_count_u8(self.operating_classes.len(), "operating_classes_nr", buffer)?;
        for class in &self.operating_classes {
            class.op_class.to_bytes(buffer)?;
            class.max_tx_power.to_bytes(buffer)?;
            write_count_u8(
                class.non_operable_channels.len(),
                "non_operable_channels_nr",
                buffer,
            )?;
            class.non_operable_channels.to_bytes(buffer)?;
        }
        Ok(())
    }
}

impl FromBytes for ApRadioBasicCapabilities {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let radio_uid = MacAddr::from_bytes(buffer)?;
        let max_bss = u8::from_bytes(buffer)?;
        let nr = u8::from_bytes(buffer)?;
        let mut operating_classes = Vec::with_capacity(nr as usize);
        for _ in 0..nr {
            let op_class = u8::from_bytes(buffer)?;
            let max_tx_power = u8::from_bytes(buffer)?;
            let channels_nr = u8::from_bytes(buffer)? as usize;
            let non_operable_channels = read_bytes(buffer, channels_nr)?;
            operating_classes.push(OperatingClass {
                op_class,
                max_tx_power,
                non_operable_channels,
            });
        }
        Ok(ApRadioBasicCapabilities {
            radio_uid,
            max_bss,
            operating_classes,
        })
    }
}

/// The tagged union over every TLV the core understands.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Tlv {
    #[allow(missing_docs)]
    AlMacAddress(AlMacAddress),
    #[allow(missing_docs)]
    MacAddress(MacAddress),
    #[allow(missing_docs)]
    DeviceInformation(DeviceInformation),
    #[allow(missing_docs)]
    DeviceBridgingCapability(DeviceBridgingCapability),
    #[allow(missing_docs)]
    Non1905NeighborDeviceList(Non1905NeighborDeviceList),
    #[allow(missing_docs)]
    NeighborDeviceList(NeighborDeviceList),
    #[allow(missing_docs)]
    LinkMetricQuery(LinkMetricQuery),
    #[allow(missing_docs)]
    TransmitterLinkMetric(TransmitterLinkMetric),
    #[allow(missing_docs)]
    ReceiverLinkMetric(ReceiverLinkMetric),
    #[allow(missing_docs)]
    VendorSpecific(VendorSpecific),
    #[allow(missing_docs)]
    LinkMetricResultCode(LinkMetricResultCode),
    #[allow(missing_docs)]
    SearchedRole(SearchedRole),
    #[allow(missing_docs)]
    AutoconfigFreqBand(AutoconfigFreqBand),
    #[allow(missing_docs)]
    SupportedRole(SupportedRole),
    #[allow(missing_docs)]
    SupportedFreqBand(SupportedFreqBand),
    #[allow(missing_docs)]
    Wsc(Wsc),
    #[allow(missing_docs)]
    PushButtonEventNotification(PushButtonEventNotification),
    #[allow(missing_docs)]
    PushButtonJoinNotification(PushButtonJoinNotification),
    #[allow(missing_docs)]
    GenericPhyDeviceInformation(GenericPhyDeviceInformation),
    #[allow(missing_docs)]
    DeviceIdentification(DeviceIdentification),
    #[allow(missing_docs)]
    ControlUrl(ControlUrl),
    #[allow(missing_docs)]
    Ipv4(Ipv4),
    #[allow(missing_docs)]
    Ipv6(Ipv6),
    #[allow(missing_docs)]
    ProfileVersion(ProfileVersion),
    #[allow(missing_docs)]
    PowerOffInterface(PowerOffInterface),
    #[allow(missing_docs)]
    InterfacePowerChangeInformation(InterfacePowerChangeInformation),
    #[allow(missing_docs)]
    InterfacePowerChangeStatus(InterfacePowerChangeStatus),
    #[allow(missing_docs)]
    L2NeighborDevice(L2NeighborDevice),
    #[allow(missing_docs)]
    SupportedService(SupportedService),
    #[allow(missing_docs)]
    SearchedService(SearchedService),
    #[allow(missing_docs)]
    ApRadioIdentifier(ApRadioIdentifier),
    #[allow(missing_docs)]
    ApOperationalBss(ApOperationalBss),
    #[allow(missing_docs)]
    ApRadioBasicCapabilities(ApRadioBasicCapabilities),
}

/// Outcome of parsing one TLV from a stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParsedTlv {
    /// The end-of-message sentinel.
    EndOfMessage,
    /// A TLV the core understands.
    Known(Tlv),
    /// A syntactically valid TLV of a type the core does not
    /// understand; its payload has been skipped.
    Unknown(u8),
}

impl Tlv {
    /// The wire type of this TLV.
    pub fn tlv_type(&self) -> TlvType {
        match self {
            Tlv::AlMacAddress(_) => TlvType::AlMacAddress,
            Tlv::MacAddress(_) => TlvType::MacAddress,
            Tlv::DeviceInformation(_) => TlvType::DeviceInformation,
            Tlv::DeviceBridgingCapability(_) => TlvType::DeviceBridgingCapability,
            Tlv::Non1905NeighborDeviceList(_) => TlvType::Non1905NeighborDeviceList,
            Tlv::NeighborDeviceList(_) => TlvType::NeighborDeviceList,
            Tlv::LinkMetricQuery(_) => TlvType::LinkMetricQuery,
            Tlv::TransmitterLinkMetric(_) => TlvType::TransmitterLinkMetric,
            Tlv::ReceiverLinkMetric(_) => TlvType::ReceiverLinkMetric,
            Tlv::VendorSpecific(_) => TlvType::VendorSpecific,
            Tlv::LinkMetricResultCode(_) => TlvType::LinkMetricResultCode,
            Tlv::SearchedRole(_) => TlvType::SearchedRole,
            Tlv::AutoconfigFreqBand(_) => TlvType::AutoconfigFreqBand,
            Tlv::SupportedRole(_) => TlvType::SupportedRole,
            Tlv::SupportedFreqBand(_) => TlvType::SupportedFreqBand,
            Tlv::Wsc(_) => TlvType::Wsc,
            Tlv::PushButtonEventNotification(_) => TlvType::PushButtonEventNotification,
            Tlv::PushButtonJoinNotification(_) => TlvType::PushButtonJoinNotification,
            Tlv::GenericPhyDeviceInformation(_) => TlvType::GenericPhyDeviceInformation,
            Tlv::DeviceIdentification(_) => TlvType::DeviceIdentification,
            Tlv::ControlUrl(_) => TlvType::ControlUrl,
            Tlv::Ipv4(_) => TlvType::Ipv4,
            Tlv::Ipv6(_) => TlvType::Ipv6,
            Tlv::ProfileVersion(_) => TlvType::ProfileVersion,
            Tlv::PowerOffInterface(_) => TlvType::PowerOffInterface,
            Tlv::InterfacePowerChangeInformation(_) => {
                TlvType::InterfacePowerChangeInformation
            }
            Tlv::InterfacePowerChangeStatus(_) => TlvType::InterfacePowerChangeStatus,
            Tlv::L2NeighborDevice(_) => TlvType::L2NeighborDevice,
            Tlv::SupportedService(_) => TlvType::SupportedService,
            Tlv::SearchedService(_) => TlvType::SearchedService,
            Tlv::ApRadioIdentifier(_) => TlvType::ApRadioIdentifier,
            Tlv::ApOperationalBss(_) => TlvType::ApOperationalBss,
            Tlv::ApRadioBasicCapabilities(_) => TlvType::ApRadioBasicCapabilities,
        }
    }

    /// Parse one TLV (header and payload) from the current position
    /// of `buffer`.
    ///
    /// Fails when the length field overruns the stream or when a
    /// known TLV's payload is malformed.
    pub fn parse(buffer: &mut Cursor<&[u8]>) -> Result<ParsedTlv, DeError> {
        let tlv_type = u8::from_bytes(buffer)?;
        let len = u16::from_bytes(buffer)? as usize;
        if remaining(buffer) < len {
            return Err(DeError::TlvLengthOverrun);
        }
        if TlvType::from(tlv_type) == TlvType::EndOfMessage {
            if len != 0 {
                return Err(DeError::new("end-of-message TLV with non-zero length"));
            }
            return Ok(ParsedTlv::EndOfMessage);
        }
        let payload = read_bytes(buffer, len)?;
        let mut p = Cursor::new(payload.as_slice());
        let tlv = match TlvType::from(tlv_type) {
            TlvType::AlMacAddress => Tlv::AlMacAddress(AlMacAddress::from_bytes(&mut p)?),
            TlvType::MacAddress => Tlv::MacAddress(MacAddress::from_bytes(&mut p)?),
            TlvType::DeviceInformation => {
                Tlv::DeviceInformation(DeviceInformation::from_bytes(&mut p)?)
            }
            TlvType::DeviceBridgingCapability => {
                Tlv::DeviceBridgingCapability(DeviceBridgingCapability::from_bytes(&mut p)?)
            }
            TlvType::Non1905NeighborDeviceList => {
                Tlv::Non1905NeighborDeviceList(Non1905NeighborDeviceList::from_bytes(&mut p)?)
            }
            TlvType::NeighborDeviceList => {
                Tlv::NeighborDeviceList(NeighborDeviceList::from_bytes(&mut p)?)
            }
            TlvType::LinkMetricQuery => Tlv::LinkMetricQuery(LinkMetricQuery::from_bytes(&mut p)?),
            TlvType::TransmitterLinkMetric => {
                Tlv::TransmitterLinkMetric(TransmitterLinkMetric::from_bytes(&mut p)?)
            }
            TlvType::ReceiverLinkMetric => {
                Tlv::ReceiverLinkMetric(ReceiverLinkMetric::from_bytes(&mut p)?)
            }
            TlvType::VendorSpecific => Tlv::VendorSpecific(VendorSpecific::from_bytes(&mut p)?),
            TlvType::LinkMetricResultCode => {
                Tlv::LinkMetricResultCode(LinkMetricResultCode::from_bytes(&mut p)?)
            }
            TlvType::SearchedRole => Tlv::SearchedRole(SearchedRole::from_bytes(&mut p)?),
            TlvType::AutoconfigFreqBand => {
                Tlv::AutoconfigFreqBand(AutoconfigFreqBand::from_bytes(&mut p)?)
            }
            TlvType::SupportedRole => Tlv::SupportedRole(SupportedRole::from_bytes(&mut p)?),
            TlvType::SupportedFreqBand => {
                Tlv::SupportedFreqBand(SupportedFreqBand::from_bytes(&mut p)?)
            }
            TlvType::Wsc => Tlv::Wsc(Wsc::from_bytes(&mut p)?),
            TlvType::PushButtonEventNotification => {
                Tlv::PushButtonEventNotification(PushButtonEventNotification::from_bytes(&mut p)?)
            }
            TlvType::PushButtonJoinNotification => {
                Tlv::PushButtonJoinNotification(PushButtonJoinNotification::from_bytes(&mut p)?)
            }
            TlvType::GenericPhyDeviceInformation => {
                Tlv::GenericPhyDeviceInformation(GenericPhyDeviceInformation::from_bytes(&mut p)?)
            }
            TlvType::DeviceIdentification => {
                Tlv::DeviceIdentification(DeviceIdentification::from_bytes(&mut p)?)
            }
            TlvType::ControlUrl => Tlv::ControlUrl(ControlUrl::from_bytes(&mut p)?),
            TlvType::Ipv4 => Tlv::Ipv4(Ipv4::from_bytes(&mut p)?),
            TlvType::Ipv6 => Tlv::Ipv6(Ipv6::from_bytes(&mut p)?),
            TlvType::ProfileVersion => Tlv::ProfileVersion(ProfileVersion::from_bytes(&mut p)?),
            TlvType::PowerOffInterface => {
                Tlv::PowerOffInterface(PowerOffInterface::from_bytes(&mut p)?)
            }
            TlvType::InterfacePowerChangeInformation => Tlv::InterfacePowerChangeInformation(
                InterfacePowerChangeInformation::from_bytes(&mut p)?,
            ),
            TlvType::InterfacePowerChangeStatus => {
                Tlv::InterfacePowerChangeStatus(InterfacePowerChangeStatus::from_bytes(&mut p)?)
            }
            TlvType::L2NeighborDevice => {
                Tlv::L2NeighborDevice(L2NeighborDevice::from_bytes(&mut p)?)
            }
            TlvType::SupportedService => {
                Tlv::SupportedService(SupportedService::from_bytes(&mut p)?)
            }
            TlvType::SearchedService => Tlv::SearchedService(SearchedService::from_bytes(&mut p)?),
            TlvType::ApRadioIdentifier => {
                Tlv::ApRadioIdentifier(ApRadioIdentifier::from_bytes(&mut p)?)
            }
            TlvType::ApOperationalBss => {
                Tlv::ApOperationalBss(ApOperationalBss::from_bytes(&mut p)?)
            }
            TlvType::ApRadioBasicCapabilities => {
                Tlv::ApRadioBasicCapabilities(ApRadioBasicCapabilities::from_bytes(&mut p)?)
            }
            TlvType::EndOfMessage
            | TlvType::GenericPhyEventNotification
            | TlvType::AssociatedClients
            | TlvType::UnrecognizedVariant(_) => return Ok(ParsedTlv::Unknown(tlv_type)),
        };
        Ok(ParsedTlv::Known(tlv))
    }

    fn payload_bytes(&self) -> Result<Vec<u8>, SerError> {
        match self {
            Tlv::AlMacAddress(t) => serialize(t),
            Tlv::MacAddress(t) => serialize(t),
            Tlv::DeviceInformation(t) => serialize(t),
            Tlv::DeviceBridgingCapability(t) => serialize(t),
            Tlv::Non1905NeighborDeviceList(t) => serialize(t),
            Tlv::NeighborDeviceList(t) => serialize(t),
            Tlv::LinkMetricQuery(t) => serialize(t),
            Tlv::TransmitterLinkMetric(t) => serialize(t),
            Tlv::ReceiverLinkMetric(t) => serialize(t),
            Tlv::VendorSpecific(t) => serialize(t),
            Tlv::LinkMetricResultCode(t) => serialize(t),
            Tlv::SearchedRole(t) => serialize(t),
            Tlv::AutoconfigFreqBand(t) => serialize(t),
            Tlv::SupportedRole(t) => serialize(t),
            Tlv::SupportedFreqBand(t) => serialize(t),
            Tlv::Wsc(t) => serialize(t),
            Tlv::PushButtonEventNotification(t) => serialize(t),
            Tlv::PushButtonJoinNotification(t) => serialize(t),
            Tlv::GenericPhyDeviceInformation(t) => serialize(t),
            Tlv::DeviceIdentification(t) => serialize(t),
            Tlv::ControlUrl(t) => serialize(t),
            Tlv::Ipv4(t) => serialize(t),
            Tlv::Ipv6(t) => serialize(t),
            Tlv::ProfileVersion(t) => serialize(t),
            Tlv::PowerOffInterface(t) => serialize(t),
            Tlv::InterfacePowerChangeInformation(t) => serialize(t),
            Tlv::InterfacePowerChangeStatus(t) => serialize(t),
            Tlv::L2NeighborDevice(t) => serialize(t),
            Tlv::SupportedService(t) => serialize(t),
            Tlv::SearchedService(t) => serialize(t),
            Tlv::ApRadioIdentifier(t) => serialize(t),
            Tlv::ApOperationalBss(t) => serialize(t),
            Tlv::ApRadioBasicCapabilities(t) => serialize(t),
        }
    }
}

impl ToBytes for Tlv {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        let payload = self.payload_bytes()?;
        let len =
            u16::try_from(payload.len()).map_err(|_| SerError::FieldOverflow("tlv_length"))?;
        u8::from(self.tlv_type()).to_bytes(buffer)?;
        len.to_bytes(buffer)?;
        payload.to_bytes(buffer)
    }
}

/// Write the end-of-message sentinel.
pub fn write_end_of_message(buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
    u8::from(TlvType::EndOfMessage).to_bytes(buffer)?;
    0u16.to_bytes(buffer)
}

#[cfg(test)]
mod test {
    use super::*;

    fn round_trip(tlv: Tlv) {
        let bytes = serialize(&tlv).unwrap();
        let parsed = Tlv::parse(&mut Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(parsed, ParsedTlv::Known(tlv));
    }

    #[test]
    fn test_al_mac_wire_form() {
        let tlv = Tlv::AlMacAddress(AlMacAddress {
            al_mac: MacAddr([0x02, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa]),
        });
        let bytes = serialize(&tlv).unwrap();
        assert_eq!(
            bytes,
            &[0x01, 0x00, 0x06, 0x02, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa]
        );
    }

    #[test]
    fn test_device_information_round_trip() {
        round_trip(Tlv::DeviceInformation(DeviceInformation {
            al_mac: MacAddr([2, 2, 2, 2, 2, 2]),
            interfaces: vec![
                LocalInterface {
                    mac: MacAddr([2, 2, 2, 2, 2, 3]),
                    media_type: MediaType::Ieee8023abGigabitEthernet,
                    media_info: MediaSpecificInfo::None,
                },
                LocalInterface {
                    mac: MacAddr([2, 2, 2, 2, 2, 4]),
                    media_type: MediaType::Ieee80211ac5Ghz,
                    media_info: MediaSpecificInfo::Ieee80211(Ieee80211Info {
                        bssid: MacAddr([9, 9, 9, 9, 9, 9]),
                        role: Ieee80211Role::Ap,
                        ap_channel_band: 1,
                        ap_channel_center_1: 42,
                        ap_channel_center_2: 0,
                    }),
                },
                LocalInterface {
                    mac: MacAddr([2, 2, 2, 2, 2, 5]),
                    media_type: MediaType::Ieee1901Fft,
                    media_info: MediaSpecificInfo::Ieee1901(Ieee1901Info {
                        network_identifier: [1, 2, 3, 4, 5, 6, 7],
                    }),
                },
            ],
        }));
    }

    #[test]
    fn test_neighbor_lists_round_trip() {
        round_trip(Tlv::NeighborDeviceList(NeighborDeviceList {
            local_mac: MacAddr([1, 1, 1, 1, 1, 1]),
            neighbors: vec![
                NeighborEntry {
                    mac: MacAddr([2, 2, 2, 2, 2, 2]),
                    bridge_flag: true,
                },
                NeighborEntry {
                    mac: MacAddr([3, 3, 3, 3, 3, 3]),
                    bridge_flag: false,
                },
            ],
        }));
        round_trip(Tlv::Non1905NeighborDeviceList(Non1905NeighborDeviceList {
            local_mac: MacAddr([1, 1, 1, 1, 1, 1]),
            neighbors: vec![MacAddr([4, 4, 4, 4, 4, 4])],
        }));
    }

    #[test]
    fn test_link_metric_round_trip() {
        round_trip(Tlv::TransmitterLinkMetric(TransmitterLinkMetric {
            local_al: MacAddr([1, 0, 0, 0, 0, 1]),
            neighbor_al: MacAddr([1, 0, 0, 0, 0, 2]),
            metrics: vec![TxLinkMetricEntry {
                local_interface: MacAddr([1, 0, 0, 0, 1, 1]),
                neighbor_interface: MacAddr([1, 0, 0, 0, 1, 2]),
                media_type: MediaType::Ieee8023uFastEthernet,
                bridge_flag: false,
                packet_errors: 12,
                transmitted_packets: 3400,
                mac_throughput_capacity: 100,
                link_availability: 98,
                phy_rate: 100,
            }],
        }));
        round_trip(Tlv::ReceiverLinkMetric(ReceiverLinkMetric {
            local_al: MacAddr([1, 0, 0, 0, 0, 1]),
            neighbor_al: MacAddr([1, 0, 0, 0, 0, 2]),
            metrics: vec![RxLinkMetricEntry {
                local_interface: MacAddr([1, 0, 0, 0, 1, 1]),
                neighbor_interface: MacAddr([1, 0, 0, 0, 1, 2]),
                media_type: MediaType::Ieee80211n2_4Ghz,
                packet_errors: 1,
                packets_received: 2000,
                rssi: 47,
            }],
        }));
    }

    #[test]
    fn test_l2_neighbor_device_round_trip() {
        round_trip(Tlv::L2NeighborDevice(L2NeighborDevice {
            interfaces: vec![L2Interface {
                mac: MacAddr([1, 1, 1, 1, 1, 1]),
                neighbors: vec![L2Neighbor {
                    mac: MacAddr([2, 2, 2, 2, 2, 2]),
                    behind: vec![MacAddr([3, 3, 3, 3, 3, 3]), MacAddr([4, 4, 4, 4, 4, 4])],
                }],
            }],
        }));
    }

    #[test]
    fn test_ip_tlvs_round_trip() {
        round_trip(Tlv::Ipv4(Ipv4 {
            entries: vec![Ipv4Interface {
                mac: MacAddr([1, 1, 1, 1, 1, 1]),
                addresses: vec![Ipv4Address {
                    addr_type: Ipv4AddrType::Dhcp,
                    address: [192, 168, 1, 10],
                    dhcp_server: [192, 168, 1, 1],
                }],
            }],
        }));
        round_trip(Tlv::Ipv6(Ipv6 {
            entries: vec![Ipv6Interface {
                mac: MacAddr([1, 1, 1, 1, 1, 1]),
                link_local: [0xfe, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
                addresses: vec![Ipv6Address {
                    addr_type: Ipv6AddrType::Slaac,
                    address: [0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
                    origin: [0; 16],
                }],
            }],
        }));
    }

    #[test]
    fn test_easymesh_tlvs_round_trip() {
        round_trip(Tlv::SupportedService(SupportedService {
            services: vec![ServiceType::MultiApController, ServiceType::MultiApAgent],
        }));
        round_trip(Tlv::ApRadioIdentifier(ApRadioIdentifier {
            radio_uid: MacAddr([7, 7, 7, 7, 7, 7]),
        }));
        round_trip(Tlv::ApOperationalBss(ApOperationalBss {
            radios: vec![RadioBssList {
                radio_uid: MacAddr([7, 7, 7, 7, 7, 7]),
                bsses: vec![OperationalBss {
                    bssid: MacAddr([7, 7, 7, 7, 7, 8]),
                    ssid: b"Home".to_vec(),
                }],
            }],
        }));
        round_trip(Tlv::ApRadioBasicCapabilities(ApRadioBasicCapabilities {
            radio_uid: MacAddr([7, 7, 7, 7, 7, 7]),
            max_bss: 4,
            operating_classes: vec![OperatingClass {
                op_class: 115,
                max_tx_power: 20,
                non_operable_channels: vec![120],
            }],
        }));
    }

    #[test]
    fn test_device_identification_padding() {
        let tlv = Tlv::DeviceIdentification(DeviceIdentification {
            friendly_name: "kitchen".into(),
            manufacturer_name: "acme".into(),
            manufacturer_model: "router9000".into(),
        });
        let bytes = serialize(&tlv).unwrap();
        // Three 64 byte fields plus the TLV header.
        assert_eq!(bytes.len(), 3 + 192);
        round_trip(tlv);
    }

    #[test]
    fn test_unknown_tlv_is_skipped() {
        let bytes: &[u8] = &[0x77, 0x00, 0x02, 0xde, 0xad, 0x01, 0x00, 0x06];
        let mut cursor = Cursor::new(bytes);
        assert_eq!(
            Tlv::parse(&mut cursor).unwrap(),
            ParsedTlv::Unknown(0x77)
        );
        // The cursor must have skipped the unknown payload.
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn test_length_overrun_is_an_error() {
        let bytes: &[u8] = &[0x01, 0x00, 0x10, 0x02];
        assert!(matches!(
            Tlv::parse(&mut Cursor::new(bytes)),
            Err(DeError::TlvLengthOverrun)
        ));
    }

    #[test]
    fn test_end_of_message() {
        let bytes: &[u8] = &[0x00, 0x00, 0x00];
        assert_eq!(
            Tlv::parse(&mut Cursor::new(bytes)).unwrap(),
            ParsedTlv::EndOfMessage
        );
    }
}
