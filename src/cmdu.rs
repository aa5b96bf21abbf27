//! CMDU framing: the 8 byte header, the required-TLV rules per
//! message type, and forging with fragmentation.
//!
//! On the wire (after the Ethernet header has been stripped) a CMDU
//! fragment is:
//!
//! ```text
//! message_version:u8 | reserved:u8 | message_type:u16 BE |
//! message_id:u16 BE | fragment_id:u8 | flags:u8 | TLV stream
//! ```
//!
//! # Design decisions
//!
//! Forging splits the serialized TLV stream (terminator included) at
//! the payload limit rather than at TLV boundaries, and reassembly
//! concatenates fragment payloads in fragment-ID order before TLV
//! parsing, so the two are exactly symmetric and a TLV may straddle a
//! fragment boundary.
//!
//! On the parse path, TLVs that are not permitted for the message
//! type are dropped with a debug log, except vendor specific TLVs
//! which are preserved for extension dispatch. On the forge path an
//! unexpected TLV is an error: the caller built a CMDU the standard
//! does not allow, and sending it would be a bug rather than a
//! recoverable condition.

use std::io::Cursor;

use log::debug;

use crate::{
    consts::{
        cmdu::{CmduFlags, MessageType, MESSAGE_VERSION_1905_1_2013},
        tlv::TlvType,
        ETHERNET_HEADER_SIZE, MAX_NETWORK_SEGMENT_SIZE,
    },
    err::{DeError, SerError},
    tlv::{write_end_of_message, ParsedTlv, Tlv},
    FromBytes, ToBytes, WireSize,
};

/// Size of the CMDU header on the wire.
pub const CMDU_HEADER_SIZE: usize = 8;

/// Largest TLV stream slice one fragment can carry.
pub const MAX_FRAGMENT_PAYLOAD: usize =
    MAX_NETWORK_SEGMENT_SIZE - ETHERNET_HEADER_SIZE - CMDU_HEADER_SIZE;

/// The CMDU header of a single fragment, cheap to parse on its own
/// for duplicate suppression and reassembly keying before the TLV
/// stream is touched.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CmduHeader {
    /// CMDU message version.
    pub message_version: u8,
    /// Raw message type value.
    pub message_type: u16,
    /// Message ID (MID) of the packet.
    pub message_id: u16,
    /// Fragment ID of the packet.
    pub fragment_id: u8,
    /// Header flags (last fragment, relay indicator).
    pub flags: CmduFlags,
}

impl CmduHeader {
    /// True when this fragment carries the last-fragment flag.
    pub fn is_last_fragment(&self) -> bool {
        self.flags.contains(CmduFlags::LAST_FRAGMENT)
    }

    /// True when this fragment carries the relay indicator.
    pub fn relay_indicator(&self) -> bool {
        self.flags.contains(CmduFlags::RELAY)
    }
}

impl ToBytes for CmduHeader {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.message_version.to_bytes(buffer)?;
        0u8.to_bytes(buffer)?;
        self.message_type.to_bytes(buffer)?;
        self.message_id.to_bytes(buffer)?;
        self.fragment_id.to_bytes(buffer)?;
        self.flags.to_bytes(buffer)
    }
}

impl FromBytes for CmduHeader {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let message_version = u8::from_bytes(buffer)?;
        let _reserved = u8::from_bytes(buffer)?;
        Ok(CmduHeader {
            message_version,
            message_type: u16::from_bytes(buffer)?,
            message_id: u16::from_bytes(buffer)?,
            fragment_id: u8::from_bytes(buffer)?,
            flags: CmduFlags::from_bytes(buffer)?,
        })
    }
}

impl WireSize for CmduHeader {
    fn wire_size(&self) -> usize {
        CMDU_HEADER_SIZE
    }
}

/// One received CMDU fragment: its header plus its slice of the TLV
/// stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fragment {
    /// The fragment's CMDU header.
    pub header: CmduHeader,
    /// The fragment's share of the TLV stream.
    pub payload: Vec<u8>,
}

impl Fragment {
    /// Split a raw CMDU packet (Ethernet header already stripped)
    /// into header and payload.
    pub fn parse(packet: &[u8]) -> Result<Self, DeError> {
        let mut cursor = Cursor::new(packet);
        let header = CmduHeader::from_bytes(&mut cursor)?;
        Ok(Fragment {
            header,
            payload: packet[CMDU_HEADER_SIZE..].to_vec(),
        })
    }
}

/// A single logical 1905 control message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cmdu {
    /// CMDU message version.
    pub message_version: u8,
    /// Message type.
    pub message_type: MessageType,
    /// Message ID correlating requests and responses.
    pub message_id: u16,
    /// Relay indicator; only meaningful on the wire for vendor
    /// specific CMDUs, forced to the standard's value otherwise.
    pub relay_indicator: bool,
    /// The TLVs of the message, terminator not included.
    pub tlvs: Vec<Tlv>,
}

impl Cmdu {
    /// Convenience constructor for an outgoing CMDU with the current
    /// message version.
    pub fn new(message_type: MessageType, message_id: u16, tlvs: Vec<Tlv>) -> Self {
        Cmdu {
            message_version: MESSAGE_VERSION_1905_1_2013,
            message_type,
            message_id,
            relay_indicator: false,
            tlvs,
        }
    }

    /// Find the first TLV of the message matching `pick`.
    pub fn find_tlv<'a, T>(&'a self, pick: impl Fn(&'a Tlv) -> Option<&'a T>) -> Option<&'a T> {
        self.tlvs.iter().find_map(pick)
    }

    /// Reassemble a CMDU from its ordered fragments.
    ///
    /// The fragments must be sorted by fragment-ID with each ID
    /// appearing exactly once and only the final fragment carrying
    /// the last-fragment flag; [`crate::reassembly`] establishes
    /// those invariants. This function checks that all fragments
    /// agree on the header fields, concatenates the payloads, parses
    /// the TLV stream and applies the per-type TLV rules.
    pub fn parse(fragments: &[Fragment]) -> Result<Self, DeError> {
        let first = fragments
            .first()
            .ok_or_else(|| DeError::new("empty fragment list"))?;
        if first.header.message_version != MESSAGE_VERSION_1905_1_2013 {
            return Err(DeError::InconsistentFragments("message_version"));
        }
        for fragment in &fragments[1..] {
            if fragment.header.message_version != first.header.message_version {
                return Err(DeError::InconsistentFragments("message_version"));
            }
            if fragment.header.message_type != first.header.message_type {
                return Err(DeError::InconsistentFragments("message_type"));
            }
            if fragment.header.message_id != first.header.message_id {
                return Err(DeError::InconsistentFragments("message_id"));
            }
        }

        let mut stream = Vec::new();
        for fragment in fragments {
            stream.extend_from_slice(&fragment.payload);
        }

        let message_type = MessageType::from(first.header.message_type);
        let mut cursor = Cursor::new(stream.as_slice());
        let mut tlvs = Vec::new();
        loop {
            match Tlv::parse(&mut cursor)? {
                // Nothing beyond end-of-message is preserved.
                ParsedTlv::EndOfMessage => break,
                ParsedTlv::Known(tlv) => tlvs.push(tlv),
                ParsedTlv::Unknown(t) => {
                    debug!("dropping TLV of unknown type {t} in {message_type:?}");
                }
            }
        }

        let tlvs = filter_tlvs(message_type, tlvs)?;

        Ok(Cmdu {
            message_version: first.header.message_version,
            message_type,
            message_id: first.header.message_id,
            relay_indicator: first.header.relay_indicator(),
            tlvs,
        })
    }

    /// Forge the CMDU into one or more fragment byte streams ready to
    /// be prefixed with an Ethernet header and transmitted.
    ///
    /// Only the TLVs permitted for the message type may be present
    /// and all required ones must be; anything else is a forge error.
    pub fn forge(&self) -> Result<Vec<Vec<u8>>, SerError> {
        validate_for_forge(self)?;

        let mut stream = Cursor::new(Vec::new());
        for tlv in &self.tlvs {
            tlv.to_bytes(&mut stream)?;
        }
        write_end_of_message(&mut stream)?;
        let stream = stream.into_inner();

        let relay = if self.message_type == MessageType::VendorSpecific {
            self.relay_indicator
        } else {
            self.message_type.standard_relay_indicator()
        };

        let chunks: Vec<&[u8]> = stream.chunks(MAX_FRAGMENT_PAYLOAD).collect();
        if chunks.len() > u8::MAX as usize + 1 {
            return Err(SerError::FieldOverflow("fragment_id"));
        }

        let mut packets = Vec::with_capacity(chunks.len());
        let last = chunks.len() - 1;
        for (fragment_id, chunk) in chunks.into_iter().enumerate() {
            let mut flags = CmduFlags::empty();
            if fragment_id == last {
                flags |= CmduFlags::LAST_FRAGMENT;
            }
            if relay {
                flags |= CmduFlags::RELAY;
            }
            let header = CmduHeader {
                message_version: self.message_version,
                message_type: self.message_type.into(),
                message_id: self.message_id,
                fragment_id: fragment_id as u8,
                flags,
            };
            let mut packet = Cursor::new(Vec::with_capacity(CMDU_HEADER_SIZE + chunk.len()));
            header.to_bytes(&mut packet)?;
            chunk.to_vec().to_bytes(&mut packet)?;
            packets.push(packet.into_inner());
        }
        Ok(packets)
    }
}

/// TLV admission rules for one CMDU type.
struct TlvRules {
    /// Must appear exactly once.
    required: &'static [(TlvType, &'static str)],
    /// May appear at most once.
    optional: &'static [TlvType],
    /// May appear any number of times.
    repeated: &'static [TlvType],
}

fn rules_for(message_type: MessageType) -> Option<TlvRules> {
    match message_type {
        MessageType::TopologyDiscovery => Some(TlvRules {
            required: &[
                (TlvType::AlMacAddress, "al_mac_address"),
                (TlvType::MacAddress, "mac_address"),
            ],
            optional: &[],
            repeated: &[],
        }),
        MessageType::TopologyNotification => Some(TlvRules {
            required: &[(TlvType::AlMacAddress, "al_mac_address")],
            optional: &[],
            repeated: &[],
        }),
        MessageType::TopologyQuery | MessageType::HigherLayerQuery | MessageType::GenericPhyQuery => {
            Some(TlvRules {
                required: &[],
                optional: &[],
                repeated: &[],
            })
        }
        MessageType::TopologyResponse => Some(TlvRules {
            required: &[(TlvType::DeviceInformation, "device_information")],
            optional: &[TlvType::SupportedService],
            repeated: &[
                TlvType::DeviceBridgingCapability,
                TlvType::Non1905NeighborDeviceList,
                TlvType::NeighborDeviceList,
                TlvType::PowerOffInterface,
                TlvType::L2NeighborDevice,
            ],
        }),
        MessageType::LinkMetricQuery => Some(TlvRules {
            required: &[(TlvType::LinkMetricQuery, "link_metric_query")],
            optional: &[],
            repeated: &[],
        }),
        MessageType::LinkMetricResponse => Some(TlvRules {
            required: &[],
            optional: &[TlvType::LinkMetricResultCode],
            repeated: &[TlvType::TransmitterLinkMetric, TlvType::ReceiverLinkMetric],
        }),
        MessageType::ApAutoconfigurationSearch => Some(TlvRules {
            required: &[
                (TlvType::AlMacAddress, "al_mac_address"),
                (TlvType::SearchedRole, "searched_role"),
                (TlvType::AutoconfigFreqBand, "autoconfig_freq_band"),
            ],
            optional: &[TlvType::SupportedService, TlvType::SearchedService],
            repeated: &[],
        }),
        MessageType::ApAutoconfigurationResponse => Some(TlvRules {
            required: &[
                (TlvType::SupportedRole, "supported_role"),
                (TlvType::SupportedFreqBand, "supported_freq_band"),
            ],
            optional: &[TlvType::SupportedService],
            repeated: &[],
        }),
        MessageType::ApAutoconfigurationWsc => Some(TlvRules {
            required: &[],
            optional: &[
                TlvType::ApRadioBasicCapabilities,
                TlvType::ApRadioIdentifier,
            ],
            // One per configured BSS in the M2 direction.
            repeated: &[TlvType::Wsc],
        }),
        MessageType::ApAutoconfigurationRenew => Some(TlvRules {
            required: &[
                (TlvType::AlMacAddress, "al_mac_address"),
                (TlvType::SupportedRole, "supported_role"),
                (TlvType::SupportedFreqBand, "supported_freq_band"),
            ],
            optional: &[],
            repeated: &[],
        }),
        MessageType::PushButtonEventNotification => Some(TlvRules {
            required: &[
                (TlvType::AlMacAddress, "al_mac_address"),
                (
                    TlvType::PushButtonEventNotification,
                    "push_button_event_notification",
                ),
            ],
            optional: &[],
            repeated: &[],
        }),
        MessageType::PushButtonJoinNotification => Some(TlvRules {
            required: &[
                (TlvType::AlMacAddress, "al_mac_address"),
                (
                    TlvType::PushButtonJoinNotification,
                    "push_button_join_notification",
                ),
            ],
            optional: &[],
            repeated: &[],
        }),
        MessageType::HigherLayerResponse => Some(TlvRules {
            required: &[
                (TlvType::AlMacAddress, "al_mac_address"),
                (TlvType::ProfileVersion, "profile_version"),
                (TlvType::DeviceIdentification, "device_identification"),
            ],
            optional: &[TlvType::ControlUrl, TlvType::Ipv4, TlvType::Ipv6],
            repeated: &[],
        }),
        MessageType::InterfacePowerChangeRequest => Some(TlvRules {
            required: &[(
                TlvType::InterfacePowerChangeInformation,
                "interface_power_change_information",
            )],
            optional: &[],
            repeated: &[],
        }),
        MessageType::InterfacePowerChangeResponse => Some(TlvRules {
            required: &[(
                TlvType::InterfacePowerChangeStatus,
                "interface_power_change_status",
            )],
            optional: &[],
            repeated: &[],
        }),
        MessageType::GenericPhyResponse => Some(TlvRules {
            required: &[(
                TlvType::GenericPhyDeviceInformation,
                "generic_phy_device_information",
            )],
            optional: &[],
            repeated: &[],
        }),
        // Vendor specific CMDUs have positional rules handled
        // separately; unknown message types have no rules at all.
        MessageType::VendorSpecific | MessageType::UnrecognizedVariant(_) => None,
    }
}

/// Apply the receive-path TLV rules: keep what the message type
/// permits, preserve vendor specific TLVs, drop the rest, and fail if
/// a required TLV is absent.
fn filter_tlvs(message_type: MessageType, tlvs: Vec<Tlv>) -> Result<Vec<Tlv>, DeError> {
    if message_type == MessageType::VendorSpecific {
        match tlvs.first() {
            Some(tlv) if tlv.tlv_type() == TlvType::VendorSpecific => return Ok(tlvs),
            _ => {
                return Err(DeError::MissingRequiredTlv("vendor_specific"));
            }
        }
    }
    let rules = match rules_for(message_type) {
        Some(rules) => rules,
        None => return Ok(tlvs),
    };

    let mut kept = Vec::with_capacity(tlvs.len());
    let mut seen_once: Vec<TlvType> = Vec::new();
    for tlv in tlvs {
        let t = tlv.tlv_type();
        let single = rules.required.iter().any(|(r, _)| *r == t)
            || rules.optional.contains(&t);
        let keep = if single {
            if seen_once.contains(&t) {
                debug!("dropping duplicate TLV {t:?} in {message_type:?}");
                false
            } else {
                seen_once.push(t);
                true
            }
        } else {
            rules.repeated.contains(&t) || t == TlvType::VendorSpecific
        };
        if keep {
            kept.push(tlv);
        } else if t != TlvType::VendorSpecific {
            debug!("dropping unexpected TLV {t:?} in {message_type:?}");
        }
    }

    for (required, name) in rules.required {
        if !kept.iter().any(|tlv| tlv.tlv_type() == *required) {
            return Err(DeError::MissingRequiredTlv(name));
        }
    }
    Ok(kept)
}

/// Forge-path validation: unexpected TLVs are an error instead of
/// being dropped.
fn validate_for_forge(cmdu: &Cmdu) -> Result<(), SerError> {
    if cmdu.message_type == MessageType::VendorSpecific {
        return match cmdu.tlvs.first() {
            Some(tlv) if tlv.tlv_type() == TlvType::VendorSpecific => Ok(()),
            _ => Err(SerError::new(
                "vendor specific CMDU must start with a vendor specific TLV",
            )),
        };
    }
    let rules = match rules_for(cmdu.message_type) {
        Some(rules) => rules,
        None => {
            return Err(SerError::new(format!(
                "cannot forge CMDU of unknown type {:?}",
                cmdu.message_type
            )))
        }
    };
    let mut seen_once: Vec<TlvType> = Vec::new();
    for tlv in &cmdu.tlvs {
        let t = tlv.tlv_type();
        if t == TlvType::VendorSpecific {
            continue;
        }
        let single = rules.required.iter().any(|(r, _)| *r == t)
            || rules.optional.contains(&t);
        if single {
            if seen_once.contains(&t) {
                return Err(SerError::UnexpectedTlv(t.into()));
            }
            seen_once.push(t);
        } else if !rules.repeated.contains(&t) {
            return Err(SerError::UnexpectedTlv(t.into()));
        }
    }
    for (required, name) in rules.required {
        if !cmdu.tlvs.iter().any(|tlv| tlv.tlv_type() == *required) {
            return Err(SerError::new(format!("required TLV {name} missing")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::{
        tlv::{AlMacAddress, DeviceInformation, MacAddress, VendorSpecific},
        types::MacAddr,
    };

    fn discovery(mid: u16) -> Cmdu {
        Cmdu::new(
            MessageType::TopologyDiscovery,
            mid,
            vec![
                Tlv::AlMacAddress(AlMacAddress {
                    al_mac: MacAddr([0x02, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa]),
                }),
                Tlv::MacAddress(MacAddress {
                    mac: MacAddr([0x02, 0xaa, 0xaa, 0xaa, 0xaa, 0xab]),
                }),
            ],
        )
    }

    fn reparse(packets: Vec<Vec<u8>>) -> Cmdu {
        let fragments: Vec<Fragment> = packets
            .iter()
            .map(|p| Fragment::parse(p).unwrap())
            .collect();
        Cmdu::parse(&fragments).unwrap()
    }

    #[test]
    fn test_forge_then_parse_round_trip() {
        let cmdu = discovery(7);
        let packets = cmdu.forge().unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(reparse(packets), cmdu);
    }

    #[test]
    fn test_header_wire_layout() {
        let packets = discovery(0x1234).forge().unwrap();
        let header = &packets[0][..CMDU_HEADER_SIZE];
        assert_eq!(header, &[0x00, 0x00, 0x00, 0x00, 0x12, 0x34, 0x00, 0x80]);
    }

    #[test]
    fn test_missing_required_tlv_fails_parse() {
        let cmdu = Cmdu::new(
            MessageType::TopologyDiscovery,
            1,
            vec![Tlv::AlMacAddress(AlMacAddress {
                al_mac: MacAddr([1, 1, 1, 1, 1, 1]),
            })],
        );
        // Forge refuses it outright.
        assert!(cmdu.forge().is_err());

        // A hand-built wire image without the MAC address TLV fails
        // on parse with the missing TLV reported.
        let mut stream = Cursor::new(Vec::new());
        Tlv::AlMacAddress(AlMacAddress {
            al_mac: MacAddr([1, 1, 1, 1, 1, 1]),
        })
        .to_bytes(&mut stream)
        .unwrap();
        write_end_of_message(&mut stream).unwrap();
        let mut packet = Cursor::new(Vec::new());
        CmduHeader {
            message_version: 0,
            message_type: MessageType::TopologyDiscovery.into(),
            message_id: 1,
            fragment_id: 0,
            flags: CmduFlags::LAST_FRAGMENT,
        }
        .to_bytes(&mut packet)
        .unwrap();
        stream.into_inner().to_bytes(&mut packet).unwrap();
        let fragment = Fragment::parse(&packet.into_inner()).unwrap();
        assert!(matches!(
            Cmdu::parse(&[fragment]),
            Err(DeError::MissingRequiredTlv("mac_address"))
        ));
    }

    #[test]
    fn test_unexpected_tlv_is_a_forge_error() {
        let mut cmdu = discovery(1);
        cmdu.tlvs.push(Tlv::DeviceInformation(DeviceInformation {
            al_mac: MacAddr([1, 1, 1, 1, 1, 1]),
            interfaces: vec![],
        }));
        assert!(matches!(
            cmdu.forge(),
            Err(SerError::UnexpectedTlv(3))
        ));
    }

    #[test]
    fn test_relay_indicator_forced() {
        let mut cmdu = discovery(1);
        cmdu.relay_indicator = true;
        let packets = cmdu.forge().unwrap();
        let fragment = Fragment::parse(&packets[0]).unwrap();
        // Topology discovery is never relayed no matter what the
        // caller requested.
        assert!(!fragment.header.relay_indicator());
    }

    #[test]
    fn test_relay_indicator_honored_for_vendor_specific() {
        let cmdu = Cmdu {
            message_version: MESSAGE_VERSION_1905_1_2013,
            message_type: MessageType::VendorSpecific,
            message_id: 1,
            relay_indicator: true,
            tlvs: vec![Tlv::VendorSpecific(VendorSpecific {
                oui: [0x00, 0x19, 0xa7],
                data: vec![1, 2, 3],
            })],
        };
        let packets = cmdu.forge().unwrap();
        let fragment = Fragment::parse(&packets[0]).unwrap();
        assert!(fragment.header.relay_indicator());
    }

    #[test]
    fn test_fragmentation_of_large_response() {
        // A topology response whose TLV stream is ~4000 bytes must
        // come out as exactly three fragments sharing the MID, with
        // only the last one flagged.
        let mut tlvs = vec![Tlv::DeviceInformation(DeviceInformation {
            al_mac: MacAddr([1, 1, 1, 1, 1, 1]),
            interfaces: vec![],
        })];
        for i in 0..440 {
            tlvs.push(Tlv::Non1905NeighborDeviceList(
                crate::tlv::Non1905NeighborDeviceList {
                    local_mac: MacAddr([1, 1, 1, 1, 1, i as u8]),
                    neighbors: vec![],
                },
            ));
        }
        let cmdu = Cmdu::new(MessageType::TopologyResponse, 42, tlvs);
        let packets = cmdu.forge().unwrap();
        assert_eq!(packets.len(), 3);
        for (i, packet) in packets.iter().enumerate() {
            assert!(packet.len() <= MAX_NETWORK_SEGMENT_SIZE - ETHERNET_HEADER_SIZE);
            let fragment = Fragment::parse(packet).unwrap();
            assert_eq!(fragment.header.fragment_id, i as u8);
            assert_eq!(fragment.header.message_id, 42);
            assert_eq!(fragment.header.is_last_fragment(), i == 2);
        }
        assert_eq!(reparse(packets), cmdu);
    }

    #[test]
    fn test_parse_rejects_mixed_fragments() {
        let a = discovery(1).forge().unwrap();
        let b = discovery(2).forge().unwrap();
        let fragments = vec![
            Fragment::parse(&a[0]).unwrap(),
            Fragment::parse(&b[0]).unwrap(),
        ];
        assert!(matches!(
            Cmdu::parse(&fragments),
            Err(DeError::InconsistentFragments("message_id"))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_version() {
        let mut packets = discovery(1).forge().unwrap();
        packets[0][0] = 0x07;
        let fragment = Fragment::parse(&packets[0]).unwrap();
        assert!(matches!(
            Cmdu::parse(&[fragment]),
            Err(DeError::InconsistentFragments("message_version"))
        ));
    }

    #[test]
    fn test_unexpected_tlv_dropped_on_parse() {
        // Hand-build a topology notification that also carries a MAC
        // address TLV; the extra TLV must be silently dropped.
        let mut stream = Cursor::new(Vec::new());
        Tlv::AlMacAddress(AlMacAddress {
            al_mac: MacAddr([1, 1, 1, 1, 1, 1]),
        })
        .to_bytes(&mut stream)
        .unwrap();
        Tlv::MacAddress(MacAddress {
            mac: MacAddr([2, 2, 2, 2, 2, 2]),
        })
        .to_bytes(&mut stream)
        .unwrap();
        write_end_of_message(&mut stream).unwrap();

        let mut packet = Cursor::new(Vec::new());
        CmduHeader {
            message_version: 0,
            message_type: MessageType::TopologyNotification.into(),
            message_id: 9,
            fragment_id: 0,
            flags: CmduFlags::LAST_FRAGMENT,
        }
        .to_bytes(&mut packet)
        .unwrap();
        stream.into_inner().to_bytes(&mut packet).unwrap();

        let fragment = Fragment::parse(&packet.into_inner()).unwrap();
        let cmdu = Cmdu::parse(&[fragment]).unwrap();
        assert_eq!(cmdu.tlvs.len(), 1);
        assert_eq!(cmdu.tlvs[0].tlv_type(), TlvType::AlMacAddress);
    }
}
