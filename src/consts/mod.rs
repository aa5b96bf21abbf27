//! # High level notes
//!
//! The contents of this module are generated mostly by the
//! [`impl_wire_enum`][crate::impl_wire_enum] macro, which implements
//! the traits necessary to both be serialized/deserialized and also
//! provide an additional level of type safety when constructing 1905
//! packets.
//!
//! Most of the constants come straight out of the tables of IEEE Std
//! 1905.1-2013 and the Wi-Fi EasyMesh and Wi-Fi Simple Configuration
//! specifications; the table is referenced next to each enum.
//!
//! # Design decisions
//!
//! * Enums are used so that values can be checked against a finite
//!   set of inputs as opposed to the full range of the integer the
//!   wire format uses, which makes it easier to catch garbage when a
//!   corrupted or hostile frame is parsed.
//! * `UnrecognizedVariant` is included in each enum because
//!   completeness cannot be guaranteed for every constant of every
//!   revision of the standards. An unknown value survives a
//!   parse/forge round trip unchanged and can be inspected for error
//!   reporting.

/// Constants related to CMDU framing
pub mod cmdu;
/// Constants related to LLDP bridge discovery
pub mod lldp;
/// Constants related to interface media types
pub mod media;
/// Constants related to TLVs
pub mod tlv;
/// Constants related to Wi-Fi simple configuration
pub mod wsc;

use crate::types::MacAddr;

/// EtherType carrying 1905 CMDUs.
pub const ETHERTYPE_1905: u16 = 0x893a;

/// EtherType carrying LLDP frames.
pub const ETHERTYPE_LLDP: u16 = 0x88cc;

/// The 1905 multicast address ("01:80:C2:00:00:13").
pub const MCAST_1905: MacAddr = MacAddr([0x01, 0x80, 0xc2, 0x00, 0x00, 0x13]);

/// The LLDP nearest-bridge multicast address ("01:80:C2:00:00:0E").
pub const MCAST_LLDP: MacAddr = MacAddr([0x01, 0x80, 0xc2, 0x00, 0x00, 0x0e]);

/// Size of the Ethernet header stripped before CMDU parsing.
pub const ETHERNET_HEADER_SIZE: usize = 14;

/// Largest Ethernet payload a 1905 fragment may occupy.
pub const MAX_NETWORK_SEGMENT_SIZE: usize = 1500;

#[cfg(test)]
mod test {
    use super::{cmdu::MessageType, tlv::TlvType};

    #[test]
    fn test_generated_enum_into_from() {
        let discovery: u16 = MessageType::TopologyDiscovery.into();
        assert_eq!(discovery, 0x0000);

        let wsc = TlvType::from(0x11u8);
        assert_eq!(wsc, TlvType::Wsc);

        let unknown = TlvType::from(0x77u8);
        assert_eq!(unknown, TlvType::UnrecognizedVariant(0x77));
        let back: u8 = unknown.into();
        assert_eq!(back, 0x77);
    }
}
