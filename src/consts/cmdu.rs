use bitflags::bitflags;

use crate::{
    err::{DeError, SerError},
    FromBytes, ToBytes, WireSize,
};

use std::io::Cursor;

/// CMDU message version for the IEEE 1905.1-2013 profile.
pub const MESSAGE_VERSION_1905_1_2013: u8 = 0x00;

impl_wire_enum!(
    /// CMDU message type as detailed in "IEEE Std 1905.1-2013,
    /// Table 6-4".
    MessageType, u16,
    TopologyDiscovery => 0x0000,
    TopologyNotification => 0x0001,
    TopologyQuery => 0x0002,
    TopologyResponse => 0x0003,
    VendorSpecific => 0x0004,
    LinkMetricQuery => 0x0005,
    LinkMetricResponse => 0x0006,
    ApAutoconfigurationSearch => 0x0007,
    ApAutoconfigurationResponse => 0x0008,
    ApAutoconfigurationWsc => 0x0009,
    ApAutoconfigurationRenew => 0x000a,
    PushButtonEventNotification => 0x000b,
    PushButtonJoinNotification => 0x000c,
    HigherLayerQuery => 0x000d,
    HigherLayerResponse => 0x000e,
    InterfacePowerChangeRequest => 0x000f,
    InterfacePowerChangeResponse => 0x0010,
    GenericPhyQuery => 0x0011,
    GenericPhyResponse => 0x0012,
);

impl MessageType {
    /// Relay indicator value the standard mandates for this message
    /// type ("IEEE Std 1905.1-2013, Table 6-2"). The caller-supplied
    /// value is only honored for vendor specific CMDUs.
    pub fn standard_relay_indicator(self) -> bool {
        matches!(
            self,
            MessageType::TopologyNotification
                | MessageType::ApAutoconfigurationSearch
                | MessageType::ApAutoconfigurationRenew
                | MessageType::PushButtonEventNotification
                | MessageType::PushButtonJoinNotification
        )
    }

    /// True for the CMDU types that are always sent to the 1905
    /// multicast address.
    pub fn is_multicast(self) -> bool {
        matches!(
            self,
            MessageType::TopologyDiscovery
                | MessageType::TopologyNotification
                | MessageType::ApAutoconfigurationSearch
                | MessageType::ApAutoconfigurationRenew
                | MessageType::PushButtonEventNotification
                | MessageType::PushButtonJoinNotification
        )
    }
}

bitflags! {
    /// Flags byte of the CMDU header: bit 7 is the last-fragment
    /// indicator, bit 6 the relay indicator, the rest is reserved.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct CmduFlags: u8 {
        const LAST_FRAGMENT = 0x80;
        const RELAY = 0x40;
    }
}

impl ToBytes for CmduFlags {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.bits().to_bytes(buffer)
    }
}

impl FromBytes for CmduFlags {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(CmduFlags::from_bits_truncate(u8::from_bytes(buffer)?))
    }
}

impl WireSize for CmduFlags {
    fn wire_size(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_relay_indicator_table() {
        assert!(MessageType::TopologyNotification.standard_relay_indicator());
        assert!(MessageType::ApAutoconfigurationSearch.standard_relay_indicator());
        assert!(!MessageType::TopologyDiscovery.standard_relay_indicator());
        assert!(!MessageType::TopologyResponse.standard_relay_indicator());
        assert!(!MessageType::VendorSpecific.standard_relay_indicator());
    }

    #[test]
    fn test_flags_reserved_bits_dropped() {
        let bytes: &[u8] = &[0xff];
        let flags = CmduFlags::from_bytes(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(flags, CmduFlags::LAST_FRAGMENT | CmduFlags::RELAY);
    }
}
