use bitflags::bitflags;

use crate::{
    err::{DeError, SerError},
    FromBytes, ToBytes, WireSize,
};

use std::io::Cursor;

impl_wire_enum!(
    /// TLV type as detailed in "IEEE Std 1905.1-2013, Table 6-7" plus
    /// the Wi-Fi EasyMesh extension types (0x80 and up).
    TlvType, u8,
    EndOfMessage => 0,
    AlMacAddress => 1,
    MacAddress => 2,
    DeviceInformation => 3,
    DeviceBridgingCapability => 4,
    Non1905NeighborDeviceList => 6,
    NeighborDeviceList => 7,
    LinkMetricQuery => 8,
    TransmitterLinkMetric => 9,
    ReceiverLinkMetric => 10,
    VendorSpecific => 11,
    LinkMetricResultCode => 12,
    SearchedRole => 13,
    AutoconfigFreqBand => 14,
    SupportedRole => 15,
    SupportedFreqBand => 16,
    Wsc => 17,
    PushButtonEventNotification => 18,
    PushButtonJoinNotification => 19,
    GenericPhyDeviceInformation => 20,
    DeviceIdentification => 21,
    ControlUrl => 22,
    Ipv4 => 23,
    Ipv6 => 24,
    GenericPhyEventNotification => 25,
    ProfileVersion => 26,
    PowerOffInterface => 27,
    InterfacePowerChangeInformation => 28,
    InterfacePowerChangeStatus => 29,
    L2NeighborDevice => 30,
    SupportedService => 0x80,
    SearchedService => 0x81,
    ApRadioIdentifier => 0x82,
    ApOperationalBss => 0x83,
    AssociatedClients => 0x84,
    ApRadioBasicCapabilities => 0x85,
);

impl_wire_enum!(
    /// The `destination` field of a link metric query.
    LinkMetricDestination, u8,
    AllNeighbors => 0x00,
    SpecificNeighbor => 0x01,
);

impl_wire_enum!(
    /// The `link_metrics_type` field of a link metric query.
    LinkMetricsType, u8,
    TxOnly => 0x00,
    RxOnly => 0x01,
    TxAndRx => 0x02,
);

impl_wire_enum!(
    /// Link metric result code; only "invalid neighbor" is defined.
    LinkMetricResult, u8,
    InvalidNeighbor => 0x00,
);

impl_wire_enum!(
    /// Role advertised in searched/supported role TLVs. Only the
    /// registrar role is defined by the standard.
    AutoconfigRole, u8,
    Registrar => 0x00,
);

impl_wire_enum!(
    /// Frequency band of the searched/supported freq band TLVs.
    FreqBand, u8,
    Band2_4Ghz => 0x00,
    Band5Ghz => 0x01,
    Band60Ghz => 0x02,
);

impl_wire_enum!(
    /// Role nibble inside the 802.11 media specific info block.
    Ieee80211Role, u8,
    Ap => 0x00,
    NonApSta => 0x40,
    P2pClient => 0x80,
    AdHoc => 0xc0,
);

impl_wire_enum!(
    /// Power state of an interface, as carried by power change
    /// request TLVs.
    PowerState, u8,
    Off => 0x00,
    On => 0x01,
    Save => 0x02,
);

impl_wire_enum!(
    /// Result of a requested power state change.
    PowerChangeResult, u8,
    Completed => 0x00,
    NoChange => 0x01,
    AlternativeChange => 0x02,
);

impl_wire_enum!(
    /// Origin of an IPv4 address.
    Ipv4AddrType, u8,
    Unknown => 0x00,
    Dhcp => 0x01,
    Static => 0x02,
    AutoIp => 0x03,
);

impl_wire_enum!(
    /// Origin of an IPv6 address.
    Ipv6AddrType, u8,
    Unknown => 0x00,
    Dhcp => 0x01,
    Static => 0x02,
    Slaac => 0x03,
);

impl_wire_enum!(
    /// 1905 profile version.
    Profile, u8,
    Ieee1905_1 => 0x00,
    Ieee1905_1a => 0x01,
);

impl_wire_enum!(
    /// EasyMesh service advertised in supported/searched service
    /// TLVs.
    ServiceType, u8,
    MultiApController => 0x00,
    MultiApAgent => 0x01,
);

bitflags! {
    /// Set of EasyMesh services a device supports. The wire form is a
    /// list of [`ServiceType`] bytes; this set is the in-memory view.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct Services: u8 {
        const CONTROLLER = 0x01;
        const AGENT = 0x02;
    }
}

impl Services {
    /// In-memory view of a wire service list.
    pub fn from_list(list: &[ServiceType]) -> Self {
        let mut services = Services::empty();
        for service in list {
            match service {
                ServiceType::MultiApController => services |= Services::CONTROLLER,
                ServiceType::MultiApAgent => services |= Services::AGENT,
                ServiceType::UnrecognizedVariant(_) => (),
            }
        }
        services
    }

    /// Wire service list for this set.
    pub fn to_list(self) -> Vec<ServiceType> {
        let mut list = Vec::new();
        if self.contains(Services::CONTROLLER) {
            list.push(ServiceType::MultiApController);
        }
        if self.contains(Services::AGENT) {
            list.push(ServiceType::MultiApAgent);
        }
        list
    }
}

impl ToBytes for Services {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        self.bits().to_bytes(buffer)
    }
}

impl FromBytes for Services {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(Services::from_bits_truncate(u8::from_bytes(buffer)?))
    }
}

impl WireSize for Services {
    fn wire_size(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_service_set_round_trip() {
        let set = Services::CONTROLLER | Services::AGENT;
        let list = set.to_list();
        assert_eq!(
            list,
            vec![ServiceType::MultiApController, ServiceType::MultiApAgent]
        );
        assert_eq!(Services::from_list(&list), set);
    }

    #[test]
    fn test_unknown_service_ignored() {
        let list = vec![ServiceType::UnrecognizedVariant(0x55)];
        assert_eq!(Services::from_list(&list), Services::empty());
    }
}
