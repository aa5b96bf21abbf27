impl_wire_enum!(
    /// LLDP TLV type (7-bit field), "IEEE Std 802.1AB-2009,
    /// Table 8-1". Only the mandatory types 1905 consumes are listed.
    LldpTlvType, u8,
    EndOfLldpdu => 0,
    ChassisId => 1,
    PortId => 2,
    TimeToLive => 3,
);

/// Chassis ID subtype identifying a MAC address.
pub const CHASSIS_ID_SUBTYPE_MAC_ADDRESS: u8 = 4;

/// Port ID subtype identifying a MAC address.
pub const PORT_ID_SUBTYPE_MAC_ADDRESS: u8 = 3;

/// Time-to-live advertised in bridge discovery frames, in seconds.
/// The 1905 standard fixes this at 180.
pub const BRIDGE_DISCOVERY_TTL: u16 = 180;
