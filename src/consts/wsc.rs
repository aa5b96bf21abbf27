use bitflags::bitflags;

use crate::{
    consts::tlv::FreqBand,
    err::{DeError, SerError},
    FromBytes, ToBytes, WireSize,
};

use std::io::Cursor;

impl_wire_enum!(
    /// WSC attribute identifiers, "Wi-Fi Simple Configuration
    /// Technical Specification v2.0, Section 12". Only the attributes
    /// exchanged in the 1905 M1/M2 handshake are listed.
    WscAttrType, u16,
    AssociationState => 0x1002,
    AuthType => 0x1003,
    AuthTypeFlags => 0x1004,
    Authenticator => 0x1005,
    ConfigMethods => 0x1008,
    ConfigurationError => 0x1009,
    ConnectionTypeFlags => 0x100d,
    Credential => 0x100e,
    EncryptionType => 0x100f,
    EncryptionTypeFlags => 0x1010,
    DeviceName => 0x1011,
    DevicePasswordId => 0x1012,
    EncryptedSettings => 0x1018,
    KeyWrapAuthenticator => 0x101e,
    EnrolleeNonce => 0x101a,
    MacAddress => 0x1020,
    Manufacturer => 0x1021,
    MessageType => 0x1022,
    ModelName => 0x1023,
    ModelNumber => 0x1024,
    NetworkKey => 0x1027,
    NetworkIndex => 0x1026,
    OsVersion => 0x102d,
    PublicKey => 0x1032,
    RegistrarNonce => 0x1039,
    RfBands => 0x103c,
    SerialNumber => 0x1042,
    Ssid => 0x1045,
    UuidE => 0x1047,
    UuidR => 0x1048,
    Version => 0x104a,
    WscState => 0x1044,
    PrimaryDeviceType => 0x1054,
);

impl_wire_enum!(
    /// WSC message type values carried in attribute 0x1022.
    WscMessageType, u8,
    M1 => 0x04,
    M2 => 0x05,
);

/// WSC protocol version byte (1.0h, still sent for compatibility).
pub const WSC_VERSION: u8 = 0x10;

/// WSC state value "not configured".
pub const WSC_STATE_NOT_CONFIGURED: u8 = 0x01;

/// Device password ID for push button configuration.
pub const DEVICE_PASSWORD_PUSH_BUTTON: u16 = 0x0004;

/// Connection type flag for an ESS network.
pub const CONNECTION_TYPE_ESS: u8 = 0x01;

/// Config methods bitmask advertising virtual push button.
pub const CONFIG_METHOD_VIRT_PUSH_BUTTON: u16 = 0x0280;

bitflags! {
    /// Authentication type bitmask (attribute 0x1004 / 0x1003).
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct WscAuthType: u16 {
        const OPEN = 0x0001;
        const WPA_PSK = 0x0002;
        const SHARED = 0x0004;
        const WPA = 0x0008;
        const WPA2 = 0x0010;
        const WPA2_PSK = 0x0020;
    }
}

bitflags! {
    /// Encryption type bitmask (attribute 0x1010 / 0x100f).
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct WscEncrType: u16 {
        const NONE = 0x0001;
        const WEP = 0x0002;
        const TKIP = 0x0004;
        const AES = 0x0008;
    }
}

bitflags! {
    /// RF band bitmask (attribute 0x103c).
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct WscRfBand: u8 {
        const BAND_2_4_GHZ = 0x01;
        const BAND_5_GHZ = 0x02;
        const BAND_60_GHZ = 0x04;
    }
}

impl WscRfBand {
    /// The RF band bit corresponding to an autoconfiguration
    /// frequency band.
    pub fn from_freq_band(band: FreqBand) -> Self {
        match band {
            FreqBand::Band2_4Ghz => WscRfBand::BAND_2_4_GHZ,
            FreqBand::Band5Ghz => WscRfBand::BAND_5_GHZ,
            FreqBand::Band60Ghz => WscRfBand::BAND_60_GHZ,
            FreqBand::UnrecognizedVariant(_) => WscRfBand::empty(),
        }
    }
}

macro_rules! impl_wire_bitmask {
    ($name:ident, $ty:ty) => {
        impl ToBytes for $name {
            fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
                self.bits().to_bytes(buffer)
            }
        }

        impl FromBytes for $name {
            fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
                Ok($name::from_bits_truncate(<$ty>::from_bytes(buffer)?))
            }
        }

        impl WireSize for $name {
            fn wire_size(&self) -> usize {
                std::mem::size_of::<$ty>()
            }
        }
    };
}

impl_wire_bitmask!(WscAuthType, u16);
impl_wire_bitmask!(WscEncrType, u16);
impl_wire_bitmask!(WscRfBand, u8);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rf_band_mapping() {
        assert_eq!(
            WscRfBand::from_freq_band(FreqBand::Band5Ghz),
            WscRfBand::BAND_5_GHZ
        );
        assert_eq!(
            WscRfBand::from_freq_band(FreqBand::UnrecognizedVariant(9)),
            WscRfBand::empty()
        );
    }

    #[test]
    fn test_auth_bitmask_wire_form() {
        let auth = WscAuthType::WPA2_PSK | WscAuthType::OPEN;
        assert_eq!(auth.bits(), 0x0021);
    }
}
