//! The LLDP bridge-discovery subset 1905 consumes and emits.
//!
//! Only three TLVs matter here: chassis ID (subtype MAC address,
//! carrying the sender's AL MAC), port ID (subtype MAC address,
//! carrying the transmitting interface MAC) and time to live. Every
//! other LLDP TLV is skipped on parse.
//!
//! LLDP TLV headers pack a 7-bit type and a 9-bit length into two
//! bytes, unlike the 1905 `type:u8 | length:u16` framing.

use std::io::Cursor;

use log::debug;

use crate::{
    consts::lldp::{
        LldpTlvType, BRIDGE_DISCOVERY_TTL, CHASSIS_ID_SUBTYPE_MAC_ADDRESS,
        PORT_ID_SUBTYPE_MAC_ADDRESS,
    },
    err::{DeError, SerError},
    read_bytes,
    types::MacAddr,
    FromBytes, ToBytes,
};

/// A parsed bridge discovery frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BridgeDiscovery {
    /// AL MAC address from the chassis ID TLV.
    pub al_mac: MacAddr,
    /// Interface MAC address from the port ID TLV.
    pub interface_mac: MacAddr,
    /// Advertised time to live in seconds.
    pub ttl: u16,
}

impl BridgeDiscovery {
    /// Build the frame 1905 sends: fixed TTL, MAC subtypes.
    pub fn new(al_mac: MacAddr, interface_mac: MacAddr) -> Self {
        BridgeDiscovery {
            al_mac,
            interface_mac,
            ttl: BRIDGE_DISCOVERY_TTL,
        }
    }
}

fn write_lldp_header(
    tlv_type: LldpTlvType,
    len: usize,
    buffer: &mut Cursor<Vec<u8>>,
) -> Result<(), SerError> {
    if len > 0x1ff {
        return Err(SerError::FieldOverflow("lldp_tlv_length"));
    }
    let type_byte: u8 = tlv_type.into();
    let header = ((type_byte as u16) << 9) | len as u16;
    header.to_bytes(buffer)
}

impl ToBytes for BridgeDiscovery {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        write_lldp_header(LldpTlvType::ChassisId, 7, buffer)?;
        CHASSIS_ID_SUBTYPE_MAC_ADDRESS.to_bytes(buffer)?;
        self.al_mac.to_bytes(buffer)?;

        write_lldp_header(LldpTlvType::PortId, 7, buffer)?;
        PORT_ID_SUBTYPE_MAC_ADDRESS.to_bytes(buffer)?;
        self.interface_mac.to_bytes(buffer)?;

        write_lldp_header(LldpTlvType::TimeToLive, 2, buffer)?;
        self.ttl.to_bytes(buffer)?;

        write_lldp_header(LldpTlvType::EndOfLldpdu, 0, buffer)
    }
}

impl FromBytes for BridgeDiscovery {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let mut al_mac = None;
        let mut interface_mac = None;
        let mut ttl = None;
        loop {
            let header = u16::from_bytes(buffer)?;
            let tlv_type = LldpTlvType::from((header >> 9) as u8);
            let len = (header & 0x1ff) as usize;
            match tlv_type {
                LldpTlvType::EndOfLldpdu => break,
                LldpTlvType::ChassisId => {
                    let payload = read_bytes(buffer, len)?;
                    if payload.first() == Some(&CHASSIS_ID_SUBTYPE_MAC_ADDRESS) && len == 7 {
                        al_mac = Some(MacAddr::from_bytes(&mut Cursor::new(&payload[1..]))?);
                    }
                }
                LldpTlvType::PortId => {
                    let payload = read_bytes(buffer, len)?;
                    if payload.first() == Some(&PORT_ID_SUBTYPE_MAC_ADDRESS) && len == 7 {
                        interface_mac =
                            Some(MacAddr::from_bytes(&mut Cursor::new(&payload[1..]))?);
                    }
                }
                LldpTlvType::TimeToLive => {
                    let payload = read_bytes(buffer, len)?;
                    if len == 2 {
                        ttl = Some(u16::from_bytes(&mut Cursor::new(payload.as_slice()))?);
                    }
                }
                LldpTlvType::UnrecognizedVariant(t) => {
                    debug!("ignoring LLDP TLV type {t}");
                    read_bytes(buffer, len)?;
                }
            }
        }
        Ok(BridgeDiscovery {
            al_mac: al_mac.ok_or(DeError::MissingRequiredTlv("chassis_id"))?,
            interface_mac: interface_mac.ok_or(DeError::MissingRequiredTlv("port_id"))?,
            ttl: ttl.ok_or(DeError::MissingRequiredTlv("time_to_live"))?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::serialize;

    #[test]
    fn test_round_trip() {
        let frame = BridgeDiscovery::new(
            MacAddr([0x02, 0xaa, 0, 0, 0, 1]),
            MacAddr([0x02, 0xaa, 0, 0, 0, 2]),
        );
        let bytes = serialize(&frame).unwrap();
        let parsed = BridgeDiscovery::from_bytes(&mut Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(parsed, frame);
        assert_eq!(parsed.ttl, BRIDGE_DISCOVERY_TTL);
    }

    #[test]
    fn test_wire_layout() {
        let frame = BridgeDiscovery::new(MacAddr([1, 2, 3, 4, 5, 6]), MacAddr([7, 8, 9, 10, 11, 12]));
        let bytes = serialize(&frame).unwrap();
        // Chassis ID: type 1 << 9 | len 7 = 0x0207, subtype 4.
        assert_eq!(&bytes[..3], &[0x02, 0x07, 0x04]);
        // Port ID: type 2 << 9 | len 7 = 0x0407, subtype 3.
        assert_eq!(&bytes[9..12], &[0x04, 0x07, 0x03]);
        // TTL: type 3 << 9 | len 2 = 0x0602, value 180.
        assert_eq!(&bytes[18..22], &[0x06, 0x02, 0x00, 0xb4]);
        // End of LLDPDU.
        assert_eq!(&bytes[22..], &[0x00, 0x00]);
    }

    #[test]
    fn test_unknown_tlvs_ignored() {
        let frame = BridgeDiscovery::new(MacAddr([1, 2, 3, 4, 5, 6]), MacAddr([7, 8, 9, 10, 11, 12]));
        let mut bytes = serialize(&frame).unwrap();
        // Splice a system-name TLV (type 5, len 3) before the end.
        let end = bytes.len() - 2;
        bytes.splice(end..end, [0x0a, 0x03, b'a', b'b', b'c']);
        let parsed = BridgeDiscovery::from_bytes(&mut Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn test_missing_port_id_is_an_error() {
        // Chassis ID and TTL only.
        let mut buffer = Cursor::new(Vec::new());
        write_lldp_header(LldpTlvType::ChassisId, 7, &mut buffer).unwrap();
        CHASSIS_ID_SUBTYPE_MAC_ADDRESS.to_bytes(&mut buffer).unwrap();
        MacAddr([1, 2, 3, 4, 5, 6]).to_bytes(&mut buffer).unwrap();
        write_lldp_header(LldpTlvType::TimeToLive, 2, &mut buffer).unwrap();
        180u16.to_bytes(&mut buffer).unwrap();
        write_lldp_header(LldpTlvType::EndOfLldpdu, 0, &mut buffer).unwrap();
        let bytes = buffer.into_inner();
        assert!(matches!(
            BridgeDiscovery::from_bytes(&mut Cursor::new(bytes.as_slice())),
            Err(DeError::MissingRequiredTlv("port_id"))
        ));
    }
}
