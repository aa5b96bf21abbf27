//! # A type safe IEEE 1905.1/1a abstraction layer
//!
//! ## Rationale
//!
//! This crate is a pure Rust implementation of the core of an IEEE
//! 1905.1/1a abstraction layer (AL) node with Wi-Fi EasyMesh
//! (Multi-AP) extensions. A 1905 AL unifies a heterogeneous set of
//! home-network interfaces (Ethernet, Wi-Fi, powerline, MoCA) into a
//! single logical node, discovers peer AL nodes, maintains a network
//! topology database, measures link metrics and bootstraps access
//! point configuration across the mesh.
//!
//! ## The project is broken down into the following modules:
//! * `consts` - all of the protocol constants wrapped into type safe
//!   enums and bit flag sets.
//! * `err` - the protocol and library-level errors encountered in the
//!   code.
//! * `tlv` - the TLV codec: every 1905 and EasyMesh TLV as a typed
//!   structure plus the [`Tlv`][crate::tlv::Tlv] tagged enum.
//! * `cmdu` - CMDU framing, validation, and forging with
//!   fragmentation.
//! * `reassembly` - receive-side fragment grouping and timeout.
//! * `lldp` - the LLDP bridge-discovery subset consumed by 1905.
//! * `mid` - message-ID allocation and duplicate suppression.
//! * `datamodel` - the topology database tracking devices, links,
//!   freshness timestamps and metrics.
//! * `platform` - the capability interface through which the AL
//!   reaches the operating system.
//! * `wsc` - the Wi-Fi simple configuration M1/M2 key agreement.
//! * `al` - the context value tying everything together, with the
//!   receive dispatcher in `dispatch` and the CMDU builders in `send`.
//!
//! ## Codec traits
//!
//! `lib.rs` at the top level contains the [`ToBytes`], [`FromBytes`]
//! and [`WireSize`] traits which provide serialization into and
//! deserialization from the big-endian 1905 wire format, along with
//! implementations for the primitive types the protocol is built
//! from. Everything that crosses the wire goes through these traits.
//!
//! ## Design decisions
//!
//! The original reference implementations of 1905 lean on global
//! state for the local device, the registrar and the message-ID
//! counter. Here all of that lives in [`al::AlContext`] which is
//! passed to each component explicitly, and the platform is an
//! injected trait object so that the whole protocol engine can be
//! driven hermetically in tests.

#[macro_use]
mod macros;

pub mod al;
pub mod autoconfig;
pub mod cmdu;
pub mod consts;
pub mod datamodel;
mod dispatch;
pub mod err;
pub mod extension;
pub mod lldp;
pub mod mid;
pub mod platform;
pub mod reassembly;
pub mod scheduler;
mod send;
pub mod tlv;
pub mod types;
pub mod wsc;

use std::io::{Cursor, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::err::{DeError, SerError};

/// Trait for serialization into the big-endian 1905 wire format.
pub trait ToBytes {
    /// Append the wire representation of `self` to `buffer`.
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError>;
}

/// Trait for deserialization from the big-endian 1905 wire format.
pub trait FromBytes: Sized {
    /// Parse a value of this type from the current position of
    /// `buffer`, advancing it past the bytes consumed.
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError>;
}

/// The size of the wire representation of an existing value.
pub trait WireSize {
    /// Number of bytes [`ToBytes::to_bytes`] will produce for `self`.
    fn wire_size(&self) -> usize;
}

impl ToBytes for u8 {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        buffer.write_u8(*self)?;
        Ok(())
    }
}

impl FromBytes for u8 {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(buffer.read_u8()?)
    }
}

impl WireSize for u8 {
    fn wire_size(&self) -> usize {
        1
    }
}

impl ToBytes for u16 {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        buffer.write_u16::<BigEndian>(*self)?;
        Ok(())
    }
}

impl FromBytes for u16 {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(buffer.read_u16::<BigEndian>()?)
    }
}

impl WireSize for u16 {
    fn wire_size(&self) -> usize {
        2
    }
}

impl ToBytes for u32 {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        buffer.write_u32::<BigEndian>(*self)?;
        Ok(())
    }
}

impl FromBytes for u32 {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        Ok(buffer.read_u32::<BigEndian>()?)
    }
}

impl WireSize for u32 {
    fn wire_size(&self) -> usize {
        4
    }
}

impl<const N: usize> ToBytes for [u8; N] {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        buffer.write_all(self)?;
        Ok(())
    }
}

impl<const N: usize> FromBytes for [u8; N] {
    fn from_bytes(buffer: &mut Cursor<&[u8]>) -> Result<Self, DeError> {
        let mut array = [0u8; N];
        buffer.read_exact(&mut array)?;
        Ok(array)
    }
}

impl<const N: usize> WireSize for [u8; N] {
    fn wire_size(&self) -> usize {
        N
    }
}

impl ToBytes for Vec<u8> {
    fn to_bytes(&self, buffer: &mut Cursor<Vec<u8>>) -> Result<(), SerError> {
        buffer.write_all(self.as_slice())?;
        Ok(())
    }
}

impl WireSize for Vec<u8> {
    fn wire_size(&self) -> usize {
        self.len()
    }
}

/// Read exactly `len` bytes from the current position of `buffer`.
pub(crate) fn read_bytes(buffer: &mut Cursor<&[u8]>, len: usize) -> Result<Vec<u8>, DeError> {
    let mut bytes = vec![0u8; len];
    buffer.read_exact(&mut bytes)?;
    Ok(bytes)
}

/// Serialize a value into a fresh byte vector.
pub(crate) fn serialize<T>(value: &T) -> Result<Vec<u8>, SerError>
where
    T: ToBytes,
{
    let mut buffer = Cursor::new(Vec::new());
    value.to_bytes(&mut buffer)?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_u16_big_endian() {
        let v = 0x893au16;
        assert_eq!(serialize(&v).unwrap(), &[0x89, 0x3a]);

        let bytes: &[u8] = &[0x89, 0x3a];
        let de = u16::from_bytes(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(de, 0x893a);
    }

    #[test]
    fn test_u32_big_endian() {
        let v = 0x0102_0304u32;
        assert_eq!(serialize(&v).unwrap(), &[1, 2, 3, 4]);

        let bytes: &[u8] = &[1, 2, 3, 4];
        assert_eq!(u32::from_bytes(&mut Cursor::new(bytes)).unwrap(), v);
    }

    #[test]
    fn test_array_round_trip() {
        let v = [1u8, 2, 3, 4, 5, 6];
        let ser = serialize(&v).unwrap();
        assert_eq!(ser.as_slice(), &v);
        let de = <[u8; 6]>::from_bytes(&mut Cursor::new(ser.as_slice())).unwrap();
        assert_eq!(de, v);
    }

    #[test]
    fn test_short_buffer_is_an_error() {
        let bytes: &[u8] = &[0x01];
        assert!(u16::from_bytes(&mut Cursor::new(bytes)).is_err());
        assert!(<[u8; 6]>::from_bytes(&mut Cursor::new(bytes)).is_err());
    }
}
