//! Wi-Fi simple configuration M1/M2 key agreement.
//!
//! One CMDU type embeds "M1" and "M2" messages from the Wi-Fi simple
//! configuration standard. Building and processing them is completely
//! independent from 1905 framing, so it all lives here:
//!
//! * the enrollee builds an M1 with [`build_m1`] and keeps the
//!   returned [`EnrolleeSecret`] until the M2 arrives, then applies
//!   it with [`process_m2`];
//! * the registrar parses a received M1 with [`parse_m1`] and answers
//!   with [`build_m2`].
//!
//! Key derivation follows the WSC specification: a 1536-bit MODP
//! Diffie-Hellman exchange, SHA-256 of the shared secret as DHKey,
//! the KDK from HMAC over the two nonces and the enrollee MAC, and
//! the KDF split into AuthKey, KeyWrapKey and EMSK. The credential
//! settings travel AES-128-CBC encrypted under KeyWrapKey with a key
//! wrap authenticator inside and an HMAC authenticator over M1 and M2
//! outside.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes128;
use derive_builder::Builder;
use getset::Getters;
use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::{
    consts::wsc::{
        WscAttrType, WscAuthType, WscEncrType, WscMessageType, WscRfBand, CONFIG_METHOD_VIRT_PUSH_BUTTON,
        CONNECTION_TYPE_ESS, DEVICE_PASSWORD_PUSH_BUTTON, WSC_STATE_NOT_CONFIGURED, WSC_VERSION,
    },
    err::WscError,
    types::MacAddr,
};

type HmacSha256 = Hmac<Sha256>;
type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// The 1536-bit MODP group prime (RFC 3526, group 5) the WSC
/// Diffie-Hellman exchange uses.
const DH_PRIME: [u8; 192] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xc9, 0x0f, 0xda, 0xa2, 0x21, 0x68, 0xc2,
    0x34, 0xc4, 0xc6, 0x62, 0x8b, 0x80, 0xdc, 0x1c, 0xd1, 0x29, 0x02, 0x4e, 0x08, 0x8a, 0x67,
    0xcc, 0x74, 0x02, 0x0b, 0xbe, 0xa6, 0x3b, 0x13, 0x9b, 0x22, 0x51, 0x4a, 0x08, 0x79, 0x8e,
    0x34, 0x04, 0xdd, 0xef, 0x95, 0x19, 0xb3, 0xcd, 0x3a, 0x43, 0x1b, 0x30, 0x2b, 0x0a, 0x6d,
    0xf2, 0x5f, 0x14, 0x37, 0x4f, 0xe1, 0x35, 0x6d, 0x6d, 0x51, 0xc2, 0x45, 0xe4, 0x85, 0xb5,
    0x76, 0x62, 0x5e, 0x7e, 0xc6, 0xf4, 0x4c, 0x42, 0xe9, 0xa6, 0x37, 0xed, 0x6b, 0x0b, 0xff,
    0x5c, 0xb6, 0xf4, 0x06, 0xb7, 0xed, 0xee, 0x38, 0x6b, 0xfb, 0x5a, 0x89, 0x9f, 0xa5, 0xae,
    0x9f, 0x24, 0x11, 0x7c, 0x4b, 0x1f, 0xe6, 0x49, 0x28, 0x66, 0x51, 0xec, 0xe4, 0x5b, 0x3d,
    0xc2, 0x00, 0x7c, 0xb8, 0xa1, 0x63, 0xbf, 0x05, 0x98, 0xda, 0x48, 0x36, 0x1c, 0x55, 0xd3,
    0x9a, 0x69, 0x16, 0x3f, 0xa8, 0xfd, 0x24, 0xcf, 0x5f, 0x83, 0x65, 0x5d, 0x23, 0xdc, 0xa3,
    0xad, 0x96, 0x1c, 0x62, 0xf3, 0x56, 0x20, 0x85, 0x52, 0xbb, 0x9e, 0xd5, 0x29, 0x07, 0x70,
    0x96, 0x96, 0x6d, 0x67, 0x0c, 0x35, 0x4e, 0x4a, 0xbc, 0x98, 0x04, 0xf1, 0x74, 0x6c, 0x08,
    0xca, 0x23, 0x73, 0x27, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// KDF personalization string from the WSC specification.
const KDF_LABEL: &[u8] = b"Wi-Fi Easy and Secure Key Derivation";

/// Total KDF output: AuthKey (256) + KeyWrapKey (128) + EMSK (256)
/// bits.
const KDF_TOTAL_BITS: u32 = 640;

/// Device description placed into M1 and M2 messages.
#[derive(Builder, Getters, Clone, Debug, Default, Eq, PartialEq)]
#[builder(pattern = "owned", default)]
pub struct WscDeviceInfo {
    /// Device name attribute.
    #[getset(get = "pub")]
    device_name: String,
    /// Manufacturer attribute.
    #[getset(get = "pub")]
    manufacturer: String,
    /// Model name attribute.
    #[getset(get = "pub")]
    model_name: String,
    /// Model number attribute.
    #[getset(get = "pub")]
    model_number: String,
    /// Serial number attribute.
    #[getset(get = "pub")]
    serial_number: String,
    /// UUID-E/UUID-R attribute value.
    #[getset(get = "pub")]
    uuid: [u8; 16],
}

/// The secret half of an in-flight enrollment, kept by the radio
/// between sending M1 and processing M2.
#[derive(Clone)]
pub struct EnrolleeSecret {
    private_key: Vec<u8>,
}

/// A network credential as carried inside M2 encrypted settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Credential {
    /// SSID of the configured network.
    pub ssid: Vec<u8>,
    /// Authentication type.
    pub auth: WscAuthType,
    /// Encryption type.
    pub encr: WscEncrType,
    /// The network key.
    pub network_key: Vec<u8>,
    /// BSSID the credential applies to.
    pub bssid: MacAddr,
}

/// The fields a registrar needs out of a received M1.
#[derive(Clone, Debug)]
pub struct M1Info {
    /// Enrollee MAC address.
    pub mac: MacAddr,
    /// Enrollee nonce.
    pub nonce: [u8; 16],
    /// Enrollee Diffie-Hellman public key.
    pub public_key: Vec<u8>,
    /// Authentication types the enrollee supports.
    pub auth_types: WscAuthType,
    /// Encryption types the enrollee supports.
    pub encr_types: WscEncrType,
    /// RF bands of the enrollee radio.
    pub rf_bands: WscRfBand,
}

fn put_attr(buffer: &mut Vec<u8>, attr: WscAttrType, value: &[u8]) {
    let id: u16 = attr.into();
    buffer.extend_from_slice(&id.to_be_bytes());
    buffer.extend_from_slice(&(value.len() as u16).to_be_bytes());
    buffer.extend_from_slice(value);
}

/// Parse an attribute stream, preserving order.
fn parse_attrs(frame: &[u8]) -> Result<Vec<(u16, Vec<u8>)>, WscError> {
    let mut attrs = Vec::new();
    let mut offset = 0usize;
    while offset + 4 <= frame.len() {
        let id = u16::from_be_bytes([frame[offset], frame[offset + 1]]);
        let len = u16::from_be_bytes([frame[offset + 2], frame[offset + 3]]) as usize;
        offset += 4;
        if offset + len > frame.len() {
            return Err(WscError::MalformedAttribute(id));
        }
        attrs.push((id, frame[offset..offset + len].to_vec()));
        offset += len;
    }
    Ok(attrs)
}

fn find_attr<'a>(attrs: &'a [(u16, Vec<u8>)], attr: WscAttrType) -> Option<&'a [u8]> {
    let id: u16 = attr.into();
    attrs
        .iter()
        .find(|(a, _)| *a == id)
        .map(|(_, v)| v.as_slice())
}

fn require_attr<'a>(attrs: &'a [(u16, Vec<u8>)], attr: WscAttrType) -> Result<&'a [u8], WscError> {
    find_attr(attrs, attr).ok_or(WscError::MissingAttribute(attr.into()))
}

fn attr_array<const N: usize>(value: &[u8], attr: WscAttrType) -> Result<[u8; N], WscError> {
    value
        .try_into()
        .map_err(|_| WscError::MalformedAttribute(attr.into()))
}

fn attr_u16(value: &[u8], attr: WscAttrType) -> Result<u16, WscError> {
    Ok(u16::from_be_bytes(attr_array::<2>(value, attr)?))
}

/// Distinguish M1 from M2 by the message type attribute; the WSC TLV
/// payload is otherwise opaque.
pub fn wsc_message_type(frame: &[u8]) -> Result<WscMessageType, WscError> {
    let attrs = parse_attrs(frame)?;
    let value = require_attr(&attrs, WscAttrType::MessageType)?;
    match value.first().copied().map(WscMessageType::from) {
        Some(t @ WscMessageType::M1) | Some(t @ WscMessageType::M2) => Ok(t),
        _ => Err(WscError::UnknownMessageType),
    }
}

fn generate_keypair() -> (Vec<u8>, Vec<u8>) {
    let mut private = vec![0u8; 24];
    rand::thread_rng().fill_bytes(&mut private);
    let prime = BigUint::from_bytes_be(&DH_PRIME);
    let generator = BigUint::from(2u8);
    let public = generator.modpow(&BigUint::from_bytes_be(&private), &prime);
    (private, left_pad(&public.to_bytes_be(), 192))
}

fn left_pad(bytes: &[u8], len: usize) -> Vec<u8> {
    if bytes.len() >= len {
        return bytes.to_vec();
    }
    let mut padded = vec![0u8; len - bytes.len()];
    padded.extend_from_slice(bytes);
    padded
}

fn hmac_sha256(key: &[u8], chunks: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    for chunk in chunks {
        mac.update(chunk);
    }
    mac.finalize().into_bytes().into()
}

/// AuthKey, KeyWrapKey and EMSK for one enrollment.
struct SessionKeys {
    auth_key: [u8; 32],
    key_wrap_key: [u8; 16],
    #[allow(dead_code)]
    emsk: [u8; 32],
}

fn derive_session_keys(
    own_private: &[u8],
    peer_public: &[u8],
    enrollee_nonce: &[u8; 16],
    enrollee_mac: MacAddr,
    registrar_nonce: &[u8; 16],
) -> SessionKeys {
    let prime = BigUint::from_bytes_be(&DH_PRIME);
    let shared = BigUint::from_bytes_be(peer_public)
        .modpow(&BigUint::from_bytes_be(own_private), &prime);
    let dh_key: [u8; 32] = Sha256::digest(left_pad(&shared.to_bytes_be(), 192)).into();

    let kdk = hmac_sha256(
        &dh_key,
        &[enrollee_nonce, &enrollee_mac.octets(), registrar_nonce],
    );

    let mut out = Vec::with_capacity(96);
    for i in 1u32..=3 {
        out.extend_from_slice(&hmac_sha256(
            &kdk,
            &[&i.to_be_bytes(), KDF_LABEL, &KDF_TOTAL_BITS.to_be_bytes()],
        ));
    }

    SessionKeys {
        auth_key: out[..32].try_into().expect("kdf output sliced"),
        key_wrap_key: out[32..48].try_into().expect("kdf output sliced"),
        emsk: out[48..80].try_into().expect("kdf output sliced"),
    }
}

fn put_device_attrs(msg: &mut Vec<u8>, device: &WscDeviceInfo) {
    put_attr(msg, WscAttrType::Manufacturer, device.manufacturer().as_bytes());
    put_attr(msg, WscAttrType::ModelName, device.model_name().as_bytes());
    put_attr(msg, WscAttrType::ModelNumber, device.model_number().as_bytes());
    put_attr(msg, WscAttrType::SerialNumber, device.serial_number().as_bytes());
    // Primary device type: category "network infrastructure", WFA
    // OUI, subcategory "router".
    put_attr(
        msg,
        WscAttrType::PrimaryDeviceType,
        &[0x00, 0x06, 0x00, 0x50, 0xf2, 0x04, 0x00, 0x01],
    );
    put_attr(msg, WscAttrType::DeviceName, device.device_name().as_bytes());
}

/// Build an M1 message for one radio. Returns the frame together with
/// the enrollee secret that must be kept until M2 arrives.
pub fn build_m1(
    mac: MacAddr,
    rf_bands: WscRfBand,
    auth_types: WscAuthType,
    encr_types: WscEncrType,
    device: &WscDeviceInfo,
) -> (Vec<u8>, EnrolleeSecret) {
    let (private_key, public_key) = generate_keypair();
    let mut nonce = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut nonce);

    let mut msg = Vec::with_capacity(512);
    put_attr(&mut msg, WscAttrType::Version, &[WSC_VERSION]);
    put_attr(
        &mut msg,
        WscAttrType::MessageType,
        &[WscMessageType::M1.into()],
    );
    put_attr(&mut msg, WscAttrType::UuidE, device.uuid());
    put_attr(&mut msg, WscAttrType::MacAddress, &mac.octets());
    put_attr(&mut msg, WscAttrType::EnrolleeNonce, &nonce);
    put_attr(&mut msg, WscAttrType::PublicKey, &public_key);
    put_attr(
        &mut msg,
        WscAttrType::AuthTypeFlags,
        &auth_types.bits().to_be_bytes(),
    );
    put_attr(
        &mut msg,
        WscAttrType::EncryptionTypeFlags,
        &encr_types.bits().to_be_bytes(),
    );
    put_attr(&mut msg, WscAttrType::ConnectionTypeFlags, &[CONNECTION_TYPE_ESS]);
    put_attr(
        &mut msg,
        WscAttrType::ConfigMethods,
        &CONFIG_METHOD_VIRT_PUSH_BUTTON.to_be_bytes(),
    );
    put_attr(&mut msg, WscAttrType::WscState, &[WSC_STATE_NOT_CONFIGURED]);
    put_device_attrs(&mut msg, device);
    put_attr(&mut msg, WscAttrType::RfBands, &[rf_bands.bits()]);
    put_attr(&mut msg, WscAttrType::AssociationState, &[0x00, 0x00]);
    put_attr(
        &mut msg,
        WscAttrType::DevicePasswordId,
        &DEVICE_PASSWORD_PUSH_BUTTON.to_be_bytes(),
    );
    put_attr(&mut msg, WscAttrType::ConfigurationError, &[0x00, 0x00]);
    put_attr(&mut msg, WscAttrType::OsVersion, &[0x80, 0x00, 0x00, 0x00]);

    (msg, EnrolleeSecret { private_key })
}

/// Extract the registrar-relevant fields of an M1 frame.
pub fn parse_m1(frame: &[u8]) -> Result<M1Info, WscError> {
    let attrs = parse_attrs(frame)?;
    let mac = MacAddr(attr_array::<6>(
        require_attr(&attrs, WscAttrType::MacAddress)?,
        WscAttrType::MacAddress,
    )?);
    let nonce = attr_array::<16>(
        require_attr(&attrs, WscAttrType::EnrolleeNonce)?,
        WscAttrType::EnrolleeNonce,
    )?;
    let public_key = require_attr(&attrs, WscAttrType::PublicKey)?.to_vec();
    let auth_types = WscAuthType::from_bits_truncate(attr_u16(
        require_attr(&attrs, WscAttrType::AuthTypeFlags)?,
        WscAttrType::AuthTypeFlags,
    )?);
    let encr_types = WscEncrType::from_bits_truncate(attr_u16(
        require_attr(&attrs, WscAttrType::EncryptionTypeFlags)?,
        WscAttrType::EncryptionTypeFlags,
    )?);
    let rf_bands = find_attr(&attrs, WscAttrType::RfBands)
        .and_then(|v| v.first().copied())
        .map(WscRfBand::from_bits_truncate)
        .unwrap_or_else(WscRfBand::empty);
    Ok(M1Info {
        mac,
        nonce,
        public_key,
        auth_types,
        encr_types,
        rf_bands,
    })
}

fn encrypt_settings(keys: &SessionKeys, plaintext: &[u8]) -> Vec<u8> {
    let mut settings = plaintext.to_vec();
    let kwa = hmac_sha256(&keys.auth_key, &[settings.as_slice()]);
    put_attr(
        &mut settings,
        WscAttrType::KeyWrapAuthenticator,
        &kwa[..8],
    );

    let mut iv = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut iv);
    let ciphertext = Aes128CbcEnc::new(&keys.key_wrap_key.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(&settings);

    let mut envelope = iv.to_vec();
    envelope.extend_from_slice(&ciphertext);
    envelope
}

fn decrypt_settings(keys: &SessionKeys, envelope: &[u8]) -> Result<Vec<u8>, WscError> {
    if envelope.len() < 32 {
        return Err(WscError::DecryptionFailure);
    }
    let (iv, ciphertext) = envelope.split_at(16);
    let iv: [u8; 16] = iv.try_into().expect("split at 16");
    let mut settings = Aes128CbcDec::new(&keys.key_wrap_key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| WscError::DecryptionFailure)?;

    // The key wrap authenticator is the last attribute; verify it
    // over everything that precedes it.
    let attrs = parse_attrs(&settings)?;
    let kwa = require_attr(&attrs, WscAttrType::KeyWrapAuthenticator)?.to_vec();
    settings.truncate(settings.len() - (4 + kwa.len()));
    let expected = hmac_sha256(&keys.auth_key, &[settings.as_slice()]);
    if kwa != expected[..8] {
        return Err(WscError::BadKeyWrapAuthenticator);
    }
    Ok(settings)
}

/// Build an M2 answering the given M1 with one credential.
pub fn build_m2(
    m1_frame: &[u8],
    m1: &M1Info,
    credential: &Credential,
    device: &WscDeviceInfo,
) -> Result<Vec<u8>, WscError> {
    let (private_key, public_key) = generate_keypair();
    let mut registrar_nonce = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut registrar_nonce);

    let keys = derive_session_keys(
        &private_key,
        &m1.public_key,
        &m1.nonce,
        m1.mac,
        &registrar_nonce,
    );

    let mut msg = Vec::with_capacity(768);
    put_attr(&mut msg, WscAttrType::Version, &[WSC_VERSION]);
    put_attr(
        &mut msg,
        WscAttrType::MessageType,
        &[WscMessageType::M2.into()],
    );
    put_attr(&mut msg, WscAttrType::EnrolleeNonce, &m1.nonce);
    put_attr(&mut msg, WscAttrType::RegistrarNonce, &registrar_nonce);
    put_attr(&mut msg, WscAttrType::UuidR, device.uuid());
    put_attr(&mut msg, WscAttrType::PublicKey, &public_key);
    put_attr(
        &mut msg,
        WscAttrType::AuthTypeFlags,
        &credential.auth.bits().to_be_bytes(),
    );
    put_attr(
        &mut msg,
        WscAttrType::EncryptionTypeFlags,
        &credential.encr.bits().to_be_bytes(),
    );
    put_attr(&mut msg, WscAttrType::ConnectionTypeFlags, &[CONNECTION_TYPE_ESS]);
    put_attr(
        &mut msg,
        WscAttrType::ConfigMethods,
        &CONFIG_METHOD_VIRT_PUSH_BUTTON.to_be_bytes(),
    );
    put_device_attrs(&mut msg, device);
    put_attr(&mut msg, WscAttrType::RfBands, &[m1.rf_bands.bits()]);
    put_attr(&mut msg, WscAttrType::AssociationState, &[0x00, 0x00]);
    put_attr(&mut msg, WscAttrType::ConfigurationError, &[0x00, 0x00]);
    put_attr(
        &mut msg,
        WscAttrType::DevicePasswordId,
        &DEVICE_PASSWORD_PUSH_BUTTON.to_be_bytes(),
    );
    put_attr(&mut msg, WscAttrType::OsVersion, &[0x80, 0x00, 0x00, 0x00]);

    let mut settings = Vec::with_capacity(128);
    put_attr(&mut settings, WscAttrType::Ssid, &credential.ssid);
    put_attr(
        &mut settings,
        WscAttrType::AuthType,
        &credential.auth.bits().to_be_bytes(),
    );
    put_attr(
        &mut settings,
        WscAttrType::EncryptionType,
        &credential.encr.bits().to_be_bytes(),
    );
    put_attr(&mut settings, WscAttrType::NetworkKey, &credential.network_key);
    put_attr(&mut settings, WscAttrType::MacAddress, &credential.bssid.octets());
    put_attr(
        &mut msg,
        WscAttrType::EncryptedSettings,
        &encrypt_settings(&keys, &settings),
    );

    let authenticator = hmac_sha256(&keys.auth_key, &[m1_frame, msg.as_slice()]);
    put_attr(&mut msg, WscAttrType::Authenticator, &authenticator[..8]);

    Ok(msg)
}

/// Process a received M2 against the stored M1 and enrollee secret,
/// yielding the configured credential.
///
/// Any failure leaves the enrollee state untouched so that a retry
/// with a fresh M2 remains possible.
pub fn process_m2(
    m1_frame: &[u8],
    secret: &EnrolleeSecret,
    m2_frame: &[u8],
) -> Result<Credential, WscError> {
    let m1 = parse_m1(m1_frame)?;
    let attrs = parse_attrs(m2_frame)?;

    let registrar_nonce = attr_array::<16>(
        require_attr(&attrs, WscAttrType::RegistrarNonce)?,
        WscAttrType::RegistrarNonce,
    )?;
    let registrar_public = require_attr(&attrs, WscAttrType::PublicKey)?;
    let authenticator = require_attr(&attrs, WscAttrType::Authenticator)?.to_vec();

    let keys = derive_session_keys(
        &secret.private_key,
        registrar_public,
        &m1.nonce,
        m1.mac,
        &registrar_nonce,
    );

    // The authenticator covers M1 plus M2 up to (excluding) the
    // authenticator attribute itself, which is last.
    if authenticator.len() != 8 || m2_frame.len() < 4 + authenticator.len() {
        return Err(WscError::MalformedAttribute(WscAttrType::Authenticator.into()));
    }
    let m2_body = &m2_frame[..m2_frame.len() - (4 + authenticator.len())];
    let expected = hmac_sha256(&keys.auth_key, &[m1_frame, m2_body]);
    if authenticator != expected[..8] {
        return Err(WscError::BadAuthenticator);
    }

    let envelope = require_attr(&attrs, WscAttrType::EncryptedSettings)?;
    let settings = decrypt_settings(&keys, envelope)?;
    let inner = parse_attrs(&settings)?;

    let ssid = require_attr(&inner, WscAttrType::Ssid)?.to_vec();
    let auth = WscAuthType::from_bits_truncate(attr_u16(
        require_attr(&inner, WscAttrType::AuthType)?,
        WscAttrType::AuthType,
    )?);
    let encr = WscEncrType::from_bits_truncate(attr_u16(
        require_attr(&inner, WscAttrType::EncryptionType)?,
        WscAttrType::EncryptionType,
    )?);
    let network_key = require_attr(&inner, WscAttrType::NetworkKey)?.to_vec();
    let bssid = find_attr(&inner, WscAttrType::MacAddress)
        .map(|v| -> Result<MacAddr, WscError> {
            Ok(MacAddr(attr_array::<6>(v, WscAttrType::MacAddress)?))
        })
        .transpose()?
        .unwrap_or(MacAddr::ZERO);

    Ok(Credential {
        ssid,
        auth,
        encr,
        network_key,
        bssid,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn device() -> WscDeviceInfo {
        WscDeviceInfoBuilder::default()
            .device_name("al-node".to_string())
            .manufacturer("acme".to_string())
            .model_name("router9000".to_string())
            .serial_number("0001".to_string())
            .uuid([7u8; 16])
            .build()
            .unwrap()
    }

    fn credential() -> Credential {
        Credential {
            ssid: b"Home".to_vec(),
            auth: WscAuthType::WPA2_PSK,
            encr: WscEncrType::AES,
            network_key: b"correct horse battery staple".to_vec(),
            bssid: MacAddr([0x02, 0xbb, 0, 0, 0, 1]),
        }
    }

    const ENROLLEE_MAC: MacAddr = MacAddr([0x02, 0xaa, 0, 0, 0, 1]);

    #[test]
    fn test_message_type_detection() {
        let (m1, _) = build_m1(
            ENROLLEE_MAC,
            WscRfBand::BAND_5_GHZ,
            WscAuthType::WPA2_PSK,
            WscEncrType::AES,
            &device(),
        );
        assert_eq!(wsc_message_type(&m1).unwrap(), WscMessageType::M1);
        assert!(wsc_message_type(&[0u8; 4]).is_err());
    }

    #[test]
    fn test_m1_parses_back() {
        let (m1, _) = build_m1(
            ENROLLEE_MAC,
            WscRfBand::BAND_2_4_GHZ | WscRfBand::BAND_5_GHZ,
            WscAuthType::WPA2_PSK | WscAuthType::OPEN,
            WscEncrType::AES,
            &device(),
        );
        let info = parse_m1(&m1).unwrap();
        assert_eq!(info.mac, ENROLLEE_MAC);
        assert_eq!(info.public_key.len(), 192);
        assert!(info.auth_types.contains(WscAuthType::WPA2_PSK));
        assert!(info.rf_bands.contains(WscRfBand::BAND_5_GHZ));
    }

    #[test]
    fn test_credential_round_trip() {
        let (m1, secret) = build_m1(
            ENROLLEE_MAC,
            WscRfBand::BAND_5_GHZ,
            WscAuthType::WPA2_PSK,
            WscEncrType::AES,
            &device(),
        );
        let info = parse_m1(&m1).unwrap();
        let m2 = build_m2(&m1, &info, &credential(), &device()).unwrap();
        assert_eq!(wsc_message_type(&m2).unwrap(), WscMessageType::M2);

        let received = process_m2(&m1, &secret, &m2).unwrap();
        assert_eq!(received, credential());
    }

    #[test]
    fn test_tampered_m2_is_rejected() {
        let (m1, secret) = build_m1(
            ENROLLEE_MAC,
            WscRfBand::BAND_5_GHZ,
            WscAuthType::WPA2_PSK,
            WscEncrType::AES,
            &device(),
        );
        let info = parse_m1(&m1).unwrap();
        let mut m2 = build_m2(&m1, &info, &credential(), &device()).unwrap();
        // Flip one bit somewhere in the middle of the message.
        let index = m2.len() / 2;
        m2[index] ^= 0x01;
        assert!(process_m2(&m1, &secret, &m2).is_err());
    }

    #[test]
    fn test_wrong_secret_fails_authentication() {
        let (m1, _) = build_m1(
            ENROLLEE_MAC,
            WscRfBand::BAND_5_GHZ,
            WscAuthType::WPA2_PSK,
            WscEncrType::AES,
            &device(),
        );
        let (_, other_secret) = build_m1(
            ENROLLEE_MAC,
            WscRfBand::BAND_5_GHZ,
            WscAuthType::WPA2_PSK,
            WscEncrType::AES,
            &device(),
        );
        let info = parse_m1(&m1).unwrap();
        let m2 = build_m2(&m1, &info, &credential(), &device()).unwrap();
        assert!(matches!(
            process_m2(&m1, &other_secret, &m2),
            Err(WscError::BadAuthenticator)
        ));
    }
}
