//! This is the module that contains the error types used in `mesh1905`
//!
//! There are four main types:
//! * [`SerError`] - error while serializing a TLV, CMDU or LLDP
//!   payload.
//! * [`DeError`] - error while deserializing.
//! * [`WscError`] - failure while building or processing a Wi-Fi
//!   simple configuration message.
//! * [`AlError`] - errors returned by the abstraction layer runtime
//!   ([`AlContext`][crate::al::AlContext]).
//!
//! # Design decisions
//! All errors implement [`std::error::Error`] in an attempt to allow
//! them to be used in conjunction with [`Result`] for easier error
//! management even at the protocol error level.
//!
//! Per the 1905 standard there is no negative acknowledgment on the
//! wire; every per-CMDU error stays local. The receive path therefore
//! logs and converts most of these into silent drops.

use std::{
    error::Error,
    fmt::{self, Display},
    io::{self, ErrorKind},
    string::FromUtf8Error,
    sync::Arc,
};

/// Arbitrary error message.
#[derive(Clone, Debug)]
pub struct MsgError(String);

impl MsgError {
    /// Construct a new error message.
    pub fn new<D>(d: D) -> Self
    where
        D: Display,
    {
        MsgError(d.to_string())
    }
}

impl Display for MsgError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for MsgError {}

/// Serialization error
#[derive(Clone, Debug)]
pub enum SerError {
    /// Abitrary error message.
    Msg(MsgError),
    /// IO error.
    Io(ErrorKind),
    /// A TLV that is not permitted for the CMDU type being forged.
    UnexpectedTlv(u8),
    /// A value does not fit in the field the wire format gives it.
    FieldOverflow(&'static str),
}

impl SerError {
    /// Create a new error with the given message as description.
    pub fn new<D>(msg: D) -> Self
    where
        D: Display,
    {
        SerError::Msg(MsgError::new(msg))
    }
}

impl Display for SerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SerError::Msg(ref s) => write!(f, "{s}"),
            SerError::Io(ref err) => write!(f, "IO error: {err}"),
            SerError::UnexpectedTlv(t) => {
                write!(f, "TLV type {t} is not permitted in this CMDU")
            }
            SerError::FieldOverflow(field) => {
                write!(f, "value too large for wire field {field}")
            }
        }
    }
}

impl Error for SerError {}

impl From<io::Error> for SerError {
    fn from(err: io::Error) -> Self {
        SerError::Io(err.kind())
    }
}

impl From<MsgError> for SerError {
    fn from(e: MsgError) -> Self {
        SerError::Msg(e)
    }
}

/// Deserialization error
#[derive(Clone, Debug)]
pub enum DeError {
    /// Abitrary error message.
    Msg(MsgError),
    /// IO error, including truncated buffers.
    Io(ErrorKind),
    /// String UTF conversion error.
    Utf8(FromUtf8Error),
    /// A TLV length field overruns the enclosing stream.
    TlvLengthOverrun,
    /// A TLV required for the CMDU type is absent.
    MissingRequiredTlv(&'static str),
    /// The fragments of a reassembly group disagree on a header field.
    InconsistentFragments(&'static str),
    /// Two fragments carried the same fragment-ID, or more than one
    /// carried the last-fragment flag.
    DuplicateFragment,
}

impl DeError {
    /// Create new error from a type implementing [`Display`]
    pub fn new<D>(s: D) -> Self
    where
        D: Display,
    {
        DeError::Msg(MsgError::new(s))
    }
}

impl Display for DeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeError::Msg(s) => write!(f, "{s}"),
            DeError::Io(err) => write!(f, "IO error: {err}"),
            DeError::Utf8(err) => write!(f, "UTF8 error: {err}"),
            DeError::TlvLengthOverrun => {
                write!(f, "TLV length overruns the enclosing stream")
            }
            DeError::MissingRequiredTlv(name) => {
                write!(f, "required TLV {name} missing from CMDU")
            }
            DeError::InconsistentFragments(field) => {
                write!(f, "fragments disagree on header field {field}")
            }
            DeError::DuplicateFragment => {
                write!(f, "duplicate fragment-ID or last-fragment flag")
            }
        }
    }
}

impl Error for DeError {}

impl From<io::Error> for DeError {
    fn from(err: io::Error) -> Self {
        DeError::Io(err.kind())
    }
}

impl From<FromUtf8Error> for DeError {
    fn from(err: FromUtf8Error) -> Self {
        DeError::Utf8(err)
    }
}

impl From<MsgError> for DeError {
    fn from(e: MsgError) -> Self {
        DeError::Msg(e)
    }
}

/// Failure while building or processing a WSC message.
///
/// These never tear the enrollment down for good: the enrollee state
/// machine stays in its current state and retries.
#[derive(Clone, Debug)]
pub enum WscError {
    /// An attribute required by the message type is missing.
    MissingAttribute(u16),
    /// An attribute carried a value of unexpected size or content.
    MalformedAttribute(u16),
    /// The message authenticator did not verify.
    BadAuthenticator,
    /// The key wrap authenticator inside the encrypted settings did
    /// not verify.
    BadKeyWrapAuthenticator,
    /// The encrypted settings envelope could not be decrypted.
    DecryptionFailure,
    /// The frame is not a WSC message this node understands.
    UnknownMessageType,
}

impl Display for WscError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WscError::MissingAttribute(id) => {
                write!(f, "WSC attribute {id:#06x} missing")
            }
            WscError::MalformedAttribute(id) => {
                write!(f, "WSC attribute {id:#06x} malformed")
            }
            WscError::BadAuthenticator => write!(f, "WSC authenticator mismatch"),
            WscError::BadKeyWrapAuthenticator => {
                write!(f, "WSC key wrap authenticator mismatch")
            }
            WscError::DecryptionFailure => {
                write!(f, "WSC encrypted settings could not be decrypted")
            }
            WscError::UnknownMessageType => write!(f, "unknown WSC message type"),
        }
    }
}

impl Error for WscError {}

/// General abstraction layer error
#[derive(Clone, Debug)]
pub enum AlError {
    /// Variant for [`String`]-based messages.
    Msg(MsgError),
    /// A serialization error.
    Ser(SerError),
    /// A deserialization error.
    De(DeError),
    /// A WSC key agreement error.
    Wsc(WscError),
    /// IO error.
    Io(Arc<io::Error>),
    /// The send worker has shut down and no more frames can be
    /// transmitted.
    SendWorkerGone,
}

impl AlError {
    /// Create new error from a data type implementing [`Display`]
    pub fn new<D>(s: D) -> Self
    where
        D: Display,
    {
        AlError::Msg(MsgError::new(s))
    }
}

impl From<SerError> for AlError {
    fn from(err: SerError) -> Self {
        AlError::Ser(err)
    }
}

impl From<DeError> for AlError {
    fn from(err: DeError) -> Self {
        AlError::De(err)
    }
}

impl From<WscError> for AlError {
    fn from(err: WscError) -> Self {
        AlError::Wsc(err)
    }
}

impl From<io::Error> for AlError {
    fn from(err: io::Error) -> Self {
        AlError::Io(Arc::new(err))
    }
}

impl From<MsgError> for AlError {
    fn from(e: MsgError) -> Self {
        AlError::Msg(e)
    }
}

impl Display for AlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AlError::Msg(ref msg) => write!(f, "{msg}"),
            AlError::Ser(ref err) => write!(f, "Serialization error: {err}"),
            AlError::De(ref err) => write!(f, "Deserialization error: {err}"),
            AlError::Wsc(ref err) => write!(f, "WSC error: {err}"),
            AlError::Io(ref err) => write!(f, "IO error: {err}"),
            AlError::SendWorkerGone => {
                write!(f, "send worker channel closed")
            }
        }
    }
}

impl Error for AlError {}
