//! AP-autoconfiguration controller state.
//!
//! The registrar side is a static set of credential profiles; the
//! enrollee side is one small state machine per radio:
//!
//! ```text
//! IDLE -> SEARCH_SENT -> M1_SENT -> CONFIGURED
//! ```
//!
//! A timeout in SEARCH_SENT or M1_SENT falls back to IDLE with
//! exponential backoff (5 s doubling up to 60 s); CONFIGURED is
//! re-armed only by an explicit renew. The per-radio WSC secret lives
//! here and nowhere else; no other dispatch path touches it.

use std::time::{Duration, Instant};

use derive_builder::Builder;
use getset::Getters;
use log::debug;

use crate::{
    consts::{
        tlv::FreqBand,
        wsc::{WscAuthType, WscEncrType, WscRfBand},
    },
    types::MacAddr,
    wsc::{Credential, EnrolleeSecret, M1Info},
};

/// Initial retry backoff for the enrollee state machine.
pub const MIN_BACKOFF: Duration = Duration::from_secs(5);

/// Backoff ceiling.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// One credential profile a registrar hands out.
#[derive(Builder, Getters, Clone, Debug, Eq, PartialEq)]
#[builder(pattern = "owned")]
pub struct RegistrarProfile {
    /// SSID of the configured network.
    #[getset(get = "pub")]
    ssid: Vec<u8>,
    /// Authentication modes offered.
    #[getset(get = "pub")]
    auth_mode: WscAuthType,
    /// Encryption modes offered.
    #[getset(get = "pub")]
    encr_mode: WscEncrType,
    /// The network key.
    #[getset(get = "pub")]
    network_key: Vec<u8>,
    /// RF bands the profile applies to.
    #[getset(get = "pub")]
    rf_bands: WscRfBand,
    /// BSSID to install the credential on, zero when the enrollee
    /// decides.
    #[builder(default)]
    #[getset(get = "pub")]
    bssid: MacAddr,
}

impl RegistrarProfile {
    /// M2 is sent for this profile iff the M1's auth bitmask and RF
    /// bands both intersect it.
    pub fn matches_m1(&self, m1: &M1Info) -> bool {
        !(m1.auth_types & self.auth_mode).is_empty() && !(m1.rf_bands & self.rf_bands).is_empty()
    }

    /// Whether the profile serves the given autoconfiguration band.
    pub fn covers_band(&self, band: FreqBand) -> bool {
        self.rf_bands.contains(WscRfBand::from_freq_band(band))
    }

    /// The credential this profile configures.
    pub fn credential(&self) -> Credential {
        Credential {
            ssid: self.ssid.clone(),
            auth: self.auth_mode,
            encr: self.encr_mode,
            network_key: self.network_key.clone(),
            bssid: self.bssid,
        }
    }
}

/// Enrollee progress for one radio.
pub enum EnrolleeState {
    /// Nothing in flight.
    Idle,
    /// An AP-autoconfig search went out; waiting for a response.
    SearchSent,
    /// An M1 went out; the frame and the DH secret are retained for
    /// processing the M2.
    M1Sent {
        /// The M1 frame as transmitted.
        m1: Vec<u8>,
        /// The private half of the enrollee key pair.
        secret: EnrolleeSecret,
    },
    /// At least one BSS has been configured.
    Configured,
}

/// Per-radio enrollee session: state plus retry bookkeeping.
pub struct EnrolleeSession {
    /// The radio this session belongs to.
    pub radio_uid: MacAddr,
    state: EnrolleeState,
    backoff: Duration,
    deadline: Option<Instant>,
    started: Option<Instant>,
}

impl EnrolleeSession {
    fn new(radio_uid: MacAddr) -> Self {
        EnrolleeSession {
            radio_uid,
            state: EnrolleeState::Idle,
            backoff: MIN_BACKOFF,
            deadline: None,
            started: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> &EnrolleeState {
        &self.state
    }

    /// True while no BSS has been configured through this session.
    pub fn is_unconfigured(&self) -> bool {
        !matches!(self.state, EnrolleeState::Configured)
    }

    /// Record that a search for this radio's band went out.
    pub fn on_search_sent(&mut self, now: Instant) {
        self.state = EnrolleeState::SearchSent;
        self.deadline = Some(now + self.backoff);
        self.started = Some(now);
    }

    /// Record that an M1 went out.
    pub fn on_m1_sent(&mut self, m1: Vec<u8>, secret: EnrolleeSecret, now: Instant) {
        self.state = EnrolleeState::M1Sent { m1, secret };
        self.deadline = Some(now + self.backoff);
        self.started = Some(now);
    }

    /// Access the in-flight M1, if any.
    pub fn in_flight_m1(&self) -> Option<(&[u8], &EnrolleeSecret)> {
        match &self.state {
            EnrolleeState::M1Sent { m1, secret } => Some((m1.as_slice(), secret)),
            _ => None,
        }
    }

    /// When the in-flight exchange started, for picking the most
    /// recent session as the M2 fallback target.
    pub fn started_at(&self) -> Option<Instant> {
        self.started
    }

    /// An M2 was applied; the WSC state is destroyed and the backoff
    /// reset.
    pub fn on_configured(&mut self) {
        self.state = EnrolleeState::Configured;
        self.backoff = MIN_BACKOFF;
        self.deadline = None;
    }

    /// A renew re-arms a configured radio.
    pub fn on_renew(&mut self) {
        if matches!(self.state, EnrolleeState::Configured) {
            self.state = EnrolleeState::Idle;
            self.backoff = MIN_BACKOFF;
            self.deadline = None;
        }
    }

    /// Drive timeouts: in SEARCH_SENT or M1_SENT past the deadline
    /// the session falls back to IDLE and the backoff doubles.
    /// Returns true when the caller should re-issue a search.
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = match (&self.state, self.deadline) {
            (EnrolleeState::SearchSent, Some(deadline))
            | (EnrolleeState::M1Sent { .. }, Some(deadline)) => now >= deadline,
            _ => false,
        };
        if expired {
            debug!(
                "radio {} enrollment timed out, retrying in {:?}",
                self.radio_uid, self.backoff
            );
            self.state = EnrolleeState::Idle;
            self.deadline = None;
            self.backoff = (self.backoff * 2).min(MAX_BACKOFF);
        }
        expired
    }
}

/// The controller owning every radio's enrollee session.
#[derive(Default)]
pub struct AutoconfigController {
    sessions: Vec<EnrolleeSession>,
}

impl AutoconfigController {
    /// A controller with no sessions.
    pub fn new() -> Self {
        AutoconfigController::default()
    }

    /// Session for a radio, created on first use.
    pub fn session_mut(&mut self, radio_uid: MacAddr) -> &mut EnrolleeSession {
        if let Some(index) = self
            .sessions
            .iter()
            .position(|session| session.radio_uid == radio_uid)
        {
            &mut self.sessions[index]
        } else {
            self.sessions.push(EnrolleeSession::new(radio_uid));
            self.sessions.last_mut().expect("just pushed")
        }
    }

    /// Session for a radio, if one exists.
    pub fn session(&self, radio_uid: MacAddr) -> Option<&EnrolleeSession> {
        self.sessions
            .iter()
            .find(|session| session.radio_uid == radio_uid)
    }

    /// The most recently started session with an M1 in flight; the
    /// fallback target for an M2 that carries no radio identifier.
    pub fn most_recent_m1(&mut self) -> Option<&mut EnrolleeSession> {
        self.sessions
            .iter_mut()
            .filter(|session| matches!(session.state(), EnrolleeState::M1Sent { .. }))
            .max_by_key(|session| session.started_at())
    }

    /// Run timeouts on every session; returns the radios whose
    /// search must be re-issued.
    pub fn tick(&mut self, now: Instant) -> Vec<MacAddr> {
        self.sessions
            .iter_mut()
            .filter_map(|session| session.tick(now).then_some(session.radio_uid))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::wsc::{build_m1, WscDeviceInfoBuilder};

    const RADIO: MacAddr = MacAddr([7, 7, 7, 7, 7, 7]);

    fn m1_pair() -> (Vec<u8>, EnrolleeSecret) {
        build_m1(
            MacAddr([2, 0, 0, 0, 0, 1]),
            WscRfBand::BAND_5_GHZ,
            WscAuthType::WPA2_PSK,
            WscEncrType::AES,
            &WscDeviceInfoBuilder::default().build().unwrap(),
        )
    }

    fn profile() -> RegistrarProfile {
        RegistrarProfileBuilder::default()
            .ssid(b"Home".to_vec())
            .auth_mode(WscAuthType::WPA2_PSK)
            .encr_mode(WscEncrType::AES)
            .network_key(b"hunter2hunter2".to_vec())
            .rf_bands(WscRfBand::BAND_5_GHZ)
            .build()
            .unwrap()
    }

    #[test]
    fn test_profile_matching_rules() {
        let profile = profile();
        let (m1, _) = m1_pair();
        let info = crate::wsc::parse_m1(&m1).unwrap();
        assert!(profile.matches_m1(&info));

        let mut wrong_band = info.clone();
        wrong_band.rf_bands = WscRfBand::BAND_2_4_GHZ;
        assert!(!profile.matches_m1(&wrong_band));

        let mut wrong_auth = info;
        wrong_auth.auth_types = WscAuthType::OPEN;
        assert!(!profile.matches_m1(&wrong_auth));
    }

    #[test]
    fn test_band_coverage() {
        assert!(profile().covers_band(FreqBand::Band5Ghz));
        assert!(!profile().covers_band(FreqBand::Band2_4Ghz));
    }

    #[test]
    fn test_state_machine_happy_path() {
        let mut controller = AutoconfigController::new();
        let now = Instant::now();
        let session = controller.session_mut(RADIO);
        assert!(session.is_unconfigured());

        session.on_search_sent(now);
        let (m1, secret) = m1_pair();
        session.on_m1_sent(m1, secret, now);
        assert!(session.in_flight_m1().is_some());

        session.on_configured();
        assert!(!session.is_unconfigured());
        assert!(session.in_flight_m1().is_none());
        // No retry fires once configured.
        assert!(controller.tick(now + Duration::from_secs(120)).is_empty());
    }

    #[test]
    fn test_timeout_backoff_doubles() {
        let mut controller = AutoconfigController::new();
        let t0 = Instant::now();
        controller.session_mut(RADIO).on_search_sent(t0);

        // First timeout after the 5 s minimum.
        let retries = controller.tick(t0 + MIN_BACKOFF);
        assert_eq!(retries, vec![RADIO]);

        // Re-arm; the next deadline is 10 s out.
        let t1 = t0 + MIN_BACKOFF;
        controller.session_mut(RADIO).on_search_sent(t1);
        assert!(controller.tick(t1 + Duration::from_secs(9)).is_empty());
        assert_eq!(controller.tick(t1 + Duration::from_secs(10)), vec![RADIO]);
    }

    #[test]
    fn test_renew_rearms_only_configured() {
        let mut controller = AutoconfigController::new();
        let session = controller.session_mut(RADIO);
        session.on_configured();
        session.on_renew();
        assert!(matches!(session.state(), EnrolleeState::Idle));

        let session = controller.session_mut(MacAddr([8, 8, 8, 8, 8, 8]));
        session.on_search_sent(Instant::now());
        session.on_renew();
        // An in-flight search is left alone.
        assert!(matches!(session.state(), EnrolleeState::SearchSent));
    }

    #[test]
    fn test_most_recent_m1_fallback() {
        let mut controller = AutoconfigController::new();
        let t0 = Instant::now();
        let other = MacAddr([8, 8, 8, 8, 8, 8]);

        let (m1, secret) = m1_pair();
        controller.session_mut(RADIO).on_m1_sent(m1, secret, t0);
        let (m1, secret) = m1_pair();
        controller
            .session_mut(other)
            .on_m1_sent(m1, secret, t0 + Duration::from_secs(1));

        assert_eq!(controller.most_recent_m1().unwrap().radio_uid, other);
    }
}
