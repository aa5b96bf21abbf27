//! The receive dispatcher: one handler per CMDU type.
//!
//! Each handler validates what the TLV admission rules could not,
//! updates the topology database, and triggers response or follow-up
//! CMDUs through the builders in `send`. Handlers compute under the
//! database lock but always release it before invoking a builder, so
//! the send path can take the lock again for its own TLV gathering.
//!
//! Per the standard there is no negative acknowledgment: every error
//! here ends in a warning log and a dropped CMDU, never in a reply.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::{
    al::AlContext,
    cmdu::Cmdu,
    consts::{
        cmdu::MessageType,
        tlv::{
            AutoconfigRole, FreqBand, LinkMetricDestination, LinkMetricsType, PowerChangeResult,
            PowerState, ServiceType,
        },
        wsc::WscMessageType,
    },
    datamodel::{Bss, DiscoverySource, DiscoveryUpdate, HigherLayerUpdate, TopologyUpdate},
    err::AlError,
    platform::PowerOutcome,
    tlv::{PowerChangeStatus, Tlv},
    types::MacAddr,
    wsc,
};

/// Re-query throttle for freshly discovered neighbors.
const DISCOVERY_QUERY_HOLDOFF: Duration = Duration::from_secs(5);

impl AlContext {
    /// Dispatch one reassembled, validated, non-duplicate CMDU.
    pub(crate) fn handle_cmdu(
        &self,
        cmdu: Cmdu,
        interface: &str,
        receiving_interface: MacAddr,
        src_addr: MacAddr,
    ) -> Result<(), AlError> {
        debug!(
            "<-- {:?} mid {} on {interface}",
            cmdu.message_type, cmdu.message_id
        );
        match cmdu.message_type {
            MessageType::TopologyDiscovery => {
                self.handle_topology_discovery(cmdu, interface, receiving_interface)
            }
            MessageType::TopologyNotification => self.handle_topology_notification(cmdu, interface),
            MessageType::TopologyQuery => self.handle_topology_query(cmdu, interface, src_addr),
            MessageType::TopologyResponse => self.handle_topology_response(cmdu, interface),
            MessageType::VendorSpecific => {
                // Extension dispatch already ran at CMDU entry.
                debug!("vendor specific CMDU handled by extensions");
                Ok(())
            }
            MessageType::LinkMetricQuery => self.handle_link_metric_query(cmdu, interface, src_addr),
            MessageType::LinkMetricResponse => self.handle_link_metric_response(cmdu),
            MessageType::ApAutoconfigurationSearch => {
                self.handle_ap_autoconfig_search(cmdu, interface)
            }
            MessageType::ApAutoconfigurationResponse => {
                self.handle_ap_autoconfig_response(cmdu, interface, src_addr)
            }
            MessageType::ApAutoconfigurationWsc => {
                self.handle_ap_autoconfig_wsc(cmdu, interface, src_addr)
            }
            MessageType::ApAutoconfigurationRenew => self.handle_ap_autoconfig_renew(cmdu),
            MessageType::PushButtonEventNotification => self.handle_push_button_event(cmdu),
            MessageType::PushButtonJoinNotification => {
                self.handle_push_button_join(cmdu);
                Ok(())
            }
            MessageType::HigherLayerQuery => {
                self.handle_higher_layer_query(cmdu, interface, src_addr)
            }
            MessageType::HigherLayerResponse => self.handle_higher_layer_response(cmdu),
            MessageType::InterfacePowerChangeRequest => {
                self.handle_power_change_request(cmdu, interface, src_addr)
            }
            MessageType::InterfacePowerChangeResponse => {
                self.handle_power_change_response(cmdu);
                Ok(())
            }
            MessageType::GenericPhyQuery => {
                self.handle_generic_phy_query(cmdu, interface, src_addr)
            }
            MessageType::GenericPhyResponse => self.handle_generic_phy_response(cmdu),
            MessageType::UnrecognizedVariant(t) => {
                warn!("dropping CMDU of unknown message type {t:#06x}");
                Ok(())
            }
        }
    }

    /// Response destination: the peer's AL MAC when the database
    /// knows it, otherwise the frame source MAC. The standard is
    /// stricter, but answering the source beats dropping.
    fn response_destination(&self, src_addr: MacAddr) -> MacAddr {
        match self.db.lock().mac_to_al_mac(src_addr) {
            Some(al_mac) => al_mac,
            None => {
                warn!("unknown destination AL MAC, using frame source {src_addr}");
                src_addr
            }
        }
    }

    fn handle_topology_discovery(
        &self,
        cmdu: Cmdu,
        interface: &str,
        receiving_interface: MacAddr,
    ) -> Result<(), AlError> {
        let al_mac = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::AlMacAddress(t) => Some(t),
                _ => None,
            })
            .map(|t| t.al_mac)
            .ok_or(AlError::new("topology discovery without AL MAC"))?;
        let mac = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::MacAddress(t) => Some(t),
                _ => None,
            })
            .map(|t| t.mac)
            .ok_or(AlError::new("topology discovery without MAC"))?;

        let now = Instant::now();
        let (update, needs_refresh) = {
            let mut db = self.db.lock();
            let update = db.update_discovery_timestamp(
                receiving_interface,
                al_mac,
                mac,
                DiscoverySource::TopologyDiscovery,
                now,
            );
            (update, db.device_needs_refresh(al_mac, now))
        };

        if update == DiscoveryUpdate::NewLink {
            // A new node: answer with an out-of-cycle discovery so it
            // learns about us without waiting for our 60 s timer.
            debug!("new neighbor {al_mac}, sending out-of-cycle discovery");
            self.send_topology_discovery(interface, self.next_mid())?;
        }

        let recently_discovered = matches!(
            update,
            DiscoveryUpdate::Refreshed {
                elapsed: Some(elapsed)
            } if elapsed < DISCOVERY_QUERY_HOLDOFF
        );
        if needs_refresh && !recently_discovered {
            self.send_topology_query(interface, self.next_mid(), al_mac)?;
        }
        Ok(())
    }

    fn handle_topology_notification(&self, cmdu: Cmdu, interface: &str) -> Result<(), AlError> {
        let al_mac = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::AlMacAddress(t) => Some(t),
                _ => None,
            })
            .map(|t| t.al_mac)
            .ok_or(AlError::new("topology notification without AL MAC"))?;

        // Send a discovery back so a node that has just joined
        // queries us right away, then query it: a notification
        // always implies network changes.
        self.send_topology_discovery(interface, self.next_mid())?;
        self.send_topology_query(interface, self.next_mid(), al_mac)
    }

    fn handle_topology_query(
        &self,
        cmdu: Cmdu,
        interface: &str,
        src_addr: MacAddr,
    ) -> Result<(), AlError> {
        let dst = self.response_destination(src_addr);
        self.send_topology_response(interface, cmdu.message_id, dst)
    }

    fn handle_topology_response(&self, cmdu: Cmdu, interface: &str) -> Result<(), AlError> {
        let mut update = TopologyUpdate::default();
        for tlv in cmdu.tlvs {
            match tlv {
                Tlv::DeviceInformation(t) => update.device_info = Some(t),
                Tlv::DeviceBridgingCapability(t) => update.bridging.push(t),
                Tlv::Non1905NeighborDeviceList(t) => update.non1905_neighbors.push(t),
                Tlv::NeighborDeviceList(t) => update.neighbors.push(t),
                Tlv::PowerOffInterface(t) => update.power_off.push(t),
                Tlv::L2NeighborDevice(t) => update.l2_neighbors.push(t),
                Tlv::SupportedService(t) => update.supported_service = Some(t),
                other => debug!("ignoring {:?} in topology response", other.tlv_type()),
            }
        }
        let info = update
            .device_info
            .as_ref()
            .ok_or(AlError::new("topology response without device information"))?;
        let al_mac = info.al_mac;
        let has_generic_phy = info
            .interfaces
            .iter()
            .any(|iface| iface.media_type == crate::consts::media::MediaType::Unknown);
        // Neighbor lists are needed again after the TLVs move into
        // the database.
        let neighbor_lists: Vec<Vec<MacAddr>> = update
            .neighbors
            .iter()
            .map(|tlv| tlv.neighbors.iter().map(|n| n.mac).collect())
            .collect();

        let now = Instant::now();
        self.db.lock().update_network_device_info(al_mac, update, now);
        debug!("network devices updated:\n{}", self.dump_network());

        self.send_link_metric_query(interface, self.next_mid(), al_mac)?;
        self.send_higher_layer_query(interface, self.next_mid(), al_mac)?;
        if has_generic_phy {
            self.send_generic_phy_query(interface, self.next_mid(), al_mac)?;
        }

        if *self.config.map_whole_network() {
            // Query the neighbor's neighbors too. A neighbor present
            // in an earlier neighbor-list TLV of this same response
            // has already been handled; skip it.
            let local_al = *self.config.al_mac();
            let mut seen: Vec<MacAddr> = Vec::new();
            for list in neighbor_lists {
                for neighbor in &list {
                    if *neighbor == local_al || seen.contains(neighbor) {
                        continue;
                    }
                    if !self.db.lock().device_needs_refresh(*neighbor, now) {
                        continue;
                    }
                    self.send_topology_query(interface, self.next_mid(), *neighbor)?;
                }
                seen.extend(list);
            }
        }
        Ok(())
    }

    fn handle_link_metric_query(
        &self,
        cmdu: Cmdu,
        interface: &str,
        src_addr: MacAddr,
    ) -> Result<(), AlError> {
        let query = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::LinkMetricQuery(t) => Some(t),
                _ => None,
            })
            .ok_or(AlError::new("link metric query without query TLV"))?;

        if matches!(query.destination, LinkMetricDestination::UnrecognizedVariant(_)) {
            warn!("unexpected link metric destination, dropping query");
            return Ok(());
        }
        if matches!(query.link_metrics_type, LinkMetricsType::UnrecognizedVariant(_)) {
            warn!("unexpected link metrics type, dropping query");
            return Ok(());
        }

        let dst = self.response_destination(src_addr);
        self.send_link_metric_response(
            interface,
            cmdu.message_id,
            dst,
            query.destination,
            query.specific_neighbor,
            query.link_metrics_type,
        )
    }

    fn handle_link_metric_response(&self, cmdu: Cmdu) -> Result<(), AlError> {
        let mut db = self.db.lock();
        for tlv in cmdu.tlvs {
            match tlv {
                Tlv::TransmitterLinkMetric(t) => db.update_tx_metrics(t),
                Tlv::ReceiverLinkMetric(t) => db.update_rx_metrics(t),
                other => debug!("ignoring {:?} in link metric response", other.tlv_type()),
            }
        }
        Ok(())
    }

    fn handle_ap_autoconfig_search(&self, cmdu: Cmdu, interface: &str) -> Result<(), AlError> {
        let al_mac = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::AlMacAddress(t) => Some(t),
                _ => None,
            })
            .map(|t| t.al_mac)
            .ok_or(AlError::new("search without AL MAC"))?;
        let role = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::SearchedRole(t) => Some(t),
                _ => None,
            })
            .ok_or(AlError::new("search without searched role"))?;
        let band = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::AutoconfigFreqBand(t) => Some(t),
                _ => None,
            })
            .map(|t| t.band)
            .ok_or(AlError::new("search without frequency band"))?;

        if role.role != AutoconfigRole::Registrar {
            warn!("unexpected searched role, dropping search");
            return Ok(());
        }

        let supported_service_present = cmdu
            .tlvs
            .iter()
            .any(|tlv| matches!(tlv, Tlv::SupportedService(_)));
        let searched_service = cmdu.find_tlv(|tlv| match tlv {
            Tlv::SearchedService(t) => Some(t),
            _ => None,
        });
        if let Some(searched) = searched_service {
            let wants_controller = searched
                .services
                .iter()
                .any(|service| *service == ServiceType::MultiApController);
            if wants_controller && !self.config.is_controller() {
                debug!("search wants a Multi-AP controller, which we are not");
                return Ok(());
            }
        }

        if !self.config.is_registrar_for(band) {
            debug!("not the registrar for {band:?}, ignoring search");
            return Ok(());
        }

        self.send_ap_autoconfig_response(
            interface,
            cmdu.message_id,
            al_mac,
            band,
            supported_service_present || searched_service.is_some(),
        )
    }

    fn handle_ap_autoconfig_response(
        &self,
        cmdu: Cmdu,
        interface: &str,
        src_addr: MacAddr,
    ) -> Result<(), AlError> {
        let role = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::SupportedRole(t) => Some(t),
                _ => None,
            })
            .ok_or(AlError::new("response without supported role"))?;
        let band = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::SupportedFreqBand(t) => Some(t),
                _ => None,
            })
            .map(|t| t.band)
            .ok_or(AlError::new("response without frequency band"))?;

        if role.role != AutoconfigRole::Registrar {
            warn!("unexpected supported role, dropping response");
            return Ok(());
        }

        let radios: Vec<MacAddr> = {
            let db = self.db.lock();
            db.radios()
                .iter()
                .filter(|radio| radio.is_unconfigured() && radio.bands.contains(&band))
                .map(|radio| radio.uid)
                .collect()
        };
        if radios.is_empty() {
            debug!("no unconfigured radio on {band:?}, ignoring response");
            return Ok(());
        }

        let dst = self.response_destination(src_addr);
        for radio_uid in radios {
            debug!("radio {radio_uid} is unconfigured on {band:?}, sending M1");
            self.send_ap_autoconfig_wsc_m1(interface, dst, radio_uid)?;
        }
        Ok(())
    }

    fn handle_ap_autoconfig_wsc(
        &self,
        cmdu: Cmdu,
        interface: &str,
        src_addr: MacAddr,
    ) -> Result<(), AlError> {
        let frames: Vec<&[u8]> = cmdu
            .tlvs
            .iter()
            .filter_map(|tlv| match tlv {
                Tlv::Wsc(t) => Some(t.frame.as_slice()),
                _ => None,
            })
            .collect();
        let first = match frames.first() {
            Some(first) => *first,
            None => {
                warn!("AP-autoconfig WSC CMDU without WSC TLV");
                return Ok(());
            }
        };

        match wsc::wsc_message_type(first) {
            Ok(WscMessageType::M1) => self.handle_wsc_m1(first, interface, src_addr, &cmdu),
            Ok(WscMessageType::M2) => self.handle_wsc_m2(&frames, &cmdu),
            _ => {
                warn!("unknown type of WSC message");
                Ok(())
            }
        }
    }

    fn handle_wsc_m1(
        &self,
        m1_frame: &[u8],
        interface: &str,
        src_addr: MacAddr,
        cmdu: &Cmdu,
    ) -> Result<(), AlError> {
        let m1 = match wsc::parse_m1(m1_frame) {
            Ok(m1) => m1,
            Err(err) => {
                warn!("malformed M1: {err}");
                return Ok(());
            }
        };

        let mut m2_frames = Vec::new();
        for profile in self.config.registrar_profiles() {
            if !profile.matches_m1(&m1) {
                continue;
            }
            match wsc::build_m2(m1_frame, &m1, &profile.credential(), self.config.wsc_device()) {
                Ok(m2) => m2_frames.push(m2),
                Err(err) => warn!("could not build M2: {err}"),
            }
        }
        if m2_frames.is_empty() {
            debug!("no registrar profile matches M1 from {}", m1.mac);
            return Ok(());
        }

        // Echo the enrollee's radio identifier so it can route the
        // M2s back to the right radio.
        let radio_uid = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::ApRadioBasicCapabilities(t) => Some(t),
                _ => None,
            })
            .map(|t| t.radio_uid);

        let dst = self.response_destination(src_addr);
        self.send_ap_autoconfig_wsc_m2(interface, dst, radio_uid, m2_frames)
    }

    fn handle_wsc_m2(&self, frames: &[&[u8]], cmdu: &Cmdu) -> Result<(), AlError> {
        let identified_radio = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::ApRadioIdentifier(t) => Some(t),
                _ => None,
            })
            .map(|t| t.radio_uid);

        let (radio_uid, m1_frame, secret) = {
            let mut autoconfig = self.autoconfig.lock();
            let session = match identified_radio {
                Some(uid) => Some(autoconfig.session_mut(uid)),
                // No radio identifier: fall back to the most recent
                // in-flight M1.
                None => autoconfig.most_recent_m1(),
            };
            let session = match session {
                Some(session) => session,
                None => {
                    warn!("M2 received with no enrollment in flight");
                    return Ok(());
                }
            };
            match session.in_flight_m1() {
                Some((m1, secret)) => (session.radio_uid, m1.to_vec(), secret.clone()),
                None => {
                    warn!("M2 received for radio {} with no M1 pending", session.radio_uid);
                    return Ok(());
                }
            }
        };

        let mut installed = 0usize;
        for frame in frames {
            if !matches!(wsc::wsc_message_type(frame), Ok(WscMessageType::M2)) {
                warn!("mixed WSC message types in one CMDU");
                continue;
            }
            match wsc::process_m2(&m1_frame, &secret, frame) {
                Ok(credential) => {
                    let bssid = if credential.bssid.is_zero() {
                        // No BSSID in the credential: the first BSS
                        // takes over the radio identifier.
                        radio_uid
                    } else {
                        credential.bssid
                    };
                    info!(
                        "installing BSS {:?} on radio {radio_uid}",
                        String::from_utf8_lossy(&credential.ssid)
                    );
                    self.db.lock().install_bss(
                        radio_uid,
                        Bss {
                            bssid,
                            ssid: credential.ssid,
                            auth: credential.auth,
                            encr: credential.encr,
                            network_key: credential.network_key,
                        },
                    );
                    installed += 1;
                }
                // Reject this M2 but keep the M1 state for a retry.
                Err(err) => warn!("rejecting M2: {err}"),
            }
        }
        if installed == 0 {
            return Ok(());
        }
        self.autoconfig.lock().session_mut(radio_uid).on_configured();

        // Other radios may still be unconfigured; re-trigger the
        // search only for those so a configured radio cannot loop.
        let pending_bands: Vec<FreqBand> = {
            let db = self.db.lock();
            let mut bands = Vec::new();
            for radio in db.radios().iter().filter(|radio| radio.is_unconfigured()) {
                for band in &radio.bands {
                    if !bands.contains(band) {
                        bands.push(*band);
                    }
                }
            }
            bands
        };
        for band in pending_bands {
            self.send_ap_autoconfig_search(band)?;
        }
        Ok(())
    }

    fn handle_ap_autoconfig_renew(&self, cmdu: Cmdu) -> Result<(), AlError> {
        let role = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::SupportedRole(t) => Some(t),
                _ => None,
            })
            .ok_or(AlError::new("renew without supported role"))?;
        let band = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::SupportedFreqBand(t) => Some(t),
                _ => None,
            })
            .map(|t| t.band)
            .ok_or(AlError::new("renew without frequency band"))?;
        if role.role != AutoconfigRole::Registrar {
            warn!("unexpected supported role in renew");
            return Ok(());
        }

        let radios: Vec<MacAddr> = {
            let db = self.db.lock();
            db.radios()
                .iter()
                .filter(|radio| radio.bands.contains(&band))
                .map(|radio| radio.uid)
                .collect()
        };
        if radios.is_empty() {
            return Ok(());
        }
        {
            let mut autoconfig = self.autoconfig.lock();
            for uid in &radios {
                autoconfig.session_mut(*uid).on_renew();
            }
        }
        self.send_ap_autoconfig_search(band)
    }

    fn handle_push_button_event(&self, cmdu: Cmdu) -> Result<(), AlError> {
        let notification = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::PushButtonEventNotification(t) => Some(t),
                _ => None,
            })
            .ok_or(AlError::new("push button event without notification TLV"))?;
        let wifi_advertised = notification
            .media
            .iter()
            .any(|media| media.media_type.is_ieee80211());
        let is_registrar = !self.config.registrar_profiles().is_empty();

        for name in self.platform.interfaces() {
            if let Err(err) = self.platform.set_power_state(&name, PowerState::On) {
                warn!("could not power on {name}: {err}");
            }
        }
        for name in self.platform.interfaces() {
            let info = match self.platform.interface_info(&name) {
                Some(info) => info,
                None => continue,
            };
            let eligible = if info.media_type.is_ieee80211() {
                // Wi-Fi only joins when we are the registrar and the
                // notifier did not already run its own Wi-Fi
                // exchange.
                is_registrar && !wifi_advertised
            } else {
                true
            };
            if eligible {
                if let Err(err) = self.platform.start_push_button_configuration(&name) {
                    warn!("could not start push button configuration on {name}: {err}");
                }
            }
        }
        Ok(())
    }

    fn handle_push_button_join(&self, cmdu: Cmdu) {
        if let Some(join) = cmdu.find_tlv(|tlv| match tlv {
            Tlv::PushButtonJoinNotification(t) => Some(t),
            _ => None,
        }) {
            info!(
                "device {} joined via push button (event mid {})",
                join.new_device_mac, join.message_id
            );
        }
    }

    fn handle_higher_layer_query(
        &self,
        cmdu: Cmdu,
        interface: &str,
        src_addr: MacAddr,
    ) -> Result<(), AlError> {
        let dst = self.response_destination(src_addr);
        self.send_higher_layer_response(interface, cmdu.message_id, dst)
    }

    fn handle_higher_layer_response(&self, cmdu: Cmdu) -> Result<(), AlError> {
        let mut al_mac = None;
        let mut update = HigherLayerUpdate::default();
        for tlv in cmdu.tlvs {
            match tlv {
                Tlv::AlMacAddress(t) => al_mac = Some(t.al_mac),
                Tlv::ProfileVersion(t) => update.profile = Some(t),
                Tlv::DeviceIdentification(t) => update.identification = Some(t),
                Tlv::ControlUrl(t) => update.control_url = Some(t),
                Tlv::Ipv4(t) => update.ipv4 = Some(t),
                Tlv::Ipv6(t) => update.ipv6 = Some(t),
                other => debug!("ignoring {:?} in higher layer response", other.tlv_type()),
            }
        }
        let al_mac = al_mac.ok_or(AlError::new("higher layer response without AL MAC"))?;
        self.db.lock().update_higher_layer_info(al_mac, update);
        Ok(())
    }

    fn handle_power_change_request(
        &self,
        cmdu: Cmdu,
        interface: &str,
        src_addr: MacAddr,
    ) -> Result<(), AlError> {
        let request = cmdu
            .find_tlv(|tlv| match tlv {
                Tlv::InterfacePowerChangeInformation(t) => Some(t),
                _ => None,
            })
            .ok_or(AlError::new("power change request without information TLV"))?;

        let mut statuses = Vec::with_capacity(request.requests.len());
        for change in &request.requests {
            let name = self.interface_name(change.mac);
            let result = match name {
                Some(name) => match self.platform.set_power_state(&name, change.state) {
                    Ok(PowerOutcome::Changed) => PowerChangeResult::Completed,
                    Ok(PowerOutcome::NoChange) => PowerChangeResult::NoChange,
                    Ok(PowerOutcome::Alternative) => PowerChangeResult::AlternativeChange,
                    Err(err) => {
                        warn!("power change on {name} failed: {err}");
                        PowerChangeResult::NoChange
                    }
                },
                None => {
                    warn!("power change requested for unknown interface {}", change.mac);
                    PowerChangeResult::NoChange
                }
            };
            statuses.push(PowerChangeStatus {
                mac: change.mac,
                result,
            });
        }

        let dst = self.response_destination(src_addr);
        self.send_interface_power_change_response(interface, cmdu.message_id, dst, statuses)
    }

    fn handle_power_change_response(&self, cmdu: Cmdu) {
        if let Some(status) = cmdu.find_tlv(|tlv| match tlv {
            Tlv::InterfacePowerChangeStatus(t) => Some(t),
            _ => None,
        }) {
            for entry in &status.statuses {
                debug!("power change on {}: {:?}", entry.mac, entry.result);
            }
        }
    }

    fn handle_generic_phy_query(
        &self,
        cmdu: Cmdu,
        interface: &str,
        src_addr: MacAddr,
    ) -> Result<(), AlError> {
        let dst = self.response_destination(src_addr);
        self.send_generic_phy_response(interface, cmdu.message_id, dst)
    }

    fn handle_generic_phy_response(&self, cmdu: Cmdu) -> Result<(), AlError> {
        for tlv in cmdu.tlvs {
            if let Tlv::GenericPhyDeviceInformation(t) = tlv {
                self.db.lock().update_generic_phy_info(t.al_mac, t);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::Arc;

    use crate::{
        al::{AlConfigBuilder, AlContext, RadioConfigBuilder},
        autoconfig::RegistrarProfileBuilder,
        consts::{tlv::Services, wsc::{WscAuthType, WscEncrType, WscRfBand}, ETHERTYPE_1905},
        platform::{testing::FakePlatform, Platform},
        tlv::{InterfacePowerChangeInformation, MacAddress, PowerChangeRequest},
        types::MacAddr,
    };

    const A_AL: MacAddr = MacAddr([0x02, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa]);
    const A_IF: MacAddr = MacAddr([0x02, 0xaa, 0xaa, 0xaa, 0xaa, 0xab]);
    const B_AL: MacAddr = MacAddr([0x02, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb]);
    const B_IF: MacAddr = MacAddr([0x02, 0xbb, 0xbb, 0xbb, 0xbb, 0xbc]);

    fn node(al_mac: MacAddr, iface_mac: MacAddr) -> (AlContext, Arc<FakePlatform>) {
        let mut platform = FakePlatform::new();
        platform.add_ethernet_interface("eth0", iface_mac);
        let platform = Arc::new(platform);
        let al = AlContext::new(
            AlConfigBuilder::default().al_mac(al_mac).build().unwrap(),
            Arc::clone(&platform) as Arc<dyn Platform>,
        );
        (al, platform)
    }

    /// Feed every queued 1905 frame of `from` into `to`, clearing the
    /// sender's capture. Returns how many frames moved.
    fn shuttle(from: &(AlContext, Arc<FakePlatform>), to: &(AlContext, Arc<FakePlatform>)) -> usize {
        from.0.flush_sends();
        let frames = from.1.sent_frames();
        from.1.clear_sent();
        let mut moved = 0;
        for frame in frames {
            if frame.ethertype == ETHERTYPE_1905 {
                to.0
                    .process_raw_frame("eth0", frame.src, frame.ethertype, &frame.payload)
                    .unwrap();
                moved += 1;
            }
        }
        moved
    }

    fn sent_message_types(platform: &FakePlatform) -> Vec<u16> {
        platform
            .sent_frames()
            .iter()
            .filter(|frame| frame.ethertype == ETHERTYPE_1905)
            .map(|frame| u16::from_be_bytes([frame.payload[2], frame.payload[3]]))
            .collect()
    }

    #[test]
    fn test_discovery_handshake() {
        // Node A multicasts a discovery; node B stores the link,
        // answers with its own discovery and a topology query; A
        // responds; B ends up with one device entry for A.
        let a = node(A_AL, A_IF);
        let b = node(B_AL, B_IF);

        a.0.send_topology_discovery("eth0", a.0.next_mid()).unwrap();
        assert!(shuttle(&a, &b) > 0);

        b.0.flush_sends();
        let types = sent_message_types(&b.1);
        assert!(types.contains(&0x0000), "B must send a discovery back");
        assert!(types.contains(&0x0002), "B must query the new neighbor");
        {
            let db = b.0.database().lock();
            assert_eq!(db.links().len(), 1);
            assert_eq!(db.links()[0].neighbor_al, A_AL);
            assert_eq!(db.links()[0].local_interface, B_IF);
        }

        // Deliver B's query (and discovery) to A; A answers the
        // query with a topology response.
        shuttle(&b, &a);
        a.0.flush_sends();
        assert!(sent_message_types(&a.1).contains(&0x0003));

        // Deliver the response; B's database now has A's device
        // record with its interface inventory.
        shuttle(&a, &b);
        let db = b.0.database().lock();
        let device = db.device(A_AL).expect("device record for A");
        let info = device.device_info.as_ref().unwrap();
        assert_eq!(info.al_mac, A_AL);
        assert_eq!(info.interfaces.len(), 1);
        assert_eq!(info.interfaces[0].mac, A_IF);
    }

    #[test]
    fn test_notification_always_triggers_query() {
        let a = node(A_AL, A_IF);
        let b = node(B_AL, B_IF);

        // Twice in a row: no rate limiting applies to notifications.
        for round in 0..2 {
            a.0.send_topology_notification("eth0", a.0.next_mid()).unwrap();
            shuttle(&a, &b);
            b.0.flush_sends();
            let queries = sent_message_types(&b.1)
                .iter()
                .filter(|t| **t == 0x0002)
                .count();
            assert_eq!(queries, 1, "round {round}");
            b.1.clear_sent();
        }
    }

    #[test]
    fn test_metric_query_response_cycle() {
        let a = node(A_AL, A_IF);
        let b = node(B_AL, B_IF);

        // A learns about two neighbors on its interface.
        {
            let mut db = a.0.database().lock();
            db.update_discovery_timestamp(
                A_IF,
                B_AL,
                B_IF,
                DiscoverySource::TopologyDiscovery,
                Instant::now(),
            );
            db.update_discovery_timestamp(
                A_IF,
                MacAddr([2, 0xcc, 0, 0, 0, 1]),
                MacAddr([2, 0xcc, 0, 0, 0, 2]),
                DiscoverySource::TopologyDiscovery,
                Instant::now(),
            );
        }
        // B queries A for all neighbors, both directions.
        b.0.send_link_metric_query("eth0", b.0.next_mid(), A_AL)
            .unwrap();
        shuttle(&b, &a);
        shuttle(&a, &b);

        // B's database has one TX and one RX record per neighbor
        // under A's entry.
        let db = b.0.database().lock();
        let device = db.device(A_AL).expect("metrics stored under A");
        assert_eq!(device.metrics.len(), 2);
        for metrics in &device.metrics {
            let tx = metrics.tx.as_ref().expect("tx metrics present");
            let rx = metrics.rx.as_ref().expect("rx metrics present");
            assert_eq!(tx.local_al, A_AL);
            assert_eq!(rx.local_al, A_AL);
            assert_eq!(tx.metrics.len(), 1);
            assert_eq!(rx.metrics.len(), 1);
        }
    }

    #[test]
    fn test_specific_metric_query_for_unknown_neighbor() {
        let a = node(A_AL, A_IF);
        let b = node(B_AL, B_IF);

        let mut cmdu = Cmdu::new(
            MessageType::LinkMetricQuery,
            b.0.next_mid(),
            vec![Tlv::LinkMetricQuery(crate::tlv::LinkMetricQuery {
                destination: LinkMetricDestination::SpecificNeighbor,
                specific_neighbor: MacAddr([9, 9, 9, 9, 9, 9]),
                link_metrics_type: LinkMetricsType::TxAndRx,
            })],
        );
        b.0.send_cmdu("eth0", A_AL, &mut cmdu).unwrap();
        shuttle(&b, &a);
        a.0.flush_sends();
        // A answers with a link metric response carrying only the
        // invalid-neighbor result code.
        let frames = a.1.sent_frames();
        assert_eq!(sent_message_types(&a.1), vec![0x0006]);
        let payload = &frames[0].payload;
        // TLV stream starts after the CMDU header: result code TLV.
        assert_eq!(payload[8], 12);
    }

    fn registrar_node() -> (AlContext, Arc<FakePlatform>) {
        let mut platform = FakePlatform::new();
        platform.add_ethernet_interface("eth0", A_IF);
        let platform = Arc::new(platform);
        let al = AlContext::new(
            AlConfigBuilder::default()
                .al_mac(A_AL)
                .services(Services::CONTROLLER)
                .registrar_profiles(vec![RegistrarProfileBuilder::default()
                    .ssid(b"Home".to_vec())
                    .auth_mode(WscAuthType::WPA2_PSK)
                    .encr_mode(WscEncrType::AES)
                    .network_key(b"correct horse battery staple".to_vec())
                    .rf_bands(WscRfBand::BAND_5_GHZ)
                    .build()
                    .unwrap()])
                .build()
                .unwrap(),
            Arc::clone(&platform) as Arc<dyn Platform>,
        );
        (al, platform)
    }

    fn enrollee_node() -> (AlContext, Arc<FakePlatform>) {
        let mut platform = FakePlatform::new();
        platform.add_ethernet_interface("eth0", B_IF);
        let platform = Arc::new(platform);
        let al = AlContext::new(
            AlConfigBuilder::default()
                .al_mac(B_AL)
                .radios(vec![RadioConfigBuilder::default()
                    .uid(MacAddr([7, 7, 7, 7, 7, 7]))
                    .bands(vec![FreqBand::Band5Ghz])
                    .build()
                    .unwrap()])
                .build()
                .unwrap(),
            Arc::clone(&platform) as Arc<dyn Platform>,
        );
        (al, platform)
    }

    #[test]
    fn test_ap_autoconfiguration_full_exchange() {
        let registrar = registrar_node();
        let enrollee = enrollee_node();

        // The enrollee searches for a 5 GHz registrar.
        enrollee.0.send_ap_autoconfig_search(FreqBand::Band5Ghz).unwrap();
        shuttle(&enrollee, &registrar);

        // The registrar responds; the enrollee sends an M1.
        registrar.0.flush_sends();
        assert_eq!(sent_message_types(&registrar.1), vec![0x0008]);
        shuttle(&registrar, &enrollee);

        enrollee.0.flush_sends();
        assert_eq!(sent_message_types(&enrollee.1), vec![0x0009]);
        shuttle(&enrollee, &registrar);

        // The registrar answers with an M2; applying it configures
        // the radio with the profile's credential.
        registrar.0.flush_sends();
        assert_eq!(sent_message_types(&registrar.1), vec![0x0009]);
        shuttle(&registrar, &enrollee);

        let db = enrollee.0.database().lock();
        let radio = &db.radios()[0];
        assert_eq!(radio.bsses.len(), 1);
        assert_eq!(radio.bsses[0].ssid, b"Home".to_vec());
        assert_eq!(
            radio.bsses[0].network_key,
            b"correct horse battery staple".to_vec()
        );
        assert_eq!(radio.bsses[0].auth, WscAuthType::WPA2_PSK);
    }

    #[test]
    fn test_search_for_wrong_band_is_ignored() {
        let registrar = registrar_node();
        let enrollee = enrollee_node();

        // The registrar only covers 5 GHz.
        enrollee
            .0
            .send_ap_autoconfig_search(FreqBand::Band2_4Ghz)
            .unwrap();
        shuttle(&enrollee, &registrar);
        registrar.0.flush_sends();
        assert!(sent_message_types(&registrar.1).is_empty());
    }

    #[test]
    fn test_power_change_request_completed() {
        let controller = node(A_AL, A_IF);
        let agent = node(B_AL, B_IF);

        controller
            .0
            .send_interface_power_change_request(
                "eth0",
                B_AL,
                vec![PowerChangeRequest {
                    mac: B_IF,
                    state: PowerState::Off,
                }],
            )
            .unwrap();
        shuttle(&controller, &agent);

        agent.0.flush_sends();
        let frames = agent.1.sent_frames();
        assert_eq!(sent_message_types(&agent.1), vec![0x0010]);
        // Response TLV: type 29, one entry, our MAC, COMPLETED.
        let payload = &frames[0].payload;
        assert_eq!(payload[8], 29);
        assert_eq!(payload[11], 1);
        assert_eq!(&payload[12..18], &B_IF.octets());
        assert_eq!(payload[18], 0x00);
    }

    #[test]
    fn test_malformed_cmdu_changes_nothing() {
        let a = node(A_AL, A_IF);
        let b = node(B_AL, B_IF);

        // A topology discovery missing its AL MAC TLV: hand-forged
        // as a notification-shaped stream under the discovery type.
        let mut stream = std::io::Cursor::new(Vec::new());
        crate::ToBytes::to_bytes(
            &Tlv::MacAddress(MacAddress { mac: A_IF }),
            &mut stream,
        )
        .unwrap();
        crate::tlv::write_end_of_message(&mut stream).unwrap();
        let mut packet = std::io::Cursor::new(Vec::new());
        crate::ToBytes::to_bytes(
            &crate::cmdu::CmduHeader {
                message_version: 0,
                message_type: MessageType::TopologyDiscovery.into(),
                message_id: 5,
                fragment_id: 0,
                flags: crate::consts::cmdu::CmduFlags::LAST_FRAGMENT,
            },
            &mut packet,
        )
        .unwrap();
        crate::ToBytes::to_bytes(&stream.into_inner(), &mut packet).unwrap();

        b.0.process_raw_frame("eth0", A_AL, ETHERTYPE_1905, &packet.into_inner())
            .unwrap();
        b.0.flush_sends();
        assert!(sent_message_types(&b.1).is_empty());
        assert!(b.0.database().lock().links().is_empty());
        drop(a);
    }

    #[test]
    fn test_query_rate_limited_after_response() {
        let a = node(A_AL, A_IF);
        let b = node(B_AL, B_IF);

        // Full handshake so B holds a fresh topology response from A.
        a.0.send_topology_discovery("eth0", a.0.next_mid()).unwrap();
        shuttle(&a, &b);
        shuttle(&b, &a);
        shuttle(&a, &b);
        b.1.clear_sent();

        // Another discovery right away: B already has fresh data and
        // must not query again.
        a.0.send_topology_discovery("eth0", a.0.next_mid()).unwrap();
        shuttle(&a, &b);
        b.0.flush_sends();
        let queries = sent_message_types(&b.1)
            .iter()
            .filter(|t| **t == 0x0002)
            .count();
        assert_eq!(queries, 0);
    }

    #[test]
    fn test_duplicate_response_is_suppressed() {
        let a = node(A_AL, A_IF);
        let b = node(B_AL, B_IF);

        // Build one topology response from A and deliver it twice.
        a.0.send_topology_response("eth0", 77, B_AL).unwrap();
        a.0.flush_sends();
        let frames = a.1.sent_frames();
        for _ in 0..2 {
            for frame in &frames {
                b.0.process_raw_frame("eth0", frame.src, frame.ethertype, &frame.payload)
                    .unwrap();
            }
        }
        b.0.flush_sends();
        // The follow-up queries (metrics + higher layer) fired only
        // once thanks to duplicate suppression.
        let types = sent_message_types(&b.1);
        assert_eq!(types.iter().filter(|t| **t == 0x0005).count(), 1);
        assert_eq!(types.iter().filter(|t| **t == 0x000d).count(), 1);
    }

    #[test]
    fn test_power_change_request_tlv_shape() {
        // The request builder and parser agree on the wire image.
        let cmdu = Cmdu::new(
            MessageType::InterfacePowerChangeRequest,
            1,
            vec![Tlv::InterfacePowerChangeInformation(
                InterfacePowerChangeInformation {
                    requests: vec![PowerChangeRequest {
                        mac: B_IF,
                        state: PowerState::Save,
                    }],
                },
            )],
        );
        let packets = cmdu.forge().unwrap();
        let fragments: Vec<crate::cmdu::Fragment> = packets
            .iter()
            .map(|p| crate::cmdu::Fragment::parse(p).unwrap())
            .collect();
        assert_eq!(Cmdu::parse(&fragments).unwrap(), cmdu);
    }

    #[test]
    fn test_higher_layer_exchange_updates_database() {
        let a = node(A_AL, A_IF);
        let b = node(B_AL, B_IF);

        b.0.send_higher_layer_query("eth0", b.0.next_mid(), A_AL)
            .unwrap();
        shuttle(&b, &a);
        shuttle(&a, &b);

        let db = b.0.database().lock();
        let device = db.device(A_AL).expect("device entry for A");
        assert!(device.profile.is_some());
        assert!(device.identification.is_some());
    }

    #[test]
    fn test_push_button_event_powers_interfaces_on() {
        let a = node(A_AL, A_IF);
        let b = node(B_AL, B_IF);

        a.0.send_push_button_event_notification("eth0", a.0.next_mid(), vec![])
            .unwrap();
        shuttle(&a, &b);
        // B's only interface is Ethernet: eligible for push button
        // configuration.
        assert_eq!(b.1.push_button_interfaces(), vec!["eth0".to_string()]);
    }

    #[test]
    fn test_al_mac_tlv_present_in_discovery() {
        let a = node(A_AL, A_IF);
        a.0.send_topology_discovery("eth0", 3).unwrap();
        a.0.flush_sends();
        let frames = a.1.sent_frames();
        let payload = &frames[0].payload;
        // After the CMDU header: AL MAC TLV (type 1, len 6, value).
        assert_eq!(payload[8], 1);
        assert_eq!(&payload[11..17], &A_AL.octets());
        let parsed = Cmdu::parse(&[crate::cmdu::Fragment::parse(payload).unwrap()]).unwrap();
        assert!(parsed
            .find_tlv(|tlv| match tlv {
                Tlv::AlMacAddress(t) => Some(t),
                _ => None,
            })
            .is_some());
    }
}
