//! Outgoing CMDU builders.
//!
//! One function per CMDU type: each gathers the TLVs the standard
//! requires from the data model and the platform, runs the wire
//! codec, and queues the resulting fragments on the send worker.
//! Multicast CMDUs go to the 1905 multicast address; responses and
//! queries go to the peer's AL MAC (or, when that is unknown, to the
//! frame source MAC of the request that triggered them).

use std::time::Instant;

use log::{debug, warn};

use crate::{
    al::AlContext,
    cmdu::Cmdu,
    consts::{
        cmdu::MessageType,
        tlv::{AutoconfigRole, FreqBand, LinkMetricDestination, LinkMetricResult, LinkMetricsType, PowerState, Profile, ServiceType},
        wsc::{WscAuthType, WscEncrType, WscRfBand},
        ETHERTYPE_1905, ETHERTYPE_LLDP, MCAST_1905, MCAST_LLDP,
    },
    datamodel::TopologyUpdate,
    err::AlError,
    lldp::BridgeDiscovery,
    serialize,
    tlv::{
        AlMacAddress, ApRadioBasicCapabilities, ApRadioIdentifier, AutoconfigFreqBand, ControlUrl,
        DeviceBridgingCapability, DeviceIdentification, DeviceInformation, InterfacePowerChangeInformation,
        InterfacePowerChangeStatus, L2Interface, L2Neighbor, L2NeighborDevice, LinkMetricQuery,
        LinkMetricResultCode, LocalInterface, MacAddress, NeighborDeviceList, NeighborEntry,
        Non1905NeighborDeviceList, PowerChangeRequest, PowerChangeStatus,
        PowerOffEntry, PowerOffInterface, ProfileVersion, PushButtonEventNotification,
        PushButtonJoinNotification, PushButtonMedia, ReceiverLinkMetric, RxLinkMetricEntry,
        SearchedRole, SearchedService, SupportedFreqBand, SupportedRole, SupportedService, Tlv,
        TransmitterLinkMetric, TxLinkMetricEntry, Wsc,
    },
    types::MacAddr,
    wsc,
};

impl AlContext {
    /// Forge a CMDU and queue its fragments for one interface.
    pub(crate) fn send_cmdu(
        &self,
        interface: &str,
        dst: MacAddr,
        cmdu: &mut Cmdu,
    ) -> Result<(), AlError> {
        self.extensions.on_send(cmdu);
        let packets = cmdu.forge()?;
        let total = packets.len();
        for (index, packet) in packets.into_iter().enumerate() {
            debug!(
                "--> {:?} mid {} on {interface} ({}/{total})",
                cmdu.message_type,
                cmdu.message_id,
                index + 1
            );
            self.enqueue_frame(interface, dst, *self.config.al_mac(), ETHERTYPE_1905, packet)?;
        }
        Ok(())
    }

    fn al_mac_tlv(&self) -> Tlv {
        Tlv::AlMacAddress(AlMacAddress {
            al_mac: *self.config.al_mac(),
        })
    }

    fn supported_service_tlv(&self) -> Option<Tlv> {
        let services = self.config.services().to_list();
        (!services.is_empty()).then(|| Tlv::SupportedService(SupportedService { services }))
    }

    /// Topology discovery, multicast on one interface.
    pub fn send_topology_discovery(&self, interface: &str, mid: u16) -> Result<(), AlError> {
        let mac = self
            .interface_mac(interface)
            .ok_or_else(|| AlError::new(format!("unknown interface {interface}")))?;
        let mut cmdu = Cmdu::new(
            MessageType::TopologyDiscovery,
            mid,
            vec![self.al_mac_tlv(), Tlv::MacAddress(MacAddress { mac })],
        );
        self.send_cmdu(interface, MCAST_1905, &mut cmdu)
    }

    /// Topology notification, multicast on one interface.
    pub fn send_topology_notification(&self, interface: &str, mid: u16) -> Result<(), AlError> {
        let mut cmdu = Cmdu::new(MessageType::TopologyNotification, mid, vec![self.al_mac_tlv()]);
        self.send_cmdu(interface, MCAST_1905, &mut cmdu)
    }

    /// Topology query to one AL.
    pub fn send_topology_query(
        &self,
        interface: &str,
        mid: u16,
        dst: MacAddr,
    ) -> Result<(), AlError> {
        let mut cmdu = Cmdu::new(MessageType::TopologyQuery, mid, vec![]);
        self.send_cmdu(interface, dst, &mut cmdu)
    }

    /// Topology response answering a query; echoes the query's MID.
    pub fn send_topology_response(
        &self,
        interface: &str,
        mid: u16,
        dst: MacAddr,
    ) -> Result<(), AlError> {
        let mut tlvs = Vec::new();

        let device_info = self.local_device_information();
        tlvs.push(Tlv::DeviceInformation(device_info.clone()));

        let bridging = self.local_bridging_capability();
        if let Some(ref tlv) = bridging {
            tlvs.push(Tlv::DeviceBridgingCapability(tlv.clone()));
        }

        let (non1905, x1905) = self.local_neighbor_lists();
        for tlv in &non1905 {
            tlvs.push(Tlv::Non1905NeighborDeviceList(tlv.clone()));
        }
        for tlv in &x1905 {
            tlvs.push(Tlv::NeighborDeviceList(tlv.clone()));
        }

        let power_off = self.local_power_off_interfaces();
        if let Some(ref tlv) = power_off {
            tlvs.push(Tlv::PowerOffInterface(tlv.clone()));
        }

        let l2 = self.local_l2_neighbors();
        if let Some(ref tlv) = l2 {
            tlvs.push(Tlv::L2NeighborDevice(tlv.clone()));
        }

        let supported_service = self.supported_service_tlv();
        if let Some(ref tlv) = supported_service {
            tlvs.push(tlv.clone());
        }

        // Keep the local device's own record current so that database
        // dumps and whole-network queries see this node too.
        self.db.lock().update_network_device_info(
            *self.config.al_mac(),
            TopologyUpdate {
                device_info: Some(device_info),
                bridging: bridging.into_iter().collect(),
                non1905_neighbors: non1905,
                neighbors: x1905,
                power_off: power_off.into_iter().collect(),
                l2_neighbors: l2.into_iter().collect(),
                supported_service: supported_service.and_then(|tlv| match tlv {
                    Tlv::SupportedService(tlv) => Some(tlv),
                    _ => None,
                }),
            },
            Instant::now(),
        );

        let mut cmdu = Cmdu::new(MessageType::TopologyResponse, mid, tlvs);
        self.send_cmdu(interface, dst, &mut cmdu)
    }

    /// Link metric query for all neighbors, both directions.
    pub fn send_link_metric_query(
        &self,
        interface: &str,
        mid: u16,
        dst: MacAddr,
    ) -> Result<(), AlError> {
        let mut cmdu = Cmdu::new(
            MessageType::LinkMetricQuery,
            mid,
            vec![Tlv::LinkMetricQuery(LinkMetricQuery {
                destination: LinkMetricDestination::AllNeighbors,
                specific_neighbor: MacAddr::ZERO,
                link_metrics_type: LinkMetricsType::TxAndRx,
            })],
        );
        self.send_cmdu(interface, dst, &mut cmdu)
    }

    /// Link metric response restricted per the query.
    pub fn send_link_metric_response(
        &self,
        interface: &str,
        mid: u16,
        dst: MacAddr,
        destination: LinkMetricDestination,
        specific_neighbor: MacAddr,
        metrics_type: LinkMetricsType,
    ) -> Result<(), AlError> {
        let tlvs = self.local_metric_tlvs(destination, specific_neighbor, metrics_type);
        let tlvs = if tlvs.is_empty() && destination == LinkMetricDestination::SpecificNeighbor {
            vec![Tlv::LinkMetricResultCode(LinkMetricResultCode {
                code: LinkMetricResult::InvalidNeighbor,
            })]
        } else {
            tlvs
        };
        let mut cmdu = Cmdu::new(MessageType::LinkMetricResponse, mid, tlvs);
        self.send_cmdu(interface, dst, &mut cmdu)
    }

    /// AP-autoconfiguration search for one band, multicast on every
    /// interface.
    pub fn send_ap_autoconfig_search(&self, band: FreqBand) -> Result<(), AlError> {
        let mid = self.next_mid();
        let mut tlvs = vec![
            self.al_mac_tlv(),
            Tlv::SearchedRole(SearchedRole {
                role: AutoconfigRole::Registrar,
            }),
            Tlv::AutoconfigFreqBand(AutoconfigFreqBand { band }),
        ];
        if let Some(tlv) = self.supported_service_tlv() {
            tlvs.push(tlv);
            tlvs.push(Tlv::SearchedService(SearchedService {
                services: vec![ServiceType::MultiApController],
            }));
        }
        for interface in self.platform.interfaces() {
            let mut cmdu = Cmdu::new(MessageType::ApAutoconfigurationSearch, mid, tlvs.clone());
            self.send_cmdu(&interface, MCAST_1905, &mut cmdu)?;
        }

        // Arm the retry state machine of every radio the search is
        // for.
        let radios: Vec<MacAddr> = {
            let db = self.db.lock();
            db.radios()
                .iter()
                .filter(|radio| radio.is_unconfigured() && radio.bands.contains(&band))
                .map(|radio| radio.uid)
                .collect()
        };
        let now = Instant::now();
        let mut autoconfig = self.autoconfig.lock();
        for uid in radios {
            autoconfig.session_mut(uid).on_search_sent(now);
        }
        Ok(())
    }

    /// AP-autoconfiguration response; echoes the search's MID.
    pub fn send_ap_autoconfig_response(
        &self,
        interface: &str,
        mid: u16,
        dst: MacAddr,
        band: FreqBand,
        include_services: bool,
    ) -> Result<(), AlError> {
        let mut tlvs = vec![
            Tlv::SupportedRole(SupportedRole {
                role: AutoconfigRole::Registrar,
            }),
            Tlv::SupportedFreqBand(SupportedFreqBand { band }),
        ];
        if include_services {
            if let Some(tlv) = self.supported_service_tlv() {
                tlvs.push(tlv);
            }
        }
        let mut cmdu = Cmdu::new(MessageType::ApAutoconfigurationResponse, mid, tlvs);
        self.send_cmdu(interface, dst, &mut cmdu)
    }

    /// Build an M1 for one radio and send it as an AP-autoconfig WSC
    /// CMDU; the WSC secret is parked in the radio's enrollee
    /// session until the M2 arrives.
    pub fn send_ap_autoconfig_wsc_m1(
        &self,
        interface: &str,
        dst: MacAddr,
        radio_uid: MacAddr,
    ) -> Result<(), AlError> {
        let radio = self
            .db
            .lock()
            .radios()
            .iter()
            .find(|radio| radio.uid == radio_uid)
            .cloned()
            .ok_or_else(|| AlError::new(format!("unknown radio {radio_uid}")))?;

        let mut rf_bands = WscRfBand::empty();
        for band in &radio.bands {
            rf_bands |= WscRfBand::from_freq_band(*band);
        }
        let (m1, secret) = wsc::build_m1(
            radio.uid,
            rf_bands,
            WscAuthType::WPA2_PSK | WscAuthType::OPEN,
            WscEncrType::AES | WscEncrType::NONE,
            self.config.wsc_device(),
        );

        let mut tlvs = vec![Tlv::Wsc(Wsc { frame: m1.clone() })];
        if !self.config.services().is_empty() {
            tlvs.push(Tlv::ApRadioBasicCapabilities(ApRadioBasicCapabilities {
                radio_uid: radio.uid,
                max_bss: radio.max_bss,
                operating_classes: Vec::new(),
            }));
        }

        self.autoconfig
            .lock()
            .session_mut(radio_uid)
            .on_m1_sent(m1, secret, Instant::now());

        let mut cmdu = Cmdu::new(MessageType::ApAutoconfigurationWsc, self.next_mid(), tlvs);
        self.send_cmdu(interface, dst, &mut cmdu)
    }

    /// Send one or more M2s back to an enrollee, tagged with the
    /// radio identifier when this node speaks Multi-AP.
    pub fn send_ap_autoconfig_wsc_m2(
        &self,
        interface: &str,
        dst: MacAddr,
        radio_uid: Option<MacAddr>,
        m2_frames: Vec<Vec<u8>>,
    ) -> Result<(), AlError> {
        let mut tlvs = Vec::with_capacity(m2_frames.len() + 1);
        if let Some(radio_uid) = radio_uid {
            tlvs.push(Tlv::ApRadioIdentifier(ApRadioIdentifier { radio_uid }));
        }
        for frame in m2_frames {
            tlvs.push(Tlv::Wsc(Wsc { frame }));
        }
        let mut cmdu = Cmdu::new(MessageType::ApAutoconfigurationWsc, self.next_mid(), tlvs);
        self.send_cmdu(interface, dst, &mut cmdu)
    }

    /// AP-autoconfiguration renew, multicast on every interface.
    pub fn send_ap_autoconfig_renew(&self, band: FreqBand) -> Result<(), AlError> {
        let mid = self.next_mid();
        let tlvs = vec![
            self.al_mac_tlv(),
            Tlv::SupportedRole(SupportedRole {
                role: AutoconfigRole::Registrar,
            }),
            Tlv::SupportedFreqBand(SupportedFreqBand { band }),
        ];
        for interface in self.platform.interfaces() {
            let mut cmdu = Cmdu::new(MessageType::ApAutoconfigurationRenew, mid, tlvs.clone());
            self.send_cmdu(&interface, MCAST_1905, &mut cmdu)?;
        }
        Ok(())
    }

    /// Push button event notification, multicast on one interface.
    pub fn send_push_button_event_notification(
        &self,
        interface: &str,
        mid: u16,
        media: Vec<PushButtonMedia>,
    ) -> Result<(), AlError> {
        let mut cmdu = Cmdu::new(
            MessageType::PushButtonEventNotification,
            mid,
            vec![
                self.al_mac_tlv(),
                Tlv::PushButtonEventNotification(PushButtonEventNotification { media }),
            ],
        );
        self.send_cmdu(interface, MCAST_1905, &mut cmdu)
    }

    /// Push button join notification after a device joined through a
    /// push button exchange.
    pub fn send_push_button_join_notification(
        &self,
        interface: &str,
        original_al: MacAddr,
        original_mid: u16,
        transmitter_mac: MacAddr,
        new_device_mac: MacAddr,
    ) -> Result<(), AlError> {
        let mut cmdu = Cmdu::new(
            MessageType::PushButtonJoinNotification,
            self.next_mid(),
            vec![
                self.al_mac_tlv(),
                Tlv::PushButtonJoinNotification(PushButtonJoinNotification {
                    al_mac: original_al,
                    message_id: original_mid,
                    transmitter_mac,
                    new_device_mac,
                }),
            ],
        );
        self.send_cmdu(interface, MCAST_1905, &mut cmdu)
    }

    /// Generic PHY query.
    pub fn send_generic_phy_query(
        &self,
        interface: &str,
        mid: u16,
        dst: MacAddr,
    ) -> Result<(), AlError> {
        let mut cmdu = Cmdu::new(MessageType::GenericPhyQuery, mid, vec![]);
        self.send_cmdu(interface, dst, &mut cmdu)
    }

    /// Generic PHY response describing local generic interfaces.
    pub fn send_generic_phy_response(
        &self,
        interface: &str,
        mid: u16,
        dst: MacAddr,
    ) -> Result<(), AlError> {
        let mut interfaces = Vec::new();
        for name in self.platform.interfaces() {
            if let Some(info) = self.platform.interface_info(&name) {
                if info.media_type == crate::consts::media::MediaType::Unknown {
                    interfaces.push(crate::tlv::GenericPhyInterface {
                        mac: info.mac,
                        oui: [0, 0, 0],
                        variant_index: 0,
                        variant_name: String::new(),
                        url: Vec::new(),
                        media_specific: Vec::new(),
                    });
                }
            }
        }
        let mut cmdu = Cmdu::new(
            MessageType::GenericPhyResponse,
            mid,
            vec![Tlv::GenericPhyDeviceInformation(
                crate::tlv::GenericPhyDeviceInformation {
                    al_mac: *self.config.al_mac(),
                    interfaces,
                },
            )],
        );
        self.send_cmdu(interface, dst, &mut cmdu)
    }

    /// Higher layer query.
    pub fn send_higher_layer_query(
        &self,
        interface: &str,
        mid: u16,
        dst: MacAddr,
    ) -> Result<(), AlError> {
        let mut cmdu = Cmdu::new(MessageType::HigherLayerQuery, mid, vec![]);
        self.send_cmdu(interface, dst, &mut cmdu)
    }

    /// Higher layer response: profile, identification, control URL
    /// and IP addresses.
    pub fn send_higher_layer_response(
        &self,
        interface: &str,
        mid: u16,
        dst: MacAddr,
    ) -> Result<(), AlError> {
        let identity = self.platform.device_identity();
        let mut tlvs = vec![
            self.al_mac_tlv(),
            Tlv::ProfileVersion(ProfileVersion {
                profile: Profile::Ieee1905_1a,
            }),
            Tlv::DeviceIdentification(DeviceIdentification {
                friendly_name: identity.friendly_name().clone(),
                manufacturer_name: identity.manufacturer_name().clone(),
                manufacturer_model: identity.manufacturer_model().clone(),
            }),
        ];
        if !identity.control_url().is_empty() {
            tlvs.push(Tlv::ControlUrl(ControlUrl {
                url: identity.control_url().clone(),
            }));
        }
        let ipv4 = self.platform.ipv4_addresses();
        if !ipv4.is_empty() {
            tlvs.push(Tlv::Ipv4(crate::tlv::Ipv4 { entries: ipv4 }));
        }
        let ipv6 = self.platform.ipv6_addresses();
        if !ipv6.is_empty() {
            tlvs.push(Tlv::Ipv6(crate::tlv::Ipv6 { entries: ipv6 }));
        }
        let mut cmdu = Cmdu::new(MessageType::HigherLayerResponse, mid, tlvs);
        self.send_cmdu(interface, dst, &mut cmdu)
    }

    /// Interface power change request towards another device.
    pub fn send_interface_power_change_request(
        &self,
        interface: &str,
        dst: MacAddr,
        requests: Vec<PowerChangeRequest>,
    ) -> Result<(), AlError> {
        let mut cmdu = Cmdu::new(
            MessageType::InterfacePowerChangeRequest,
            self.next_mid(),
            vec![Tlv::InterfacePowerChangeInformation(
                InterfacePowerChangeInformation { requests },
            )],
        );
        self.send_cmdu(interface, dst, &mut cmdu)
    }

    /// Interface power change response; echoes the request's MID.
    pub fn send_interface_power_change_response(
        &self,
        interface: &str,
        mid: u16,
        dst: MacAddr,
        statuses: Vec<PowerChangeStatus>,
    ) -> Result<(), AlError> {
        let mut cmdu = Cmdu::new(
            MessageType::InterfacePowerChangeResponse,
            mid,
            vec![Tlv::InterfacePowerChangeStatus(InterfacePowerChangeStatus {
                statuses,
            })],
        );
        self.send_cmdu(interface, dst, &mut cmdu)
    }

    /// LLDP bridge discovery frame on one interface. The source MAC
    /// is the interface's own, not the AL MAC.
    pub fn send_lldp_bridge_discovery(&self, interface: &str) -> Result<(), AlError> {
        let mac = self
            .interface_mac(interface)
            .ok_or_else(|| AlError::new(format!("unknown interface {interface}")))?;
        let frame = serialize(&BridgeDiscovery::new(*self.config.al_mac(), mac))?;
        self.enqueue_frame(interface, MCAST_LLDP, mac, ETHERTYPE_LLDP, frame)
    }

    fn local_device_information(&self) -> DeviceInformation {
        let mut interfaces = Vec::new();
        for name in self.platform.interfaces() {
            if let Some(info) = self.platform.interface_info(&name) {
                interfaces.push(LocalInterface {
                    mac: info.mac,
                    media_type: info.media_type,
                    media_info: info.media_info,
                });
            } else {
                warn!("could not retrieve info of interface {name}");
            }
        }
        DeviceInformation {
            al_mac: *self.config.al_mac(),
            interfaces,
        }
    }

    fn local_bridging_capability(&self) -> Option<DeviceBridgingCapability> {
        let mut bridging_tuples = Vec::new();
        for bridge in self.platform.bridges() {
            let macs: Vec<MacAddr> = bridge
                .interfaces
                .iter()
                .filter_map(|name| self.interface_mac(name))
                .collect();
            if !macs.is_empty() {
                bridging_tuples.push(macs);
            }
        }
        (!bridging_tuples.is_empty()).then_some(DeviceBridgingCapability { bridging_tuples })
    }

    fn local_neighbor_lists(
        &self,
    ) -> (Vec<Non1905NeighborDeviceList>, Vec<NeighborDeviceList>) {
        let db = self.db.lock();
        let mut non1905 = Vec::new();
        let mut x1905 = Vec::new();
        for name in self.platform.interfaces() {
            let info = match self.platform.interface_info(&name) {
                Some(info) => info,
                None => continue,
            };
            let mut x1905_entries: Vec<NeighborEntry> = Vec::new();
            let mut known_1905_interfaces: Vec<MacAddr> = Vec::new();
            for link in db.links() {
                if link.local_interface != info.mac || link.neighbor_al.is_zero() {
                    continue;
                }
                known_1905_interfaces.push(link.neighbor_interface);
                if !x1905_entries.iter().any(|e| e.mac == link.neighbor_al) {
                    x1905_entries.push(NeighborEntry {
                        mac: link.neighbor_al,
                        bridge_flag: db
                            .is_link_bridged(link.local_interface, link.neighbor_interface),
                    });
                }
            }
            let non1905_entries: Vec<MacAddr> = info
                .neighbor_macs
                .iter()
                .copied()
                .filter(|mac| !known_1905_interfaces.contains(mac))
                .collect();
            if !x1905_entries.is_empty() {
                x1905.push(NeighborDeviceList {
                    local_mac: info.mac,
                    neighbors: x1905_entries,
                });
            }
            if !non1905_entries.is_empty() {
                non1905.push(Non1905NeighborDeviceList {
                    local_mac: info.mac,
                    neighbors: non1905_entries,
                });
            }
        }
        (non1905, x1905)
    }

    fn local_power_off_interfaces(&self) -> Option<PowerOffInterface> {
        let mut interfaces = Vec::new();
        for name in self.platform.interfaces() {
            if let Some(info) = self.platform.interface_info(&name) {
                if info.power_state == PowerState::Off {
                    interfaces.push(PowerOffEntry {
                        mac: info.mac,
                        media_type: info.media_type,
                        generic_phy_oui: [0, 0, 0],
                        variant_index: 0,
                        media_specific: Vec::new(),
                    });
                }
            }
        }
        (!interfaces.is_empty()).then_some(PowerOffInterface { interfaces })
    }

    fn local_l2_neighbors(&self) -> Option<L2NeighborDevice> {
        let mut interfaces = Vec::new();
        for name in self.platform.interfaces() {
            if let Some(info) = self.platform.interface_info(&name) {
                if info.neighbor_macs.is_empty() {
                    continue;
                }
                interfaces.push(L2Interface {
                    mac: info.mac,
                    neighbors: info
                        .neighbor_macs
                        .iter()
                        .map(|mac| L2Neighbor {
                            mac: *mac,
                            behind: Vec::new(),
                        })
                        .collect(),
                });
            }
        }
        (!interfaces.is_empty()).then_some(L2NeighborDevice { interfaces })
    }

    /// Build TX and/or RX metric TLVs per neighbor, mirroring what
    /// the link metric query asked for.
    fn local_metric_tlvs(
        &self,
        destination: LinkMetricDestination,
        specific_neighbor: MacAddr,
        metrics_type: LinkMetricsType,
    ) -> Vec<Tlv> {
        let want_tx = matches!(
            metrics_type,
            LinkMetricsType::TxOnly | LinkMetricsType::TxAndRx
        );
        let want_rx = matches!(
            metrics_type,
            LinkMetricsType::RxOnly | LinkMetricsType::TxAndRx
        );

        let db = self.db.lock();
        let local_al = *self.config.al_mac();
        let mut tlvs = Vec::new();
        for neighbor_al in db.neighbor_al_macs() {
            if destination == LinkMetricDestination::SpecificNeighbor
                && neighbor_al != specific_neighbor
            {
                continue;
            }
            let links = db.links_with_neighbor(neighbor_al);
            if links.is_empty() {
                continue;
            }
            let mut tx_entries = Vec::with_capacity(links.len());
            let mut rx_entries = Vec::with_capacity(links.len());
            for (local_interface, neighbor_interface) in links {
                let name = self.interface_name(local_interface);
                let info = name
                    .as_deref()
                    .and_then(|name| self.platform.interface_info(name));
                let metrics = name
                    .as_deref()
                    .and_then(|name| self.platform.link_metrics(name, neighbor_interface))
                    .unwrap_or_default();
                let media_type = info
                    .map(|info| info.media_type)
                    .unwrap_or(crate::consts::media::MediaType::Unknown);
                if want_tx {
                    tx_entries.push(TxLinkMetricEntry {
                        local_interface,
                        neighbor_interface,
                        media_type,
                        bridge_flag: db.is_link_bridged(local_interface, neighbor_interface),
                        packet_errors: metrics.tx_packet_errors,
                        transmitted_packets: metrics.tx_packet_ok,
                        mac_throughput_capacity: metrics.tx_max_throughput,
                        link_availability: metrics.tx_link_availability,
                        phy_rate: metrics.tx_phy_rate,
                    });
                }
                if want_rx {
                    rx_entries.push(RxLinkMetricEntry {
                        local_interface,
                        neighbor_interface,
                        media_type,
                        packet_errors: metrics.rx_packet_errors,
                        packets_received: metrics.rx_packet_ok,
                        rssi: metrics.rx_rssi,
                    });
                }
            }
            if want_tx {
                tlvs.push(Tlv::TransmitterLinkMetric(TransmitterLinkMetric {
                    local_al,
                    neighbor_al,
                    metrics: tx_entries,
                }));
            }
            if want_rx {
                tlvs.push(Tlv::ReceiverLinkMetric(ReceiverLinkMetric {
                    local_al,
                    neighbor_al,
                    metrics: rx_entries,
                }));
            }
        }
        tlvs
    }
}
