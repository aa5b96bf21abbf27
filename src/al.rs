//! The abstraction layer context.
//!
//! [`AlContext`] is the value that replaces the global singletons of
//! older 1905 stacks: it owns the configuration, the topology
//! database behind its single mutex, the MID allocator, the
//! reassembler, the autoconfiguration controller, the extension
//! registry and the injected [`Platform`]. The receive dispatcher
//! (`dispatch`) and the CMDU builders (`send`) are implemented as
//! further `impl AlContext` blocks.
//!
//! # Concurrency
//!
//! Handlers run under the database mutex. Outbound frames are not
//! transmitted inline; they are enqueued to a send worker thread so a
//! handler never blocks on the raw socket while holding the lock. On
//! shutdown the worker drains what is queued, then exits.

use std::{
    sync::{
        mpsc::{channel, Receiver, Sender},
        Arc,
    },
    thread::{spawn, JoinHandle},
    time::Instant,
};

use derive_builder::Builder;
use getset::Getters;
use log::{debug, warn};
use parking_lot::{Condvar, Mutex};

use crate::{
    autoconfig::{AutoconfigController, RegistrarProfile},
    cmdu::{Cmdu, Fragment},
    consts::{
        tlv::{FreqBand, Services},
        ETHERTYPE_1905, ETHERTYPE_LLDP,
    },
    datamodel::{DiscoverySource, Radio, TopologyDatabase},
    err::AlError,
    extension::ExtensionRegistry,
    lldp::BridgeDiscovery,
    mid::{DuplicateFilter, MidAllocator},
    platform::Platform,
    reassembly::Reassembler,
    types::MacAddr,
    wsc::WscDeviceInfo,
    FromBytes,
};

use std::io::Cursor;

/// Static description of one local radio.
#[derive(Builder, Getters, Clone, Debug)]
#[builder(pattern = "owned")]
pub struct RadioConfig {
    /// Radio unique identifier.
    #[getset(get = "pub")]
    uid: MacAddr,
    /// Maximum number of BSSes the radio supports.
    #[builder(default = "1")]
    #[getset(get = "pub")]
    max_bss: u8,
    /// Frequency bands the radio can operate on.
    #[getset(get = "pub")]
    bands: Vec<FreqBand>,
}

/// Configuration of one AL instance.
#[derive(Builder, Getters, Clone, Debug)]
#[builder(pattern = "owned")]
pub struct AlConfig {
    /// The AL MAC address identifying this node.
    #[getset(get = "pub")]
    al_mac: MacAddr,
    /// Query neighbors' neighbors to map the whole network.
    #[builder(default)]
    #[getset(get = "pub")]
    map_whole_network: bool,
    /// EasyMesh services this node provides.
    #[builder(default)]
    #[getset(get = "pub")]
    services: Services,
    /// WSC device description for M1/M2 messages.
    #[builder(default)]
    #[getset(get = "pub")]
    wsc_device: WscDeviceInfo,
    /// Registrar credential profiles; non-empty makes this node the
    /// registrar for the bands the profiles cover.
    #[builder(default)]
    #[getset(get = "pub")]
    registrar_profiles: Vec<RegistrarProfile>,
    /// Local radios taking part in Multi-AP onboarding.
    #[builder(default)]
    #[getset(get = "pub")]
    radios: Vec<RadioConfig>,
}

impl AlConfig {
    /// True when this node acts as registrar for the given band.
    pub fn is_registrar_for(&self, band: FreqBand) -> bool {
        self.registrar_profiles
            .iter()
            .any(|profile| profile.covers_band(band))
    }

    /// True when this node advertises the Multi-AP controller
    /// service.
    pub fn is_controller(&self) -> bool {
        self.services.contains(Services::CONTROLLER)
    }
}

/// One frame waiting for the send worker.
struct OutboundFrame {
    interface: String,
    dst: MacAddr,
    src: MacAddr,
    ethertype: u16,
    payload: Vec<u8>,
}

struct SendWorker {
    tx: Option<Sender<OutboundFrame>>,
    pending: Arc<(Mutex<usize>, Condvar)>,
    handle: Option<JoinHandle<()>>,
}

impl SendWorker {
    fn spawn(platform: Arc<dyn Platform>) -> Self {
        let (tx, rx): (Sender<OutboundFrame>, Receiver<OutboundFrame>) = channel();
        let pending = Arc::new((Mutex::new(0usize), Condvar::new()));
        let worker_pending = Arc::clone(&pending);
        let handle = spawn(move || {
            while let Ok(frame) = rx.recv() {
                if let Err(err) = platform.send_raw_packet(
                    &frame.interface,
                    frame.dst,
                    frame.src,
                    frame.ethertype,
                    &frame.payload,
                ) {
                    warn!("packet could not be sent on {}: {err}", frame.interface);
                }
                let (lock, condvar) = &*worker_pending;
                let mut count = lock.lock();
                *count -= 1;
                condvar.notify_all();
            }
        });
        SendWorker {
            tx: Some(tx),
            pending,
            handle: Some(handle),
        }
    }

    fn enqueue(&self, frame: OutboundFrame) -> Result<(), AlError> {
        let (lock, _) = &*self.pending;
        *lock.lock() += 1;
        match self.tx.as_ref() {
            Some(tx) => tx.send(frame).map_err(|_| {
                let (lock, _) = &*self.pending;
                *lock.lock() -= 1;
                AlError::SendWorkerGone
            }),
            None => Err(AlError::SendWorkerGone),
        }
    }

    fn flush(&self) {
        let (lock, condvar) = &*self.pending;
        let mut count = lock.lock();
        while *count != 0 {
            condvar.wait(&mut count);
        }
    }
}

impl Drop for SendWorker {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit.
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// The state shared by every component of one AL node.
///
/// Field order matters on shutdown: the send worker is dropped (and
/// drained) first, the database last.
pub struct AlContext {
    pub(crate) config: AlConfig,
    pub(crate) platform: Arc<dyn Platform>,
    send_worker: SendWorker,
    pub(crate) mids: MidAllocator,
    duplicates: Mutex<DuplicateFilter>,
    reassembler: Mutex<Reassembler>,
    pub(crate) autoconfig: Mutex<AutoconfigController>,
    pub(crate) extensions: ExtensionRegistry,
    pub(crate) db: Mutex<TopologyDatabase>,
}

impl AlContext {
    /// Build a context from configuration and an injected platform.
    pub fn new(config: AlConfig, platform: Arc<dyn Platform>) -> Self {
        AlContext::with_extensions(config, platform, ExtensionRegistry::new())
    }

    /// Build a context with vendor extensions registered up front.
    pub fn with_extensions(
        config: AlConfig,
        platform: Arc<dyn Platform>,
        extensions: ExtensionRegistry,
    ) -> Self {
        let mut db = TopologyDatabase::new(*config.al_mac(), *config.map_whole_network());
        for radio in config.radios() {
            db.upsert_radio(Radio {
                uid: *radio.uid(),
                max_bss: *radio.max_bss(),
                bands: radio.bands().clone(),
                bsses: Vec::new(),
            });
        }
        let send_worker = SendWorker::spawn(Arc::clone(&platform));
        AlContext {
            config,
            platform,
            send_worker,
            mids: MidAllocator::new(),
            duplicates: Mutex::new(DuplicateFilter::new()),
            reassembler: Mutex::new(Reassembler::new()),
            autoconfig: Mutex::new(AutoconfigController::new()),
            extensions,
            db: Mutex::new(db),
        }
    }

    /// This node's configuration.
    pub fn config(&self) -> &AlConfig {
        &self.config
    }

    /// The topology database and its lock.
    pub fn database(&self) -> &Mutex<TopologyDatabase> {
        &self.db
    }

    /// Allocate the next outbound message ID.
    pub fn next_mid(&self) -> u16 {
        self.mids.next_mid()
    }

    /// Block until every queued frame has been handed to the
    /// platform. Used on shutdown and by tests.
    pub fn flush_sends(&self) {
        self.send_worker.flush();
    }

    /// Render a consistent text snapshot of the topology database,
    /// extensions included.
    pub fn dump_network(&self) -> String {
        let db = self.db.lock();
        let mut out = db.dump(Instant::now());
        self.extensions.dump(&db, &mut out);
        out
    }

    /// MAC address of a named local interface.
    pub(crate) fn interface_mac(&self, name: &str) -> Option<MacAddr> {
        self.platform.interface_info(name).map(|info| info.mac)
    }

    /// Name of the local interface with the given MAC.
    pub(crate) fn interface_name(&self, mac: MacAddr) -> Option<String> {
        self.platform
            .interfaces()
            .into_iter()
            .find(|name| self.interface_mac(name) == Some(mac))
    }

    /// Queue one raw frame for the send worker.
    pub(crate) fn enqueue_frame(
        &self,
        interface: &str,
        dst: MacAddr,
        src: MacAddr,
        ethertype: u16,
        payload: Vec<u8>,
    ) -> Result<(), AlError> {
        self.send_worker.enqueue(OutboundFrame {
            interface: interface.to_string(),
            dst,
            src,
            ethertype,
            payload,
        })
    }

    /// Entry point of the receive path: one raw Ethernet payload as
    /// it came off the wire, Ethernet header already stripped by the
    /// platform receive loop.
    ///
    /// Malformed frames are dropped here with a warning; they never
    /// tear anything down.
    pub fn process_raw_frame(
        &self,
        interface: &str,
        src: MacAddr,
        ethertype: u16,
        payload: &[u8],
    ) -> Result<(), AlError> {
        let receiving_interface = match self.interface_mac(interface) {
            Some(mac) => mac,
            None => {
                warn!("frame received on unknown interface {interface}");
                return Ok(());
            }
        };
        match ethertype {
            ETHERTYPE_LLDP => self.process_lldp_frame(receiving_interface, payload),
            ETHERTYPE_1905 => self.process_1905_frame(interface, receiving_interface, src, payload),
            other => {
                debug!("ignoring frame with EtherType {other:#06x}");
                Ok(())
            }
        }
    }

    fn process_lldp_frame(
        &self,
        receiving_interface: MacAddr,
        payload: &[u8],
    ) -> Result<(), AlError> {
        let discovery = match BridgeDiscovery::from_bytes(&mut Cursor::new(payload)) {
            Ok(discovery) => discovery,
            Err(err) => {
                warn!("malformed LLDP bridge discovery: {err}");
                return Ok(());
            }
        };
        debug!(
            "<-- LLDP bridge discovery from {} on {}",
            discovery.al_mac, receiving_interface
        );
        self.db.lock().update_discovery_timestamp(
            receiving_interface,
            discovery.al_mac,
            discovery.interface_mac,
            DiscoverySource::BridgeDiscovery,
            Instant::now(),
        );
        Ok(())
    }

    fn process_1905_frame(
        &self,
        interface: &str,
        receiving_interface: MacAddr,
        src: MacAddr,
        payload: &[u8],
    ) -> Result<(), AlError> {
        let fragment = match Fragment::parse(payload) {
            Ok(fragment) => fragment,
            Err(err) => {
                warn!("malformed CMDU fragment from {src}: {err}");
                return Ok(());
            }
        };
        let complete = match self
            .reassembler
            .lock()
            .insert(src, fragment, Instant::now())
        {
            Ok(Some(fragments)) => fragments,
            Ok(None) => return Ok(()),
            Err(err) => {
                warn!("inconsistent fragment group from {src}: {err}");
                return Ok(());
            }
        };
        let cmdu = match Cmdu::parse(&complete) {
            Ok(cmdu) => cmdu,
            Err(err) => {
                warn!("dropping malformed CMDU from {src}: {err}");
                return Ok(());
            }
        };
        if !self
            .duplicates
            .lock()
            .accept(src, cmdu.message_type.into(), cmdu.message_id)
        {
            debug!(
                "dropping duplicate CMDU {:?} mid {} from {src}",
                cmdu.message_type, cmdu.message_id
            );
            return Ok(());
        }
        self.extensions.on_receive(&cmdu);
        self.handle_cmdu(cmdu, interface, receiving_interface, src)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::platform::testing::FakePlatform;

    fn context() -> AlContext {
        let mut platform = FakePlatform::new();
        platform.add_ethernet_interface("eth0", MacAddr([2, 0, 0, 0, 1, 1]));
        AlContext::new(
            AlConfigBuilder::default()
                .al_mac(MacAddr([2, 0, 0, 0, 0, 1]))
                .build()
                .unwrap(),
            Arc::new(platform),
        )
    }

    #[test]
    fn test_interface_lookup() {
        let al = context();
        assert_eq!(
            al.interface_mac("eth0"),
            Some(MacAddr([2, 0, 0, 0, 1, 1]))
        );
        assert_eq!(
            al.interface_name(MacAddr([2, 0, 0, 0, 1, 1])).as_deref(),
            Some("eth0")
        );
        assert_eq!(al.interface_mac("wan0"), None);
    }

    #[test]
    fn test_garbage_frame_is_dropped_quietly() {
        let al = context();
        let before = al.db.lock().device_count();
        al.process_raw_frame("eth0", MacAddr([9, 9, 9, 9, 9, 9]), ETHERTYPE_1905, &[0x01])
            .unwrap();
        assert_eq!(al.db.lock().device_count(), before);
    }

    #[test]
    fn test_lldp_frame_updates_links() {
        let al = context();
        let frame = crate::serialize(&BridgeDiscovery::new(
            MacAddr([2, 0, 0, 0, 0, 2]),
            MacAddr([2, 0, 0, 0, 1, 2]),
        ))
        .unwrap();
        al.process_raw_frame("eth0", MacAddr([2, 0, 0, 0, 1, 2]), ETHERTYPE_LLDP, &frame)
            .unwrap();
        let db = al.db.lock();
        assert_eq!(db.links().len(), 1);
        assert!(db.links()[0].last_bridge_discovery.is_some());
    }
}
