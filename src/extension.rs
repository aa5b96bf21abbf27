//! Vendor-specific protocol extension registration.
//!
//! Third parties extend 1905 by tagging vendor specific TLVs with
//! their OUI. The core stays out of the business of interpreting
//! them: extensions are registered up front and called back at
//! exactly two points, CMDU entry (receive) and CMDU exit (send).
//! Inner vendor TLV payloads are opaque byte sequences here.

use crate::{cmdu::Cmdu, datamodel::TopologyDatabase, tlv::Tlv};

/// One registered protocol extension, keyed by its OUI.
pub trait CmduExtension: Send + Sync {
    /// The OUI whose vendor specific TLVs this extension consumes.
    fn oui(&self) -> [u8; 3];

    /// Short name for logging.
    fn name(&self) -> &str;

    /// Called for every received CMDU that carries at least one
    /// vendor specific TLV with a matching OUI. `payloads` holds the
    /// matching TLVs' opaque data, in message order.
    fn on_receive(&self, cmdu: &Cmdu, payloads: &[&[u8]]);

    /// Called for every outgoing CMDU before it is forged; the
    /// extension may append vendor specific TLVs.
    fn on_send(&self, cmdu: &mut Cmdu);

    /// Contribute lines to a topology database dump.
    fn dump(&self, _db: &TopologyDatabase, _out: &mut String) {}
}

/// The set of extensions registered with one AL instance.
#[derive(Default)]
pub struct ExtensionRegistry {
    extensions: Vec<Box<dyn CmduExtension>>,
}

impl ExtensionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        ExtensionRegistry::default()
    }

    /// Register an extension. Returns false (and drops the
    /// extension) when its OUI is already taken.
    pub fn register(&mut self, extension: Box<dyn CmduExtension>) -> bool {
        if self
            .extensions
            .iter()
            .any(|existing| existing.oui() == extension.oui())
        {
            return false;
        }
        self.extensions.push(extension);
        true
    }

    /// Number of registered extensions.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// CMDU entry hook: route vendor specific TLVs to the extensions
    /// owning their OUI.
    pub fn on_receive(&self, cmdu: &Cmdu) {
        if self.extensions.is_empty() {
            return;
        }
        for extension in &self.extensions {
            let payloads: Vec<&[u8]> = cmdu
                .tlvs
                .iter()
                .filter_map(|tlv| match tlv {
                    Tlv::VendorSpecific(vs) if vs.oui == extension.oui() => {
                        Some(vs.data.as_slice())
                    }
                    _ => None,
                })
                .collect();
            if !payloads.is_empty() {
                extension.on_receive(cmdu, &payloads);
            }
        }
    }

    /// CMDU exit hook.
    pub fn on_send(&self, cmdu: &mut Cmdu) {
        for extension in &self.extensions {
            extension.on_send(cmdu);
        }
    }

    /// Let every extension append to a database dump.
    pub fn dump(&self, db: &TopologyDatabase, out: &mut String) {
        for extension in &self.extensions {
            extension.dump(db, out);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::{
        consts::cmdu::MessageType,
        tlv::VendorSpecific,
    };

    struct CountingExtension {
        oui: [u8; 3],
        hits: Arc<AtomicUsize>,
    }

    impl CmduExtension for CountingExtension {
        fn oui(&self) -> [u8; 3] {
            self.oui
        }

        fn name(&self) -> &str {
            "counting"
        }

        fn on_receive(&self, _cmdu: &Cmdu, payloads: &[&[u8]]) {
            self.hits.fetch_add(payloads.len(), Ordering::SeqCst);
        }

        fn on_send(&self, _cmdu: &mut Cmdu) {}
    }

    #[test]
    fn test_receive_routed_by_oui() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut registry = ExtensionRegistry::new();
        assert!(registry.register(Box::new(CountingExtension {
            oui: [1, 2, 3],
            hits: Arc::clone(&hits),
        })));
        // Second registration for the same OUI is refused.
        assert!(!registry.register(Box::new(CountingExtension {
            oui: [1, 2, 3],
            hits: Arc::clone(&hits),
        })));

        let cmdu = Cmdu::new(
            MessageType::VendorSpecific,
            1,
            vec![
                Tlv::VendorSpecific(VendorSpecific {
                    oui: [1, 2, 3],
                    data: vec![0xaa],
                }),
                Tlv::VendorSpecific(VendorSpecific {
                    oui: [9, 9, 9],
                    data: vec![0xbb],
                }),
            ],
        );
        registry.on_receive(&cmdu);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
