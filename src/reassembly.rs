//! Receive-side CMDU fragment grouping.
//!
//! Reassembly is keyed on (source MAC, message type, message ID). A
//! partial group is held until every fragment-ID from 0 to N-1 has
//! arrived, where N is implied by the fragment carrying the
//! last-fragment flag. Out-of-order arrival is fine. A group that
//! sees no new fragment within the timeout window is discarded
//! silently on the next insertion.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use log::{debug, warn};

use crate::{cmdu::Fragment, err::DeError, types::MacAddr};

/// How long a partial group may sit without progress. The standard
/// requires at least five seconds.
pub const REASSEMBLY_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct GroupKey {
    src: MacAddr,
    message_type: u16,
    message_id: u16,
}

struct Group {
    fragments: Vec<Fragment>,
    last_fragment_id: Option<u8>,
    last_activity: Instant,
}

impl Group {
    fn is_complete(&self) -> bool {
        match self.last_fragment_id {
            Some(last) => self.fragments.len() == last as usize + 1,
            None => false,
        }
    }
}

/// Collects fragments into groups and hands back the ordered set
/// once a group completes.
#[derive(Default)]
pub struct Reassembler {
    groups: HashMap<GroupKey, Group>,
}

impl Reassembler {
    /// Create an empty reassembler.
    pub fn new() -> Self {
        Reassembler::default()
    }

    /// Number of in-flight partial groups, for observability.
    pub fn pending(&self) -> usize {
        self.groups.len()
    }

    /// Insert one received fragment.
    ///
    /// Returns the complete, fragment-ID-ordered group once its last
    /// piece arrives. A duplicate fragment-ID or a second
    /// last-fragment flag is fatal to the whole group.
    pub fn insert(
        &mut self,
        src: MacAddr,
        fragment: Fragment,
        now: Instant,
    ) -> Result<Option<Vec<Fragment>>, DeError> {
        self.sweep(now);

        let key = GroupKey {
            src,
            message_type: fragment.header.message_type,
            message_id: fragment.header.message_id,
        };

        let violation = match self.groups.get(&key) {
            Some(group) => {
                group
                    .fragments
                    .iter()
                    .any(|f| f.header.fragment_id == fragment.header.fragment_id)
                    || (fragment.header.is_last_fragment() && group.last_fragment_id.is_some())
            }
            None => false,
        };
        if violation {
            self.groups.remove(&key);
            return Err(DeError::DuplicateFragment);
        }

        let group = self.groups.entry(key.clone()).or_insert_with(|| Group {
            fragments: Vec::new(),
            last_fragment_id: None,
            last_activity: now,
        });
        group.last_activity = now;
        if fragment.header.is_last_fragment() {
            group.last_fragment_id = Some(fragment.header.fragment_id);
        }
        group.fragments.push(fragment);
        let complete = group.is_complete();

        if complete {
            let mut group = self
                .groups
                .remove(&key)
                .expect("group present, just inserted into");
            group
                .fragments
                .sort_by_key(|fragment| fragment.header.fragment_id);
            debug!(
                "reassembled CMDU mid {} from {} ({} fragments)",
                key.message_id,
                key.src,
                group.fragments.len()
            );
            Ok(Some(group.fragments))
        } else {
            Ok(None)
        }
    }

    fn sweep(&mut self, now: Instant) {
        self.groups.retain(|key, group| {
            let alive = now.duration_since(group.last_activity) < REASSEMBLY_TIMEOUT;
            if !alive {
                warn!(
                    "discarding stale reassembly group mid {} from {}",
                    key.message_id, key.src
                );
            }
            alive
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::consts::cmdu::{CmduFlags, MessageType};
    use crate::cmdu::CmduHeader;

    fn fragment(fragment_id: u8, last: bool) -> Fragment {
        let mut flags = CmduFlags::empty();
        if last {
            flags |= CmduFlags::LAST_FRAGMENT;
        }
        Fragment {
            header: CmduHeader {
                message_version: 0,
                message_type: MessageType::TopologyResponse.into(),
                message_id: 42,
                fragment_id,
                flags,
            },
            payload: vec![fragment_id],
        }
    }

    const SRC: MacAddr = MacAddr([2, 0, 0, 0, 0, 1]);

    #[test]
    fn test_single_fragment_completes_immediately() {
        let mut r = Reassembler::new();
        let done = r.insert(SRC, fragment(0, true), Instant::now()).unwrap();
        assert_eq!(done.unwrap().len(), 1);
        assert_eq!(r.pending(), 0);
    }

    #[test]
    fn test_out_of_order_reassembly() {
        let mut r = Reassembler::new();
        let now = Instant::now();
        assert!(r.insert(SRC, fragment(2, true), now).unwrap().is_none());
        assert!(r.insert(SRC, fragment(0, false), now).unwrap().is_none());
        let done = r.insert(SRC, fragment(1, false), now).unwrap().unwrap();
        let ids: Vec<u8> = done.iter().map(|f| f.header.fragment_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_fragment_id_kills_group() {
        let mut r = Reassembler::new();
        let now = Instant::now();
        assert!(r.insert(SRC, fragment(0, false), now).unwrap().is_none());
        assert!(matches!(
            r.insert(SRC, fragment(0, false), now),
            Err(DeError::DuplicateFragment)
        ));
        assert_eq!(r.pending(), 0);
    }

    #[test]
    fn test_second_last_flag_kills_group() {
        let mut r = Reassembler::new();
        let now = Instant::now();
        assert!(r.insert(SRC, fragment(1, true), now).unwrap().is_none());
        assert!(matches!(
            r.insert(SRC, fragment(0, true), now),
            Err(DeError::DuplicateFragment)
        ));
    }

    #[test]
    fn test_groups_keyed_by_source() {
        let mut r = Reassembler::new();
        let now = Instant::now();
        let other = MacAddr([2, 0, 0, 0, 0, 2]);
        assert!(r.insert(SRC, fragment(0, false), now).unwrap().is_none());
        // Same IDs from another source do not collide.
        assert!(r.insert(other, fragment(0, false), now).unwrap().is_none());
        assert_eq!(r.pending(), 2);
    }

    #[test]
    fn test_stale_group_expires() {
        let mut r = Reassembler::new();
        let start = Instant::now();
        assert!(r.insert(SRC, fragment(0, false), start).unwrap().is_none());
        let later = start + REASSEMBLY_TIMEOUT + Duration::from_secs(1);
        // The sweep runs on insertion; a fresh fragment 1 alone no
        // longer completes anything because fragment 0 is gone.
        assert!(r.insert(SRC, fragment(1, true), later).unwrap().is_none());
        assert_eq!(r.pending(), 1);
    }
}
