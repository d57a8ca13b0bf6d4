use std::collections::BTreeSet;

use crate::net::SessionId;
use crate::sync::HostReelection;

#[derive(Debug)]
pub struct SessionResolver {
    local: Option<SessionId>,
    peers: BTreeSet<SessionId>,
    host: Option<SessionId>,
    reelection: HostReelection,
}

impl SessionResolver {
    pub fn new(reelection: HostReelection) -> Self {
        Self {
            local: None,
            peers: BTreeSet::new(),
            host: None,
            reelection,
        }
    }

    pub fn set_local(&mut self, session: SessionId) {
        self.local = Some(session);
    }

    pub fn local(&self) -> Option<&SessionId> {
        self.local.as_ref()
    }

    pub fn is_local(&self, session: &SessionId) -> bool {
        self.local.as_ref() == Some(session)
    }

    pub fn host(&self) -> Option<&SessionId> {
        self.host.as_ref()
    }

    pub fn is_host(&self) -> bool {
        self.local.is_some() && self.local == self.host
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn elect_on_match<I>(&mut self, roster: I) -> Option<&SessionId>
    where
        I: IntoIterator<Item = SessionId>,
    {
        self.peers = roster.into_iter().collect();
        self.host = self.peers.last().cloned();
        self.host.as_ref()
    }

    pub fn peer_joined(&mut self, session: SessionId) -> bool {
        let inserted = self.peers.insert(session);
        if self.host.is_none() {
            self.host = self.peers.last().cloned();
        }
        inserted
    }

    pub fn peer_left(&mut self, session: &SessionId) -> bool {
        if !self.peers.remove(session) {
            return false;
        }
        if self.host.as_ref() != Some(session) {
            return false;
        }

        self.host = match self.reelection {
            HostReelection::Smallest => self.peers.first().cloned(),
            HostReelection::Greatest => self.peers.last().cloned(),
        };
        true
    }

    pub fn clear(&mut self) {
        self.local = None;
        self.peers.clear();
        self.host = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<SessionId> {
        names.iter().map(|n| SessionId::from(*n)).collect()
    }

    #[test]
    fn test_host_election() {
        let mut resolver = SessionResolver::new(HostReelection::Smallest);
        resolver.set_local(SessionId::from("b1"));

        let host = resolver.elect_on_match(ids(&["a3", "b1", "c9"]));
        assert_eq!(host.map(SessionId::as_str), Some("c9"));
        assert!(!resolver.is_host());

        assert!(resolver.peer_left(&SessionId::from("c9")));
        assert_eq!(resolver.host().map(SessionId::as_str), Some("a3"));
        assert_eq!(resolver.peer_count(), 2);
    }

    #[test]
    fn test_greatest_reelection() {
        let mut resolver = SessionResolver::new(HostReelection::Greatest);
        resolver.set_local(SessionId::from("b1"));
        resolver.elect_on_match(ids(&["a3", "b1", "c9"]));

        resolver.peer_left(&SessionId::from("c9"));
        assert!(resolver.is_host());
    }

    #[test]
    fn test_non_host_departure_keeps_host() {
        let mut resolver = SessionResolver::new(HostReelection::Smallest);
        resolver.elect_on_match(ids(&["a3", "b1", "c9"]));

        assert!(!resolver.peer_left(&SessionId::from("a3")));
        assert!(!resolver.peer_left(&SessionId::from("unknown")));
        assert_eq!(resolver.host().map(SessionId::as_str), Some("c9"));
    }

    #[test]
    fn test_no_peers_means_no_host() {
        let mut resolver = SessionResolver::new(HostReelection::Smallest);
        resolver.set_local(SessionId::from("a"));
        resolver.elect_on_match(ids(&["a"]));
        assert!(resolver.is_host());

        assert!(resolver.peer_left(&SessionId::from("a")));
        assert_eq!(resolver.host(), None);
        assert!(!resolver.is_host());

        assert!(resolver.peer_joined(SessionId::from("z")));
        assert_eq!(resolver.host().map(SessionId::as_str), Some("z"));
        assert!(!resolver.peer_joined(SessionId::from("z")));
    }
}
