use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use campusnet_core::error::{CampusNetError, EntityKind, Result};
use campusnet_core::flow::RuleRef;
use campusnet_core::model::{Connection, ConnectionKey, HardwareAddress, Service};

#[derive(Clone)]
struct ConnectionEntry {
    conn: Connection,
    created_seq: u64,
}

/// Active connection registry:
/// - `handler -> Connection`
/// - `(client, server ip, service, protocol, port) -> handler`
///
/// Handlers come from a counter owned by the registry; a handler is never
/// handed out twice, even after its connection is removed.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<String, ConnectionEntry>,
    by_key: DashMap<ConnectionKey, String>,
    seq: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next connection sequence number.
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    pub fn handler_for(seq: u64) -> String {
        format!("conn_{seq}")
    }

    /// Record a fully installed connection under the handler derived from `seq`.
    pub fn create(
        &self,
        seq: u64,
        client_mac: HardwareAddress,
        server_ip: Ipv4Addr,
        service: &Service,
        installed_rules: Vec<RuleRef>,
    ) -> Connection {
        let conn = Connection {
            handler: Self::handler_for(seq),
            client_mac,
            server_ip,
            service_name: service.name.clone(),
            protocol: service.protocol,
            port: service.port,
            installed_rules,
        };
        self.by_key.insert(conn.key(), conn.handler.clone());
        self.connections.insert(
            conn.handler.clone(),
            ConnectionEntry {
                conn: conn.clone(),
                created_seq: seq,
            },
        );
        conn
    }

    pub fn get(&self, handler: &str) -> Result<Connection> {
        self.connections
            .get(handler)
            .map(|e| e.value().conn.clone())
            .ok_or_else(|| CampusNetError::not_found(EntityKind::Connection, handler))
    }

    /// Live connection for an identical request, if any.
    pub fn find(&self, key: &ConnectionKey) -> Option<Connection> {
        let handler = self.by_key.get(key)?.value().clone();
        self.get(&handler).ok()
    }

    pub fn remove(&self, handler: &str) -> Option<Connection> {
        let (_, entry) = self.connections.remove(handler)?;
        self.by_key
            .remove_if(&entry.conn.key(), |_, h| h == handler);
        Some(entry.conn)
    }

    /// All connections in creation order.
    pub fn list(&self) -> Vec<Connection> {
        let mut entries: Vec<ConnectionEntry> =
            self.connections.iter().map(|e| e.value().clone()).collect();
        entries.sort_by_key(|e| e.created_seq);
        entries.into_iter().map(|e| e.conn).collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
