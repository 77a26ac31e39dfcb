use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use futures_util::future::join_all;
use tokio::sync::Mutex;

use campusnet_core::error::{CampusNetError, Result};
use campusnet_core::flow::{AttachmentPoint, RuleRef};
use campusnet_core::model::{Connection, ConnectionKey, Identity, Server, Service};

use crate::config::FlowSection;
use crate::connections::registry::ConnectionRegistry;
use crate::install::{InstallRequest, PathInstaller};
use crate::obs::metrics::ControllerMetrics;
use crate::topology::{FlowProgrammer, ServerAttachments, TopologyClient};

/// Snapshot of an authorized request, detached from the directory locks.
#[derive(Debug, Clone)]
pub struct ConnectionTarget {
    pub client: Identity,
    pub server: Server,
    pub service: Service,
}

impl ConnectionTarget {
    pub fn key(&self) -> ConnectionKey {
        ConnectionKey {
            client_mac: self.client.hardware_address.clone(),
            server_ip: self.server.ip,
            service_name: self.service.name.clone(),
            protocol: self.service.protocol,
            port: self.service.port,
        }
    }
}

/// Attachment -> path -> install -> register, serialized per connection key.
pub struct ConnectionManager {
    topology: Arc<dyn TopologyClient>,
    flows: Arc<dyn FlowProgrammer>,
    installer: PathInstaller,
    server_attachments: ServerAttachments,
    registry: ConnectionRegistry,
    key_locks: DashMap<ConnectionKey, Arc<Mutex<()>>>,
    rollback_partial: bool,
    metrics: Arc<ControllerMetrics>,
}

impl ConnectionManager {
    pub fn new(
        topology: Arc<dyn TopologyClient>,
        flows: Arc<dyn FlowProgrammer>,
        flow_cfg: &FlowSection,
        server_attachments: ServerAttachments,
        metrics: Arc<ControllerMetrics>,
    ) -> Self {
        let installer = PathInstaller::new(
            Arc::clone(&flows),
            flow_cfg.priority,
            flow_cfg.install_broadcast_rule,
            Arc::clone(&metrics),
        );
        Self {
            topology,
            flows,
            installer,
            server_attachments,
            registry: ConnectionRegistry::new(),
            key_locks: DashMap::new(),
            rollback_partial: flow_cfg.rollback_partial_installs,
            metrics,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    fn key_lock(&self, key: &ConnectionKey) -> Arc<Mutex<()>> {
        self.key_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    fn release_key_lock(&self, key: &ConnectionKey) {
        // Only the map holds it once no caller is waiting.
        self.key_locks
            .remove_if(key, |_, m| Arc::strong_count(m) == 1);
    }

    async fn timed<T>(&self, op: &'static str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let started = Instant::now();
        let out = fut.await;
        self.metrics
            .topology_duration
            .observe(&[("op", op)], started.elapsed());
        out
    }

    /// Program the path for an already-authorized target and register it.
    ///
    /// A live connection for the same client, server ip and service
    /// (name, protocol, port) is returned as-is instead of installing a second rule set.
    pub async fn establish(&self, target: &ConnectionTarget) -> Result<String> {
        let key = target.key();
        let lock = self.key_lock(&key);
        let result = {
            let _guard = lock.lock().await;
            match self.registry.find(&key) {
                Some(existing) => {
                    tracing::info!(handler = %existing.handler, client = %key.client_mac, "connection already active");
                    Ok(existing.handler)
                }
                None => self.establish_locked(target).await,
            }
        };
        drop(lock);
        self.release_key_lock(&key);

        match &result {
            Ok(_) => {}
            Err(e) => self
                .metrics
                .connection_failures
                .inc(&[("reason", e.client_code().as_str())]),
        }
        result
    }

    async fn establish_locked(&self, target: &ConnectionTarget) -> Result<String> {
        let client_mac = &target.client.hardware_address;

        let source = self
            .timed("attachment", self.topology.attachment(client_mac))
            .await
            .map_err(|e| match e {
                CampusNetError::NotFound { .. } => {
                    tracing::warn!(client = %client_mac, "client device is not attached to the network");
                    CampusNetError::Denied
                }
                other => other,
            })?;
        let destination = self.server_attachment(&target.server).await?;

        let path = self
            .timed("path", self.topology.path(&source, &destination))
            .await?;
        if path.is_empty() {
            tracing::warn!(src = %source, dst = %destination, "topology authority returned no route");
            return Err(CampusNetError::NoRouteFound);
        }

        let seq = self.registry.next_seq();
        let req = InstallRequest {
            seq,
            client_mac,
            server_ip: target.server.ip,
            service: &target.service,
            source: &source,
            path: &path,
        };

        match self.installer.install(req).await {
            Ok(rules) => {
                let conn = self.registry.create(
                    seq,
                    client_mac.clone(),
                    target.server.ip,
                    &target.service,
                    rules,
                );
                self.metrics.connections_created.inc(&[]);
                self.metrics.connections_active.inc(&[]);
                tracing::info!(
                    handler = %conn.handler,
                    client = %client_mac,
                    server = %target.server,
                    service = %target.service,
                    hops = path.len(),
                    rules = conn.installed_rules.len(),
                    "connection established"
                );
                Ok(conn.handler)
            }
            Err(failure) => {
                if self.rollback_partial && !failure.installed.is_empty() {
                    let leftovers = self.rollback(&failure.installed).await;
                    if leftovers > 0 {
                        tracing::warn!(seq, leftovers, "partial install rollback left rules behind");
                    }
                }
                Err(failure.into())
            }
        }
    }

    async fn server_attachment(&self, server: &Server) -> Result<AttachmentPoint> {
        if let Some(at) = self.server_attachments.get(&server.ip) {
            return Ok(at.clone());
        }
        let Some(mac) = &server.mac else {
            return Err(CampusNetError::TopologyUnavailable(format!(
                "no attachment known for server {server}"
            )));
        };
        self.timed("attachment", self.topology.attachment(mac))
            .await
            .map_err(|e| match e {
                CampusNetError::NotFound { .. } => CampusNetError::TopologyUnavailable(format!(
                    "server {server} is not attached to the network"
                )),
                other => other,
            })
    }

    /// Reverse-order best-effort deletion. Returns how many deletions failed.
    async fn rollback(&self, installed: &[RuleRef]) -> usize {
        let mut failed = 0;
        for rule in installed.iter().rev() {
            if let Err(e) = self.flows.delete(rule).await {
                failed += 1;
                self.metrics.teardown_errors.inc(&[("phase", "rollback")]);
                tracing::warn!(rule = %rule.name, switch = %rule.switch_id, error = %e, "rollback delete failed");
            }
        }
        failed
    }

    /// Remove remote rules best-effort, then always free the handler.
    ///
    /// The handler is looked up again under the key lock; a concurrent
    /// removal that got there first leaves this one with `NotFound`.
    pub async fn teardown(&self, handler: &str) -> Result<bool> {
        let key = self.registry.get(handler)?.key();
        let lock = self.key_lock(&key);
        let result = {
            let _guard = lock.lock().await;
            match self.registry.get(handler) {
                Ok(conn) => {
                    self.teardown_locked(&conn).await;
                    Ok(self.registry.remove(handler).is_some())
                }
                Err(e) => Err(e),
            }
        };
        drop(lock);
        self.release_key_lock(&key);

        if let Ok(true) = result {
            self.metrics.connections_active.dec(&[]);
            tracing::info!(handler, "connection removed");
        }
        result
    }

    async fn teardown_locked(&self, conn: &Connection) {
        let results = join_all(conn.installed_rules.iter().map(|r| self.flows.delete(r))).await;
        for (rule, res) in conn.installed_rules.iter().zip(results) {
            if let Err(e) = res {
                self.metrics.teardown_errors.inc(&[("phase", "teardown")]);
                tracing::warn!(handler = %conn.handler, rule = %rule.name, switch = %rule.switch_id, error = %e, "flow rule removal failed; dropping connection anyway");
            }
        }
    }
}
