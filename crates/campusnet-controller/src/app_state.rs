//! Shared application state for the campusnet controller.
//!
//! One explicit context object owns the directory, the policy store and the
//! connection manager; handlers and the binary hold a cheap clone of it.
//! Directory and policy live behind reader-writer locks: authorization takes
//! the shared side, and no guard is ever held across a network call.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use campusnet_core::error::{CampusNetError, Result};
use campusnet_core::model::{
    AllowRule, Connection, EnrollmentGroup, GroupStatus, Identity, Server, Service,
};

use crate::config::ControllerConfig;
use crate::connections::{ConnectionManager, ConnectionTarget};
use crate::directory::Directory;
use crate::inventory::{GroupDocument, ImportSummary, InventoryDocument};
use crate::obs::metrics::ControllerMetrics;
use crate::policy::{AccessDecision, AuthorizationEngine, PolicyStore};
use crate::topology::{FloodlightClient, FlowProgrammer, ServerAttachments, TopologyClient};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ControllerConfig,
    directory: RwLock<Directory>,
    policy: RwLock<PolicyStore>,
    connections: ConnectionManager,
    metrics: Arc<ControllerMetrics>,
}

impl AppState {
    /// Build state talking to the configured Floodlight-compatible authority.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: ControllerConfig) -> Result<Self> {
        let client = Arc::new(FloodlightClient::from_config(&cfg.topology)?);
        let topology: Arc<dyn TopologyClient> = client.clone();
        let flows: Arc<dyn FlowProgrammer> = client;
        Self::with_backends(cfg, topology, flows)
    }

    /// Build state over arbitrary topology / flow backends.
    pub fn with_backends(
        cfg: ControllerConfig,
        topology: Arc<dyn TopologyClient>,
        flows: Arc<dyn FlowProgrammer>,
    ) -> Result<Self> {
        cfg.validate()?;

        let metrics = Arc::new(ControllerMetrics::default());
        let server_attachments = ServerAttachments::from_config(&cfg.server_attachments);
        if server_attachments.is_empty() {
            tracing::warn!("no server_attachments configured; servers must carry a mac to be located");
        }

        let connections = ConnectionManager::new(
            topology,
            flows,
            &cfg.flows,
            server_attachments,
            Arc::clone(&metrics),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                directory: RwLock::new(Directory::new()),
                policy: RwLock::new(PolicyStore::new()),
                connections,
                metrics,
            }),
        })
    }

    pub fn cfg(&self) -> &ControllerConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<ControllerMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    /// Inventory sizes appended to `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        let mut extra = Vec::with_capacity(3);
        if let Ok(dir) = self.directory() {
            extra.push(("campusnet_identities", dir.identity_count() as u64));
            extra.push(("campusnet_servers", dir.server_count() as u64));
        }
        if let Ok(policy) = self.policy() {
            extra.push(("campusnet_groups", policy.group_count() as u64));
        }
        extra
    }

    // --------------------
    // Lock helpers (poisoned lock => Internal, never panic)
    // --------------------

    fn directory(&self) -> Result<RwLockReadGuard<'_, Directory>> {
        self.inner
            .directory
            .read()
            .map_err(|_| CampusNetError::Internal("directory lock poisoned".into()))
    }

    fn directory_mut(&self) -> Result<RwLockWriteGuard<'_, Directory>> {
        self.inner
            .directory
            .write()
            .map_err(|_| CampusNetError::Internal("directory lock poisoned".into()))
    }

    fn policy(&self) -> Result<RwLockReadGuard<'_, PolicyStore>> {
        self.inner
            .policy
            .read()
            .map_err(|_| CampusNetError::Internal("policy lock poisoned".into()))
    }

    fn policy_mut(&self) -> Result<RwLockWriteGuard<'_, PolicyStore>> {
        self.inner
            .policy
            .write()
            .map_err(|_| CampusNetError::Internal("policy lock poisoned".into()))
    }

    // --------------------
    // Directory
    // --------------------

    pub fn add_identity(&self, identity: Identity) -> Result<()> {
        self.directory_mut()?.add_identity(identity)
    }

    pub fn identity(&self, id: &str) -> Result<Identity> {
        self.directory()?.identity(id).cloned()
    }

    pub fn identities(&self) -> Result<Vec<Identity>> {
        Ok(self.directory()?.identities().cloned().collect())
    }

    pub fn remove_identity(&self, id: &str) -> Result<Identity> {
        self.directory_mut()?.remove_identity(id)
    }

    pub fn add_server(&self, server: Server) -> Result<()> {
        self.directory_mut()?.add_server(server)
    }

    pub fn server(&self, name: &str) -> Result<Server> {
        self.directory()?.server(name).cloned()
    }

    pub fn servers(&self) -> Result<Vec<Server>> {
        Ok(self.directory()?.servers().cloned().collect())
    }

    pub fn remove_server(&self, name: &str) -> Result<Server> {
        self.directory_mut()?.remove_server(name)
    }

    pub fn add_service(&self, server: &str, service: Service) -> Result<()> {
        self.directory_mut()?.add_service(server, service)
    }

    pub fn service(&self, server: &str, service: &str) -> Result<Service> {
        let dir = self.directory()?;
        let (_, svc) = dir.service(server, service)?;
        Ok(svc.clone())
    }

    // --------------------
    // Policy store
    // --------------------

    /// Initial members must be known identities.
    pub fn add_group(&self, group: EnrollmentGroup) -> Result<()> {
        let dir = self.directory()?;
        for m in &group.members {
            dir.identity(m)?;
        }
        self.policy_mut()?.add_group(group)
    }

    pub fn group(&self, code: &str) -> Result<EnrollmentGroup> {
        self.policy()?.group(code).cloned()
    }

    pub fn groups(&self) -> Result<Vec<EnrollmentGroup>> {
        Ok(self.policy()?.groups().cloned().collect())
    }

    pub fn remove_group(&self, code: &str) -> Result<EnrollmentGroup> {
        self.policy_mut()?.remove_group(code)
    }

    pub fn set_group_status(&self, code: &str, status: GroupStatus) -> Result<()> {
        self.policy_mut()?.set_status(code, status)?;
        tracing::info!(group = code, status = status.as_str(), "group status changed");
        Ok(())
    }

    /// Enroll a known identity. Re-enrolling is a no-op (`Ok(false)`).
    pub fn add_member(&self, code: &str, identity_id: &str) -> Result<bool> {
        let dir = self.directory()?;
        dir.identity(identity_id)?;
        self.policy_mut()?.add_member(code, identity_id)
    }

    pub fn remove_member(&self, code: &str, identity_id: &str) -> Result<bool> {
        self.policy_mut()?.remove_member(code, identity_id)
    }

    pub fn add_allow_rule(&self, code: &str, rule: AllowRule) -> Result<bool> {
        self.policy_mut()?.add_allow_rule(code, rule)
    }

    pub fn remove_allow_rule(&self, code: &str, rule: &AllowRule) -> Result<bool> {
        self.policy_mut()?.remove_allow_rule(code, rule)
    }

    /// Members resolved to identities; ids no longer in the directory are skipped.
    pub fn group_members(&self, code: &str) -> Result<Vec<Identity>> {
        let dir = self.directory()?;
        let policy = self.policy()?;
        let group = policy.group(code)?;
        Ok(group
            .members
            .iter()
            .filter_map(|id| dir.identity(id).ok().cloned())
            .collect())
    }

    // --------------------
    // Authorization
    // --------------------

    pub fn evaluate(&self, identity_id: &str, server: &str, service: &str) -> Result<AccessDecision> {
        let dir = self.directory()?;
        let policy = self.policy()?;
        let decision = AuthorizationEngine::new(&dir, &policy).evaluate(identity_id, server, service);
        self.inner
            .metrics
            .authorization_decisions
            .inc(&[("decision", decision.label())]);
        Ok(decision)
    }

    pub fn is_authorized(&self, identity_id: &str, server: &str, service: &str) -> Result<bool> {
        Ok(self.evaluate(identity_id, server, service)?.is_allowed())
    }

    /// Active groups granting (server, service).
    pub fn groups_granting(&self, server: &str, service: &str) -> Result<Vec<EnrollmentGroup>> {
        let dir = self.directory()?;
        let policy = self.policy()?;
        Ok(AuthorizationEngine::new(&dir, &policy)
            .groups_granting(server, service)
            .into_iter()
            .cloned()
            .collect())
    }

    // --------------------
    // Connections
    // --------------------

    pub async fn create_connection(
        &self,
        identity_id: &str,
        server: &str,
        service: &str,
    ) -> Result<String> {
        let target = self.authorized_target(identity_id, server, service)?;
        self.inner.connections.establish(&target).await
    }

    fn authorized_target(
        &self,
        identity_id: &str,
        server: &str,
        service: &str,
    ) -> Result<ConnectionTarget> {
        // One pair of guards: a concurrent delete can only surface as a denial.
        let dir = self.directory()?;
        let policy = self.policy()?;
        let decision = AuthorizationEngine::new(&dir, &policy).evaluate(identity_id, server, service);
        self.inner
            .metrics
            .authorization_decisions
            .inc(&[("decision", decision.label())]);
        if let AccessDecision::Deny(reason) = decision {
            tracing::warn!(
                identity = identity_id,
                server,
                service,
                reason = reason.as_str(),
                "connection request denied"
            );
            self.inner
                .metrics
                .connection_failures
                .inc(&[("reason", "DENIED")]);
            return Err(CampusNetError::Denied);
        }

        let (srv, svc) = dir.service(server, service)?;
        Ok(ConnectionTarget {
            client: dir.identity(identity_id)?.clone(),
            server: srv.clone(),
            service: svc.clone(),
        })
    }

    pub async fn remove_connection(&self, handler: &str) -> Result<bool> {
        self.inner.connections.teardown(handler).await
    }

    pub fn connection(&self, handler: &str) -> Result<Connection> {
        self.inner.connections.registry().get(handler)
    }

    pub fn connections(&self) -> Vec<Connection> {
        self.inner.connections.registry().list()
    }

    /// Tear down every active connection (shutdown path).
    pub async fn teardown_all(&self) -> usize {
        let mut removed = 0;
        for conn in self.connections() {
            match self.remove_connection(&conn.handler).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!(handler = %conn.handler, error = %e, "teardown failed"),
            }
        }
        removed
    }

    // --------------------
    // Inventory
    // --------------------

    /// Apply a document atomically: any conflict leaves state untouched.
    pub fn import_inventory(&self, doc: InventoryDocument) -> Result<ImportSummary> {
        let mut dir = self.directory_mut()?;
        let mut policy = self.policy_mut()?;

        let mut staged_dir = dir.clone();
        let mut staged_policy = policy.clone();
        let summary = ImportSummary {
            identities: doc.identities.len(),
            servers: doc.servers.len(),
            groups: doc.groups.len(),
        };

        for identity in doc.identities {
            staged_dir.add_identity(identity)?;
        }
        for server in doc.servers {
            staged_dir.add_server(server)?;
        }
        for group in doc.groups {
            staged_policy.add_group(group.into_group())?;
        }

        *dir = staged_dir;
        *policy = staged_policy;
        tracing::info!(
            identities = summary.identities,
            servers = summary.servers,
            groups = summary.groups,
            "inventory imported"
        );
        Ok(summary)
    }

    pub fn export_inventory(&self) -> Result<InventoryDocument> {
        let dir = self.directory()?;
        let policy = self.policy()?;
        Ok(InventoryDocument {
            identities: dir.identities().cloned().collect(),
            servers: dir.servers().cloned().collect(),
            groups: policy.groups().map(GroupDocument::from_group).collect(),
        })
    }
}
