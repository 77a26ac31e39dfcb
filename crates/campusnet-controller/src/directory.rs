//! Directory of known client identities and servers.
//!
//! Keys: identity id, identity hardware address, and server name are all
//! unique. Lookups report `NotFound` with the entity kind and key.

use std::collections::{BTreeMap, HashMap};

use campusnet_core::error::{CampusNetError, EntityKind, Result};
use campusnet_core::model::{HardwareAddress, Identity, Server, Service};

#[derive(Debug, Clone, Default)]
pub struct Directory {
    identities: BTreeMap<String, Identity>,
    by_mac: HashMap<HardwareAddress, String>,
    servers: BTreeMap<String, Server>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_identity(&mut self, identity: Identity) -> Result<()> {
        if identity.id.trim().is_empty() {
            return Err(CampusNetError::BadRequest("identity id must not be empty".into()));
        }
        if self.identities.contains_key(&identity.id) {
            return Err(CampusNetError::duplicate(EntityKind::Identity, identity.id));
        }
        if self.by_mac.contains_key(&identity.hardware_address) {
            return Err(CampusNetError::duplicate(
                EntityKind::Identity,
                identity.hardware_address.as_str(),
            ));
        }
        self.by_mac
            .insert(identity.hardware_address.clone(), identity.id.clone());
        self.identities.insert(identity.id.clone(), identity);
        Ok(())
    }

    pub fn identity(&self, id: &str) -> Result<&Identity> {
        self.identities
            .get(id)
            .ok_or_else(|| CampusNetError::not_found(EntityKind::Identity, id))
    }

    pub fn identity_by_mac(&self, mac: &HardwareAddress) -> Result<&Identity> {
        self.by_mac
            .get(mac)
            .and_then(|id| self.identities.get(id))
            .ok_or_else(|| CampusNetError::not_found(EntityKind::Identity, mac.as_str()))
    }

    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.identities.values()
    }

    /// Group memberships referencing the id are left in place; they simply
    /// stop resolving during authorization.
    pub fn remove_identity(&mut self, id: &str) -> Result<Identity> {
        let identity = self
            .identities
            .remove(id)
            .ok_or_else(|| CampusNetError::not_found(EntityKind::Identity, id))?;
        self.by_mac.remove(&identity.hardware_address);
        Ok(identity)
    }

    pub fn add_server(&mut self, server: Server) -> Result<()> {
        server.validate()?;
        if self.servers.contains_key(&server.name) {
            return Err(CampusNetError::duplicate(EntityKind::Server, server.name));
        }
        self.servers.insert(server.name.clone(), server);
        Ok(())
    }

    pub fn server(&self, name: &str) -> Result<&Server> {
        self.servers
            .get(name)
            .ok_or_else(|| CampusNetError::not_found(EntityKind::Server, name))
    }

    pub fn servers(&self) -> impl Iterator<Item = &Server> {
        self.servers.values()
    }

    pub fn remove_server(&mut self, name: &str) -> Result<Server> {
        self.servers
            .remove(name)
            .ok_or_else(|| CampusNetError::not_found(EntityKind::Server, name))
    }

    pub fn add_service(&mut self, server_name: &str, service: Service) -> Result<()> {
        self.servers
            .get_mut(server_name)
            .ok_or_else(|| CampusNetError::not_found(EntityKind::Server, server_name))?
            .add_service(service)
    }

    /// Resolve a (server, service) pair in one step.
    pub fn service(&self, server_name: &str, service_name: &str) -> Result<(&Server, &Service)> {
        let server = self.server(server_name)?;
        let service = server.service(service_name)?;
        Ok((server, service))
    }

    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }
}
