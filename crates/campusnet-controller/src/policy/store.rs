//! Enrollment group storage.

use std::collections::BTreeMap;

use campusnet_core::error::{CampusNetError, EntityKind, Result};
use campusnet_core::model::{AllowRule, EnrollmentGroup, GroupStatus};

#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    groups: BTreeMap<String, EnrollmentGroup>,
}

impl PolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, group: EnrollmentGroup) -> Result<()> {
        if group.code.trim().is_empty() {
            return Err(CampusNetError::BadRequest("group code must not be empty".into()));
        }
        if self.groups.contains_key(&group.code) {
            return Err(CampusNetError::duplicate(EntityKind::Group, group.code));
        }
        self.groups.insert(group.code.clone(), group);
        Ok(())
    }

    pub fn group(&self, code: &str) -> Result<&EnrollmentGroup> {
        self.groups
            .get(code)
            .ok_or_else(|| CampusNetError::not_found(EntityKind::Group, code))
    }

    fn group_mut(&mut self, code: &str) -> Result<&mut EnrollmentGroup> {
        self.groups
            .get_mut(code)
            .ok_or_else(|| CampusNetError::not_found(EntityKind::Group, code))
    }

    pub fn groups(&self) -> impl Iterator<Item = &EnrollmentGroup> {
        self.groups.values()
    }

    pub fn remove_group(&mut self, code: &str) -> Result<EnrollmentGroup> {
        self.groups
            .remove(code)
            .ok_or_else(|| CampusNetError::not_found(EntityKind::Group, code))
    }

    pub fn set_status(&mut self, code: &str, status: GroupStatus) -> Result<()> {
        self.group_mut(code)?.status = status;
        Ok(())
    }

    /// Idempotent: enrolling an existing member is a no-op.
    pub fn add_member(&mut self, code: &str, identity_id: &str) -> Result<bool> {
        Ok(self.group_mut(code)?.add_member(identity_id))
    }

    /// Idempotent: removing an absent member is a no-op.
    pub fn remove_member(&mut self, code: &str, identity_id: &str) -> Result<bool> {
        Ok(self.group_mut(code)?.remove_member(identity_id))
    }

    pub fn add_allow_rule(&mut self, code: &str, rule: AllowRule) -> Result<bool> {
        Ok(self.group_mut(code)?.add_allow_rule(rule))
    }

    pub fn remove_allow_rule(&mut self, code: &str, rule: &AllowRule) -> Result<bool> {
        Ok(self.group_mut(code)?.remove_allow_rule(rule))
    }

    /// Active groups the identity belongs to.
    pub fn active_groups_of<'a>(
        &'a self,
        identity_id: &'a str,
    ) -> impl Iterator<Item = &'a EnrollmentGroup> + 'a {
        self.groups
            .values()
            .filter(move |g| g.is_active() && g.has_member(identity_id))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
