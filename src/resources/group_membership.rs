//! Group membership resource.
//!
//! Manages the set of members of one group. Updates are applied as a set
//! difference against the recorded prior state: removals first, then
//! additions, each through its own membership call.

use std::collections::BTreeSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::api::{AzdoClient, graph};
use crate::error::{ProviderResult, SchemaError};
use crate::provider::resource::Resource;
use crate::provider::resource_data::{AttrValue, ResourceData};
use crate::provider::schema::{AttrKind, AttributeSchema};

/// The `azuredevops_group_membership` resource.
pub struct GroupMembershipResource {
    schema: Vec<AttributeSchema>,
}

impl GroupMembershipResource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: vec![
                AttributeSchema::required("group", AttrKind::String).force_new(),
                AttributeSchema::required("members", AttrKind::List),
            ],
        }
    }

    fn members(data: &ResourceData) -> ProviderResult<Vec<String>> {
        data.get_string_list("members")
            .ok_or_else(|| {
                SchemaError::MissingAttribute {
                    name: "members".to_string(),
                }
                .into()
            })
    }
}

impl Default for GroupMembershipResource {
    fn default() -> Self {
        Self::new()
    }
}

/// Adds members to a group, stopping at the first failure.
async fn add_members(client: &AzdoClient, group: &str, members: &[String]) -> ProviderResult<()> {
    for member in members {
        graph::add_membership(client, member, group).await?;
        tracing::debug!(member = %member, group, "added membership");
    }
    Ok(())
}

/// Removes members from a group, stopping at the first failure.
async fn remove_members(
    client: &AzdoClient,
    group: &str,
    members: &[String],
) -> ProviderResult<()> {
    for member in members {
        graph::remove_membership(client, member, group).await?;
        tracing::debug!(member = %member, group, "removed membership");
    }
    Ok(())
}

#[async_trait]
impl Resource for GroupMembershipResource {
    fn type_name(&self) -> &'static str {
        "azuredevops_group_membership"
    }

    fn schema(&self) -> &[AttributeSchema] {
        &self.schema
    }

    async fn create(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let group = data.require_string("group")?.to_string();
        let members = Self::members(data)?;

        add_members(client, &group, &members).await?;

        // The membership set has no natural identifier of its own.
        data.set_id(Uuid::new_v4().to_string());
        Ok(())
    }

    async fn read(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let group = data.require_string("group")?.to_string();
        let state_members: BTreeSet<String> = Self::members(data)?.into_iter().collect();

        let actual = graph::list_direct_memberships(client, &group).await?;
        let members: Vec<AttrValue> = actual
            .iter()
            .filter_map(|membership| membership.member_descriptor.clone())
            .filter(|member| state_members.contains(member))
            .map(AttrValue::String)
            .collect();

        data.set("members", members);
        Ok(())
    }

    async fn update(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        if !data.has_change("members") {
            return Ok(());
        }

        let group = data.require_string("group")?.to_string();
        let new_members: BTreeSet<String> = Self::members(data)?.into_iter().collect();
        let old_members: BTreeSet<String> = data
            .prior_value("members")
            .and_then(AttrValue::as_list)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default();

        let to_add: Vec<String> = new_members.difference(&old_members).cloned().collect();
        let to_remove: Vec<String> = old_members.difference(&new_members).cloned().collect();

        remove_members(client, &group, &to_remove).await?;
        add_members(client, &group, &to_add).await?;
        Ok(())
    }

    async fn delete(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let group = data.require_string("group")?.to_string();
        let members = Self::members(data)?;

        remove_members(client, &group, &members).await?;
        data.clear_id();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Member List Extraction
    ///
    /// Tests reading the members list out of the attribute bag.
    ///
    /// ## Test Scenario
    /// - Reads a present and an absent members attribute
    ///
    /// ## Expected Outcome
    /// - Present lists convert to strings; absence fails fast
    #[test]
    fn test_members_extraction() {
        let mut data = ResourceData::new();
        data.set(
            "members",
            AttrValue::List(vec!["desc-a".into(), "desc-b".into()]),
        );
        assert_eq!(
            GroupMembershipResource::members(&data).unwrap(),
            vec!["desc-a".to_string(), "desc-b".to_string()]
        );

        let empty = ResourceData::new();
        assert!(GroupMembershipResource::members(&empty).is_err());
    }

    /// # Update Set Difference
    ///
    /// Tests the add/remove split computed from prior state.
    ///
    /// ## Test Scenario
    /// - Prior members {a, b}, new members {b, c}
    ///
    /// ## Expected Outcome
    /// - a is removed, c is added, b stays untouched
    #[test]
    fn test_update_set_difference() {
        let old: BTreeSet<String> = ["a", "b"].iter().map(|s| (*s).to_string()).collect();
        let new: BTreeSet<String> = ["b", "c"].iter().map(|s| (*s).to_string()).collect();

        let to_add: Vec<String> = new.difference(&old).cloned().collect();
        let to_remove: Vec<String> = old.difference(&new).cloned().collect();

        assert_eq!(to_add, vec!["c".to_string()]);
        assert_eq!(to_remove, vec!["a".to_string()]);
    }
}
