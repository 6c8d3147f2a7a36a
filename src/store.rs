use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::group::Group;

/// Groups kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct GroupStore {
    groups: RwLock<HashMap<String, Group>>,
}

impl GroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, group: Group) -> Result<()> {
        let mut groups = self.groups.write().await;
        if groups.contains_key(&group.id) {
            return Err(Error::GroupExists(group.id));
        }
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    /// Runs `f` against the group without letting it change.
    pub async fn read<T>(&self, id: &str, f: impl FnOnce(&Group) -> T) -> Result<T> {
        let groups = self.groups.read().await;
        let group = groups
            .get(id)
            .ok_or_else(|| Error::GroupNotFound(id.to_string()))?;
        Ok(f(group))
    }

    pub async fn update<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Group) -> Result<T>,
    ) -> Result<T> {
        let mut groups = self.groups.write().await;
        let group = groups
            .get_mut(id)
            .ok_or_else(|| Error::GroupNotFound(id.to_string()))?;
        f(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_duplicate_groups() {
        let store = GroupStore::new();
        store.insert(Group::new("trip", "Trip")).await.unwrap();

        let result = store.insert(Group::new("trip", "Another trip")).await;

        assert!(matches!(result, Err(Error::GroupExists(id)) if id == "trip"));
        let name = store.read("trip", |group| group.name.clone()).await.unwrap();
        assert_eq!(name, "Trip");
    }

    #[tokio::test]
    async fn failed_updates_report_the_error() {
        let store = GroupStore::new();
        store.insert(Group::new("trip", "Trip")).await.unwrap();

        let missing = store.read("nope", |_| ()).await;
        let rejected = store
            .update("trip", |group| group.add_participant("", None))
            .await;

        assert!(matches!(missing, Err(Error::GroupNotFound(_))));
        assert!(matches!(rejected, Err(Error::EmptyName)));
    }
}
