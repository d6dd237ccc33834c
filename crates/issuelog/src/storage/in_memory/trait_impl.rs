//! IssueStore trait implementation for in-memory storage.

use super::InMemoryStorage;
use crate::domain::{Issue, IssueFilter, IssueId, IssuePatch, NewIssue};
use crate::error::Result;
use crate::storage::IssueStore;
use async_trait::async_trait;

#[async_trait]
impl IssueStore for InMemoryStorage {
    async fn insert(&mut self, new_issue: NewIssue) -> Result<IssueId> {
        let mut inner = self.lock().await;

        let id = inner.generate_id()?;
        inner.issues.push(Issue::from_new(id, new_issue));
        Ok(id)
    }

    async fn update_one(
        &mut self,
        filter: &IssueFilter,
        patch: IssuePatch,
    ) -> Result<Option<Issue>> {
        let mut inner = self.lock().await;

        let Some(index) = inner.position(filter) else {
            return Ok(None);
        };
        let issue = &mut inner.issues[index];
        issue.apply(patch);
        Ok(Some(issue.clone()))
    }

    async fn delete_one(&mut self, filter: &IssueFilter) -> Result<Option<Issue>> {
        let mut inner = self.lock().await;

        // `remove` keeps the remaining issues in insertion order
        Ok(inner
            .position(filter)
            .map(|index| inner.issues.remove(index)))
    }

    async fn find_by_id(&self, id: &IssueId) -> Result<Option<Issue>> {
        let inner = self.lock().await;
        Ok(inner
            .position_of_id(id)
            .map(|index| inner.issues[index].clone()))
    }

    async fn find_many(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let inner = self.lock().await;
        Ok(inner
            .issues
            .iter()
            .filter(|issue| filter.matches(issue))
            .cloned()
            .collect())
    }

    async fn export_all(&self) -> Result<Vec<Issue>> {
        let inner = self.lock().await;
        Ok(inner.issues.clone())
    }

    async fn save(&self) -> Result<()> {
        // No-op for in-memory storage; use save_to_jsonl for persistence
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        // Nothing on disk to reload from
        Ok(())
    }
}
