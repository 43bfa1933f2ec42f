//! Keyword edits spanning several ad groups.
//!
//! Items are grouped by `(campaign, ad group)` in order of first appearance
//! and each group goes out as one bulk call, sequentially. A failing group
//! does not stop the rest.

use tracing::{info, instrument, warn};

use crate::client::SearchAdsApi;
use crate::error::ApiError;
use crate::models::{Keyword, KeywordUpdate};

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordChange {
    pub campaign_id: i64,
    pub ad_group_id: i64,
    pub update: KeywordUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordTarget {
    pub campaign_id: i64,
    pub ad_group_id: i64,
    pub keyword_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSuccess<T> {
    pub campaign_id: i64,
    pub ad_group_id: i64,
    pub items: Vec<T>,
}

#[derive(Debug)]
pub struct PartitionFailure {
    pub campaign_id: i64,
    pub ad_group_id: i64,
    pub keyword_ids: Vec<i64>,
    pub error: ApiError,
}

#[derive(Debug)]
pub struct BulkOutcome<T> {
    pub succeeded: Vec<PartitionSuccess<T>>,
    pub failed: Vec<PartitionFailure>,
}

impl<T> Default for BulkOutcome<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BulkOutcome<T> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.succeeded.iter().flat_map(|group| group.items.iter())
    }

    pub fn into_items(self) -> Vec<T> {
        self.succeeded
            .into_iter()
            .flat_map(|group| group.items)
            .collect()
    }
}

struct Partition<T> {
    campaign_id: i64,
    ad_group_id: i64,
    items: Vec<T>,
}

fn partition<I, T, F>(items: I, key: F) -> Vec<Partition<T>>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> (i64, i64),
{
    let mut partitions: Vec<Partition<T>> = Vec::new();
    for item in items {
        let (campaign_id, ad_group_id) = key(&item);
        match partitions
            .iter_mut()
            .find(|p| p.campaign_id == campaign_id && p.ad_group_id == ad_group_id)
        {
            Some(existing) => existing.items.push(item),
            None => partitions.push(Partition {
                campaign_id,
                ad_group_id,
                items: vec![item],
            }),
        }
    }
    partitions
}

impl SearchAdsApi {
    /// One `targetingkeywords/bulk` PUT per ad group touched by `changes`.
    #[instrument(skip_all, fields(count = changes.len()))]
    pub async fn update_keywords_across_ad_groups(
        &self,
        changes: Vec<KeywordChange>,
    ) -> Result<BulkOutcome<Keyword>, ApiError> {
        if self.org_id().await.is_none() {
            return Err(ApiError::NoOrgId);
        }

        let mut outcome = BulkOutcome::default();
        for group in partition(changes, |c| (c.campaign_id, c.ad_group_id)) {
            let updates: Vec<KeywordUpdate> = group.items.into_iter().map(|c| c.update).collect();
            match self
                .update_keywords(group.campaign_id, group.ad_group_id, &updates)
                .await
            {
                Ok(items) => outcome.succeeded.push(PartitionSuccess {
                    campaign_id: group.campaign_id,
                    ad_group_id: group.ad_group_id,
                    items,
                }),
                Err(error) => {
                    warn!(
                        campaign_id = group.campaign_id,
                        ad_group_id = group.ad_group_id,
                        %error,
                        "Keyword update failed for ad group"
                    );
                    outcome.failed.push(PartitionFailure {
                        campaign_id: group.campaign_id,
                        ad_group_id: group.ad_group_id,
                        keyword_ids: updates.iter().map(|u| u.id).collect(),
                        error,
                    });
                }
            }
        }

        info!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Bulk keyword update finished"
        );
        Ok(outcome)
    }

    /// One `targetingkeywords/delete/bulk` POST per ad group; successes list the deleted ids.
    #[instrument(skip_all, fields(count = targets.len()))]
    pub async fn delete_keywords_across_ad_groups(
        &self,
        targets: Vec<KeywordTarget>,
    ) -> Result<BulkOutcome<i64>, ApiError> {
        if self.org_id().await.is_none() {
            return Err(ApiError::NoOrgId);
        }

        let mut outcome = BulkOutcome::default();
        for group in partition(targets, |t| (t.campaign_id, t.ad_group_id)) {
            let ids: Vec<i64> = group.items.iter().map(|t| t.keyword_id).collect();
            match self
                .delete_keywords(group.campaign_id, group.ad_group_id, &ids)
                .await
            {
                Ok(()) => outcome.succeeded.push(PartitionSuccess {
                    campaign_id: group.campaign_id,
                    ad_group_id: group.ad_group_id,
                    items: ids,
                }),
                Err(error) => {
                    warn!(
                        campaign_id = group.campaign_id,
                        ad_group_id = group.ad_group_id,
                        %error,
                        "Keyword delete failed for ad group"
                    );
                    outcome.failed.push(PartitionFailure {
                        campaign_id: group.campaign_id,
                        ad_group_id: group.ad_group_id,
                        keyword_ids: ids,
                        error,
                    });
                }
            }
        }

        info!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Bulk keyword delete finished"
        );
        Ok(outcome)
    }
}
