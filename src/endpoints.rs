//! Typed Search Ads operations.
//!
//! Every method reads the organization id at call time, so `set_org_id`
//! between calls takes effect immediately.

use reqwest::Method;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::info;

use crate::client::{SearchAdsApi, NO_BODY};
use crate::constants::ACLS_ENDPOINT;
use crate::error::ApiError;
use crate::models::{
    Acl, AdGroup, AdGroupUpdate, Campaign, CountryOrRegion, Keyword, KeywordUpdate,
    UpdateCampaignRequest,
};
use crate::reporting::{FindSelector, Pagination, ReportResponse, ReportingDataResponse, ReportingRequest};

impl SearchAdsApi {
    async fn fetch<T, B>(
        &self,
        method: Method,
        api: &str,
        page: Option<Pagination>,
        body: Option<&B>,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let org_id = self.org_id().await;
        self.request(method, api, org_id, page, body).await
    }

    async fn fetch_list<T, B>(
        &self,
        method: Method,
        api: &str,
        page: Option<Pagination>,
        body: Option<&B>,
    ) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        Ok(self
            .fetch::<Vec<T>, B>(method, api, page, body)
            .await?
            .unwrap_or_default())
    }

    async fn send_for_effect<B>(&self, method: Method, api: &str, body: Option<&B>) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.fetch::<IgnoredAny, B>(method, api, None, body).await?;
        Ok(())
    }

    async fn report(&self, api: &str, request: &ReportingRequest) -> Result<Option<ReportResponse>, ApiError> {
        let response = self
            .fetch::<ReportingDataResponse, _>(Method::POST, api, None, Some(request))
            .await?;
        Ok(response.map(|r| r.reporting_data_response))
    }

    /// Organizations the credentials can act for. Needs no organization id.
    pub async fn get_acls(&self) -> Result<Vec<Acl>, ApiError> {
        let acls: Option<Vec<Acl>> = self
            .request(Method::GET, ACLS_ENDPOINT, None, None, NO_BODY)
            .await?;
        Ok(acls.unwrap_or_default())
    }

    pub async fn get_campaigns(&self) -> Result<Vec<Campaign>, ApiError> {
        self.fetch_list(Method::GET, "campaigns", Some(Pagination::first_page()), NO_BODY)
            .await
    }

    pub async fn get_campaign(&self, campaign_id: i64) -> Result<Option<Campaign>, ApiError> {
        self.fetch(Method::GET, &format!("campaigns/{}", campaign_id), None, NO_BODY)
            .await
    }

    pub async fn update_campaign(
        &self,
        campaign_id: i64,
        update: &UpdateCampaignRequest,
    ) -> Result<Option<Campaign>, ApiError> {
        info!(campaign_id, "Updating campaign");
        self.fetch(Method::PUT, &format!("campaigns/{}", campaign_id), None, Some(update))
            .await
    }

    pub async fn delete_campaign(&self, campaign_id: i64) -> Result<(), ApiError> {
        info!(campaign_id, "Deleting campaign");
        self.send_for_effect(Method::DELETE, &format!("campaigns/{}", campaign_id), NO_BODY)
            .await
    }

    pub async fn get_supported_countries(&self) -> Result<Vec<CountryOrRegion>, ApiError> {
        self.fetch_list(Method::GET, "countries-or-regions", None, NO_BODY)
            .await
    }

    pub async fn get_ad_groups(&self, campaign_id: i64) -> Result<Vec<AdGroup>, ApiError> {
        self.fetch_list(
            Method::GET,
            &format!("campaigns/{}/adgroups", campaign_id),
            Some(Pagination::first_page()),
            NO_BODY,
        )
        .await
    }

    pub async fn get_ad_group(&self, campaign_id: i64, ad_group_id: i64) -> Result<Option<AdGroup>, ApiError> {
        self.fetch(
            Method::GET,
            &format!("campaigns/{}/adgroups/{}", campaign_id, ad_group_id),
            None,
            NO_BODY,
        )
        .await
    }

    pub async fn create_ad_group(&self, campaign_id: i64, ad_group: &AdGroup) -> Result<Option<AdGroup>, ApiError> {
        info!(campaign_id, name = %ad_group.name, "Creating ad group");
        self.fetch(
            Method::POST,
            &format!("campaigns/{}/adgroups", campaign_id),
            None,
            Some(ad_group),
        )
        .await
    }

    pub async fn update_ad_group(
        &self,
        campaign_id: i64,
        ad_group_id: i64,
        update: &AdGroupUpdate,
    ) -> Result<Option<AdGroup>, ApiError> {
        info!(campaign_id, ad_group_id, "Updating ad group");
        self.fetch(
            Method::PUT,
            &format!("campaigns/{}/adgroups/{}", campaign_id, ad_group_id),
            None,
            Some(update),
        )
        .await
    }

    pub async fn delete_ad_group(&self, campaign_id: i64, ad_group_id: i64) -> Result<(), ApiError> {
        info!(campaign_id, ad_group_id, "Deleting ad group");
        self.send_for_effect(
            Method::DELETE,
            &format!("campaigns/{}/adgroups/{}", campaign_id, ad_group_id),
            NO_BODY,
        )
        .await
    }

    pub async fn get_keywords(&self, campaign_id: i64, ad_group_id: i64) -> Result<Vec<Keyword>, ApiError> {
        self.fetch_list(
            Method::GET,
            &format!("campaigns/{}/adgroups/{}/targetingkeywords", campaign_id, ad_group_id),
            Some(Pagination::first_page()),
            NO_BODY,
        )
        .await
    }

    /// Live keywords across every ad group of a campaign, ordered by id.
    pub async fn find_campaign_keywords(&self, campaign_id: i64) -> Result<Vec<Keyword>, ApiError> {
        self.fetch_list(
            Method::POST,
            &format!("campaigns/{}/adgroups/targetingkeywords/find", campaign_id),
            None,
            Some(&FindSelector::live_keywords()),
        )
        .await
    }

    pub async fn update_keywords(
        &self,
        campaign_id: i64,
        ad_group_id: i64,
        updates: &[KeywordUpdate],
    ) -> Result<Vec<Keyword>, ApiError> {
        info!(campaign_id, ad_group_id, count = updates.len(), "Updating keywords");
        self.fetch_list(
            Method::PUT,
            &format!("campaigns/{}/adgroups/{}/targetingkeywords/bulk", campaign_id, ad_group_id),
            None,
            Some(updates),
        )
        .await
    }

    pub async fn delete_keywords(
        &self,
        campaign_id: i64,
        ad_group_id: i64,
        keyword_ids: &[i64],
    ) -> Result<(), ApiError> {
        info!(campaign_id, ad_group_id, count = keyword_ids.len(), "Deleting keywords");
        self.send_for_effect(
            Method::POST,
            &format!(
                "campaigns/{}/adgroups/{}/targetingkeywords/delete/bulk",
                campaign_id, ad_group_id
            ),
            Some(keyword_ids),
        )
        .await
    }

    pub async fn add_keywords(
        &self,
        campaign_id: i64,
        ad_group_id: i64,
        keywords: &[Keyword],
    ) -> Result<Vec<Keyword>, ApiError> {
        info!(campaign_id, ad_group_id, count = keywords.len(), "Adding keywords");
        self.fetch_list(
            Method::POST,
            &format!("campaigns/{}/adgroups/{}/targetingkeywords/bulk", campaign_id, ad_group_id),
            None,
            Some(keywords),
        )
        .await
    }

    pub async fn campaign_report(&self, request: &ReportingRequest) -> Result<Option<ReportResponse>, ApiError> {
        self.report("reports/campaigns", request).await
    }

    pub async fn ad_group_report(
        &self,
        campaign_id: i64,
        request: &ReportingRequest,
    ) -> Result<Option<ReportResponse>, ApiError> {
        self.report(&format!("reports/campaigns/{}/adgroups", campaign_id), request)
            .await
    }

    /// Keyword report for a whole campaign, or one ad group when `ad_group_id` is set.
    pub async fn keyword_report(
        &self,
        campaign_id: i64,
        ad_group_id: Option<i64>,
        request: &ReportingRequest,
    ) -> Result<Option<ReportResponse>, ApiError> {
        let api = match ad_group_id {
            Some(ad_group_id) => format!(
                "reports/campaigns/{}/adgroups/{}/keywords",
                campaign_id, ad_group_id
            ),
            None => format!("reports/campaigns/{}/keywords", campaign_id),
        };
        self.report(&api, request).await
    }
}
