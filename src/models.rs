use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::patch::Patch;

/// Start/end time layout the API expects on ad groups.
pub const AD_GROUP_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Amounts travel as strings so no precision is lost on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    pub amount: String,
    pub currency: String,
}

impl Money {
    pub fn new(amount: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency: currency.into(),
        }
    }

    pub fn from_decimal(amount: Decimal, currency: impl Into<String>) -> Self {
        Self::new(amount.to_string(), currency)
    }

    pub fn decimal(&self) -> Result<Decimal, rust_decimal::Error> {
        Decimal::from_str(self.amount.trim())
    }
}

/// Campaigns and ad groups use `ENABLED`/`PAUSED`, keywords use `ACTIVE`/`PAUSED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Enabled,
    Paused,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Broad,
    Exact,
}

/// An organization the credentials may act for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acl {
    pub org_name: String,
    pub org_id: i64,
    pub currency: String,
    pub time_zone: String,
    #[serde(default)]
    pub parent_org_id: Option<i64>,
    pub display_name: String,
    #[serde(default)]
    pub payment_model: Option<String>,
    #[serde(default)]
    pub role_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: i64,
    pub org_id: i64,
    pub adam_id: i64,
    pub name: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget_amount: Option<Money>,
    #[serde(default)]
    pub countries_or_regions: Vec<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub ad_channel_type: Option<String>,
    #[serde(default)]
    pub billing_event: Option<String>,
    #[serde(default)]
    pub payment_model: Option<String>,
    #[serde(default)]
    pub display_status: Option<String>,
    #[serde(default)]
    pub serving_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroup {
    /// Absent until the server creates the ad group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub campaign_id: i64,
    pub org_id: i64,
    pub name: String,
    pub status: Status,
    pub default_bid_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpa_goal: Option<Money>,
    #[serde(default)]
    pub automated_keywords_opt_in: bool,
    pub pricing_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_state_reasons: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_model: Option<String>,
}

impl AdGroup {
    /// A cost-per-tap ad group ready to be created, starting at `start`.
    pub fn cpc(
        campaign_id: i64,
        org_id: i64,
        name: impl Into<String>,
        default_bid_amount: Money,
        cpa_goal: Option<Money>,
        start: NaiveDateTime,
    ) -> Self {
        Self {
            id: None,
            campaign_id,
            org_id,
            name: name.into(),
            status: Status::Enabled,
            default_bid_amount,
            cpa_goal,
            automated_keywords_opt_in: false,
            pricing_model: "CPC".to_string(),
            start_time: Some(start.format(AD_GROUP_TIME_FORMAT).to_string()),
            end_time: None,
            deleted: None,
            display_status: None,
            serving_status: None,
            serving_state_reasons: None,
            payment_model: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub ad_group_id: i64,
    pub text: String,
    pub match_type: MatchType,
    pub bid_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl Keyword {
    pub fn new(ad_group_id: i64, text: impl Into<String>, match_type: MatchType, bid_amount: Money) -> Self {
        Self {
            id: None,
            ad_group_id,
            text: text.into(),
            match_type,
            bid_amount,
            status: None,
            deleted: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryOrRegion {
    pub country_or_region: String,
}

/// Partial campaign patch, unset fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignUpdate {
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub budget_amount: Patch<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_orders: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries_or_regions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub daily_budget_amount: Patch<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignRequest {
    pub campaign: CampaignUpdate,
    pub clear_geo_targeting_on_country_or_region_change: bool,
}

impl From<CampaignUpdate> for UpdateCampaignRequest {
    fn from(campaign: CampaignUpdate) -> Self {
        Self {
            campaign,
            clear_geo_targeting_on_country_or_region_change: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automated_keywords_opt_in: Option<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub cpa_goal: Patch<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bid_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordUpdate {
    pub id: i64,
    /// `Null` makes the keyword fall back to its ad group's default bid.
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub bid_amount: Patch<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl KeywordUpdate {
    pub fn bid(id: i64, bid_amount: Money) -> Self {
        Self {
            id,
            bid_amount: Patch::Value(bid_amount),
            status: None,
        }
    }

    pub fn default_bid(id: i64) -> Self {
        Self {
            id,
            bid_amount: Patch::Null,
            status: None,
        }
    }

    pub fn status(id: i64, status: Status) -> Self {
        Self {
            id,
            bid_amount: Patch::Omit,
            status: Some(status),
        }
    }
}
