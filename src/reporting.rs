//! Reporting and selector payloads.

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_PAGE_LIMIT;
use crate::models::{MatchType, Money, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportGranularity {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportGroupBy {
    AdminArea,
    AgeRange,
    CountryCode,
    CountryOrRegion,
    DeviceClass,
    Gender,
    Locality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportTimeZone {
    Ortz,
    Utc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Id,
    Deleted,
    CampaignId,
    AdGroupId,
    KeywordId,
    CountryOrRegion,
    DeviceClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "BETWEEN")]
    Between,
    #[serde(rename = "CONTAINS")]
    Contains,
    #[serde(rename = "CONTAINS_ALL")]
    ContainsAll,
    #[serde(rename = "CONTAINS_ANY")]
    ContainsAny,
    #[serde(rename = "ENDSWITH")]
    EndsWith,
    #[serde(rename = "EQUALS")]
    Equals,
    #[serde(rename = "GREATER_THAN")]
    GreaterThan,
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "LESS_THAN")]
    LessThan,
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "STARTSWITH")]
    StartsWith,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: Field,
    #[serde(rename = "operator")]
    pub op: Operator,
    pub values: Vec<String>,
}

impl Condition {
    pub fn equals(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            op: Operator::Equals,
            values: vec![value.into()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field: Field,
    pub sort_order: SortOrder,
}

impl OrderBy {
    pub fn ascending(field: Field) -> Self {
        Self {
            field,
            sort_order: SortOrder::Ascending,
        }
    }

    pub fn descending(field: Field) -> Self {
        Self {
            field,
            sort_order: SortOrder::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn first_page() -> Self {
        Self {
            offset: 0,
            limit: MAX_PAGE_LIMIT,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first_page()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSelector {
    pub conditions: Vec<Condition>,
    pub order_by: Vec<OrderBy>,
    pub pagination: Pagination,
}

impl ReportSelector {
    pub fn ordered_by(order_by: OrderBy) -> Self {
        Self {
            conditions: Vec::new(),
            order_by: vec![order_by],
            pagination: Pagination::first_page(),
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindSelector {
    pub conditions: Vec<Condition>,
    pub fields: Vec<Field>,
    pub order_by: Vec<OrderBy>,
    pub pagination: Pagination,
}

impl FindSelector {
    /// Every keyword that is not soft-deleted, oldest first.
    pub fn live_keywords() -> Self {
        Self {
            conditions: vec![Condition::equals(Field::Deleted, "false")],
            fields: Vec::new(),
            order_by: vec![OrderBy::ascending(Field::Id)],
            pagination: Pagination::first_page(),
        }
    }
}

/// Whole days counted back from today, `0` meaning today only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub days_back: u32,
}

impl DateRange {
    pub fn today() -> Self {
        Self { days_back: 0 }
    }

    pub fn last_days(days_back: u32) -> Self {
        Self { days_back }
    }

    /// Clamped to the earliest representable date for ranges reaching past it.
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.days_back)))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn end_date(&self, today: NaiveDate) -> NaiveDate {
        today
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingRequest {
    pub start_time: NaiveDate,
    pub end_time: NaiveDate,
    pub selector: ReportSelector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<ReportGranularity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<ReportGroupBy>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_grand_totals: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_records_with_no_metrics: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_row_totals: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<ReportTimeZone>,
}

impl ReportingRequest {
    /// Totals per row plus grand totals in the org's time zone, ordered by `order_by`.
    pub fn totals(start_time: NaiveDate, end_time: NaiveDate, order_by: OrderBy) -> Self {
        Self {
            start_time,
            end_time,
            selector: ReportSelector::ordered_by(order_by),
            granularity: None,
            group_by: None,
            return_grand_totals: Some(true),
            return_records_with_no_metrics: None,
            return_row_totals: Some(true),
            time_zone: Some(ReportTimeZone::Ortz),
        }
    }

    pub fn for_range(range: DateRange, today: NaiveDate) -> Self {
        Self::totals(
            range.start_date(today),
            range.end_date(today),
            OrderBy::ascending(Field::CampaignId),
        )
    }

    pub fn for_range_from_now(range: DateRange) -> Self {
        Self::for_range(range, Local::now().date_naive())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendRow {
    #[serde(rename = "avgCPT")]
    pub avg_cpt: Money,
    #[serde(rename = "avgCPM", default, skip_serializing_if = "Option::is_none")]
    pub avg_cpm: Option<Money>,
    #[serde(rename = "totalAvgCPI", default, skip_serializing_if = "Option::is_none")]
    pub total_avg_cpi: Option<Money>,
    pub local_spend: Money,
    pub impressions: i64,
    pub taps: i64,
    pub total_installs: i64,
    pub total_new_downloads: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_redownloads: Option<i64>,
    pub ttr: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap_install_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrandTotalsRow {
    pub other: bool,
    pub total: SpendRow,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowMetadata {
    pub campaign_id: Option<i64>,
    pub campaign_name: Option<String>,
    pub campaign_status: Option<Status>,
    pub countries_or_regions: Option<Vec<String>>,
    pub daily_budget: Option<Money>,

    pub ad_group_id: Option<i64>,
    pub ad_group_name: Option<String>,
    pub ad_group_status: Option<Status>,
    pub default_bid_amount: Option<Money>,

    pub keyword_id: Option<i64>,
    pub keyword: Option<String>,
    pub keyword_status: Option<Status>,
    pub bid_amount: Option<Money>,
    #[serde(rename = "avgCPT")]
    pub avg_cpt: Option<Money>,
    pub match_type: Option<MatchType>,
}

impl RowMetadata {
    /// `campaign:adGroup:keyword`, missing levels written as `0`.
    pub fn row_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.campaign_id.unwrap_or(0),
            self.ad_group_id.unwrap_or(0),
            self.keyword_id.unwrap_or(0)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub other: bool,
    pub total: SpendRow,
    pub metadata: RowMetadata,
}

impl ReportRow {
    pub fn row_key(&self) -> String {
        self.metadata.row_key()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(default)]
    pub row: Vec<ReportRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grand_totals: Option<GrandTotalsRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingDataResponse {
    pub reporting_data_response: ReportResponse,
}
