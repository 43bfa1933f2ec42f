//! Client for the Apple Search Ads campaign management API.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use search_ads_client::{Config, SearchAdsApi};
//!
//! let api = SearchAdsApi::new(Config::from_env()?)?;
//! for campaign in api.get_campaigns().await? {
//!     println!("{} {}", campaign.id, campaign.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod bulk;
pub mod client;
pub mod client_secret;
pub mod config;
pub mod constants;
mod endpoints;
pub mod error;
pub mod models;
pub mod observer;
pub mod patch;
pub mod reporting;

pub use auth::{TokenManager, TokenProvider};
pub use bulk::{BulkOutcome, KeywordChange, KeywordTarget, PartitionFailure, PartitionSuccess};
pub use client::{Page, PageDetail, SearchAdsApi, SearchAdsApiBuilder};
pub use client_secret::{generate_key_pair, sign_client_secret, KeyPair, SigningKey};
pub use config::{ClientSecret, Config, Credentials};
pub use error::{ApiError, AuthError, ConfigError, ErrorMessage, MessageCode, SecretError};
pub use models::{
    Acl, AdGroup, AdGroupUpdate, Campaign, CampaignUpdate, CountryOrRegion, Keyword, KeywordUpdate,
    MatchType, Money, Status, UpdateCampaignRequest,
};
pub use observer::{ApiEvent, ApiObserver, ChannelObserver};
pub use patch::Patch;
pub use reporting::{DateRange, ReportResponse, ReportRow, ReportingRequest};
