// API Versions
pub const SEARCH_ADS_API_VERSION: &str = "v5";

// API Base URLs
pub const SEARCH_ADS_HOST: &str = "https://api.searchads.apple.com";
pub const APPLE_ID_TOKEN_URL: &str = "https://appleid.apple.com/auth/oauth2/token";
pub const APPLE_ID_AUDIENCE: &str = "https://appleid.apple.com";

// Headers
pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const CONTEXT_HEADER: &str = "X-AP-Context";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

// OAuth
pub const OAUTH_GRANT_TYPE: &str = "client_credentials";
pub const OAUTH_SCOPE: &str = "searchadsorg";

// Endpoints that do not need an org context
pub const ACLS_ENDPOINT: &str = "acls";

// Paging
pub const MAX_PAGE_LIMIT: u32 = 1000;

// A rejected token is refreshed and the call replayed at most this many times
pub const MAX_AUTH_RETRIES: u32 = 1;

// Client secret lifetime accepted by Apple (180 days)
pub const CLIENT_SECRET_TTL_SECS: i64 = 86_400 * 180;

// Environment variables
pub const ENV_CLIENT_ID: &str = "SEARCH_ADS_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SEARCH_ADS_CLIENT_SECRET";
pub const ENV_TEAM_ID: &str = "SEARCH_ADS_TEAM_ID";
pub const ENV_KEY_ID: &str = "SEARCH_ADS_KEY_ID";
pub const ENV_PRIVATE_KEY_PATH: &str = "SEARCH_ADS_PRIVATE_KEY_PATH";
pub const ENV_ORG_ID: &str = "SEARCH_ADS_ORG_ID";
pub const ENV_API_URL: &str = "SEARCH_ADS_API_URL";
pub const ENV_TOKEN_URL: &str = "SEARCH_ADS_TOKEN_URL";
