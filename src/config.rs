use dotenv::dotenv;
use std::env;
use std::fmt;
use std::fs;
use url::Url;

use crate::client_secret::{sign_client_secret, SigningKey};
use crate::constants::{
    APPLE_ID_TOKEN_URL, ENV_API_URL, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_KEY_ID, ENV_ORG_ID,
    ENV_PRIVATE_KEY_PATH, ENV_TEAM_ID, ENV_TOKEN_URL, SEARCH_ADS_API_VERSION, SEARCH_ADS_HOST,
};
use crate::error::{ConfigError, SecretError};

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub org_id: Option<i64>,
    pub api_url: Url,
    pub token_url: Url,
}

/// What the token endpoint needs. Either part may be missing until the host
/// fills it in; the gap is reported when a call is made.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<ClientSecret>,
}

#[derive(Clone)]
pub enum ClientSecret {
    /// A JWT that was already signed elsewhere.
    Signed(String),
    /// Key material to sign a fresh JWT from.
    Key(SigningKey),
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientSecret::Signed(_) => f.write_str("Signed(<redacted>)"),
            ClientSecret::Key(key) => f.debug_tuple("Key").field(key).finish(),
        }
    }
}

impl ClientSecret {
    pub fn resolve(&self, client_id: &str) -> Result<String, SecretError> {
        match self {
            ClientSecret::Signed(secret) => Ok(secret.clone()),
            ClientSecret::Key(key) => sign_client_secret(client_id, key, chrono::Utc::now()),
        }
    }
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(ClientSecret::Signed(client_secret.into())),
        }
    }

    pub fn with_signing_key(client_id: impl Into<String>, key: SigningKey) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(ClientSecret::Key(key)),
        }
    }
}

impl Config {
    /// Production endpoints with the given credentials and organization.
    pub fn new(credentials: Credentials, org_id: Option<i64>) -> Result<Self, ConfigError> {
        Ok(Self {
            credentials,
            org_id,
            api_url: default_api_url()?,
            token_url: parse_url(ENV_TOKEN_URL, APPLE_ID_TOKEN_URL)?,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let org_id = read(ENV_ORG_ID)
            .map(|value| {
                value
                    .parse::<i64>()
                    .map_err(|_| ConfigError::InvalidOrgId(value))
            })
            .transpose()?;

        let api_url = match read(ENV_API_URL) {
            Some(value) => with_trailing_slash(parse_url(ENV_API_URL, &value)?),
            None => default_api_url()?,
        };
        let token_url = parse_url(
            ENV_TOKEN_URL,
            &read(ENV_TOKEN_URL).unwrap_or_else(|| APPLE_ID_TOKEN_URL.to_string()),
        )?;

        let signing_key = read_signing_key(&read)?;
        let client_secret = match signing_key {
            Some(key) => Some(ClientSecret::Key(key)),
            None => read(ENV_CLIENT_SECRET).map(ClientSecret::Signed),
        };

        Ok(Self {
            credentials: Credentials {
                client_id: read(ENV_CLIENT_ID),
                client_secret,
            },
            org_id,
            api_url,
            token_url,
        })
    }
}

fn read_signing_key<F>(read: &F) -> Result<Option<SigningKey>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let team_id = read(ENV_TEAM_ID);
    let key_id = read(ENV_KEY_ID);
    let key_path = read(ENV_PRIVATE_KEY_PATH);

    if team_id.is_none() && key_id.is_none() && key_path.is_none() {
        return Ok(None);
    }

    let team_id = team_id.ok_or_else(|| ConfigError::IncompleteSigningKey(ENV_TEAM_ID.to_string()))?;
    let key_id = key_id.ok_or_else(|| ConfigError::IncompleteSigningKey(ENV_KEY_ID.to_string()))?;
    let path = key_path
        .ok_or_else(|| ConfigError::IncompleteSigningKey(ENV_PRIVATE_KEY_PATH.to_string()))?;

    let private_key_pem = fs::read_to_string(&path)
        .map_err(|source| ConfigError::PrivateKeyRead { path, source })?;

    Ok(Some(SigningKey {
        team_id,
        key_id,
        private_key_pem,
    }))
}

fn default_api_url() -> Result<Url, ConfigError> {
    parse_url(
        ENV_API_URL,
        &format!("{}/api/{}/", SEARCH_ADS_HOST, SEARCH_ADS_API_VERSION),
    )
}

fn parse_url(var: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

// Relative joins drop the last path segment unless the base ends in '/'.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_apple_endpoints() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.api_url.as_str(), "https://api.searchads.apple.com/api/v5/");
        assert_eq!(config.token_url.as_str(), "https://appleid.apple.com/auth/oauth2/token");
        assert!(config.credentials.client_id.is_none());
        assert!(config.credentials.client_secret.is_none());
        assert!(config.org_id.is_none());
    }

    #[test]
    fn values_are_trimmed_and_blank_means_absent() {
        let config = Config::from_lookup(lookup(&[
            (ENV_CLIENT_ID, "  SEARCHADS.abc \n"),
            (ENV_CLIENT_SECRET, "   "),
            (ENV_ORG_ID, " 5610 "),
        ]))
        .unwrap();

        assert_eq!(config.credentials.client_id.as_deref(), Some("SEARCHADS.abc"));
        assert!(config.credentials.client_secret.is_none());
        assert_eq!(config.org_id, Some(5610));
    }

    #[test]
    fn bad_org_id_is_rejected() {
        let result = Config::from_lookup(lookup(&[(ENV_ORG_ID, "acme")]));
        assert!(matches!(result, Err(ConfigError::InvalidOrgId(value)) if value == "acme"));
    }

    #[test]
    fn bad_url_is_rejected() {
        let result = Config::from_lookup(lookup(&[(ENV_API_URL, "not a url")]));
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn api_url_gets_trailing_slash() {
        let config =
            Config::from_lookup(lookup(&[(ENV_API_URL, "http://127.0.0.1:9000/api/v5")])).unwrap();
        assert_eq!(
            config.api_url.join("campaigns").unwrap().as_str(),
            "http://127.0.0.1:9000/api/v5/campaigns"
        );
    }

    #[test]
    fn partial_signing_key_is_reported() {
        let result = Config::from_lookup(lookup(&[(ENV_TEAM_ID, "TEAM"), (ENV_KEY_ID, "KEY")]));
        assert!(matches!(
            result,
            Err(ConfigError::IncompleteSigningKey(var)) if var == ENV_PRIVATE_KEY_PATH
        ));
    }

    #[test]
    fn signing_key_wins_over_presigned_secret() {
        let path = env::temp_dir().join(format!("search-ads-key-{}.pem", std::process::id()));
        fs::write(&path, "PEM").unwrap();

        let config = Config::from_lookup(lookup(&[
            (ENV_CLIENT_SECRET, "presigned"),
            (ENV_TEAM_ID, "TEAM"),
            (ENV_KEY_ID, "KEY"),
            (ENV_PRIVATE_KEY_PATH, path.to_str().unwrap()),
        ]))
        .unwrap();
        fs::remove_file(&path).ok();

        match config.credentials.client_secret {
            Some(ClientSecret::Key(key)) => {
                assert_eq!(key.team_id, "TEAM");
                assert_eq!(key.private_key_pem, "PEM");
            }
            other => panic!("expected signing key, got {:?}", other),
        }
    }
}
