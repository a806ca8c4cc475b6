use serde::{Deserialize, Serialize};

/// Response from `/v1/me/account?meta=subscription`
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    pub meta: AccountMeta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountMeta {
    pub subscription: Subscription,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub active: bool,
    pub storefront: Option<String>,
}

/// Catalog lookup response
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceResponse {
    #[serde(default)]
    pub data: Vec<Resource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: Option<Attributes>,
    pub relationships: Option<Relationships>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attributes {
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relationships {
    pub tracks: Option<TrackPage>,
}

/// One page of album or playlist tracks
#[derive(Debug, Clone, Deserialize)]
pub struct TrackPage {
    #[serde(default)]
    pub data: Vec<Resource>,
    pub next: Option<String>,
}

/// Configuration for the API client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub web_base_url: String,
    pub amp_base_url: String,
    pub tracks_page_limit: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            web_base_url: "https://music.apple.com".to_string(),
            amp_base_url: "https://amp-api.music.apple.com".to_string(),
            tracks_page_limit: 300,
        }
    }
}
