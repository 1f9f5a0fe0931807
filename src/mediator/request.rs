use url::form_urlencoded;

use crate::config::ApiConfig;
use crate::domain::{Sort, TimeWindow};

/// Prefix the upstream uses for post fullnames.
const POST_PREFIX: &str = "t3_";

/// Abstract read request against the upstream API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    Listing {
        community: String,
        sort: Sort,
        time_window: TimeWindow,
        limit: u32,
    },
    Info {
        id: String,
    },
    Comments {
        community: String,
        id: String,
        limit: u32,
        depth: u32,
    },
    Search {
        community: String,
        query: String,
        limit: u32,
    },
}

impl ApiRequest {
    pub fn community(&self) -> Option<&str> {
        match self {
            ApiRequest::Listing { community, .. }
            | ApiRequest::Comments { community, .. }
            | ApiRequest::Search { community, .. } => Some(community),
            ApiRequest::Info { .. } => None,
        }
    }

    /// Searches with a blank query never reach the network.
    pub fn is_empty_search(&self) -> bool {
        matches!(self, ApiRequest::Search { query, .. } if query.trim().is_empty())
    }

    /// Assemble path and query, substituting the default community where
    /// the requested one is not allowed.
    pub fn resolve(&self, policy: &CommunityPolicy) -> UpstreamRequest {
        match self {
            ApiRequest::Listing {
                community,
                sort,
                time_window,
                limit,
            } => {
                let community = policy.resolve(community);
                let mut query = vec![("limit".to_string(), limit.to_string())];
                if sort.uses_time_window() {
                    query.push(("t".to_string(), time_window.as_str().to_string()));
                }
                UpstreamRequest {
                    path: format!("/r/{}/{}.json", community, sort.as_str()),
                    query,
                }
            }
            ApiRequest::Info { id } => UpstreamRequest {
                path: "/api/info.json".to_string(),
                query: vec![("id".to_string(), format!("{POST_PREFIX}{}", bare_id(id)))],
            },
            ApiRequest::Comments {
                community,
                id,
                limit,
                depth,
            } => {
                let community = policy.resolve(community);
                UpstreamRequest {
                    path: format!("/r/{}/comments/{}.json", community, bare_id(id)),
                    query: vec![
                        ("limit".to_string(), limit.to_string()),
                        ("depth".to_string(), depth.to_string()),
                    ],
                }
            }
            ApiRequest::Search {
                community,
                query,
                limit,
            } => {
                let community = policy.resolve(community);
                UpstreamRequest {
                    path: format!("/r/{}/search.json", community),
                    query: vec![
                        ("q".to_string(), query.trim().to_string()),
                        ("restrict_sr".to_string(), "on".to_string()),
                        ("limit".to_string(), limit.to_string()),
                        ("sort".to_string(), "relevance".to_string()),
                    ],
                }
            }
        }
    }
}

/// Strip a `t3_` prefix and anything that cannot appear in a post id.
fn bare_id(id: &str) -> String {
    let id = id.trim();
    id.strip_prefix(POST_PREFIX)
        .unwrap_or(id)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Community allow-list with its canonical fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityPolicy {
    pub default_community: String,
    pub allowed: Vec<String>,
}

impl CommunityPolicy {
    pub fn new(default_community: &str, allowed: &[&str]) -> Self {
        Self {
            default_community: default_community.to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            default_community: config.default_community.clone(),
            allowed: config.allowed_communities.clone(),
        }
    }

    pub fn is_allowed(&self, community: &str) -> bool {
        self.allowed.iter().any(|c| c.eq_ignore_ascii_case(community))
    }

    /// The allow-list spelling of `community`, or the default community.
    pub fn resolve(&self, community: &str) -> &str {
        let community = community.trim();
        match self.allowed.iter().find(|c| c.eq_ignore_ascii_case(community)) {
            Some(canonical) => canonical,
            None => {
                tracing::info!(
                    requested = community,
                    substituted = %self.default_community,
                    "Community not allowed, redirecting to default"
                );
                &self.default_community
            }
        }
    }
}

/// A fully assembled upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl UpstreamRequest {
    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish()
    }

    /// Absolute upstream URL; also the cache key.
    pub fn url(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        let query = self.query_string();
        if query.is_empty() {
            format!("{}{}", base, self.path)
        } else {
            format!("{}{}?{}", base, self.path, query)
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
