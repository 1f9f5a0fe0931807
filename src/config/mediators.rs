use serde::{Deserialize, Serialize};

/// How the upstream URL is appended to a mediator's prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Raw,
    #[default]
    UrlEncoded,
}

/// Shape of a mediator's response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wrapping {
    /// The upstream JSON as-is
    #[default]
    Direct,
    /// `{"contents": <upstream JSON or a string holding it>}`
    Envelope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediatorDescriptor {
    pub name: String,
    pub url_prefix: String,
    #[serde(default)]
    pub encoding: Encoding,
    #[serde(default)]
    pub wrapping: Wrapping,
    /// Known to work from mobile browsers
    #[serde(default)]
    pub mobile_friendly: bool,
}

impl MediatorDescriptor {
    pub fn new(name: &str, url_prefix: &str, encoding: Encoding, wrapping: Wrapping) -> Self {
        Self {
            name: name.to_string(),
            url_prefix: url_prefix.to_string(),
            encoding,
            wrapping,
            mobile_friendly: false,
        }
    }

    pub fn mobile_friendly(mut self, mobile_friendly: bool) -> Self {
        self.mobile_friendly = mobile_friendly;
        self
    }

    /// Full URL that asks this mediator for `upstream_url`.
    pub fn wrap_url(&self, upstream_url: &str) -> String {
        match self.encoding {
            Encoding::Raw => format!("{}{}", self.url_prefix, upstream_url),
            Encoding::UrlEncoded => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(upstream_url.as_bytes()).collect();
                format!("{}{}", self.url_prefix, encoded)
            }
        }
    }
}

pub fn default_chain() -> Vec<MediatorDescriptor> {
    vec![
        MediatorDescriptor::new(
            "corsproxy",
            "https://corsproxy.io/?",
            Encoding::UrlEncoded,
            Wrapping::Direct,
        )
        .mobile_friendly(true),
        MediatorDescriptor::new(
            "allorigins-raw",
            "https://api.allorigins.win/raw?url=",
            Encoding::UrlEncoded,
            Wrapping::Direct,
        ),
        MediatorDescriptor::new(
            "allorigins-get",
            "https://api.allorigins.win/get?url=",
            Encoding::UrlEncoded,
            Wrapping::Envelope,
        )
        .mobile_friendly(true),
        MediatorDescriptor::new(
            "codetabs",
            "https://api.codetabs.com/v1/proxy?quest=",
            Encoding::Raw,
            Wrapping::Direct,
        ),
    ]
}

/// Order the chain for a client: on mobile, mobile-friendly mediators move
/// to the front. Relative order within each group is kept.
pub fn order_for_client(mediators: &[MediatorDescriptor], mobile: bool) -> Vec<MediatorDescriptor> {
    if !mobile {
        return mediators.to_vec();
    }
    let (mut friendly, rest): (Vec<_>, Vec<_>) =
        mediators.iter().cloned().partition(|m| m.mobile_friendly);
    friendly.extend(rest);
    friendly
}
