use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    #[default]
    Hot,
    New,
    Top,
    Rising,
    Controversial,
    /// Client-side reorder of the current listing; never sent upstream.
    Viral,
}

impl Sort {
    pub fn as_str(self) -> &'static str {
        match self {
            Sort::Hot => "hot",
            Sort::New => "new",
            Sort::Top => "top",
            Sort::Rising => "rising",
            Sort::Controversial => "controversial",
            Sort::Viral => "viral",
        }
    }

    /// Whether the upstream honours a time window for this sort.
    pub fn uses_time_window(self) -> bool {
        matches!(self, Sort::Top | Sort::Controversial)
    }

    pub fn is_client_side(self) -> bool {
        self == Sort::Viral
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" => Ok(Sort::Hot),
            "new" => Ok(Sort::New),
            "top" => Ok(Sort::Top),
            "rising" => Ok(Sort::Rising),
            "controversial" => Ok(Sort::Controversial),
            "viral" => Ok(Sort::Viral),
            other => Err(format!("Unknown sort: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::Hour => "hour",
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Year => "year",
            TimeWindow::All => "all",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(TimeWindow::Hour),
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            "month" => Ok(TimeWindow::Month),
            "year" => Ok(TimeWindow::Year),
            "all" => Ok(TimeWindow::All),
            other => Err(format!("Unknown time window: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFilter {
    #[default]
    None,
    Images,
    Videos,
    Articles,
    Discussions,
}

impl FromStr for MediaFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "all" => Ok(MediaFilter::None),
            "images" => Ok(MediaFilter::Images),
            "videos" => Ok(MediaFilter::Videos),
            "articles" => Ok(MediaFilter::Articles),
            "discussions" => Ok(MediaFilter::Discussions),
            other => Err(format!("Unknown media filter: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyTagFilter {
    #[default]
    None,
    Matchday,
    Transfers,
}

impl LegacyTagFilter {
    /// Lowercase substrings a tag label must contain to pass this filter.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            LegacyTagFilter::None => &[],
            LegacyTagFilter::Matchday => &["match thread", "post-match", "pre-match", "match day"],
            LegacyTagFilter::Transfers => &["transfer", "signing", "rumour", "rumor"],
        }
    }
}

impl FromStr for LegacyTagFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(LegacyTagFilter::None),
            "matchday" => Ok(LegacyTagFilter::Matchday),
            "transfers" => Ok(LegacyTagFilter::Transfers),
            other => Err(format!("Unknown tag filter: {other}")),
        }
    }
}

/// What the user is currently looking at.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub community: String,
    pub sort: Sort,
    pub time_window: TimeWindow,
    pub search_term: String,
    pub tag_filters: BTreeSet<String>,
    pub media_filter: MediaFilter,
    pub legacy_tag_filter: LegacyTagFilter,
}

impl Selection {
    pub fn new(community: impl Into<String>) -> Self {
        Self {
            community: community.into(),
            ..Default::default()
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_time_window(mut self, time_window: TimeWindow) -> Self {
        self.time_window = time_window;
        self
    }

    /// The part of the selection that determines which listing is fetched.
    pub fn request_key(&self) -> RequestKey {
        RequestKey {
            community: self.community.clone(),
            sort: self.sort,
            time_window: self.sort.uses_time_window().then_some(self.time_window),
            search_term: self.search_term.clone(),
        }
    }
}

/// Identity of a listing request. A response is only applied while the
/// current selection still has the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub community: String,
    pub sort: Sort,
    /// Only set for sorts that honour a window
    pub time_window: Option<TimeWindow>,
    pub search_term: String,
}
