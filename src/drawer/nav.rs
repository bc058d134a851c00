use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed navigation sections at the top of the drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavTag {
    Queue,
    Episodes,
    Subscriptions,
    Downloads,
    PlaybackHistory,
    AddFeed,
    /// Placeholder controlling whether the feed/folder tree is shown at all.
    /// It never occupies a row of its own.
    SubscriptionList,
}

impl NavTag {
    /// All sections in default drawer order.
    pub const ALL: [NavTag; 7] = [
        NavTag::Queue,
        NavTag::Episodes,
        NavTag::Subscriptions,
        NavTag::Downloads,
        NavTag::PlaybackHistory,
        NavTag::AddFeed,
        NavTag::SubscriptionList,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NavTag::Queue => "Queue",
            NavTag::Episodes => "Episodes",
            NavTag::Subscriptions => "Subscriptions",
            NavTag::Downloads => "Downloads",
            NavTag::PlaybackHistory => "Playback History",
            NavTag::AddFeed => "Add Podcast",
            NavTag::SubscriptionList => "Subscription List",
        }
    }

    /// Name used in config and preference files.
    pub fn as_str(self) -> &'static str {
        match self {
            NavTag::Queue => "queue",
            NavTag::Episodes => "episodes",
            NavTag::Subscriptions => "subscriptions",
            NavTag::Downloads => "downloads",
            NavTag::PlaybackHistory => "playback-history",
            NavTag::AddFeed => "add-feed",
            NavTag::SubscriptionList => "subscription-list",
        }
    }
}

impl fmt::Display for NavTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown navigation section '{0}'")]
pub struct UnknownNavTag(pub String);

impl FromStr for NavTag {
    type Err = UnknownNavTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NavTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownNavTag(s.to_string()))
    }
}

/// The visible navigation sections after applying the user's hidden set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavSection {
    /// Sections that occupy a row, in drawer order.
    pub tags: Vec<NavTag>,
    /// Whether the feed/folder tree is shown below the sections.
    pub show_subscription_list: bool,
}

impl NavSection {
    /// Remove `hidden` from the default section order.
    pub fn resolve(hidden: &[NavTag]) -> Self {
        let mut tags: Vec<NavTag> = NavTag::ALL
            .into_iter()
            .filter(|tag| !hidden.contains(tag))
            .collect();
        let show_subscription_list = tags.contains(&NavTag::SubscriptionList);
        tags.retain(|tag| *tag != NavTag::SubscriptionList);
        Self {
            tags,
            show_subscription_list,
        }
    }
}
