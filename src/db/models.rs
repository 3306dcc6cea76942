use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_BACKGROUND_COLOR: &str = "#000000";
pub const DEFAULT_OVERLAY_OPACITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Solid,
    Gradient,
    Image,
}

impl BackgroundType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Gradient => "gradient",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for BackgroundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackgroundType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "gradient" => Ok(Self::Gradient),
            "image" => Ok(Self::Image),
            other => Err(format!("unknown background type `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub background_color: String,
    pub background_type: BackgroundType,
    pub background_image_url: Option<String>,
    pub background_overlay_opacity: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub url: String,
    pub icon_url: Option<String>,
    pub order_index: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Button {
    pub id: i64,
    pub user_id: i64,
    pub label: String,
    pub url: String,
    pub order_index: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Button {
    /// Buttons whose label mentions "contact" open the contact form instead of navigating.
    pub fn opens_contact_form(&self) -> bool {
        self.label.to_lowercase().contains("contact")
    }
}

/// Everything the public page needs, read in one pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageSnapshot {
    pub user: Option<User>,
    pub buttons: Vec<Button>,
    pub links: Vec<Link>,
}
