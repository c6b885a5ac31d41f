//! Point categories used to group territory members.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a tagged point.
///
/// Pin categories match the backend's pin type tags; comments and posts are
/// the non-pin entities that also carry a location. Unknown tags are kept as
/// [`Category::Other`] so new backend tags still aggregate.
///
/// Tags are case-insensitive. `Category::from` is the canonical constructor;
/// a hand-built `Other` is brought to the same form by [`Category::normalized`]
/// wherever categories are counted or weighted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Job,
    Supplier,
    Vendor,
    Shop,
    Office,
    Warehouse,
    ServiceCenter,
    EventVenue,
    ProjectSite,
    ResidentialArea,
    ParkingLogistics,
    Landmark,
    Comment,
    Post,
    /// Tag not in the list above, trimmed and lowercased
    Other(String),
}

impl Category {
    /// All known categories, in display order.
    pub const KNOWN: [Category; 14] = [
        Category::Job,
        Category::Supplier,
        Category::Vendor,
        Category::Shop,
        Category::Office,
        Category::Warehouse,
        Category::ServiceCenter,
        Category::EventVenue,
        Category::ProjectSite,
        Category::ResidentialArea,
        Category::ParkingLogistics,
        Category::Landmark,
        Category::Comment,
        Category::Post,
    ];

    /// Wire tag for this category.
    pub fn as_str(&self) -> &str {
        match self {
            Category::Job => "job",
            Category::Supplier => "supplier",
            Category::Vendor => "vendor",
            Category::Shop => "shop",
            Category::Office => "office",
            Category::Warehouse => "warehouse",
            Category::ServiceCenter => "service_center",
            Category::EventVenue => "event_venue",
            Category::ProjectSite => "project_site",
            Category::ResidentialArea => "residential_area",
            Category::ParkingLogistics => "parking_logistics",
            Category::Landmark => "landmark",
            Category::Comment => "comment",
            Category::Post => "post",
            Category::Other(tag) => tag,
        }
    }

    /// Canonical form: `Other` tags are trimmed and lowercased, and an
    /// `Other` that spells a known tag becomes that category.
    pub fn normalized(&self) -> Category {
        match self {
            Category::Other(tag) => Category::from(tag.as_str()),
            known => known.clone(),
        }
    }

    /// True for pin categories, false for comments, posts and unknown tags.
    pub fn is_pin(&self) -> bool {
        !matches!(self, Category::Comment | Category::Post | Category::Other(_))
    }
}

impl From<&str> for Category {
    fn from(tag: &str) -> Self {
        let normalized = tag.trim().to_ascii_lowercase();
        Category::KNOWN
            .iter()
            .find(|c| c.as_str() == normalized)
            .cloned()
            .unwrap_or(Category::Other(normalized))
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        Category::from(tag.as_str())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category.normalized() {
            Category::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
