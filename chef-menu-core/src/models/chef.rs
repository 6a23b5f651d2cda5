use serde::{Deserialize, Serialize};

use super::ids::ChefId;

/// A chef as shown in customer search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChefSummary {
    pub chef_id: ChefId,
    pub name: String,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub featured_dishes: Vec<String>,
}

/// Customer search parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChefQuery {
    #[serde(rename = "q", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
}

impl ChefQuery {
    /// True when a chef matches every given criterion, case-insensitively.
    pub fn matches(&self, chef: &ChefSummary) -> bool {
        let text_ok = self.text.as_deref().map_or(true, |text| {
            let needle = text.trim().to_lowercase();
            needle.is_empty()
                || chef.name.to_lowercase().contains(&needle)
                || chef.cuisines.iter().any(|c| c.to_lowercase().contains(&needle))
                || chef
                    .featured_dishes
                    .iter()
                    .any(|d| d.to_lowercase().contains(&needle))
        });
        let cuisine_ok = self.cuisine.as_deref().map_or(true, |cuisine| {
            chef.cuisines
                .iter()
                .any(|c| c.eq_ignore_ascii_case(cuisine.trim()))
        });
        text_ok && cuisine_ok
    }
}
