use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{CategoryId, ChefId, ItemId};
use super::price::{Price, PriceError};

pub const MIN_SERVINGS: u8 = 1;
pub const MAX_SERVINGS: u8 = 10;
pub const MAX_PREP_TIME_MINUTES: u16 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpiceLevel {
    #[default]
    None,
    Mild,
    Medium,
    Hot,
    Volcanic,
}

impl SpiceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpiceLevel::None => "none",
            SpiceLevel::Mild => "mild",
            SpiceLevel::Medium => "medium",
            SpiceLevel::Hot => "hot",
            SpiceLevel::Volcanic => "volcanic",
        }
    }
}

impl fmt::Display for SpiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SpiceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(SpiceLevel::None),
            "mild" => Ok(SpiceLevel::Mild),
            "medium" => Ok(SpiceLevel::Medium),
            "hot" => Ok(SpiceLevel::Hot),
            "volcanic" => Ok(SpiceLevel::Volcanic),
            other => Err(format!(
                "Invalid spice level: '{}'. Valid: none, mild, medium, hot, volcanic",
                other
            )),
        }
    }
}

/// A saved dish as the client knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub chef_id: ChefId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub price: Price,
    pub servings: u8,
    pub prep_time_minutes: u16,
    pub cuisine_type: String,
    pub dietary_info: String,
    pub spice_level: SpiceLevel,
    pub is_available: bool,
    pub is_featured: bool,
    pub display_order: i32,
}

impl MenuItem {
    pub fn new(id: ItemId, chef_id: ChefId, name: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            chef_id,
            category_id: None,
            name: name.into(),
            description: String::new(),
            photo_url: None,
            price,
            servings: MIN_SERVINGS,
            prep_time_minutes: 0,
            cuisine_type: String::new(),
            dietary_info: String::new(),
            spice_level: SpiceLevel::None,
            is_available: true,
            is_featured: false,
            display_order: 0,
        }
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Opens an edit form pre-filled with this item's fields.
    pub fn to_form(&self) -> ItemForm {
        ItemForm {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price.to_string(),
            servings: self.servings,
            prep_time_minutes: self.prep_time_minutes,
            cuisine_type: self.cuisine_type.clone(),
            dietary_info: self.dietary_info.clone(),
            spice_level: self.spice_level,
            is_available: self.is_available,
            display_order: self.display_order,
            photo_url: self.photo_url.clone(),
        }
    }

    /// Returns a new item carrying the validated form fields.
    ///
    /// Identity, ownership and the featured projection are kept from `self`.
    pub fn merged_with(&self, fields: &ItemFields) -> MenuItem {
        MenuItem {
            name: fields.name.clone(),
            description: fields.description.clone(),
            photo_url: fields.photo_url.clone(),
            price: fields.price,
            servings: fields.servings,
            prep_time_minutes: fields.prep_time_minutes,
            cuisine_type: fields.cuisine_type.clone(),
            dietary_info: fields.dietary_info.clone(),
            spice_level: fields.spice_level,
            is_available: fields.is_available,
            display_order: fields.display_order,
            ..self.clone()
        }
    }
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (${})", self.name, self.price)?;
        if !self.is_available {
            write!(f, " [unavailable]")?;
        }
        if self.is_featured {
            write!(f, " [featured]")?;
        }
        Ok(())
    }
}

/// Why an item form or category name was rejected before any request was made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Dish name is required")]
    MissingName,
    #[error(transparent)]
    Price(#[from] PriceError),
    #[error("Servings must be between 1 and 10")]
    ServingsOutOfRange(u8),
    #[error("Prep time must be between 0 and 120 minutes")]
    PrepTimeOutOfRange(u16),
    #[error("Category name is required")]
    EmptyCategoryName,
    #[error("Category name must be at most {max} characters")]
    CategoryNameTooLong { max: usize },
}

/// The edit buffer for a dish, holding raw user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemForm {
    pub name: String,
    pub description: String,
    /// Raw price input; coerced to two decimals on validation.
    pub price: String,
    pub servings: u8,
    pub prep_time_minutes: u16,
    pub cuisine_type: String,
    pub dietary_info: String,
    pub spice_level: SpiceLevel,
    pub is_available: bool,
    pub display_order: i32,
    pub photo_url: Option<String>,
}

impl Default for ItemForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: String::new(),
            servings: MIN_SERVINGS,
            prep_time_minutes: 0,
            cuisine_type: String::new(),
            dietary_info: String::new(),
            spice_level: SpiceLevel::None,
            is_available: true,
            display_order: 0,
            photo_url: None,
        }
    }
}

impl ItemForm {
    pub fn validate(&self) -> Result<ItemFields, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let price = Price::parse(&self.price)?;
        if !(MIN_SERVINGS..=MAX_SERVINGS).contains(&self.servings) {
            return Err(ValidationError::ServingsOutOfRange(self.servings));
        }
        if self.prep_time_minutes > MAX_PREP_TIME_MINUTES {
            return Err(ValidationError::PrepTimeOutOfRange(self.prep_time_minutes));
        }

        Ok(ItemFields {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            price,
            servings: self.servings,
            prep_time_minutes: self.prep_time_minutes,
            cuisine_type: self.cuisine_type.trim().to_string(),
            dietary_info: self.dietary_info.trim().to_string(),
            spice_level: self.spice_level,
            is_available: self.is_available,
            display_order: self.display_order,
            photo_url: self.photo_url.clone(),
        })
    }
}

/// Validated, canonical item fields ready to be sent to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub servings: u8,
    pub prep_time_minutes: u16,
    pub cuisine_type: String,
    pub dietary_info: String,
    pub spice_level: SpiceLevel,
    pub is_available: bool,
    pub display_order: i32,
    pub photo_url: Option<String>,
}

impl ItemFields {
    /// Builds the saved item for a freshly created dish.
    pub fn into_item(
        self,
        id: ItemId,
        chef_id: ChefId,
        category_id: Option<CategoryId>,
    ) -> MenuItem {
        MenuItem {
            id,
            chef_id,
            category_id,
            name: self.name,
            description: self.description,
            photo_url: self.photo_url,
            price: self.price,
            servings: self.servings,
            prep_time_minutes: self.prep_time_minutes,
            cuisine_type: self.cuisine_type,
            dietary_info: self.dietary_info,
            spice_level: self.spice_level,
            is_available: self.is_available,
            is_featured: false,
            display_order: self.display_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> ItemForm {
        ItemForm {
            name: "  Cake ".to_string(),
            price: "12".to_string(),
            servings: 4,
            prep_time_minutes: 45,
            ..ItemForm::default()
        }
    }

    #[test]
    fn test_validate_trims_and_canonicalizes_price() {
        let fields = filled_form().validate().unwrap();
        assert_eq!(fields.name, "Cake");
        assert_eq!(fields.price.to_string(), "12.00");
    }

    #[test]
    fn test_validate_requires_name_and_price() {
        let mut form = filled_form();
        form.name = "   ".to_string();
        assert_eq!(form.validate(), Err(ValidationError::MissingName));

        let mut form = filled_form();
        form.price.clear();
        assert_eq!(
            form.validate(),
            Err(ValidationError::Price(PriceError::Missing))
        );
    }

    #[test]
    fn test_validate_ranges() {
        let mut form = filled_form();
        form.servings = 0;
        assert_eq!(form.validate(), Err(ValidationError::ServingsOutOfRange(0)));
        form.servings = 11;
        assert_eq!(form.validate(), Err(ValidationError::ServingsOutOfRange(11)));

        let mut form = filled_form();
        form.prep_time_minutes = 121;
        assert_eq!(
            form.validate(),
            Err(ValidationError::PrepTimeOutOfRange(121))
        );
        form.prep_time_minutes = 120;
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_merge_keeps_identity_and_featured() {
        let mut item = MenuItem::new(ItemId(1), ChefId(9), "Soup", Price::parse("3").unwrap())
            .with_category(CategoryId(2));
        item.is_featured = true;

        let mut form = item.to_form();
        form.name = "Tomato Soup".to_string();
        form.price = "3.456".to_string();
        let merged = item.merged_with(&form.validate().unwrap());

        assert_eq!(merged.id, ItemId(1));
        assert_eq!(merged.category_id, Some(CategoryId(2)));
        assert!(merged.is_featured);
        assert_eq!(merged.name, "Tomato Soup");
        assert_eq!(merged.price.to_string(), "3.46");
    }

    #[test]
    fn test_spice_level_parsing() {
        assert_eq!("Hot".parse::<SpiceLevel>().unwrap(), SpiceLevel::Hot);
        assert_eq!("".parse::<SpiceLevel>().unwrap(), SpiceLevel::None);
        assert!("lava".parse::<SpiceLevel>().is_err());
        assert_eq!(
            serde_json::to_string(&SpiceLevel::Volcanic).unwrap(),
            "\"volcanic\""
        );
    }

    #[test]
    fn test_display() {
        let mut item = MenuItem::new(ItemId(1), ChefId(1), "Tacos", Price::parse("8").unwrap());
        item.is_featured = true;
        assert_eq!(item.to_string(), "Tacos ($8.00) [featured]");
    }
}
