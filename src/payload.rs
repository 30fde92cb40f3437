//! JSON shapes exchanged with the wardrobe backend.
//!
//! Only the boundary is modelled here; no HTTP client lives in this crate.
//! Weather ratings travel in the backend's signed scale and are converted to
//! the UI scale on every read ([`ClothingForm::from_analysis`],
//! [`ClothingForm::from_item`]) and back on every write
//! ([`ClothingForm::to_item`]).

use crate::rating::{AiWeatherRatings, UiWeatherRatings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CategoryError {
    #[error("category must not be empty")]
    Empty,
}

/// Garment category. Unknown ids from the backend pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Sweater,
    #[default]
    Top,
    Jacket,
    Lower,
    Shoe,
    Accessory,
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 6] = [
        Category::Sweater,
        Category::Top,
        Category::Jacket,
        Category::Lower,
        Category::Shoe,
        Category::Accessory,
    ];

    /// Identifier the backend stores.
    pub fn api_id(&self) -> &str {
        match self {
            Category::Sweater => "sweater",
            Category::Top => "top",
            Category::Jacket => "jacket",
            Category::Lower => "lower",
            Category::Shoe => "shoe",
            Category::Accessory => "accessory",
            Category::Other(id) => id,
        }
    }

    /// Label shown in the category picker.
    pub fn display_name(&self) -> &str {
        match self {
            Category::Sweater => "Sweaters & Hoodies",
            Category::Top => "Shirts & Tops",
            Category::Jacket => "Jackets",
            Category::Lower => "Pants & Other Lower",
            Category::Shoe => "Shoes & Footwear",
            Category::Accessory => "Accessories",
            Category::Other(id) => id,
        }
    }

    /// Picker label → category. Labels outside the known six are taken as
    /// the backend id itself, so `Other` survives a trip through the picker.
    pub fn from_display_name(name: &str) -> Result<Self, CategoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryError::Empty);
        }
        Ok(Self::KNOWN
            .into_iter()
            .find(|c| c.display_name() == name)
            .unwrap_or_else(|| Category::Other(name.to_string())))
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        if id.is_empty() {
            return Err(CategoryError::Empty);
        }
        Ok(Self::KNOWN
            .into_iter()
            .find(|c| c.api_id() == id)
            .unwrap_or_else(|| Category::Other(id.to_string())))
    }
}

impl TryFrom<String> for Category {
    type Error = CategoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.api_id().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_id())
    }
}

/// Wrap a base64 payload in a `data:` URL for previews.
pub fn create_data_url(base64: &str, mime_type: &str) -> String {
    format!("data:{mime_type};base64,{base64}")
}

/// Split a base64 `data:` URL into `(mime_type, payload)`.
///
/// Returns `None` for anything that is not a base64 data URL.
pub fn split_data_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    Some((mime, payload))
}

/// Body of the `analyze_clothing` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Base64 without prefix.
    pub image_data: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// What `analyze_clothing` returns. Every field is optional in practice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_ratings: Option<AiWeatherRatings>,
}

/// A garment as the save/update endpoints take it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub category: Category,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub weather_ratings: AiWeatherRatings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Base64 without prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

/// Edit-form state, ratings on the UI scale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClothingForm {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub ratings: UiWeatherRatings,
    pub image_url: Option<String>,
}

impl ClothingForm {
    /// Prefill from an analysis. Missing ratings stay neutral.
    pub fn from_analysis(result: &AnalysisResult) -> Self {
        Self {
            id: None,
            name: result
                .item_name
                .clone()
                .or_else(|| result.name.clone())
                .unwrap_or_default(),
            description: result.description.clone().unwrap_or_default(),
            category: result.category.clone().unwrap_or_default(),
            ratings: result
                .weather_ratings
                .map(AiWeatherRatings::to_ui)
                .unwrap_or_default(),
            image_url: None,
        }
    }

    pub fn from_item(item: &ClothingItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            category: item.category.clone(),
            ratings: item.weather_ratings.to_ui(),
            image_url: item.image_url.clone(),
        }
    }

    /// Build the save/update body. `image_data` replaces the stored image when set.
    pub fn to_item(&self, image_data: Option<String>) -> ClothingItem {
        ClothingItem {
            id: self.id.clone(),
            category: self.category.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            weather_ratings: self.ratings.to_ai(),
            image_url: if image_data.is_some() {
                None
            } else {
                self.image_url.clone()
            },
            image_data,
        }
    }
}
