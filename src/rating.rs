//! Weather-suitability ratings on the backend and UI scales.
//!
//! The backend scores each garment per condition on a signed scale centred
//! at zero; the edit forms show five buttons. The mapping is a fixed offset:
//!
//! ```text
//! AI   -2  -1   0   1   2
//! UI    1   2   3   4   5
//! ```
//!
//! Both directions clamp instead of failing, so drifted backend data still
//! renders. Clamping is logged at `debug`.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

pub const AI_MIN: i32 = -2;
pub const AI_MAX: i32 = 2;
pub const UI_MIN: i32 = 1;
pub const UI_MAX: i32 = 5;
/// UI value for "no opinion", the default for fresh forms.
pub const UI_NEUTRAL: i32 = 3;

const OFFSET: i32 = UI_NEUTRAL;

/// Backend score → UI rating: `clamp(ai + 3, 1, 5)`.
pub fn ai_to_ui(ai: i32) -> i32 {
    if !(AI_MIN..=AI_MAX).contains(&ai) {
        debug!(value = ai, "AI rating outside [-2, 2], clamping");
    }
    ai.saturating_add(OFFSET).clamp(UI_MIN, UI_MAX)
}

/// UI rating → backend score: `clamp(ui - 3, -2, 2)`.
pub fn ui_to_ai(ui: i32) -> i32 {
    if !(UI_MIN..=UI_MAX).contains(&ui) {
        debug!(value = ui, "UI rating outside [1, 5], clamping");
    }
    ui.saturating_sub(OFFSET).clamp(AI_MIN, AI_MAX)
}

/// Accepts any JSON number and rounds half away from zero.
///
/// The backend is not strict about integers; `0.5` arrives now and then.
fn deserialize_rounded<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    // `as` saturates at the i32 bounds, clamping does the rest.
    Ok(value.round() as i32)
}

/// Ratings as the backend sends and receives them.
///
/// Missing conditions read as neutral (0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiWeatherRatings {
    #[serde(deserialize_with = "deserialize_rounded")]
    pub cold: i32,
    #[serde(deserialize_with = "deserialize_rounded")]
    pub hot: i32,
    #[serde(deserialize_with = "deserialize_rounded")]
    pub rain: i32,
    #[serde(deserialize_with = "deserialize_rounded")]
    pub wind: i32,
}

impl AiWeatherRatings {
    pub fn to_ui(self) -> UiWeatherRatings {
        UiWeatherRatings {
            cold: ai_to_ui(self.cold),
            hot: ai_to_ui(self.hot),
            rain: ai_to_ui(self.rain),
            wind: ai_to_ui(self.wind),
        }
    }
}

/// Ratings as the edit forms hold them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiWeatherRatings {
    pub cold: i32,
    pub hot: i32,
    pub rain: i32,
    pub wind: i32,
}

impl Default for UiWeatherRatings {
    fn default() -> Self {
        Self {
            cold: UI_NEUTRAL,
            hot: UI_NEUTRAL,
            rain: UI_NEUTRAL,
            wind: UI_NEUTRAL,
        }
    }
}

impl UiWeatherRatings {
    pub fn to_ai(self) -> AiWeatherRatings {
        AiWeatherRatings {
            cold: ui_to_ai(self.cold),
            hot: ui_to_ai(self.hot),
            rain: ui_to_ai(self.rain),
            wind: ui_to_ai(self.wind),
        }
    }
}

impl From<AiWeatherRatings> for UiWeatherRatings {
    fn from(ai: AiWeatherRatings) -> Self {
        ai.to_ui()
    }
}

impl From<UiWeatherRatings> for AiWeatherRatings {
    fn from(ui: UiWeatherRatings) -> Self {
        ui.to_ai()
    }
}
