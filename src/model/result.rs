use serde::{Deserialize, Serialize};

/// One timing split along the course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub name: String,
    pub distance_km: Option<f64>,
    /// Elapsed time, `H:MM:SS` or `HH:MM:SS`.
    pub time: String,
    pub pace: Option<String>,
}

/// Medal tier derived from the overall place.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
    #[default]
    None,
}

/// Gender code as shown on result pages.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
pub enum Gender {
    #[strum(serialize = "M")]
    #[serde(rename = "M")]
    Male,
    #[strum(serialize = "F")]
    #[serde(rename = "F")]
    Female,
}

/// One runner's result, reconstructed from a results page or supplied directly.
///
/// `place == 0` means the overall place is unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantResult {
    pub bib: String,
    pub name: String,
    pub time: String,
    pub place: u32,
    pub club: Option<String>,
    pub race: Option<String>,
    pub category: Option<String>,
    /// Place within the category, as `rank/field`.
    pub place_category: Option<String>,
    pub place_gender: Option<u32>,
    pub gender: Option<Gender>,
    pub pace: Option<String>,
    pub distance_km: Option<f64>,
    pub elevation_gain: Option<u32>,
    pub elevation_start: Option<i32>,
    pub elevation_finish: Option<i32>,
    pub checkpoints: Vec<Checkpoint>,
}

impl ParticipantResult {
    /// Gold, silver or bronze for places 1 to 3; [`Medal::None`] otherwise,
    /// whatever the field size.
    pub fn medal(&self) -> Medal {
        match self.place {
            1 => Medal::Gold,
            2 => Medal::Silver,
            3 => Medal::Bronze,
            _ => Medal::None,
        }
    }

    /// True when both start and finish elevation are known and non-zero.
    pub fn has_elevation_data(&self) -> bool {
        matches!(
            (self.elevation_start, self.elevation_finish),
            (Some(start), Some(finish)) if start != 0 && finish != 0
        )
    }

    /// True when at least one split was recovered.
    pub fn has_checkpoints(&self) -> bool {
        !self.checkpoints.is_empty()
    }
}
