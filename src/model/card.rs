use serde::{Deserialize, Serialize};

use super::{EventInfo, ParticipantResult};

/// Everything a card template needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceCardData {
    pub participant: ParticipantResult,
    #[serde(default)]
    pub event: EventInfo,
}

/// The four PNG images produced for one result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceCardOutput {
    pub single_post: Vec<u8>,
    /// Headline, details and splits slides, in that order.
    pub carousel_slides: [Vec<u8>; 3],
}

impl RaceCardOutput {
    /// All images, single post first.
    pub fn images(&self) -> impl Iterator<Item = &[u8]> {
        std::iter::once(self.single_post.as_slice())
            .chain(self.carousel_slides.iter().map(Vec::as_slice))
    }
}
