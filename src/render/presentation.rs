//! Display helpers shared by the card templates.

use crate::model::Medal;

/// Shown for any value the result does not have.
pub const PLACEHOLDER: &str = "—";

/// CSS class selecting the medal background; empty without a medal.
pub fn medal_class(medal: Medal) -> &'static str {
    match medal {
        Medal::Gold => "medal-gold",
        Medal::Silver => "medal-silver",
        Medal::Bronze => "medal-bronze",
        Medal::None => "",
    }
}

/// Medal emoji; empty without a medal.
pub fn medal_icon(medal: Medal) -> &'static str {
    match medal {
        Medal::Gold => "🥇",
        Medal::Silver => "🥈",
        Medal::Bronze => "🥉",
        Medal::None => "",
    }
}

pub(crate) fn or_placeholder(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(PLACEHOLDER)
}

/// `21.1 km`, `42.2 km`, `10 km`.
pub(crate) fn format_km(km: f64) -> String {
    let rounded = format!("{km:.1}");
    format!("{} km", rounded.trim_end_matches(".0"))
}

/// Polyline points for a start → high point → finish sketch in a 300×120 box.
pub(crate) fn profile_points(start: i32, finish: i32, gain: Option<u32>) -> String {
    let peak = start.max(finish) + gain.map_or(0, |g| i32::try_from(g / 2).unwrap_or(0));
    let (lo, hi) = (start.min(finish), peak);
    let y = |v: i32| {
        if hi == lo {
            55.0
        } else {
            90.0 - f64::from(v - lo) / f64::from(hi - lo) * 70.0
        }
    };
    format!(
        "0,{:.1} 150,{:.1} 300,{:.1}",
        y(start),
        y(peak),
        y(finish)
    )
}
