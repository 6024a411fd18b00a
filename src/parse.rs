//! Best-effort reconstruction of a [`ParticipantResult`] from page text and tables.
//!
//! Nothing here fails: a field that cannot be located is left empty (or at its
//! documented default) so a half-rendered page still yields a usable card.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

use crate::model::{Checkpoint, Gender, ParticipantResult, RawExtraction};

/// Shown instead of a finish time that could not be found.
pub const TIME_PLACEHOLDER: &str = "—";

pub(crate) static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}:\d{2}:\d{2}\b").unwrap());

static FULL_CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}:\d{2}$").unwrap());

static NAME_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{Lu}[\p{Ll}'’-]+$").unwrap());

static RANK_OF_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*/\s*(\d+)").unwrap());

static GENDER_PLACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:absolute|gender|абсолют\p{L}*|стать|пол)[ \t]*(?:place|місце|место)?[ \t]*[:#№]?[ \t]*(\d+)",
    )
    .unwrap()
});

static PACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}:\d{2}(?::\d{2})?)\b(?:[ \t]*(?:min[ \t]*)?/[ \t]*(?:km|км))?")
        .unwrap()
});

static DISTANCE_KM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)[ \t]*(?:km|км)\b").unwrap());

static LEADING_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+").unwrap());

static FEMALE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:female|women|woman|жінки|жінка|женщины|женщина)\b").unwrap()
});

static MALE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:male|men|man|чоловіки|чоловік|мужчины|мужчина)\b").unwrap()
});

/// Words that show up capitalized in page chrome and are never part of a name.
const LAYOUT_WORDS: &[&str] = &[
    "place", "places", "time", "times", "pace", "category", "categories", "distance", "race",
    "results", "result", "overall", "finish", "start", "bib", "club", "team", "gender", "name",
    "event", "marathon", "half", "run", "trail", "ultra", "місце", "місця", "час", "темп",
    "категорія", "дистанція", "забіг", "результати", "результат", "фініш", "старт", "команда",
    "клуб", "место", "время", "категория", "дистанция", "забег", "результаты", "финиш",
    "марафон", "напівмарафон", "полумарафон",
];

static CLUB_LABELS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| label_patterns(&["club", "team", "клуб", "команда"]));

static CATEGORY_LABELS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    label_patterns(&["category", "age group", "cat.", "категорія", "категория", "група"])
});

static RACE_LABELS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    label_patterns(&[
        "distance",
        "дистанція",
        "дистанция",
        "race",
        "забіг",
        "забег",
        "course",
    ])
});

static GENDER_LABELS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| label_patterns(&["gender", "sex", "стать", "пол"]));

static ELEVATION_GAIN_LABELS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    label_patterns(&["elevation gain", "ascent", "набір висоти", "набор высоты", "d+"])
});

static START_ELEVATION_LABELS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| label_patterns(&["start elevation", "start altitude"]));

static FINISH_ELEVATION_LABELS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| label_patterns(&["finish elevation", "finish altitude"]));

/// Rebuild a participant result for `bib` from raw page content.
pub fn reconstruct(raw: &RawExtraction, bib: &str) -> ParticipantResult {
    let text = raw.text_preview.as_str();
    let category = labeled_value(text, &CATEGORY_LABELS);
    let race = labeled_value(text, &RACE_LABELS);

    ParticipantResult {
        bib: bib.to_string(),
        name: participant_name(text).unwrap_or_else(|| format!("Participant #{bib}")),
        time: raw
            .times
            .first()
            .cloned()
            .unwrap_or_else(|| TIME_PLACEHOLDER.to_string()),
        place: overall_place(raw.place.as_deref()),
        club: labeled_value(text, &CLUB_LABELS),
        gender: gender(category.as_deref(), text),
        distance_km: race.as_deref().and_then(distance_km).or_else(|| distance_km(text)),
        race,
        category,
        place_category: rank_of_field(text),
        place_gender: GENDER_PLACE
            .captures(text)
            .and_then(|c| c[1].parse().ok()),
        pace: pace(text),
        elevation_gain: labeled_int(text, &ELEVATION_GAIN_LABELS)
            .and_then(|v| u32::try_from(v).ok()),
        elevation_start: labeled_int(text, &START_ELEVATION_LABELS),
        elevation_finish: labeled_int(text, &FINISH_ELEVATION_LABELS),
        checkpoints: checkpoints(&raw.tables),
    }
}

/// First pair of adjacent capitalized words on one line that is not page chrome.
fn participant_name(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        line.split_whitespace()
            .map(|w| w.trim_matches(|c: char| ",;:.()\"".contains(c)))
            .tuple_windows()
            .find(|(first, last)| is_name_word(first) && is_name_word(last))
            .map(|(first, last)| format!("{first} {last}"))
    })
}

fn is_name_word(word: &str) -> bool {
    NAME_WORD.is_match(word) && !is_layout_word(word)
}

fn is_layout_word(word: &str) -> bool {
    LAYOUT_WORDS.contains(&word.to_lowercase().as_str())
}

/// `0` unless the captured place is all digits.
fn overall_place(place: Option<&str>) -> u32 {
    place
        .map(str::trim)
        .filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
        .and_then(|p| p.parse().ok())
        .unwrap_or(0)
}

fn label_patterns(keywords: &[&str]) -> Vec<Regex> {
    keywords
        .iter()
        .map(|kw| {
            Regex::new(&format!(
                r"(?im)(?:^|[^\p{{L}}]){}(?:[ \t]*:|[ \t])[ \t]*([^\r\n]+)",
                regex::escape(kw)
            ))
            .unwrap()
        })
        .collect()
}

/// Value following the first keyword (in priority order) that has one on
/// the same line, shorter than 50 characters.
fn labeled_value(text: &str, patterns: &[Regex]) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .find(|v| {
                !v.is_empty()
                    && v.chars().count() < 50
                    && !v.split_whitespace().all(is_layout_word)
            })
            .map(str::to_string)
    })
}

fn labeled_int(text: &str, patterns: &[Regex]) -> Option<i32> {
    labeled_value(text, patterns)
        .and_then(|v| LEADING_INT.find(&v).and_then(|m| m.as_str().parse().ok()))
}

/// Gender from the category, else from a labeled gender line. Loose
/// "men"/"women" words elsewhere on the page are filter tabs, not data.
fn gender(category: Option<&str>, text: &str) -> Option<Gender> {
    let labeled = labeled_value(text, &GENDER_LABELS);
    let found = [category, labeled.as_deref()]
        .into_iter()
        .flatten()
        .find_map(gender_of);
    found
}

fn gender_of(value: &str) -> Option<Gender> {
    // Cyrillic М/Ч (male) and Ж (female) prefixes are common on local pages.
    match value.trim().chars().next() {
        Some('M' | 'М' | 'Ч') => Some(Gender::Male),
        Some('F' | 'W' | 'Ж') => Some(Gender::Female),
        _ if FEMALE_WORD.is_match(value) => Some(Gender::Female),
        _ if MALE_WORD.is_match(value) => Some(Gender::Male),
        _ => None,
    }
}

/// First `rank/field` pair that is not part of a date.
fn rank_of_field(text: &str) -> Option<String> {
    RANK_OF_FIELD.captures_iter(text).find_map(|c| {
        let whole = c.get(0)?;
        let before = text[..whole.start()].chars().next_back();
        let after = text[whole.end()..].chars().next();
        if matches!(before, Some('/' | '.')) || matches!(after, Some('/' | '.')) {
            return None;
        }
        let rank: u32 = c[1].parse().ok()?;
        let field: u32 = c[2].parse().ok()?;
        (rank > 0 && rank <= field).then(|| format!("{rank}/{field}"))
    })
}

/// The last `M:SS` figure; result pages list splits before the pace.
fn pace(text: &str) -> Option<String> {
    PACE.captures_iter(text)
        .filter(|c| c[1].matches(':').count() == 1)
        .filter_map(|c| c.get(0))
        .map(|m| m.as_str().trim().to_string())
        .last()
}

fn distance_km(label: &str) -> Option<f64> {
    DISTANCE_KM
        .captures(label)
        .and_then(|c| c[1].replace(',', ".").parse().ok())
}

/// One checkpoint per table row that contains a clock time.
fn checkpoints(rows: &[Vec<String>]) -> Vec<Checkpoint> {
    let mut checkpoints = Vec::new();
    for row in rows {
        let Some(i) = row.iter().position(|c| FULL_CLOCK_TIME.is_match(c.trim())) else {
            continue;
        };
        let name = i
            .checked_sub(1)
            .map(|prev| row[prev].trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("CP{}", checkpoints.len() + 1));
        let pace = row
            .get(i + 1)
            .map(|c| c.trim())
            .filter(|c| c.contains('/'))
            .map(str::to_string);
        checkpoints.push(Checkpoint {
            distance_km: distance_km(&name),
            name,
            time: row[i].trim().to_string(),
            pace,
        });
    }
    checkpoints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_text(text: &str) -> RawExtraction {
        RawExtraction {
            text_preview: text.to_string(),
            times: CLOCK_TIME
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect(),
            ..Default::default()
        }
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_checkpoints_from_split_table() {
        let raw = RawExtraction {
            tables: vec![
                row(&["Checkpoint", "Time", "Pace"]),
                row(&["CP1", "00:38:12", "7:38 /km"]),
                row(&["Finish", "01:58:24", "11:27 /km"]),
            ],
            ..Default::default()
        };
        let result = reconstruct(&raw, "320");

        assert_eq!(result.checkpoints.len(), 2);
        assert_eq!(result.checkpoints[0].name, "CP1");
        assert_eq!(result.checkpoints[0].time, "00:38:12");
        assert_eq!(result.checkpoints[0].pace.as_deref(), Some("7:38 /km"));
        assert_eq!(result.checkpoints[1].name, "Finish");
        assert_eq!(result.checkpoints[1].time, "01:58:24");
        assert_eq!(result.checkpoints[1].pace.as_deref(), Some("11:27 /km"));
        assert!(result.has_checkpoints());
    }

    #[test]
    fn test_checkpoint_naming_and_pace_rules() {
        let raw = RawExtraction {
            tables: vec![
                row(&["0:21:40", "4:20"]),
                row(&["", "1:02:03", "x"]),
                row(&["10 km", "0:45:00", "4:30 /km", "0:50:00"]),
            ],
            ..Default::default()
        };
        let checkpoints = reconstruct(&raw, "1").checkpoints;

        assert_eq!(checkpoints.len(), 3);
        assert_eq!(checkpoints[0].name, "CP1");
        assert_eq!(checkpoints[0].pace, None);
        assert_eq!(checkpoints[1].name, "CP2");
        assert_eq!(checkpoints[1].pace, None);
        assert_eq!(checkpoints[2].name, "10 km");
        assert_eq!(checkpoints[2].distance_km, Some(10.0));
        assert_eq!(checkpoints[2].time, "0:45:00");
    }

    #[test]
    fn test_category_place_and_gender() {
        let raw = raw_with_text("Ivan Petrenko\nCategory: M30-39\nCategory place 1/89\n");
        let result = reconstruct(&raw, "320");

        assert_eq!(result.category.as_deref(), Some("M30-39"));
        assert_eq!(result.place_category.as_deref(), Some("1/89"));
        assert_eq!(result.gender, Some(Gender::Male));
    }

    #[test]
    fn test_rank_of_field_skips_dates() {
        let raw = raw_with_text("Date: 12/05/2024\nIn category 7/40");
        assert_eq!(
            reconstruct(&raw, "1").place_category.as_deref(),
            Some("7/40")
        );
    }

    #[test]
    fn test_name_skips_layout_words() {
        let raw = raw_with_text("Race Results\nOverall Place Time\nОлена Коваленко\n");
        assert_eq!(reconstruct(&raw, "9").name, "Олена Коваленко");

        let raw = raw_with_text("Race Results\nBib 12 Grace Kelly");
        assert_eq!(reconstruct(&raw, "12").name, "Grace Kelly");
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let result = reconstruct(&RawExtraction::default(), "A17");

        assert_eq!(result.bib, "A17");
        assert_eq!(result.name, "Participant #A17");
        assert_eq!(result.time, TIME_PLACEHOLDER);
        assert_eq!(result.place, 0);
        assert_eq!(result.club, None);
        assert_eq!(result.category, None);
        assert_eq!(result.gender, None);
        assert_eq!(result.pace, None);
        assert!(result.checkpoints.is_empty());
    }

    #[test]
    fn test_place_must_be_digits() {
        let mut raw = raw_with_text("");
        raw.place = Some("12".into());
        assert_eq!(reconstruct(&raw, "1").place, 12);

        raw.place = Some("12a".into());
        assert_eq!(reconstruct(&raw, "1").place, 0);

        raw.place = Some(String::new());
        assert_eq!(reconstruct(&raw, "1").place, 0);
    }

    #[test]
    fn test_time_is_first_clock_time() {
        let raw = raw_with_text("Finish 3:12:09\nGun time 3:12:40");
        assert_eq!(reconstruct(&raw, "1").time, "3:12:09");
    }

    #[test]
    fn test_labeled_values() {
        let raw = raw_with_text(
            "Results\nTeam Kyiv Runners\nClub: Lviv Road Club\nDistance: 21.1 km\nRace: Half",
        );
        let result = reconstruct(&raw, "1");

        // `club` outranks `team`.
        assert_eq!(result.club.as_deref(), Some("Lviv Road Club"));
        assert_eq!(result.race.as_deref(), Some("21.1 km"));
        assert_eq!(result.distance_km, Some(21.1));
    }

    #[test]
    fn test_labeled_value_length_limit() {
        let long = "x".repeat(60);
        let raw = raw_with_text(&format!("Club: {long}\nКлуб: Біг Рівне"));
        assert_eq!(reconstruct(&raw, "1").club.as_deref(), Some("Біг Рівне"));
    }

    #[test]
    fn test_pace_prefers_last() {
        let raw = raw_with_text("Split 10:15\nTime 1:58:24\nPace 5:37 /km");
        assert_eq!(reconstruct(&raw, "1").pace.as_deref(), Some("5:37 /km"));

        let raw = raw_with_text("Time 1:58:24");
        assert_eq!(reconstruct(&raw, "1").pace, None);
    }

    #[test]
    fn test_gender_place_and_words() {
        let raw = raw_with_text("Absolute place: 14\nGender: Women");
        let result = reconstruct(&raw, "1");
        assert_eq!(result.place_gender, Some(14));
        assert_eq!(result.gender, Some(Gender::Female));

        let raw = raw_with_text("Категорія: Ж40\nАбсолютне місце 3");
        let result = reconstruct(&raw, "1");
        assert_eq!(result.gender, Some(Gender::Female));
        assert_eq!(result.place_gender, Some(3));
    }

    #[test]
    fn test_gender_ignores_filter_tabs() {
        let raw = raw_with_text("Filter: All | Men | Women\nIvan Petrenko\nTime 1:00:00");
        let result = reconstruct(&raw, "1");
        assert_eq!(result.category, None);
        assert_eq!(result.gender, None);

        let raw = raw_with_text("All | Men | Women\nCategory: Open (women)");
        assert_eq!(reconstruct(&raw, "1").gender, Some(Gender::Female));

        let raw = raw_with_text("Стать: Ч\nAll | Women");
        assert_eq!(reconstruct(&raw, "1").gender, Some(Gender::Male));
    }

    #[test]
    fn test_distance_from_body_text() {
        let raw = raw_with_text("Ivan Petrenko\nLviv Half Marathon 21.1 km\nTime 1:45:10");
        let result = reconstruct(&raw, "1");
        assert_eq!(result.race, None);
        assert_eq!(result.distance_km, Some(21.1));

        let raw = raw_with_text("Distance: 10 km\nCourse record 42 km");
        assert_eq!(reconstruct(&raw, "1").distance_km, Some(10.0));
    }

    #[test]
    fn test_elevation_fields() {
        let raw = raw_with_text("Elevation gain: 420 m\nStart elevation: 150\nFinish elevation: 310");
        let result = reconstruct(&raw, "1");
        assert_eq!(result.elevation_gain, Some(420));
        assert_eq!(result.elevation_start, Some(150));
        assert_eq!(result.elevation_finish, Some(310));
        assert!(result.has_elevation_data());
    }

    #[test]
    fn test_reconstruct_is_deterministic() {
        let raw = RawExtraction {
            text_preview: "Ivan Petrenko\nClub: Run UA\nCategory: M40\n2/31\nPace 5:01".into(),
            times: vec!["1:45:10".into()],
            place: Some("4".into()),
            tables: vec![
                row(&["5 km", "0:24:30", "4:54 /km"]),
                row(&["Finish", "1:45:10", "4:59 /km"]),
            ],
            ..Default::default()
        };
        assert_eq!(reconstruct(&raw, "77"), reconstruct(&raw, "77"));
    }
}
