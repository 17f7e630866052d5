//! Recurrence rules attached to chores.
//!
//! # Responsibility
//! - Model the five recurrence kinds and the weekday-code set used by
//!   `specific_days`.
//! - Convert between the typed rule and the persisted
//!   (`recurrence_type`, `recurrence_days`) column pair.
//!
//! # Invariants
//! - Weekday codes are exactly `M,T,W,TH,F,SA,SU`.
//! - Only `SpecificDays` carries weekday codes.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Short weekday code as stored in `chores.recurrence_days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeekdayCode {
    #[serde(rename = "M")]
    Monday,
    #[serde(rename = "T")]
    Tuesday,
    #[serde(rename = "W")]
    Wednesday,
    #[serde(rename = "TH")]
    Thursday,
    #[serde(rename = "F")]
    Friday,
    #[serde(rename = "SA")]
    Saturday,
    #[serde(rename = "SU")]
    Sunday,
}

impl WeekdayCode {
    /// All codes in Monday-first order.
    pub const ALL: [WeekdayCode; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Stable storage code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Monday => "M",
            Self::Tuesday => "T",
            Self::Wednesday => "W",
            Self::Thursday => "TH",
            Self::Friday => "F",
            Self::Saturday => "SA",
            Self::Sunday => "SU",
        }
    }

    /// Parses one code, ignoring surrounding whitespace and case.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|code| code.code() == normalized.as_str())
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

impl Display for WeekdayCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Ordered, de-duplicated set of weekday codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdaySet(BTreeSet<WeekdayCode>);

impl WeekdaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-delimited code list such as `"M,W,F"`.
    ///
    /// Empty segments are ignored, so `""` yields an empty set.
    ///
    /// # Errors
    /// - Returns `UnknownWeekday` for any segment that is not a known code.
    pub fn parse_list(value: &str) -> Result<Self, RecurrenceParseError> {
        let mut days = BTreeSet::new();
        for segment in value.split(',') {
            if segment.trim().is_empty() {
                continue;
            }
            let code = WeekdayCode::parse(segment)
                .ok_or_else(|| RecurrenceParseError::UnknownWeekday(segment.trim().to_string()))?;
            days.insert(code);
        }
        Ok(Self(days))
    }

    pub fn contains(&self, code: WeekdayCode) -> bool {
        self.0.contains(&code)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = WeekdayCode> + '_ {
        self.0.iter().copied()
    }

    /// Renders the storage form, Monday-first (`"M,W,F"`).
    pub fn to_list_string(&self) -> String {
        self.iter().map(WeekdayCode::code).collect::<Vec<_>>().join(",")
    }
}

impl FromIterator<WeekdayCode> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = WeekdayCode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Persisted recurrence kind (`chores.recurrence_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
    Weekdays,
    SpecificDays,
}

impl RecurrenceKind {
    pub const ALL: [RecurrenceKind; 5] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Weekdays,
        Self::SpecificDays,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Weekdays => "weekdays",
            Self::SpecificDays => "specific_days",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized.as_str())
    }
}

impl Display for RecurrenceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed recurrence rule of a recurring chore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum Recurrence {
    Daily,
    /// Scheduled on Mondays only.
    Weekly,
    /// Accepted and stored, but never scheduled by the generator.
    Monthly,
    /// Monday through Friday.
    Weekdays,
    SpecificDays(WeekdaySet),
}

impl Recurrence {
    pub fn kind(&self) -> RecurrenceKind {
        match self {
            Self::Daily => RecurrenceKind::Daily,
            Self::Weekly => RecurrenceKind::Weekly,
            Self::Monthly => RecurrenceKind::Monthly,
            Self::Weekdays => RecurrenceKind::Weekdays,
            Self::SpecificDays(_) => RecurrenceKind::SpecificDays,
        }
    }

    /// Builds a rule from the persisted column pair.
    ///
    /// # Errors
    /// - `EmptyDays` when `specific_days` has no codes.
    /// - `UnexpectedDays` when any other kind carries codes.
    /// - `UnknownWeekday` for unparseable codes.
    pub fn from_parts(
        kind: RecurrenceKind,
        days: Option<&str>,
    ) -> Result<Self, RecurrenceParseError> {
        let days = match days {
            Some(value) => WeekdaySet::parse_list(value)?,
            None => WeekdaySet::new(),
        };

        match kind {
            RecurrenceKind::SpecificDays if days.is_empty() => {
                Err(RecurrenceParseError::EmptyDays)
            }
            RecurrenceKind::SpecificDays => Ok(Self::SpecificDays(days)),
            other if !days.is_empty() => Err(RecurrenceParseError::UnexpectedDays(other)),
            RecurrenceKind::Daily => Ok(Self::Daily),
            RecurrenceKind::Weekly => Ok(Self::Weekly),
            RecurrenceKind::Monthly => Ok(Self::Monthly),
            RecurrenceKind::Weekdays => Ok(Self::Weekdays),
        }
    }

    /// Storage form of `recurrence_days`; `None` unless `SpecificDays`.
    pub fn days_string(&self) -> Option<String> {
        match self {
            Self::SpecificDays(days) => Some(days.to_list_string()),
            _ => None,
        }
    }
}

/// Parse failure for recurrence kinds and weekday code lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceParseError {
    UnknownKind(String),
    UnknownWeekday(String),
    EmptyDays,
    UnexpectedDays(RecurrenceKind),
}

impl Display for RecurrenceParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownKind(value) => write!(
                f,
                "unknown recurrence kind `{value}`; expected daily|weekly|monthly|weekdays|specific_days"
            ),
            Self::UnknownWeekday(value) => write!(
                f,
                "unknown weekday code `{value}`; expected M|T|W|TH|F|SA|SU"
            ),
            Self::EmptyDays => write!(f, "specific_days recurrence requires weekday codes"),
            Self::UnexpectedDays(kind) => {
                write!(f, "recurrence kind `{kind}` does not take weekday codes")
            }
        }
    }
}

impl Error for RecurrenceParseError {}

#[cfg(test)]
mod tests {
    use super::{Recurrence, RecurrenceKind, RecurrenceParseError, WeekdayCode, WeekdaySet};

    #[test]
    fn weekday_list_parses_case_insensitive_and_dedups() {
        let days = WeekdaySet::parse_list(" w, m ,th,M").unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days.to_list_string(), "M,W,TH");
    }

    #[test]
    fn weekday_list_rejects_unknown_code() {
        let err = WeekdaySet::parse_list("M,XX").unwrap_err();
        assert_eq!(err, RecurrenceParseError::UnknownWeekday("XX".to_string()));
    }

    #[test]
    fn two_letter_codes_do_not_collide_with_single_letters() {
        assert_eq!(WeekdayCode::parse("T"), Some(WeekdayCode::Tuesday));
        assert_eq!(WeekdayCode::parse("TH"), Some(WeekdayCode::Thursday));
        assert_eq!(WeekdayCode::parse("S"), None);
    }

    #[test]
    fn from_parts_enforces_days_only_for_specific_days() {
        assert_eq!(
            Recurrence::from_parts(RecurrenceKind::SpecificDays, Some("")),
            Err(RecurrenceParseError::EmptyDays)
        );
        assert_eq!(
            Recurrence::from_parts(RecurrenceKind::Weekly, Some("M")),
            Err(RecurrenceParseError::UnexpectedDays(RecurrenceKind::Weekly))
        );
        assert_eq!(
            Recurrence::from_parts(RecurrenceKind::Daily, None),
            Ok(Recurrence::Daily)
        );

        let specific = Recurrence::from_parts(RecurrenceKind::SpecificDays, Some("F,M")).unwrap();
        assert_eq!(specific.kind(), RecurrenceKind::SpecificDays);
        assert_eq!(specific.days_string().as_deref(), Some("M,F"));
    }

    #[test]
    fn recurrence_serializes_with_kind_tag() {
        let value = serde_json::to_value(Recurrence::SpecificDays(
            [WeekdayCode::Monday, WeekdayCode::Sunday].into_iter().collect(),
        ))
        .unwrap();
        assert_eq!(value["kind"], "specific_days");
        assert_eq!(value["days"], serde_json::json!(["M", "SU"]));
    }
}
