use chrono::{DateTime, Duration, Utc};
use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{
    CreateError, DeleteError, Exercise, FinishedWorkout, ReadError, Summary, Template,
    UpdateError,
};

#[allow(async_fn_in_trait)]
pub trait HistoryService {
    async fn get_history(&self) -> Result<Vec<HistoryEntry>, ReadError>;
    async fn commit_workout(
        &self,
        workout: FinishedWorkout,
        date: DateTime<Utc>,
    ) -> Result<HistoryEntry, CreateError>;
    async fn toggle_history_favorite(&self, id: HistoryEntryID)
    -> Result<HistoryEntry, UpdateError>;
    async fn delete_history_entry(&self, id: HistoryEntryID)
    -> Result<HistoryEntryID, DeleteError>;

    #[must_use]
    fn filter_history<'a>(
        &self,
        entries: &'a [HistoryEntry],
        filter: &HistoryFilter,
        now: DateTime<Utc>,
    ) -> Vec<&'a HistoryEntry> {
        filter.history(entries, now)
    }
}

#[allow(async_fn_in_trait)]
pub trait HistoryRepository {
    async fn read_history(&self) -> Result<Vec<HistoryEntry>, ReadError>;
    async fn create_history_entry(&self, entry: HistoryEntry)
    -> Result<HistoryEntry, CreateError>;
    async fn replace_history_entry(
        &self,
        entry: HistoryEntry,
    ) -> Result<HistoryEntry, UpdateError>;
    async fn delete_history_entry(&self, id: HistoryEntryID)
    -> Result<HistoryEntryID, DeleteError>;
}

/// Record of a finished workout.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: HistoryEntryID,
    pub title: String,
    pub date: DateTime<Utc>,
    /// Duration in seconds.
    pub duration: u32,
    pub exercises: Vec<Exercise>,
    pub notes: String,
    pub volume: f32,
    pub favorite: bool,
}

impl HistoryEntry {
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::new(&self.exercises)
    }
}

impl FinishedWorkout {
    #[must_use]
    pub fn into_history_entry(self, date: DateTime<Utc>) -> HistoryEntry {
        let volume = self.summary().total_volume;
        let (title, exercises, notes, duration) = self.into_parts();
        HistoryEntry {
            id: HistoryEntryID::random(),
            title,
            date,
            duration,
            exercises,
            notes,
            volume,
            favorite: false,
        }
    }
}

#[derive(Deref, Display, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct HistoryEntryID(Uuid);

impl HistoryEntryID {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for HistoryEntryID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for HistoryEntryID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateWindow {
    #[default]
    All,
    Week,
    Month,
    ThreeMonths,
}

impl DateWindow {
    #[must_use]
    pub fn days(self) -> Option<i64> {
        match self {
            DateWindow::All => None,
            DateWindow::Week => Some(7),
            DateWindow::Month => Some(30),
            DateWindow::ThreeMonths => Some(90),
        }
    }

    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|days| now - Duration::days(days))
    }
}

/// Criteria for listing history entries and templates.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HistoryFilter {
    pub text: String,
    pub window: DateWindow,
    pub favorites_only: bool,
}

impl HistoryFilter {
    /// Matching entries, most recent first. Entries with the same date keep their input order.
    #[must_use]
    pub fn history<'a>(
        &self,
        entries: impl IntoIterator<Item = &'a HistoryEntry>,
        now: DateTime<Utc>,
    ) -> Vec<&'a HistoryEntry> {
        let cutoff = self.window.cutoff(now);
        let mut result = entries
            .into_iter()
            .filter(|e| {
                self.matches_text(&e.title)
                    && (!self.favorites_only || e.favorite)
                    && cutoff.is_none_or(|cutoff| e.date >= cutoff)
            })
            .collect::<Vec<_>>();
        result.sort_by(|a, b| b.date.cmp(&a.date));
        result
    }

    /// Matching templates, favorites first, then most recently used. Templates that have never
    /// been used come last. Ties keep their input order.
    #[must_use]
    pub fn templates<'a>(
        &self,
        templates: impl IntoIterator<Item = &'a Template>,
    ) -> Vec<&'a Template> {
        let mut result = templates
            .into_iter()
            .filter(|t| self.matches_text(t.title.as_ref()) && (!self.favorites_only || t.favorite))
            .collect::<Vec<_>>();
        result.sort_by(|a, b| {
            b.favorite
                .cmp(&a.favorite)
                .then_with(|| b.last_used.cmp(&a.last_used))
        });
        result
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.window == DateWindow::All && !self.favorites_only
    }

    fn matches_text(&self, title: &str) -> bool {
        title
            .to_lowercase()
            .contains(self.text.to_lowercase().trim())
    }
}

#[must_use]
pub fn filter_history<'a>(
    entries: &'a [HistoryEntry],
    filter: &HistoryFilter,
    now: DateTime<Utc>,
) -> Vec<&'a HistoryEntry> {
    filter.history(entries, now)
}

#[must_use]
pub fn filter_templates<'a>(
    templates: &'a [Template],
    filter: &HistoryFilter,
) -> Vec<&'a Template> {
    filter.templates(templates)
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{FieldValue, Mutation, Name, SetField, WorkoutSession};

    use super::*;

    static NOW: std::sync::LazyLock<DateTime<Utc>> =
        std::sync::LazyLock::new(|| DateTime::from_timestamp(1_700_000_000, 0).unwrap());

    fn entry(id: u128, title: &str, days_ago: i64, favorite: bool) -> HistoryEntry {
        HistoryEntry {
            id: id.into(),
            title: title.to_string(),
            date: *NOW - Duration::days(days_ago),
            duration: 3600,
            exercises: vec![],
            notes: String::new(),
            volume: 0.0,
            favorite,
        }
    }

    fn template(id: u128, title: &str, favorite: bool, used_days_ago: Option<i64>) -> Template {
        Template {
            id: id.into(),
            title: Name::new(title).unwrap(),
            exercises: vec![],
            favorite,
            last_used: used_days_ago.map(|d| *NOW - Duration::days(d)),
        }
    }

    static HISTORY: std::sync::LazyLock<Vec<HistoryEntry>> = std::sync::LazyLock::new(|| {
        vec![
            entry(1, "Upper Body Push", 100, false),
            entry(2, "Lower Body", 20, true),
            entry(3, "Upper Body Pull", 5, false),
            entry(4, "Full Body", 0, false),
            entry(5, "Upper Body Push", 20, false),
            entry(6, "Cardio", 7, true),
            entry(7, "Mobility", 30, false),
            entry(8, "Mobility", 90, false),
        ]
    });

    static TEMPLATES: std::sync::LazyLock<Vec<Template>> = std::sync::LazyLock::new(|| {
        vec![
            template(1, "Push Day", true, Some(10)),
            template(2, "Pull Day", false, Some(2)),
            template(3, "Leg Day", true, Some(1)),
            template(4, "Full Body", false, None),
            template(5, "Arms", true, None),
            template(6, "Core", false, Some(30)),
            template(7, "Stretching", false, None),
        ]
    });

    fn history_ids(filter: &HistoryFilter) -> Vec<u128> {
        filter
            .history(HISTORY.iter(), *NOW)
            .iter()
            .map(|e| u128::from_be_bytes(*e.id.as_bytes()))
            .collect()
    }

    fn template_ids(filter: &HistoryFilter) -> Vec<u128> {
        filter
            .templates(TEMPLATES.iter())
            .iter()
            .map(|t| u128::from_be_bytes(*t.id.as_bytes()))
            .collect()
    }

    #[rstest]
    #[case(HistoryFilter::default(), vec![4, 3, 6, 2, 5, 7, 8, 1])]
    #[case(HistoryFilter { text: "upper".into(), ..HistoryFilter::default() }, vec![3, 5, 1])]
    #[case(HistoryFilter { text: "  BODY ".into(), ..HistoryFilter::default() }, vec![4, 3, 2, 5, 1])]
    #[case(HistoryFilter { window: DateWindow::Week, ..HistoryFilter::default() }, vec![4, 3, 6])]
    #[case(HistoryFilter { window: DateWindow::Month, ..HistoryFilter::default() }, vec![4, 3, 6, 2, 5, 7])]
    #[case(HistoryFilter { window: DateWindow::ThreeMonths, ..HistoryFilter::default() }, vec![4, 3, 6, 2, 5, 7, 8])]
    #[case(HistoryFilter { favorites_only: true, ..HistoryFilter::default() }, vec![6, 2])]
    #[case(HistoryFilter { text: "push".into(), window: DateWindow::Month, favorites_only: false }, vec![5])]
    #[case(HistoryFilter { text: "yoga".into(), ..HistoryFilter::default() }, vec![])]
    fn test_history_filter_history(#[case] filter: HistoryFilter, #[case] expected: Vec<u128>) {
        assert_eq!(history_ids(&filter), expected);
    }

    #[rstest]
    #[case(HistoryFilter::default())]
    #[case(HistoryFilter { text: "body".into(), ..HistoryFilter::default() })]
    #[case(HistoryFilter { window: DateWindow::Month, ..HistoryFilter::default() })]
    fn test_history_filter_history_idempotent(#[case] filter: HistoryFilter) {
        let once = filter.history(HISTORY.iter(), *NOW);
        let twice = filter.history(once.iter().copied(), *NOW);
        assert_eq!(once, twice);
        assert_eq!(filter.history(HISTORY.iter(), *NOW), once);
    }

    #[rstest]
    #[case(HistoryFilter::default(), vec![3, 1, 5, 2, 6, 4, 7])]
    #[case(HistoryFilter { favorites_only: true, ..HistoryFilter::default() }, vec![3, 1, 5])]
    #[case(HistoryFilter { text: "DAY".into(), ..HistoryFilter::default() }, vec![3, 1, 2])]
    #[case(HistoryFilter { window: DateWindow::Week, ..HistoryFilter::default() }, vec![3, 1, 5, 2, 6, 4, 7])]
    fn test_history_filter_templates(#[case] filter: HistoryFilter, #[case] expected: Vec<u128>) {
        assert_eq!(template_ids(&filter), expected);
    }

    #[test]
    fn test_history_filter_templates_idempotent() {
        let filter = HistoryFilter::default();
        let once = filter.templates(TEMPLATES.iter());
        let twice = filter.templates(once.iter().copied());
        assert_eq!(once, twice);
    }

    #[rstest]
    #[case(HistoryFilter::default(), true)]
    #[case(HistoryFilter { text: "  ".into(), ..HistoryFilter::default() }, true)]
    #[case(HistoryFilter { text: "a".into(), ..HistoryFilter::default() }, false)]
    #[case(HistoryFilter { window: DateWindow::Week, ..HistoryFilter::default() }, false)]
    #[case(HistoryFilter { favorites_only: true, ..HistoryFilter::default() }, false)]
    fn test_history_filter_is_empty(#[case] filter: HistoryFilter, #[case] expected: bool) {
        assert_eq!(filter.is_empty(), expected);
    }

    #[test]
    fn test_filter_functions() {
        let filter = HistoryFilter {
            favorites_only: true,
            ..HistoryFilter::default()
        };
        assert_eq!(filter_history(&HISTORY, &filter, *NOW).len(), 2);
        assert_eq!(filter_templates(&TEMPLATES, &filter).len(), 3);
    }

    #[test]
    fn test_into_history_entry() {
        let mut session = WorkoutSession::new("Push Day");
        session
            .mutate(Mutation::AddExercise {
                id: 1.into(),
                name: "Bench Press".into(),
            })
            .unwrap();
        let set_id = session.exercises()[0].sets[0].id;
        for (field, value) in [
            (SetField::Weight, FieldValue::Number(135.0)),
            (SetField::Reps, FieldValue::Number(10.0)),
            (SetField::Completed, FieldValue::Flag(true)),
        ] {
            session
                .mutate(Mutation::UpdateSet {
                    exercise_id: 1.into(),
                    set_id,
                    field,
                    value,
                })
                .unwrap();
        }
        session.mutate(Mutation::SetNotes("easy".into())).unwrap();
        let (workout, summary) = session.finish().unwrap();

        let entry = workout.clone().into_history_entry(*NOW);

        assert_eq!(entry.title, "Push Day");
        assert_eq!(entry.date, *NOW);
        assert_eq!(entry.duration, 0);
        assert_eq!(entry.notes, "easy");
        assert_eq!(entry.exercises, workout.exercises());
        assert!(!entry.favorite);
        assert_approx_eq!(entry.volume, 1350.0);
        assert_eq!(entry.summary(), summary);
    }

    #[rstest]
    #[case(DateWindow::All, None)]
    #[case(DateWindow::Week, Some(7))]
    #[case(DateWindow::Month, Some(30))]
    #[case(DateWindow::ThreeMonths, Some(90))]
    fn test_date_window_cutoff(#[case] window: DateWindow, #[case] days: Option<i64>) {
        assert_eq!(
            window.cutoff(*NOW),
            days.map(|d| *NOW - Duration::days(d))
        );
    }
}
