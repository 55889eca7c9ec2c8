//! Filter panel state.
//!
//! Every successful edit returns the new [`FilterSet`], which the page hands
//! straight to the search orchestrator.

use log::{debug, error};

use crate::api::{FilterOptions, NumericRange};
use crate::error::FilterError;
use crate::history::SearchHistory;
use crate::query::{FilterSet, QueryKey};

pub mod fields {
    pub const REGION_OF_ORIGIN: &str = "region_of_origin";
    pub const CURRENT_LOCATION: &str = "current_location";
    pub const SKILLS: &str = "skills";
    pub const LANGUAGES: &str = "languages";
    pub const EDUCATION_LEVEL: &str = "education_level";
    pub const RELIGION: &str = "religion";
    pub const WORKING_TIME: &str = "working_time";
    pub const EXPERIENCE_MIN: &str = "experience_min";
    pub const EXPERIENCE_MAX: &str = "experience_max";
    pub const AGE_MIN: &str = "age_min";
    pub const AGE_MAX: &str = "age_max";
    pub const MIN_RATING: &str = "min_rating";
    pub const IS_VERIFIED: &str = "is_verified";
}

/// Fields edited through checkbox groups.
pub const MULTI_SELECT_FIELDS: [&str; 2] = [fields::SKILLS, fields::LANGUAGES];

/// Range fields the backend parses as integers.
pub const WHOLE_NUMBER_FIELDS: [&str; 4] = [
    fields::EXPERIENCE_MIN,
    fields::EXPERIENCE_MAX,
    fields::AGE_MIN,
    fields::AGE_MAX,
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterController {
    filters: FilterSet,
}

impl FilterController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &FilterSet {
        &self.filters
    }

    /// Free text or select value. An empty string clears the field.
    pub fn set_text(&mut self, field: &str, value: &str) -> FilterSet {
        self.filters.set(field, value);
        self.filters.clone()
    }

    /// Check or uncheck one option of a multi-select group.
    pub fn toggle(&mut self, field: &str, value: &str, checked: bool) -> FilterSet {
        self.filters.toggle(field, value, checked);
        self.filters.clone()
    }

    /// Numeric range input, validated against the server-provided bounds.
    /// Invalid input leaves the filters unchanged.
    pub fn set_numeric(
        &mut self,
        field: &str,
        input: &str,
        options: &FilterOptions,
    ) -> Result<FilterSet, FilterError> {
        let value = normalize_numeric(field, input, options)?;
        self.filters.set(field, value);
        Ok(self.filters.clone())
    }

    pub fn set_verified_only(&mut self, verified_only: bool) -> FilterSet {
        let value = if verified_only { "true" } else { "" };
        self.set_text(fields::IS_VERIFIED, value)
    }

    pub fn reset(&mut self) -> FilterSet {
        self.filters = FilterSet::new();
        self.filters.clone()
    }

    /// Replace everything, widening multi-select fields to lists.
    pub fn replace(&mut self, filters: FilterSet) -> FilterSet {
        let mut normalized = filters;
        for field in MULTI_SELECT_FIELDS {
            if let Some(value) = normalized.remove(field) {
                normalized.set(field, value.into_multi());
            }
        }
        self.filters = normalized;
        self.filters.clone()
    }

    /// Re-apply a clicked history entry. A key that does not decode is
    /// logged and ignored.
    pub fn apply_history(&mut self, history: &SearchHistory, key: &QueryKey) -> Option<FilterSet> {
        match history.selection(key) {
            Ok(filters) => {
                debug!("Re-applying search `{}`", key);
                Some(self.replace(filters))
            }
            Err(e) => {
                error!("Error parsing search query `{}`: {}", key, e);
                None
            }
        }
    }

    pub fn is_checked(&self, field: &str, value: &str) -> bool {
        self.filters
            .get(field)
            .map(|v| v.contains(value))
            .unwrap_or(false)
    }

    pub fn verified_only(&self) -> bool {
        self.filters.text(fields::IS_VERIFIED) == "true"
    }
}

/// Canonical text for a numeric range input; `""` clears the field.
pub fn normalize_numeric(
    field: &str,
    input: &str,
    options: &FilterOptions,
) -> Result<String, FilterError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    let (range, label) = range_for(field, options);
    let (min, max) = match range {
        Some(r) if r.max > r.min => (Some(r.min), Some(r.max)),
        _ => (None, None),
    };
    let value = validate_numeric_input::<f64>(trimmed, min, max, label)?;
    if WHOLE_NUMBER_FIELDS.iter().any(|f| *f == field) {
        if value.fract() != 0.0 || value < 0.0 {
            return Err(FilterError::NotAWholeNumber {
                field: label.to_string(),
            });
        }
        return Ok(format!("{}", value as u64));
    }
    Ok(value.to_string())
}

pub fn field_label(field: &str) -> &'static str {
    match field {
        fields::EXPERIENCE_MIN | fields::EXPERIENCE_MAX => "Years of experience",
        fields::AGE_MIN | fields::AGE_MAX => "Age",
        fields::MIN_RATING => "Minimum rating",
        _ => "Value",
    }
}

/// Server-provided bounds of a numeric field, with its display label.
pub fn range_for<'a>(
    field: &str,
    options: &'a FilterOptions,
) -> (Option<&'a NumericRange>, &'static str) {
    let range = match field {
        fields::EXPERIENCE_MIN | fields::EXPERIENCE_MAX => Some(&options.experience_range),
        fields::AGE_MIN | fields::AGE_MAX => Some(&options.age_range),
        fields::MIN_RATING => Some(&options.rating_range),
        _ => None,
    };
    (range, field_label(field))
}

/// Generic numeric input validation
pub fn validate_numeric_input<T>(
    input: &str,
    min: Option<T>,
    max: Option<T>,
    field_name: &str,
) -> Result<T, FilterError>
where
    T: std::str::FromStr + std::fmt::Display + PartialOrd + Into<f64> + Copy,
{
    let trimmed = input.trim();
    let val = trimmed
        .parse::<T>()
        .ok()
        .filter(|v| (*v).into().is_finite())
        .ok_or_else(|| FilterError::NotANumber {
            field: field_name.to_string(),
        })?;

    if let Some(min_val) = min {
        if val < min_val {
            return Err(FilterError::BelowMinimum {
                field: field_name.to_string(),
                min: min_val.to_string(),
            });
        }
    }
    if let Some(max_val) = max {
        if val > max_val {
            return Err(FilterError::AboveMaximum {
                field: field_name.to_string(),
                max: max_val.to_string(),
            });
        }
    }
    Ok(val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::history::MemoryStorage;
    use crate::query::FilterValue;

    fn options() -> FilterOptions {
        FilterOptions {
            experience_range: NumericRange { min: 0.0, max: 30.0 },
            age_range: NumericRange { min: 18.0, max: 60.0 },
            rating_range: NumericRange { min: 0.0, max: 5.0 },
            ..FilterOptions::default()
        }
    }

    #[test]
    fn text_edits_accumulate_and_clear() {
        let mut controller = FilterController::new();
        controller.set_text(fields::REGION_OF_ORIGIN, "Amhara");
        let filters = controller.set_text(fields::RELIGION, "orthodox");
        assert_eq!(filters.len(), 2);

        let filters = controller.set_text(fields::REGION_OF_ORIGIN, "");
        assert_eq!(filters.encode().as_str(), "religion=orthodox");
    }

    #[test]
    fn blank_location_is_no_filter() {
        let mut controller = FilterController::new();
        let filters = controller.set_text(fields::CURRENT_LOCATION, " ");
        assert!(filters.is_empty());
        assert!(filters.encode().is_all_workers());

        let filters = controller.set_text(fields::CURRENT_LOCATION, "Bole ");
        assert_eq!(filters.encode().as_str(), "current_location=Bole");
    }

    #[test]
    fn checkbox_groups() {
        let mut controller = FilterController::new();
        controller.toggle(fields::SKILLS, "Cooking", true);
        controller.toggle(fields::SKILLS, "Laundry", true);
        assert!(controller.is_checked(fields::SKILLS, "Cooking"));

        let filters = controller.toggle(fields::SKILLS, "Cooking", false);
        assert_eq!(filters.encode().as_str(), "skills=Laundry");
        assert!(!controller.is_checked(fields::SKILLS, "Cooking"));
    }

    #[test]
    fn numeric_inputs_are_range_checked() {
        let mut controller = FilterController::new();
        let filters = controller
            .set_numeric(fields::MIN_RATING, " 4.5 ", &options())
            .unwrap();
        assert_eq!(filters.text(fields::MIN_RATING), "4.5");

        let err = controller
            .set_numeric(fields::AGE_MIN, "16", &options())
            .unwrap_err();
        assert_eq!(err.to_string(), "Age must be at least 18");
        assert!(controller.current().get(fields::AGE_MIN).is_none());

        let err = controller
            .set_numeric(fields::EXPERIENCE_MAX, "abc", &options())
            .unwrap_err();
        assert_eq!(err.to_string(), "Years of experience must be a valid number");

        assert!(controller
            .set_numeric(fields::MIN_RATING, "NaN", &options())
            .is_err());
    }

    #[test]
    fn numeric_input_canonicalizes_and_clears() {
        let mut controller = FilterController::new();
        let filters = controller
            .set_numeric(fields::AGE_MAX, "40.0", &options())
            .unwrap();
        assert_eq!(filters.text(fields::AGE_MAX), "40");

        let filters = controller.set_numeric(fields::AGE_MAX, "", &options()).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn age_and_experience_take_whole_numbers_only() {
        let mut controller = FilterController::new();
        let err = controller
            .set_numeric(fields::EXPERIENCE_MIN, "4.5", &options())
            .unwrap_err();
        assert_eq!(err.to_string(), "Years of experience must be a whole number");

        let err = controller
            .set_numeric(fields::AGE_MAX, "30.5", &options())
            .unwrap_err();
        assert_eq!(err, FilterError::NotAWholeNumber { field: "Age".into() });
        assert!(controller.current().is_empty());

        let err = controller
            .set_numeric(fields::EXPERIENCE_MAX, "-2", &FilterOptions::default())
            .unwrap_err();
        assert!(matches!(err, FilterError::NotAWholeNumber { .. }));

        // ratings stay fractional
        let filters = controller
            .set_numeric(fields::MIN_RATING, "3.5", &options())
            .unwrap();
        assert_eq!(filters.text(fields::MIN_RATING), "3.5");
        assert_eq!(normalize_numeric(fields::EXPERIENCE_MIN, "7", &options()).unwrap(), "7");
    }

    #[test]
    fn unknown_ranges_are_unbounded() {
        let mut controller = FilterController::new();
        let filters = controller
            .set_numeric(fields::AGE_MIN, "99", &FilterOptions::default())
            .unwrap();
        assert_eq!(filters.text(fields::AGE_MIN), "99");
    }

    #[test]
    fn verified_only_toggle() {
        let mut controller = FilterController::new();
        controller.set_verified_only(true);
        assert!(controller.verified_only());
        let filters = controller.set_verified_only(false);
        assert!(filters.is_empty());
    }

    #[test]
    fn history_entry_reapplies_with_list_fields() {
        let history = SearchHistory::load(Box::new(MemoryStorage::new()), &SearchConfig::default());
        let mut controller = FilterController::new();
        controller.set_text(fields::RELIGION, "muslim");

        let filters = controller
            .apply_history(
                &history,
                &QueryKey::from("region_of_origin=Addis Ababa&skills=Cooking"),
            )
            .unwrap();
        assert_eq!(
            filters.get(fields::SKILLS),
            Some(&FilterValue::from(vec!["Cooking"]))
        );
        assert!(filters.get(fields::RELIGION).is_none());
        assert_eq!(controller.current(), &filters);
    }

    #[test]
    fn bad_history_entry_is_ignored() {
        let history = SearchHistory::load(Box::new(MemoryStorage::new()), &SearchConfig::default());
        let mut controller = FilterController::new();
        controller.set_text(fields::RELIGION, "muslim");

        assert!(controller
            .apply_history(&history, &QueryKey::from("{\"religion\":\"x\"}"))
            .is_none());
        assert_eq!(controller.current().text(fields::RELIGION), "muslim");
    }

    #[test]
    fn reset_clears_everything() {
        let mut controller = FilterController::new();
        controller.toggle(fields::LANGUAGES, "Afar", true);
        assert!(controller.reset().is_empty());
    }
}
