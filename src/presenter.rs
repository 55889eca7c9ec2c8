//! Results panel state: client-side pagination, sort selection and the small
//! formatting rules of a worker card.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Range, RangeInclusive};
use std::rc::Rc;
use std::str::FromStr;

use crate::config::{BADGE_LIMIT, PAGE_SIZE};
use crate::query::QueryKey;
use crate::{ResultList, Worker};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOption {
    #[default]
    Relevance,
    Experience,
    Rating,
    DateRegistered,
    Age,
    Name,
}

impl SortOption {
    pub const ALL: [SortOption; 6] = [
        SortOption::Relevance,
        SortOption::Experience,
        SortOption::Rating,
        SortOption::DateRegistered,
        SortOption::Age,
        SortOption::Name,
    ];

    /// Form value, also the backend's `sort` parameter name.
    pub fn value(self) -> &'static str {
        match self {
            SortOption::Relevance => "relevance",
            SortOption::Experience => "experience",
            SortOption::Rating => "rating",
            SortOption::DateRegistered => "date_registered",
            SortOption::Age => "age",
            SortOption::Name => "name",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOption::Relevance => "Relevance",
            SortOption::Experience => "Experience",
            SortOption::Rating => "Rating",
            SortOption::DateRegistered => "Newest First",
            SortOption::Age => "Age",
            SortOption::Name => "Name",
        }
    }

    fn compare(self, a: &Worker, b: &Worker) -> Ordering {
        match self {
            SortOption::Relevance => Ordering::Equal,
            SortOption::Experience => b.years_experience.cmp(&a.years_experience),
            SortOption::Rating => b.rating.total_cmp(&a.rating),
            // ISO timestamps order lexically; unknown dates go last
            SortOption::DateRegistered => match (&a.date_registered, &b.date_registered) {
                (Some(x), Some(y)) => y.cmp(x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortOption::Age => a.age.cmp(&b.age),
            SortOption::Name => a.full_name.to_lowercase().cmp(&b.full_name.to_lowercase()),
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOption::ALL
            .into_iter()
            .find(|o| o.value() == s)
            .ok_or_else(|| format!("Unknown sort option `{}`", s))
    }
}

/// How a sort selection affects the displayed list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    /// Record the selection only; the list keeps server order.
    #[default]
    PassThrough,
    /// Stable client-side sort on the selected field.
    LocalStable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    current_page: usize,
    page_size: usize,
    sort: SortOption,
    strategy: SortStrategy,
}

impl Default for ResultsView {
    fn default() -> Self {
        Self::new(PAGE_SIZE, SortStrategy::default())
    }
}

impl ResultsView {
    pub fn new(page_size: usize, strategy: SortStrategy) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            sort: SortOption::default(),
            strategy,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn sort(&self) -> SortOption {
        self.sort
    }

    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// Index range of the current page within a list of `total` items.
    pub fn page_range(&self, total: usize) -> Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    pub fn page_items<'a>(&self, workers: &'a [Worker]) -> &'a [Worker] {
        &workers[self.page_range(workers.len())]
    }

    pub fn page_numbers(&self, total: usize) -> RangeInclusive<usize> {
        1..=self.total_pages(total)
    }

    pub fn go_to(&mut self, page: usize, total: usize) {
        let last = self.total_pages(total).max(1);
        self.current_page = page.clamp(1, last);
    }

    pub fn next(&mut self, total: usize) {
        self.go_to(self.current_page + 1, total);
    }

    pub fn previous(&mut self, total: usize) {
        self.go_to(self.current_page.saturating_sub(1), total);
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.current_page < self.total_pages(total)
    }

    /// A fresh result list always starts on page one.
    pub fn on_new_results(&mut self) {
        self.current_page = 1;
    }

    pub fn select_sort(&mut self, sort: SortOption) {
        self.sort = sort;
    }

    /// The list as it should be displayed under the current sort selection.
    pub fn arrange(&self, workers: &ResultList) -> ResultList {
        match (self.strategy, self.sort) {
            (SortStrategy::PassThrough, _) | (_, SortOption::Relevance) => Rc::clone(workers),
            (SortStrategy::LocalStable, sort) => {
                let mut sorted = workers.as_ref().clone();
                sorted.sort_by(|a, b| sort.compare(a, b));
                Rc::new(sorted)
            }
        }
    }

    pub fn showing(&self, total: usize) -> String {
        let shown = self.page_range(total).len();
        format!("Showing {} of {} workers", shown, total)
    }
}

/// `"orthodox_christian"` -> `"Orthodox Christian"`.
pub fn title_case(raw: &str) -> String {
    raw.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// First few badge labels plus how many were left out.
pub fn badges<'a, I>(items: I) -> (Vec<&'a str>, usize)
where
    I: IntoIterator<Item = &'a str>,
{
    let all: Vec<&str> = items.into_iter().collect();
    let hidden = all.len().saturating_sub(BADGE_LIMIT);
    (all.into_iter().take(BADGE_LIMIT).collect(), hidden)
}

pub fn format_rating(rating: f64) -> String {
    format!("{:.1}", rating)
}

/// Chip text for a recent search.
pub fn history_label(key: &QueryKey) -> String {
    if key.is_all_workers() {
        "All workers".to_string()
    } else {
        key.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(id: u64, name: &str, years: u32, rating: f64, age: u32, date: Option<&str>) -> Worker {
        Worker {
            id,
            full_name: name.to_string(),
            years_experience: years,
            rating,
            age,
            date_registered: date.map(str::to_string),
            ..Worker::default()
        }
    }

    fn many(n: u64) -> Vec<Worker> {
        (1..=n)
            .map(|i| worker(i, &format!("Worker {}", i), 0, 0.0, 20, None))
            .collect()
    }

    fn sample() -> ResultList {
        Rc::new(vec![
            worker(1, "selam", 3, 4.2, 30, Some("2024-03-01T10:00:00Z")),
            worker(2, "Abeba", 7, 4.8, 25, None),
            worker(3, "Meron", 7, 3.9, 41, Some("2025-01-15T08:30:00Z")),
        ])
    }

    fn ids(list: &[Worker]) -> Vec<u64> {
        list.iter().map(|w| w.id).collect()
    }

    #[test]
    fn paginates_locally() {
        let workers = many(23);
        let mut view = ResultsView::default();
        assert_eq!(view.total_pages(workers.len()), 3);
        assert_eq!(view.page_items(&workers).len(), 10);

        view.go_to(3, workers.len());
        assert_eq!(ids(view.page_items(&workers)), vec![21, 22, 23]);
        assert_eq!(view.showing(workers.len()), "Showing 3 of 23 workers");
        assert!(!view.has_next(workers.len()));
    }

    #[test]
    fn page_changes_are_clamped() {
        let workers = many(12);
        let mut view = ResultsView::default();
        view.go_to(9, workers.len());
        assert_eq!(view.current_page(), 2);
        view.next(workers.len());
        assert_eq!(view.current_page(), 2);
        view.previous(workers.len());
        view.previous(workers.len());
        assert_eq!(view.current_page(), 1);
        assert!(!view.has_previous());
    }

    #[test]
    fn empty_list_has_no_pages() {
        let view = ResultsView::default();
        assert_eq!(view.total_pages(0), 0);
        assert!(view.page_items(&[]).is_empty());
        assert!(view.page_numbers(0).is_empty());
        assert_eq!(view.showing(0), "Showing 0 of 0 workers");
    }

    #[test]
    fn new_results_reset_page() {
        let workers = many(30);
        let mut view = ResultsView::default();
        view.go_to(3, workers.len());
        view.on_new_results();
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn pass_through_keeps_server_order() {
        let list = sample();
        let mut view = ResultsView::default();
        view.select_sort(SortOption::Name);
        assert_eq!(view.sort(), SortOption::Name);
        let arranged = view.arrange(&list);
        assert!(Rc::ptr_eq(&arranged, &list));
    }

    #[test]
    fn local_sort_orders_by_field() {
        let list = sample();
        let mut view = ResultsView::new(10, SortStrategy::LocalStable);

        view.select_sort(SortOption::Experience);
        assert_eq!(ids(&view.arrange(&list)), vec![2, 3, 1]);
        view.select_sort(SortOption::Rating);
        assert_eq!(ids(&view.arrange(&list)), vec![2, 1, 3]);
        view.select_sort(SortOption::DateRegistered);
        assert_eq!(ids(&view.arrange(&list)), vec![3, 1, 2]);
        view.select_sort(SortOption::Age);
        assert_eq!(ids(&view.arrange(&list)), vec![2, 1, 3]);
        view.select_sort(SortOption::Name);
        assert_eq!(ids(&view.arrange(&list)), vec![2, 3, 1]);
        view.select_sort(SortOption::Relevance);
        assert_eq!(ids(&view.arrange(&list)), vec![1, 2, 3]);
    }

    #[test]
    fn sort_options_round_trip_through_form_values() {
        for option in SortOption::ALL {
            assert_eq!(option.value().parse::<SortOption>(), Ok(option));
        }
        assert_eq!(SortOption::DateRegistered.label(), "Newest First");
        assert!("price".parse::<SortOption>().is_err());
    }

    #[test]
    fn card_formatting() {
        assert_eq!(title_case("orthodox_christian"), "Orthodox Christian");
        assert_eq!(title_case("full_time"), "Full Time");
        assert_eq!(format_rating(4.26), "4.3");
        assert_eq!(format_rating(0.0), "0.0");

        let skills = ["Cooking", "Cleaning", "Childcare", "Laundry", "Ironing"];
        let (shown, hidden) = badges(skills.iter().copied());
        assert_eq!(shown, vec!["Cooking", "Cleaning", "Childcare"]);
        assert_eq!(hidden, 2);
    }

    #[test]
    fn history_chip_labels() {
        assert_eq!(history_label(&QueryKey::all_workers()), "All workers");
        assert_eq!(
            history_label(&QueryKey::from("religion=muslim")),
            "religion=muslim"
        );
    }
}
