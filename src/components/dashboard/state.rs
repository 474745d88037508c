use super::filter::{filter, FilterCriteria};
use super::pagination::{total_pages, PageState};
use crate::components::google_calendar::CalendarEvent;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Color scheme of the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Where the last retrieval stands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RetrievalStatus {
    /// Nothing fetched yet in this session
    #[default]
    Idle,
    Loading,
    Loaded { at: DateTime<Utc>, count: usize },
    Failed { message: String },
}

/// Every state transition the dashboard knows about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    /// A retrieval was started; bumps the generation
    RetrievalStarted,
    EventsLoaded {
        generation: u64,
        events: Vec<CalendarEvent>,
        at: DateTime<Utc>,
    },
    RetrievalFailed {
        generation: u64,
        message: String,
    },
    /// Replace both filter criteria in one transition
    SetFilter(FilterCriteria),
    SetTitleQuery(String),
    SetMinDate(Option<NaiveDate>),
    ClearFilters,
    NextPage,
    PrevPage,
    GoToPage(usize),
    SelectEvent(String),
    CloseDetail,
    ToggleTheme,
    /// Back to a blank dashboard, e.g. on logout. In-flight results are discarded.
    Reset,
}

/// State of one dashboard tab.
///
/// Only `apply` changes it; everything shown is derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    /// Timezone that event dates are shown and filtered in
    timezone: Tz,
    events: Vec<CalendarEvent>,
    criteria: FilterCriteria,
    page: PageState,
    selected: Option<String>,
    theme: Theme,
    retrieval: RetrievalStatus,
    generation: u64,
}

/// The slice of the filtered set on the current page
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub items: Vec<&'a CalendarEvent>,
    pub current_page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
    pub total_count: usize,
}

impl PageView<'_> {
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl DashboardState {
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            events: Vec::new(),
            criteria: FilterCriteria::default(),
            page: PageState::default(),
            selected: None,
            theme: Theme::default(),
            retrieval: RetrievalStatus::default(),
            generation: 0,
        }
    }

    /// Apply one action and return the next state
    pub fn apply(mut self, action: DashboardAction) -> Self {
        match action {
            DashboardAction::RetrievalStarted => {
                self.generation += 1;
                self.retrieval = RetrievalStatus::Loading;
            }
            DashboardAction::EventsLoaded { generation, events, at } => {
                if generation != self.generation {
                    debug!(
                        "Discarding events from retrieval {} (current {})",
                        generation, self.generation
                    );
                    return self;
                }
                self.retrieval = RetrievalStatus::Loaded {
                    at,
                    count: events.len(),
                };
                self.events = events;
            }
            DashboardAction::RetrievalFailed { generation, message } => {
                if generation != self.generation {
                    debug!(
                        "Discarding failure from retrieval {} (current {})",
                        generation, self.generation
                    );
                    return self;
                }
                // Keep showing whatever was loaded before
                self.retrieval = RetrievalStatus::Failed { message };
            }
            DashboardAction::SetFilter(criteria) => self.criteria = criteria,
            DashboardAction::SetTitleQuery(query) => self.criteria.title_query = query,
            DashboardAction::SetMinDate(date) => self.criteria.min_date = date,
            DashboardAction::ClearFilters => self.criteria = FilterCriteria::default(),
            DashboardAction::NextPage => {
                self.page = self.page.next(self.filtered_count());
            }
            DashboardAction::PrevPage => {
                self.page = self.page.prev(self.filtered_count());
            }
            DashboardAction::GoToPage(page) => {
                self.page = self.page.go_to(page, self.filtered_count());
            }
            DashboardAction::SelectEvent(id) => {
                if self.filtered().iter().any(|event| event.id == id) {
                    self.selected = Some(id);
                } else {
                    debug!("Ignoring selection of event '{}' outside the filtered set", id);
                }
            }
            DashboardAction::CloseDetail => self.selected = None,
            DashboardAction::ToggleTheme => self.theme = self.theme.toggled(),
            DashboardAction::Reset => {
                return Self {
                    generation: self.generation + 1,
                    ..Self::new(self.timezone)
                };
            }
        }

        self.settle()
    }

    /// Restore invariants that depend on the filtered set
    fn settle(mut self) -> Self {
        let filtered = filter(&self.events, &self.criteria, &self.timezone);
        let count = filtered.len();

        let selection_visible = self
            .selected
            .as_ref()
            .is_some_and(|id| filtered.iter().any(|event| &event.id == id));

        if !selection_visible {
            self.selected = None;
        }
        self.page = self.page.clamp(count);
        self
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn timezone(&self) -> &Tz {
        &self.timezone
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn current_page(&self) -> usize {
        self.page.current()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn retrieval(&self) -> &RetrievalStatus {
        &self.retrieval
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The filtered set, most recent first
    pub fn filtered(&self) -> Vec<&CalendarEvent> {
        filter(&self.events, &self.criteria, &self.timezone)
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered().len()
    }

    pub fn page_view(&self) -> PageView<'_> {
        let filtered = self.filtered();
        let items = self.page.slice(&filtered).to_vec();
        PageView {
            items,
            current_page: self.page.current(),
            total_pages: total_pages(filtered.len()),
            filtered_count: filtered.len(),
            total_count: self.events.len(),
        }
    }

    pub fn selected_event(&self) -> Option<&CalendarEvent> {
        let id = self.selected.as_ref()?;
        self.events.iter().find(|event| &event.id == id)
    }
}
