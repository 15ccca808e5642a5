use crate::{
    CalculationStatus, CalculationSummary, ContactRow, JobHandle, PageCursor, SearchStatus,
    Selection, StatusFilter,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub search: SearchViewModel,
    pub calculation: CalculationViewModel,
    /// Last failure shown to the user, cleared by the next submit.
    pub notice: Option<String>,
    pub disposed: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchViewModel {
    pub list_id: Option<String>,
    pub term: String,
    pub filter: StatusFilter,
    pub cursor: Option<PageCursor>,
    pub status: SearchStatus,
    pub job_handle: Option<JobHandle>,
    pub rows: Vec<ContactRow>,
    pub total: u64,
    pub fields: Vec<String>,
    pub first_key: Option<String>,
    pub last_key: Option<String>,
    pub selection: Selection,
}

impl SearchViewModel {
    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Searching
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CalculationViewModel {
    pub broadcast_id: Option<String>,
    pub status: CalculationStatus,
    pub job_handle: Option<JobHandle>,
    pub summary: Option<CalculationSummary>,
}
