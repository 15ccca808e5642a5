use std::collections::BTreeSet;

use crate::view_model::{AppViewModel, CalculationViewModel, SearchViewModel};
use crate::{
    ActiveJob, CalculationSummary, ContactRow, InstanceId, JobHandle, SearchPayload, SearchQuery,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Searching,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalculationStatus {
    #[default]
    Idle,
    Calculating,
    Ready,
}

/// Checked rows. `all` means "every row matching the current query".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub all: bool,
    pub keys: BTreeSet<String>,
}

impl Selection {
    pub fn clear(&mut self) {
        self.all = false;
        self.keys.clear();
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.keys.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct SearchView {
    pub(crate) list_id: Option<String>,
    pub(crate) query: SearchQuery,
    pub(crate) status: SearchStatus,
    pub(crate) job: ActiveJob,
    pub(crate) rows: Vec<ContactRow>,
    pub(crate) total: u64,
    pub(crate) fields: Vec<String>,
    pub(crate) selection: Selection,
}

impl SearchView {
    pub(crate) fn first_key(&self) -> Option<&str> {
        self.rows.first().map(|row| row.email.as_str())
    }

    pub(crate) fn last_key(&self) -> Option<&str> {
        self.rows.last().map(|row| row.email.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct CalculationView {
    pub(crate) broadcast_id: Option<String>,
    pub(crate) status: CalculationStatus,
    pub(crate) job: ActiveJob,
    pub(crate) summary: Option<CalculationSummary>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    last_instance: u64,
    pub(crate) search: SearchView,
    pub(crate) calculation: CalculationView,
    notice: Option<String>,
    disposed: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let search = &self.search;
        let calculation = &self.calculation;
        AppViewModel {
            search: SearchViewModel {
                list_id: search.list_id.clone(),
                term: search.query.term.clone(),
                filter: search.query.filter,
                cursor: search.query.cursor.clone(),
                status: search.status,
                job_handle: search.job.handle().cloned(),
                rows: search.rows.clone(),
                total: search.total,
                fields: search.fields.clone(),
                first_key: search.first_key().map(ToOwned::to_owned),
                last_key: search.last_key().map(ToOwned::to_owned),
                selection: search.selection.clone(),
            },
            calculation: CalculationViewModel {
                broadcast_id: calculation.broadcast_id.clone(),
                status: calculation.status,
                job_handle: calculation.job.handle().cloned(),
                summary: calculation.summary,
            },
            notice: self.notice.clone(),
            disposed: self.disposed,
            dirty: self.dirty,
        }
    }

    /// Returns whether state changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Instance currently allowed to write search results.
    pub fn active_search(&self) -> Option<InstanceId> {
        self.search.job.instance()
    }

    /// Instance currently allowed to write the calculation summary.
    pub fn active_calculation(&self) -> Option<InstanceId> {
        self.calculation.job.instance()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn issue_instance(&mut self) -> InstanceId {
        self.last_instance += 1;
        InstanceId::new(self.last_instance)
    }

    pub(crate) fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    /// Makes `instance` the search owner and returns the superseded instance.
    pub(crate) fn begin_search(&mut self, instance: InstanceId) -> Option<InstanceId> {
        let superseded = self.search.job.begin(instance);
        self.search.status = SearchStatus::Searching;
        self.search.selection.clear();
        self.notice = None;
        self.mark_dirty();
        superseded
    }

    pub(crate) fn begin_calculation(
        &mut self,
        instance: InstanceId,
        broadcast_id: String,
    ) -> Option<InstanceId> {
        let superseded = self.calculation.job.begin(instance);
        self.calculation.broadcast_id = Some(broadcast_id);
        self.calculation.status = CalculationStatus::Calculating;
        self.calculation.summary = None;
        self.notice = None;
        self.mark_dirty();
        superseded
    }

    /// Records a handle for whichever view `instance` owns. False if stale.
    pub(crate) fn accept_handle(&mut self, instance: InstanceId, handle: JobHandle) -> bool {
        let accepted = self.search.job.accept(instance, handle.clone())
            || self.calculation.job.accept(instance, handle);
        if accepted {
            self.mark_dirty();
        }
        accepted
    }

    /// Replaces the search results in one step. False if `instance` is stale.
    pub(crate) fn reconcile_search(&mut self, instance: InstanceId, payload: SearchPayload) -> bool {
        if !self.search.job.finish(instance) {
            return false;
        }
        let fields = payload.discovered_fields();
        let search = &mut self.search;
        search.rows = payload.rows;
        search.total = payload.total;
        search.fields = fields;
        search.selection.clear();
        search.status = SearchStatus::Ready;
        self.mark_dirty();
        true
    }

    pub(crate) fn reconcile_calculation(
        &mut self,
        instance: InstanceId,
        summary: CalculationSummary,
    ) -> bool {
        if !self.calculation.job.finish(instance) {
            return false;
        }
        self.calculation.summary = Some(summary);
        self.calculation.status = CalculationStatus::Ready;
        self.mark_dirty();
        true
    }

    /// Resets whichever view `instance` owns to an empty ready state.
    /// False if `instance` owns neither.
    pub(crate) fn fail_instance(&mut self, instance: InstanceId, message: &str) -> bool {
        if self.search.job.finish(instance) {
            let search = &mut self.search;
            search.rows.clear();
            search.total = 0;
            search.fields.clear();
            search.selection.clear();
            search.status = SearchStatus::Ready;
        } else if self.calculation.job.finish(instance) {
            self.calculation.summary = None;
            self.calculation.status = CalculationStatus::Ready;
        } else {
            return false;
        }
        self.notice = Some(message.to_owned());
        self.mark_dirty();
        true
    }

    /// Marks the view torn down and returns the instances it released.
    pub(crate) fn dispose(&mut self) -> Vec<InstanceId> {
        self.disposed = true;
        let released: Vec<InstanceId> = [self.search.job.clear(), self.calculation.job.clear()]
            .into_iter()
            .flatten()
            .collect();
        if self.search.status == SearchStatus::Searching {
            self.search.status = SearchStatus::Idle;
        }
        if self.calculation.status == CalculationStatus::Calculating {
            self.calculation.status = CalculationStatus::Idle;
        }
        self.mark_dirty();
        released
    }
}
