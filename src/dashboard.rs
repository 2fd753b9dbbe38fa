//! State behind the four dashboard views: the augmented table, the
//! government-type filter and the per-view tables derived from it.

use crate::chart_data::{bar_series, budget_pairs, scatter_groups, BudgetPair, ScatterGroup};
use crate::pipeline::{augment, Augmented, PipelineOptions};
use crate::roles::Role;
use crate::source::DataSource;
use crate::table::Table;
use crate::view::{self, ALL_FILTER};

pub struct Dashboard {
    source: DataSource,
    augmented: Augmented,
    filter_options: Vec<String>,
    filter_index: usize,
    view: Table,
    entity_cursor: usize,
    picked: Vec<String>,
}

impl Dashboard {
    pub fn new(source: DataSource, raw: &Table, options: &PipelineOptions) -> Self {
        let augmented = augment(raw, options);
        let filter_options =
            view::filter_options(&augmented.table, augmented.column(Role::GovernmentType));
        let view = augmented.table.clone();
        Self {
            source,
            augmented,
            filter_options,
            filter_index: 0,
            view,
            entity_cursor: 0,
            picked: Vec::new(),
        }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn augmented(&self) -> &Augmented {
        &self.augmented
    }

    /// Augmented rows after the government-type filter.
    pub fn view(&self) -> &Table {
        &self.view
    }

    pub fn filter_enabled(&self) -> bool {
        self.augmented.roles.is_resolved(Role::GovernmentType)
    }

    pub fn filter_options(&self) -> &[String] {
        &self.filter_options
    }

    pub fn selected_filter(&self) -> &str {
        self.filter_options
            .get(self.filter_index)
            .map(String::as_str)
            .unwrap_or(ALL_FILTER)
    }

    /// Select a filter value by name. Returns false when it is not one of the options.
    pub fn select_filter(&mut self, value: &str) -> bool {
        match self.filter_options.iter().position(|o| o == value) {
            Some(index) => {
                self.filter_index = index;
                self.refilter();
                true
            }
            None => false,
        }
    }

    pub fn cycle_filter(&mut self, forward: bool) {
        if !self.filter_enabled() || self.filter_options.is_empty() {
            return;
        }
        let len = self.filter_options.len();
        self.filter_index = if forward {
            (self.filter_index + 1) % len
        } else {
            (self.filter_index + len - 1) % len
        };
        self.refilter();
    }

    fn refilter(&mut self) {
        let selection = self.selected_filter().to_string();
        self.view = view::apply_filter(
            &self.augmented.table,
            self.augmented.column(Role::GovernmentType),
            Some(&selection),
        );
        let names = self.entity_names();
        self.picked.retain(|name| names.contains(name));
        self.entity_cursor = 0;
    }

    /// Title naming the ranking metric.
    pub fn ranking_title(&self) -> String {
        view::ranking_metric(&self.augmented)
            .map(|(_, column)| view::to_title(column))
            .unwrap_or_else(|| "Métrica".to_string())
    }

    /// Top `n` rows by the ranking metric as (label, value) bars.
    pub fn ranking_series(&self, n: usize) -> Vec<(String, f64)> {
        let (Some((_, metric)), Some(label)) = (
            view::ranking_metric(&self.augmented),
            view::label_column(&self.augmented),
        ) else {
            return Vec::new();
        };
        let top = view::ranking(&self.augmented, &self.view, n);
        bar_series(&top, &label, metric)
    }

    fn all_budget_pairs(&self) -> Option<Vec<BudgetPair>> {
        let initial = self.augmented.column(Role::InitialBudget)?;
        let modified = self.augmented.column(Role::ModifiedBudget)?;
        let label = view::label_column(&self.augmented)?;
        Some(budget_pairs(&self.view, &label, initial, modified, usize::MAX))
    }

    /// PIA/PIM pairs for the picked entities, or the first `limit` when none
    /// are picked. None when either budget column is missing.
    pub fn budget_pairs(&self, limit: usize) -> Option<Vec<BudgetPair>> {
        let pairs = self.all_budget_pairs()?;
        if self.picked.is_empty() {
            return Some(pairs.into_iter().take(limit).collect());
        }
        Some(
            pairs
                .into_iter()
                .filter(|p| self.picked.contains(&p.label))
                .collect(),
        )
    }

    /// Entities in the view that have a PIA or PIM amount.
    pub fn entity_names(&self) -> Vec<String> {
        self.all_budget_pairs()
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.label)
            .collect()
    }

    pub fn entity_cursor(&self) -> Option<String> {
        self.entity_names().into_iter().nth(self.entity_cursor)
    }

    pub fn move_entity_cursor(&mut self, forward: bool) {
        let len = self.entity_names().len();
        if len == 0 {
            return;
        }
        self.entity_cursor = if forward {
            (self.entity_cursor + 1) % len
        } else {
            (self.entity_cursor + len - 1) % len
        };
    }

    /// Pick or unpick the entity under the cursor. Picking fails once `limit`
    /// entities are picked.
    pub fn toggle_entity(&mut self, limit: usize) -> bool {
        let Some(name) = self.entity_cursor() else {
            return false;
        };
        if let Some(index) = self.picked.iter().position(|p| *p == name) {
            self.picked.remove(index);
            return true;
        }
        if self.picked.len() >= limit {
            return false;
        }
        self.picked.push(name);
        true
    }

    pub fn picked_entities(&self) -> &[String] {
        &self.picked
    }

    pub fn clear_picked(&mut self) {
        self.picked.clear();
    }

    /// Entity, PIA, PIM, growth and per-capita columns, when both budgets are present.
    pub fn comparison_table(&self, row_limit: usize) -> Option<Table> {
        let columns = view::comparison_columns(&self.augmented);
        if columns.is_empty() {
            return None;
        }
        let names: Vec<&str> = columns.iter().map(String::as_str).collect();
        Some(self.view.select(&names).head(row_limit))
    }

    /// (PIM, execution %) points per government type, when both columns are present.
    pub fn efficiency_groups(&self) -> Option<Vec<ScatterGroup>> {
        let modified = self.augmented.column(Role::ModifiedBudget)?;
        let percent = self.augmented.column(Role::ExecutionPercent)?;
        let group = self.augmented.column(Role::GovernmentType);
        Some(scatter_groups(&self.view, modified, percent, group))
    }

    pub fn exploratory_table(&self, row_limit: usize) -> Table {
        view::exploratory(&self.augmented, &self.view, row_limit)
    }

    /// Number of recognized roles out of all known roles.
    pub fn recognized(&self) -> (usize, usize) {
        (self.augmented.roles.iter().count(), Role::ALL.len())
    }
}
