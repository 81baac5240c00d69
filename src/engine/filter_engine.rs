use super::aggregate::aggregate;
use crate::model::{BreakdownTable, FilterAxis, FilterSelection, InventoryDataset, Target, EMPTY};
use std::collections::{BTreeSet, HashMap};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::debug;

/// "Recompute now" notice sent to every subscriber when derived tables go
/// stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recompute;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No dataset; every breakdown is empty.
    Empty,
    Loaded,
}

/// Owns the loaded dataset and the four filter selections.
///
/// Notifications are delivered synchronously on the caller's thread, one per
/// change, in order.
#[derive(Debug, Default)]
pub struct FilterEngine {
    dataset: Option<InventoryDataset>,
    selection: FilterSelection,
    options: HashMap<FilterAxis, Vec<String>>,
    subscribers: Vec<Sender<Recompute>>,
}

impl FilterEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        if self.dataset.is_some() {
            EngineState::Loaded
        } else {
            EngineState::Empty
        }
    }

    #[must_use]
    pub fn dataset(&self) -> Option<&InventoryDataset> {
        self.dataset.as_ref()
    }

    /// Registers a render sink.
    pub fn subscribe(&mut self) -> Receiver<Recompute> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Installs a new dataset, or drops back to `Empty` for `None` or an
    /// empty dataset. Every axis is reset to all values present.
    pub fn set_dataset(&mut self, dataset: Option<InventoryDataset>) {
        self.dataset = dataset.filter(|d| !d.is_empty());
        self.selection = FilterSelection::unconstrained();
        self.options.clear();

        if let Some(dataset) = &self.dataset {
            for axis in FilterAxis::ALL {
                let mut values = dataset.distinct(axis);
                if let Some(blank) = values.iter().position(|v| v == EMPTY) {
                    let value = values.remove(blank);
                    values.push(value);
                }
                self.selection
                    .set(axis, Some(values.iter().cloned().collect()));
                self.options.insert(axis, values);
            }
        }

        debug!(state = ?self.state(), "dataset replaced");
        self.notify();
    }

    /// Values offered on `axis`, blank last.
    #[must_use]
    pub fn options(&self, axis: FilterAxis) -> &[String] {
        self.options.get(&axis).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replaces the selection of one axis.
    pub fn update_filter<I, S>(&mut self, axis: FilterAxis, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        debug!(?axis, selected = values.len(), "filter updated");
        self.selection.set(axis, Some(values));
        self.notify();
    }

    /// Flips a single value on `axis`.
    pub fn toggle(&mut self, axis: FilterAxis, value: &str) {
        let mut values = self.selected_values(axis);
        if !values.remove(value) {
            values.insert(value.to_string());
        }
        self.update_filter(axis, values);
    }

    /// Selects every option on `axis`.
    pub fn select_all(&mut self, axis: FilterAxis) {
        let values = self.options(axis).to_vec();
        self.update_filter(axis, values);
    }

    #[must_use]
    pub fn is_selected(&self, axis: FilterAxis, value: &str) -> bool {
        match self.selection.axis(axis) {
            Some(selected) => selected.contains(value),
            None => true,
        }
    }

    /// Snapshot of the current selection.
    #[must_use]
    pub fn current_selection(&self) -> FilterSelection {
        self.selection.clone()
    }

    /// Breakdown over the target's default categories.
    #[must_use]
    pub fn breakdown(&self, target: Target) -> BreakdownTable {
        self.breakdown_with(target, &target.categories())
    }

    #[must_use]
    pub fn breakdown_with<S: AsRef<str>>(
        &self,
        target: Target,
        categories: &[S],
    ) -> BreakdownTable {
        let table = match &self.dataset {
            Some(dataset) => aggregate(dataset, target, categories, &self.selection),
            None => {
                let columns = categories.iter().map(|c| c.as_ref().to_string()).collect();
                BreakdownTable::empty(columns)
            }
        };
        debug!(?target, classes = table.rows.len(), "breakdown recomputed");
        table
    }

    /// Records passing the current selection.
    #[must_use]
    pub fn matching_records(&self) -> usize {
        self.dataset.as_ref().map_or(0, |d| {
            d.records()
                .iter()
                .filter(|r| self.selection.matches(r))
                .count()
        })
    }

    fn selected_values(&self, axis: FilterAxis) -> BTreeSet<String> {
        match self.selection.axis(axis) {
            Some(selected) => selected.clone(),
            None => self.options(axis).iter().cloned().collect(),
        }
    }

    fn notify(&mut self) {
        self.subscribers.retain(|tx| tx.send(Recompute).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InventoryRecord, Presence};
    use pretty_assertions::assert_eq;

    fn record(class: &str, stage: &str, os: Presence) -> InventoryRecord {
        let mut r = InventoryRecord::new(class);
        r.stage = stage.to_string();
        r.os = os;
        r
    }

    fn loaded() -> FilterEngine {
        let mut engine = FilterEngine::new();
        engine.set_dataset(Some(InventoryDataset::new(
            "test",
            vec![
                record("A", EMPTY, Presence::Yes),
                record("A", "Production", Presence::No),
                record("B", "Pilot", Presence::Yes),
            ],
        )));
        engine
    }

    #[test]
    fn starts_empty_with_empty_breakdowns() {
        let engine = FilterEngine::new();
        assert_eq!(engine.state(), EngineState::Empty);

        let table = engine.breakdown(Target::Dbms);
        assert!(table.is_empty());
        assert_eq!(table.categories, Target::Dbms.categories());
        assert_eq!(engine.matching_records(), 0);
    }

    #[test]
    fn custom_columns_follow_the_selection() {
        let mut engine = FilterEngine::new();
        let empty = engine.breakdown_with(Target::Os, &["Yes"]);
        assert!(empty.is_empty());
        assert_eq!(empty.categories, &["Yes"]);

        engine = loaded();
        engine.update_filter(FilterAxis::Stage, ["Production"]);
        let table = engine.breakdown_with(Target::Os, &["No", "Yes"]);
        assert_eq!(table.categories, &["No", "Yes"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.share("A", "No"), Some(1.0));
    }

    #[test]
    fn load_resets_axes_with_blank_last() {
        let engine = loaded();
        assert_eq!(engine.state(), EngineState::Loaded);
        assert_eq!(engine.options(FilterAxis::Stage), &["Production", "Pilot", EMPTY]);
        assert_eq!(engine.options(FilterAxis::Status), &[EMPTY]);
        assert_eq!(engine.matching_records(), 3);
        assert!(engine.is_selected(FilterAxis::Stage, EMPTY));
    }

    #[test]
    fn empty_or_absent_dataset_returns_to_empty() {
        let mut engine = loaded();
        engine.set_dataset(Some(InventoryDataset::new("empty", Vec::new())));
        assert_eq!(engine.state(), EngineState::Empty);

        let mut engine = loaded();
        engine.set_dataset(None);
        assert_eq!(engine.state(), EngineState::Empty);
        assert!(engine.options(FilterAxis::Stage).is_empty());
    }

    #[test]
    fn update_touches_only_one_axis() {
        let mut engine = loaded();
        let before = engine.current_selection();

        engine.update_filter(FilterAxis::Stage, ["Pilot"]);
        let after = engine.current_selection();

        assert_eq!(after.axis(FilterAxis::Status), before.axis(FilterAxis::Status));
        assert_eq!(
            after.axis(FilterAxis::Stage).unwrap().iter().collect::<Vec<_>>(),
            vec!["Pilot"]
        );
        assert_eq!(engine.matching_records(), 1);
        assert!(engine.breakdown(Target::Os).row("A").is_none());
    }

    #[test]
    fn snapshot_is_detached() {
        let mut engine = loaded();
        let snapshot = engine.current_selection();
        engine.update_filter(FilterAxis::Stage, Vec::<String>::new());

        assert_eq!(snapshot.axis(FilterAxis::Stage).unwrap().len(), 3);
        assert_eq!(engine.matching_records(), 0);
        assert!(engine.breakdown(Target::Os).is_empty());
    }

    #[test]
    fn toggle_and_select_all() {
        let mut engine = loaded();
        engine.toggle(FilterAxis::Stage, "Pilot");
        assert!(!engine.is_selected(FilterAxis::Stage, "Pilot"));
        assert_eq!(engine.matching_records(), 2);

        engine.toggle(FilterAxis::Stage, "Pilot");
        assert_eq!(engine.matching_records(), 3);

        engine.update_filter(FilterAxis::Stage, Vec::<String>::new());
        engine.select_all(FilterAxis::Stage);
        assert_eq!(engine.matching_records(), 3);
    }

    #[test]
    fn every_change_notifies_each_subscriber_in_order() {
        let mut engine = FilterEngine::new();
        let first = engine.subscribe();
        let second = engine.subscribe();

        engine.set_dataset(Some(InventoryDataset::new(
            "test",
            vec![record("A", "Pilot", Presence::Yes)],
        )));
        engine.update_filter(FilterAxis::Stage, ["Pilot"]);
        engine.update_filter(FilterAxis::Stage, ["Pilot"]);

        assert_eq!(first.try_iter().count(), 3);
        assert_eq!(second.try_iter().count(), 3);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut engine = FilterEngine::new();
        let kept = engine.subscribe();
        drop(engine.subscribe());

        engine.set_dataset(None);
        assert_eq!(engine.subscribers.len(), 1);
        assert_eq!(kept.try_recv(), Ok(Recompute));
    }
}
