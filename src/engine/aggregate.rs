use crate::model::{
    BreakdownRow, BreakdownTable, FilterSelection, InventoryDataset, InventoryRecord, Target,
    EMPTY,
};
use std::collections::HashMap;

/// Computes the per-class share of each declared category of `target`.
///
/// Rows are filtered by `selection`, grouped by system class in first-seen
/// order and split by the target category. Every row carries exactly the
/// `categories` columns, with zero for categories the class never shows.
/// The blank class, when present, comes first. No matching records yields
/// an empty table that still carries the declared columns.
#[must_use]
pub fn aggregate<S: AsRef<str>>(
    dataset: &InventoryDataset,
    target: Target,
    categories: &[S],
    selection: &FilterSelection,
) -> BreakdownTable {
    let categories: Vec<String> = categories.iter().map(|c| c.as_ref().to_string()).collect();
    // a repeated category name keeps its first column; later copies stay zero
    let mut column: HashMap<&str, usize> = HashMap::new();
    for (i, c) in categories.iter().enumerate() {
        column.entry(c.as_str()).or_insert(i);
    }

    let mut class_index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for record in dataset.records().iter().filter(|r| selection.matches(r)) {
        let slot = *class_index
            .entry(record.system_class.as_str())
            .or_insert_with(|| {
                groups.push(Group::new(record, categories.len()));
                groups.len() - 1
            });
        groups[slot].add(column.get(target.category_of(record)).copied());
    }

    if let Some(blank) = groups.iter().position(|g| g.class == EMPTY) {
        let group = groups.remove(blank);
        groups.insert(0, group);
    }

    BreakdownTable {
        rows: groups.into_iter().map(Group::into_row).collect(),
        categories,
    }
}

struct Group {
    class: String,
    counts: Vec<usize>,
    total: usize,
}

impl Group {
    fn new(record: &InventoryRecord, width: usize) -> Self {
        Self {
            class: record.system_class.clone(),
            counts: vec![0; width],
            total: 0,
        }
    }

    // categories outside the declared list still count toward the total
    fn add(&mut self, column: Option<usize>) {
        self.total += 1;
        if let Some(i) = column {
            self.counts[i] += 1;
        }
    }

    fn into_row(self) -> BreakdownRow {
        let total = self.total as f64;
        BreakdownRow {
            shares: self.counts.iter().map(|&c| c as f64 / total).collect(),
            class: self.class,
            count: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FilterAxis, Presence, RegistryPresence};
    use pretty_assertions::assert_eq;

    fn record(class: &str, os: Presence) -> InventoryRecord {
        let mut r = InventoryRecord::new(class);
        r.os = os;
        r
    }

    fn dataset(records: Vec<InventoryRecord>) -> InventoryDataset {
        InventoryDataset::new("test", records)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn shares_per_class_with_backfilled_zeros() {
        let data = dataset(vec![
            record("A", Presence::Yes),
            record("A", Presence::Yes),
            record("A", Presence::No),
            record("B", Presence::Empty),
            record("B", Presence::InDevelopment),
        ]);
        let table = aggregate(
            &data,
            Target::Os,
            &Target::Os.categories(),
            &FilterSelection::unconstrained(),
        );

        assert_eq!(table.categories, Target::Os.categories());
        assert_eq!(table.rows.len(), 2);

        let a = table.row("A").unwrap();
        assert_eq!(a.count, 3);
        assert_close(table.share("A", "Yes").unwrap(), 2.0 / 3.0);
        assert_close(table.share("A", "No").unwrap(), 1.0 / 3.0);
        assert_close(table.share("A", "Not used").unwrap(), 0.0);

        let b = table.row("B").unwrap();
        assert_eq!(b.count, 2);
        assert_close(table.share("B", "In development").unwrap(), 0.5);
        assert_close(table.share("B", EMPTY).unwrap(), 0.5);
        assert_close(table.share("B", "Yes").unwrap(), 0.0);
    }

    #[test]
    fn rows_sum_to_one() {
        let data = dataset(vec![
            record("A", Presence::Yes),
            record("A", Presence::NotUsed),
            record("A", Presence::No),
            record("C", Presence::Empty),
        ]);
        let table = aggregate(
            &data,
            Target::Os,
            &Target::Os.categories(),
            &FilterSelection::unconstrained(),
        );
        for row in &table.rows {
            assert_close(row.shares.iter().sum(), 1.0);
        }
    }

    #[test]
    fn column_order_follows_declaration() {
        let data = dataset(vec![record("A", Presence::Yes)]);
        let declared = ["Yes", EMPTY, "No", "Not used", "In development"];
        let table = aggregate(&data, Target::Os, &declared, &FilterSelection::unconstrained());

        assert_eq!(table.categories, declared);
        assert_eq!(table.rows[0].shares, vec![1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn repeated_category_fills_its_first_column() {
        let data = dataset(vec![record("A", Presence::Yes)]);
        let table = aggregate(&data, Target::Os, &["Yes", "Yes"], &FilterSelection::unconstrained());

        assert_eq!(table.categories, vec!["Yes", "Yes"]);
        assert_eq!(table.rows[0].shares, vec![1.0, 0.0]);
        assert_close(table.share("A", "Yes").unwrap(), 1.0);
    }

    #[test]
    fn blank_class_first_then_first_seen_order() {
        let data = dataset(vec![
            record("Zeta", Presence::Yes),
            record("Alpha", Presence::Yes),
            record(EMPTY, Presence::Yes),
            record("Zeta", Presence::No),
            record("Mid", Presence::No),
        ]);
        let table = aggregate(
            &data,
            Target::Os,
            &Target::Os.categories(),
            &FilterSelection::unconstrained(),
        );
        let classes: Vec<&str> = table.rows.iter().map(|r| r.class.as_str()).collect();
        assert_eq!(classes, vec![EMPTY, "Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn no_matching_records_gives_empty_table_with_columns() {
        let mut r = record("A", Presence::Yes);
        r.stage = "Pilot".to_string();
        let data = dataset(vec![r]);
        let selection = FilterSelection::unconstrained().with(FilterAxis::Stage, ["Production"]);

        let table = aggregate(&data, Target::Os, &Target::Os.categories(), &selection);

        assert!(table.is_empty());
        assert_eq!(table.categories, Target::Os.categories());
    }

    #[test]
    fn count_reflects_row_filter() {
        let mut records = vec![
            record("A", Presence::Yes),
            record("A", Presence::No),
            record("B", Presence::No),
        ];
        records[1].status = "legacy".to_string();
        let data = dataset(records);
        let selection =
            FilterSelection::unconstrained().with(FilterAxis::Status, [EMPTY.to_string()]);

        let table = aggregate(&data, Target::Os, &Target::Os.categories(), &selection);

        assert_eq!(table.row("A").unwrap().count, 1);
        assert_close(table.share("A", "Yes").unwrap(), 1.0);
        assert_eq!(table.row("B").unwrap().count, 1);
    }

    #[test]
    fn registry_uses_its_own_categories() {
        let mut present = InventoryRecord::new("A");
        present.registry = RegistryPresence::Present;
        let mut absent = InventoryRecord::new("A");
        absent.registry = RegistryPresence::Absent;
        let data = dataset(vec![present, absent, InventoryRecord::new("A")]);

        let table = aggregate(
            &data,
            Target::Registry,
            &Target::Registry.categories(),
            &FilterSelection::unconstrained(),
        );

        assert_eq!(
            table.categories,
            vec!["Not in registry", "In registry", EMPTY]
        );
        for share in &table.rows[0].shares {
            assert_close(*share, 1.0 / 3.0);
        }
    }
}
