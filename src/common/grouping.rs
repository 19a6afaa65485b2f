//! Grouping of result rows by scenario and ordering of categorical axes

use crate::common::data_structures::ScenarioRecord;
use itertools::Itertools;

/// All rows belonging to one scenario, in file order
#[derive(Debug)]
pub struct ScenarioGroup<'a, R> {
    pub scenario: &'a str,
    pub rows: Vec<&'a R>,
}

impl<'a, R: ScenarioRecord> ScenarioGroup<'a, R> {
    /// Allocation identifiers in order of first appearance within this scenario
    pub fn allocations(&self) -> Vec<&'a str> {
        self.rows.iter().map(|row| row.allocation()).unique().collect()
    }

    /// Rows of a single allocation, in file order
    pub fn rows_for<'s>(&'s self, allocation: &'s str) -> impl Iterator<Item = &'a R> + 's {
        self.rows
            .iter()
            .copied()
            .filter(move |row| row.allocation() == allocation)
    }
}

/// Splits records into one group per distinct scenario
///
/// Groups are returned in order of first appearance of their scenario.
pub fn group_by_scenario<R: ScenarioRecord>(records: &[R]) -> Vec<ScenarioGroup<'_, R>> {
    records
        .iter()
        .map(|record| record.scenario())
        .unique()
        .map(|scenario| ScenarioGroup {
            scenario,
            rows: records
                .iter()
                .filter(|record| record.scenario() == scenario)
                .collect(),
        })
        .collect()
}

/// Orders distinct client labels by a fixed priority list
///
/// Clients in `priority` come first, in list order. Clients missing from `priority`
/// follow in order of first appearance. Clients absent from the input do not appear.
pub fn order_clients<'a>(
    clients: impl IntoIterator<Item = &'a str>,
    priority: &[&str],
) -> Vec<&'a str> {
    let mut ordered: Vec<&'a str> = clients.into_iter().unique().collect();
    ordered.sort_by_key(|client| {
        priority
            .iter()
            .position(|known| known == client)
            .unwrap_or(priority.len())
    });
    ordered
}
