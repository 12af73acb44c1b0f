//! Task universe enumeration.

use refresher_core::{Catalog, ComboAllocation, Task};

/// Enumerate every refreshable task in a fixed order.
///
/// Industries first, then locations, then combination tasks up to
/// `combo_limit`. With [`ComboAllocation::Sequential`] combos come from the
/// nested industry × location loop and the cut can land mid-industry, so
/// early industries get full city coverage before later ones get any.
/// [`ComboAllocation::RoundRobin`] walks locations in the outer loop instead.
pub fn build_universe(catalog: &Catalog, combo_limit: usize, allocation: ComboAllocation) -> Vec<Task> {
    let combo_count = combo_limit.min(catalog.industries.len() * catalog.locations.len());
    let mut tasks =
        Vec::with_capacity(catalog.industries.len() + catalog.locations.len() + combo_count);

    tasks.extend(catalog.industries.iter().cloned().map(Task::industry));
    tasks.extend(catalog.locations.iter().cloned().map(Task::location));

    let combos: Box<dyn Iterator<Item = Task> + '_> = match allocation {
        ComboAllocation::Sequential => Box::new(catalog.industries.iter().flat_map(|industry| {
            catalog
                .locations
                .iter()
                .map(move |location| Task::combo(industry.clone(), location.clone()))
        })),
        ComboAllocation::RoundRobin => Box::new(catalog.locations.iter().flat_map(|location| {
            catalog
                .industries
                .iter()
                .map(move |industry| Task::combo(industry.clone(), location.clone()))
        })),
    };
    tasks.extend(combos.take(combo_count));

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use refresher_core::{Industry, Location};

    fn small_catalog() -> Catalog {
        Catalog::new(
            vec![
                Industry::new("plumbing", "Plumbing"),
                Industry::new("hvac", "HVAC"),
                Industry::new("roofing", "Roofing"),
            ],
            vec![
                Location::new("toronto", "Toronto", "Canada"),
                Location::new("austin", "Austin", "United States"),
            ],
        )
    }

    fn keys(tasks: &[Task]) -> Vec<String> {
        tasks.iter().map(Task::cache_key).collect()
    }

    #[test]
    fn test_sequential_order_cuts_mid_industry() {
        let tasks = build_universe(&small_catalog(), 4, ComboAllocation::Sequential);

        assert_eq!(
            keys(&tasks),
            vec![
                "industry:plumbing",
                "industry:hvac",
                "industry:roofing",
                "location:toronto",
                "location:austin",
                "industry-location:plumbing:toronto",
                "industry-location:plumbing:austin",
                "industry-location:hvac:toronto",
                "industry-location:hvac:austin",
            ]
        );
    }

    #[test]
    fn test_limit_can_stop_inside_inner_loop() {
        let tasks = build_universe(&small_catalog(), 3, ComboAllocation::Sequential);
        assert_eq!(tasks.len(), 8);
        assert_eq!(tasks[7].cache_key(), "industry-location:hvac:toronto");
    }

    #[test]
    fn test_round_robin_spreads_industries() {
        let tasks = build_universe(&small_catalog(), 4, ComboAllocation::RoundRobin);
        assert_eq!(
            keys(&tasks[5..]),
            vec![
                "industry-location:plumbing:toronto",
                "industry-location:hvac:toronto",
                "industry-location:roofing:toronto",
                "industry-location:plumbing:austin",
            ]
        );
    }

    #[test]
    fn test_limit_larger_than_matrix() {
        let tasks = build_universe(&small_catalog(), 100, ComboAllocation::Sequential);
        assert_eq!(tasks.len(), 3 + 2 + 6);
    }

    #[test]
    fn test_zero_limit_and_empty_catalog() {
        assert_eq!(build_universe(&small_catalog(), 0, ComboAllocation::Sequential).len(), 5);
        let empty = Catalog::new(Vec::new(), Vec::new());
        assert!(build_universe(&empty, 50, ComboAllocation::RoundRobin).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let catalog = Catalog::builtin();
        assert_eq!(
            build_universe(&catalog, 50, ComboAllocation::Sequential),
            build_universe(&catalog, 50, ComboAllocation::Sequential)
        );
    }
}
