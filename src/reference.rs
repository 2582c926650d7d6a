// Reference costs per m² by work type (R$), after the CUB/RJ and SINAPI
// construction cost indices. Static configuration: the engine reads it but
// never changes it.
use crate::types::{ReferenceRow, WorkType};
use crate::util::format_brl;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

static STANDARD: Lazy<ReferenceCostTable> = Lazy::new(|| {
    ReferenceCostTable::from_entries([
        (WorkType::Building, 3_500.0),
        (WorkType::Sanitation, 5_000.0),
        (WorkType::Paving, 450.0),
        (WorkType::Drainage, 2_000.0),
        (WorkType::BridgeViaduct, 12_000.0),
        (WorkType::Renovation, 2_200.0),
        (WorkType::SlopeContainment, 4_500.0),
        (WorkType::PublicFacility, 3_000.0),
    ])
});

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCostTable {
    costs: BTreeMap<WorkType, f64>,
}

impl ReferenceCostTable {
    pub fn standard() -> &'static ReferenceCostTable {
        &STANDARD
    }

    /// Build a table from explicit entries. Missing work types and
    /// non-positive costs fall back to 1.0 so cost ratios stay finite.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (WorkType, f64)>,
    {
        let mut costs: BTreeMap<WorkType, f64> =
            WorkType::ALL.into_iter().map(|kind| (kind, 1.0)).collect();
        for (kind, cost) in entries {
            costs.insert(kind, if cost > 0.0 { cost } else { 1.0 });
        }
        Self { costs }
    }

    pub fn cost_for(&self, work_type: WorkType) -> f64 {
        self.costs.get(&work_type).copied().unwrap_or(1.0)
    }

    pub fn rows(&self) -> Vec<ReferenceRow> {
        self.costs
            .iter()
            .map(|(kind, cost)| ReferenceRow {
                work_type: kind.label().to_string(),
                reference_cost: format_brl(*cost),
            })
            .collect()
    }
}
