//! Dormancy flagging: memories never accessed past an archival
//! threshold are flagged for review, not reclassified automatically.

use crate::record::{MaintenanceRecord, Relevance};
use serde::{Deserialize, Serialize};

/// A memory flagged as dormant this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DormancyFlag {
    /// The memory's id.
    pub id: String,
    /// Maintenance cycles elapsed since creation with zero accesses.
    pub cycles_since_creation: u64,
}

/// Flags records with `access_count == 0` whose age in maintenance
/// cycles exceeds `archival_threshold_cycles`. Already-`Dormant`
/// records are skipped since they were flagged on a prior pass.
pub fn flag_dormant(records: &[MaintenanceRecord], current_cycle: u64, archival_threshold_cycles: u64) -> Vec<DormancyFlag> {
    records
        .iter()
        .filter(|r| r.access_count == 0 && r.relevance == Relevance::Active)
        .filter_map(|r| {
            let cycles = current_cycle.saturating_sub(r.created_cycle);
            if cycles > archival_threshold_cycles {
                Some(DormancyFlag {
                    id: r.id.clone(),
                    cycles_since_creation: cycles,
                })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ValidityTier;
    use chrono::Utc;

    fn record(id: &str, created_cycle: u64, access_count: u32) -> MaintenanceRecord {
        MaintenanceRecord {
            id: id.to_string(),
            content: String::new(),
            tags: vec![],
            validity: ValidityTier::Confirmed,
            load_bearing: false,
            relevance: Relevance::Active,
            access_count,
            created_at: Utc::now(),
            created_cycle,
            last_accessed: None,
            related_memory_ids: vec![],
            superseded_by: None,
        }
    }

    #[test]
    fn old_unused_memory_is_flagged() {
        let records = vec![record("a", 0, 0)];
        let flags = flag_dormant(&records, 40, 25);
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn accessed_memory_is_never_flagged() {
        let records = vec![record("a", 0, 3)];
        let flags = flag_dormant(&records, 40, 25);
        assert!(flags.is_empty());
    }

    #[test]
    fn young_memory_is_not_flagged() {
        let records = vec![record("a", 38, 0)];
        let flags = flag_dormant(&records, 40, 25);
        assert!(flags.is_empty());
    }
}
