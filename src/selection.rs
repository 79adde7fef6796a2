//! Primary-aliquot selection
//!
//! Picks one aliquot-level MAF per case. Candidates are ranked by the best
//! sample type among their samples:
//!
//! | Rank | Sample type |
//! |------|-------------|
//! | 1 | Primary Tumor |
//! | 2 | Primary Blood Derived Cancer - Bone Marrow |
//! | 3 | Primary Blood Derived Cancer - Peripheral Blood |
//! | 4 | Metastatic |
//! | 5 | Additional Metastatic |
//! | 6 | Recurrent Tumor |
//! | 7 | Recurrent Blood Derived Cancer - Bone Marrow |
//! | 8 | Recurrent Blood Derived Cancer - Peripheral Blood |
//! | 9 | Additional - New Primary |
//! | last | anything else |
//!
//! Ties go to the earliest MAF creation date, then to the smallest id.
//!
//! # Example
//!
//! ```
//! use aliquot_maf::selection::{
//!     select_primary_aliquots, PrimaryAliquot, PrimaryAliquotSelectionCriterion, SampleCriterion,
//! };
//! use chrono::{TimeZone, Utc};
//!
//! let criteria = vec![
//!     PrimaryAliquotSelectionCriterion {
//!         id: "maf-1".to_string(),
//!         samples: vec![SampleCriterion::new("s1", "Recurrent Tumor")],
//!         case_id: "case-1".to_string(),
//!         maf_creation_date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
//!     },
//!     PrimaryAliquotSelectionCriterion {
//!         id: "maf-2".to_string(),
//!         samples: vec![
//!             SampleCriterion::new("s2", "Primary Tumor"),
//!             SampleCriterion::new("s3", "Blood Derived Normal"),
//!         ],
//!         case_id: "case-1".to_string(),
//!         maf_creation_date: Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap(),
//!     },
//! ];
//!
//! let selected = select_primary_aliquots(&criteria);
//! assert_eq!(selected["case-1"], PrimaryAliquot::new("maf-2", "s2"));
//! ```

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// Sample types in selection order; index + 1 is the rank
const SAMPLE_TYPE_ORDER: [&str; 9] = [
    "Primary Tumor",
    "Primary Blood Derived Cancer - Bone Marrow",
    "Primary Blood Derived Cancer - Peripheral Blood",
    "Metastatic",
    "Additional Metastatic",
    "Recurrent Tumor",
    "Recurrent Blood Derived Cancer - Bone Marrow",
    "Recurrent Blood Derived Cancer - Peripheral Blood",
    "Additional - New Primary",
];

/// Rank of sample types missing from the ranking table
pub const UNRANKED: u32 = u32::MAX;

/// Selection rank of a sample type (lower wins)
///
/// Unranked types get [`UNRANKED`].
pub fn sample_type_rank(sample_type: &str) -> u32 {
    SAMPLE_TYPE_ORDER
        .iter()
        .position(|&t| t == sample_type)
        .map_or(UNRANKED, |i| i as u32 + 1)
}

/// A sample an aliquot came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCriterion {
    /// Sample id
    pub id: String,
    /// Sample type, e.g. "Primary Tumor"
    pub sample_type: String,
}

impl SampleCriterion {
    /// Create a sample criterion
    pub fn new(id: impl Into<String>, sample_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sample_type: sample_type.into(),
        }
    }
}

/// Attributes of one aliquot-level MAF used for selection
///
/// A MAF usually has a tumor and a normal sample; only its best-ranked
/// sample counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryAliquotSelectionCriterion {
    /// Any identifier, reported back in [`PrimaryAliquot::id`]
    pub id: String,
    /// Samples the aliquots came from (must not be empty)
    pub samples: Vec<SampleCriterion>,
    /// Case the aliquots came from
    pub case_id: String,
    /// When the MAF was created; earlier wins ties
    pub maf_creation_date: DateTime<Utc>,
}

impl PrimaryAliquotSelectionCriterion {
    /// Best rank among the samples and the index of the first sample with it
    ///
    /// # Panics
    ///
    /// Panics if `samples` is empty.
    fn best_sample(&self) -> (u32, usize) {
        assert!(
            !self.samples.is_empty(),
            "selection criterion {} has no samples",
            self.id
        );

        let mut best = (UNRANKED, 0);
        for (index, sample) in self.samples.iter().enumerate() {
            let rank = sample_type_rank(&sample.sample_type);
            if rank < best.0 {
                best = (rank, index);
            }
        }
        best
    }
}

/// The selected MAF of a case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryAliquot {
    /// [`PrimaryAliquotSelectionCriterion::id`] of the winner
    pub id: String,
    /// [`SampleCriterion::id`] of the winner's best-ranked sample
    pub sample_id: String,
}

impl PrimaryAliquot {
    /// Create a selection result
    pub fn new(id: impl Into<String>, sample_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sample_id: sample_id.into(),
        }
    }
}

/// A criterion with its precomputed best sample
struct Ranked<'a> {
    criterion: &'a PrimaryAliquotSelectionCriterion,
    rank: u32,
    sample_index: usize,
}

/// Select the primary aliquot for each case
///
/// Returns case id → primary aliquot. An empty input yields an empty map.
///
/// # Panics
///
/// Panics if any criterion has no samples.
pub fn select_primary_aliquots(
    criteria: &[PrimaryAliquotSelectionCriterion],
) -> BTreeMap<String, PrimaryAliquot> {
    group_by_case(criteria)
        .into_iter()
        .filter_map(|(case_id, candidates)| {
            let primary = perform_selection(&candidates)?;
            debug!(case_id, id = %primary.id, sample_id = %primary.sample_id, "Selected primary aliquot");
            Some((case_id.to_string(), primary))
        })
        .collect()
}

fn group_by_case(criteria: &[PrimaryAliquotSelectionCriterion]) -> BTreeMap<&str, Vec<Ranked<'_>>> {
    let mut by_case: BTreeMap<&str, Vec<Ranked<'_>>> = BTreeMap::new();
    for criterion in criteria {
        let (rank, sample_index) = criterion.best_sample();
        by_case
            .entry(criterion.case_id.as_str())
            .or_default()
            .push(Ranked {
                criterion,
                rank,
                sample_index,
            });
    }
    by_case
}

fn perform_selection(candidates: &[Ranked<'_>]) -> Option<PrimaryAliquot> {
    let primary = tiebreaker(select_by_sample_type(candidates))?;
    Some(PrimaryAliquot {
        id: primary.criterion.id.clone(),
        sample_id: primary.criterion.samples[primary.sample_index].id.clone(),
    })
}

/// All candidates tied for the lowest rank, in input order
fn select_by_sample_type<'c, 'a>(candidates: &'c [Ranked<'a>]) -> Vec<&'c Ranked<'a>> {
    let mut current_rank = UNRANKED;
    let mut primaries: Vec<&Ranked<'a>> = Vec::new();

    for candidate in candidates {
        if primaries.is_empty() || candidate.rank < current_rank {
            primaries.clear();
            primaries.push(candidate);
            current_rank = candidate.rank;
        } else if candidate.rank == current_rank {
            primaries.push(candidate);
        }
    }
    primaries
}

/// Earliest creation date, then smallest id; first in input order on full ties
fn tiebreaker<'c, 'a>(candidates: Vec<&'c Ranked<'a>>) -> Option<&'c Ranked<'a>> {
    candidates.into_iter().min_by(|a, b| {
        (a.criterion.maf_creation_date, &a.criterion.id)
            .cmp(&(b.criterion.maf_creation_date, &b.criterion.id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap()
    }

    fn criterion(id: &str, samples: &[(&str, &str)], case_id: &str, day: u32) -> PrimaryAliquotSelectionCriterion {
        PrimaryAliquotSelectionCriterion {
            id: id.to_string(),
            samples: samples
                .iter()
                .map(|(id, sample_type)| SampleCriterion::new(*id, *sample_type))
                .collect(),
            case_id: case_id.to_string(),
            maf_creation_date: date(day),
        }
    }

    #[test]
    fn test_sample_type_rank_table() {
        assert_eq!(sample_type_rank("Primary Tumor"), 1);
        assert_eq!(sample_type_rank("Metastatic"), 4);
        assert_eq!(sample_type_rank("Additional - New Primary"), 9);
        assert_eq!(sample_type_rank("Blood Derived Normal"), UNRANKED);
        assert_eq!(sample_type_rank("primary tumor"), UNRANKED);
    }

    #[test]
    fn test_best_sample_prefers_first_of_equal_rank() {
        let c = criterion(
            "1",
            &[("n", "Blood Derived Normal"), ("a", "Metastatic"), ("b", "Metastatic")],
            "case",
            1,
        );
        assert_eq!(c.best_sample(), (4, 1));
    }

    #[test]
    fn test_best_sample_all_unranked_uses_first() {
        let c = criterion("1", &[("x", "Ectoplasm"), ("y", "Muslin")], "case", 1);
        assert_eq!(c.best_sample(), (UNRANKED, 0));
    }

    #[test]
    #[should_panic(expected = "has no samples")]
    fn test_empty_samples_panics() {
        let c = criterion("1", &[], "case", 1);
        select_primary_aliquots(&[c]);
    }

    #[test]
    fn test_rank_beats_creation_date() {
        let criteria = vec![
            criterion("early", &[("s1", "Recurrent Tumor")], "case", 1),
            criterion("late", &[("s2", "Primary Tumor")], "case", 9),
        ];
        let selected = select_primary_aliquots(&criteria);
        assert_eq!(selected["case"], PrimaryAliquot::new("late", "s2"));
    }

    #[test]
    fn test_creation_date_then_id_break_ties() {
        let criteria = vec![
            criterion("b", &[("s1", "Primary Tumor")], "case", 2),
            criterion("c", &[("s2", "Primary Tumor")], "case", 1),
            criterion("a", &[("s3", "Primary Tumor")], "case", 2),
        ];
        assert_eq!(
            select_primary_aliquots(&criteria)["case"],
            PrimaryAliquot::new("c", "s2")
        );

        let criteria = vec![
            criterion("b", &[("s1", "Primary Tumor")], "case", 1),
            criterion("a", &[("s2", "Primary Tumor")], "case", 1),
        ];
        assert_eq!(
            select_primary_aliquots(&criteria)["case"],
            PrimaryAliquot::new("a", "s2")
        );
    }

    #[test]
    fn test_unranked_only_case_still_selects() {
        let criteria = vec![
            criterion("2", &[("s1", "Unknown")], "case", 1),
            criterion("1", &[("s2", "Ectoplasm")], "case", 1),
        ];
        assert_eq!(
            select_primary_aliquots(&criteria)["case"],
            PrimaryAliquot::new("1", "s2")
        );
    }

    #[test]
    fn test_empty_criteria() {
        assert!(select_primary_aliquots(&[]).is_empty());
    }
}
