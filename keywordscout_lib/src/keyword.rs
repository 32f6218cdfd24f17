//! The keyword record carried from metrics lookup through enrichment to export.

use searchad_api::types::{RawKeyword, RawVolume};
use serde::{Deserialize, Serialize};

use crate::error::KeywordScoutError;

/// One related keyword with its volumes and, once enriched, its competition data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub related_keyword: String,
    pub mobile_volume: u64,
    pub pc_volume: u64,
    pub total_volume: u64,
    pub competition_index: String,
    /// `None` until enriched.
    pub document_count: Option<u64>,
    /// `None` until enriched.
    pub competition_ratio: Option<f64>,
}

impl KeywordRecord {
    /// Builds an unenriched record; `total_volume` is derived and saturates
    /// at `u64::MAX`.
    pub fn new(
        related_keyword: impl Into<String>,
        mobile_volume: u64,
        pc_volume: u64,
        competition_index: impl Into<String>,
    ) -> Self {
        Self {
            related_keyword: related_keyword.into(),
            mobile_volume,
            pc_volume,
            total_volume: mobile_volume.saturating_add(pc_volume),
            competition_index: competition_index.into(),
            document_count: None,
            competition_ratio: None,
        }
    }

    /// Normalizes one raw API item. Fails on any volume that is not a
    /// non-negative integer once the threshold marker is stripped.
    pub fn from_raw(raw: &RawKeyword) -> Result<Self, KeywordScoutError> {
        let mobile = parse_volume(&raw.monthly_mobile_qc_cnt).map_err(|e| {
            KeywordScoutError::UpstreamFormat(format!(
                "keyword '{}': mobile volume {}",
                raw.rel_keyword, e
            ))
        })?;
        let pc = parse_volume(&raw.monthly_pc_qc_cnt).map_err(|e| {
            KeywordScoutError::UpstreamFormat(format!(
                "keyword '{}': pc volume {}",
                raw.rel_keyword, e
            ))
        })?;
        if mobile.checked_add(pc).is_none() {
            return Err(KeywordScoutError::UpstreamFormat(format!(
                "keyword '{}': volumes {} + {} overflow",
                raw.rel_keyword, mobile, pc
            )));
        }
        Ok(Self::new(&raw.rel_keyword, mobile, pc, &raw.comp_idx))
    }

    /// Stores the document count and the ratio derived from it.
    pub fn apply_document_count(&mut self, document_count: u64) {
        self.document_count = Some(document_count);
        self.competition_ratio = Some(competition_ratio(self.total_volume, document_count));
    }

    pub fn is_enriched(&self) -> bool {
        self.document_count.is_some()
    }
}

/// Parses a monthly volume. Text values may carry a `<` threshold marker
/// (`"< 10"` means "fewer than ten"), which is read as the literal floor.
pub fn parse_volume(raw: &RawVolume) -> Result<u64, String> {
    match raw {
        RawVolume::Count(n) => Ok(*n),
        RawVolume::Text(text) => {
            let cleaned: String = text
                .chars()
                .filter(|c| *c != '<' && !c.is_whitespace())
                .collect();
            cleaned
                .parse::<u64>()
                .map_err(|_| format!("'{}' is not a count", text))
        }
    }
}

/// Search volume per competing document; `0.0` when there are no documents.
pub fn competition_ratio(total_volume: u64, document_count: u64) -> f64 {
    if document_count == 0 {
        0.0
    } else {
        total_volume as f64 / document_count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pc: RawVolume, mobile: RawVolume) -> RawKeyword {
        RawKeyword {
            rel_keyword: "tent".to_string(),
            monthly_pc_qc_cnt: pc,
            monthly_mobile_qc_cnt: mobile,
            comp_idx: "high".to_string(),
        }
    }

    #[test]
    fn total_is_sum_of_volumes() {
        let record =
            KeywordRecord::from_raw(&raw(RawVolume::Count(120), RawVolume::Count(880))).unwrap();
        assert_eq!(record.pc_volume, 120);
        assert_eq!(record.mobile_volume, 880);
        assert_eq!(record.total_volume, 1000);
        assert_eq!(record.competition_index, "high");
        assert!(!record.is_enriched());
    }

    #[test]
    fn threshold_marker_is_stripped() {
        assert_eq!(parse_volume(&RawVolume::Text("<10".into())).unwrap(), 10);
        assert_eq!(parse_volume(&RawVolume::Text("< 10".into())).unwrap(), 10);
        assert_eq!(parse_volume(&RawVolume::Text(" 250 ".into())).unwrap(), 250);

        let record = KeywordRecord::from_raw(&raw(
            RawVolume::Text("< 10".into()),
            RawVolume::Count(40),
        ))
        .unwrap();
        assert_eq!(record.total_volume, 50);
    }

    #[test]
    fn malformed_volume_fails() {
        assert!(parse_volume(&RawVolume::Text("many".into())).is_err());
        assert!(parse_volume(&RawVolume::Text("-5".into())).is_err());

        let result = KeywordRecord::from_raw(&raw(
            RawVolume::Count(1),
            RawVolume::Text("n/a".into()),
        ));
        match result {
            Err(KeywordScoutError::UpstreamFormat(msg)) => {
                assert!(msg.contains("tent"));
                assert!(msg.contains("mobile"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn overflowing_volumes_fail() {
        let result = KeywordRecord::from_raw(&raw(
            RawVolume::Count(u64::MAX),
            RawVolume::Count(1),
        ));
        match result {
            Err(KeywordScoutError::UpstreamFormat(msg)) => assert!(msg.contains("overflow")),
            other => panic!("unexpected: {other:?}"),
        }

        let direct = KeywordRecord::new("tent", u64::MAX, 5, "high");
        assert_eq!(direct.total_volume, u64::MAX);
    }

    #[test]
    fn ratio_divides_volume_by_documents() {
        assert_eq!(competition_ratio(1000, 500), 2.0);
        assert_eq!(competition_ratio(10, 400), 0.025);
    }

    #[test]
    fn ratio_is_zero_without_documents() {
        assert_eq!(competition_ratio(1000, 0), 0.0);
        assert_eq!(competition_ratio(0, 0), 0.0);
    }

    #[test]
    fn apply_document_count_sets_both_fields() {
        let mut record = KeywordRecord::new("tent", 600, 400, "mid");
        record.apply_document_count(500);
        assert_eq!(record.document_count, Some(500));
        assert_eq!(record.competition_ratio, Some(2.0));
    }
}
