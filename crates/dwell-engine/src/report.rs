use crate::entity::EntityTable;
use anyhow::{Context, Result};
use common::tracking::DwellRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Converts the finished accumulation table into the exported record set.
///
/// Applied once after all frames are processed: short-lived entities are
/// dropped as likely false positives, and totals are clamped to physically
/// sane bounds.
#[derive(Debug, Clone, Copy)]
pub struct ReportFilter {
    min_time_threshold: f64,
    video_duration: f64,
}

impl ReportFilter {
    pub fn new(min_time_threshold: f64, video_duration: f64) -> Self {
        Self {
            min_time_threshold,
            video_duration,
        }
    }

    /// Produce the final records, in entity creation order.
    pub fn finalize(&self, table: &EntityTable) -> Vec<DwellRecord> {
        table
            .iter()
            .filter(|entity| entity.overall_time >= self.min_time_threshold)
            .map(|entity| {
                let overall_time = entity.overall_time.min(self.video_duration);
                // Re-clamping against the clamped overall keeps the invariant
                // zone_time <= overall_time even if accumulation ever changes.
                let zone_time = entity.zone_time.min(overall_time);
                DwellRecord {
                    entity_id: entity.id.clone(),
                    overall_time,
                    zone_time,
                }
            })
            .collect()
    }
}

/// Write the report as CSV: one row per surviving entity, creation order.
pub fn write_csv(records: &[DwellRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create output directory {}", parent.display()))?;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("failed to create report file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "Entity ID,Overall Time (s),Time in Zone (s)")?;
    for record in records {
        writeln!(
            writer,
            "{},{},{}",
            record.entity_id, record.overall_time, record.zone_time
        )?;
    }

    writer.flush().context("failed to flush report file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, EntityTable};
    use common::geometry::BoundingBox;

    fn entity(id: &str, overall: f64, zone: f64) -> Entity {
        let mut e = Entity::new(id.to_string(), BoundingBox::new(0, 0, 10, 10));
        e.overall_time = overall;
        e.zone_time = zone;
        e
    }

    #[test]
    fn test_short_lived_entities_dropped() {
        let mut table = EntityTable::new();
        table.insert(entity("keep", 2.0, 0.0));
        table.insert(entity("drop", 0.5, 0.0));

        let records = ReportFilter::new(1.0, 100.0).finalize(&table);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity_id, "keep");
    }

    #[test]
    fn test_exact_threshold_is_retained() {
        let mut table = EntityTable::new();
        table.insert(entity("edge", 1.0, 0.0));

        let records = ReportFilter::new(1.0, 100.0).finalize(&table);
        assert_eq!(records.len(), 1);

        // One sample step below the threshold is dropped.
        let mut table = EntityTable::new();
        table.insert(entity("below", 0.5, 0.0));
        assert!(ReportFilter::new(1.0, 100.0).finalize(&table).is_empty());
    }

    #[test]
    fn test_overall_clamped_to_duration() {
        let mut table = EntityTable::new();
        table.insert(entity("runaway", 120.0, 0.0));

        let records = ReportFilter::new(1.0, 60.0).finalize(&table);
        assert_eq!(records[0].overall_time, 60.0);
    }

    #[test]
    fn test_zone_clamped_to_clamped_overall() {
        let mut table = EntityTable::new();
        table.insert(entity("runaway", 120.0, 90.0));

        let records = ReportFilter::new(1.0, 60.0).finalize(&table);
        assert_eq!(records[0].overall_time, 60.0);
        assert_eq!(records[0].zone_time, 60.0);
    }

    #[test]
    fn test_creation_order_preserved() {
        let mut table = EntityTable::new();
        table.insert(entity("first", 5.0, 0.0));
        table.insert(entity("second", 3.0, 1.0));
        table.insert(entity("third", 8.0, 2.0));

        let records = ReportFilter::new(1.0, 100.0).finalize(&table);
        let ids: Vec<&str> = records.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("entity_data.csv");

        let records = vec![
            DwellRecord {
                entity_id: "aa11".to_string(),
                overall_time: 2.0,
                zone_time: 1.0,
            },
            DwellRecord {
                entity_id: "bb22".to_string(),
                overall_time: 3.5,
                zone_time: 0.0,
            },
        ];

        write_csv(&records, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Entity ID,Overall Time (s),Time in Zone (s)");
        assert_eq!(lines[1], "aa11,2,1");
        assert_eq!(lines[2], "bb22,3.5,0");
    }
}
