use std::fmt::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::models::ExtractedEntries;

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureStats {
    pub count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

pub fn temperature_stats(entries: &ExtractedEntries) -> Option<TemperatureStats> {
    let first = entries.temperatures.first()?;
    let mut stats = TemperatureStats {
        count: 0,
        first_date: first.date,
        last_date: first.date,
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
        mean: 0.0,
    };
    let mut total = 0.0;

    for entry in &entries.temperatures {
        stats.count += 1;
        stats.first_date = stats.first_date.min(entry.date);
        stats.last_date = stats.last_date.max(entry.date);
        stats.min = stats.min.min(entry.temperature);
        stats.max = stats.max.max(entry.temperature);
        total += entry.temperature;
    }

    stats.mean = total / stats.count as f64;
    Some(stats)
}

pub fn build_summary(source: &Path, entries: &ExtractedEntries) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Cycle Import Preview");
    let _ = writeln!(output, "Extracted from {}", source.display());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Temperatures");

    match temperature_stats(entries) {
        None => {
            let _ = writeln!(output, "No temperature readings found.");
        }
        Some(stats) => {
            let _ = writeln!(
                output,
                "- {} readings from {} to {}",
                stats.count, stats.first_date, stats.last_date
            );
            let _ = writeln!(
                output,
                "- min {:.2} / max {:.2} / mean {:.2}",
                stats.min, stats.max, stats.mean
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Period Days");

    if entries.periods.is_empty() {
        let _ = writeln!(output, "No period days flagged.");
    } else {
        let _ = writeln!(output, "- {} days flagged", entries.periods.len());

        let mut recent: Vec<NaiveDate> = entries.periods.iter().map(|p| p.date).collect();
        recent.sort_by(|a, b| b.cmp(a));
        for day in recent.iter().take(5) {
            let _ = writeln!(output, "- {}", day);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FlowIntensity, PeriodEntry, TemperatureEntry};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample() -> ExtractedEntries {
        ExtractedEntries {
            temperatures: vec![
                TemperatureEntry {
                    date: date(3),
                    temperature: 36.5,
                },
                TemperatureEntry {
                    date: date(5),
                    temperature: 36.9,
                },
                TemperatureEntry {
                    date: date(4),
                    temperature: 36.4,
                },
            ],
            periods: (1..=7)
                .map(|d| PeriodEntry {
                    date: date(d),
                    flow_intensity: FlowIntensity::Medium,
                })
                .collect(),
        }
    }

    #[test]
    fn stats_cover_range_and_extremes() {
        let stats = temperature_stats(&sample()).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.first_date, date(3));
        assert_eq!(stats.last_date, date(5));
        assert_eq!(stats.min, 36.4);
        assert_eq!(stats.max, 36.9);
        assert!((stats.mean - 36.6).abs() < 0.001);
    }

    #[test]
    fn summary_lists_latest_five_period_days() {
        let summary = build_summary(Path::new("sheet.xlsx"), &sample());
        assert!(summary.contains("- 3 readings from 2024-01-03 to 2024-01-05"));
        assert!(summary.contains("- 7 days flagged"));
        assert!(summary.contains("- 2024-01-07"));
        assert!(summary.contains("- 2024-01-03"));
        assert!(!summary.contains("- 2024-01-02\n"));
    }

    #[test]
    fn empty_extraction_says_so() {
        let summary = build_summary(Path::new("sheet.xlsx"), &ExtractedEntries::default());
        assert!(summary.contains("No temperature readings found."));
        assert!(summary.contains("No period days flagged."));
    }
}
