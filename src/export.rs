//! Flat CSV store, one row per match summary.
//!
//! Columns: match_id,win,duration,kills,deaths,assists,championId,role,vision_score

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::analysis::summary::MatchSummary;
use crate::error::AppError;

pub const CSV_HEADER: &str =
    "match_id,win,duration,kills,deaths,assists,championId,role,vision_score";

const COLUMNS: usize = 9;

impl MatchSummary {
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}",
            self.match_id,
            self.win,
            self.duration_seconds,
            self.kills,
            self.deaths,
            self.assists,
            self.champion_id,
            self.role,
            self.vision_score,
        )
    }

    pub fn from_csv_row(row: &str) -> Result<Self, String> {
        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        if fields.len() != COLUMNS {
            return Err(format!("expected {} columns, found {}", COLUMNS, fields.len()));
        }

        Ok(MatchSummary {
            match_id: fields[0].to_string(),
            win: parse_bool(fields[1])?,
            duration_seconds: parse_field(fields[2], "duration")?,
            kills: parse_field(fields[3], "kills")?,
            deaths: parse_field(fields[4], "deaths")?,
            assists: parse_field(fields[5], "assists")?,
            champion_id: parse_field(fields[6], "championId")?,
            role: fields[7].parse()?,
            vision_score: parse_field(fields[8], "vision_score")?,
        })
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(format!("invalid win flag '{}'", other)),
    }
}

fn parse_field<T: std::str::FromStr>(value: &str, column: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid {} '{}'", column, value))
}

/// Writes the header and every row, replacing any previous file.
pub fn write_summaries(path: &Path, summaries: &[MatchSummary]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", CSV_HEADER)?;
    for summary in summaries {
        writeln!(writer, "{}", summary.to_csv_row())?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = summaries.len(), "match history exported");
    Ok(())
}

pub fn load_summaries(path: &Path) -> Result<Vec<MatchSummary>, AppError> {
    let reader = BufReader::new(File::open(path)?);
    let mut summaries = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if idx == 0 {
            if line.trim() != CSV_HEADER {
                return Err(AppError::ExportError(format!(
                    "{}: unexpected header '{}'",
                    path.display(),
                    line
                )));
            }
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let summary = MatchSummary::from_csv_row(&line).map_err(|e| {
            AppError::ExportError(format!("{} line {}: {}", path.display(), idx + 1, e))
        })?;
        summaries.push(summary);
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::metrics::MatchMetrics;
    use crate::analysis::summary::Role;
    use tempfile::tempdir;

    fn summary(id: &str, win: bool, duration_seconds: i64, role: Role) -> MatchSummary {
        MatchSummary {
            match_id: id.to_string(),
            win,
            duration_seconds,
            kills: 4,
            deaths: 3,
            assists: 9,
            champion_id: 145,
            role,
            vision_score: 22,
        }
    }

    #[test]
    fn test_csv_row_format() {
        let row = summary("EUW1_7001", true, 1745, Role::Bottom).to_csv_row();
        assert_eq!(row, "EUW1_7001,true,1745,4,3,9,145,BOTTOM,22");
    }

    #[test]
    fn reloaded_rows_give_same_metrics() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("match_history.csv");
        let summaries = vec![
            summary("NA1_1", true, 1500, Role::Mid),
            summary("NA1_2", false, 2100, Role::Support),
            summary("NA1_3", true, 1833, Role::Unknown),
        ];

        write_summaries(&path, &summaries).unwrap();
        let loaded = load_summaries(&path).unwrap();

        let direct = MatchMetrics::from_summaries(&summaries);
        let reloaded = MatchMetrics::from_summaries(&loaded);
        assert!((direct.win_rate - reloaded.win_rate).abs() < 1e-9);
        assert!((direct.average_duration_secs - reloaded.average_duration_secs).abs() < 1e-9);
        assert_eq!(loaded, summaries);
    }

    #[test]
    fn export_overwrites_previous_run() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");

        write_summaries(&path, &[summary("a", true, 1, Role::Top), summary("b", true, 1, Role::Top)]).unwrap();
        write_summaries(&path, &[summary("c", false, 1, Role::Top)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2); // Header + 1 row
        assert!(lines[0].starts_with("match_id,"));
    }

    #[test]
    fn bad_row_reports_line_number() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        std::fs::write(&path, format!("{}\nNA1_1,true,1500,1,2,3,7,MID,10\nNA1_2,maybe,1,1,1,1,1,TOP,1\n", CSV_HEADER)).unwrap();

        match load_summaries(&path) {
            Err(AppError::ExportError(msg)) => {
                assert!(msg.contains("line 3"));
                assert!(msg.contains("maybe"));
            }
            other => panic!("expected export error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_capitalised_booleans() {
        let summary = MatchSummary::from_csv_row("NA1_9,True,1200,0,0,0,1,JUNGLE,0").unwrap();
        assert!(summary.win);
        assert_eq!(summary.role, Role::Jungle);
    }
}
