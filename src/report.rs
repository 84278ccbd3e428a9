//! Rendering of the experience/skill index for the console and for files.
//!
//! Every format is derived from the same frozen [`ExperienceSkillIndex`]:
//! one record per year, ascending, with skills joined by [`SKILL_SEPARATOR`].

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::Result;
use crate::models::ExperienceSkillIndex;

pub const YEARS_COLUMN: &str = "years_of_experience";
pub const SKILLS_COLUMN: &str = "skills";
pub const SKILL_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "console" => Ok(ReportFormat::Text),
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown format '{}' (expected text, csv or json)", other)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Csv => write!(f, "csv"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

pub fn join_skills(skills: &[String]) -> String {
    skills.join(SKILL_SEPARATOR)
}

pub fn format_text(index: &ExperienceSkillIndex) -> String {
    let width = YEARS_COLUMN.len();
    let mut output = format!("{:<width$}  {}\n", YEARS_COLUMN, SKILLS_COLUMN, width = width);

    for (years, skills) in index.iter() {
        let line = format!("{:<width$}  {}", years, join_skills(skills), width = width);
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output
}

pub fn write_csv<W: Write>(index: &ExperienceSkillIndex, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([YEARS_COLUMN, SKILLS_COLUMN])?;

    for (years, skills) in index.iter() {
        csv.write_record([years.to_string(), join_skills(skills)])?;
    }

    csv.flush()?;
    Ok(())
}

pub fn format_json(index: &ExperienceSkillIndex) -> Result<String> {
    Ok(serde_json::to_string_pretty(&index.records())?)
}

pub fn render(index: &ExperienceSkillIndex, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(format_text(index)),
        ReportFormat::Json => format_json(index),
        ReportFormat::Csv => {
            let mut buffer = Vec::new();
            write_csv(index, &mut buffer)?;
            Ok(String::from_utf8_lossy(&buffer).into_owned())
        }
    }
}

/// Writes the report to `path`. Any failure here means the run's result is lost.
pub fn write_report<P: AsRef<Path>>(
    index: &ExperienceSkillIndex,
    format: ReportFormat,
    path: P,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);

    match format {
        ReportFormat::Csv => write_csv(index, &mut writer)?,
        other => writer.write_all(render(index, other)?.as_bytes())?,
    }

    writer.flush()?;
    tracing::info!("Report written to: {}", path.as_ref().display());
    Ok(())
}
