//! Summary statistics shown alongside the analysis and the enhanced resume.

use serde::Serialize;
use std::collections::BTreeMap;

/// Section titles recognised in analysis text, in report order.
pub const ANALYSIS_SECTIONS: [&str; 5] = [
    "SKILLS ANALYSIS",
    "EXPERIENCE ANALYSIS",
    "EDUCATION ANALYSIS",
    "PROJECTS ANALYSIS",
    "INTEGRATION ANALYSIS",
];

const GAP_MARKERS: [&str; 4] = ["Missing", "missing", "Not specified", "absent"];

/// Headline numbers for an analysis report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    /// Occurrences of `ANALYSIS`.
    pub section_count: usize,
    /// Occurrences of gap phrases.
    pub gap_count: usize,
    /// 0..=100, higher means fewer gaps per 100 characters.
    pub enhancement_score: u32,
}

impl AnalysisSummary {
    pub fn from_text(text: &str) -> Self {
        let section_count = text.matches("ANALYSIS").count();
        let gap_count = GAP_MARKERS.iter().map(|m| text.matches(m).count()).sum();

        let enhancement_score = if gap_count == 0 {
            100
        } else {
            let per_hundred = text.chars().count() as f64 / 100.0;
            let gap_percentage = (gap_count as f64 / per_hundred).min(100.0);
            (100.0 - gap_percentage).floor().max(0.0) as u32
        };

        Self {
            section_count,
            gap_count,
            enhancement_score,
        }
    }
}

/// The body of section `title`, up to the next known section or rule line.
pub fn analysis_section<'a>(text: &'a str, title: &str) -> Option<&'a str> {
    let start = text.find(title)?;
    let rest = &text[start..];
    let after_title = title.len();

    let end = ANALYSIS_SECTIONS
        .iter()
        .filter(|other| **other != title)
        .filter_map(|other| rest[after_title..].find(other))
        .chain(rest[after_title..].find("====="))
        .min()
        .map(|offset| after_title + offset)
        .unwrap_or(rest.len());

    Some(rest[..end].trim_end())
}

/// Answer coverage for the enhanced resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResumeStats {
    pub answered: usize,
    pub total: usize,
    /// `20 + 80 * answered / total`, capped at 100.
    pub improvement_score: u32,
}

impl ResumeStats {
    pub fn from_answers(answers: &BTreeMap<String, String>) -> Self {
        let total = answers.len();
        let answered = answers.values().filter(|a| !a.trim().is_empty()).count();

        let improvement_score = if total == 0 {
            20
        } else {
            ((20.0 + answered as f64 / total as f64 * 80.0).floor() as u32).min(100)
        };

        Self {
            answered,
            total,
            improvement_score,
        }
    }
}
