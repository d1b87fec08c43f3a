//! Display labels derived from a [`SessionRecord`].
//!
//! Every function here is a pure function of the record.

use serde::Serialize;

use super::SessionRecord;

/// Overall session status. A strict priority chain over the stage flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Inactive,
    Started,
    InProgress,
    Complete,
}

impl SessionStatus {
    pub fn of(record: &SessionRecord) -> Self {
        if record.enhancement_complete {
            SessionStatus::Complete
        } else if record.analysis_complete {
            SessionStatus::InProgress
        } else if record.cv_uploaded {
            SessionStatus::Started
        } else {
            SessionStatus::Inactive
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionStatus::Inactive => "Inactive",
            SessionStatus::Started => "Started",
            SessionStatus::InProgress => "In Progress",
            SessionStatus::Complete => "Complete",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-stage dashboard labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageLabels {
    pub cv: &'static str,
    pub analysis: &'static str,
    pub enhancement: &'static str,
}

impl StageLabels {
    pub fn of(record: &SessionRecord) -> Self {
        let cv = if record.cv_uploaded {
            "Uploaded"
        } else {
            "Not Uploaded"
        };

        let analysis = if record.analysis_complete {
            "Complete"
        } else if record.cv_uploaded {
            "Ready"
        } else {
            "Not Started"
        };

        let enhancement = if record.enhancement_complete {
            "Complete"
        } else if record.questions_generated {
            "Ready"
        } else {
            "Not Started"
        };

        Self {
            cv,
            analysis,
            enhancement,
        }
    }
}

/// The action suggested to the user next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    UploadResume,
    ContinueToAnalysis,
    GenerateQuestions,
    ContinueToEnhancement,
    ViewResume,
}

impl NextAction {
    pub fn of(record: &SessionRecord) -> Self {
        if record.enhancement_complete {
            NextAction::ViewResume
        } else if record.questions_generated {
            NextAction::ContinueToEnhancement
        } else if record.analysis_complete {
            NextAction::GenerateQuestions
        } else if record.cv_uploaded {
            NextAction::ContinueToAnalysis
        } else {
            NextAction::UploadResume
        }
    }

    /// Short hint naming the command that performs the action.
    pub fn hint(self) -> &'static str {
        match self {
            NextAction::UploadResume => "Upload your resume to begin (`upload <file>`)",
            NextAction::ContinueToAnalysis => "Analyze the uploaded CV (`analyze`)",
            NextAction::GenerateQuestions => "Generate clarification questions (`questions`)",
            NextAction::ContinueToEnhancement => {
                "Answer the questions and generate the resume (`form`, `answer`, `enhance`)"
            }
            NextAction::ViewResume => "Export the enhanced resume or start over (`export resume`, `reset --yes`)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(flags: [bool; 4]) -> SessionRecord {
        SessionRecord {
            cv_uploaded: flags[0],
            analysis_complete: flags[1],
            questions_generated: flags[2],
            enhancement_complete: flags[3],
            ..SessionRecord::new()
        }
    }

    #[test]
    fn test_status_priority_chain() {
        assert_eq!(SessionStatus::of(&record([false; 4])), SessionStatus::Inactive);
        assert_eq!(
            SessionStatus::of(&record([true, false, false, false])),
            SessionStatus::Started
        );
        assert_eq!(
            SessionStatus::of(&record([true, true, false, false])),
            SessionStatus::InProgress
        );
        assert_eq!(
            SessionStatus::of(&record([true, true, true, false])),
            SessionStatus::InProgress
        );
        assert_eq!(SessionStatus::of(&record([true; 4])), SessionStatus::Complete);
    }

    #[test]
    fn test_status_complete_regardless_of_other_flags() {
        assert_eq!(
            SessionStatus::of(&record([false, false, false, true])),
            SessionStatus::Complete
        );
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(SessionStatus::Inactive.to_string(), "Inactive");
        assert_eq!(SessionStatus::Started.to_string(), "Started");
        assert_eq!(SessionStatus::InProgress.to_string(), "In Progress");
        assert_eq!(SessionStatus::Complete.to_string(), "Complete");
    }

    #[test]
    fn test_stage_labels() {
        let labels = StageLabels::of(&record([false; 4]));
        assert_eq!(
            labels,
            StageLabels {
                cv: "Not Uploaded",
                analysis: "Not Started",
                enhancement: "Not Started",
            }
        );

        let labels = StageLabels::of(&record([true, false, false, false]));
        assert_eq!(labels.cv, "Uploaded");
        assert_eq!(labels.analysis, "Ready");

        let labels = StageLabels::of(&record([true, true, true, false]));
        assert_eq!(labels.analysis, "Complete");
        assert_eq!(labels.enhancement, "Ready");

        let labels = StageLabels::of(&record([true; 4]));
        assert_eq!(labels.enhancement, "Complete");
    }

    #[test]
    fn test_next_action() {
        assert_eq!(NextAction::of(&record([false; 4])), NextAction::UploadResume);
        assert_eq!(
            NextAction::of(&record([true, false, false, false])),
            NextAction::ContinueToAnalysis
        );
        assert_eq!(
            NextAction::of(&record([true, true, false, false])),
            NextAction::GenerateQuestions
        );
        assert_eq!(
            NextAction::of(&record([true, true, true, false])),
            NextAction::ContinueToEnhancement
        );
        assert_eq!(NextAction::of(&record([true; 4])), NextAction::ViewResume);
    }
}
