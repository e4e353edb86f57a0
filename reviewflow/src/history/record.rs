//! The finished artifact of a successful run.

use crate::config::{ModelId, Temperature};
use crate::core::Artifact;
use crate::utils::{format_display, format_file_safe, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable result of one completed review run.
///
/// Built only by the engine once every stage has succeeded. Fields are
/// read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    run_id: Uuid,
    content: String,
    source_name: String,
    model: ModelId,
    temperature: Temperature,
    timestamp: Timestamp,
    code: String,
    artifact_digest: String,
}

impl ReviewRecord {
    pub(crate) fn new(
        run_id: Uuid,
        content: String,
        artifact: &Artifact,
        model: ModelId,
        temperature: Temperature,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            run_id,
            content,
            source_name: artifact.name.clone(),
            model,
            temperature,
            timestamp,
            code: artifact.content.clone(),
            artifact_digest: artifact.digest(),
        }
    }

    /// Id of the run that produced this record.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The synthesized report.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Display name of the reviewed artifact.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Model used for every stage.
    #[must_use]
    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Sampling temperature used for every stage.
    #[must_use]
    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    /// When the record was assembled.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The original artifact text.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// SHA-256 of the artifact text, hex encoded.
    #[must_use]
    pub fn artifact_digest(&self) -> &str {
        &self.artifact_digest
    }

    /// Character count of the artifact text.
    #[must_use]
    pub fn code_char_count(&self) -> usize {
        self.code.chars().count()
    }

    /// Timestamp as `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn display_timestamp(&self) -> String {
        format_display(&self.timestamp)
    }

    /// Suggested file name for downloading the report.
    #[must_use]
    pub fn report_file_name(&self) -> String {
        format!(
            "review_{}_{}.txt",
            self.source_name,
            format_file_safe(&self.timestamp)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn record() -> ReviewRecord {
        ReviewRecord::new(
            Uuid::nil(),
            "Overall score: 6/10".to_string(),
            &Artifact::new("app.py", "import os\n"),
            ModelId::Gemini25Pro,
            Temperature::new(0.4).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 2, 9, 15, 0).unwrap(),
        )
    }

    #[test]
    fn test_record_carries_artifact() {
        let r = record();
        assert_eq!(r.source_name(), "app.py");
        assert_eq!(r.code(), "import os\n");
        assert_eq!(r.code_char_count(), 10);
        assert_eq!(r.artifact_digest(), Artifact::new("x", "import os\n").digest());
        assert_eq!(r.model(), ModelId::Gemini25Pro);
    }

    #[test]
    fn test_presentation_helpers() {
        let r = record();
        assert_eq!(r.display_timestamp(), "2025-03-02 09:15:00");
        assert_eq!(r.report_file_name(), "review_app.py_2025-03-02 09-15-00.txt");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["model"], "gemini-2.5-pro");
        assert_eq!(json["temperature"], 0.4);
        assert_eq!(json["content"], "Overall score: 6/10");

        let back: ReviewRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record());
    }
}
