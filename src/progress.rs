//! Synthesis of the watch-progress payload submitted to the LMS.

use serde::Serialize;

use crate::target::TargetReference;
use crate::{LmsError, Result};

/// Inner progress payload: asserts every second of the video was watched.
///
/// Field names are the exact ones the update endpoint expects; the record
/// is built once and serialized into the `progressData` form field.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressRecord {
    #[serde(rename = "courseId")]
    pub course_id: i64,
    #[serde(rename = "courseBatchId")]
    pub course_batch_id: Option<String>,
    #[serde(rename = "courseSectionId")]
    pub course_section_id: i64,
    #[serde(rename = "courseSectionModuleId")]
    pub course_section_module_id: i64,
    #[serde(rename = "videoId")]
    pub video_id: i64,
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Stringified seconds "1" through the duration, in order.
    pub timestamp: Vec<String>,
    /// Completion percentage, always 100.
    pub progress: u8,
}

/// Outer multipart fields wrapped around the serialized record.
#[derive(Debug, Clone)]
pub struct ProgressForm {
    pub course_id: String,
    pub course_section_module_id: String,
    pub cb: String,
    pub progress_data: String,
}

impl ProgressRecord {
    /// Build the record for one video: ids coerced to integers, the
    /// timestamp sequence covering second 1 through `duration` inclusive.
    ///
    /// A zero duration yields an empty sequence; the command line keeps
    /// such values from getting here.
    pub fn synthesize(
        target: &TargetReference,
        video_id: &str,
        user_id: &str,
        duration: u64,
    ) -> Result<Self> {
        Ok(Self {
            course_id: parse_id("courseId", &target.course_id)?,
            course_batch_id: target.course_batch_id.clone(),
            course_section_id: target.course_section_id,
            course_section_module_id: target.course_section_module_id,
            video_id: parse_id("videoId", video_id)?,
            user_id: user_id.to_string(),
            timestamp: (1..=duration).map(|second| second.to_string()).collect(),
            progress: 100,
        })
    }

    /// Outer form fields for the update endpoint, with the record itself
    /// serialized into `progressData`.
    pub fn form_fields(&self) -> Result<ProgressForm> {
        Ok(ProgressForm {
            course_id: self.course_id.to_string(),
            course_section_module_id: self.course_section_module_id.to_string(),
            cb: self.course_batch_id.clone().unwrap_or_default(),
            progress_data: serde_json::to_string(self)?,
        })
    }
}

fn parse_id(field: &str, value: &str) -> Result<i64> {
    value
        .parse()
        .map_err(|_| LmsError::Parse(format!("{} is not numeric: '{}'", field, value)))
}
