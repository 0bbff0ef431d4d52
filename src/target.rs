//! Interpretation of the command-line inputs: the target page URL and the
//! optional duration override.

use url::Url;

use crate::{LmsError, Result};

/// Course coordinates addressed by the target URL.
///
/// The course id is the path segment after `/Index/`; `cs`, `csm` and `cb`
/// come from the query string. The section and module ids must be numeric
/// before any network traffic happens; the course id itself is coerced
/// later, when the progress record is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReference {
    pub course_id: String,
    pub course_batch_id: Option<String>,
    pub course_section_id: i64,
    pub course_section_module_id: i64,
}

impl TargetReference {
    /// Parse a course module URL of the shape
    /// `https://host/Learning/Index/<courseId>?csm=..&cb=..&cs=..`.
    pub fn parse(raw_url: &str) -> Result<Self> {
        let parsed =
            Url::parse(raw_url).map_err(|e| LmsError::Input(format!("invalid URL: {}", e)))?;

        let course_id = parsed
            .path()
            .split_once("/Index/")
            .map(|(_, rest)| rest.to_string())
            .ok_or_else(|| {
                LmsError::Input("invalid URL format: no /Index/ segment".to_string())
            })?;

        let course_section_id = required_numeric(&parsed, "cs")?;
        let course_section_module_id = required_numeric(&parsed, "csm")?;
        let course_batch_id = first_query_value(&parsed, "cb");

        Ok(Self {
            course_id,
            course_batch_id,
            course_section_id,
            course_section_module_id,
        })
    }
}

/// Convert the optional minutes argument to whole seconds.
pub fn parse_duration_minutes(raw: &str) -> Result<u64> {
    let minutes: f64 = raw
        .trim()
        .parse()
        .map_err(|_| LmsError::Input("time argument must be a number (minutes)".to_string()))?;

    // Negative and NaN values saturate to zero in the cast.
    let seconds = (minutes * 60.0) as u64;
    if !minutes.is_finite() || seconds == 0 {
        return Err(LmsError::Input(
            "time argument must be a positive number of minutes".to_string(),
        ));
    }
    Ok(seconds)
}

fn first_query_value(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find_map(|(key, value)| if key == name { Some(value.into_owned()) } else { None })
}

fn required_numeric(url: &Url, name: &str) -> Result<i64> {
    let value = first_query_value(url, name)
        .ok_or_else(|| LmsError::Input(format!("missing {} query parameter", name)))?;
    value.parse().map_err(|_| {
        LmsError::Input(format!("{} query parameter is not numeric: '{}'", name, value))
    })
}
