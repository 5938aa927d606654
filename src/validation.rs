use serde::Deserialize;
use std::ops::RangeInclusive;
use url::Url;

use crate::error::{Field, ValidationError};

pub const DELAY_RANGE: RangeInclusive<u32> = 1..=300;
pub const DURATION_RANGE: RangeInclusive<u32> = 1..=3600;

/// A validated job request, built only by [`validate_job`] or
/// [`FormSubmission::parse`].
///
/// ```compile_fail
/// use webopener::validation::JobRequest;
///
/// let request = JobRequest {
///     target_url: url::Url::parse("ftp://example.com").unwrap(),
///     delay_seconds: 0,
///     duration_seconds: 999_999,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    target_url: Url,
    delay_seconds: u32,
    duration_seconds: u32,
}

impl JobRequest {
    pub fn target_url(&self) -> &Url {
        &self.target_url
    }

    pub fn delay_seconds(&self) -> u32 {
        self.delay_seconds
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }
}

/// Raw form fields as submitted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormSubmission {
    pub url: String,
    pub delay: String,
    pub duration: String,
}

impl FormSubmission {
    pub fn parse(&self) -> Result<JobRequest, ValidationError> {
        let delay = parse_seconds(Field::Delay, &self.delay)?;
        let duration = parse_seconds(Field::Duration, &self.duration)?;
        validate_job(&self.url, delay, duration)
    }
}

fn parse_seconds(field: Field, raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        })
}

/// Validate all three job inputs, URL first.
pub fn validate_job(url: &str, delay: i64, duration: i64) -> Result<JobRequest, ValidationError> {
    let target_url = validate_url(url)?;
    let delay_seconds = in_range(delay, &DELAY_RANGE).ok_or(ValidationError::DelayOutOfRange {
        value: delay,
        min: *DELAY_RANGE.start(),
        max: *DELAY_RANGE.end(),
    })?;
    let duration_seconds =
        in_range(duration, &DURATION_RANGE).ok_or(ValidationError::DurationOutOfRange {
            value: duration,
            min: *DURATION_RANGE.start(),
            max: *DURATION_RANGE.end(),
        })?;

    Ok(JobRequest {
        target_url,
        delay_seconds,
        duration_seconds,
    })
}

fn in_range(value: i64, range: &RangeInclusive<u32>) -> Option<u32> {
    u32::try_from(value).ok().filter(|v| range.contains(v))
}

/// Accept only absolute http(s) URLs with a host
pub fn validate_url(raw: &str) -> Result<Url, ValidationError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|_| ValidationError::InvalidUrl(raw.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
    }

    // `http:example.com` parses, but the scheme must be spelled out in full
    let lower = trimmed.to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return Err(ValidationError::InvalidUrl(raw.to_string()));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::MissingHost(raw.to_string()));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_job() {
        let job = validate_job("https://example.com/dashboard", 5, 10).unwrap();
        assert_eq!(job.target_url().as_str(), "https://example.com/dashboard");
        assert_eq!(job.delay_seconds(), 5);
        assert_eq!(job.duration_seconds(), 10);
    }

    #[test]
    fn accepts_range_bounds() {
        assert!(validate_job("http://example.com", 1, 1).is_ok());
        assert!(validate_job("http://example.com", 300, 3600).is_ok());
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        assert!(matches!(
            validate_job("https://example.com", 0, 10).unwrap_err(),
            ValidationError::DelayOutOfRange { value: 0, .. }
        ));
        assert!(matches!(
            validate_job("https://example.com", 301, 10).unwrap_err(),
            ValidationError::DelayOutOfRange { .. }
        ));
        assert!(matches!(
            validate_job("https://example.com", 5, 3601).unwrap_err(),
            ValidationError::DurationOutOfRange { .. }
        ));
        assert!(matches!(
            validate_job("https://example.com", 5, -1).unwrap_err(),
            ValidationError::DurationOutOfRange { .. }
        ));
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(matches!(
            validate_url("ftp://example.com").unwrap_err(),
            ValidationError::UnsupportedScheme(scheme) if scheme == "ftp"
        ));
        assert!(matches!(
            validate_url("example.com").unwrap_err(),
            ValidationError::InvalidUrl(_)
        ));
        assert!(matches!(
            validate_url("http:example.com").unwrap_err(),
            ValidationError::InvalidUrl(_)
        ));
        assert!(validate_url("javascript:alert(1)").is_err());
    }

    #[test]
    fn url_is_checked_before_numbers() {
        let err = validate_job("ftp://example.com", 0, 0).unwrap_err();
        assert_eq!(err.field(), Field::Url);
    }

    #[test]
    fn form_fields_are_parsed() {
        let form = FormSubmission {
            url: "https://example.com".into(),
            delay: " 5 ".into(),
            duration: "10".into(),
        };
        assert_eq!(form.parse().unwrap().duration_seconds(), 10);

        let form = FormSubmission {
            delay: "soon".into(),
            ..form
        };
        assert!(matches!(
            form.parse().unwrap_err(),
            ValidationError::NotANumber { field: Field::Delay, .. }
        ));
    }
}
