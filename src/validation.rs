//! Caller-facing parameter validation.
//!
//! The request builder and gateway pass quality and speed through unchanged;
//! the CLI and tool surfaces call these before reaching the core.

use std::ops::RangeInclusive;

use crate::{Error, ErrorContext, Result};

/// Denoising steps accepted by the service.
pub const QUALITY_RANGE: RangeInclusive<u32> = 1..=20;

/// Speech speed factors accepted by the service.
pub const SPEED_RANGE: RangeInclusive<f32> = 0.5..=2.0;

pub fn validate_quality(quality: u32) -> Result<u32> {
    if !QUALITY_RANGE.contains(&quality) {
        return Err(Error::invalid_parameter_with_context(
            format!(
                "quality must be between {} and {}",
                QUALITY_RANGE.start(),
                QUALITY_RANGE.end()
            ),
            ErrorContext::new()
                .with_field_path("quality")
                .with_details(format!("got {}", quality))
                .with_source("parameter_validator"),
        ));
    }
    Ok(quality)
}

pub fn validate_speed(speed: f32) -> Result<f32> {
    // NaN fails `contains`, so it is rejected here too.
    if !SPEED_RANGE.contains(&speed) {
        return Err(Error::invalid_parameter_with_context(
            format!(
                "speed must be between {} and {}",
                SPEED_RANGE.start(),
                SPEED_RANGE.end()
            ),
            ErrorContext::new()
                .with_field_path("speed")
                .with_details(format!("got {}", speed))
                .with_source("parameter_validator"),
        ));
    }
    Ok(speed)
}

/// Validate whichever of the two knobs the caller supplied.
pub fn validate_knobs(quality: Option<u32>, speed: Option<f32>) -> Result<()> {
    if let Some(q) = quality {
        validate_quality(q)?;
    }
    if let Some(s) = speed {
        validate_speed(s)?;
    }
    Ok(())
}
