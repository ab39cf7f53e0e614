//! Crop validation and conversion to an inset clip.

use rv_common::{ElementId, InsetRect};

use crate::error::{EvalResult, TimelineEvalError};
use crate::types::Crop;

/// Convert a crop (percent per side) into an inset clip.
///
/// Returns `Ok(None)` for an all-zero crop. Out-of-range values and
/// conflicting sides are rejected rather than clamped.
pub fn crop_region(element_id: &ElementId, crop: &Crop) -> EvalResult<Option<InsetRect>> {
    let sides = [crop.left, crop.right, crop.top, crop.bottom];

    if sides.iter().any(|v| !(0.0..=100.0).contains(v)) {
        return Err(TimelineEvalError::InvalidCropSpec {
            element_id: element_id.clone(),
            reason: format!(
                "percentages out of range: L={} R={} T={} B={}",
                crop.left, crop.right, crop.top, crop.bottom
            ),
        });
    }
    if crop.left + crop.right >= 100.0 || crop.top + crop.bottom >= 100.0 {
        return Err(TimelineEvalError::InvalidCropSpec {
            element_id: element_id.clone(),
            reason: format!(
                "total crop reaches 100%: L+R={} T+B={}",
                crop.left + crop.right,
                crop.top + crop.bottom
            ),
        });
    }

    if sides.iter().all(|v| *v == 0.0) {
        return Ok(None);
    }

    Ok(Some(InsetRect::new(
        crop.top / 100.0,
        crop.right / 100.0,
        crop.bottom / 100.0,
        crop.left / 100.0,
    )))
}
