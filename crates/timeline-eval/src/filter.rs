//! Mapping of segment filters to renderer filter descriptors.
//!
//! Color filters become [`FilterDesc`]s. `rotate` and `flip` are transform
//! filters: they adjust the element transform instead.

use rv_common::{FilterDesc, FlipAxis};
use tracing::debug;

use crate::types::FilterSpec;

/// Result of mapping a segment's filter list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MappedFilters {
    /// Color filters, in declaration order.
    pub filters: Vec<FilterDesc>,
    /// Degrees from a `rotate` filter (first one wins).
    pub rotation: Option<f32>,
    /// Axis from a `flip` filter (first one wins).
    pub flip: Option<FlipAxis>,
}

impl MappedFilters {
    /// Scale multipliers implied by the flip filter.
    pub fn flip_scale(&self) -> [f32; 2] {
        match self.flip {
            Some(FlipAxis::Horizontal) => [-1.0, 1.0],
            Some(FlipAxis::Vertical) => [1.0, -1.0],
            None => [1.0, 1.0],
        }
    }
}

pub fn map_filters(specs: &[FilterSpec]) -> MappedFilters {
    let mut mapped = MappedFilters::default();

    for spec in specs {
        let name = spec.name.trim().to_ascii_lowercase();
        match name.as_str() {
            "rotate" => {
                if mapped.rotation.is_none() {
                    mapped.rotation = spec.value.as_f32().map(f32::trunc);
                }
            }
            "flip" => {
                if mapped.flip.is_none() {
                    mapped.flip = spec.value.as_str().and_then(FlipAxis::parse);
                }
            }
            _ => match color_filter(&name, spec) {
                Some(desc) => mapped.filters.push(desc),
                None => debug!(filter = %spec.name, "Ignoring unsupported filter"),
            },
        }
    }

    mapped
}

fn color_filter(name: &str, spec: &FilterSpec) -> Option<FilterDesc> {
    let v = spec.value.as_f32()?;
    match name {
        // Stored as an offset from neutral.
        "brightness" => Some(FilterDesc::Brightness(v + 1.0)),
        "contrast" => Some(FilterDesc::Contrast(v)),
        "saturation" => Some(FilterDesc::Saturate(v)),
        "hue" => Some(FilterDesc::HueRotate(v.trunc() as i32)),
        "grayscale" if v > 0.0 => Some(FilterDesc::Grayscale),
        "invert" if v > 0.0 => Some(FilterDesc::Invert),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_filters_map_in_order() {
        let specs = vec![
            FilterSpec::new("brightness", 0.2),
            FilterSpec::new("contrast", 1.5),
            FilterSpec::new("saturation", 0.0),
            FilterSpec::new("hue", 45.7),
            FilterSpec::new("grayscale", 1.0),
            FilterSpec::new("invert", 0.0),
        ];
        let mapped = map_filters(&specs);
        match mapped.filters[0] {
            FilterDesc::Brightness(v) => assert!((v - 1.2).abs() < 1e-6),
            ref other => panic!("expected brightness, got {other:?}"),
        }
        assert_eq!(
            mapped.filters[1..],
            [
                FilterDesc::Contrast(1.5),
                FilterDesc::Saturate(0.0),
                FilterDesc::HueRotate(45),
                FilterDesc::Grayscale,
            ]
        );
    }

    #[test]
    fn transform_filters() {
        let specs = vec![
            FilterSpec::new("rotate", "90"),
            FilterSpec::new("flip", "horizontal"),
            FilterSpec::new("flip", "vertical"),
        ];
        let mapped = map_filters(&specs);
        assert!(mapped.filters.is_empty());
        assert_eq!(mapped.rotation, Some(90.0));
        assert_eq!(mapped.flip, Some(FlipAxis::Horizontal));
        assert_eq!(mapped.flip_scale(), [-1.0, 1.0]);
    }

    #[test]
    fn unknown_filters_ignored() {
        let mapped = map_filters(&[FilterSpec::new("sepia", 1.0), FilterSpec::new("blur", "x")]);
        assert_eq!(mapped, MappedFilters::default());
    }
}
