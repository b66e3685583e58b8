use crate::core::compass::expand_abbreviation;

/// Property type classifications the schedule's "Connotation" column can set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PropertyType {
    EndTerrace,
    SemiDetached,
}

impl PropertyType {
    /// The long-form label written into `Assessment/PropertyType2`.
    pub fn label(self) -> &'static str {
        match self {
            PropertyType::EndTerrace => "EndTerrace",
            PropertyType::SemiDetached => "SemiDetached",
        }
    }
}

/// Whether a plot is built as drawn or as the opposite-hand (mirrored)
/// variant of its house type. Anything other than an explicit "OP" in the
/// schedule, including an absent cell, is treated as as-drawn.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Handedness {
    #[default]
    AsDrawn,
    Opposite,
}

impl Handedness {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("OP") => Handedness::Opposite,
            _ => Handedness::AsDrawn,
        }
    }

    pub fn is_opposite(self) -> bool {
        matches!(self, Handedness::Opposite)
    }
}

/// Canonicalizes a free-text orientation cell: whitespace is stripped
/// (internal spaces included), the token is capitalized, and short compass
/// forms are expanded to their long names.
///
/// The result is not validated against the eight recognized directions;
/// callers that need angle arithmetic must check membership themselves.
pub fn normalize_orientation(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let compact: String = raw.split_whitespace().collect();
    if compact.is_empty() {
        return String::new();
    }
    expand_abbreviation(&capitalize(&compact)).to_string()
}

/// Maps a roof-pitch cell to the code the SAP XML expects in a PV unit's
/// Elevation field: "horizontal"/"vertical" capitalize literally, while the
/// numeric pitches 30, 45 and 60 become underscore-prefixed codes. Any other
/// value yields `None`, meaning "nothing to set" rather than an error.
pub fn normalize_roof_pitch(raw: Option<&str>) -> Option<String> {
    let lowered = raw?.trim().to_lowercase();
    match lowered.as_str() {
        "" => None,
        "horizontal" => Some("Horizontal".to_string()),
        "vertical" => Some("Vertical".to_string()),
        _ => {
            let pitch = lowered.parse::<f64>().ok()? as i64;
            matches!(pitch, 30 | 45 | 60).then(|| format!("_{pitch}"))
        }
    }
}

/// Maps a "Connotation" cell to a [`PropertyType`]. Only the exact tokens
/// END and SEMI (after trimming, case-insensitive) resolve; anything else
/// leaves the document's existing property type untouched.
pub fn normalize_property_type(raw: Option<&str>) -> Option<PropertyType> {
    match raw?.trim().to_ascii_uppercase().as_str() {
        "END" => Some(PropertyType::EndTerrace),
        "SEMI" => Some(PropertyType::SemiDetached),
        _ => None,
    }
}

// First character uppercased, remainder lowercased, as for orientation cells
// like "SOUTH" or "south East".
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(None, "")]
    #[case(Some(""), "")]
    #[case(Some("   "), "")]
    #[case(Some("N"), "North")]
    #[case(Some(" sw "), "Southwest")]
    #[case(Some("south"), "South")]
    #[case(Some("SOUTH EAST"), "Southeast")]
    #[case(Some("North"), "North")]
    #[case(Some("sideways"), "Sideways")]
    fn normalizes_orientation_cells(#[case] raw: Option<&str>, #[case] expected: &str) {
        assert_eq!(normalize_orientation(raw), expected);
    }

    #[rstest]
    #[case(Some("horizontal"), Some("Horizontal"))]
    #[case(Some(" VERTICAL "), Some("Vertical"))]
    #[case(Some("30"), Some("_30"))]
    #[case(Some("45.0"), Some("_45"))]
    #[case(Some("60"), Some("_60"))]
    #[case(Some("40"), None)]
    #[case(Some("45.5"), Some("_45"))]
    #[case(Some("steep"), None)]
    #[case(Some(""), None)]
    #[case(None, None)]
    fn normalizes_roof_pitch_cells(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(normalize_roof_pitch(raw).as_deref(), expected);
    }

    #[rstest]
    #[case(Some("END"), Some(PropertyType::EndTerrace))]
    #[case(Some(" end "), Some(PropertyType::EndTerrace))]
    #[case(Some("Semi"), Some(PropertyType::SemiDetached))]
    #[case(Some("MID"), None)]
    #[case(None, None)]
    fn normalizes_property_type_cells(
        #[case] raw: Option<&str>,
        #[case] expected: Option<PropertyType>,
    ) {
        assert_eq!(normalize_property_type(raw), expected);
    }

    #[rstest]
    #[case(Some("OP"), Handedness::Opposite)]
    #[case(Some(" op "), Handedness::Opposite)]
    #[case(Some("AS"), Handedness::AsDrawn)]
    #[case(Some("mystery"), Handedness::AsDrawn)]
    #[case(None, Handedness::AsDrawn)]
    fn defaults_handedness_to_as_drawn(#[case] raw: Option<&str>, #[case] expected: Handedness) {
        assert_eq!(Handedness::from_raw(raw), expected);
    }
}
