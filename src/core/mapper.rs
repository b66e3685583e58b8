//! Applies one validated schedule row to one parsed assessment document.
//!
//! SAP XML sections are optional, so every write here is guarded by slot
//! presence: a mutation whose target element is absent is a no-op, and no
//! element is ever created.

use crate::core::compass::Direction;
use crate::core::normalize::{normalize_orientation, normalize_property_type, normalize_roof_pitch};
use crate::core::transform::{mirror, rotate, rotation_delta};
use crate::schedule::PlotRow;
use crate::xml_doc::{Element, XmlDocument};
use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;

lazy_static! {
    // Matches the handedness marker in a house-type reference: either a
    // parenthesized suffix like "(AS)" or the standalone token "AS".
    static ref HANDEDNESS_MARKER: Regex = Regex::new(r"\(.*?\)|\bAS\b").unwrap();
}

/// Rewrites `document` in place according to `row`.
pub fn apply_row(row: &PlotRow, document: &mut XmlDocument) {
    apply_assessment_fields(row, document);
    apply_orientation_rewrite(row, document);
    apply_plot_fields(row, document);
}

fn apply_assessment_fields(row: &PlotRow, document: &mut XmlDocument) {
    let Some(assessment) = document.root_mut().child_mut("Assessment") else {
        return;
    };

    if let Some(property_type) = normalize_property_type(row.connotation.as_deref()) {
        if let Some(slot) = assessment.child_mut("PropertyType2") {
            slot.set_text(property_type.label());
        }
    }

    if let Some(raw) = row.sheltered_sides.as_deref() {
        // Schedule cells arrive as floats ("2.0"); the XML wants an integer.
        // Non-finite values ("nan", "inf") count as parse failures, not zero.
        let count = raw.trim().parse::<f64>().ok().filter(|count| count.is_finite());
        if let Some(count) = count {
            if let Some(slot) = assessment.child_mut("ShelteredSides") {
                slot.set_text((count as i64).to_string());
            }
        }
    }

    if let Some(plot_number) = row.plot_number.as_deref() {
        if let Some(slot) = assessment.child_mut("Reference") {
            slot.set_text(plot_number.trim());
        }
    }
}

fn apply_orientation_rewrite(row: &PlotRow, document: &mut XmlDocument) {
    let new_orientation = normalize_orientation(Some(row.dwelling_orientation.as_str()));
    let original = {
        let Some(slot) = document
            .root_mut()
            .child_mut("Assessment")
            .and_then(|assessment| assessment.child_mut("DwellingOrientation"))
        else {
            return;
        };
        let original = match slot.text() {
            Some(text) if !text.is_empty() => text.trim().to_string(),
            _ => return,
        };
        slot.set_text(new_orientation.clone());
        original
    };

    // Rotation, PV rewrites and mirroring only make sense when both the
    // modelled and the as-built orientations are on the compass grid. When
    // either is not, the raw new value stays written above and the
    // sub-elements are left alone (a documented partial update).
    let (Ok(original_direction), Ok(new_direction)) = (
        Direction::from_str(&original),
        Direction::from_str(&new_orientation),
    ) else {
        return;
    };

    let delta = rotation_delta(original_direction, new_direction);
    for opening in document.root_mut().find_all_mut(&["Openings", "Opening"]) {
        rewrite_recognized_orientation(opening, |value| rotate(value, delta));
    }

    // PV orientation comes straight from the schedule rather than from the
    // dwelling rotation; pitch is only written when it normalizes to a code
    // the XML accepts.
    let pv_orientation = normalize_orientation(row.roof_orientation.as_deref());
    let pv_pitch = normalize_roof_pitch(row.roof_pitch.as_deref());
    for unit in document
        .root_mut()
        .find_all_mut(&["PhotovoltaicUnits", "PhotovoltaicUnit"])
    {
        if let Some(slot) = unit.child_mut("Orientation") {
            slot.set_text(pv_orientation.clone());
        }
        if let (Some(slot), Some(pitch)) = (unit.child_mut("Elevation"), pv_pitch.as_deref()) {
            slot.set_text(pitch);
        }
    }

    if row.handedness.is_opposite() {
        for opening in document.root_mut().find_all_mut(&["Openings", "Opening"]) {
            rewrite_recognized_orientation(opening, |value| mirror(value, new_direction));
        }
    }
}

fn rewrite_recognized_orientation(opening: &mut Element, transform: impl Fn(&str) -> String) {
    if let Some(slot) = opening.child_mut("Orientation") {
        if let Some(value) = slot.text() {
            if Direction::from_str(&value).is_ok() {
                slot.set_text(transform(&value));
            }
        }
    }
}

fn apply_plot_fields(row: &PlotRow, document: &mut XmlDocument) {
    let Some(plot) = document.root_mut().child_mut("Plot") else {
        return;
    };

    if !row.plot_reference.trim().is_empty() {
        if let Some(slot) = plot.child_mut("Reference") {
            slot.set_text(row.plot_reference.trim());
        }
    }

    let mut final_type_reference = None;
    if let Some(slot) = plot.child_mut("TypeReference") {
        let original = slot.text().unwrap_or_default();
        let updated = if row.handedness.is_opposite() {
            if HANDEDNESS_MARKER.is_match(&original) {
                HANDEDNESS_MARKER.replace_all(&original, "(OP)").into_owned()
            } else {
                format!("{} (OP)", original.trim())
            }
        } else {
            original
        };
        slot.set_text(updated.clone());
        final_type_reference = Some(updated);
    }

    if let (Some(slot), Some(type_reference)) =
        (plot.child_mut("HouseNumber"), final_type_reference.as_deref())
    {
        if !type_reference.is_empty() {
            slot.set_text(type_reference);
        }
    }

    if let Some(plot_number) = row.plot_number.as_deref() {
        if let Some(slot) = plot.child_mut("HouseName") {
            slot.set_text(plot_number.trim());
        }
    }
}
