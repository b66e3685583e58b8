use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The eight compass points used for dwelling and opening orientations in SAP
/// assessment XML. Variants are declared in clockwise order from North so that
/// the name↔angle mapping is a bijection by construction.
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq)]
pub enum Direction {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Direction {
    /// Compass angle in degrees clockwise from North (0, 45, ..., 315).
    pub const fn angle(self) -> u16 {
        (self as u16) * 45
    }

    /// Inverse of [`Direction::angle`]. Only the eight canonical angles
    /// resolve; anything else yields `None`.
    pub fn from_angle(angle: u16) -> Option<Self> {
        if angle % 45 != 0 {
            return None;
        }
        Direction::iter().nth((angle / 45) as usize)
    }
}

/// Expands a short compass form (N, NE, E, SE, S, SW, W, NW) to its long name.
///
/// Matching is ASCII case-insensitive so schedule cells like `ne` or `Ne`
/// resolve; any other token (including an already-long name) passes through
/// unchanged, which makes the expansion idempotent.
pub fn expand_abbreviation(token: &str) -> &str {
    match token.to_ascii_uppercase().as_str() {
        "N" => "North",
        "NE" => "Northeast",
        "E" => "East",
        "SE" => "Southeast",
        "S" => "South",
        "SW" => "Southwest",
        "W" => "West",
        "NW" => "Northwest",
        _ => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::str::FromStr;

    #[rstest]
    fn angles_and_names_are_a_bijection() {
        for direction in Direction::iter() {
            assert_eq!(Direction::from_angle(direction.angle()), Some(direction));
        }
    }

    #[rstest]
    #[case(0, Some(Direction::North))]
    #[case(135, Some(Direction::Southeast))]
    #[case(315, Some(Direction::Northwest))]
    #[case(360, None)]
    #[case(90, Some(Direction::East))]
    #[case(100, None)]
    fn from_angle_resolves_only_canonical_angles(
        #[case] angle: u16,
        #[case] expected: Option<Direction>,
    ) {
        assert_eq!(Direction::from_angle(angle), expected);
    }

    #[rstest]
    fn long_names_round_trip_through_display_and_from_str() {
        for direction in Direction::iter() {
            assert_eq!(
                Direction::from_str(&direction.to_string()).unwrap(),
                direction
            );
        }
    }

    #[rstest]
    #[case("N", "North")]
    #[case("SW", "Southwest")]
    #[case("ne", "Northeast")]
    #[case("Se", "Southeast")]
    #[case("North", "North")]
    #[case("gibberish", "gibberish")]
    #[case("", "")]
    fn expands_abbreviations_and_passes_everything_else_through(
        #[case] token: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(expand_abbreviation(token), expected);
    }

    #[rstest]
    #[case("NW")]
    #[case("Northwest")]
    #[case("not a direction")]
    fn expansion_is_idempotent(#[case] token: &str) {
        let once = expand_abbreviation(token);
        assert_eq!(expand_abbreviation(once), once);
    }
}
