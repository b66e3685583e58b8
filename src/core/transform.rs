//! Angular arithmetic for re-aligning a dwelling and its orientation-bearing
//! sub-elements from the orientation it was modelled at to the orientation the
//! plot schedule says it is actually built at.

use crate::core::compass::Direction;
use std::str::FromStr;

/// Degrees to add (clockwise, mod 360) to every orientation in a document to
/// re-align it from `original` to `new`.
pub fn rotation_delta(original: Direction, new: Direction) -> u16 {
    (new.angle() + 360 - original.angle()) % 360
}

/// Rotates an orientation value by `delta` degrees on the 45° compass grid.
/// Values outside the eight recognized directions are returned unchanged.
pub fn rotate(value: &str, delta: u16) -> String {
    let Ok(direction) = Direction::from_str(value) else {
        return value.to_string();
    };
    match Direction::from_angle((direction.angle() + delta) % 360) {
        Some(rotated) => rotated.to_string(),
        None => value.to_string(),
    }
}

/// Reflects an orientation value about the front-back axis of a dwelling
/// facing `axis`, i.e. swaps the dwelling's left and right sides. Used for
/// opposite-hand house-type variants. Values outside the eight recognized
/// directions are returned unchanged.
pub fn mirror(value: &str, axis: Direction) -> String {
    let Ok(direction) = Direction::from_str(value) else {
        return value.to_string();
    };
    let local = (direction.angle() + 360 - axis.angle()) % 360;
    let mirrored_local = (360 - local) % 360;
    let mirrored_global = (mirrored_local + axis.angle()) % 360;
    match Direction::from_angle(mirrored_global) {
        Some(mirrored) => mirrored.to_string(),
        None => value.to_string(),
    }
}
