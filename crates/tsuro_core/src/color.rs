//! Player colors.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The fixed palette of player colors, in assignment order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    /// First player in turn order.
    White,
    /// Second player in turn order.
    Black,
    /// Third player in turn order.
    Red,
    /// Fourth player in turn order.
    Green,
    /// Fifth player in turn order.
    Blue,
}
