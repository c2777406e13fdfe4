//! Satellite identifiers of the XRS instrument family.
use strum_macros::{Display, EnumIter, EnumString};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [Satellite] identifies the spacecraft carrying the XRS sensor pair.
/// Parses the common spellings: `"GOES-08"`, `"GOES08"` and `"G08"`
/// all designate [Satellite::Goes08]. Serde uses the same string
/// representation as [std::fmt::Display] and [std::str::FromStr],
/// so serialized data and the reference flat files agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Display, EnumString, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "String", try_from = "String"))]
pub enum Satellite {
    #[strum(to_string = "GOES-08", serialize = "GOES08", serialize = "G08")]
    Goes08,
    #[strum(to_string = "GOES-09", serialize = "GOES09", serialize = "G09")]
    Goes09,
    #[strum(to_string = "GOES-10", serialize = "GOES10", serialize = "G10")]
    Goes10,
    #[strum(to_string = "GOES-11", serialize = "GOES11", serialize = "G11")]
    Goes11,
    #[strum(to_string = "GOES-12", serialize = "GOES12", serialize = "G12")]
    Goes12,
    #[strum(to_string = "GOES-13", serialize = "GOES13", serialize = "G13")]
    Goes13,
    #[strum(to_string = "GOES-14", serialize = "GOES14", serialize = "G14")]
    Goes14,
    #[strum(to_string = "GOES-15", serialize = "GOES15", serialize = "G15")]
    Goes15,
    #[strum(to_string = "GOES-16", serialize = "GOES16", serialize = "G16")]
    Goes16,
    #[strum(to_string = "GOES-17", serialize = "GOES17", serialize = "G17")]
    Goes17,
    #[strum(to_string = "GOES-18", serialize = "GOES18", serialize = "G18")]
    Goes18,
}

impl From<Satellite> for String {
    fn from(satellite: Satellite) -> String {
        satellite.to_string()
    }
}

impl std::convert::TryFrom<String> for Satellite {
    type Error = strum::ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        use std::str::FromStr;
        Self::from_str(&s)
    }
}
