//! Tissue classification of a voxel.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// What kind of lung tissue a voxel holds.
///
/// Molecule initial locations and sources, and agent placement rules, are
/// expressed as sets of tissue types.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
#[repr(u8)]
pub enum TissueType {
    Air = 0,
    Blood = 1,
    Epithelium = 2,
    Surfactant = 3,
    #[default]
    Other = 4,
}

impl TissueType {
    pub const ALL: [TissueType; 5] = [
        TissueType::Air,
        TissueType::Blood,
        TissueType::Epithelium,
        TissueType::Surfactant,
        TissueType::Other,
    ];

    /// Compact numeric code used in field dumps.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for TissueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TissueType::Air        => "AIR",
            TissueType::Blood      => "BLOOD",
            TissueType::Epithelium => "EPITHELIUM",
            TissueType::Surfactant => "SURFACTANT",
            TissueType::Other      => "OTHER",
        };
        f.write_str(s)
    }
}

impl FromStr for TissueType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AIR"        => Ok(TissueType::Air),
            "BLOOD"      => Ok(TissueType::Blood),
            "EPITHELIUM" => Ok(TissueType::Epithelium),
            "SURFACTANT" => Ok(TissueType::Surfactant),
            "OTHER"      => Ok(TissueType::Other),
            _            => Err(CoreError::UnknownTissue(s.to_owned())),
        }
    }
}
