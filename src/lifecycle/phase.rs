//! Life Cycle Phases & Stages
//!
//! The fixed 16-phase sequence (A1..A4, B1..B7, C1..C4, D) grouped into the
//! four stages production, use, disposal and reuse.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::TraceError;

/// RGB color as used by consumers rendering phases.
pub type Rgb = [f64; 3];

/// Color for footprints that declare no life cycle phase.
pub const UNSPECIFIED_COLOR: Rgb = [204.0, 204.0, 204.0];

/// Text for footprints that declare no life cycle phase.
pub const UNSPECIFIED_TEXT: &str = "unspecified life cycle phase";

/// One phase of a product's life cycle. Ordering follows the fixed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifeCyclePhase {
    A1,
    A2,
    A3,
    A4,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    C1,
    C2,
    C3,
    C4,
    D,
}

/// One of the four stages a phase belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifeCycleStage {
    A,
    B,
    C,
    D,
}

impl LifeCyclePhase {
    pub const SEQUENCE: [LifeCyclePhase; 16] = [
        LifeCyclePhase::A1,
        LifeCyclePhase::A2,
        LifeCyclePhase::A3,
        LifeCyclePhase::A4,
        LifeCyclePhase::B1,
        LifeCyclePhase::B2,
        LifeCyclePhase::B3,
        LifeCyclePhase::B4,
        LifeCyclePhase::B5,
        LifeCyclePhase::B6,
        LifeCyclePhase::B7,
        LifeCyclePhase::C1,
        LifeCyclePhase::C2,
        LifeCyclePhase::C3,
        LifeCyclePhase::C4,
        LifeCyclePhase::D,
    ];

    /// Position in the fixed sequence.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::SEQUENCE.get(index).copied()
    }

    pub fn code(self) -> &'static str {
        match self {
            LifeCyclePhase::A1 => "A1",
            LifeCyclePhase::A2 => "A2",
            LifeCyclePhase::A3 => "A3",
            LifeCyclePhase::A4 => "A4",
            LifeCyclePhase::B1 => "B1",
            LifeCyclePhase::B2 => "B2",
            LifeCyclePhase::B3 => "B3",
            LifeCyclePhase::B4 => "B4",
            LifeCyclePhase::B5 => "B5",
            LifeCyclePhase::B6 => "B6",
            LifeCyclePhase::B7 => "B7",
            LifeCyclePhase::C1 => "C1",
            LifeCyclePhase::C2 => "C2",
            LifeCyclePhase::C3 => "C3",
            LifeCyclePhase::C4 => "C4",
            LifeCyclePhase::D => "D",
        }
    }

    pub fn stage(self) -> LifeCycleStage {
        match self {
            LifeCyclePhase::A1 | LifeCyclePhase::A2 | LifeCyclePhase::A3 | LifeCyclePhase::A4 => {
                LifeCycleStage::A
            }
            LifeCyclePhase::B1
            | LifeCyclePhase::B2
            | LifeCyclePhase::B3
            | LifeCyclePhase::B4
            | LifeCyclePhase::B5
            | LifeCyclePhase::B6
            | LifeCyclePhase::B7 => LifeCycleStage::B,
            LifeCyclePhase::C1 | LifeCyclePhase::C2 | LifeCyclePhase::C3 | LifeCyclePhase::C4 => {
                LifeCycleStage::C
            }
            LifeCyclePhase::D => LifeCycleStage::D,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            LifeCyclePhase::A1 => "raw material supply (and upstream production)",
            LifeCyclePhase::A2 => "cradle-to-gate transport to factory",
            LifeCyclePhase::A3 => "production",
            LifeCyclePhase::A4 => "transport to final destination",
            LifeCyclePhase::B1 => "usage phase",
            LifeCyclePhase::B2 => "maintenance",
            LifeCyclePhase::B3 => "repair",
            LifeCyclePhase::B4 => "replacement",
            LifeCyclePhase::B5 => "update/upgrade, refurbishing",
            LifeCyclePhase::B6 => "usage energy consumption",
            LifeCyclePhase::B7 => "usage water consumption",
            LifeCyclePhase::C1 => "reassembly",
            LifeCyclePhase::C2 => "transport to recycler",
            LifeCyclePhase::C3 => "recycling, waste treatment",
            LifeCyclePhase::C4 => "landfill",
            LifeCyclePhase::D => "reuse",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            LifeCyclePhase::A1 => [96.0, 190.0, 182.0],
            LifeCyclePhase::A2 => [96.0, 194.0, 167.0],
            LifeCyclePhase::A3 => [96.0, 197.0, 151.0],
            LifeCyclePhase::A4 => [96.0, 201.0, 132.0],
            LifeCyclePhase::B1 => [97.0, 204.0, 113.0],
            LifeCyclePhase::B2 => [96.0, 207.0, 91.0],
            LifeCyclePhase::B3 => [97.0, 210.0, 69.0],
            LifeCyclePhase::B4 => [97.0, 211.0, 56.0],
            LifeCyclePhase::B5 => [97.0, 213.0, 43.0],
            LifeCyclePhase::B6 => [106.0, 216.0, 36.0],
            LifeCyclePhase::B7 => [120.0, 219.0, 37.0],
            LifeCyclePhase::C1 => [135.0, 222.0, 36.0],
            LifeCyclePhase::C2 => [153.0, 226.0, 35.0],
            LifeCyclePhase::C3 => [173.0, 228.0, 34.0],
            LifeCyclePhase::C4 => [195.0, 232.0, 33.0],
            LifeCyclePhase::D => [219.0, 236.0, 34.0],
        }
    }

    /// Every phase between `self` and `other`, inclusive, in sequence order.
    /// Direction does not matter.
    pub fn range_to(self, other: LifeCyclePhase) -> &'static [LifeCyclePhase] {
        let (low, high) = if self.index() <= other.index() {
            (self.index(), other.index())
        } else {
            (other.index(), self.index())
        };
        &Self::SEQUENCE[low..=high]
    }
}

impl fmt::Display for LifeCyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LifeCyclePhase {
    type Err = TraceError;

    /// Strict parsing of a single code. Only the first two characters are
    /// considered, so `"a3 (production)"` yields `A3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let head: String = s.trim().chars().take(2).collect::<String>().to_uppercase();
        if let Some(phase) = Self::SEQUENCE.iter().find(|p| p.code() == head) {
            return Ok(*phase);
        }
        if head.starts_with('D') {
            return Ok(LifeCyclePhase::D);
        }
        Err(TraceError::InvalidLifeCyclePhase(head))
    }
}

impl LifeCycleStage {
    pub const SEQUENCE: [LifeCycleStage; 4] = [
        LifeCycleStage::A,
        LifeCycleStage::B,
        LifeCycleStage::C,
        LifeCycleStage::D,
    ];

    pub fn code(self) -> &'static str {
        match self {
            LifeCycleStage::A => "A",
            LifeCycleStage::B => "B",
            LifeCycleStage::C => "C",
            LifeCycleStage::D => "D",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            LifeCycleStage::A => "production",
            LifeCycleStage::B => "use",
            LifeCycleStage::C => "disposal",
            LifeCycleStage::D => "reuse",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            LifeCycleStage::A => [96.0, 190.0, 182.0],
            LifeCycleStage::B => [96.0, 210.0, 69.0],
            LifeCycleStage::C => [153.0, 226.0, 35.0],
            LifeCycleStage::D => [219.0, 236.0, 34.0],
        }
    }

    /// Phases of this stage in sequence order.
    pub fn phases(self) -> Vec<LifeCyclePhase> {
        LifeCyclePhase::SEQUENCE
            .iter()
            .copied()
            .filter(|p| p.stage() == self)
            .collect()
    }
}

/// All phases grouped by stage.
pub fn phases_by_stage() -> BTreeMap<LifeCycleStage, Vec<LifeCyclePhase>> {
    LifeCycleStage::SEQUENCE
        .iter()
        .map(|stage| (*stage, stage.phases()))
        .collect()
}

impl fmt::Display for LifeCycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
