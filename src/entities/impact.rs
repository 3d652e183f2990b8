//! Impact vectors, life cycle stages and GWP impact categories
//!
//! Every stage calculator produces an [`Impact`]: one value per GWP channel,
//! in kg CO2-eq. Five of them (A1..A5) make up a [`StageImpacts`] record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul};

/// Life cycle stage (EN 15804 product and construction stages)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Raw material supply / production
    A1,
    /// Transport of raw materials to the plant
    A2,
    /// Manufacturing energy at the plant
    A3,
    /// Transport of the product to site
    A4,
    /// Construction equipment on site
    A5,
}

impl Stage {
    pub const ALL: [Stage; 5] = [Stage::A1, Stage::A2, Stage::A3, Stage::A4, Stage::A5];

    /// Stage code as used in exported records ("A1".."A5")
    pub fn code(self) -> &'static str {
        match self {
            Stage::A1 => "A1",
            Stage::A2 => "A2",
            Stage::A3 => "A3",
            Stage::A4 => "A4",
            Stage::A5 => "A5",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Stage::A1 => "material production",
            Stage::A2 => "raw material transport",
            Stage::A3 => "manufacturing",
            Stage::A4 => "transport to site",
            Stage::A5 => "construction",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// GWP impact category (channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    GwpTotal,
    GwpFossil,
    GwpBiogenic,
    GwpLuluc,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::GwpTotal,
        Category::GwpFossil,
        Category::GwpBiogenic,
        Category::GwpLuluc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::GwpTotal => "gwp_total",
            Category::GwpFossil => "gwp_fossil",
            Category::GwpBiogenic => "gwp_biogenic",
            Category::GwpLuluc => "gwp_luluc",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One value per GWP channel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Impact {
    pub gwp_total: f64,
    pub gwp_fossil: f64,
    pub gwp_biogenic: f64,
    pub gwp_luluc: f64,
}

impl Impact {
    pub const ZERO: Impact = Impact {
        gwp_total: 0.0,
        gwp_fossil: 0.0,
        gwp_biogenic: 0.0,
        gwp_luluc: 0.0,
    };

    pub fn new(gwp_total: f64, gwp_fossil: f64, gwp_biogenic: f64, gwp_luluc: f64) -> Self {
        Self {
            gwp_total,
            gwp_fossil,
            gwp_biogenic,
            gwp_luluc,
        }
    }

    /// Build from four values in category order (total, fossil, biogenic, luluc)
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [total, fossil, biogenic, luluc] => Some(Self::new(*total, *fossil, *biogenic, *luluc)),
            _ => None,
        }
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::GwpTotal => self.gwp_total,
            Category::GwpFossil => self.gwp_fossil,
            Category::GwpBiogenic => self.gwp_biogenic,
            Category::GwpLuluc => self.gwp_luluc,
        }
    }

    /// Values in category order
    pub fn to_array(&self) -> [f64; 4] {
        [self.gwp_total, self.gwp_fossil, self.gwp_biogenic, self.gwp_luluc]
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

impl Add for Impact {
    type Output = Impact;

    fn add(self, rhs: Impact) -> Impact {
        Impact::new(
            self.gwp_total + rhs.gwp_total,
            self.gwp_fossil + rhs.gwp_fossil,
            self.gwp_biogenic + rhs.gwp_biogenic,
            self.gwp_luluc + rhs.gwp_luluc,
        )
    }
}

impl AddAssign for Impact {
    fn add_assign(&mut self, rhs: Impact) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for Impact {
    type Output = Impact;

    fn mul(self, rhs: f64) -> Impact {
        Impact::new(
            self.gwp_total * rhs,
            self.gwp_fossil * rhs,
            self.gwp_biogenic * rhs,
            self.gwp_luluc * rhs,
        )
    }
}

impl Div<f64> for Impact {
    type Output = Impact;

    fn div(self, rhs: f64) -> Impact {
        Impact::new(
            self.gwp_total / rhs,
            self.gwp_fossil / rhs,
            self.gwp_biogenic / rhs,
            self.gwp_luluc / rhs,
        )
    }
}

impl Sum for Impact {
    fn sum<I: Iterator<Item = Impact>>(iter: I) -> Impact {
        iter.fold(Impact::ZERO, |acc, x| acc + x)
    }
}

/// Impact of all five stages for one layer (or one design option)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StageImpacts {
    pub a1: Impact,
    pub a2: Impact,
    pub a3: Impact,
    pub a4: Impact,
    pub a5: Impact,
}

impl StageImpacts {
    pub const ZERO: StageImpacts = StageImpacts {
        a1: Impact::ZERO,
        a2: Impact::ZERO,
        a3: Impact::ZERO,
        a4: Impact::ZERO,
        a5: Impact::ZERO,
    };

    pub fn get(&self, stage: Stage) -> Impact {
        match stage {
            Stage::A1 => self.a1,
            Stage::A2 => self.a2,
            Stage::A3 => self.a3,
            Stage::A4 => self.a4,
            Stage::A5 => self.a5,
        }
    }

    pub fn set(&mut self, stage: Stage, impact: Impact) {
        match stage {
            Stage::A1 => self.a1 = impact,
            Stage::A2 => self.a2 = impact,
            Stage::A3 => self.a3 = impact,
            Stage::A4 => self.a4 = impact,
            Stage::A5 => self.a5 = impact,
        }
    }

    /// Sum over all five stages
    pub fn total(&self) -> Impact {
        Stage::ALL.iter().map(|s| self.get(*s)).sum()
    }

    /// Apply `f` to every stage, producing a new record
    pub fn map(&self, f: impl Fn(Impact) -> Impact) -> StageImpacts {
        StageImpacts {
            a1: f(self.a1),
            a2: f(self.a2),
            a3: f(self.a3),
            a4: f(self.a4),
            a5: f(self.a5),
        }
    }
}

impl Add for StageImpacts {
    type Output = StageImpacts;

    fn add(self, rhs: StageImpacts) -> StageImpacts {
        StageImpacts {
            a1: self.a1 + rhs.a1,
            a2: self.a2 + rhs.a2,
            a3: self.a3 + rhs.a3,
            a4: self.a4 + rhs.a4,
            a5: self.a5 + rhs.a5,
        }
    }
}

impl Sum for StageImpacts {
    fn sum<I: Iterator<Item = StageImpacts>>(iter: I) -> StageImpacts {
        iter.fold(StageImpacts::ZERO, |acc, x| acc + x)
    }
}
