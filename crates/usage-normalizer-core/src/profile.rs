//! Home characteristics.
//!
//! The flat distribution does not read any of these fields. The profile is
//! threaded through every distribution call so a shaped model can use it
//! later without changing signatures.

use serde::{Deserialize, Serialize};

/// Wall and attic insulation quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsulationLevel {
    Poor,
    Standard,
    Good,
    Excellent,
}

/// Window glazing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    Single,
    Double,
    Triple,
}

/// Optional hints about the home a usage series belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_feet: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_age_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stories: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insulation: Option<InsulationLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_type: Option<WindowType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foundation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led_lights: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart_thermostat: Option<bool>,
    /// Cooling setpoint in °F
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summer_setpoint_f: Option<i32>,
    /// Heating setpoint in °F
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winter_setpoint_f: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupants_work: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupants_school: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupants_home: Option<u32>,
}

impl HomeProfile {
    /// True when no characteristic has been provided.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Total occupants across work, school and at-home groups, if any were given.
    pub fn occupants(&self) -> Option<u32> {
        let counts = [self.occupants_work, self.occupants_school, self.occupants_home];
        if counts.iter().all(Option::is_none) {
            return None;
        }
        Some(counts.iter().flatten().sum())
    }
}
