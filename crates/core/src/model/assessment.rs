use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssessmentParseError {
    #[error("invalid level {0:?} (expected high, medium or low)")]
    Level(String),
    #[error("invalid sugar craving {0:?} (expected constant, frequent, little or none)")]
    SugarCraving(String),
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Three-step self-assessment used for body-weight perception and energy.
///
/// Older stores wrote the Spanish labels, which are still accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[serde(alias = "alta")]
    High,
    #[serde(alias = "media")]
    Medium,
    #[serde(alias = "baja")]
    Low,
}

impl Level {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::High => "high",
            Level::Medium => "medium",
            Level::Low => "low",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = AssessmentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "alta" => Ok(Level::High),
            "medium" | "media" => Ok(Level::Medium),
            "low" | "baja" => Ok(Level::Low),
            _ => Err(AssessmentParseError::Level(s.to_string())),
        }
    }
}

//
// ─── SUGAR CRAVING ─────────────────────────────────────────────────────────────
//

/// How often sugar cravings showed up during the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SugarCraving {
    #[serde(alias = "permanente")]
    Constant,
    #[serde(alias = "frecuente")]
    Frequent,
    #[serde(alias = "poco")]
    Little,
    #[serde(alias = "nada")]
    None,
}

impl SugarCraving {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SugarCraving::Constant => "constant",
            SugarCraving::Frequent => "frequent",
            SugarCraving::Little => "little",
            SugarCraving::None => "none",
        }
    }
}

impl fmt::Display for SugarCraving {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SugarCraving {
    type Err = AssessmentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "constant" | "permanente" => Ok(SugarCraving::Constant),
            "frequent" | "frecuente" => Ok(SugarCraving::Frequent),
            "little" | "poco" => Ok(SugarCraving::Little),
            "none" | "nada" => Ok(SugarCraving::None),
            _ => Err(AssessmentParseError::SugarCraving(s.to_string())),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
