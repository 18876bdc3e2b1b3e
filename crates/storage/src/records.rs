//! JSON shapes stored under the key-value keys.
//!
//! Writes always use the current shapes. Reads also accept what earlier
//! versions of the tracker stored: a bare array of entries, RFC 3339
//! timestamps for dates, ids as plain numbers and Spanish enumeration labels.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Value;
use tracker_core::model::{
    EntryError, EntryId, Goal, GoalDraft, Level, SugarCraving, WeeklyEntry, WeeklyEntryDraft,
};

use crate::repository::{StorageError, StoredSession};

pub const GOALS_KEY: &str = "weightLossGoals";
pub const ENTRIES_KEY: &str = "weeklyLogs";
pub const SESSION_KEY: &str = "authSession";

/// Version written with every goal and entry list.
pub const SCHEMA_VERSION: u32 = 1;

fn check_version(version: u32) -> Result<(), StorageError> {
    if version > SCHEMA_VERSION {
        return Err(StorageError::Serialization(format!(
            "unsupported schema version {version} (newest known is {SCHEMA_VERSION})"
        )));
    }
    Ok(())
}

//
// ─── DATES AND IDS ─────────────────────────────────────────────────────────────
//

/// Parse a stored date: `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to its
/// calendar date in the local time zone.
///
/// Timestamps were written as local midnight converted to UTC, so taking the
/// UTC date would land a day early east of Greenwich.
///
/// # Errors
///
/// Returns a description of the value when neither form matches.
pub fn parse_stored_date(raw: &str) -> Result<NaiveDate, String> {
    parse_stored_date_in(raw, &Local)
}

fn parse_stored_date_in<Tz: TimeZone>(raw: &str, zone: &Tz) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| {
            DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.with_timezone(zone).date_naive())
        })
        .map_err(|_| format!("unparsable date: {raw:?}"))
}

fn de_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_stored_date(&raw).map_err(de::Error::custom)
}

fn de_optional_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_stored_date(&raw).map_err(de::Error::custom))
        .transpose()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntryId {
    Number(u64),
    Text(String),
}

fn de_entry_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EntryId, D::Error> {
    match RawEntryId::deserialize(deserializer)? {
        RawEntryId::Number(value) => Ok(EntryId::new(value)),
        RawEntryId::Text(text) => text.parse().map_err(de::Error::custom),
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn ser_entry_id<S: Serializer>(id: &EntryId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(id)
}

//
// ─── GOAL ──────────────────────────────────────────────────────────────────────
//

/// Persisted shape of the goal.
///
/// Every field is optional on read so a partially written goal surfaces as a
/// descriptive error instead of a generic parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRecord {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default, deserialize_with = "de_optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_optional_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub initial_weight: Option<f64>,
    #[serde(default)]
    pub target_weight: Option<f64>,
    #[serde(default)]
    pub initial_waist: Option<f64>,
    #[serde(default)]
    pub target_waist: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl GoalRecord {
    #[must_use]
    pub fn from_goal(goal: &Goal) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            start_date: Some(goal.start_date()),
            end_date: Some(goal.end_date()),
            initial_weight: Some(goal.initial_weight()),
            target_weight: Some(goal.target_weight()),
            initial_waist: Some(goal.initial_waist()),
            target_waist: Some(goal.target_waist()),
            height: Some(goal.height()),
        }
    }

    /// Convert the record back into a domain `Goal`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for an unknown schema version or
    /// a missing/non-positive field.
    pub fn into_goal(self) -> Result<Goal, StorageError> {
        check_version(self.schema_version)?;
        Goal::from_persisted(GoalDraft {
            start_date: self.start_date,
            end_date: self.end_date,
            initial_weight: self.initial_weight,
            target_weight: self.target_weight,
            initial_waist: self.initial_waist,
            target_waist: self.target_waist,
            height: self.height,
        })
        .map_err(|err| StorageError::Serialization(format!("stored goal is invalid: {err}")))
    }
}

/// # Errors
///
/// Returns `StorageError::Serialization` if the goal cannot be encoded.
pub fn encode_goal(goal: &Goal) -> Result<String, StorageError> {
    Ok(serde_json::to_string(&GoalRecord::from_goal(goal))?)
}

/// # Errors
///
/// Returns `StorageError::Serialization` if the JSON or the goal is invalid.
pub fn decode_goal(raw: &str) -> Result<Goal, StorageError> {
    serde_json::from_str::<GoalRecord>(raw)?.into_goal()
}

//
// ─── ENTRIES ───────────────────────────────────────────────────────────────────
//

/// Persisted shape of one weekly entry. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    #[serde(serialize_with = "ser_entry_id", deserialize_with = "de_entry_id")]
    pub id: EntryId,
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    pub weight: f64,
    pub waist: f64,
    pub errors: u32,
    pub physical_activity: bool,
    pub sleep: f64,
    pub meditation: bool,
    pub water: f64,
    pub body_weight_perception: Level,
    pub energy: Level,
    pub sugar_craving: SugarCraving,
}

impl EntryRecord {
    #[must_use]
    pub fn from_entry(entry: &WeeklyEntry) -> Self {
        Self {
            id: entry.id(),
            date: entry.date(),
            weight: entry.weight(),
            waist: entry.waist(),
            errors: entry.errors(),
            physical_activity: entry.physical_activity(),
            sleep: entry.sleep(),
            meditation: entry.meditation(),
            water: entry.water(),
            body_weight_perception: entry.body_weight_perception(),
            energy: entry.energy(),
            sugar_craving: entry.sugar_craving(),
        }
    }

    /// Convert the record back into a domain `WeeklyEntry`.
    ///
    /// # Errors
    ///
    /// Returns `EntryError` if the stored measurements fail validation.
    pub fn into_entry(self) -> Result<WeeklyEntry, EntryError> {
        WeeklyEntryDraft {
            date: self.date,
            weight: Some(self.weight),
            waist: Some(self.waist),
            errors: self.errors,
            physical_activity: self.physical_activity,
            sleep: self.sleep,
            meditation: self.meditation,
            water: self.water,
            body_weight_perception: self.body_weight_perception,
            energy: self.energy,
            sugar_craving: self.sugar_craving,
        }
        .validate(self.id)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntriesEnvelope<'a> {
    schema_version: u32,
    entries: &'a [Value],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntries {
    Versioned {
        #[serde(rename = "schemaVersion")]
        schema_version: u32,
        entries: Vec<Value>,
    },
    Legacy(Vec<Value>),
}

/// Split the stored list into raw elements without decoding them.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the document is neither a
/// versioned envelope nor a bare array, or has an unknown version.
pub fn decode_entry_list(raw: &str) -> Result<Vec<Value>, StorageError> {
    match serde_json::from_str::<StoredEntries>(raw)? {
        StoredEntries::Versioned {
            schema_version,
            entries,
        } => {
            check_version(schema_version)?;
            Ok(entries)
        }
        StoredEntries::Legacy(entries) => Ok(entries),
    }
}

/// # Errors
///
/// Returns `StorageError::Serialization` if the list cannot be encoded.
pub fn encode_entry_list(entries: &[Value]) -> Result<String, StorageError> {
    Ok(serde_json::to_string(&EntriesEnvelope {
        schema_version: SCHEMA_VERSION,
        entries,
    })?)
}

/// # Errors
///
/// Returns `StorageError::Serialization` if the entry cannot be encoded.
pub fn entry_to_value(entry: &WeeklyEntry) -> Result<Value, StorageError> {
    Ok(serde_json::to_value(EntryRecord::from_entry(entry))?)
}

/// Largest id carried by any raw element.
///
/// Read leniently from the `id` field alone, so elements that fail to decode
/// still count.
#[must_use]
pub fn max_stored_id(values: &[Value]) -> Option<EntryId> {
    values
        .iter()
        .filter_map(|value| match value.get("id")? {
            Value::Number(number) => number.as_u64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
        .max()
        .map(EntryId::new)
}

/// Decode one raw element of the stored list.
///
/// # Errors
///
/// Returns a human-readable reason when a field is missing, has the wrong
/// type, holds an unparsable date or fails validation.
pub fn decode_entry(value: Value) -> Result<WeeklyEntry, String> {
    let record: EntryRecord = serde_json::from_value(value).map_err(|err| err.to_string())?;
    record.into_entry().map_err(|err| err.to_string())
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub access_token: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// # Errors
///
/// Returns `StorageError::Serialization` if the session cannot be encoded.
pub fn encode_session(session: &StoredSession) -> Result<String, StorageError> {
    Ok(serde_json::to_string(&SessionRecord {
        access_token: session.access_token.clone(),
        email: session.email.clone(),
    })?)
}

/// # Errors
///
/// Returns `StorageError::Serialization` if the JSON is invalid.
pub fn decode_session(raw: &str) -> Result<StoredSession, StorageError> {
    let record: SessionRecord = serde_json::from_str(raw)?;
    Ok(StoredSession {
        access_token: record.access_token,
        email: record.email,
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
