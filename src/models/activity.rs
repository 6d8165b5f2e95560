// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Garmin Connect activity record.

use crate::error::{GarminError, Result};
use crate::time_utils::{parse_garmin_utc, parse_zone};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Deserialize;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One recorded activity.
///
/// Values are fixed at construction; only [`Activity::refresh`] replaces
/// them, and it never changes the id.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    id: u64,
    activity_type: String,
    name: String,
    begin: DateTime<Tz>,
    end: DateTime<Tz>,
    begin_position: Option<Coordinates>,
    end_position: Option<Coordinates>,
    distance_km: f64,
    duration_secs: f64,
}

impl Activity {
    /// Build an activity from the object Garmin nests under `"activity"`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let raw = RawActivity::deserialize(value)
            .map_err(|e| GarminError::MalformedActivityData(e.to_string()))?;
        raw.into_activity()
    }

    /// Re-fetch this activity by id and replace every field.
    pub fn refresh(&mut self, uploader: &crate::services::ActivityUploader<'_>) -> Result<()> {
        let fresh = uploader.get_activity(self.id)?;
        if fresh.id != self.id {
            return Err(GarminError::MalformedActivityData(format!(
                "lookup for activity {} returned activity {}",
                self.id, fresh.id
            )));
        }
        *self = fresh;
        Ok(())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Activity type key (`running`, `cycling`, ...)
    pub fn activity_type(&self) -> &str {
        &self.activity_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start time in the zone Garmin reported for it
    pub fn begin(&self) -> &DateTime<Tz> {
        &self.begin
    }

    /// End time in the zone Garmin reported for it
    pub fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    pub fn begin_position(&self) -> Option<Coordinates> {
        self.begin_position
    }

    pub fn end_position(&self) -> Option<Coordinates> {
        self.end_position
    }

    /// Distance in kilometers
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActivity {
    activity_id: Numeric,
    activity_type: RawActivityType,
    activity_name: String,
    activity_summary: RawSummary,
}

#[derive(Debug, Deserialize)]
struct RawActivityType {
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSummary {
    begin_timestamp: Measure,
    end_timestamp: Measure,
    begin_latitude: Option<Measure>,
    begin_longitude: Option<Measure>,
    end_latitude: Option<Measure>,
    end_longitude: Option<Measure>,
    sum_distance: Measure,
    sum_duration: Measure,
}

/// `{ "value": ..., "uom": ... }` pair used throughout the summary.
#[derive(Debug, Deserialize)]
struct Measure {
    value: Numeric,
    #[serde(default)]
    uom: Option<String>,
}

/// Garmin sends numbers both as JSON numbers and as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl Numeric {
    fn as_f64(&self, field: &str) -> Result<f64> {
        match self {
            Numeric::Integer(n) => Ok(*n as f64),
            Numeric::Float(n) => Ok(*n),
            Numeric::Text(s) => s.trim().parse().map_err(|_| malformed(field, s)),
        }
    }

    fn as_u64(&self, field: &str) -> Result<u64> {
        match self {
            Numeric::Integer(n) => Ok(*n),
            Numeric::Float(n) => Err(malformed(field, &n.to_string())),
            Numeric::Text(s) => s.trim().parse().map_err(|_| malformed(field, s)),
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Numeric::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn malformed(field: &str, value: &str) -> GarminError {
    GarminError::MalformedActivityData(format!("{field}: unexpected value {value:?}"))
}

impl RawActivity {
    fn into_activity(self) -> Result<Activity> {
        let summary = self.activity_summary;
        Ok(Activity {
            id: self.activity_id.as_u64("activityId")?,
            activity_type: self.activity_type.key,
            name: self.activity_name,
            begin: timestamp("BeginTimestamp", &summary.begin_timestamp)?,
            end: timestamp("EndTimestamp", &summary.end_timestamp)?,
            begin_position: position(
                "Begin",
                summary.begin_latitude.as_ref(),
                summary.begin_longitude.as_ref(),
            )?,
            end_position: position(
                "End",
                summary.end_latitude.as_ref(),
                summary.end_longitude.as_ref(),
            )?,
            distance_km: distance_km(&summary.sum_distance)?,
            duration_secs: duration_secs(&summary.sum_duration)?,
        })
    }
}

fn timestamp(field: &str, measure: &Measure) -> Result<DateTime<Tz>> {
    let value = measure
        .value
        .as_str()
        .ok_or_else(|| malformed(field, "non-string timestamp"))?;
    let utc = parse_garmin_utc(value).ok_or_else(|| malformed(field, value))?;
    let zone_name = measure
        .uom
        .as_deref()
        .ok_or_else(|| GarminError::MalformedActivityData(format!("{field}: missing zone")))?;
    let zone = parse_zone(zone_name).ok_or_else(|| malformed(field, zone_name))?;
    Ok(utc.with_timezone(&zone))
}

fn position(
    prefix: &str,
    latitude: Option<&Measure>,
    longitude: Option<&Measure>,
) -> Result<Option<Coordinates>> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => Ok(Some(Coordinates {
            latitude: lat.value.as_f64(&format!("{prefix}Latitude"))?,
            longitude: lon.value.as_f64(&format!("{prefix}Longitude"))?,
        })),
        (None, None) => Ok(None),
        _ => Err(GarminError::MalformedActivityData(format!(
            "{prefix} position has only one of latitude/longitude"
        ))),
    }
}

fn distance_km(measure: &Measure) -> Result<f64> {
    let value = measure.value.as_f64("SumDistance")?;
    match measure.uom.as_deref().unwrap_or("kilometer") {
        "kilometer" => Ok(value),
        "meter" => Ok(value / 1000.0),
        "mile" => Ok(value * 1.609_344),
        other => Err(malformed("SumDistance.uom", other)),
    }
}

fn duration_secs(measure: &Measure) -> Result<f64> {
    let value = measure.value.as_f64("SumDuration")?;
    match measure.uom.as_deref().unwrap_or("second") {
        "second" => Ok(value),
        "millisecond" => Ok(value / 1000.0),
        "minute" => Ok(value * 60.0),
        other => Err(malformed("SumDuration.uom", other)),
    }
}
