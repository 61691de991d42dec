//! Builds a [`RoutineContext`] from the clock, saved day categories and
//! saved locations.
//!
//! Location permissions and GPS fixes live outside the engine; the resolver
//! only receives an optional coordinate pair that has already been obtained.

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use super::rule::{RoutineContext, TimeSlot};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Start hours (0-23, local time) of each time slot.
///
/// Night runs from `night_start` until `morning_start` the next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlotBoundaries {
    #[serde(default = "default_morning_start")]
    pub morning_start: u8,
    #[serde(default = "default_afternoon_start")]
    pub afternoon_start: u8,
    #[serde(default = "default_evening_start")]
    pub evening_start: u8,
    #[serde(default = "default_night_start")]
    pub night_start: u8,
}

fn default_morning_start() -> u8 {
    5
}
fn default_afternoon_start() -> u8 {
    12
}
fn default_evening_start() -> u8 {
    17
}
fn default_night_start() -> u8 {
    22
}

impl Default for TimeSlotBoundaries {
    fn default() -> Self {
        Self {
            morning_start: default_morning_start(),
            afternoon_start: default_afternoon_start(),
            evening_start: default_evening_start(),
            night_start: default_night_start(),
        }
    }
}

impl TimeSlotBoundaries {
    /// Boundaries must be strictly increasing hours below 24.
    pub fn is_valid(&self) -> bool {
        self.morning_start < self.afternoon_start
            && self.afternoon_start < self.evening_start
            && self.evening_start < self.night_start
            && self.night_start < 24
    }

    pub fn slot_for_hour(&self, hour: u32) -> TimeSlot {
        let hour = hour % 24;
        if hour >= self.night_start as u32 || hour < self.morning_start as u32 {
            TimeSlot::Night
        } else if hour >= self.evening_start as u32 {
            TimeSlot::Evening
        } else if hour >= self.afternoon_start as u32 {
            TimeSlot::Afternoon
        } else {
            TimeSlot::Morning
        }
    }
}

/// A user-defined classification of days (e.g. "weekday", "gym day").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCategory {
    pub id: String,
    pub name: String,
    /// 0=Sun ... 6=Sat
    pub days: Vec<u8>,
}

impl DayCategory {
    pub fn covers<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> bool {
        let day = at.weekday().num_days_from_sunday() as u8;
        self.days.contains(&day)
    }
}

/// A geofenced place the user saved (home, office, gym).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius_m")]
    pub radius_m: f64,
}

fn default_radius_m() -> f64 {
    150.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_m(&self, other: &Coordinates) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

impl SavedLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Resolves the current context from saved catalog data.
#[derive(Debug, Clone)]
pub struct ContextResolver<'a> {
    boundaries: TimeSlotBoundaries,
    day_categories: &'a [DayCategory],
    locations: &'a [SavedLocation],
}

impl<'a> ContextResolver<'a> {
    pub fn new(
        boundaries: TimeSlotBoundaries,
        day_categories: &'a [DayCategory],
        locations: &'a [SavedLocation],
    ) -> Self {
        Self {
            boundaries,
            day_categories,
            locations,
        }
    }

    /// First category in catalog order that covers the day.
    pub fn day_category<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> Option<&'a DayCategory> {
        self.day_categories.iter().find(|c| c.covers(at))
    }

    /// Nearest saved location whose radius contains `position`.
    pub fn location(&self, position: &Coordinates) -> Option<&'a SavedLocation> {
        self.locations
            .iter()
            .map(|l| (l, l.coordinates().distance_m(position)))
            .filter(|(l, d)| *d <= l.radius_m)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(l, _)| l)
    }

    /// `at` should be in the user's local time zone.
    pub fn resolve<Tz: TimeZone>(
        &self,
        at: &DateTime<Tz>,
        position: Option<Coordinates>,
    ) -> RoutineContext {
        RoutineContext {
            time_slot: self.boundaries.slot_for_hour(at.hour()),
            day_category_id: self.day_category(at).map(|c| c.id.clone()),
            location_id: position
                .as_ref()
                .and_then(|p| self.location(p))
                .map(|l| l.id.clone()),
        }
    }
}
