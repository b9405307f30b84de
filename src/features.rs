use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::PredictError;

/// Number of features the scaler and model were fitted on.
pub const NUM_FEATURES: usize = 20;

/// Column order the pipeline was fitted against. This is a contract between
/// training and serving: the artifacts are only valid for vectors assembled
/// in exactly this order.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "rate_code",
    "pickup_longitude",
    "pickup_latitude",
    "dropoff_longitude",
    "dropoff_latitude",
    "passenger_count",
    "trip_distance",
    "extra",
    "improvement_surcharge",
    "trip_type",
    "pickup_day",
    "pickup_hour",
    "pickup_minute",
    "pickup_second",
    "pickup_weekday",
    "dropoff_day",
    "dropoff_hour",
    "dropoff_minute",
    "dropoff_second",
    "dropoff_weekday",
];

/// Meter rate code in effect for the trip. Codes match the TLC trip records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RateCode {
    Standard = 1,
    Jfk = 2,
    Newark = 3,
    NassauWestchester = 4,
    Negotiated = 5,
    GroupRide = 6,
}

impl RateCode {
    pub const ALL: [RateCode; 6] = [
        RateCode::Standard,
        RateCode::Jfk,
        RateCode::Newark,
        RateCode::NassauWestchester,
        RateCode::Negotiated,
        RateCode::GroupRide,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            RateCode::Standard => "Standard Rate",
            RateCode::Jfk => "JFK",
            RateCode::Newark => "Newark",
            RateCode::NassauWestchester => "Nassau/Westchester",
            RateCode::Negotiated => "Negotiated Fare",
            RateCode::GroupRide => "Group Ride",
        }
    }
}

impl TryFrom<u8> for RateCode {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(RateCode::Standard),
            2 => Ok(RateCode::Jfk),
            3 => Ok(RateCode::Newark),
            4 => Ok(RateCode::NassauWestchester),
            5 => Ok(RateCode::Negotiated),
            6 => Ok(RateCode::GroupRide),
            other => Err(format!("rate code {} outside 1..=6", other)),
        }
    }
}

impl From<RateCode> for u8 {
    fn from(code: RateCode) -> u8 {
        code as u8
    }
}

/// Street-hail vs. dispatched trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TripType {
    StreetHail = 1,
    Dispatch = 2,
}

impl TripType {
    pub const ALL: [TripType; 2] = [TripType::StreetHail, TripType::Dispatch];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            TripType::StreetHail => "Street-hail",
            TripType::Dispatch => "Dispatch",
        }
    }
}

impl TryFrom<u8> for TripType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(TripType::StreetHail),
            2 => Ok(TripType::Dispatch),
            other => Err(format!("trip type {} outside 1..=2", other)),
        }
    }
}

impl From<TripType> for u8 {
    fn from(code: TripType) -> u8 {
        code as u8
    }
}

/// Display label for a passenger count selection.
pub fn passenger_count_label(count: u8) -> String {
    if count == 1 {
        "1 passenger".to_string()
    } else {
        format!("{} passengers", count)
    }
}

/// Raw trip attributes as submitted by the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripDetails {
    pub rate_code: RateCode,
    pub pickup_longitude: f64,
    pub pickup_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_latitude: f64,
    pub passenger_count: u8,
    pub trip_distance: f64,
    pub extra: f64,
    pub improvement_surcharge: f64,
    pub trip_type: TripType,
    pub pickup_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub dropoff_date: NaiveDate,
    pub dropoff_time: NaiveTime,
}

impl TripDetails {
    /// Build the fixed-order feature vector the pipeline was fitted on.
    ///
    /// Coordinates, distance and surcharges are passed through unmodified;
    /// the closed sets (rate code, trip type) are already enforced at
    /// deserialization, so the only checks left are the passenger count
    /// range and non-finite numbers.
    pub fn assemble(&self) -> Result<[f64; NUM_FEATURES], PredictError> {
        if !(1..=8).contains(&self.passenger_count) {
            return Err(PredictError::InvalidInput(format!(
                "passenger count {} outside 1..=8",
                self.passenger_count
            )));
        }

        let numeric = [
            ("pickup_longitude", self.pickup_longitude),
            ("pickup_latitude", self.pickup_latitude),
            ("dropoff_longitude", self.dropoff_longitude),
            ("dropoff_latitude", self.dropoff_latitude),
            ("trip_distance", self.trip_distance),
            ("extra", self.extra),
            ("improvement_surcharge", self.improvement_surcharge),
        ];
        for (name, value) in numeric {
            if !value.is_finite() {
                return Err(PredictError::InvalidInput(format!(
                    "{} is not a finite number",
                    name
                )));
            }
        }

        let pickup = datetime_parts(self.pickup_date, self.pickup_time);
        let dropoff = datetime_parts(self.dropoff_date, self.dropoff_time);

        Ok([
            self.rate_code.code() as f64,
            self.pickup_longitude,
            self.pickup_latitude,
            self.dropoff_longitude,
            self.dropoff_latitude,
            self.passenger_count as f64,
            self.trip_distance,
            self.extra,
            self.improvement_surcharge,
            self.trip_type.code() as f64,
            pickup[0],
            pickup[1],
            pickup[2],
            pickup[3],
            pickup[4],
            dropoff[0],
            dropoff[1],
            dropoff[2],
            dropoff[3],
            dropoff[4],
        ])
    }
}

/// Day-of-month, hour, minute, second, weekday (0=Monday..6=Sunday).
fn datetime_parts(date: NaiveDate, time: NaiveTime) -> [f64; 5] {
    [
        date.day() as f64,
        time.hour() as f64,
        time.minute() as f64,
        time.second() as f64,
        date.weekday().num_days_from_monday() as f64,
    ]
}
