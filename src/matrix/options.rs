//! Travel options forwarded to the distance-matrix service.
//!
//! Every option is optional. Unset options are left out of the request so the
//! service applies its own defaults. Parsing an unknown value is an error, not
//! a silent fallback.

use crate::error::HeatmapError;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

/// Layout accepted for `--departure-time` / `--arrival-time`, in local time.
pub const TIME_LAYOUT: &str = "%Y-%m-%d %H:%M";

macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Wire value sent to the service.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl FromStr for $name {
            type Err = HeatmapError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err(HeatmapError::UnknownOption {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

option_enum! {
    /// Mode of transport used for the estimate.
    TravelMode, "mode" {
        Driving => "driving",
        Walking => "walking",
        Bicycling => "bicycling",
        Transit => "transit",
    }
}

option_enum! {
    /// Route feature to avoid.
    Avoid, "avoid restriction" {
        Tolls => "tolls",
        Highways => "highways",
        Ferries => "ferries",
    }
}

option_enum! {
    /// Unit system used for text distances.
    Units, "units" {
        Metric => "metric",
        Imperial => "imperial",
    }
}

option_enum! {
    /// Preferred transit vehicle.
    TransitMode, "transit_mode" {
        Bus => "bus",
        Subway => "subway",
        Train => "train",
        Tram => "tram",
        Rail => "rail",
    }
}

option_enum! {
    /// Transit routing preference.
    TransitRoutingPreference, "transit routing preference" {
        LessWalking => "less_walking",
        FewerTransfers => "fewer_transfers",
    }
}

option_enum! {
    /// Assumption used for time in traffic.
    TrafficModel, "traffic_model" {
        BestGuess => "best_guess",
        Pessimistic => "pessimistic",
        Optimistic => "optimistic",
    }
}

/// One or more transit modes, written `bus|subway|tram`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransitModes(pub Vec<TransitMode>);

impl TransitModes {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for TransitModes {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        s.split('|')
            .map(|m| m.trim().parse())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for TransitModes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(TransitMode::as_str).collect();
        f.write_str(&joined.join("|"))
    }
}

/// Departure time: either "now" or a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartureTime {
    Now,
    At(DateTime<Utc>),
}

impl DepartureTime {
    pub fn to_param(&self) -> String {
        match self {
            DepartureTime::Now => "now".to_string(),
            DepartureTime::At(t) => t.timestamp().to_string(),
        }
    }
}

impl FromStr for DepartureTime {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "now" {
            return Ok(DepartureTime::Now);
        }
        parse_local_time(s).map(DepartureTime::At)
    }
}

/// Parses `YYYY-MM-DD HH:MM` in the local time zone.
pub fn parse_local_time(s: &str) -> Result<DateTime<Utc>, HeatmapError> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), TIME_LAYOUT).map_err(|e| {
        HeatmapError::InvalidTime {
            value: s.to_string(),
            reason: e.to_string(),
        }
    })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| HeatmapError::InvalidTime {
            value: s.to_string(),
            reason: "time does not exist in the local time zone".to_string(),
        })
}

/// Request options shared by every batch of a run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TravelOptions {
    pub mode: Option<TravelMode>,
    pub avoid: Option<Avoid>,
    pub units: Option<Units>,
    pub transit_modes: TransitModes,
    pub transit_routing_preference: Option<TransitRoutingPreference>,
    pub traffic_model: Option<TrafficModel>,
    pub language: Option<String>,
    pub departure_time: Option<DepartureTime>,
    pub arrival_time: Option<DateTime<Utc>>,
}

impl TravelOptions {
    /// Query parameters for every option that is set, in a fixed order.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if let Some(mode) = self.mode {
            params.push(("mode", mode.to_string()));
        }
        if let Some(avoid) = self.avoid {
            params.push(("avoid", avoid.to_string()));
        }
        if let Some(units) = self.units {
            params.push(("units", units.to_string()));
        }
        if !self.transit_modes.is_empty() {
            params.push(("transit_mode", self.transit_modes.to_string()));
        }
        if let Some(pref) = self.transit_routing_preference {
            params.push(("transit_routing_preference", pref.to_string()));
        }
        if let Some(model) = self.traffic_model {
            params.push(("traffic_model", model.to_string()));
        }
        if let Some(language) = self.language.as_deref().filter(|l| !l.is_empty()) {
            params.push(("language", language.to_string()));
        }
        if let Some(departure) = self.departure_time {
            params.push(("departure_time", departure.to_param()));
        }
        if let Some(arrival) = self.arrival_time {
            params.push(("arrival_time", arrival.timestamp().to_string()));
        }

        params
    }
}
