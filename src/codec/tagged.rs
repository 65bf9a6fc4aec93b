//! Type-Tagged Values
//!
//! Phase sets, footprints and dates are written as JSON objects carrying a
//! `_type` discriminator so a decoder can rebuild the value type:
//!
//! * `{"_type":"LifeCyclePhases","originalString":"A1-A3"}`: re-parsed on load
//! * `{"_type":"CarbonFootprint","product":[..],"transport":[..]}`
//! * `{"_type":"Date","value":"2024-05-01T00:00:00+00:00"}`
//!
//! Changing these tags breaks every token issued so far.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::lifecycle::LifeCyclePhases;
use crate::model::footprint::{
    CarbonFootprint, FootprintData, ProductCarbonFootprint, TransportCarbonFootprint,
};

#[derive(Serialize)]
#[serde(tag = "_type")]
enum TaggedRef<'a> {
    LifeCyclePhases {
        #[serde(rename = "originalString")]
        original_string: &'a str,
    },
    CarbonFootprint {
        product: &'a [ProductCarbonFootprint],
        transport: &'a [TransportCarbonFootprint],
    },
    Date {
        value: String,
    },
}

/// Owned form of a tagged value as read back from JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "_type")]
pub enum TaggedValue {
    LifeCyclePhases {
        #[serde(rename = "originalString", default)]
        original_string: String,
    },
    CarbonFootprint {
        #[serde(default)]
        product: Vec<ProductCarbonFootprint>,
        #[serde(default)]
        transport: Vec<TransportCarbonFootprint>,
    },
    Date {
        value: String,
    },
}

/// A tagged value rebuilt into its value type.
#[derive(Debug, Clone)]
pub enum Decoded {
    Phases(LifeCyclePhases),
    Footprint(CarbonFootprint),
    Date(DateTime<Utc>),
}

impl Decoded {
    fn kind(&self) -> &'static str {
        match self {
            Decoded::Phases(_) => "LifeCyclePhases",
            Decoded::Footprint(_) => "CarbonFootprint",
            Decoded::Date(_) => "Date",
        }
    }
}

impl TaggedValue {
    pub fn decode(self) -> Result<Decoded, String> {
        match self {
            TaggedValue::LifeCyclePhases { original_string } => {
                Ok(Decoded::Phases(LifeCyclePhases::parse(&original_string)))
            }
            TaggedValue::CarbonFootprint { product, transport } => {
                Ok(Decoded::Footprint(CarbonFootprint::new(product, transport)))
            }
            TaggedValue::Date { value } => parse_date(&value).map(Decoded::Date),
        }
    }
}

fn unexpected<E: serde::de::Error>(expected: &str, found: &Decoded) -> E {
    E::custom(format!("expected {} value, found {}", expected, found.kind()))
}

/// Accepts RFC 3339, RFC 2822 (`Tue, 01 Jan 2024 00:00:00 GMT`) and plain
/// ISO dates.
pub fn parse_date(text: &str) -> Result<DateTime<Utc>, String> {
    let text = text.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Ok(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date '{}'", text))
}

impl Serialize for LifeCyclePhases {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TaggedRef::LifeCyclePhases {
            original_string: self.original(),
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PhasesRepr {
    Missing,
    Text(String),
    Codes(Vec<String>),
    Tagged(TaggedValue),
}

impl<'de> Deserialize<'de> for LifeCyclePhases {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match PhasesRepr::deserialize(deserializer)? {
            PhasesRepr::Missing => Ok(LifeCyclePhases::empty()),
            PhasesRepr::Text(text) => Ok(LifeCyclePhases::parse(&text)),
            PhasesRepr::Codes(codes) => Ok(LifeCyclePhases::from_codes(codes)),
            PhasesRepr::Tagged(tagged) => match tagged.decode().map_err(D::Error::custom)? {
                Decoded::Phases(phases) => Ok(phases),
                other => Err(unexpected("LifeCyclePhases", &other)),
            },
        }
    }
}

impl Serialize for CarbonFootprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TaggedRef::CarbonFootprint {
            product: self.product(),
            transport: self.transport(),
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FootprintRepr {
    Tagged(TaggedValue),
    Plain(FootprintData),
}

impl<'de> Deserialize<'de> for CarbonFootprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match FootprintRepr::deserialize(deserializer)? {
            FootprintRepr::Plain(data) => Ok(CarbonFootprint::from(data)),
            FootprintRepr::Tagged(tagged) => match tagged.decode().map_err(D::Error::custom)? {
                Decoded::Footprint(footprint) => Ok(footprint),
                other => Err(unexpected("CarbonFootprint", &other)),
            },
        }
    }
}

/// `#[serde(with = ...)]` adapter for optional dates.
pub mod date {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DateRepr {
        Missing,
        Text(String),
        Tagged(TaggedValue),
    }

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => TaggedRef::Date {
                value: date.to_rfc3339(),
            }
            .serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match DateRepr::deserialize(deserializer)? {
            DateRepr::Missing => Ok(None),
            DateRepr::Text(text) => parse_date(&text).map(Some).map_err(D::Error::custom),
            DateRepr::Tagged(tagged) => match tagged.decode().map_err(D::Error::custom)? {
                Decoded::Date(date) => Ok(Some(date)),
                other => Err(unexpected("Date", &other)),
            },
        }
    }
}
