//! Carbon Footprint
//!
//! Declared product (PCF) and transport (TCF) footprint entries of one asset
//! and their summed CO2 equivalents in kg.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::diagnostics::{AnalysisWarning, WarningSink};
use crate::error::TraceError;
use crate::lifecycle::LifeCyclePhases;

/// Handover or takeover address of goods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodsAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_town: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

pub const MISSING_PROCESSES_TITLE: &str =
    "The asset does not specify whether its calculations encompass Well-to-Tank, Tank-to-Wheel, or both";

/// Which emissions of a transport service are covered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TransportProcesses {
    WellToTank,
    TankToWheel,
    #[default]
    WellToWheel,
}

impl TransportProcesses {
    pub fn label(self) -> &'static str {
        match self {
            TransportProcesses::WellToTank => "WTT - Well-to-Tank",
            TransportProcesses::TankToWheel => "TTW - Tank-to-Wheel",
            TransportProcesses::WellToWheel => "WTW - Well-to-Wheel",
        }
    }

    /// A missing declaration is read as Well-to-Wheel and reported as a
    /// warning.
    pub fn resolve(declared: Option<TransportProcesses>, warnings: &dyn WarningSink) -> Self {
        if let Some(processes) = declared {
            return processes;
        }
        warnings.report(AnalysisWarning::new(
            MISSING_PROCESSES_TITLE,
            Some("The value of TCFProcessesForGreenhouseGasEmissionInATransportService does not exist, therefore the analysis handles the missing value as Well-to-Wheel".to_string()),
        ));
        TransportProcesses::WellToWheel
    }
}

impl FromStr for TransportProcesses {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("WTT") {
            Ok(TransportProcesses::WellToTank)
        } else if s.starts_with("TTW") {
            Ok(TransportProcesses::TankToWheel)
        } else if s.starts_with("WTW") {
            Ok(TransportProcesses::WellToWheel)
        } else {
            Err(TraceError::UnknownTransportProcess(s.to_string()))
        }
    }
}

impl TryFrom<String> for TransportProcesses {
    type Error = TraceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TransportProcesses> for String {
    fn from(value: TransportProcesses) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for TransportProcesses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCarbonFootprint {
    /// e.g. "ISO 14067", "GHG Protocol"
    #[serde(default)]
    pub calculation_method: Vec<String>,
    pub co2eq: f64,
    /// Unit of the reference quantity ("kg", "piece", ...)
    #[serde(default)]
    pub reference_value_for_calculation: String,
    #[serde(default)]
    pub quantity_of_measure_for_calculation: f64,
    #[serde(default)]
    pub life_cycle_phase: LifeCyclePhases,
    #[serde(default)]
    pub goods_address_handover: GoodsAddress,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "crate::codec::tagged::date")]
    pub publication_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "crate::codec::tagged::date")]
    pub expiration_date: Option<DateTime<Utc>>,
}

impl ProductCarbonFootprint {
    pub fn new(co2eq: f64, life_cycle_phase: LifeCyclePhases) -> Self {
        Self {
            calculation_method: Vec::new(),
            co2eq,
            reference_value_for_calculation: "piece".to_string(),
            quantity_of_measure_for_calculation: 1.0,
            life_cycle_phase,
            goods_address_handover: GoodsAddress::default(),
            publication_date: None,
            expiration_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportCarbonFootprint {
    /// e.g. "EN 16258"
    #[serde(default)]
    pub calculation_method: String,
    pub co2eq: f64,
    #[serde(default)]
    pub reference_value_for_calculation: String,
    #[serde(default)]
    pub quantity_of_measure_for_calculation: f64,
    /// `None` until the owning tree resolves a missing declaration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processes_for_greenhouse_gas_emission_in_a_transport_service: Option<TransportProcesses>,
    #[serde(default)]
    pub goods_transport_address_takeover: GoodsAddress,
    #[serde(default)]
    pub goods_transport_address_handover: GoodsAddress,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "crate::codec::tagged::date")]
    pub publication_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "crate::codec::tagged::date")]
    pub expiration_date: Option<DateTime<Utc>>,
}

impl TransportCarbonFootprint {
    pub fn new(co2eq: f64) -> Self {
        Self {
            calculation_method: "EN 16258".to_string(),
            co2eq,
            reference_value_for_calculation: "piece".to_string(),
            quantity_of_measure_for_calculation: 1.0,
            processes_for_greenhouse_gas_emission_in_a_transport_service: Some(TransportProcesses::default()),
            goods_transport_address_takeover: GoodsAddress::default(),
            goods_transport_address_handover: GoodsAddress::default(),
            publication_date: None,
            expiration_date: None,
        }
    }
}

/// Plain shape of a footprint as found in input records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FootprintData {
    #[serde(default)]
    pub product: Vec<ProductCarbonFootprint>,
    #[serde(default)]
    pub transport: Vec<TransportCarbonFootprint>,
}

/// Immutable aggregate of an asset's declared footprint entries.
#[derive(Debug, Clone, PartialEq)]
pub struct CarbonFootprint {
    product: Vec<ProductCarbonFootprint>,
    transport: Vec<TransportCarbonFootprint>,
    covered_life_cycle_phases: LifeCyclePhases,
}

impl CarbonFootprint {
    pub fn new(product: Vec<ProductCarbonFootprint>, transport: Vec<TransportCarbonFootprint>) -> Self {
        let covered_life_cycle_phases =
            LifeCyclePhases::merged(product.iter().map(|p| &p.life_cycle_phase));
        Self {
            product,
            transport,
            covered_life_cycle_phases,
        }
    }

    pub fn product(&self) -> &[ProductCarbonFootprint] {
        &self.product
    }

    pub fn transport(&self) -> &[TransportCarbonFootprint] {
        &self.transport
    }

    pub fn product_co2eq(&self) -> f64 {
        self.product.iter().map(|p| p.co2eq).sum()
    }

    pub fn transport_co2eq(&self) -> f64 {
        self.transport.iter().map(|t| t.co2eq).sum()
    }

    pub fn total_co2eq(&self) -> f64 {
        self.product_co2eq() + self.transport_co2eq()
    }

    /// Fills in missing transport process declarations, reporting each one.
    pub(crate) fn resolve_transport_processes(&mut self, warnings: &dyn WarningSink) {
        for entry in &mut self.transport {
            let declared = entry.processes_for_greenhouse_gas_emission_in_a_transport_service;
            entry.processes_for_greenhouse_gas_emission_in_a_transport_service =
                Some(TransportProcesses::resolve(declared, warnings));
        }
    }

    /// Union of the phases of all product entries.
    pub fn covered_life_cycle_phases(&self) -> &LifeCyclePhases {
        &self.covered_life_cycle_phases
    }
}

impl From<FootprintData> for CarbonFootprint {
    fn from(data: FootprintData) -> Self {
        CarbonFootprint::new(data.product, data.transport)
    }
}
