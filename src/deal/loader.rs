//! Load deals from CSV files
//!
//! Expected header:
//! `deal_id,purchase_price,down_payment_percent,loan_interest_rate,loan_term_years,
//! annual_rental_income,vacancy_rate,annual_operating_expenses,
//! annual_property_appreciation,holding_period_years`

use super::DealParameters;
use crate::error::AnalysisError;
use csv::Reader;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading a deal file
#[derive(Debug, Error)]
pub enum DealLoadError {
    #[error("failed to read deal file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed deal CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("deal {deal_id}: {source}")]
    InvalidDeal {
        deal_id: String,
        #[source]
        source: AnalysisError,
    },
}

/// A deal read from a file, tagged with its identifier
#[derive(Debug, Clone, PartialEq)]
pub struct DealRecord {
    pub deal_id: String,
    pub params: DealParameters,
}

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    deal_id: String,
    purchase_price: f64,
    down_payment_percent: f64,
    loan_interest_rate: f64,
    loan_term_years: u32,
    annual_rental_income: f64,
    vacancy_rate: f64,
    annual_operating_expenses: f64,
    annual_property_appreciation: f64,
    holding_period_years: u32,
}

impl CsvRow {
    fn into_record(self) -> DealRecord {
        DealRecord {
            deal_id: self.deal_id.trim().to_string(),
            params: DealParameters {
                purchase_price: self.purchase_price,
                down_payment_percent: self.down_payment_percent,
                loan_interest_rate: self.loan_interest_rate,
                loan_term_years: self.loan_term_years,
                annual_rental_income: self.annual_rental_income,
                vacancy_rate: self.vacancy_rate,
                annual_operating_expenses: self.annual_operating_expenses,
                annual_property_appreciation: self.annual_property_appreciation,
                holding_period_years: self.holding_period_years,
            },
        }
    }
}

/// Load deals from a CSV file, validating each one
pub fn load_deals(path: &Path) -> Result<Vec<DealRecord>, DealLoadError> {
    let file = std::fs::File::open(path)?;
    load_deals_from_reader(file)
}

/// Load deals from any reader, validating each one
pub fn load_deals_from_reader<R: Read>(reader: R) -> Result<Vec<DealRecord>, DealLoadError> {
    let records = read_deals_unchecked(reader)?;
    for record in &records {
        record
            .params
            .validate()
            .map_err(|source| DealLoadError::InvalidDeal {
                deal_id: record.deal_id.clone(),
                source,
            })?;
    }
    Ok(records)
}

/// Parse deals without range checks.
///
/// Batch runs use this so one bad row is reported against its deal instead of
/// aborting the whole file; the engine validates again before computing.
pub fn read_deals_unchecked<R: Read>(reader: R) -> Result<Vec<DealRecord>, DealLoadError> {
    let mut reader = Reader::from_reader(reader);
    let mut records = Vec::new();

    for row in reader.deserialize::<CsvRow>() {
        records.push(row?.into_record());
    }

    log::debug!("read {} deals", records.len());
    Ok(records)
}
