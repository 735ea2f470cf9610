pub mod classification;
pub mod valuation;
