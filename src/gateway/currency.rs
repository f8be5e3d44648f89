//! ISO 4217 currency table for the HNB IPG.
//!
//! The gateway accepts a fixed set of currencies and identifies them by
//! their numeric ISO 4217 code. Absence from this table means the gateway
//! cannot take payments in that currency; lookups return `None` rather
//! than any sentinel code.

/// A currency the IPG can settle in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub iso_code: &'static str,
    pub numeric_code: u16,
    /// Power-of-ten factor scaling a decimal amount to minor units
    pub exponent: u8,
}

// All currencies the gateway lists use two decimal places.
const CURRENCIES: &[Currency] = &[
    Currency { iso_code: "AED", numeric_code: 784, exponent: 2 },
    Currency { iso_code: "AUD", numeric_code: 36, exponent: 2 },
    Currency { iso_code: "CAD", numeric_code: 124, exponent: 2 },
    Currency { iso_code: "CNY", numeric_code: 156, exponent: 2 },
    Currency { iso_code: "EUR", numeric_code: 978, exponent: 2 },
    Currency { iso_code: "INR", numeric_code: 356, exponent: 2 },
    Currency { iso_code: "LKR", numeric_code: 144, exponent: 2 },
    Currency { iso_code: "USD", numeric_code: 840, exponent: 2 },
];

/// Look up a currency by its 3-letter ISO code
pub fn lookup(iso_code: &str) -> Option<&'static Currency> {
    CURRENCIES.iter().find(|c| c.iso_code == iso_code)
}

/// Numeric ISO 4217 code for a supported currency
pub fn numeric_code(iso_code: &str) -> Option<u16> {
    lookup(iso_code).map(|c| c.numeric_code)
}

pub fn is_supported(iso_code: &str) -> bool {
    lookup(iso_code).is_some()
}
