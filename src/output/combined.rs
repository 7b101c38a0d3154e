//! Combined transfer view
//!
//! Folds every asset's records into one chronological log of
//! `Time, Token, Action, Address, Amount` rows, as seen from the tracked address.

use crate::address::WalletAddress;
use crate::output::{OutputError, OutputResult};
use crate::Record;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Decimals assumed for native records when the network does not say otherwise
pub const DEFAULT_DECIMALS: u32 = 18;

/// Largest scale a `Decimal` can carry
const MAX_DECIMALS: u32 = 28;

/// Direction of a transfer relative to the tracked address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Incoming: the tracked address is the recipient
    To,
    /// Outgoing (anything that is not incoming)
    From,
}

impl Action {
    /// CSV label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::To => "TO",
            Self::From => "FROM",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized row of the combined export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedRow {
    /// Event time truncated to the hour (UTC)
    pub hour: DateTime<Utc>,
    /// Asset symbol as configured for the fetch
    pub token: String,
    /// Direction relative to the tracked address
    pub action: Action,
    /// Counterparty address
    pub counterparty: String,
    /// Value scaled by the asset's decimals
    pub amount: Decimal,
}

impl CombinedRow {
    /// Normalize one record
    ///
    /// `default_decimals` applies to records without a `tokenDecimal` field.
    pub fn from_record(
        record: &Record,
        token: &str,
        tracked: &WalletAddress,
        default_decimals: u32,
    ) -> OutputResult<Self> {
        let timestamp = record
            .timestamp()
            .ok_or_else(|| OutputError::InvalidRecord("missing or invalid timeStamp".to_string()))?;
        let hour = truncate_to_hour(timestamp)?;

        let raw_value = record
            .raw_value()
            .ok_or_else(|| OutputError::InvalidRecord("missing value".to_string()))?;
        let decimals = record.token_decimals().unwrap_or(default_decimals);
        let amount = scale_amount(&raw_value, decimals)?;

        let to = record.to_address().unwrap_or_default();
        let (action, counterparty) = if tracked.matches(to) {
            (Action::To, record.from_address().unwrap_or_default())
        } else {
            (Action::From, to)
        };

        Ok(Self {
            hour,
            token: token.to_string(),
            action,
            counterparty: counterparty.to_string(),
            amount,
        })
    }

    /// `YYYY-MM-DD HH:00`
    pub fn time_label(&self) -> String {
        self.hour.format("%Y-%m-%d %H:00").to_string()
    }
}

/// Build the combined rows for every asset, sorted by hour
///
/// The sort is stable: rows in the same hour keep asset order, then record order.
/// Records that cannot be normalized are skipped with a warning.
pub fn build_combined_rows<'a, I>(
    assets: I,
    tracked: &WalletAddress,
    native_decimals: u32,
) -> Vec<CombinedRow>
where
    I: IntoIterator<Item = (&'a str, &'a [Record])>,
{
    let mut rows = Vec::new();
    for (token, records) in assets {
        for record in records {
            match CombinedRow::from_record(record, token, tracked, native_decimals) {
                Ok(row) => rows.push(row),
                Err(e) => warn!(
                    token,
                    hash = record.hash().unwrap_or("<none>"),
                    error = %e,
                    "Skipping record in combined export"
                ),
            }
        }
    }
    rows.sort_by_key(|row| row.hour);
    rows
}

fn truncate_to_hour(timestamp: i64) -> OutputResult<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0)
        .and_then(|dt| dt.duration_trunc(TimeDelta::hours(1)).ok())
        .ok_or_else(|| OutputError::InvalidRecord(format!("timestamp out of range: {timestamp}")))
}

/// Scale an integer amount in smallest units by `10^decimals`
///
/// Exact whenever the result fits in 28 significant digits. Larger values
/// keep their integer part and lose trailing fractional digits to rounding.
pub fn scale_amount(raw: &str, decimals: u32) -> OutputResult<Decimal> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(OutputError::InvalidRecord(format!("value is not an integer: {raw}")));
    }
    if decimals > MAX_DECIMALS {
        return Err(OutputError::InvalidRecord(format!("unsupported decimals {decimals}")));
    }

    // Placing the point textually keeps values beyond 96 bits representable
    let digits = digits.trim_start_matches('0');
    let split = digits.len().saturating_sub(decimals as usize);
    let (int_part, frac_part) = digits.split_at(split);
    let frac_part = format!("{frac_part:0>width$}", width = decimals as usize);
    let frac_part = frac_part.trim_end_matches('0');
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let text = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    };

    let amount = match Decimal::from_str_exact(&text) {
        Ok(amount) => amount,
        Err(_) => {
            let amount = Decimal::from_str(&text)
                .map_err(|e| OutputError::InvalidRecord(format!("invalid value '{raw}': {e}")))?;
            warn!(value = raw, decimals, "Amount exceeds decimal precision, rounded");
            amount
        }
    };
    Ok(amount.normalize())
}
