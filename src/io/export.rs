use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{ExpenseLedger, Mode};
use crate::domain::{CategoryTotal, Cents, Expense};

/// Ledger contents as written by a JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLedger {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub mode: Mode,
    pub expenses: Vec<Expense>,
    pub total: Cents,
    pub categories: Vec<CategoryTotal>,
}

/// Exporter for converting ledger data to various formats
pub struct Exporter<'a> {
    ledger: &'a ExpenseLedger,
}

impl<'a> Exporter<'a> {
    pub fn new(ledger: &'a ExpenseLedger) -> Self {
        Self { ledger }
    }

    /// Export expenses to CSV format, one row per expense in list order
    pub fn export_expenses_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "name", "amount_cents", "category"])?;

        let mut count = 0;
        for expense in self.ledger.expenses() {
            csv_writer.write_record([
                expense.id.to_string(),
                expense.name.clone(),
                expense.amount_cents.to_string(),
                expense.category.clone(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the whole ledger as a pretty-printed JSON document
    pub fn export_snapshot_json<W: Write>(&self, mut writer: W) -> Result<ExportedLedger> {
        let snapshot = self.ledger.snapshot();

        let exported = ExportedLedger {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: snapshot.generated_at,
            mode: snapshot.mode,
            expenses: snapshot.expenses,
            total: snapshot.total,
            categories: snapshot.categories,
        };

        let json = serde_json::to_string_pretty(&exported)?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        Ok(exported)
    }
}
