use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufRead, Write};
use thiserror::Error;

use crate::application::{CommitOutcome, ExpenseLedger, Mode};
use crate::domain::{Draft, Expense, ExpenseId, format_cents, format_money, short_id};
use crate::io::Exporter;

/// One line of session input.
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct SessionLine {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    /// Set the expense name in the form
    Name {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Set the amount in the form (e.g., "4.50" or "10")
    Amount {
        #[arg(allow_hyphen_values = true)]
        text: String,
    },

    /// Set the category in the form
    Category {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Save the form: adds a new expense, or updates the one being edited
    Submit,

    /// Fill the whole form and save it as a new expense
    Add {
        /// Expense name
        name: String,

        /// Amount (e.g., "4.50" or "10")
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Category
        category: String,
    },

    /// Load an expense into the form for editing
    Edit {
        /// Row number from `list`, or an id prefix
        reference: String,
    },

    /// Delete an expense
    Delete {
        /// Row number from `list`, or an id prefix
        reference: String,
    },

    /// Stop editing and clear the form
    Cancel,

    /// Show the form contents
    Draft,

    /// List all expenses
    List,

    /// Show the grand total and totals per category
    Totals,

    /// Category breakdown report
    Report {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export expenses
    Export {
        /// Format: csv, json
        format: String,

        /// Output file (session output if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// End the session
    #[command(alias = "exit")]
    Quit,
}

/// Problems with a line that never reach the ledger.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("Unterminated quote in input")]
    UnterminatedQuote,

    #[error("No expense matches '{0}'")]
    UnknownReference(String),

    #[error("'{0}' matches more than one expense, use a longer id prefix")]
    AmbiguousReference(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive view over an [`ExpenseLedger`]: reads commands, forwards
/// them to the ledger, and prints the resulting state.
pub struct Session<W: Write> {
    ledger: ExpenseLedger,
    currency: String,
    out: W,
    prompt: bool,
}

impl<W: Write> Session<W> {
    pub fn new(ledger: ExpenseLedger, currency: impl Into<String>, out: W) -> Self {
        Self {
            ledger,
            currency: currency.into(),
            out,
            prompt: false,
        }
    }

    /// Print a prompt before each line (for terminals).
    pub fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn ledger(&self) -> &ExpenseLedger {
        &self.ledger
    }

    pub fn into_parts(self) -> (ExpenseLedger, W) {
        (self.ledger, self.out)
    }

    pub fn greet(&mut self) -> Result<()> {
        writeln!(self.out, "Expense Tracker")?;
        writeln!(self.out, "Type 'help' for commands, 'quit' to leave.")?;
        Ok(())
    }

    /// Process lines until the input ends or a quit command is read.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        self.show_prompt()?;
        for line in input.lines() {
            let line = line.context("Failed to read session input")?;
            if self.execute_line(&line)? == Flow::Quit {
                break;
            }
            self.show_prompt()?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Parse and execute a single line. Only output failures are returned as
    /// errors; bad input is reported to the user and the session goes on.
    pub fn execute_line(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let words = match split_words(line) {
            Ok(words) => words,
            Err(err) => {
                writeln!(self.out, "{}", err)?;
                return Ok(Flow::Continue);
            }
        };

        match SessionLine::try_parse_from(words) {
            Ok(parsed) => self.execute(parsed.command),
            Err(err) => {
                write!(self.out, "{}", err)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn execute(&mut self, command: SessionCommand) -> Result<Flow> {
        match command {
            SessionCommand::Name { text } => self.ledger.set_name(text.join(" ")),
            SessionCommand::Amount { text } => self.ledger.set_amount(text),
            SessionCommand::Category { text } => self.ledger.set_category(text.join(" ")),
            SessionCommand::Submit => self.submit()?,

            SessionCommand::Add {
                name,
                amount,
                category,
            } => {
                if let Mode::Editing(id) = self.ledger.mode() {
                    writeln!(
                        self.out,
                        "Finish or cancel the edit of {} first",
                        short_id(id)
                    )?;
                } else {
                    self.ledger.set_draft(Draft::new(name, amount, category));
                    self.submit()?;
                }
            }

            SessionCommand::Edit { reference } => {
                match resolve_reference(self.ledger.expenses(), &reference) {
                    Ok(id) => {
                        self.ledger.begin_edit(id);
                        self.print_draft()?;
                    }
                    Err(err) => writeln!(self.out, "{}", err)?,
                }
            }

            SessionCommand::Delete { reference } => {
                match resolve_reference(self.ledger.expenses(), &reference) {
                    Ok(id) => {
                        if let Some(expense) = self.ledger.delete_expense(id) {
                            writeln!(
                                self.out,
                                "Deleted {}: {}",
                                expense.name,
                                format_money(expense.amount_cents, &self.currency)
                            )?;
                        }
                    }
                    Err(err) => writeln!(self.out, "{}", err)?,
                }
            }

            SessionCommand::Cancel => {
                if self.ledger.cancel_edit() {
                    writeln!(self.out, "Edit cancelled")?;
                } else {
                    writeln!(self.out, "Not editing")?;
                }
            }

            SessionCommand::Draft => self.print_draft()?,
            SessionCommand::List => self.print_list()?,
            SessionCommand::Totals => self.print_totals()?,
            SessionCommand::Report { format } => self.print_report(&format)?,

            SessionCommand::Export { format, output } => {
                if let Err(err) = self.export(&format, output.as_deref()) {
                    writeln!(self.out, "Export failed: {:#}", err)?;
                }
            }

            SessionCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn submit(&mut self) -> Result<()> {
        match self.ledger.commit() {
            Ok(CommitOutcome::Added(id)) => writeln!(self.out, "Added expense {}", short_id(id))?,
            Ok(CommitOutcome::Updated(id)) => {
                writeln!(self.out, "Updated expense {}", short_id(id))?
            }
            Ok(CommitOutcome::Dropped(id)) => writeln!(
                self.out,
                "Expense {} was deleted while being edited; nothing was saved",
                short_id(id)
            )?,
            Err(err) => writeln!(self.out, "Please enter valid expense details: {}", err)?,
        }
        Ok(())
    }

    fn print_draft(&mut self) -> Result<()> {
        let mode = self.ledger.mode();
        match mode {
            Mode::Adding => writeln!(self.out, "Mode: {}", mode.submit_label())?,
            Mode::Editing(id) => writeln!(
                self.out,
                "Mode: {} (editing {})",
                mode.submit_label(),
                short_id(id)
            )?,
        }

        let draft = self.ledger.draft();
        writeln!(self.out, "  Name:     {}", draft.name)?;
        writeln!(self.out, "  Amount:   {}", draft.amount)?;
        writeln!(self.out, "  Category: {}", draft.category)?;
        Ok(())
    }

    fn print_list(&mut self) -> Result<()> {
        let expenses = self.ledger.expenses();
        if expenses.is_empty() {
            writeln!(self.out, "No expenses added yet.")?;
            return Ok(());
        }

        for (row, expense) in expenses.iter().enumerate() {
            writeln!(
                self.out,
                "{:>3}. {}: {} (Category: {})  [{}]",
                row + 1,
                expense.name,
                format_money(expense.amount_cents, &self.currency),
                expense.category,
                expense.short_id()
            )?;
        }
        Ok(())
    }

    fn print_totals(&mut self) -> Result<()> {
        writeln!(
            self.out,
            "Total Expenses: {}",
            format_money(self.ledger.total_all(), &self.currency)
        )?;
        writeln!(self.out, "Expenses by Category:")?;
        for total in self.ledger.category_totals() {
            writeln!(
                self.out,
                "  {}: {}",
                total.category,
                format_money(total.total, &self.currency)
            )?;
        }
        Ok(())
    }

    fn print_report(&mut self, format: &str) -> Result<()> {
        let report = self.ledger.category_report();

        match format {
            "json" => {
                writeln!(self.out, "{}", serde_json::to_string_pretty(&report)?)?;
            }
            "csv" => {
                let mut csv_writer = csv::Writer::from_writer(&mut self.out);
                csv_writer.write_record(["category", "total", "count", "percentage"])?;
                for cat in &report.categories {
                    csv_writer.write_record([
                        cat.category.clone(),
                        cat.total.to_string(),
                        cat.count.to_string(),
                        format!("{:.2}", cat.percentage),
                    ])?;
                }
                csv_writer.flush()?;
            }
            "table" => {
                writeln!(self.out, "Category Spending Report")?;
                writeln!(
                    self.out,
                    "Generated: {}",
                    report.generated_at.format("%Y-%m-%d %H:%M:%S")
                )?;
                writeln!(self.out)?;
                writeln!(
                    self.out,
                    "{:<20} {:>12} {:>8} {:>8}",
                    "CATEGORY", "TOTAL", "COUNT", "PERCENT"
                )?;
                writeln!(self.out, "{}", "-".repeat(51))?;

                for cat in &report.categories {
                    writeln!(
                        self.out,
                        "{:<20} {:>12} {:>8} {:>7.1}%",
                        truncate(&cat.category, 20),
                        format_cents(cat.total),
                        cat.count,
                        cat.percentage
                    )?;
                }

                writeln!(self.out, "{}", "-".repeat(51))?;
                writeln!(self.out, "{:<20} {:>12}", "TOTAL", format_cents(report.total))?;
            }
            other => {
                writeln!(
                    self.out,
                    "Unknown report format '{}'. Use table, json or csv",
                    other
                )?;
            }
        }
        Ok(())
    }

    fn export(&mut self, format: &str, output: Option<&str>) -> Result<()> {
        if !matches!(format, "csv" | "json") {
            bail!("unknown export format '{}', use csv or json", format);
        }

        let exporter = Exporter::new(&self.ledger);
        let writer: Box<dyn Write + '_> = match output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file: {}", path))?;
                Box::new(file)
            }
            None => Box::new(&mut self.out),
        };

        let count = match format {
            "csv" => exporter.export_expenses_csv(writer)?,
            _ => exporter.export_snapshot_json(writer)?.expenses.len(),
        };

        if let Some(path) = output {
            writeln!(self.out, "Exported {} expenses to {}", count, path)?;
        }
        Ok(())
    }

    fn show_prompt(&mut self) -> Result<()> {
        if self.prompt {
            let label = self.ledger.mode().submit_label();
            write!(self.out, "[{}] > ", label)?;
            self.out.flush()?;
        }
        Ok(())
    }
}

/// Split a line into words on whitespace. Single or double quotes group
/// words and may produce an empty word (`""`).
pub fn split_words(line: &str) -> Result<Vec<String>, InputError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(InputError::UnterminatedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Resolve a user reference to an expense id.
///
/// All-digit references are 1-based row numbers as printed by `list`.
/// Anything else is matched as a prefix (4+ characters) of the id, with or
/// without hyphens.
pub fn resolve_reference(expenses: &[Expense], reference: &str) -> Result<ExpenseId, InputError> {
    let unknown = || InputError::UnknownReference(reference.to_string());

    if reference.bytes().all(|b| b.is_ascii_digit()) && !reference.is_empty() {
        return reference
            .parse::<usize>()
            .ok()
            .and_then(|row| row.checked_sub(1))
            .and_then(|index| expenses.get(index))
            .map(|e| e.id)
            .ok_or_else(unknown);
    }

    let needle = reference.to_lowercase();
    if needle.len() < 4 {
        return Err(unknown());
    }

    let mut matches = expenses.iter().filter(|e| {
        e.id.hyphenated().to_string().starts_with(&needle)
            || e.id.simple().to_string().starts_with(&needle)
    });

    match (matches.next(), matches.next()) {
        (Some(expense), None) => Ok(expense.id),
        (None, _) => Err(unknown()),
        (Some(_), Some(_)) => Err(InputError::AmbiguousReference(reference.to_string())),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
