use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "flashsheet")]
#[command(about = "Write data into spreadsheet templates without losing their formatting")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Insert JSON rows into a template, keeping the template's cell formatting
    Insert(InsertArgs),

    /// Write a sample template to try `insert` against
    Sample {
        /// Destination file (.xlsx or .json)
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Print cell values and style summaries of a region
    Inspect {
        /// Workbook to read (.xlsx or .json)
        path: PathBuf,

        /// Region in A1 notation (default: the sheet's used range)
        #[arg(long)]
        range: Option<String>,

        /// Sheet name (default: the active sheet)
        #[arg(long)]
        sheet: Option<String>,
    },
}

#[derive(Debug, clap::Args)]
pub struct InsertArgs {
    /// Template workbook (.xlsx or .json)
    #[arg(long, short = 't')]
    pub template: PathBuf,

    /// Destination workbook (.xlsx or .json)
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// JSON file holding an array of row objects
    #[arg(long, short = 'd')]
    pub data: PathBuf,

    /// Field to column mapping, e.g. `--map Ventas=B` (repeatable)
    #[arg(long = "map", value_name = "FIELD=COLUMN", required = true)]
    pub mappings: Vec<String>,

    /// Top-left cell of the first payload row
    #[arg(long, default_value = "A1")]
    pub start: String,

    /// Target sheet (default: FLASHSHEET_SHEET, then the active sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Turn ISO-8601 date strings into date values
    #[arg(long)]
    pub parse_dates: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}
