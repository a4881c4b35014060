use std::fs;
use std::io::Write;

use anyhow::Context;
use flashsheet_preserve::{
    create_excel_with_format_preservation_in_sheet, CellRestoreOutcome, ColumnMapping,
    PreservationOutcome, TabularPayload,
};

use crate::cli::InsertArgs;
use crate::config::Config;

/// Read the payload and mapping, then run the format-preserving write.
///
/// Argument problems are errors; a failed document run is reported through
/// the returned outcome.
pub fn run(args: &InsertArgs, config: &Config) -> anyhow::Result<PreservationOutcome> {
    let data = fs::read_to_string(&args.data)
        .with_context(|| format!("failed to read payload {}", args.data.display()))?;
    let payload = TabularPayload::from_json_str(&data, args.parse_dates || config.parse_dates)
        .with_context(|| format!("failed to parse payload {}", args.data.display()))?;
    let mapping = ColumnMapping::parse_entries(&args.mappings)?;
    let sheet = args.sheet.as_deref().or(config.default_sheet.as_deref());

    tracing::debug!(
        rows = payload.len(),
        mapping = %mapping.describe(),
        start = %args.start,
        sheet = ?sheet,
        "running insert"
    );

    Ok(create_excel_with_format_preservation_in_sheet(
        &args.template,
        &args.output,
        &payload,
        &mapping,
        &args.start,
        sheet,
    ))
}

pub fn print_outcome<W: Write>(
    outcome: &PreservationOutcome,
    as_json: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    if as_json {
        serde_json::to_writer_pretty(&mut *out, outcome)?;
        writeln!(out)?;
        return Ok(());
    }

    if let Some(diagnostic) = &outcome.diagnostic {
        writeln!(out, "failed: {diagnostic}")?;
        return Ok(());
    }

    writeln!(out, "{}", outcome.report)?;
    for (coord, failure) in outcome.report.failures() {
        if let CellRestoreOutcome::Failed {
            reason,
            value_reasserted,
        } = failure
        {
            let value = if *value_reasserted { "value kept" } else { "value lost" };
            writeln!(out, "  {coord}: {reason} ({value})")?;
        }
    }
    for (coord, reason) in outcome.report.write_failures() {
        writeln!(out, "  {coord}: not written: {reason}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashsheet_core::{CellCoord, CellValue, Color, Sheet, StyleDescriptor, Workbook};
    use flashsheet_io::{load_workbook, save_workbook};
    use flashsheet_preserve::RestoreReport;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn at(a1: &str) -> CellCoord {
        CellCoord::from_a1(a1).unwrap()
    }

    fn args(dir: &TempDir, mappings: &[&str]) -> InsertArgs {
        InsertArgs {
            template: dir.path().join("plantilla.json"),
            output: dir.path().join("salida.json"),
            data: dir.path().join("filas.json"),
            mappings: mappings.iter().map(|m| m.to_string()).collect(),
            start: "A2".to_string(),
            sheet: None,
            parse_dates: false,
            json: false,
        }
    }

    fn config() -> Config {
        Config {
            log_filter: "info".to_string(),
            default_sheet: None,
            parse_dates: false,
        }
    }

    fn write_template(path: &PathBuf) {
        let mut sheet = Sheet::new("Datos");
        let style = StyleDescriptor::new().with_solid_fill(Color::GREEN);
        sheet.set_style(at("B2"), &style).unwrap();
        sheet.set_value(at("B2"), CellValue::Number(0.0)).unwrap();
        let mut workbook = Workbook::empty();
        workbook.add_sheet(sheet).unwrap();
        save_workbook(&workbook, path).unwrap();
    }

    #[test]
    fn test_run_writes_output() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, &["Región=A", "Ventas=B"]);
        write_template(&args.template);
        fs::write(&args.data, r#"[{"Región": "Norte", "Ventas": 1234}]"#).unwrap();

        let outcome = run(&args, &config()).unwrap();
        assert!(outcome.success, "{:?}", outcome.diagnostic);

        let written = load_workbook(&args.output).unwrap();
        let sheet = written.active_sheet().unwrap();
        assert_eq!(sheet.value(at("A2")), &CellValue::Text("Norte".into()));
        assert_eq!(sheet.value(at("B2")), &CellValue::Number(1234.0));
        assert_eq!(
            sheet.style(at("B2")),
            &StyleDescriptor::new().with_solid_fill(Color::GREEN)
        );
    }

    #[test]
    fn test_bad_mapping_is_an_error() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, &["Ventas"]);
        fs::write(&args.data, "[]").unwrap();
        assert!(run(&args, &config()).is_err());
    }

    #[test]
    fn test_print_failure() {
        let outcome = PreservationOutcome {
            success: false,
            report: RestoreReport::default(),
            diagnostic: Some("sheet not found: Resumen".to_string()),
        };
        let mut out = Vec::new();
        print_outcome(&outcome, false, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "failed: sheet not found: Resumen\n");
    }

    #[test]
    fn test_print_report_lists_failures() {
        let mut report = RestoreReport::new(2);
        report.record(at("A2"), CellRestoreOutcome::Restored);
        report.record(
            at("B2"),
            CellRestoreOutcome::Failed {
                reason: "broken".to_string(),
                value_reasserted: true,
            },
        );
        report.record_write_failure(at("C2"), "locked");
        let outcome = PreservationOutcome {
            success: true,
            report,
            diagnostic: None,
        };

        let mut out = Vec::new();
        print_outcome(&outcome, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("(1 failed)"));
        assert!(text.contains("  B2: broken (value kept)"));
        assert!(text.contains("  C2: not written: locked"));

        let mut out = Vec::new();
        print_outcome(&outcome, true, &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["report"]["outcomes"]["B2"]["status"], "failed");
    }
}
