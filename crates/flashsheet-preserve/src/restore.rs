use std::collections::HashMap;

use flashsheet_core::{
    BorderEdge, CellContent, CellCoord, Color, ColorRef, FillStyle, FontSize, StyleDescriptor,
};

use crate::backup::RegionBackup;
use crate::error::RestoreError;
use crate::report::{CellRestoreOutcome, RestoreReport};
use crate::snapshot::CellStyleSnapshot;
use crate::store::CellStore;

fn parse_color(field: &'static str, hex: &str) -> Result<ColorRef, RestoreError> {
    Color::from_argb_hex(hex)
        .map(ColorRef::Rgb)
        .ok_or_else(|| RestoreError::InvalidColor {
            field,
            value: hex.to_string(),
        })
}

/// Reapply the recorded attributes of `snapshot` on top of `style`.
///
/// Attributes the snapshot did not record keep their current value. On
/// error `style` may be partially updated.
pub fn apply_snapshot(
    style: &mut StyleDescriptor,
    snapshot: &CellStyleSnapshot,
) -> Result<(), RestoreError> {
    let font = &snapshot.font;
    if let Some(name) = &font.name {
        style.font.name = Some(name.clone());
    }
    if let Some(size) = font.size {
        style.font.size = Some(FontSize::from_points(size));
    }
    style.font.bold = font.bold;
    style.font.italic = font.italic;
    if let Some(hex) = &font.color {
        style.font.color = Some(parse_color("font", hex)?);
    }

    // Single solid-color semantics: the recorded color is both start and end
    if let (Some(hex), Some(pattern)) = (&snapshot.fill.color, snapshot.fill.pattern) {
        let color = parse_color("fill", hex)?;
        style.fill = FillStyle {
            pattern,
            fg_color: Some(color),
            bg_color: Some(color),
        };
    }

    for edge in BorderEdge::ALL {
        let recorded = snapshot.borders.side(edge);
        let Some(line) = recorded.style else {
            continue;
        };
        let side = style.borders.side_mut(edge);
        side.style = line;
        if let Some(hex) = &recorded.color {
            side.color = Some(parse_color("border", hex)?);
        }
    }

    let alignment = &snapshot.alignment;
    if let Some(horizontal) = alignment.horizontal {
        style.alignment.horizontal = Some(horizontal);
    }
    if let Some(vertical) = alignment.vertical {
        style.alignment.vertical = Some(vertical);
    }
    if let Some(wrap) = alignment.wrap_text {
        style.alignment.wrap_text = Some(wrap);
    }

    if !snapshot.number_format.is_general() {
        style.number_format = snapshot.number_format.clone();
    }

    Ok(())
}

/// Reapply one snapshot to the cell at `coord`
pub fn restore_cell<S>(
    store: &mut S,
    coord: CellCoord,
    snapshot: &CellStyleSnapshot,
) -> Result<(), RestoreError>
where
    S: CellStore + ?Sized,
{
    let mut style = store.style(coord).clone();
    apply_snapshot(&mut style, snapshot)?;
    store.set_style(coord, &style)?;
    Ok(())
}

/// Reapply every snapshot of `backup`, isolating failures per cell.
///
/// A cell whose style is still the one captured is left alone, so colors the
/// snapshot cannot express exactly (theme, indexed, two-color patterns) stay
/// as they were. When a cell's formatting cannot be restored its value is
/// written again: the overwrite value if the cell was a write target,
/// otherwise the captured one.
pub fn restore_region<S>(
    store: &mut S,
    backup: &RegionBackup,
    written: &HashMap<CellCoord, CellContent>,
) -> RestoreReport
where
    S: CellStore + ?Sized,
{
    let mut report = RestoreReport::new(written.len());

    for (coord, snapshot) in backup.iter() {
        let intact = backup
            .captured_style(coord)
            .is_some_and(|captured| store.style(coord) == captured);
        if intact {
            report.record(coord, CellRestoreOutcome::Unchanged);
            continue;
        }

        let outcome = match restore_cell(store, coord, snapshot) {
            Ok(()) => CellRestoreOutcome::Restored,
            Err(err) => {
                let value = written
                    .get(&coord)
                    .cloned()
                    .unwrap_or_else(|| snapshot.value.clone());
                let value_reasserted = match store.set_content(coord, value) {
                    Ok(()) => true,
                    Err(write_err) => {
                        tracing::warn!(cell = %coord, error = %write_err, "could not reassert value");
                        false
                    }
                };
                tracing::warn!(
                    cell = %coord,
                    error = %err,
                    value_reasserted,
                    "formatting not restored"
                );
                CellRestoreOutcome::Failed {
                    reason: err.to_string(),
                    value_reasserted,
                }
            }
        };
        report.record(coord, outcome);
    }

    report
}
