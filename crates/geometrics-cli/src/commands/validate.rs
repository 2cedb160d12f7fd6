//! Validate command implementation

use crate::cli::ValidateArgs;
use crate::input::load_units;
use crate::output::OutputWriter;
use crate::output_types::{UnitValidation, ValidateOutput};
use crate::progress::progress_bar_for;
use anyhow::Result;
use geometrics_eval::EvaluationUnit;
use tabled::Tabled;

pub fn execute(args: ValidateArgs, output: &OutputWriter) -> Result<()> {
    let units = load_units(&args.input)?;

    let pb = progress_bar_for(output.is_json(), units.len() as u64, "Validating shapes");

    let mut shapes_total = 0;
    let validations: Vec<UnitValidation> = units
        .iter()
        .map(|input| {
            shapes_total += input.shape_count();
            // No confidence floor: every shape is checked
            let unit = EvaluationUnit::build(input, None);
            pb.inc(1);
            UnitValidation {
                unit: unit.id,
                references: input.references.len(),
                candidates: input.candidates.len(),
                excluded: unit.excluded,
            }
        })
        .collect();
    pb.finish_and_clear();

    let shapes_excluded: usize = validations.iter().map(|v| v.excluded.len()).sum();

    if output.is_json() {
        return output.result(ValidateOutput { units: validations, shapes_total, shapes_excluded });
    }

    output.section("Validation");

    #[derive(Tabled)]
    struct UnitRow {
        #[tabled(rename = "Unit")]
        unit: String,
        #[tabled(rename = "References")]
        references: usize,
        #[tabled(rename = "Candidates")]
        candidates: usize,
        #[tabled(rename = "Excluded")]
        excluded: usize,
    }

    let rows: Vec<UnitRow> = validations
        .iter()
        .map(|v| UnitRow {
            unit: v.unit.clone(),
            references: v.references,
            candidates: v.candidates,
            excluded: v.excluded.len(),
        })
        .collect();
    output.table(rows);

    if args.verbose {
        for validation in &validations {
            for shape in &validation.excluded {
                output.warning(format!(
                    "{}: {} #{}: {}",
                    validation.unit, shape.side, shape.index, shape.reason
                ));
            }
        }
    }

    if shapes_excluded == 0 {
        output.success(format!("All {} shapes are valid", shapes_total));
    } else {
        output.warning(format!(
            "{} of {} shapes are invalid and would be counted as errors",
            shapes_excluded, shapes_total
        ));
    }

    Ok(())
}
