use kabuscore_core::{evaluate_ratios, RatingResult, Ratios};
use serde::Serialize;

use crate::cli::ScoreArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ScoreResponseData {
    ratios: Ratios,
    rating: RatingResult,
    label: String,
}

pub fn run(args: &ScoreArgs) -> Result<CommandResult, CliError> {
    let ratios = Ratios::new(args.per, args.pbr, args.roe, args.dividend_yield)?;
    let rating = evaluate_ratios(&ratios);
    let no_ratios = rating.contributions.is_empty();

    let data = serde_json::to_value(ScoreResponseData {
        ratios,
        label: rating.label(),
        rating,
    })?;

    let mut result = CommandResult::ok(data, None);
    if no_ratios {
        result = result.with_warning("no usable valuation ratios; score is 0");
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(per: Option<f64>, pbr: Option<f64>, roe: Option<f64>, dy: Option<f64>) -> ScoreArgs {
        ScoreArgs {
            per,
            pbr,
            roe,
            dividend_yield: dy,
        }
    }

    #[test]
    fn scores_command_line_ratios() {
        let result = run(&args(Some(12.0), Some(2.0), Some(10.0), Some(2.0))).expect("scored");

        assert_eq!(result.data["rating"]["score"], 55);
        assert_eq!(result.data["rating"]["tier"], "caution-advised");
        assert_eq!(result.data["label"], "Caution advised (good-ROE)");
        assert!(result.source.is_none());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn omitted_ratios_score_zero_with_warning() {
        let result = run(&args(None, None, None, None)).expect("scored");

        assert_eq!(result.data["rating"]["score"], 0);
        assert_eq!(result.data["label"], "High risk");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn non_finite_ratio_is_rejected() {
        let error = run(&args(Some(f64::NAN), None, None, None)).expect_err("nan rejected");
        assert_eq!(error.exit_code(), 2);
    }
}
