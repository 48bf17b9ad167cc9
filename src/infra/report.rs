// ============================================================
// Layer 6 — Console Report
// ============================================================
// End-of-run reporting: a table of mean loss per epoch and a
// horizontal bar chart of the learning curve, printed to the
// console. Rendering is split into pure line-producing
// functions so the layout is unit-testable without capturing
// stdout.

const CHART_WIDTH: usize = 40;

/// Print the loss table and chart for a finished run.
pub fn render(epoch_losses: &[f64]) {
    for line in table_lines(epoch_losses) {
        println!("{line}");
    }
    println!();
    for line in chart_lines(epoch_losses, CHART_WIDTH) {
        println!("{line}");
    }
}

/// The per-epoch loss table, one row per epoch.
pub(crate) fn table_lines(epoch_losses: &[f64]) -> Vec<String> {
    let mut lines = vec![
        "epoch    loss".to_string(),
        "-------------".to_string(),
    ];
    for (epoch, loss) in epoch_losses.iter().enumerate() {
        lines.push(format!("{epoch:>5}  {loss:>7.4}"));
    }
    lines
}

/// A horizontal bar chart of loss versus epoch, scaled so the
/// worst epoch fills `width` cells. NaN epochs (zero batches)
/// render as an empty bar.
pub(crate) fn chart_lines(epoch_losses: &[f64], width: usize) -> Vec<String> {
    let max = epoch_losses
        .iter()
        .copied()
        .filter(|l| l.is_finite())
        .fold(0.0_f64, f64::max);

    epoch_losses
        .iter()
        .enumerate()
        .map(|(epoch, &loss)| {
            let cells = if loss.is_finite() && max > 0.0 {
                ((loss / max) * width as f64).round() as usize
            } else {
                0
            };
            format!("{epoch:>5} |{}", "█".repeat(cells))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_one_row_per_epoch_plus_header() {
        let lines = table_lines(&[3.0, 2.5, 2.1]);
        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains("3.0000"));
    }

    #[test]
    fn worst_epoch_fills_the_chart_width() {
        let lines = chart_lines(&[4.0, 2.0], 40);
        assert_eq!(lines[0].matches('█').count(), 40);
        assert_eq!(lines[1].matches('█').count(), 20);
    }

    #[test]
    fn nan_epochs_render_an_empty_bar() {
        let lines = chart_lines(&[f64::NAN, 1.0], 10);
        assert_eq!(lines[0].matches('█').count(), 0);
        assert_eq!(lines[1].matches('█').count(), 10);
    }

    #[test]
    fn empty_run_renders_nothing_but_the_header() {
        assert_eq!(table_lines(&[]).len(), 2);
        assert!(chart_lines(&[], 40).is_empty());
    }
}
