use anyhow::{Context, Result};
use netlat_abstract::Metric;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

use crate::report::LevelSummary;

/// Render one "metric vs latency" line chart per metric into `dir`.
/// Returns the paths that were written.
pub fn render_charts(summaries: &[LevelSummary], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chart directory {}", dir.display()))?;
    Metric::ALL
        .iter()
        .map(|&metric| {
            let path = dir.join(format!("{}_vs_latency.svg", metric.slug()));
            plot_metric(summaries, metric, &path)
                .with_context(|| format!("Failed to render {}", path.display()))?;
            Ok(path)
        })
        .collect()
}

fn series_color(metric: Metric) -> RGBColor {
    match metric {
        Metric::ResponseTime => BLUE,
        Metric::Throughput => RGBColor(255, 165, 0),
        Metric::PacketLoss => RED,
    }
}

fn plot_metric(
    summaries: &[LevelSummary],
    metric: Metric,
    path: &Path,
) -> Result<()> {
    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let points: Vec<(f64, f64)> = summaries
        .iter()
        .map(|s| (s.latency_ms, s.metric(metric)))
        .collect();
    let max_x = points.iter().map(|p| p.0).fold(1.0, f64::max);
    let max_y = points.iter().map(|p| p.1).fold(1.0, f64::max);

    let label = metric.label();
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} vs. Latency", label), ("sans-serif", 30))
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..max_x * 1.05, 0f64..max_y * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Latency (ms)")
        .y_desc(label)
        .draw()?;

    let color = series_color(metric);
    chart
        .draw_series(LineSeries::new(points.clone(), color))?
        .label(label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    chart.draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 4, color.filled())))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_three_svg_files() {
        let dir = tempfile::tempdir().unwrap();
        let summaries = vec![
            LevelSummary {
                latency_ms: 0.0,
                samples: 3,
                response_time_ms: 3.0,
                throughput_mbps: 100.0,
                packet_loss_pct: 0.0,
            },
            LevelSummary {
                latency_ms: 100.0,
                samples: 3,
                response_time_ms: 237.0,
                throughput_mbps: 8.0,
                packet_loss_pct: 17.0,
            },
        ];
        let paths = render_charts(&summaries, dir.path()).unwrap();
        assert_eq!(paths.len(), 3);
        for path in paths {
            let svg = std::fs::read_to_string(&path).unwrap();
            assert!(svg.contains("<svg"), "{} is not svg", path.display());
        }
    }
}
