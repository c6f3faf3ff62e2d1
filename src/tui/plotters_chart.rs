//! Plotters-powered returns chart widget for Ratatui.
//!
//! Close, daily return, and cumulative return share the primary y axis; volume
//! is drawn as bars against a secondary axis scaled to the selection's peak.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
// `ratatui::style::Color` below shadows the prelude's trait; `filled()` needs it.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::view::{ChartView, SeriesToggles};

pub const CLOSE_COLOR: RGBColor = RGBColor(0, 255, 255);
pub const DAILY_COLOR: RGBColor = RGBColor(255, 255, 0);
pub const CUMULATIVE_COLOR: RGBColor = RGBColor(0, 255, 0);
pub const VOLUME_COLOR: RGBColor = RGBColor(160, 32, 240);

/// Render-only chart over a prepared [`ChartView`].
///
/// All series and bounds are computed outside the render call, so `render()`
/// only draws.
pub struct ReturnsChart<'a> {
    pub view: &'a ChartView,
    pub toggles: SeriesToggles,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for ReturnsChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.view.x_bounds;
        let [y0, y1] = self.view.y_bounds;
        let v1 = self.view.volume_max;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite() && v1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        let view = self.view;
        let toggles = self.toggles;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?
                .set_secondary_coord(x0..x1, 0.0..v1 * 1.05);

            // Mesh lines are clutter at terminal resolution.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Volume first so the lines stay on top.
            if toggles.volume {
                chart.draw_secondary_series(
                    view.volume
                        .iter()
                        .map(|&(x, v)| Rectangle::new([(x, 0.0), (x + 0.8, v)], VOLUME_COLOR.filled())),
                )?;
            }
            if toggles.close {
                chart.draw_series(LineSeries::new(view.close.iter().copied(), &CLOSE_COLOR))?;
            }
            if toggles.daily {
                chart.draw_series(LineSeries::new(view.daily.iter().copied(), &DAILY_COLOR))?;
            }
            if toggles.cumulative {
                chart.draw_series(LineSeries::new(view.cumulative.iter().copied(), &CUMULATIVE_COLOR))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
