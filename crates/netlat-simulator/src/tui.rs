use std::{
    io,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::engine::{Simulator, TimelineKind};
use crate::report;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use netlat_abstract::Metric;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Points};
use ratatui::{
    prelude::*,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, Paragraph},
};

/// A tracing subscriber that writes to a shared buffer for TUI display
#[derive(Clone)]
pub struct MemoryLogBuffer {
    logs: Arc<Mutex<Vec<String>>>,
}

impl Default for MemoryLogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLogBuffer {
    pub fn new() -> Self {
        Self {
            logs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, msg: String) {
        // a poisoned buffer only loses log lines
        if let Ok(mut logs) = self.logs.lock() {
            logs.push(msg);
            // Keep last 1000 logs
            if logs.len() > 1000 {
                logs.remove(0);
            }
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.logs.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl io::Write for MemoryLogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.push(s.trim().to_string());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct TuiApp {
    simulator: Simulator,
    paused: bool,
    scenario_name: Option<String>,
    /// Vertical scroll offset for the timeline list
    timeline_scroll: usize,
    logs: Option<MemoryLogBuffer>,
}

impl TuiApp {
    pub fn new(simulator: Simulator, scenario_name: Option<String>) -> Self {
        Self {
            simulator,
            paused: true, // Start paused
            scenario_name,
            timeline_scroll: 0,
            logs: None,
        }
    }

    /// Show the lines captured by `logs` in a panel next to the timeline.
    pub fn with_logs(mut self, logs: MemoryLogBuffer) -> Self {
        self.logs = Some(logs);
        self
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(100);
        let mut last_tick = Instant::now();

        self.simulator.init();

        loop {
            terminal.draw(|f| self.ui(f))?;

            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));

            if crossterm::event::poll(timeout)?
                && let Event::Key(key) = event::read()?
            {
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char(' ') => self.paused = !self.paused,
                    KeyCode::Char('s') => {
                        self.simulator.step();
                    }
                    KeyCode::Up => {
                        self.timeline_scroll = self.timeline_scroll.saturating_add(1);
                    }
                    KeyCode::Down => {
                        self.timeline_scroll = self.timeline_scroll.saturating_sub(1);
                    }
                    _ => {}
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if !self.paused && !self.simulator.step() {
                    self.paused = true;
                }
                last_tick = Instant::now();
            }
        }

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    pub fn into_simulator(self) -> Simulator {
        self.simulator
    }

    fn ui(&self, f: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Control bar
                Constraint::Length(9),  // Stage lanes
                Constraint::Min(0),     // Metric charts
                Constraint::Length(10), // Timeline + logs
            ])
            .split(f.area());

        self.render_control(f, rows[0]);
        self.render_stage_lanes(f, rows[1]);

        let chart_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(rows[2]);
        for (metric, area) in Metric::ALL.into_iter().zip(chart_chunks.iter()) {
            self.render_metric_chart(f, *area, metric);
        }

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[3]);
        self.render_timeline(f, bottom[0]);
        self.render_logs(f, bottom[1]);
    }

    fn render_control(&self, f: &mut Frame, area: Rect) {
        let scenario = self.scenario_name.as_deref().unwrap_or("Ad-hoc Simulation");
        let cfg = self.simulator.config();
        let status_text = format!(
            "Scenario: {} | Time: {:.1} ms | Status: {} | Pending: {} | Records: {}/{} | (q)uit (space)pause/resume (s)tep",
            scenario,
            self.simulator.current_time(),
            if self.paused { "PAUSED" } else { "RUNNING" },
            self.simulator.remaining_events(),
            self.simulator.records().len(),
            cfg.total_clients()
        );
        let status_block = Paragraph::new(status_text)
            .block(Block::default().borders(Borders::ALL).title("Control"));
        f.render_widget(status_block, area);
    }

    fn render_metric_chart(&self, f: &mut Frame, area: Rect, metric: Metric) {
        let summary = report::summarize(self.simulator.records());
        if summary.is_empty() {
            let block = Paragraph::new("No records yet")
                .block(Block::default().borders(Borders::ALL).title(metric.label()));
            f.render_widget(block, area);
            return;
        }

        let pts: Vec<(f64, f64)> = summary
            .iter()
            .map(|s| (s.latency_ms, s.metric(metric)))
            .collect();
        let x_max = pts.iter().map(|p| p.0).fold(1.0, f64::max);
        let mut y_max = pts.iter().map(|p| p.1).fold(0.0, f64::max);
        if y_max < f64::EPSILON {
            y_max = 1.0;
        }

        let color = match metric {
            Metric::ResponseTime => Color::Cyan,
            Metric::Throughput => Color::Yellow,
            Metric::PacketLoss => Color::Red,
        };
        let datasets = vec![
            Dataset::default()
                .name(metric.slug())
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(color))
                .graph_type(GraphType::Line)
                .data(&pts),
        ];

        let chart = Chart::new(datasets)
            .block(Block::default().borders(Borders::ALL).title(metric.label()))
            .x_axis(
                Axis::default()
                    .title("latency")
                    .bounds([0.0, x_max])
                    .labels(vec![Span::raw("0"), Span::raw(format!("{:.0}", x_max))]),
            )
            .y_axis(
                Axis::default()
                    .bounds([0.0, y_max])
                    .labels(vec![Span::raw("0"), Span::raw(format!("{:.1}", y_max))]),
            );

        f.render_widget(chart, area);
    }

    fn render_stage_lanes(&self, f: &mut Frame, area: Rect) {
        let events = self.simulator.timeline();
        if events.is_empty() {
            let block = Paragraph::new("No activity yet")
                .block(Block::default().borders(Borders::ALL).title("Path"));
            f.render_widget(block, area);
            return;
        }

        let max_events = (area.width as usize).saturating_sub(4).max(4);
        let window = &events[events.len().saturating_sub(max_events)..];

        let t_min = window.first().map(|e| e.time).unwrap_or(0.0);
        let mut t_max = window.last().map(|e| e.time).unwrap_or(1.0);
        if (t_max - t_min).abs() < f64::EPSILON {
            t_max += 1.0;
        }

        // lanes: 0 = client, 1 = switch, 2 = router
        let mut spawns: Vec<(f64, f64)> = Vec::new();
        let mut arrivals: Vec<(f64, f64)> = Vec::new();
        let mut hops: Vec<CanvasLine> = Vec::new();
        for e in window {
            match e.kind {
                TimelineKind::Spawn => spawns.push((e.time, 0.0)),
                TimelineKind::Send => hops.push(CanvasLine {
                    x1: e.time,
                    y1: 0.0,
                    x2: e.time + e.latency / 2.0,
                    y2: 1.0,
                    color: Color::White,
                }),
                TimelineKind::SwitchDone => hops.push(CanvasLine {
                    x1: e.time,
                    y1: 1.0,
                    x2: e.time + e.latency / 2.0,
                    y2: 2.0,
                    color: Color::White,
                }),
                TimelineKind::RouterDone => arrivals.push((e.time, 2.0)),
            }
        }

        let canvas = Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Client -> Switch -> Router"),
            )
            .x_bounds([t_min, t_max])
            .y_bounds([-0.5, 2.5])
            .paint(move |ctx| {
                for (y, color) in [(0.0, Color::Cyan), (1.0, Color::Gray), (2.0, Color::Yellow)] {
                    ctx.draw(&CanvasLine {
                        x1: t_min,
                        y1: y,
                        x2: t_max,
                        y2: y,
                        color,
                    });
                }

                ctx.print(t_min, 0.0, "C");
                ctx.print(t_min, 1.0, "SW");
                ctx.print(t_min, 2.0, "R");

                for line in &hops {
                    ctx.draw(line);
                }
                if !spawns.is_empty() {
                    ctx.draw(&Points {
                        coords: &spawns,
                        color: Color::Blue,
                    });
                }
                if !arrivals.is_empty() {
                    ctx.draw(&Points {
                        coords: &arrivals,
                        color: Color::Green,
                    });
                }
            });

        f.render_widget(canvas, area);
    }

    fn render_timeline(&self, f: &mut Frame, area: Rect) {
        let events = self.simulator.timeline();
        if events.is_empty() {
            let block = Paragraph::new("No events yet")
                .block(Block::default().borders(Borders::ALL).title("Timeline"));
            f.render_widget(block, area);
            return;
        }

        let height = area.height.max(3) as usize;
        let visible = height - 2; // account for borders
        let total = events.len();
        let max_scroll = total.saturating_sub(visible);
        let scroll = self.timeline_scroll.min(max_scroll);
        let start = total.saturating_sub(visible + scroll);
        let end = total.saturating_sub(scroll).max(start);

        let items: Vec<ListItem> = events[start..end]
            .iter()
            .map(|e| {
                let (label, style) = match e.kind {
                    TimelineKind::Spawn => ("spawned", Style::default().fg(Color::Blue)),
                    TimelineKind::Send => ("sent to switch", Style::default().fg(Color::White)),
                    TimelineKind::SwitchDone => {
                        ("forwarded to router", Style::default().fg(Color::White))
                    }
                    TimelineKind::RouterDone => ("arrived", Style::default().fg(Color::Green)),
                };
                let text = format!(
                    "[{:>8.1} ms] {} @ {}ms {}",
                    e.time, e.client, e.latency, label
                );
                ListItem::new(Line::from(Span::styled(text, style)))
            })
            .collect();

        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Timeline"));

        f.render_widget(list, area);
    }

    fn render_logs(&self, f: &mut Frame, area: Rect) {
        let lines = self.logs.as_ref().map(|l| l.snapshot()).unwrap_or_default();
        let visible = (area.height as usize).saturating_sub(2);
        let items: Vec<ListItem> = lines[lines.len().saturating_sub(visible)..]
            .iter()
            .map(|l| ListItem::new(Line::from(l.as_str())))
            .collect();
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Logs"));
        f.render_widget(list, area);
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryLogBuffer, TuiApp};
    use crate::engine::Simulator;
    use netlat_abstract::SimConfig;
    use ratatui::{Terminal, backend::TestBackend};
    use std::io::Write;

    #[test]
    fn log_buffer_keeps_latest_lines() {
        let mut buffer = MemoryLogBuffer::new();
        for i in 0..1005 {
            buffer.write_all(format!("line {i}\n").as_bytes()).unwrap();
        }
        let logs = buffer.snapshot();
        assert_eq!(logs.len(), 1000);
        assert_eq!(logs[0], "line 5");
        assert_eq!(logs[999], "line 1004");
    }

    #[test]
    fn log_panel_shows_captured_lines() {
        let logs = MemoryLogBuffer::new();
        logs.push("Spawned 18 clients".to_string());
        let sim = Simulator::from_config(SimConfig::default()).unwrap();
        let app = TuiApp::new(sim, None).with_logs(logs.clone());

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| app.ui(f)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Logs"));
        assert!(screen.contains("Spawned 18 clients"));
    }
}
