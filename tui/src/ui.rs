use pathviz_core::{CellKind, CellMarks, logger::Severity};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Widget},
};

use crate::app::{App, Tone};

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        use Constraint::*;

        let logs_height = if self.show_logs { 10 } else { 0 };
        let layout = Layout::vertical([Length(3), Min(0), Length(logs_height), Length(4)]);
        let [header_area, grid_area, logs_area, footer_area] = layout.areas(area);

        render_header(self, header_area, buf);
        render_grid(self, grid_area, buf);
        if self.show_logs {
            render_logs(self, logs_area, buf);
        }
        render_footer(self, footer_area, buf);
    }
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::bordered()
        .title(" pathviz ")
        .title_alignment(Alignment::Center)
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    block.render(area, buf);

    let mut spans = vec![
        Span::from(" solver "),
        Span::styled(app.solver.to_string(), Style::default().bold().fg(Color::LightMagenta)),
        Span::from("  maze "),
        Span::styled(app.generator.to_string(), Style::default().fg(Color::Magenta)),
        Span::from("  server "),
        Span::styled(app.config.server_addr.clone(), Style::default().fg(Color::Cyan)),
    ];
    if let Some(label) = &app.in_flight {
        spans.push(Span::from("  "));
        spans.push(Span::styled(
            format!("[{label} in flight]"),
            Style::default().fg(Color::Yellow),
        ));
    } else if app.is_replaying() {
        spans.push(Span::from("  "));
        spans.push(Span::styled("[replaying]", Style::default().fg(Color::Yellow)));
    }
    Paragraph::new(Line::from(spans)).render(inner, buf);
}

fn render_grid(app: &mut App, area: Rect, buf: &mut Buffer) {
    let block = Block::bordered()
        .title(format!(" {}x{} ", app.board.rows(), app.board.columns()))
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    block.render(area, buf);

    let cells_w = (app.board.columns() * 2).min(u16::MAX as usize) as u16;
    let cells_h = app.board.rows().min(u16::MAX as usize) as u16;
    if inner.width < cells_w || inner.height < cells_h {
        app.grid_area = Rect::default();
        Paragraph::new("terminal too small for the grid")
            .style(Style::default().fg(Color::Red))
            .centered()
            .render(inner, buf);
        return;
    }

    // Center the cell region and remember where it landed; the mouse
    // hit-test maps back through it.
    let x0 = inner.x + (inner.width - cells_w) / 2;
    let y0 = inner.y + (inner.height - cells_h) / 2;
    app.grid_area = Rect::new(x0, y0, cells_w, cells_h);

    for pos in app.board.iter_positions() {
        // Both lookups are in range by construction.
        let kind = app.board.kind_of(pos).unwrap_or(CellKind::Empty);
        let marks = app.board.marks_of(pos).unwrap_or_default();
        let (symbol, style) = cell_appearance(kind, marks);
        let x = x0 + pos.1 as u16 * 2;
        let y = y0 + pos.0 as u16;
        buf.set_string(x, y, symbol, style);
    }
}

/// Presentation is a pure function of category and marks: terminals always
/// show through, walls hide marks, and the marks rank
/// solution > current > visited.
fn cell_appearance(kind: CellKind, marks: CellMarks) -> (&'static str, Style) {
    match kind {
        CellKind::Start => ("S ", Style::default().fg(Color::Black).bg(Color::Green).bold()),
        CellKind::End => ("E ", Style::default().fg(Color::Black).bg(Color::Red).bold()),
        CellKind::Wall => ("██", Style::default().fg(Color::Gray)),
        CellKind::Empty => {
            if marks.solution {
                ("██", Style::default().fg(Color::Yellow))
            } else if marks.current {
                ("██", Style::default().fg(Color::LightBlue))
            } else if marks.visited {
                ("░░", Style::default().fg(Color::LightBlue))
            } else {
                ("· ", Style::default().fg(Color::DarkGray))
            }
        }
    }
}

fn render_logs(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::bordered()
        .title(" logs ")
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    block.render(area, buf);

    let visible = inner.height as usize;
    let lines: Vec<Line> = app
        .logs
        .iter()
        .rev()
        .take(visible)
        .rev()
        .map(|entry| {
            let style = match entry.level {
                Severity::Error => Style::default().fg(Color::Red),
                Severity::Warn => Style::default().fg(Color::Yellow),
                Severity::Info => Style::default(),
                Severity::Debug => Style::default().dim(),
            };
            Line::from(Span::styled(entry.to_string(), style))
        })
        .collect();
    Paragraph::new(lines).render(inner, buf);
}

fn render_footer(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::bordered().border_type(BorderType::Rounded);
    let inner = block.inner(area);
    block.render(area, buf);

    let key = |k: &'static str| Span::styled(k, Style::default().bold().fg(Color::LightMagenta));
    let hints = Line::from(vec![
        key("r"),
        Span::from(" run  "),
        key("m"),
        Span::from(" maze  "),
        key("c"),
        Span::from(" clear  "),
        key("C"),
        Span::from(" clear+walls  "),
        key("1"),
        Span::from("/"),
        key("2"),
        Span::from("/"),
        key("3"),
        Span::from(" solver  "),
        key("l"),
        Span::from(" logs  "),
        key("q"),
        Span::from(" quit"),
    ]);

    let status = match &app.status {
        Some(status) => {
            let style = match status.tone {
                Tone::Info => Style::default(),
                Tone::Positive => Style::default().fg(Color::Green),
                Tone::Negative => Style::default().fg(Color::Red),
            };
            Line::from(Span::styled(status.text.clone(), style))
        }
        None => Line::from("paint walls with the mouse, then run"),
    };

    Paragraph::new(vec![hints, status]).render(inner, buf);
}
