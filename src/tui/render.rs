//! Scanner screen rendering.
//!
//! Rendering is decoupled from the runner via [`RenderContext`]:
//!
//! ```text
//! TuiRunner ──builds──> RenderContext ──passed to──> render()
//! ```
//!
//! The main screen shows the capture status and the last code; when the
//! session is displaying a result, a centered dialog lists the record's
//! fields (or "Produto não encontrado" for a miss).

// Rust guideline compliant 2026-01

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::constants;
use crate::dispatch::SessionView;
use crate::record::{FieldValue, TributeRecord};

/// Everything a frame needs.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Latest session snapshot.
    pub view: &'a SessionView,
    /// Characters captured so far.
    pub input: &'a str,
    /// Whether the capture currently holds focus.
    pub focused: bool,
}

/// Draws one frame.
pub fn render(frame: &mut Frame<'_>, ctx: &RenderContext<'_>) {
    let area = frame.area();

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(" Scanner de Códigos ")
        .title_alignment(Alignment::Center);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(status_line(ctx.view)).alignment(Alignment::Center),
        chunks[0],
    );

    let code_line = match &ctx.view.code {
        Some(code) if !ctx.view.scanning || ctx.view.show_result => {
            Line::from(vec![Span::raw("Código: "), Span::styled(code.clone(), bold())])
        }
        _ => Line::from(""),
    };
    frame.render_widget(
        Paragraph::new(code_line).alignment(Alignment::Center),
        chunks[1],
    );

    let capture_style = if ctx.focused {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("> ", capture_style),
            Span::styled(ctx.input.to_string(), capture_style),
        ])),
        chunks[2],
    );

    frame.render_widget(
        Paragraph::new("Esc fechar · Ctrl+N nova leitura · Ctrl+C sair")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        chunks[4],
    );

    if ctx.view.show_result {
        render_result_dialog(frame, ctx.view);
    }
}

fn status_line(view: &SessionView) -> Line<'static> {
    if view.scanning {
        Line::from(Span::styled(
            "Aguardando leitura...",
            Style::default().fg(Color::Yellow),
        ))
    } else if view.code.is_some() && !view.show_result {
        Line::from(Span::styled(
            "Consultando tributos...",
            Style::default().fg(Color::Cyan),
        ))
    } else if view.code.is_some() {
        Line::from(Span::styled(
            "Código detectado!",
            Style::default().fg(Color::Green),
        ))
    } else {
        Line::from("Clique ou foque a janela para iniciar a leitura")
    }
}

fn render_result_dialog(frame: &mut Frame<'_>, view: &SessionView) {
    let area = centered_rect(
        constants::RESULT_DIALOG_WIDTH_PERCENT,
        constants::RESULT_DIALOG_HEIGHT_PERCENT,
        frame.area(),
    );
    frame.render_widget(Clear, area);

    let mut lines = Vec::new();
    if let Some(code) = &view.code {
        lines.push(Line::from(vec![
            Span::raw("Código: "),
            Span::styled(code.clone(), bold()),
        ]));
        lines.push(Line::from(""));
    }

    match &view.record {
        Some(record) => {
            for (label, value) in record_lines(record) {
                lines.push(Line::from(vec![
                    Span::styled(format!("{}: ", label), bold()),
                    Span::raw(value),
                ]));
            }
        }
        None => lines.push(Line::from(Span::styled(
            "Produto não encontrado",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))),
    }

    let dialog = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Tributos ")
            .title_bottom(Line::from(" Esc para fechar ").alignment(Alignment::Center)),
    );
    frame.render_widget(dialog, area);
}

/// Label/value pairs for a record, in display order.
///
/// The shape's leading fields come first, then the rest alphabetically.
/// Percentage fields get a `%` suffix.
pub fn record_lines(record: &TributeRecord) -> Vec<(String, String)> {
    let shape = record.shape();
    let leading = shape.leading_fields();

    let ordered = leading
        .iter()
        .filter_map(|name| record.fields.get_key_value(*name))
        .chain(
            record
                .fields
                .iter()
                .filter(|(name, _)| !leading.contains(&name.as_str())),
        );

    ordered
        .map(|(name, value)| {
            let text = match value {
                FieldValue::Number(_) if shape.is_percentage(name) => format!("{}%", value),
                _ => value.to_string(),
            };
            (field_label(name), text)
        })
        .collect()
}

fn field_label(name: &str) -> String {
    match name {
        "icms" | "pis" | "cofins" | "ipi" | "ncm" | "cest" | "cfop" | "cst" => {
            name.to_uppercase()
        }
        _ => {
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

/// Creates a centered rectangle for modal dialogs.
fn centered_rect(percent_x: u16, percent_y: u16, parent: Rect) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(parent);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(rows[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(view: &SessionView, input: &str) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| {
                render(
                    f,
                    &RenderContext {
                        view,
                        input,
                        focused: true,
                    },
                )
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn rice() -> TributeRecord {
        TributeRecord::new("7891234567890")
            .with_field("icms", FieldValue::Number(18.5))
            .with_field("pis", FieldValue::Number(1.65))
            .with_field("cofins", FieldValue::Number(7.6))
            .with_field("ipi", FieldValue::Number(0.0))
            .with_field("total", FieldValue::Number(27.75))
            .with_field("produto", FieldValue::Text("Arroz 5kg".into()))
    }

    #[test]
    fn test_awaiting_scan_screen() {
        let view = SessionView {
            scanning: true,
            ..SessionView::default()
        };
        let screen = draw(&view, "789");
        assert!(screen.contains("Scanner de Códigos"));
        assert!(screen.contains("Aguardando leitura..."));
        assert!(screen.contains("> 789"));
        assert!(!screen.contains("Tributos"));
    }

    #[test]
    fn test_resolving_screen() {
        let view = SessionView {
            scanning: false,
            code: Some("111".into()),
            record: None,
            show_result: false,
        };
        let screen = draw(&view, "");
        assert!(screen.contains("Consultando tributos..."));
        assert!(screen.contains("Código: 111"));
        assert!(!screen.contains("Produto não encontrado"));
    }

    #[test]
    fn test_result_dialog_lists_fields() {
        let view = SessionView {
            scanning: false,
            code: Some("7891234567890".into()),
            record: Some(rice()),
            show_result: true,
        };
        let screen = draw(&view, "");
        assert!(screen.contains("Tributos"));
        assert!(screen.contains("Produto: Arroz 5kg"));
        assert!(screen.contains("ICMS: 18.5%"));
        assert!(screen.contains("Total: 27.75%"));
    }

    #[test]
    fn test_not_found_dialog() {
        let view = SessionView {
            scanning: false,
            code: Some("000".into()),
            record: None,
            show_result: true,
        };
        let screen = draw(&view, "");
        assert!(screen.contains("Produto não encontrado"));
    }

    #[test]
    fn test_record_lines_order_and_suffix() {
        let lines = record_lines(&rice());
        let labels: Vec<_> = lines.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, ["Produto", "ICMS", "PIS", "COFINS", "IPI", "Total"]);
        assert_eq!(lines[1].1, "18.5%");
        assert_eq!(lines[4].1, "0%");
    }

    #[test]
    fn test_record_lines_fiscal_codes() {
        let record = TributeRecord::new("1")
            .with_field("ncm", FieldValue::Text("10063021".into()))
            .with_field("aliquota_fcp", FieldValue::Number(2.0))
            .with_field("icms", FieldValue::Number(12.0))
            .with_field("cfop", FieldValue::Text("5102".into()));
        let lines = record_lines(&record);
        assert_eq!(
            lines,
            vec![
                ("NCM".to_string(), "10063021".to_string()),
                ("CFOP".to_string(), "5102".to_string()),
                ("ICMS".to_string(), "12%".to_string()),
                ("Aliquota_fcp".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_centered_rect() {
        let parent = Rect::new(0, 0, 100, 50);
        let modal = centered_rect(60, 70, parent);
        assert_eq!(modal.width, 60);
        assert!(modal.x >= 19 && modal.x <= 21);
    }
}
