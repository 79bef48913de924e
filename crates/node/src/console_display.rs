//! Display de console: mesmo layout do painel OLED 128x64 (21 colunas de
//! texto com fonte 6 px), escrito no log só quando o frame muda.

use envmon_core::{NodeStatus, StatusDisplay};
use tracing::info;

/// Colunas de texto do painel.
pub const PANEL_COLUMNS: usize = 21;

/// Centraliza `text` em `width` colunas, truncando se não couber.
pub fn centre(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }
    let left = (width - len) / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(width - len - left))
}

/// Linhas do frame de status.
pub fn status_lines(status: &NodeStatus) -> Vec<String> {
    let link = if status.connected { "OK" } else { "X" };
    vec![
        centre(&format!("T = {:.1} C", status.reading.temperature), PANEL_COLUMNS),
        centre(&format!("RH = {:.0} %", status.reading.humidity), PANEL_COLUMNS),
        centre(
            &format!("Net: {link} Buf: {}/{}", status.buffered, status.threshold),
            PANEL_COLUMNS,
        ),
    ]
}

#[derive(Default)]
pub struct ConsoleDisplay {
    last_frame: Vec<String>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    fn show(&mut self, frame: Vec<String>) {
        if frame == self.last_frame {
            return;
        }
        info!("┃{}┃", frame.join("┃"));
        self.last_frame = frame;
    }
}

impl StatusDisplay for ConsoleDisplay {
    fn render_status(&mut self, status: &NodeStatus) {
        self.show(status_lines(status));
    }

    fn render_error(&mut self, message: &str) {
        self.show(vec![centre(message, PANEL_COLUMNS)]);
    }
}
