//! Output formatting utilities for the CLI
//!
//! Colored status lines and the echo report table.

use tabled::{settings::Style, Table, Tabled};

use vc_echo::EchoReport;

/// Format an echo report as an ASCII table
pub fn format_report(report: &EchoReport) -> String {
    #[derive(Tabled)]
    struct ReportRow {
        #[tabled(rename = "SENT")]
        sent: usize,
        #[tabled(rename = "RECEIVED")]
        received: usize,
        #[tabled(rename = "SHA-256")]
        digest: String,
        #[tabled(rename = "ELAPSED")]
        elapsed: String,
    }

    let row = ReportRow {
        sent: report.sent_len,
        received: report.received_len,
        digest: report.digest.to_hex(),
        elapsed: format!("{} ms", report.elapsed_ms),
    };

    Table::new([row]).with(Style::rounded()).to_string()
}

/// Print a success message in green with a checkmark prefix
///
/// Outputs to stdout with green coloring for positive feedback to the user.
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix
///
/// Outputs to stderr with red coloring for error feedback to the user.
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow with a warning symbol prefix
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan with an info symbol prefix
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
