use crate::span::Span;

/// A diagnostic produced by the conversion driver or the target loader.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let kind = match self.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };

        let color = match self.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        // Clamp so a stale span never indexes past the source.
        let len = source.len();
        let start = (self.span.start as usize).min(len);
        let end = (self.span.end as usize).clamp(start, len);

        let mut report = Report::build(kind, filename, start)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        if let Err(e) = report.finish().eprint((filename, Source::from(source))) {
            eprintln!("{}: {} ({})", filename, self.message, e);
        }
    }
}

/// Render a list of diagnostics.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: &str) {
    for diag in diagnostics {
        diag.render(filename, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let span = Span::new(0, 10, 15);
        let d = Diagnostic::error("failed to legalize operation".to_string(), span);
        assert_eq!(d.severity, Severity::Error);
        assert!(d.is_error());
        assert_eq!(d.message, "failed to legalize operation");
        assert_eq!(d.span.start, 10);
        assert_eq!(d.span.end, 15);
        assert!(d.notes.is_empty());
        assert!(d.help.is_none());
    }

    #[test]
    fn test_warning_construction() {
        let d = Diagnostic::warning("calling convention ignored".to_string(), Span::dummy());
        assert_eq!(d.severity, Severity::Warning);
        assert!(!d.is_error());
    }

    #[test]
    fn test_chained_builders() {
        let d = Diagnostic::error("unknown target".to_string(), Span::dummy())
            .with_note("looked for 'targets/foo.toml'".to_string())
            .with_help("available targets: spir, spir64".to_string())
            .with_note("second note".to_string());
        assert_eq!(d.notes.len(), 2);
        assert_eq!(d.help.as_deref(), Some("available targets: spir, spir64"));
    }

    #[test]
    fn test_render_does_not_panic() {
        let source = "[target]\nname = \"spir64\"\npointer_width = abc\n";
        let d = Diagnostic::error("invalid target.pointer_width: abc".to_string(), Span::new(0, 25, 44))
            .with_help("expected 32 or 64".to_string());
        d.render("spir64.toml", source);
    }

    #[test]
    fn test_render_clamps_out_of_range_span() {
        let d = Diagnostic::warning("stale".to_string(), Span::new(0, 100, 200));
        render_diagnostics(&[d], "short.toml", "x = 1\n");
    }
}
