use crate::language::errors::ResolveError;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};

pub fn render_diagnostic(diagnostic: &dyn Diagnostic) -> String {
    let mut out = String::new();
    let handler =
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor()).with_width(400);
    if handler.render_report(&mut out, diagnostic).is_err() {
        return diagnostic.to_string();
    }
    out
}

pub fn render_resolve_error(error: &ResolveError) -> String {
    render_diagnostic(error)
}
