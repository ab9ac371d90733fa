use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use crate::state::{AnalysisView, ErrorView, UploadView};

// ---------------------------------------------------------------------------
// HTML pages
// ---------------------------------------------------------------------------

const UPLOAD: &str = "upload";
const ANALYZE: &str = "analyze";
const ERROR: &str = "error";

/// Compiled page templates.
pub struct Pages {
    registry: Handlebars<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_template_string(UPLOAD, include_str!("../../templates/upload.hbs"))?;
        registry.register_template_string(ANALYZE, include_str!("../../templates/analyze.hbs"))?;
        registry.register_template_string(ERROR, include_str!("../../templates/error.hbs"))?;
        Ok(Self { registry })
    }

    /// File picker plus an optional validation error.
    pub fn upload(&self, view: &UploadView) -> Result<String, RenderError> {
        self.render(UPLOAD, view)
    }

    /// Column list, column picker, and the plot if one was rendered.
    pub fn analysis(&self, view: &AnalysisView) -> Result<String, RenderError> {
        self.render(ANALYZE, view)
    }

    pub fn error(&self, view: &ErrorView) -> Result<String, RenderError> {
        self.render(ERROR, view)
    }

    fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, RenderError> {
        self.registry.render(name, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_page_has_file_input_and_error() {
        let pages = Pages::new().unwrap();
        let html = pages
            .upload(&UploadView {
                error: Some("File type not allowed: 'x.txt'".into()),
                allowed_extensions: ".csv".into(),
            })
            .unwrap();
        assert!(html.contains(r#"name="file""#));
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains("File type not allowed"));
        assert!(html.contains("Allowed file types: .csv"));
    }

    #[test]
    fn analysis_page_lists_columns_and_marks_selection() {
        let pages = Pages::new().unwrap();
        let html = pages
            .analysis(&AnalysisView {
                filename: "data.csv".into(),
                columns: vec!["a".into(), "b".into()],
                plot_path: Some("/static/plots/t.png".into()),
                selected_column: Some("b".into()),
                notice: None,
            })
            .unwrap();
        assert!(html.contains("<li>a</li>"));
        assert!(html.contains(r#"<option value="b" selected>b</option>"#));
        assert!(html.contains(r#"<option value="a">a</option>"#));
        assert!(html.contains(r#"src="/static/plots/t.png""#));
        assert!(!html.contains(r#"id="notice""#));
    }

    #[test]
    fn analysis_page_without_plot_or_selection() {
        let pages = Pages::new().unwrap();
        let html = pages
            .analysis(&AnalysisView {
                filename: "data.csv".into(),
                columns: vec!["a".into()],
                ..Default::default()
            })
            .unwrap();
        assert!(!html.contains(r#"id="plot""#));
        assert!(!html.contains(" selected"));
    }

    #[test]
    fn column_names_are_escaped() {
        let pages = Pages::new().unwrap();
        let html = pages
            .analysis(&AnalysisView {
                filename: "data.csv".into(),
                columns: vec!["<script>".into()],
                ..Default::default()
            })
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
