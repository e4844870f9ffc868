use crate::core::extract::cut_part;
use crate::domain::model::Layout;
use crate::domain::ports::Extractor;
use crate::utils::error::{QscriptError, Result};
use std::path::Path;
use std::process::Command;

/// Extracts article parts through poppler's `pdftotext`.
#[derive(Debug, Clone)]
pub struct PdfToText {
    program: String,
}

impl PdfToText {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn full_text(&self, pdf: &Path) -> Result<String> {
        tracing::debug!("Running {} on {}", self.program, pdf.display());
        let output = Command::new(&self.program)
            .arg("-enc")
            .arg("UTF-8")
            .arg(pdf)
            .arg("-")
            .output()
            .map_err(|e| QscriptError::ExtractionError {
                message: format!("cannot run '{}': {}", self.program, e),
            })?;

        if !output.status.success() {
            return Err(QscriptError::ExtractionError {
                message: format!(
                    "'{}' failed on '{}': {}",
                    self.program,
                    pdf.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Extractor for PdfToText {
    fn extract(&self, layout: &Layout, pdf: &Path) -> Result<String> {
        let text = self.full_text(pdf)?;
        cut_part(&text, layout).map_err(|e| match e {
            QscriptError::ExtractionError { message } => QscriptError::ExtractionError {
                message: format!("{}: {}", pdf.display(), message),
            },
            other => other,
        })
    }
}
