use std::{fs, path::Path};

use super::ShaderStage;
use crate::{GlError, GlResult};

/// Lines containing this token switch the section later lines go to.
pub const SECTION_MARKER: &str = "#shader";

/// Vertex and fragment stage text split out of one multi-section file.
///
/// ```text
/// #shader vertex
/// ...vertex stage...
/// #shader fragment
/// ...fragment stage...
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    /// Every line after a marker is copied verbatim, newline-terminated, into
    /// that marker's section. Lines before the first marker are dropped, as
    /// are markers naming neither stage (the previous section stays active).
    pub fn parse(text: &str) -> Self {
        let mut sources = Self::default();
        let mut active: Option<ShaderStage> = None;

        for line in text.lines() {
            if line.contains(SECTION_MARKER) {
                if line.contains("vertex") {
                    active = Some(ShaderStage::Vertex);
                } else if line.contains("fragment") {
                    active = Some(ShaderStage::Fragment);
                }
                continue;
            }

            if let Some(stage) = active {
                let section = sources.section_mut(stage);
                section.push_str(line);
                section.push('\n');
            }
        }

        sources
    }

    pub fn read(path: impl AsRef<Path>) -> GlResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GlError::ShaderRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn section(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }

    fn section_mut(&mut self, stage: ShaderStage) -> &mut String {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Fragment => &mut self.fragment,
        }
    }
}
