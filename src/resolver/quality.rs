use crate::extract::Extractor;
use crate::prompt::{prompt_index, Prompter};
use crate::{ExtractError, PromptError};

/// A known quality tier of the aggregator and the link text that marks it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityTier {
    pub name: &'static str,
    pub label: &'static str,
}

/// Tiers in detection order
pub const QUALITY_TIERS: [QualityTier; 4] = [
    QualityTier {
        name: "Full HD (1080p)",
        label: "Full HD quality",
    },
    QualityTier {
        name: "HD (720p)",
        label: "HD quality",
    },
    QualityTier {
        name: "SD (480p/360p)",
        label: "SD quality",
    },
    QualityTier {
        name: "Low Quality",
        label: "Low quality",
    },
];

/// A probed quality tier on the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityOption {
    pub name: String,
    pub url: String,
    pub size_text: Option<String>,
    pub has_active_button: bool,
}

impl QualityOption {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            size_text: None,
            has_active_button: false,
        }
    }

    /// Records a found download trigger
    pub fn mark_active(&mut self, size: impl Into<String>) {
        self.size_text = Some(size.into());
        self.has_active_button = true;
    }

    /// Records a missing trigger or a probe failure
    pub fn mark_inactive(&mut self, diagnostic: impl Into<String>) {
        self.size_text = Some(diagnostic.into());
        self.has_active_button = false;
    }

    pub fn size_display(&self) -> &str {
        self.size_text.as_deref().unwrap_or("Unknown")
    }
}

/// Matches a `<number> GB|MB|KB` size token in download button text
pub fn size_extractor() -> Result<Extractor, ExtractError> {
    Extractor::regex("file size", r"(?i)(\d+(?:\.\d+)?\s*(?:GB|MB|KB))")
}

/// Picks an option without asking, if the choice is unambiguous
///
/// A single option is always chosen; otherwise the first option whose name
/// contains `preference` (case-insensitive) is.
pub fn auto_select(options: &[QualityOption], preference: Option<&str>) -> Option<usize> {
    if options.len() == 1 {
        return Some(0);
    }

    let preference = preference?.trim().to_lowercase();
    if preference.is_empty() {
        return None;
    }

    options
        .iter()
        .position(|option| option.name.to_lowercase().contains(&preference))
}

/// Selects an option, prompting for a 1-based index when needed
pub fn select_quality(
    options: &[QualityOption],
    preference: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<usize, PromptError> {
    if let Some(index) = auto_select(options, preference) {
        return Ok(index);
    }

    prompter.show("Available Qualities:");
    for (i, option) in options.iter().enumerate() {
        prompter.show(&format!("{}. {} - {}", i + 1, option.name, option.size_display()));
    }
    prompt_index(prompter, "Select quality (number): ", options.len())
}
