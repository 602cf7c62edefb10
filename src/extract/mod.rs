//! HTML pattern extraction
//!
//! Pages on the catalog site and on the mirror hosts are read with ordered
//! lists of candidate patterns rather than a single authoritative markup
//! shape. An [`Extractor`] tries its patterns in priority order and returns
//! the records of the first pattern that matches anything. No match is a
//! normal outcome and yields an empty result.

mod pattern;

pub use pattern::{Field, FieldSource, Record, RecordPattern, RegexPattern, SelectorPattern};

/// Ordered list of candidate patterns for one extraction point
pub struct Extractor {
    patterns: Vec<Box<dyn RecordPattern>>,
}

impl Extractor {
    /// Creates an extractor from patterns in priority order
    pub fn new(patterns: Vec<Box<dyn RecordPattern>>) -> Self {
        Self { patterns }
    }

    /// Shorthand for an extractor with a single regex pattern
    pub fn regex(name: &str, source: &str) -> Result<Self, crate::ExtractError> {
        Ok(Self::new(vec![Box::new(RegexPattern::new(name, source)?)]))
    }

    /// Appends a lower-priority fallback pattern
    pub fn or(mut self, pattern: impl RecordPattern + 'static) -> Self {
        self.patterns.push(Box::new(pattern));
        self
    }

    /// Returns all records of the first pattern that matches, in document order
    pub fn extract(&self, html: &str) -> Vec<Record> {
        for pattern in &self.patterns {
            let records = pattern.extract(html);
            if !records.is_empty() {
                tracing::trace!(
                    "Pattern '{}' matched {} record(s)",
                    pattern.name(),
                    records.len()
                );
                return records;
            }
            tracing::trace!("Pattern '{}' matched nothing", pattern.name());
        }
        Vec::new()
    }

    /// Returns the first record of the first pattern that matches
    pub fn extract_first(&self, html: &str) -> Option<Record> {
        self.extract(html).into_iter().next()
    }

    /// Returns the first field of the first matching record
    pub fn extract_value(&self, html: &str) -> Option<String> {
        self.extract_first(html)
            .and_then(|record| record.into_iter().next())
    }
}

/// Removes repeated values while keeping first-seen order
pub fn dedup_preserving_order<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
