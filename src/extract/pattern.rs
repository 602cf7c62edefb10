use crate::ExtractError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// One extracted record: the captured fields, in pattern order
pub type Record = Vec<String>;

/// A structural pattern that pulls zero or more records out of raw HTML
pub trait RecordPattern: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Returns every match in document order
    fn extract(&self, html: &str) -> Vec<Record>;
}

/// Regex-based pattern: each capture group becomes one field
///
/// Groups that do not participate in a match yield an empty string.
pub struct RegexPattern {
    name: String,
    regex: Regex,
}

impl RegexPattern {
    pub fn new(name: &str, source: &str) -> Result<Self, ExtractError> {
        let regex = Regex::new(source).map_err(|source| ExtractError::Regex {
            name: name.to_string(),
            source,
        })?;
        Ok(Self {
            name: name.to_string(),
            regex,
        })
    }
}

impl RecordPattern for RegexPattern {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, html: &str) -> Vec<Record> {
        self.regex
            .captures_iter(html)
            .map(|caps| {
                (1..caps.len())
                    .map(|i| {
                        caps.get(i)
                            .map(|m| m.as_str().to_string())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect()
    }
}

/// Where a selector field reads its value from
#[derive(Debug, Clone)]
pub enum FieldSource {
    /// An attribute of the selected element
    Attr(String),
    /// The element's whitespace-trimmed text
    Text,
}

/// One field of a [`SelectorPattern`]
pub struct Field {
    /// Sub-selector inside the item; `None` reads from the item itself
    selector: Option<Selector>,
    source: FieldSource,
}

impl Field {
    pub fn attr(selector: Option<&str>, attr: &str) -> Result<Self, ExtractError> {
        Ok(Self {
            selector: selector.map(parse_selector).transpose()?,
            source: FieldSource::Attr(attr.to_string()),
        })
    }

    pub fn text(selector: Option<&str>) -> Result<Self, ExtractError> {
        Ok(Self {
            selector: selector.map(parse_selector).transpose()?,
            source: FieldSource::Text,
        })
    }

    fn read(&self, item: ElementRef<'_>) -> Option<String> {
        let element = match &self.selector {
            Some(selector) => item.select(selector).next()?,
            None => item,
        };

        let value = match &self.source {
            FieldSource::Attr(name) => element.value().attr(name)?.trim().to_string(),
            FieldSource::Text => element.text().collect::<String>().trim().to_string(),
        };

        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// DOM-based pattern built on CSS selectors
///
/// Items missing any field are skipped.
pub struct SelectorPattern {
    name: String,
    item: Selector,
    fields: Vec<Field>,
}

impl SelectorPattern {
    pub fn new(name: &str, item: &str, fields: Vec<Field>) -> Result<Self, ExtractError> {
        let item = Selector::parse(item).map_err(|_| ExtractError::Selector {
            name: name.to_string(),
            selector: item.to_string(),
        })?;
        Ok(Self {
            name: name.to_string(),
            item,
            fields,
        })
    }
}

impl RecordPattern for SelectorPattern {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, html: &str) -> Vec<Record> {
        let document = Html::parse_document(html);
        document
            .select(&self.item)
            .filter_map(|item| {
                self.fields
                    .iter()
                    .map(|field| field.read(item))
                    .collect::<Option<Record>>()
            })
            .collect()
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|_| ExtractError::Selector {
        name: "field".to_string(),
        selector: selector.to_string(),
    })
}
