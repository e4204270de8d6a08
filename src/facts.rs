//! Uniform access to the facts of a [`FactModel`], whether the loader resolved
//! them or they have to be recovered from the raw tagged elements.

use crate::error::{ExtractionError, Result};
use crate::schema::{Context, Fact, FactModel};
use crate::taxonomy::Concept;
use crate::utils::local_name;
use log::{debug, warn};
use std::borrow::Cow;

pub const INLINE_XBRL_NS: &str = "http://www.xbrl.org/2013/inlineXBRL";

/// Values at or below this many characters are skipped by [`FactSource::get_all_text_values`].
pub const MIN_TEXT_VALUE_LEN: usize = 5;

pub struct FactSource<'a> {
    model: &'a FactModel,
    facts: Cow<'a, [Fact]>,
    from_raw_scan: bool,
}

impl<'a> FactSource<'a> {
    pub fn new(model: &'a FactModel) -> Result<Self> {
        if !model.facts.is_empty() {
            return Ok(Self {
                model,
                facts: Cow::Borrowed(model.facts.as_slice()),
                from_raw_scan: false,
            });
        }

        let Some(document) = model.document.as_deref() else {
            debug!("Fact model has no facts and no raw document");
            return Ok(Self {
                model,
                facts: Cow::Borrowed(&[]),
                from_raw_scan: false,
            });
        };

        warn!("No resolved facts in model; scanning raw document for tagged elements");
        let facts = scan_document(document)?;
        debug!("Raw scan recovered {} tagged elements", facts.len());

        Ok(Self {
            model,
            facts: Cow::Owned(facts),
            from_raw_scan: true,
        })
    }

    pub fn model(&self) -> &'a FactModel {
        self.model
    }

    pub fn is_raw_scan(&self) -> bool {
        self.from_raw_scan
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn context_of(&self, fact: &Fact) -> Option<&'a Context> {
        fact.context_ref
            .as_deref()
            .and_then(|id| self.model.context(id))
    }

    /// First non-empty value tagged with exactly this element name, trimmed.
    pub fn get_fact(&self, tag: &str) -> Option<&str> {
        self.facts
            .iter()
            .find(|f| f.concept == tag && f.has_value())
            .map(|f| f.value.trim())
    }

    /// First non-empty value over the concept's tags, in dictionary order.
    pub fn find_first(&self, concept: Concept) -> Option<&str> {
        concept.tags().iter().find_map(|tag| self.get_fact(tag))
    }

    /// Like [`find_first`](Self::find_first), but skips facts bound to a
    /// dimensional context unless `include_dimensional` is set.
    pub fn find_first_in(&self, concept: Concept, include_dimensional: bool) -> Option<&str> {
        concept.tags().iter().find_map(|tag| {
            self.facts
                .iter()
                .filter(|f| f.concept == *tag && f.has_value())
                .find(|f| {
                    include_dimensional || self.context_of(f).map_or(true, |c| !c.dimensional)
                })
                .map(|f| f.value.trim())
        })
    }

    pub fn get_all_text_values(&self) -> Vec<&str> {
        self.text_values_longer_than(MIN_TEXT_VALUE_LEN)
    }

    pub fn text_values_longer_than(&self, min_len: usize) -> Vec<&str> {
        self.facts
            .iter()
            .map(|f| f.value.trim())
            .filter(|v| v.chars().count() > min_len)
            .collect()
    }
}

pub fn get_fact<'m>(source: &'m FactSource<'_>, tag: &str) -> Option<&'m str> {
    source.get_fact(tag)
}

pub fn get_all_text_values<'m>(source: &'m FactSource<'_>) -> Vec<&'m str> {
    source.get_all_text_values()
}

pub(crate) fn parse_xml(text: &str) -> Result<roxmltree::Document<'_>> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    roxmltree::Document::parse_with_options(text, options)
        .map_err(|e| ExtractionError::Load(format!("Malformed XML: {}", e)))
}

fn scan_document(text: &str) -> Result<Vec<Fact>> {
    let doc = parse_xml(text)?;
    Ok(scan_tagged_elements(&doc))
}

/// Every element carrying a `contextRef` becomes a fact. Inline XBRL wrappers
/// take their concept from the `name` attribute instead of the element name.
pub fn scan_tagged_elements(doc: &roxmltree::Document<'_>) -> Vec<Fact> {
    let mut facts = Vec::new();

    for node in doc.descendants().filter(|n| n.is_element()) {
        let Some(context_ref) = node.attribute("contextRef") else {
            continue;
        };

        let tag = node.tag_name();
        let is_inline = tag.namespace() == Some(INLINE_XBRL_NS);

        let concept = if is_inline && matches!(tag.name(), "nonNumeric" | "nonFraction") {
            match node.attribute("name") {
                Some(name) => local_name(name),
                None => continue,
            }
        } else {
            tag.name()
        };

        if concept.is_empty() {
            continue;
        }

        let text: String = node
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();
        let text = text.trim();

        let value = if is_inline && tag.name() == "nonFraction" {
            inline_numeric_value(&node, text)
        } else {
            text.to_string()
        };

        if value.is_empty() {
            continue;
        }

        facts.push(Fact {
            concept: concept.to_string(),
            value,
            context_ref: Some(context_ref.to_string()),
            unit_ref: node.attribute("unitRef").map(String::from),
        });
    }

    facts
}

/// Applies the `format`, `scale` and `sign` attributes of an `ix:nonFraction`.
/// Without a `format` the text is an xs:decimal. A value the transform cannot
/// read comes back as `"{format}:{text}"`, which never parses as a number.
fn inline_numeric_value(node: &roxmltree::Node<'_, '_>, text: &str) -> String {
    let format = node.attribute("format").map(str::trim).unwrap_or("");
    let format_key: String = local_name(format)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    if format_key.starts_with("zerodash") || format_key.starts_with("fixedzero") {
        return "0".to_string();
    }

    let canonical: Option<String> = match NumberLayout::from_format_key(&format_key) {
        Some(NumberLayout::Decimal) => Some(text.trim().to_string()),
        Some(NumberLayout::DotDecimal) => {
            Some(text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect())
        }
        Some(NumberLayout::CommaDecimal) => Some(
            text.chars()
                .filter(|c| c.is_ascii_digit() || *c == ',')
                .map(|c| if c == ',' { '.' } else { c })
                .collect(),
        ),
        None => None,
    };

    let number = canonical
        .filter(|c| !c.is_empty())
        .and_then(|c| c.parse::<f64>().ok())
        .filter(|v| v.is_finite());

    let Some(number) = number else {
        let format = if format.is_empty() { "xs:decimal" } else { format };
        debug!("Cannot apply {} to inline value '{}'", format, text);
        return format!("{}:{}", format, text);
    };

    let scale: i32 = node
        .attribute("scale")
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    let scaled = number * 10f64.powi(scale);
    let signed = if node.attribute("sign") == Some("-") {
        -scaled
    } else {
        scaled
    };
    format_plain(signed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberLayout {
    Decimal,
    DotDecimal,
    CommaDecimal,
}

impl NumberLayout {
    // Covers the current transformation registry names and the legacy
    // "numcommadot"-style names still found in older Danish filings.
    fn from_format_key(key: &str) -> Option<Self> {
        match key {
            "" => Some(Self::Decimal),
            k if k.starts_with("numdotdecimal")
                || k.starts_with("numcommadot")
                || k.starts_with("numspacedot") =>
            {
                Some(Self::DotDecimal)
            }
            k if k.starts_with("numcommadecimal")
                || k.starts_with("numdotcomma")
                || k.starts_with("numspacecomma") =>
            {
                Some(Self::CommaDecimal)
            }
            _ => None,
        }
    }
}

fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
