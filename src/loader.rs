//! Builds a [`FactModel`] from an XBRL instance document or an inline XBRL (XHTML) report.

use crate::error::{ExtractionError, Result};
use crate::facts::{parse_xml, scan_tagged_elements};
use crate::schema::{Context, FactModel, Unit};
use crate::utils::{local_name, parse_xbrl_date};
use log::{debug, info, warn};
use std::path::Path;

pub trait FactModelLoader {
    fn load_str(&self, text: &str) -> Result<FactModel>;

    fn load(&self, path: &Path) -> Result<FactModel> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ExtractionError::Load(format!("{}: {}", path.display(), e)))?;
        self.load_str(&text)
    }
}

#[derive(Debug, Clone)]
pub struct XmlFactModelLoader {
    /// Keep the source text on the model so tagged elements can be rescanned later.
    pub keep_document: bool,
}

impl Default for XmlFactModelLoader {
    fn default() -> Self {
        Self {
            keep_document: true,
        }
    }
}

impl XmlFactModelLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FactModelLoader for XmlFactModelLoader {
    fn load_str(&self, text: &str) -> Result<FactModel> {
        let doc = parse_xml(text)?;
        let mut model = FactModel::new();

        for node in doc.descendants().filter(|n| n.has_tag_name("context")) {
            match read_context(&node) {
                Some(context) => {
                    model.insert_context(context);
                }
                None => debug!("Skipping context without id"),
            }
        }

        for node in doc.descendants().filter(|n| n.has_tag_name("unit")) {
            if let Some(unit) = read_unit(&node) {
                model.units.insert(unit.id.clone(), unit);
            }
        }

        model.facts = scan_tagged_elements(&doc);

        if model.facts.is_empty() {
            warn!("Document parsed but no tagged facts were found");
        }
        info!(
            "Loaded fact model: {} facts, {} contexts, {} units",
            model.facts.len(),
            model.contexts.len(),
            model.units.len()
        );

        if self.keep_document {
            model.document = Some(text.to_string());
        }

        Ok(model)
    }
}

fn child_text<'a>(node: &roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.descendants()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
        .map(str::trim)
}

fn read_context(node: &roxmltree::Node<'_, '_>) -> Option<Context> {
    let id = node.attribute("id")?;
    let period = node.children().find(|n| n.has_tag_name("period"));

    let date = |name: &str| {
        period
            .as_ref()
            .and_then(|p| child_text(p, name))
            .and_then(parse_xbrl_date)
    };

    let dimensional = node
        .descendants()
        .any(|n| n.has_tag_name("segment") || n.has_tag_name("scenario"));

    Some(Context {
        id: id.to_string(),
        start_date: date("startDate"),
        end_date: date("endDate"),
        instant: date("instant"),
        dimensional,
    })
}

// For divide units (e.g. DKK per share) only the numerator counts.
fn read_unit(node: &roxmltree::Node<'_, '_>) -> Option<Unit> {
    let id = node.attribute("id")?;
    let scope = node
        .descendants()
        .find(|n| n.has_tag_name("unitNumerator"))
        .unwrap_or(*node);

    let measures = scope
        .descendants()
        .filter(|n| n.has_tag_name("measure"))
        .filter_map(|n| n.text())
        .map(|m| local_name(m.trim()).to_string())
        .filter(|m| !m.is_empty())
        .collect();

    Some(Unit {
        id: id.to_string(),
        measures,
    })
}
