use regnskab_xbrl::*;
use std::error::Error;
use std::path::PathBuf;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/dcca_instance.xml"));

    println!("📄 Loading {}...\n", path.display());
    let model = XmlFactModelLoader::new().load(&path)?;
    println!(
        "✅ {} facts, {} contexts, {} units\n",
        model.facts.len(),
        model.contexts.len(),
        model.units.len()
    );

    let options = ExtractionOptions::default();
    let financial = extract_financials_with(&model, &options)?;
    let qualitative = extract_qualitative_with(&model, &options)?;

    println!("{}", financial.to_markdown());

    println!("## Generelt\n");
    println!(
        "- Revisionstype: {}",
        qualitative.audit_opinion.as_deref().unwrap_or("-")
    );
    println!(
        "- Revisortype: {}",
        qualitative.auditor.as_deref().unwrap_or("-")
    );
    println!(
        "- Væsentlig aktivitet: {}",
        qualitative.main_activity.as_deref().unwrap_or("-")
    );
    println!("- Bemærkninger: {}\n", qualitative.remarks());

    for diagnostic in &financial.diagnostics {
        println!("⚠️  {:?}: {}", diagnostic.kind, diagnostic.error);
    }

    let report = AnnualReport::new(&qualitative, &financial);
    println!("\n{}", report.to_json()?);

    Ok(())
}
