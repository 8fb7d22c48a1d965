use std::path::Path;

use lexi_core::{Document, DomError};

/// Build page content from plain text
///
/// Blank lines separate blocks. `# ` starts a heading, a block fenced with
/// ``` becomes `<pre>`, and a block starting with `~ ` becomes an editable
/// `<div>`; everything else is a paragraph.
pub fn seed_page(doc: &mut Document, text: &str) -> Result<usize, DomError> {
    let body = doc.body();
    let mut blocks = 0;

    for block in text.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        if let Some(heading) = block.strip_prefix("# ") {
            doc.append_element(body, "h1", &[], heading.trim())?;
        } else if let Some(code) = block
            .strip_prefix("```")
            .and_then(|b| b.strip_suffix("```"))
        {
            doc.append_element(body, "pre", &[], code.trim_matches('\n'))?;
        } else if let Some(editable) = block.strip_prefix("~ ") {
            let attributes = [("contenteditable".to_string(), "true".to_string())];
            doc.append_element(body, "div", &attributes, editable.trim())?;
        } else {
            doc.append_element(body, "p", &[], block)?;
        }
        blocks += 1;
    }

    Ok(blocks)
}

pub fn load_page(doc: &mut Document, path: &Path) -> anyhow::Result<usize> {
    let text = std::fs::read_to_string(path)?;
    let blocks = seed_page(doc, &text)?;
    tracing::info!("Loaded {} blocks from {}", blocks, path.display());
    Ok(blocks)
}
