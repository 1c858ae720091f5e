use serde::Deserialize;

use crate::FormatError;

/// Column whose items carry a trailing alpha suffix that must be stripped.
pub const PALETTE_COLUMN: &str = "clusters_pal";

#[derive(Debug, Deserialize)]
struct GeneValuesResponse {
    #[serde(default)]
    gene_values: Option<String>,
}

/// Parses the constant-values endpoint response `{"gene_values": "h,a,,b"}`.
///
/// Empty items are dropped, then the first remaining item (the header) is
/// dropped. Palette items lose their last three characters (the service
/// appends an opacity tag such as `.99` to every color). A missing
/// `gene_values` field yields an empty list.
pub fn parse_gene_values(json: &str, column: &str) -> Result<Vec<String>, FormatError> {
    let resp: GeneValuesResponse = serde_json::from_str(json)?;
    let Some(raw) = resp.gene_values else {
        return Ok(Vec::new());
    };
    let strip_suffix = column == PALETTE_COLUMN;
    let mut items: Vec<String> = raw
        .split(',')
        .filter(|item| !item.is_empty())
        .map(|item| {
            if strip_suffix {
                drop_last_chars(item, 3).to_string()
            } else {
                item.to_string()
            }
        })
        .collect();
    if !items.is_empty() {
        items.remove(0);
    }
    Ok(items)
}

fn drop_last_chars(s: &str, n: usize) -> &str {
    let keep = s.chars().count().saturating_sub(n);
    match s.char_indices().nth(keep) {
        Some((byte, _)) => &s[..byte],
        None => s,
    }
}
