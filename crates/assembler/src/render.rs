use proofctx_extract::{DependencyIndex, SymbolKey};

/// Text of one dependency: its signature, followed by its proof body when
/// `include_body` is set and it has one.
///
/// Names without a definition (record fields, generated constructors whose
/// record is tracked instead) render as `None`.
pub(crate) fn render(index: &DependencyIndex, key: &SymbolKey, include_body: bool) -> Option<String> {
    let Some(entry) = index.symbol(key) else {
        log::debug!("No definition for {} in {}, omitting", key.name, key.file);
        return None;
    };

    match entry.body.as_deref() {
        Some(body) if include_body => {
            Some(format!("{}\n{body}", entry.signature).trim_end().to_string())
        }
        _ => Some(entry.signature.clone()),
    }
}
