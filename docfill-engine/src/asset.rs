//! Reserved-token dispatch to an external asset renderer

use crate::document::{AssetImage, Paragraph};
use crate::error::{MergeError, Result};

/// Reserved token prefix routed to the asset renderer instead of plain
/// text substitution.
pub const ASSET_TOKEN_PREFIX: &str = "{{BARCODE_";

/// Whether a token belongs to the reserved asset class.
pub fn is_asset_token(token: &str) -> bool {
    token.starts_with(ASSET_TOKEN_PREFIX)
}

/// Barcode symbology for rendered assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetKind {
    /// Code 128 (default)
    #[default]
    Code128,
    /// Code 39
    Code39,
    /// EAN-13
    Ean13,
}

/// External renderer seam for reserved tokens.
///
/// Rendering is the only external call inside a substitution pass; it is
/// synchronous and its failure always degrades to a textual fallback.
pub trait AssetRenderer {
    /// Render `value` as an image of the given kind.
    fn render(&self, value: &str, kind: AssetKind) -> Result<AssetImage>;
}

/// Renderer that is never available. The default when no renderer is
/// configured; every dispatch takes the textual fallback path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl AssetRenderer for NullRenderer {
    fn render(&self, _value: &str, _kind: AssetKind) -> Result<AssetImage> {
        Err(MergeError::RenderUnavailable(
            "no asset renderer configured".to_string(),
        ))
    }
}

/// Dispatch one recorded asset value onto a paragraph.
///
/// On success the rendered run is appended at the end of the paragraph,
/// not at the removed token's original position; this position loss is a
/// known limitation kept for parity with the original pipeline. On failure
/// a literal bracketed fallback is appended instead, so the value is never
/// silently lost. Returns whether the render succeeded.
pub fn dispatch_asset(
    paragraph: &mut Paragraph,
    value: &str,
    kind: AssetKind,
    renderer: &dyn AssetRenderer,
) -> bool {
    match renderer.render(value, kind) {
        Ok(image) => {
            paragraph.append_image_run(image);
            true
        }
        Err(_) => {
            paragraph.append_text_run(format!("[BARCODE: {value}]"));
            false
        }
    }
}
