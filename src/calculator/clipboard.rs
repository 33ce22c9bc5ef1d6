//! Copying calculator output to the system clipboard.

use arboard::Clipboard;
use tracing::debug;

use super::engine::EngineState;

/// Copy text to the system clipboard.
///
/// Returns `Ok(())` on success, or an error message on failure.
pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let mut clipboard =
        Clipboard::new().map_err(|e| format!("Failed to access clipboard: {}", e))?;

    clipboard
        .set_text(text.to_string())
        .map_err(|e| format!("Failed to copy to clipboard: {}", e))
}

/// Copy the current display, unless it shows the error marker.
///
/// Returns whether anything was copied.
pub fn copy_display(state: &EngineState) -> Result<bool, String> {
    if state.is_error() {
        debug!("not copying error display");
        return Ok(false);
    }

    copy_to_clipboard(state.display())?;
    debug!(display = state.display(), "copied display to clipboard");
    Ok(true)
}
