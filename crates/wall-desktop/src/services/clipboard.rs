//! Platform clipboard and alert dialogs.

use rfd::{MessageButtons, MessageDialog, MessageLevel};
use wall_core::board::{Alerts, Clipboard};
use wall_core::{Error, Result};

pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy_text(&self, text: &str) -> Result<()> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|error| Error::Clipboard(error.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|error| Error::Clipboard(error.to_string()))
    }
}

/// Blocking native message box.
pub struct DialogAlerts;

impl Alerts for DialogAlerts {
    fn alert(&self, message: &str) {
        MessageDialog::new()
            .set_title("Wall of Love")
            .set_description(message)
            .set_level(MessageLevel::Error)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}
