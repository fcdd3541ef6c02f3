//! User-visible error reporting

use rfd::{MessageButtons, MessageDialog, MessageLevel};

const TITLE: &str = "RegionSnap";

/// Log `message` and show it in a modal error box
pub fn show_error(message: &str) {
    log::error!("{}", message);
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(TITLE)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}

/// Show every sink failure of a delivery, if any
pub fn report_delivery(report: &export::DeliveryReport) {
    let failures = report.failures();
    if !failures.is_empty() {
        show_error(&failures.join("\n"));
    }
}
