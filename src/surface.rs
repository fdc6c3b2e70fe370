use crate::labels;
use crate::prediction::Classification;

/// The four UI handles the surrounding page supplies: an image-preview
/// sink, a textual result sink, a busy indicator toggle, and the
/// submission trigger. These are the only points of contact with the
/// presentation layer.
pub trait Surface: Send + Sync + 'static {
    fn show_preview(&self, data_uri: &str);
    fn clear_preview(&self);

    fn render_status(&self, text: &str);
    fn render_result(&self, classification: &Classification);
    fn render_error(&self, message: &str);

    fn set_busy(&self, busy: bool);
    fn set_trigger_enabled(&self, enabled: bool);
}

/// Terminal-backed surface for the interactive binary. The result sink
/// owns stdout; the remaining handles are trace-level diagnostics.
pub struct ConsoleSurface;

impl Surface for ConsoleSurface {
    fn show_preview(&self, data_uri: &str) {
        tracing::debug!("image preview ready ({} encoded bytes)", data_uri.len());
    }

    fn clear_preview(&self) {
        tracing::debug!("image preview cleared");
    }

    fn render_status(&self, text: &str) {
        println!("{text}");
    }

    fn render_result(&self, classification: &Classification) {
        println!("{}", classification.label);
        if let Some(confidence) = classification.confidence {
            println!("Confidence: {}", labels::format_confidence(confidence));
        }
        println!("{}", classification.tip);
    }

    fn render_error(&self, message: &str) {
        println!("Error: {message}");
    }

    fn set_busy(&self, busy: bool) {
        tracing::debug!("busy indicator {}", if busy { "shown" } else { "hidden" });
    }

    fn set_trigger_enabled(&self, enabled: bool) {
        tracing::debug!(
            "submission trigger {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }
}
