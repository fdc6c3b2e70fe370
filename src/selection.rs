use crate::surface::Surface;
use base64::Engine as _;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Failed to read image file: {0}")]
    ReadFailed(#[from] std::io::Error),
}

/// One selected image: opaque bytes plus a filename/MIME tag. Owned by the
/// selection handler; lent to the prediction side for one submission.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub bytes: Bytes,
    pub file_name: String,
    pub mime_type: &'static str,
}

impl SelectedFile {
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

pub struct SelectionHandler<S: Surface> {
    surface: Arc<S>,
    selected: Option<SelectedFile>,
}

impl<S: Surface> SelectionHandler<S> {
    pub fn new(surface: Arc<S>) -> Self {
        Self {
            surface,
            selected: None,
        }
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Handles one selection event carrying zero or one path. An empty
    /// event leaves the current selection untouched. A read failure is the
    /// one non-fatal suppressed error: it is logged, the preview stays
    /// hidden, and the trigger ends up disabled.
    pub async fn handle_selection(&mut self, path: Option<&Path>) {
        let Some(path) = path else {
            return;
        };

        match load_file(path).await {
            Ok(file) => {
                self.surface.show_preview(&file.to_data_uri());
                self.surface.set_trigger_enabled(true);
                self.selected = Some(file);
            }
            Err(e) => {
                tracing::warn!("Failed to read selected image {}: {}", path.display(), e);
                self.surface.clear_preview();
                self.surface.set_trigger_enabled(false);
                self.selected = None;
            }
        }
    }
}

async fn load_file(path: &Path) -> Result<SelectedFile, SelectionError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(SelectedFile {
        bytes: Bytes::from(bytes),
        file_name,
        mime_type: mime_for_path(path),
    })
}

fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}
