//! Rendered page output.

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

/// Write the rendered page to `output`, or to stdout when `output` is `None`.
///
/// Parent directories are created as needed.
#[instrument(level = "info", skip(page))]
pub async fn write_page(page: &str, output: Option<&str>) -> Result<(), Box<dyn Error>> {
    let Some(path) = output else {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(page.as_bytes()).await?;
        stdout.flush().await?;
        return Ok(());
    };

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, page).await?;
    info!(path, bytes = page.len(), "Wrote rendered page");
    Ok(())
}
