//! Display discovery through DRM sysfs and `xrandr --verbose`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sysprobe_parse::{DisplayDescriptor, decode_edid, edid_blobs_from_xrandr};

use crate::command::{read_bytes, run_command};
use crate::error::CollectError;
use crate::platform;

/// Where display EDIDs are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplaySource {
    Xrandr,
    Drm,
    /// DRM sysfs, then `xrandr` when no connector exposes an EDID.
    #[default]
    Auto,
}

/// An EDID that was found but could not be decoded.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayFailure {
    /// Connector file or `xrandr` output index.
    pub origin: String,
    pub reason: String,
}

/// Decoded monitors, unique by EDID bytes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayScan {
    pub displays: Vec<DisplayDescriptor>,
    pub errors: Vec<DisplayFailure>,
}

impl DisplayScan {
    fn push_blob(&mut self, origin: String, blob: &[u8]) {
        match decode_edid(blob) {
            Ok(display) => {
                if self.displays.contains(&display) {
                    tracing::trace!(%origin, "duplicate EDID ignored");
                } else {
                    self.displays.push(display);
                }
            }
            Err(e) => {
                tracing::warn!(%origin, error = %e, "undecodable EDID");
                self.errors.push(DisplayFailure {
                    origin,
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Collects displays from the configured source.
pub async fn collect_displays(source: DisplaySource) -> Result<DisplayScan, CollectError> {
    match source {
        DisplaySource::Xrandr => displays_from_xrandr().await,
        DisplaySource::Drm => displays_from_drm().await,
        DisplaySource::Auto => {
            match displays_from_drm().await {
                Ok(scan) if !scan.displays.is_empty() => return Ok(scan),
                Ok(_) => tracing::debug!("no DRM EDIDs, asking xrandr"),
                Err(e) => tracing::warn!(error = %e, "DRM EDIDs unreadable, asking xrandr"),
            }
            displays_from_xrandr().await
        }
    }
}

/// Decodes the EDIDs exposed by DRM connectors.
pub async fn displays_from_drm() -> Result<DisplayScan, CollectError> {
    decode_edid_files(&platform::drm_edid_paths()).await
}

/// Decodes the EDIDs in `xrandr --verbose` output.
pub async fn displays_from_xrandr() -> Result<DisplayScan, CollectError> {
    let lines = run_command(&["xrandr", "--verbose"]).await?;
    Ok(decode_xrandr_output(&lines))
}

/// Empty files belong to disconnected connectors and are skipped.
async fn decode_edid_files(paths: &[PathBuf]) -> Result<DisplayScan, CollectError> {
    let mut scan = DisplayScan::default();
    for path in paths {
        let blob = read_bytes(path).await?;
        if blob.is_empty() {
            continue;
        }
        scan.push_blob(path.display().to_string(), &blob);
    }
    tracing::info!(displays = scan.displays.len(), "DRM displays decoded");
    Ok(scan)
}

/// Decodes captured `xrandr --verbose` output.
pub fn decode_xrandr_output<S: AsRef<str>>(lines: &[S]) -> DisplayScan {
    let mut scan = DisplayScan::default();
    for (idx, blob) in edid_blobs_from_xrandr(lines).into_iter().enumerate() {
        let origin = format!("xrandr EDID #{}", idx + 1);
        match blob {
            Ok(bytes) => scan.push_blob(origin, &bytes),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "undecodable EDID dump");
                scan.errors.push(DisplayFailure {
                    origin,
                    reason: e.to_string(),
                });
            }
        }
    }
    tracing::info!(displays = scan.displays.len(), "xrandr displays decoded");
    scan
}
