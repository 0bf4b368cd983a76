//! Startup assets listed in a TOML manifest and loaded before the window opens.

use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use image::ImageFormat;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const ALL_ASSET_KEYS: [AssetKey; 2] = [AssetKey::Font, AssetKey::Victory];

/// Assets named by the manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKey {
    /// TrueType font used by the coin counter.
    Font,
    /// Image shown once the level is completed.
    Victory,
}

impl AssetKey {
    fn from_manifest_name(name: &str) -> Option<Self> {
        match name {
            "font" => Some(Self::Font),
            "victory" => Some(Self::Victory),
            _ => None,
        }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Font => f.write_str("font"),
            Self::Victory => f.write_str("victory"),
        }
    }
}

/// Image decoded into tightly packed 8-bit RGBA pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct RgbaImage {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
}

impl RgbaImage {
    /// Decodes PNG bytes.
    pub fn decode_png(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .context("failed to decode png image")?
            .to_rgba8();
        let width = u16::try_from(decoded.width())
            .with_context(|| format!("image width {} is too large", decoded.width()))?;
        let height = u16::try_from(decoded.height())
            .with_context(|| format!("image height {} is too large", decoded.height()))?;
        Ok(Self {
            width,
            height,
            pixels: decoded.into_raw(),
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Row-major RGBA bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl fmt::Debug for RgbaImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RgbaImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Font bytes and decoded images required to draw a frame.
#[derive(Clone, PartialEq, Eq)]
pub struct AssetBundle {
    font: Vec<u8>,
    victory: RgbaImage,
}

impl AssetBundle {
    /// Returns the default manifest path relative to the repository root.
    #[must_use]
    pub fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Loads every asset listed in the manifest at the provided path.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Raw TrueType font bytes.
    #[must_use]
    pub fn font(&self) -> &[u8] {
        &self.font
    }

    /// Decoded victory image.
    #[must_use]
    pub fn victory(&self) -> &RgbaImage {
        &self.victory
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(AssetKey, &Path) -> Result<Vec<u8>>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read asset manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Self::from_entries(entries, &mut loader)
    }

    fn from_entries(
        entries: Vec<(AssetKey, PathBuf)>,
        loader: &mut impl FnMut(AssetKey, &Path) -> Result<Vec<u8>>,
    ) -> Result<Self> {
        let mut font = None;
        let mut victory = None;
        for (key, path) in entries {
            let bytes = loader(key, &path)
                .with_context(|| format!("failed to load {key} asset from {}", path.display()))?;
            log::debug!("loaded {key} asset ({} bytes) from {}", bytes.len(), path.display());
            match key {
                AssetKey::Font => {
                    if bytes.is_empty() {
                        bail!("font asset at {} is empty", path.display());
                    }
                    font = Some(bytes);
                }
                AssetKey::Victory => {
                    let image = RgbaImage::decode_png(&bytes).with_context(|| {
                        format!("failed to decode victory image at {}", path.display())
                    })?;
                    victory = Some(image);
                }
            }
        }

        let (Some(font), Some(victory)) = (font, victory) else {
            bail!("asset manifest did not provide every asset");
        };
        Ok(Self { font, victory })
    }
}

impl fmt::Debug for AssetBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetBundle")
            .field("font_bytes", &self.font.len())
            .field("victory", &self.victory)
            .finish()
    }
}

fn default_loader(_key: AssetKey, path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read asset at {}", path.display()))
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    assets: HashMap<String, String>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(AssetKey, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse asset manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported asset manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    let mut unexpected = Vec::new();
    for (name, relative_path) in manifest.assets {
        match AssetKey::from_manifest_name(&name) {
            Some(key) => {
                let _ = resolved.insert(key, base_path.join(relative_path));
            }
            None => unexpected.push(name),
        }
    }

    if !unexpected.is_empty() {
        unexpected.sort();
        bail!(
            "asset manifest contains unexpected keys: {}",
            unexpected.join(", ")
        );
    }

    let mut ordered = Vec::with_capacity(ALL_ASSET_KEYS.len());
    for key in ALL_ASSET_KEYS {
        let Some(path) = resolved.remove(&key) else {
            bail!("asset manifest missing entry for {key}");
        };
        ordered.push((key, path));
    }
    Ok(ordered)
}
