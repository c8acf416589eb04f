use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};

use crate::environment::{Environment, EnvironmentSource, EquirectMap};
use crate::foundation::error::{BubbleError, BubbleResult};

/// Loading state of one asynchronous asset.
#[derive(Clone, Debug)]
pub enum Resource<T> {
    Pending,
    Ready(T),
    Failed(Arc<BubbleError>),
}

impl<T> Resource<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    fn from_result(res: BubbleResult<T>) -> Self {
        match res {
            Ok(v) => Self::Ready(v),
            Err(e) => Self::Failed(Arc::new(e)),
        }
    }
}

/// Decoded font file. `bytes` is shared with the text shaper and the glyph renderer.
#[derive(Clone)]
pub struct FontAsset {
    pub path: String,
    pub bytes: Arc<Vec<u8>>,
    /// Family name of the first face.
    pub family: String,
    /// OS/2 weight class of the first face.
    pub weight: u16,
}

impl std::fmt::Debug for FontAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontAsset")
            .field("path", &self.path)
            .field("bytes_len", &self.bytes.len())
            .field("family", &self.family)
            .field("weight", &self.weight)
            .finish()
    }
}

impl FontAsset {
    /// Validate font bytes and pull out the family name and weight of the first face.
    pub fn from_bytes(path: impl Into<String>, bytes: Vec<u8>) -> BubbleResult<Self> {
        let path = path.into();
        let bytes = Arc::new(bytes);
        let mut db = usvg::fontdb::Database::new();
        db.load_font_source(usvg::fontdb::Source::Binary(bytes.clone()));
        let face = db
            .faces()
            .next()
            .ok_or_else(|| BubbleError::asset(format!("'{path}' contains no usable font face")))?;
        let family = face
            .families
            .first()
            .map(|(name, _)| name.clone())
            .ok_or_else(|| BubbleError::asset(format!("'{path}' font face has no family name")))?;
        let weight = face.weight.0;
        Ok(Self {
            path,
            bytes,
            family,
            weight,
        })
    }
}

/// Everything the scene needs loaded before its first paint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRequests {
    pub light_font: String,
    pub medium_font: String,
    pub environment: EnvironmentSource,
}

/// Current state of every scene asset.
#[derive(Clone, Debug)]
pub struct SceneAssets {
    pub light_font: Resource<FontAsset>,
    pub medium_font: Resource<FontAsset>,
    pub environment: Resource<Arc<Environment>>,
}

impl SceneAssets {
    pub fn pending() -> Self {
        Self {
            light_font: Resource::Pending,
            medium_font: Resource::Pending,
            environment: Resource::Pending,
        }
    }

    pub fn is_settled(&self) -> bool {
        !(self.light_font.is_pending()
            || self.medium_font.is_pending()
            || self.environment.is_pending())
    }

    /// First failure, in declaration order.
    pub fn first_failure(&self) -> Option<(&'static str, &Arc<BubbleError>)> {
        if let Resource::Failed(e) = &self.light_font {
            return Some(("light_font", e));
        }
        if let Resource::Failed(e) = &self.medium_font {
            return Some(("medium_font", e));
        }
        if let Resource::Failed(e) = &self.environment {
            return Some(("environment", e));
        }
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FontSlot {
    Light,
    Medium,
}

enum Loaded {
    Font(FontSlot, BubbleResult<FontAsset>),
    Environment(BubbleResult<Environment>),
}

/// Runs asset loads on the rayon pool and folds results into [`SceneAssets`].
pub struct AssetLoader {
    root: PathBuf,
    rx: mpsc::Receiver<Loaded>,
    assets: SceneAssets,
    outstanding: usize,
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("root", &self.root)
            .field("assets", &self.assets)
            .field("outstanding", &self.outstanding)
            .finish()
    }
}

impl AssetLoader {
    /// Start loading `requests` relative to `root`. Returns immediately.
    pub fn spawn(root: impl Into<PathBuf>, requests: &AssetRequests) -> Self {
        let root = root.into();
        let (tx, rx) = mpsc::channel();
        let mut assets = SceneAssets::pending();
        let mut outstanding = 0;

        for (slot, rel) in [
            (FontSlot::Light, &requests.light_font),
            (FontSlot::Medium, &requests.medium_font),
        ] {
            let tx = tx.clone();
            let root = root.clone();
            let rel = rel.clone();
            outstanding += 1;
            rayon::spawn(move || {
                let res = read_bytes(&root, &rel).and_then(|b| FontAsset::from_bytes(rel, b));
                let _ = tx.send(Loaded::Font(slot, res));
            });
        }

        match &requests.environment {
            // Presets are procedural; nothing to wait for.
            EnvironmentSource::Preset(p) => {
                assets.environment = Resource::Ready(Arc::new(Environment::preset(*p)));
            }
            EnvironmentSource::File(rel) => {
                let tx = tx.clone();
                let root = root.clone();
                let rel = rel.clone();
                outstanding += 1;
                rayon::spawn(move || {
                    let res = read_bytes(&root, &rel)
                        .and_then(|b| EquirectMap::decode(&b))
                        .map(Environment::Equirect);
                    let _ = tx.send(Loaded::Environment(res));
                });
            }
        }

        Self {
            root,
            rx,
            assets,
            outstanding,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn assets(&self) -> &SceneAssets {
        &self.assets
    }

    pub fn is_settled(&self) -> bool {
        self.outstanding == 0
    }

    /// Fold in finished loads without blocking. Returns `true` if any resource changed state.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.rx.try_recv() {
            self.apply(msg);
            changed = true;
        }
        changed
    }

    /// Block until every load has finished (successfully or not).
    pub fn wait(&mut self) -> &SceneAssets {
        while self.outstanding > 0 {
            match self.rx.recv() {
                Ok(msg) => self.apply(msg),
                // Every sender is gone; anything still pending will never resolve.
                Err(_) => break,
            }
        }
        &self.assets
    }

    fn apply(&mut self, msg: Loaded) {
        self.outstanding = self.outstanding.saturating_sub(1);
        match msg {
            Loaded::Font(slot, res) => {
                match &res {
                    Ok(font) => tracing::debug!(
                        path = %font.path,
                        family = %font.family,
                        weight = font.weight,
                        "font loaded"
                    ),
                    Err(e) => tracing::warn!(slot = ?slot, error = %e, "font failed to load"),
                }
                let r = Resource::from_result(res);
                match slot {
                    FontSlot::Light => self.assets.light_font = r,
                    FontSlot::Medium => self.assets.medium_font = r,
                }
            }
            Loaded::Environment(res) => {
                match &res {
                    Ok(_) => tracing::debug!("environment map loaded"),
                    Err(e) => tracing::warn!(error = %e, "environment map failed to load"),
                }
                self.assets.environment = Resource::from_result(res.map(Arc::new));
            }
        }
    }
}

fn read_bytes(root: &Path, rel: &str) -> BubbleResult<Vec<u8>> {
    let norm = normalize_rel_path(rel)?;
    let p = root.join(Path::new(&norm));
    std::fs::read(&p)
        .map_err(|e| BubbleError::asset(format!("failed to read asset '{}': {e}", p.display())))
}

/// Normalize and validate an assets-root-relative path.
///
/// The result uses `/` separators with `.` segments removed. Absolute paths and parent
/// traversals (`..`) are rejected.
pub fn normalize_rel_path(source: &str) -> BubbleResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(BubbleError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(BubbleError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(BubbleError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(BubbleError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
