use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::decode::{load_image, normalize_pair};
use crate::foundation::core::{Canvas, Fps, Rgb8};
use crate::foundation::error::{MorphError, MorphResult};
use crate::morph::barycentric::EdgeRule;
use crate::points::correspondence::CorrespondenceSet;
use crate::render::frame::RasterImage;
use crate::render::pipeline::{MorphContext, MorphOptions, MorphRequest, RenderThreading};

/// A morph job as stored on disk.
///
/// ```json
/// {
///   "source": "a.png",
///   "target": "b.png",
///   "points": [
///     { "source": { "x": 40.0, "y": 52.0 }, "target": { "x": 44.0, "y": 50.0 } }
///   ],
///   "intermediate_frames": 8
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MorphProject {
    /// Source image; relative paths resolve against the project file's directory.
    pub source: PathBuf,
    pub target: PathBuf,
    /// Common canvas both images are resized to. Defaults to the source image size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<Canvas>,
    #[serde(default)]
    pub points: CorrespondenceSet,
    #[serde(default = "default_intermediate_frames")]
    pub intermediate_frames: u32,
    #[serde(default)]
    pub fps: Fps,
    #[serde(default = "default_background")]
    pub background: Rgb8,
    #[serde(default)]
    pub edge_rule: EdgeRule,
}

fn default_intermediate_frames() -> u32 {
    5
}

fn default_background() -> Rgb8 {
    Rgb8::WHITE
}

impl MorphProject {
    /// A project with default settings and an empty point table.
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            canvas: None,
            points: CorrespondenceSet::new(),
            intermediate_frames: default_intermediate_frames(),
            fps: Fps::default(),
            background: default_background(),
            edge_rule: EdgeRule::default(),
        }
    }

    /// Parse a project from a JSON reader. Image paths are left as written.
    pub fn from_reader<R: std::io::Read>(r: R) -> MorphResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| MorphError::validation(format!("parse morph project JSON: {e}")))
    }

    /// Parse a project file and resolve relative image paths against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> MorphResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MorphError::validation(format!("open morph project '{}': {e}", path.display()))
        })?;
        let mut project = Self::from_reader(BufReader::new(f))?;
        if let Some(base) = path.parent() {
            project.resolve_paths(base);
        }
        Ok(project)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        for p in [&mut self.source, &mut self.target] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }

    pub fn to_json_pretty(&self) -> MorphResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MorphError::validation(format!("serialize morph project: {e}")))
    }

    /// Check settings that do not need the images.
    pub fn validate(&self) -> MorphResult<()> {
        MorphRequest::new(self.intermediate_frames)?;
        self.fps.validate()?;
        if let Some(canvas) = self.canvas {
            canvas.validate()?;
        }
        Ok(())
    }

    pub fn request(&self) -> MorphResult<MorphRequest> {
        MorphRequest::new(self.intermediate_frames)
    }

    pub fn options(&self, threading: RenderThreading) -> MorphOptions {
        MorphOptions {
            background: self.background,
            edge_rule: self.edge_rule,
            threading,
        }
    }

    /// Decode both images and bring them onto the project canvas.
    pub fn load_images(&self) -> MorphResult<(RasterImage, RasterImage)> {
        let source = load_image(&self.source)?;
        let target = load_image(&self.target)?;
        let canvas = self.canvas.unwrap_or_else(|| source.canvas());
        if source.canvas() != canvas || target.canvas() != canvas {
            tracing::info!(
                width = canvas.width,
                height = canvas.height,
                "normalizing images to a common canvas"
            );
        }
        normalize_pair(&source, &target, canvas)
    }

    /// Validate, load the images and build the render context.
    #[tracing::instrument(skip(self), fields(source = %self.source.display(), target = %self.target.display()))]
    pub fn prepare(&self) -> MorphResult<MorphContext> {
        self.validate()?;
        let (source, target) = self.load_images()?;
        MorphContext::prepare(source, target, &self.points)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/file.rs"]
mod tests;
