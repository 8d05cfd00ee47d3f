//! Build orchestration.
//!
//! A [`Pipeline`] owns the image collaborators and sequences the work for
//! each command: cache lookups, layout, composition, optimisation and
//! stylesheet output. Commands print the reports it returns.

mod build;
mod optimise;
mod position;

pub use build::{BuildOptions, BuildReport, SpriteOutcome, SpriteReport};
pub use optimise::{collect_pngs, FileOutcome, FileReport, OptimiseOptions, OptimiseReport};
pub use position::{locate, SourceLocation};

use crate::render::{Composer, ImageBackend, ImageInspector, Optimiser, PngOptimiser};

/// The collaborators used to inspect, compose and optimise images.
pub struct Pipeline<'a> {
    inspector: &'a dyn ImageInspector,
    composer: &'a dyn Composer,
    optimiser: &'a dyn Optimiser,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        inspector: &'a dyn ImageInspector,
        composer: &'a dyn Composer,
        optimiser: &'a dyn Optimiser,
    ) -> Self {
        Self {
            inspector,
            composer,
            optimiser,
        }
    }

    pub fn inspector(&self) -> &'a dyn ImageInspector {
        self.inspector
    }
}

/// The default collaborators: the `image` crate and oxipng.
pub struct Backends {
    pub images: ImageBackend,
    pub optimiser: PngOptimiser,
}

impl Backends {
    pub fn new() -> Self {
        Self {
            images: ImageBackend::new(),
            optimiser: PngOptimiser::new(),
        }
    }

    pub fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(&self.images, &self.images, &self.optimiser)
    }
}

impl Default for Backends {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fakes and fixtures shared by the pipeline tests.

    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use image::{Rgba, RgbaImage};

    use crate::error::{Result, SprigError};
    use crate::render::{Composer, Optimiser, Placement};

    /// Write a solid PNG fixture.
    pub fn write_image(path: &Path, width: u32, height: u32) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]))
            .save(path)
            .unwrap();
    }

    /// Counts compositions and delegates to the real backend.
    #[derive(Default)]
    pub struct CountingComposer {
        pub calls: AtomicUsize,
    }

    impl CountingComposer {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Composer for CountingComposer {
        fn compose(&self, placements: &[Placement<'_>], canvas: (u32, u32)) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            crate::render::ImageBackend::new().compose(placements, canvas)
        }
    }

    /// Records optimised paths without touching them.
    #[derive(Default)]
    pub struct RecordingOptimiser {
        pub paths: Mutex<Vec<PathBuf>>,
        pub fail_on: Option<PathBuf>,
    }

    impl RecordingOptimiser {
        pub fn failing_on(path: impl Into<PathBuf>) -> Self {
            Self {
                paths: Mutex::new(Vec::new()),
                fail_on: Some(path.into()),
            }
        }

        pub fn paths(&self) -> Vec<PathBuf> {
            let mut paths = self.paths.lock().unwrap().clone();
            paths.sort();
            paths
        }
    }

    impl Optimiser for RecordingOptimiser {
        fn optimise(&self, path: &Path) -> Result<u64> {
            if self.fail_on.as_deref() == Some(path) {
                return Err(SprigError::Optimise {
                    path: path.to_path_buf(),
                    message: "refused".to_string(),
                });
            }
            self.paths.lock().unwrap().push(path.to_path_buf());
            Ok(7)
        }
    }
}
