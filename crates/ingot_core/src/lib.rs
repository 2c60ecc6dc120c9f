//! Ingot Core - multi-format 3D asset import.
//!
//! This crate provides:
//!
//! - **Scene model**: `Scene`, `Node`, `Mesh`, `Material`, `TextureSlot`
//! - **Import pipeline**: format detection, parsing, post-processing and
//!   validation behind the [`Importer`] façade
//! - **Format workers**: USDA and Wavefront OBJ
//!
//! # Example
//!
//! ```ignore
//! use ingot_core::{Importer, PostProcess};
//!
//! let mut importer = Importer::new();
//! match importer.read_file("scene.usda", PostProcess::TRIANGULATE | PostProcess::GEN_NORMALS) {
//!     Some(scene) => println!("Loaded {} meshes", scene.mesh_count()),
//!     None => eprintln!("Import failed: {}", importer.error_string()),
//! }
//! ```

pub mod config;
pub mod formats;
pub mod importer;
pub mod io;
pub mod postprocess;
pub mod scene;

// Re-export commonly used types
pub use config::{ImportSettings, SettingsError};
pub use importer::{
    FormatError, FormatWorker, ImportError, Importer, PostProcess, Registry, RegistryBuilder,
    RegistryError,
};
pub use io::{FileSystem, IoSystem, MemoryIoSystem, Stream};
pub use postprocess::{PostProcessStep, StepContext, StepError};
pub use scene::{Material, Mesh, Node, NodeId, Scene, TextureSlot, TextureType};

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Cursor;

    /// Encode a solid orange RGBA image as PNG.
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 128, 0, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, image::ImageOutputFormat::Png)
            .expect("encode png");
        bytes.into_inner()
    }
}
