//! Image stack descriptions
//!
//! A project references one CATMAID image stack per [`StackType`]. Each stack
//! is described by a plain [`StackDescription`] record.

use crate::codec::enums::named_enum;

named_enum! {
    /// The type of image stack to request.
    pub enum StackType as "StackType" {
        /// Raw image data
        Raw,
        /// Membrane probability maps used for segmentation
        Membrane,
    }
}

/// Location and geometry of one CATMAID image stack.
///
/// Every field is required; a default description has zeroed numbers and
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackDescription {
    pub id: u32,
    pub segmentation_id: u32,

    /// Base URL or directory of the image tiles
    pub image_base: String,
    pub file_extension: String,

    /// CATMAID tile source kind (numeric code)
    pub tile_source_type: u32,
    pub tile_width: u32,
    pub tile_height: u32,

    /// Stack dimensions in pixels (width, height) and sections (depth)
    pub width: u32,
    pub height: u32,
    pub depth: u32,

    pub res_x: f64,
    pub res_y: f64,
    pub res_z: f64,

    pub scale: u32,
}
