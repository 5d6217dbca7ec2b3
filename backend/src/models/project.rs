//! Project configuration
//!
//! Project specific configuration handed to every stateless pipeline wrapper.
//!
//! # Critical Invariants
//!
//! 1. **Stack completeness**: there is exactly one [`StackDescription`] for
//!    every [`StackType`], from construction onwards
//! 2. **Optional parameters**: storage parameters are either set or unset;
//!    an unset parameter is never replaced by a placeholder

use crate::codec::enums::named_enum;
use crate::models::point::Point3;
use crate::models::stack::{StackDescription, StackType};

named_enum! {
    /// Which family of stores the pipeline reads from and writes to.
    pub enum BackendType as "BackendType" {
        /// Local stores. Block size, volume size, and core size have to be set.
        Local,
        /// Django stores backed by a CATMAID instance.
        Django,
        /// PostgreSql stores. Host, user, password, and database have to be set.
        PostgreSql,
    }
}

/// Configuration of one reconstruction project.
///
/// # Example
///
/// ```rust
/// use pysopnet::{BackendType, Point3, ProjectConfiguration, StackDescription, StackType};
///
/// let mut config = ProjectConfiguration::new();
/// config.set_backend_type(BackendType::PostgreSql);
/// config.set_block_size(Point3::new(512, 512, 20));
/// config.set_postgre_sql_host("db.example.org");
///
/// let membrane = StackDescription {
///     id: 2,
///     image_base: "/data/membrane/".to_string(),
///     ..Default::default()
/// };
/// config.set_catmaid_stack(StackType::Membrane, membrane);
///
/// assert_eq!(config.catmaid_stack(StackType::Membrane).id, 2);
/// assert_eq!(config.postgre_sql_host(), Some("db.example.org"));
/// assert_eq!(config.component_directory(), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfiguration {
    backend_type: BackendType,

    /// Indexed by `StackType::index`
    catmaid_stacks: Vec<StackDescription>,

    block_size: Point3,
    volume_size: Point3,
    /// Size of a core in blocks
    core_size: Point3,

    component_directory: Option<String>,

    /// Feature weights read by the local segment stores
    local_feature_weights: Vec<f64>,
    segmentation_configuration_id: i32,

    postgre_sql_host: Option<String>,
    postgre_sql_port: Option<String>,
    postgre_sql_user: Option<String>,
    postgre_sql_password: Option<String>,
    postgre_sql_database: Option<String>,
}

impl ProjectConfiguration {
    /// Create a configuration with default extents, a Django backend, a
    /// default description for every stack type, no feature weights, and no
    /// storage parameters.
    ///
    /// Storage parameters start unset rather than holding placeholder
    /// credentials, so a worker can tell "not configured" from a value.
    pub fn new() -> Self {
        Self {
            backend_type: BackendType::Django,
            catmaid_stacks: vec![StackDescription::default(); StackType::all().len()],
            block_size: Point3::new(256, 256, 10),
            volume_size: Point3::new(1024, 1024, 20),
            core_size: Point3::new(1, 1, 1),
            component_directory: None,
            local_feature_weights: Vec::new(),
            segmentation_configuration_id: 0,
            postgre_sql_host: None,
            postgre_sql_port: None,
            postgre_sql_user: None,
            postgre_sql_password: None,
            postgre_sql_database: None,
        }
    }

    pub fn backend_type(&self) -> BackendType {
        self.backend_type
    }

    pub fn set_backend_type(&mut self, backend_type: BackendType) {
        self.backend_type = backend_type;
    }

    /// Get the CATMAID stack description for a stack type.
    pub fn catmaid_stack(&self, stack_type: StackType) -> &StackDescription {
        &self.catmaid_stacks[stack_type.index()]
    }

    /// Replace the CATMAID stack description for a stack type.
    pub fn set_catmaid_stack(&mut self, stack_type: StackType, stack: StackDescription) {
        self.catmaid_stacks[stack_type.index()] = stack;
    }

    /// Size of a block in voxels.
    pub fn block_size(&self) -> Point3 {
        self.block_size
    }

    pub fn set_block_size(&mut self, block_size: Point3) {
        self.block_size = block_size;
    }

    /// Size of the whole volume in voxels.
    pub fn volume_size(&self) -> Point3 {
        self.volume_size
    }

    pub fn set_volume_size(&mut self, volume_size: Point3) {
        self.volume_size = volume_size;
    }

    /// Size of a core in blocks.
    pub fn core_size(&self) -> Point3 {
        self.core_size
    }

    pub fn set_core_size(&mut self, core_size_in_blocks: Point3) {
        self.core_size = core_size_in_blocks;
    }

    /// Local directory holding the connected components of slices.
    pub fn component_directory(&self) -> Option<&str> {
        self.component_directory.as_deref()
    }

    pub fn set_component_directory(&mut self, component_directory: impl Into<String>) {
        self.component_directory = Some(component_directory.into());
    }

    pub fn local_feature_weights(&self) -> &[f64] {
        &self.local_feature_weights
    }

    pub fn set_local_feature_weights(&mut self, feature_weights: Vec<f64>) {
        self.local_feature_weights = feature_weights;
    }

    pub fn segmentation_configuration_id(&self) -> i32 {
        self.segmentation_configuration_id
    }

    pub fn set_segmentation_configuration_id(&mut self, id: i32) {
        self.segmentation_configuration_id = id;
    }

    /// PostgreSql host name, or a directory for Unix socket communication.
    pub fn postgre_sql_host(&self) -> Option<&str> {
        self.postgre_sql_host.as_deref()
    }

    pub fn set_postgre_sql_host(&mut self, host: impl Into<String>) {
        self.postgre_sql_host = Some(host.into());
    }

    pub fn postgre_sql_port(&self) -> Option<&str> {
        self.postgre_sql_port.as_deref()
    }

    pub fn set_postgre_sql_port(&mut self, port: impl Into<String>) {
        self.postgre_sql_port = Some(port.into());
    }

    pub fn postgre_sql_user(&self) -> Option<&str> {
        self.postgre_sql_user.as_deref()
    }

    pub fn set_postgre_sql_user(&mut self, user: impl Into<String>) {
        self.postgre_sql_user = Some(user.into());
    }

    pub fn postgre_sql_password(&self) -> Option<&str> {
        self.postgre_sql_password.as_deref()
    }

    pub fn set_postgre_sql_password(&mut self, password: impl Into<String>) {
        self.postgre_sql_password = Some(password.into());
    }

    pub fn postgre_sql_database(&self) -> Option<&str> {
        self.postgre_sql_database.as_deref()
    }

    pub fn set_postgre_sql_database(&mut self, database: impl Into<String>) {
        self.postgre_sql_database = Some(database.into());
    }
}

impl Default for ProjectConfiguration {
    fn default() -> Self {
        Self::new()
    }
}
