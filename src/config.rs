//! Frame configuration of the kinematic core, and its loading from YAML (optional)
//!
//! The core never applies defaults itself: `FrameConfig` must name both frames. The YAML
//! loader is where the usual defaults (`BASE` for the kinematic base frame and `XTION` for
//! the camera) are filled in.

#[cfg(feature = "allow_filesystem")]
use std::path::{Path, PathBuf};

/// Default base frame of the camera chain used by the loader.
pub const DEFAULT_BASE_FRAME: &str = "BASE";

/// Default camera frame used by the loader.
pub const DEFAULT_CAMERA_FRAME: &str = "XTION";

/// The two frames between which the camera chain is built. All link poses are
/// returned in the camera frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameConfig {
    pub base_frame: String,
    pub camera_frame: String,
}

impl FrameConfig {
    pub fn new(base_frame: impl Into<String>, camera_frame: impl Into<String>) -> Self {
        FrameConfig {
            base_frame: base_frame.into(),
            camera_frame: camera_frame.into(),
        }
    }
}

/// Complete configuration of the pose printer: frames plus the robot description location.
#[cfg(feature = "allow_filesystem")]
#[derive(Debug, Clone, PartialEq)]
pub struct StateConfig {
    pub frames: FrameConfig,
    pub robot_description: Option<PathBuf>,
}

#[cfg(feature = "allow_filesystem")]
impl Default for StateConfig {
    fn default() -> Self {
        StateConfig {
            frames: FrameConfig::new(DEFAULT_BASE_FRAME, DEFAULT_CAMERA_FRAME),
            robot_description: None,
        }
    }
}

#[cfg(feature = "allow_filesystem")]
impl StateConfig {
    /// Read the configuration from YAML file. YAML file like this is supported:
    /// ```yaml
    /// camera_frame: head_camera_link
    /// kinematic_frame: base_link
    /// robot_description: robots/pan_tilt.urdf
    /// ```
    /// All keys are optional. Missing frames default to `BASE` and `XTION`.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, crate::parameter_error::ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, crate::parameter_error::ParameterError> {
        use crate::parameter_error::ParameterError;
        use yaml_rust2::{Yaml, YamlLoader};

        let docs = YamlLoader::load_from_str(contents)
            .map_err(|e| ParameterError::ParseError(e.to_string()))?;

        let mut config = StateConfig::default();
        let doc = match docs.first() {
            Some(doc) => doc,
            None => return Ok(config), // Empty file
        };
        if !matches!(doc, Yaml::Hash(_) | Yaml::Null) {
            return Err(ParameterError::ParseError(
                "configuration must be a mapping of keys to values".into()));
        }

        let string_value = |key: &str| -> Result<Option<String>, ParameterError> {
            match &doc[key] {
                Yaml::BadValue | Yaml::Null => Ok(None),
                Yaml::String(value) => Ok(Some(value.clone())),
                other => Err(ParameterError::ParseError(
                    format!("{} must be a string, got {:?}", key, other))),
            }
        };

        if let Some(camera) = string_value("camera_frame")? {
            config.frames.camera_frame = camera;
        }
        if let Some(base) = string_value("kinematic_frame")? {
            config.frames.base_frame = base;
        }
        config.robot_description = string_value("robot_description")?.map(PathBuf::from);

        Ok(config)
    }
}
