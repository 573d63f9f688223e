use serde::{Deserialize, Serialize};

use crate::config::ToolConfig;
use crate::ops::bone_ops::BoneParentHistory;
use crate::ops::scene::Scene;

/// Everything an operation may read or change
///
/// Passed explicitly to every entry point. The scene and bone history persist
/// with the session file; the tool configuration is supplied by the caller on
/// each run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub scene: Scene,
    #[serde(default)]
    pub history: BoneParentHistory,
    #[serde(skip)]
    pub config: ToolConfig,
}

impl Session {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: ToolConfig) -> Self {
        self.config = config;
        self
    }
}
