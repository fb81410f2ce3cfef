use crate::scene::{ObjectId, Scene};

/// Read-only queries against a scene for logging and tooling.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(scene: &Scene) -> SceneSummary {
        SceneSummary {
            ready: scene.is_ready(),
            programs: scene.registry().names().map(str::to_string).collect(),
            object_count: scene.object_count(),
            visible_count: scene.visible_count(),
            frames_drawn: scene.frames_drawn(),
        }
    }

    /// Describe one object's material binding.
    pub fn inspect_object(scene: &Scene, id: ObjectId) -> Option<ObjectInfo> {
        scene.object(id).map(|object| {
            let material = object.material();
            ObjectInfo {
                id,
                program: material.program_name().map(str::to_string),
                textures: material.texture_names().map(str::to_string).collect(),
                index_count: object.geometry().index_count(),
                visible: scene.is_visible(id),
            }
        })
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub ready: bool,
    pub programs: Vec<String>,
    pub object_count: usize,
    pub visible_count: usize,
    pub frames_drawn: u64,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: ready={} programs=[{}] objects={} visible={} frames={}",
            self.ready,
            self.programs.join(", "),
            self.object_count,
            self.visible_count,
            self.frames_drawn
        )
    }
}

/// Material binding of a single object.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub id: ObjectId,
    pub program: Option<String>,
    pub textures: Vec<String>,
    pub index_count: u32,
    pub visible: bool,
}

impl std::fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Object [{}] program={} textures=[{}] indices={}{}",
            self.id.0,
            self.program.as_deref().unwrap_or("-"),
            self.textures.join(", "),
            self.index_count,
            if self.visible { "" } else { " (hidden)" },
        )
    }
}
