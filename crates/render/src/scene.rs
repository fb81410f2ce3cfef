//! Scene: shader lifecycle, object list and the per-frame draw loop.
//!
//! # Invariants
//! - `ready` turns true once, after every expected program was compiled and
//!   either registered or skipped.
//! - A failed startup leaves the scene permanently not ready.
//! - `draw` refuses to run until ready; it never queues or retries.

use crate::context::GraphicsContext;
use crate::material::MaterialError;
use crate::object::{ObjectDescriptor, RenderObject};
use crate::registry::{ProgramHandle, ProgramLocations, ProgramRegistry, Registration};
use crate::shader::{ProgramSource, ShaderError, ShaderLoader};
use crate::uniform::UniformValue;
use futures::future::{try_join, try_join_all};
use std::collections::{BTreeMap, BTreeSet};

/// Per-frame values (camera matrix, eye) offered to every visible object.
pub type FrameUniforms = BTreeMap<String, UniformValue>;

/// Errors from scene startup and object construction.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Material(#[from] MaterialError),
    #[error("scene startup already failed")]
    StartupFailed,
}

/// Index of an object inside its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// Outcome of a `draw` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStatus {
    /// The draw loop ran and submitted this many objects.
    Drawn(usize),
    NotReady,
    NoPrograms,
}

#[derive(Debug)]
struct SceneEntry {
    object: RenderObject,
    visible: bool,
    initialized: bool,
    locations: Option<ProgramLocations>,
}

/// Owns the program registry and the objects drawn with it.
#[derive(Debug, Default)]
pub struct Scene {
    registry: ProgramRegistry,
    programs: BTreeMap<String, ProgramHandle>,
    loaded: BTreeSet<String>,
    ready: bool,
    failed: bool,
    objects: Vec<SceneEntry>,
    frames: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ProgramRegistry {
        &self.registry
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn startup_failed(&self) -> bool {
        self.failed
    }

    /// Names that went through registration during startup.
    pub fn loaded_programs(&self) -> impl Iterator<Item = &str> {
        self.loaded.iter().map(String::as_str)
    }

    /// Number of frames the draw loop actually ran.
    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    /// Keep a compiled program for registration. The first program stored
    /// under a name is kept.
    pub fn register_program(&mut self, name: &str, handle: ProgramHandle) {
        self.programs.entry(name.to_string()).or_insert(handle);
    }

    /// Fetch every program's sources concurrently, then compile, register
    /// and mark the scene ready.
    ///
    /// Any fetch or compile failure aborts startup for good. A compiled
    /// program the registry rejects is logged and skipped.
    pub async fn initialize(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        loader: &dyn ShaderLoader,
        sources: &[ProgramSource],
    ) -> Result<(), SceneError> {
        if self.ready {
            return Ok(());
        }
        if self.failed {
            return Err(SceneError::StartupFailed);
        }
        match self.load_programs(ctx, loader, sources).await {
            Ok(()) => {}
            Err(e) => {
                self.failed = true;
                tracing::error!("scene initialization failed: {e}");
                return Err(e.into());
            }
        }

        for (name, handle) in &self.programs {
            match self.registry.register(name, handle.clone()) {
                Registration::Rejected => {
                    tracing::error!("failed to create program: {name}");
                    continue;
                }
                Registration::Registered | Registration::AlreadyPresent => {}
            }
            self.loaded.insert(name.clone());
        }
        self.ready = true;
        tracing::info!("scene ready with {} programs", self.registry.len());
        Ok(())
    }

    async fn load_programs(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        loader: &dyn ShaderLoader,
        sources: &[ProgramSource],
    ) -> Result<(), ShaderError> {
        let mut seen = BTreeSet::new();
        let unique: Vec<&ProgramSource> = sources
            .iter()
            .filter(|source| {
                let first = seen.insert(source.name.as_str());
                if !first {
                    tracing::warn!("program {} listed twice, using the first", source.name);
                }
                first
            })
            .collect();

        let fetched = try_join_all(unique.into_iter().map(move |source| async move {
            let (vertex, fragment) =
                try_join(loader.load(&source.vertex), loader.load(&source.fragment)).await?;
            Ok::<_, ShaderError>((source, vertex, fragment))
        }))
        .await?;

        // nothing is kept unless every program compiles
        let mut compiled = Vec::with_capacity(fetched.len());
        for (source, vertex, fragment) in fetched {
            let handle = source.compile(ctx, &vertex, &fragment)?;
            tracing::debug!("compiled program {} as {:?}", source.name, handle.program);
            compiled.push((source, handle));
        }
        for (source, handle) in compiled {
            self.register_program(&source.name, handle);
        }
        Ok(())
    }

    /// Append an object. Objects draw in insertion order.
    pub fn add(&mut self, object: RenderObject) -> ObjectId {
        self.objects.push(SceneEntry {
            object,
            visible: true,
            initialized: false,
            locations: None,
        });
        ObjectId(self.objects.len() - 1)
    }

    /// Build an object against this scene's registry and append it.
    pub fn add_descriptor(&mut self, descriptor: ObjectDescriptor) -> Result<ObjectId, SceneError> {
        let object = RenderObject::new(descriptor, &self.registry)?;
        Ok(self.add(object))
    }

    pub fn object(&self, id: ObjectId) -> Option<&RenderObject> {
        self.objects.get(id.0).map(|entry| &entry.object)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut RenderObject> {
        self.objects.get_mut(id.0).map(|entry| &mut entry.object)
    }

    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> bool {
        match self.objects.get_mut(id.0) {
            Some(entry) => {
                entry.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn is_visible(&self, id: ObjectId) -> bool {
        self.objects.get(id.0).is_some_and(|entry| entry.visible)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn visible_count(&self) -> usize {
        self.objects.iter().filter(|entry| entry.visible).count()
    }

    /// Draw one frame if the scene is ready and has programs.
    pub fn draw(&mut self, ctx: &mut dyn GraphicsContext, frame: &FrameUniforms) -> DrawStatus {
        if !self.ready {
            tracing::warn!("scene not ready, skipping draw");
            return DrawStatus::NotReady;
        }
        if self.registry.is_empty() {
            tracing::warn!("no programs registered, skipping draw");
            return DrawStatus::NoPrograms;
        }
        let drawn = self.draw_objects(ctx, frame);
        self.frames += 1;
        DrawStatus::Drawn(drawn)
    }

    fn draw_objects(&mut self, ctx: &mut dyn GraphicsContext, frame: &FrameUniforms) -> usize {
        let mut drawn = 0;
        for (index, entry) in self.objects.iter_mut().enumerate() {
            if !entry.visible {
                continue;
            }
            let Some(program) = entry.object.material().program().cloned() else {
                tracing::warn!("object {index} has no program, skipping");
                continue;
            };

            let material = entry.object.material_mut();
            for (name, value) in frame {
                material.set_uniform(name, value.clone());
            }

            if !entry.initialized {
                entry.object.init(ctx);
                entry.initialized = true;
            }
            let locations = entry
                .locations
                .get_or_insert_with(|| program.resolve_locations(ctx));

            ctx.use_program(program.program);
            entry
                .object
                .update(ctx, &locations.attributes, &locations.uniforms);
            ctx.draw_elements(
                entry.object.material().draw_mode(),
                entry.object.geometry().index_count(),
            );
            drawn += 1;
        }
        drawn
    }
}
