//! Program registry: the single name → compiled-program map shared by every
//! material built against one graphics context.

use crate::context::GraphicsContext;
use glassroom_common::{AttribLocation, ProgramId, UniformLocation};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Uniform name → location in one program.
pub type UniformLocations = BTreeMap<String, UniformLocation>;

/// Attribute name → location in one program.
pub type AttribLocations = BTreeMap<String, AttribLocation>;

/// A linked program together with the attribute and uniform names it is
/// driven through. Names are resolved to locations on use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramHandle {
    pub program: ProgramId,
    pub attribute_names: Vec<String>,
    pub uniform_names: Vec<String>,
}

impl ProgramHandle {
    pub fn new(
        program: ProgramId,
        attribute_names: impl IntoIterator<Item = impl Into<String>>,
        uniform_names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program,
            attribute_names: attribute_names.into_iter().map(Into::into).collect(),
            uniform_names: uniform_names.into_iter().map(Into::into).collect(),
        }
    }

    /// A handle is usable when it names a real program and none of its
    /// attribute or uniform names is blank.
    pub fn is_valid(&self) -> bool {
        !self.program.is_null()
            && self
                .attribute_names
                .iter()
                .chain(&self.uniform_names)
                .all(|name| !name.trim().is_empty())
    }

    /// Look up every listed name. Names the program does not use are left out.
    pub fn resolve_locations(&self, ctx: &mut dyn GraphicsContext) -> ProgramLocations {
        let attributes = self
            .attribute_names
            .iter()
            .filter_map(|name| {
                ctx.attrib_location(self.program, name)
                    .map(|loc| (name.clone(), loc))
            })
            .collect();
        let uniforms = self
            .uniform_names
            .iter()
            .filter_map(|name| {
                ctx.uniform_location(self.program, name)
                    .map(|loc| (name.clone(), loc))
            })
            .collect();
        ProgramLocations {
            attributes,
            uniforms,
        }
    }
}

/// Resolved locations of one program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramLocations {
    pub attributes: AttribLocations,
    pub uniforms: UniformLocations,
}

/// Result of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    /// The name was already taken; the existing handle is kept.
    AlreadyPresent,
    /// The handle was invalid and was not stored.
    Rejected,
}

/// Name → program map. Entries are never replaced or removed.
#[derive(Debug, Default)]
pub struct ProgramRegistry {
    programs: BTreeMap<String, Rc<ProgramHandle>>,
}

impl ProgramRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handle` under `name` unless the name is taken or the handle
    /// is invalid. First write wins.
    pub fn register(&mut self, name: &str, handle: ProgramHandle) -> Registration {
        if !handle.is_valid() {
            tracing::error!("cannot register invalid program: {name}");
            return Registration::Rejected;
        }
        if self.programs.contains_key(name) {
            tracing::debug!("program {name} already registered, keeping existing handle");
            return Registration::AlreadyPresent;
        }
        self.programs.insert(name.to_string(), Rc::new(handle));
        tracing::debug!("registered program {name}");
        Registration::Registered
    }

    /// Look up a program. Callers decide how severe a miss is.
    pub fn get(&self, name: &str) -> Option<Rc<ProgramHandle>> {
        self.programs.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.programs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.programs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
