use serde::{Deserialize, Serialize};

/// Compiled and linked program. Id 0 is the null program and never valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramId(pub u32);

impl ProgramId {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

/// Texture object created by a graphics context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// Vertex or index buffer created by a graphics context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferId(pub u32);

/// Location of a uniform inside one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UniformLocation(pub u32);

/// Location of a vertex attribute inside one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttribLocation(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_program_is_zero() {
        assert!(ProgramId::NULL.is_null());
        assert!(!ProgramId(3).is_null());
    }
}
