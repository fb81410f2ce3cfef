//! Built-in GLSL ES 1.0 programs for the room scene.

use glassroom_render::{MemoryShaderLoader, ProgramSource};

pub const MAIN_VS: &str = include_str!("../shaders/main.vs");
pub const MAIN_FS: &str = include_str!("../shaders/main.fs");
pub const EMISSIVE_VS: &str = include_str!("../shaders/emissive.vs");
pub const EMISSIVE_FS: &str = include_str!("../shaders/emissive.fs");
pub const GLASS_VS: &str = include_str!("../shaders/glass.vs");
pub const GLASS_FS: &str = include_str!("../shaders/glass.fs");

/// Textured PBR shading for the room shell.
pub const MAIN: &str = "Main";
/// Flat unlit color for light markers.
pub const EMISSIVE: &str = "Emissive";
/// Fresnel reflection and refraction for the glass sphere.
pub const GLASS: &str = "Glass";

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}

/// The programs the room scene expects, with paths relative to a shader root.
pub fn programs() -> Vec<ProgramSource> {
    vec![
        ProgramSource {
            name: MAIN.into(),
            vertex: "main.vs".into(),
            fragment: "main.fs".into(),
            attributes: names(&["a_Position", "a_Normal", "a_TexCoord", "a_TextureType"]),
            uniforms: names(&[
                "u_PvMatrix",
                "u_ModelMatrix",
                "u_Eye",
                "u_LightPositions",
                "u_LightColors",
                "u_WallTex",
                "u_FloorTex",
                "u_Metallic",
                "u_Roughness",
                "u_Color",
            ]),
        },
        ProgramSource {
            name: EMISSIVE.into(),
            vertex: "emissive.vs".into(),
            fragment: "emissive.fs".into(),
            attributes: names(&["a_Position"]),
            uniforms: names(&["u_PvMatrix", "u_ModelMatrix", "u_EmissiveColor", "u_Intensity"]),
        },
        ProgramSource {
            name: GLASS.into(),
            vertex: "glass.vs".into(),
            fragment: "glass.fs".into(),
            attributes: names(&["a_Position", "a_Normal"]),
            uniforms: names(&[
                "u_PvMatrix",
                "u_ModelMatrix",
                "u_NormalMatrix",
                "u_Eye",
                "u_LightPositions",
                "u_LightColors",
            ]),
        },
    ]
}

/// Loader serving the compiled-in sources under the paths used by [`programs`].
pub fn builtin_loader() -> MemoryShaderLoader {
    MemoryShaderLoader::new()
        .with("main.vs", MAIN_VS)
        .with("main.fs", MAIN_FS)
        .with("emissive.vs", EMISSIVE_VS)
        .with("emissive.fs", EMISSIVE_FS)
        .with("glass.vs", GLASS_VS)
        .with("glass.fs", GLASS_FS)
}
