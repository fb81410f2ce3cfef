use glam::{Mat4, Vec3};
use glassroom_common::ProgramId;
use glassroom_render::{
    Command, DrawStatus, FrameUniforms, GeometryDescriptor, GraphicsContext, Material,
    MaterialDescriptor, MemoryShaderLoader, ObjectDescriptor, ProgramHandle, ProgramRegistry,
    ProgramSource, RecordingContext, Registration, Scene, SceneInspector, TextureImage,
    TexturePatch, TextureSlot, UniformValue,
};

const EMISSIVE_UNIFORMS: [&str; 4] = ["u_PvMatrix", "u_ModelMatrix", "u_EmissiveColor", "u_Intensity"];

const EMISSIVE_VS: &str = "attribute vec3 a_Position;
uniform mat4 u_PvMatrix;
uniform mat4 u_ModelMatrix;
void main() { gl_Position = u_PvMatrix * u_ModelMatrix * vec4(a_Position, 1.0); }";

const EMISSIVE_FS: &str = "uniform vec3 u_EmissiveColor;
uniform float u_Intensity;
void main() { gl_FragColor = vec4(u_EmissiveColor * u_Intensity, 1.0); }";

const MAIN_VS: &str = "attribute vec3 a_Position;
uniform mat4 u_PvMatrix;
void main() {}";

const MAIN_FS: &str = "uniform sampler2D diffuse;
uniform vec3 u_Eye;
void main() {}";

#[test]
fn emissive_update_uploads_one_scalar_and_no_textures() {
    let mut ctx = RecordingContext::new();
    let program = ctx.compile_program(EMISSIVE_VS, EMISSIVE_FS).unwrap();
    let handle = ProgramHandle::new(program, ["a_Position"], EMISSIVE_UNIFORMS);

    let mut registry = ProgramRegistry::new();
    assert_eq!(registry.register("Emissive", handle), Registration::Registered);

    let locations = registry.get("Emissive").unwrap().resolve_locations(&mut ctx);
    assert_eq!(locations.uniforms.len(), 4);

    let mut material = Material::new(
        MaterialDescriptor::new("Emissive").uniform("u_Intensity", 2.0_f32),
        &registry,
    )
    .unwrap();
    material.init(&mut ctx);
    ctx.take_commands();

    material.update(&mut ctx, &locations.uniforms);
    let scalar_uploads: Vec<_> = ctx
        .commands()
        .iter()
        .filter(|c| matches!(c, Command::Uniform1f(..)))
        .collect();
    assert_eq!(
        scalar_uploads,
        vec![&Command::Uniform1f(locations.uniforms["u_Intensity"], 2.0)]
    );
    assert_eq!(ctx.count(Command::is_texture_op), 0);
    assert_eq!(ctx.count(Command::is_uniform_upload), 1);
}

#[test]
fn registration_keeps_first_and_rejects_invalid() {
    let mut registry = ProgramRegistry::new();
    registry.register("A", ProgramHandle::new(ProgramId(1), ["a_Position"], ["u_X"]));
    assert_eq!(
        registry.register("A", ProgramHandle::new(ProgramId(2), ["a_Position"], ["u_X"])),
        Registration::AlreadyPresent
    );
    assert_eq!(registry.get("A").unwrap().program, ProgramId(1));

    let invalid = ProgramHandle::new(ProgramId::NULL, ["a_Position"], ["u_X"]);
    assert_eq!(registry.register("B", invalid), Registration::Rejected);
    assert!(registry.get("B").is_none());
}

#[test]
fn startup_then_frames_with_textures() {
    let loader = MemoryShaderLoader::new()
        .with("main.vs", MAIN_VS)
        .with("main.fs", MAIN_FS)
        .with("emissive.vs", EMISSIVE_VS)
        .with("emissive.fs", EMISSIVE_FS);
    let sources = [
        ProgramSource {
            name: "Main".into(),
            vertex: "main.vs".into(),
            fragment: "main.fs".into(),
            attributes: vec!["a_Position".into()],
            uniforms: vec!["u_PvMatrix".into(), "u_Eye".into(), "diffuse".into()],
        },
        ProgramSource {
            name: "Emissive".into(),
            vertex: "emissive.vs".into(),
            fragment: "emissive.fs".into(),
            attributes: vec!["a_Position".into()],
            uniforms: EMISSIVE_UNIFORMS.iter().map(|s| s.to_string()).collect(),
        },
    ];

    let mut ctx = RecordingContext::new();
    let mut scene = Scene::new();
    assert_eq!(scene.draw(&mut ctx, &FrameUniforms::new()), DrawStatus::NotReady);

    pollster::block_on(scene.initialize(&mut ctx, &loader, &sources)).unwrap();
    assert_eq!(ctx.program_count(), 2);

    let triangle = || {
        GeometryDescriptor::default()
            .attribute("a_Position", vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], 3)
            .index(vec![0, 1, 2])
    };
    let checker = TextureImage::new(2, 2, vec![255; 12]);
    let wall = scene
        .add_descriptor(ObjectDescriptor::new(
            triangle(),
            MaterialDescriptor::new("Main")
                .uniform("u_PvMatrix", Mat4::IDENTITY)
                .uniform("u_Eye", Vec3::ZERO)
                .texture("diffuse", TextureSlot::new(checker.clone())),
        ))
        .unwrap();
    scene
        .add_descriptor(ObjectDescriptor::new(
            triangle(),
            MaterialDescriptor::new("Emissive")
                .uniform("u_PvMatrix", Mat4::IDENTITY)
                .uniform("u_ModelMatrix", Mat4::IDENTITY)
                .uniform("u_EmissiveColor", Vec3::ONE)
                .uniform("u_Intensity", 2.0_f32),
        ))
        .unwrap();

    let frame = FrameUniforms::from([("u_Eye".to_string(), UniformValue::Vec3(Vec3::Z))]);
    assert_eq!(scene.draw(&mut ctx, &frame), DrawStatus::Drawn(2));
    assert_eq!(ctx.uploads(), 1);

    scene
        .object_mut(wall)
        .unwrap()
        .material_mut()
        .set_texture("diffuse", TexturePatch::image(checker));
    assert_eq!(scene.draw(&mut ctx, &frame), DrawStatus::Drawn(2));
    assert_eq!(scene.draw(&mut ctx, &frame), DrawStatus::Drawn(2));
    assert_eq!(ctx.uploads(), 2);
    assert_eq!(ctx.draw_calls(), 6);

    let summary = SceneInspector::summary(&scene);
    assert!(summary.ready);
    assert_eq!(summary.programs, vec!["Emissive", "Main"]);
    assert_eq!(summary.frames_drawn, 3);
}
