use crate::emitter::EmitterConfig;

/// The four texture slots of a sequence-mesh material.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MaterialTextures {
    pub albedo: String,
    pub normal: String,
    pub material: String,
    pub effects: String,
}

/// Description of the renderable model behind a mesh instance: source mesh,
/// material textures and shader pair, all by path/name.
///
/// Resolution to live GPU resources is the renderer's job; unresolvable
/// paths are a loader-side error.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelSpec {
    pub mesh_path: String,
    pub textures: MaterialTextures,
    pub vertex_shader: String,
    pub pixel_shader: String,
}

/// Default-resource wiring for freshly authored entries. Implemented by the
/// rendering collaborator; [`StockResources`] provides the built-in set.
pub trait ResourceCatalog {
    fn default_model(&self) -> ModelSpec;
    fn default_emitter(&self) -> EmitterConfig;
}

/// Built-in defaults used when authoring code appends a mesh instance or
/// emitter slot without picking resources first.
#[derive(Clone, Copy, Debug, Default)]
pub struct StockResources;

impl ResourceCatalog for StockResources {
    fn default_model(&self) -> ModelSpec {
        ModelSpec {
            mesh_path: "data/internal/cylinder.fbx".to_string(),
            textures: MaterialTextures {
                albedo: "data/internal/default_albedo.dds".to_string(),
                normal: "data/internal/default_normal.dds".to_string(),
                material: "data/internal/default_material.dds".to_string(),
                effects: "data/internal/default_effects.dds".to_string(),
            },
            vertex_shader: "Model_VFX_VS".to_string(),
            pixel_shader: "Model_VFX_PS".to_string(),
        }
    }

    fn default_emitter(&self) -> EmitterConfig {
        EmitterConfig {
            capacity: 1024,
            texture: "data/internal/default_particle.png".to_string(),
            render_mode: 0,
        }
    }
}
