//! Material representation: typed properties plus texture slots.
//!
//! A [`Material`] is an insertion-ordered map from [`MaterialKey`] to
//! [`MaterialValue`]. Lookups never fail: an absent key (or a value of a
//! different type) simply reads as `None`.

use ingot_math::{Vec2, Vec3, Vec4};
use thiserror::Error;

/// Semantic property keys understood by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialKey {
    Name,
    DiffuseColor,
    SpecularColor,
    AmbientColor,
    EmissiveColor,
    TransparentColor,
    ReflectiveColor,
    BaseColor,
    Opacity,
    Shininess,
    ShininessStrength,
    Metallic,
    Roughness,
    RefractiveIndex,
    ShadingModel,
    TwoSided,
    Wireframe,
}

/// Lighting model requested by the source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShadingModel {
    Flat,
    Gouraud,
    Phong,
    Blinn,
    Unlit,
    PbrMetallicRoughness,
}

impl ShadingModel {
    /// Map a Wavefront `illum` number onto a shading model.
    pub fn from_illumination_model(illum: u8) -> Self {
        match illum {
            0 => ShadingModel::Unlit,
            1 => ShadingModel::Gouraud,
            _ => ShadingModel::Phong,
        }
    }
}

/// A typed material property value.
#[derive(Clone, Debug, PartialEq)]
pub enum MaterialValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Color3(Vec3),
    Color4(Vec4),
    String(String),
    ShadingModel(ShadingModel),
}

impl From<f32> for MaterialValue {
    fn from(v: f32) -> Self {
        MaterialValue::Float(v)
    }
}

impl From<f64> for MaterialValue {
    fn from(v: f64) -> Self {
        MaterialValue::Float(v as f32)
    }
}

impl From<i32> for MaterialValue {
    fn from(v: i32) -> Self {
        MaterialValue::Int(v)
    }
}

impl From<bool> for MaterialValue {
    fn from(v: bool) -> Self {
        MaterialValue::Bool(v)
    }
}

impl From<Vec3> for MaterialValue {
    fn from(v: Vec3) -> Self {
        MaterialValue::Color3(v)
    }
}

impl From<Vec4> for MaterialValue {
    fn from(v: Vec4) -> Self {
        MaterialValue::Color4(v)
    }
}

impl From<String> for MaterialValue {
    fn from(v: String) -> Self {
        MaterialValue::String(v)
    }
}

impl From<&str> for MaterialValue {
    fn from(v: &str) -> Self {
        MaterialValue::String(v.to_string())
    }
}

impl From<ShadingModel> for MaterialValue {
    fn from(v: ShadingModel) -> Self {
        MaterialValue::ShadingModel(v)
    }
}

/// Types that can be read out of a [`MaterialValue`].
///
/// Conversions are lenient where it is lossless in practice (an `Int` reads
/// as `f32`, a `Color3` reads as an opaque `Vec4`).
pub trait PropertyValue: Sized {
    fn from_value(value: &MaterialValue) -> Option<Self>;
}

impl PropertyValue for f32 {
    fn from_value(value: &MaterialValue) -> Option<Self> {
        match value {
            MaterialValue::Float(v) => Some(*v),
            MaterialValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }
}

impl PropertyValue for i32 {
    fn from_value(value: &MaterialValue) -> Option<Self> {
        match value {
            MaterialValue::Int(v) => Some(*v),
            MaterialValue::Bool(v) => Some(*v as i32),
            _ => None,
        }
    }
}

impl PropertyValue for bool {
    fn from_value(value: &MaterialValue) -> Option<Self> {
        match value {
            MaterialValue::Bool(v) => Some(*v),
            MaterialValue::Int(v) => Some(*v != 0),
            _ => None,
        }
    }
}

impl PropertyValue for Vec3 {
    fn from_value(value: &MaterialValue) -> Option<Self> {
        match value {
            MaterialValue::Color3(v) => Some(*v),
            MaterialValue::Color4(v) => Some(v.truncate()),
            _ => None,
        }
    }
}

impl PropertyValue for Vec4 {
    fn from_value(value: &MaterialValue) -> Option<Self> {
        match value {
            MaterialValue::Color4(v) => Some(*v),
            MaterialValue::Color3(v) => Some(v.extend(1.0)),
            _ => None,
        }
    }
}

impl PropertyValue for String {
    fn from_value(value: &MaterialValue) -> Option<Self> {
        match value {
            MaterialValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl PropertyValue for ShadingModel {
    fn from_value(value: &MaterialValue) -> Option<Self> {
        match value {
            MaterialValue::ShadingModel(v) => Some(*v),
            _ => None,
        }
    }
}

/// Semantic role of a texture binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureType {
    Diffuse,
    Specular,
    Ambient,
    Emissive,
    Height,
    Normals,
    Shininess,
    Opacity,
    Displacement,
    Lightmap,
    Reflection,
    BaseColor,
    Metalness,
    DiffuseRoughness,
    AmbientOcclusion,
    Unknown,
}

/// How a texture is combined with the result of the previous slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextureOp {
    #[default]
    Multiply,
    Add,
    Subtract,
    Divide,
    SmoothAdd,
    SignedAdd,
}

/// Out-of-range UV handling for one texture axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextureMapMode {
    #[default]
    Wrap,
    Clamp,
    Mirror,
    Decal,
}

/// Affine UV transform attached to a texture slot.
///
/// Applied as: rotate by `rotation` radians about (0.5, 0.5), then scale
/// component-wise by `scaling`, then offset by `translation`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvTransform {
    pub translation: Vec2,
    pub scaling: Vec2,
    pub rotation: f32,
}

impl Default for UvTransform {
    fn default() -> Self {
        Self {
            translation: Vec2::ZERO,
            scaling: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl UvTransform {
    pub fn is_identity(&self) -> bool {
        self.translation == Vec2::ZERO && self.scaling == Vec2::ONE && self.rotation == 0.0
    }

    /// Transform a single UV coordinate.
    pub fn apply(&self, uv: Vec2) -> Vec2 {
        let center = Vec2::splat(0.5);
        let rotated = if self.rotation != 0.0 {
            let (sin, cos) = self.rotation.sin_cos();
            let p = uv - center;
            Vec2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos) + center
        } else {
            uv
        };
        rotated * self.scaling + self.translation
    }
}

/// Alpha handling requested for a texture.
///
/// Forcing and ignoring alpha are mutually exclusive, so they share one enum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlphaMode {
    #[default]
    Default,
    /// Use the alpha channel even if the format would not
    Force,
    /// Discard the alpha channel
    Ignore,
}

/// Error for raw texture flag bits that cannot be represented.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextureFlagsError {
    #[error("texture flags 0x{0:x} set both force-alpha and ignore-alpha")]
    ConflictingAlpha(u32),

    #[error("unknown texture flag bits 0x{0:x}")]
    UnknownBits(u32),
}

/// Per-slot texture flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureFlags {
    pub invert: bool,
    pub alpha: AlphaMode,
}

impl TextureFlags {
    pub const INVERT: u32 = 0x1;
    pub const FORCE_ALPHA: u32 = 0x2;
    pub const IGNORE_ALPHA: u32 = 0x4;

    /// Decode raw flag bits, rejecting force-alpha together with ignore-alpha.
    pub fn from_bits(bits: u32) -> Result<Self, TextureFlagsError> {
        let known = Self::INVERT | Self::FORCE_ALPHA | Self::IGNORE_ALPHA;
        if bits & !known != 0 {
            return Err(TextureFlagsError::UnknownBits(bits & !known));
        }

        let alpha = match (bits & Self::FORCE_ALPHA != 0, bits & Self::IGNORE_ALPHA != 0) {
            (true, true) => return Err(TextureFlagsError::ConflictingAlpha(bits)),
            (true, false) => AlphaMode::Force,
            (false, true) => AlphaMode::Ignore,
            (false, false) => AlphaMode::Default,
        };

        Ok(Self {
            invert: bits & Self::INVERT != 0,
            alpha,
        })
    }

    /// Encode back into raw flag bits.
    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.invert {
            bits |= Self::INVERT;
        }
        match self.alpha {
            AlphaMode::Force => bits |= Self::FORCE_ALPHA,
            AlphaMode::Ignore => bits |= Self::IGNORE_ALPHA,
            AlphaMode::Default => {}
        }
        bits
    }
}

/// One texture binding on a material, keyed by (type, index).
///
/// The key is fixed at construction so a slot can never be moved onto
/// another slot's key after insertion.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureSlot {
    texture_type: TextureType,
    index: u32,

    /// File path, or `*N` for the N-th embedded texture of the scene
    pub path: String,

    /// UV channel of the mesh this slot samples (`uvwsrc`)
    pub uv_channel: u32,

    /// Blend factor applied with `op`
    pub blend: f32,

    /// Combine operator with the previous slot
    pub op: TextureOp,

    /// Wrapping behavior for u, v and w
    pub map_mode: [TextureMapMode; 3],

    /// Optional UV transform
    pub uv_transform: Option<UvTransform>,

    pub flags: TextureFlags,
}

impl TextureSlot {
    pub fn new(texture_type: TextureType, index: u32, path: impl Into<String>) -> Self {
        Self {
            texture_type,
            index,
            path: path.into(),
            uv_channel: 0,
            blend: 1.0,
            op: TextureOp::default(),
            map_mode: [TextureMapMode::Wrap; 3],
            uv_transform: None,
            flags: TextureFlags::default(),
        }
    }

    pub fn with_uv_channel(mut self, uv_channel: u32) -> Self {
        self.uv_channel = uv_channel;
        self
    }

    pub fn with_blend(mut self, blend: f32, op: TextureOp) -> Self {
        self.blend = blend;
        self.op = op;
        self
    }

    pub fn with_map_mode(mut self, map_mode: [TextureMapMode; 3]) -> Self {
        self.map_mode = map_mode;
        self
    }

    pub fn with_uv_transform(mut self, transform: UvTransform) -> Self {
        self.uv_transform = Some(transform);
        self
    }

    pub fn with_flags(mut self, flags: TextureFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn texture_type(&self) -> TextureType {
        self.texture_type
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn key(&self) -> (TextureType, u32) {
        (self.texture_type, self.index)
    }

    /// Index of the embedded texture this slot refers to (`*N` paths).
    pub fn embedded_index(&self) -> Option<usize> {
        self.path.strip_prefix('*').and_then(|n| n.parse().ok())
    }
}

/// A material: ordered typed properties plus texture slots.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    properties: Vec<(MaterialKey, MaterialValue)>,
    textures: Vec<TextureSlot>,
}

impl Material {
    /// Create a material carrying only a name.
    pub fn new(name: impl Into<String>) -> Self {
        let mut material = Self::default();
        material.set(MaterialKey::Name, name.into());
        material
    }

    /// Set a property, replacing an existing value in place.
    pub fn set(&mut self, key: MaterialKey, value: impl Into<MaterialValue>) {
        let value = value.into();
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.properties.push((key, value)),
        }
    }

    /// Builder form of [`Material::set`].
    pub fn with(mut self, key: MaterialKey, value: impl Into<MaterialValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Typed lookup. Absent keys and type mismatches read as `None`.
    pub fn get<T: PropertyValue>(&self, key: MaterialKey) -> Option<T> {
        self.get_value(key).and_then(T::from_value)
    }

    /// Untyped lookup.
    pub fn get_value(&self, key: MaterialKey) -> Option<&MaterialValue> {
        self.properties
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, key: MaterialKey) -> bool {
        self.get_value(key).is_some()
    }

    pub fn remove(&mut self, key: MaterialKey) -> Option<MaterialValue> {
        let pos = self.properties.iter().position(|(k, _)| *k == key)?;
        Some(self.properties.remove(pos).1)
    }

    /// Properties in insertion order.
    pub fn properties(&self) -> impl Iterator<Item = (MaterialKey, &MaterialValue)> {
        self.properties.iter().map(|(k, v)| (*k, v))
    }

    /// Material name, empty when unset.
    pub fn name(&self) -> String {
        self.get(MaterialKey::Name).unwrap_or_default()
    }

    pub fn diffuse_color(&self) -> Option<Vec3> {
        self.get(MaterialKey::DiffuseColor)
    }

    pub fn emissive_color(&self) -> Option<Vec3> {
        self.get(MaterialKey::EmissiveColor)
    }

    pub fn opacity(&self) -> Option<f32> {
        self.get(MaterialKey::Opacity)
    }

    pub fn shading_model(&self) -> Option<ShadingModel> {
        self.get(MaterialKey::ShadingModel)
    }

    pub fn two_sided(&self) -> Option<bool> {
        self.get(MaterialKey::TwoSided)
    }

    /// Insert a texture slot.
    ///
    /// A slot with the same (type, index) is overwritten in place and
    /// returned; otherwise the slot is appended.
    pub fn set_texture(&mut self, slot: TextureSlot) -> Option<TextureSlot> {
        match self.textures.iter_mut().find(|s| s.key() == slot.key()) {
            Some(existing) => Some(std::mem::replace(existing, slot)),
            None => {
                self.textures.push(slot);
                None
            }
        }
    }

    /// Builder form of [`Material::set_texture`].
    pub fn with_texture(mut self, slot: TextureSlot) -> Self {
        self.set_texture(slot);
        self
    }

    pub fn texture(&self, texture_type: TextureType, index: u32) -> Option<&TextureSlot> {
        self.textures
            .iter()
            .find(|s| s.key() == (texture_type, index))
    }

    pub fn texture_mut(
        &mut self,
        texture_type: TextureType,
        index: u32,
    ) -> Option<&mut TextureSlot> {
        self.textures
            .iter_mut()
            .find(|s| s.key() == (texture_type, index))
    }

    pub fn remove_texture(&mut self, texture_type: TextureType, index: u32) -> Option<TextureSlot> {
        let pos = self
            .textures
            .iter()
            .position(|s| s.key() == (texture_type, index))?;
        Some(self.textures.remove(pos))
    }

    /// All slots in insertion order.
    pub fn textures(&self) -> &[TextureSlot] {
        &self.textures
    }

    /// Mutable access to all slots. Keys cannot be changed through it.
    pub fn textures_mut(&mut self) -> impl Iterator<Item = &mut TextureSlot> {
        self.textures.iter_mut()
    }

    pub fn texture_count(&self, texture_type: TextureType) -> usize {
        self.textures
            .iter()
            .filter(|s| s.texture_type == texture_type)
            .count()
    }

    pub fn has_textures(&self) -> bool {
        !self.textures.is_empty()
    }
}
