//! Effect Host Interface
//!
//! The binder publishes into an [`EffectHost`]: a named property sheet owned
//! by the visual effect. A binder only writes properties the host declares.
//! [`PropertySheet`] is a plain in-memory host.

use std::fmt;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::bake::texels::TexelBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Int,
    Texture,
    Vector3,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PropertyKind::Int => "int",
            PropertyKind::Texture => "texture",
            PropertyKind::Vector3 => "vector3",
        })
    }
}

/// Receiver of baked data.
pub trait EffectHost {
    fn has_int(&self, name: &str) -> bool;
    fn has_texture(&self, name: &str) -> bool;
    fn has_vector3(&self, name: &str) -> bool;

    fn set_int(&mut self, name: &str, value: i32);
    fn set_texture(&mut self, name: &str, texture: &TexelBuffer);
    fn set_vector3(&mut self, name: &str, value: Vec3);

    fn has_property(&self, kind: PropertyKind, name: &str) -> bool {
        match kind {
            PropertyKind::Int => self.has_int(name),
            PropertyKind::Texture => self.has_texture(name),
            PropertyKind::Vector3 => self.has_vector3(name),
        }
    }
}

/// Value stored in a [`PropertySheet`] slot.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int(i32),
    Texture(TexelBuffer),
    Vector3(Vec3),
}

impl PropertyValue {
    fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Texture(_) => PropertyKind::Texture,
            PropertyValue::Vector3(_) => PropertyKind::Vector3,
        }
    }
}

#[derive(Debug, Clone)]
struct PropertySlot {
    kind: PropertyKind,
    value: Option<PropertyValue>,
    writes: u64,
}

/// In-memory [`EffectHost`] with explicitly declared properties.
///
/// Writes to undeclared names, or with a mismatched kind, are ignored.
#[derive(Debug, Clone, Default)]
pub struct PropertySheet {
    slots: FxHashMap<String, PropertySlot>,
}

impl PropertySheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, kind: PropertyKind, name: &str) -> &mut Self {
        self.slots.insert(
            name.to_string(),
            PropertySlot {
                kind,
                value: None,
                writes: 0,
            },
        );
        self
    }

    pub fn declare_int(&mut self, name: &str) -> &mut Self {
        self.declare(PropertyKind::Int, name)
    }

    pub fn declare_texture(&mut self, name: &str) -> &mut Self {
        self.declare(PropertyKind::Texture, name)
    }

    pub fn declare_vector3(&mut self, name: &str) -> &mut Self {
        self.declare(PropertyKind::Vector3, name)
    }

    pub fn undeclare(&mut self, name: &str) {
        self.slots.remove(name);
    }

    #[must_use]
    pub fn int(&self, name: &str) -> Option<i32> {
        match self.value(name)? {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn texture(&self, name: &str) -> Option<&TexelBuffer> {
        match self.value(name)? {
            PropertyValue::Texture(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn vector3(&self, name: &str) -> Option<Vec3> {
        match self.value(name)? {
            PropertyValue::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    /// How many times `name` has been written.
    #[must_use]
    pub fn write_count(&self, name: &str) -> u64 {
        self.slots.get(name).map_or(0, |slot| slot.writes)
    }

    fn value(&self, name: &str) -> Option<&PropertyValue> {
        self.slots.get(name)?.value.as_ref()
    }

    fn has(&self, kind: PropertyKind, name: &str) -> bool {
        self.slots.get(name).is_some_and(|slot| slot.kind == kind)
    }

    fn store(&mut self, name: &str, value: PropertyValue) {
        match self.slots.get_mut(name) {
            Some(slot) if slot.kind == value.kind() => {
                slot.value = Some(value);
                slot.writes += 1;
            }
            Some(slot) => {
                log::warn!(
                    "Property '{name}' is declared as {} but was written as {}",
                    slot.kind,
                    value.kind()
                );
            }
            None => log::debug!("Ignoring write to undeclared property '{name}'"),
        }
    }
}

impl EffectHost for PropertySheet {
    fn has_int(&self, name: &str) -> bool {
        self.has(PropertyKind::Int, name)
    }

    fn has_texture(&self, name: &str) -> bool {
        self.has(PropertyKind::Texture, name)
    }

    fn has_vector3(&self, name: &str) -> bool {
        self.has(PropertyKind::Vector3, name)
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.store(name, PropertyValue::Int(value));
    }

    fn set_texture(&mut self, name: &str, texture: &TexelBuffer) {
        self.store(name, PropertyValue::Texture(texture.clone()));
    }

    fn set_vector3(&mut self, name: &str, value: Vec3) {
        self.store(name, PropertyValue::Vector3(value));
    }
}
