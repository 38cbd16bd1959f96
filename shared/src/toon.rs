//! Dominant light direction for the toon material.
//!
//! Lights are kept in a registry the host updates as lights appear, move, toggle or
//! disappear, so a frame never has to enumerate the whole scene.

use std::collections::BTreeMap;

use nalgebra::{Point3, Vector3, Vector4};

use crate::{ConfigError, LightId, LightSource, utils::normalize_or_zero};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegisteredLight {
    pub source: LightSource,
    pub active: bool,
}

#[derive(Clone, Debug, Default)]
pub struct LightRegistry {
    lights: BTreeMap<LightId, RegisteredLight>,
}

impl LightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a light. New lights start active; replacing keeps the
    /// current active flag.
    pub fn upsert(&mut self, source: LightSource) -> Result<(), ConfigError> {
        source.validate()?;
        self.lights
            .entry(source.id)
            .and_modify(|entry| entry.source = source)
            .or_insert(RegisteredLight {
                source,
                active: true,
            });
        Ok(())
    }

    /// Returns `false` for an unknown light.
    pub fn set_active(&mut self, id: LightId, active: bool) -> bool {
        match self.lights.get_mut(&id) {
            Some(entry) => {
                entry.active = active;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: LightId) -> Option<LightSource> {
        self.lights.remove(&id).map(|entry| entry.source)
    }

    pub fn get(&self, id: LightId) -> Option<&RegisteredLight> {
        self.lights.get(&id)
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn active(&self) -> impl Iterator<Item = &LightSource> {
        self.lights
            .values()
            .filter(|entry| entry.active)
            .map(|entry| &entry.source)
    }
}

/// Intensity-weighted sum of the unit directions from each light to `object`,
/// normalized. Zero when there are no lights or the contributions cancel out.
///
/// A light sitting exactly on the object contributes nothing.
pub fn dominant_light_direction<'a>(
    object: &Point3<f32>,
    lights: impl IntoIterator<Item = &'a LightSource>,
) -> Vector3<f32> {
    let sum = lights
        .into_iter()
        .fold(Vector3::zeros(), |acc, light| {
            acc + normalize_or_zero(object - light.position) * light.intensity
        });
    normalize_or_zero(sum)
}

/// Shader parameters of one toon-shaded object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToonShading {
    /// `(dir.x, dir.y, dir.z, 0)`; the zero `w` marks it as a direction.
    pub world_space_light_pos: Vector4<f32>,
}

impl Default for ToonShading {
    fn default() -> Self {
        Self {
            world_space_light_pos: Vector4::zeros(),
        }
    }
}

impl ToonShading {
    pub fn refresh(&mut self, registry: &LightRegistry, object: &Point3<f32>) {
        let dir = dominant_light_direction(object, registry.active());
        self.world_space_light_pos = dir.push(0.0);
    }

    pub fn light_direction(&self) -> Vector3<f32> {
        self.world_space_light_pos.xyz()
    }
}
