//! Emissive overrides used to mark the selected element.
//!
//! Only meshes carrying an [`EmissiveChannel`] take part in highlighting.
//! Every override is recorded in [`HighlightState`] so it can be reverted
//! exactly when the selection changes.

use std::collections::HashMap;

use bevy::prelude::*;
use smallvec::SmallVec;

/// Emissive colour and intensity of a mesh's material.
///
/// The renderer multiplies both into `StandardMaterial::emissive`.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct EmissiveChannel {
    pub color: LinearRgba,
    pub intensity: f32,
}

impl EmissiveChannel {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color: color.to_linear(),
            intensity,
        }
    }

    /// A channel that emits nothing until highlighted.
    pub fn dark() -> Self {
        Self {
            color: LinearRgba::BLACK,
            intensity: 1.0,
        }
    }

    pub fn radiance(&self, gain: f32) -> LinearRgba {
        let scale = self.intensity * gain;
        LinearRgba::rgb(
            self.color.red * scale,
            self.color.green * scale,
            self.color.blue * scale,
        )
    }
}

/// Read/write access to the emissive channels of mesh entities.
pub trait EmissiveChannels {
    fn channel(&self, mesh: Entity) -> Option<EmissiveChannel>;
    fn set_channel(&mut self, mesh: Entity, channel: EmissiveChannel);
}

impl EmissiveChannels for Query<'_, '_, &mut EmissiveChannel> {
    fn channel(&self, mesh: Entity) -> Option<EmissiveChannel> {
        self.get(mesh).ok().copied()
    }

    fn set_channel(&mut self, mesh: Entity, channel: EmissiveChannel) {
        if let Ok(mut current) = self.get_mut(mesh) {
            *current = channel;
        }
    }
}

impl EmissiveChannels for HashMap<Entity, EmissiveChannel> {
    fn channel(&self, mesh: Entity) -> Option<EmissiveChannel> {
        self.get(&mesh).copied()
    }

    fn set_channel(&mut self, mesh: Entity, channel: EmissiveChannel) {
        if let Some(current) = self.get_mut(&mesh) {
            *current = channel;
        }
    }
}

/// A material override that can be reverted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SavedEmissive {
    pub mesh: Entity,
    pub original: EmissiveChannel,
}

/// Meshes currently overridden by the selection highlight.
#[derive(Default, Debug)]
pub struct HighlightState {
    saved: SmallVec<[SavedEmissive; 8]>,
}

impl HighlightState {
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn meshes(&self) -> impl Iterator<Item = Entity> + '_ {
        self.saved.iter().map(|saved| saved.mesh)
    }

    /// Write back every saved channel and forget them.
    pub fn restore(&mut self, channels: &mut impl EmissiveChannels) {
        for saved in self.saved.drain(..) {
            if channels.channel(saved.mesh).is_some() {
                channels.set_channel(saved.mesh, saved.original);
            }
        }
    }

    /// Override the colour of every mesh that exposes a channel.
    ///
    /// Returns the number of meshes highlighted. Callers restore first;
    /// highlighting an already saved mesh would record the override as its
    /// original value.
    pub fn highlight(
        &mut self,
        meshes: &[Entity],
        tone: LinearRgba,
        channels: &mut impl EmissiveChannels,
    ) -> usize {
        debug_assert!(self.saved.is_empty(), "highlight applied without restore");

        let mut count = 0;
        for &mesh in meshes {
            let Some(original) = channels.channel(mesh) else {
                continue;
            };
            self.saved.push(SavedEmissive { mesh, original });
            channels.set_channel(
                mesh,
                EmissiveChannel {
                    color: tone,
                    ..original
                },
            );
            count += 1;
        }
        count
    }

    /// Set the intensity of every highlighted mesh.
    pub fn set_intensity(&self, intensity: f32, channels: &mut impl EmissiveChannels) {
        for saved in &self.saved {
            if let Some(mut channel) = channels.channel(saved.mesh) {
                channel.intensity = intensity;
                channels.set_channel(saved.mesh, channel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(n: u32) -> (Vec<Entity>, HashMap<Entity, EmissiveChannel>) {
        let meshes: Vec<Entity> = (1..=n).map(Entity::from_raw).collect();
        let map = meshes
            .iter()
            .enumerate()
            .map(|(i, &mesh)| {
                let channel = EmissiveChannel {
                    color: LinearRgba::rgb(0.1 * i as f32, 0.0, 0.0),
                    intensity: 0.1,
                };
                (mesh, channel)
            })
            .collect();
        (meshes, map)
    }

    #[test]
    fn restore_reverts_every_override() {
        let (meshes, mut map) = channels(3);
        let baseline = map.clone();
        let mut state = HighlightState::default();

        assert_eq!(state.highlight(&meshes, LinearRgba::WHITE, &mut map), 3);
        state.set_intensity(1.5, &mut map);
        assert!(map.values().all(|c| c.color == LinearRgba::WHITE));

        state.restore(&mut map);
        assert!(state.is_empty());
        assert_eq!(map, baseline);
    }

    #[test]
    fn meshes_without_channel_are_skipped() {
        let (mut meshes, mut map) = channels(2);
        meshes.push(Entity::from_raw(99));
        let mut state = HighlightState::default();

        assert_eq!(state.highlight(&meshes, LinearRgba::WHITE, &mut map), 2);
        assert_eq!(state.len(), 2);
        assert!(state.meshes().all(|mesh| mesh != Entity::from_raw(99)));
    }

    #[test]
    fn radiance_scales_by_intensity_and_gain() {
        let channel = EmissiveChannel {
            color: LinearRgba::rgb(1.0, 0.5, 0.0),
            intensity: 0.5,
        };
        let radiance = channel.radiance(2.0);
        assert_eq!(radiance.red, 1.0);
        assert_eq!(radiance.green, 0.5);
        assert_eq!(radiance.blue, 0.0);
    }
}
