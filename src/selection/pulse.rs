//! Per-frame emissive animation: the selection pulse and the antenna beacon.

use bevy::prelude::*;

use super::highlight::EmissiveChannel;
use super::{Selection, SelectionConfig};
use crate::scene::infrastructure::Beacon;

/// Seconds of animation time since startup.
#[derive(Resource, Default, Debug)]
pub struct PulseClock {
    pub elapsed: f32,
}

/// `base + amplitude * sin(frequency * t)`
pub fn oscillate(base: f32, amplitude: f32, frequency: f32, t: f32) -> f32 {
    base + amplitude * (frequency * t).sin()
}

pub fn advance_clock(time: Res<Time>, mut clock: ResMut<PulseClock>) {
    clock.elapsed += time.delta_secs();
}

pub fn pulse_highlight(
    clock: Res<PulseClock>,
    selection: Res<Selection>,
    config: Res<SelectionConfig>,
    mut channels: Query<&mut EmissiveChannel>,
) {
    if selection.active.is_none() || selection.highlight.is_empty() {
        return;
    }

    let intensity = oscillate(
        config.pulse_base,
        config.pulse_amplitude,
        config.pulse_frequency,
        clock.elapsed,
    );
    selection.highlight.set_intensity(intensity, &mut channels);
}

pub fn pulse_beacons(
    clock: Res<PulseClock>,
    config: Res<SelectionConfig>,
    mut beacons: Query<(&Beacon, &mut EmissiveChannel)>,
) {
    for (beacon, mut channel) in &mut beacons {
        channel.intensity = oscillate(
            beacon.base_intensity,
            config.beacon_amplitude,
            config.beacon_frequency,
            clock.elapsed,
        );
    }
}

/// Push changed channels into the mesh materials.
pub fn sync_emissive_materials(
    config: Res<SelectionConfig>,
    channels: Query<(&EmissiveChannel, &MeshMaterial3d<StandardMaterial>), Changed<EmissiveChannel>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (channel, material) in &channels {
        if let Some(material) = materials.get_mut(&material.0) {
            material.emissive = channel.radiance(config.emissive_gain);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_stays_in_band() {
        let config = SelectionConfig::default();
        for step in 0..200 {
            let t = step as f32 * 0.016;
            let v = oscillate(config.pulse_base, config.pulse_amplitude, config.pulse_frequency, t);
            assert!((0.5..=1.5).contains(&v), "{v} at {t}");
        }
    }

    #[test]
    fn oscillation_starts_at_base() {
        assert_eq!(oscillate(0.8, 0.3, 4.0, 0.0), 0.8);
        let quarter = std::f32::consts::FRAC_PI_2 / 4.0;
        assert!((oscillate(0.8, 0.3, 4.0, quarter) - 1.1).abs() < 1e-5);
    }

    #[test]
    fn clock_and_beacon_systems_run() {
        let mut app = App::new();
        app.init_resource::<SelectionConfig>()
            .insert_resource(PulseClock { elapsed: 0.125 })
            .add_systems(Update, pulse_beacons);
        let beacon = app
            .world_mut()
            .spawn((
                Beacon { base_intensity: 0.8 },
                EmissiveChannel::new(Color::srgb(1.0, 0.0, 0.0), 0.8),
            ))
            .id();

        app.update();

        let channel = app.world().get::<EmissiveChannel>(beacon).copied();
        let expected = oscillate(0.8, 0.3, 4.0, 0.125);
        assert!(channel.is_some_and(|c| (c.intensity - expected).abs() < 1e-6));
    }
}
