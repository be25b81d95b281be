//! Selection and focus: highlight, camera move and flow for one RIT element.
//!
//! Every selection change goes through [`Selection::select`], which always
//! reverts the previous highlight before applying a new one.

use bevy::picking::events::{Click, Pointer};
use bevy::picking::pointer::PointerButton;
use bevy::prelude::*;

use crate::camera::{AnimateCamera, CameraSet, Viewpoint};
use crate::catalog::{Catalog, RitEntry, RitId};
use crate::flow::{ActiveFlow, FlowRoute};
use crate::scene::RenderableRegistry;

pub mod highlight;
pub mod pulse;

use highlight::{EmissiveChannel, EmissiveChannels, HighlightState};

pub struct SelectionPlugin;

impl Plugin for SelectionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SelectionConfig>()
            .init_resource::<Selection>()
            .init_resource::<pulse::PulseClock>()
            .add_event::<SelectEntity>()
            .add_event::<ScenePick>()
            .add_systems(
                Update,
                (
                    select_on_click,
                    apply_select_requests,
                    pulse::advance_clock,
                    pulse::pulse_highlight,
                    pulse::pulse_beacons,
                    pulse::sync_emissive_materials,
                )
                    .chain()
                    .before(CameraSet),
            );
    }
}

/// Request to focus an element, or to clear the selection with `None`.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectEntity(pub Option<RitId>);

/// An element picked in the 3D view rather than from the menu.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScenePick(pub RitId);

#[derive(Resource)]
pub struct SelectionConfig {
    /// Emissive colour of the selected element.
    pub highlight_tone: LinearRgba,
    pub pulse_base: f32,
    pub pulse_amplitude: f32,
    /// Radians per second of the highlight pulse.
    pub pulse_frequency: f32,
    pub beacon_amplitude: f32,
    pub beacon_frequency: f32,
    /// Multiplier from channel intensity to material emissive.
    pub emissive_gain: f32,
    /// Camera offset for the rooftop antenna.
    pub antenna_offset: Vec3,
    /// Camera offset for per-floor details.
    pub close_up_offset: Vec3,
    /// Camera offset for everything else.
    pub overview_offset: Vec3,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            highlight_tone: LinearRgba::WHITE,
            pulse_base: 1.0,
            pulse_amplitude: 0.5,
            pulse_frequency: 8.0,
            beacon_amplitude: 0.3,
            beacon_frequency: 4.0,
            emissive_gain: 1.0,
            antenna_offset: Vec3::new(10.0, 2.0, 10.0),
            close_up_offset: Vec3::new(6.0, 0.0, 6.0),
            overview_offset: Vec3::new(12.0, 0.0, 12.0),
        }
    }
}

impl SelectionConfig {
    /// Camera offset from the element's position.
    pub fn focus_offset(&self, id: RitId) -> Vec3 {
        match id.0 {
            8 => self.antenna_offset,
            7..=u8::MAX => self.close_up_offset,
            _ => self.overview_offset,
        }
    }

    pub fn focus_view(&self, entry: &RitEntry) -> Viewpoint {
        Viewpoint::new(entry.position + self.focus_offset(entry.id), entry.position)
    }
}

/// Where the viewer should go after a successful selection.
#[derive(Clone, Debug)]
pub struct Focus {
    pub entry: &'static RitEntry,
    pub view: Viewpoint,
    pub route: FlowRoute,
    /// Number of meshes now carrying the highlight.
    pub highlighted: usize,
}

#[derive(Clone, Debug)]
pub enum SelectOutcome {
    Focused(Focus),
    Cleared,
    /// The id is not in the catalog; nothing changed.
    Unknown(RitId),
}

/// Current selection and the material overrides it owns.
#[derive(Resource, Default, Debug)]
pub struct Selection {
    pub active: Option<RitId>,
    pub highlight: HighlightState,
}

impl Selection {
    pub fn select(
        &mut self,
        request: Option<RitId>,
        catalog: &Catalog,
        registry: &RenderableRegistry,
        channels: &mut impl EmissiveChannels,
        config: &SelectionConfig,
    ) -> SelectOutcome {
        let entry = match request {
            Some(id) => match catalog.get(id) {
                Some(entry) => Some(entry),
                None => return SelectOutcome::Unknown(id),
            },
            None => None,
        };

        self.highlight.restore(channels);

        let Some(entry) = entry else {
            self.active = None;
            return SelectOutcome::Cleared;
        };

        self.active = Some(entry.id);
        let highlighted = self.highlight.highlight(
            registry.leaves(entry.id),
            config.highlight_tone,
            channels,
        );

        SelectOutcome::Focused(Focus {
            entry,
            view: config.focus_view(entry),
            route: FlowRoute::for_entry(entry.id),
            highlighted,
        })
    }
}

/// Resolve clicks on scene meshes to catalog ids.
fn select_on_click(
    mut clicks: EventReader<Pointer<Click>>,
    registry: Res<RenderableRegistry>,
    mut requests: EventWriter<SelectEntity>,
    mut picks: EventWriter<ScenePick>,
) {
    for click in clicks.read() {
        if click.event.button != PointerButton::Primary {
            continue;
        }
        if let Some(id) = registry.resolve(click.target) {
            requests.send(SelectEntity(Some(id)));
            picks.send(ScenePick(id));
        }
    }
}

fn apply_select_requests(
    mut requests: EventReader<SelectEntity>,
    mut selection: ResMut<Selection>,
    mut channels: Query<&mut EmissiveChannel>,
    mut camera: EventWriter<AnimateCamera>,
    mut flow: ResMut<ActiveFlow>,
    catalog: Res<Catalog>,
    registry: Res<RenderableRegistry>,
    config: Res<SelectionConfig>,
) {
    for &SelectEntity(request) in requests.read() {
        match selection.select(request, &catalog, &registry, &mut channels, &config) {
            SelectOutcome::Focused(focus) => {
                info!(
                    "Selected RIT {} ({}), {} meshes highlighted",
                    focus.entry.id, focus.entry.name, focus.highlighted
                );
                camera.send(AnimateCamera(focus.view));
                flow.0 = Some(focus.route);
            }
            SelectOutcome::Cleared => {
                info!("Selection cleared");
                flow.0 = None;
            }
            SelectOutcome::Unknown(id) => {
                warn!("Ignoring selection of unknown RIT element {}", id);
            }
        }
    }
}

/// A headless app with the selection and camera plugins and a registered
/// trunk shaft (id 6) made of two emissive meshes.
#[cfg(test)]
pub(crate) mod test_app {
    use bevy::input::InputPlugin;
    use smallvec::SmallVec;

    use super::*;
    use crate::camera::{CameraPlugin, OrbitCamera};
    use crate::scene::Renderable;

    pub fn viewer_app() -> (App, Vec<Entity>) {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, InputPlugin, SelectionPlugin, CameraPlugin))
            .add_event::<Pointer<Click>>()
            .insert_resource(Catalog::rit())
            .init_resource::<ActiveFlow>()
            .init_resource::<Assets<StandardMaterial>>();

        let leaves: SmallVec<[Entity; 4]> = (0..2)
            .map(|_| {
                app.world_mut()
                    .spawn(EmissiveChannel::new(Color::srgb(0.2, 0.2, 0.2), 0.1))
                    .id()
            })
            .collect();
        let root = app.world_mut().spawn_empty().id();
        let mut registry = RenderableRegistry::default();
        registry.insert(
            RitId(6),
            Renderable {
                root,
                leaves: leaves.clone(),
            },
        );
        app.insert_resource(registry);

        // Startup spawns the camera.
        app.update();
        (app, leaves.to_vec())
    }

    pub fn camera_view(app: &mut App) -> Viewpoint {
        let mut cameras = app.world_mut().query::<&OrbitCamera>();
        cameras.single(app.world()).viewpoint()
    }

    pub fn run_frames(app: &mut App, frames: usize) {
        for _ in 0..frames {
            app.update();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use smallvec::SmallVec;

    use super::*;
    use crate::camera::ActiveTween;
    use crate::scene::Renderable;

    /// Registry and channels shaped like the real scene: grouped elements
    /// have several leaves, and the BUDI nameplate has no emissive channel.
    struct Fixture {
        catalog: Catalog,
        registry: RenderableRegistry,
        channels: HashMap<Entity, EmissiveChannel>,
        config: SelectionConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let catalog = Catalog::rit();
            let mut registry = RenderableRegistry::default();
            let mut channels = HashMap::new();
            let mut next = 1;
            for entry in catalog.entries() {
                let leaf_count = match entry.id.0 {
                    5 | 7 | 12 => 2,
                    8 => 4,
                    _ => 1,
                };
                let root = Entity::from_raw(next);
                next += 1;
                let mut leaves = SmallVec::new();
                for i in 0..leaf_count {
                    let leaf = Entity::from_raw(next);
                    next += 1;
                    leaves.push(leaf);
                    // The BUDI nameplate is flat-shaded.
                    if !(entry.id == RitId(7) && i == 1) {
                        channels.insert(
                            leaf,
                            EmissiveChannel {
                                color: LinearRgba::rgb(0.01 * next as f32, 0.0, 0.0),
                                intensity: 0.1,
                            },
                        );
                    }
                }
                registry.insert(entry.id, Renderable { root, leaves });
            }
            Self {
                catalog,
                registry,
                channels,
                config: SelectionConfig::default(),
            }
        }

        fn select(&mut self, selection: &mut Selection, request: Option<RitId>) -> SelectOutcome {
            selection.select(
                request,
                &self.catalog,
                &self.registry,
                &mut self.channels,
                &self.config,
            )
        }

        fn emissive_leaves(&self, id: RitId) -> Vec<Entity> {
            self.registry
                .leaves(id)
                .iter()
                .copied()
                .filter(|leaf| self.channels.contains_key(leaf))
                .collect()
        }
    }

    #[test]
    fn switching_selection_restores_previous_materials() {
        let mut fx = Fixture::new();
        let baseline = fx.channels.clone();
        let ids: Vec<RitId> = fx.catalog.entries().iter().map(|e| e.id).collect();

        for &first in &ids {
            for &second in &ids {
                if first == second {
                    continue;
                }
                let mut selection = Selection::default();
                fx.select(&mut selection, Some(first));
                fx.select(&mut selection, Some(second));

                let highlighted: Vec<Entity> = selection.highlight.meshes().collect();
                assert_eq!(highlighted, fx.emissive_leaves(second));

                for leaf in fx.registry.leaves(first) {
                    assert_eq!(fx.channels.get(leaf), baseline.get(leaf));
                }

                fx.select(&mut selection, None);
                assert_eq!(fx.channels, baseline);
            }
        }
    }

    #[test]
    fn clearing_returns_everything_to_baseline() {
        let mut fx = Fixture::new();
        let baseline = fx.channels.clone();
        let mut selection = Selection::default();

        fx.select(&mut selection, Some(RitId(8)));
        selection.highlight.set_intensity(1.4, &mut fx.channels);
        let outcome = fx.select(&mut selection, None);

        assert!(matches!(outcome, SelectOutcome::Cleared));
        assert!(selection.highlight.is_empty());
        assert_eq!(selection.active, None);
        assert_eq!(fx.channels, baseline);
    }

    #[test]
    fn reselecting_does_not_duplicate_saved_state() {
        let mut fx = Fixture::new();
        let baseline = fx.channels.clone();
        let mut selection = Selection::default();

        for _ in 0..3 {
            fx.select(&mut selection, Some(RitId(8)));
            assert_eq!(selection.highlight.len(), 4);
        }
        fx.select(&mut selection, None);
        assert_eq!(fx.channels, baseline);
    }

    #[test]
    fn meshes_without_emissive_are_skipped() {
        let mut fx = Fixture::new();
        let mut selection = Selection::default();

        let SelectOutcome::Focused(focus) = fx.select(&mut selection, Some(RitId(7))) else {
            panic!("BUDI should be selectable");
        };
        assert_eq!(fx.registry.leaves(RitId(7)).len(), 2);
        assert_eq!(focus.highlighted, 1);
        assert_eq!(selection.highlight.len(), 1);
    }

    #[test]
    fn trunk_shaft_focus() {
        let mut fx = Fixture::new();
        let mut selection = Selection::default();

        let SelectOutcome::Focused(focus) = fx.select(&mut selection, Some(RitId(6))) else {
            panic!("trunk shaft should be selectable");
        };

        assert_eq!(focus.entry.name, "Canalización troncal");
        assert!(focus.entry.description.starts_with("Shaft vertical"));
        assert_eq!(selection.active, Some(RitId(6)));

        let shaft = fx.registry.leaves(RitId(6)).to_vec();
        assert_eq!(selection.highlight.meshes().collect::<Vec<_>>(), shaft);
        for (entity, channel) in &fx.channels {
            let lit = channel.color == LinearRgba::WHITE;
            assert_eq!(lit, shaft.contains(entity));
        }

        assert_eq!(focus.view.target, Vec3::new(0.0, 8.0, 0.0));
        assert_eq!(focus.view.position, Vec3::new(12.0, 8.0, 12.0));
        assert_eq!(focus.route, FlowRoute::Vertical);
    }

    #[test]
    fn focus_offsets_depend_on_the_element() {
        let config = SelectionConfig::default();
        assert_eq!(config.focus_offset(RitId(8)), Vec3::new(10.0, 2.0, 10.0));
        assert_eq!(config.focus_offset(RitId(10)), Vec3::new(6.0, 0.0, 6.0));
        assert_eq!(config.focus_offset(RitId(7)), Vec3::new(6.0, 0.0, 6.0));
        assert_eq!(config.focus_offset(RitId(1)), Vec3::new(12.0, 0.0, 12.0));
    }

    #[test]
    fn unknown_id_keeps_current_selection() {
        let mut fx = Fixture::new();
        let mut selection = Selection::default();
        fx.select(&mut selection, Some(RitId(2)));
        let lit = fx.channels.clone();

        let outcome = fx.select(&mut selection, Some(RitId(99)));

        assert!(matches!(outcome, SelectOutcome::Unknown(RitId(99))));
        assert_eq!(selection.active, Some(RitId(2)));
        assert_eq!(selection.highlight.len(), 1);
        assert_eq!(fx.channels, lit);
    }

    #[test]
    fn selecting_starts_flow_and_lands_camera() {
        let (mut app, leaves) = test_app::viewer_app();
        app.world_mut().send_event(SelectEntity(Some(RitId(6))));
        test_app::run_frames(&mut app, 70);

        assert_eq!(app.world().resource::<ActiveFlow>().0, Some(FlowRoute::Vertical));
        let selection = app.world().resource::<Selection>();
        assert_eq!(selection.active, Some(RitId(6)));
        assert_eq!(selection.highlight.meshes().collect::<Vec<_>>(), leaves);

        let view = test_app::camera_view(&mut app);
        assert!(view.target.distance(Vec3::new(0.0, 8.0, 0.0)) < 1e-3);
        assert!(view.position.distance(Vec3::new(12.0, 8.0, 12.0)) < 1e-3);
        assert!(app.world().resource::<ActiveTween>().0.is_none());
    }

    #[test]
    fn unknown_request_leaves_viewer_untouched() {
        let (mut app, _) = test_app::viewer_app();
        app.world_mut().send_event(SelectEntity(Some(RitId(6))));
        test_app::run_frames(&mut app, 70);
        let before = test_app::camera_view(&mut app);

        app.world_mut().send_event(SelectEntity(Some(RitId(99))));
        test_app::run_frames(&mut app, 3);

        assert_eq!(app.world().resource::<ActiveFlow>().0, Some(FlowRoute::Vertical));
        let selection = app.world().resource::<Selection>();
        assert_eq!(selection.active, Some(RitId(6)));
        assert_eq!(selection.highlight.len(), 2);
        assert!(app.world().resource::<ActiveTween>().0.is_none());
        assert!(test_app::camera_view(&mut app).position.distance(before.position) < 1e-4);
    }
}
