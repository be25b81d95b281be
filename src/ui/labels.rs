//! Floating element labels and the hover tooltip.
//!
//! Labels are UI text nodes re-projected from world space every frame, so
//! they follow camera moves and window resizes without extra bookkeeping.

use bevy::picking::events::{Out, Over, Pointer};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, SystemCursorIcon, WindowResized};
use bevy::winit::cursor::CursorIcon;

use super::{text_style, UiConfig, PRIMARY_TEXT};
use crate::camera::{CameraSet, OrbitCamera};
use crate::catalog::{Catalog, RitEntry, RitId};
use crate::scene::RenderableRegistry;

pub struct LabelsPlugin;

impl Plugin for LabelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LabelSettings>()
            .init_resource::<Hovered>()
            .add_systems(Startup, (spawn_labels, spawn_tooltip))
            .add_systems(
                Update,
                (
                    position_labels,
                    track_hover,
                    position_tooltip,
                    log_window_resize,
                )
                    .chain()
                    .after(CameraSet),
            );
    }
}

/// Whether floating labels are shown; hidden at startup.
#[derive(Resource, Default, Debug)]
pub struct LabelSettings {
    pub visible: bool,
}

impl LabelSettings {
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        info!("Labels {}", if self.visible { "shown" } else { "hidden" });
    }
}

/// Element under the cursor, if any.
#[derive(Resource, Default, Debug)]
pub struct Hovered(pub Option<RitId>);

#[derive(Component)]
struct FloatingLabel(RitId);

#[derive(Component)]
struct Tooltip;

const LABEL_BG: Color = Color::srgba(1.0, 1.0, 1.0, 0.9);
const TOOLTIP_BG: Color = Color::srgba(0.13, 0.15, 0.17, 0.92);

fn spawn_labels(mut commands: Commands, catalog: Res<Catalog>) {
    for entry in catalog.entries() {
        commands.spawn((
            Text::new(label_text(entry)),
            text_style(12.0, PRIMARY_TEXT),
            Node {
                position_type: PositionType::Absolute,
                padding: UiRect::axes(Val::Px(6.0), Val::Px(3.0)),
                border: UiRect::left(Val::Px(3.0)),
                ..default()
            },
            BackgroundColor(LABEL_BG),
            BorderColor(entry.color()),
            Visibility::Hidden,
            PickingBehavior::IGNORE,
            FloatingLabel(entry.id),
        ));
    }
}

fn spawn_tooltip(mut commands: Commands) {
    commands.spawn((
        Text::new(""),
        text_style(13.0, Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            padding: UiRect::axes(Val::Px(8.0), Val::Px(4.0)),
            ..default()
        },
        BackgroundColor(TOOLTIP_BG),
        GlobalZIndex(10),
        Visibility::Hidden,
        PickingBehavior::IGNORE,
        Tooltip,
    ));
}

/// Number and name, as shown on a floating label.
pub fn label_text(entry: &RitEntry) -> String {
    format!("{} {}", entry.id, entry.name)
}

/// Cursor shape over the scene.
pub fn hover_cursor(over_element: bool) -> SystemCursorIcon {
    if over_element {
        SystemCursorIcon::Pointer
    } else {
        SystemCursorIcon::Default
    }
}

/// Top-left corner that centres a node of `size` above `anchor`.
pub fn label_corner(anchor: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(anchor.x - size.x / 2.0, anchor.y - size.y)
}

fn position_labels(
    settings: Res<LabelSettings>,
    config: Res<UiConfig>,
    catalog: Res<Catalog>,
    cameras: Query<(&Camera, &GlobalTransform), With<OrbitCamera>>,
    mut labels: Query<(&FloatingLabel, &mut Node, &mut Visibility, &ComputedNode)>,
) {
    let Ok((camera, camera_transform)) = cameras.get_single() else {
        return;
    };

    for (FloatingLabel(id), mut node, mut visibility, computed) in &mut labels {
        let projected = catalog
            .get(*id)
            .filter(|_| settings.visible)
            .and_then(|entry| {
                camera
                    .world_to_viewport(camera_transform, entry.position + config.label_offset)
                    .ok()
            });

        let Some(anchor) = projected else {
            visibility.set_if_neq(Visibility::Hidden);
            continue;
        };

        let corner = label_corner(anchor, computed.size() * computed.inverse_scale_factor());
        node.left = Val::Px(corner.x);
        node.top = Val::Px(corner.y);
        visibility.set_if_neq(Visibility::Inherited);
    }
}

fn track_hover(
    mut overs: EventReader<Pointer<Over>>,
    mut outs: EventReader<Pointer<Out>>,
    registry: Res<RenderableRegistry>,
    mut hovered: ResMut<Hovered>,
) {
    for out in outs.read() {
        if hovered.0.is_some() && registry.resolve(out.target) == hovered.0 {
            hovered.0 = None;
        }
    }
    for over in overs.read() {
        if let Some(id) = registry.resolve(over.target) {
            hovered.0 = Some(id);
        }
    }
}

fn position_tooltip(
    mut commands: Commands,
    hovered: Res<Hovered>,
    catalog: Res<Catalog>,
    config: Res<UiConfig>,
    windows: Query<(Entity, &Window, Option<&CursorIcon>), With<PrimaryWindow>>,
    mut tooltips: Query<(&mut Text, &mut Node, &mut Visibility), With<Tooltip>>,
) {
    let Ok((window_entity, window, cursor_icon)) = windows.get_single() else {
        return;
    };
    let target = hovered
        .0
        .and_then(|id| catalog.get(id))
        .zip(window.cursor_position());

    let icon = CursorIcon::from(hover_cursor(target.is_some()));
    if cursor_icon != Some(&icon) {
        commands.entity(window_entity).insert(icon);
    }

    for (mut text, mut node, mut visibility) in &mut tooltips {
        let Some((entry, cursor)) = target else {
            visibility.set_if_neq(Visibility::Hidden);
            continue;
        };
        if text.0 != entry.name {
            **text = entry.name.to_string();
        }
        node.left = Val::Px(cursor.x + config.tooltip_offset.x);
        node.top = Val::Px(cursor.y + config.tooltip_offset.y);
        visibility.set_if_neq(Visibility::Inherited);
    }
}

fn log_window_resize(mut resized: EventReader<WindowResized>) {
    if let Some(event) = resized.read().last() {
        debug!("Viewport resized to {}x{}", event.width, event.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_start_hidden_and_toggle() {
        let mut settings = LabelSettings::default();
        assert!(!settings.visible);
        settings.toggle();
        assert!(settings.visible);
        settings.toggle();
        assert!(!settings.visible);
    }

    #[test]
    fn label_sits_centred_above_its_anchor() {
        let corner = label_corner(Vec2::new(400.0, 300.0), Vec2::new(80.0, 20.0));
        assert_eq!(corner, Vec2::new(360.0, 280.0));
    }

    #[test]
    fn labels_carry_number_and_name() {
        let catalog = Catalog::rit();
        let Some(entry) = catalog.get(RitId(6)) else {
            panic!("trunk shaft missing from catalog");
        };
        assert_eq!(label_text(entry), "6 Canalización troncal");
    }

    #[test]
    fn pointer_cursor_over_elements() {
        assert_eq!(hover_cursor(true), SystemCursorIcon::Pointer);
        assert_eq!(hover_cursor(false), SystemCursorIcon::Default);

        let mut app = App::new();
        app.insert_resource(Catalog::rit())
            .init_resource::<UiConfig>()
            .init_resource::<Hovered>()
            .add_systems(Update, position_tooltip);
        let mut window = Window::default();
        window.set_cursor_position(Some(Vec2::new(200.0, 150.0)));
        let entity = app.world_mut().spawn((window, PrimaryWindow)).id();

        app.update();
        let icon = app.world().get::<CursorIcon>(entity).cloned();
        assert_eq!(icon, Some(CursorIcon::from(SystemCursorIcon::Default)));

        app.world_mut().resource_mut::<Hovered>().0 = Some(RitId(6));
        app.update();
        let icon = app.world().get::<CursorIcon>(entity).cloned();
        assert_eq!(icon, Some(CursorIcon::from(SystemCursorIcon::Pointer)));
    }
}
