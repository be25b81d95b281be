//! Navigation pad, camera presets, reset and label toggle.

use std::time::Duration;

use bevy::prelude::*;

use super::labels::LabelSettings;
use super::{button_background, text_style, UiConfig, BORDER, MUTED_TEXT, PANEL_BG, PRIMARY_TEXT};
use crate::camera::{
    ActiveTween, AnimateCamera, CameraConfig, CameraPreset, CameraSet, NavAction, OrbitCamera,
    HOME_VIEW,
};
use crate::game_state::ViewerState;
use crate::selection::SelectEntity;

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavRepeat>()
            .add_event::<ResetView>()
            .add_systems(Startup, setup_controls)
            .add_systems(
                Update,
                (
                    (
                        handle_nav_buttons,
                        handle_preset_buttons,
                        handle_reset_button,
                        handle_label_toggle,
                        handle_keyboard_shortcuts,
                        reset_view,
                    )
                        .chain()
                        .run_if(in_state(ViewerState::Ready))
                        .before(CameraSet),
                    update_control_styles,
                    update_label_toggle_text,
                ),
            );
    }
}

/// Clear the selection and return to the overview.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct ResetView;

#[derive(Component)]
struct ControlsRoot;

/// Any button of this panel, for hover styling.
#[derive(Component)]
struct ControlButton;

#[derive(Component)]
struct NavButton(NavAction);

#[derive(Component)]
struct PresetButton(CameraPreset);

#[derive(Component)]
struct ResetButton;

#[derive(Component)]
struct LabelToggleButton;

#[derive(Component)]
struct LabelToggleText;

/// Hold-to-repeat state of the navigation pad.
#[derive(Resource)]
pub struct NavRepeat {
    held: Option<NavAction>,
    timer: Timer,
}

impl Default for NavRepeat {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}

impl NavRepeat {
    pub fn new(interval: Duration) -> Self {
        Self {
            held: None,
            timer: Timer::new(interval, TimerMode::Repeating),
        }
    }

    /// Number of times the held action fires this frame.
    ///
    /// A fresh press fires once immediately, then again every interval
    /// while the same button stays down.
    pub fn update(&mut self, pressed: Option<NavAction>, delta: Duration) -> u32 {
        if pressed != self.held {
            self.held = pressed;
            self.timer.reset();
            return u32::from(pressed.is_some());
        }
        if self.held.is_none() {
            return 0;
        }
        self.timer.tick(delta).times_finished_this_tick()
    }
}

pub fn toggle_label_text(visible: bool) -> &'static str {
    if visible {
        "Ocultar etiquetas"
    } else {
        "Mostrar etiquetas"
    }
}

fn setup_controls(mut commands: Commands, config: Res<UiConfig>, labels: Res<LabelSettings>) {
    commands.insert_resource(NavRepeat::new(Duration::from_secs_f32(config.repeat_interval)));

    let nav_rows: [&[(&str, NavAction)]; 3] = [
        &[
            ("Rotar <", NavAction::RotateLeft),
            ("Rotar ^", NavAction::RotateUp),
            ("Rotar v", NavAction::RotateDown),
            ("Rotar >", NavAction::RotateRight),
        ],
        &[("Zoom +", NavAction::ZoomIn), ("Zoom -", NavAction::ZoomOut)],
        &[
            ("Mover <", NavAction::PanLeft),
            ("Mover ^", NavAction::PanUp),
            ("Mover v", NavAction::PanDown),
            ("Mover >", NavAction::PanRight),
        ],
    ];

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(10.0),
                right: Val::Px(10.0),
                padding: UiRect::all(Val::Px(10.0)),
                border: UiRect::all(Val::Px(1.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(6.0),
                ..default()
            },
            BackgroundColor(PANEL_BG),
            BorderColor(BORDER),
            Interaction::default(),
            Name::new("Camera Controls"),
            ControlsRoot,
        ))
        .with_children(|panel| {
            panel.spawn((Text::new("Navegación"), text_style(14.0, PRIMARY_TEXT)));
            for row in nav_rows {
                spawn_row(panel, |buttons| {
                    for &(label, action) in row {
                        spawn_button(buttons, label, NavButton(action));
                    }
                });
            }

            panel.spawn((Text::new("Vistas"), text_style(14.0, PRIMARY_TEXT)));
            spawn_row(panel, |buttons| {
                for preset in CameraPreset::ALL {
                    spawn_button(buttons, preset.label(), PresetButton(preset));
                }
            });

            spawn_row(panel, |buttons| {
                spawn_button(buttons, "Restablecer vista", ResetButton);
                buttons
                    .spawn((
                        Button,
                        button_node(),
                        BackgroundColor(button_background(Interaction::None, false)),
                        BorderColor(BORDER),
                        ControlButton,
                        LabelToggleButton,
                    ))
                    .with_children(|button| {
                        button.spawn((
                            Text::new(toggle_label_text(labels.visible)),
                            text_style(12.0, MUTED_TEXT),
                            LabelToggleText,
                        ));
                    });
            });

            panel.spawn((
                Text::new("Esc: restablecer | L: etiquetas"),
                text_style(11.0, MUTED_TEXT),
            ));
        });

    info!(
        "Controls ready, navigation repeats every {:.0} ms",
        config.repeat_interval * 1000.0
    );
}

fn spawn_row(parent: &mut ChildBuilder, buttons: impl FnOnce(&mut ChildBuilder)) {
    parent
        .spawn(Node {
            column_gap: Val::Px(4.0),
            ..default()
        })
        .with_children(buttons);
}

fn button_node() -> Node {
    Node {
        padding: UiRect::axes(Val::Px(8.0), Val::Px(5.0)),
        border: UiRect::all(Val::Px(1.0)),
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        ..default()
    }
}

fn spawn_button(parent: &mut ChildBuilder, label: &str, marker: impl Component) {
    parent
        .spawn((
            Button,
            button_node(),
            BackgroundColor(button_background(Interaction::None, false)),
            BorderColor(BORDER),
            ControlButton,
            marker,
        ))
        .with_children(|button| {
            button.spawn((Text::new(label), text_style(12.0, PRIMARY_TEXT)));
        });
}

fn handle_nav_buttons(
    time: Res<Time>,
    buttons: Query<(&Interaction, &NavButton)>,
    mut repeat: ResMut<NavRepeat>,
    mut cameras: Query<&mut OrbitCamera>,
    mut tween: ResMut<ActiveTween>,
    config: Res<CameraConfig>,
) {
    let pressed = buttons
        .iter()
        .find(|(interaction, _)| **interaction == Interaction::Pressed)
        .map(|(_, NavButton(action))| *action);

    let steps = repeat.update(pressed, time.delta());
    let Some(action) = pressed else {
        return;
    };
    if steps == 0 {
        return;
    }

    // Manual navigation takes over from any focus move.
    if tween.0.take().is_some() {
        debug!("Camera move cancelled by navigation");
    }
    for mut orbit in &mut cameras {
        for _ in 0..steps {
            action.apply(&mut orbit, &config);
        }
    }
}

fn handle_preset_buttons(
    interactions: Query<(&Interaction, &PresetButton), (Changed<Interaction>, With<Button>)>,
    mut camera: EventWriter<AnimateCamera>,
) {
    for (interaction, PresetButton(preset)) in &interactions {
        if *interaction == Interaction::Pressed {
            info!("Camera preset: {}", preset.label());
            camera.send(AnimateCamera(preset.viewpoint()));
        }
    }
}

fn handle_reset_button(
    interactions: Query<&Interaction, (Changed<Interaction>, With<ResetButton>)>,
    mut resets: EventWriter<ResetView>,
) {
    if interactions.iter().any(|i| *i == Interaction::Pressed) {
        resets.send(ResetView);
    }
}

fn handle_label_toggle(
    interactions: Query<&Interaction, (Changed<Interaction>, With<LabelToggleButton>)>,
    mut labels: ResMut<LabelSettings>,
) {
    if interactions.iter().any(|i| *i == Interaction::Pressed) {
        labels.toggle();
    }
}

fn handle_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut resets: EventWriter<ResetView>,
    mut labels: ResMut<LabelSettings>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        resets.send(ResetView);
    }
    if keyboard.just_pressed(KeyCode::KeyL) {
        labels.toggle();
    }
}

fn reset_view(
    mut resets: EventReader<ResetView>,
    mut selection: EventWriter<SelectEntity>,
    mut camera: EventWriter<AnimateCamera>,
) {
    if resets.read().count() == 0 {
        return;
    }
    info!("View reset");
    selection.send(SelectEntity(None));
    camera.send(AnimateCamera(HOME_VIEW));
}

fn update_control_styles(
    mut buttons: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<ControlButton>),
    >,
) {
    for (interaction, mut bg) in &mut buttons {
        bg.0 = button_background(*interaction, false);
    }
}

fn update_label_toggle_text(
    labels: Res<LabelSettings>,
    mut texts: Query<&mut Text, With<LabelToggleText>>,
) {
    if !labels.is_changed() {
        return;
    }
    for mut text in &mut texts {
        **text = toggle_label_text(labels.visible).to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(16);

    #[test]
    fn press_fires_once_then_repeats() {
        let mut repeat = NavRepeat::default();
        assert_eq!(repeat.update(Some(NavAction::ZoomIn), STEP), 1);

        // 16 ms frames: the 50 ms interval elapses on the fourth held frame.
        let fired: u32 = (0..4).map(|_| repeat.update(Some(NavAction::ZoomIn), STEP)).sum();
        assert_eq!(fired, 1);
    }

    #[test]
    fn release_stops_and_new_press_restarts() {
        let mut repeat = NavRepeat::default();
        repeat.update(Some(NavAction::PanLeft), STEP);
        assert_eq!(repeat.update(None, Duration::from_secs(1)), 0);
        assert_eq!(repeat.update(None, Duration::from_secs(1)), 0);
        assert_eq!(repeat.update(Some(NavAction::RotateUp), STEP), 1);
    }

    #[test]
    fn switching_buttons_fires_new_action_immediately() {
        let mut repeat = NavRepeat::default();
        repeat.update(Some(NavAction::RotateLeft), STEP);
        assert_eq!(repeat.update(Some(NavAction::RotateRight), STEP), 1);
    }

    #[test]
    fn panel_counts_as_ui_for_the_pointer() {
        let mut app = App::new();
        app.init_resource::<UiConfig>()
            .init_resource::<LabelSettings>()
            .add_systems(Startup, setup_controls);
        app.update();

        let mut roots = app
            .world_mut()
            .query_filtered::<&Interaction, With<ControlsRoot>>();
        assert_eq!(roots.iter(app.world()).count(), 1);
    }

    #[test]
    fn toggle_text_names_the_next_action() {
        assert_eq!(toggle_label_text(false), "Mostrar etiquetas");
        assert_eq!(toggle_label_text(true), "Ocultar etiquetas");
    }

    #[test]
    fn reset_clears_selection_and_returns_home() {
        use crate::flow::ActiveFlow;
        use crate::selection::highlight::EmissiveChannel;
        use crate::selection::{test_app, Selection};

        let (mut app, leaves) = test_app::viewer_app();
        app.add_event::<ResetView>()
            .add_systems(Update, reset_view.before(CameraSet));
        let baseline: Vec<Option<EmissiveChannel>> = leaves
            .iter()
            .map(|leaf| app.world().get::<EmissiveChannel>(*leaf).copied())
            .collect();

        app.world_mut().send_event(SelectEntity(Some(crate::catalog::RitId(6))));
        test_app::run_frames(&mut app, 70);
        app.world_mut().send_event(ResetView);
        test_app::run_frames(&mut app, 70);

        let selection = app.world().resource::<Selection>();
        assert_eq!(selection.active, None);
        assert!(selection.highlight.is_empty());
        assert_eq!(app.world().resource::<ActiveFlow>().0, None);

        let restored: Vec<Option<EmissiveChannel>> = leaves
            .iter()
            .map(|leaf| app.world().get::<EmissiveChannel>(*leaf).copied())
            .collect();
        assert_eq!(restored, baseline);

        let view = test_app::camera_view(&mut app);
        assert!(view.position.distance(HOME_VIEW.position) < 1e-3);
        assert!(view.target.distance(HOME_VIEW.target) < 1e-3);
    }
}
