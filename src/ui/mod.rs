//! Screen-space UI: element menu, info panel, navigation controls and labels.

use bevy::{prelude::*, ui::FocusPolicy};

use crate::game_state::ViewerState;

pub mod controls;
pub mod info_panel;
pub mod labels;
pub mod menu;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiConfig>()
            .add_plugins(menu::MenuPlugin)
            .add_plugins(info_panel::InfoPanelPlugin)
            .add_plugins(controls::ControlsPlugin)
            .add_plugins(labels::LabelsPlugin)
            .add_systems(Startup, spawn_loading_overlay)
            .add_systems(OnExit(ViewerState::Loading), remove_loading_overlay);
    }
}

#[derive(Resource)]
pub struct UiConfig {
    /// Interval between repeats while a navigation button is held.
    pub repeat_interval: f32,
    /// World-space lift of floating labels above their element.
    pub label_offset: Vec3,
    /// Screen offset of the hover tooltip from the cursor.
    pub tooltip_offset: Vec2,
    pub menu_width: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            repeat_interval: 0.05,
            label_offset: Vec3::new(0.0, 2.0, 0.0),
            tooltip_offset: Vec2::new(15.0, 15.0),
            menu_width: 320.0,
        }
    }
}

// UI Colors
pub const PANEL_BG: Color = Color::srgba(1.0, 1.0, 1.0, 0.94);
pub const BORDER: Color = Color::srgb(0.87, 0.89, 0.91);
pub const ACCENT: Color = Color::srgb(1.0, 0.302, 0.0);
pub const PRIMARY_TEXT: Color = Color::srgb(0.13, 0.15, 0.17);
pub const MUTED_TEXT: Color = Color::srgb(0.42, 0.46, 0.49);
pub const BUTTON_IDLE: Color = Color::srgba(0.97, 0.98, 0.98, 0.98);
pub const BUTTON_HOVER: Color = Color::srgba(0.91, 0.93, 0.94, 0.98);
pub const BUTTON_SELECTED: Color = Color::srgba(1.0, 0.93, 0.89, 0.98);

/// Background for a button given its interaction and whether it is the
/// current choice.
pub fn button_background(interaction: Interaction, selected: bool) -> Color {
    match interaction {
        Interaction::Pressed => BUTTON_SELECTED,
        _ if selected => BUTTON_SELECTED,
        Interaction::Hovered => BUTTON_HOVER,
        Interaction::None => BUTTON_IDLE,
    }
}

/// Dark text on light backgrounds, white otherwise.
pub fn contrast_text(background: Color) -> Color {
    let c = background.to_srgba();
    let luma = 0.299 * c.red + 0.587 * c.green + 0.114 * c.blue;
    if luma > 0.6 {
        PRIMARY_TEXT
    } else {
        Color::WHITE
    }
}

pub fn text_style(size: f32, color: Color) -> (TextFont, TextColor) {
    (
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    )
}

#[derive(Component)]
struct LoadingOverlay;

fn spawn_loading_overlay(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(12.0),
                ..default()
            },
            BackgroundColor(Color::srgb(0.94, 0.95, 0.96)),
            FocusPolicy::Block,
            GlobalZIndex(100),
            LoadingOverlay,
        ))
        .with_children(|overlay| {
            overlay.spawn((Text::new("RIT 3D"), text_style(32.0, ACCENT)));
            overlay.spawn((
                Text::new("Cargando modelo del edificio..."),
                text_style(16.0, MUTED_TEXT),
            ));
        });
}

fn remove_loading_overlay(mut commands: Commands, overlays: Query<Entity, With<LoadingOverlay>>) {
    for entity in &overlays {
        commands.entity(entity).despawn_recursive();
    }
}
