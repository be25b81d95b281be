//! Panel describing the selected element.

use bevy::prelude::*;

use super::{button_background, text_style, ACCENT, BORDER, MUTED_TEXT, PANEL_BG, PRIMARY_TEXT};
use crate::catalog::{Catalog, RitEntry};
use crate::game_state::ViewerState;
use crate::selection::Selection;

pub struct InfoPanelPlugin;

impl Plugin for InfoPanelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_info_panel).add_systems(
            Update,
            (
                show_selected_entry,
                handle_close_button.run_if(in_state(ViewerState::Ready)),
                style_close_button,
            )
                .chain(),
        );
    }
}

#[derive(Component)]
struct InfoPanelRoot;

/// Which part of the entry a text node shows.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
enum InfoField {
    Number,
    Title,
    Segment,
    Description,
}

impl InfoField {
    fn text(self, entry: &RitEntry) -> String {
        match self {
            InfoField::Number => entry.id.to_string(),
            InfoField::Title => entry.name.to_string(),
            InfoField::Segment => entry.category.label().to_string(),
            InfoField::Description => entry.description.to_string(),
        }
    }
}

#[derive(Component)]
struct CloseButton;

fn setup_info_panel(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                right: Val::Px(10.0),
                width: Val::Px(340.0),
                padding: UiRect::all(Val::Px(14.0)),
                border: UiRect::all(Val::Px(1.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(8.0),
                display: Display::None,
                ..default()
            },
            BackgroundColor(PANEL_BG),
            BorderColor(BORDER),
            Interaction::default(),
            Name::new("Info Panel"),
            InfoPanelRoot,
        ))
        .with_children(|panel| {
            panel
                .spawn(Node {
                    column_gap: Val::Px(10.0),
                    align_items: AlignItems::Center,
                    ..default()
                })
                .with_children(|header| {
                    header
                        .spawn((
                            Node {
                                width: Val::Px(32.0),
                                height: Val::Px(32.0),
                                flex_shrink: 0.0,
                                justify_content: JustifyContent::Center,
                                align_items: AlignItems::Center,
                                ..default()
                            },
                            BackgroundColor(ACCENT),
                            BorderRadius::MAX,
                        ))
                        .with_children(|badge| {
                            badge.spawn((
                                Text::new(""),
                                text_style(16.0, Color::WHITE),
                                InfoField::Number,
                            ));
                        });

                    header.spawn((
                        Text::new(""),
                        text_style(18.0, PRIMARY_TEXT),
                        Node {
                            flex_grow: 1.0,
                            ..default()
                        },
                        InfoField::Title,
                    ));

                    header
                        .spawn((
                            Button,
                            Node {
                                width: Val::Px(26.0),
                                height: Val::Px(26.0),
                                flex_shrink: 0.0,
                                justify_content: JustifyContent::Center,
                                align_items: AlignItems::Center,
                                ..default()
                            },
                            BackgroundColor(button_background(Interaction::None, false)),
                            CloseButton,
                        ))
                        .with_children(|button| {
                            button.spawn((Text::new("X"), text_style(14.0, MUTED_TEXT)));
                        });
                });

            panel.spawn((Text::new(""), text_style(12.0, ACCENT), InfoField::Segment));
            panel.spawn((
                Text::new(""),
                text_style(14.0, MUTED_TEXT),
                InfoField::Description,
            ));
        });
}

/// Fill the panel on every selection change; hide it when cleared.
fn show_selected_entry(
    selection: Res<Selection>,
    catalog: Res<Catalog>,
    mut panels: Query<&mut Node, With<InfoPanelRoot>>,
    mut fields: Query<(&InfoField, &mut Text)>,
) {
    if !selection.is_changed() {
        return;
    }

    let entry = selection.active.and_then(|id| catalog.get(id));
    for mut node in &mut panels {
        node.display = if entry.is_some() {
            Display::Flex
        } else {
            Display::None
        };
    }

    let Some(entry) = entry else {
        return;
    };
    for (field, mut text) in &mut fields {
        **text = field.text(entry);
    }
}

fn handle_close_button(
    interactions: Query<&Interaction, (Changed<Interaction>, With<CloseButton>)>,
    mut panels: Query<&mut Node, With<InfoPanelRoot>>,
) {
    if !interactions.iter().any(|i| *i == Interaction::Pressed) {
        return;
    }
    // Only the panel closes; the selection stays.
    for mut node in &mut panels {
        node.display = Display::None;
    }
}

fn style_close_button(
    mut buttons: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<CloseButton>)>,
) {
    for (interaction, mut bg) in &mut buttons {
        bg.0 = button_background(*interaction, false);
    }
}
