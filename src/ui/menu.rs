//! Side menu listing every RIT element.

use bevy::{
    input::mouse::{MouseScrollUnit, MouseWheel},
    prelude::*,
};

use super::{button_background, contrast_text, text_style, UiConfig, BORDER, MUTED_TEXT, PANEL_BG, PRIMARY_TEXT};
use crate::catalog::{Catalog, RitEntry, RitId};
use crate::game_state::ViewerState;
use crate::selection::{ScenePick, SelectEntity, Selection};

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_menu).add_systems(
            Update,
            (
                handle_menu_clicks.run_if(in_state(ViewerState::Ready)),
                refresh_menu_styles,
                scroll_menu,
                reveal_picked_entry,
            ),
        );
    }
}

#[derive(Component)]
struct MenuRoot;

/// A clickable row for one catalog entry.
#[derive(Component)]
struct MenuEntry(RitId);

fn setup_menu(mut commands: Commands, catalog: Res<Catalog>, config: Res<UiConfig>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                bottom: Val::Px(10.0),
                width: Val::Px(config.menu_width),
                padding: UiRect::all(Val::Px(10.0)),
                border: UiRect::all(Val::Px(1.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(6.0),
                overflow: Overflow::scroll_y(),
                ..default()
            },
            BackgroundColor(PANEL_BG),
            BorderColor(BORDER),
            Interaction::default(),
            ScrollPosition::default(),
            Name::new("Element Menu"),
            MenuRoot,
        ))
        .with_children(|panel| {
            panel.spawn((
                Text::new("Elementos de la RIT"),
                text_style(18.0, PRIMARY_TEXT),
                Node {
                    margin: UiRect::bottom(Val::Px(4.0)),
                    ..default()
                },
            ));

            for entry in catalog.entries() {
                spawn_menu_entry(panel, entry);
            }
        });

    info!("Menu built with {} entries", catalog.len());
}

fn spawn_menu_entry(parent: &mut ChildBuilder, entry: &RitEntry) {
    parent
        .spawn((
            Button,
            Node {
                padding: UiRect::all(Val::Px(8.0)),
                border: UiRect::left(Val::Px(3.0)),
                column_gap: Val::Px(10.0),
                align_items: AlignItems::FlexStart,
                ..default()
            },
            BackgroundColor(button_background(Interaction::None, false)),
            BorderColor(Color::NONE),
            MenuEntry(entry.id),
        ))
        .with_children(|row| {
            // Number badge in the element's colour
            row.spawn((
                Node {
                    width: Val::Px(26.0),
                    height: Val::Px(26.0),
                    flex_shrink: 0.0,
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    ..default()
                },
                BackgroundColor(entry.color()),
                BorderRadius::MAX,
            ))
            .with_children(|badge| {
                badge.spawn((
                    Text::new(entry.id.to_string()),
                    text_style(13.0, contrast_text(entry.color())),
                ));
            });

            row.spawn(Node {
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(2.0),
                ..default()
            })
            .with_children(|body| {
                body.spawn((Text::new(entry.name), text_style(15.0, PRIMARY_TEXT)));
                body.spawn((Text::new(entry.snippet()), text_style(12.0, MUTED_TEXT)));
            });
        });
}

fn handle_menu_clicks(
    interactions: Query<(&Interaction, &MenuEntry), (Changed<Interaction>, With<Button>)>,
    mut requests: EventWriter<SelectEntity>,
) {
    for (interaction, MenuEntry(id)) in &interactions {
        if *interaction == Interaction::Pressed {
            requests.send(SelectEntity(Some(*id)));
        }
    }
}

/// Scroll the list with the wheel while the cursor is over it.
fn scroll_menu(
    mut scroll_events: EventReader<MouseWheel>,
    mut menus: Query<(&Interaction, &mut ScrollPosition), With<MenuRoot>>,
    entries: Query<&Interaction, With<MenuEntry>>,
) {
    let pixels: f32 = scroll_events
        .read()
        .map(|e| match e.unit {
            MouseScrollUnit::Line => e.y * 24.0,
            MouseScrollUnit::Pixel => e.y,
        })
        .sum();
    if pixels == 0.0 {
        return;
    }

    // Rows block focus, so the panel itself is not hovered over a row.
    let over_rows = entries.iter().any(|i| *i != Interaction::None);
    for (interaction, mut scroll) in &mut menus {
        if over_rows || *interaction != Interaction::None {
            scroll.offset_y = (scroll.offset_y - pixels).max(0.0);
        }
    }
}

/// Mark the active entry and show hover feedback on the others.
fn refresh_menu_styles(
    selection: Res<Selection>,
    catalog: Res<Catalog>,
    mut entries: Query<(&MenuEntry, &Interaction, &mut BackgroundColor, &mut BorderColor), With<Button>>,
) {
    for (MenuEntry(id), interaction, mut bg, mut border) in &mut entries {
        let active = selection.active == Some(*id);
        bg.set_if_neq(BackgroundColor(button_background(*interaction, active)));
        border.set_if_neq(BorderColor(match (active, catalog.get(*id)) {
            (true, Some(entry)) => entry.color(),
            _ => Color::NONE,
        }));
    }
}

/// Scroll offset that brings a row's centre to the middle of the panel.
///
/// Centres are screen-space y coordinates at the current offset.
pub fn centred_offset(current: f32, row_centre: f32, panel_centre: f32) -> f32 {
    (current + row_centre - panel_centre).max(0.0)
}

/// Bring the row of an element picked in the scene into view.
fn reveal_picked_entry(
    mut picks: EventReader<ScenePick>,
    mut menus: Query<(&GlobalTransform, &ComputedNode, &mut ScrollPosition), With<MenuRoot>>,
    entries: Query<(&MenuEntry, &GlobalTransform)>,
) {
    let Some(ScenePick(id)) = picks.read().last().copied() else {
        return;
    };
    let Some(row) = entries
        .iter()
        .find(|(MenuEntry(entry), _)| *entry == id)
        .map(|(_, transform)| transform.translation().y)
    else {
        return;
    };

    for (transform, computed, mut scroll) in &mut menus {
        // Layout works in physical pixels; scrolling in logical ones.
        let scale = computed.inverse_scale_factor();
        let offset = centred_offset(
            scroll.offset_y,
            row * scale,
            transform.translation().y * scale,
        );
        if offset != scroll.offset_y {
            scroll.offset_y = offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picked_row_is_centred() {
        // Row 300 px below the panel centre.
        assert_eq!(centred_offset(0.0, 700.0, 400.0), 300.0);
        // Row above the centre scrolls back, never past the top.
        assert_eq!(centred_offset(120.0, 300.0, 400.0), 20.0);
        assert_eq!(centred_offset(50.0, 100.0, 400.0), 0.0);
    }

    #[derive(Resource, Default)]
    struct Restyled(usize);

    fn count_restyled(
        rows: Query<(), Or<(Changed<BackgroundColor>, Changed<BorderColor>)>>,
        mut restyled: ResMut<Restyled>,
    ) {
        restyled.0 = rows.iter().count();
    }

    #[test]
    fn styles_only_touch_rows_that_change() {
        let mut app = App::new();
        app.insert_resource(Catalog::rit())
            .init_resource::<Selection>()
            .init_resource::<Restyled>()
            .add_systems(Update, (refresh_menu_styles, count_restyled).chain());
        let row = app
            .world_mut()
            .spawn((
                Button,
                Interaction::None,
                BackgroundColor(button_background(Interaction::None, false)),
                BorderColor(Color::NONE),
                MenuEntry(RitId(3)),
            ))
            .id();

        app.update();
        app.update();
        assert_eq!(app.world().resource::<Restyled>().0, 0);

        app.world_mut().resource_mut::<Selection>().active = Some(RitId(3));
        app.update();
        assert_eq!(app.world().resource::<Restyled>().0, 1);
        let border = app.world().get::<BorderColor>(row).map(|b| b.0);
        let colour = Catalog::rit().get(RitId(3)).map(RitEntry::color);
        assert_eq!(border, colour);
    }
}
