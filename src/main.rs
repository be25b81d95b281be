//! RIT 3D - interactive diagram of a building's telecom infrastructure
//!
//! A Bevy viewer for the internal telecommunications network of a
//! condominium: street chambers, ducts, technical rooms, floor cabinets and
//! the rooftop antenna, each selectable from the menu or the 3D scene.

use bevy::picking::mesh_picking::{MeshPickingPlugin, MeshPickingSettings};
use bevy::prelude::*;

mod camera;
mod catalog;
mod flow;
mod game_state;
mod scene;
mod selection;
mod ui;

fn main() {
    // Force Vulkan backend on Windows (DX12 causes crashes on some systems)
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "RIT 3D - Red Interna de Telecomunicaciones".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        // Only meshes that stand for catalog entries are pickable
        .add_plugins(MeshPickingPlugin)
        .insert_resource(MeshPickingSettings {
            require_markers: true,
            ..default()
        })
        .add_plugins(game_state::ViewerStatePlugin)
        // Content and scene
        .add_plugins(catalog::CatalogPlugin)
        .add_plugins(scene::ScenePlugin)
        .add_plugins(flow::FlowPlugin)
        // Interaction
        .add_plugins(selection::SelectionPlugin)
        .add_plugins(camera::CameraPlugin)
        .add_plugins(ui::UiPlugin)
        .run();
}
