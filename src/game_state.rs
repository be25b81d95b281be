//! Viewer lifecycle: a short loading phase, then interactive use.

use bevy::prelude::*;

pub struct ViewerStatePlugin;

impl Plugin for ViewerStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<ViewerState>()
            .init_resource::<LoadingTimer>()
            .add_systems(
                Update,
                finish_loading.run_if(in_state(ViewerState::Loading)),
            );
    }
}

/// High-level state controlling which input systems run.
#[derive(States, Default, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum ViewerState {
    /// Loading overlay covers the scene.
    #[default]
    Loading,
    /// Scene is built and accepts input.
    Ready,
}

/// How long the loading overlay stays up.
#[derive(Resource)]
pub struct LoadingTimer(pub Timer);

impl Default for LoadingTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(1.5, TimerMode::Once))
    }
}

fn finish_loading(
    time: Res<Time>,
    mut timer: ResMut<LoadingTimer>,
    mut next_state: ResMut<NextState<ViewerState>>,
) {
    if timer.0.tick(time.delta()).just_finished() {
        info!("Scene ready");
        next_state.set(ViewerState::Ready);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::state::app::StatesPlugin;

    use super::*;

    #[test]
    fn loading_ends_after_timer() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, ViewerStatePlugin));
        app.insert_resource(LoadingTimer(Timer::from_seconds(0.0, TimerMode::Once)));

        app.update();
        app.update();

        let state = app.world().resource::<State<ViewerState>>();
        assert_eq!(*state.get(), ViewerState::Ready);
    }

    #[test]
    fn default_timer_is_short() {
        let timer = LoadingTimer::default();
        assert_eq!(timer.0.duration(), Duration::from_millis(1500));
    }
}
