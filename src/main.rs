mod error;
mod hdr_image;
mod lighting;
mod math;
mod rendering;
mod settings;
mod world;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use rendering::LandscapePlugin;
use settings::RenderSettings;

fn main() -> AppExit {
    let settings = match RenderSettings::from_args(std::env::args().skip(1)) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Usage: isovoxel [scale_x] [scale_y] [heightmap.png | bump]");
            return AppExit::error();
        }
    };

    // Headless: run the startup render once and exit
    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_once()))
        .add_plugins(LogPlugin::default())
        .add_plugins(LandscapePlugin { settings })
        .run()
}
