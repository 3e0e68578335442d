use raster_demos::demos::strips::StripsDemo;
use raster_demos::io::demo_settings::DemoDefaults;

fn main() {
    let defaults = DemoDefaults::default().with_size(512, 512).with_cycle_duration(4.0);
    raster_demos::app::run("strips", defaults, StripsDemo::new);
}
