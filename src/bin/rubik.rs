use raster_demos::demos::rubik::RubikDemo;
use raster_demos::io::demo_settings::DemoDefaults;

fn main() {
    raster_demos::app::run("rubik", DemoDefaults::default(), RubikDemo::new);
}
