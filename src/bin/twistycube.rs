use raster_demos::demos::twistycube::TwistyCubeDemo;
use raster_demos::io::demo_settings::DemoDefaults;

fn main() {
    raster_demos::app::run("twistycube", DemoDefaults::default(), TwistyCubeDemo::new);
}
