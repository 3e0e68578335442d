use raster_demos::demos::xdonut::XDonutDemo;
use raster_demos::io::demo_settings::DemoDefaults;

fn main() {
    raster_demos::app::run("xdonut", DemoDefaults::default(), XDonutDemo::new);
}
