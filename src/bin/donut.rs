use raster_demos::demos::donut::DonutDemo;
use raster_demos::io::demo_settings::DemoDefaults;

fn main() {
    raster_demos::app::run("donut", DemoDefaults::default(), DonutDemo::new);
}
