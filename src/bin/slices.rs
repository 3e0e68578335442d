use raster_demos::demos::slices::SlicesDemo;
use raster_demos::io::demo_settings::DemoDefaults;

fn main() {
    raster_demos::app::run("slices", DemoDefaults::default(), SlicesDemo::new);
}
