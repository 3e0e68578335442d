use raster_demos::demos::collapse::CollapseDemo;
use raster_demos::io::demo_settings::DemoDefaults;

fn main() {
    raster_demos::app::run("collapse", DemoDefaults::default(), CollapseDemo::new);
}
