use raster_demos::demos::fliptiling::FlipTilingDemo;
use raster_demos::io::demo_settings::DemoDefaults;

fn main() {
    raster_demos::app::run("fliptiling", DemoDefaults::default(), FlipTilingDemo::new);
}
