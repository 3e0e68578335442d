use raster_demos::demos::tiling::TilingDemo;
use raster_demos::io::demo_settings::DemoDefaults;

fn main() {
    raster_demos::app::run("tiling", DemoDefaults::default().with_size(1024, 1024), TilingDemo::new);
}
