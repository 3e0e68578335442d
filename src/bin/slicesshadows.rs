use raster_demos::demos::slicesshadows::SlicesShadowsDemo;
use raster_demos::io::demo_settings::DemoDefaults;

fn main() {
    raster_demos::app::run("slicesshadows", DemoDefaults::default(), SlicesShadowsDemo::new);
}
