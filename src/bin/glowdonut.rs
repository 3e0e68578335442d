use raster_demos::demos::glowdonut::GlowDonutDemo;
use raster_demos::io::demo_settings::DemoDefaults;

fn main() {
    raster_demos::app::run("glowdonut", DemoDefaults::default(), GlowDonutDemo::new);
}
