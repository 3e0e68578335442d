use raster_demos::demos::multishadow::MultiShadowDemo;
use raster_demos::io::demo_settings::DemoDefaults;

fn main() {
    raster_demos::app::run("multishadow", DemoDefaults::default(), MultiShadowDemo::new);
}
