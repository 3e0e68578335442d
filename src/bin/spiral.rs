use raster_demos::demos::spiral::SpiralDemo;
use raster_demos::io::demo_settings::DemoDefaults;

fn main() {
    raster_demos::app::run("spiral", DemoDefaults::default().with_size(512, 512), SpiralDemo::new);
}
