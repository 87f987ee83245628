// Example runner for the `dough_vision` library. Builds a synthetic frame
// with one dough-colored disc, runs it through the pipeline, and prints the
// verdict. Real deployments feed frames from a capture device instead.

use dough_vision::DoughVisionPipeline;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut frame = RgbImage::from_pixel(320, 240, Rgb([60, 60, 60]));
    draw_filled_circle_mut(&mut frame, (160, 120), 40, Rgb([200, 200, 40]));

    let mut pipeline = DoughVisionPipeline::new();
    pipeline.initialize(std::env::args().nth(1).map(std::path::PathBuf::from).as_deref());

    let result = pipeline.process_frame(&frame);
    println!(
        "pieces: {}  valid: {}  confidence: {:.2}  message: {}",
        result.dough_count, result.is_valid, result.confidence, result.message
    );
}
