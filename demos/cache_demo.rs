use std::time::{Duration, Instant};

use fude::{Color, FontCacheConfig, FontRequest, FontSystem, backend::Bitmap};
use image::RgbaImage;

const LINES: &[&str] = &[
    "HP 120/120",
    "MP 45/60",
    "Inventory",
    "Quest: deliver the letter",
    "The quick brown fox jumps over the lazy dog.",
];

#[allow(clippy::unwrap_used)]
fn main() {
    let font_system = FontSystem::new();
    font_system.load_system_fonts();
    assert!(
        !font_system.is_empty(),
        "system fonts are required for the cache demo"
    );

    let request = FontRequest::new("sans-serif", 18.0).with_fallback("serif");
    font_system
        .font_init(&request, FontCacheConfig::default())
        .expect("no usable font found");

    let line_height = font_system.height().max(1) as i32;
    let mut bitmap = Bitmap::new(640, (line_height as usize) * (LINES.len() + 2));
    bitmap.fill([32, 32, 40, 255]);

    let start = Instant::now();
    let timer = Instant::now();

    // simulate a few frames drawing the same text, the way a game UI does
    for frame in 0..60u32 {
        bitmap.fill([32, 32, 40, 255]);

        for (row, text) in LINES.iter().enumerate() {
            let fg = if row == 0 {
                Color::rgb(255, 80, 80)
            } else {
                Color::WHITE
            };
            let y = row as i32 * line_height;
            font_system.draw_string(&mut bitmap, text, fg, Color::BLACK, 8, y);
        }

        // fading text shares one cache entry per color
        let alpha = (255 - (frame * 4).min(255)) as u8;
        font_system.draw_string(
            &mut bitmap,
            "Level up!",
            Color::rgb(255, 220, 0).with_alpha(alpha),
            Color::rgb(255, 220, 0),
            8,
            LINES.len() as i32 * line_height,
        );

        let now = start + Duration::from_millis(u64::from(frame) * 250);
        font_system.slow_logic(now, Duration::ZERO);
    }

    let elapsed = timer.elapsed();

    if let Some(cache) = &*font_system.font_cache.lock() {
        println!(
            "Runs: cached={} created={} deleted={} (elapsed: {:.2?})",
            cache.len(),
            cache.create_counter(),
            cache.delete_counter(),
            elapsed
        );
        let busy = cache.shards().iter().filter(|shard| !shard.is_empty()).count();
        println!("Shards in use: {busy}/{}", cache.shards().len());
    }

    // Ensure debug directory exists
    std::fs::create_dir_all("debug").expect("failed to create debug directory");

    let img = RgbaImage::from_raw(bitmap.width as u32, bitmap.height as u32, bitmap.pixels)
        .expect("bitmap dimensions must match pixel buffer length");

    img.save("debug/cache_demo.png")
        .expect("failed to save debug image");

    println!("Saved debug image to debug/cache_demo.png");
}
