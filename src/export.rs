use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::Writer;
use image::RgbaImage;
use tracing::info;

use crate::model::CoinRecord;

/// `crypto-market-update-<epoch-ms>.png`
pub fn generate_filename(now: DateTime<Utc>) -> String {
    format!("crypto-market-update-{}.png", now.timestamp_millis())
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder
            .write_header()
            .context("failed to write PNG header")?
            .write_image_data(image.as_raw())
            .context("failed to write PNG data")?;
    }
    Ok(buffer)
}

/// Encode `image` and write it into `dir` under a timestamped name.
pub fn save_png(image: &RgbaImage, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(generate_filename(now));
    let bytes = encode_png(image)?;
    fs::write(&path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "saved summary card");
    Ok(path)
}

pub fn write_csv<W: Write>(coins: &[CoinRecord], writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    for coin in coins {
        wtr.serialize(coin)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn save_to_csv<P: AsRef<Path>>(coins: &[CoinRecord], file_path: P) -> Result<()> {
    let file_path = file_path.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(file_path)
        .with_context(|| format!("failed to open {}", file_path.display()))?;

    write_csv(coins, file)
}
