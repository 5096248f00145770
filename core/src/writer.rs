//! PNG output. Any existing file at the path is replaced.

use crate::{error::ChartResult, render::Figure};
use image::ImageFormat;
use std::path::Path;

pub fn write_png(figure: &Figure, path: impl AsRef<Path>) -> ChartResult<()> {
    let path = path.as_ref();
    figure.image().save_with_format(path, ImageFormat::Png)?;
    log::info!(
        "wrote {}x{} chart to {}",
        figure.width(),
        figure.height(),
        path.display()
    );
    Ok(())
}
