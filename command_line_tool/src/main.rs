use clap::Parser;
use faceswap::{FaceSwapConfig, FaceSwapProcessor, Photo, PointSet};

use image::{open, GenericImageView};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Command line arguments structure.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Swap the face of the source photo into the destination photo.",
    long_about = "Swap the face of the source photo into the destination photo.\n\n\
                  Landmarks are read from `<photo>.txt` next to each photo, one `x y` pair per line. \
                  The result is written to `<destination>_swapped.png`."
)]
struct Args {
    /// Photo the face is taken from
    #[arg()]
    source: String,

    /// Photo the face is placed into
    #[arg()]
    destination: String,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(output) => {
            log::info!("Done, wrote {}", output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<PathBuf, Box<dyn Error>> {
    let source_points = PointSet::read_from_file(&points_path(&args.source))?;
    let destination_points = PointSet::read_from_file(&points_path(&args.destination))?;

    let source = read_photo(&args.source)?;
    let destination = read_photo(&args.destination)?;

    let processor = FaceSwapProcessor::new(source, destination, FaceSwapConfig::default())?;
    let report = processor.run(&source_points, &destination_points)?;
    if !report.skipped.is_empty() {
        log::warn!("{} triangle(s) or landmark(s) were skipped", report.skipped.len());
    }

    let output = output_path(&args.destination);
    save_photo(report.output, &output)?;
    Ok(output)
}

/// Landmarks of `photo.jpg` live in `photo.jpg.txt`.
fn points_path(photo: &str) -> PathBuf {
    PathBuf::from(format!("{photo}.txt"))
}

fn output_path(destination: &str) -> PathBuf {
    let path = Path::new(destination);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!("{stem}_swapped.png"))
}

pub fn save_photo(photo: Photo, filename: &Path) -> Result<(), Box<dyn Error>> {
    log::info!("Writing image {}", filename.display());
    let img = image::RgbaImage::from_raw(photo.width as u32, photo.height as u32, photo.img_data)
        .ok_or("output buffer does not match its dimensions")?;
    img.save(filename)?;
    Ok(())
}

pub fn read_photo(filename: &str) -> Result<Photo, Box<dyn Error>> {
    log::info!("Reading image file: {filename}");
    let img = open(filename).map_err(|e| format!("could not load image {filename}: {e}"))?;
    let pixel_data = img.to_rgba8().into_raw();
    let photo = Photo::new(pixel_data, img.width() as usize, img.height() as usize)
        .ok_or_else(|| format!("decoded pixel buffer of {filename} does not match its dimensions"))?;
    Ok(photo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_file_sits_next_to_the_photo() {
        assert_eq!(points_path("faces/a.jpg"), PathBuf::from("faces/a.jpg.txt"));
    }

    #[test]
    fn output_replaces_the_extension() {
        assert_eq!(output_path("faces/b.jpg"), PathBuf::from("faces/b_swapped.png"));
        assert_eq!(output_path("b"), PathBuf::from("b_swapped.png"));
    }

    #[test]
    fn photo_survives_a_png_round_trip() {
        let path = std::env::temp_dir().join(format!("faceswap-cli-{}.png", std::process::id()));
        let photo = Photo::from_fn(5, 3, |x, y| [x as u8 * 40, y as u8 * 60, 7, 255]);
        save_photo(photo.clone(), &path).unwrap();
        let read = read_photo(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(read, photo);
    }

    #[test]
    fn unreadable_photo_is_an_error() {
        let err = read_photo("no-such-dir/missing.png").unwrap_err();
        assert!(err.to_string().contains("missing.png"));
    }
}
