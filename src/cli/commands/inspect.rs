//! Single-file inspection commands.

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Runtime;

use crate::metadata::{self, LoftyTagWriter, extract};
use crate::pipeline::TrackProcessor;
use crate::recognition::HttpRecognitionClient;
use crate::transcode;

use super::{API_KEY_ENV, RECOGNITION_URL_ENV, RecognitionArgs, require_file};

/// Recognize a track and print the fields that `tag` would write
pub fn cmd_identify(rt: &Runtime, path: &Path, args: &RecognitionArgs) -> anyhow::Result<()> {
    require_file(path)?;
    let recognition = args.recognition_config();
    recognition.validate()?;

    let recognizer = Arc::new(HttpRecognitionClient::new(&recognition)?);
    let processor = TrackProcessor::new(
        recognizer,
        Arc::new(LoftyTagWriter::new()),
        args.retry_policy(),
    );

    println!("Identifying: {:?}", path);
    println!();

    match rt.block_on(processor.recognize_with_retry(path)) {
        Ok(response) => {
            let fields = extract::extract(&response);
            println!("✓ Match found!");
            println!();
            print_field("Title", fields.title.as_deref());
            print_field("Artist", fields.artist.as_deref());
            print_field("Album", fields.album.as_deref());
            print_field("Genre", fields.genre.as_deref());
            print_field("Cover", fields.cover_art_url.as_deref());
        }
        Err(reason) => {
            println!("✗ Not identified: {}", reason);
        }
    }
    Ok(())
}

/// Print the tags a file currently carries
pub fn cmd_show(path: &Path) -> anyhow::Result<()> {
    require_file(path)?;
    let meta = metadata::read(path)?;

    println!("{}", path.display());
    print_field("Title", meta.title.as_deref());
    print_field("Artist", meta.artist.as_deref());
    print_field("Album", meta.album.as_deref());
    print_field("Genre", meta.genre.as_deref());
    println!("  Images:   {}", meta.picture_count);
    println!("  Duration: {}:{:02}", meta.duration / 60, meta.duration % 60);
    Ok(())
}

/// Check if ffmpeg and the recognition settings are in place
pub fn cmd_check_tools() -> anyhow::Result<()> {
    println!("Checking tools...\n");

    if let Some(version) = transcode::get_ffmpeg_version() {
        println!("✓ ffmpeg: {}", version);
    } else {
        println!("✗ ffmpeg: NOT FOUND");
        println!("  Needed only for files whose content is not MP3.");
        println!("  Windows: winget install Gyan.FFmpeg");
        println!("  macOS:   brew install ffmpeg");
        println!("  Linux:   apt install ffmpeg");
    }

    println!();
    println!("Recognition:");
    match std::env::var(RECOGNITION_URL_ENV) {
        Ok(url) => println!("✓ {}: {}", RECOGNITION_URL_ENV, url),
        Err(_) => {
            println!("✗ {}: not set", RECOGNITION_URL_ENV);
            println!("  Pass --recognition-url or export the variable.");
        }
    }
    if std::env::var(API_KEY_ENV).is_ok() {
        println!("✓ {}: set", API_KEY_ENV);
    } else {
        println!("- {}: not set (optional)", API_KEY_ENV);
    }

    Ok(())
}

fn print_field(label: &str, value: Option<&str>) {
    println!("  {:<8}{}", format!("{}:", label), value.unwrap_or("-"));
}
