use crate::error::PipelineError;

use colored::Colorize;

/// Alert sound collaborator. The pipeline only decides a tier and asks
/// for the matching asset; decoding and playback stay behind this
/// seam. `wait` requests blocking playback; by default play calls must
/// not block ingestion.
pub trait AudioPlayer: Send {
    fn play(&mut self, asset_id: &str, wait: bool) -> Result<(), PipelineError>;
}

/// Console stand-in for a real audio backend: rings the terminal bell
/// and prints the asset that would have played.
#[derive(Default)]
pub struct ConsoleAudio;

impl AudioPlayer for ConsoleAudio {
    fn play(&mut self, asset_id: &str, _wait: bool) -> Result<(), PipelineError> {
        println!("{} {}", "\u{7}ALERT".red().bold(), asset_id.yellow());
        Ok(())
    }
}
