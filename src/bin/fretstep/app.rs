//! Fretstep - application builder and runner

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fretstep::{Session, MAX_BLOCK_SIZE};

use super::ui::UiApp;

/// Samples kept for the level meter
const SCOPE_CAPACITY: usize = 8192;
/// Playback notifications buffered between UI frames
const EVENT_CAPACITY: usize = 256;

/// Main application builder
pub struct Fretstep {
    song: Option<PathBuf>,
}

impl Fretstep {
    pub fn new() -> Self {
        Self { song: None }
    }

    /// Song file to open at startup
    pub fn song(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.song = path.map(Into::into);
        self
    }

    /// Open the audio device, load the song and hand over to the UI
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let mut session = Session::new(sample_rate).wrap_err("failed to create session")?;
        if let Some(path) = &self.song {
            let json = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            session
                .import_json(&json)
                .wrap_err_with(|| format!("failed to load {}", path.display()))?;
        }
        // Import rejections were already reported through the error above
        session.take_events();

        let events_rx = session.subscribe(EVENT_CAPACITY);
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);

        let session = Arc::new(Mutex::new(session));
        let audio_session = session.clone();
        let error_session = session.clone();
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let Ok(mut session) = audio_session.lock() else {
                    data.fill(0.0);
                    return;
                };
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames_to_render];
                    session.render_block(block);

                    // Mono to all channels
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                        let _ = scope_tx.push(s);
                    }

                    frames_written += frames_to_render;
                }
            },
            move |_err| {
                if let Ok(mut session) = error_session.lock() {
                    session.close();
                }
            },
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let title = self
            .song
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());
        let result = UiApp::new(session, events_rx, scope_rx, sample_rate, title).run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}

impl Default for Fretstep {
    fn default() -> Self {
        Self::new()
    }
}
