// ionblade — Audio Playback Engine
//
// WAV effects live on the SD card and get streamed to the I2S amplifier by a
// dedicated playback thread. The control loop only ever talks to the facade:
// `play` / `play_repeated` replace whatever is sounding (stop-before-play),
// `stop` is a no-op when nothing plays. A command arriving mid-file preempts
// it at the next chunk boundary, so the last writer always wins the channel.
//
// A missing or unreadable file is logged and swallowed — the state machine
// has already committed its lockout window and must not care.

use std::fs::File;
use std::io::Read;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use esp_idf_hal::delay;
use esp_idf_hal::i2s::{I2sDriver, I2sTx};

use crate::config::*;

#[derive(Debug)]
enum AudioCmd {
    Play { name: String, repeats: u32 },
    Stop,
}

pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
}

impl AudioPlayer {
    /// Spawn the playback thread around an already-configured I2S TX driver.
    pub fn start(i2s: I2sDriver<'static, I2sTx>) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("audio".into())
            .stack_size(STACK_AUDIO)
            .spawn(move || playback_loop(i2s, rx))?;
        Ok(Self { tx })
    }

    pub fn play(&self, name: &str) {
        self.play_repeated(name, 1);
    }

    pub fn play_repeated(&self, name: &str, repeats: u32) {
        let _ = self.tx.send(AudioCmd::Play { name: name.into(), repeats });
    }

    #[allow(dead_code)]
    pub fn stop(&self) {
        let _ = self.tx.send(AudioCmd::Stop);
    }
}

fn playback_loop(mut i2s: I2sDriver<'static, I2sTx>, rx: Receiver<AudioCmd>) {
    log::info!("Audio task started");

    if let Err(e) = i2s.tx_enable() {
        log::error!("I2S enable failed: {e} — audio task exiting");
        return;
    }

    // A command that preempted the previous file, waiting to run.
    let mut pending: Option<AudioCmd> = None;

    loop {
        let cmd = match pending.take() {
            Some(cmd) => cmd,
            None => match rx.recv() {
                Ok(cmd) => cmd,
                Err(_) => {
                    log::warn!("Audio channel closed — exiting audio task");
                    return;
                }
            },
        };

        match cmd {
            // Nothing is playing between files; stop has no work left.
            AudioCmd::Stop => {}
            AudioCmd::Play { name, repeats } => {
                'runs: for _ in 0..repeats {
                    match stream_file(&mut i2s, &name, &rx) {
                        Ok(Some(next)) => {
                            pending = Some(next);
                            break 'runs;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            log::warn!("cannot play {name}: {e}");
                            break 'runs;
                        }
                    }
                }
            }
        }
    }
}

/// Stream one file to the I2S peripheral. Returns the command that preempted
/// playback, if any.
fn stream_file(
    i2s: &mut I2sDriver<'static, I2sTx>,
    name: &str,
    rx: &Receiver<AudioCmd>,
) -> anyhow::Result<Option<AudioCmd>> {
    let path = format!("{AUDIO_ROOT}/{name}");
    let mut file = File::open(&path)?;

    let mut header = [0u8; WAV_HEADER_LEN];
    file.read_exact(&mut header)?;
    let spec = parse_wav_header(&header)?;
    if spec.sample_rate != AUDIO_SAMPLE_RATE_HZ || spec.channels != 1 || spec.bits_per_sample != 8 {
        log::warn!("{name}: unexpected format {spec:?}, playing anyway");
    }

    let mut chunk = [0u8; AUDIO_CHUNK_BYTES];
    let mut frame = [0u8; AUDIO_CHUNK_BYTES * 2];
    loop {
        // A queued command preempts the current file between chunks.
        match rx.try_recv() {
            Ok(cmd) => return Ok(Some(cmd)),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => return Ok(None),
        }

        let n = file.read(&mut chunk)?;
        if n == 0 {
            return Ok(None);
        }

        // 8-bit unsigned PCM → signed 16-bit I2S samples.
        for (i, &s) in chunk[..n].iter().enumerate() {
            let v = (i16::from(s) - 128) << 8;
            frame[2 * i..2 * i + 2].copy_from_slice(&v.to_le_bytes());
        }

        let mut written = 0;
        while written < 2 * n {
            written += i2s.write(&frame[written..2 * n], delay::BLOCK)?;
        }
    }
}

// ---------------------------------------------------------------------------
// WAV header
// ---------------------------------------------------------------------------
const WAV_HEADER_LEN: usize = 44;

#[derive(Debug, PartialEq, Eq)]
struct WavSpec {
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

/// Pull the format fields out of a canonical 44-byte RIFF/WAVE header.
fn parse_wav_header(header: &[u8; WAV_HEADER_LEN]) -> anyhow::Result<WavSpec> {
    if &header[0..4] != b"RIFF" || &header[8..12] != b"WAVE" {
        anyhow::bail!("not a RIFF/WAVE file");
    }
    Ok(WavSpec {
        channels: u16::from_le_bytes([header[22], header[23]]),
        sample_rate: u32::from_le_bytes([header[24], header[25], header[26], header[27]]),
        bits_per_sample: u16::from_le_bytes([header[34], header[35]]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(channels: u16, sample_rate: u32, bits: u16) -> [u8; WAV_HEADER_LEN] {
        let mut h = [0u8; WAV_HEADER_LEN];
        h[0..4].copy_from_slice(b"RIFF");
        h[8..12].copy_from_slice(b"WAVE");
        h[12..16].copy_from_slice(b"fmt ");
        h[22..24].copy_from_slice(&channels.to_le_bytes());
        h[24..28].copy_from_slice(&sample_rate.to_le_bytes());
        h[34..36].copy_from_slice(&bits.to_le_bytes());
        h[36..40].copy_from_slice(b"data");
        h
    }

    #[test]
    fn parses_the_format_fields() {
        let spec = parse_wav_header(&header(1, 16_000, 8)).unwrap();
        assert_eq!(
            spec,
            WavSpec { channels: 1, sample_rate: 16_000, bits_per_sample: 8 }
        );
    }

    #[test]
    fn rejects_non_wave_data() {
        let mut h = header(1, 16_000, 8);
        h[0..4].copy_from_slice(b"OggS");
        assert!(parse_wav_header(&h).is_err());
    }
}
