use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::prosody::{ProsodyError, Result};
use crate::types::AudioData;

/// Decode an audio file to mono f32 PCM (channel 0 of multi-channel input).
pub fn decode_audio<P: AsRef<Path>>(path: P) -> Result<AudioData> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| {
        ProsodyError::Decode(format!("failed to open audio file {}: {err}", path.display()))
    })?;
    let extension = path.extension().and_then(|e| e.to_str());
    decode_source(Box::new(file), extension)
}

/// Decode encoded bytes handed over by a recorder or a remote service.
///
/// `extension` is only a probing hint; the container is detected from content.
pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<AudioData> {
    if bytes.is_empty() {
        return Err(ProsodyError::Decode("audio payload is empty".to_string()));
    }
    decode_source(Box::new(Cursor::new(bytes)), extension)
}

fn decode_source(source: Box<dyn MediaSource>, extension: Option<&str>) -> Result<AudioData> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = extension {
        hint.with_extension(extension);
    }

    let probe_result = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| decode_error("unsupported or corrupt audio container", err))?;
    let mut format = probe_result.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ProsodyError::Decode("no audio tracks found".to_string()))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| ProsodyError::Decode("sample rate not specified".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|err| decode_error("failed to create decoder", err))?;

    let mut samples = Vec::new();
    let mut skipped_packets = 0usize;
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(decode_error("failed to read packet", err)),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // A single malformed packet is recoverable; keep the rest of the stream.
            Err(SymphoniaError::DecodeError(reason)) => {
                warn!(reason, "skipping undecodable packet");
                skipped_packets += 1;
                continue;
            }
            Err(err) => return Err(decode_error("failed to decode audio packet", err)),
        };
        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend(buffer.samples().iter().step_by(channels).copied());
    }

    if samples.is_empty() {
        return Err(ProsodyError::Decode(
            "stream contained no audio samples".to_string(),
        ));
    }
    debug!(
        samples = samples.len(),
        sample_rate,
        skipped_packets,
        "decoded audio"
    );
    Ok(AudioData::new(samples, sample_rate))
}

fn decode_error(context: &str, err: SymphoniaError) -> ProsodyError {
    ProsodyError::Decode(format!("{context}: {err}"))
}
