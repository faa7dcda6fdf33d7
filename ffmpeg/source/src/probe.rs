/*!
    Probing functionality for extracting media metadata.
*/

use std::time::Duration;

use ffmpeg_next::{format::context::Input as InputContext, media::Type};

use ffmpeg_types::{MediaInfo, Rational, Result, VideoStreamInfo};

use ffmpeg_native::convert::{codec_id_from_native, pixel_from_native, rational_from_native};

use crate::source::open_input;

/**
    Probe a file or URL for its metadata without keeping it open.

    # Example

    ```ignore
    let info = probe("video.mp4")?;
    if let Some(video) = &info.video {
        println!("Video: {}x{}", video.width, video.height);
    }
    ```
*/
pub fn probe(url: &str) -> Result<MediaInfo> {
    let input = open_input(url)?;
    Ok(extract_media_info(&input))
}

pub(crate) fn extract_media_info(input: &InputContext) -> MediaInfo {
    let video = extract_video_stream_info(input);

    let duration = container_duration(input).or_else(|| video.as_ref().and_then(|v| v.duration));

    MediaInfo {
        format_name: input.format().name().to_string(),
        duration,
        video,
        stream_count: input.streams().count(),
    }
}

fn container_duration(input: &InputContext) -> Option<Duration> {
    (input.duration() > 0).then(|| Duration::from_micros(input.duration() as u64))
}

fn native_rate(rate: ffmpeg_next::Rational) -> Option<Rational> {
    (rate.numerator() != 0 && rate.denominator() != 0).then(|| rational_from_native(rate))
}

fn extract_video_stream_info(input: &InputContext) -> Option<VideoStreamInfo> {
    let stream = input.streams().best(Type::Video)?;
    let time_base = rational_from_native(stream.time_base());

    let duration = if stream.duration() > 0 {
        Some(Duration::from_secs_f64(stream.duration() as f64 * time_base.to_f64()))
    } else {
        container_duration(input)
    };

    let parameters = stream.parameters();
    let codec_id = parameters.id();

    // Width, height and format are only exposed through a decoder context
    let decoder = ffmpeg_next::codec::context::Context::from_parameters(parameters.clone())
        .ok()?
        .decoder()
        .video()
        .ok()?;

    let frame_rate = native_rate(stream.avg_frame_rate()).or_else(|| native_rate(stream.rate()));

    // SAFETY: reading plain fields of parameters owned by the stream.
    let bitrate = unsafe { (*parameters.as_ptr()).bit_rate };

    Some(VideoStreamInfo {
        index: stream.index(),
        width: decoder.width(),
        height: decoder.height(),
        pixel_format: pixel_from_native(decoder.format()),
        frame_rate,
        time_base,
        duration,
        codec_id: codec_id_from_native(codec_id),
        codec_name: codec_id.name().to_string(),
        bitrate: (bitrate > 0).then_some(bitrate as u64),
        frame_count: (stream.frames() > 0).then_some(stream.frames() as u64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_media::write_y4m;
    use ffmpeg_types::PixelFormat;

    #[test]
    fn probe_y4m() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_y4m(dir.path(), 8, 6, 3);

        let info = probe(path.to_str().unwrap()).unwrap();
        assert_eq!(info.format_name, "yuv4mpegpipe");
        assert_eq!(info.stream_count, 1);

        let video = info.video.unwrap();
        assert_eq!((video.width, video.height), (8, 6));
        assert_eq!(video.pixel_format, Some(PixelFormat::Yuv420p));
        assert_eq!(video.codec_name, "rawvideo");
        assert_eq!(video.codec_id, None);
        assert_eq!(video.frame_rate, Some(Rational::new(25, 1)));
    }

    #[test]
    fn probe_missing_file() {
        let err = probe("/definitely/not/here.mp4").unwrap_err();
        assert!(matches!(err, ffmpeg_types::Error::Io(_)));
    }
}
