/*!
    Raw elementary stream writer.
*/

use ffmpeg_native::IoContext;
use ffmpeg_types::{Packet, Result};

/**
    Totals reported when a sink is finished.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub packets: u64,
    pub bytes: u64,
}

/**
    Writes packet payloads back to back, without any container.

    For Annex B codecs such as H.264 the result is directly playable.
*/
pub struct BitstreamSink {
    io: IoContext,
    url: String,
    stats: SinkStats,
    finished: bool,
}

impl BitstreamSink {
    /**
        Create (or truncate) the destination.

        # Example

        ```ignore
        let mut sink = BitstreamSink::create("out.h264")?;
        for packet in encoder.flush()? {
            sink.write(&packet)?;
        }
        let stats = sink.finish()?;
        ```
    */
    pub fn create(url: &str) -> Result<Self> {
        let io = IoContext::open_write(url)?;
        tracing::debug!(url, "opened bitstream sink");
        Ok(Self {
            io,
            url: url.to_string(),
            stats: SinkStats::default(),
            finished: false,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /**
        The owned byte stream the sink writes through.
    */
    pub fn io_context(&self) -> &IoContext {
        &self.io
    }

    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    /**
        Append a packet's payload. Empty packets are skipped.
    */
    pub fn write(&mut self, packet: &Packet) -> Result<()> {
        if packet.is_empty() {
            return Ok(());
        }

        self.io.write(&packet.data)?;
        self.stats.packets += 1;
        self.stats.bytes += packet.data.len() as u64;
        Ok(())
    }

    /**
        Flush buffered bytes and close the destination.
    */
    pub fn finish(mut self) -> Result<SinkStats> {
        self.finished = true;
        self.io.flush()?;
        tracing::debug!(
            url = %self.url,
            packets = self.stats.packets,
            bytes = self.stats.bytes,
            "finished bitstream sink"
        );
        Ok(self.stats)
    }
}

impl Drop for BitstreamSink {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.io.flush() {
                tracing::warn!(url = %self.url, error = %e, "failed to flush unfinished sink");
            }
        }
    }
}

impl std::fmt::Debug for BitstreamSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitstreamSink")
            .field("url", &self.url)
            .field("stats", &self.stats)
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_types::Rational;

    fn packet(data: &[u8]) -> Packet {
        Packet::from_data(data.to_vec(), Rational::new(1, 25))
    }

    #[test]
    fn writes_payloads_back_to_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.h264");

        let mut sink = BitstreamSink::create(path.to_str().unwrap()).unwrap();
        assert!(sink.io_context().is_owned());
        assert!(sink.io_context().write_flag());

        sink.write(&packet(&[0, 0, 0, 1, 0x67])).unwrap();
        sink.write(&packet(&[])).unwrap();
        sink.write(&packet(&[0, 0, 0, 1, 0x68, 0xce])).unwrap();

        let stats = sink.finish().unwrap();
        assert_eq!(stats, SinkStats { packets: 2, bytes: 11 });
        assert_eq!(
            std::fs::read(&path).unwrap(),
            vec![0, 0, 0, 1, 0x67, 0, 0, 0, 1, 0x68, 0xce]
        );
    }

    #[test]
    fn dropping_unfinished_sink_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.bin");

        {
            let mut sink = BitstreamSink::create(path.to_str().unwrap()).unwrap();
            sink.write(&packet(b"abc")).unwrap();
        }
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");
    }

    #[test]
    fn create_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.h264");
        assert!(BitstreamSink::create(path.to_str().unwrap()).is_err());
    }
}
