/// Incremental scanner for JPEG images inside a continuous byte stream.
///
/// ffmpeg's `image2pipe` output is a plain concatenation of JPEGs with no
/// length framing, so images are recovered by scanning for start/end markers
/// and buffering partial images across read chunks. Anything before a start
/// marker is discarded.
pub struct JpegStreamParser {
    buf: Vec<u8>,
}

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

impl JpegStreamParser {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Feed the next chunk and drain every complete image it unlocks.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buf.extend_from_slice(chunk);

        let mut images = Vec::new();
        loop {
            let Some(start) = find_marker(&self.buf, SOI) else {
                // No start marker: drop the garbage, but keep a trailing 0xFF
                // in case the marker is split across chunks.
                let keep_tail = self.buf.last() == Some(&0xFF);
                self.buf.clear();
                if keep_tail {
                    self.buf.push(0xFF);
                }
                break;
            };
            if start > 0 {
                self.buf.drain(..start);
            }

            let Some(end) = find_marker(&self.buf[SOI.len()..], EOI) else {
                break;
            };
            let image_len = SOI.len() + end + EOI.len();
            let image = self.buf[..image_len].to_vec();
            self.buf.drain(..image_len);
            images.push(image);
        }

        images
    }

    /// Bytes buffered for an image that has not completed yet.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

impl Default for JpegStreamParser {
    fn default() -> Self {
        Self::new()
    }
}

fn find_marker(haystack: &[u8], marker: [u8; 2]) -> Option<usize> {
    haystack.windows(2).position(|w| w == marker)
}
