use crate::error::{AudiogramError, AudiogramResult};
use crate::model::TranscriptChunk;

/// Parse an `HH:MM:SS,mmm` SRT timestamp into seconds.
pub fn parse_srt_time(s: &str) -> AudiogramResult<f64> {
    let s = s.trim();
    let (hms, millis) = s
        .split_once(',')
        .ok_or_else(|| AudiogramError::validation(format!("bad srt timestamp '{s}'")))?;
    let parts: Vec<&str> = hms.split(':').collect();
    let [h, m, sec] = parts.as_slice() else {
        return Err(AudiogramError::validation(format!(
            "bad srt timestamp '{s}'"
        )));
    };
    let parse = |v: &str| {
        v.parse::<u32>()
            .map_err(|_| AudiogramError::validation(format!("bad srt timestamp '{s}'")))
    };
    let (h, m, sec, ms) = (parse(h)?, parse(m)?, parse(sec)?, parse(millis)?);
    Ok(f64::from(h) * 3600.0 + f64::from(m) * 60.0 + f64::from(sec) + f64::from(ms) / 1000.0)
}

/// Parse full SRT content into timed chunks. Block indices are ignored;
/// malformed blocks are skipped rather than failing the whole file.
pub fn parse_srt(content: &str) -> Vec<TranscriptChunk> {
    let mut chunks = Vec::new();
    for block in content.replace("\r\n", "\n").split("\n\n") {
        let mut lines = block.lines().filter(|l| !l.trim().is_empty());
        let Some(first) = lines.next() else {
            continue;
        };
        // The index line is optional in practice; the timing line is not.
        let timing = if first.contains("-->") {
            first
        } else {
            match lines.next() {
                Some(l) if l.contains("-->") => l,
                _ => continue,
            }
        };
        let Some((start_s, end_s)) = timing.split_once("-->") else {
            continue;
        };
        let (Ok(start), Ok(end)) = (parse_srt_time(start_s), parse_srt_time(end_s)) else {
            continue;
        };
        let text = lines.collect::<Vec<_>>().join(" ").trim().to_string();
        if text.is_empty() || start >= end {
            continue;
        }
        chunks.push(TranscriptChunk { start, end, text });
    }
    chunks
}

/// Chunks fully contained in `[window_start, window_start + duration]`,
/// rebased so the window begins at zero.
pub fn chunks_in_window(content: &str, window_start: f64, duration: f64) -> Vec<TranscriptChunk> {
    let window_end = window_start + duration;
    parse_srt(content)
        .into_iter()
        .filter(|c| c.start >= window_start && c.end <= window_end)
        .map(|c| TranscriptChunk {
            start: c.start - window_start,
            end: c.end - window_start,
            text: c.text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:03,500\nHello there\n\n2\n00:00:04,000 --> 00:00:06,000\nSecond line\nwraps here\n\n3\n00:01:00,250 --> 00:01:02,000\nMuch later\n";

    #[test]
    fn timestamps_parse_to_seconds() {
        assert_eq!(parse_srt_time("00:00:01,000").unwrap(), 1.0);
        assert_eq!(parse_srt_time("01:02:03,250").unwrap(), 3723.25);
        assert!(parse_srt_time("1:2").is_err());
        assert!(parse_srt_time("aa:bb:cc,dd").is_err());
    }

    #[test]
    fn blocks_parse_with_joined_text() {
        let chunks = parse_srt(SAMPLE);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "Hello there");
        assert_eq!(chunks[1].text, "Second line wraps here");
        assert_eq!(chunks[1].start, 4.0);
        assert_eq!(chunks[2].end, 62.0);
    }

    #[test]
    fn malformed_blocks_are_skipped() {
        let chunks = parse_srt("garbage\n\n1\n00:00:01,000 --> 00:00:02,000\nok\n");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "ok");
    }

    #[test]
    fn window_keeps_only_fully_contained_blocks_rebased() {
        // Window [0.5, 5.0]: the first block fits, the second ends at 6.0
        // and is excluded, the third is far outside.
        let chunks = chunks_in_window(SAMPLE, 0.5, 4.5);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start, 0.5);
        assert_eq!(chunks[0].end, 3.0);
        assert_eq!(chunks[0].text, "Hello there");
    }

    #[test]
    fn block_touching_the_window_edge_is_kept() {
        let chunks = chunks_in_window(SAMPLE, 1.0, 2.5);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start, 0.0);
        assert_eq!(chunks[0].end, 2.5);
    }
}
