use crate::model::TranscriptChunk;

/// Normalize and merge hashtag sources: trim, drop a leading `#`, lowercase,
/// remove inner whitespace, deduplicate preserving first occurrence.
pub fn normalize_hashtags<'a, I>(sources: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for source in sources {
        for item in source {
            let t = item.trim().trim_start_matches('#');
            let t: String = t
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_lowercase();
            if !t.is_empty() && seen.insert(t.clone()) {
                out.push(t);
            }
        }
    }
    out
}

/// Split a comma-separated keyword string into trimmed entries.
pub fn split_keywords(keywords: Option<&str>) -> Vec<String> {
    keywords
        .map(|k| k.split(',').map(|t| t.trim().to_string()).collect())
        .unwrap_or_default()
}

/// Inputs for one social post caption.
#[derive(Clone, Debug, Default)]
pub struct CaptionInput<'a> {
    pub episode_number: u32,
    pub episode_title: &'a str,
    pub episode_link: &'a str,
    pub soundbite_title: &'a str,
    pub transcript_text: &'a str,
    pub podcast_keywords: Option<&'a str>,
    pub episode_keywords: Option<&'a str>,
    pub extra_hashtags: &'a [String],
}

/// Assemble the caption body. Falls back to `#podcast` when no hashtag
/// source yields anything.
pub fn build_caption_text(input: &CaptionInput<'_>) -> String {
    let podcast_tags = split_keywords(input.podcast_keywords);
    let episode_tags = split_keywords(input.episode_keywords);
    let normalized = normalize_hashtags([
        podcast_tags.as_slice(),
        episode_tags.as_slice(),
        input.extra_hashtags,
    ]);
    let hashtags = if normalized.is_empty() {
        "#podcast".to_string()
    } else {
        normalized
            .iter()
            .map(|t| format!("#{t}"))
            .collect::<Vec<_>>()
            .join(" ")
    };

    format!(
        "Episode {}: {}\n\n{}\n\n{}\n\nListen to the full episode: {}\n\n{}\n",
        input.episode_number,
        input.episode_title,
        input.soundbite_title,
        input.transcript_text,
        input.episode_link,
        hashtags
    )
}

/// Format seconds as an SRT `HH:MM:SS,mmm` timestamp, carrying millisecond
/// rounding into the seconds field.
pub fn format_srt_time(seconds: f64) -> String {
    let s = seconds.abs();
    let mut hours = (s / 3600.0) as u64;
    let mut minutes = ((s % 3600.0) / 60.0) as u64;
    let mut secs = (s % 60.0) as u64;
    let mut millis = ((s - s.floor()) * 1000.0).round() as u64;
    if millis == 1000 {
        millis = 0;
        secs += 1;
        if secs == 60 {
            secs = 0;
            minutes += 1;
            if minutes == 60 {
                minutes = 0;
                hours += 1;
            }
        }
    }
    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

/// Serialize chunks back into SRT form, 1-indexed.
pub fn generate_srt_content(chunks: &[TranscriptChunk]) -> String {
    let mut lines = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        lines.push((i + 1).to_string());
        lines.push(format!(
            "{} --> {}",
            format_srt_time(chunk.start),
            format_srt_time(chunk.end)
        ));
        lines.push(format!("{}\n", chunk.text.trim()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashtags_are_normalized_and_deduped() {
        let a = vec!["#AI".to_string(), "Dev Ops".to_string()];
        let b = vec!["ai".to_string(), " python ".to_string()];
        let got = normalize_hashtags([a.as_slice(), b.as_slice()]);
        assert_eq!(got, vec!["ai", "devops", "python"]);
    }

    #[test]
    fn caption_defaults_to_podcast_hashtag() {
        let input = CaptionInput {
            episode_number: 7,
            episode_title: "The One",
            episode_link: "https://example.com/7",
            soundbite_title: "Best bit",
            transcript_text: "Hello world",
            ..Default::default()
        };
        let caption = build_caption_text(&input);
        assert!(caption.starts_with("Episode 7: The One\n\n"));
        assert!(caption.contains("Listen to the full episode: https://example.com/7"));
        assert!(caption.trim_end().ends_with("#podcast"));
    }

    #[test]
    fn caption_joins_all_keyword_sources() {
        let extra = vec!["bonus".to_string()];
        let input = CaptionInput {
            episode_number: 1,
            episode_title: "T",
            episode_link: "L",
            soundbite_title: "S",
            transcript_text: "X",
            podcast_keywords: Some("AI, DevOps"),
            episode_keywords: Some("ai,rust"),
            extra_hashtags: &extra,
        };
        let caption = build_caption_text(&input);
        assert!(caption.contains("#ai #devops #rust #bonus"));
    }

    #[test]
    fn srt_time_formats_and_carries_rounding() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(3723.25), "01:02:03,250");
        assert_eq!(format_srt_time(59.9996), "00:01:00,000");
    }

    #[test]
    fn srt_content_round_trips_through_the_parser() {
        let chunks = vec![
            TranscriptChunk {
                start: 0.0,
                end: 2.5,
                text: "first".to_string(),
            },
            TranscriptChunk {
                start: 3.0,
                end: 5.0,
                text: "second".to_string(),
            },
        ];
        let srt = generate_srt_content(&chunks);
        let parsed = crate::srt::parse_srt(&srt);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].text, "first");
        assert_eq!(parsed[1].start, 3.0);
    }
}
