//! Prompt construction for the compatibility classifier

use vibesync_common::events::{CalendarEvent, MusicContext, RecentTrack};

/// Fixed system instruction sent with every request
pub const SYSTEM_PROMPT: &str = "You are a context-switching assistant that analyzes \
compatibility between a user's current music and their upcoming schedule. \
Respond ONLY in valid JSON format.";

/// Marker used when the schedule is empty
pub const NO_EVENTS_MARKER: &str = "No upcoming events in the next 2 hours.";

/// Number of songs the classifier is asked to recommend
pub const RECOMMENDATION_COUNT: usize = 3;

const TASK_AND_SCHEMA: &str = r#"Respond in this exact JSON format:
{
    "music_mood": "string description",
    "task_intent": "string description",
    "compatibility_score": number_0_to_100,
    "transition_suggestion": "string or null",
    "song_recommendations": [
        { "title": "song name", "artist": "artist name", "reason": "why this fits" }
    ]
}"#;

/// Build the user prompt for one evaluation
pub fn build_prompt(
    music: &MusicContext,
    events: &[CalendarEvent],
    recent_tracks: &[RecentTrack],
) -> String {
    format!(
        "CURRENT MUSIC:\n{}\n\nUPCOMING SCHEDULE:\n{}{}\n\nTASK:\n{}\n\n{}",
        music_section(music),
        schedule_section(events),
        recent_section(recent_tracks),
        task_section(),
        TASK_AND_SCHEMA
    )
}

fn music_section(music: &MusicContext) -> String {
    let album = if music.album.is_empty() {
        "Unknown"
    } else {
        music.album.as_str()
    };
    let mut section = format!(
        "Track: \"{}\" by {}\nAlbum: {}\n",
        music.name, music.artist, album
    );

    if !music.artist_genres.is_empty() {
        section.push_str(&format!(
            "Artist genres: {}\n",
            music.artist_genres.join(", ")
        ));
    }

    match &music.audio_features {
        Some(af) => section.push_str(&format!(
            "Audio features: valence={:.2}, energy={:.2}, tempo={} BPM, danceability={:.2}\n",
            af.valence,
            af.energy,
            af.tempo.round() as i64,
            af.danceability
        )),
        None => section.push_str(
            "(No numerical audio features available. \
             Please infer mood from the track name, artist, and genres.)\n",
        ),
    }

    section
}

fn schedule_section(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return NO_EVENTS_MARKER.to_string();
    }

    events
        .iter()
        .map(|evt| {
            let mut line = format!("- {} (in {} minutes)", evt.summary, evt.minutes_until);
            if !evt.description.is_empty() {
                line.push_str(": ");
                line.push_str(&evt.description);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn recent_section(recent_tracks: &[RecentTrack]) -> String {
    if recent_tracks.is_empty() {
        return String::new();
    }

    let lines = recent_tracks
        .iter()
        .map(|t| {
            let mut line = format!("- \"{}\" by {}", t.name, t.artist);
            if !t.genres.is_empty() {
                line.push_str(&format!(" [{}]", t.genres.join(", ")));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("\n\nRECENT LISTENING HISTORY:\n{}", lines)
}

fn task_section() -> String {
    format!(
        "1. Assess the MOOD of the music (e.g., energizing, calming, melancholic, focus-inducing, party)\n\
         2. Assess the INTENT of the next calendar event (e.g., deep-focus, collaborative, creative, administrative, relaxation)\n\
         3. Rate compatibility on a scale of 0-100 (100 = perfect match)\n\
         4. If score < 60, suggest a specific transition action\n\
         5. Recommend {} songs the user likely hasn't heard that match the upcoming task's intent, \
         based on their taste from the listening history above. \
         Suggest new discoveries, not songs they already listen to.",
        RECOMMENDATION_COUNT
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibesync_common::events::AudioFeatures;

    fn track() -> MusicContext {
        MusicContext {
            name: "Blinding Lights".to_string(),
            artist: "The Weeknd".to_string(),
            album: "After Hours".to_string(),
            album_art_url: None,
            artist_genres: vec!["canadian pop".to_string(), "pop".to_string()],
            popularity: 92,
            audio_features: None,
        }
    }

    fn lecture() -> CalendarEvent {
        CalendarEvent {
            summary: "CS 531 Lecture".to_string(),
            description: "Deep learning chapter 5".to_string(),
            start_time: "2026-02-17T14:00:00-05:00".to_string(),
            minutes_until: 45,
            location: String::new(),
        }
    }

    #[test]
    fn test_prompt_includes_audio_features_when_available() {
        let mut music = track();
        music.audio_features = Some(AudioFeatures {
            valence: 0.334,
            energy: 0.73,
            tempo: 171.005,
            danceability: 0.514,
        });

        let prompt = build_prompt(&music, &[lecture()], &[]);

        assert!(prompt.contains("valence=0.33"));
        assert!(prompt.contains("energy=0.73"));
        assert!(prompt.contains("tempo=171 BPM"));
        assert!(prompt.contains("danceability=0.51"));
        assert!(!prompt.contains("No numerical audio features"));
    }

    #[test]
    fn test_prompt_asks_to_infer_mood_without_audio_features() {
        let prompt = build_prompt(&track(), &[lecture()], &[]);

        assert!(prompt.contains("No numerical audio features available"));
        assert!(prompt.contains("Artist genres: canadian pop, pop"));
        assert!(prompt.contains("Album: After Hours"));
    }

    #[test]
    fn test_prompt_lists_events_with_description() {
        let mut standup = lecture();
        standup.summary = "Standup".to_string();
        standup.description = String::new();
        standup.minutes_until = 90;

        let prompt = build_prompt(&track(), &[lecture(), standup], &[]);

        assert!(prompt.contains("- CS 531 Lecture (in 45 minutes): Deep learning chapter 5"));
        assert!(prompt.contains("- Standup (in 90 minutes)\n"));
    }

    #[test]
    fn test_prompt_marks_empty_schedule() {
        let mut music = track();
        music.album = String::new();

        let prompt = build_prompt(&music, &[], &[]);

        assert!(prompt.contains(NO_EVENTS_MARKER));
        assert!(prompt.contains("Album: Unknown"));
    }

    #[test]
    fn test_recent_history_section_only_when_supplied() {
        let without = build_prompt(&track(), &[lecture()], &[]);
        assert!(!without.contains("RECENT LISTENING HISTORY"));

        let recent = vec![
            RecentTrack {
                name: "Starboy".to_string(),
                artist: "The Weeknd".to_string(),
                genres: vec!["canadian pop".to_string(), "pop".to_string()],
            },
            RecentTrack {
                name: "Untitled".to_string(),
                artist: "Nobody".to_string(),
                genres: Vec::new(),
            },
        ];
        let with = build_prompt(&track(), &[lecture()], &recent);

        assert!(with.contains("RECENT LISTENING HISTORY:"));
        assert!(with.contains("- \"Starboy\" by The Weeknd [canadian pop, pop]"));
        assert!(with.contains("- \"Untitled\" by Nobody\n"));
    }

    #[test]
    fn test_prompt_requests_schema_and_recommendations() {
        let prompt = build_prompt(&track(), &[lecture()], &[]);

        assert!(prompt.contains("\"compatibility_score\": number_0_to_100"));
        assert!(prompt.contains("\"song_recommendations\""));
        assert!(prompt.contains("Recommend 3 songs"));
    }
}
